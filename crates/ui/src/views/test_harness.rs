use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};

use parrotly_core::model::{Did, ProtocolDefinition, spanish};
use services::AppServices;
use storage::{
    ConfigureReply, Connection, CreateReply, DataStore, InMemoryNode, ProtocolFilter,
    ProtocolsReply, RecordFilter, RecordsReply, StoreError, WriteMessage,
};

use crate::context::{UiApp, build_app_context};
use crate::views::{HomeView, QuizView};

#[derive(Clone)]
struct TestApp {
    services: AppServices,
}

impl UiApp for TestApp {
    fn services(&self) -> AppServices {
        self.services.clone()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Quiz,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Quiz => rsx! { QuizView {} },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub async fn healthy_services() -> AppServices {
    AppServices::bootstrap(
        InMemoryNode::connect(),
        spanish().clone(),
        ProtocolDefinition::vocabulary_quiz(),
    )
    .await
    .expect("bootstrap over in-memory node")
}

pub fn setup_view_harness(view: ViewKind, services: AppServices) -> ViewHarness {
    let app = Arc::new(TestApp { services });
    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });
    ViewHarness { dom }
}

/// Node whose record queries always fail, while negotiation still works.
/// Bootstrapping over it yields services stuck in the fetch-error state.
struct QueryFailingNode {
    inner: InMemoryNode,
}

#[async_trait::async_trait]
impl DataStore for QueryFailingNode {
    async fn query_protocols(&self, filter: &ProtocolFilter) -> Result<ProtocolsReply, StoreError> {
        self.inner.query_protocols(filter).await
    }

    async fn configure_protocol(
        &self,
        definition: &ProtocolDefinition,
    ) -> Result<ConfigureReply, StoreError> {
        self.inner.configure_protocol(definition).await
    }

    async fn query_records(&self, _filter: &RecordFilter) -> Result<RecordsReply, StoreError> {
        Err(StoreError::Connection("node unreachable".into()))
    }

    async fn create_record(
        &self,
        data: &serde_json::Value,
        message: &WriteMessage,
    ) -> Result<CreateReply, StoreError> {
        self.inner.create_record(data, message).await
    }
}

pub async fn fetch_failing_services() -> AppServices {
    let did = Did::new("did:key:test").expect("valid test did");
    let connection = Connection {
        store: Arc::new(QueryFailingNode {
            inner: InMemoryNode::new(did.clone()),
        }),
        did,
    };
    AppServices::bootstrap(
        connection,
        spanish().clone(),
        ProtocolDefinition::vocabulary_quiz(),
    )
    .await
    .expect("bootstrap survives a failing record query")
}
