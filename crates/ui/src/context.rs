use std::sync::Arc;

use services::AppServices;

/// UI-facing surface of the composed application. The composition root
/// (`crates/app`) implements this; views only ever see [`AppContext`].
pub trait UiApp: Send + Sync {
    fn services(&self) -> AppServices;
}

#[derive(Clone)]
pub struct AppContext {
    services: AppServices,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            services: app.services(),
        }
    }

    /// Cheap clone of the service handle for use inside async closures.
    #[must_use]
    pub fn services(&self) -> AppServices {
        self.services.clone()
    }
}

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
