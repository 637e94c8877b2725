use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use parrotly_core::Clock;
use parrotly_core::model::{ProtocolDefinition, spanish};
use services::AppServices;
use storage::{HttpRemotePeer, InMemoryNode, RemotePeer};
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidRemoteUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidRemoteUrl { raw } => write!(f, "invalid --remote value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    services: AppServices,
}

impl UiApp for DesktopApp {
    fn services(&self) -> AppServices {
        self.services.clone()
    }
}

struct Args {
    remote_url: Option<String>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--remote <url>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --remote <url>   remote data node to propagate the protocol to");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PARROTLY_REMOTE_URL   same as --remote");
    eprintln!("  RUST_LOG              tracing filter, e.g. services=debug");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut remote_url = std::env::var("PARROTLY_REMOTE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--remote" => {
                    let value = require_value(args, "--remote")?;
                    remote_url = Some(value);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if let Some(raw) = &remote_url {
            url::Url::parse(raw).map_err(|_| ArgsError::InvalidRemoteUrl { raw: raw.clone() })?;
        }
        Ok(Self { remote_url })
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let remote: Option<Arc<dyn RemotePeer>> = parsed
        .remote_url
        .map(|url| Arc::new(HttpRemotePeer::new(url)) as Arc<dyn RemotePeer>);

    // A fresh in-memory node per launch; the identity is generated with it.
    let connection = InMemoryNode::connect_with(Clock::default_clock(), remote);
    tracing::info!(did = %connection.did, "session opened");

    // Negotiation failure is startup-fatal: nothing can be read or written
    // without the protocol installed.
    let services = AppServices::bootstrap(
        connection,
        spanish().clone(),
        ProtocolDefinition::vocabulary_quiz(),
    )
    .await?;

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp { services });
    let context = build_app_context(&app);

    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Parrotly")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
