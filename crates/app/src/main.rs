mod telemetry;

use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{
    ApiConfig, AppServices, AttemptService, BackendMode, CatalogService, DashboardService,
    Scheduler, TokioScheduler,
};
use tokio::runtime::Handle;
use tracing::info;
use ui::{App, UiApp, build_app_context};

#[derive(Debug, PartialEq, Eq)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
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
    fn backend_mode(&self) -> BackendMode {
        self.services.mode()
    }

    fn attempts(&self) -> Arc<AttemptService> {
        self.services.attempts()
    }

    fn catalog(&self) -> Arc<CatalogService> {
        self.services.catalog()
    }

    fn dashboard(&self) -> Arc<DashboardService> {
        self.services.dashboard()
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    api_url: Option<String>,
    demo: bool,
    log_json: bool,
    help: bool,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--api-url <url>] [--demo] [--log-json]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --api-url <url>  quiz API base URL (overrides QUIZ_API_BASE_URL)");
    eprintln!("  --demo           use the built-in sample catalog instead of a server");
    eprintln!("  --log-json       emit logs as JSON lines");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_API_BASE_URL, QUIZ_API_TOKEN, QUIZ_API_TIMEOUT_SECS,");
    eprintln!("  QUIZ_CACHE_STALE_SECS, QUIZ_LOG");
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api-url" => parsed.api_url = Some(require_value(&mut args, "--api-url")?),
                "--demo" => parsed.demo = true,
                "--log-json" => parsed.log_json = true,
                "--help" | "-h" => parsed.help = true,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(parsed)
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if args.help {
        print_usage();
        return Ok(());
    }

    telemetry::init_tracing(args.log_json)?;

    let mut config = ApiConfig::from_env()?;
    if let Some(url) = args.api_url {
        config = config.with_base_url(url)?;
    }

    let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler::new(Handle::current()));
    let services = if args.demo {
        AppServices::demo(&config, scheduler)
    } else {
        AppServices::remote(&config, scheduler)?
    };
    info!(mode = ?services.mode(), "starting desktop client");

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp { services });
    let context = build_app_context(&app);

    // Dioxus/tao can default to an always-on-top window in some dev setups.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Quiz")
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
