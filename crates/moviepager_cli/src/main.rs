//! Command-line front end for the MoviePager sync core.

use anyhow::{anyhow, bail, Context};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use moviepager_core::{Config, Database, ListInfo, ListInfoRepository, Movie, MovieRepository};
use moviepager_sync::{
    Connectivity, HttpCatalogClient, StaticConnectivity, SyncController, SyncDeps, SyncEvent,
    TcpConnectivity,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Extra time granted to the worker beyond the HTTP timeout.
const EVENT_GRACE_SECS: u64 = 5;

#[derive(Parser)]
#[command(
    name = "moviepager",
    about = "Browse the movie catalog, falling back to the local cache when offline",
    version
)]
struct Cli {
    /// Catalog base URL (can also be set via MOVIES_API_URL env var)
    #[arg(short, long, env = "MOVIES_API_URL")]
    server: Option<String>,

    /// Catalog API key (can also be set via MOVIES_API_KEY env var)
    #[arg(short = 'k', long, env = "MOVIES_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Database directory (defaults to DB_PATH or ~/.cache/moviepager/db)
    #[arg(long)]
    db: Option<String>,

    /// Request timeout in seconds
    #[arg(short = 't', long)]
    timeout: Option<u64>,

    /// Never contact the catalog; serve the cached snapshot
    #[arg(long, global = true)]
    offline: bool,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Load one page and print it
    Load {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },
    /// Load consecutive pages starting at `from`
    Browse {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        from: u32,
        /// Maximum number of pages to load
        #[arg(short = 'n', long, default_value = "3")]
        pages: u32,
    },
    /// Print the snapshot observed right after startup
    Show,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moviepager=warn,moviepager_sync=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

fn explicit_override(value: Option<&str>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn apply_overrides(mut config: Config, cli: &Cli) -> Config {
    if let Some(server) = explicit_override(cli.server.as_deref()) {
        config.api_base_url = server.trim_end_matches('/').to_string();
    }
    if let Some(api_key) = cli.api_key.as_deref() {
        config.api_key = api_key.trim().to_string();
    }
    if let Some(db) = explicit_override(cli.db.as_deref()) {
        config.db_path = db;
    }
    if let Some(timeout) = cli.timeout {
        config.request_timeout_secs = timeout.max(1);
    }
    if cli.offline {
        config.offline = true;
    }
    config
}

fn format_page_header(info: Option<&ListInfo>) -> String {
    match info {
        Some(info) => format!(
            "Page {} of {} ({} results)",
            info.page, info.total_pages, info.total_results
        ),
        None => "No page loaded".to_string(),
    }
}

fn format_movie_row(movie: &Movie) -> String {
    let year = movie
        .release_year()
        .map(|year| year.to_string())
        .unwrap_or_else(|| "----".to_string());
    format!(
        "{:>8}  {:<4}  {:>4.1}  {}",
        movie.id, year, movie.vote_average, movie.title
    )
}

fn format_snapshot_output(
    movies: &[Movie],
    info: Option<&ListInfo>,
    json: bool,
) -> Result<String, String> {
    if json {
        let payload = serde_json::json!({
            "list_info": info,
            "movies": movies,
        });
        return serde_json::to_string_pretty(&payload)
            .map_err(|err| format!("output encoding error: {}", err));
    }

    let mut lines = Vec::with_capacity(movies.len() + 1);
    lines.push(format_page_header(info));
    lines.extend(movies.iter().map(format_movie_row));
    Ok(lines.join("\n"))
}

fn print_observed(controller: &SyncController, json: bool) -> anyhow::Result<()> {
    let snapshot = controller.snapshot().get();
    let output = format_snapshot_output(&snapshot.movies, snapshot.list_info.as_ref(), json)
        .map_err(|message| anyhow!(message))?;
    println!("{}", output);
    Ok(())
}

/// Request `page` and block until the worker reports on it.
fn load_and_wait(
    controller: &SyncController,
    page: u32,
    timeout: Duration,
) -> anyhow::Result<SyncEvent> {
    controller.load_page(page)?;
    loop {
        let event = controller
            .events()
            .recv_timeout(timeout)
            .map_err(|_| anyhow!("timed out waiting for page {}", page))?;
        if event.page() == page {
            return Ok(event);
        }
        debug!(?event, "ignoring event for another page");
    }
}

/// Report a load outcome. Returns whether the page came from the network.
fn report_outcome(event: &SyncEvent) -> anyhow::Result<bool> {
    match event {
        SyncEvent::PageLoaded { .. } => Ok(true),
        SyncEvent::ServedFromCache { page, .. } => {
            eprintln!("Catalog unreachable; showing cached movies instead of page {}", page);
            Ok(false)
        }
        SyncEvent::LoadFailed { page, message } => {
            bail!("Loading page {} failed: {}", page, message)
        }
    }
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

/// Open the store, start a controller and hand it to `run`.
///
/// The controller is disposed once `run` succeeds and always stopped
/// before the runtime goes away.
fn with_session<F>(config: &Config, run: F) -> anyhow::Result<()>
where
    F: FnOnce(&SyncController, Duration) -> anyhow::Result<()>,
{
    if config.api_key.is_empty() && !config.offline {
        warn!("no API key configured; the catalog will likely reject requests");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let db = Database::new(&config.db_path)
        .with_context(|| format!("failed to open database at {}", config.db_path))?;
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let client = HttpCatalogClient::new(&config.api_base_url, timeout)?;
    let connectivity: Arc<dyn Connectivity> = if config.offline {
        Arc::new(StaticConnectivity::new(false))
    } else {
        Arc::new(TcpConnectivity::new(client.endpoint().clone()))
    };

    let controller = SyncController::initialize(SyncDeps {
        movies: MovieRepository::new(&db),
        list_info: ListInfoRepository::new(&db),
        catalog: Arc::new(client),
        connectivity,
        runtime: runtime.handle().clone(),
        api_key: config.api_key.clone(),
    })?;

    run(&controller, timeout + Duration::from_secs(EVENT_GRACE_SECS))?;
    controller.dispose()?;
    Ok(())
}

fn browse(
    controller: &SyncController,
    from: u32,
    pages: u32,
    wait: Duration,
    json: bool,
) -> anyhow::Result<()> {
    let mut next = Some(from);
    for _ in 0..pages {
        let Some(page) = next else {
            break;
        };
        let event = load_and_wait(controller, page, wait)?;
        let online = report_outcome(&event)?;
        print_observed(controller, json)?;
        if !online {
            break;
        }
        next = controller.list_info().get().and_then(|info| info.next_page());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = apply_overrides(Config::from_env(), &cli);
    let json = cli.json;

    match cli.command {
        Commands::Completions { shell } => {
            print_completions(shell);
            Ok(())
        }
        Commands::Load { page } => with_session(&config, |controller, wait| {
            let event = load_and_wait(controller, page, wait)?;
            report_outcome(&event)?;
            print_observed(controller, json)
        }),
        Commands::Browse { from, pages } => with_session(&config, |controller, wait| {
            browse(controller, from, pages, wait, json)
        }),
        Commands::Show => {
            with_session(&config, |controller, _| print_observed(controller, json))
        }
    }
}
