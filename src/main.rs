use clap::Parser;
use cobuy_api::RestApi;
use cobuy_core::{RecommendConfig, Recommender};
use cobuy_storage::ArtifactStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Item-to-item recommendation lookup service
#[derive(Parser, Debug)]
#[command(name = "cobuy")]
#[command(about = "Frequently-bought-together recommendations from precomputed tables", long_about = None)]
struct Args {
    /// Directory holding the similarity matrix, category maps and event log
    #[arg(short, long, default_value = "./models")]
    data_dir: PathBuf,

    /// Address to bind the HTTP API to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// HTTP API port
    #[arg(long, default_value_t = 8000)]
    http_port: u16,

    /// Default number of "bought together" items per request
    #[arg(long, default_value_t = cobuy_core::DEFAULT_TOP_N)]
    top_n: usize,

    /// Default minimum similarity for "bought together" items
    #[arg(long, default_value_t = cobuy_core::DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Size of the category fallback list
    #[arg(long, default_value_t = cobuy_core::DEFAULT_FALLBACK_LIMIT)]
    fallback_limit: usize,

    /// Save a model bundle into the data directory after loading
    #[arg(long)]
    write_bundle: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // try_init also routes `log` records (actix request logs) into tracing
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    anyhow::ensure!(
        args.threshold.is_finite(),
        "threshold must be a finite number, got {}",
        args.threshold
    );

    info!("Starting cobuy v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);

    let store = ArtifactStore::new(&args.data_dir);
    let model = store.load()?;
    if args.write_bundle {
        store.save_bundle(&model)?;
    }

    let config = RecommendConfig {
        top_n: args.top_n,
        threshold: args.threshold,
        fallback_limit: args.fallback_limit,
    };
    info!(
        "Defaults: top_n={} threshold={} fallback_limit={}",
        config.top_n, config.threshold, config.fallback_limit
    );
    let recommender = Arc::new(Recommender::new(Arc::new(model), config));

    let http_handle = spawn_http_server(recommender, args.host.clone(), args.http_port);

    info!("HTTP API: http://{}:{}/recommend", args.host, args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        joined = tokio::task::spawn_blocking(move || http_handle.join()) => {
            match joined? {
                Ok(Ok(())) => info!("HTTP server stopped"),
                Ok(Err(e)) => {
                    error!("HTTP server error: {}", e);
                    return Err(e.into());
                }
                Err(_) => anyhow::bail!("HTTP server thread panicked"),
            }
        }
    }

    info!("Shutting down...");
    Ok(())
}

/// Run the REST API on its own actix system thread. The handle yields the
/// server's exit status, including bind failures.
fn spawn_http_server(
    recommender: Arc<Recommender>,
    host: String,
    port: u16,
) -> std::thread::JoinHandle<std::io::Result<()>> {
    std::thread::spawn(move || {
        info!("Starting HTTP server on {}:{}", host, port);
        let sys = actix_web::rt::System::new();
        sys.block_on(RestApi::start(recommender, &host, port))
    })
}
