//! Places-export MCP Server
//!
//! Exposes the saved-list export to MCP clients. One browser session is shared by
//! every connection; the last export is kept in a snapshot file.

use clap::{ArgAction, Parser, ValueEnum};
use places_export::browser::{BrowserSession, ConnectionOptions, LaunchOptions};
use places_export::extract::ExportOptions;
use places_export::mcp::PlacesServer;
use places_export::store::SnapshotStore;
use rmcp::{ServiceExt, transport::stdio};
use rmcp::transport::streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    /// Standard input/output transport (default)
    Stdio,
    /// HTTP streamable transport
    Http,
}

#[derive(Parser)]
#[command(name = "places-export-mcp")]
#[command(version)]
#[command(about = "Google Maps saved-list export MCP server", long_about = None)]
struct Cli {
    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// WebSocket endpoint URL for remote browser connection
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Persistent browser profile directory (use a signed-in profile to see saved lists)
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// Export options as JSON (budgets, intervals, selectors)
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where the last export is stored
    #[arg(long, value_name = "FILE", default_value = "places-export.json")]
    snapshot: PathBuf,

    /// Transport type to use
    #[arg(long, short = 't', value_enum, default_value = "stdio")]
    transport: Transport,

    /// Port for HTTP transport (default: 3000)
    #[arg(long, short = 'p', default_value = "3000")]
    port: u16,

    /// HTTP streamable endpoint path (default: /mcp)
    #[arg(long, default_value = "/mcp")]
    http_path: String,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    // stdout belongs to the stdio transport
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn open_session(cli: &Cli) -> places_export::Result<BrowserSession> {
    if let Some(ws) = &cli.ws_endpoint {
        return BrowserSession::connect(ConnectionOptions::new(ws.clone()));
    }

    let mut launch = LaunchOptions::new().headless(!cli.headed);
    if let Some(path) = &cli.executable_path {
        launch = launch.chrome_path(path);
    }
    if let Some(dir) = &cli.user_data_dir {
        launch = launch.user_data_dir(dir);
    }
    BrowserSession::launch(launch)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = match &cli.config {
        Some(path) => ExportOptions::from_file(path)?,
        None => ExportOptions::default(),
    };

    log::info!("Places-export MCP Server v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Snapshot file: {}", cli.snapshot.display());

    let session = open_session(&cli).map_err(|e| format!("Failed to start browser: {}", e))?;
    let server = PlacesServer::new(session, options, SnapshotStore::new(cli.snapshot.clone()));

    match cli.transport {
        Transport::Stdio => {
            log::info!("Ready to accept MCP connections via stdio");
            let running = server.serve(stdio()).await?;
            let quit_reason = running.waiting().await?;
            log::info!("Server quit with reason: {:?}", quit_reason);
        }
        Transport::Http => {
            let bind_addr = format!("127.0.0.1:{}", cli.port);

            let service_factory = move || Ok::<_, std::io::Error>(server.clone());
            let http_service =
                StreamableHttpService::new(service_factory, LocalSessionManager::default().into(), Default::default());

            let router = axum::Router::new().nest_service(&cli.http_path, http_service);

            log::info!("Ready to accept MCP connections at http://{}{}", bind_addr, cli.http_path);

            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}
