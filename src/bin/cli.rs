//! Export a Google Maps saved list from the command line

use anyhow::{Context, bail};
use clap::{ArgAction, Parser};
use places_export::browser::{BrowserSession, ConnectionOptions, LaunchOptions};
use places_export::extract::{ExportOptions, Termination};
use places_export::store::SnapshotStore;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "places-export")]
#[command(version)]
#[command(about = "Export a Google Maps saved list (names, links, coordinates) to JSON", long_about = None)]
struct Cli {
    /// Saved-list URL to open; without it the list open in the active tab is exported
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// WebSocket endpoint URL of a running browser to attach to
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// Persistent browser profile directory (use a signed-in profile to see saved lists)
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// Export options as JSON (budgets, intervals, selectors)
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Snapshot file to write
    #[arg(long, short = 'o', value_name = "FILE", default_value = "places-export.json")]
    output: PathBuf,

    /// Also print the exported places to stdout
    #[arg(long)]
    print: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn session(&self) -> anyhow::Result<BrowserSession> {
        if let Some(ws) = &self.ws_endpoint {
            return BrowserSession::connect(ConnectionOptions::new(ws.clone())).context("attaching to browser");
        }

        let mut launch = LaunchOptions::new().headless(!self.headed);
        if let Some(path) = &self.executable_path {
            launch = launch.chrome_path(path);
        }
        if let Some(dir) = &self.user_data_dir {
            launch = launch.user_data_dir(dir);
        }
        BrowserSession::launch(launch).context("launching browser")
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let options = match &cli.config {
        Some(path) => ExportOptions::from_file(path).with_context(|| format!("loading {}", path.display()))?,
        None => ExportOptions::default(),
    };

    if cli.url.is_none() && cli.ws_endpoint.is_none() {
        bail!("nothing to export: pass --url, or --ws-endpoint to use a browser that already shows the list");
    }

    let session = cli.session()?;
    let extraction = session.export(cli.url.as_deref(), &options).context("exporting saved list")?;

    match extraction.termination {
        Termination::ListExhausted => {}
        Termination::SafetyCap => log::warn!("Stopped at the safety cap of {}; raise safety_cap", options.safety_cap),
        Termination::SessionLost => log::warn!("Lost the list page; the export is incomplete"),
    }

    let store = SnapshotStore::new(&cli.output);
    let Some(snapshot) = store.save_run(extraction).with_context(|| format!("writing {}", cli.output.display()))?
    else {
        bail!("no places found; {} was left unchanged", cli.output.display());
    };

    if cli.print {
        println!("{}", serde_json::to_string_pretty(&snapshot.exported_places)?);
    }

    eprintln!(
        "Exported {} place(s) from \"{}\" to {}",
        snapshot.exported_places.len(),
        snapshot.list_name,
        cli.output.display()
    );
    Ok(())
}
