//! tubedrop CLI - upload the next finished video from a watch folder to YouTube.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tubedrop_lib::prelude::*;
use tubedrop_lib::{DEFAULT_CATEGORY_ID, DEFAULT_MAX_RETRIES};

mod commands;
mod display;
mod logging;

use commands::upload::RunOutcome;

#[derive(Parser)]
#[command(name = "tubedrop")]
#[command(about = "Upload the next finished video from a watch folder to YouTube", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory watched for new .mp4 files
    #[arg(long, default_value = "watchfolder")]
    watchfolder: PathBuf,

    /// OAuth client credentials (JSON)
    #[arg(long, default_value = "credentials.json")]
    credentials: PathBuf,

    /// Log file (appended to; nothing is logged to the console)
    #[arg(long, default_value = "uploader.log")]
    log_file: PathBuf,

    /// Visibility of the uploaded video (private, unlisted or public)
    #[arg(long, default_value = "private")]
    privacy: Privacy,

    /// YouTube category id
    #[arg(long, default_value_t = DEFAULT_CATEGORY_ID)]
    category: u32,

    /// Quiet mode (suppress progress output)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = logging::init(&cli.log_file)?;

    let root = WatchRoot::new(&cli.watchfolder);
    let options = UploadOptions {
        privacy: cli.privacy,
        category_id: cli.category,
        max_retries: DEFAULT_MAX_RETRIES,
    };
    let uploader = YouTubeUploader::with_defaults().context("Failed to create upload client")?;
    let driver = UploadDriver::new(root.clone(), uploader)
        .with_progress(display::upload_bar(cli.quiet))
        .with_options(options);
    let authorizer = InstalledFlow::new().context("Failed to create authorization client")?;

    let outcome = commands::upload::run_once(&root, &cli.credentials, &authorizer, &driver)
        .await
        .inspect_err(|e| tracing::error!(error = %format!("{e:#}"), "run failed"))?;

    match outcome {
        RunOutcome::Uploaded(report) if !cli.quiet => println!(
            "Uploaded {} ({} bytes): {}",
            report.path.display(),
            report.bytes,
            report.video.watch_url()
        ),
        _ => {}
    }

    Ok(())
}
