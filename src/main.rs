use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xkcd_archive::archive::{self, ArchiveOptions};
use xkcd_archive::{config, output, source::XkcdClient};

#[derive(Parser)]
#[command(name = "xkcd-archive")]
#[command(about = "Download xkcd comics into a browsable local archive")]
#[command(long_about = "\
Download xkcd comics into a browsable local archive

Every comic is stored in its own directory with the API's metadata and the
image (high resolution when available). Comics already archived are read
from disk instead of downloaded, so re-running resumes where the last run
stopped.

Output structure:

  OUTPUT/
  ├── index.html          # List of archived comics, newest first
  ├── styles.css
  ├── favicon.ico
  ├── 1/
  │   ├── index.html      # Comic page with navigation
  │   ├── info.json       # Metadata, img rewritten to the local file
  │   └── barrel_cropped_(1).jpg
  └── ...

Set RUST_LOG=xkcd_archive=debug to log every request and cache decision.")]
#[command(version = env!("XKCD_ARCHIVE_VERSION"))]
struct Cli {
    /// Output directory
    output: PathBuf,

    /// Delete the output directory before archiving
    #[arg(long)]
    empty: bool,

    /// Only fetch and cache comics, do not generate HTML
    #[arg(long)]
    skip_html: bool,

    /// First comic to archive
    #[arg(short, long, default_value_t = 1)]
    from: u32,

    /// Last comic to archive (default: latest)
    #[arg(short, long)]
    to: Option<u32>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xkcd_archive=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let site_config = config::load_config(cli.config.as_deref())?;
    let options = ArchiveOptions {
        from: Some(cli.from),
        to: cli.to,
        empty: cli.empty,
        skip_html: cli.skip_html,
    };
    let client = XkcdClient::http();

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_archive_event(&event) {
                println!("{}", line);
            }
        }
    });

    let result = archive::run(&cli.output, &options, &client, &site_config, Some(tx));
    // The sender is gone once run returns; drain whatever is left first.
    let _ = printer.join();

    let result = result?;
    output::print_summary(&result, &cli.output);
    Ok(())
}
