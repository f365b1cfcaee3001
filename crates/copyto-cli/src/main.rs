use std::path::PathBuf;

use anyhow::Context;
use chrono::FixedOffset;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use copyto_core::date::Zone;

/// Overrides the metadata program (default `exiftool`).
const TOOL_ENV: &str = "COPYTO_EXIFTOOL";
/// Fixed UTC offset such as `+09:00`, used instead of the local zone.
const OFFSET_ENV: &str = "COPYTO_UTC_OFFSET";

#[derive(Parser)]
#[command(
    name = "copyto",
    version,
    about = "Copy photos and videos into YYYY/MM/DD/HHMMSS files named by capture time, skipping duplicates"
)]
struct Cli {
    /// Directory to read media from (never modified)
    source: PathBuf,

    /// Destination root
    dest: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let t_total = std::time::Instant::now();

    let mut options = copyto_core::PlaceOptions::new(cli.source, cli.dest);
    if let Ok(tool) = std::env::var(TOOL_ENV) {
        options.tool = tool;
    }
    if let Ok(offset) = std::env::var(OFFSET_ENV) {
        let offset: FixedOffset = offset
            .parse()
            .with_context(|| format!("{} must look like +09:00, got {:?}", OFFSET_ENV, offset))?;
        options.zone = Zone::Fixed(offset);
    }

    let summary = copyto_core::process(&options, &copyto_core::log_event);

    eprintln!(
        "Done! {} files seen, {} copied, {} duplicates, {} failed, {} excluded ({:.2}s)",
        summary.files_seen,
        summary.copied,
        summary.duplicates,
        summary.failed,
        summary.excluded,
        t_total.elapsed().as_secs_f64()
    );
    if summary.walk_errors > 0 {
        eprintln!("{} entries could not be read", summary.walk_errors);
    }

    Ok(())
}
