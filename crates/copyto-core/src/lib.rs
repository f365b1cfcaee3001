pub mod compare;
pub mod date;
pub mod error;
pub mod media;
pub mod scan;
pub mod sequence;
pub mod writer;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::date::tool::{Exiftool, DEFAULT_PROGRAM};
use crate::date::{Resolved, Resolver, Stage, Zone};
use crate::error::{PlaceError, SourceError};
use crate::writer::{Placement, Placer};

pub use crate::compare::DEFAULT_CHUNK_SIZE;

#[derive(Debug, Clone)]
pub struct PlaceOptions {
    pub source: PathBuf,
    pub dest: PathBuf,
    /// Program run for files without usable embedded dates.
    pub tool: String,
    /// Buffer size for duplicate comparison.
    pub chunk_size: usize,
    /// Zone for destination paths and for naive dates reported by the tool.
    pub zone: Zone,
}

impl PlaceOptions {
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            tool: DEFAULT_PROGRAM.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            zone: Zone::Local,
        }
    }
}

/// Something worth telling the user about while placing files.
#[derive(Debug)]
pub enum Event<'a> {
    /// A timestamp source had nothing; the next one is tried.
    Fallthrough {
        source: &'a Path,
        stage: Stage,
        reason: &'a SourceError,
    },
    Resolved {
        source: &'a Path,
        resolved: &'a Resolved,
    },
    /// The candidate path holds different content.
    Collision { source: &'a Path, occupied: &'a Path },
    Duplicate { source: &'a Path, existing: &'a Path },
    Copied { source: &'a Path, dest: &'a Path },
    Failed { source: &'a Path, error: &'a PlaceError },
    Excluded { path: &'a Path },
    WalkError { error: &'a walkdir::Error },
}

/// Receives events as they happen. The sink may borrow from its caller.
pub type EventSink<'s> = dyn Fn(&Event<'_>) + Send + Sync + 's;

/// Default sink: forward events to `tracing`.
pub fn log_event(event: &Event<'_>) {
    match event {
        Event::Fallthrough { source, stage, reason } => {
            debug!(source = %source.display(), %stage, "{}", reason)
        }
        Event::Resolved { source, resolved } => debug!(
            source = %source.display(),
            stage = %resolved.stage,
            timestamp = %resolved.timestamp,
            "resolved to {}",
            resolved.relative.display()
        ),
        Event::Collision { source, occupied } => {
            debug!(source = %source.display(), "{} is taken, trying next name", occupied.display())
        }
        Event::Duplicate { source, existing } => {
            info!(source = %source.display(), "same content as {}", existing.display())
        }
        Event::Copied { source, dest } => info!(source = %source.display(), "copied to {}", dest.display()),
        Event::Failed { source, error } => warn!(source = %source.display(), "{}", error),
        Event::Excluded { path } => debug!("skipping {}", path.display()),
        Event::WalkError { error } => warn!("walk: {}", error),
    }
}

/// Counts for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub files_seen: u64,
    pub copied: u64,
    pub duplicates: u64,
    pub failed: u64,
    pub excluded: u64,
    pub walk_errors: u64,
}

/// Walk `options.source` and place every file under `options.dest`.
///
/// Per-file failures are reported through `events` and counted; they never
/// stop the walk.
pub fn process(options: &PlaceOptions, events: &EventSink<'_>) -> Summary {
    let resolver = Resolver::standard(Exiftool::new(options.tool.clone()), options.zone);
    process_with(options, resolver, events)
}

/// Like [`process`], with a caller-supplied resolver chain.
pub fn process_with(options: &PlaceOptions, resolver: Resolver, events: &EventSink<'_>) -> Summary {
    let placer = Placer::new(resolver, &options.dest, events).with_chunk_size(options.chunk_size);
    let mut summary = Summary::default();

    let scan = scan::walk_files(&options.source, events, |path| match placer.place(path) {
        Ok(Placement::Copied(_)) => summary.copied += 1,
        Ok(Placement::Duplicate(_)) => summary.duplicates += 1,
        Err(error) => {
            events(&Event::Failed { source: path, error: &error });
            summary.failed += 1;
        }
    });

    summary.files_seen = scan.visited;
    summary.excluded = scan.excluded;
    summary.walk_errors = scan.errors;
    summary
}
