pub mod exif;
pub mod mtime;
pub mod tool;

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, Utc};

use crate::error::{PlaceError, SourceError};
use crate::media::SourceFile;
use crate::{Event, EventSink};

use self::exif::{EmbeddedTags, ExifReader};
use self::mtime::ModifiedTime;
use self::tool::{Exiftool, ExternalTool};

/// Zone used to read naive wall-clock values and to lay out destination paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Zone {
    /// The machine's local time zone.
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl Zone {
    pub fn utc() -> Self {
        Zone::Fixed(Utc.fix())
    }

    /// Attach this zone to a wall-clock value. `None` when the value falls in
    /// a DST gap; the earlier reading is taken in a DST overlap.
    pub fn interpret(&self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            Zone::Local => naive.and_local_timezone(Local).earliest().map(|dt| dt.fixed_offset()),
            Zone::Fixed(offset) => naive.and_local_timezone(*offset).single(),
        }
    }

    /// The same instant, as seen from this zone.
    pub fn render(&self, ts: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        match self {
            Zone::Local => ts.with_timezone(&Local).fixed_offset(),
            Zone::Fixed(offset) => ts.with_timezone(offset),
        }
    }
}

/// Which link of the chain produced a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Embedded,
    ExternalTool,
    FileTime,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Embedded => "embedded metadata",
            Stage::ExternalTool => "external tool",
            Stage::FileTime => "file mtime",
        })
    }
}

/// One way of finding out when a file was captured.
pub trait TimestampSource {
    fn stage(&self) -> Stage;
    fn timestamp(&self, file: &SourceFile, zone: Zone) -> Result<DateTime<FixedOffset>, SourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// `YYYY/MM/DD/HHMMSS<ext>`, relative to the destination root.
    pub relative: PathBuf,
    pub timestamp: DateTime<FixedOffset>,
    pub stage: Stage,
}

/// Destination-relative path for a timestamp: `YYYY/MM/DD/HHMMSS<ext>` in `zone`.
///
/// The instant is converted, not its wall clock kept: an embedded
/// `10:00:00 +0900` lands on `010000` when `zone` is UTC.
pub fn relative_path(ts: &DateTime<FixedOffset>, ext: &OsStr, zone: Zone) -> PathBuf {
    let mut name = OsString::from(zone.render(ts).format("%Y/%m/%d/%H%M%S").to_string());
    name.push(ext);
    PathBuf::from(name)
}

/// Tries each timestamp source in order and stops at the first success.
pub struct Resolver {
    sources: Vec<Box<dyn TimestampSource>>,
    zone: Zone,
}

impl Resolver {
    pub fn new(sources: Vec<Box<dyn TimestampSource>>, zone: Zone) -> Self {
        Self { sources, zone }
    }

    /// Embedded tags, then `tool`, then the file's mtime.
    pub fn standard(tool: Exiftool, zone: Zone) -> Self {
        let sources: Vec<Box<dyn TimestampSource>> = vec![
            Box::new(EmbeddedTags::new(ExifReader)),
            Box::new(ExternalTool::new(tool)),
            Box::new(ModifiedTime),
        ];
        Self::new(sources, zone)
    }

    pub fn resolve(&self, file: &SourceFile, events: &EventSink<'_>) -> Result<Resolved, PlaceError> {
        let mut last_err = None;
        for source in &self.sources {
            match source.timestamp(file, self.zone) {
                Ok(timestamp) => {
                    let resolved = Resolved {
                        relative: relative_path(&timestamp, &file.extension, self.zone),
                        timestamp,
                        stage: source.stage(),
                    };
                    events(&Event::Resolved {
                        source: &file.path,
                        resolved: &resolved,
                    });
                    return Ok(resolved);
                }
                Err(reason) => {
                    events(&Event::Fallthrough {
                        source: &file.path,
                        stage: source.stage(),
                        reason: &reason,
                    });
                    last_err = Some(reason);
                }
            }
        }
        Err(PlaceError::Unresolved {
            path: file.path.clone(),
            reason: last_err.unwrap_or(SourceError::NoMatch),
        })
    }
}
