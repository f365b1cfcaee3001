use std::path::Path;
use std::process::Command;

use chrono::{DateTime, FixedOffset, NaiveDateTime};

use super::{Stage, TimestampSource, Zone};
use crate::error::SourceError;
use crate::media::SourceFile;

pub const DEFAULT_PROGRAM: &str = "exiftool";

/// Output labels carrying a usable date, in the order they are tried on each line.
const LABELS: [&str; 5] = [
    "Create Date",
    "Modify Date",
    "Track Create Date",
    "Track Modify Date",
    "Date/Time Original",
];

/// Something that can describe a file as `Label: Value` lines.
pub trait MetadataTool {
    fn describe(&self, path: &Path) -> Result<String, SourceError>;
}

/// Runs an exiftool-compatible program with the file as its only argument.
#[derive(Debug, Clone)]
pub struct Exiftool {
    program: String,
}

impl Exiftool {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }
}

impl Default for Exiftool {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl MetadataTool for Exiftool {
    fn describe(&self, path: &Path) -> Result<String, SourceError> {
        let output = Command::new(&self.program)
            .arg(path)
            .output()
            .map_err(|source| SourceError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(SourceError::ToolStatus {
                program: self.program.clone(),
                status: output.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Scan tool output for the first line that starts with a known label and
/// carries a parseable `YYYY:MM:DD HH:MM:SS` value.
///
/// Lines are visited in output order, so an early `Modify Date` line wins
/// over a later `Create Date` line.
pub fn find_timestamp(output: &str, zone: Zone) -> Result<DateTime<FixedOffset>, SourceError> {
    let mut last_err = None;
    for line in output.lines() {
        for label in LABELS {
            if !line.starts_with(label) {
                continue;
            }
            let Some((_, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            let naive = match NaiveDateTime::parse_from_str(value, "%Y:%m:%d %H:%M:%S") {
                Ok(naive) => naive,
                Err(source) => {
                    last_err = Some(SourceError::Parse {
                        value: value.to_string(),
                        source,
                    });
                    continue;
                }
            };
            match zone.interpret(naive) {
                Some(ts) => return Ok(ts),
                None => last_err = Some(SourceError::Nonexistent(value.to_string())),
            }
        }
    }
    Err(last_err.unwrap_or(SourceError::NoMatch))
}

/// Second stage of the chain: ask an external program.
///
/// Video containers record UTC; everything else is read as wall-clock time
/// in the configured zone.
#[derive(Debug, Default)]
pub struct ExternalTool<T = Exiftool> {
    tool: T,
}

impl<T: MetadataTool> ExternalTool<T> {
    pub fn new(tool: T) -> Self {
        Self { tool }
    }
}

impl<T: MetadataTool> TimestampSource for ExternalTool<T> {
    fn stage(&self) -> Stage {
        Stage::ExternalTool
    }

    fn timestamp(&self, file: &SourceFile, zone: Zone) -> Result<DateTime<FixedOffset>, SourceError> {
        let output = self.tool.describe(&file.path)?;
        let zone = if file.is_video() { Zone::utc() } else { zone };
        find_timestamp(&output, zone)
    }
}
