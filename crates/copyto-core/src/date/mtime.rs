use chrono::{DateTime, FixedOffset, Utc};

use super::{Stage, TimestampSource, Zone};
use crate::error::SourceError;
use crate::media::SourceFile;

/// Last stage of the chain: the filesystem modification time. Fails only if
/// the file cannot be stat'ed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModifiedTime;

impl TimestampSource for ModifiedTime {
    fn stage(&self) -> Stage {
        Stage::FileTime
    }

    fn timestamp(&self, file: &SourceFile, _zone: Zone) -> Result<DateTime<FixedOffset>, SourceError> {
        let modified = file.modified().map_err(SourceError::Stat)?;
        Ok(DateTime::<Utc>::from(modified).fixed_offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;

    #[test]
    fn test_reads_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, b"x").unwrap();
        filetime::set_file_mtime(&path, FileTime::from_unix_time(1_600_000_000, 0)).unwrap();

        let ts = ModifiedTime.timestamp(&SourceFile::new(&path), Zone::utc()).unwrap();
        assert_eq!(ts.timestamp(), 1_600_000_000);
    }

    #[test]
    fn test_stat_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModifiedTime
            .timestamp(&SourceFile::new(dir.path().join("missing")), Zone::utc())
            .unwrap_err();
        assert!(matches!(err, SourceError::Stat(_)));
    }
}
