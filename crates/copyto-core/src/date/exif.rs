use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;

use chrono::{DateTime, FixedOffset};
use exif::{In, Reader, Tag, Value};

use super::{Stage, TimestampSource, Zone};
use crate::error::SourceError;
use crate::media::SourceFile;

/// Tag name -> value, as read from a file's embedded metadata.
pub type TagTable = HashMap<String, String>;

/// Wall-clock tags, in lookup order. Cameras that write these are assumed to
/// run on Japan time.
const CLOCK_TAGS: [&str; 3] = [
    "Date and Time",
    "Date and Time (Digitized)",
    "Date and Time (Original)",
];
const CLOCK_OFFSET: &str = "+0900";

const GPS_DATE: &str = "GPS Date";
const GPS_TIME: &str = "GPS Time (Atomic Clock)";
const GPS_OFFSET: &str = "+0000";

const NAMED_TAGS: [(Tag, &str); 5] = [
    (Tag::DateTime, "Date and Time"),
    (Tag::DateTimeDigitized, "Date and Time (Digitized)"),
    (Tag::DateTimeOriginal, "Date and Time (Original)"),
    (Tag::GPSDateStamp, GPS_DATE),
    (Tag::GPSTimeStamp, GPS_TIME),
];

/// Produces the tag table for a file.
pub trait TagReader {
    fn read_tags(&self, file: &SourceFile) -> Result<TagTable, SourceError>;
}

/// Reads EXIF from the file container (JPEG, TIFF, HEIF, PNG, WebP).
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifReader;

impl TagReader for ExifReader {
    fn read_tags(&self, file: &SourceFile) -> Result<TagTable, SourceError> {
        let f = File::open(&file.path).map_err(SourceError::Open)?;
        let data = Reader::new().read_from_container(&mut BufReader::new(f))?;

        let mut table = TagTable::new();
        for field in data.fields().filter(|f| f.ifd_num == In::PRIMARY) {
            let name = NAMED_TAGS
                .iter()
                .find(|(tag, _)| *tag == field.tag)
                .map_or_else(|| field.tag.to_string(), |(_, name)| name.to_string());
            let value = match &field.value {
                Value::Ascii(parts) => parts
                    .first()
                    .map(|b| String::from_utf8_lossy(b).trim_end_matches('\0').trim().to_string())
                    .unwrap_or_default(),
                Value::Rational(parts) if field.tag == Tag::GPSTimeStamp && parts.len() == 3 => {
                    format!(
                        "{:02}:{:02}:{:05.2}",
                        parts[0].to_f64() as u32,
                        parts[1].to_f64() as u32,
                        parts[2].to_f64()
                    )
                }
                _ => field.display_value().with_unit(&data).to_string(),
            };
            table.entry(name).or_insert(value);
        }
        Ok(table)
    }
}

/// Pick the timestamp string (with its offset appended) from a tag table.
pub fn stamp_from_tags(tags: &TagTable) -> Option<String> {
    for name in CLOCK_TAGS {
        if let Some(value) = tags.get(name) {
            return Some(format!("{} {}", value, CLOCK_OFFSET));
        }
    }
    match (tags.get(GPS_DATE), tags.get(GPS_TIME)) {
        (Some(date), Some(time)) => Some(format!("{} {} {}", date, time, GPS_OFFSET)),
        _ => None,
    }
}

/// Parse `YYYY:MM:DD HH:MM:SS[.fff] ±ZZZZ`.
pub fn parse_stamp(stamp: &str) -> Result<DateTime<FixedOffset>, SourceError> {
    DateTime::parse_from_str(stamp, "%Y:%m:%d %H:%M:%S%.f %z").map_err(|source| SourceError::Parse {
        value: stamp.to_string(),
        source,
    })
}

/// First stage of the chain: dates recorded inside the file.
#[derive(Debug, Default)]
pub struct EmbeddedTags<R = ExifReader> {
    reader: R,
}

impl<R: TagReader> EmbeddedTags<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: TagReader> TimestampSource for EmbeddedTags<R> {
    fn stage(&self) -> Stage {
        Stage::Embedded
    }

    fn timestamp(&self, file: &SourceFile, _zone: Zone) -> Result<DateTime<FixedOffset>, SourceError> {
        let tags = self.reader.read_tags(file)?;
        let stamp = stamp_from_tags(&tags).ok_or(SourceError::NoTags)?;
        parse_stamp(&stamp)
    }
}
