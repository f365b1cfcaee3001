use std::cmp::Ordering;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::compare::{compare, DEFAULT_CHUNK_SIZE};
use crate::date::{Resolved, Resolver};
use crate::error::PlaceError;
use crate::media::SourceFile;
use crate::sequence::next_name;
use crate::{Event, EventSink};

/// What happened to one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Copied to this destination path.
    Copied(PathBuf),
    /// Identical content already sits at this destination path.
    Duplicate(PathBuf),
}

/// Copies single files into the destination tree.
pub struct Placer<'a> {
    resolver: Resolver,
    dest_root: PathBuf,
    chunk_size: usize,
    events: &'a EventSink<'a>,
}

impl<'a> Placer<'a> {
    pub fn new(resolver: Resolver, dest_root: impl Into<PathBuf>, events: &'a EventSink<'a>) -> Self {
        Self {
            resolver,
            dest_root: dest_root.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            events,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Place `source` under the destination root, at most once.
    ///
    /// The destination is opened with create-new semantics, so an existing
    /// file is never overwritten. When the candidate path is taken, the
    /// occupant is compared byte for byte: identical content ends the
    /// placement, anything else moves on to the next sequenced name.
    pub fn place(&self, source: &Path) -> Result<Placement, PlaceError> {
        let file = SourceFile::new(source);
        let Resolved {
            mut relative,
            timestamp,
            ..
        } = self.resolver.resolve(&file, self.events)?;

        let first = self.dest_root.join(&relative);
        if let Some(dir) = first.parent() {
            fs::create_dir_all(dir).map_err(|e| PlaceError::CreateDir {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        let (dest, out) = loop {
            let dest = self.dest_root.join(&relative);
            match OpenOptions::new().write(true).create_new(true).open(&dest) {
                Ok(out) => break (dest, out),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if self.same_content(source, &dest)? {
                        (self.events)(&Event::Duplicate {
                            source,
                            existing: &dest,
                        });
                        return Ok(Placement::Duplicate(dest));
                    }
                    (self.events)(&Event::Collision {
                        source,
                        occupied: &dest,
                    });
                    relative = next_name(&relative);
                }
                Err(e) => return Err(PlaceError::Copy { path: dest, source: e }),
            }
        };

        if let Err(e) = copy_into(source, out) {
            // Leave nothing half-written behind to be mistaken for a collision.
            let _ = fs::remove_file(&dest);
            return Err(PlaceError::Copy { path: dest, source: e });
        }

        let ft = FileTime::from_unix_time(timestamp.timestamp(), timestamp.timestamp_subsec_nanos());
        copy_attributes(&dest, fs::metadata(source).map(|m| m.permissions()), ft)?;

        (self.events)(&Event::Copied { source, dest: &dest });
        Ok(Placement::Copied(dest))
    }

    /// Byte comparison of the source with whatever occupies `dest`. Both
    /// handles are closed on return.
    fn same_content(&self, source: &Path, dest: &Path) -> Result<bool, PlaceError> {
        let ordering = File::open(source)
            .and_then(|a| Ok((a, File::open(dest)?)))
            .and_then(|(a, b)| compare(BufReader::new(a), BufReader::new(b), self.chunk_size))
            .map_err(|e| PlaceError::Compare {
                path: dest.to_path_buf(),
                source: e,
            })?;
        Ok(ordering == Ordering::Equal)
    }
}

/// Apply the source's permissions and the resolved times to `dest`. The times
/// are set even when the permissions could not be; the first failure wins.
fn copy_attributes(dest: &Path, permissions: io::Result<fs::Permissions>, ft: FileTime) -> Result<(), PlaceError> {
    let permissions = permissions.and_then(|p| fs::set_permissions(dest, p));
    let times = filetime::set_file_times(dest, ft, ft);
    permissions.map_err(|e| PlaceError::Permissions {
        path: dest.to_path_buf(),
        source: e,
    })?;
    times.map_err(|e| PlaceError::SetTimes {
        path: dest.to_path_buf(),
        source: e,
    })
}

fn copy_into(source: &Path, out: File) -> io::Result<()> {
    let mut input = File::open(source)?;
    let mut out = BufWriter::new(out);
    io::copy(&mut input, &mut out)?;
    out.flush()
}
