use std::ffi::OsStr;
use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::media::dotted_extension;
use crate::{Event, EventSink};

/// Directories with this extension are skipped along with everything below.
const PRUNED_EXTENSION: &str = ".thumbnails";
/// Files with this extension are skipped.
const IGNORED_EXTENSION: &str = ".DS_Store";

/// Outcome of walking the source tree.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Files handed to the visitor.
    pub visited: u64,
    /// Entries left out by the exclusion rules.
    pub excluded: u64,
    /// Entries that could not be read.
    pub errors: u64,
}

fn is_pruned(path: &Path) -> bool {
    dotted_extension(path).as_os_str() == OsStr::new(PRUNED_EXTENSION)
}

fn is_ignored(path: &Path) -> bool {
    dotted_extension(path).as_os_str() == OsStr::new(IGNORED_EXTENSION)
}

/// Call `visit` for every regular file under `root`, in sorted order, after
/// applying the exclusion rules. Unreadable entries are reported and skipped.
///
/// Symlinks are not descended into. A link to a regular file is visited like
/// the file itself; any other link is excluded.
pub fn walk_files(root: &Path, events: &EventSink<'_>, mut visit: impl FnMut(&Path)) -> ScanResult {
    let mut result = ScanResult::default();

    let mut excluded = 0u64;
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry: &DirEntry| {
            // The root itself is never pruned.
            if entry.depth() > 0 && is_pruned(entry.path()) {
                events(&Event::Excluded { path: entry.path() });
                excluded += 1;
                return false;
            }
            true
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                events(&Event::WalkError { error: &e });
                result.errors += 1;
                continue;
            }
        };
        if entry.path_is_symlink() {
            if !entry.path().is_file() {
                events(&Event::Excluded { path: entry.path() });
                result.excluded += 1;
                continue;
            }
        } else if !entry.file_type().is_file() {
            continue;
        }
        if is_ignored(entry.path()) {
            events(&Event::Excluded { path: entry.path() });
            result.excluded += 1;
            continue;
        }
        visit(entry.path());
        result.visited += 1;
    }

    result.excluded += excluded;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn quiet(_: &Event<'_>) {}

    #[test]
    fn test_exclusion_rules() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("trip/.thumbnails/deep")).unwrap();
        fs::create_dir_all(root.join("cache.thumbnails")).unwrap();
        fs::write(root.join("trip/a.jpg"), b"a").unwrap();
        fs::write(root.join("trip/.DS_Store"), b"").unwrap();
        fs::write(root.join("trip/.thumbnails/t.jpg"), b"t").unwrap();
        fs::write(root.join("trip/.thumbnails/deep/u.jpg"), b"u").unwrap();
        fs::write(root.join("cache.thumbnails/v.jpg"), b"v").unwrap();
        fs::write(root.join("b.MP4"), b"b").unwrap();

        let mut visited = Vec::new();
        let result = walk_files(root, &quiet, |p| visited.push(p.strip_prefix(root).unwrap().to_path_buf()));

        assert_eq!(visited, vec![PathBuf::from("b.MP4"), PathBuf::from("trip/a.jpg")]);
        assert_eq!(result.visited, 2);
        assert_eq!(result.excluded, 3);
        assert_eq!(result.errors, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_visited() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("src");
        let other = dir.path().join("other");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(other.join("album")).unwrap();
        fs::write(other.join("real.jpg"), b"r").unwrap();
        fs::write(other.join("album/inside.jpg"), b"i").unwrap();
        symlink("../other/real.jpg", root.join("link.jpg")).unwrap();
        symlink("../other/album", root.join("album")).unwrap();
        symlink("../other/gone.jpg", root.join("dangling.jpg")).unwrap();

        let mut visited = Vec::new();
        let result = walk_files(&root, &quiet, |p| visited.push(p.strip_prefix(&root).unwrap().to_path_buf()));

        assert_eq!(visited, vec![PathBuf::from("link.jpg")]);
        assert_eq!(result.visited, 1);
        assert_eq!(result.excluded, 2);
        assert_eq!(result.errors, 0);
    }

    #[test]
    fn test_missing_root_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let result = walk_files(&dir.path().join("nope"), &quiet, |_| panic!("no files expected"));
        assert_eq!(result.visited, 0);
        assert_eq!(result.errors, 1);
    }
}
