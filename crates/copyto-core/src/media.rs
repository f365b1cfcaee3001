use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A file found under the source root. Never written to.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Extension including the leading dot, exactly as it appears in the name
    /// (empty when the name has no dot).
    pub extension: OsString,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let extension = dotted_extension(&path);
        Self { path, extension }
    }

    /// Filesystem modification time.
    pub fn modified(&self) -> io::Result<SystemTime> {
        fs::metadata(&self.path)?.modified()
    }

    /// Whether the extension maps to a video MIME type (`.mp4`, `.mov`, ...).
    pub fn is_video(&self) -> bool {
        mime_guess::from_path(&self.path)
            .first()
            .map_or(false, |mime| mime.type_() == mime_guess::mime::VIDEO)
    }
}

/// Suffix of the file name starting at its last dot.
///
/// Unlike [`Path::extension`], a dotfile counts as all extension:
/// `.DS_Store` yields `.DS_Store` and `a/.thumbnails` yields `.thumbnails`.
/// Names need not be valid UTF-8.
pub fn dotted_extension(path: &Path) -> OsString {
    let Some(name) = path.file_name() else {
        return OsString::new();
    };
    match path.extension() {
        Some(ext) => {
            let mut dotted = OsString::from(".");
            dotted.push(ext);
            dotted
        }
        // `Path::extension` has nothing for a dotfile without a second dot.
        None if name.as_encoded_bytes().starts_with(b".") => name.to_os_string(),
        None => OsString::new(),
    }
}
