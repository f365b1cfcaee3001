use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::media::dotted_extension;

/// Next candidate after `relative` turned out to be taken.
///
/// `120000.jpg` becomes `120000_1.jpg`, `120000_1.jpg` becomes
/// `120000_2.jpg`. Only the part before the first underscore survives, so a
/// name like `a_b_3.jpg` becomes `a_4.jpg`. Names produced by the resolver
/// never contain an underscore before the counter.
pub fn next_name(relative: &Path) -> PathBuf {
    let ext = dotted_extension(relative);
    let name = relative.file_name().map_or(&[][..], |n| n.as_encoded_bytes());
    let base = String::from_utf8_lossy(&name[..name.len() - ext.as_encoded_bytes().len()]);

    let parts: Vec<&str> = base.split('_').collect();
    let counter = match parts.as_slice() {
        [_, .., last] => last
            .parse::<u64>()
            .ok()
            .filter(|&n| n > 0)
            .and_then(|n| n.checked_add(1))
            .unwrap_or(1),
        _ => 1,
    };

    let mut new_name = OsString::from(format!("{}_{}", parts[0], counter));
    new_name.push(&ext);
    match relative.parent() {
        Some(dir) => dir.join(new_name),
        None => PathBuf::from(new_name),
    }
}
