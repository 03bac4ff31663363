use crate::config;
use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

/// Create a directory (and all parents) if it doesn't exist, and return the path.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> io::Result<PathBuf> {
    let p = path.as_ref();
    fs::create_dir_all(p)?;
    Ok(p.to_path_buf())
}

/// Legacy attachment storage root (absolute), from `config::storage_root()`.
/// If relative in env, resolve against current_dir().
pub fn storage_root() -> PathBuf {
    let root = config::storage_root();
    let p = PathBuf::from(root);
    if p.is_absolute() {
        p
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(p)
    }
}

/// Storage key for a comment attachment: `files/issue_{issue_id}/event_{event_id}/{filename}`.
///
/// Only the last path component of `filename` is kept.
pub fn attachment_key(issue_id: i64, event_id: i64, filename: &str) -> String {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("attachment");
    format!("files/issue_{issue_id}/event_{event_id}/{name}")
}

/// Keys for every attachment of one event, in upload order.
///
/// Names that land on an already used key get a numeric suffix before the
/// extension (`main.py`, `main_1.py`, `main_2.py`).
pub fn attachment_keys<'a>(
    issue_id: i64,
    event_id: i64,
    filenames: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let mut taken = HashSet::new();
    filenames
        .into_iter()
        .map(|filename| {
            let base = attachment_key(issue_id, event_id, filename);
            let mut key = base.clone();
            let mut n = 1;
            while !taken.insert(key.clone()) {
                key = numbered(&base, n);
                n += 1;
            }
            key
        })
        .collect()
}

fn numbered(key: &str, n: usize) -> String {
    let (dir, name) = key.rsplit_once('/').unwrap_or(("", key));
    let name = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{n}.{ext}"),
        _ => format!("{name}_{n}"),
    };
    if dir.is_empty() {
        name
    } else {
        format!("{dir}/{name}")
    }
}
