//! Mount listing helpers.
//!
//! `walk_tree` visits a directory top-down: for every directory it reports the
//! files first, then the subdirectories, and only then descends into each
//! subdirectory. Entries keep the order the filesystem returns them in.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};
use walkdir::WalkDir;

/// One entry of a filesystem snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Names of the immediate children of `root`, unsorted.
pub fn list_dir<P: AsRef<Path>>(root: P) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(root.as_ref())? {
        let entry = entry?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Recursive snapshot of everything below `root`.
///
/// Unreadable directories are skipped, so a missing root gives an empty
/// snapshot. Symlinks pointing at directories are reported as directories
/// but never followed.
pub fn walk_tree<P: AsRef<Path>>(root: P) -> Vec<TreeEntry> {
    let mut out = Vec::new();
    walk_level(root.as_ref(), &mut out);
    out
}

fn walk_level(dir: &Path, out: &mut Vec<TreeEntry>) {
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    let mut descend = Vec::new();

    for entry_result in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
    {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry under {}: {err}", dir.display());
                // the directory itself could not be opened
                if err.depth() == 0 {
                    return;
                }
                continue;
            }
        };

        let path = entry.path().to_path_buf();
        if entry.file_type().is_dir() {
            descend.push(path.clone());
            dirs.push(path);
        } else if entry.path_is_symlink() && path.is_dir() {
            debug!("not following directory symlink {}", path.display());
            dirs.push(path);
        } else {
            files.push(path);
        }
    }

    out.extend(files.into_iter().map(|path| TreeEntry {
        path,
        is_dir: false,
    }));
    out.extend(dirs.into_iter().map(|path| TreeEntry { path, is_dir: true }));

    for sub in descend {
        walk_level(&sub, out);
    }
}
