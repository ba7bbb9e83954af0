//! Statement file discovery and decoding.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// List regular files directly under `dir`, in directory-listing order.
///
/// With `extension` set, only files with that extension (any case) are kept.
/// A directory that cannot be listed is fatal; a single entry that cannot be
/// inspected is skipped.
pub fn list_statement_files(dir: &Path, extension: Option<&str>) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|source| Error::InputDirectory {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();

        // Follows symlinks, so linked statement files are picked up too.
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                debug!(path = %path.display(), "skipping non-file entry");
                continue;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping entry");
                continue;
            }
        }

        if let Some(wanted) = extension {
            let wanted = wanted.trim_start_matches('.');
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted));
            if !matches {
                debug!(path = %path.display(), "skipping file with other extension");
                continue;
            }
        }

        files.push(path);
    }

    Ok(files)
}

/// Read a statement file as text.
///
/// UTF-8 is tried first; anything else is read as Latin-1, which maps every
/// byte to a character and so never fails.
pub fn read_statement_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| Error::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decode(bytes))
}

fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => match text.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => text,
        },
        Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
    }
}
