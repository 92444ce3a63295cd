// src/notebook/discover.rs
// =============================================================================
// Finds the notebooks to scan.
//
// Each path given on the command line is either:
// - a file: used as-is (whatever its extension)
// - a directory: walked recursively for *.ipynb files
//
// Hidden directories (.git, .ipynb_checkpoints, ...) are skipped so we don't
// scan Jupyter's autosave copies. The result is sorted and deduplicated so
// repeated runs check notebooks in the same order.
// =============================================================================

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

pub fn find_notebooks(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut found = BTreeSet::new();

    for path in paths {
        if path.is_file() {
            found.insert(path.clone());
        } else if path.is_dir() {
            walk_directory(path, &mut found);
        } else {
            warn!(path = %path.display(), "path does not exist, skipping");
        }
    }

    found.into_iter().collect()
}

fn walk_directory(root: &Path, found: &mut BTreeSet<PathBuf>) {
    let walker = WalkDir::new(root)
        .into_iter()
        // depth 0 is the root itself, which the user asked for explicitly
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_notebook(entry.path()) => {
                found.insert(entry.into_path());
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "error while walking directory"),
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_notebook(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "ipynb")
}
