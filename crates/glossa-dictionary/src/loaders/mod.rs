use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glossa_core::dictionary::{Dictionary, DictionaryLoader};

use self::json::JsonLoader;

pub mod json;

/// Load every dictionary found at `paths`. A directory contributes its
/// supported files in name order. Unreadable files are logged and skipped.
pub fn load_paths(paths: &[PathBuf]) -> Vec<Arc<dyn Dictionary>> {
    let loader = JsonLoader;
    let formats = loader.supported_formats();

    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(files_in(path, &formats));
        } else {
            files.push(path.clone());
        }
    }

    let mut dictionaries: Vec<Arc<dyn Dictionary>> = Vec::with_capacity(files.len());
    for file in files {
        match loader.load_from_file(&file) {
            Ok(dictionary) => {
                tracing::info!("Loaded {} from {}", dictionary.id(), file.display());
                dictionaries.push(Arc::from(dictionary));
            }
            Err(e) => tracing::warn!("Skipping {}: {}", file.display(), e),
        }
    }
    dictionaries
}

fn files_in(dir: &Path, formats: &[String]) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot read dictionary directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| formats.iter().any(|f| f.eq_ignore_ascii_case(ext)))
        })
        .collect();
    files.sort();
    files
}
