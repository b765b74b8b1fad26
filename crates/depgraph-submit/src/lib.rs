#![doc = include_str!("../readme.md")]

use anyhow::Context;
use depgraph_model::Detector;
use std::path::PathBuf;

pub mod client;

/// Detector identity stamped into every snapshot.
pub fn detector() -> Detector {
    Detector {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        url: env!("CARGO_PKG_REPOSITORY").to_string(),
    }
}

/// Expands `<path>/<pattern>` into a list of files, sorted by path.
///
/// Zero matches is not an error; an invalid pattern or an unreadable match
/// is.
pub fn discover_files(path: &str, pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let full_pattern = format!("{}/{}", path.trim_end_matches('/'), pattern);
    let entries = glob::glob(&full_pattern)
        .with_context(|| format!("invalid file pattern: {}", full_pattern))?;

    let mut files = Vec::new();
    for entry in entries {
        files.push(entry?);
    }
    Ok(files)
}
