/// Entry filtering for the directory walk.
///
/// Both sets are built once before traversal and then shared read-only by
/// every worker through an `Arc<Filters>`, so no synchronization is needed to
/// consult them.
use std::collections::HashSet;
use std::path::Path;

use crate::config::SearchConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    ignored_dir_names: HashSet<String>,
    ignored_extensions: HashSet<String>,
}

impl Filters {
    pub fn new<D, E>(ignored_dir_names: D, ignored_extensions: E) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            ignored_dir_names: ignored_dir_names
                .into_iter()
                .map(|name| name.as_ref().trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
            ignored_extensions: ignored_extensions
                .into_iter()
                .filter_map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(&config.ignored_dirs, &config.ignored_extensions)
    }

    /// Whether a directory with this entry name should be skipped, subtree included
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignored_dir_names.contains(name)
    }

    /// Whether a file should be skipped because of its extension
    pub fn is_ignored_file(&self, path: &Path) -> bool {
        if self.ignored_extensions.is_empty() {
            return false;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.ignored_extensions.contains(ext))
    }
}

/// `".rs"`, `"rs"` and `" rs "` all mean the same extension
fn normalize_extension(raw: &str) -> Option<String> {
    let ext = raw.trim();
    let ext = ext.strip_prefix('.').unwrap_or(ext);
    (!ext.is_empty()).then(|| ext.to_string())
}
