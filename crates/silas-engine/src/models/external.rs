use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use relative_path::{RelativePath, RelativePathBuf};

/// A non-markup file a page links to, copied verbatim into the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalFile {
    source: PathBuf,
    site_path: RelativePathBuf,
}

impl ExternalFile {
    /// Canonical path of the file in the website directory.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Path relative to the website root, which is also its path in the
    /// output directory.
    pub fn site_path(&self) -> &RelativePath {
        &self.site_path
    }
}

/// External files registered with one container, keyed by canonical path.
///
/// Registration happens while pages render, so the registry is shared
/// behind a lock and never hands out the same file twice.
#[derive(Debug, Default)]
pub struct ExternalRegistry {
    files: Mutex<BTreeMap<PathBuf, ExternalFile>>,
}

impl ExternalRegistry {
    /// Register `source` or return the entry registered earlier.
    pub fn register(&self, source: &Path, site_path: RelativePathBuf) -> ExternalFile {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files
            .entry(source.to_path_buf())
            .or_insert_with(|| {
                log::debug!("Registering external file {}", source.display());
                ExternalFile {
                    source: source.to_path_buf(),
                    site_path,
                }
            })
            .clone()
    }

    pub fn files(&self) -> Vec<ExternalFile> {
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_register_deduplicates_by_path() {
        // Given an empty registry
        let registry = ExternalRegistry::default();

        // When the same file is registered twice
        let first = registry.register(Path::new("/site/cat.png"), RelativePathBuf::from("cat.png"));
        let second =
            registry.register(Path::new("/site/cat.png"), RelativePathBuf::from("cat.png"));

        // Then it is only held once
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.files()[0].site_path(), RelativePath::new("cat.png"));
    }
}
