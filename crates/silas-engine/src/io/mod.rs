use std::fs;
use std::path::{Path, PathBuf};

/// Name of the file that describes a directory's container.
pub const INDEX_FILE: &str = "index.org";
/// Extension of markup files.
pub const MARKUP_EXTENSION: &str = "org";
/// Directories that hold assets rather than a project.
pub const IGNORED_DIRECTORIES: &[&str] = &["images"];
/// Markup files that are never published.
pub const IGNORED_FILES: &[&str] = &["ideas.org"];

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid website directory: {}", .0.display())]
    InvalidRoot(PathBuf),
}

impl IoError {
    fn at(path: &Path) -> impl FnOnce(std::io::Error) -> IoError + '_ {
        move |source| IoError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// One directory of the website, with the markup files it holds and the
/// directories below it. Paths are absolute and sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    pub dir: PathBuf,
    pub index: Option<PathBuf>,
    pub pages: Vec<PathBuf>,
    pub subdirs: Vec<DirListing>,
}

/// Read a markup file and return its content
pub fn read_file(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::at(path))
}

/// Write content to a file, creating parent directories as needed
pub fn write_file(path: &Path, content: &str) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(IoError::at(parent))?;
    }
    fs::write(path, content).map_err(IoError::at(path))
}

/// Copy a file, creating parent directories of `to` as needed
pub fn copy_file(from: &Path, to: &Path) -> Result<(), IoError> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(IoError::at(parent))?;
    }
    fs::copy(from, to).map_err(IoError::at(from))?;
    Ok(())
}

/// Check that `path` is a directory and return its canonical form.
pub fn canonical_root(path: &Path) -> Result<PathBuf, IoError> {
    if !path.is_dir() {
        return Err(IoError::InvalidRoot(path.to_path_buf()));
    }
    fs::canonicalize(path).map_err(IoError::at(path))
}

pub fn is_markup(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == MARKUP_EXTENSION)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Scan the website rooted at `root` into a tree of directory listings.
pub fn scan_site(root: &Path) -> Result<DirListing, IoError> {
    if !root.is_dir() {
        return Err(IoError::InvalidRoot(root.to_path_buf()));
    }
    scan_directory(root)
}

fn scan_directory(dir: &Path) -> Result<DirListing, IoError> {
    let mut paths = fs::read_dir(dir)
        .map_err(IoError::at(dir))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(IoError::at(dir))?;
    paths.sort();

    let mut listing = DirListing {
        dir: dir.to_path_buf(),
        index: None,
        pages: Vec::new(),
        subdirs: Vec::new(),
    };

    for path in paths {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            log::warn!("Skipping {}: name is not UTF-8", path.display());
            continue;
        };
        if is_hidden(name) {
            continue;
        }

        if path.is_dir() {
            if IGNORED_DIRECTORIES.contains(&name) {
                log::debug!("Ignoring directory {}", path.display());
            } else {
                listing.subdirs.push(scan_directory(&path)?);
            }
        } else if is_markup(&path) {
            if name == INDEX_FILE {
                listing.index = Some(path);
            } else if IGNORED_FILES.contains(&name) {
                log::debug!("Ignoring {}", path.display());
            } else {
                listing.pages.push(path);
            }
        }
    }

    Ok(listing)
}
