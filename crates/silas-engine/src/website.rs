//! # Website Model
//!
//! A website is a directory tree of org files:
//!
//! ```text
//! site/
//! ├── index.org          website index
//! ├── about.org          loose page        → /about
//! ├── images/            ignored, assets only
//! └── blog/              project           → /blog
//!     ├── index.org      project index
//!     └── first.org      project member    → /blog/first
//! ```
//!
//! Every file and project lives in an arena owned by [`Website`] and is
//! addressed by [`FileId`] / [`ProjectId`]. Children point at their
//! container with a plain [`ContainerId`], so the upward links used to
//! resolve relative paths never own anything.
//!
//! Loading happens in three phases: scan the directories, parse every file,
//! then assemble containers bottom-up. Identity checks run as each container
//! is assembled.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use relative_path::{RelativePath, RelativePathBuf};
use silas_syntax::tree::render::join_url;

use crate::error::LoadError;
use crate::io::{self, DirListing};
use crate::models::project::project_id;
use crate::models::{
    ContainerId, ExternalFile, ExternalRegistry, FileId, FileRole, Members, OrgFile, Project,
    ProjectId,
};

#[derive(Debug)]
pub struct Website {
    root: PathBuf,
    members: Members,
    files: Vec<OrgFile>,
    projects: Vec<Project>,
    pub(crate) resolutions: AtomicUsize,
}

impl Website {
    /// Scan, parse and assemble the website rooted at `root`.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, LoadError> {
        let root = io::canonical_root(root.as_ref())?;
        let listing = io::scan_site(&root)?;
        let parsed = ParsedDir::parse(listing)?;

        let mut assembly = Assembly::default();
        let members = assembly.members(parsed)?;
        assembly.adopt(ContainerId::Website, &members);

        log::info!(
            "Loaded {} files in {} projects from {}",
            assembly.files.len(),
            assembly.projects.len(),
            root.display()
        );
        Ok(Self {
            root,
            members,
            files: assembly.files,
            projects: assembly.projects,
            resolutions: AtomicUsize::new(0),
        })
    }

    /// Canonical path of the website directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index(&self) -> &OrgFile {
        self.file(self.members.index)
    }

    pub fn file(&self, id: FileId) -> &OrgFile {
        &self.files[id.0]
    }

    pub fn project(&self, id: ProjectId) -> &Project {
        &self.projects[id.0]
    }

    /// Every file, indexes included, in load order.
    pub fn files(&self) -> impl Iterator<Item = (FileId, &OrgFile)> {
        self.files
            .iter()
            .enumerate()
            .map(|(n, file)| (FileId(n), file))
    }

    pub fn projects(&self) -> impl Iterator<Item = (ProjectId, &Project)> {
        self.projects
            .iter()
            .enumerate()
            .map(|(n, project)| (ProjectId(n), project))
    }

    /// Look up a markup file by path.
    pub fn find_file(&self, path: &Path) -> Option<FileId> {
        let path = std::fs::canonicalize(path).ok()?;
        self.files()
            .find(|(_, file)| file.path() == path)
            .map(|(id, _)| id)
    }

    pub fn members(&self, container: ContainerId) -> &Members {
        match container {
            ContainerId::Website => &self.members,
            ContainerId::Project(id) => self.project(id).members(),
        }
    }

    pub fn container_dir(&self, container: ContainerId) -> &Path {
        match container {
            ContainerId::Website => &self.root,
            ContainerId::Project(id) => self.project(id).dir(),
        }
    }

    pub fn container_parent(&self, container: ContainerId) -> Option<ContainerId> {
        match container {
            ContainerId::Website => None,
            ContainerId::Project(id) => Some(self.project(id).parent()),
        }
    }

    pub fn container_index(&self, container: ContainerId) -> &OrgFile {
        self.file(self.members(container).index())
    }

    pub fn container_name(&self, container: ContainerId) -> String {
        match container {
            ContainerId::Website => self.index().title(),
            ContainerId::Project(id) => self.project(id).name(),
        }
    }

    /// External files registered by every container so far.
    pub fn external_files(&self) -> Vec<ExternalFile> {
        std::iter::once(&self.members)
            .chain(self.projects.iter().map(Project::members))
            .flat_map(|members| members.externals().files())
            .collect()
    }

    /// Base URL set by the website index's `#+URL:` line.
    pub fn base_url(&self) -> Option<&str> {
        self.index().preamble().url()
    }

    /// Number of link resolutions that touched the filesystem.
    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::Relaxed)
    }

    /// Path of a container's page below the output root.
    pub fn container_path(&self, container: ContainerId) -> RelativePathBuf {
        match container {
            ContainerId::Website => RelativePathBuf::new(),
            ContainerId::Project(id) => {
                let project = self.project(id);
                self.container_path(project.parent()).join(project.id())
            }
        }
    }

    /// Path of a file's page below the output root. An index file shares
    /// its container's page.
    pub fn file_path(&self, id: FileId) -> RelativePathBuf {
        let file = self.file(id);
        let container = self.container_path(file.container());
        match file.role() {
            FileRole::Index => container,
            FileRole::Page => container.join(file.id()),
        }
    }

    /// `path` joined onto `base`, or onto [`Website::base_url`] when no
    /// base is given.
    pub fn url(&self, path: &RelativePath, base: Option<&str>) -> String {
        let base = base.or(self.base_url()).unwrap_or_default();
        join_url(base, path.as_str())
    }

    pub fn file_url(&self, id: FileId, base: Option<&str>) -> String {
        self.url(&self.file_path(id), base)
    }

    pub fn container_url(&self, container: ContainerId, base: Option<&str>) -> String {
        self.url(&self.container_path(container), base)
    }

    pub fn external_url(&self, file: &ExternalFile, base: Option<&str>) -> String {
        self.url(file.site_path(), base)
    }
}

/// A scanned directory with every file parsed. Files do not depend on each
/// other, so this phase needs nothing from the rest of the website.
struct ParsedDir {
    dir: PathBuf,
    index: OrgFile,
    pages: Vec<OrgFile>,
    subdirs: Vec<ParsedDir>,
}

impl ParsedDir {
    fn parse(listing: DirListing) -> Result<Self, LoadError> {
        let DirListing {
            dir,
            index,
            pages,
            subdirs,
        } = listing;

        let index = index.ok_or_else(|| LoadError::MissingIndex { dir: dir.clone() })?;
        Ok(Self {
            index: OrgFile::load(index, FileRole::Index)?,
            pages: pages
                .into_iter()
                .map(|path| OrgFile::load(path, FileRole::Page))
                .collect::<Result<_, _>>()?,
            subdirs: subdirs
                .into_iter()
                .map(ParsedDir::parse)
                .collect::<Result<_, _>>()?,
            dir,
        })
    }
}

/// Arena under construction. Containers are assembled bottom-up, so the
/// parent of a file or project is only known once its container is done.
#[derive(Default)]
struct Assembly {
    files: Vec<OrgFile>,
    projects: Vec<Project>,
}

impl Assembly {
    fn members(&mut self, parsed: ParsedDir) -> Result<Members, LoadError> {
        let index = self.push_file(parsed.index);

        let mut ids = IdClaims::default();
        let mut files = BTreeMap::new();
        for file in parsed.pages {
            ids.claim(file.id(), file.path())?;
            let path = file.path().to_path_buf();
            files.insert(path, self.push_file(file));
        }

        let mut projects = BTreeMap::new();
        for subdir in parsed.subdirs {
            let dir = subdir.dir.clone();
            ids.claim(&project_id(&dir), &dir)?;

            let members = self.members(subdir)?;
            let id = ProjectId(self.projects.len());
            self.adopt(ContainerId::Project(id), &members);
            self.projects.push(Project::new(dir.clone(), members));
            projects.insert(dir, id);
        }

        Ok(Members {
            index,
            files,
            projects,
            externals: ExternalRegistry::default(),
        })
    }

    fn push_file(&mut self, file: OrgFile) -> FileId {
        self.files.push(file);
        FileId(self.files.len() - 1)
    }

    /// Point every member of `members` at `owner`.
    fn adopt(&mut self, owner: ContainerId, members: &Members) {
        for file in std::iter::once(members.index()).chain(members.files()) {
            self.files[file.0].set_container(owner);
        }
        for project in members.projects() {
            self.projects[project.0].set_parent(owner);
        }
    }
}

/// Ids handed out within one container. Files and sub-projects share the
/// namespace since both become a path segment.
#[derive(Default)]
struct IdClaims(HashMap<String, PathBuf>);

impl IdClaims {
    fn claim(&mut self, id: &str, path: &Path) -> Result<(), LoadError> {
        if let Some(first) = self.0.get(id) {
            return Err(LoadError::DuplicateId {
                id: id.to_string(),
                first: first.clone(),
                second: path.to_path_buf(),
            });
        }
        self.0.insert(id.to_string(), path.to_path_buf());
        Ok(())
    }
}
