use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use silas_syntax::tree::{slugify, titlecase};

use super::{ContainerId, ExternalRegistry, FileId, ProjectId};

/// What a container owns: its index, member files, sub-projects and the
/// external files its pages link to.
#[derive(Debug)]
pub struct Members {
    pub(crate) index: FileId,
    pub(crate) files: BTreeMap<PathBuf, FileId>,
    pub(crate) projects: BTreeMap<PathBuf, ProjectId>,
    pub(crate) externals: ExternalRegistry,
}

impl Members {
    pub fn index(&self) -> FileId {
        self.index
    }

    /// Member files in path order, index excluded.
    pub fn files(&self) -> impl Iterator<Item = FileId> + '_ {
        self.files.values().copied()
    }

    /// Sub-projects in path order.
    pub fn projects(&self) -> impl Iterator<Item = ProjectId> + '_ {
        self.projects.values().copied()
    }

    pub fn externals(&self) -> &ExternalRegistry {
        &self.externals
    }

    /// Sub-project whose directory holds `path`.
    pub(crate) fn project_owning(&self, path: &Path) -> Option<ProjectId> {
        self.projects
            .iter()
            .find_map(|(dir, &id)| path.starts_with(dir).then_some(id))
    }
}

/// A directory below the website root, with its own index file.
#[derive(Debug)]
pub struct Project {
    id: String,
    dir: PathBuf,
    parent: ContainerId,
    members: Members,
}

impl Project {
    pub(crate) fn new(dir: PathBuf, members: Members) -> Self {
        Self {
            id: project_id(&dir),
            dir,
            parent: ContainerId::Website,
            members,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: ContainerId) {
        self.parent = parent;
    }

    /// Slug of the directory name, unique within the parent.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> String {
        titlecase(&self.id)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn parent(&self) -> ContainerId {
        self.parent
    }

    pub fn members(&self) -> &Members {
        &self.members
    }
}

pub(crate) fn project_id(dir: &Path) -> String {
    dir.file_name()
        .map(|name| slugify(&name.to_string_lossy()))
        .unwrap_or_default()
}
