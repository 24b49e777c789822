pub mod external;
pub mod org_file;
pub mod project;

pub use external::{ExternalFile, ExternalRegistry};
pub use org_file::{FileRole, OrgFile};
pub use project::{Members, Project};

/// Index of an [`OrgFile`] in its [`crate::Website`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub(crate) usize);

/// Index of a [`Project`] in its [`crate::Website`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(pub(crate) usize);

/// Something that owns files and sub-projects: the website itself or one of
/// its projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerId {
    Website,
    Project(ProjectId),
}
