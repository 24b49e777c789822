//! # silas-engine
//!
//! Loads a directory of org files into a [`Website`], resolves the links
//! between them and writes the rendered site.
//!
//! ```text
//! Website::load(root) → Website ─┬→ check_links()          links only
//!                                └→ Builder::build(output) pages + assets + feeds
//! ```
//!
//! Parsing and rendering of single files live in `silas-syntax`; this crate
//! owns everything that needs to know about more than one file.

pub mod build;
pub mod error;
pub mod feed;
pub mod io;
pub mod models;
pub mod resolve;
pub mod website;


pub use build::{BuildOptions, BuildReport, Builder, Layout, Page, PageKind, PlainLayout};
pub use error::{BuildError, LoadError, ResolveError, Warning};
pub use models::{ContainerId, ExternalFile, FileId, FileRole, OrgFile, Project, ProjectId};
pub use resolve::{Dependency, FileContext, LinkReport, Resolution};
pub use website::Website;
