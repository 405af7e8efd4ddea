//! # Mockgen Reflect
//!
//! Reflect-mode interface extraction: reads the exported type metadata of a
//! compiled Go package as a JSON package archive.
//!
//! ## Architecture
//!
//! ```text
//! library import path + interface names
//!     │
//!     ├──> PackageLoader
//!     │    ├─> ArchiveLoader  (pre-built archive file)
//!     │    └─> ProgramLoader  (go run a generated reflect program)
//!     │
//!     ├──> PackageArchive (decls → flattened method sets)
//!     │
//!     └──> ReflectMethodSet → mockgen_model::resolve → InterfaceDescriptor[]
//! ```
//!
//! Only exported interfaces can be reached this way.

mod archive;
mod extractor;
mod loader;
mod method_set;

pub use archive::{
    ArchiveChanDir, ArchiveDecl, ArchiveField, ArchiveMethod, ArchiveType, DeclKind, PackageArchive,
};
pub use extractor::ReflectExtractor;
pub use loader::{render_program, ArchiveLoader, PackageLoader, ProgramLoader};
pub use method_set::ReflectMethodSet;
