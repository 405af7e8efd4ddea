//! # Mockgen Source
//!
//! Source-mode interface extraction: reads interfaces straight from the
//! syntax tree of a Go file that does not need to compile.
//!
//! ## Architecture
//!
//! ```text
//! source file + aux files
//!     │
//!     ├──> Tree-sitter Parsing → ParsedFile (package clause, imports, type decls)
//!     │
//!     ├──> SourceMethodSet
//!     │    ├─> method elements
//!     │    ├─> embedded interfaces (same package, aux packages, known stdlib)
//!     │    └─> type qualification (imports, dot imports, predeclared names)
//!     │
//!     └──> mockgen_model::resolve → InterfaceDescriptor[]
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use mockgen_model::{Extractor, GenerationRequest};
//! use mockgen_source::SourceExtractor;
//!
//! let request = GenerationRequest::source(
//!     "hello.go",
//!     vec!["simpleOne".to_string()],
//!     "mock_hello",
//!     "mock_hello/mock.go",
//! );
//! let interfaces = SourceExtractor::new().extract(&request).unwrap();
//! assert_eq!(interfaces[0].methods[0].name, "Hello");
//! ```

mod extractor;
mod imports;
mod method_set;
mod parser;
mod sources;
mod stdlib;

pub use extractor::SourceExtractor;
pub use imports::FileImports;
pub use method_set::{SourceMethodSet, SourceNode};
pub use parser::{GoParser, PackageKey, ParsedFile, TypeDecl};
pub use sources::PackageSources;
