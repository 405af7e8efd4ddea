//! # Mockgen Model
//!
//! Shared vocabulary of the mock generation pipeline.
//!
//! ## Architecture
//!
//! ```text
//! GenerationRequest
//!     │
//!     ├──> Extractor (reflect | source)
//!     │    └─> MethodSet ──> resolve() ──> InterfaceDescriptor[]
//!     │
//!     └──> ImportRegistry (one alias per imported package)
//!          └─> consumed by the synthesizer when rendering types
//! ```
//!
//! Every value here is created and discarded within one invocation; nothing
//! is cached across runs.

mod error;
mod extractor;
mod imports;
mod request;
mod resolver;
mod types;

pub use error::{MockgenError, Result};
pub use extractor::Extractor;
pub use imports::{
    guess_package_name, is_predeclared, ImportRegistry, REFLECT_IMPORT, RUNTIME_ALIAS,
};
pub use request::{
    is_exported, is_identifier, AuxFile, GenerationRequest, Mode, Target, DEFAULT_GO,
    DEFAULT_RUNTIME_IMPORT,
};
pub use resolver::{resolve, MethodSet, Origin, RawMethod, RawSignature, TypeShape};
pub use types::{
    ChanDir, InterfaceDescriptor, MethodDescriptor, ParamDescriptor, Qualifier, Signature, TypeRef,
};
