//! # Mockgen Synth
//!
//! Turns resolved interface descriptors into one Go source file of gomock
//! mocks, and prepends the optional commented license header.
//!
//! ## Architecture
//!
//! ```text
//! InterfaceDescriptor[] + GenerationRequest
//!     │
//!     ├──> ImportRegistry (one alias per package, sorted by path)
//!     │
//!     ├──> preamble: banner, package clause, import block
//!     │
//!     ├──> MockBlock per interface (request order)
//!     │    ├─> mock struct, recorder, constructor, EXPECT
//!     │    └─> per method: call-forwarding method + recorder method
//!     │
//!     └──> GeneratedUnit ──> inject_header ──> render()
//! ```

mod header;
mod mock;
mod render;
mod unit;
mod writer;

pub use header::{comment_each_line, inject_header, strip_header};
pub use mock::{synthesize_mock, MockBlock};
pub use render::{param_list, TypeRenderer};
pub use unit::{source_line, synthesize, GeneratedUnit};
