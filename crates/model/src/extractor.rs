use crate::error::Result;
use crate::request::GenerationRequest;
use crate::types::InterfaceDescriptor;

/// One interface discovery strategy (reflect or source mode).
///
/// Implementations return one descriptor per requested interface, in the
/// order the request lists them, or fail on the first interface they cannot
/// resolve.
pub trait Extractor {
    fn extract(&self, request: &GenerationRequest) -> Result<Vec<InterfaceDescriptor>>;
}
