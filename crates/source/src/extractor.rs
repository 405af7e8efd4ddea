use crate::method_set::SourceMethodSet;
use crate::sources::PackageSources;
use mockgen_model::{
    resolve, Extractor, GenerationRequest, InterfaceDescriptor, MockgenError, Qualifier, Result,
    Target,
};

/// Extracts interfaces from the syntax tree of an uncompiled Go file
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceExtractor;

impl SourceExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Resolve interfaces from already loaded sources
    pub fn extract_from(
        &self,
        sources: &PackageSources,
        request: &GenerationRequest,
    ) -> Result<Vec<InterfaceDescriptor>> {
        let Target::Source { imports, .. } = &request.target else {
            return Err(MockgenError::invalid_request(
                "source extractor needs a source-mode request",
            ));
        };

        let mut descriptors = Vec::with_capacity(request.interfaces.len());
        for name in &request.interfaces {
            let set = SourceMethodSet::new(sources, imports, name)?;
            let descriptor = resolve(&set)?;
            check_local_types(sources, request, &descriptor)?;
            log::debug!(
                "resolved {name}: {} methods, {} embedded",
                descriptor.methods.len(),
                descriptor.embedded.len()
            );
            descriptors.push(descriptor);
        }
        Ok(descriptors)
    }
}

/// Types declared beside the interface can only stay unqualified when the mock
/// lands in the same package; otherwise their import path must be known
fn check_local_types(
    sources: &PackageSources,
    request: &GenerationRequest,
    descriptor: &InterfaceDescriptor,
) -> Result<()> {
    if !descriptor.package_path.is_empty() || request.self_package.is_some() {
        return Ok(());
    }
    let Some(declaring) = sources.primary().map(|f| f.package_name.as_str()) else {
        return Ok(());
    };
    if declaring == request.package {
        return Ok(());
    }
    for method in &descriptor.methods {
        let mut local = None;
        method.signature.for_each_named(&mut |qualifier, name| {
            if local.is_none() && matches!(qualifier, Qualifier::Local) {
                local = Some(name);
            }
        });
        if let Some(ty) = local {
            return Err(MockgenError::UnresolvableType {
                interface: descriptor.name.clone(),
                method: Some(method.name.clone()),
                detail: format!(
                    "type {ty} is declared in package {declaring}; --library or --self-package \
                     is required when mocks are written to package {}",
                    request.package
                ),
            });
        }
    }
    Ok(())
}

impl Extractor for SourceExtractor {
    fn extract(&self, request: &GenerationRequest) -> Result<Vec<InterfaceDescriptor>> {
        let Target::Source {
            source,
            library,
            aux_files,
            ..
        } = &request.target
        else {
            return Err(MockgenError::invalid_request(
                "source extractor needs a source-mode request",
            ));
        };

        log::info!(
            "parsing {} (+{} aux files)",
            source.display(),
            aux_files.len()
        );
        let sources = PackageSources::load(source, library.as_deref(), aux_files)?;
        self.extract_from(&sources, request)
    }
}
