use crate::archive::{DeclKind, PackageArchive};
use crate::loader::{ArchiveLoader, PackageLoader, ProgramLoader};
use crate::method_set::ReflectMethodSet;
use mockgen_model::{
    is_exported, resolve, Extractor, GenerationRequest, InterfaceDescriptor, MockgenError, Result,
    Target,
};

/// Extracts exported interfaces from a compiled library's type metadata
#[derive(Debug, Default, Clone, Copy)]
pub struct ReflectExtractor;

impl ReflectExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the requested interfaces from an already loaded archive
    pub fn extract_from(
        &self,
        archive: &PackageArchive,
        interfaces: &[String],
    ) -> Result<Vec<InterfaceDescriptor>> {
        let mut descriptors = Vec::with_capacity(interfaces.len());
        for name in interfaces {
            let decl = archive
                .decl(name)
                .ok_or_else(|| MockgenError::not_found(name, &archive.path))?;
            if decl.kind != DeclKind::Interface {
                return Err(MockgenError::not_an_interface(name, decl.kind.as_str()));
            }
            let descriptor = resolve(&ReflectMethodSet::new(archive, name, &decl.methods))?;
            log::debug!("resolved {name}: {} methods", descriptor.methods.len());
            descriptors.push(descriptor);
        }
        Ok(descriptors)
    }
}

impl Extractor for ReflectExtractor {
    fn extract(&self, request: &GenerationRequest) -> Result<Vec<InterfaceDescriptor>> {
        let Target::Reflect {
            library,
            archive,
            go,
        } = &request.target
        else {
            return Err(MockgenError::invalid_request(
                "reflect extractor needs a reflect-mode request",
            ));
        };

        if let Some(name) = request.interfaces.iter().find(|name| !is_exported(name)) {
            return Err(MockgenError::not_found(
                name,
                format!("{library} (not exported)"),
            ));
        }

        let loader: Box<dyn PackageLoader> = match archive {
            Some(path) => Box::new(ArchiveLoader::new(path)),
            None => Box::new(ProgramLoader::new(go)),
        };
        log::info!("loading {library} ({} interfaces)", request.interfaces.len());
        let archive = loader.load(library, &request.interfaces)?;
        self.extract_from(&archive, &request.interfaces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockgen_model::TypeRef;
    use pretty_assertions::assert_eq;

    const ARCHIVE: &str = r#"{
  "path": "example.com/svc",
  "decls": {
    "FooerService": {
      "kind": "interface",
      "methods": [
        {
          "name": "DoIt",
          "params": [
            {"kind": "named", "package": "context", "name": "Context"},
            {"kind": "pointer", "elem": {"kind": "named", "package": "example.com/svc", "name": "Request"}}
          ],
          "results": [
            {"kind": "pointer", "elem": {"kind": "named", "package": "example.com/svc", "name": "Response"}},
            {"kind": "named", "name": "error"}
          ]
        },
        {
          "name": "Batch",
          "params": [{"kind": "slice", "elem": {"kind": "named", "name": "string"}}],
          "variadic": true
        }
      ]
    },
    "Request": {"kind": "struct"}
  }
}"#;

    fn archive() -> PackageArchive {
        PackageArchive::from_json(ARCHIVE, "fixture").unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn service_method_keeps_exact_types() {
        let out = ReflectExtractor::new()
            .extract_from(&archive(), &names(&["FooerService"]))
            .unwrap();
        let service = &out[0];
        assert_eq!(service.package_path, "example.com/svc");

        let method_names: Vec<_> = service.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(method_names, vec!["Batch", "DoIt"]);

        let do_it = service.method("DoIt").unwrap();
        let params: Vec<_> = do_it.params().iter().map(|p| p.ty.clone()).collect();
        assert_eq!(
            params,
            vec![
                TypeRef::imported("context", "Context"),
                TypeRef::local("Request").pointer(),
            ]
        );
        assert_eq!(
            do_it.results(),
            &[TypeRef::local("Response").pointer(), TypeRef::builtin("error")]
        );

        let batch = service.method("Batch").unwrap();
        assert!(batch.is_variadic());
        assert_eq!(batch.params()[0].ty, TypeRef::builtin("string").slice());
    }

    #[test]
    fn struct_is_not_an_interface() {
        let err = ReflectExtractor::new()
            .extract_from(&archive(), &names(&["Request"]))
            .unwrap_err();
        assert!(matches!(err, MockgenError::NotAnInterface { ref kind, .. } if kind == "struct"));
    }

    #[test]
    fn absent_interface_is_not_found() {
        let err = ReflectExtractor::new()
            .extract_from(&archive(), &names(&["FooerService", "Missing"]))
            .unwrap_err();
        assert_eq!(err.interface(), Some("Missing"));
    }

    #[test]
    fn unexported_name_fails_before_loading() {
        let request = GenerationRequest::reflect(
            "example.com/svc",
            Some("/nonexistent/archive.json".into()),
            names(&["fooer"]),
            "mock_svc",
            "mock.go",
        );
        let err = ReflectExtractor::new().extract(&request).unwrap_err();
        match err {
            MockgenError::NotFound {
                interface,
                location,
            } => {
                assert_eq!(interface, "fooer");
                assert!(location.contains("not exported"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
