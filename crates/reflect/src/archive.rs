use mockgen_model::{MockgenError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Exported type metadata of one compiled package.
///
/// Only the declarations that were asked for are present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageArchive {
    /// Import path of the package
    pub path: String,

    #[serde(default)]
    pub decls: BTreeMap<String, ArchiveDecl>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Interface,
    Struct,
    Other,
}

impl DeclKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclKind::Interface => "interface",
            DeclKind::Struct => "struct",
            DeclKind::Other => "non-interface type",
        }
    }
}

/// A named declaration and, for interfaces, its flattened method set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchiveDecl {
    pub kind: DeclKind,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<ArchiveMethod>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchiveMethod {
    pub name: String,

    #[serde(default)]
    pub params: Vec<ArchiveType>,

    #[serde(default)]
    pub results: Vec<ArchiveType>,

    /// The last parameter is `...T`; its entry holds `T`
    #[serde(default)]
    pub variadic: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveChanDir {
    #[default]
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchiveField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ArchiveType,
}

/// A type as reported by the reflect program
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArchiveType {
    /// Defined or predeclared type; `package` is empty for predeclared ones
    Named {
        #[serde(default)]
        package: String,
        name: String,
    },
    Pointer {
        elem: Box<ArchiveType>,
    },
    Slice {
        elem: Box<ArchiveType>,
    },
    Array {
        len: u64,
        elem: Box<ArchiveType>,
    },
    Map {
        key: Box<ArchiveType>,
        value: Box<ArchiveType>,
    },
    Chan {
        #[serde(default)]
        dir: ArchiveChanDir,
        elem: Box<ArchiveType>,
    },
    Func {
        #[serde(default)]
        params: Vec<ArchiveType>,
        #[serde(default)]
        results: Vec<ArchiveType>,
        #[serde(default)]
        variadic: bool,
    },
    Interface {
        #[serde(default)]
        methods: Vec<ArchiveMethod>,
    },
    Struct {
        #[serde(default)]
        fields: Vec<ArchiveField>,
    },
}

impl PackageArchive {
    /// Read an archive file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| MockgenError::archive(path.display().to_string(), e.to_string()))?;
        Self::from_json(&text, &path.display().to_string())
    }

    /// Parse archive JSON; `origin` names the input in errors
    pub fn from_json(text: &str, origin: &str) -> Result<Self> {
        let archive: Self =
            serde_json::from_str(text).map_err(|e| MockgenError::archive(origin, e.to_string()))?;
        if archive.path.is_empty() {
            return Err(MockgenError::archive(origin, "missing package path"));
        }
        for (name, decl) in &archive.decls {
            if decl.kind != DeclKind::Interface && !decl.methods.is_empty() {
                return Err(MockgenError::archive(
                    origin,
                    format!("{name} is a {} but lists methods", decl.kind.as_str()),
                ));
            }
        }
        Ok(archive)
    }

    pub fn decl(&self, name: &str) -> Option<&ArchiveDecl> {
        self.decls.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_types() {
        let archive = PackageArchive::from_json(
            r#"{
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
        }
      ]
    },
    "Request": {"kind": "struct"}
  }
}"#,
            "fixture",
        )
        .unwrap();

        let decl = archive.decl("FooerService").unwrap();
        assert_eq!(decl.kind, DeclKind::Interface);
        assert_eq!(decl.methods[0].params.len(), 2);
        assert_eq!(
            decl.methods[0].results[1],
            ArchiveType::Named {
                package: String::new(),
                name: "error".into()
            }
        );
        assert_eq!(archive.decl("Request").unwrap().kind, DeclKind::Struct);
    }

    #[test]
    fn malformed_json_is_an_archive_error() {
        let err = PackageArchive::from_json("{\"path\": 3}", "fixture").unwrap_err();
        assert!(matches!(err, MockgenError::Archive { ref path, .. } if path == "fixture"));
    }

    #[test]
    fn methods_on_non_interface_are_rejected() {
        let err = PackageArchive::from_json(
            r#"{"path": "p", "decls": {"S": {"kind": "struct", "methods": [{"name": "M"}]}}}"#,
            "fixture",
        )
        .unwrap_err();
        assert!(err.to_string().contains("lists methods"), "{err}");
    }
}
