use crate::parser::node_text;
use mockgen_model::guess_package_name;
use std::collections::BTreeMap;
use tree_sitter::Node;

/// Import table of one source file
#[derive(Debug, Clone, Default)]
pub struct FileImports {
    /// `name "path"` imports
    explicit: BTreeMap<String, String>,

    /// Plain imports, keyed by the guessed package name
    derived: BTreeMap<String, String>,

    /// `. "path"` imports
    dot: Vec<String>,
}

impl FileImports {
    pub(crate) fn from_root(root: Node<'_>, text: &str) -> Self {
        let mut imports = Self::default();
        let mut specs = Vec::new();
        for child in root.named_children(&mut root.walk()) {
            if child.kind() == "import_declaration" {
                collect_import_specs(child, &mut specs);
            }
        }

        for spec in specs {
            let Some(path) = spec
                .child_by_field_name("path")
                .map(|p| strip_string_quotes(node_text(p, text)))
            else {
                continue;
            };
            match spec.child_by_field_name("name") {
                Some(name) => match name.kind() {
                    "dot" => imports.dot.push(path),
                    "blank_identifier" => log::warn!("ignoring blank import of {path:?}"),
                    _ => {
                        imports
                            .explicit
                            .insert(node_text(name, text).to_string(), path);
                    }
                },
                None => {
                    imports.derived.insert(guess_package_name(&path), path);
                }
            }
        }
        imports
    }

    /// Resolve the qualifier used in `name.Type` to an import path.
    ///
    /// Explicitly named imports win, then the caller-supplied table, then
    /// names guessed from plain import paths.
    pub fn lookup<'a>(
        &'a self,
        name: &str,
        caller: &'a BTreeMap<String, String>,
    ) -> Option<&'a str> {
        self.explicit
            .get(name)
            .or_else(|| caller.get(name))
            .or_else(|| self.derived.get(name))
            .map(String::as_str)
    }

    /// Paths imported with `.`
    pub fn dot_imports(&self) -> &[String] {
        &self.dot
    }

    pub fn len(&self) -> usize {
        self.explicit.len() + self.derived.len() + self.dot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn collect_import_specs<'a>(node: Node<'a>, specs: &mut Vec<Node<'a>>) {
    for child in node.named_children(&mut node.walk()) {
        if child.kind() == "import_spec" {
            specs.push(child);
        } else if child.kind() == "import_spec_list" {
            collect_import_specs(child, specs);
        }
    }
}

fn strip_string_quotes(s: &str) -> String {
    s.trim_matches('"').trim_matches('`').to_string()
}

#[cfg(test)]
mod tests {
    use crate::parser::{GoParser, PackageKey};
    use std::collections::BTreeMap;
    use std::path::Path;

    const SRC: &str = r#"package hello

import (
	"context"
	stdio "io"
	. "example.com/dsl"
	_ "example.com/sideeffect"
	"gopkg.in/yaml.v3"
	"github.com/x/go-bar"
)
"#;

    #[test]
    fn resolves_aliases_and_derived_names() {
        let file = GoParser::new()
            .unwrap()
            .parse(Path::new("hello.go"), SRC.to_string(), PackageKey::Primary)
            .unwrap();
        let none = BTreeMap::new();
        let imports = &file.imports;

        assert_eq!(imports.lookup("context", &none), Some("context"));
        assert_eq!(imports.lookup("stdio", &none), Some("io"));
        assert_eq!(imports.lookup("io", &none), None);
        assert_eq!(imports.lookup("yaml", &none), Some("gopkg.in/yaml.v3"));
        assert_eq!(imports.lookup("bar", &none), Some("github.com/x/go-bar"));
        assert_eq!(imports.dot_imports(), &["example.com/dsl".to_string()]);
        assert_eq!(imports.len(), 5);
    }

    #[test]
    fn caller_table_beats_guessed_names() {
        let file = GoParser::new()
            .unwrap()
            .parse(Path::new("hello.go"), SRC.to_string(), PackageKey::Primary)
            .unwrap();
        let mut caller = BTreeMap::new();
        caller.insert("gobar".to_string(), "github.com/x/go-bar".to_string());
        caller.insert("bar".to_string(), "example.com/other/bar".to_string());
        caller.insert("stdio".to_string(), "example.com/never".to_string());

        let imports = &file.imports;
        assert_eq!(imports.lookup("gobar", &caller), Some("github.com/x/go-bar"));
        assert_eq!(imports.lookup("bar", &caller), Some("example.com/other/bar"));
        assert_eq!(imports.lookup("stdio", &caller), Some("io"));
    }
}
