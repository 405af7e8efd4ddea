use crate::imports::FileImports;
use mockgen_model::{MockgenError, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree};

/// Which package a parsed file belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageKey {
    /// The package of the file being mocked
    Primary,

    /// Another package, by import path
    Other(String),
}

/// A top-level `type` declaration
#[derive(Debug, Clone, Copy)]
pub struct TypeDecl<'a> {
    pub name: &'a str,

    /// `type_spec` or `type_alias` node
    pub node: Node<'a>,

    /// Declared type (right-hand side)
    pub ty: Node<'a>,

    pub generic: bool,
}

/// Tree-sitter parser configured for Go
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    pub fn new() -> Result<Self> {
        let language: tree_sitter::Language = tree_sitter_go::LANGUAGE.into();
        let mut parser = Parser::new();
        parser.set_language(&language).map_err(|e| {
            MockgenError::parse("<go grammar>", format!("Failed to set language: {e}"))
        })?;
        Ok(Self { parser })
    }

    /// Parse one file; syntax errors are fatal
    pub fn parse(&mut self, path: &Path, text: String, package: PackageKey) -> Result<ParsedFile> {
        let display = path.display().to_string();
        let tree = self
            .parser
            .parse(&text, None)
            .ok_or_else(|| MockgenError::parse(&display, "Failed to parse source code"))?;

        let root = tree.root_node();
        if root.has_error() {
            let at = first_error(root).unwrap_or(root).start_position();
            return Err(MockgenError::parse(
                display,
                format!("syntax error at {}:{}", at.row + 1, at.column + 1),
            ));
        }

        let package_name = root
            .named_children(&mut root.walk())
            .find(|n| n.kind() == "package_clause")
            .and_then(|clause| clause.named_child(0))
            .map(|ident| node_text(ident, &text).to_string())
            .ok_or_else(|| MockgenError::parse(&display, "missing package clause"))?;

        let imports = FileImports::from_root(root, &text);
        let declared = type_decls(root, &text)
            .map(|decl| decl.name.to_string())
            .collect();

        log::debug!(
            "parsed {display}: package {package_name}, {} imports",
            imports.len()
        );

        Ok(ParsedFile {
            path: path.to_path_buf(),
            package,
            package_name,
            imports,
            declared,
            text,
            tree,
        })
    }
}

/// A parsed Go source file and the facts extraction needs from it
pub struct ParsedFile {
    pub path: PathBuf,
    pub package: PackageKey,
    pub package_name: String,
    pub imports: FileImports,
    declared: BTreeSet<String>,
    text: String,
    tree: Tree,
}

impl ParsedFile {
    pub fn text(&self, node: Node<'_>) -> &str {
        node_text(node, &self.text)
    }

    /// Whether the file declares a top-level type with this name
    pub fn declares(&self, name: &str) -> bool {
        self.declared.contains(name)
    }

    /// Find a top-level type declaration by name
    pub fn find_type(&self, name: &str) -> Option<TypeDecl<'_>> {
        type_decls(self.tree.root_node(), &self.text).find(|decl| decl.name == name)
    }

    pub fn display(&self) -> String {
        self.path.display().to_string()
    }
}

fn type_decls<'a>(root: Node<'a>, text: &'a str) -> impl Iterator<Item = TypeDecl<'a>> {
    let mut decls = Vec::new();
    for child in root.named_children(&mut root.walk()) {
        if child.kind() != "type_declaration" {
            continue;
        }
        for spec in child.named_children(&mut child.walk()) {
            if !matches!(spec.kind(), "type_spec" | "type_alias") {
                continue;
            }
            let (Some(name), Some(ty)) = (
                spec.child_by_field_name("name"),
                spec.child_by_field_name("type"),
            ) else {
                continue;
            };
            decls.push(TypeDecl {
                name: node_text(name, text),
                node: spec,
                ty,
                generic: spec.child_by_field_name("type_parameters").is_some(),
            });
        }
    }
    decls.into_iter()
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

pub(crate) fn node_text<'a>(node: Node<'_>, text: &'a str) -> &'a str {
    text.get(node.byte_range()).unwrap_or_default()
}
