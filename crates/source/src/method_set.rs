use crate::parser::{PackageKey, ParsedFile, TypeDecl};
use crate::sources::PackageSources;
use crate::stdlib::{self, KnownInterface};
use mockgen_model::{
    is_predeclared, ChanDir, MethodSet, MockgenError, Origin, RawMethod, RawSignature, Result,
    TypeShape,
};
use std::collections::BTreeMap;
use tree_sitter::Node;

/// Alias chains longer than this are treated as cycles
const MAX_ALIAS_DEPTH: usize = 32;

/// A type as it appears in source, or as spelled by the known-interface table
#[derive(Clone, Copy)]
pub enum SourceNode<'a> {
    Syntax { file: &'a ParsedFile, node: Node<'a> },
    Known(&'static str),
}

/// What an embedded interface element turned out to be
enum Embedded<'a> {
    Syntax {
        file: &'a ParsedFile,
        body: Node<'a>,
        label: String,
        key: Option<String>,
    },
    Known(&'static KnownInterface, String),
    Nothing,
}

enum EmbedError {
    NotInterface { name: String, kind: String },
    Unresolvable(String),
}

/// Method set of one interface declared in source
pub struct SourceMethodSet<'a> {
    sources: &'a PackageSources,
    imports: &'a BTreeMap<String, String>,
    file: &'a ParsedFile,
    decl: TypeDecl<'a>,
    package_path: String,
}

impl<'a> SourceMethodSet<'a> {
    /// Locate `name` in the mocked file and check it declares an interface
    pub fn new(
        sources: &'a PackageSources,
        imports: &'a BTreeMap<String, String>,
        name: &str,
    ) -> Result<Self> {
        let file = sources
            .primary()
            .ok_or_else(|| MockgenError::invalid_request("no source file to extract from"))?;
        let decl = file
            .find_type(name)
            .ok_or_else(|| MockgenError::not_found(name, file.display()))?;
        if decl.generic {
            return Err(MockgenError::unresolvable(
                name,
                "generic interfaces are not supported",
            ));
        }

        let set = Self {
            sources,
            imports,
            file,
            decl,
            package_path: sources.primary_path().unwrap_or_default().to_string(),
        };

        match decl.ty.kind() {
            "interface_type" => {}
            "type_identifier" | "qualified_type" | "parenthesized_type" | "generic_type" => {
                set.embed(file, decl.ty, 0).map_err(|e| match e {
                    EmbedError::NotInterface { kind, .. } => {
                        MockgenError::not_an_interface(name, kind)
                    }
                    EmbedError::Unresolvable(detail) => MockgenError::unresolvable(name, detail),
                })?;
            }
            other => return Err(MockgenError::not_an_interface(name, describe_kind(other))),
        }
        Ok(set)
    }

    fn fail(&self, method: Option<&str>, detail: impl Into<String>) -> MockgenError {
        MockgenError::UnresolvableType {
            interface: self.decl.name.to_string(),
            method: method.map(str::to_string),
            detail: detail.into(),
        }
    }

    fn collect(
        &self,
        file: &'a ParsedFile,
        body: Node<'a>,
        origin: Option<&str>,
        stack: &mut Vec<String>,
        out: &mut Vec<RawMethod<SourceNode<'a>>>,
    ) -> Result<()> {
        for elem in body.named_children(&mut body.walk()) {
            match elem.kind() {
                "comment" => {}
                "method_elem" | "method_spec" => out.push(self.method(file, elem, origin)?),
                "type_elem" | "constraint_elem" => {
                    let types: Vec<_> = elem
                        .named_children(&mut elem.walk())
                        .filter(|n| n.kind() != "comment")
                        .collect();
                    match types.as_slice() {
                        [single] => self.embed_into(file, *single, origin, stack, out)?,
                        _ => {
                            return Err(self.fail(
                                None,
                                format!("type union {} is only valid in constraints", file.text(elem)),
                            ))
                        }
                    }
                }
                "type_identifier" | "qualified_type" | "interface_type" | "generic_type" => {
                    self.embed_into(file, elem, origin, stack, out)?;
                }
                other => {
                    return Err(self.fail(
                        None,
                        format!("unsupported interface element {other}: {}", file.text(elem)),
                    ))
                }
            }
        }
        Ok(())
    }

    fn method(
        &self,
        file: &'a ParsedFile,
        elem: Node<'a>,
        origin: Option<&str>,
    ) -> Result<RawMethod<SourceNode<'a>>> {
        let name = elem
            .child_by_field_name("name")
            .map(|n| file.text(n).to_string())
            .ok_or_else(|| self.fail(None, "method without a name"))?;
        let signature = raw_signature(
            file,
            elem.child_by_field_name("parameters"),
            elem.child_by_field_name("result"),
        )
        .map_err(|detail| self.fail(Some(name.as_str()), detail))?;
        Ok(RawMethod {
            name,
            signature,
            embedded_from: origin.map(str::to_string),
        })
    }

    fn embed_into(
        &self,
        file: &'a ParsedFile,
        ty: Node<'a>,
        origin: Option<&str>,
        stack: &mut Vec<String>,
        out: &mut Vec<RawMethod<SourceNode<'a>>>,
    ) -> Result<()> {
        let embedded = self.embed(file, ty, 0).map_err(|e| match e {
            EmbedError::NotInterface { name, kind } => self.fail(
                None,
                format!("embedded type {name} is {kind}, not an interface"),
            ),
            EmbedError::Unresolvable(detail) => self.fail(None, detail),
        })?;
        self.collect_embedded(embedded, origin, stack, out)
    }

    fn collect_embedded(
        &self,
        embedded: Embedded<'a>,
        origin: Option<&str>,
        stack: &mut Vec<String>,
        out: &mut Vec<RawMethod<SourceNode<'a>>>,
    ) -> Result<()> {
        match embedded {
            Embedded::Nothing => Ok(()),
            Embedded::Known(known, label) => {
                let from = origin.map_or(label, str::to_string);
                out.extend(known.methods.iter().map(|m| RawMethod {
                    name: m.name.to_string(),
                    signature: RawSignature {
                        params: m.params.iter().copied().map(SourceNode::Known).collect(),
                        results: m.results.iter().copied().map(SourceNode::Known).collect(),
                        variadic: false,
                    },
                    embedded_from: Some(from.clone()),
                }));
                Ok(())
            }
            Embedded::Syntax {
                file,
                body,
                label,
                key,
            } => {
                if let Some(key) = &key {
                    if stack.contains(key) {
                        return Err(self.fail(None, format!("interface {label} embeds itself")));
                    }
                    stack.push(key.clone());
                }
                let from = origin.map_or(label, str::to_string);
                self.collect(file, body, Some(from.as_str()), stack, out)?;
                if key.is_some() {
                    stack.pop();
                }
                Ok(())
            }
        }
    }

    /// Resolve an embedded type element to the interface it names
    fn embed(
        &self,
        file: &'a ParsedFile,
        ty: Node<'a>,
        depth: usize,
    ) -> std::result::Result<Embedded<'a>, EmbedError> {
        if depth > MAX_ALIAS_DEPTH {
            return Err(EmbedError::Unresolvable(format!(
                "type alias chain through {} does not terminate",
                file.text(ty)
            )));
        }

        match ty.kind() {
            "type_identifier" => {
                let name = file.text(ty);
                if !self.sources.declares(&file.package, name) {
                    match name {
                        "error" => return Ok(Embedded::Known(&stdlib::ERROR, "error".into())),
                        "any" => return Ok(Embedded::Nothing),
                        "comparable" => {
                            return Err(EmbedError::Unresolvable(
                                "comparable is only valid in constraints".into(),
                            ))
                        }
                        _ if is_predeclared(name) => {
                            return Err(EmbedError::NotInterface {
                                name: name.into(),
                                kind: name.into(),
                            })
                        }
                        _ => {}
                    }
                }
                if let Some(found) = self.embed_decl(&file.package, name, name.to_string(), depth) {
                    return found;
                }
                for path in file.imports.dot_imports() {
                    let key = self.sources.key_for(path);
                    if let Some(found) = self.embed_decl(&key, name, name.to_string(), depth) {
                        return found;
                    }
                    if let Some(known) = stdlib::lookup(path, name) {
                        return Ok(Embedded::Known(known, name.to_string()));
                    }
                }
                Err(EmbedError::Unresolvable(format!(
                    "embedded interface {name} not found in {}",
                    self.sources.describe(&file.package)
                )))
            }
            "qualified_type" => {
                let (package, name) = qualified_parts(file, ty).map_err(EmbedError::Unresolvable)?;
                let path = file
                    .imports
                    .lookup(package, self.imports)
                    .ok_or_else(|| {
                        EmbedError::Unresolvable(format!("unknown package qualifier {package:?}"))
                    })?;
                let label = format!("{package}.{name}");
                let key = self.sources.key_for(path);
                if let Some(found) = self.embed_decl(&key, name, label.clone(), depth) {
                    return found;
                }
                stdlib::lookup(path, name)
                    .map(|known| Embedded::Known(known, label.clone()))
                    .ok_or_else(|| {
                        EmbedError::Unresolvable(format!(
                            "embedded interface {label} not found in {}",
                            self.sources.describe(&key)
                        ))
                    })
            }
            "interface_type" => Ok(Embedded::Syntax {
                file,
                body: ty,
                label: "interface{...}".into(),
                key: None,
            }),
            "parenthesized_type" => match ty.named_child(0) {
                Some(inner) => self.embed(file, inner, depth + 1),
                None => Err(EmbedError::Unresolvable("empty parenthesized type".into())),
            },
            "generic_type" => Err(EmbedError::Unresolvable(format!(
                "generic interface {} is not supported",
                file.text(ty)
            ))),
            other => Err(EmbedError::NotInterface {
                name: file.text(ty).to_string(),
                kind: describe_kind(other).to_string(),
            }),
        }
    }

    fn embed_decl(
        &self,
        package: &PackageKey,
        name: &str,
        label: String,
        depth: usize,
    ) -> Option<std::result::Result<Embedded<'a>, EmbedError>> {
        let (file, decl) = self.sources.find_type(package, name)?;
        if decl.generic {
            return Some(Err(EmbedError::Unresolvable(format!(
                "generic interface {label} is not supported"
            ))));
        }
        Some(match decl.ty.kind() {
            "interface_type" => Ok(Embedded::Syntax {
                file,
                body: decl.ty,
                key: Some(format!("{}#{name}", file.display())),
                label,
            }),
            "type_identifier" | "qualified_type" | "parenthesized_type" | "generic_type" => {
                self.embed(file, decl.ty, depth + 1)
            }
            other => Err(EmbedError::NotInterface {
                name: label,
                kind: describe_kind(other).to_string(),
            }),
        })
    }

    /// Package an unqualified type name belongs to
    fn origin_of(&self, file: &ParsedFile, name: &str) -> std::result::Result<Origin, String> {
        let declared = self.sources.declares(&file.package, name);
        if is_predeclared(name) && !declared {
            return Ok(Origin::Builtin);
        }
        match file.imports.dot_imports() {
            _ if declared => Ok(local_origin(file)),
            [] => Ok(local_origin(file)),
            [only] => Ok(Origin::Package(only.clone())),
            many => Err(format!(
                "type {name} is ambiguous between dot imports {}",
                many.join(", ")
            )),
        }
    }
}

impl<'a> MethodSet for SourceMethodSet<'a> {
    type Node = SourceNode<'a>;

    fn interface_name(&self) -> &str {
        self.decl.name
    }

    fn package_path(&self) -> &str {
        &self.package_path
    }

    fn raw_methods(&self) -> Result<Vec<RawMethod<SourceNode<'a>>>> {
        let mut out = Vec::new();
        let mut stack = vec![format!("{}#{}", self.file.display(), self.decl.name)];
        if self.decl.ty.kind() == "interface_type" {
            self.collect(self.file, self.decl.ty, None, &mut stack, &mut out)?;
        } else {
            self.embed_into(self.file, self.decl.ty, None, &mut stack, &mut out)?;
        }
        Ok(out)
    }

    fn shape(&self, node: &SourceNode<'a>) -> std::result::Result<TypeShape<SourceNode<'a>>, String> {
        let (file, node) = match *node {
            SourceNode::Known(spelled) => {
                return Ok(match spelled.strip_prefix("[]") {
                    Some(elem) => TypeShape::Slice(SourceNode::Known(elem)),
                    None => TypeShape::Named {
                        origin: Origin::Builtin,
                        name: spelled.to_string(),
                    },
                })
            }
            SourceNode::Syntax { file, node } => (file, node),
        };
        let syntax = |node: Node<'a>| SourceNode::Syntax { file, node };
        let field = |name: &str| {
            node.child_by_field_name(name)
                .map(syntax)
                .ok_or_else(|| format!("{} without {name}", node.kind()))
        };
        let first_child = || {
            node.named_child(0)
                .map(syntax)
                .ok_or_else(|| format!("empty {}", node.kind()))
        };

        Ok(match node.kind() {
            "type_identifier" => {
                let name = file.text(node);
                TypeShape::Named {
                    origin: self.origin_of(file, name)?,
                    name: name.to_string(),
                }
            }
            "qualified_type" => {
                let (package, name) = qualified_parts(file, node)?;
                let path = file
                    .imports
                    .lookup(package, self.imports)
                    .ok_or_else(|| format!("unknown package qualifier {package:?} in {}", file.text(node)))?;
                TypeShape::Named {
                    origin: Origin::Package(path.to_string()),
                    name: name.to_string(),
                }
            }
            "pointer_type" => TypeShape::Pointer(first_child()?),
            "slice_type" => TypeShape::Slice(field("element")?),
            "array_type" => TypeShape::Array {
                len: node
                    .child_by_field_name("length")
                    .map(|len| file.text(len).to_string())
                    .ok_or_else(|| "array type without length".to_string())?,
                elem: field("element")?,
            },
            "map_type" => TypeShape::Map {
                key: field("key")?,
                value: field("value")?,
            },
            "channel_type" => {
                let first = node.child(0).map(|c| c.kind());
                let second = node.child(1).map(|c| c.kind());
                let dir = if first == Some("<-") {
                    ChanDir::Recv
                } else if second == Some("<-") {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                TypeShape::Chan {
                    dir,
                    elem: field("value")?,
                }
            }
            "function_type" => TypeShape::Func(raw_signature(
                file,
                node.child_by_field_name("parameters"),
                node.child_by_field_name("result"),
            )?),
            "interface_type" if !has_elements(node) => TypeShape::EmptyInterface,
            "struct_type" if node.named_children(&mut node.walk()).all(|c| !has_elements(c)) => {
                TypeShape::EmptyStruct
            }
            "interface_type" | "struct_type" => {
                return Err(format!(
                    "anonymous {} with members is not supported: {}",
                    describe_kind(node.kind()),
                    file.text(node)
                ))
            }
            "parenthesized_type" => return self.shape(&first_child()?),
            "generic_type" => return Err(format!("generic type {} is not supported", file.text(node))),
            other => return Err(format!("unsupported type syntax {other}: {}", file.text(node))),
        })
    }
}

/// Parameters and results of a method or function type
fn raw_signature<'a>(
    file: &'a ParsedFile,
    params: Option<Node<'a>>,
    result: Option<Node<'a>>,
) -> std::result::Result<RawSignature<SourceNode<'a>>, String> {
    let (params, variadic) = match params {
        Some(list) => expand_params(file, list, true)?,
        None => (Vec::new(), false),
    };
    let results = match result {
        None => Vec::new(),
        Some(list) if list.kind() == "parameter_list" => expand_params(file, list, false)?.0,
        Some(ty) => vec![SourceNode::Syntax { file, node: ty }],
    };
    Ok(RawSignature {
        params,
        results,
        variadic,
    })
}

/// Flatten `(a, b int, s ...string)` into one node per parameter
fn expand_params<'a>(
    file: &'a ParsedFile,
    list: Node<'a>,
    allow_variadic: bool,
) -> std::result::Result<(Vec<SourceNode<'a>>, bool), String> {
    let decls: Vec<_> = list
        .named_children(&mut list.walk())
        .filter(|n| n.kind() != "comment")
        .collect();
    let mut out = Vec::with_capacity(decls.len());
    let mut variadic = false;

    for (idx, decl) in decls.iter().enumerate() {
        let ty = decl
            .child_by_field_name("type")
            .ok_or_else(|| format!("parameter without type: {}", file.text(*decl)))?;
        match decl.kind() {
            "parameter_declaration" => {
                let names = decl.children_by_field_name("name", &mut decl.walk()).count();
                for _ in 0..names.max(1) {
                    out.push(SourceNode::Syntax { file, node: ty });
                }
            }
            "variadic_parameter_declaration" => {
                if !allow_variadic || idx + 1 != decls.len() {
                    return Err(format!(
                        "variadic parameter {} is only allowed last in a parameter list",
                        file.text(*decl)
                    ));
                }
                out.push(SourceNode::Syntax { file, node: ty });
                variadic = true;
            }
            other => return Err(format!("unsupported parameter syntax {other}")),
        }
    }
    Ok((out, variadic))
}

fn qualified_parts<'a>(
    file: &'a ParsedFile,
    node: Node<'a>,
) -> std::result::Result<(&'a str, &'a str), String> {
    match (
        node.child_by_field_name("package"),
        node.child_by_field_name("name"),
    ) {
        (Some(package), Some(name)) => Ok((file.text(package), file.text(name))),
        _ => Err(format!("malformed qualified type {}", file.text(node))),
    }
}

/// Whether a body node (interface or field list) has any non-comment members
fn has_elements(node: Node<'_>) -> bool {
    node.named_children(&mut node.walk())
        .any(|child| child.kind() != "comment")
}

fn local_origin(file: &ParsedFile) -> Origin {
    match &file.package {
        PackageKey::Primary => Origin::Local,
        PackageKey::Other(path) => Origin::Package(path.clone()),
    }
}

fn describe_kind(kind: &str) -> &str {
    match kind {
        "struct_type" => "struct",
        "interface_type" => "interface",
        "function_type" => "func",
        "map_type" => "map",
        "slice_type" => "slice",
        "array_type" => "array",
        "pointer_type" => "pointer",
        "channel_type" => "channel",
        other => other,
    }
}
