//! Signature resolution shared by both extraction modes.
//!
//! An extractor exposes what it discovered through [`MethodSet`]: a list of raw
//! methods whose parameter and result types are opaque nodes, plus a way to
//! peel one layer off a node ([`MethodSet::shape`]). [`resolve`] turns that into
//! an [`InterfaceDescriptor`] by building [`TypeRef`] values bottom-up, then
//! flattening methods that arrived through several embedded interfaces.

use crate::error::{MockgenError, Result};
use crate::types::{
    ChanDir, InterfaceDescriptor, MethodDescriptor, ParamDescriptor, Qualifier, Signature, TypeRef,
};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// Package a named type belongs to, as reported by an extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Predeclared identifier
    Builtin,

    /// Same package as the interface being resolved
    Local,

    /// Package identified by import path
    Package(String),
}

/// One layer of a type, with children left as extractor nodes
#[derive(Debug, Clone)]
pub enum TypeShape<N> {
    Named { origin: Origin, name: String },
    Pointer(N),
    Slice(N),
    Array { len: String, elem: N },
    Map { key: N, value: N },
    Chan { dir: ChanDir, elem: N },
    Func(RawSignature<N>),
    EmptyInterface,
    EmptyStruct,
}

/// Parameters and results of a method or function type, unresolved
#[derive(Debug, Clone)]
pub struct RawSignature<N> {
    pub params: Vec<N>,
    pub results: Vec<N>,
    /// The last entry of `params` is the element type of a `...` parameter
    pub variadic: bool,
}

/// A method as discovered by an extractor
#[derive(Debug, Clone)]
pub struct RawMethod<N> {
    pub name: String,
    pub signature: RawSignature<N>,

    /// Embedded interface the method was inherited from, if any
    pub embedded_from: Option<String>,
}

/// Method set of one interface, as seen by an extractor
pub trait MethodSet {
    /// Extractor-specific handle on an unresolved type
    type Node;

    fn interface_name(&self) -> &str;

    /// Import path of the declaring package (empty when unknown)
    fn package_path(&self) -> &str;

    /// All methods, including those reached through embedding (duplicates allowed)
    fn raw_methods(&self) -> Result<Vec<RawMethod<Self::Node>>>;

    /// Peel one layer off a type node; errors describe the unsupported construct
    fn shape(&self, node: &Self::Node) -> std::result::Result<TypeShape<Self::Node>, String>;
}

/// Resolve a method set into a descriptor with unique, name-sorted methods
pub fn resolve<S: MethodSet>(set: &S) -> Result<InterfaceDescriptor> {
    let interface = set.interface_name();
    let mut methods: BTreeMap<String, (MethodDescriptor, String)> = BTreeMap::new();
    let mut embedded = BTreeSet::new();

    for raw in set.raw_methods()? {
        let signature = resolve_signature(set, &raw.signature).map_err(|detail| {
            MockgenError::UnresolvableType {
                interface: interface.to_string(),
                method: Some(raw.name.clone()),
                detail,
            }
        })?;
        let from = match &raw.embedded_from {
            Some(name) => {
                embedded.insert(name.clone());
                name.clone()
            }
            None => interface.to_string(),
        };
        let method = MethodDescriptor {
            name: raw.name,
            signature,
        };

        match methods.entry(method.name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert((method, from));
            }
            Entry::Occupied(existing) => {
                let (previous, previous_from) = existing.get();
                if previous.signature != method.signature {
                    return Err(MockgenError::AmbiguousEmbedding {
                        interface: interface.to_string(),
                        method: method.name,
                        first: previous_from.clone(),
                        second: from,
                    });
                }
                log::debug!(
                    "{interface}: method {} from {from} duplicates {previous_from}",
                    method.name
                );
            }
        }
    }

    Ok(InterfaceDescriptor {
        package_path: set.package_path().to_string(),
        name: interface.to_string(),
        methods: methods.into_values().map(|(method, _)| method).collect(),
        embedded,
    })
}

fn resolve_signature<S: MethodSet>(
    set: &S,
    raw: &RawSignature<S::Node>,
) -> std::result::Result<Signature, String> {
    if raw.variadic && raw.params.is_empty() {
        return Err("variadic signature without parameters".to_string());
    }
    let count = raw.params.len();
    let params = raw
        .params
        .iter()
        .enumerate()
        .map(|(idx, node)| {
            Ok(ParamDescriptor {
                ty: resolve_type(set, node)?,
                variadic: raw.variadic && idx + 1 == count,
            })
        })
        .collect::<std::result::Result<Vec<_>, String>>()?;
    let results = raw
        .results
        .iter()
        .map(|node| resolve_type(set, node))
        .collect::<std::result::Result<Vec<_>, String>>()?;
    Ok(Signature { params, results })
}

fn resolve_type<S: MethodSet>(set: &S, node: &S::Node) -> std::result::Result<TypeRef, String> {
    let boxed = |node: &S::Node| resolve_type(set, node).map(Box::new);

    Ok(match set.shape(node)? {
        TypeShape::Named { origin, name } => {
            if name.contains('[') {
                return Err(format!("generic type {name} is not supported"));
            }
            let qualifier = match origin {
                Origin::Builtin => Qualifier::Builtin,
                Origin::Local => Qualifier::Local,
                Origin::Package(path) if path.is_empty() => {
                    return Err(format!("type {name} has an empty package path"));
                }
                Origin::Package(path) if path == set.package_path() => Qualifier::Local,
                Origin::Package(path) => Qualifier::Imported(path),
            };
            TypeRef::Named { qualifier, name }
        }
        TypeShape::Pointer(elem) => TypeRef::Pointer(boxed(&elem)?),
        TypeShape::Slice(elem) => TypeRef::Slice(boxed(&elem)?),
        TypeShape::Array { len, elem } => TypeRef::Array {
            len,
            elem: boxed(&elem)?,
        },
        TypeShape::Map { key, value } => TypeRef::Map {
            key: boxed(&key)?,
            value: boxed(&value)?,
        },
        TypeShape::Chan { dir, elem } => TypeRef::Chan {
            dir,
            elem: boxed(&elem)?,
        },
        TypeShape::Func(raw) => TypeRef::Func(Box::new(resolve_signature(set, &raw)?)),
        TypeShape::EmptyInterface => TypeRef::EmptyInterface,
        TypeShape::EmptyStruct => TypeRef::EmptyStruct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Toy node: a tiny type grammar good enough to drive the resolver
    #[derive(Debug, Clone)]
    enum Toy {
        Named(Origin, &'static str),
        Ptr(Box<Toy>),
        Func(Vec<Toy>, Vec<Toy>),
        Bad(&'static str),
    }

    struct ToySet {
        package: &'static str,
        methods: Vec<RawMethod<Toy>>,
    }

    impl MethodSet for ToySet {
        type Node = Toy;

        fn interface_name(&self) -> &str {
            "Store"
        }

        fn package_path(&self) -> &str {
            self.package
        }

        fn raw_methods(&self) -> Result<Vec<RawMethod<Toy>>> {
            Ok(self.methods.clone())
        }

        fn shape(&self, node: &Toy) -> std::result::Result<TypeShape<Toy>, String> {
            Ok(match node {
                Toy::Named(origin, name) => TypeShape::Named {
                    origin: origin.clone(),
                    name: (*name).to_string(),
                },
                Toy::Ptr(elem) => TypeShape::Pointer((**elem).clone()),
                Toy::Func(params, results) => TypeShape::Func(RawSignature {
                    params: params.clone(),
                    results: results.clone(),
                    variadic: false,
                }),
                Toy::Bad(what) => return Err((*what).to_string()),
            })
        }
    }

    fn method(name: &str, params: Vec<Toy>, results: Vec<Toy>, from: Option<&str>) -> RawMethod<Toy> {
        RawMethod {
            name: name.to_string(),
            signature: RawSignature {
                params,
                results,
                variadic: false,
            },
            embedded_from: from.map(str::to_string),
        }
    }

    fn error_ty() -> Toy {
        Toy::Named(Origin::Builtin, "error")
    }

    #[test]
    fn own_package_path_becomes_local() {
        let set = ToySet {
            package: "example.com/foo",
            methods: vec![method(
                "DoIt",
                vec![Toy::Ptr(Box::new(Toy::Named(
                    Origin::Package("example.com/foo".into()),
                    "Thing",
                )))],
                vec![
                    Toy::Named(Origin::Package("context".into()), "Context"),
                    error_ty(),
                ],
                None,
            )],
        };
        let desc = resolve(&set).unwrap();
        assert_eq!(desc.methods.len(), 1);
        assert_eq!(
            desc.methods[0].params()[0].ty,
            TypeRef::local("Thing").pointer()
        );
        assert_eq!(
            desc.methods[0].results(),
            &[TypeRef::imported("context", "Context"), TypeRef::builtin("error")]
        );
    }

    #[test]
    fn identical_embedded_methods_collapse() {
        let set = ToySet {
            package: "",
            methods: vec![
                method("Close", vec![], vec![error_ty()], Some("io.Closer")),
                method("Close", vec![], vec![error_ty()], Some("Resource")),
                method("Alpha", vec![], vec![], None),
            ],
        };
        let desc = resolve(&set).unwrap();
        let names: Vec<_> = desc.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Close"]);
        assert_eq!(
            desc.embedded.iter().cloned().collect::<Vec<_>>(),
            vec!["Resource".to_string(), "io.Closer".to_string()]
        );
    }

    #[test]
    fn conflicting_embedded_methods_fail() {
        let set = ToySet {
            package: "",
            methods: vec![
                method("Close", vec![], vec![error_ty()], Some("io.Closer")),
                method("Close", vec![], vec![], Some("Quitter")),
            ],
        };
        match resolve(&set) {
            Err(MockgenError::AmbiguousEmbedding {
                interface,
                method,
                first,
                second,
            }) => {
                assert_eq!(interface, "Store");
                assert_eq!(method, "Close");
                assert_eq!(first, "io.Closer");
                assert_eq!(second, "Quitter");
            }
            other => panic!("expected ambiguous embedding, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_construct_is_reported_with_method() {
        let set = ToySet {
            package: "",
            methods: vec![method(
                "Visit",
                vec![Toy::Func(vec![Toy::Bad("struct literal")], vec![])],
                vec![],
                None,
            )],
        };
        match resolve(&set) {
            Err(MockgenError::UnresolvableType { method, detail, .. }) => {
                assert_eq!(method.as_deref(), Some("Visit"));
                assert_eq!(detail, "struct literal");
            }
            other => panic!("expected unresolvable type, got {other:?}"),
        }
    }

    #[test]
    fn generic_instantiation_is_rejected() {
        let set = ToySet {
            package: "",
            methods: vec![method(
                "Get",
                vec![],
                vec![Toy::Named(Origin::Package("x/box".into()), "Box[int]")],
                None,
            )],
        };
        assert!(matches!(
            resolve(&set),
            Err(MockgenError::UnresolvableType { .. })
        ));
    }
}
