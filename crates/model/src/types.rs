use std::collections::BTreeSet;

/// Where a named type comes from, relative to the interface being mocked
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Qualifier {
    /// Predeclared type (`int`, `string`, `error`, ...)
    Builtin,

    /// Declared in the same package as the interface
    Local,

    /// Declared in another package, identified by import path
    Imported(String),
}

/// Channel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// Canonical, syntax-independent description of a type in a method signature.
///
/// Values are built bottom-up by the resolver and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named { qualifier: Qualifier, name: String },
    Pointer(Box<TypeRef>),
    Slice(Box<TypeRef>),
    Array { len: String, elem: Box<TypeRef> },
    Map { key: Box<TypeRef>, value: Box<TypeRef> },
    Chan { dir: ChanDir, elem: Box<TypeRef> },
    Func(Box<Signature>),
    EmptyInterface,
    EmptyStruct,
}

impl TypeRef {
    /// Predeclared type by name
    pub fn builtin(name: impl Into<String>) -> Self {
        Self::Named {
            qualifier: Qualifier::Builtin,
            name: name.into(),
        }
    }

    /// Type declared in the interface's own package
    pub fn local(name: impl Into<String>) -> Self {
        Self::Named {
            qualifier: Qualifier::Local,
            name: name.into(),
        }
    }

    /// Type declared in another package
    pub fn imported(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named {
            qualifier: Qualifier::Imported(path.into()),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn pointer(self) -> Self {
        Self::Pointer(Box::new(self))
    }

    #[must_use]
    pub fn slice(self) -> Self {
        Self::Slice(Box::new(self))
    }

    /// Visit every named type reachable from this one
    pub fn for_each_named<'a>(&'a self, f: &mut impl FnMut(&'a Qualifier, &'a str)) {
        match self {
            Self::Named { qualifier, name } => f(qualifier, name),
            Self::Pointer(elem) | Self::Slice(elem) => elem.for_each_named(f),
            Self::Array { elem, .. } | Self::Chan { elem, .. } => elem.for_each_named(f),
            Self::Map { key, value } => {
                key.for_each_named(f);
                value.for_each_named(f);
            }
            Self::Func(sig) => sig.for_each_named(f),
            Self::EmptyInterface | Self::EmptyStruct => {}
        }
    }
}

/// Parameter and result list of a function type or method
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Signature {
    pub params: Vec<ParamDescriptor>,
    pub results: Vec<TypeRef>,
}

impl Signature {
    /// Whether the trailing parameter is variadic
    pub fn is_variadic(&self) -> bool {
        self.params.last().is_some_and(|p| p.variadic)
    }

    pub fn for_each_named<'a>(&'a self, f: &mut impl FnMut(&'a Qualifier, &'a str)) {
        for param in &self.params {
            param.ty.for_each_named(f);
        }
        for result in &self.results {
            result.for_each_named(f);
        }
    }
}

/// One method parameter. For a variadic parameter `ty` is the element type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamDescriptor {
    pub ty: TypeRef,
    pub variadic: bool,
}

impl ParamDescriptor {
    pub fn new(ty: TypeRef) -> Self {
        Self {
            ty,
            variadic: false,
        }
    }

    pub fn variadic(ty: TypeRef) -> Self {
        Self { ty, variadic: true }
    }
}

/// A single interface method with its resolved signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub name: String,
    pub signature: Signature,
}

impl MethodDescriptor {
    /// Build a method, marking the last parameter variadic when requested.
    ///
    /// Only the trailing parameter may carry the variadic marker.
    pub fn new(
        name: impl Into<String>,
        params: Vec<TypeRef>,
        results: Vec<TypeRef>,
        variadic: bool,
    ) -> Self {
        let count = params.len();
        let params = params
            .into_iter()
            .enumerate()
            .map(|(idx, ty)| ParamDescriptor {
                ty,
                variadic: variadic && idx + 1 == count,
            })
            .collect();
        Self {
            name: name.into(),
            signature: Signature { params, results },
        }
    }

    pub fn params(&self) -> &[ParamDescriptor] {
        &self.signature.params
    }

    pub fn results(&self) -> &[TypeRef] {
        &self.signature.results
    }

    pub fn is_variadic(&self) -> bool {
        self.signature.is_variadic()
    }
}

/// Fully resolved interface, ready for synthesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    /// Import path of the declaring package (empty when unknown)
    pub package_path: String,

    /// Interface name as declared
    pub name: String,

    /// Methods, unique by name and sorted by name
    pub methods: Vec<MethodDescriptor>,

    /// Embedded interfaces whose methods were flattened into `methods`
    pub embedded: BTreeSet<String>,
}

impl InterfaceDescriptor {
    /// Look up a method by name
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Visit every named type used by any method
    pub fn for_each_named<'a>(&'a self, f: &mut impl FnMut(&'a Qualifier, &'a str)) {
        for method in &self.methods {
            method.signature.for_each_named(f);
        }
    }
}
