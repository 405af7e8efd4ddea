use itertools::Itertools;
use mockgen_model::{ChanDir, ImportRegistry, Signature, TypeRef};

/// Writes resolved types as Go syntax, qualified through the import registry
#[derive(Clone, Copy)]
pub struct TypeRenderer<'a> {
    registry: &'a ImportRegistry,
    declaring_package: &'a str,
}

impl<'a> TypeRenderer<'a> {
    /// Renderer for types used by an interface declared in `declaring_package`
    pub fn new(registry: &'a ImportRegistry, declaring_package: &'a str) -> Self {
        Self {
            registry,
            declaring_package,
        }
    }

    pub fn render(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Named { qualifier, name } => {
                match self.registry.qualify(self.declaring_package, qualifier) {
                    Some(alias) => format!("{alias}.{name}"),
                    None => name.clone(),
                }
            }
            TypeRef::Pointer(elem) => format!("*{}", self.render(elem)),
            TypeRef::Slice(elem) => format!("[]{}", self.render(elem)),
            TypeRef::Array { len, elem } => format!("[{len}]{}", self.render(elem)),
            TypeRef::Map { key, value } => {
                format!("map[{}]{}", self.render(key), self.render(value))
            }
            TypeRef::Chan { dir, elem } => {
                let inner = self.render(elem);
                // `chan <-chan T` would parse as `chan<- chan T`
                let inner = match (dir, elem.as_ref()) {
                    (
                        ChanDir::Both | ChanDir::Send,
                        TypeRef::Chan {
                            dir: ChanDir::Recv, ..
                        },
                    ) => format!("({inner})"),
                    _ => inner,
                };
                match dir {
                    ChanDir::Both => format!("chan {inner}"),
                    ChanDir::Send => format!("chan<- {inner}"),
                    ChanDir::Recv => format!("<-chan {inner}"),
                }
            }
            TypeRef::Func(sig) => {
                let params = self.param_types(sig).join(", ");
                format!("func({params}){}", self.results(&sig.results))
            }
            TypeRef::EmptyInterface => "interface{}".to_string(),
            TypeRef::EmptyStruct => "struct{}".to_string(),
        }
    }

    /// Parameter types in order; a variadic tail is written `...T`
    pub fn param_types(&self, sig: &Signature) -> Vec<String> {
        sig.params
            .iter()
            .map(|param| {
                let ty = self.render(&param.ty);
                if param.variadic {
                    format!("...{ty}")
                } else {
                    ty
                }
            })
            .collect()
    }

    /// Result clause including its leading space, or empty for no results
    pub fn results(&self, results: &[TypeRef]) -> String {
        match results {
            [] => String::new(),
            [single] => format!(" {}", self.render(single)),
            many => format!(" ({})", many.iter().map(|ty| self.render(ty)).join(", ")),
        }
    }
}

/// `a, b string, c int` from parallel name and type lists, grouping runs of equal types
pub fn param_list(names: &[String], types: &[String]) -> String {
    names
        .iter()
        .zip(types)
        .chunk_by(|&(_, ty)| ty.as_str())
        .into_iter()
        .map(|(ty, group)| format!("{} {ty}", group.map(|(name, _)| name).join(", ")))
        .join(", ")
}
