use crate::archive::{ArchiveChanDir, ArchiveMethod, ArchiveType, PackageArchive};
use mockgen_model::{
    is_predeclared, ChanDir, MethodSet, Origin, RawMethod, RawSignature, Result, TypeShape,
};

/// Method set of one interface from a package archive
pub struct ReflectMethodSet<'a> {
    archive: &'a PackageArchive,
    name: &'a str,
    methods: &'a [ArchiveMethod],
}

impl<'a> ReflectMethodSet<'a> {
    pub fn new(archive: &'a PackageArchive, name: &'a str, methods: &'a [ArchiveMethod]) -> Self {
        Self {
            archive,
            name,
            methods,
        }
    }
}

fn raw_signature<'a>(
    params: &'a [ArchiveType],
    results: &'a [ArchiveType],
    variadic: bool,
) -> RawSignature<&'a ArchiveType> {
    RawSignature {
        params: params.iter().collect(),
        results: results.iter().collect(),
        variadic,
    }
}

impl<'a> MethodSet for ReflectMethodSet<'a> {
    type Node = &'a ArchiveType;

    fn interface_name(&self) -> &str {
        self.name
    }

    fn package_path(&self) -> &str {
        &self.archive.path
    }

    fn raw_methods(&self) -> Result<Vec<RawMethod<&'a ArchiveType>>> {
        Ok(self
            .methods
            .iter()
            .map(|m| RawMethod {
                name: m.name.clone(),
                signature: raw_signature(&m.params, &m.results, m.variadic),
                embedded_from: None,
            })
            .collect())
    }

    fn shape(
        &self,
        node: &&'a ArchiveType,
    ) -> std::result::Result<TypeShape<&'a ArchiveType>, String> {
        let node: &'a ArchiveType = *node;
        Ok(match node {
            ArchiveType::Named { package, name } => {
                let origin = if !package.is_empty() {
                    Origin::Package(package.clone())
                } else if is_predeclared(name) {
                    Origin::Builtin
                } else {
                    return Err(format!("type {name} has no package"));
                };
                TypeShape::Named {
                    origin,
                    name: name.clone(),
                }
            }
            ArchiveType::Pointer { elem } => TypeShape::Pointer(&**elem),
            ArchiveType::Slice { elem } => TypeShape::Slice(&**elem),
            ArchiveType::Array { len, elem } => TypeShape::Array {
                len: len.to_string(),
                elem: &**elem,
            },
            ArchiveType::Map { key, value } => TypeShape::Map {
                key: &**key,
                value: &**value,
            },
            ArchiveType::Chan { dir, elem } => TypeShape::Chan {
                dir: match dir {
                    ArchiveChanDir::Both => ChanDir::Both,
                    ArchiveChanDir::Send => ChanDir::Send,
                    ArchiveChanDir::Recv => ChanDir::Recv,
                },
                elem: &**elem,
            },
            ArchiveType::Func {
                params,
                results,
                variadic,
            } => TypeShape::Func(raw_signature(params, results, *variadic)),
            ArchiveType::Interface { methods } if methods.is_empty() => TypeShape::EmptyInterface,
            ArchiveType::Struct { fields } if fields.is_empty() => TypeShape::EmptyStruct,
            ArchiveType::Interface { .. } => {
                return Err("anonymous interface with methods is not supported".into())
            }
            ArchiveType::Struct { .. } => {
                return Err("anonymous struct with fields is not supported".into())
            }
        })
    }
}
