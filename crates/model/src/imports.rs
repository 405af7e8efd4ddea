use crate::types::{InterfaceDescriptor, Qualifier};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Alias the call-expectation runtime is always imported under
pub const RUNTIME_ALIAS: &str = "gomock";

/// Import path (and alias) of the standard `reflect` package used by recorders
pub const REFLECT_IMPORT: &str = "reflect";

const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range", "return",
    "select", "struct", "switch", "type", "var",
];

const GO_PREDECLARED: &[&str] = &[
    "any", "append", "bool", "byte", "cap", "clear", "close", "comparable", "complex",
    "complex64", "complex128", "copy", "delete", "error", "false", "float32", "float64", "imag",
    "int", "int8", "int16", "int32", "int64", "iota", "len", "make", "max", "min", "new", "nil",
    "panic", "print", "println", "real", "recover", "rune", "string", "true", "uint", "uint8",
    "uint16", "uint32", "uint64", "uintptr",
];

/// Identifiers declared inside generated mock methods
const GENERATED_LOCALS: &[&str] = &["m", "mr", "mock", "ret", "varargs", "a"];

static MAJOR_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v[0-9]+$").expect("major version regex"));
static GOPKG_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.v[0-9]+$").expect("gopkg regex"));
static NUMBERED_LOCAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(arg|ret)[0-9]+$").expect("numbered local regex"));

/// Whether `name` is one of Go's predeclared identifiers
pub fn is_predeclared(name: &str) -> bool {
    GO_PREDECLARED.contains(&name)
}

/// Best guess at the package name behind an import path.
///
/// `example.com/foo` → `foo`, `example.com/foo/v2` → `foo`,
/// `gopkg.in/yaml.v3` → `yaml`, `github.com/x/go-bar` → `bar`.
pub fn guess_package_name(path: &str) -> String {
    let mut segments = path.rsplit('/').filter(|s| !s.is_empty());
    let mut last = segments.next().unwrap_or_default();
    if MAJOR_VERSION.is_match(last) {
        if let Some(prev) = segments.next() {
            last = prev;
        }
    }
    let last = GOPKG_SUFFIX.replace(last, "");
    let last = last
        .strip_prefix("go-")
        .or_else(|| last.strip_suffix("-go"))
        .or_else(|| last.strip_suffix(".go"))
        .unwrap_or(last.as_ref());

    let mut name: String = last
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() {
        name.push_str("pkg");
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

fn is_generated_local(name: &str) -> bool {
    NUMBERED_LOCAL.is_match(name) || GENERATED_LOCALS.contains(&name)
}

fn is_reserved(name: &str) -> bool {
    GO_KEYWORDS.contains(&name) || is_predeclared(name) || is_generated_local(name)
}

/// Deterministic import path → alias assignment for one generated file.
///
/// Keyed by path, so a package referenced under several names in the input
/// still gets exactly one alias; packages whose guessed names collide get
/// numeric suffixes in sorted path order.
#[derive(Debug, Clone, Default)]
pub struct ImportRegistry {
    aliases: BTreeMap<String, String>,
    taken: HashSet<String>,
    self_package: Option<String>,
}

impl ImportRegistry {
    /// Collect every package the mocks for `descriptors` need and assign aliases
    pub fn build(
        descriptors: &[InterfaceDescriptor],
        self_package: Option<&str>,
        runtime_import: &str,
    ) -> Self {
        let mut registry = Self {
            self_package: self_package.map(str::to_string),
            ..Self::default()
        };

        registry.claim(runtime_import, RUNTIME_ALIAS);
        if descriptors.iter().any(|d| !d.methods.is_empty()) {
            registry.claim(REFLECT_IMPORT, REFLECT_IMPORT);
        }

        let mut needed = BTreeSet::new();
        for descriptor in descriptors {
            let own = descriptor.package_path.as_str();
            descriptor.for_each_named(&mut |qualifier, _| match qualifier {
                Qualifier::Builtin => {}
                Qualifier::Local => {
                    if !own.is_empty() && !registry.is_self(own) {
                        needed.insert(own.to_string());
                    }
                }
                Qualifier::Imported(path) => {
                    if !registry.is_self(path) {
                        needed.insert(path.clone());
                    }
                }
            });
        }

        for path in needed {
            if !registry.aliases.contains_key(&path) {
                let alias = registry.unique_alias(&guess_package_name(&path));
                log::debug!("import {path:?} as {alias}");
                registry.claim(&path, &alias);
            }
        }
        registry
    }

    fn is_self(&self, path: &str) -> bool {
        self.self_package.as_deref() == Some(path)
    }

    fn claim(&mut self, path: &str, alias: &str) {
        if self.aliases.contains_key(path) {
            return;
        }
        self.taken.insert(alias.to_string());
        self.aliases.insert(path.to_string(), alias.to_string());
    }

    fn unique_alias(&self, base: &str) -> String {
        // numbered suffixes would still look like argN/retN locals
        let base = if is_generated_local(base) {
            format!("{base}pkg")
        } else {
            base.to_string()
        };
        let base = base.as_str();
        let usable = |candidate: &str| !self.taken.contains(candidate) && !is_reserved(candidate);
        if usable(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base}{n}"))
            .find(|candidate| usable(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    /// Alias assigned to an import path
    pub fn alias(&self, path: &str) -> Option<&str> {
        self.aliases.get(path).map(String::as_str)
    }

    /// Alias of the call-expectation runtime
    pub fn runtime_alias(&self) -> &str {
        RUNTIME_ALIAS
    }

    /// Qualifying alias for a named type used by an interface declared in
    /// `declaring_package`; `None` means the name is written bare.
    pub fn qualify(&self, declaring_package: &str, qualifier: &Qualifier) -> Option<&str> {
        match qualifier {
            Qualifier::Builtin => None,
            Qualifier::Local if declaring_package.is_empty() || self.is_self(declaring_package) => {
                None
            }
            Qualifier::Local => self.alias(declaring_package),
            Qualifier::Imported(path) if self.is_self(path) => None,
            Qualifier::Imported(path) => self.alias(path),
        }
    }

    /// `(path, alias)` pairs sorted by path
    pub fn imports(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases
            .iter()
            .map(|(path, alias)| (path.as_str(), alias.as_str()))
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
