use crate::error::{MockgenError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Import path of the call-expectation runtime the generated mocks delegate to
pub const DEFAULT_RUNTIME_IMPORT: &str = "github.com/golang/mock/gomock";

/// Go toolchain binary used when none is configured
pub const DEFAULT_GO: &str = "go";

/// Extraction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Exported type metadata of a compiled library
    Reflect,

    /// Syntax tree of an uncompiled source file
    Source,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Reflect => "reflect",
            Mode::Source => "source",
        }
    }
}

/// Source file that is not mocked itself but helps resolve embedded interfaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxFile {
    /// Import path of the package the file belongs to
    pub package: String,

    /// Path of the file on disk
    pub path: PathBuf,
}

/// What to read interfaces from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Target {
    Reflect {
        /// Import path of the compiled library
        library: String,

        /// Pre-built package model archive; when absent the reflect program is run
        #[serde(default)]
        archive: Option<PathBuf>,

        /// Go toolchain binary used to run the reflect program
        #[serde(default = "default_go")]
        go: String,
    },
    Source {
        /// Go source file holding the interfaces
        source: PathBuf,

        /// Import path of the source file's package, if known
        #[serde(default)]
        library: Option<String>,

        /// Caller-supplied import table (name -> path)
        #[serde(default)]
        imports: BTreeMap<String, String>,

        /// Extra files used to resolve embedded interfaces
        #[serde(default)]
        aux_files: Vec<AuxFile>,
    },
}

fn default_go() -> String {
    DEFAULT_GO.to_string()
}

fn default_runtime_import() -> String {
    DEFAULT_RUNTIME_IMPORT.to_string()
}

impl Target {
    pub fn mode(&self) -> Mode {
        match self {
            Target::Reflect { .. } => Mode::Reflect,
            Target::Source { .. } => Mode::Source,
        }
    }

    /// Import path of the mocked package, when known
    pub fn library(&self) -> Option<&str> {
        match self {
            Target::Reflect { library, .. } => Some(library),
            Target::Source { library, .. } => library.as_deref(),
        }
    }

    /// Human readable description used in the generated `Source:` line
    pub fn describe(&self) -> String {
        match self {
            Target::Reflect { library, .. } => library.clone(),
            Target::Source { source, .. } => source
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| source.display().to_string()),
        }
    }
}

/// A single, immutable description of one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Where interfaces are read from
    pub target: Target,

    /// Interface names, in output order
    pub interfaces: Vec<String>,

    /// Package clause of the generated file
    pub package: String,

    /// Generated file path
    pub destination: PathBuf,

    /// License/copyright template prepended as comments
    #[serde(default)]
    pub copyright_file: Option<PathBuf>,

    /// Import path of the output package
    #[serde(default)]
    pub self_package: Option<String>,

    /// Interface name -> mock type name overrides
    #[serde(default)]
    pub mock_names: BTreeMap<String, String>,

    /// Import path of the call-expectation runtime
    #[serde(default = "default_runtime_import")]
    pub runtime_import: String,
}

impl GenerationRequest {
    /// Create a source-mode request with default options
    pub fn source(
        source: impl Into<PathBuf>,
        interfaces: Vec<String>,
        package: impl Into<String>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self::with_target(
            Target::Source {
                source: source.into(),
                library: None,
                imports: BTreeMap::new(),
                aux_files: Vec::new(),
            },
            interfaces,
            package,
            destination,
        )
    }

    /// Create a reflect-mode request reading a pre-built archive
    pub fn reflect(
        library: impl Into<String>,
        archive: Option<PathBuf>,
        interfaces: Vec<String>,
        package: impl Into<String>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self::with_target(
            Target::Reflect {
                library: library.into(),
                archive,
                go: default_go(),
            },
            interfaces,
            package,
            destination,
        )
    }

    fn with_target(
        target: Target,
        interfaces: Vec<String>,
        package: impl Into<String>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            target,
            interfaces,
            package: package.into(),
            destination: destination.into(),
            copyright_file: None,
            self_package: None,
            mock_names: BTreeMap::new(),
            runtime_import: default_runtime_import(),
        }
    }

    /// Load a request from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| MockgenError::invalid_request(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn mode(&self) -> Mode {
        self.target.mode()
    }

    /// Name of the mock type generated for an interface
    pub fn mock_name(&self, interface: &str) -> String {
        self.mock_names
            .get(interface)
            .cloned()
            .unwrap_or_else(|| format!("Mock{interface}"))
    }

    /// Validate the request
    pub fn validate(&self) -> Result<()> {
        if self.interfaces.is_empty() {
            return Err(MockgenError::invalid_request(
                "at least one interface name is required",
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.interfaces {
            if !is_identifier(name) {
                return Err(MockgenError::invalid_request(format!(
                    "interface name {name:?} is not a valid identifier"
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(MockgenError::invalid_request(format!(
                    "interface {name} requested more than once"
                )));
            }
        }

        let mut mocks = HashSet::new();
        for name in &self.interfaces {
            let mock = self.mock_name(name);
            if !is_identifier(&mock) {
                return Err(MockgenError::invalid_request(format!(
                    "mock name {mock:?} for interface {name} is not a valid identifier"
                )));
            }
            if !mocks.insert(mock.clone()) {
                return Err(MockgenError::invalid_request(format!(
                    "mock name {mock} is used for more than one interface"
                )));
            }
        }

        for key in self.mock_names.keys() {
            if !self.interfaces.contains(key) {
                return Err(MockgenError::invalid_request(format!(
                    "mock name given for interface {key}, which was not requested"
                )));
            }
        }

        if !is_identifier(&self.package) || self.package == "_" {
            return Err(MockgenError::invalid_request(format!(
                "package name {:?} is not a valid identifier",
                self.package
            )));
        }

        if self.destination.as_os_str().is_empty() {
            return Err(MockgenError::invalid_request("destination path is empty"));
        }

        if self.runtime_import.is_empty() {
            return Err(MockgenError::invalid_request("runtime import path is empty"));
        }

        match &self.target {
            Target::Reflect { library, go, .. } => {
                if library.is_empty() {
                    return Err(MockgenError::invalid_request(
                        "reflect mode requires a library import path",
                    ));
                }
                if go.is_empty() {
                    return Err(MockgenError::invalid_request("go binary is empty"));
                }
            }
            Target::Source {
                source, imports, ..
            } => {
                if source.as_os_str().is_empty() {
                    return Err(MockgenError::invalid_request(
                        "source mode requires a source file",
                    ));
                }
                for name in imports.keys() {
                    if !is_identifier(name) {
                        return Err(MockgenError::invalid_request(format!(
                            "import name {name:?} is not a valid identifier"
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Whether `name` is a Go identifier
pub fn is_identifier(name: &str) -> bool {
    static IDENT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[\p{L}_][\p{L}\p{Nd}_]*$").expect("identifier regex"));
    IDENT.is_match(name)
}

/// Whether `name` is exported (starts with an upper-case letter)
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
