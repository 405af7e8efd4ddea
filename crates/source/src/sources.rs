use crate::parser::{GoParser, PackageKey, ParsedFile, TypeDecl};
use mockgen_model::{AuxFile, MockgenError, Result};
use std::path::Path;

/// Every source file available to one source-mode run.
///
/// The first file is the one being mocked; the rest are auxiliary files,
/// either from the same package or from imported packages.
pub struct PackageSources {
    files: Vec<ParsedFile>,
    primary_path: Option<String>,
}

impl PackageSources {
    /// Read and parse the source file and all auxiliary files up front
    pub fn load(source: &Path, library: Option<&str>, aux_files: &[AuxFile]) -> Result<Self> {
        let mut parser = GoParser::new()?;
        let primary = parser.parse(source, read(source)?, PackageKey::Primary)?;

        let mut files = Vec::with_capacity(aux_files.len() + 1);
        for aux in aux_files {
            let same_package = aux.package.is_empty()
                || library == Some(aux.package.as_str())
                || (library.is_none() && aux.package == primary.package_name);
            let key = if same_package {
                PackageKey::Primary
            } else {
                PackageKey::Other(aux.package.clone())
            };
            let parsed = parser.parse(&aux.path, read(&aux.path)?, key)?;
            if same_package && parsed.package_name != primary.package_name {
                log::warn!(
                    "aux file {} declares package {}, expected {}",
                    parsed.display(),
                    parsed.package_name,
                    primary.package_name
                );
            }
            files.push(parsed);
        }
        files.insert(0, primary);

        Ok(Self::from_files(files, library.map(str::to_string)))
    }

    /// Assemble from already parsed files; the first one is the mocked file
    pub fn from_files(files: Vec<ParsedFile>, primary_path: Option<String>) -> Self {
        Self {
            files,
            primary_path,
        }
    }

    /// The file being mocked
    pub fn primary(&self) -> Option<&ParsedFile> {
        self.files.first()
    }

    /// Import path of the mocked package, when known
    pub fn primary_path(&self) -> Option<&str> {
        self.primary_path.as_deref()
    }

    /// Package key for an import path
    pub fn key_for(&self, path: &str) -> PackageKey {
        if self.primary_path.as_deref() == Some(path) {
            PackageKey::Primary
        } else {
            PackageKey::Other(path.to_string())
        }
    }

    fn files_of(&self, package: &PackageKey) -> impl Iterator<Item = &ParsedFile> + '_ {
        let package = package.clone();
        self.files.iter().filter(move |f| f.package == package)
    }

    /// Find a type declaration anywhere in a package's available files
    pub fn find_type(&self, package: &PackageKey, name: &str) -> Option<(&ParsedFile, TypeDecl<'_>)> {
        self.files_of(package)
            .find_map(|file| file.find_type(name).map(|decl| (file, decl)))
    }

    /// Whether any available file of the package declares the type
    pub fn declares(&self, package: &PackageKey, name: &str) -> bool {
        self.files_of(package).any(|file| file.declares(name))
    }

    /// Human readable package description for error messages
    pub fn describe(&self, package: &PackageKey) -> String {
        let files: Vec<_> = self.files_of(package).map(ParsedFile::display).collect();
        match package {
            PackageKey::Primary => format!("package source ({})", files.join(", ")),
            PackageKey::Other(path) if files.is_empty() => format!("{path} (no source available)"),
            PackageKey::Other(path) => format!("{path} ({})", files.join(", ")),
        }
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        MockgenError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {e}", path.display()),
        ))
    })
}
