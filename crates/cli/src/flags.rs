use anyhow::{bail, Context as AnyhowContext, Result};
use clap::Parser;
use mockgen_model::{
    guess_package_name, AuxFile, GenerationRequest, Target, DEFAULT_GO, DEFAULT_RUNTIME_IMPORT,
};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mockgen")]
#[command(about = "Generate gomock mocks for Go interfaces", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Go source file holding the interfaces (source mode)
    #[arg(long, conflicts_with = "archive")]
    pub source: Option<PathBuf>,

    /// Pre-built package model archive of the library (reflect mode)
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// Import path of the mocked package
    #[arg(long)]
    pub library: Option<String>,

    /// Interfaces to mock, in output order
    #[arg(long, value_delimiter = ',')]
    pub interfaces: Vec<String>,

    /// Package name of the generated file
    #[arg(long)]
    pub package: Option<String>,

    /// Output file
    #[arg(short = 'o', long)]
    pub destination: Option<PathBuf>,

    /// License template prepended to the output as comments
    #[arg(long)]
    pub copyright_file: Option<PathBuf>,

    /// Import path of the output package
    #[arg(long)]
    pub self_package: Option<String>,

    /// Import names for source mode: name=path,...
    #[arg(long, value_delimiter = ',', value_parser = parse_pair)]
    pub imports: Vec<(String, String)>,

    /// Extra source files for embedded interfaces: import_path=file.go,...
    #[arg(long, value_delimiter = ',', value_parser = parse_pair)]
    pub aux_files: Vec<(String, String)>,

    /// Mock type names: Interface=MockName,...
    #[arg(long, value_delimiter = ',', value_parser = parse_pair)]
    pub mock_names: Vec<(String, String)>,

    /// Import path of the call-expectation runtime
    #[arg(long)]
    pub runtime_import: Option<String>,

    /// Go toolchain binary used to run the reflect program
    #[arg(long, env = "MOCKGEN_GO")]
    pub go: Option<String>,

    /// TOML file with a full generation request; flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long)]
    pub quiet: bool,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected key=value, got {raw:?}")),
    }
}

impl Cli {
    /// Merge the config file (if any) with the flags into one request
    pub fn into_request(self) -> Result<GenerationRequest> {
        let base = match &self.config {
            Some(path) => Some(
                GenerationRequest::from_toml_file(path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
            ),
            None => None,
        };

        let mut target = self.select_target(base.as_ref().map(|r| r.target.clone()));
        self.apply_target_overrides(&mut target)?;

        let interfaces = if self.interfaces.is_empty() {
            base
                .as_ref()
                .map(|r| r.interfaces.clone())
                .unwrap_or_default()
        } else {
            self.interfaces.clone()
        };

        let package = match (&self.package, &base) {
            (Some(package), _) => package.clone(),
            (None, Some(base)) => base.package.clone(),
            (None, None) => match target.library() {
                Some(library) => format!("mock_{}", guess_package_name(library)),
                None => bail!("--package is required when the library import path is unknown"),
            },
        };

        let destination = match (&self.destination, &base) {
            (Some(dest), _) => dest.clone(),
            (None, Some(base)) => base.destination.clone(),
            (None, None) => bail!("--destination is required"),
        };

        let mut mock_names = base
            .as_ref()
            .map(|r| r.mock_names.clone())
            .unwrap_or_default();
        mock_names.extend(self.mock_names.iter().cloned());

        Ok(GenerationRequest {
            target,
            interfaces,
            package,
            destination,
            copyright_file: self
                .copyright_file
                .clone()
                .or_else(|| base.as_ref().and_then(|r| r.copyright_file.clone())),
            self_package: self
                .self_package
                .clone()
                .or_else(|| base.as_ref().and_then(|r| r.self_package.clone())),
            mock_names,
            runtime_import: self
                .runtime_import
                .clone()
                .or_else(|| base.as_ref().map(|r| r.runtime_import.clone()))
                .unwrap_or_else(|| DEFAULT_RUNTIME_IMPORT.to_string()),
        })
    }

    fn select_target(&self, base: Option<Target>) -> Target {
        let reflect = || Target::Reflect {
            library: String::new(),
            archive: None,
            go: DEFAULT_GO.to_string(),
        };
        match (&self.source, base) {
            (Some(source), Some(Target::Source {
                library,
                imports,
                aux_files,
                ..
            })) => Target::Source {
                source: source.clone(),
                library,
                imports,
                aux_files,
            },
            (Some(source), _) => Target::Source {
                source: source.clone(),
                library: None,
                imports: BTreeMap::new(),
                aux_files: Vec::new(),
            },
            (None, Some(Target::Source { .. })) if self.archive.is_some() => reflect(),
            (None, Some(target)) => target,
            (None, None) => reflect(),
        }
    }

    fn apply_target_overrides(&self, target: &mut Target) -> Result<()> {
        match target {
            Target::Source {
                library,
                imports,
                aux_files,
                ..
            } => {
                if self.library.is_some() {
                    library.clone_from(&self.library);
                }
                imports.extend(self.imports.iter().cloned());
                aux_files.extend(self.aux_files.iter().map(|(package, path)| AuxFile {
                    package: package.clone(),
                    path: PathBuf::from(path),
                }));
            }
            Target::Reflect {
                library,
                archive,
                go,
            } => {
                if !self.imports.is_empty() || !self.aux_files.is_empty() {
                    bail!("--imports and --aux-files only apply with --source");
                }
                if let Some(value) = &self.library {
                    library.clone_from(value);
                }
                if self.archive.is_some() {
                    archive.clone_from(&self.archive);
                }
                if let Some(value) = &self.go {
                    go.clone_from(value);
                }
            }
        }
        Ok(())
    }
}
