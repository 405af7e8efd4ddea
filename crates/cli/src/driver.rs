use anyhow::{bail, Context as AnyhowContext, Result};
use mockgen_model::{Extractor, GenerationRequest, Mode};
use mockgen_reflect::ReflectExtractor;
use mockgen_source::SourceExtractor;
use mockgen_synth::{inject_header, synthesize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Progress of one generation run. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    ModeSelected,
    Extracted,
    Synthesized,
    HeaderApplied,
    Written,
    Error,
}

impl Stage {
    fn next(self) -> Stage {
        match self {
            Stage::Idle => Stage::ModeSelected,
            Stage::ModeSelected => Stage::Extracted,
            Stage::Extracted => Stage::Synthesized,
            Stage::Synthesized => Stage::HeaderApplied,
            Stage::HeaderApplied => Stage::Written,
            Stage::Written | Stage::Error => self,
        }
    }
}

/// What a successful run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub destination: PathBuf,
    pub mode: Mode,
    /// Mock type names, in output order
    pub mocks: Vec<String>,
    pub bytes: usize,
}

/// Runs one request through extraction, synthesis, header injection and publish
#[derive(Debug)]
pub struct Driver {
    stage: Stage,
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver {
    pub fn new() -> Self {
        Self { stage: Stage::Idle }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Generate the mock file for `request`; on failure nothing is written
    pub fn run(&mut self, request: &GenerationRequest) -> Result<GenerationReport> {
        if self.stage != Stage::Idle {
            bail!("driver already ran (stage {:?})", self.stage);
        }
        match self.generate(request) {
            Ok(report) => Ok(report),
            Err(err) => {
                log::debug!("stage {:?} -> {:?}", self.stage, Stage::Error);
                self.stage = Stage::Error;
                discard_stale(&request.destination);
                Err(err)
            }
        }
    }

    fn advance(&mut self) {
        let next = self.stage.next();
        log::debug!("stage {:?} -> {next:?}", self.stage);
        self.stage = next;
    }

    fn generate(&mut self, request: &GenerationRequest) -> Result<GenerationReport> {
        request.validate()?;
        let template = request
            .copyright_file
            .as_deref()
            .map(|path| {
                fs::read_to_string(path)
                    .with_context(|| format!("Failed to read copyright file {}", path.display()))
            })
            .transpose()?;

        let extractor: Box<dyn Extractor> = match request.mode() {
            Mode::Source => Box::new(SourceExtractor::new()),
            Mode::Reflect => Box::new(ReflectExtractor::new()),
        };
        self.advance();

        let descriptors = extractor.extract(request)?;
        self.advance();

        let unit = synthesize(request, &descriptors)?;
        self.advance();

        let unit = inject_header(unit, template.as_deref());
        self.advance();

        let output = unit.render();
        write_atomically(&request.destination, output.as_bytes())?;
        self.advance();

        Ok(GenerationReport {
            destination: request.destination.clone(),
            mode: request.mode(),
            mocks: unit.mocks.into_iter().map(|m| m.mock_name).collect(),
            bytes: output.len(),
        })
    }
}

/// Remove output left by an earlier run so a failed run leaves no file behind
fn discard_stale(dest: &Path) {
    if dest.as_os_str().is_empty() {
        return;
    }
    match fs::remove_file(dest) {
        Ok(()) => log::debug!("removed stale {}", dest.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("failed to remove stale {}: {e}", dest.display()),
    }
}

/// Write to a temporary file next to `dest`, then rename it into place
pub fn write_atomically(dest: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".mockgen-")
        .suffix(".tmp")
        .tempfile_in(&dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to publish {}", dest.display()))?;
    Ok(())
}
