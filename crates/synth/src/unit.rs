use crate::mock::{synthesize_mock, MockBlock};
use crate::writer::GoWriter;
use itertools::Itertools;
use mockgen_model::{
    GenerationRequest, ImportRegistry, InterfaceDescriptor, MockgenError, Result, Target,
};
use std::collections::HashSet;

/// One generated file: optional header, preamble (banner, package, imports), mocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub header: Option<String>,
    pub preamble: String,
    pub mocks: Vec<MockBlock>,
}

impl GeneratedUnit {
    pub fn new(preamble: impl Into<String>, mocks: Vec<MockBlock>) -> Self {
        Self {
            header: None,
            preamble: preamble.into(),
            mocks,
        }
    }

    /// Output without the header
    pub fn body(&self) -> String {
        let mut body = self.preamble.clone();
        for mock in &self.mocks {
            body.push_str(&mock.text);
        }
        body
    }

    /// Full output: header followed by body
    pub fn render(&self) -> String {
        let mut out = self.header.clone().unwrap_or_default();
        out.push_str(&self.body());
        out
    }
}

/// Text of the `// Source:` banner line
pub fn source_line(request: &GenerationRequest) -> String {
    match &request.target {
        Target::Source { .. } => request.target.describe(),
        Target::Reflect { .. } => format!(
            "{} (interfaces: {})",
            request.target.describe(),
            request.interfaces.join(", ")
        ),
    }
}

/// Build the file for `descriptors`, one mock per descriptor in the given order
pub fn synthesize(
    request: &GenerationRequest,
    descriptors: &[InterfaceDescriptor],
) -> Result<GeneratedUnit> {
    let mut mock_names = HashSet::new();
    for descriptor in descriptors {
        let mock = request.mock_name(&descriptor.name);
        if !mock_names.insert(mock.clone()) {
            return Err(MockgenError::invalid_request(format!(
                "mock name {mock} is used for more than one interface"
            )));
        }
    }

    let registry = ImportRegistry::build(
        descriptors,
        request.self_package.as_deref(),
        &request.runtime_import,
    );

    let mut w = GoWriter::new();
    w.line("// Code generated by MockGen. DO NOT EDIT.");
    w.line(format!("// Source: {}", source_line(request)));
    w.blank();
    w.line(format!(
        "// Package {} is a generated GoMock package.",
        request.package
    ));
    w.line(format!("package {}", request.package));
    w.blank();
    w.enclosed("import (", ")", |w| {
        for (path, alias) in registry.imports() {
            w.line(format!("{alias} {path:?}"));
        }
    });
    let preamble = w.finish();

    let mocks = descriptors
        .iter()
        .map(|d| synthesize_mock(d, &request.mock_name(&d.name), &registry))
        .collect_vec();

    log::debug!(
        "synthesized {} mocks with {} imports",
        mocks.len(),
        registry.len()
    );
    Ok(GeneratedUnit::new(preamble, mocks))
}
