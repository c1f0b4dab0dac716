//! # brandoc
//!
//! Audit and conversion of corporate-template DOCX documents.
//!
//! A branded document is a three-section package: a protected cover page, a
//! body, and a protected back page. `brandoc` works in two modes:
//!
//! - **Audit** checks every body paragraph against the template's
//!   formatting rules and writes a copy with violations highlighted in
//!   yellow. Nothing else in the package changes, byte for byte.
//! - **Convert** takes arbitrary body content and re-emits it through the
//!   template: headings, bullets and tables are reclassified and rebuilt in
//!   the template's styles, while the template's own cover and back pages
//!   are carried through untouched.
//!
//! ## Example
//!
//! ```no_run
//! use brandoc::audit_file;
//!
//! let report = audit_file("input.docx", "audited.docx")?;
//! for violation in &report.violations {
//!     println!("{}: expected {}, found {}",
//!         violation.rule.name(), violation.expected, violation.observed);
//! }
//! # Ok::<(), brandoc::Error>(())
//! ```
//!
//! The top-level functions use the standard template contract
//! ([`TemplateConfig::standard`]); the component modules are public for
//! pipelines that need a different configuration.

pub mod audit;
pub mod classify;
pub mod container;
pub mod convert;
pub mod docx;
pub mod error;
pub mod guard;
pub mod model;
pub mod template;

pub use audit::{AuditReport, RuleId, Violation};
pub use container::OoxmlContainer;
pub use docx::DocxReader;
pub use error::{Error, Result};
pub use model::{Document, Paragraph, SemanticRole, Table, TextRun, TextStyle};
pub use template::{StyleTarget, TemplateConfig};

use classify::ClassifyContext;
use std::path::{Path, PathBuf};

/// Default location of the bundled template package, relative to the
/// invocation directory.
pub const DEFAULT_TEMPLATE_PATH: &str = "template_assets/template.docx";

/// Options for a conversion run.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Cover title override. Falls back to the input's own title paragraph.
    pub title: Option<String>,
    /// Template package path. Falls back to [`DEFAULT_TEMPLATE_PATH`].
    pub template: Option<PathBuf>,
}

/// Audit a DOCX package in memory.
///
/// Returns the highlighted output package and the violation report.
pub fn audit_bytes(data: Vec<u8>) -> Result<(Vec<u8>, AuditReport)> {
    let config = TemplateConfig::standard();
    let reader = DocxReader::from_bytes(data)?;
    let (xml, report) = audit_document(&reader, &config)?;
    let bytes = docx::build_package(reader.container(), &xml)?;
    Ok((bytes, report))
}

/// Audit a DOCX file and write the highlighted copy.
pub fn audit_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<AuditReport> {
    let config = TemplateConfig::standard();
    let reader = DocxReader::open(input)?;
    let (xml, report) = audit_document(&reader, &config)?;
    docx::write_package(reader.container(), &xml, output)?;
    Ok(report)
}

fn audit_document(reader: &DocxReader, config: &TemplateConfig) -> Result<(String, AuditReport)> {
    let mut doc = reader.parse()?;
    let zones = guard::partition(&doc)?;
    guard::tag_protected(&mut doc, &zones);

    let ctx = ClassifyContext {
        styles: reader.styles(),
        numbering: reader.numbering(),
        config,
    };
    classify::classify_document(&mut doc, &zones, &ctx);

    let report = audit::audit(&mut doc, &zones, config)?;
    Ok((doc.to_xml(), report))
}

/// Convert a DOCX package in memory using a template package.
pub fn convert_bytes(
    input: Vec<u8>,
    template: Vec<u8>,
    title: Option<&str>,
) -> Result<Vec<u8>> {
    let config = TemplateConfig::standard();
    let input_reader = DocxReader::from_bytes(input)?;
    let template_reader = DocxReader::from_bytes(template)?;
    let xml = convert_document(&input_reader, &template_reader, &config, title)?;
    docx::build_package(template_reader.container(), &xml)
}

/// Convert a DOCX file into the template layout and write the result.
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &ConvertOptions,
) -> Result<()> {
    let config = TemplateConfig::standard();
    let template_path = options
        .template
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE_PATH));

    let input_reader = DocxReader::open(input)?;
    let template_reader = DocxReader::open(template_path)?;
    let xml = convert_document(
        &input_reader,
        &template_reader,
        &config,
        options.title.as_deref(),
    )?;
    docx::write_package(template_reader.container(), &xml, output)
}

fn convert_document(
    input_reader: &DocxReader,
    template_reader: &DocxReader,
    config: &TemplateConfig,
    title: Option<&str>,
) -> Result<String> {
    let template_doc = template_reader.parse()?;
    let mut input_doc = input_reader.parse()?;

    let out = convert::convert_documents(
        &template_doc,
        &mut input_doc,
        input_reader.styles(),
        input_reader.numbering(),
        config,
        title,
    )?;
    Ok(out.to_xml())
}
