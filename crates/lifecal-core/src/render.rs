use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, anyhow};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::draw::DrawTree;

mod preview;
mod svg;

pub use preview::AnsiPreview;
pub use svg::SvgRenderer;

/// Turns a draw tree into an output document. Implementations do no layout of their own.
pub trait Renderer {
    type Output;

    fn render(&mut self, tree: &DrawTree) -> anyhow::Result<Self::Output>;
}

#[derive(Debug, Clone, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    type Output = String;

    fn render(&mut self, tree: &DrawTree) -> anyhow::Result<String> {
        tree.to_json().context("failed to serialize draw tree")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Svg,
    Json,
    Preview,
}

impl OutputFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "image/svg+xml",
            OutputFormat::Json => "application/json",
            OutputFormat::Preview => "text/plain; charset=utf-8",
        }
    }
}

pub fn render_to_string(tree: &DrawTree, format: OutputFormat, color: bool) -> anyhow::Result<String> {
    match format {
        OutputFormat::Svg => SvgRenderer::default().render(tree),
        OutputFormat::Json => JsonRenderer.render(tree),
        OutputFormat::Preview => AnsiPreview::new(color).render(tree),
    }
}

/// Writes to stdout, or atomically replaces `path`.
#[tracing::instrument(skip(text))]
pub fn write_output(text: &str, path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            writeln!(out)?;
        }
        return Ok(());
    };

    debug!(file = %path.display(), bytes = text.len(), "writing output atomically");

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    temp.write_all(text.as_bytes())?;
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("<a & 'b'>"), "&lt;a &amp; &apos;b&apos;&gt;");
    }

    #[test]
    fn writes_file_atomically() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("year.svg");

        write_output("<svg/>", Some(&path)).expect("first write");
        write_output("<svg></svg>", Some(&path)).expect("second write");

        let text = std::fs::read_to_string(&path).expect("read output");
        assert_eq!(text, "<svg></svg>");
    }

    #[test]
    fn content_types() {
        assert_eq!(OutputFormat::Svg.content_type(), "image/svg+xml");
        assert_eq!(OutputFormat::Json.content_type(), "application/json");
    }
}
