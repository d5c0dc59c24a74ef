use std::fmt::Write as _;

use unicode_width::UnicodeWidthStr;

use super::Renderer;
use crate::draw::{DrawNode, DrawTree, Role, TextAlign};
use crate::layout::MONTH_COLUMNS;
use crate::style::Color;

const BAR_CELLS: usize = 42;
const MONTH_GAP: &str = "  ";

/// Terminal rendering of a draw tree, one glyph per day.
#[derive(Debug, Clone)]
pub struct AnsiPreview {
    color: bool,
}

struct MonthBlock {
    label: String,
    rows: Vec<String>,
}

impl AnsiPreview {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[38;2;{};{};{}m{text}\x1b[0m", color.r, color.g, color.b)
    }

    fn glyph(&self, node: &DrawNode) -> String {
        match node {
            DrawNode::Circle {
                fill,
                border: Some(_),
                ..
            } => self.paint("◉", *fill),
            DrawNode::Circle { fill, .. } => self.paint("●", *fill),
            DrawNode::Halo { inner, .. } => self.paint("◎", *inner),
            _ => " ".to_string(),
        }
    }

    fn month_block(&self, month: &DrawNode) -> MonthBlock {
        let mut block = MonthBlock {
            label: String::new(),
            rows: Vec::new(),
        };

        for child in month.children() {
            match child {
                DrawNode::Text { text, color, .. } => block.label = self.paint(text, *color),
                DrawNode::Container {
                    role: Role::Dots,
                    children,
                    ..
                } => {
                    block.rows = children
                        .chunks(7)
                        .map(|week| {
                            week.iter()
                                .map(|slot| self.glyph(slot))
                                .collect::<Vec<_>>()
                                .join(" ")
                        })
                        .collect();
                }
                _ => {}
            }
        }

        block
    }
}

impl Renderer for AnsiPreview {
    type Output = String;

    #[tracing::instrument(skip(self, tree))]
    fn render(&mut self, tree: &DrawTree) -> anyhow::Result<String> {
        let nodes = tree.nodes();
        let months: Vec<MonthBlock> = nodes
            .iter()
            .filter(|node| {
                matches!(
                    node,
                    DrawNode::Container {
                        role: Role::Month,
                        ..
                    }
                )
            })
            .map(|node| self.month_block(node))
            .collect();

        // seven glyphs separated by single spaces
        let column_width = 7 * 2 - 1;
        let mut out = String::new();

        for chunk in months.chunks(MONTH_COLUMNS as usize) {
            let labels: Vec<&str> = chunk.iter().map(|m| m.label.as_str()).collect();
            write_padded_row(&mut out, &labels, column_width)?;

            let height = chunk.iter().map(|m| m.rows.len()).max().unwrap_or(0);
            for row in 0..height {
                let cells: Vec<&str> = chunk
                    .iter()
                    .map(|m| m.rows.get(row).map(String::as_str).unwrap_or(""))
                    .collect();
                write_padded_row(&mut out, &cells, column_width)?;
            }
            writeln!(out)?;
        }

        let total_width = column_width * MONTH_COLUMNS as usize + MONTH_GAP.len() * 2;
        let mut left = String::new();
        let mut right = String::new();
        let footer = nodes.iter().find(|node| {
            matches!(
                node,
                DrawNode::Container {
                    role: Role::Footer,
                    ..
                }
            )
        });
        for node in footer.map(|f| f.children()).unwrap_or_default() {
            if let DrawNode::Text {
                text, color, align, ..
            } = node
            {
                match align {
                    TextAlign::Start => left = self.paint(text, *color),
                    TextAlign::End => right = self.paint(text, *color),
                }
            }
        }
        let used = visible_width(&left) + visible_width(&right);
        writeln!(
            out,
            "{left}{}{right}",
            " ".repeat(total_width.saturating_sub(used).max(1))
        )?;

        if let Some((track, fill, pct)) = nodes.iter().find_map(|node| match node {
            DrawNode::Bar {
                track,
                fill,
                fill_percent,
                ..
            } => Some((*track, *fill, *fill_percent)),
            _ => None,
        }) {
            let filled = ((pct.clamp(0.0, 100.0) / 100.0) * BAR_CELLS as f64).round() as usize;
            writeln!(
                out,
                "{}{}",
                self.paint(&"█".repeat(filled), fill),
                self.paint(&"░".repeat(BAR_CELLS - filled), track)
            )?;
        }

        Ok(out)
    }
}

fn write_padded_row(out: &mut String, cells: &[&str], width: usize) -> anyhow::Result<()> {
    let mut line = String::new();
    for (idx, cell) in cells.iter().enumerate() {
        if idx > 0 {
            line.push_str(MONTH_GAP);
        }
        let padding = width.saturating_sub(visible_width(cell));
        write!(line, "{cell}{}", " ".repeat(padding))?;
    }
    writeln!(out, "{}", line.trim_end())?;
    Ok(())
}

fn visible_width(s: &str) -> usize {
    UnicodeWidthStr::width(strip_ansi(s).as_str())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
