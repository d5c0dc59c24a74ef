use tracing::debug;

use super::{Renderer, escape_xml};
use crate::appearance::Border;
use crate::draw::{DrawNode, DrawTree, TextAlign};
use crate::layout::Rect;
use crate::style::Color;

const DEFAULT_FONT_FAMILY: &str =
    "-apple-system, BlinkMacSystemFont, 'SF Pro Display', 'Helvetica Neue', Arial, sans-serif";

/// Serializes a draw tree to a standalone SVG document.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    pub font_family: String,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
        }
    }
}

impl Renderer for SvgRenderer {
    type Output = String;

    fn render(&mut self, tree: &DrawTree) -> anyhow::Result<String> {
        let mut svg = String::new();
        let (width, height) = (tree.width, tree.height);

        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
        ));
        self.node(&mut svg, &tree.root);
        svg.push_str("</svg>\n");

        debug!(bytes = svg.len(), "rendered svg");
        Ok(svg)
    }
}

impl SvgRenderer {
    fn node(&self, svg: &mut String, node: &DrawNode) {
        match node {
            DrawNode::Container {
                rect,
                background,
                children,
                ..
            } => {
                if let Some(color) = background {
                    svg.push_str(&format!(
                        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{color}\"/>",
                        rect.x, rect.y, rect.width, rect.height
                    ));
                }
                for child in children {
                    self.node(svg, child);
                }
            }
            DrawNode::Placeholder { .. } => {}
            DrawNode::Circle { rect, fill, border } => {
                let inset = ring(svg, rect, border.as_ref());
                disc(svg, rect, inset, *fill);
            }
            DrawNode::Halo {
                rect,
                halo,
                padding,
                inner,
                border,
            } => {
                let inset = ring(svg, rect, border.as_ref());
                disc(svg, rect, inset, *halo);
                disc(svg, rect, inset + *padding as f64, *inner);
            }
            DrawNode::Text {
                rect,
                text,
                font_size,
                weight,
                color,
                align,
            } => {
                let (x, anchor) = match align {
                    TextAlign::Start => (rect.x, "start"),
                    TextAlign::End => (rect.right(), "end"),
                };
                svg.push_str(&format!(
                    "<text x=\"{x}\" y=\"{}\" text-anchor=\"{anchor}\" dominant-baseline=\"text-after-edge\" font-family=\"{}\" font-size=\"{font_size}\" font-weight=\"{weight}\" fill=\"{color}\">{}</text>",
                    rect.bottom(),
                    escape_xml(&self.font_family),
                    escape_xml(text)
                ));
            }
            DrawNode::Bar {
                rect,
                track,
                fill,
                fill_percent,
            } => {
                let radius = rect.height as f64 / 2.0;
                let filled = rect.width as f64 * fill_percent.clamp(0.0, 100.0) / 100.0;
                svg.push_str(&format!(
                    "<clipPath id=\"progress-bar\"><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{radius:.2}\" ry=\"{radius:.2}\"/></clipPath>",
                    rect.x, rect.y, rect.width, rect.height
                ));
                svg.push_str(&format!(
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{radius:.2}\" ry=\"{radius:.2}\" fill=\"{track}\"/>",
                    rect.x, rect.y, rect.width, rect.height
                ));
                svg.push_str(&format!(
                    "<rect x=\"{}\" y=\"{}\" width=\"{filled:.2}\" height=\"{}\" fill=\"{fill}\" clip-path=\"url(#progress-bar)\"/>",
                    rect.x, rect.y, rect.height
                ));
            }
        }
    }
}

fn center(rect: &Rect) -> (f64, f64, f64) {
    let cx = rect.x as f64 + rect.width as f64 / 2.0;
    let cy = rect.y as f64 + rect.height as f64 / 2.0;
    (cx, cy, rect.width.min(rect.height) as f64 / 2.0)
}

/// Draws the ring as the outermost disc and returns how far the fill is inset.
fn ring(svg: &mut String, rect: &Rect, border: Option<&Border>) -> f64 {
    match border {
        Some(border) => {
            disc(svg, rect, 0.0, border.color);
            border.width as f64
        }
        None => 0.0,
    }
}

fn disc(svg: &mut String, rect: &Rect, inset: f64, color: Color) {
    let (cx, cy, r) = center(rect);
    let r = (r - inset).max(0.0);
    svg.push_str(&format!(
        "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{r:.2}\" fill=\"{color}\"/>"
    ));
}
