use serde::Serialize;
use tracing::debug;

use crate::appearance::{self, Appearance, Border, RingWidths};
use crate::calendar::{MONTH_LABELS, ReferenceDate};
use crate::classify::DayClassifier;
use crate::grid::build_year;
use crate::layout::{Geometry, Rect};
use crate::progress::YearProgress;
use crate::style::{Color, StyleConfig};

pub const LABEL_WEIGHT: u16 = 600;
pub const FOOTER_WEIGHT: u16 = 700;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRequest {
    pub width: u32,
    pub height: u32,
    pub date: ReferenceDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Canvas,
    Content,
    MonthGrid,
    Month,
    Dots,
    Footer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawNode {
    Container {
        role: Role,
        rect: Rect,
        background: Option<Color>,
        children: Vec<DrawNode>,
    },
    Placeholder {
        rect: Rect,
    },
    Circle {
        rect: Rect,
        fill: Color,
        border: Option<Border>,
    },
    Halo {
        rect: Rect,
        halo: Color,
        padding: u32,
        inner: Color,
        border: Option<Border>,
    },
    Text {
        rect: Rect,
        text: String,
        font_size: u32,
        weight: u16,
        color: Color,
        align: TextAlign,
    },
    /// Rounded track with a proportional fill; `fill_percent` is 0..=100.
    Bar {
        rect: Rect,
        track: Color,
        fill: Color,
        fill_percent: f64,
    },
}

impl DrawNode {
    pub fn rect(&self) -> Rect {
        match self {
            DrawNode::Container { rect, .. }
            | DrawNode::Placeholder { rect }
            | DrawNode::Circle { rect, .. }
            | DrawNode::Halo { rect, .. }
            | DrawNode::Text { rect, .. }
            | DrawNode::Bar { rect, .. } => *rect,
        }
    }

    pub fn children(&self) -> &[DrawNode] {
        match self {
            DrawNode::Container { children, .. } => children.as_slice(),
            _ => &[],
        }
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a DrawNode>) {
        out.push(self);
        for child in self.children() {
            child.collect(out);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawTree {
    pub width: u32,
    pub height: u32,
    pub date: ReferenceDate,
    pub progress: YearProgress,
    pub root: DrawNode,
}

impl DrawTree {
    /// Depth-first, parents before children.
    pub fn nodes(&self) -> Vec<&DrawNode> {
        let mut out = Vec::new();
        self.root.collect(&mut out);
        out
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn slot_node(rect: Rect, appearance: Appearance) -> DrawNode {
    match appearance {
        Appearance::Blank => DrawNode::Placeholder { rect },
        Appearance::Dot { fill, border } => DrawNode::Circle { rect, fill, border },
        Appearance::Halo {
            halo,
            padding,
            inner,
            border,
        } => DrawNode::Halo {
            rect,
            halo,
            padding,
            inner,
            border,
        },
    }
}

#[tracing::instrument(skip(style), fields(date = %request.date))]
pub fn assemble(request: &RenderRequest, style: &StyleConfig) -> DrawTree {
    let geometry = Geometry::compute(request.width, request.height, &style.layout);
    let progress = YearProgress::for_date(request.date);
    let rings = RingWidths::from(&geometry);
    let classifier = DayClassifier::new(request.date, &style.birthdays);
    let palette = &style.palette;

    let months: Vec<DrawNode> = build_year(request.date.year())
        .iter()
        .enumerate()
        .map(|(index, grid)| {
            let index = index as u32;
            let dots = classifier
                .classify_grid(grid)
                .iter()
                .enumerate()
                .map(|(slot, day)| {
                    slot_node(
                        geometry.slot(index, slot as u32),
                        appearance::resolve(day, style, rings),
                    )
                })
                .collect();

            DrawNode::Container {
                role: Role::Month,
                rect: geometry.month_cell(index),
                background: None,
                children: vec![
                    DrawNode::Text {
                        rect: geometry.month_label(index),
                        text: MONTH_LABELS[index as usize].to_string(),
                        font_size: geometry.label_font,
                        weight: LABEL_WEIGHT,
                        color: palette.label,
                        align: TextAlign::Start,
                    },
                    DrawNode::Container {
                        role: Role::Dots,
                        rect: geometry.month_dots(index),
                        background: None,
                        children: dots,
                    },
                ],
            }
        })
        .collect();

    let footer_rect = geometry.footer();
    let footer = DrawNode::Container {
        role: Role::Footer,
        rect: footer_rect,
        background: None,
        children: vec![
            DrawNode::Text {
                rect: footer_rect,
                text: format!("{}d left", progress.days_left),
                font_size: geometry.footer_font,
                weight: FOOTER_WEIGHT,
                color: palette.accent,
                align: TextAlign::Start,
            },
            DrawNode::Text {
                rect: footer_rect,
                text: format!("{}%", progress.percent),
                font_size: geometry.footer_font,
                weight: FOOTER_WEIGHT,
                color: palette.subtle,
                align: TextAlign::End,
            },
        ],
    };

    let bar = DrawNode::Bar {
        rect: geometry.bar(),
        track: palette.bar_track,
        fill: palette.accent,
        fill_percent: progress.bar_fill_percent(),
    };

    let content = DrawNode::Container {
        role: Role::Content,
        rect: geometry.content(),
        background: None,
        children: vec![
            DrawNode::Container {
                role: Role::MonthGrid,
                rect: geometry.month_grid(),
                background: None,
                children: months,
            },
            footer,
            bar,
        ],
    };

    debug!(
        day_of_year = progress.day_of_year,
        days_left = progress.days_left,
        "assembled draw tree"
    );

    DrawTree {
        width: request.width,
        height: request.height,
        date: request.date,
        progress,
        root: DrawNode::Container {
            role: Role::Canvas,
            rect: geometry.canvas(),
            background: Some(palette.background),
            children: vec![content],
        },
    }
}
