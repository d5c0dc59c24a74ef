use serde::Serialize;

use crate::grid::{DAYS_PER_WEEK, MAX_WEEKS};
use crate::style::LayoutRatios;

pub const MONTH_COLUMNS: u32 = 3;
pub const MONTH_ROWS: u32 = 4;

const DOT_GAP_RATIO: f64 = 0.06;
const BIRTHDAY_RING_RATIO: f64 = 0.22;
const TODAY_PAD_RATIO: f64 = 0.16;
const SUNDAY_RING_RATIO: f64 = 0.14;
const LABEL_FONT_RATIO: f64 = 1.25;
const LABEL_HEIGHT_RATIO: f64 = 2.0;
const FOOTER_GAP_RATIO: f64 = 0.45;
const FOOTER_FONT_RATIO: f64 = 0.04;
const BAR_HEIGHT_RATIO: f64 = 0.008;
const BAR_GAP_RATIO: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn square(x: i32, y: i32, side: u32) -> Self {
        Self::new(x, y, side, side)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }
}

/// `Math.round` semantics: halves round up.
fn round_px(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn px(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

/// Pixel geometry shared by every month of one render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub top_margin: u32,
    pub bottom_margin: u32,
    pub content_width: u32,
    pub side_margin: u32,
    pub col_gap: u32,
    pub row_gap: u32,
    pub month_width: u32,
    pub dot_gap: u32,
    pub dot: u32,
    pub ring_birthday: u32,
    pub today_pad: u32,
    pub ring_sunday: u32,
    pub label_font: u32,
    pub label_height: u32,
    pub dots_height: u32,
    pub month_height: u32,
    pub footer_gap: u32,
    pub footer_font: u32,
    pub bar_height: u32,
    pub bar_gap: u32,
}

impl Geometry {
    #[tracing::instrument(level = "debug", skip(ratios))]
    pub fn compute(width: u32, height: u32, ratios: &LayoutRatios) -> Self {
        let w = width as f64;
        let h = height as f64;

        let top_margin = round_px(h * ratios.top_margin_pct);
        let bottom_margin = round_px(h * ratios.bottom_margin_pct);
        let content_width = round_px(w * ratios.content_width_pct);
        let side_margin = round_px((width as i64 - content_width) as f64 / 2.0);
        let col_gap = round_px(w * ratios.col_gap_pct);
        let row_gap = round_px(w * ratios.row_gap_pct);

        let cols = MONTH_COLUMNS as i64;
        let month_width = (content_width - col_gap * (cols - 1)).div_euclid(cols).max(0);

        let per_week = DAYS_PER_WEEK as i64;
        let dot_gap = round_px(month_width as f64 * DOT_GAP_RATIO).max(10);
        let dot = (month_width - dot_gap * (per_week - 1)).div_euclid(per_week).max(10);
        let dot_f = dot as f64;

        let ring_birthday = round_px(dot_f * BIRTHDAY_RING_RATIO).max(3);
        let today_pad = round_px(dot_f * TODAY_PAD_RATIO).max(2);
        let ring_sunday = round_px(dot_f * SUNDAY_RING_RATIO).max(2);

        let label_font = round_px(dot_f * LABEL_FONT_RATIO).max(18);
        let label_height = round_px(dot_f * LABEL_HEIGHT_RATIO);

        let weeks = MAX_WEEKS as i64;
        let dots_height = weeks * dot + (weeks - 1) * dot_gap;
        let month_height = label_height + dots_height;

        let footer_gap = round_px(dot_f * FOOTER_GAP_RATIO).max(6);
        let footer_font = round_px(w * FOOTER_FONT_RATIO).max(22);

        let bar_height = round_px(w * BAR_HEIGHT_RATIO).max(6);
        let bar_gap = round_px(bar_height as f64 * BAR_GAP_RATIO).max(8);

        let geometry = Self {
            width,
            height,
            top_margin: px(top_margin),
            bottom_margin: px(bottom_margin),
            content_width: px(content_width),
            side_margin: px(side_margin),
            col_gap: px(col_gap),
            row_gap: px(row_gap),
            month_width: px(month_width),
            dot_gap: px(dot_gap),
            dot: px(dot),
            ring_birthday: px(ring_birthday),
            today_pad: px(today_pad),
            ring_sunday: px(ring_sunday),
            label_font: px(label_font),
            label_height: px(label_height),
            dots_height: px(dots_height),
            month_height: px(month_height),
            footer_gap: px(footer_gap),
            footer_font: px(footer_font),
            bar_height: px(bar_height),
            bar_gap: px(bar_gap),
        };

        tracing::debug!(
            month_width = geometry.month_width,
            dot = geometry.dot,
            dot_gap = geometry.dot_gap,
            month_height = geometry.month_height,
            "computed geometry"
        );

        geometry
    }

    pub fn canvas(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn grid_height(&self) -> u32 {
        MONTH_ROWS * self.month_height + (MONTH_ROWS - 1) * self.row_gap
    }

    pub fn content(&self) -> Rect {
        let height = self.grid_height()
            + self.footer_gap
            + self.footer_font
            + self.bar_gap
            + self.bar_height;
        Rect::new(
            self.side_margin as i32,
            self.top_margin as i32,
            self.content_width,
            height,
        )
    }

    pub fn month_grid(&self) -> Rect {
        Rect::new(
            self.side_margin as i32,
            self.top_margin as i32,
            self.content_width,
            self.grid_height(),
        )
    }

    /// Cell of month `index` (0 = January), three months per row.
    pub fn month_cell(&self, index: u32) -> Rect {
        let col = index % MONTH_COLUMNS;
        let row = index / MONTH_COLUMNS;
        let x = self.side_margin + col * (self.month_width + self.col_gap);
        let y = self.top_margin + row * (self.month_height + self.row_gap);
        Rect::new(x as i32, y as i32, self.month_width, self.month_height)
    }

    pub fn month_label(&self, index: u32) -> Rect {
        let cell = self.month_cell(index);
        Rect::new(cell.x, cell.y, self.month_width, self.label_height)
    }

    pub fn month_dots(&self, index: u32) -> Rect {
        let cell = self.month_cell(index);
        Rect::new(
            cell.x,
            cell.y + self.label_height as i32,
            self.month_width,
            self.dots_height,
        )
    }

    /// Square of slot `slot` inside month `index`, seven slots per row.
    pub fn slot(&self, index: u32, slot: u32) -> Rect {
        let dots = self.month_dots(index);
        let step = self.dot + self.dot_gap;
        let x = dots.x + ((slot % DAYS_PER_WEEK) * step) as i32;
        let y = dots.y + ((slot / DAYS_PER_WEEK) * step) as i32;
        Rect::square(x, y, self.dot)
    }

    pub fn footer(&self) -> Rect {
        let grid = self.month_grid();
        Rect::new(
            grid.x,
            grid.bottom() + self.footer_gap as i32,
            self.content_width,
            self.footer_font,
        )
    }

    pub fn bar(&self) -> Rect {
        let footer = self.footer();
        Rect::new(
            footer.x,
            footer.bottom() + self.bar_gap as i32,
            self.content_width,
            self.bar_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_phone_canvas() {
        let g = Geometry::compute(1179, 2556, &LayoutRatios::default());

        assert_eq!(g.top_margin, 767);
        assert_eq!(g.bottom_margin, 562);
        assert_eq!(g.content_width, 849);
        assert_eq!(g.side_margin, 165);
        assert_eq!(g.col_gap, 71);
        assert_eq!(g.row_gap, 65);
        assert_eq!(g.month_width, 235);
        assert_eq!(g.dot_gap, 14);
        assert_eq!(g.dot, 21);
        assert_eq!(g.ring_birthday, 5);
        assert_eq!(g.today_pad, 3);
        assert_eq!(g.ring_sunday, 3);
        assert_eq!(g.label_font, 26);
        assert_eq!(g.label_height, 42);
        assert_eq!(g.dots_height, 196);
        assert_eq!(g.month_height, 238);
        assert_eq!(g.footer_gap, 9);
        assert_eq!(g.footer_font, 47);
        assert_eq!(g.bar_height, 9);
        assert_eq!(g.bar_gap, 11);
    }

    #[test]
    fn tiny_canvas_hits_pixel_floors() {
        let g = Geometry::compute(100, 100, &LayoutRatios::default());

        assert_eq!(g.month_width, 20);
        assert_eq!(g.dot_gap, 10);
        assert_eq!(g.dot, 10);
        assert_eq!(g.ring_birthday, 3);
        assert_eq!(g.today_pad, 2);
        assert_eq!(g.ring_sunday, 2);
        assert_eq!(g.label_font, 18);
        assert_eq!(g.footer_gap, 6);
        assert_eq!(g.footer_font, 22);
        assert_eq!(g.bar_height, 6);
        assert_eq!(g.bar_gap, 8);
    }

    #[test]
    fn months_flow_three_per_row() {
        let g = Geometry::compute(1179, 2556, &LayoutRatios::default());

        let jan = g.month_cell(0);
        let feb = g.month_cell(1);
        let apr = g.month_cell(3);
        assert_eq!(jan, Rect::new(165, 767, 235, 238));
        assert_eq!(feb.x, jan.x + 235 + 71);
        assert_eq!(feb.y, jan.y);
        assert_eq!(apr.x, jan.x);
        assert_eq!(apr.y, jan.y + 238 + 65);

        let dec = g.month_cell(11);
        assert_eq!(dec.bottom(), g.month_grid().bottom());
        assert!(dec.right() <= g.side_margin as i32 + g.content_width as i32);
    }

    #[test]
    fn slots_wrap_every_seven() {
        let g = Geometry::compute(1179, 2556, &LayoutRatios::default());

        let first = g.slot(0, 0);
        let seventh = g.slot(0, 6);
        let eighth = g.slot(0, 7);
        assert_eq!(first, Rect::square(165, 767 + 42, 21));
        assert_eq!(seventh.x, first.x + 6 * 35);
        assert!(seventh.right() <= g.month_cell(0).right());
        assert_eq!(eighth.x, first.x);
        assert_eq!(eighth.y, first.y + 35);

        let last = g.slot(0, 41);
        assert_eq!(last.bottom(), g.month_cell(0).bottom());
    }

    #[test]
    fn footer_and_bar_follow_grid() {
        let g = Geometry::compute(1179, 2556, &LayoutRatios::default());

        let footer = g.footer();
        let bar = g.bar();
        assert_eq!(footer.y, g.month_grid().bottom() + 9);
        assert_eq!(bar.y, footer.bottom() + 11);
        assert_eq!(bar.height, 9);
        assert_eq!(bar.bottom(), g.content().bottom());
    }
}
