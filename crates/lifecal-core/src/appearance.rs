//! Day appearance rules.
//!
//! The base color comes from the first matching category (past, Sunday,
//! Saturday, weekday). Overlays are then applied in order: today's halo,
//! the birthday ring, the Sunday ring.

use serde::Serialize;

use crate::classify::{DayClass, DaySlot};
use crate::layout::Geometry;
use crate::style::{Color, StyleConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Border {
    pub color: Color,
    pub width: u32,
}

/// Ring and padding thicknesses in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingWidths {
    pub birthday: u32,
    pub sunday: u32,
    pub today_pad: u32,
}

impl From<&Geometry> for RingWidths {
    fn from(g: &Geometry) -> Self {
        Self {
            birthday: g.ring_birthday,
            sunday: g.ring_sunday,
            today_pad: g.today_pad,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Appearance {
    /// Transparent padding cell.
    Blank,
    Dot {
        fill: Color,
        border: Option<Border>,
    },
    /// Today: a `halo` disc with an `inner` disc inset by `padding`.
    Halo {
        halo: Color,
        padding: u32,
        inner: Color,
        border: Option<Border>,
    },
}

pub fn base_fill(day: &DayClass, style: &StyleConfig) -> Color {
    let p = &style.palette;

    if day.is_past {
        if !style.distinguish_past_weekend {
            p.past_day
        } else if day.is_saturday {
            p.past_saturday
        } else {
            p.past_weekday
        }
    } else if day.is_sunday {
        if day.is_birthday {
            p.sunday_red_inner_when_birthday
        } else {
            p.sunday_red
        }
    } else if day.is_saturday {
        p.future_saturday
    } else {
        p.future_weekday
    }
}

pub fn resolve_day(day: &DayClass, style: &StyleConfig, rings: RingWidths) -> Appearance {
    let p = &style.palette;
    let birthday_ring = Border {
        color: p.birthday_ring,
        width: rings.birthday,
    };
    let sunday_ring = Border {
        color: p.sunday_ring_color,
        width: rings.sunday,
    };

    if day.is_today {
        let border = if day.is_birthday {
            Some(birthday_ring)
        } else if style.show_sunday_ring && day.is_sunday {
            Some(sunday_ring)
        } else {
            None
        };

        return Appearance::Halo {
            halo: p.today_halo,
            padding: rings.today_pad,
            inner: p.accent,
            border,
        };
    }

    let fill = base_fill(day, style);
    let border = if day.is_birthday {
        Some(birthday_ring)
    } else if style.show_sunday_ring && day.is_sunday && !day.is_past {
        Some(sunday_ring)
    } else {
        None
    };

    Appearance::Dot { fill, border }
}

pub fn resolve(slot: &DaySlot, style: &StyleConfig, rings: RingWidths) -> Appearance {
    match slot {
        DaySlot::Blank => Appearance::Blank,
        DaySlot::Day(day) => resolve_day(day, style, rings),
    }
}
