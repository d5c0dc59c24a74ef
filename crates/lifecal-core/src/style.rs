use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use anyhow::anyhow;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calendar::mmdd;

/// An sRGB color written as `#rgb` or `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn hex(value: u32) -> Self {
        Self {
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let digits = raw
            .strip_prefix('#')
            .ok_or_else(|| anyhow!("color must start with '#', got: {raw}"))?;

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow!("color has non-hex digits: {raw}"));
        }

        let channel = |text: &str| u8::from_str_radix(text, 16).map_err(|e| anyhow!("{raw}: {e}"));
        match digits.len() {
            3 => {
                let expand = |i: usize| channel(&digits[i..i + 1].repeat(2));
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => Err(anyhow!("color must have 3 or 6 hex digits, got: {raw}")),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub background: Color,
    pub label: Color,
    pub subtle: Color,
    pub accent: Color,
    pub past_day: Color,
    pub past_weekday: Color,
    pub past_saturday: Color,
    pub future_weekday: Color,
    pub future_saturday: Color,
    pub sunday_red: Color,
    pub sunday_red_inner_when_birthday: Color,
    pub birthday_ring: Color,
    pub today_halo: Color,
    pub sunday_ring_color: Color,
    pub bar_track: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::hex(0x0f0f10),
            label: Color::hex(0xa9a9aa),
            subtle: Color::hex(0x7c7c7d),
            accent: Color::hex(0xff7a00),
            past_day: Color::hex(0xe9e9ea),
            past_weekday: Color::hex(0xe9e9ea),
            past_saturday: Color::hex(0xcfcfd1),
            future_weekday: Color::hex(0x2f2f31),
            future_saturday: Color::hex(0x6b6b70),
            sunday_red: Color::hex(0xff3b30),
            sunday_red_inner_when_birthday: Color::hex(0xb3261e),
            birthday_ring: Color::hex(0xff3b30),
            today_halo: Color::hex(0xf2f2f2),
            sunday_ring_color: Color::hex(0xf2f2f2),
            bar_track: Color::hex(0x1b1b1d),
        }
    }
}

/// Fractions of the canvas: margins of the height, widths and gaps of the width.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRatios {
    pub top_margin_pct: f64,
    pub bottom_margin_pct: f64,
    pub content_width_pct: f64,
    pub col_gap_pct: f64,
    pub row_gap_pct: f64,
}

impl Default for LayoutRatios {
    fn default() -> Self {
        Self {
            top_margin_pct: 0.30,
            bottom_margin_pct: 0.22,
            content_width_pct: 0.72,
            col_gap_pct: 0.06,
            row_gap_pct: 0.055,
        }
    }
}

fn mmdd_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{2}-\d{2}$").expect("static regex is valid"))
}

/// Fixed `MM-DD` birthdays; matching ignores the year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BirthdaySet(BTreeSet<String>);

impl BirthdaySet {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            entries
                .into_iter()
                .map(|entry| entry.as_ref().trim().to_string())
                .filter(|entry| !entry.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, mmdd: &str) -> bool {
        self.0.contains(mmdd)
    }

    pub fn contains_day(&self, month0: u32, day: u32) -> bool {
        self.contains(&mmdd(month0, day))
    }

    /// Entries that are not `MM-DD` and so can never match a day.
    pub fn malformed(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter(|entry| !mmdd_pattern().is_match(entry))
            .map(String::as_str)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum StylePreset {
    /// Uniform past color, Sunday ring, birthday rings, today halo.
    #[default]
    Default,
    /// Past Saturdays kept distinct from other past days, no Sunday ring.
    PastWeekend,
    /// Blue weekends and no birthdays. Approximates the blue-weekend variant:
    /// past Sundays share the past weekday color instead of the blue past
    /// Saturday color.
    WeekendBlue,
}

impl fmt::Display for StylePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StylePreset::Default => "default",
            StylePreset::PastWeekend => "past-weekend",
            StylePreset::WeekendBlue => "weekend-blue",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleConfig {
    #[serde(flatten)]
    pub palette: Palette,
    #[serde(flatten)]
    pub layout: LayoutRatios,
    pub show_sunday_ring: bool,
    pub distinguish_past_weekend: bool,
    pub birthdays: BirthdaySet,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self::preset(StylePreset::Default)
    }
}

impl StyleConfig {
    pub fn preset(preset: StylePreset) -> Self {
        let base = Self {
            palette: Palette::default(),
            layout: LayoutRatios::default(),
            show_sunday_ring: true,
            distinguish_past_weekend: false,
            birthdays: BirthdaySet::from_entries(["05-01", "03-28", "10-08", "11-08", "11-24"]),
        };

        match preset {
            StylePreset::Default => base,
            StylePreset::PastWeekend => Self {
                show_sunday_ring: false,
                distinguish_past_weekend: true,
                ..base
            },
            StylePreset::WeekendBlue => {
                let weekend = Color::hex(0x25324a);
                Self {
                    palette: Palette {
                        past_saturday: Color::hex(0xb9d6ff),
                        future_saturday: weekend,
                        sunday_red: weekend,
                        sunday_red_inner_when_birthday: weekend,
                        ..base.palette
                    },
                    show_sunday_ring: false,
                    distinguish_past_weekend: true,
                    birthdays: BirthdaySet::default(),
                    ..base
                }
            }
        }
    }

    /// Returns a new config where every field present in `overrides` wins.
    pub fn merged(&self, overrides: &PartialStyle) -> Self {
        let o = overrides;
        let p = &self.palette;
        let l = &self.layout;

        Self {
            palette: Palette {
                background: o.background.unwrap_or(p.background),
                label: o.label.unwrap_or(p.label),
                subtle: o.subtle.unwrap_or(p.subtle),
                accent: o.accent.unwrap_or(p.accent),
                past_day: o.past_day.unwrap_or(p.past_day),
                past_weekday: o.past_weekday.unwrap_or(p.past_weekday),
                past_saturday: o.past_saturday.unwrap_or(p.past_saturday),
                future_weekday: o.future_weekday.unwrap_or(p.future_weekday),
                future_saturday: o.future_saturday.unwrap_or(p.future_saturday),
                sunday_red: o.sunday_red.unwrap_or(p.sunday_red),
                sunday_red_inner_when_birthday: o
                    .sunday_red_inner_when_birthday
                    .unwrap_or(p.sunday_red_inner_when_birthday),
                birthday_ring: o.birthday_ring.unwrap_or(p.birthday_ring),
                today_halo: o.today_halo.unwrap_or(p.today_halo),
                sunday_ring_color: o.sunday_ring_color.unwrap_or(p.sunday_ring_color),
                bar_track: o.bar_track.unwrap_or(p.bar_track),
            },
            layout: LayoutRatios {
                top_margin_pct: o.top_margin_pct.unwrap_or(l.top_margin_pct),
                bottom_margin_pct: o.bottom_margin_pct.unwrap_or(l.bottom_margin_pct),
                content_width_pct: o.content_width_pct.unwrap_or(l.content_width_pct),
                col_gap_pct: o.col_gap_pct.unwrap_or(l.col_gap_pct),
                row_gap_pct: o.row_gap_pct.unwrap_or(l.row_gap_pct),
            },
            show_sunday_ring: o.show_sunday_ring.unwrap_or(self.show_sunday_ring),
            distinguish_past_weekend: o
                .distinguish_past_weekend
                .unwrap_or(self.distinguish_past_weekend),
            birthdays: o
                .birthdays
                .as_ref()
                .map(BirthdaySet::from_entries)
                .unwrap_or_else(|| self.birthdays.clone()),
        }
    }

    /// Replaces ratios outside `[0, 1]` with defaults and reports birthdays that can't match.
    pub fn sanitized(self) -> Self {
        let defaults = LayoutRatios::default();
        let fix = |name: &str, value: f64, fallback: f64| {
            if value.is_finite() && (0.0..=1.0).contains(&value) {
                value
            } else {
                warn!(key = name, value, fallback, "layout ratio out of range; using default");
                fallback
            }
        };

        let l = &self.layout;
        let layout = LayoutRatios {
            top_margin_pct: fix("topMarginPct", l.top_margin_pct, defaults.top_margin_pct),
            bottom_margin_pct: fix(
                "bottomMarginPct",
                l.bottom_margin_pct,
                defaults.bottom_margin_pct,
            ),
            content_width_pct: fix(
                "contentWidthPct",
                l.content_width_pct,
                defaults.content_width_pct,
            ),
            col_gap_pct: fix("colGapPct", l.col_gap_pct, defaults.col_gap_pct),
            row_gap_pct: fix("rowGapPct", l.row_gap_pct, defaults.row_gap_pct),
        };

        for entry in self.birthdays.malformed() {
            warn!(birthday = %entry, "birthday is not MM-DD and will never match");
        }

        Self { layout, ..self }
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).map_err(|e| anyhow!("failed to serialize style: {e}"))
    }
}

/// A style source where every key is optional. Keys follow the camelCase names
/// of `style.json`; `bg` and `futureDay` are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialStyle {
    #[serde(alias = "bg")]
    pub background: Option<Color>,
    pub label: Option<Color>,
    pub subtle: Option<Color>,
    pub accent: Option<Color>,
    pub past_day: Option<Color>,
    pub past_weekday: Option<Color>,
    pub past_saturday: Option<Color>,
    #[serde(alias = "futureDay")]
    pub future_weekday: Option<Color>,
    pub future_saturday: Option<Color>,
    pub sunday_red: Option<Color>,
    pub sunday_red_inner_when_birthday: Option<Color>,
    pub birthday_ring: Option<Color>,
    pub today_halo: Option<Color>,
    pub sunday_ring_color: Option<Color>,
    pub bar_track: Option<Color>,

    pub top_margin_pct: Option<f64>,
    pub bottom_margin_pct: Option<f64>,
    pub content_width_pct: Option<f64>,
    pub col_gap_pct: Option<f64>,
    pub row_gap_pct: Option<f64>,

    pub show_sunday_ring: Option<bool>,
    pub distinguish_past_weekend: Option<bool>,
    pub birthdays: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl PartialStyle {
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.extra.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex_colors() {
        assert_eq!("#fff".parse::<Color>().expect("short"), Color::hex(0xffffff));
        assert_eq!("#FF7A00".parse::<Color>().expect("long"), Color::hex(0xff7a00));
        assert_eq!(Color::hex(0x0f0f10).to_string(), "#0f0f10");
        assert!("ff7a00".parse::<Color>().is_err());
        assert!("#ff7a0".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());
    }

    #[test]
    fn birthday_set_trims_and_drops_empty_entries() {
        let set = BirthdaySet::from_entries([" 03-28 ", "", "  ", "3-8"]);
        assert_eq!(set, BirthdaySet::from_entries(["03-28", "3-8"]));
        assert!(set.contains("03-28"));
        assert!(set.contains_day(2, 28));
        assert_eq!(set.malformed(), vec!["3-8"]);
    }

    #[test]
    fn merge_only_touches_present_keys() {
        let base = StyleConfig::default();
        let overrides = PartialStyle {
            accent: Some(Color::hex(0x00ff00)),
            show_sunday_ring: Some(false),
            birthdays: Some(vec!["01-01".to_string()]),
            ..PartialStyle::default()
        };

        let merged = base.merged(&overrides);
        assert_eq!(merged.palette.accent, Color::hex(0x00ff00));
        assert!(!merged.show_sunday_ring);
        assert_eq!(merged.birthdays, BirthdaySet::from_entries(["01-01"]));
        assert_eq!(merged.palette.background, base.palette.background);
        assert_eq!(merged.layout, base.layout);

        assert_eq!(base.merged(&PartialStyle::default()), base);
    }

    #[test]
    fn sanitize_replaces_out_of_range_ratios() {
        let style = StyleConfig::default().merged(&PartialStyle {
            top_margin_pct: Some(1.5),
            col_gap_pct: Some(f64::NAN),
            row_gap_pct: Some(0.1),
            ..PartialStyle::default()
        });

        let clean = style.sanitized();
        assert_eq!(clean.layout.top_margin_pct, 0.30);
        assert_eq!(clean.layout.col_gap_pct, 0.06);
        assert_eq!(clean.layout.row_gap_pct, 0.1);
    }

    #[test]
    fn presets_differ_only_where_expected() {
        let default = StyleConfig::preset(StylePreset::Default);
        let past_weekend = StyleConfig::preset(StylePreset::PastWeekend);
        let blue = StyleConfig::preset(StylePreset::WeekendBlue);

        assert!(default.show_sunday_ring);
        assert!(!default.distinguish_past_weekend);
        assert!(past_weekend.distinguish_past_weekend);
        assert_eq!(past_weekend.palette, default.palette);
        assert_eq!(blue.palette.sunday_red, blue.palette.future_saturday);
        assert_eq!(blue.birthdays, BirthdaySet::default());
    }

    #[test]
    fn style_json_keys_deserialize() {
        let raw = r##"{
            "bg": "#000000",
            "futureDay": "#111111",
            "sundayRedInnerWhenBirthday": "#222222",
            "topMarginPct": 0.25,
            "showSundayRing": false,
            "birthdays": ["12-24"],
            "fontFamily": "Inter"
        }"##;

        let partial: PartialStyle = serde_json::from_str(raw).expect("parse style json");
        assert_eq!(partial.background, Some(Color::hex(0x000000)));
        assert_eq!(partial.future_weekday, Some(Color::hex(0x111111)));
        assert_eq!(partial.sunday_red_inner_when_birthday, Some(Color::hex(0x222222)));
        assert_eq!(partial.top_margin_pct, Some(0.25));
        assert_eq!(partial.show_sunday_ring, Some(false));
        assert_eq!(partial.unknown_keys().collect::<Vec<_>>(), vec!["fontFamily"]);
    }

    #[test]
    fn style_serializes_to_toml() {
        let text = StyleConfig::default().to_toml_string().expect("serialize");
        assert!(text.contains("accent = \"#ff7a00\""));
        assert!(text.contains("showSundayRing = true"));
        assert!(text.contains("03-28"));
    }
}
