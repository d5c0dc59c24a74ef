use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use serde_json::{
  Map,
  Value
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::style::{
  PartialStyle,
  StyleConfig,
  StylePreset
};

const STYLE_ENV_VAR: &str =
  "LIFECAL_STYLE";
const STYLE_CONFIG_DIR: &str =
  "lifecal";
const STYLE_FILE_NAMES: [&str; 2] =
  ["style.toml", "style.json"];

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum StyleFormat {
  Toml,
  Json
}

impl StyleFormat {
  #[must_use]
  pub fn from_path(
    path: &Path
  ) -> Option<Self> {
    let ext = path
      .extension()?
      .to_string_lossy()
      .to_ascii_lowercase();
    match ext.as_str() {
      | "toml" => Some(Self::Toml),
      | "json" => Some(Self::Json),
      | _ => None
    }
  }
}

/// Builds the effective style:
/// preset, then the style file, then
/// `key=value` overrides.
#[tracing::instrument(skip(
  style_override,
  overrides
))]
pub fn load_style<I>(
  style_override: Option<&Path>,
  preset: StylePreset,
  overrides: I
) -> anyhow::Result<StyleConfig>
where
  I: IntoIterator<
    Item = (String, String)
  >
{
  let base = StyleConfig::preset(preset);

  let file = match resolve_style_path(
    style_override
  ) {
    | Some(path) => {
      info!(style = %path.display(), "loading style file");
      load_style_file(&path)?
    }
    | None => {
      info!(
        %preset,
        "no style file found; using \
         preset"
      );
      PartialStyle::default()
    }
  };

  let overrides =
    partial_from_overrides(overrides)?;

  Ok(
    base
      .merged(&file)
      .merged(&overrides)
      .sanitized()
  )
}

#[tracing::instrument]
pub fn resolve_style_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(expand_tilde(path));
  }

  if let Ok(raw) =
    std::env::var(STYLE_ENV_VAR)
  {
    let trimmed = raw.trim();
    if trimmed == "/dev/null" {
      return None;
    }
    if !trimmed.is_empty() {
      return Some(expand_tilde(
        Path::new(trimmed)
      ));
    }
  }

  let dir = dirs::config_dir()?
    .join(STYLE_CONFIG_DIR);
  STYLE_FILE_NAMES
    .iter()
    .map(|name| dir.join(name))
    .find(|candidate| {
      trace!(candidate = %candidate.display(), "probing style file");
      candidate.exists()
    })
}

#[tracing::instrument]
pub fn load_style_file(
  path: &Path
) -> anyhow::Result<PartialStyle> {
  let text = fs::read_to_string(path)
    .with_context(|| {
      format!(
        "failed to read style file {}",
        path.display()
      )
    })?;

  let partial = parse_style_text(
    &text,
    StyleFormat::from_path(path)
  )
  .with_context(|| {
    format!(
      "failed to parse style file {}",
      path.display()
    )
  })?;

  for key in partial.unknown_keys() {
    warn!(
      file = %path.display(),
      key,
      "ignoring unknown style key"
    );
  }

  Ok(partial)
}

pub fn parse_style_text(
  text: &str,
  format: Option<StyleFormat>
) -> anyhow::Result<PartialStyle> {
  match format {
    | Some(StyleFormat::Json) => {
      serde_json::from_str(text)
        .context("invalid JSON style")
    }
    | Some(StyleFormat::Toml) => {
      toml::from_str(text)
        .context("invalid TOML style")
    }
    | None => {
      let json_err =
        match serde_json::from_str(text) {
          | Ok(partial) => {
            return Ok(partial);
          }
          | Err(err) => err
        };
      toml::from_str(text).map_err(
        |toml_err| {
          anyhow!(
            "style is neither JSON \
             ({json_err}) nor TOML \
             ({toml_err})"
          )
        }
      )
    }
  }
}

/// Turns `key=value` pairs into a
/// partial style. Values are read as
/// JSON when they parse, as booleans
/// for on/off words, and as strings
/// otherwise. `birthdays` also accepts
/// a comma separated list.
#[tracing::instrument(skip(overrides))]
pub fn partial_from_overrides<I>(
  overrides: I
) -> anyhow::Result<PartialStyle>
where
  I: IntoIterator<
    Item = (String, String)
  >
{
  let mut map = Map::new();

  for (k, v) in overrides {
    let key = k
      .strip_prefix("style.")
      .unwrap_or(&k)
      .to_string();
    if key.is_empty() {
      return Err(anyhow!(
        "override key cannot be empty"
      ));
    }

    let value = if key == "birthdays"
      && !v.trim_start().starts_with('[')
    {
      Value::Array(
        v.split(',')
          .map(|entry| {
            Value::String(
              entry.trim().to_string()
            )
          })
          .collect()
      )
    } else {
      parse_override_value(&v)
    };

    debug!(key = %key, value = %value, "applying style override");
    map.insert(key, value);
  }

  if map.is_empty() {
    return Ok(PartialStyle::default());
  }

  let partial: PartialStyle =
    serde_json::from_value(
      Value::Object(map)
    )
    .context("invalid style override")?;

  for key in partial.unknown_keys() {
    warn!(
      key,
      "ignoring unknown style override"
    );
  }

  Ok(partial)
}

fn parse_override_value(
  raw: &str
) -> Value {
  let trimmed = raw.trim();
  if let Ok(value) =
    serde_json::from_str::<Value>(trimmed)
  {
    return value;
  }

  if is_bool_word(trimmed) {
    return Value::Bool(parse_bool(
      trimmed
    ));
  }

  Value::String(trimmed.to_string())
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn is_bool_word(s: &str) -> bool {
  matches!(
    s.to_ascii_lowercase().as_str(),
    "y" | "yes" | "on" | "n" | "no" | "off"
  )
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}
