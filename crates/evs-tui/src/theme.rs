//! Colour themes for the evs TUI.
//!
//! Both themes are TOML files embedded in the binary via [`include_str!`] and
//! parsed with the `config` crate at startup. `d` flips between them at
//! runtime; `:theme <dark|light>` selects one by name.

use config::{Config, File, FileFormat};
use evs_core::Severity;
use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

const DARK_THEME_SRC: &str = include_str!("themes/dark.toml");
const LIGHT_THEME_SRC: &str = include_str!("themes/light.toml");

// ---------------------------------------------------------------------------
// Raw (serde) types — mirror the TOML structure
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct RawStyle {
    fg: Option<String>,
    bg: Option<String>,
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    dim: bool,
    #[serde(default)]
    italic: bool,
}

impl RawStyle {
    fn into_style(self) -> Style {
        let mut style = Style::default();
        if let Some(c) = self.fg.as_deref().and_then(parse_color) {
            style = style.fg(c);
        }
        if let Some(c) = self.bg.as_deref().and_then(parse_color) {
            style = style.bg(c);
        }
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.dim {
            style = style.add_modifier(Modifier::DIM);
        }
        if self.italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        style
    }
}

#[derive(Debug, Deserialize)]
struct RawBorders {
    focused: RawStyle,
    unfocused: RawStyle,
    command_bar: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawNotices {
    info: RawStyle,
    warning: RawStyle,
    error: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawTree {
    root: RawStyle,
    highlight: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawJson {
    key: RawStyle,
    string: RawStyle,
    number: RawStyle,
    literal: RawStyle,
    punctuation: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    bar: RawStyle,
    title: RawStyle,
    spinner: RawStyle,
    hint: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawTheme {
    #[serde(default)]
    base: RawStyle,
    borders: RawBorders,
    notices: RawNotices,
    tree: RawTree,
    json: RawJson,
    status: RawStatus,
}

// ---------------------------------------------------------------------------
// Theme kind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
}

impl ThemeKind {
    pub fn toggled(self) -> Self {
        match self {
            ThemeKind::Dark => ThemeKind::Light,
            ThemeKind::Light => ThemeKind::Dark,
        }
    }
}

impl FromStr for ThemeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(ThemeKind::Dark),
            "light" => Ok(ThemeKind::Light),
            other => Err(format!("unknown theme: {other} (expected dark or light)")),
        }
    }
}

impl fmt::Display for ThemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ThemeKind::Dark => "dark",
            ThemeKind::Light => "light",
        })
    }
}

// ---------------------------------------------------------------------------
// Public Theme type
// ---------------------------------------------------------------------------

/// Resolved colour theme. All styles are plain ratatui [`Style`] values, so
/// rendering never allocates for colours.
#[derive(Debug, Clone)]
pub struct Theme {
    pub kind: ThemeKind,
    /// Foreground and background painted under every pane.
    pub base: Style,

    pub border_focused: Style,
    pub border_unfocused: Style,
    pub border_command_bar: Style,

    pub notice_info: Style,
    pub notice_warning: Style,
    pub notice_error: Style,

    pub tree_root: Style,
    /// Cursor row in the event tree.
    pub tree_highlight: Style,

    pub json_key: Style,
    pub json_string: Style,
    pub json_number: Style,
    /// `true`, `false` and `null`.
    pub json_literal: Style,
    pub json_punctuation: Style,

    pub status_bar: Style,
    pub status_title: Style,
    pub status_spinner: Style,
    pub status_hint: Style,
}

impl Theme {
    /// Load one of the embedded themes.
    ///
    /// # Panics
    ///
    /// Panics if an embedded theme file is malformed; the unit tests load
    /// both, so this cannot happen in a tested build.
    pub fn load(kind: ThemeKind) -> Self {
        let src = match kind {
            ThemeKind::Dark => DARK_THEME_SRC,
            ThemeKind::Light => LIGHT_THEME_SRC,
        };
        Self::from_toml_str(kind, src).expect("embedded theme must be valid TOML")
    }

    /// The other embedded theme.
    pub fn toggled(&self) -> Self {
        Self::load(self.kind.toggled())
    }

    /// Parse a theme from a TOML string.
    pub fn from_toml_str(kind: ThemeKind, src: &str) -> anyhow::Result<Self> {
        let raw: RawTheme = Config::builder()
            .add_source(File::from_str(src, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        Ok(Self {
            kind,
            base: raw.base.into_style(),
            border_focused: raw.borders.focused.into_style(),
            border_unfocused: raw.borders.unfocused.into_style(),
            border_command_bar: raw.borders.command_bar.into_style(),
            notice_info: raw.notices.info.into_style(),
            notice_warning: raw.notices.warning.into_style(),
            notice_error: raw.notices.error.into_style(),
            tree_root: raw.tree.root.into_style(),
            tree_highlight: raw.tree.highlight.into_style(),
            json_key: raw.json.key.into_style(),
            json_string: raw.json.string.into_style(),
            json_number: raw.json.number.into_style(),
            json_literal: raw.json.literal.into_style(),
            json_punctuation: raw.json.punctuation.into_style(),
            status_bar: raw.status.bar.into_style(),
            status_title: raw.status.title.into_style(),
            status_spinner: raw.status.spinner.into_style(),
            status_hint: raw.status.hint.into_style(),
        })
    }

    pub fn notice_style(&self, severity: Severity) -> Style {
        match severity {
            Severity::Info => self.notice_info,
            Severity::Warning => self.notice_warning,
            Severity::Error => self.notice_error,
        }
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            self.border_focused
        } else {
            self.border_unfocused
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load(ThemeKind::Dark)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a colour name into a ratatui [`Color`].
///
/// Accepts:
/// - Named terminal colours (case-insensitive): `red`, `dark_gray`, etc.
/// - Hex RGB: `#rrggbb`
/// - 256-colour indexed: `indexed:N`
fn parse_color(s: &str) -> Option<Color> {
    match s.to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "dark_gray" | "darkgray" | "dark_grey" | "darkgrey" => Some(Color::DarkGray),
        "white" => Some(Color::White),
        s if s.starts_with('#') && s.len() == 7 => {
            let r = u8::from_str_radix(&s[1..3], 16).ok()?;
            let g = u8::from_str_radix(&s[3..5], 16).ok()?;
            let b = u8::from_str_radix(&s[5..7], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        s if s.starts_with("indexed:") => {
            let n: u8 = s["indexed:".len()..].parse().ok()?;
            Some(Color::Indexed(n))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
