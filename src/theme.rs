//! Theme resolution
//!
//! Resolves the light or dark base palette, merges host overrides over it
//! and hands the render layer an explicit token struct.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::types::{deserialize_from_str, ParseEnumError};

/// Host-supplied override mapping, token name to colour
pub type ThemeOverrides = BTreeMap<String, String>;

/// Requested colour mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    Auto,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::Auto => "auto",
        }
    }
}

impl FromStr for ThemeMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "auto" => Ok(ThemeMode::Auto),
            _ => Err(ParseEnumError {
                kind: "theme mode",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ThemeMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_from_str(deserializer)
    }
}

/// Ambient colour-scheme signal of the host environment
pub trait ColorSchemeProvider: Send + Sync {
    fn prefers_dark(&self) -> bool;
}

/// Provider with a fixed answer
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedColorScheme {
    pub dark: bool,
}

impl ColorSchemeProvider for FixedColorScheme {
    fn prefers_dark(&self) -> bool {
        self.dark
    }
}

/// Reads `CIRRUS_COLOR_SCHEME` on every evaluation; anything but `dark` is light
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvColorScheme;

impl ColorSchemeProvider for EnvColorScheme {
    fn prefers_dark(&self) -> bool {
        std::env::var("CIRRUS_COLOR_SCHEME")
            .map(|v| v.trim().eq_ignore_ascii_case("dark"))
            .unwrap_or(false)
    }
}

macro_rules! theme_tokens {
    ($($field:ident => $key:literal),+ $(,)?) => {
        /// Resolved colour tokens consumed by the view
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct ThemeTokens {
            $(pub $field: String,)+
            /// Override keys that are not part of the palette
            #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
            pub extra: BTreeMap<String, String>,
        }

        impl ThemeTokens {
            /// Palette token names, in declaration order
            pub const KEYS: &'static [&'static str] = &[$($key),+];

            fn slot_mut(&mut self, key: &str) -> Option<&mut String> {
                match key {
                    $($key => Some(&mut self.$field),)+
                    _ => None,
                }
            }

            /// Look up any token, palette or extra
            pub fn get(&self, key: &str) -> Option<&str> {
                let key = normalize_key(key);
                match key.as_str() {
                    $($key => Some(self.$field.as_str()),)+
                    other => self.extra.get(other).map(String::as_str),
                }
            }

            /// Flatten into the token-name mapping
            pub fn to_map(&self) -> BTreeMap<String, String> {
                let mut map = self.extra.clone();
                $(map.insert($key.to_string(), self.$field.clone());)+
                map
            }
        }
    };
}

theme_tokens! {
    buy_color => "--buy-color",
    sell_color => "--sell-color",
    buy_bg => "--buy-bg",
    sell_bg => "--sell-bg",
    positive_color => "--positive-color",
    negative_color => "--negative-color",
    disabled_bg => "--disabled-bg",
    disabled_text => "--disabled-text",
    background => "--background",
    text_color => "--text-color",
    border_color => "--border-color",
    panel_bg => "--panel-bg",
    table_head_bg => "--table-head-bg",
    tab_bg => "--tab-bg",
    inactive_button => "--inactive-button",
    exchange_bg => "--exchange-bg",
    exchange_text => "--exchange-text",
}

impl ThemeTokens {
    pub fn light() -> Self {
        Self {
            buy_color: "#007bff".into(),
            sell_color: "#d9534f".into(),
            buy_bg: "#e6f0ff".into(),
            sell_bg: "#ffe6e6".into(),
            positive_color: "#28a745".into(),
            negative_color: "#dc3545".into(),
            disabled_bg: "#f3f4f6".into(),
            disabled_text: "#9ca3af".into(),
            background: "#ffffff".into(),
            text_color: "#111827".into(),
            border_color: "#dcdcdc".into(),
            panel_bg: "#fafafa".into(),
            table_head_bg: "#f1f5f9".into(),
            tab_bg: "#e5e7eb".into(),
            inactive_button: "#ccc".into(),
            exchange_bg: "#eef".into(),
            exchange_text: "#111827".into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn dark() -> Self {
        Self {
            buy_color: "#007bff".into(),
            sell_color: "#d9534f".into(),
            buy_bg: "#1c2738".into(),
            sell_bg: "#2a1f1f".into(),
            positive_color: "#28a745".into(),
            negative_color: "#dc3545".into(),
            disabled_bg: "#2e3b50".into(),
            disabled_text: "#94a3b8".into(),
            background: "#0f172a".into(),
            text_color: "#e2e8f0".into(),
            border_color: "#334155".into(),
            panel_bg: "#111827".into(),
            table_head_bg: "#1e293b".into(),
            tab_bg: "#1e293b".into(),
            inactive_button: "#4b5563".into(),
            exchange_bg: "#334155".into(),
            exchange_text: "#e2e8f0".into(),
            extra: BTreeMap::new(),
        }
    }

    /// Apply overrides key by key over this palette
    pub fn with_overrides(mut self, overrides: &ThemeOverrides) -> Self {
        for (key, value) in overrides {
            let key = normalize_key(key);
            match self.slot_mut(&key) {
                Some(slot) => *slot = value.clone(),
                None => {
                    self.extra.insert(key, value.clone());
                }
            }
        }
        self
    }
}

/// Token names are stored in their `--name` form
pub fn normalize_key(key: &str) -> String {
    let key = key.trim();
    if key.starts_with("--") {
        key.to_string()
    } else {
        format!("--{}", key)
    }
}

/// Whether a mode renders dark, consulting the ambient scheme for `auto`
pub fn is_dark(mode: ThemeMode, scheme: &dyn ColorSchemeProvider) -> bool {
    match mode {
        ThemeMode::Dark => true,
        ThemeMode::Light => false,
        ThemeMode::Auto => scheme.prefers_dark(),
    }
}

/// Resolve the tokens for a mode and override mapping
pub fn resolve(
    mode: ThemeMode,
    overrides: &ThemeOverrides,
    scheme: &dyn ColorSchemeProvider,
) -> ThemeTokens {
    let base = if is_dark(mode, scheme) {
        ThemeTokens::dark()
    } else {
        ThemeTokens::light()
    };
    base.with_overrides(overrides)
}
