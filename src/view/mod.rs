//! View module - menu screens for the launcher
//!
//! Screens are plain data serialized as one JSON object per line. The
//! `menu` submodule turns domain entities into screens without side effects.
//!
//! The launcher renders `text` and `message` as markup, so both are escaped
//! when a screen is serialized. Everything in memory holds plain text.

pub mod menu;

use std::borrow::Cow;

use serde::{Deserialize, Serialize, Serializer};

/// Escape the characters that are significant in the launcher's markup
pub fn escape_markup(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '\'', '"']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&#39;"),
            '"' => escaped.push_str("&#34;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn serialize_markup<T, S>(text: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<str>,
    S: Serializer,
{
    serializer.serialize_str(&escape_markup(text.as_ref()))
}

/// One selectable row of a menu
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Line {
    #[serde(serialize_with = "serialize_markup")]
    pub text: String,
    /// Echoed back by the launcher when the row is selected
    #[serde(default)]
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Line {
    pub fn new(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: data.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: Option<&std::path::Path>) -> Self {
        self.icon = icon.map(|path| path.display().to_string());
        self
    }
}

/// Everything the launcher shows at once
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Screen {
    pub lines: Vec<Line>,
    #[serde(serialize_with = "serialize_markup")]
    pub message: String,
    /// Input text echo; always emitted empty so no prompt is left pending
    #[serde(default)]
    pub input: String,
}

impl Screen {
    pub fn new(lines: Vec<Line>, message: impl Into<String>) -> Self {
        Self {
            lines,
            message: message.into(),
            input: String::new(),
        }
    }
}
