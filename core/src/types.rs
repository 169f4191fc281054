//! Typed option groups accepted by the convert endpoint.
//!
//! # Design
//! Every option variant owns its wire key (`key`) and knows how to render its
//! value (`value`), so the set of legal parameter names is fixed at compile
//! time. The types also deserialize from that same wire form, externally
//! tagged by key (`{"diffContextLines": 3}`), which lets callers and test
//! vectors describe option lists as data.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::params::ParamValue;

/// Target lexicon or script of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ConverterType {
    Simplified,
    Traditional,
    China,
    Hongkong,
    Taiwan,
    Pinyin,
    Bopomofo,
    Mars,
    WikiSimplified,
    WikiTraditional,
}

impl ConverterType {
    pub const ALL: [ConverterType; 10] = [
        ConverterType::Simplified,
        ConverterType::Traditional,
        ConverterType::China,
        ConverterType::Hongkong,
        ConverterType::Taiwan,
        ConverterType::Pinyin,
        ConverterType::Bopomofo,
        ConverterType::Mars,
        ConverterType::WikiSimplified,
        ConverterType::WikiTraditional,
    ];

    /// Value of the `converter` parameter. Spelled out per variant so a
    /// rename in Rust can never change what goes on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConverterType::Simplified => "Simplified",
            ConverterType::Traditional => "Traditional",
            ConverterType::China => "China",
            ConverterType::Hongkong => "Hongkong",
            ConverterType::Taiwan => "Taiwan",
            ConverterType::Pinyin => "Pinyin",
            ConverterType::Bopomofo => "Bopomofo",
            ConverterType::Mars => "Mars",
            ConverterType::WikiSimplified => "WikiSimplified",
            ConverterType::WikiTraditional => "WikiTraditional",
        }
    }
}

impl fmt::Display for ConverterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown converter {0:?}")]
pub struct ParseConverterError(pub String);

impl FromStr for ConverterType {
    type Err = ParseConverterError;

    /// Accepts the wire name in any letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConverterType::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseConverterError(s.to_string()))
    }
}

/// Custom replacement rules.
///
/// The string maps keep their entries in the order given and are sent as
/// `key=value` lines. Neither `=` nor a newline is escaped, so keys and values
/// must not contain them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReplaceType {
    /// Force modules on (1), off (0) or automatic (-1).
    Modules(BTreeMap<String, i32>),
    /// Replacements applied after conversion.
    UserPostReplace(Vec<(String, String)>),
    /// Replacements applied before conversion.
    UserPreReplace(Vec<(String, String)>),
    /// Terms the converter must leave untouched.
    UserProtectReplace(Vec<(String, String)>),
}

impl ReplaceType {
    pub fn key(&self) -> &'static str {
        match self {
            ReplaceType::Modules(_) => "modules",
            ReplaceType::UserPostReplace(_) => "userPostReplace",
            ReplaceType::UserPreReplace(_) => "userPreReplace",
            ReplaceType::UserProtectReplace(_) => "userProtectReplace",
        }
    }

    /// Serialized value, or `None` when the module map cannot be encoded.
    pub fn value(&self) -> Option<ParamValue> {
        match self {
            ReplaceType::Modules(modules) => match serde_json::to_string(modules) {
                Ok(json) => Some(ParamValue::Str(json)),
                Err(err) => {
                    tracing::warn!(error = %err, "dropping modules parameter");
                    None
                }
            },
            ReplaceType::UserPostReplace(pairs)
            | ReplaceType::UserPreReplace(pairs)
            | ReplaceType::UserProtectReplace(pairs) => Some(ParamValue::Str(join_pairs(pairs))),
        }
    }
}

fn join_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Output layout of the diff section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum DiffTemplate {
    Inline,
    SideBySide,
    Unified,
    Context,
    JsonHtml,
    JsonText,
}

impl DiffTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffTemplate::Inline => "Inline",
            DiffTemplate::SideBySide => "SideBySide",
            DiffTemplate::Unified => "Unified",
            DiffTemplate::Context => "Context",
            DiffTemplate::JsonHtml => "JsonHtml",
            DiffTemplate::JsonText => "JsonText",
        }
    }
}

/// Diff options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DifferentType {
    DiffCharLevel(bool),
    /// 0 to 4 lines of context around each change.
    DiffContextLines(u8),
    DiffEnable(bool),
    DiffIgnoreCase(bool),
    DiffIgnoreWhiteSpaces(bool),
    DiffTemplate(DiffTemplate),
}

impl DifferentType {
    pub fn key(&self) -> &'static str {
        match self {
            DifferentType::DiffCharLevel(_) => "diffCharLevel",
            DifferentType::DiffContextLines(_) => "diffContextLines",
            DifferentType::DiffEnable(_) => "diffEnable",
            DifferentType::DiffIgnoreCase(_) => "diffIgnoreCase",
            DifferentType::DiffIgnoreWhiteSpaces(_) => "diffIgnoreWhiteSpaces",
            DifferentType::DiffTemplate(_) => "diffTemplate",
        }
    }

    pub fn value(&self) -> ParamValue {
        match *self {
            DifferentType::DiffCharLevel(flag)
            | DifferentType::DiffEnable(flag)
            | DifferentType::DiffIgnoreCase(flag)
            | DifferentType::DiffIgnoreWhiteSpaces(flag) => ParamValue::Bool(flag),
            DifferentType::DiffContextLines(lines) => ParamValue::Int(i64::from(lines)),
            DifferentType::DiffTemplate(template) => ParamValue::Str(template.as_str().to_string()),
        }
    }
}

/// Text clean-up options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextType {
    CleanUpText(bool),
    EnsureNewlineAtEof(bool),
    /// -1 keeps tabs; 0 to 8 replaces each tab with that many spaces.
    TranslateTabsToSpaces(i8),
    TrimTrailingWhiteSpaces(bool),
    UnifyLeadingHyphen(bool),
}

impl TextType {
    pub fn key(&self) -> &'static str {
        match self {
            TextType::CleanUpText(_) => "cleanUpText",
            TextType::EnsureNewlineAtEof(_) => "ensureNewlineAtEof",
            TextType::TranslateTabsToSpaces(_) => "translateTabsToSpaces",
            TextType::TrimTrailingWhiteSpaces(_) => "trimTrailingWhiteSpaces",
            TextType::UnifyLeadingHyphen(_) => "unifyLeadingHyphen",
        }
    }

    pub fn value(&self) -> ParamValue {
        match *self {
            TextType::CleanUpText(flag)
            | TextType::EnsureNewlineAtEof(flag)
            | TextType::TrimTrailingWhiteSpaces(flag)
            | TextType::UnifyLeadingHyphen(flag) => ParamValue::Bool(flag),
            TextType::TranslateTabsToSpaces(spaces) => ParamValue::Int(i64::from(spaces)),
        }
    }
}

/// How Japanese spans are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConversionStrategy {
    None,
    Protect,
    ProtectOnlySameOrigin,
    Fix,
}

impl ConversionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionStrategy::None => "none",
            ConversionStrategy::Protect => "protect",
            ConversionStrategy::ProtectOnlySameOrigin => "protectOnlySameOrigin",
            ConversionStrategy::Fix => "fix",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum JapaneseConversionStrategy {
    #[serde(rename = "jpStyleConversionStrategy")]
    Style(ConversionStrategy),
    #[serde(rename = "jpTextConversionStrategy")]
    Text(ConversionStrategy),
}

impl JapaneseConversionStrategy {
    pub fn key(&self) -> &'static str {
        match self {
            JapaneseConversionStrategy::Style(_) => "jpStyleConversionStrategy",
            JapaneseConversionStrategy::Text(_) => "jpTextConversionStrategy",
        }
    }

    pub fn value(&self) -> ParamValue {
        match self {
            JapaneseConversionStrategy::Style(strategy) | JapaneseConversionStrategy::Text(strategy) => {
                ParamValue::Str(strategy.as_str().to_string())
            }
        }
    }
}

/// Optional option lists for one convert call. All empty by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub replaces: Vec<ReplaceType>,
    pub differents: Vec<DifferentType>,
    pub texts: Vec<TextType>,
    pub strategies: Vec<JapaneseConversionStrategy>,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(mut self, replace: ReplaceType) -> Self {
        self.replaces.push(replace);
        self
    }

    pub fn different(mut self, different: DifferentType) -> Self {
        self.differents.push(different);
        self
    }

    pub fn text(mut self, text: TextType) -> Self {
        self.texts.push(text);
        self
    }

    pub fn strategy(mut self, strategy: JapaneseConversionStrategy) -> Self {
        self.strategies.push(strategy);
        self
    }
}
