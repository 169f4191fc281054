//! Response envelopes of the convert endpoint.
//!
//! # Design
//! `convert_text` only needs `data.text` and reads it straight from the JSON
//! value. `ConvertResponse` is the wider view for callers who want the
//! converter name, the diff or the modules the service applied. Unknown
//! fields are ignored; the client checks the object shape before decoding.

use serde::Deserialize;
use serde_json::Value;

/// Full convert envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    pub data: ConvertData,
    #[serde(default)]
    pub exec_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertData {
    #[serde(default)]
    pub converter: Option<String>,
    pub text: String,
    /// Rendered according to `diffTemplate`: a string for the HTML/text
    /// templates, structured JSON for the JSON ones.
    #[serde(default)]
    pub diff: Option<Value>,
    #[serde(default)]
    pub used_modules: Option<Vec<String>>,
}
