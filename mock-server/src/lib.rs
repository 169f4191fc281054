//! In-process stand-in for the zhconvert API.
//!
//! Serves `GET /service-info` and `POST /convert` with the same envelope as
//! the real service. Conversion is a small word and character table, enough
//! to tell Simplified from Traditional output and to observe the replace
//! options doing their work.

use std::collections::HashMap;

use axum::{
    extract::{FromRequest, Request},
    http::{header, StatusCode},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

pub const CONVERTERS: [&str; 10] = [
    "Simplified",
    "Traditional",
    "China",
    "Hongkong",
    "Taiwan",
    "Pinyin",
    "Bopomofo",
    "Mars",
    "WikiSimplified",
    "WikiTraditional",
];

const CHARS: [(char, char); 14] = [
    ('简', '簡'),
    ('体', '體'),
    ('汉', '漢'),
    ('语', '語'),
    ('转', '轉'),
    ('换', '換'),
    ('这', '這'),
    ('个', '個'),
    ('软', '軟'),
    ('说', '說'),
    ('网', '網'),
    ('络', '絡'),
    ('们', '們'),
    ('国', '國'),
];

/// Mainland term, Taiwan term.
const TAIWAN_WORDS: [(&str, &str); 3] = [("软件", "軟體"), ("网络", "網路"), ("信息", "資訊")];

// Private-use markers around protected terms while the tables run.
const PROTECT_OPEN: char = '\u{E000}';
const PROTECT_CLOSE: char = '\u{E001}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    ToSimplified,
    ToTraditional,
    Keep,
}

/// Parameters the mock understands, normalized from a JSON or form body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertInput {
    pub text: String,
    pub converter: String,
    pub modules: Option<String>,
    pub user_pre_replace: Option<String>,
    pub user_post_replace: Option<String>,
    pub user_protect_replace: Option<String>,
    pub diff_enable: bool,
}

impl ConvertInput {
    /// Build from string-valued fields. Missing `text` or `converter` is an
    /// error, as it is on the real service.
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, String> {
        let text = fields.get("text").cloned().ok_or("missing parameter: text")?;
        let converter = fields
            .get("converter")
            .cloned()
            .ok_or("missing parameter: converter")?;
        Ok(Self {
            text,
            converter,
            modules: fields.get("modules").cloned(),
            user_pre_replace: fields.get("userPreReplace").cloned(),
            user_post_replace: fields.get("userPostReplace").cloned(),
            user_protect_replace: fields.get("userProtectReplace").cloned(),
            diff_enable: fields
                .get("diffEnable")
                .is_some_and(|v| v == "true" || v == "1"),
        })
    }
}

/// Result of a conversion: the text and the modules that were forced on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub text: String,
    pub used_modules: Vec<String>,
}

pub fn app() -> Router {
    Router::new()
        .route("/service-info", get(service_info))
        .route("/convert", post(convert))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn service_info() -> Json<Value> {
    Json(json!({
        "code": 0,
        "msg": "",
        "data": {
            "converters": CONVERTERS,
            "modules": {},
            "build": "mock"
        }
    }))
}

async fn convert(request: Request) -> (StatusCode, Json<Value>) {
    let fields = match read_fields(request).await {
        Ok(fields) => fields,
        Err((status, msg)) => return failure(status, msg),
    };
    let input = match ConvertInput::from_fields(&fields) {
        Ok(input) => input,
        Err(msg) => return failure(StatusCode::BAD_REQUEST, msg),
    };
    let converted = match convert_input(&input) {
        Ok(converted) => converted,
        Err(msg) => return failure(StatusCode::BAD_REQUEST, msg),
    };
    tracing::info!(converter = %input.converter, chars = input.text.chars().count(), "converted");

    let diff = if input.diff_enable {
        Value::String(format!("-{}\n+{}", input.text, converted.text))
    } else {
        Value::Null
    };
    let body = json!({
        "code": 0,
        "msg": "",
        "data": {
            "converter": input.converter,
            "text": converted.text,
            "diff": diff,
            "usedModules": converted.used_modules,
            "jpTextStyles": [],
            "textFormat": "PlainText"
        },
        "revisions": {"build": "mock", "msg": "", "time": 0},
        "execTime": 0.0
    });
    (StatusCode::OK, Json(body))
}

fn failure(status: StatusCode, msg: impl Into<String>) -> (StatusCode, Json<Value>) {
    let msg = msg.into();
    tracing::warn!(%status, %msg, "rejecting convert request");
    (status, Json(json!({"code": -1, "msg": msg, "data": null})))
}

/// Read a form or JSON body into string-valued fields. JSON booleans and
/// numbers become their textual form.
async fn read_fields(request: Request) -> Result<HashMap<String, String>, (StatusCode, String)> {
    let is_form = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));

    if is_form {
        let Form(fields) = Form::<HashMap<String, String>>::from_request(request, &())
            .await
            .map_err(|rejection| (rejection.status(), rejection.body_text()))?;
        return Ok(fields);
    }

    let Json(object) = Json::<Map<String, Value>>::from_request(request, &())
        .await
        .map_err(|rejection| (rejection.status(), rejection.body_text()))?;
    Ok(object
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect())
}

/// Run the conversion pipeline: pre-replace, protect, tables, restore,
/// post-replace.
pub fn convert_input(input: &ConvertInput) -> Result<Converted, String> {
    let direction = direction(&input.converter)?;
    let used_modules = match &input.modules {
        Some(raw) => forced_modules(raw)?,
        None => Vec::new(),
    };

    let mut text = apply_pairs(&input.text, input.user_pre_replace.as_deref());

    let protected: Vec<String> = input
        .user_protect_replace
        .as_deref()
        .map(parse_pairs)
        .unwrap_or_default()
        .into_iter()
        .map(|(term, _)| term)
        .filter(|term| !term.is_empty())
        .collect();
    for (i, term) in protected.iter().enumerate() {
        text = text.replace(term.as_str(), &marker(i));
    }

    text = match direction {
        Direction::ToSimplified => to_simplified(&text),
        Direction::ToTraditional => to_traditional(&text, input.converter == "Taiwan"),
        Direction::Keep => text,
    };

    for (i, term) in protected.iter().enumerate() {
        text = text.replace(&marker(i), term);
    }

    let text = apply_pairs(&text, input.user_post_replace.as_deref());
    Ok(Converted { text, used_modules })
}

fn direction(converter: &str) -> Result<Direction, String> {
    match converter {
        "Simplified" | "China" | "WikiSimplified" => Ok(Direction::ToSimplified),
        "Traditional" | "Hongkong" | "Taiwan" | "WikiTraditional" => Ok(Direction::ToTraditional),
        "Pinyin" | "Bopomofo" | "Mars" => Ok(Direction::Keep),
        other => Err(format!("unknown converter: {other}")),
    }
}

fn forced_modules(raw: &str) -> Result<Vec<String>, String> {
    let modules: Map<String, Value> =
        serde_json::from_str(raw).map_err(|e| format!("invalid modules: {e}"))?;
    Ok(modules
        .into_iter()
        .filter(|(_, state)| state.as_i64() == Some(1))
        .map(|(name, _)| name)
        .collect())
}

fn marker(i: usize) -> String {
    format!("{PROTECT_OPEN}{i}{PROTECT_CLOSE}")
}

/// Split `key=value` lines at the first `=`. Lines without one are skipped.
fn parse_pairs(raw: &str) -> Vec<(String, String)> {
    raw.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn apply_pairs(text: &str, raw: Option<&str>) -> String {
    let mut text = text.to_string();
    for (from, to) in raw.map(parse_pairs).unwrap_or_default() {
        if !from.is_empty() {
            text = text.replace(&from, &to);
        }
    }
    text
}

fn to_simplified(text: &str) -> String {
    let mut text = text.to_string();
    for (mainland, taiwan) in TAIWAN_WORDS {
        text = text.replace(taiwan, mainland);
    }
    text.chars()
        .map(|c| CHARS.iter().find(|(_, t)| *t == c).map_or(c, |(s, _)| *s))
        .collect()
}

fn to_traditional(text: &str, taiwan_words: bool) -> String {
    let mut text = text.to_string();
    if taiwan_words {
        for (mainland, taiwan) in TAIWAN_WORDS {
            text = text.replace(mainland, taiwan);
        }
    }
    text.chars()
        .map(|c| CHARS.iter().find(|(s, _)| *s == c).map_or(c, |(_, t)| *t))
        .collect()
}
