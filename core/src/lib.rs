//! Async client core for the zhconvert Chinese conversion API.
//!
//! # Overview
//! Turns typed conversion options into the flat parameter map the remote
//! service expects, sends one request through a caller-supplied `Transport`,
//! and decodes the JSON envelope into text or a `ConvertError`.
//!
//! # Design
//! - `ZhConvertClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes the transport's outcome.
//! - `ZhConverter` runs build → execute → parse over an injected transport
//!   shared through an `Arc`; there is no global instance.
//! - Option variants own their wire keys, so only legal parameter names can
//!   be produced.
//! - Response DTOs are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
pub mod response;
pub mod types;

pub use client::{decode_text, ZhConvertClient, ZhConverter};
pub use config::{BodyEncoding, ClientConfig};
pub use error::{BoxError, ConfigError, ConvertError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use params::{ParamValue, RequestParameters};
pub use response::{ConvertData, ConvertResponse};
pub use types::{
    ConversionStrategy, ConvertOptions, ConverterType, DiffTemplate, DifferentType,
    JapaneseConversionStrategy, ParseConverterError, ReplaceType, TextType,
};
