//! Request builder, response parser and async facade for the zhconvert API.
//!
//! # Design
//! `ZhConvertClient` holds only its configuration and carries no mutable
//! state between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes the
//! transport's outcome, so the I/O boundary stays explicit and the mapping
//! logic is testable without a network.
//!
//! `ZhConverter` glues the two halves to an injected `Transport`: build,
//! execute once, parse. It holds the transport behind an `Arc`, so clones
//! share one transport and calls never share parameter state.

use std::sync::Arc;

use serde_json::Value;

use crate::config::{BodyEncoding, ClientConfig};
use crate::error::{BoxError, ConvertError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::params::{ParamValue, RequestParameters};
use crate::response::ConvertResponse;
use crate::types::{ConvertOptions, ConverterType};

/// Synchronous, stateless client for the zhconvert API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZhConvertClient {
    config: ClientConfig,
}

impl Default for ZhConvertClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl ZhConvertClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build_service_info(&self) -> HttpRequest {
        let url = format!("{}/service-info", self.config.base_url);
        tracing::debug!(%url, "building service-info request");
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Flatten `text`, `converter` and every option into one parameter map.
    pub fn convert_parameters(
        &self,
        text: &str,
        converter: ConverterType,
        options: &ConvertOptions,
    ) -> RequestParameters {
        let mut params = RequestParameters::new();
        params.set("text", ParamValue::Str(text.to_string()));
        params.set("converter", ParamValue::Str(converter.as_str().to_string()));

        for replace in &options.replaces {
            if let Some(value) = replace.value() {
                params.set(replace.key(), value);
            }
        }
        for different in &options.differents {
            params.set(different.key(), different.value());
        }
        for text_option in &options.texts {
            params.set(text_option.key(), text_option.value());
        }
        for strategy in &options.strategies {
            params.set(strategy.key(), strategy.value());
        }
        params
    }

    pub fn build_convert(
        &self,
        text: &str,
        converter: ConverterType,
        options: &ConvertOptions,
    ) -> HttpRequest {
        let params = self.convert_parameters(text, converter, options);
        let url = format!("{}/convert", self.config.base_url);
        tracing::debug!(
            %url,
            %converter,
            keys = ?params.keys().collect::<Vec<_>>(),
            "building convert request"
        );

        let encoding = self.config.body_encoding;
        let body = match encoding {
            BodyEncoding::Json => params.to_json(),
            BodyEncoding::Form => params.to_form(),
        };
        HttpRequest {
            method: HttpMethod::Post,
            url,
            headers: vec![("content-type".to_string(), encoding.content_type().to_string())],
            body: Some(body),
        }
    }

    /// Shared handling of a transport outcome: transport errors pass through,
    /// an incomplete response is `Unknown`, anything but 200 is `HttpCode`.
    pub fn parse_http_result(
        &self,
        result: Result<HttpResponse, BoxError>,
    ) -> Result<Vec<u8>, ConvertError> {
        let response = result.map_err(ConvertError::Transport)?;
        let (Some(status), Some(body)) = (response.status, response.body) else {
            return Err(ConvertError::Unknown);
        };
        if status != 200 {
            tracing::debug!(status, "non-200 response");
            return Err(ConvertError::HttpCode(status));
        }
        Ok(body)
    }

    pub fn parse_service_info(
        &self,
        result: Result<HttpResponse, BoxError>,
    ) -> Result<Vec<u8>, ConvertError> {
        self.parse_http_result(result)
    }

    /// Raw convert envelope, returned as-is.
    pub fn parse_convert(
        &self,
        result: Result<HttpResponse, BoxError>,
    ) -> Result<Vec<u8>, ConvertError> {
        self.parse_http_result(result)
    }

    pub fn parse_convert_text(
        &self,
        result: Result<HttpResponse, BoxError>,
    ) -> Result<String, ConvertError> {
        let body = self.parse_convert(result)?;
        decode_text(&body)
    }

    pub fn parse_convert_response(
        &self,
        result: Result<HttpResponse, BoxError>,
    ) -> Result<ConvertResponse, ConvertError> {
        let body = self.parse_convert(result)?;
        serde_json::from_value(envelope(&body)?).map_err(|_| ConvertError::MalformedResponse)
    }
}

/// Parse a convert envelope. Both the top level and `data` must be JSON
/// objects; serde's struct decoding alone would also take arrays.
fn envelope(body: &[u8]) -> Result<Value, ConvertError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ConvertError::MalformedResponse)?;
    let data_is_object = value
        .as_object()
        .and_then(|object| object.get("data"))
        .is_some_and(Value::is_object);
    if !data_is_object {
        return Err(ConvertError::MalformedResponse);
    }
    Ok(value)
}

/// Pull `data.text` out of a convert envelope.
pub fn decode_text(body: &[u8]) -> Result<String, ConvertError> {
    let envelope = envelope(body)?;
    envelope["data"]["text"]
        .as_str()
        .map(str::to_string)
        .ok_or(ConvertError::MalformedResponse)
}

/// Async converter bound to a transport.
pub struct ZhConverter<T> {
    client: ZhConvertClient,
    transport: Arc<T>,
}

impl<T> Clone for ZhConverter<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> ZhConverter<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self::with_shared_transport(config, Arc::new(transport))
    }

    pub fn with_shared_transport(config: ClientConfig, transport: Arc<T>) -> Self {
        Self {
            client: ZhConvertClient::new(config),
            transport,
        }
    }

    pub fn client(&self) -> &ZhConvertClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `GET /service-info`, body returned as-is.
    pub async fn service_info(&self) -> Result<Vec<u8>, ConvertError> {
        let request = self.client.build_service_info();
        let result = self.transport.execute(request).await;
        self.client.parse_service_info(result)
    }

    /// `POST /convert`, body returned as-is.
    pub async fn convert(
        &self,
        text: &str,
        converter: ConverterType,
        options: &ConvertOptions,
    ) -> Result<Vec<u8>, ConvertError> {
        let request = self.client.build_convert(text, converter, options);
        let result = self.transport.execute(request).await;
        self.client.parse_convert(result)
    }

    /// Converted text from `data.text`.
    pub async fn convert_text(
        &self,
        text: &str,
        converter: ConverterType,
        options: &ConvertOptions,
    ) -> Result<String, ConvertError> {
        let body = self.convert(text, converter, options).await?;
        decode_text(&body)
    }

    pub async fn convert_response(
        &self,
        text: &str,
        converter: ConverterType,
        options: &ConvertOptions,
    ) -> Result<ConvertResponse, ConvertError> {
        let request = self.client.build_convert(text, converter, options);
        let result = self.transport.execute(request).await;
        self.client.parse_convert_response(result)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use super::*;
    use crate::types::{
        ConversionStrategy, DiffTemplate, DifferentType, JapaneseConversionStrategy, ReplaceType,
        TextType,
    };

    fn client() -> ZhConvertClient {
        ZhConvertClient::new(ClientConfig::new("http://localhost:3000").unwrap())
    }

    fn ok(status: u16, body: &str) -> Result<HttpResponse, BoxError> {
        Ok(HttpResponse::new(status, body))
    }

    fn refused() -> BoxError {
        Box::new(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"))
    }

    /// Answers with whatever `respond` returns and records every request.
    struct StubTransport<F> {
        respond: F,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl<F> StubTransport<F>
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, BoxError> + Send + Sync,
    {
        fn new(respond: F) -> Self {
            Self {
                respond,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl<F> Transport for StubTransport<F>
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, BoxError> + Send + Sync,
    {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
            let result = (self.respond)(&request);
            self.requests.lock().unwrap().push(request);
            result
        }
    }

    fn converter<F>(respond: F) -> ZhConverter<StubTransport<F>>
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, BoxError> + Send + Sync,
    {
        ZhConverter::new(
            ClientConfig::new("http://localhost:3000").unwrap(),
            StubTransport::new(respond),
        )
    }

    #[test]
    fn build_service_info_produces_correct_request() {
        let req = client().build_service_info();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/service-info");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_convert_produces_json_body() {
        let req = client().build_convert("你好", ConverterType::Taiwan, &ConvertOptions::new());
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/convert");
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"text": "你好", "converter": "Taiwan"}));
    }

    #[test]
    fn build_convert_form_body() {
        let config = ClientConfig::new("http://localhost:3000")
            .unwrap()
            .with_body_encoding(BodyEncoding::Form);
        let options = ConvertOptions::new().different(DifferentType::DiffEnable(true));
        let req = ZhConvertClient::new(config).build_convert("a b", ConverterType::China, &options);
        assert_eq!(req.header("content-type"), Some("application/x-www-form-urlencoded"));
        assert_eq!(req.body.as_deref(), Some("converter=China&diffEnable=true&text=a%20b"));
    }

    #[test]
    fn empty_text_is_passed_through() {
        let params = client().convert_parameters("", ConverterType::Simplified, &ConvertOptions::new());
        assert_eq!(params.get("text"), Some(&ParamValue::Str(String::new())));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn one_key_per_supplied_option() {
        let options = ConvertOptions::new()
            .replace(ReplaceType::Modules(BTreeMap::from([("Smooth".to_string(), 0)])))
            .replace(ReplaceType::UserPreReplace(vec![("A".to_string(), "B".to_string())]))
            .replace(ReplaceType::UserPostReplace(vec![("C".to_string(), "D".to_string())]))
            .replace(ReplaceType::UserProtectReplace(vec![("E".to_string(), "F".to_string())]))
            .different(DifferentType::DiffCharLevel(true))
            .different(DifferentType::DiffContextLines(4))
            .different(DifferentType::DiffEnable(true))
            .different(DifferentType::DiffIgnoreCase(false))
            .different(DifferentType::DiffIgnoreWhiteSpaces(true))
            .different(DifferentType::DiffTemplate(DiffTemplate::Unified))
            .text(TextType::CleanUpText(true))
            .text(TextType::EnsureNewlineAtEof(true))
            .text(TextType::TranslateTabsToSpaces(-1))
            .text(TextType::TrimTrailingWhiteSpaces(false))
            .text(TextType::UnifyLeadingHyphen(true))
            .strategy(JapaneseConversionStrategy::Style(ConversionStrategy::Protect))
            .strategy(JapaneseConversionStrategy::Text(ConversionStrategy::None));

        let params = client().convert_parameters("x", ConverterType::Mars, &options);
        let keys: Vec<&str> = params.keys().collect();
        assert_eq!(
            keys,
            [
                "cleanUpText",
                "converter",
                "diffCharLevel",
                "diffContextLines",
                "diffEnable",
                "diffIgnoreCase",
                "diffIgnoreWhiteSpaces",
                "diffTemplate",
                "ensureNewlineAtEof",
                "jpStyleConversionStrategy",
                "jpTextConversionStrategy",
                "modules",
                "text",
                "translateTabsToSpaces",
                "trimTrailingWhiteSpaces",
                "unifyLeadingHyphen",
                "userPostReplace",
                "userPreReplace",
                "userProtectReplace",
            ]
        );
        assert_eq!(params.get("modules"), Some(&ParamValue::Str(r#"{"Smooth":0}"#.to_string())));
        assert_eq!(params.get("diffTemplate"), Some(&ParamValue::Str("Unified".to_string())));
        assert_eq!(params.get("translateTabsToSpaces"), Some(&ParamValue::Int(-1)));
        assert_eq!(params.get("jpTextConversionStrategy"), Some(&ParamValue::Str("none".to_string())));
    }

    #[test]
    fn duplicate_option_keys_keep_last_value() {
        let options = ConvertOptions::new()
            .replace(ReplaceType::UserPreReplace(vec![("A".to_string(), "B".to_string())]))
            .replace(ReplaceType::UserPreReplace(vec![("C".to_string(), "D".to_string())]))
            .different(DifferentType::DiffContextLines(1))
            .different(DifferentType::DiffContextLines(3));
        let params = client().convert_parameters("x", ConverterType::China, &options);
        assert_eq!(params.len(), 4);
        assert_eq!(params.get("userPreReplace"), Some(&ParamValue::Str("C=D".to_string())));
        assert_eq!(params.get("diffContextLines"), Some(&ParamValue::Int(3)));
    }

    #[test]
    fn parse_http_result_success_returns_raw_body() {
        let body = client().parse_http_result(ok(200, r#"{"foo":"bar"}"#)).unwrap();
        assert_eq!(body, br#"{"foo":"bar"}"#);
    }

    #[test]
    fn parse_http_result_non_200_keeps_code() {
        let err = client().parse_http_result(ok(404, "not found")).unwrap_err();
        assert!(matches!(err, ConvertError::HttpCode(404)));
        let err = client().parse_http_result(ok(201, "{}")).unwrap_err();
        assert!(matches!(err, ConvertError::HttpCode(201)));
    }

    #[test]
    fn parse_http_result_missing_status_or_body_is_unknown() {
        let no_status = HttpResponse {
            status: None,
            headers: Vec::new(),
            body: Some(b"{}".to_vec()),
        };
        let no_body = HttpResponse {
            status: Some(200),
            headers: Vec::new(),
            body: None,
        };
        assert!(matches!(client().parse_http_result(Ok(no_status)), Err(ConvertError::Unknown)));
        assert!(matches!(client().parse_http_result(Ok(no_body)), Err(ConvertError::Unknown)));
    }

    #[test]
    fn parse_convert_text_extracts_data_text() {
        let text = client()
            .parse_convert_text(ok(200, r#"{"data":{"text":"你好"}}"#))
            .unwrap();
        assert_eq!(text, "你好");
    }

    #[test]
    fn parse_convert_text_rejects_other_shapes() {
        for body in [r#"{"foo":"bar"}"#, r#"{"data":"text"}"#, r#"{"data":{"text":1}}"#, "[]", "not json", ""] {
            let err = client().parse_convert_text(ok(200, body)).unwrap_err();
            assert!(matches!(err, ConvertError::MalformedResponse), "body {body:?}");
        }
    }

    #[test]
    fn arrays_are_not_envelopes() {
        assert!(matches!(decode_text(br#"[["x"]]"#), Err(ConvertError::MalformedResponse)));
        assert!(matches!(decode_text(br#"{"data":["x"]}"#), Err(ConvertError::MalformedResponse)));
        assert!(matches!(decode_text(br#"{"data":{"text":["x"]}}"#), Err(ConvertError::MalformedResponse)));
    }

    #[test]
    fn parse_convert_response_rejects_arrays() {
        for body in [r#"[["x"]]"#, r#"[0, "", ["China", "x"]]"#, r#"{"data":[null, "x"]}"#] {
            let err = client().parse_convert_response(ok(200, body)).unwrap_err();
            assert!(matches!(err, ConvertError::MalformedResponse), "body {body:?}");
        }
        let response = client()
            .parse_convert_response(ok(200, r#"{"data":{"text":"x"}}"#))
            .unwrap();
        assert_eq!(response.data.text, "x");
    }

    #[test]
    fn parse_convert_keeps_malformed_body() {
        let body = client().parse_convert(ok(200, r#"{"foo":"bar"}"#)).unwrap();
        assert_eq!(body, br#"{"foo":"bar"}"#);
    }

    #[tokio::test]
    async fn convert_text_goes_through_transport_once() {
        let converter = converter(|_| ok(200, r#"{"code":0,"data":{"text":"你好"}}"#));
        let text = converter
            .convert_text("妳好", ConverterType::China, &ConvertOptions::new())
            .await
            .unwrap();
        assert_eq!(text, "你好");

        let requests = converter.transport().requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].url, "http://localhost:3000/convert");
    }

    #[tokio::test]
    async fn service_info_returns_raw_body() {
        let converter = converter(|_| ok(200, r#"{"data":{"converters":[]}}"#));
        let body = converter.service_info().await.unwrap();
        assert_eq!(body, br#"{"data":{"converters":[]}}"#);
        let requests = converter.transport().requests.lock().unwrap();
        assert_eq!(requests[0].method, HttpMethod::Get);
    }

    #[tokio::test]
    async fn http_404_fails_both_operations() {
        let converter = converter(|_| ok(404, "gone"));
        let options = ConvertOptions::new();
        let err = converter.convert("x", ConverterType::Taiwan, &options).await.unwrap_err();
        assert!(matches!(err, ConvertError::HttpCode(404)));
        let err = converter.convert_text("x", ConverterType::Taiwan, &options).await.unwrap_err();
        assert!(matches!(err, ConvertError::HttpCode(404)));
    }

    #[tokio::test]
    async fn malformed_body_fails_only_convert_text() {
        let converter = converter(|_| ok(200, r#"{"foo":"bar"}"#));
        let options = ConvertOptions::new();
        let raw = converter.convert("x", ConverterType::Taiwan, &options).await.unwrap();
        assert_eq!(raw, br#"{"foo":"bar"}"#);
        let err = converter.convert_text("x", ConverterType::Taiwan, &options).await.unwrap_err();
        assert!(matches!(err, ConvertError::MalformedResponse));
    }

    #[tokio::test]
    async fn transport_error_is_propagated_unchanged() {
        let converter = converter(|_| Err(refused()));
        let options = ConvertOptions::new();
        for err in [
            converter.convert("x", ConverterType::Taiwan, &options).await.unwrap_err(),
            converter.convert_text("x", ConverterType::Taiwan, &options).await.unwrap_err(),
            converter.service_info().await.unwrap_err(),
        ] {
            let io = err
                .transport_error()
                .and_then(|e| e.downcast_ref::<std::io::Error>())
                .unwrap();
            assert_eq!(io.kind(), std::io::ErrorKind::ConnectionRefused);
        }
    }

    #[tokio::test]
    async fn concurrent_calls_do_not_share_parameters() {
        // Echo the request's own text back so each call sees only its input.
        let converter = converter(|req| {
            let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            let reply = serde_json::json!({"data": {"text": format!("{}:{}", body["converter"].as_str().unwrap(), body["text"].as_str().unwrap())}});
            ok(200, &reply.to_string())
        });
        let first = converter.clone();
        let second = converter.clone();
        let options = ConvertOptions::new();
        let (a, b) = tokio::join!(
            first.convert_text("甲", ConverterType::China, &options),
            second.convert_text("乙", ConverterType::Taiwan, &options),
        );
        assert_eq!(a.unwrap(), "China:甲");
        assert_eq!(b.unwrap(), "Taiwan:乙");
        assert_eq!(converter.transport().requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn convert_response_decodes_envelope() {
        let converter = converter(|_| {
            ok(200, r#"{"code":0,"msg":"","data":{"converter":"China","text":"软件","diff":null,"usedModules":[]},"execTime":0.5}"#)
        });
        let response = converter
            .convert_response("軟體", ConverterType::China, &ConvertOptions::new())
            .await
            .unwrap();
        assert_eq!(response.data.text, "软件");
        assert_eq!(response.data.converter.as_deref(), Some("China"));
    }
}
