//! Parameter resolution: raw caller input to a validated [`RenderRequest`].
//!
//! Input arrives through one of two transports. A direct call carries native JSON values; a
//! query string carries every field as text. The transport decides how each field is
//! decoded, never the shape of the value itself.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::colors::Color;
use crate::core::svg::{OutputMethod, SerializeOptions, TextEncoding};
use crate::core::symbol::ErrorCorrection;
use crate::error::{QrLabelError, QrLabelResult};
use crate::settings::Config;
use crate::telemetry::LogLevel;

pub const TEXT: &str = "text";
pub const UPPER: &str = "upper";
pub const LOWER: &str = "lower";
pub const LABEL: &str = "label";
pub const ERROR_CORRECTION: &str = "error_correction";
pub const BOX_SIZE: &str = "box_size";
pub const BORDER: &str = "border";
pub const FILL_COLOR: &str = "fill_color";
pub const BACK_COLOR: &str = "back_color";
pub const ENCODING: &str = "encoding";
pub const METHOD: &str = "method";
pub const XML_DECLARATION: &str = "xml_declaration";
pub const DEFAULT_NAMESPACE: &str = "default_namespace";
pub const SHORT_EMPTY_ELEMENTS: &str = "short_empty_elements";
pub const LOG_LEVEL: &str = "log_level";

const DEFAULT_BOX_SIZE: u32 = 10;
const DEFAULT_BORDER: u32 = 4;
/// Upper bounds keep the drawn side length well inside integer range.
pub const MAX_BOX_SIZE: i64 = 1000;
pub const MAX_BORDER: i64 = 1000;

/// Fully defaulted and validated rendering parameters for one invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderRequest {
    pub text: String,
    pub upper_caption: String,
    pub lower_caption: String,
    pub emit_label: bool,
    pub error_correction: ErrorCorrection,
    pub module_size: u32,
    pub border_modules: u32,
    pub foreground: Color,
    pub background: Color,
    pub serialization: SerializeOptions,
    pub log_level: LogLevel,
}

/// One raw field value, tagged with the transport it came from.
#[derive(Clone, Copy, Debug)]
pub enum RawField<'a> {
    Query(&'a str),
    Json(&'a Value),
}

impl RawField<'_> {
    fn is_null(&self) -> bool {
        matches!(self, RawField::Json(Value::Null))
    }
}

pub trait FieldSource {
    fn field(&self, name: &str) -> Option<RawField<'_>>;
}

/// A direct-call payload: a JSON object with native values.
pub struct DirectPayload<'a>(&'a Map<String, Value>);

impl<'a> DirectPayload<'a> {
    pub fn new(payload: &'a Value) -> QrLabelResult<Self> {
        payload
            .as_object()
            .map(Self)
            .ok_or_else(|| QrLabelError::validation("payload", "expected a JSON object"))
    }
}

impl FieldSource for DirectPayload<'_> {
    fn field(&self, name: &str) -> Option<RawField<'_>> {
        self.0.get(name).map(RawField::Json)
    }
}

/// Query-string parameters; a repeated key keeps its last value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    /// Parse an `application/x-www-form-urlencoded` query string.
    pub fn parse(raw: &str) -> Self {
        Self(
            url::form_urlencoded::parse(raw.trim_start_matches('?').as_bytes())
                .into_owned()
                .collect(),
        )
    }

    pub fn from_map(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }

    /// Override a parameter regardless of what the caller sent.
    pub fn force(mut self, name: &str, value: &str) -> Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }
}

impl FieldSource for QueryParams {
    fn field(&self, name: &str) -> Option<RawField<'_>> {
        self.0.get(name).map(|value| RawField::Query(value))
    }
}

pub fn resolve_direct(payload: &Value, config: &Config) -> QrLabelResult<RenderRequest> {
    resolve(&DirectPayload::new(payload)?, config)
}

pub fn resolve_query(params: &QueryParams, config: &Config) -> QrLabelResult<RenderRequest> {
    resolve(params, config)
}

/// Validate every field and fill in defaults.
pub fn resolve<S: FieldSource + ?Sized>(
    source: &S,
    config: &Config,
) -> QrLabelResult<RenderRequest> {
    let text = match source.field(TEXT) {
        Some(raw) => decode_string(TEXT, raw)?,
        None => return Err(QrLabelError::validation(TEXT, "field required")),
    };
    if text.is_empty() {
        return Err(QrLabelError::validation(TEXT, "must not be empty"));
    }

    let serialization = SerializeOptions {
        encoding: nullable(source, ENCODING, decode_encoding)?
            .unwrap_or(Some(TextEncoding::Unicode)),
        method: nullable(source, METHOD, decode_method)?.flatten(),
        xml_declaration: nullable(source, XML_DECLARATION, decode_bool)?.flatten(),
        default_namespace: nullable(source, DEFAULT_NAMESPACE, decode_string)?.flatten(),
        short_empty_elements: optional(source, SHORT_EMPTY_ELEMENTS, decode_bool)?
            .unwrap_or(true),
    };

    Ok(RenderRequest {
        text,
        upper_caption: optional(source, UPPER, decode_string)?.unwrap_or_default(),
        lower_caption: optional(source, LOWER, decode_string)?.unwrap_or_default(),
        emit_label: optional(source, LABEL, decode_bool)?.unwrap_or(true),
        error_correction: optional(source, ERROR_CORRECTION, decode_error_correction)?
            .unwrap_or(ErrorCorrection::L),
        module_size: optional(source, BOX_SIZE, |name, raw| decode_size(name, raw, 1, MAX_BOX_SIZE))?
            .unwrap_or(DEFAULT_BOX_SIZE),
        border_modules: optional(source, BORDER, |name, raw| decode_size(name, raw, 0, MAX_BORDER))?
            .unwrap_or(DEFAULT_BORDER),
        foreground: optional(source, FILL_COLOR, decode_color)?.unwrap_or_else(Color::black),
        background: optional(source, BACK_COLOR, decode_color)?.unwrap_or_else(Color::white),
        serialization,
        log_level: optional(source, LOG_LEVEL, decode_log_level)?
            .unwrap_or(config.default_log_level),
    })
}

/// Absent fields yield `None`.
fn optional<S, T, F>(source: &S, name: &str, decode: F) -> QrLabelResult<Option<T>>
where
    S: FieldSource + ?Sized,
    F: FnOnce(&str, RawField<'_>) -> QrLabelResult<T>,
{
    source.field(name).map(|raw| decode(name, raw)).transpose()
}

/// Like [`optional`], but an explicit JSON `null` yields `Some(None)`.
fn nullable<S, T, F>(source: &S, name: &str, decode: F) -> QrLabelResult<Option<Option<T>>>
where
    S: FieldSource + ?Sized,
    F: FnOnce(&str, RawField<'_>) -> QrLabelResult<T>,
{
    match source.field(name) {
        None => Ok(None),
        Some(raw) if raw.is_null() => Ok(Some(None)),
        Some(raw) => decode(name, raw).map(|value| Some(Some(value))),
    }
}

fn decode_string(name: &str, raw: RawField<'_>) -> QrLabelResult<String> {
    match raw {
        RawField::Query(value) => Ok(value.to_string()),
        RawField::Json(Value::String(value)) => Ok(value.clone()),
        RawField::Json(_) => Err(QrLabelError::validation(name, "expected a string")),
    }
}

fn decode_bool(name: &str, raw: RawField<'_>) -> QrLabelResult<bool> {
    match raw {
        RawField::Query("true") => Ok(true),
        RawField::Query("false") => Ok(false),
        RawField::Json(Value::Bool(value)) => Ok(*value),
        RawField::Query(_) => Err(QrLabelError::validation(
            name,
            "expected \"true\" or \"false\"",
        )),
        RawField::Json(_) => Err(QrLabelError::validation(name, "expected a boolean")),
    }
}

fn decode_int(name: &str, raw: RawField<'_>) -> QrLabelResult<i64> {
    match raw {
        RawField::Query(value) => value
            .trim()
            .parse::<i64>()
            .map_err(|_| QrLabelError::validation(name, format!("invalid integer {value:?}"))),
        RawField::Json(Value::Number(value)) => value
            .as_i64()
            .ok_or_else(|| QrLabelError::validation(name, format!("invalid integer {value}"))),
        RawField::Json(_) => Err(QrLabelError::validation(name, "expected an integer")),
    }
}

fn decode_size(name: &str, raw: RawField<'_>, min: i64, max: i64) -> QrLabelResult<u32> {
    let value = decode_int(name, raw)?;
    if value < min {
        return Err(QrLabelError::validation(
            name,
            format!("must be at least {min}, got {value}"),
        ));
    }
    if value > max {
        return Err(QrLabelError::validation(
            name,
            format!("must be at most {max}, got {value}"),
        ));
    }
    u32::try_from(value).map_err(|_| QrLabelError::validation(name, format!("{value} is too large")))
}

fn decode_error_correction(name: &str, raw: RawField<'_>) -> QrLabelResult<ErrorCorrection> {
    let value = decode_string(name, raw)?;
    ErrorCorrection::parse(&value).ok_or_else(|| {
        QrLabelError::validation(name, format!("expected one of L, M, Q, H, got {value:?}"))
    })
}

fn decode_color(name: &str, raw: RawField<'_>) -> QrLabelResult<Color> {
    match raw {
        RawField::Query(value) if value.contains(',') => {
            let channels = value
                .split(',')
                .map(|part| part.trim().parse::<u8>().ok())
                .collect::<Option<Vec<u8>>>();
            match channels.as_deref() {
                Some(&[r, g, b]) => Ok(Color::Rgb(r, g, b)),
                _ => Err(QrLabelError::validation(
                    name,
                    format!("expected \"r,g,b\" with values 0-255, got {value:?}"),
                )),
            }
        }
        RawField::Query(value) => named_color(name, value),
        RawField::Json(Value::String(value)) => named_color(name, value),
        RawField::Json(Value::Array(items)) => {
            let channels = items
                .iter()
                .map(|item| item.as_u64().and_then(|v| u8::try_from(v).ok()))
                .collect::<Option<Vec<u8>>>();
            match channels.as_deref() {
                Some(&[r, g, b]) => Ok(Color::Rgb(r, g, b)),
                _ => Err(QrLabelError::validation(
                    name,
                    "expected three integers between 0 and 255",
                )),
            }
        }
        RawField::Json(_) => Err(QrLabelError::validation(
            name,
            "expected a color name or an [r, g, b] triple",
        )),
    }
}

fn named_color(name: &str, value: &str) -> QrLabelResult<Color> {
    Color::from_name(value)
        .ok_or_else(|| QrLabelError::validation(name, format!("unknown color {value:?}")))
}

fn decode_log_level(name: &str, raw: RawField<'_>) -> QrLabelResult<LogLevel> {
    let level = match raw {
        RawField::Json(Value::Number(_)) => {
            let number = decode_int(name, raw)?;
            LogLevel::from_number(number)
        }
        _ => LogLevel::parse(&decode_string(name, raw)?),
    };
    level.ok_or_else(|| QrLabelError::validation(name, "unknown log level"))
}

fn decode_encoding(name: &str, raw: RawField<'_>) -> QrLabelResult<TextEncoding> {
    let value = decode_string(name, raw)?;
    TextEncoding::parse(&value)
        .ok_or_else(|| QrLabelError::validation(name, format!("unsupported encoding {value:?}")))
}

fn decode_method(name: &str, raw: RawField<'_>) -> QrLabelResult<OutputMethod> {
    let value = decode_string(name, raw)?;
    OutputMethod::parse(&value).ok_or_else(|| {
        QrLabelError::validation(name, format!("expected xml, html or text, got {value:?}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn direct(payload: Value) -> QrLabelResult<RenderRequest> {
        resolve_direct(&payload, &Config::default())
    }

    fn query(raw: &str) -> QrLabelResult<RenderRequest> {
        resolve_query(&QueryParams::parse(raw), &Config::default())
    }

    fn field_of(err: QrLabelError) -> String {
        match err {
            QrLabelError::Validation { field, .. } => field,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_filled_in() {
        let request = direct(json!({"text": "hello"})).unwrap();
        assert_eq!(request.text, "hello");
        assert_eq!(request.upper_caption, "");
        assert!(request.emit_label);
        assert_eq!(request.error_correction, ErrorCorrection::L);
        assert_eq!(request.module_size, 10);
        assert_eq!(request.border_modules, 4);
        assert_eq!(request.foreground, Color::black());
        assert_eq!(request.background, Color::white());
        assert_eq!(request.serialization, SerializeOptions::default());
        assert_eq!(request.log_level, LogLevel::WARNING);
    }

    #[test]
    fn default_log_level_comes_from_config() {
        let config = Config {
            default_log_level: LogLevel::parse("info").unwrap(),
            ..Config::default()
        };
        let request = resolve_direct(&json!({"text": "a"}), &config).unwrap();
        assert_eq!(request.log_level.name(), "info");
    }

    #[test]
    fn missing_or_empty_text_fails_for_both_transports() {
        assert_eq!(field_of(direct(json!({})).unwrap_err()), TEXT);
        assert_eq!(field_of(direct(json!({"text": ""})).unwrap_err()), TEXT);
        assert_eq!(field_of(query("upper=x").unwrap_err()), TEXT);
        assert_eq!(field_of(query("text=").unwrap_err()), TEXT);
    }

    #[test]
    fn payload_must_be_an_object() {
        assert_eq!(field_of(direct(json!(["text"])).unwrap_err()), "payload");
    }

    #[test]
    fn query_values_are_decoded_from_text() {
        let request = query(
            "text=hello%20world&upper=A+%26+B&label=false&error_correction=h&box_size=3&border=0\
             &fill_color=10,20,30&back_color=%23ffeedd&log_level=10",
        )
        .unwrap();
        assert_eq!(request.text, "hello world");
        assert_eq!(request.upper_caption, "A & B");
        assert!(!request.emit_label);
        assert_eq!(request.error_correction, ErrorCorrection::H);
        assert_eq!(request.module_size, 3);
        assert_eq!(request.border_modules, 0);
        assert_eq!(request.foreground, Color::Rgb(10, 20, 30));
        assert_eq!(request.background, Color::Hex("#ffeedd".to_string()));
        assert_eq!(request.log_level.name(), "debug");
    }

    #[test]
    fn direct_values_use_native_types() {
        let request = direct(json!({
            "text": "hi",
            "label": false,
            "box_size": 2,
            "fill_color": [255, 0, 0],
            "back_color": "Yellow",
            "xml_declaration": true,
            "short_empty_elements": false,
            "method": "html",
            "encoding": "utf-8",
            "log_level": "DEBUG",
        }))
        .unwrap();
        assert_eq!(request.foreground, Color::Rgb(255, 0, 0));
        assert_eq!(request.background, Color::Named("yellow".to_string()));
        assert_eq!(request.serialization.xml_declaration, Some(true));
        assert!(!request.serialization.short_empty_elements);
        assert_eq!(request.serialization.method, Some(OutputMethod::Html));
        assert_eq!(request.serialization.encoding, Some(TextEncoding::Utf8));
    }

    #[test]
    fn transport_decides_the_accepted_shape() {
        assert_eq!(field_of(direct(json!({"text": "a", "label": "false"})).unwrap_err()), LABEL);
        assert_eq!(field_of(direct(json!({"text": "a", "box_size": "10"})).unwrap_err()), BOX_SIZE);
        assert_eq!(field_of(query("text=a&label=yes").unwrap_err()), LABEL);
        assert_eq!(field_of(query("text=a&label=True").unwrap_err()), LABEL);
    }

    #[test]
    fn sizes_are_range_checked_not_clamped() {
        assert_eq!(field_of(direct(json!({"text": "a", "box_size": 0})).unwrap_err()), BOX_SIZE);
        assert_eq!(field_of(direct(json!({"text": "a", "box_size": -3})).unwrap_err()), BOX_SIZE);
        assert_eq!(field_of(direct(json!({"text": "a", "box_size": 2.5})).unwrap_err()), BOX_SIZE);
        assert_eq!(field_of(query("text=a&border=-1").unwrap_err()), BORDER);
        assert_eq!(field_of(query("text=a&box_size=ten").unwrap_err()), BOX_SIZE);
        assert!(direct(json!({"text": "a", "border": 0})).is_ok());
    }

    #[test]
    fn sizes_have_an_upper_bound() {
        let err = query("text=a&box_size=4294967295&border=4294967295&label=false").unwrap_err();
        assert!(matches!(err, QrLabelError::Validation { .. }));
        assert_eq!(field_of(query("text=a&border=4294967295").unwrap_err()), BORDER);
        assert_eq!(field_of(direct(json!({"text": "a", "box_size": 1001})).unwrap_err()), BOX_SIZE);
        assert!(direct(json!({"text": "a", "box_size": 1000, "border": 1000})).is_ok());
    }

    #[test]
    fn error_correction_must_be_a_known_level() {
        assert_eq!(
            field_of(direct(json!({"text": "a", "error_correction": "X"})).unwrap_err()),
            ERROR_CORRECTION
        );
        assert_eq!(
            field_of(direct(json!({"text": "a", "error_correction": 1})).unwrap_err()),
            ERROR_CORRECTION
        );
    }

    #[test]
    fn colors_are_validated() {
        for bad in [json!("blurple"), json!([1, 2]), json!([1, 2, 256]), json!(7)] {
            let err = direct(json!({"text": "a", "fill_color": bad})).unwrap_err();
            assert_eq!(field_of(err), FILL_COLOR);
        }
        assert_eq!(field_of(query("text=a&back_color=1,2,3,4").unwrap_err()), BACK_COLOR);
    }

    #[test]
    fn log_level_must_resolve() {
        assert_eq!(field_of(direct(json!({"text": "a", "log_level": 15})).unwrap_err()), LOG_LEVEL);
        assert_eq!(field_of(query("text=a&log_level=chatty").unwrap_err()), LOG_LEVEL);
        let request = direct(json!({"text": "a", "log_level": 40})).unwrap();
        assert_eq!(request.log_level.name(), "error");
    }

    #[test]
    fn null_unsets_passthrough_fields_only() {
        let request = direct(json!({"text": "a", "encoding": null, "method": null})).unwrap();
        assert_eq!(request.serialization.encoding, None);
        assert_eq!(request.serialization.method, None);
        assert_eq!(field_of(direct(json!({"text": "a", "upper": null})).unwrap_err()), UPPER);
    }

    #[test]
    fn unknown_passthrough_values_fail() {
        assert_eq!(field_of(query("text=a&method=json").unwrap_err()), METHOD);
        assert_eq!(field_of(query("text=a&encoding=klingon").unwrap_err()), ENCODING);
    }

    #[test]
    fn resolution_is_deterministic() {
        let raw = "text=abc&upper=x&error_correction=Q";
        assert_eq!(query(raw).unwrap(), query(raw).unwrap());
    }

    #[test]
    fn forced_parameters_override_the_caller() {
        let params = QueryParams::parse("text=a&label=true").force(LABEL, "false");
        assert!(!resolve_query(&params, &Config::default()).unwrap().emit_label);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        assert!(query("text=a&utm_source=mail").is_ok());
    }
}
