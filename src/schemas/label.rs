use poem_openapi::{
    ApiResponse, Object,
    payload::{Html, Json, PlainText},
    types::MaybeUndefined,
};
use serde_json::{Map, Value as JsonValue};

use super::common::{BadRequestResponse, UnprocessableEntityResponse};
use crate::core::params;
use crate::core::renderer::{DocumentKind, RenderedDocument};
use crate::error::{QrLabelError, QrLabelResult};

/// Direct-call payload.
///
/// Values are native JSON and are checked field by field when the request is resolved, so a
/// wrongly typed field is reported as a 422 against that field. An explicit `null` unsets
/// the serialization fields; unknown fields are ignored.
#[derive(Object, Debug)]
pub struct LabelPayload {
    /// Text to encode (required, non-empty string)
    pub text: MaybeUndefined<JsonValue>,

    /// Caption above the image; a literal `\n` becomes a line break
    pub upper: MaybeUndefined<JsonValue>,

    /// Caption below the image
    pub lower: MaybeUndefined<JsonValue>,

    /// `true` for the HTML label (default), `false` for the bare SVG image
    pub label: MaybeUndefined<JsonValue>,

    /// One of L, M, Q, H (default M)
    pub error_correction: MaybeUndefined<JsonValue>,

    /// Pixels per module, 1 to 1000 (default 10)
    pub box_size: MaybeUndefined<JsonValue>,

    /// Quiet-zone width in modules, 0 to 1000 (default 4)
    pub border: MaybeUndefined<JsonValue>,

    /// Foreground color: CSS name, `#rrggbb`, or `[r, g, b]` (default black)
    pub fill_color: MaybeUndefined<JsonValue>,

    /// Background color: CSS name, `#rrggbb`, or `[r, g, b]` (default white)
    pub back_color: MaybeUndefined<JsonValue>,

    /// Output text encoding, e.g. `unicode`, `utf-8`, `us-ascii`, `iso-8859-1`
    pub encoding: MaybeUndefined<JsonValue>,

    /// Serialization method: `xml`, `html` or `text`
    pub method: MaybeUndefined<JsonValue>,

    /// Force (`true`) or suppress (`false`) the XML declaration
    pub xml_declaration: MaybeUndefined<JsonValue>,

    /// Namespace written as the default `xmlns`
    pub default_namespace: MaybeUndefined<JsonValue>,

    /// Write empty elements as `<x />` (default `true`)
    pub short_empty_elements: MaybeUndefined<JsonValue>,

    /// Level name or number gating this request's diagnostics
    pub log_level: MaybeUndefined<JsonValue>,
}

impl LabelPayload {
    /// Back to a JSON object for the resolver, keeping absent and `null` apart.
    pub fn into_json(self) -> JsonValue {
        let fields = [
            (params::TEXT, self.text),
            (params::UPPER, self.upper),
            (params::LOWER, self.lower),
            (params::LABEL, self.label),
            (params::ERROR_CORRECTION, self.error_correction),
            (params::BOX_SIZE, self.box_size),
            (params::BORDER, self.border),
            (params::FILL_COLOR, self.fill_color),
            (params::BACK_COLOR, self.back_color),
            (params::ENCODING, self.encoding),
            (params::METHOD, self.method),
            (params::XML_DECLARATION, self.xml_declaration),
            (params::DEFAULT_NAMESPACE, self.default_namespace),
            (params::SHORT_EMPTY_ELEMENTS, self.short_empty_elements),
            (params::LOG_LEVEL, self.log_level),
        ];

        let mut map = Map::new();
        for (name, value) in fields {
            match value {
                MaybeUndefined::Undefined => {}
                MaybeUndefined::Null => {
                    map.insert(name.to_string(), JsonValue::Null);
                }
                MaybeUndefined::Value(value) => {
                    map.insert(name.to_string(), value);
                }
            }
        }
        JsonValue::Object(map)
    }
}

#[derive(ApiResponse)]
pub enum LabelResponse {
    /// Bare QR code image
    #[oai(status = 200, content_type = "image/svg+xml")]
    Image(PlainText<String>),

    /// Printable HTML label
    #[oai(status = 200, content_type = "text/html")]
    Label(Html<String>),

    /// Text does not fit in a QR code at the requested error correction level
    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    /// Missing or invalid parameter
    #[oai(status = 422)]
    UnprocessableEntity(Json<UnprocessableEntityResponse>),
}

impl LabelResponse {
    /// `source` names where the parameters came from (`query` or `body`).
    pub fn from_result(result: QrLabelResult<RenderedDocument>, source: &str) -> Self {
        match result {
            Ok(document) => match document.kind {
                DocumentKind::Image => LabelResponse::Image(PlainText(document.body)),
                DocumentKind::Label => LabelResponse::Label(Html(document.body)),
            },
            Err(QrLabelError::Validation { field, message }) => {
                tracing::warn!("Invalid {} parameter {}: {}", source, field, message);
                let mut detail = UnprocessableEntityResponse::new();
                detail.add_error(vec![source.to_string(), field], message);
                LabelResponse::UnprocessableEntity(Json(detail))
            }
            // configuration errors stop the process at start-up and never reach a request
            Err(e) => {
                tracing::warn!("Render error: {}", e);
                LabelResponse::BadRequest(Json(BadRequestResponse {
                    message: e.to_string(),
                }))
            }
        }
    }
}
