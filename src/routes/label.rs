use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{OpenApi, Tags, param::Query, payload::Json};
use serde_json::Value as JsonValue;

use crate::{
    AppState,
    core::{
        event::GatewayResponse,
        handler,
        params::{self, QueryParams},
    },
    schemas::label::{LabelPayload, LabelResponse},
};

#[derive(Tags)]
enum ApiLabelTags {
    Label,
    Gateway,
}

pub struct ApiLabel;

/// Collect the query parameters that were sent; decoding happens in the resolver.
fn query_params<const N: usize>(fields: [(&str, Query<Option<String>>); N]) -> QueryParams {
    QueryParams::from_map(
        fields
            .into_iter()
            .filter_map(|(name, Query(value))| value.map(|value| (name.to_string(), value)))
            .collect(),
    )
}

#[OpenApi()]
impl ApiLabel {
    /// Label
    ///
    /// Render a QR code as a printable HTML label, with optional captions above and below
    /// the image. `text` is required; `label=false` returns only the SVG image.
    ///
    /// # Example Request
    /// ```text
    /// GET /?text=https%3A%2F%2Fexample.com&upper=Shelf%20A&lower=Row%201\nBin%203&error_correction=M
    /// ```
    #[oai(path = "/", method = "get", tag = "ApiLabelTags::Label")]
    #[allow(clippy::too_many_arguments)]
    async fn label(
        &self,
        text: Query<Option<String>>,
        upper: Query<Option<String>>,
        lower: Query<Option<String>>,
        label: Query<Option<String>>,
        error_correction: Query<Option<String>>,
        box_size: Query<Option<String>>,
        border: Query<Option<String>>,
        fill_color: Query<Option<String>>,
        back_color: Query<Option<String>>,
        encoding: Query<Option<String>>,
        method: Query<Option<String>>,
        xml_declaration: Query<Option<String>>,
        default_namespace: Query<Option<String>>,
        short_empty_elements: Query<Option<String>>,
        log_level: Query<Option<String>>,
        state: Data<&Arc<AppState>>,
    ) -> LabelResponse {
        let query = query_params([
            (params::TEXT, text),
            (params::UPPER, upper),
            (params::LOWER, lower),
            (params::LABEL, label),
            (params::ERROR_CORRECTION, error_correction),
            (params::BOX_SIZE, box_size),
            (params::BORDER, border),
            (params::FILL_COLOR, fill_color),
            (params::BACK_COLOR, back_color),
            (params::ENCODING, encoding),
            (params::METHOD, method),
            (params::XML_DECLARATION, xml_declaration),
            (params::DEFAULT_NAMESPACE, default_namespace),
            (params::SHORT_EMPTY_ELEMENTS, short_empty_elements),
            (params::LOG_LEVEL, log_level),
        ]);
        LabelResponse::from_result(handler::handle_query(&query, &state.config), "query")
    }

    /// Image
    ///
    /// Render only the SVG image of the QR code. Captions and `label` do not apply.
    #[oai(path = "/image", method = "get", tag = "ApiLabelTags::Label")]
    #[allow(clippy::too_many_arguments)]
    async fn image(
        &self,
        text: Query<Option<String>>,
        error_correction: Query<Option<String>>,
        box_size: Query<Option<String>>,
        border: Query<Option<String>>,
        fill_color: Query<Option<String>>,
        back_color: Query<Option<String>>,
        encoding: Query<Option<String>>,
        method: Query<Option<String>>,
        xml_declaration: Query<Option<String>>,
        default_namespace: Query<Option<String>>,
        short_empty_elements: Query<Option<String>>,
        log_level: Query<Option<String>>,
        state: Data<&Arc<AppState>>,
    ) -> LabelResponse {
        let query = query_params([
            (params::TEXT, text),
            (params::ERROR_CORRECTION, error_correction),
            (params::BOX_SIZE, box_size),
            (params::BORDER, border),
            (params::FILL_COLOR, fill_color),
            (params::BACK_COLOR, back_color),
            (params::ENCODING, encoding),
            (params::METHOD, method),
            (params::XML_DECLARATION, xml_declaration),
            (params::DEFAULT_NAMESPACE, default_namespace),
            (params::SHORT_EMPTY_ELEMENTS, short_empty_elements),
            (params::LOG_LEVEL, log_level),
        ])
        .force(params::LABEL, "false");
        LabelResponse::from_result(handler::handle_query(&query, &state.config), "query")
    }

    /// Invoke
    ///
    /// Direct call with a JSON payload. Fields use native JSON types, for example
    /// `{"text": "hello", "label": false, "fill_color": [0, 0, 128]}`.
    #[oai(path = "/invoke", method = "post", tag = "ApiLabelTags::Label")]
    async fn invoke(
        &self,
        Json(payload): Json<LabelPayload>,
        state: Data<&Arc<AppState>>,
    ) -> LabelResponse {
        LabelResponse::from_result(
            handler::handle_direct(&payload.into_json(), &state.config),
            "body",
        )
    }

    /// Gateway Event
    ///
    /// Handle an API gateway (HTTP API v2) event and return the gateway response envelope.
    /// Errors are reported through `statusCode` inside the envelope.
    #[oai(path = "/event", method = "post", tag = "ApiLabelTags::Gateway")]
    async fn event(
        &self,
        Json(event): Json<JsonValue>,
        state: Data<&Arc<AppState>>,
    ) -> Json<GatewayResponse> {
        Json(handler::handle_event(&event, &state.config))
    }

    #[oai(path = "/health", method = "get")]
    async fn health(&self) -> Json<JsonValue> {
        Json(serde_json::json!({ "status": "healthy" }))
    }
}
