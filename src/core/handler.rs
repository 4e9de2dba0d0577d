//! Request pipeline: decode envelope, resolve parameters, render.
//!
//! A request's `log_level` only gates the output of that request. Nothing here touches the
//! process-wide filter; the one-shot CLI front-ends do that themselves.

use serde_json::Value;

use crate::core::event::{GatewayEvent, GatewayResponse};
use crate::core::params::{self, QueryParams, RenderRequest};
use crate::core::renderer::{self, RenderedDocument};
use crate::error::QrLabelResult;
use crate::settings::Config;

pub fn render_request(request: &RenderRequest) -> QrLabelResult<RenderedDocument> {
    if request.log_level.enables(tracing::Level::INFO) {
        tracing::info!(
            "Rendering: label={}, level={:?}, text_len={}",
            request.emit_label,
            request.error_correction,
            request.text.len()
        );
    }
    renderer::render(request)
}

/// Direct call: a JSON payload in, a document (or a failure) out.
pub fn handle_direct(payload: &Value, config: &Config) -> QrLabelResult<RenderedDocument> {
    let request = params::resolve_direct(payload, config)?;
    render_request(&request)
}

pub fn handle_query(query: &QueryParams, config: &Config) -> QrLabelResult<RenderedDocument> {
    let request = params::resolve_query(query, config)?;
    render_request(&request)
}

/// Validates a gateway envelope and resolves the parameters it carries.
pub fn resolve_event(event: &Value, config: &Config) -> QrLabelResult<RenderRequest> {
    let event = GatewayEvent::decode(event)?;
    params::resolve_query(&event.query_params(), config)
}

/// Wraps a pipeline result in a gateway envelope; failures become client-error responses.
pub fn respond(result: QrLabelResult<RenderedDocument>) -> GatewayResponse {
    match result {
        Ok(document) => GatewayResponse::from_document(document),
        Err(e) => {
            tracing::warn!("Rejected gateway event: {}", e);
            GatewayResponse::from_error(&e)
        }
    }
}

pub fn handle_event(event: &Value, config: &Config) -> GatewayResponse {
    respond(resolve_event(event, config).and_then(|request| render_request(&request)))
}
