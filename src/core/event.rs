//! API-gateway (HTTP API, payload v2) request and response envelopes.

use std::collections::{BTreeMap, HashMap};

use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::params::{LABEL, QueryParams};
use crate::core::renderer::RenderedDocument;
use crate::error::{QrLabelError, QrLabelResult};

/// The envelope fields this service relies on; anything else the gateway sends is ignored.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    pub version: String,
    pub route_key: String,
    pub raw_path: String,
    pub raw_query_string: String,
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub query_string_parameters: Option<BTreeMap<String, String>>,
    pub request_context: Map<String, Value>,
    pub is_base64_encoded: bool,
}

impl GatewayEvent {
    pub fn decode(event: &Value) -> QrLabelResult<Self> {
        GatewayEvent::deserialize(event).map_err(|e| QrLabelError::validation("event", e.to_string()))
    }

    /// The `/image` resource only ever returns the bare image.
    pub fn is_image_route(&self) -> bool {
        self.raw_path.trim_end_matches('/').ends_with("/image")
    }

    /// Decoded parameters, preferring the gateway's own parsing over the raw query string.
    pub fn query_params(&self) -> QueryParams {
        let params = match &self.query_string_parameters {
            Some(map) => QueryParams::from_map(map.clone()),
            None => QueryParams::parse(&self.raw_query_string),
        };
        if self.is_image_route() {
            params.force(LABEL, "false")
        } else {
            params
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub is_base64_encoded: bool,
    pub body: String,
}

impl GatewayResponse {
    fn new(status_code: u16, content_type: &str, body: String) -> Self {
        Self {
            status_code,
            headers: BTreeMap::from([("Content-Type".to_string(), content_type.to_string())]),
            is_base64_encoded: false,
            body,
        }
    }

    pub fn from_document(document: RenderedDocument) -> Self {
        Self::new(200, document.content_type(), document.body)
    }

    pub fn from_error(err: &QrLabelError) -> Self {
        let body = serde_json::json!({ "message": err.to_string() }).to_string();
        Self::new(err.status_code(), "application/json", body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(raw_path: &str, query: Value) -> Value {
        json!({
            "version": "2.0",
            "routeKey": format!("GET {raw_path}"),
            "rawPath": raw_path,
            "rawQueryString": "text=from-raw",
            "headers": {"host": "example.com"},
            "queryStringParameters": query,
            "requestContext": {"http": {"method": "GET"}},
            "isBase64Encoded": false,
        })
    }

    #[test]
    fn decodes_a_gateway_event() {
        let decoded = GatewayEvent::decode(&event("/", json!({"text": "hi"}))).unwrap();
        assert_eq!(decoded.route_key, "GET /");
        assert!(!decoded.is_image_route());
        assert_eq!(decoded.query_params(), QueryParams::parse("text=hi"));
    }

    #[test]
    fn falls_back_to_the_raw_query_string() {
        let mut value = event("/", Value::Null);
        value.as_object_mut().unwrap().remove("queryStringParameters");
        let decoded = GatewayEvent::decode(&value).unwrap();
        assert_eq!(decoded.query_params(), QueryParams::parse("text=from-raw"));
    }

    #[test]
    fn image_route_forces_the_bare_image() {
        let decoded = GatewayEvent::decode(&event("/prod/image", json!({"text": "hi", "label": "true"})))
            .unwrap();
        assert!(decoded.is_image_route());
        assert_eq!(decoded.query_params(), QueryParams::parse("text=hi&label=false"));
    }

    #[test]
    fn envelope_shape_is_validated() {
        let mut value = event("/", json!({"text": "hi"}));
        value["isBase64Encoded"] = json!("no");
        assert!(matches!(
            GatewayEvent::decode(&value),
            Err(QrLabelError::Validation { .. })
        ));

        let mut value = event("/", json!({"text": "hi"}));
        value.as_object_mut().unwrap().remove("rawPath");
        assert!(GatewayEvent::decode(&value).is_err());

        let mut value = event("/", json!({"text": "hi"}));
        value["headers"] = json!(["host"]);
        assert!(GatewayEvent::decode(&value).is_err());
    }

    #[test]
    fn error_responses_carry_no_image() {
        let response = GatewayResponse::from_error(&QrLabelError::validation("text", "field required"));
        assert_eq!(response.status_code, 422);
        assert_eq!(response.headers["Content-Type"], "application/json");
        assert!(!response.body.contains("<svg"));
        assert!(!response.is_base64_encoded);
    }
}
