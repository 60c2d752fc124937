use std::collections::HashMap;

use axum::body::Bytes;
use axum::Json;
use serde_json::{json, Value};

/// Echoes whatever a Bitrix workflow posts, JSON or form encoded. Used to see
/// what a workflow actually sends; nothing is scheduled.
pub async fn bitrix_raw(body: Bytes) -> Json<Value> {
    let data = match serde_json::from_slice::<Value>(&body) {
        Ok(data) => data,
        Err(_) => match parse_form(&body) {
            Some(data) => data,
            None => {
                tracing::warn!("raw Bitrix webhook body is neither JSON nor form data");
                return Json(json!({ "error": "body is neither JSON nor form data" }));
            }
        },
    };

    tracing::info!(body = %data, "raw Bitrix webhook");

    match lead_id(&data) {
        Some(lead_id) => Json(json!({
            "status": "received",
            "lead_id": lead_id,
            "data": data,
        })),
        None => Json(json!({
            "error": "lead_id não encontrado",
            "body_received": data,
        })),
    }
}

fn parse_form(body: &[u8]) -> Option<Value> {
    serde_urlencoded::from_bytes::<HashMap<String, String>>(body)
        .ok()
        .map(|fields| json!(fields))
}

/// Bitrix business processes send `document_id[2]` (e.g. `LEAD_123`).
fn lead_id(data: &Value) -> Option<Value> {
    ["document_id[2]", "DOCUMENT_ID[2]", "lead_id"]
        .iter()
        .find_map(|key| data.get(key))
        .or_else(|| data.get("document_id").and_then(|d| d.get(2)))
        .filter(|v| !v.is_null())
        .cloned()
}
