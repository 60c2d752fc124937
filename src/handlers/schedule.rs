use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use serde_json::{Map, Value};
use tracing::Instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::ScheduleOutcome;
use crate::services::crm;
use crate::services::validation::{validate_payload, ValidationError};
use crate::state::AppState;

// Parameter names used by the Bitrix workflow's outgoing webhook.
const QUERY_ALIASES: &[(&str, &str)] = &[
    ("dataagendamento", "data_agendamento"),
    ("profissional", "profissional_codigo"),
    ("estabelecimento", "estabelecimento_codigo"),
    ("tipoagenda", "tipo_agendamento"),
    ("procedimento", "servicos"),
    ("equipamento", "equipamento_codigo"),
    ("obs", "observacao"),
];

// POST /webhook/agendar
//
// The workflow's outgoing webhook posts an empty body and sends the data in
// the query string; anything else must be a JSON body.
pub async fn schedule_json(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<ScheduleOutcome>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return process(&state, query_payload(params)).await.map(Json);
    }

    let raw: Value = serde_json::from_slice(&body).map_err(|e| ValidationError {
        missing_fields: Vec::new(),
        invalid_fields: vec![format!("body: not valid JSON ({e})")],
    })?;
    process(&state, raw).await.map(Json)
}

// GET /webhook/agendar
pub async fn schedule_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ScheduleOutcome>, AppError> {
    process(&state, query_payload(params)).await.map(Json)
}

/// Maps workflow query parameters onto the JSON payload keys. Canonical keys
/// win over their aliases.
pub fn query_payload(params: HashMap<String, String>) -> Value {
    let mut payload = Map::new();
    for (alias, canonical) in QUERY_ALIASES {
        if let Some(value) = params.get(*alias) {
            payload.insert(canonical.to_string(), Value::String(value.clone()));
        }
    }
    for (key, value) in params {
        if !QUERY_ALIASES.iter().any(|(alias, _)| *alias == key) {
            payload.insert(key, Value::String(value));
        }
    }
    Value::Object(payload)
}

/// received -> validated -> scheduled -> crm_updated -> responded.
///
/// Validation and scheduling failures end the request before anything is
/// written to the CRM. CRM steps are reported individually.
pub async fn process(state: &AppState, raw: Value) -> Result<ScheduleOutcome, AppError> {
    let request_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("schedule", request_id = %request_id);
    run(state, raw, request_id).instrument(span).await
}

async fn run(state: &AppState, raw: Value, request_id: String) -> Result<ScheduleOutcome, AppError> {
    tracing::info!("scheduling webhook received");

    let validated = validate_payload(&raw).map_err(|e| {
        tracing::warn!(error = %e, "scheduling payload rejected");
        e
    })?;
    let request = &validated.request;
    let lead_id = request.lead_id;

    tracing::info!(
        lead_id,
        establishment = ?request.establishment_code,
        professional = ?request.professional_code,
        date = %request.date_str(),
        time = %request.time_str(),
        "payload validated"
    );

    let appointment_code = state
        .scheduler
        .create_appointment(request)
        .await
        .map_err(|e| {
            tracing::error!(lead_id, error = %e, "scheduling provider call failed");
            e
        })?;

    tracing::info!(lead_id, appointment_code = %appointment_code, "appointment created");

    let steps =
        crm::apply_confirmation(state.crm.as_ref(), &state.config, &validated, &appointment_code)
            .await;

    let mut outcome = ScheduleOutcome {
        success: true,
        message: "Agendamento processado com sucesso".to_string(),
        request_id,
        lead_id,
        codigo_agendamento: appointment_code,
        warning: validated.warning.clone(),
        crm: steps,
    };

    let failed = outcome.failed_operations();
    if !failed.is_empty() {
        let names: Vec<&str> = failed.iter().map(|op| op.as_str()).collect();
        outcome.success = false;
        outcome.message = format!(
            "Agendamento criado, mas falhou a atualizacao do CRM: {}",
            names.join(", ")
        );
        tracing::warn!(lead_id, failed = ?names, "CRM update incomplete");
    }

    Ok(outcome)
}
