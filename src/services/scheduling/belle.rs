use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{SchedulingProvider, SchedulingProviderError};
use crate::models::SchedulingRequest;

pub struct BelleClient {
    base_url: String,
    client: reqwest::Client,
}

impl BelleClient {
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build Belle HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

/// Request body for `POST /agendar`.
pub fn appointment_payload(request: &SchedulingRequest) -> Value {
    json!({
        "codCliente": request.customer_code,
        "nomeCliente": request.customer_name,
        "telefoneCliente": request.customer_phone,
        "dataAgendamento": request.date_str(),
        "horaAgendamento": request.time_str(),
        "codEstabelecimento": request.establishment_code,
        "codProfissional": request.professional_code,
        "tipoAgendamento": request.appointment_type,
        "servicos": request.service_list(),
        "tempo": request.duration_minutes,
        "codEquipamento": request.equipment_code,
        "novoCard": request.new_card,
        "observacao": request.note,
        "leadId": request.lead_id,
    })
}

/// Belle has answered with both spellings, as a string or a number.
pub fn appointment_code(body: &Value) -> Option<String> {
    ["codAgendamento", "codigo_agendamento"]
        .iter()
        .filter_map(|key| match body.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .next()
}

#[async_trait]
impl SchedulingProvider for BelleClient {
    async fn create_appointment(
        &self,
        request: &SchedulingRequest,
    ) -> Result<String, SchedulingProviderError> {
        let url = format!("{}/agendar", self.base_url);

        let resp = self
            .client
            .post(&url)
            .json(&appointment_payload(request))
            .send()
            .await
            .map_err(|e| SchedulingProviderError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| SchedulingProviderError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(SchedulingProviderError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let data: Value = serde_json::from_str(&text)
            .map_err(|e| SchedulingProviderError::MalformedResponse(format!("{e}: {text}")))?;

        appointment_code(&data).ok_or_else(|| {
            SchedulingProviderError::MalformedResponse(format!("missing appointment code in {data}"))
        })
    }
}
