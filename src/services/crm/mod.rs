pub mod bitrix;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::config::{AppConfig, CrmFieldMap};
use crate::models::{CrmOperation, CrmStepReport, SchedulingRequest, StepStatus, ValidatedRequest};

#[derive(Debug, Clone, thiserror::Error)]
#[error("{operation} failed: {detail}")]
pub struct CrmUpdateError {
    pub operation: CrmOperation,
    /// The CRM's response, or the transport error when there was none.
    pub detail: String,
}

#[async_trait]
pub trait CrmProvider: Send + Sync {
    async fn update_lead(&self, lead_id: i64, fields: &Map<String, Value>) -> anyhow::Result<()>;
    async fn add_timeline_comment(&self, lead_id: i64, comment: &str) -> anyhow::Result<()>;
    async fn move_to_stage(&self, lead_id: i64, stage_id: &str) -> anyhow::Result<()>;
}

/// Custom field values for a confirmed appointment. All seven fields are
/// always written so a previous booking's values never linger on the lead.
pub fn lead_fields(
    fields: &CrmFieldMap,
    request: &SchedulingRequest,
    appointment_code: &str,
) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(
        fields.appointment_date.clone(),
        Value::String(format!("{} {}:00", request.date_str(), request.time_str())),
    );
    map.insert(
        fields.appointment_code.clone(),
        Value::String(appointment_code.to_string()),
    );
    map.insert(
        fields.professional.clone(),
        Value::String(request.professional_label()),
    );
    map.insert(
        fields.establishment.clone(),
        Value::String(request.establishment_label()),
    );
    map.insert(
        fields.procedure.clone(),
        Value::String(request.services.clone()),
    );
    map.insert(
        fields.appointment_type.clone(),
        Value::String(request.appointment_type.clone()),
    );
    map.insert(
        fields.equipment.clone(),
        Value::String(request.equipment_label().unwrap_or_default()),
    );
    map
}

pub fn timeline_comment(
    request: &SchedulingRequest,
    appointment_code: &str,
    warning: Option<&str>,
) -> String {
    let mut comment = format!(
        "Agendamento Criado com Sucesso\n\n\
         Codigo do Agendamento: {appointment_code}\n\
         Data: {}\n\
         Hora: {}\n\
         Profissional: {}\n\
         Estabelecimento: {}\n\
         Servicos: {}\n",
        request.date_str(),
        request.time_str(),
        request.professional_label(),
        request.establishment_label(),
        request.services,
    );
    if let Some(equipment) = request.equipment_label() {
        comment.push_str(&format!("Equipamento: {equipment}\n"));
    }
    if !request.note.is_empty() {
        comment.push_str(&format!("Observacao: {}\n", request.note));
    }
    if let Some(warning) = warning {
        comment.push_str(&format!("\nAVISO: {warning}\n"));
    }
    comment
}

/// Writes a confirmed appointment back to the lead. Each step runs even when
/// an earlier one failed; nothing is retried or rolled back.
pub async fn apply_confirmation(
    crm: &dyn CrmProvider,
    config: &AppConfig,
    validated: &ValidatedRequest,
    appointment_code: &str,
) -> Vec<CrmStepReport> {
    let request = &validated.request;
    let lead_id = request.lead_id;

    let fields = lead_fields(&config.crm_fields, request, appointment_code);
    let updated = crm.update_lead(lead_id, &fields).await;
    let updated = report(lead_id, CrmOperation::UpdateFields, updated);

    let comment = timeline_comment(request, appointment_code, validated.warning.as_deref());
    let commented = crm.add_timeline_comment(lead_id, &comment).await;
    let commented = report(lead_id, CrmOperation::TimelineComment, commented);

    let moved = crm.move_to_stage(lead_id, &config.scheduled_stage).await;
    let moved = report(lead_id, CrmOperation::MoveStage, moved);

    vec![updated, commented, moved]
}

fn report(lead_id: i64, operation: CrmOperation, result: anyhow::Result<()>) -> CrmStepReport {
    match result {
        Ok(()) => {
            tracing::info!(lead_id, operation = %operation, "CRM step completed");
            CrmStepReport {
                operation,
                status: StepStatus::Ok,
                error: None,
            }
        }
        Err(e) => {
            let err = CrmUpdateError {
                operation,
                detail: format!("{e:#}"),
            };
            tracing::error!(lead_id, error = %err, "CRM step failed");
            CrmStepReport {
                operation,
                status: StepStatus::Failed,
                error: Some(err.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn request() -> SchedulingRequest {
        SchedulingRequest {
            lead_id: 123456,
            customer_name: Some("Maria".to_string()),
            customer_phone: None,
            customer_code: None,
            date: NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(),
            time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            establishment_code: Some(1),
            establishment_name: Some("CLINICA CREPALDI DERMATO".to_string()),
            professional_code: Some(42),
            professional_name: None,
            appointment_type: "Consulta".to_string(),
            services: "Botox, Peeling".to_string(),
            duration_minutes: 15,
            equipment_code: None,
            equipment_name: None,
            new_card: false,
            note: String::new(),
        }
    }

    #[test]
    fn test_lead_fields_use_fixed_ids() {
        let fields = lead_fields(&CrmFieldMap::default(), &request(), "A-77");
        assert_eq!(fields.len(), 7);
        assert_eq!(fields["UF_CRM_1725475287"], "20/01/2026 14:00:00");
        assert_eq!(fields["UF_CRM_1725475314"], "A-77");
        assert_eq!(fields["UF_CRM_1725475343"], "42");
        assert_eq!(fields["UF_CRM_1725475371"], "CLINICA CREPALDI DERMATO");
        assert_eq!(fields["UF_CRM_1725475399"], "Botox, Peeling");
        assert_eq!(fields["UF_CRM_1732829755"], "Consulta");
        assert_eq!(fields["UF_CRM_1732829791"], "");
    }

    #[test]
    fn test_comment_without_warning() {
        let comment = timeline_comment(&request(), "A-77", None);
        assert!(comment.starts_with("Agendamento Criado com Sucesso"));
        assert!(comment.contains("Codigo do Agendamento: A-77"));
        assert!(!comment.contains("AVISO"));
        assert!(!comment.contains("Equipamento"));
    }

    #[test]
    fn test_comment_includes_warning_and_equipment() {
        let mut req = request();
        req.equipment_name = Some("Laser CO2".to_string());
        let comment = timeline_comment(&req, "A-77", Some("Estabelecimento 9 pode estar incorreto!"));
        assert!(comment.contains("Equipamento: Laser CO2"));
        assert!(comment.contains("AVISO: Estabelecimento 9 pode estar incorreto!"));
    }
}
