use chrono::{NaiveDate, NaiveTime, Timelike};
use serde_json::{Map, Value};

use crate::models::{SchedulingRequest, ValidatedRequest};
use crate::services::establishments;

const DEFAULT_APPOINTMENT_TYPE: &str = "Consulta";
const DEFAULT_DURATION_MINUTES: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub missing_fields: Vec<String>,
    pub invalid_fields: Vec<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if !self.missing_fields.is_empty() {
            parts.push(format!(
                "missing required fields: {}",
                self.missing_fields.join(", ")
            ));
        }
        if !self.invalid_fields.is_empty() {
            parts.push(format!("invalid fields: {}", self.invalid_fields.join("; ")));
        }
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Checks a raw workflow payload and builds the request sent to the provider.
///
/// Only `lead_id`, `data_agendamento` and `horario` are required. Every problem
/// found is reported, not just the first. An unknown establishment is not an
/// error; it comes back as [`ValidatedRequest::warning`].
pub fn validate_payload(raw: &Value) -> Result<ValidatedRequest, ValidationError> {
    let Some(obj) = raw.as_object() else {
        return Err(ValidationError {
            missing_fields: Vec::new(),
            invalid_fields: vec!["body: expected a JSON object".to_string()],
        });
    };

    let mut missing = Vec::new();
    let mut invalid = Vec::new();

    let lead_id = match integer(obj, "lead_id") {
        Ok(Some(id)) if id > 0 => Some(id),
        Ok(Some(id)) => {
            invalid.push(format!("lead_id: expected a positive integer, got {id}"));
            None
        }
        Ok(None) => {
            missing.push("lead_id".to_string());
            None
        }
        Err(raw) => {
            invalid.push(format!("lead_id: expected a positive integer, got '{raw}'"));
            None
        }
    };

    let date = match text(obj, "data_agendamento") {
        Some(raw) => match NaiveDate::parse_from_str(&raw, "%d/%m/%Y") {
            Ok(date) => Some(date),
            Err(_) => {
                invalid.push(format!("data_agendamento: expected dd/mm/yyyy, got '{raw}'"));
                None
            }
        },
        None => {
            missing.push("data_agendamento".to_string());
            None
        }
    };

    let time = match text(obj, "horario") {
        Some(raw) => match parse_time(&raw) {
            Some(time) => Some(time),
            None => {
                invalid.push(format!("horario: expected HH:MM, got '{raw}'"));
                None
            }
        },
        None => {
            missing.push("horario".to_string());
            None
        }
    };

    let establishment_code = optional_integer(obj, "estabelecimento_codigo", &mut invalid);
    let professional_code = optional_integer(obj, "profissional_codigo", &mut invalid);
    let equipment_code = optional_integer(obj, "equipamento_codigo", &mut invalid);

    let duration_minutes = match optional_integer(obj, "tempo", &mut invalid) {
        None => DEFAULT_DURATION_MINUTES,
        Some(minutes) => match u32::try_from(minutes) {
            Ok(minutes) if minutes > 0 => minutes,
            _ => {
                invalid.push(format!("tempo: expected a positive number of minutes, got {minutes}"));
                DEFAULT_DURATION_MINUTES
            }
        },
    };

    let (Some(lead_id), Some(date), Some(time)) = (lead_id, date, time) else {
        return Err(ValidationError {
            missing_fields: missing,
            invalid_fields: invalid,
        });
    };
    if !invalid.is_empty() {
        return Err(ValidationError {
            missing_fields: missing,
            invalid_fields: invalid,
        });
    }

    let establishment_code = establishment_code.map(establishments::resolve_code);
    let establishment_name = text(obj, "estabelecimento_nome");
    let warning = establishments::check(establishment_code, establishment_name.as_deref());
    if let Some(warning) = &warning {
        tracing::warn!(lead_id, warning = %warning, "establishment check failed");
    }

    let request = SchedulingRequest {
        lead_id,
        customer_name: text(obj, "lead_nome"),
        customer_phone: text(obj, "lead_telefone"),
        customer_code: text(obj, "codigo_cliente_belle"),
        date,
        time,
        establishment_code,
        establishment_name,
        professional_code,
        professional_name: text(obj, "profissional_nome"),
        appointment_type: text(obj, "tipo_agendamento")
            .unwrap_or_else(|| DEFAULT_APPOINTMENT_TYPE.to_string()),
        services: text(obj, "servicos").unwrap_or_default(),
        duration_minutes,
        equipment_code,
        equipment_name: text(obj, "equipamento_nome"),
        new_card: flag(obj, "novo_card"),
        note: text(obj, "observacao").unwrap_or_default(),
    };

    Ok(ValidatedRequest { request, warning })
}

/// `HH:MM`, or `HH:MM:00`. Non-zero seconds would be silently dropped
/// downstream, so they are invalid.
fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
        .filter(|time| time.second() == 0)
}

/// Non-empty trimmed text. Numbers are accepted and rendered as text.
fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integers arrive as JSON numbers or numeric strings. `Err` carries the
/// offending raw value.
fn integer(obj: &Map<String, Value>, key: &str) -> Result<Option<i64>, String> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(whole_number))
            .map(Some)
            .ok_or_else(|| n.to_string()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(whole_number))
                .map(Some)
                .ok_or_else(|| s.clone())
        }
        Some(other) => Err(other.to_string()),
    }
}

/// Workflows sometimes send ids as floats (`123456.0`).
fn whole_number(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value <= i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}

fn optional_integer(obj: &Map<String, Value>, key: &str, invalid: &mut Vec<String>) -> Option<i64> {
    match integer(obj, key) {
        Ok(value) => value,
        Err(raw) => {
            invalid.push(format!("{key}: expected an integer, got '{raw}'"));
            None
        }
    }
}

fn flag(obj: &Map<String, Value>, key: &str) -> bool {
    match obj.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "1" | "y" | "s" | "sim"
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "lead_id": 123456,
            "lead_nome": "Maria Silva",
            "data_agendamento": "20/01/2026",
            "horario": "14:00",
            "estabelecimento_codigo": 1,
            "estabelecimento_nome": "CLINICA CREPALDI DERMATO",
            "profissional_codigo": 42,
            "tipo_agendamento": "Retorno",
            "servicos": "Botox, Peeling",
        })
    }

    #[test]
    fn test_valid_payload() {
        let validated = validate_payload(&payload()).unwrap();
        let req = validated.request;
        assert_eq!(req.lead_id, 123456);
        assert_eq!(req.date_str(), "20/01/2026");
        assert_eq!(req.time_str(), "14:00");
        assert_eq!(req.establishment_code, Some(1));
        assert_eq!(req.professional_code, Some(42));
        assert_eq!(req.appointment_type, "Retorno");
        assert_eq!(req.duration_minutes, 15);
        assert!(!req.new_card);
        assert_eq!(validated.warning, None);
    }

    #[test]
    fn test_missing_required_fields_are_all_reported() {
        let err = validate_payload(&json!({ "estabelecimento_codigo": 1 })).unwrap_err();
        assert_eq!(
            err.missing_fields,
            vec!["lead_id", "data_agendamento", "horario"]
        );
        assert!(err.to_string().contains("missing required fields"));
    }

    #[test]
    fn test_empty_strings_count_as_missing() {
        let mut body = payload();
        body["horario"] = json!("  ");
        let err = validate_payload(&body).unwrap_err();
        assert_eq!(err.missing_fields, vec!["horario"]);
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let mut body = payload();
        body["lead_id"] = json!("123456");
        body["estabelecimento_codigo"] = json!("238");
        body["tempo"] = json!("30");
        let req = validate_payload(&body).unwrap().request;
        assert_eq!(req.lead_id, 123456);
        assert_eq!(req.establishment_code, Some(1));
        assert_eq!(req.duration_minutes, 30);
    }

    #[test]
    fn test_bad_date_and_time_are_invalid() {
        let mut body = payload();
        body["data_agendamento"] = json!("2026-01-20");
        body["horario"] = json!("2pm");
        let err = validate_payload(&body).unwrap_err();
        assert!(err.missing_fields.is_empty());
        assert_eq!(err.invalid_fields.len(), 2);
    }

    #[test]
    fn test_non_numeric_optional_code_is_invalid() {
        let mut body = payload();
        body["profissional_codigo"] = json!("dr-ana");
        let err = validate_payload(&body).unwrap_err();
        assert!(err.invalid_fields[0].starts_with("profissional_codigo"));
    }

    #[test]
    fn test_unknown_establishment_warns_without_rejecting() {
        let mut body = payload();
        body["estabelecimento_nome"] = json!("CLINICA INEXISTENTE");
        let validated = validate_payload(&body).unwrap();
        assert!(validated.warning.unwrap().contains("pode estar incorreto"));
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        let err = validate_payload(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.invalid_fields, vec!["body: expected a JSON object"]);
    }

    #[test]
    fn test_time_with_nonzero_seconds_is_invalid() {
        let mut body = payload();
        body["horario"] = json!("14:00:45");
        let err = validate_payload(&body).unwrap_err();
        assert!(err.missing_fields.is_empty());
        assert_eq!(err.invalid_fields, vec!["horario: expected HH:MM, got '14:00:45'"]);
    }

    #[test]
    fn test_whole_floats_are_accepted_as_integers() {
        let mut body = payload();
        body["lead_id"] = json!(123456.0);
        body["profissional_codigo"] = json!("42.0");
        let req = validate_payload(&body).unwrap().request;
        assert_eq!(req.lead_id, 123456);
        assert_eq!(req.professional_code, Some(42));
    }

    #[test]
    fn test_fractional_lead_id_is_invalid() {
        let mut body = payload();
        body["lead_id"] = json!(123456.5);
        let err = validate_payload(&body).unwrap_err();
        assert!(err.invalid_fields[0].starts_with("lead_id"));
    }

    #[test]
    fn test_time_with_zero_seconds_is_accepted() {
        let mut body = payload();
        body["horario"] = json!("14:00:00");
        body["novo_card"] = json!("Y");
        let req = validate_payload(&body).unwrap().request;
        assert_eq!(req.time_str(), "14:00");
        assert!(req.new_card);
    }
}
