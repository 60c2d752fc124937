use std::env;

/// Bitrix custom field ids written after a successful booking.
#[derive(Clone, Debug, PartialEq)]
pub struct CrmFieldMap {
    pub appointment_date: String,
    pub appointment_code: String,
    pub professional: String,
    pub establishment: String,
    pub procedure: String,
    pub appointment_type: String,
    pub equipment: String,
}

impl Default for CrmFieldMap {
    fn default() -> Self {
        Self {
            appointment_date: "UF_CRM_1725475287".to_string(),
            appointment_code: "UF_CRM_1725475314".to_string(),
            professional: "UF_CRM_1725475343".to_string(),
            establishment: "UF_CRM_1725475371".to_string(),
            procedure: "UF_CRM_1725475399".to_string(),
            appointment_type: "UF_CRM_1732829755".to_string(),
            equipment: "UF_CRM_1732829791".to_string(),
        }
    }
}

impl CrmFieldMap {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            appointment_date: env_or("BITRIX_FIELD_DATA_AGENDAMENTO", defaults.appointment_date),
            appointment_code: env_or("BITRIX_FIELD_CODIGO_AGENDAMENTO", defaults.appointment_code),
            professional: env_or("BITRIX_FIELD_PROFISSIONAL", defaults.professional),
            establishment: env_or("BITRIX_FIELD_ESTABELECIMENTO", defaults.establishment),
            procedure: env_or("BITRIX_FIELD_PROCEDIMENTO", defaults.procedure),
            appointment_type: env_or("BITRIX_FIELD_TIPO_CONSULTA", defaults.appointment_type),
            equipment: env_or("BITRIX_FIELD_EQUIPAMENTO", defaults.equipment),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub belle_url: String,
    pub bitrix_webhook_url: String,
    pub scheduled_stage: String,
    pub http_timeout_secs: u64,
    pub crm_fields: CrmFieldMap,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            belle_url: env::var("BELLE_URL")
                .unwrap_or_else(|_| "http://localhost:25256".to_string()),
            bitrix_webhook_url: env::var("BITRIX_WEBHOOK_URL").unwrap_or_default(),
            scheduled_stage: env_or("BITRIX_SCHEDULED_STAGE", "CONVERTED".to_string()),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            crm_fields: CrmFieldMap::from_env(),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}
