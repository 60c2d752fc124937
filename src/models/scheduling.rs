use chrono::{NaiveDate, NaiveTime};

/// A booking request from the CRM workflow after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingRequest {
    pub lead_id: i64,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_code: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Provider-side code, already translated from the CRM list element id.
    pub establishment_code: Option<i64>,
    pub establishment_name: Option<String>,
    pub professional_code: Option<i64>,
    pub professional_name: Option<String>,
    pub appointment_type: String,
    pub services: String,
    pub duration_minutes: u32,
    pub equipment_code: Option<i64>,
    pub equipment_name: Option<String>,
    pub new_card: bool,
    pub note: String,
}

impl SchedulingRequest {
    pub fn date_str(&self) -> String {
        self.date.format("%d/%m/%Y").to_string()
    }

    pub fn time_str(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    /// Services as a list; the workflow sends them comma separated.
    pub fn service_list(&self) -> Vec<String> {
        self.services
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn professional_label(&self) -> String {
        label(self.professional_name.as_deref(), self.professional_code)
    }

    pub fn establishment_label(&self) -> String {
        label(self.establishment_name.as_deref(), self.establishment_code)
    }

    pub fn equipment_label(&self) -> Option<String> {
        match (self.equipment_name.as_deref(), self.equipment_code) {
            (None, None) => None,
            (name, code) => Some(label(name, code)),
        }
    }
}

fn label(name: Option<&str>, code: Option<i64>) -> String {
    match (name, code) {
        (Some(name), _) => name.to_string(),
        (None, Some(code)) => code.to_string(),
        (None, None) => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub request: SchedulingRequest,
    /// Set when the establishment did not match the known table.
    pub warning: Option<String>,
}
