use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CrmOperation {
    UpdateFields,
    TimelineComment,
    MoveStage,
}

impl CrmOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrmOperation::UpdateFields => "update_fields",
            CrmOperation::TimelineComment => "timeline_comment",
            CrmOperation::MoveStage => "move_stage",
        }
    }
}

impl std::fmt::Display for CrmOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Ok,
    Failed,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CrmStepReport {
    pub operation: CrmOperation,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body returned to the workflow once the appointment exists.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleOutcome {
    pub success: bool,
    pub message: String,
    pub request_id: String,
    pub lead_id: i64,
    pub codigo_agendamento: String,
    pub warning: Option<String>,
    pub crm: Vec<CrmStepReport>,
}

impl ScheduleOutcome {
    pub fn failed_operations(&self) -> Vec<CrmOperation> {
        self.crm
            .iter()
            .filter(|step| step.status == StepStatus::Failed)
            .map(|step| step.operation)
            .collect()
    }
}
