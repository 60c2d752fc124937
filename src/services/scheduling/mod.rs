pub mod belle;

use async_trait::async_trait;

use crate::models::SchedulingRequest;

#[derive(Debug, thiserror::Error)]
pub enum SchedulingProviderError {
    #[error("request to scheduling provider failed: {0}")]
    Network(String),

    #[error("scheduling provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed scheduling provider response: {0}")]
    MalformedResponse(String),
}

/// Creates appointments with the external scheduling provider. One attempt per
/// call; callers decide what a failure means.
#[async_trait]
pub trait SchedulingProvider: Send + Sync {
    /// Returns the provider-assigned appointment code.
    async fn create_appointment(
        &self,
        request: &SchedulingRequest,
    ) -> Result<String, SchedulingProviderError>;
}
