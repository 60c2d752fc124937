use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::CrmProvider;

/// Bitrix24 REST client driven by an inbound webhook URL
/// (`https://<portal>/rest/<user>/<token>`).
pub struct BitrixClient {
    webhook_url: String,
    client: reqwest::Client,
}

impl BitrixClient {
    pub fn new(webhook_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build Bitrix HTTP client")?;
        Ok(Self {
            webhook_url: webhook_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn call(&self, method: &str, params: Value) -> anyhow::Result<Value> {
        let url = format!("{}/{}", self.webhook_url, method);

        let resp = self
            .client
            .post(&url)
            .json(&params)
            .send()
            .await
            .with_context(|| format!("failed to call Bitrix {method}"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .with_context(|| format!("failed to read Bitrix {method} response"))?;

        if !status.is_success() {
            anyhow::bail!("Bitrix {method} error ({status}): {text}");
        }

        let data: Value = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse Bitrix {method} response: {text}"))?;

        if data.get("error").is_some() {
            anyhow::bail!("Bitrix {method} error: {data}");
        }
        if !is_truthy(data.get("result")) {
            anyhow::bail!("Bitrix {method} returned no result: {data}");
        }

        Ok(data)
    }
}

fn is_truthy(result: Option<&Value>) -> bool {
    match result {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

#[async_trait]
impl CrmProvider for BitrixClient {
    async fn update_lead(&self, lead_id: i64, fields: &Map<String, Value>) -> anyhow::Result<()> {
        self.call("crm.lead.update", json!({ "id": lead_id, "fields": fields }))
            .await?;
        Ok(())
    }

    async fn add_timeline_comment(&self, lead_id: i64, comment: &str) -> anyhow::Result<()> {
        self.call(
            "crm.timeline.comment.add",
            json!({
                "fields": {
                    "ENTITY_ID": lead_id,
                    "ENTITY_TYPE": "lead",
                    "COMMENT": comment,
                }
            }),
        )
        .await?;
        Ok(())
    }

    async fn move_to_stage(&self, lead_id: i64, stage_id: &str) -> anyhow::Result<()> {
        // Moving a lead to CONVERTED makes Bitrix convert it and open a deal.
        self.call(
            "crm.lead.update",
            json!({ "id": lead_id, "fields": { "STATUS_ID": stage_id } }),
        )
        .await?;
        Ok(())
    }
}
