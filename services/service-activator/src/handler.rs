//! Lambda event handler.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::activator::{Activation, ServiceActivator};
use crate::error::ActivatorResult;

/// Response body returned to the Lambda runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationResponse {
    pub activated: bool,
    pub desired_count: u32,
    pub message: String,
}

impl From<Activation> for ActivationResponse {
    fn from(activation: Activation) -> Self {
        Self {
            activated: activation.is_activated(),
            desired_count: activation.desired_count(),
            message: activation.message().to_string(),
        }
    }
}

/// Handle one invocation. The event payload is not inspected.
pub async fn function_handler(
    activator: &ServiceActivator,
    payload: Value,
) -> ActivatorResult<ActivationResponse> {
    debug!(event_kind = event_kind(&payload), "Received invocation");
    let activation = activator.activate().await?;
    Ok(activation.into())
}

fn event_kind(payload: &Value) -> &'static str {
    match payload {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
