//! Service activator.
//!
//! Reads the configured service's desired count and, when it is zero,
//! scales it to one with the configured task definition and placement.
//!
//! The read and the write are two separate calls, so concurrent
//! invocations can both observe zero and both issue the update. Setting
//! the desired count to one twice leaves the service in the same state,
//! so no locking is done here.

use std::sync::Arc;

use tracing::{error, info};

use crate::config::Config;
use crate::error::{ActivatorError, ActivatorResult};
use crate::orchestrator::{DescribeOutcome, Orchestrator, UpdateRequest};

/// Desired count requested when activating an idle service.
pub const ACTIVE_DESIRED_COUNT: u32 = 1;

pub const ACTIVATED_MESSAGE: &str = "Set desired task count to 1";
pub const ALREADY_ACTIVE_MESSAGE: &str = "Desired task count was already at 1";

/// Outcome of one activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Desired count was non-zero; nothing was changed.
    AlreadyActive { desired_count: u32 },

    /// Desired count was zero and an update to one was accepted.
    Activated,
}

impl Activation {
    /// Returns true if an update was issued.
    pub fn is_activated(&self) -> bool {
        matches!(self, Self::Activated)
    }

    /// Desired count after this activation.
    pub fn desired_count(&self) -> u32 {
        match self {
            Self::AlreadyActive { desired_count } => *desired_count,
            Self::Activated => ACTIVE_DESIRED_COUNT,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::AlreadyActive { .. } => ALREADY_ACTIVE_MESSAGE,
            Self::Activated => ACTIVATED_MESSAGE,
        }
    }
}

/// Scales an idle service to one task.
pub struct ServiceActivator {
    config: Config,
    orchestrator: Arc<dyn Orchestrator>,
}

impl ServiceActivator {
    pub fn new(config: Config, orchestrator: Arc<dyn Orchestrator>) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    /// Run one activation.
    pub async fn activate(&self) -> ActivatorResult<Activation> {
        let result = self.try_activate().await;
        if let Err(e) = &result {
            error!(
                cluster = %self.config.service.cluster,
                service = %self.config.service.service,
                reason_code = e.reason_code(),
                error = %e,
                "Activation failed"
            );
        }
        result
    }

    async fn try_activate(&self) -> ActivatorResult<Activation> {
        let cluster = &self.config.service.cluster;
        let service = &self.config.service.service;

        let outcome = self
            .orchestrator
            .describe_desired_count(cluster, service)
            .await
            .map_err(|source| ActivatorError::RemoteQuery {
                cluster: cluster.clone(),
                service: service.clone(),
                source,
            })?;

        let desired_count = match outcome {
            DescribeOutcome::Found { desired_count } => desired_count,
            DescribeOutcome::Missing { reason } => {
                return Err(ActivatorError::ServiceNotFound {
                    cluster: cluster.clone(),
                    service: service.clone(),
                    reason,
                });
            }
        };

        if desired_count != 0 {
            let activation = Activation::AlreadyActive { desired_count };
            info!(%cluster, %service, desired_count, "{}", activation.message());
            return Ok(activation);
        }

        let request = UpdateRequest {
            cluster: cluster.clone(),
            service: service.clone(),
            desired_count: ACTIVE_DESIRED_COUNT,
            task_definition: self.config.service.task_definition.clone(),
            placement: self.config.placement.clone(),
        };

        self.orchestrator
            .update_service(&request)
            .await
            .map_err(|source| ActivatorError::RemoteUpdate {
                cluster: cluster.clone(),
                service: service.clone(),
                source,
            })?;

        let activation = Activation::Activated;
        info!(
            %cluster,
            %service,
            task_definition = %request.task_definition,
            "{}",
            activation.message()
        );
        Ok(activation)
    }
}
