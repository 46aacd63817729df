//! ECS implementation of the orchestrator interface.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::operation::describe_services::DescribeServicesOutput;
use aws_sdk_ecs::types::{AssignPublicIp, AwsVpcConfiguration, NetworkConfiguration};
use aws_sdk_ecs::Client;
use tracing::debug;

use crate::config::NetworkPlacement;
use crate::orchestrator::{DescribeOutcome, Orchestrator, UpdateRequest};

/// Orchestrator backed by the AWS ECS API.
#[derive(Clone)]
pub struct EcsOrchestrator {
    client: Client,
}

impl EcsOrchestrator {
    /// Build a client for `region` using the default credential chain.
    pub async fn connect(region: &str) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        Self::from_client(Client::new(&sdk_config))
    }

    /// Wrap an existing ECS client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Orchestrator for EcsOrchestrator {
    async fn describe_desired_count(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<DescribeOutcome> {
        debug!(cluster, service, "Describing ECS service");

        let output = self
            .client
            .describe_services()
            .cluster(cluster)
            .services(service)
            .send()
            .await
            .map_err(|e| anyhow!("DescribeServices failed: {}", DisplayErrorContext(&e)))?;

        outcome_from(&output)
    }

    async fn update_service(&self, request: &UpdateRequest) -> Result<()> {
        let awsvpc = awsvpc_configuration(&request.placement)?;

        let desired_count = i32::try_from(request.desired_count)
            .context("desired count out of range")?;

        debug!(
            cluster = %request.cluster,
            service = %request.service,
            desired_count,
            "Updating ECS service"
        );

        self.client
            .update_service()
            .cluster(&request.cluster)
            .service(&request.service)
            .desired_count(desired_count)
            .task_definition(&request.task_definition)
            .network_configuration(
                NetworkConfiguration::builder()
                    .awsvpc_configuration(awsvpc)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| anyhow!("UpdateService failed: {}", DisplayErrorContext(&e)))?;

        Ok(())
    }
}

/// Map a DescribeServices response for a single service.
///
/// Unknown services come back under `failures`, not as an error.
fn outcome_from(output: &DescribeServicesOutput) -> Result<DescribeOutcome> {
    let Some(found) = output.services().first() else {
        let reason = output
            .failures()
            .first()
            .and_then(|f| f.reason())
            .unwrap_or("no service returned")
            .to_string();
        return Ok(DescribeOutcome::Missing { reason });
    };

    let desired_count = u32::try_from(found.desired_count())
        .with_context(|| format!("negative desired count {}", found.desired_count()))?;

    Ok(DescribeOutcome::Found { desired_count })
}

/// Build the awsvpc block for a placement.
fn awsvpc_configuration(placement: &NetworkPlacement) -> Result<AwsVpcConfiguration> {
    let assign_public_ip = if placement.assign_public_ip {
        AssignPublicIp::Enabled
    } else {
        AssignPublicIp::Disabled
    };

    AwsVpcConfiguration::builder()
        .subnets(&placement.subnet)
        .set_security_groups(Some(placement.security_groups.clone()))
        .assign_public_ip(assign_public_ip)
        .build()
        .context("invalid awsvpc configuration")
}
