//! Orchestrator interface and mock implementation.
//!
//! The orchestrator interface abstracts the two control plane calls the
//! activator makes:
//! - Reading a service's desired task count
//! - Updating a service's desired count, task definition and placement
//!
//! A mock implementation is provided for testing and dry runs.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::config::NetworkPlacement;

/// A scale update for one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    pub cluster: String,
    pub service: String,
    pub desired_count: u32,
    pub task_definition: String,
    pub placement: NetworkPlacement,
}

/// Container orchestration control plane.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Return the current desired task count of a service.
    ///
    /// A service the control plane does not know is reported as
    /// `DescribeOutcome::Missing`, not as an error.
    async fn describe_desired_count(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<DescribeOutcome>;

    /// Apply a scale update.
    async fn update_service(&self, request: &UpdateRequest) -> Result<()>;
}

/// Result of a successful describe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescribeOutcome {
    /// The service exists with this desired count.
    Found { desired_count: u32 },

    /// The control plane did not return the service.
    Missing { reason: String },
}

/// In-memory orchestrator for tests and dry runs.
///
/// Holds a single service's desired count. Updates overwrite it, so a
/// second activation observes the first one's write.
pub struct MockOrchestrator {
    desired_count: AtomicU32,
    describe_calls: AtomicUsize,
    updates: Mutex<Vec<UpdateRequest>>,
    fail_describe: bool,
    fail_update: bool,
    missing: bool,
}

impl MockOrchestrator {
    /// Create a mock whose service reports the given desired count.
    pub fn new(desired_count: u32) -> Self {
        Self {
            desired_count: AtomicU32::new(desired_count),
            describe_calls: AtomicUsize::new(0),
            updates: Mutex::new(Vec::new()),
            fail_describe: false,
            fail_update: false,
            missing: false,
        }
    }

    /// Create a mock whose describe call always errors.
    pub fn failing_describe() -> Self {
        Self {
            fail_describe: true,
            ..Self::new(0)
        }
    }

    /// Create a mock that reports `desired_count` but rejects updates.
    pub fn failing_update(desired_count: u32) -> Self {
        Self {
            fail_update: true,
            ..Self::new(desired_count)
        }
    }

    /// Create a mock that does not know the service.
    pub fn missing_service() -> Self {
        Self {
            missing: true,
            ..Self::new(0)
        }
    }

    /// Current desired count held by the mock.
    pub fn desired_count(&self) -> u32 {
        self.desired_count.load(Ordering::SeqCst)
    }

    /// Number of describe calls received.
    pub fn describe_calls(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }

    /// Every update request received, in order.
    pub fn updates(&self) -> Vec<UpdateRequest> {
        self.updates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Orchestrator for MockOrchestrator {
    async fn describe_desired_count(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<DescribeOutcome> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_describe {
            anyhow::bail!("Mock orchestrator configured to fail describe");
        }
        if self.missing {
            return Ok(DescribeOutcome::Missing {
                reason: "MISSING".to_string(),
            });
        }

        let desired_count = self.desired_count();
        info!(cluster, service, desired_count, "[MOCK] Described service");
        Ok(DescribeOutcome::Found { desired_count })
    }

    async fn update_service(&self, request: &UpdateRequest) -> Result<()> {
        self.updates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());

        if self.fail_update {
            anyhow::bail!("Mock orchestrator configured to fail update");
        }

        info!(
            cluster = %request.cluster,
            service = %request.service,
            desired_count = request.desired_count,
            task_definition = %request.task_definition,
            subnet = %request.placement.subnet,
            security_groups = ?request.placement.security_groups,
            "[MOCK] Updated service"
        );
        self.desired_count.store(request.desired_count, Ordering::SeqCst);
        Ok(())
    }
}
