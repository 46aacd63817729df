//! service-activator library
//!
//! Brings an idle ECS service back to life: on each invocation it reads
//! the service's desired task count and, if it is zero, sets it to one
//! with a fixed task definition and awsvpc placement (one subnet, a set
//! of security groups, public IP enabled).
//!
//! ## Architecture
//!
//! ```text
//! Lambda event ──► handler::function_handler
//!                     └── ServiceActivator (Config + Arc<dyn Orchestrator>)
//!                           ├── EcsOrchestrator   (AWS SDK, production)
//!                           └── MockOrchestrator  (tests, dry runs)
//! ```
//!
//! ## Modules
//!
//! - `config`: Environment configuration, security group parsing
//! - `activator`: The zero-to-one decision
//! - `orchestrator`: Control plane interface and in-memory mock
//! - `ecs`: ECS implementation of the control plane interface
//! - `handler`: Lambda entry point and response body

pub mod activator;
pub mod config;
pub mod ecs;
pub mod error;
pub mod handler;
pub mod orchestrator;

// Re-export commonly used types
pub use activator::{Activation, ServiceActivator};
pub use config::{Config, NetworkPlacement, ServiceDescriptor};
pub use ecs::EcsOrchestrator;
pub use error::{ActivatorError, ConfigError};
pub use orchestrator::{DescribeOutcome, MockOrchestrator, Orchestrator, UpdateRequest};
