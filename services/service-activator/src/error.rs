//! Error types for the service activator.

use thiserror::Error;

/// Configuration errors. Raised before any orchestrator client exists.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable is not set.
    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    /// Required environment variable is set but blank.
    #[error("configuration value is empty: {0}")]
    Empty(&'static str),

    /// SECURITY_GROUPS yielded no ids after splitting.
    #[error("SECURITY_GROUPS must contain at least one security group id")]
    NoSecurityGroups,

    /// SUBNET names more than one subnet.
    #[error("SUBNET must be a single subnet id, got {0:?}")]
    InvalidSubnet(String),
}

/// Errors surfaced by a single activation.
#[derive(Debug, Error)]
pub enum ActivatorError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The describe call failed (network, permission, throttling).
    #[error("failed to describe service {service} in cluster {cluster}: {source}")]
    RemoteQuery {
        cluster: String,
        service: String,
        #[source]
        source: anyhow::Error,
    },

    /// The describe call succeeded but returned no matching service.
    #[error("service {service} not found in cluster {cluster}: {reason}")]
    ServiceNotFound {
        cluster: String,
        service: String,
        reason: String,
    },

    /// The update call was rejected.
    #[error("failed to update service {service} in cluster {cluster}: {source}")]
    RemoteUpdate {
        cluster: String,
        service: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ActivatorError {
    /// Get the stable reason code for this error.
    pub fn reason_code(&self) -> &'static str {
        match self {
            ActivatorError::Config(_) => "config_invalid",
            ActivatorError::RemoteQuery { .. } => "remote_query_failed",
            ActivatorError::ServiceNotFound { .. } => "service_not_found",
            ActivatorError::RemoteUpdate { .. } => "remote_update_failed",
        }
    }
}

pub type ActivatorResult<T> = Result<T, ActivatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        let err = ActivatorError::from(ConfigError::NoSecurityGroups);
        assert_eq!(err.reason_code(), "config_invalid");

        let err = ActivatorError::RemoteQuery {
            cluster: "c".to_string(),
            service: "s".to_string(),
            source: anyhow::anyhow!("AccessDenied"),
        };
        assert_eq!(err.reason_code(), "remote_query_failed");
        assert!(err.to_string().contains("AccessDenied"));

        let err = ActivatorError::ServiceNotFound {
            cluster: "c".to_string(),
            service: "s".to_string(),
            reason: "MISSING".to_string(),
        };
        assert_eq!(err.reason_code(), "service_not_found");
        assert_eq!(err.to_string(), "service s not found in cluster c: MISSING");
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::Missing("CLUSTER").to_string(),
            "missing required configuration: CLUSTER"
        );
        assert_eq!(
            ConfigError::InvalidSubnet("a,b".to_string()).to_string(),
            "SUBNET must be a single subnet id, got \"a,b\""
        );
    }
}
