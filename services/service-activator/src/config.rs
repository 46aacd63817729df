//! Configuration for the service activator.
//!
//! All values come from environment variables and are read once at
//! process start. There are no defaults: every variable must be present
//! and non-blank, otherwise loading fails before any AWS client is built.

use tracing::error;

use crate::error::{ActivatorError, ConfigError};

pub const REGION_VAR: &str = "REGION";
pub const CLUSTER_VAR: &str = "CLUSTER";
pub const SERVICE_VAR: &str = "SERVICE";
pub const TASK_DEFINITION_VAR: &str = "TASK_DEFINITION";
pub const SUBNET_VAR: &str = "SUBNET";
pub const SECURITY_GROUPS_VAR: &str = "SECURITY_GROUPS";

/// Identifies the remote ECS service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Cluster name or ARN.
    pub cluster: String,

    /// Service name or ARN.
    pub service: String,

    /// Task definition (family, family:revision or ARN) bound on activation.
    pub task_definition: String,
}

/// Network placement attached to tasks launched on activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkPlacement {
    /// The single subnet tasks are launched into.
    pub subnet: String,

    /// Security group ids, deduplicated, in configuration order. Never empty.
    pub security_groups: Vec<String>,

    /// Whether tasks get a public IP.
    pub assign_public_ip: bool,
}

/// Service activator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// AWS region of the cluster.
    pub region: String,

    pub service: ServiceDescriptor,

    pub placement: NetworkPlacement,
}

impl Config {
    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            let value = lookup(key).ok_or(ConfigError::Missing(key))?;
            let value = value.trim();
            if value.is_empty() {
                return Err(ConfigError::Empty(key));
            }
            Ok(value.to_string())
        };

        let region = required(REGION_VAR)?;
        let cluster = required(CLUSTER_VAR)?;
        let service = required(SERVICE_VAR)?;
        let task_definition = required(TASK_DEFINITION_VAR)?;

        let subnet = required(SUBNET_VAR)?;
        if subnet.contains(',') {
            return Err(ConfigError::InvalidSubnet(subnet));
        }

        let security_groups = parse_security_groups(&required(SECURITY_GROUPS_VAR)?)?;

        Ok(Self {
            region,
            service: ServiceDescriptor {
                cluster,
                service,
                task_definition,
            },
            placement: NetworkPlacement {
                subnet,
                security_groups,
                assign_public_ip: true,
            },
        })
    }
}

/// Load configuration from the environment at process start.
///
/// Failures are logged with their reason code before being returned.
pub fn load() -> Result<Config, ActivatorError> {
    load_from(|key| std::env::var(key).ok())
}

/// Like [`load`], reading values from an arbitrary key lookup.
pub fn load_from<F>(lookup: F) -> Result<Config, ActivatorError>
where
    F: Fn(&str) -> Option<String>,
{
    Config::from_lookup(lookup).map_err(|e| {
        let err = ActivatorError::from(e);
        error!(
            reason_code = err.reason_code(),
            error = %err,
            "Configuration invalid"
        );
        err
    })
}

/// Split a comma-separated security group list.
///
/// Whitespace around ids is stripped, blank entries are dropped and
/// repeated ids keep their first position.
pub fn parse_security_groups(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut groups: Vec<String> = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        if !groups.iter().any(|g| g == id) {
            groups.push(id.to_string());
        }
    }

    if groups.is_empty() {
        return Err(ConfigError::NoSecurityGroups);
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io;
    use std::sync::{Arc, Mutex};

    use rstest::rstest;

    use super::*;

    fn full_env() -> HashMap<&'static str, String> {
        HashMap::from([
            (REGION_VAR, "eu-west-1".to_string()),
            (CLUSTER_VAR, "games".to_string()),
            (SERVICE_VAR, "minecraft".to_string()),
            (TASK_DEFINITION_VAR, "minecraft-server:7".to_string()),
            (SUBNET_VAR, "subnet-0abc".to_string()),
            (SECURITY_GROUPS_VAR, "sg-1, sg-2".to_string()),
        ])
    }

    fn load(env: &HashMap<&'static str, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_load_full_config() {
        let config = load(&full_env()).unwrap();

        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.service.cluster, "games");
        assert_eq!(config.service.service, "minecraft");
        assert_eq!(config.service.task_definition, "minecraft-server:7");
        assert_eq!(config.placement.subnet, "subnet-0abc");
        assert_eq!(config.placement.security_groups, vec!["sg-1", "sg-2"]);
        assert!(config.placement.assign_public_ip);
    }

    #[rstest]
    #[case(REGION_VAR)]
    #[case(CLUSTER_VAR)]
    #[case(SERVICE_VAR)]
    #[case(TASK_DEFINITION_VAR)]
    #[case(SUBNET_VAR)]
    #[case(SECURITY_GROUPS_VAR)]
    fn test_missing_var_is_rejected(#[case] var: &'static str) {
        let mut env = full_env();
        env.remove(var);
        assert_eq!(load(&env), Err(ConfigError::Missing(var)));
    }

    #[rstest]
    #[case(CLUSTER_VAR)]
    #[case(SUBNET_VAR)]
    fn test_blank_var_is_rejected(#[case] var: &'static str) {
        let mut env = full_env();
        env.insert(var, "   ".to_string());
        assert_eq!(load(&env), Err(ConfigError::Empty(var)));
    }

    #[test]
    fn test_values_are_trimmed() {
        let mut env = full_env();
        env.insert(CLUSTER_VAR, " games\n".to_string());
        assert_eq!(load(&env).unwrap().service.cluster, "games");
    }

    #[test]
    fn test_multiple_subnets_rejected() {
        let mut env = full_env();
        env.insert(SUBNET_VAR, "subnet-a,subnet-b".to_string());
        assert_eq!(
            load(&env),
            Err(ConfigError::InvalidSubnet("subnet-a,subnet-b".to_string()))
        );
    }

    #[rstest]
    #[case("sg-1, sg-2,sg-3", &["sg-1", "sg-2", "sg-3"])]
    #[case("sg-a", &["sg-a"])]
    #[case(" sg-a ,, sg-b ,", &["sg-a", "sg-b"])]
    #[case("sg-b,sg-a,sg-b", &["sg-b", "sg-a"])]
    fn test_parse_security_groups(#[case] raw: &str, #[case] expected: &[&str]) {
        assert_eq!(parse_security_groups(raw).unwrap(), expected);
    }

    #[test]
    fn test_blank_security_group_list_rejected() {
        assert_eq!(
            parse_security_groups(" , ,"),
            Err(ConfigError::NoSecurityGroups)
        );

        let mut env = full_env();
        env.insert(SECURITY_GROUPS_VAR, ",".to_string());
        assert_eq!(load(&env), Err(ConfigError::NoSecurityGroups));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_load_logs_reason_code_on_failure() {
        let mut env = full_env();
        env.insert(SECURITY_GROUPS_VAR, ",".to_string());

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(move || writer.clone())
            .finish();

        let result = tracing::subscriber::with_default(subscriber, || {
            load_from(|key| env.get(key).cloned())
        });

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            ActivatorError::Config(ConfigError::NoSecurityGroups)
        ));
        assert_eq!(err.reason_code(), "config_invalid");

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Configuration invalid"));
        assert!(output.contains("\"reason_code\":\"config_invalid\""));
        assert!(output.contains("\"level\":\"ERROR\""));
    }

    #[test]
    fn test_load_from_success() {
        let env = full_env();
        let config = load_from(|key| env.get(key).cloned()).unwrap();
        assert_eq!(config.service.service, "minecraft");
    }
}
