use sealedvote::{StaticIdentity, TallyPolicy};
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_LEDGER_PATH: &str = "SEALEDVOTE_LEDGER_PATH";
pub const ENV_IDENTITY: &str = "SEALEDVOTE_IDENTITY";
pub const ENV_ORG: &str = "SEALEDVOTE_ORG";
pub const ENV_PEER_ORG: &str = "SEALEDVOTE_PEER_ORG";
pub const ENV_TALLY_POLICY: &str = "SEALEDVOTE_TALLY_POLICY";

const DEFAULT_LEDGER_PATH: &str = "./sealedvote.ledger.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {0}: {1}")]
    Invalid(&'static str, String),
}

pub struct Config {
    pub ledger_path: PathBuf,

    /// Client identity submitting transactions
    pub identity: String,

    /// Client organization
    pub org: String,

    /// Organization of the peer the client talks to
    pub peer_org: String,

    pub tally_policy: TallyPolicy,
}

impl Config {
    /// Read the environment, letting `overrides` win for any key it answers
    pub fn from_env<F>(overrides: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        Self::from_lookup(|key| overrides(key).or_else(|| std::env::var(key).ok()))
    }

    /// Build the config from any key -> value source, keyed by the
    /// environment variable names
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let required = |key: &'static str| match lookup(key) {
            Some(val) if !val.is_empty() => Ok(val),
            _ => Err(ConfigError::Missing(key)),
        };

        let identity = required(ENV_IDENTITY)?;
        let org = required(ENV_ORG)?;

        // Assume the client talks to a peer of its own org
        let peer_org = lookup(ENV_PEER_ORG)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| org.clone());

        let ledger_path = match lookup(ENV_LEDGER_PATH) {
            Some(val) if !val.is_empty() => val,
            _ => DEFAULT_LEDGER_PATH.to_owned(),
        };
        let ledger_path = PathBuf::from(shellexpand::tilde(&ledger_path).into_owned());

        let tally_policy = match lookup(ENV_TALLY_POLICY) {
            Some(val) => val
                .parse()
                .map_err(|_| ConfigError::Invalid(ENV_TALLY_POLICY, val))?,
            None => TallyPolicy::default(),
        };

        Ok(Config {
            ledger_path,
            identity,
            org,
            peer_org,
            tally_policy,
        })
    }

    pub fn identity(&self) -> StaticIdentity {
        StaticIdentity::new(&self.identity, &self.org).via_node(&self.peer_org)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealedvote::IdentityProvider;
    use std::collections::HashMap;

    fn config(vars: &[(&'static str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<&'static str, String> =
            vars.iter().map(|(k, v)| (*k, (*v).to_owned())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[(ENV_IDENTITY, "voter1"), (ENV_ORG, "Org1MSP")]).unwrap();
        assert_eq!(config.peer_org, "Org1MSP");
        assert_eq!(config.ledger_path, PathBuf::from(DEFAULT_LEDGER_PATH));
        assert_eq!(config.tally_policy, TallyPolicy::Strict);

        let identity = config.identity();
        assert_eq!(identity.caller_identity().unwrap().as_str(), "voter1");
        assert_eq!(identity.executing_node_org().unwrap().as_str(), "Org1MSP");
    }

    #[test]
    fn overrides() {
        let config = config(&[
            (ENV_IDENTITY, "voter1"),
            (ENV_ORG, "Org1MSP"),
            (ENV_PEER_ORG, "Org2MSP"),
            (ENV_LEDGER_PATH, "/tmp/ledger.json"),
            (ENV_TALLY_POLICY, "attribute-to-last"),
        ])
        .unwrap();
        assert_eq!(config.peer_org, "Org2MSP");
        assert_eq!(config.ledger_path, PathBuf::from("/tmp/ledger.json"));
        assert_eq!(config.tally_policy, TallyPolicy::AttributeToLast);
    }

    #[test]
    fn flags_override_environment() {
        let config = Config::from_env(|key| match key {
            ENV_IDENTITY => Some("flag-voter".to_owned()),
            ENV_ORG => Some("Org9MSP".to_owned()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.identity, "flag-voter");
        assert_eq!(config.org, "Org9MSP");
    }

    #[test]
    fn missing_and_invalid() {
        assert!(matches!(
            config(&[(ENV_ORG, "Org1MSP")]),
            Err(ConfigError::Missing(ENV_IDENTITY))
        ));
        assert!(matches!(
            config(&[(ENV_IDENTITY, "voter1"), (ENV_ORG, "")]),
            Err(ConfigError::Missing(ENV_ORG))
        ));
        assert!(matches!(
            config(&[
                (ENV_IDENTITY, "voter1"),
                (ENV_ORG, "Org1MSP"),
                (ENV_TALLY_POLICY, "lenient")
            ]),
            Err(ConfigError::Invalid(ENV_TALLY_POLICY, _))
        ));
    }
}
