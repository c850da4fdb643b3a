//! Namespace and retention configuration.
//!
//! Supplied by the embedding application; the store treats namespaces as
//! opaque partition keys and never assumes a fixed set of names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How long a namespace's memories should live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionPolicy {
    #[default]
    Permanent,
    /// Dropped when the owning manager closes.
    Session,
    /// Dropped by an explicit prune once older than `ttl_ms`.
    Ttl,
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetentionPolicy::Permanent => write!(f, "permanent"),
            RetentionPolicy::Session => write!(f, "session"),
            RetentionPolicy::Ttl => write!(f, "ttl"),
        }
    }
}

/// Configuration for one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceConfig {
    /// Partition key written into `Memory::agent_id`.
    pub namespace: String,

    #[serde(default)]
    pub retention: RetentionPolicy,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_ms: Option<u64>,
}

impl NamespaceConfig {
    pub fn permanent(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            retention: RetentionPolicy::Permanent,
            ttl_ms: None,
        }
    }

    /// Namespace cleared when the manager closes.
    pub fn session(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            retention: RetentionPolicy::Session,
            ttl_ms: None,
        }
    }

    /// Namespace whose memories expire after `ttl_ms`.
    pub fn ttl(namespace: impl Into<String>, ttl_ms: u64) -> Self {
        Self {
            namespace: namespace.into(),
            retention: RetentionPolicy::Ttl,
            ttl_ms: Some(ttl_ms),
        }
    }

    /// TTL in milliseconds when the policy is `ttl`.
    pub fn expiry_ms(&self) -> Option<u64> {
        match self.retention {
            RetentionPolicy::Ttl => self.ttl_ms,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_default_is_permanent() {
        assert_eq!(RetentionPolicy::default(), RetentionPolicy::Permanent);
    }

    #[test]
    fn test_policy_display() {
        assert_eq!(RetentionPolicy::Permanent.to_string(), "permanent");
        assert_eq!(RetentionPolicy::Session.to_string(), "session");
        assert_eq!(RetentionPolicy::Ttl.to_string(), "ttl");
    }

    #[test]
    fn test_constructors() {
        assert_eq!(NamespaceConfig::permanent("n").retention, RetentionPolicy::Permanent);
        assert_eq!(NamespaceConfig::session("n").retention, RetentionPolicy::Session);
        let ttl = NamespaceConfig::ttl("n", 50);
        assert_eq!(ttl.retention, RetentionPolicy::Ttl);
        assert_eq!(ttl.ttl_ms, Some(50));
    }

    #[test]
    fn test_expiry_only_for_ttl() {
        assert_eq!(NamespaceConfig::ttl("n", 50).expiry_ms(), Some(50));
        let mut permanent = NamespaceConfig::permanent("n");
        permanent.ttl_ms = Some(50);
        assert_eq!(permanent.expiry_ms(), None);
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{"namespace":"agent:scout","retention":"ttl","ttl_ms":86400000}"#;
        let config: NamespaceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config, NamespaceConfig::ttl("agent:scout", 86_400_000));
    }

    #[test]
    fn test_deserialize_defaults_to_permanent() {
        let config: NamespaceConfig = serde_json::from_str(r#"{"namespace":"x"}"#).unwrap();
        assert_eq!(config.retention, RetentionPolicy::Permanent);
        assert!(config.ttl_ms.is_none());
    }
}
