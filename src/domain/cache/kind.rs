//! Cache backend kinds

use serde::{Deserialize, Serialize};

use crate::domain::CacheError;

/// Supported cache backend kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// In-process store using moka
    #[default]
    #[serde(alias = "in_memory", alias = "memory")]
    InProcess,
    /// Remote key-value store (Redis)
    #[serde(alias = "redis")]
    Distributed,
    /// Caller-supplied constructor
    Custom,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::InProcess => write!(f, "in_process"),
            ProviderKind::Distributed => write!(f, "distributed"),
            ProviderKind::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_process" | "inprocess" | "in_memory" | "inmemory" | "memory" => {
                Ok(ProviderKind::InProcess)
            }
            "distributed" | "redis" => Ok(ProviderKind::Distributed),
            "custom" => Ok(ProviderKind::Custom),
            _ => Err(CacheError::invalid_config(
                s,
                "unknown provider kind. Valid kinds: in_process, distributed, custom",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("in_process".parse::<ProviderKind>().unwrap(), ProviderKind::InProcess);
        assert_eq!("memory".parse::<ProviderKind>().unwrap(), ProviderKind::InProcess);
        assert_eq!("redis".parse::<ProviderKind>().unwrap(), ProviderKind::Distributed);
        assert_eq!("REDIS".parse::<ProviderKind>().unwrap(), ProviderKind::Distributed);
        assert_eq!("custom".parse::<ProviderKind>().unwrap(), ProviderKind::Custom);
    }

    #[test]
    fn test_kind_from_str_invalid() {
        assert!("memcached".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ProviderKind::InProcess.to_string(), "in_process");
        assert_eq!(ProviderKind::Distributed.to_string(), "distributed");
    }

    #[test]
    fn test_kind_deserialize_aliases() {
        let kind: ProviderKind = serde_json::from_str("\"redis\"").unwrap();
        assert_eq!(kind, ProviderKind::Distributed);

        let kind: ProviderKind = serde_json::from_str("\"in_memory\"").unwrap();
        assert_eq!(kind, ProviderKind::InProcess);
    }
}
