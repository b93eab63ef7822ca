//! Boot-time configuration.
//!
//! Read once at startup, before any request is served. The only setting is
//! whether the optional manage tier is active; without it the tier stays
//! disabled for the lifetime of the process.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Environment variable that activates the manage tier.
pub const MANAGE_PERMISSION_ENV: &str = "TOLLGATE_MANAGE_PERMISSION";

/// Configuration for a [`SecurityContext`](crate::SecurityContext).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TollgateConfig {
    /// Activate `overall.manage`.
    pub manage_permission: bool,
}

impl TollgateConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            manage_permission: lookup(MANAGE_PERMISSION_ENV)
                .as_deref()
                .is_some_and(parse_flag),
        }
    }

    /// Parse configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set whether the manage tier is active.
    pub fn with_manage_permission(mut self, enabled: bool) -> Self {
        self.manage_permission = enabled;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(value: Option<&'static str>) -> impl Fn(&str) -> Option<String> {
        move |key| {
            assert_eq!(key, MANAGE_PERMISSION_ENV);
            value.map(String::from)
        }
    }

    #[test]
    fn test_absent_flag_leaves_manage_disabled() {
        assert!(!TollgateConfig::from_lookup(lookup(None)).manage_permission);
    }

    #[test]
    fn test_truthy_values() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert!(
                TollgateConfig::from_lookup(lookup(Some(value))).manage_permission,
                "value {value:?}"
            );
        }
    }

    #[test]
    fn test_other_values_are_false() {
        for value in ["0", "false", "", "enabled"] {
            assert!(!TollgateConfig::from_lookup(lookup(Some(value))).manage_permission);
        }
    }

    #[test]
    fn test_from_json() {
        let config = TollgateConfig::from_json(r#"{ "manage_permission": true }"#).unwrap();
        assert!(config.manage_permission);
        assert_eq!(TollgateConfig::from_json("{}").unwrap(), TollgateConfig::default());
    }
}
