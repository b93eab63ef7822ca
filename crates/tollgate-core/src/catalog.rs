//! The standard permission catalog.
//!
//! ```text
//! overall.administer
//!   ├── overall.manage   (dormant unless enabled at startup)
//!   └── overall.read
//! ```
//!
//! Manage does not imply read. A principal that should configure the system
//! without administering it is granted both.

use crate::error::Result;
use crate::registry::{PermissionRegistry, PermissionRegistryBuilder, PermissionSpec};
use crate::types::PermissionHandle;

/// Display group of the standard permissions.
pub const GROUP_OVERALL: &str = "Overall";

/// Full control, including plugin management and low-level diagnostics.
pub const ADMINISTER: &str = "overall.administer";

/// Configure the system without full administrative power.
pub const MANAGE: &str = "overall.manage";

/// See the system at all.
pub const READ: &str = "overall.read";

/// Handles of the standard permissions in a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardPermissions {
    pub administer: PermissionHandle,
    pub manage: PermissionHandle,
    pub read: PermissionHandle,
}

impl StandardPermissions {
    /// Register the standard catalog. Administer is registered first so it
    /// becomes the registry's broadest permission.
    pub fn register(builder: &mut PermissionRegistryBuilder) -> Result<Self> {
        let administer = builder.register(
            PermissionSpec::new(ADMINISTER, GROUP_OVERALL)
                .description("Make any system-wide change, including installing plugins"),
        )?;
        let manage = builder.register(
            PermissionSpec::new(MANAGE, GROUP_OVERALL)
                .description("Configure the system without administrative power")
                .implied_by(ADMINISTER)
                .enabled(false),
        )?;
        let read = builder.register(
            PermissionSpec::new(READ, GROUP_OVERALL)
                .description("See the system")
                .implied_by(ADMINISTER),
        )?;

        Ok(Self {
            administer,
            manage,
            read,
        })
    }

    /// Look up the standard permissions in an existing registry.
    pub fn resolve(registry: &PermissionRegistry) -> Result<Self> {
        Ok(Self {
            administer: registry.resolve(ADMINISTER)?,
            manage: registry.resolve(MANAGE)?,
            read: registry.resolve(READ)?,
        })
    }
}

/// Build a registry holding only the standard catalog.
pub fn standard_registry() -> Result<(PermissionRegistry, StandardPermissions)> {
    let mut builder = PermissionRegistry::builder();
    let standard = StandardPermissions::register(&mut builder)?;
    Ok((builder.build()?, standard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_administer_is_broadest() {
        let (registry, perms) = standard_registry().unwrap();
        assert_eq!(registry.broadest(), perms.administer);
    }

    #[test]
    fn test_manage_starts_dormant() {
        let (registry, perms) = standard_registry().unwrap();

        assert!(!registry.is_enabled(perms.manage));
        assert!(!registry.implies(perms.manage, perms.manage));
        assert!(registry.implies(perms.administer, perms.manage));
    }

    #[test]
    fn test_manage_does_not_imply_read() {
        let (registry, perms) = standard_registry().unwrap();
        registry.set_enabled(perms.manage, true).unwrap();

        assert!(registry.implies(perms.manage, perms.manage));
        assert!(!registry.implies(perms.manage, perms.read));
        assert!(!registry.implies(perms.read, perms.manage));
    }

    #[test]
    fn test_resolve_matches_register() {
        let (registry, perms) = standard_registry().unwrap();
        assert_eq!(StandardPermissions::resolve(&registry).unwrap(), perms);
    }

    #[test]
    fn test_overall_group_lists_all() {
        let (registry, _) = standard_registry().unwrap();
        assert_eq!(registry.group(GROUP_OVERALL).count(), 3);
    }

    #[test]
    fn test_entries_carry_descriptions() {
        let (registry, perms) = standard_registry().unwrap();
        let manage = registry.get(perms.manage).unwrap();

        assert_eq!(
            manage.description(),
            Some("Configure the system without administrative power")
        );
        assert!(registry.iter().all(|(_, entry)| entry.description().is_some()));
    }
}
