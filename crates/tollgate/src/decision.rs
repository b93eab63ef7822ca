//! Authorization decisions.
//!
//! A check ends in exactly one of two terminal states, allowed or denied.
//! Denial is an ordinary value, never an error, so a caller has to look at
//! it before it can do anything with the gated result.

use std::fmt;

use tollgate_capability::{CapabilityId, CapabilityKind};
use tollgate_core::{PermissionId, Principal};

/// Why a principal was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    /// Who was refused.
    pub principal: Principal,

    /// What they tried to see or use.
    pub capability: CapabilityId,

    /// Whether that was an action, a page or a field.
    pub kind: CapabilityKind,

    /// The permission they lack.
    pub required: PermissionId,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is missing the {} permission required by {} {}",
            self.principal, self.required, self.kind, self.capability
        )
    }
}

/// Outcome of a single authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "an authorization decision must be inspected before acting"]
pub enum Decision {
    /// The principal may proceed.
    Allowed,

    /// The principal is refused.
    Denied(Denial),
}

impl Decision {
    /// Returns `true` if allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Returns `true` if denied.
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied(_))
    }

    /// The denial, if any.
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Self::Allowed => None,
            Self::Denied(denial) => Some(denial),
        }
    }

    /// Returns "allowed" or "denied".
    pub fn status_str(&self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::Denied(_) => "denied",
        }
    }
}

/// A value that is only reachable once authorization allowed it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a gated result may be a denial"]
pub enum Gated<T> {
    /// Authorized; carries the result of the gated work.
    Allowed(T),

    /// Refused before the gated work started.
    Denied(Denial),
}

impl<T> Gated<T> {
    /// Returns `true` if allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    /// Returns `true` if denied.
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied(_))
    }

    /// The allowed value, discarding a denial.
    pub fn allowed(self) -> Option<T> {
        match self {
            Self::Allowed(value) => Some(value),
            Self::Denied(_) => None,
        }
    }

    /// The denial, if any.
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Self::Allowed(_) => None,
            Self::Denied(denial) => Some(denial),
        }
    }

    /// Transform the allowed value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Gated<U> {
        match self {
            Self::Allowed(value) => Gated::Allowed(f(value)),
            Self::Denied(denial) => Gated::Denied(denial),
        }
    }

    /// Forget the value, keeping only the decision.
    pub fn decision(&self) -> Decision {
        match self {
            Self::Allowed(_) => Decision::Allowed,
            Self::Denied(denial) => Decision::Denied(denial.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn denial() -> Denial {
        Denial {
            principal: Principal::from("manager"),
            capability: CapabilityId::from("plugin.install"),
            kind: CapabilityKind::Action,
            required: PermissionId::from_static("overall.administer"),
        }
    }

    #[test]
    fn test_decision_helpers() {
        assert!(Decision::Allowed.is_allowed());
        assert_eq!(Decision::Allowed.status_str(), "allowed");

        let denied = Decision::Denied(denial());
        assert!(denied.is_denied());
        assert_eq!(denied.status_str(), "denied");
        assert_eq!(denied.denial().unwrap().principal, Principal::from("manager"));
    }

    #[test]
    fn test_denial_display() {
        let msg = denial().to_string();
        assert_eq!(
            msg,
            "manager is missing the overall.administer permission required by action plugin.install"
        );
    }

    #[test]
    fn test_gated_map_and_decision() {
        let allowed = Gated::Allowed(2).map(|n| n * 21);
        assert_eq!(allowed.decision(), Decision::Allowed);
        assert_eq!(allowed.allowed(), Some(42));

        let denied: Gated<i32> = Gated::Denied(denial());
        assert!(denied.map(|n| n + 1).is_denied());
    }
}
