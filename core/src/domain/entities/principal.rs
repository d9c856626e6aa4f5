//! Principal entity supplied by the host application.

use serde::{Deserialize, Serialize};

/// The authenticated entity a token represents.
///
/// Principals are owned by the host application; the core never stores or
/// looks them up. The `id` is opaque and `roles` carry authorization data
/// into access-token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque principal identifier
    pub id: String,

    /// Role memberships, copied into access-token claims
    pub roles: Vec<String>,
}

impl Principal {
    /// Creates a new principal
    pub fn new(id: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            id: id.into(),
            roles,
        }
    }

    /// Checks whether the principal carries the given role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_roles() {
        let principal = Principal::new("u1", vec!["user".to_string(), "admin".to_string()]);

        assert_eq!(principal.id, "u1");
        assert!(principal.has_role("admin"));
        assert!(!principal.has_role("auditor"));
    }

    #[test]
    fn test_principal_serialization() {
        let principal = Principal::new("u1", vec!["user".to_string()]);

        let json = serde_json::to_string(&principal).unwrap();
        let deserialized: Principal = serde_json::from_str(&json).unwrap();

        assert_eq!(principal, deserialized);
    }
}
