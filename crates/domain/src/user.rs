//! Marketplace user roles and profiles.

use serde::{Deserialize, Serialize};

use crate::CredentialNamespace;

/// Role of an authenticated marketplace user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    /// Buys produce through the public storefront.
    Consumer,
    /// Sells produce and manages a farm catalogue.
    Producer,
    /// Delivers orders.
    #[serde(alias = "deliverer")]
    Delivery,
    /// Moderates the marketplace.
    Admin,
    /// Manages administrators.
    #[serde(alias = "super_admin", alias = "superadmin")]
    SuperAdmin,
}

impl UserRole {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consumer => "consumer",
            Self::Producer => "producer",
            Self::Delivery => "delivery",
            Self::Admin => "admin",
            Self::SuperAdmin => "super-admin",
        }
    }

    /// Returns the storage namespace credentials for this role are kept in.
    #[must_use]
    pub fn credential_namespace(&self) -> CredentialNamespace {
        match self {
            Self::Consumer => CredentialNamespace::Generic,
            Self::Producer => CredentialNamespace::Producer,
            Self::Delivery => CredentialNamespace::Delivery,
            Self::Admin | Self::SuperAdmin => CredentialNamespace::Admin,
        }
    }
}

/// Profile returned by the backend after a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend identifier.
    pub id: String,
    /// Sign-in email.
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Marketplace role.
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_roles_share_a_namespace() {
        assert_eq!(
            UserRole::Admin.credential_namespace(),
            UserRole::SuperAdmin.credential_namespace()
        );
        assert_eq!(
            UserRole::Consumer.credential_namespace(),
            CredentialNamespace::Generic
        );
    }

    #[test]
    fn role_accepts_backend_aliases() {
        for (raw, expected) in [
            (r#""deliverer""#, UserRole::Delivery),
            (r#""super_admin""#, UserRole::SuperAdmin),
            (r#""superadmin""#, UserRole::SuperAdmin),
        ] {
            assert_eq!(serde_json::from_str::<UserRole>(raw).ok(), Some(expected));
        }
        assert!(serde_json::from_str::<UserRole>(r#""farmer""#).is_err());
    }

    #[test]
    fn profile_deserializes_backend_shape() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"id":"u1","email":"marie@ferme.fr","role":"super-admin"}"#,
        )
        .unwrap_or_else(|_| panic!("test"));
        assert_eq!(profile.role, UserRole::SuperAdmin);
        assert!(profile.name.is_empty());
    }
}
