//! Dashboard scopes and the storage namespaces that hold their credentials.

/// Entry point for administrator sign-in.
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";
/// Entry point for every other sign-in.
pub const LOGIN_PATH: &str = "/login";

/// Storage namespace for one family of credentials.
///
/// Each namespace owns a token key and a serialized-profile key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialNamespace {
    /// Consumer and other unscoped sign-ins.
    Generic,
    /// Administrators and super administrators.
    Admin,
    /// Producers.
    Producer,
    /// Delivery staff.
    Delivery,
}

impl CredentialNamespace {
    /// Returns all namespaces.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[CredentialNamespace] = &[
            CredentialNamespace::Generic,
            CredentialNamespace::Admin,
            CredentialNamespace::Producer,
            CredentialNamespace::Delivery,
        ];

        ALL
    }

    /// Returns the storage key of the credential token.
    #[must_use]
    pub fn token_key(&self) -> &'static str {
        match self {
            Self::Generic => "token",
            Self::Admin => "adminDashboardToken",
            Self::Producer => "producerDashboardToken",
            Self::Delivery => "deliveryDashboardToken",
        }
    }

    /// Returns the storage key of the serialized user profile.
    #[must_use]
    pub fn user_key(&self) -> &'static str {
        match self {
            Self::Generic => "user",
            Self::Admin => "adminDashboardUser",
            Self::Producer => "producerDashboardUser",
            Self::Delivery => "deliveryDashboardUser",
        }
    }
}

/// Protected area a route belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardScope {
    /// Administration dashboard.
    Admin,
    /// Super administration dashboard.
    SuperAdmin,
    /// Producer dashboard.
    Producer,
    /// Delivery dashboard.
    Delivery,
    /// Any signed-in consumer area.
    Any,
}

impl DashboardScope {
    /// Parses a route scope; unknown values guard as [`DashboardScope::Any`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "admin" => Self::Admin,
            "super-admin" | "superadmin" | "super_admin" => Self::SuperAdmin,
            "producer" => Self::Producer,
            "delivery" => Self::Delivery,
            _ => Self::Any,
        }
    }

    /// Returns the stable route value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::SuperAdmin => "super-admin",
            Self::Producer => "producer",
            Self::Delivery => "delivery",
            Self::Any => "any",
        }
    }

    /// Returns the namespace whose token grants access to this scope.
    #[must_use]
    pub fn credential_namespace(&self) -> CredentialNamespace {
        match self {
            Self::Admin | Self::SuperAdmin => CredentialNamespace::Admin,
            Self::Producer => CredentialNamespace::Producer,
            Self::Delivery => CredentialNamespace::Delivery,
            Self::Any => CredentialNamespace::Generic,
        }
    }

    /// Returns where unauthenticated visitors of this scope are sent.
    #[must_use]
    pub fn login_path(&self) -> &'static str {
        match self {
            Self::Admin | Self::SuperAdmin => ADMIN_LOGIN_PATH,
            Self::Producer | Self::Delivery | Self::Any => LOGIN_PATH,
        }
    }
}
