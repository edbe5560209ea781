//! Role-scoped access check for protected views.

use std::sync::Arc;

use agrimarket_domain::DashboardScope;
use tracing::{info, warn};

use crate::KeyValueStore;

/// Outcome of evaluating a guarded route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// A credential token exists for the scope.
    Granted,
    /// No token; the visitor must be sent to `redirect_to`.
    Denied {
        /// Sign-in entry point for the scope.
        redirect_to: &'static str,
    },
}

/// What a guarded route renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed<T> {
    /// The protected view.
    View(T),
    /// Client-side redirect target.
    Redirect(&'static str),
}

/// Grants access to a dashboard scope when its credential token is present.
///
/// Only presence is checked. Token validity and expiry are enforced by the
/// backend on every call.
#[derive(Clone)]
pub struct RouteGuard {
    store: Arc<dyn KeyValueStore>,
}

impl RouteGuard {
    /// Creates a guard reading from the given store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Evaluates access to a scope. Storage read failures deny access.
    #[must_use]
    pub fn evaluate(&self, scope: DashboardScope) -> GuardDecision {
        let key = scope.credential_namespace().token_key();
        let has_token = match self.store.get(key) {
            Ok(token) => token.is_some_and(|token| !token.is_empty()),
            Err(error) => {
                warn!(scope = scope.as_str(), error = %error, "failed to read credential token");
                false
            }
        };

        if has_token {
            return GuardDecision::Granted;
        }

        let redirect_to = scope.login_path();
        info!(scope = scope.as_str(), redirect_to, "guarded route denied");
        GuardDecision::Denied { redirect_to }
    }

    /// Renders the protected view when access is granted.
    ///
    /// The view is only built on the granted path.
    pub fn render<T>(&self, scope: DashboardScope, view: impl FnOnce() -> T) -> Routed<T> {
        match self.evaluate(scope) {
            GuardDecision::Granted => Routed::View(view()),
            GuardDecision::Denied { redirect_to } => Routed::Redirect(redirect_to),
        }
    }
}

#[cfg(test)]
mod tests {
    use agrimarket_domain::{ADMIN_LOGIN_PATH, LOGIN_PATH};

    use crate::test_support::{FailingStore, MemoryStore};

    use super::*;

    fn guard(pairs: &[(&str, &str)]) -> RouteGuard {
        RouteGuard::new(Arc::new(MemoryStore::with(pairs)))
    }

    #[test]
    fn missing_token_redirects_to_scope_login() {
        let guard = guard(&[]);
        for (scope, expected) in [
            (DashboardScope::Admin, ADMIN_LOGIN_PATH),
            (DashboardScope::SuperAdmin, ADMIN_LOGIN_PATH),
            (DashboardScope::Producer, LOGIN_PATH),
            (DashboardScope::Delivery, LOGIN_PATH),
            (DashboardScope::Any, LOGIN_PATH),
        ] {
            assert_eq!(
                guard.render(scope, || "dashboard"),
                Routed::Redirect(expected)
            );
        }
    }

    #[test]
    fn present_token_renders_view_unchanged() {
        let guard = guard(&[("producerDashboardToken", "jwt")]);
        assert_eq!(
            guard.render(DashboardScope::Producer, || "catalogue"),
            Routed::View("catalogue")
        );
    }

    #[test]
    fn admin_token_grants_super_admin_scope() {
        let guard = guard(&[("adminDashboardToken", "jwt")]);
        assert_eq!(
            guard.evaluate(DashboardScope::SuperAdmin),
            GuardDecision::Granted
        );
    }

    #[test]
    fn tokens_do_not_cross_namespaces() {
        let guard = guard(&[("token", "jwt")]);
        assert_eq!(guard.evaluate(DashboardScope::Any), GuardDecision::Granted);
        assert_eq!(
            guard.evaluate(DashboardScope::Delivery),
            GuardDecision::Denied {
                redirect_to: LOGIN_PATH
            }
        );
    }

    #[test]
    fn empty_token_is_absent() {
        let guard = guard(&[("deliveryDashboardToken", "")]);
        assert!(matches!(
            guard.evaluate(DashboardScope::Delivery),
            GuardDecision::Denied { .. }
        ));
    }

    #[test]
    fn unreadable_store_denies() {
        let guard = RouteGuard::new(Arc::new(FailingStore));
        assert_eq!(
            guard.evaluate(DashboardScope::Admin),
            GuardDecision::Denied {
                redirect_to: ADMIN_LOGIN_PATH
            }
        );
    }

    #[test]
    fn view_is_not_built_when_denied() {
        let guard = guard(&[]);
        let routed = guard.render(DashboardScope::Any, || -> &'static str {
            panic!("view must not be built")
        });
        assert_eq!(routed, Routed::Redirect(LOGIN_PATH));
    }
}
