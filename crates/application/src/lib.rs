//! Application services and ports.

#![forbid(unsafe_code)]

mod credential_session;
mod error_state;
mod form_submission;
mod login_flow;
mod notification_queue;
mod ports;
mod route_guard;

#[cfg(test)]
mod test_support;

pub use credential_session::CredentialSession;
pub use error_state::{ErrorStateStore, RetryPolicy};
pub use form_submission::run_submission;
pub use login_flow::{LoginFlow, LoginOutcome};
pub use notification_queue::{NotificationQueue, NotificationQueueConfig};
pub use ports::{AuthApi, KeyValueStore, LoginRequest, LoginResponse};
pub use route_guard::{GuardDecision, RouteGuard, Routed};
