//! Toast notification values.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Unique identifier for a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastId(Uuid);

impl ToastId {
    /// Creates a random toast identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ToastId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastKind {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Error,
    /// Something needs attention.
    Warning,
    /// Neutral information.
    Info,
    /// Operation in progress; never expires on its own.
    Loading,
}

impl ToastKind {
    /// Returns the stable display value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Loading => "loading",
        }
    }
}

/// Screen corner or edge a toast is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastPosition {
    /// Top-left corner.
    TopLeft,
    /// Top center.
    TopCenter,
    /// Top-right corner.
    #[default]
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom center.
    BottomCenter,
    /// Bottom-right corner.
    BottomRight,
}

/// Button rendered inside a toast.
#[derive(Clone)]
pub struct ToastAction {
    label: String,
    on_activate: Arc<dyn Fn() + Send + Sync>,
}

impl ToastAction {
    /// Creates an action.
    pub fn new(label: impl Into<String>, on_activate: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            on_activate: Arc::new(on_activate),
        }
    }

    /// Returns the button label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Runs the action callback.
    pub fn activate(&self) {
        (self.on_activate)();
    }
}

impl fmt::Debug for ToastAction {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ToastAction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Optional presentation settings for a new toast.
#[derive(Debug, Clone, Default)]
pub struct ToastOptions {
    /// Heading shown above the message.
    pub title: Option<String>,
    /// Display duration; `None` uses the queue default, zero persists.
    pub duration: Option<Duration>,
    /// Anchor; `None` uses the queue default.
    pub position: Option<ToastPosition>,
    /// Buttons in display order.
    pub actions: Vec<ToastAction>,
}

impl ToastOptions {
    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Sets the position.
    #[must_use]
    pub fn position(mut self, position: ToastPosition) -> Self {
        self.position = Some(position);
        self
    }

    /// Appends an action button.
    #[must_use]
    pub fn action(mut self, action: ToastAction) -> Self {
        self.actions.push(action);
        self
    }
}

/// Request to show a toast.
#[derive(Debug, Clone)]
pub struct ToastSpec {
    /// Severity.
    pub kind: ToastKind,
    /// Body text.
    pub message: String,
    /// Presentation settings.
    pub options: ToastOptions,
}

impl ToastSpec {
    /// Creates a spec with default options.
    #[must_use]
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            options: ToastOptions::default(),
        }
    }

    /// Replaces the options.
    #[must_use]
    pub fn with_options(mut self, options: ToastOptions) -> Self {
        self.options = options;
        self
    }
}

/// A displayed toast. Immutable once created.
#[derive(Debug, Clone)]
pub struct Toast {
    id: ToastId,
    kind: ToastKind,
    message: String,
    title: Option<String>,
    duration: Duration,
    position: ToastPosition,
    actions: Vec<ToastAction>,
    created_at: DateTime<Utc>,
}

impl Toast {
    /// Materialises a spec, resolving defaults.
    ///
    /// Loading toasts always get a zero duration.
    #[must_use]
    pub fn from_spec(
        spec: ToastSpec,
        default_duration: Duration,
        default_position: ToastPosition,
    ) -> Self {
        let duration = match spec.kind {
            ToastKind::Loading => Duration::ZERO,
            _ => spec.options.duration.unwrap_or(default_duration),
        };

        Self {
            id: ToastId::new(),
            kind: spec.kind,
            message: spec.message,
            title: spec.options.title,
            duration,
            position: spec.options.position.unwrap_or(default_position),
            actions: spec.options.actions,
            created_at: Utc::now(),
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub fn id(&self) -> ToastId {
        self.id
    }

    /// Returns the severity.
    #[must_use]
    pub fn kind(&self) -> ToastKind {
        self.kind
    }

    /// Returns the body text.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Returns the heading, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the display duration; zero means the toast persists.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Returns the anchor.
    #[must_use]
    pub fn position(&self) -> ToastPosition {
        self.position
    }

    /// Returns the action buttons.
    #[must_use]
    pub fn actions(&self) -> &[ToastAction] {
        &self.actions
    }

    /// Returns when the toast was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns whether the toast removes itself after its duration.
    #[must_use]
    pub fn auto_dismisses(&self) -> bool {
        self.kind != ToastKind::Loading && !self.duration.is_zero()
    }
}
