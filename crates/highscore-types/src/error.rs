//! Structured error model shared by the store and the HTTP layer.
//!
//! An [`AppError`] carries a stable machine-readable `code`, a human
//! `message`, an optional HTTP status hint, optional internal diagnostic
//! detail, and a bag of structured fields for logging. Clients branch on
//! the code; the message is for humans only.
//!
//! Recurring failures are pre-registered as [`ErrorTemplate`] constants
//! and instantiated per call site:
//!
//! ```
//! use highscore_types::INVALID_KEY;
//!
//! let err = INVALID_KEY.with_message("Invalid UserID");
//! assert!(err.is(&INVALID_KEY));
//! assert_eq!(err.to_string(), "D002 - Invalid UserID");
//! ```
//!
//! Each input kind has its own constructor ([`AppError::from_template`],
//! [`AppError::coded`], [`AppError::with_message`], [`AppError::wrap`]),
//! so an unsupported input kind is rejected at compile time.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde_json::Value;

/// An identifier used twice within a store (duplicate id on create).
pub const ENTRY_EXISTS: ErrorTemplate = ErrorTemplate::new("D001", "Entry already exists");

/// An operation referenced an id that does not exist, or a friend list
/// holds an id that no longer resolves.
pub const INVALID_KEY: ErrorTemplate = ErrorTemplate::new("D002", "Invalid key");

/// Malformed or missing input, rejected before reaching storage.
pub const BAD_REQUEST: ErrorTemplate = ErrorTemplate::new(
    "EE001",
    "Bad request, input entries are invalid, malformed or missing",
)
.with_status(400);

/// Fallback code for failures that carry no code of their own (wrapped
/// low-level errors).
pub const INTERNAL: ErrorTemplate =
    ErrorTemplate::new("EE000", "Internal server error").with_status(500);

/// No route matches the requested path.
pub const NOT_FOUND: ErrorTemplate =
    ErrorTemplate::new("EE002", "Resource not found").with_status(404);

/// A reusable `(code, message, status)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorTemplate {
    code: &'static str,
    message: &'static str,
    status: Option<u16>,
}

impl ErrorTemplate {
    /// Register a template without an HTTP status.
    pub const fn new(code: &'static str, message: &'static str) -> Self {
        Self {
            code,
            message,
            status: None,
        }
    }

    /// Attach an HTTP status to the template.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// The stable error code.
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// The default message.
    pub const fn message(&self) -> &'static str {
        self.message
    }

    /// The HTTP status, if one was registered.
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// Instantiate the template with its default message.
    pub fn error(&self) -> AppError {
        AppError::from_template(self)
    }

    /// Instantiate the template, overriding its message.
    ///
    /// An empty `message` keeps the template's default.
    pub fn with_message(&self, message: impl Into<String>) -> AppError {
        let message = message.into();
        let err = AppError::from_template(self);
        if message.is_empty() {
            err
        } else {
            err.with_message(message)
        }
    }
}

/// A structured application error.
///
/// Every store operation returns either a value or one of these, never
/// both. The HTTP layer turns it into a `{errorCode, errorMessage}`
/// envelope at [`AppError::status`] (500 when unset).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", describe(.code.as_deref(), .message))]
pub struct AppError {
    code: Option<String>,
    message: String,
    status: Option<u16>,
    internal: Option<String>,
    fields: BTreeMap<String, Value>,
}

fn describe(code: Option<&str>, message: &str) -> String {
    code.map_or_else(|| message.to_owned(), |code| format!("{code} - {message}"))
}

impl AppError {
    fn blank(message: String) -> Self {
        Self {
            code: None,
            message,
            status: None,
            internal: None,
            fields: BTreeMap::new(),
        }
    }

    /// Create an error from a registered template.
    pub fn from_template(template: &ErrorTemplate) -> Self {
        let mut err = Self::blank(template.message.to_owned()).with_code(template.code);
        if let Some(status) = template.status {
            err = err.with_status(status);
        }
        err
    }

    /// Create an error with an ad hoc (unregistered) code.
    pub fn coded(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::blank(message.into()).with_code(code)
    }

    /// Wrap a low-level failure.
    ///
    /// The failure's text becomes both the internal detail and the
    /// message. The error carries no code and no status.
    pub fn wrap<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let text = err.to_string();
        Self::blank(text.clone()).with_internal(text)
    }

    /// Wrap a low-level failure with a caller-supplied message.
    ///
    /// An empty `message` falls back to the failure's text.
    pub fn wrap_with<E>(err: &E, message: impl Into<String>) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let message = message.into();
        let wrapped = Self::wrap(err);
        if message.is_empty() {
            wrapped
        } else {
            wrapped.with_message(message)
        }
    }

    /// Continue this error with a new message, keeping code, status,
    /// internal detail, and fields.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    fn with_code(mut self, code: impl Into<String>) -> Self {
        let code = code.into();
        self.fields
            .insert(String::from("code"), Value::String(code.clone()));
        self.code = Some(code);
        self
    }

    /// Set the HTTP status hint.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.fields
            .insert(String::from("http_status"), Value::from(status));
        self.status = Some(status);
        self
    }

    /// Attach internal diagnostic detail (logged, never sent to clients).
    #[must_use]
    pub fn with_internal(mut self, internal: impl Display) -> Self {
        let internal = internal.to_string();
        self.fields
            .insert(String::from("internal"), Value::String(internal.clone()));
        self.internal = Some(internal);
        self
    }

    /// Attach a structured logging field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// The stable error code, if any.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The HTTP status hint, if set.
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// Internal diagnostic detail, if any.
    pub fn internal(&self) -> Option<&str> {
        self.internal.as_deref()
    }

    /// Structured logging fields.
    pub const fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Whether this error was instantiated from `template` (same code).
    pub fn is(&self, template: &ErrorTemplate) -> bool {
        self.code.as_deref() == Some(template.code)
    }

    /// Emit this error as a single structured `ERROR` event.
    pub fn log(&self) {
        let fields = Value::Object(
            self.fields
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        );
        tracing::error!(
            code = self.code.as_deref(),
            status = self.status,
            internal = self.internal.as_deref(),
            fields = %fields,
            "{}",
            self.message
        );
    }
}

impl From<&ErrorTemplate> for AppError {
    fn from(template: &ErrorTemplate) -> Self {
        Self::from_template(template)
    }
}
