//! Structured error types shared across sweepgen crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`SweepError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (sweep, arm, token, ...).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for experiment expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum SweepError {
    /// The experiment document is malformed or structurally inconsistent.
    #[error("malformed input: {0}")]
    Input(ErrorInfo),
    /// An arm uses a substitution key that is not a placeholder token.
    #[error("invalid substitution token: {0}")]
    Token(ErrorInfo),
    /// A sweep or arm name could not be resolved.
    #[error("unknown sweep or arm: {0}")]
    Lookup(ErrorInfo),
    /// Serialization and canonical encoding errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl SweepError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            SweepError::Input(info)
            | SweepError::Token(info)
            | SweepError::Lookup(info)
            | SweepError::Serde(info) => info,
        }
    }

    /// Builds an [`SweepError::Input`] with the given code and message.
    pub fn malformed(code: &str, message: impl Into<String>) -> Self {
        SweepError::Input(ErrorInfo::new(code, message))
    }

    /// Error raised when an arm key is not delimited by the token sentinel.
    pub fn invalid_token(sweep: &str, arm: &str, token: &str) -> Self {
        SweepError::Token(
            ErrorInfo::new(
                "invalid-token",
                format!("substitution key `{token}` must start and end with `@`"),
            )
            .with_context("sweep", sweep)
            .with_context("arm", arm)
            .with_context("token", token)
            .with_hint("rename the key to the form @param@"),
        )
    }

    /// Error raised when a sweep name is not present in the experiment.
    pub fn unknown_sweep(sweep: &str) -> Self {
        SweepError::Lookup(
            ErrorInfo::new("unknown-sweep", format!("sweep `{sweep}` is not defined"))
                .with_context("sweep", sweep),
        )
    }

    /// Error raised when an arm name is not present in a sweep.
    pub fn unknown_arm(sweep: &str, arm: &str) -> Self {
        SweepError::Lookup(
            ErrorInfo::new(
                "unknown-arm",
                format!("arm `{arm}` is not defined in sweep `{sweep}`"),
            )
            .with_context("sweep", sweep)
            .with_context("arm", arm),
        )
    }
}
