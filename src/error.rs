//! Unified error type for the settings backend.
//!
//! `AppError` is returned by every reconciler operation and remote call.
//! It serializes as `{ "kind": "...", "message": "..." }` so the presentation
//! layer can distinguish error categories without parsing messages.

use serde::ser::SerializeStruct;

/// Application-level error.
///
/// Each variant maps to a distinct failure domain. None of them is fatal:
/// callers log and keep their previous state.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Errors originating from the SQLite preference store.
    #[error("{0}")]
    Store(String),

    /// A remote call failed: `success = false`, a missing result, or a transport error.
    #[error("{0}")]
    Remote(String),

    /// A stored preference could not be decoded as a `{ value }` envelope.
    #[error("preference '{key}' is corrupt: {reason}")]
    CorruptPreference { key: &'static str, reason: String },

    /// A remote call succeeded but returned data that violates its shape.
    #[error("{0}")]
    MalformedResponse(String),

    /// Invalid or missing user input.
    #[error("{0}")]
    InvalidInput(String),

    /// I/O and OS-level errors (sockets, filesystem).
    #[error("{0}")]
    Io(String),
}

impl AppError {
    /// Returns the error kind as a string matching the variant name.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Store(_) => "Store",
            AppError::Remote(_) => "Remote",
            AppError::CorruptPreference { .. } => "CorruptPreference",
            AppError::MalformedResponse(_) => "MalformedResponse",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Io(_) => "Io",
        }
    }
}

/// Custom Serialize: produces `{ "kind": "Variant", "message": "..." }`.
impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut s = serializer.serialize_struct("AppError", 2)?;
        s.serialize_field("kind", self.kind())?;
        s.serialize_field("message", &self.to_string())?;
        s.end()
    }
}

// ---- From implementations for ergonomic error conversion ----

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Store(format!("{err:#}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_returns_correct_variant_name() {
        assert_eq!(AppError::Store("db fail".into()).kind(), "Store");
        assert_eq!(AppError::Remote("down failed".into()).kind(), "Remote");
        assert_eq!(
            AppError::CorruptPreference {
                key: "tailscaleToggle",
                reason: "eof".into()
            }
            .kind(),
            "CorruptPreference"
        );
        assert_eq!(
            AppError::MalformedResponse("ragged".into()).kind(),
            "MalformedResponse"
        );
        assert_eq!(AppError::InvalidInput("bad".into()).kind(), "InvalidInput");
        assert_eq!(AppError::Io("io fail".into()).kind(), "Io");
    }

    #[test]
    fn test_corrupt_preference_message_names_key() {
        let err = AppError::CorruptPreference {
            key: "tailscaleNodeIP",
            reason: "expected value".into(),
        };
        assert_eq!(
            err.to_string(),
            "preference 'tailscaleNodeIP' is corrupt: expected value"
        );
    }

    #[test]
    fn test_error_serializes_as_kind_and_message() {
        let err = AppError::Remote("get_tailscale_state returned success=false".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "Remote");
        assert_eq!(json["message"], "get_tailscale_state returned success=false");
    }

    #[test]
    fn test_from_anyhow_produces_store_variant() {
        let anyhow_err = anyhow::anyhow!("sqlite busy");
        let app_err: AppError = anyhow_err.into();
        assert_eq!(app_err.kind(), "Store");
        assert!(app_err.to_string().contains("sqlite busy"));
    }

    #[test]
    fn test_from_io_error_produces_io_variant() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "socket missing");
        let app_err: AppError = io_err.into();
        assert_eq!(app_err.kind(), "Io");
        assert!(app_err.to_string().contains("socket missing"));
    }
}
