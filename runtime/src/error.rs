//! Fatal traversal errors.
//!
//! Only setup failures are errors. Navigation failures, bad tiles, and
//! unparseable prices are absorbed where they happen and never reach the
//! caller.

/// A condition that stops a traversal before any items can be collected.
#[derive(thiserror::Error, Debug)]
pub enum TraversalError {
    #[error("{var} is not set in environment variables")]
    MissingCredential { var: &'static str },

    #[error("invalid target url '{url}': {reason}")]
    InvalidTarget { url: String, reason: String },

    #[error("failed to connect to browser: {0:#}")]
    BrowserConnect(anyhow::Error),

    #[error("failed to open browser tab: {0:#}")]
    ContextOpen(anyhow::Error),

    #[error("site profile has an invalid selector: {0:#}")]
    InvalidProfile(anyhow::Error),
}

impl TraversalError {
    /// Short machine-readable code for JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            TraversalError::MissingCredential { .. } => "E_MISSING_CREDENTIAL",
            TraversalError::InvalidTarget { .. } => "E_INVALID_TARGET",
            TraversalError::BrowserConnect(_) => "E_BROWSER_CONNECT",
            TraversalError::ContextOpen(_) => "E_CONTEXT_OPEN",
            TraversalError::InvalidProfile(_) => "E_INVALID_PROFILE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_message_names_variable() {
        let err = TraversalError::MissingCredential {
            var: "BROWSERLESS_TOKEN",
        };
        assert_eq!(
            err.to_string(),
            "BROWSERLESS_TOKEN is not set in environment variables"
        );
        assert_eq!(err.code(), "E_MISSING_CREDENTIAL");
    }

    #[test]
    fn test_browser_connect_includes_cause_chain() {
        let cause = anyhow::anyhow!("connection refused").context("websocket handshake");
        let err = TraversalError::BrowserConnect(cause);
        let msg = err.to_string();
        assert!(msg.contains("websocket handshake"));
        assert!(msg.contains("connection refused"));
    }
}
