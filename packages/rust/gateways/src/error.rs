//! Gateway error type.

use leadenrich_shared::{EnrichError, MissingCredential};

/// Failure of a single capability call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The provider's API key is not set. Raised before any network call.
    #[error("missing credential: set the {var} environment variable")]
    MissingCredential { var: String },

    /// Transport failure (connect, timeout, unreadable body).
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The provider answered 404 or had nothing for the query.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success answer.
    #[error("provider error (status {status}): {message}")]
    Provider { status: u16, message: String },
}

impl GatewayError {
    /// HTTP status associated with the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::Provider { status, .. } => Some(*status),
            Self::MissingCredential { .. } | Self::Unavailable(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<MissingCredential> for GatewayError {
    fn from(err: MissingCredential) -> Self {
        Self::MissingCredential { var: err.var }
    }
}

impl From<GatewayError> for EnrichError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::MissingCredential { var } => Self::MissingCredential { var },
            GatewayError::Unavailable(msg) => Self::Network(msg),
            GatewayError::NotFound(msg) => Self::Provider {
                status: 404,
                message: msg,
            },
            GatewayError::Provider { status, message } => Self::Provider {
                status,
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_into_enrich_error() {
        let err: EnrichError = GatewayError::MissingCredential {
            var: "SCRAPIN_API_KEY".into(),
        }
        .into();
        assert!(matches!(err, EnrichError::MissingCredential { ref var } if var == "SCRAPIN_API_KEY"));

        let err: EnrichError = GatewayError::Provider {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert!(matches!(err, EnrichError::Provider { status: 500, .. }));

        let err: EnrichError = GatewayError::Unavailable("timed out".into()).into();
        assert!(matches!(err, EnrichError::Network(_)));
    }

    #[test]
    fn status_codes() {
        assert_eq!(GatewayError::NotFound("x".into()).status(), Some(404));
        assert_eq!(GatewayError::Unavailable("x".into()).status(), None);
        assert!(GatewayError::NotFound("x".into()).is_not_found());
    }
}
