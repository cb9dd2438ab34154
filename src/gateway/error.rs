use std::fmt;
use std::time::Duration;

/// Failure of one gateway call. Every variant is recoverable at batch
/// scope: the batch yields no suggestions and the run continues. `Auth` is
/// additionally surfaced to the user as an authentication warning.
#[derive(Debug)]
pub enum GatewayError {
    /// 401-class response from the provider.
    Auth,

    /// Non-2xx response other than 401.
    Http { status: u16, body: String },

    /// Connection-level failure (DNS, TLS, refused, reset).
    Network(reqwest::Error),

    /// The call exceeded its local timeout budget. The remote side is not
    /// cancelled; we only stop waiting.
    Timeout(Duration),

    /// Response body did not carry a usable completion.
    MalformedResponse(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Auth => {
                write!(f, "Model provider rejected credentials (401)")
            }
            GatewayError::Http { status, body } => {
                write!(f, "Model provider returned HTTP {}: {}", status, body)
            }
            GatewayError::Network(source) => {
                write!(f, "Network error talking to model provider: {}", source)
            }
            GatewayError::Timeout(budget) => {
                write!(f, "Model call exceeded {}s budget", budget.as_secs())
            }
            GatewayError::MalformedResponse(msg) => {
                write!(f, "Malformed model response: {}", msg)
            }
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::Network(source) => Some(source),
            _ => None,
        }
    }
}

impl GatewayError {
    /// Whether this failure should raise the user-visible auth warning.
    pub fn is_auth(&self) -> bool {
        matches!(self, GatewayError::Auth)
    }
}
