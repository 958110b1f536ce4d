use thiserror::Error;

/// Failures reported by a [`RoutingService`](super::RoutingService).
///
/// Every variant is a collaborator failure: the fetcher logs it and skips the
/// affected pair rather than retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// The request could not reach the routing service.
    #[error("routing request to {url} failed: {message}")]
    Network {
        /// Request URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The routing service did not answer in time.
    #[error("routing request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The routing service answered with a non-success HTTP status.
    #[error("routing request to {url} returned HTTP {status}: {message}")]
    Http {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response or error description.
        message: String,
    },
    /// The routing service reported an application-level error.
    #[error("routing service error {code}: {message}")]
    Service {
        /// Service status code, e.g. `"InvalidQuery"`.
        code: String,
        /// Service message.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse routing response: {message}")]
    Parse {
        /// Decoder error description.
        message: String,
    },
    /// The service found no route between the endpoints.
    #[error("no route between the requested endpoints")]
    NoRoute,
    /// The service does not implement the requested operation.
    #[error("operation not supported by this routing service")]
    Unsupported,
}
