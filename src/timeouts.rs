//! Timeout configuration for the HTTP transport.

use std::time::Duration;

/// Timeouts applied to the underlying HTTP client.
///
/// There is no deadline contract beyond these; callers needing an overall
/// deadline wrap calls themselves.
///
/// # Examples
///
/// ```rust
/// use mindsdb_link::LinkTimeouts;
/// use std::time::Duration;
///
/// let timeouts = LinkTimeouts::builder()
///     .connection_timeout(Duration::from_secs(5))
///     .request_timeout(Duration::from_secs(300))
///     .build();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTimeouts {
    /// TCP + TLS handshake.
    /// Default: 10 seconds
    pub connection_timeout: Duration,

    /// Whole request, including server-side execution. Model training and
    /// knowledge base ingestion statements can be slow.
    /// Default: 120 seconds
    pub request_timeout: Duration,
}

impl Default for LinkTimeouts {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl LinkTimeouts {
    pub fn builder() -> LinkTimeoutsBuilder {
        LinkTimeoutsBuilder::new()
    }

    /// Short timeouts for a local instance
    pub fn fast() -> Self {
        Self {
            connection_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Builder for [`LinkTimeouts`]
#[derive(Debug, Clone)]
pub struct LinkTimeoutsBuilder {
    timeouts: LinkTimeouts,
}

impl LinkTimeoutsBuilder {
    fn new() -> Self {
        Self {
            timeouts: LinkTimeouts::default(),
        }
    }

    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connection_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.request_timeout = timeout;
        self
    }

    pub fn build(self) -> LinkTimeouts {
        self.timeouts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = LinkTimeouts::default();
        assert_eq!(t.connection_timeout, Duration::from_secs(10));
        assert_eq!(t.request_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_builder_overrides() {
        let t = LinkTimeouts::builder()
            .request_timeout(Duration::from_secs(1))
            .build();
        assert_eq!(t.request_timeout, Duration::from_secs(1));
        assert_eq!(t.connection_timeout, Duration::from_secs(10));
    }
}
