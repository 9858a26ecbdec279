/// Payload sent by [`send_fd_default`](crate::send_fd_default)
pub const DEFAULT_PAYLOAD: &[u8] = b"NONE";

/// Default upper bound on the payload read by [`recv_fd`](crate::recv_fd)
pub const DEFAULT_MAX_PAYLOAD: usize = 4096;

/// Byte transmitted in place of an empty payload
pub const PLACEHOLDER_BYTE: u8 = 0;

/// Options for sending a descriptor
#[derive(Debug, Clone)]
pub struct SendConfig {
    placeholder: u8,
    no_signal: bool,
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            placeholder: PLACEHOLDER_BYTE,
            no_signal: true,
        }
    }
}

impl SendConfig {
    /// Create a new builder for SendConfig
    pub fn builder() -> SendConfigBuilder {
        SendConfigBuilder::default()
    }

    /// Byte put on the wire when the caller's payload is empty
    pub fn placeholder(&self) -> u8 {
        self.placeholder
    }

    /// Whether a closed peer is reported as `EPIPE` rather than `SIGPIPE`
    ///
    /// Only honoured on Linux and Android.
    pub fn no_signal(&self) -> bool {
        self.no_signal
    }
}

/// Builder for SendConfig
#[derive(Debug, Default)]
pub struct SendConfigBuilder {
    inner: SendConfig,
}

impl SendConfigBuilder {
    pub fn placeholder(mut self, byte: u8) -> Self {
        self.inner.placeholder = byte;
        self
    }

    pub fn no_signal(mut self, enabled: bool) -> Self {
        self.inner.no_signal = enabled;
        self
    }

    pub fn build(self) -> SendConfig {
        self.inner
    }
}

/// Options for receiving a descriptor
#[derive(Debug, Clone)]
pub struct RecvConfig {
    max_payload: usize,
    close_on_exec: bool,
}

impl Default for RecvConfig {
    fn default() -> Self {
        Self {
            max_payload: DEFAULT_MAX_PAYLOAD,
            close_on_exec: true,
        }
    }
}

impl RecvConfig {
    /// Create a new builder for RecvConfig
    pub fn builder() -> RecvConfigBuilder {
        RecvConfigBuilder::default()
    }

    /// Shorthand for a default config with a different payload limit
    pub fn with_max_payload(max_payload: usize) -> Self {
        Self::builder().max_payload(max_payload).build()
    }

    pub fn max_payload(&self) -> usize {
        self.max_payload
    }

    /// Whether the received descriptor gets `FD_CLOEXEC` atomically
    ///
    /// Only honoured on Linux and Android.
    pub fn close_on_exec(&self) -> bool {
        self.close_on_exec
    }
}

/// Builder for RecvConfig
#[derive(Debug, Default)]
pub struct RecvConfigBuilder {
    inner: RecvConfig,
}

impl RecvConfigBuilder {
    /// Maximum number of payload bytes read; must be non-zero
    pub fn max_payload(mut self, bytes: usize) -> Self {
        self.inner.max_payload = bytes;
        self
    }

    pub fn close_on_exec(mut self, enabled: bool) -> Self {
        self.inner.close_on_exec = enabled;
        self
    }

    pub fn build(self) -> RecvConfig {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let send = SendConfig::default();
        assert_eq!(send.placeholder(), PLACEHOLDER_BYTE);
        assert!(send.no_signal());

        let recv = RecvConfig::default();
        assert_eq!(recv.max_payload(), DEFAULT_MAX_PAYLOAD);
        assert!(recv.close_on_exec());
    }

    #[test]
    fn test_builders() {
        let send = SendConfig::builder().placeholder(b'x').no_signal(false).build();
        assert_eq!(send.placeholder(), b'x');
        assert!(!send.no_signal());

        let recv = RecvConfig::builder()
            .max_payload(11)
            .close_on_exec(false)
            .build();
        assert_eq!(recv.max_payload(), 11);
        assert!(!recv.close_on_exec());
    }

    #[test]
    fn test_with_max_payload_keeps_other_defaults() {
        let recv = RecvConfig::with_max_payload(64);
        assert_eq!(recv.max_payload(), 64);
        assert!(recv.close_on_exec());
    }
}
