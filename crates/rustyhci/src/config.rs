//! Transport configuration

use crate::error::HciError;
use crate::hci::HciFilter;
use std::time::Duration;

/// Settings for an [`HciSocket`](crate::hci::HciSocket) session
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// How long a single blocking receive may wait before the reader loop
    /// re-checks its stop flag. Bounds the latency of `close()`.
    pub recv_timeout: Duration,
    /// Size of the buffer each frame is received into
    pub recv_buffer_size: usize,
    /// Filter installed before the reader starts
    pub filter: Option<HciFilter>,
    /// Name of the background reader thread
    pub reader_thread_name: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            recv_timeout: Duration::from_millis(100),
            recv_buffer_size: 1024,
            filter: None,
            reader_thread_name: "hci-reader".to_string(),
        }
    }
}

impl TransportConfig {
    /// Checks the settings a session cannot run with
    pub fn validate(&self) -> Result<(), HciError> {
        // SO_RCVTIMEO rounds to whole microseconds, and zero means wait forever
        if self.recv_timeout.as_micros() == 0 {
            return Err(HciError::InvalidConfig("receive timeout must be at least 1 µs"));
        }
        if self.recv_buffer_size == 0 {
            return Err(HciError::InvalidConfig("receive buffer size must be non-zero"));
        }
        Ok(())
    }

    pub fn with_recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = timeout;
        self
    }

    pub fn with_recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = size;
        self
    }

    pub fn with_filter(mut self, filter: HciFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_reader_thread_name(mut self, name: impl Into<String>) -> Self {
        self.reader_thread_name = name.into();
        self
    }
}
