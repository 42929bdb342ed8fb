//! Client session configuration.

use std::time::Duration;
use thiserror::Error;

/// Default bound for connect, read and write operations
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;
const DEFAULT_WRITE_BUFFER_SIZE: usize = 4 * 1024;

/// Timeouts, persistence and buffer sizes used by an [`HttpClient`](crate::connection::HttpClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    connect_timeout: Duration,
    read_timeout: Duration,
    write_timeout: Duration,
    keep_alive: bool,
    read_buffer_size: usize,
    write_buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            write_timeout: DEFAULT_TIMEOUT,
            keep_alive: false,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            write_buffer_size: DEFAULT_WRITE_BUFFER_SIZE,
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    /// Whether requests built by the session ask for a persistent connection.
    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    pub fn read_buffer_size(&self) -> usize {
        self.read_buffer_size
    }

    pub fn write_buffer_size(&self) -> usize {
        self.write_buffer_size
    }
}

#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    fn new() -> Self {
        Self { config: ClientConfig::default() }
    }

    /// Sets connect, read and write timeouts at once.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self.config.read_timeout = timeout;
        self.config.write_timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.config.write_timeout = timeout;
        self
    }

    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.config.keep_alive = keep_alive;
        self
    }

    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    pub fn write_buffer_size(mut self, size: usize) -> Self {
        self.config.write_buffer_size = size;
        self
    }

    pub fn build(self) -> Result<ClientConfig, ConfigBuildError> {
        let config = self.config;
        for (name, timeout) in
            [("connect_timeout", config.connect_timeout), ("read_timeout", config.read_timeout), ("write_timeout", config.write_timeout)]
        {
            if timeout.is_zero() {
                return Err(ConfigBuildError::ZeroTimeout { name });
            }
        }

        if config.read_buffer_size == 0 || config.write_buffer_size == 0 {
            return Err(ConfigBuildError::ZeroBufferSize);
        }

        Ok(config)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigBuildError {
    #[error("{name} must be greater than zero")]
    ZeroTimeout { name: &'static str },
    #[error("buffer size must be greater than zero")]
    ZeroBufferSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_ten_seconds_and_close() {
        let config = ClientConfig::default();
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.read_timeout(), Duration::from_secs(10));
        assert_eq!(config.write_timeout(), Duration::from_secs(10));
        assert!(!config.keep_alive());
    }

    #[test]
    fn builder_overrides() {
        let config = ClientConfig::builder()
            .timeout(Duration::from_secs(3))
            .read_timeout(Duration::from_millis(500))
            .keep_alive(true)
            .read_buffer_size(1024)
            .build()
            .unwrap();

        assert_eq!(config.connect_timeout(), Duration::from_secs(3));
        assert_eq!(config.write_timeout(), Duration::from_secs(3));
        assert_eq!(config.read_timeout(), Duration::from_millis(500));
        assert!(config.keep_alive());
        assert_eq!(config.read_buffer_size(), 1024);
    }

    #[test]
    fn builder_rejects_zero_values() {
        let result = ClientConfig::builder().write_timeout(Duration::ZERO).build();
        assert_eq!(result, Err(ConfigBuildError::ZeroTimeout { name: "write_timeout" }));

        let result = ClientConfig::builder().write_buffer_size(0).build();
        assert_eq!(result, Err(ConfigBuildError::ZeroBufferSize));
    }
}
