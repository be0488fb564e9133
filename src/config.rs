//! Client configuration

use crate::error::{KiwiError, Result};
use crate::protocol::{DEFAULT_HOST, DEFAULT_PORT};
use std::time::Duration;

/// Where and how to reach the automation service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Limit on establishing the TCP connection; `None` blocks
    pub connect_timeout: Option<Duration>,
    /// Limit on each blocking send/receive; `None` blocks indefinitely
    pub read_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout: None,
            read_timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// WebSocket endpoint URL
    pub fn url(&self) -> String {
        format!("ws://{}:{}/", self.host, self.port)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Pick `--port <n>` or `--port=<n>` out of process arguments
    ///
    /// Anything else is left for the host program.
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            let value = if arg == "--port" {
                match args.next() {
                    Some(value) => value.as_ref().to_string(),
                    None => return Err(KiwiError::ConfigError("--port requires a value".into())),
                }
            } else if let Some(value) = arg.strip_prefix("--port=") {
                value.to_string()
            } else {
                continue;
            };

            config.port = value
                .parse()
                .map_err(|_| KiwiError::ConfigError(format!("Invalid port: {}", value)))?;
        }

        Ok(config)
    }
}
