//! BusPublisher - newline-delimited JSON over TCP to the bus gateway

use contracts::{BusConfig, ContractError, NagiosCommand, Publisher};
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

/// Configuration for BusPublisher
#[derive(Debug, Clone)]
pub struct BusPublisherConfig {
    /// Gateway `host:port`
    pub addr: String,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Log every payload written to the socket
    pub trace_wire: bool,
}

impl BusPublisherConfig {
    pub fn from_settings(bus: &BusConfig, trace_wire: bool) -> Self {
        Self {
            addr: bus.addr.clone(),
            connect_timeout: Duration::from_secs(bus.connect_timeout_secs),
            trace_wire,
        }
    }
}

/// Publisher writing one JSON object per line to a TCP stream
pub struct BusPublisher {
    name: String,
    config: BusPublisherConfig,
    stream: Option<BufWriter<TcpStream>>,
}

impl BusPublisher {
    /// Connect to the gateway
    #[instrument(
        name = "bus_publisher_connect",
        skip(name, config),
        fields(addr = %config.addr)
    )]
    pub async fn connect(
        name: impl Into<String>,
        config: BusPublisherConfig,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let stream = timeout(config.connect_timeout, TcpStream::connect(&config.addr))
            .await
            .map_err(|_| {
                ContractError::bus_connection(
                    &name,
                    format!(
                        "timed out after {}s connecting to {}",
                        config.connect_timeout.as_secs(),
                        config.addr
                    ),
                )
            })?
            .map_err(|e| ContractError::bus_connection(&name, format!("{}: {e}", config.addr)))?;

        if let Err(e) = stream.set_nodelay(true) {
            warn!(publisher = %name, error = %e, "Could not disable Nagle on bus socket");
        }

        debug!(publisher = %name, target = %config.addr, "BusPublisher connected");

        Ok(Self {
            name,
            config,
            stream: Some(BufWriter::new(stream)),
        })
    }

    /// Whether the socket is still open
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn encode(&self, command: &NagiosCommand) -> Result<Vec<u8>, ContractError> {
        let mut payload = serde_json::to_vec(command)
            .map_err(|e| ContractError::delivery(&self.name, format!("json error: {e}")))?;
        payload.push(b'\n');
        Ok(payload)
    }
}

impl Publisher for BusPublisher {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "bus_publisher_write",
        skip(self, command),
        fields(publisher = %self.name, cmdname = %command.cmdname)
    )]
    async fn write(&mut self, command: &NagiosCommand) -> Result<(), ContractError> {
        let payload = self.encode(command)?;
        if self.config.trace_wire {
            debug!(
                publisher = %self.name,
                payload = %String::from_utf8_lossy(&payload).trim_end(),
                "wire >>"
            );
        }

        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| ContractError::delivery(&self.name, "not connected"))?;
        stream
            .write_all(&payload)
            .await
            .map_err(|e| ContractError::delivery(&self.name, e.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|e| ContractError::delivery(&self.name, e.to_string()))?;
        Ok(())
    }

    #[instrument(name = "bus_publisher_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        if let Some(mut stream) = self.stream.take() {
            stream
                .shutdown()
                .await
                .map_err(|e| ContractError::bus_connection(&self.name, e.to_string()))?;
        }
        debug!(publisher = %self.name, "BusPublisher closed");
        Ok(())
    }
}
