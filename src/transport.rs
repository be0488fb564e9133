//! Connection management for the automation service
//!
//! [`Connection`] owns one socket, connects lazily, and runs one blocking
//! request/reply exchange at a time. When an exchange fails it reconnects
//! once and resends the same request; a second failure is returned to the
//! caller.

use crate::config::ClientConfig;
use crate::error::{KiwiError, Result};
use crate::protocol::{Request, Response};
use log::{debug, info, warn};
use serde_json::Value;
use std::io::ErrorKind;
use std::net::{TcpStream, ToSocketAddrs};
use tungstenite::handshake::HandshakeError;
use tungstenite::{Message, WebSocket};

/// Opens channels to the service
pub trait Connector {
    type Channel: Channel;

    fn connect(&mut self) -> Result<Self::Channel>;
}

/// One established message channel
pub trait Channel {
    /// Send one whole text message
    fn send_text(&mut self, text: &str) -> Result<()>;

    /// Block until one whole reply message arrives
    fn recv_text(&mut self) -> Result<String>;

    /// Shut the channel down
    fn close(&mut self) -> Result<()>;
}

/// Connects over WebSocket to `ws://<host>:<port>/`
#[derive(Debug, Clone)]
pub struct WsConnector {
    config: ClientConfig,
}

impl WsConnector {
    /// Create a connector; nothing is opened until [`Connector::connect`]
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Settings used for every connection attempt
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn open_stream(&self) -> std::io::Result<TcpStream> {
        let addr = self.config.addr();
        let stream = match self.config.connect_timeout {
            Some(timeout) => {
                let socket_addr = addr.to_socket_addrs()?.next().ok_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::NotFound, "address did not resolve")
                })?;
                TcpStream::connect_timeout(&socket_addr, timeout)?
            }
            None => TcpStream::connect(&addr)?,
        };
        stream.set_read_timeout(self.config.read_timeout)?;
        stream.set_write_timeout(self.config.read_timeout)?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

impl Connector for WsConnector {
    type Channel = WsChannel;

    fn connect(&mut self) -> Result<WsChannel> {
        let url = self.config.url();
        let stream = self.open_stream().map_err(|e| {
            let addr = self.config.addr();
            KiwiError::ConnectionError(format!("Failed to connect to {}: {}", addr, e))
        })?;

        let (socket, _) = tungstenite::client(url.as_str(), stream).map_err(|e| match e {
            HandshakeError::Failure(e) => {
                let reason = format!("WebSocket handshake with {} failed: {}", url, e);
                KiwiError::ConnectionError(reason)
            }
            HandshakeError::Interrupted(_) => {
                KiwiError::ConnectionError(format!("WebSocket handshake with {} interrupted", url))
            }
        })?;

        info!("Connected to {}", url);
        Ok(WsChannel { socket })
    }
}

/// WebSocket channel over a plain TCP stream
pub struct WsChannel {
    socket: WebSocket<TcpStream>,
}

/// An expired socket timeout becomes a transport failure
fn timeout_to_transport(e: tungstenite::Error, waiting_for: &str) -> KiwiError {
    match e {
        tungstenite::Error::Io(ref io)
            if matches!(io.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
        {
            KiwiError::TransportError(format!("Timed out waiting for {}", waiting_for))
        }
        e => e.into(),
    }
}

impl Channel for WsChannel {
    fn send_text(&mut self, text: &str) -> Result<()> {
        self.socket
            .send(Message::text(text))
            .map_err(|e| timeout_to_transport(e, "request to be sent"))
    }

    fn recv_text(&mut self) -> Result<String> {
        loop {
            let message = self
                .socket
                .read()
                .map_err(|e| timeout_to_transport(e, "reply"))?;
            match message {
                Message::Text(text) => return Ok(text.to_string()),
                Message::Binary(bytes) => {
                    return String::from_utf8(bytes.to_vec()).map_err(|_| {
                        KiwiError::TransportError("Binary reply is not valid UTF-8".into())
                    })
                }
                Message::Close(_) => {
                    return Err(KiwiError::TransportError("Connection closed by server".into()))
                }
                // Pongs are queued by tungstenite itself
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        match self.socket.close(None) {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed) => {}
            Err(e) => return Err(e.into()),
        }
        match self.socket.flush() {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Lazily connected request/reply connection
///
/// Disconnected while `channel` is `None`. Dropping the connection closes the
/// socket.
pub struct Connection<C: Connector> {
    connector: C,
    channel: Option<C::Channel>,
}

impl<C: Connector> Connection<C> {
    /// Create a disconnected connection; no I/O happens until first use
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            channel: None,
        }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Whether a channel is currently open
    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    /// Establish a fresh channel, replacing any existing one
    pub fn connect(&mut self) -> Result<()> {
        self.close();
        let channel = self.connector.connect()?;
        self.channel = Some(channel);
        Ok(())
    }

    /// Send one request and wait for its reply
    ///
    /// Returns `Ok(None)` when the reply is not a valid envelope. A failed
    /// send or receive is retried once on a new connection.
    pub fn exchange(&mut self, method: &str, args: Value) -> Result<Option<Response>> {
        let request = serde_json::to_string(&Request::new(method, args))?;

        if self.channel.is_none() {
            self.connect()?;
        }

        let reply = match self.round_trip(&request) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Request '{}' failed, reconnecting: {}", method, e);
                self.discard();
                self.connect()?;
                match self.round_trip(&request) {
                    Ok(reply) => reply,
                    Err(e) => {
                        self.discard();
                        return Err(e);
                    }
                }
            }
        };

        debug!("Reply to '{}': {}", method, reply);
        Ok(Response::parse(&reply))
    }

    /// Close the channel if open; errors are logged, never returned
    pub fn close(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            if let Err(e) = channel.close() {
                warn!("Error on close: {}", e);
            }
        }
    }

    fn round_trip(&mut self, request: &str) -> Result<String> {
        let channel = self
            .channel
            .as_mut()
            .ok_or_else(|| KiwiError::TransportError("Not connected".into()))?;
        channel.send_text(request)?;
        channel.recv_text()
    }

    /// Drop a channel known to be broken
    fn discard(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            if let Err(e) = channel.close() {
                debug!("Ignoring close error on broken channel: {}", e);
            }
        }
    }
}

impl<C: Connector> Drop for Connection<C> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted connector for tests

    use super::{Channel, Connector};
    use crate::error::{KiwiError, Result};
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Event {
        Connect,
        Sent(Value),
        Slept(Duration),
        Close,
    }

    enum Step {
        Reply(String),
        FailSend,
        FailRecv,
    }

    #[derive(Default)]
    struct State {
        steps: VecDeque<Step>,
        events: Vec<Event>,
        refused_connects: usize,
        failing_closes: usize,
    }

    /// Shared script driving every channel the fake connector opens
    #[derive(Clone, Default)]
    pub(crate) struct Script(Arc<Mutex<State>>);

    impl Script {
        pub(crate) fn reply(&self, text: &str) -> &Self {
            self.push(Step::Reply(text.to_string()))
        }

        pub(crate) fn ok(&self, data: Value) -> &Self {
            let text = json!({"status": "success", "message": "ok", "data": data});
            self.reply(&text.to_string())
        }

        pub(crate) fn fail_send(&self) -> &Self {
            self.push(Step::FailSend)
        }

        pub(crate) fn fail_recv(&self) -> &Self {
            self.push(Step::FailRecv)
        }

        pub(crate) fn refuse_connects(&self, count: usize) -> &Self {
            self.0.lock().unwrap().refused_connects = count;
            self
        }

        /// Make the next `count` channel closes fail after recording them
        pub(crate) fn fail_closes(&self, count: usize) -> &Self {
            self.0.lock().unwrap().failing_closes = count;
            self
        }

        pub(crate) fn record(&self, event: Event) {
            self.0.lock().unwrap().events.push(event);
        }

        pub(crate) fn events(&self) -> Vec<Event> {
            self.0.lock().unwrap().events.clone()
        }

        pub(crate) fn sent(&self) -> Vec<Value> {
            self.events()
                .into_iter()
                .filter_map(|event| match event {
                    Event::Sent(value) => Some(value),
                    _ => None,
                })
                .collect()
        }

        pub(crate) fn count(&self, wanted: &Event) -> usize {
            self.events().iter().filter(|event| *event == wanted).count()
        }

        pub(crate) fn connector(&self) -> FakeConnector {
            FakeConnector {
                script: self.clone(),
            }
        }

        fn push(&self, step: Step) -> &Self {
            self.0.lock().unwrap().steps.push_back(step);
            self
        }
    }

    pub(crate) struct FakeConnector {
        script: Script,
    }

    impl Connector for FakeConnector {
        type Channel = FakeChannel;

        fn connect(&mut self) -> Result<FakeChannel> {
            let mut state = self.script.0.lock().unwrap();
            if state.refused_connects > 0 {
                state.refused_connects -= 1;
                return Err(KiwiError::ConnectionError("connection refused".into()));
            }
            state.events.push(Event::Connect);
            Ok(FakeChannel {
                script: self.script.clone(),
            })
        }
    }

    pub(crate) struct FakeChannel {
        script: Script,
    }

    impl Channel for FakeChannel {
        fn send_text(&mut self, text: &str) -> Result<()> {
            let mut state = self.script.0.lock().unwrap();
            let value = serde_json::from_str(text).expect("request is JSON");
            state.events.push(Event::Sent(value));
            if matches!(state.steps.front(), Some(Step::FailSend)) {
                state.steps.pop_front();
                return Err(KiwiError::TransportError("broken pipe".into()));
            }
            Ok(())
        }

        fn recv_text(&mut self) -> Result<String> {
            let mut state = self.script.0.lock().unwrap();
            match state.steps.pop_front() {
                Some(Step::Reply(text)) => Ok(text),
                Some(Step::FailRecv) => Err(KiwiError::TransportError("connection reset".into())),
                Some(Step::FailSend) | None => {
                    Err(KiwiError::TransportError("no scripted reply".into()))
                }
            }
        }

        fn close(&mut self) -> Result<()> {
            let mut state = self.script.0.lock().unwrap();
            state.events.push(Event::Close);
            if state.failing_closes > 0 {
                state.failing_closes -= 1;
                return Err(KiwiError::TransportError("close handshake failed".into()));
            }
            Ok(())
        }
    }
}
