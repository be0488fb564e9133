//! Wire protocol for the automation service

use crate::node::{Node, ToWire};
use log::warn;
use serde::Serialize;
use serde_json::{json, Value};

/// Default service port
pub const DEFAULT_PORT: u16 = 9927;

/// The service only listens on loopback
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Request sent from client to service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    pub method: String,
    pub args: Value,
}

impl Request {
    pub fn new(method: impl Into<String>, args: Value) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }
}

/// Outcome reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
}

impl Status {
    /// Wire spelling of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Error => "error",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Status::Success),
            "error" => Some(Status::Error),
            _ => None,
        }
    }
}

/// Envelope every request resolves to
///
/// `data` stays an untyped [`Node`] until the command that issued the
/// request maps it with [`Response::map`].
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T = Node> {
    pub status: Status,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Response<T> {
    /// Whether the service reported success
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// Replace the payload, keeping status and message
    pub fn map<U>(self, f: impl FnOnce(Option<T>) -> Option<U>) -> Response<U> {
        Response {
            status: self.status,
            message: self.message,
            data: f(self.data),
        }
    }
}

impl Response<Node> {
    /// Decode a reply message
    ///
    /// Returns `None` for empty text, invalid JSON, or an object missing any
    /// of `status`, `message` and `data`. Null values still count as present.
    pub fn parse(text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            warn!("Empty reply from service");
            return None;
        }

        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                warn!("JSON decode error: {}", e);
                return None;
            }
        };

        let Value::Object(mut fields) = value else {
            warn!("Reply is not a JSON object");
            return None;
        };

        if !["status", "message", "data"]
            .iter()
            .all(|key| fields.contains_key(*key))
        {
            warn!("Reply missing required keys");
            return None;
        }

        let status = match fields.get("status").and_then(Value::as_str).and_then(Status::parse) {
            Some(status) => status,
            None => {
                warn!("Reply has invalid status: {}", fields["status"]);
                return None;
            }
        };

        let message = fields
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned);

        let data = fields
            .remove("data")
            .map(Node::from)
            .filter(|node| !node.is_null());

        Some(Self {
            status,
            message,
            data,
        })
    }
}

impl<T: ToWire> ToWire for Response<T> {
    fn to_wire(&self) -> Value {
        json!({
            "status": self.status.as_str(),
            "message": self.message,
            "data": self.data.as_ref().map(ToWire::to_wire),
        })
    }
}
