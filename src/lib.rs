//! kiwi - client for the kiwi screen automation service
//!
//! The service runs on the local machine and exposes mouse, keyboard and
//! screen queries (image matching, color search, OCR) over a WebSocket at
//! `ws://127.0.0.1:9927/`. This crate speaks its JSON request/reply protocol
//! and maps replies into typed values.
//!
//! # Example
//!
//! ```rust,no_run
//! use kiwi::{ClientConfig, Point, ScreenClient};
//!
//! fn main() -> kiwi::Result<()> {
//!     let mut client = ScreenClient::new(ClientConfig::default())?;
//!
//!     if let Some(response) = client.get_mouse_location()? {
//!         if let Some(point) = response.data {
//!             println!("mouse at ({}, {})", point.x, point.y);
//!         }
//!     }
//!
//!     client.move_absolute(Point::new(100, 200))?;
//!     client.click_left()?;
//!     client.input_text("Hello from kiwi!")?;
//!     client.input_select_all()?;
//!     client.input_copy()?;
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod node;
pub mod protocol;
pub mod system;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use client::ScreenClient;
pub use config::ClientConfig;
pub use error::{KiwiError, Result};
pub use node::{FromNode, Node, ToWire};
pub use protocol::{Response, Status, DEFAULT_PORT};
pub use system::{modifier_for_copy_paste, HostOs};
pub use transport::{Channel, Connection, Connector, WsConnector};
pub use types::{ColoredPoint, Key, Point, RelativePoint, RgbOffset, WeightPoint};
