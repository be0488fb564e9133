//! Command façade for the automation service

use crate::config::ClientConfig;
use crate::error::Result;
use crate::node::{FromNode, Node, ToWire};
use crate::protocol::Response;
use crate::system::{modifier_for_copy_paste, sleep_ms, HostOs};
use crate::transport::{Connection, Connector, WsConnector};
use crate::types::{ColoredPoint, Key, Point, RelativePoint, RgbOffset, WeightPoint};
use log::debug;
use serde_json::{json, Value};
use std::time::Duration;

/// Pause between the steps of a keyboard shortcut
const SHORTCUT_STEP_DELAY: Duration = Duration::from_millis(20);

type Sleeper = Box<dyn Fn(Duration) + Send + Sync>;

/// Screen automation client
///
/// Every method performs one blocking exchange (composite shortcuts perform
/// three). `Ok(None)` means the service answered with something that is not a
/// valid envelope.
pub struct ScreenClient<C: Connector = WsConnector> {
    conn: Connection<C>,
    os: HostOs,
    sleeper: Sleeper,
}

impl ScreenClient<WsConnector> {
    /// Connect to the service right away
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut client = Self::connect_with(config);
        client.conn.connect()?;
        Ok(client)
    }

    /// Create a client that connects on first use
    pub fn connect_with(config: ClientConfig) -> Self {
        Self::with_connector(WsConnector::new(config))
    }
}

impl<C: Connector> ScreenClient<C> {
    /// Create a lazily connected client over any connector
    pub fn with_connector(connector: C) -> Self {
        Self {
            conn: Connection::new(connector),
            os: HostOs::current(),
            sleeper: Box::new(|delay: Duration| {
                sleep_ms(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX))
            }),
        }
    }

    /// Override the detected host OS (picks the shortcut modifier)
    pub fn with_host_os(mut self, os: HostOs) -> Self {
        self.os = os;
        self
    }

    /// Override how the client waits between shortcut steps
    pub fn with_sleeper(mut self, sleeper: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Whether a socket is currently open
    pub fn is_connected(&self) -> bool {
        self.conn.is_connected()
    }

    /// Release the socket; safe to call repeatedly
    pub fn close(&mut self) {
        self.conn.close();
    }

    fn call(&mut self, method: &str, args: Value) -> Result<Option<Response>> {
        debug!("Calling '{}'", method);
        self.conn.exchange(method, args)
    }

    fn call_one<T: FromNode>(&mut self, method: &str, args: Value) -> Result<Option<Response<T>>> {
        Ok(self
            .call(method, args)?
            .map(|response| response.map(|data| T::from_node(data.as_ref()))))
    }

    fn call_many<T: FromNode>(
        &mut self,
        method: &str,
        args: Value,
    ) -> Result<Option<Response<Vec<T>>>> {
        Ok(self
            .call(method, args)?
            .map(|response| response.map(|data| Some(T::from_node_sequence(data.as_ref())))))
    }

    /// Best match of a template image inside a screen region
    pub fn find_image(
        &mut self,
        subpath: &str,
        start_point: Point,
        end_point: Point,
        threshold: f64,
    ) -> Result<Option<Response<WeightPoint>>> {
        let args = json!({
            "subpath": subpath,
            "start_point": start_point.to_wire(),
            "end_point": end_point.to_wire(),
            "threshold": threshold,
        });
        self.call_one("find_image", args)
    }

    /// Every match of a template image inside a screen region
    pub fn find_images(
        &mut self,
        subpath: &str,
        start_point: Point,
        end_point: Point,
        threshold: f64,
    ) -> Result<Option<Response<Vec<WeightPoint>>>> {
        let args = json!({
            "subpath": subpath,
            "start_point": start_point.to_wire(),
            "end_point": end_point.to_wire(),
            "threshold": threshold,
        });
        self.call_many("find_images", args)
    }

    /// Locate a vertex color whose surrounding offsets match `relative_points`
    pub fn find_relative_colors(
        &mut self,
        vertex_hex: &str,
        relative_points: &[RelativePoint],
        start_point: Point,
        end_point: Point,
        rgb_offset: RgbOffset,
    ) -> Result<Option<Response<ColoredPoint>>> {
        let args = json!({
            "vertex_hex": vertex_hex,
            "relative_points": relative_points.iter().map(ToWire::to_wire).collect::<Vec<_>>(),
            "start_point": start_point.to_wire(),
            "end_point": end_point.to_wire(),
            "rgb_offset": rgb_offset.to_wire(),
        });
        self.call_one("find_relative_colors", args)
    }

    /// Points in a region matching any of the given colors
    pub fn find_colors<S: AsRef<str>>(
        &mut self,
        hex_colors: &[S],
        start_point: Point,
        end_point: Point,
        rgb_offset: RgbOffset,
    ) -> Result<Option<Response<Vec<ColoredPoint>>>> {
        let args = json!({
            "hex_colors": hex_colors.iter().map(AsRef::<str>::as_ref).collect::<Vec<&str>>(),
            "start_point": start_point.to_wire(),
            "end_point": end_point.to_wire(),
            "rgb_offset": rgb_offset.to_wire(),
        });
        self.call_many("find_colors", args)
    }

    /// OCR over a screen region
    pub fn recognize_text(
        &mut self,
        start_point: Point,
        end_point: Point,
    ) -> Result<Option<Response<String>>> {
        let args = json!({
            "start_point": start_point.to_wire(),
            "end_point": end_point.to_wire(),
        });
        self.call_one("recognize_text", args)
    }

    /// Save the current frame on the service host
    pub fn save_frame(&mut self, path: &str) -> Result<Option<Response<bool>>> {
        self.call_one("save_frame", json!({ "path": path }))
    }

    /// Current pointer position
    pub fn get_mouse_location(&mut self) -> Result<Option<Response<Point>>> {
        self.call_one("get_mouse_location", json!({}))
    }

    /// Probe whether the service is answering
    pub fn health_check(&mut self) -> Result<bool> {
        let healthy = self.call("health_check", json!({}))?.is_some_and(|response| {
            response
                .data
                .as_ref()
                .and_then(|data| data.get("health"))
                .and_then(Node::as_str)
                == Some("ok")
        });
        Ok(healthy)
    }

    /// Click the left mouse button
    pub fn click_left(&mut self) -> Result<Option<Response>> {
        self.call("click_left", json!({}))
    }

    /// Click the right mouse button
    pub fn click_right(&mut self) -> Result<Option<Response>> {
        self.call("click_right", json!({}))
    }

    /// Hold the left mouse button down
    pub fn press_left(&mut self) -> Result<Option<Response>> {
        self.call("press_left", json!({}))
    }

    /// Hold the right mouse button down
    pub fn press_right(&mut self) -> Result<Option<Response>> {
        self.call("press_right", json!({}))
    }

    /// Release the left mouse button
    pub fn release_left(&mut self) -> Result<Option<Response>> {
        self.call("release_left", json!({}))
    }

    /// Release the right mouse button
    pub fn release_right(&mut self) -> Result<Option<Response>> {
        self.call("release_right", json!({}))
    }

    /// Move the pointer to a screen position
    pub fn move_absolute(&mut self, absolute_point: Point) -> Result<Option<Response>> {
        self.call("move_absolute", json!({ "absolute_point": absolute_point.to_wire() }))
    }

    /// Move the pointer by an offset
    pub fn move_relative(&mut self, offset: Point) -> Result<Option<Response>> {
        self.call("move_relative", json!({ "offset": offset.to_wire() }))
    }

    /// Scroll vertically by `length` steps
    pub fn scroll_vertical(&mut self, length: i32) -> Result<Option<Response>> {
        self.call("scroll_vertical", json!({ "length": length }))
    }

    /// Scroll horizontally by `length` steps
    pub fn scroll_horizontal(&mut self, length: i32) -> Result<Option<Response>> {
        self.call("scroll_horizontal", json!({ "length": length }))
    }

    /// Hold a key down
    pub fn press_key(&mut self, key: Key) -> Result<Option<Response>> {
        self.call("press_key", json!({ "key": key.to_wire() }))
    }

    /// Release a held key
    pub fn release_key(&mut self, key: Key) -> Result<Option<Response>> {
        self.call("release_key", json!({ "key": key.to_wire() }))
    }

    /// Press and release a key
    pub fn click_key(&mut self, key: Key) -> Result<Option<Response>> {
        self.call("click_key", json!({ "key": key.to_wire() }))
    }

    /// Type a string
    pub fn input_text(&mut self, text: &str) -> Result<Option<Response>> {
        self.call("input_text", json!({ "text": text }))
    }

    /// Copy shortcut (modifier + C)
    pub fn input_copy(&mut self) -> Result<()> {
        self.shortcut(Key::C)
    }

    /// Paste shortcut (modifier + V)
    pub fn input_paste(&mut self) -> Result<()> {
        self.shortcut(Key::V)
    }

    /// Cut shortcut (modifier + X)
    pub fn input_cut(&mut self) -> Result<()> {
        self.shortcut(Key::X)
    }

    /// Select-all shortcut (modifier + A)
    pub fn input_select_all(&mut self) -> Result<()> {
        self.shortcut(Key::A)
    }

    /// modifier down, letter click, modifier up
    fn shortcut(&mut self, letter: Key) -> Result<()> {
        let modifier = modifier_for_copy_paste(self.os);
        self.press_key(modifier)?;
        (self.sleeper)(SHORTCUT_STEP_DELAY);
        self.click_key(letter)?;
        (self.sleeper)(SHORTCUT_STEP_DELAY);
        self.release_key(modifier)?;
        Ok(())
    }
}
