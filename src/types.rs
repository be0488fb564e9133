//! Common types for the kiwi client

use crate::error::KiwiError;
use crate::node::{FromNode, Node, ToWire};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Screen coordinate, absolute or relative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a point from its coordinates
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl ToWire for Point {
    fn to_wire(&self) -> Value {
        json!({ "x": self.x, "y": self.y })
    }
}

impl FromNode for Point {
    fn from_node(node: Option<&Node>) -> Option<Self> {
        let node = node?.present()?;
        Some(Self {
            x: node.get("x")?.as_i32()?,
            y: node.get("y")?.as_i32()?,
        })
    }
}

/// A point tagged with a hex color sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColoredPoint {
    pub point: Point,
    pub hex: String,
}

impl ColoredPoint {
    pub fn new(point: Point, hex: impl Into<String>) -> Self {
        Self {
            point,
            hex: hex.into(),
        }
    }
}

impl ToWire for ColoredPoint {
    fn to_wire(&self) -> Value {
        json!({ "point": self.point.to_wire(), "hex": self.hex })
    }
}

impl FromNode for ColoredPoint {
    fn from_node(node: Option<&Node>) -> Option<Self> {
        let node = node?.present()?;
        Some(Self {
            point: Point::from_node(node.get("point"))?,
            hex: node.get("hex")?.as_str()?.to_owned(),
        })
    }
}

/// Color sample at an offset from a vertex point
///
/// Same shape as [`ColoredPoint`], but `point` is relative to the vertex
/// matched by `find_relative_colors`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativePoint {
    pub point: Point,
    pub hex: String,
}

impl RelativePoint {
    pub fn new(point: Point, hex: impl Into<String>) -> Self {
        Self {
            point,
            hex: hex.into(),
        }
    }
}

impl ToWire for RelativePoint {
    fn to_wire(&self) -> Value {
        json!({ "point": self.point.to_wire(), "hex": self.hex })
    }
}

impl FromNode for RelativePoint {
    fn from_node(node: Option<&Node>) -> Option<Self> {
        let node = node?.present()?;
        Some(Self {
            point: Point::from_node(node.get("point"))?,
            hex: node.get("hex")?.as_str()?.to_owned(),
        })
    }
}

/// Per-channel color tolerance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbOffset {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbOffset {
    /// Create a tolerance from per-channel offsets
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl ToWire for RgbOffset {
    fn to_wire(&self) -> Value {
        json!({ "r": self.r, "g": self.g, "b": self.b })
    }
}

impl FromNode for RgbOffset {
    fn from_node(node: Option<&Node>) -> Option<Self> {
        let node = node?.present()?;
        let channel = |name: &str| {
            node.get(name)
                .and_then(Node::as_i64)
                .and_then(|v| u8::try_from(v).ok())
        };
        Some(Self {
            r: channel("r")?,
            g: channel("g")?,
            b: channel("b")?,
        })
    }
}

/// Image match location with its confidence score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightPoint {
    pub point: Point,
    pub weight: f64,
}

impl WeightPoint {
    /// Create a match from its location and score
    pub fn new(point: Point, weight: f64) -> Self {
        Self { point, weight }
    }
}

impl ToWire for WeightPoint {
    fn to_wire(&self) -> Value {
        json!({ "point": self.point.to_wire(), "weight": self.weight })
    }
}

impl FromNode for WeightPoint {
    fn from_node(node: Option<&Node>) -> Option<Self> {
        let node = node?.present()?;
        Some(Self {
            point: Point::from_node(node.get("point"))?,
            weight: node.get("weight")?.as_f64()?,
        })
    }
}

macro_rules! keys {
    ($($key:ident),+ $(,)?) => {
        /// Symbolic key names understood by the automation service
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Key {
            $($key),+
        }

        impl Key {
            /// Every supported key
            pub const ALL: &'static [Key] = &[$(Key::$key),+];

            /// Name of the key on the wire
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Key::$key => stringify!($key)),+
                }
            }
        }
    };
}

keys! {
    Alt, Backspace, CapsLock, Control, Delete, DownArrow, End, Escape,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10,
    F11, F12, F13, F14, F15, F16, F17, F18, F19, F20,
    Home, LeftArrow, Meta, PageDown, PageUp, Return, RightArrow, Shift, Space, Tab, UpArrow,
    LeftBracket, RightBracket,
    Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9, Num0,
    Minus, Equal,
    Q, W, E, R, T, Y, U, I, O, P,
    A, S, D, F, G, H, J, K, L,
    Z, X, C, V, B, N, M,
    SemiColon, Quote, BackSlash, Comma, Dot, Slash,
    KpMinus, KpPlus, KpMultiply, KpDivide,
    Kp0, Kp1, Kp2, Kp3, Kp4, Kp5, Kp6, Kp7, Kp8, Kp9, KpDelete,
    BackQuote, Insert, PrintScreen, ScrollLock, Pause, NumLock,
}

impl Key {
    fn from_name(name: &str) -> Option<Key> {
        Key::ALL.iter().copied().find(|key| key.as_str() == name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Key {
    type Err = KiwiError;

    /// Parse a canonical key name; single letters and digits are also accepted
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(key) = Key::from_name(s) {
            return Ok(key);
        }

        let mut chars = s.chars();
        let shorthand = match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => {
                Key::from_name(&c.to_ascii_uppercase().to_string())
            }
            (Some(c), None) if c.is_ascii_digit() => Key::from_name(&format!("Num{}", c)),
            _ => None,
        };

        shorthand.ok_or_else(|| KiwiError::InvalidKey(s.to_string()))
    }
}

impl ToWire for Key {
    fn to_wire(&self) -> Value {
        Value::String(self.as_str().to_string())
    }
}
