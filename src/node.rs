//! Normalized reply payloads
//!
//! Replies arrive as arbitrary JSON. [`Node`] turns that into a tree of
//! mappings, sequences and scalars with typed accessors, so mappers can walk
//! `node.get("point")?.get("x")?.as_i32()` instead of re-indexing raw JSON.

use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Leaf value of a normalized payload
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// Normalized payload tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Named fields
    Map(BTreeMap<String, Node>),
    /// Ordered elements
    Seq(Vec<Node>),
    /// Anything else
    Scalar(Scalar),
}

/// Normalize a decoded wire value
pub fn normalize(value: Value) -> Node {
    Node::from(value)
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                Node::Map(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
            Value::Array(items) => Node::Seq(items.into_iter().map(Node::from).collect()),
            Value::Null => Node::Scalar(Scalar::Null),
            Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Node::Scalar(Scalar::Number(n)),
            Value::String(s) => Node::Scalar(Scalar::String(s)),
        }
    }
}

impl Node {
    /// The null scalar
    pub fn null() -> Self {
        Node::Scalar(Scalar::Null)
    }

    /// Whether this is the null scalar
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Scalar(Scalar::Null))
    }

    /// `None` for a null node, the node itself otherwise
    pub fn present(&self) -> Option<&Node> {
        if self.is_null() {
            None
        } else {
            Some(self)
        }
    }

    /// Field of a mapping node
    pub fn get(&self, name: &str) -> Option<&Node> {
        match self {
            Node::Map(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Element of a sequence node
    pub fn at(&self, index: usize) -> Option<&Node> {
        self.as_seq().and_then(|items| items.get(index))
    }

    /// Fields of a mapping node
    pub fn as_map(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Map(fields) => Some(fields),
            _ => None,
        }
    }

    /// Elements of a sequence node
    pub fn as_seq(&self) -> Option<&[Node]> {
        match self {
            Node::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Boolean scalar
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Integer scalar; fractional numbers give `None`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Scalar(Scalar::Number(n)) => n.as_i64(),
            _ => None,
        }
    }

    /// Integer scalar that fits in `i32`
    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().and_then(|n| i32::try_from(n).ok())
    }

    /// Any numeric scalar as a float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Scalar(Scalar::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    /// String scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }
}

/// Conversion into the generic wire representation
pub trait ToWire {
    /// Plain JSON form with field names as keys
    fn to_wire(&self) -> Value;
}

/// Reconstruction from a normalized reply node
pub trait FromNode: Sized {
    /// Build one value; absent or null input gives `None`
    fn from_node(node: Option<&Node>) -> Option<Self>;

    /// Build a list, dropping absent elements
    ///
    /// An absent or non-sequence input gives an empty list.
    fn from_node_sequence(nodes: Option<&Node>) -> Vec<Self> {
        nodes
            .and_then(Node::as_seq)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| Self::from_node(item.present()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl ToWire for Node {
    fn to_wire(&self) -> Value {
        match self {
            Node::Map(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_wire()))
                    .collect::<Map<String, Value>>(),
            ),
            Node::Seq(items) => Value::Array(items.iter().map(ToWire::to_wire).collect()),
            Node::Scalar(Scalar::Null) => Value::Null,
            Node::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            Node::Scalar(Scalar::Number(n)) => Value::Number(n.clone()),
            Node::Scalar(Scalar::String(s)) => Value::String(s.clone()),
        }
    }
}

impl FromNode for String {
    fn from_node(node: Option<&Node>) -> Option<Self> {
        node?.as_str().map(str::to_owned)
    }
}

impl FromNode for bool {
    fn from_node(node: Option<&Node>) -> Option<Self> {
        node?.as_bool()
    }
}
