//! Owned JSON document tree
//!
//! The converter works on a read-only [`Node`] tree. Object properties keep
//! document order, which is what makes column order and row numbering
//! reproducible from one run to the next.

use crate::naming::{format_number, DEFAULT_PRECISION};
use serde::de::{self, Deserialize, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::Value;
use std::fmt;

/// Deepest container nesting accepted when parsing.
///
/// Every later stage walks the tree recursively, so deeper documents are
/// rejected as a parse error instead of exhausting the stack.
pub const MAX_DEPTH: usize = 256;

/// A parsed JSON value
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Object(Vec<(String, Node)>),
    Array(Vec<Node>),
    String(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl Node {
    /// Objects and arrays; everything else is a scalar
    pub fn is_container(&self) -> bool {
        matches!(self, Node::Object(_) | Node::Array(_))
    }

    pub fn as_object(&self) -> Option<&[(String, Node)]> {
        match self {
            Node::Object(props) => Some(props),
            _ => None,
        }
    }

    /// Pretty-print the tree for debugging (`--print-ast`)
    pub fn render(&self) -> String {
        let mut out = String::new();
        render_node(self, 0, &mut out);
        out
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Parse a single JSON document.
///
/// Uses simd-json's serde bridge; the buffer is used as scratch space and
/// its contents are unspecified afterwards. Nesting deeper than
/// [`MAX_DEPTH`] fails like any other malformed input.
pub fn parse_document(bytes: &mut [u8]) -> Result<Node, simd_json::Error> {
    simd_json::serde::from_slice(bytes)
}

/// Insert with last-write-wins semantics, keeping the first key's position
fn insert_property(props: &mut Vec<(String, Node)>, key: String, value: Node) {
    match props.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => props.push((key, value)),
    }
}

/// Deserializes one value sitting `depth` containers below the root
#[derive(Clone, Copy)]
struct NodeSeed {
    depth: usize,
}

impl NodeSeed {
    fn child(self) -> NodeSeed {
        NodeSeed {
            depth: self.depth + 1,
        }
    }

    fn check_depth<E: de::Error>(self) -> Result<(), E> {
        if self.depth >= MAX_DEPTH {
            return Err(E::custom(format_args!(
                "nesting exceeds the maximum depth of {}",
                MAX_DEPTH
            )));
        }
        Ok(())
    }
}

impl<'de> DeserializeSeed<'de> for NodeSeed {
    type Value = Node;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for NodeSeed {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        Ok(Node::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        Ok(Node::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
        Ok(Node::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        self.deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        self.check_depth()?;

        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element_seed(self.child())? {
            items.push(item);
        }
        Ok(Node::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Node, A::Error> {
        self.check_depth()?;

        let mut props = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(key) = map.next_key::<String>()? {
            let value = map.next_value_seed(self.child())?;
            insert_property(&mut props, key, value);
        }
        Ok(Node::Object(props))
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Node, D::Error> {
        NodeSeed { depth: 0 }.deserialize(deserializer)
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                Node::Object(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
            Value::Array(items) => Node::Array(items.into_iter().map(Node::from).collect()),
            Value::String(s) => Node::String(s),
            // Every finite JSON number is representable as f64 (possibly rounded)
            Value::Number(n) => Node::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::Bool(b) => Node::Bool(b),
            Value::Null => Node::Null,
        }
    }
}

fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn push_escaped(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn render_node(node: &Node, level: usize, out: &mut String) {
    match node {
        Node::Object(props) => {
            out.push_str("{\n");
            for (i, (key, value)) in props.iter().enumerate() {
                push_indent(out, level + 1);
                push_escaped(out, key);
                out.push_str(": ");
                render_node(value, level + 1, out);
                if i + 1 < props.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, level);
            out.push('}');
        }
        Node::Array(items) => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                push_indent(out, level + 1);
                render_node(item, level + 1, out);
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, level);
            out.push(']');
        }
        Node::String(s) => push_escaped(out, s),
        Node::Number(n) => out.push_str(&format_number(*n, DEFAULT_PRECISION)),
        Node::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Node::Null => out.push_str("null"),
    }
}
