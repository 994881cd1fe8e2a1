//! Transport-neutral property serialization
//!
//! A property value is turned into a tagged form: a scalar becomes
//! `value` with its text form, a single reference becomes `reference`
//! with the target id, and a collection becomes `collection` with the
//! serialized members. Deserializing needs a lookup function that maps
//! the stored ids to nodes of the destination model.

use std::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::model::{Node, NodeId, PropertyValue};

/// The tagged transport form of a property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "(String, serde_json::Value)", into = "(String, serde_json::Value)")]
pub enum Serialized {
    Value(String),
    Reference(NodeId),
    Collection(Vec<Serialized>),
}

impl Serialized {
    pub fn tag(&self) -> &'static str {
        match self {
            Serialized::Value(_) => "value",
            Serialized::Reference(_) => "reference",
            Serialized::Collection(_) => "collection",
        }
    }
}

impl TryFrom<(String, serde_json::Value)> for Serialized {
    type Error = String;

    fn try_from((tag, payload): (String, serde_json::Value)) -> Result<Self, Self::Error> {
        match tag.as_str() {
            "value" => match payload {
                serde_json::Value::String(s) => Ok(Serialized::Value(s)),
                other => Err(format!("value payload must be a string, got {}", other)),
            },
            "reference" => serde_json::from_value(payload)
                .map(Serialized::Reference)
                .map_err(|e| format!("reference payload: {}", e)),
            "collection" => serde_json::from_value(payload)
                .map(Serialized::Collection)
                .map_err(|e| format!("collection payload: {}", e)),
            other => Err(format!("unrecognized tag {:?}", other)),
        }
    }
}

impl From<Serialized> for (String, serde_json::Value) {
    fn from(value: Serialized) -> Self {
        let tag = value.tag().to_string();
        let payload = match value {
            Serialized::Value(s) => serde_json::Value::String(s),
            Serialized::Reference(id) => serde_json::Value::from(id.0),
            Serialized::Collection(items) => serde_json::Value::Array(
                items
                    .into_iter()
                    .map(|item| {
                        let (tag, payload): (String, serde_json::Value) = item.into();
                        serde_json::json!([tag, payload])
                    })
                    .collect(),
            ),
        };
        (tag, payload)
    }
}

/// A deserialized value, ready to be loaded into a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Node(NodeId),
    Value(String),
}

/// Serialized properties of one node, in save order.
pub type PropertyData = Vec<(&'static str, Serialized)>;

pub fn serialize(value: &PropertyValue) -> Serialized {
    match value {
        PropertyValue::Ref(id) => Serialized::Reference(*id),
        PropertyValue::Collection(ids) => {
            Serialized::Collection(ids.iter().map(|id| Serialized::Reference(*id)).collect())
        }
        PropertyValue::Str(s) => Serialized::Value(s.clone()),
        PropertyValue::Int(i) => Serialized::Value(i.to_string()),
        // Booleans travel as integers so they never read back as free text.
        PropertyValue::Bool(b) => Serialized::Value(i64::from(*b).to_string()),
        PropertyValue::Unlimited => Serialized::Value("*".to_string()),
    }
}

/// Resolve a serialized value against a destination model.
///
/// A reference whose id does not resolve is dropped, not reported: a
/// partially copied subgraph is a normal input.
pub fn deserialize(ser: &Serialized, lookup: &mut dyn FnMut(NodeId) -> Option<NodeId>) -> Vec<Resolved> {
    let mut out = Vec::new();
    let Ok(()) = deserialize_into::<Infallible>(ser, &mut |id| Ok(lookup(id)), &mut out);
    out
}

/// Like [`deserialize`], for lookups that can fail outright.
pub fn try_deserialize<E>(
    ser: &Serialized,
    lookup: &mut dyn FnMut(NodeId) -> Result<Option<NodeId>, E>,
) -> Result<Vec<Resolved>, E> {
    let mut out = Vec::new();
    deserialize_into(ser, lookup, &mut out)?;
    Ok(out)
}

fn deserialize_into<E>(
    ser: &Serialized,
    lookup: &mut dyn FnMut(NodeId) -> Result<Option<NodeId>, E>,
    out: &mut Vec<Resolved>,
) -> Result<(), E> {
    match ser {
        Serialized::Reference(id) => match lookup(*id)? {
            Some(resolved) => out.push(Resolved::Node(resolved)),
            None => tracing::trace!("dropping unresolved reference {}", id),
        },
        Serialized::Collection(items) => {
            for item in items {
                deserialize_into(item, lookup, out)?;
            }
        }
        Serialized::Value(text) => out.push(Resolved::Value(text.clone())),
    }
    Ok(())
}

/// Serialize every saved property of `node` except the excluded ones.
pub fn copy_base_data(node: &Node, excluded: &[&str]) -> PropertyData {
    node.save()
        .into_iter()
        .filter(|(name, _)| !excluded.contains(name))
        .map(|(name, value)| (name, serialize(&value)))
        .collect()
}
