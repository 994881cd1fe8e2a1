//! Change records and their node form

use std::fmt;

use serde::{Deserialize, Serialize};

use plait_core::lang::builtin::{ELEMENT_CHANGE, REF_CHANGE, VALUE_CHANGE};
use plait_core::{ElementType, ModelStore, Node, NodeId, PropertyValue, ScalarType};

use crate::error::{ChangesetError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Add,
    Remove,
    Update,
}

impl Op {
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Add => "add",
            Op::Remove => "remove",
            Op::Update => "update",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "add" => Some(Op::Add),
            "remove" => Some(Op::Remove),
            "update" => Some(Op::Update),
            _ => None,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type tag of a value change, used to recover the original value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    #[serde(rename = "str")]
    Str,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "int")]
    Int,
    UnlimitedNatural,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Str => "str",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::UnlimitedNatural => "UnlimitedNatural",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "str" => Some(ValueType::Str),
            "bool" => Some(ValueType::Bool),
            "int" => Some(ValueType::Int),
            "UnlimitedNatural" => Some(ValueType::UnlimitedNatural),
            _ => None,
        }
    }

    pub fn scalar_type(self) -> ScalarType {
        match self {
            ValueType::Str => ScalarType::Str,
            ValueType::Bool => ScalarType::Bool,
            ValueType::Int => ScalarType::Int,
            ValueType::UnlimitedNatural => ScalarType::UnlimitedNatural,
        }
    }

    /// Text form and tag of a scalar. `None` for references.
    pub(crate) fn describe(value: &PropertyValue) -> Option<(String, ValueType)> {
        match value {
            PropertyValue::Str(s) => Some((s.clone(), ValueType::Str)),
            PropertyValue::Bool(b) => Some((b.to_string(), ValueType::Bool)),
            PropertyValue::Int(i) => Some((i.to_string(), ValueType::Int)),
            PropertyValue::Unlimited => Some(("*".to_string(), ValueType::UnlimitedNatural)),
            PropertyValue::Ref(_) | PropertyValue::Collection(_) => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single difference between two versions of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    /// An element was created or removed.
    Element {
        op: Op,
        element_id: NodeId,
        element_name: String,
        modeling_language: String,
        /// Set for presentation items: the diagram they are shown on.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        diagram_id: Option<NodeId>,
    },
    /// A scalar attribute changed. A cleared value has neither text nor type.
    Value {
        op: Op,
        element_id: NodeId,
        property_name: String,
        property_value: Option<String>,
        property_type: Option<ValueType>,
    },
    /// A reference changed, or a collection gained or lost a member.
    Ref {
        op: Op,
        element_id: NodeId,
        property_name: String,
        property_ref: Option<NodeId>,
    },
}

impl Change {
    pub fn op(&self) -> Op {
        match self {
            Change::Element { op, .. } | Change::Value { op, .. } | Change::Ref { op, .. } => *op,
        }
    }

    pub fn element_id(&self) -> NodeId {
        match self {
            Change::Element { element_id, .. } | Change::Value { element_id, .. } | Change::Ref { element_id, .. } => {
                *element_id
            }
        }
    }

    /// Node type this change is recorded as.
    pub fn record_type(&self) -> &'static ElementType {
        match self {
            Change::Element { .. } => &ELEMENT_CHANGE,
            Change::Value { .. } => &VALUE_CHANGE,
            Change::Ref { .. } => &REF_CHANGE,
        }
    }

    /// The new value of a value change, in its original type.
    pub fn typed_value(&self) -> Option<PropertyValue> {
        match self {
            Change::Value {
                property_value: Some(text),
                property_type: Some(value_type),
                ..
            } => value_type.scalar_type().parse(text),
            _ => None,
        }
    }

    fn attributes(&self) -> Vec<(&'static str, Option<String>)> {
        let mut attributes = vec![
            ("op", Some(self.op().to_string())),
            ("elementId", Some(self.element_id().to_string())),
        ];
        match self {
            Change::Element {
                element_name,
                modeling_language,
                diagram_id,
                ..
            } => {
                attributes.push(("elementName", Some(element_name.clone())));
                attributes.push(("modelingLanguage", Some(modeling_language.clone())));
                attributes.push(("diagramId", diagram_id.map(|id| id.to_string())));
            }
            Change::Value {
                property_name,
                property_value,
                property_type,
                ..
            } => {
                attributes.push(("propertyName", Some(property_name.clone())));
                attributes.push(("propertyValue", property_value.clone()));
                attributes.push(("propertyType", property_type.map(|t| t.to_string())));
            }
            Change::Ref {
                property_name,
                property_ref,
                ..
            } => {
                attributes.push(("propertyName", Some(property_name.clone())));
                attributes.push(("propertyRef", property_ref.map(|id| id.to_string())));
            }
        }
        attributes
    }

    /// Insert this change into `store` as a new, unapplied record node.
    pub fn record(&self, store: &mut ModelStore) -> Result<NodeId> {
        let node = store.create(self.record_type());
        for (name, value) in self.attributes() {
            if let Some(value) = value {
                store.set_attribute(node, name, value)?;
            }
        }
        store.set_attribute(node, "applied", false)?;
        Ok(node)
    }

    /// Read a change record node back into its typed form.
    pub fn from_node(node: &Node) -> Result<Self> {
        let invalid = || ChangesetError::InvalidChange(node.id());
        let text = |name: &str| node.get(name).and_then(PropertyValue::as_str);

        let op = text("op").and_then(Op::parse).ok_or_else(invalid)?;
        let element_id = text("elementId").and_then(parse_id).ok_or_else(invalid)?;

        if node.is_a(&ELEMENT_CHANGE) {
            Ok(Change::Element {
                op,
                element_id,
                element_name: text("elementName").ok_or_else(invalid)?.to_string(),
                modeling_language: text("modelingLanguage").ok_or_else(invalid)?.to_string(),
                diagram_id: text("diagramId").and_then(parse_id),
            })
        } else if node.is_a(&VALUE_CHANGE) {
            let property_type = match text("propertyType") {
                Some(tag) => Some(ValueType::parse(tag).ok_or_else(invalid)?),
                None => None,
            };
            Ok(Change::Value {
                op,
                element_id,
                property_name: text("propertyName").ok_or_else(invalid)?.to_string(),
                property_value: text("propertyValue").map(str::to_string),
                property_type,
            })
        } else if node.is_a(&REF_CHANGE) {
            let property_ref = match text("propertyRef") {
                Some(id) => Some(parse_id(id).ok_or_else(invalid)?),
                None => None,
            };
            Ok(Change::Ref {
                op,
                element_id,
                property_name: text("propertyName").ok_or_else(invalid)?.to_string(),
                property_ref,
            })
        } else {
            Err(invalid())
        }
    }
}

fn parse_id(text: &str) -> Option<NodeId> {
    text.parse().ok().map(NodeId)
}

/// A change together with the record node that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChange {
    pub node: NodeId,
    pub change: Change,
}

/// Change records in `store` not yet marked applied, oldest first.
pub fn pending_changes(store: &ModelStore) -> Result<Vec<PendingChange>> {
    let mut pending = Vec::new();
    for record_type in [&ELEMENT_CHANGE, &VALUE_CHANGE, &REF_CHANGE] {
        for node in store.select(record_type) {
            if node.get("applied") == Some(&PropertyValue::Bool(true)) {
                continue;
            }
            pending.push(PendingChange {
                node: node.id(),
                change: Change::from_node(node)?,
            });
        }
    }
    pending.sort_by_key(|p| p.node);
    Ok(pending)
}
