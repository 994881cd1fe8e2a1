//! Core data structures for the model graph

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique, stable identifier for a node.
///
/// Identifiers are handed out from a process-wide counter and are never
/// reused, so two stores can hold snapshots of the same node under the
/// same id without ever colliding with freshly created nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Allocate a fresh identifier.
    pub fn next() -> Self {
        NodeId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Largest id a node may carry. The counter always needs room above it.
    pub const MAX: NodeId = NodeId(u64::MAX - 1);

    /// Make sure the counter never hands out this id (or anything below it).
    pub fn reserve(self) {
        NEXT_ID.fetch_max(self.0.saturating_add(1), Ordering::Relaxed);
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of node shapes copy/paste and diff dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A plain definitional element.
    Element,
    /// A diagram: definitional, but owns presentations.
    Diagram,
    /// A rendered item living on a diagram.
    Presentation,
    /// The singleton style sheet, compared by content.
    StyleSheet,
}

/// Declared type of a scalar attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Str,
    Int,
    Bool,
    UnlimitedNatural,
}

impl ScalarType {
    /// Check whether a value may be stored in an attribute of this type.
    pub fn accepts(self, value: &PropertyValue) -> bool {
        matches!(
            (self, value),
            (ScalarType::Str, PropertyValue::Str(_))
                | (ScalarType::Int, PropertyValue::Int(_))
                | (ScalarType::Bool, PropertyValue::Bool(_))
                | (ScalarType::UnlimitedNatural, PropertyValue::Int(_))
                | (ScalarType::UnlimitedNatural, PropertyValue::Unlimited)
        )
    }

    /// Parse the transport text form of a scalar.
    pub fn parse(self, text: &str) -> Option<PropertyValue> {
        match self {
            ScalarType::Str => Some(PropertyValue::Str(text.to_string())),
            ScalarType::Int => text.parse().ok().map(PropertyValue::Int),
            ScalarType::Bool => match text {
                "1" | "true" | "True" => Some(PropertyValue::Bool(true)),
                "0" | "false" | "False" => Some(PropertyValue::Bool(false)),
                _ => None,
            },
            ScalarType::UnlimitedNatural => match text {
                "*" => Some(PropertyValue::Unlimited),
                _ => text.parse().ok().map(PropertyValue::Int),
            },
        }
    }
}

/// What a property holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Attribute(ScalarType),
    Reference,
    Collection,
}

/// How a property participates in the ownership relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ownership {
    None,
    /// The referenced node structurally contains this one.
    Owner,
    /// The referenced nodes are structurally contained by this one.
    Owned,
}

/// Schema entry for a single property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDef {
    pub name: &'static str,
    pub kind: PropertyKind,
    pub ownership: Ownership,
    /// Name of the opposite end on the referenced type, for bidirectional associations.
    pub opposite: Option<&'static str>,
}

impl PropertyDef {
    pub const fn attribute(name: &'static str, ty: ScalarType) -> Self {
        PropertyDef {
            name,
            kind: PropertyKind::Attribute(ty),
            ownership: Ownership::None,
            opposite: None,
        }
    }

    pub const fn reference(name: &'static str) -> Self {
        PropertyDef {
            name,
            kind: PropertyKind::Reference,
            ownership: Ownership::None,
            opposite: None,
        }
    }

    pub const fn collection(name: &'static str) -> Self {
        PropertyDef {
            name,
            kind: PropertyKind::Collection,
            ownership: Ownership::None,
            opposite: None,
        }
    }

    pub const fn opposite(mut self, opposite: &'static str) -> Self {
        self.opposite = Some(opposite);
        self
    }

    pub const fn owner(mut self) -> Self {
        self.ownership = Ownership::Owner;
        self
    }

    pub const fn owned(mut self) -> Self {
        self.ownership = Ownership::Owned;
        self
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.kind, PropertyKind::Reference | PropertyKind::Collection)
    }
}

/// Static description of a node type.
#[derive(Debug)]
pub struct ElementType {
    pub name: &'static str,
    /// Modeling language (namespace) the type belongs to.
    pub language: &'static str,
    pub shape: Shape,
    pub properties: &'static [PropertyDef],
    /// Invoked once all properties of a freshly loaded node are in place.
    pub postload: Option<fn(&mut Node)>,
}

impl ElementType {
    pub fn property(&self, name: &str) -> Option<&'static PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn is_presentation(&self) -> bool {
        self.shape == Shape::Presentation
    }
}

impl PartialEq for ElementType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.language == other.language
    }
}

impl Eq for ElementType {}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.language, self.name)
    }
}

/// A property value. Absent (null) is modeled as `Option::None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Str(String),
    Int(i64),
    Bool(bool),
    /// The unlimited upper bound, rendered as `*`.
    Unlimited,
    Ref(NodeId),
    Collection(Vec<NodeId>),
}

impl PropertyValue {
    pub fn as_ref_id(&self) -> Option<NodeId> {
        match self {
            PropertyValue::Ref(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&[NodeId]> {
        match self {
            PropertyValue::Collection(ids) => Some(ids),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, PropertyValue::Ref(_) | PropertyValue::Collection(_))
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Str(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

/// A single node in the model graph.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    element_type: &'static ElementType,
    values: BTreeMap<&'static str, PropertyValue>,
}

impl Node {
    pub(crate) fn new(id: NodeId, element_type: &'static ElementType) -> Self {
        Node {
            id,
            element_type,
            values: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn element_type(&self) -> &'static ElementType {
        self.element_type
    }

    pub fn shape(&self) -> Shape {
        self.element_type.shape
    }

    pub fn is_a(&self, element_type: &ElementType) -> bool {
        self.element_type == element_type
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    /// Referenced node of a single-valued reference.
    pub fn reference(&self, name: &str) -> Option<NodeId> {
        self.get(name).and_then(PropertyValue::as_ref_id)
    }

    /// Members of a collection property, empty when unset.
    pub fn collection(&self, name: &str) -> &[NodeId] {
        self.get(name)
            .and_then(PropertyValue::as_collection)
            .unwrap_or(&[])
    }

    /// Every persistable property currently holding a value, in schema order.
    pub fn save(&self) -> Vec<(&'static str, PropertyValue)> {
        self.element_type
            .properties
            .iter()
            .filter_map(|def| self.values.get(def.name).map(|v| (def.name, v.clone())))
            .collect()
    }

    /// Set or clear a scalar attribute. Returns `false` when the property is
    /// not a scalar attribute of this type or the value has the wrong type.
    pub fn set_scalar(&mut self, name: &str, value: Option<PropertyValue>) -> bool {
        let Some(def) = self.element_type.property(name) else {
            return false;
        };
        let PropertyKind::Attribute(ty) = def.kind else {
            return false;
        };
        match value {
            Some(value) if ty.accepts(&value) => {
                self.values.insert(def.name, value);
                true
            }
            Some(_) => false,
            None => {
                self.values.remove(def.name);
                true
            }
        }
    }

    pub(crate) fn put(&mut self, name: &'static str, value: PropertyValue) {
        self.values.insert(name, value);
    }

    pub(crate) fn take(&mut self, name: &str) -> Option<PropertyValue> {
        self.values.remove(name)
    }

    /// Append to a collection. Returns false if `member` was already present.
    pub(crate) fn push_member(&mut self, name: &'static str, member: NodeId) -> bool {
        match self.values.get_mut(name) {
            Some(PropertyValue::Collection(ids)) if ids.contains(&member) => false,
            Some(PropertyValue::Collection(ids)) => {
                ids.push(member);
                true
            }
            _ => {
                self.values.insert(name, PropertyValue::Collection(vec![member]));
                true
            }
        }
    }

    /// Remove from a collection. Returns false if `member` was not present.
    pub(crate) fn remove_member(&mut self, name: &str, member: NodeId) -> bool {
        let Some(PropertyValue::Collection(ids)) = self.values.get_mut(name) else {
            return false;
        };
        let Some(pos) = ids.iter().position(|id| *id == member) else {
            return false;
        };
        ids.remove(pos);
        if ids.is_empty() {
            self.values.remove(name);
        }
        true
    }

    /// Sort a collection by the position of each member in `order`. Members
    /// not listed keep their relative order, after the listed ones.
    pub(crate) fn reorder_members(&mut self, name: &str, order: &[NodeId]) {
        let Some(PropertyValue::Collection(ids)) = self.values.get_mut(name) else {
            return;
        };
        let rank: HashMap<NodeId, usize> = order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        ids.sort_by_key(|id| rank.get(id).copied().unwrap_or(order.len()));
    }

    /// Drop every reference to `target`.
    pub(crate) fn forget(&mut self, target: NodeId) {
        self.values.retain(|_, value| match value {
            PropertyValue::Ref(id) => *id != target,
            PropertyValue::Collection(ids) => {
                ids.retain(|id| *id != target);
                !ids.is_empty()
            }
            _ => true,
        });
    }
}
