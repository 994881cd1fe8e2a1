//! Identifier-keyed node store

use std::collections::HashMap;

use crate::error::{ModelError, Result};
use crate::model::*;
use crate::serialize::Resolved;

/// Owns every node of one model instance.
#[derive(Clone)]
pub struct ModelStore {
    nodes: HashMap<NodeId, Node>,
}

impl std::fmt::Debug for ModelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelStore")
            .field("node_count", &self.nodes.len())
            .finish()
    }
}

impl ModelStore {
    pub fn new() -> Self {
        ModelStore {
            nodes: HashMap::new(),
        }
    }

    /// Create a new node of the given type. Returns its fresh id.
    pub fn create(&mut self, element_type: &'static ElementType) -> NodeId {
        let id = NodeId::next();
        self.nodes.insert(id, Node::new(id, element_type));
        id
    }

    /// Create a node under an existing identifier, e.g. when materializing a snapshot.
    pub fn create_with_id(&mut self, element_type: &'static ElementType, id: NodeId) -> Result<NodeId> {
        if id > NodeId::MAX {
            return Err(ModelError::IdOutOfRange(id));
        }
        if self.nodes.contains_key(&id) {
            return Err(ModelError::DuplicateId(id));
        }
        id.reserve();
        self.nodes.insert(id, Node::new(id, element_type));
        Ok(id)
    }

    /// Get a node by ID.
    pub fn lookup(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable node by ID.
    pub fn lookup_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All identifiers, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Iterate over all `(id, node)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// All nodes of a specific type.
    pub fn select<'a>(&'a self, element_type: &'a ElementType) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.values().filter(move |n| n.is_a(element_type))
    }

    /// The style sheet of this model, if it has one.
    pub fn style_sheet(&self) -> Option<&Node> {
        self.nodes.values().find(|n| n.shape() == Shape::StyleSheet)
    }

    /// Remove a node, and every reference other nodes hold to it.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        for other in self.nodes.values_mut() {
            other.forget(id);
        }
        Some(node)
    }

    /// Set or replace a scalar attribute.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<PropertyValue>) -> Result<()> {
        let value = value.into();
        let def = self.property_def(id, name)?;
        let node = self.nodes.get_mut(&id).ok_or(ModelError::UnknownElement(id))?;
        if node.set_scalar(def.name, Some(value.clone())) {
            Ok(())
        } else {
            Err(invalid_value(name, &value))
        }
    }

    /// Clear a property of any kind, unlinking opposite ends.
    pub fn unset(&mut self, id: NodeId, name: &str) -> Result<()> {
        let def = self.property_def(id, name)?;
        match def.kind {
            PropertyKind::Attribute(_) => {
                if let Some(node) = self.nodes.get_mut(&id) {
                    node.take(def.name);
                }
            }
            PropertyKind::Reference => {
                if let Some(target) = self.nodes.get(&id).and_then(|n| n.reference(def.name)) {
                    self.unlink(id, def, target);
                }
            }
            PropertyKind::Collection => {
                let members = self
                    .nodes
                    .get(&id)
                    .map(|n| n.collection(def.name).to_vec())
                    .unwrap_or_default();
                for target in members {
                    self.unlink(id, def, target);
                }
            }
        }
        Ok(())
    }

    /// Point a single reference at `target`, or clear it.
    pub fn set_reference(&mut self, id: NodeId, name: &str, target: Option<NodeId>) -> Result<()> {
        let def = self.property_def(id, name)?;
        if def.kind != PropertyKind::Reference {
            return Err(ModelError::NotAReference(name.to_string()));
        }
        match target {
            Some(target) => self.link(id, def, target),
            None => self.unset(id, name),
        }
    }

    /// Add `target` to a collection (or set a single reference).
    pub fn add_reference(&mut self, id: NodeId, name: &str, target: NodeId) -> Result<()> {
        let def = self.property_def(id, name)?;
        if !def.is_reference() {
            return Err(ModelError::NotAReference(name.to_string()));
        }
        self.link(id, def, target)
    }

    /// Remove `target` from a reference or collection property.
    pub fn remove_reference(&mut self, id: NodeId, name: &str, target: NodeId) -> Result<()> {
        let def = self.property_def(id, name)?;
        if !def.is_reference() {
            return Err(ModelError::NotAReference(name.to_string()));
        }
        self.unlink(id, def, target);
        Ok(())
    }

    /// Load one deserialized property value into a node.
    ///
    /// Scalars arrive in their transport text form and are parsed per the
    /// declared attribute type. Collection values are appended.
    pub fn load(&mut self, id: NodeId, name: &str, value: Resolved) -> Result<()> {
        let def = self.property_def(id, name)?;
        match (def.kind, value) {
            (PropertyKind::Attribute(ty), Resolved::Value(text)) => {
                let parsed = ty.parse(&text).ok_or_else(|| ModelError::InvalidValue {
                    property: name.to_string(),
                    value: text.clone(),
                })?;
                if let Some(node) = self.nodes.get_mut(&id) {
                    node.put(def.name, parsed);
                }
                Ok(())
            }
            (PropertyKind::Reference | PropertyKind::Collection, Resolved::Node(target)) => {
                self.link(id, def, target)
            }
            (PropertyKind::Attribute(_), Resolved::Node(target)) => Err(ModelError::InvalidValue {
                property: name.to_string(),
                value: format!("reference to {}", target),
            }),
            (_, Resolved::Value(text)) => Err(ModelError::InvalidValue {
                property: name.to_string(),
                value: text,
            }),
        }
    }

    /// Restore the member order of a collection after loading.
    pub fn reorder(&mut self, id: NodeId, name: &str, order: &[NodeId]) -> Result<()> {
        let def = self.property_def(id, name)?;
        if def.kind != PropertyKind::Collection {
            return Err(ModelError::NotAReference(name.to_string()));
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.reorder_members(def.name, order);
        }
        Ok(())
    }

    /// Run the type's post-load hook.
    pub fn postload(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            if let Some(hook) = node.element_type().postload {
                hook(node);
            }
        }
    }

    fn property_def(&self, id: NodeId, name: &str) -> Result<&'static PropertyDef> {
        let node = self.nodes.get(&id).ok_or(ModelError::UnknownElement(id))?;
        node.element_type()
            .property(name)
            .ok_or_else(|| ModelError::UnknownProperty {
                element_type: node.element_type().to_string(),
                property: name.to_string(),
            })
    }

    /// Link `id.def` to `target`, keeping the opposite end in sync.
    fn link(&mut self, id: NodeId, def: &'static PropertyDef, target: NodeId) -> Result<()> {
        if !self.nodes.contains_key(&target) {
            return Err(ModelError::UnknownElement(target));
        }
        let previous = match def.kind {
            PropertyKind::Reference => {
                let node = self.nodes.get(&id).ok_or(ModelError::UnknownElement(id))?;
                match node.reference(def.name) {
                    Some(current) if current == target => return Ok(()),
                    current => current,
                }
            }
            _ => None,
        };
        if let Some(previous) = previous {
            self.unlink(id, def, previous);
        }

        let node = self.nodes.get_mut(&id).ok_or(ModelError::UnknownElement(id))?;
        match def.kind {
            PropertyKind::Reference => node.put(def.name, PropertyValue::Ref(target)),
            PropertyKind::Collection => {
                if !node.push_member(def.name, target) {
                    return Ok(());
                }
            }
            PropertyKind::Attribute(_) => return Err(ModelError::NotAReference(def.name.to_string())),
        }

        if let Some(opposite) = self.opposite_def(def, target) {
            self.link(target, opposite, id)?;
        }
        Ok(())
    }

    /// Unlink `id.def` from `target`, keeping the opposite end in sync.
    fn unlink(&mut self, id: NodeId, def: &'static PropertyDef, target: NodeId) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        let removed = match def.kind {
            PropertyKind::Reference if node.reference(def.name) == Some(target) => {
                node.take(def.name);
                true
            }
            PropertyKind::Collection => node.remove_member(def.name, target),
            _ => false,
        };
        if !removed {
            return;
        }
        if let Some(opposite) = self.opposite_def(def, target) {
            self.unlink(target, opposite, id);
        }
    }

    fn opposite_def(&self, def: &PropertyDef, target: NodeId) -> Option<&'static PropertyDef> {
        let name = def.opposite?;
        let target_type = self.nodes.get(&target)?.element_type();
        let opposite = target_type.property(name);
        if opposite.is_none() {
            tracing::trace!("{} has no opposite end {:?}, skipping", target_type, name);
        }
        opposite.filter(|d| d.is_reference())
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_value(name: &str, value: &PropertyValue) -> ModelError {
    ModelError::InvalidValue {
        property: name.to_string(),
        value: format!("{:?}", value),
    }
}
