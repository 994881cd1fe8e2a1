//! Structural ownership: which nodes travel together

use crate::model::{NodeId, Ownership as Role, PropertyValue};
use crate::store::ModelStore;

/// Answers "who owns this node" and "what does it own".
pub trait Ownership {
    fn owner(&self, store: &ModelStore, node: NodeId) -> Option<NodeId>;

    fn owns(&self, store: &ModelStore, node: NodeId) -> Vec<NodeId>;
}

/// Ownership derived from the `Owner`/`Owned` roles declared on each type's properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaOwnership;

impl Ownership for SchemaOwnership {
    fn owner(&self, store: &ModelStore, node: NodeId) -> Option<NodeId> {
        let n = store.lookup(node)?;
        let declared = n
            .element_type()
            .properties
            .iter()
            .filter(|def| def.ownership == Role::Owner)
            .find_map(|def| n.reference(def.name));
        if declared.is_some() {
            return declared;
        }

        // Fall back to a composite end that lists this node without an owner back-pointer.
        store
            .iter()
            .find(|(_, candidate)| {
                candidate
                    .element_type()
                    .properties
                    .iter()
                    .filter(|def| def.ownership == Role::Owned)
                    .any(|def| match candidate.get(def.name) {
                        Some(PropertyValue::Ref(id)) => *id == node,
                        Some(PropertyValue::Collection(ids)) => ids.contains(&node),
                        _ => false,
                    })
            })
            .map(|(id, _)| id)
    }

    fn owns(&self, store: &ModelStore, node: NodeId) -> Vec<NodeId> {
        let Some(n) = store.lookup(node) else {
            return Vec::new();
        };
        let mut owned = Vec::new();
        for def in n.element_type().properties {
            if def.ownership != Role::Owned {
                continue;
            }
            match n.get(def.name) {
                Some(PropertyValue::Ref(id)) => owned.push(*id),
                Some(PropertyValue::Collection(ids)) => owned.extend(ids.iter().copied()),
                _ => {}
            }
        }
        owned
    }
}
