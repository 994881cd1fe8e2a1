//! Three-way compare of model versions

use std::collections::{BTreeMap, BTreeSet};

use plait_core::{ModelStore, Node, NodeId, PropertyValue, Shape};

use crate::change::{Change, Op, PendingChange, ValueType};
use crate::error::{ChangesetError, Result};

/// Compare `ancestor` and `incoming`, recording every change in `current`.
///
/// Nothing is inserted when the models cannot be matched.
pub fn compare(current: &mut ModelStore, ancestor: &ModelStore, incoming: &ModelStore) -> Result<Vec<PendingChange>> {
    let changes = diff(ancestor, incoming)?;

    let mut pending = Vec::with_capacity(changes.len());
    for change in changes {
        let node = change.record(current)?;
        pending.push(PendingChange { node, change });
    }

    tracing::debug!(
        "Compared {} ancestor and {} incoming elements: {} changes",
        ancestor.len(),
        incoming.len(),
        pending.len()
    );
    Ok(pending)
}

/// Changes that turn `ancestor` into `incoming`.
///
/// Removed elements come first, then added elements each followed by their
/// properties, then the elements present in both, all by ascending id.
pub fn diff(ancestor: &ModelStore, incoming: &ModelStore) -> Result<Vec<Change>> {
    let ancestor_keys: BTreeSet<NodeId> = ancestor.keys().collect();
    let incoming_keys: BTreeSet<NodeId> = incoming.keys().collect();

    let mut matched = Vec::new();
    for id in ancestor_keys.intersection(&incoming_keys) {
        let (Some(a), Some(i)) = (ancestor.lookup(*id), incoming.lookup(*id)) else {
            continue;
        };
        if a.element_type() != i.element_type() {
            return Err(ChangesetError::UnmatchableModel {
                id: *id,
                ancestor: a.element_type().to_string(),
                incoming: i.element_type().to_string(),
            });
        }
        matched.push((a, i));
    }

    let mut changes = Vec::new();
    let mut ancestor_sheet = None;
    let mut incoming_sheet = None;

    for node in ancestor_keys.difference(&incoming_keys).filter_map(|id| ancestor.lookup(*id)) {
        if node.shape() == Shape::StyleSheet {
            ancestor_sheet = Some(node);
            continue;
        }
        changes.push(element_change(Op::Remove, node, None));
    }

    for node in incoming_keys.difference(&ancestor_keys).filter_map(|id| incoming.lookup(*id)) {
        if node.shape() == Shape::StyleSheet {
            incoming_sheet = Some(node);
            continue;
        }
        let diagram = match node.shape() {
            Shape::Presentation => node.reference("diagram"),
            _ => None,
        };
        changes.push(element_change(Op::Add, node, diagram));
        updated_properties(None, node, &mut changes);
    }

    for (a, i) in matched {
        updated_properties(Some(a), i, &mut changes);
    }

    // Each model has one style sheet; compare them by content whatever their ids.
    if let (Some(a), Some(i)) = (ancestor_sheet, incoming_sheet) {
        tracing::trace!("comparing style sheets {} and {}", a.id(), i.id());
        updated_properties(Some(a), i, &mut changes);
    }

    Ok(changes)
}

fn element_change(op: Op, node: &Node, diagram_id: Option<NodeId>) -> Change {
    Change::Element {
        op,
        element_id: node.id(),
        element_name: node.element_type().name.to_string(),
        modeling_language: node.element_type().language.to_string(),
        diagram_id,
    }
}

/// Property-level changes from `ancestor` (if any) to `incoming`.
fn updated_properties(ancestor: Option<&Node>, incoming: &Node, changes: &mut Vec<Change>) {
    let before: BTreeMap<&str, PropertyValue> = ancestor.map(|n| n.save().into_iter().collect()).unwrap_or_default();
    let after: BTreeMap<&str, PropertyValue> = incoming.save().into_iter().collect();
    let element_id = ancestor.map_or(incoming.id(), Node::id);

    let names = incoming
        .element_type()
        .properties
        .iter()
        .map(|def| def.name)
        .filter(|name| *name != "id" && (before.contains_key(name) || after.contains_key(name)));

    for name in names {
        let value = after.get(name);
        let other = before.get(name);
        let reference = |op, property_ref| Change::Ref {
            op,
            element_id,
            property_name: name.to_string(),
            property_ref,
        };

        match value {
            Some(PropertyValue::Ref(id)) => {
                if other.and_then(PropertyValue::as_ref_id) != Some(*id) {
                    changes.push(reference(Op::Update, Some(*id)));
                }
            }
            Some(PropertyValue::Collection(ids)) => {
                let known = other.and_then(PropertyValue::as_collection).unwrap_or(&[]);
                for id in ids.iter().filter(|id| !known.contains(*id)) {
                    changes.push(reference(Op::Add, Some(*id)));
                }
            }
            _ if value != other => match other {
                Some(PropertyValue::Ref(_)) => changes.push(reference(Op::Update, None)),
                Some(PropertyValue::Collection(_)) => {}
                _ => {
                    let (property_value, property_type) = match value.and_then(ValueType::describe) {
                        Some((text, value_type)) => (Some(text), Some(value_type)),
                        None => (None, None),
                    };
                    changes.push(Change::Value {
                        op: Op::Update,
                        element_id,
                        property_name: name.to_string(),
                        property_value,
                        property_type,
                    });
                }
            },
            _ => {}
        }

        if let Some(PropertyValue::Collection(old)) = other {
            let kept = value.and_then(PropertyValue::as_collection).unwrap_or(&[]);
            for id in old.iter().filter(|id| !kept.contains(*id)) {
                changes.push(reference(Op::Remove, Some(*id)));
            }
        }
    }
}
