//! Copying nodes into a transport bundle

use std::collections::{BTreeMap, BTreeSet, HashSet};

use plait_core::{copy_base_data, ElementType, ModelError, ModelStore, Node, NodeId, Ownership, PropertyData, Shape};

use crate::error::{CopyError, Result};

/// Copy of a definitional node (an element, a diagram, the style sheet).
#[derive(Debug, Clone)]
pub struct ElementCopy {
    pub element_type: &'static ElementType,
    pub id: NodeId,
    pub data: PropertyData,
}

/// Copy of a presentation item. Its placement is kept apart from the
/// other properties so paste can recompute it.
#[derive(Debug, Clone)]
pub struct PresentationCopy {
    pub element_type: &'static ElementType,
    pub data: PropertyData,
    pub diagram: NodeId,
    pub parent: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub enum CopyRecord {
    Element(ElementCopy),
    Presentation(PresentationCopy),
}

impl CopyRecord {
    pub fn element_type(&self) -> &'static ElementType {
        match self {
            CopyRecord::Element(copy) => copy.element_type,
            CopyRecord::Presentation(copy) => copy.element_type,
        }
    }
}

/// A copy bundle. Treat it as immutable between copy and paste.
#[derive(Debug, Clone, Default)]
pub struct CopyData {
    pub elements: BTreeMap<NodeId, CopyRecord>,
    /// Diagrams the copied items were shown on; paste maps them to its target.
    pub diagram_refs: BTreeSet<NodeId>,
}

impl CopyData {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Copy a node, plus whatever travels with it: a presentation brings its
/// subject, a diagram brings its items.
pub fn copy(store: &ModelStore, id: NodeId) -> Result<Vec<(NodeId, CopyRecord)>> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    copy_into(store, id, &mut seen, &mut out)?;
    Ok(out)
}

fn copy_into(
    store: &ModelStore,
    id: NodeId,
    seen: &mut HashSet<NodeId>,
    out: &mut Vec<(NodeId, CopyRecord)>,
) -> Result<()> {
    if !seen.insert(id) {
        return Ok(());
    }
    let node = store.lookup(id).ok_or(ModelError::UnknownElement(id))?;

    match node.shape() {
        Shape::Element | Shape::StyleSheet => {
            out.push((id, CopyRecord::Element(copy_element(node, &[]))));
        }
        Shape::Diagram => {
            out.push((id, CopyRecord::Element(copy_element(node, &["ownedPresentation"]))));
            for &item in node.collection("ownedPresentation") {
                // Items showing the diagram itself stay behind.
                if store.lookup(item).and_then(|i| i.reference("subject")) == Some(id) {
                    continue;
                }
                copy_into(store, item, seen, out)?;
            }
        }
        Shape::Presentation => {
            let diagram = node
                .reference("diagram")
                .ok_or(CopyError::DetachedPresentation(id))?;
            out.push((
                id,
                CopyRecord::Presentation(PresentationCopy {
                    element_type: node.element_type(),
                    data: copy_base_data(node, &["diagram", "parent", "children"]),
                    diagram,
                    parent: node.reference("parent"),
                }),
            ));
            if let Some(subject) = node.reference("subject") {
                copy_into(store, subject, seen, out)?;
            }
        }
    }
    Ok(())
}

fn copy_element(node: &Node, excluded: &[&str]) -> ElementCopy {
    let mut excluded = excluded.to_vec();
    excluded.push("presentation");
    ElementCopy {
        element_type: node.element_type(),
        id: node.id(),
        data: copy_base_data(node, &excluded),
    }
}

/// Copy `items`. With an ownership resolver, everything the copied elements
/// own (transitively) is copied along.
pub fn copy_full(store: &ModelStore, items: &[NodeId], ownership: Option<&dyn Ownership>) -> Result<CopyData> {
    let mut elements: BTreeMap<NodeId, CopyRecord> = BTreeMap::new();
    for &item in items {
        elements.extend(copy(store, item)?);
    }

    let diagram_refs: BTreeSet<NodeId> = items
        .iter()
        .filter_map(|id| store.lookup(*id))
        .filter(|n| n.shape() == Shape::Presentation)
        .filter_map(|n| n.reference("diagram"))
        .collect();

    if let Some(ownership) = ownership {
        let mut pending: Vec<NodeId> = elements.keys().copied().filter(|id| store.contains(*id)).collect();
        while let Some(element) = pending.pop() {
            for owned in ownership.owns(store, element) {
                if elements.contains_key(&owned) || ownership.owner(store, owned) != Some(element) {
                    continue;
                }
                for (id, record) in copy(store, owned)? {
                    elements.entry(id).or_insert(record);
                }
                pending.push(owned);
            }
        }
    }

    tracing::debug!(
        "Copied {} elements from {} items, touching {} diagrams",
        elements.len(),
        items.len(),
        diagram_refs.len()
    );
    Ok(CopyData { elements, diagram_refs })
}
