//! Pasting a copy bundle into a model

use std::collections::{BTreeSet, HashMap, HashSet};

use plait_core::diagram::{create_item, ensure_diagram, lookup_item};
use plait_core::model::Ownership as Role;
use plait_core::{try_deserialize, DiagramUpdate, ModelStore, Node, NodeId, PropertyData, Resolved, Shape};

use crate::copy::{CopyData, CopyRecord};
use crate::error::Result;

/// How existing definitions are treated while pasting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteMode {
    /// Reuse definitions still present in the target model.
    Link,
    /// Always duplicate copied definitions.
    Full,
}

/// Paste new items on `diagram`, sharing the existing defining elements.
pub fn paste_link(data: &CopyData, store: &mut ModelStore, diagram: NodeId) -> Result<BTreeSet<NodeId>> {
    paste(data, store, diagram, PasteMode::Link, &mut ())
}

/// Paste new items on `diagram`, with new defining elements.
pub fn paste_full(data: &CopyData, store: &mut ModelStore, diagram: NodeId) -> Result<BTreeSet<NodeId>> {
    paste(data, store, diagram, PasteMode::Full, &mut ())
}

/// Rebuild the copied subgraph in `store`, placing items on `diagram`.
///
/// Returns the new presentation items attached to `diagram`. References that
/// resolve neither through the bundle nor the target model are dropped.
/// A failed paste removes whatever it had created.
pub fn paste(
    data: &CopyData,
    store: &mut ModelStore,
    diagram: NodeId,
    mode: PasteMode,
    updates: &mut dyn DiagramUpdate,
) -> Result<BTreeSet<NodeId>> {
    ensure_diagram(store, diagram)?;

    let mut paster = Paster {
        data,
        store,
        diagram,
        mode,
        updates,
        // The copied diagrams map onto the paste target.
        new_elements: data.diagram_refs.iter().map(|id| (*id, diagram)).collect(),
        created: Vec::new(),
        created_set: HashSet::new(),
    };

    if let Err(err) = paster.paste_all() {
        for &id in paster.created.iter().rev() {
            paster.store.remove(id);
        }
        tracing::debug!("Paste failed, removed {} partial elements", paster.created.len());
        return Err(err);
    }

    // Every cross-reference is in place now; let each node fix itself up once more.
    for &id in &paster.created {
        paster.store.postload(id);
    }

    let pasted: BTreeSet<NodeId> = paster
        .created
        .iter()
        .filter_map(|id| paster.store.lookup(*id))
        .filter(|n| n.shape() == Shape::Presentation && n.reference("diagram") == Some(diagram))
        .map(Node::id)
        .collect();

    tracing::debug!(
        "Pasted {} elements ({:?} mode), {} items on diagram {}",
        paster.created.len(),
        mode,
        pasted.len(),
        diagram
    );
    Ok(pasted)
}

struct Paster<'a> {
    data: &'a CopyData,
    store: &'a mut ModelStore,
    diagram: NodeId,
    mode: PasteMode,
    updates: &'a mut dyn DiagramUpdate,
    /// Original id to the node standing in for it in the target model.
    new_elements: HashMap<NodeId, NodeId>,
    /// New nodes in creation order.
    created: Vec<NodeId>,
    created_set: HashSet<NodeId>,
}

impl<'a> Paster<'a> {
    fn paste_all(&mut self) -> Result<()> {
        let data = self.data;
        for &old in data.elements.keys() {
            if self.new_elements.contains_key(&old) {
                continue;
            }
            self.lookup(old)?;
        }
        Ok(())
    }

    /// Resolve an id from the bundle to a node in the target model,
    /// pasting it first if needed.
    fn lookup(&mut self, old: NodeId) -> Result<Option<NodeId>> {
        if let Some(new) = self.new_elements.get(&old) {
            return Ok(Some(*new));
        }

        let live = self
            .store
            .lookup(old)
            .filter(|n| n.shape() != Shape::Presentation)
            .map(Node::id);

        if self.mode == PasteMode::Link && live.is_some() {
            return Ok(live);
        }

        let data = self.data;
        if let Some(record) = data.elements.get(&old) {
            return self.paste_record(old, record).map(Some);
        }

        if self.mode == PasteMode::Full && live.is_some() {
            return Ok(live);
        }

        Ok(lookup_item(self.store, self.diagram, old))
    }

    fn paste_record(&mut self, old: NodeId, record: &'a CopyRecord) -> Result<NodeId> {
        match record {
            CopyRecord::Element(copy) => {
                let element = self.store.create(copy.element_type);
                self.remember(old, element);
                self.load_data(element, &copy.data)?;
                self.store.postload(element);
                Ok(element)
            }
            CopyRecord::Presentation(copy) => {
                let diagram = match self.lookup(copy.diagram)? {
                    Some(d) if self.store.lookup(d).map(Node::shape) == Some(Shape::Diagram) => d,
                    _ => self.diagram,
                };
                let item = create_item(self.store, diagram, copy.element_type)?;
                self.remember(old, item);
                if let Some(parent) = copy.parent {
                    if let Some(parent) = self.lookup(parent)? {
                        self.store.set_reference(item, "parent", Some(parent))?;
                    }
                }
                self.load_data(item, &copy.data)?;
                self.store.postload(item);
                self.updates.update(diagram, &[item]);
                Ok(item)
            }
        }
    }

    /// Record the new node before loading anything, so references back to it resolve.
    fn remember(&mut self, old: NodeId, new: NodeId) {
        self.new_elements.insert(old, new);
        self.created.push(new);
        self.created_set.insert(new);
    }

    fn load_data(&mut self, element: NodeId, data: &PropertyData) -> Result<()> {
        for (name, ser) in data {
            let values = try_deserialize(ser, &mut |id| self.lookup(id))?;
            for value in values {
                if let Resolved::Node(target) = value {
                    if self.would_adopt(element, name, target) {
                        tracing::trace!("not moving existing element {} into {}.{}", target, element, name);
                        continue;
                    }
                }
                self.store.load(element, name, value)?;
            }
        }
        Ok(())
    }

    /// Whether linking `target` through a composite property would pull an
    /// element that was not pasted away from its current owner.
    fn would_adopt(&self, element: NodeId, name: &str, target: NodeId) -> bool {
        let owned = self
            .store
            .lookup(element)
            .and_then(|n| n.element_type().property(name))
            .is_some_and(|def| def.ownership == Role::Owned);
        owned && !self.created_set.contains(&target)
    }
}
