//! Diagram-scoped operations on presentation items

use crate::error::{ModelError, Result};
use crate::model::{ElementType, NodeId, Shape};
use crate::store::ModelStore;

/// Notified after items are attached to a diagram, so the rendering layer
/// can recompute layout.
pub trait DiagramUpdate {
    fn update(&mut self, diagram: NodeId, items: &[NodeId]);
}

/// No rendering layer attached.
impl DiagramUpdate for () {
    fn update(&mut self, _diagram: NodeId, _items: &[NodeId]) {}
}

/// Records every notification, in order.
#[derive(Debug, Default)]
pub struct RecordedUpdates {
    pub updates: Vec<(NodeId, Vec<NodeId>)>,
}

impl DiagramUpdate for RecordedUpdates {
    fn update(&mut self, diagram: NodeId, items: &[NodeId]) {
        self.updates.push((diagram, items.to_vec()));
    }
}

/// Create a presentation item on `diagram`.
pub fn create_item(store: &mut ModelStore, diagram: NodeId, element_type: &'static ElementType) -> Result<NodeId> {
    ensure_diagram(store, diagram)?;
    let item = store.create(element_type);
    store.set_reference(item, "diagram", Some(diagram))?;
    Ok(item)
}

/// Items currently shown on `diagram`.
pub fn items(store: &ModelStore, diagram: NodeId) -> &[NodeId] {
    store
        .lookup(diagram)
        .map(|d| d.collection("ownedPresentation"))
        .unwrap_or(&[])
}

/// Resolve `id` through the diagram's own item index.
pub fn lookup_item(store: &ModelStore, diagram: NodeId, id: NodeId) -> Option<NodeId> {
    items(store, diagram).contains(&id).then_some(id)
}

/// Fail unless `diagram` names a diagram in `store`.
pub fn ensure_diagram(store: &ModelStore, diagram: NodeId) -> Result<()> {
    let node = store.lookup(diagram).ok_or(ModelError::UnknownElement(diagram))?;
    if node.shape() != Shape::Diagram {
        return Err(ModelError::NotADiagram(diagram));
    }
    Ok(())
}
