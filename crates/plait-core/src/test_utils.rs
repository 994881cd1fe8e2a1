//! Test utilities for building small models

use std::collections::HashMap;

use crate::diagram::create_item;
use crate::lang::builtin::DIAGRAM;
use crate::lang::structure::{CLASS, CLASS_ITEM, GENERALIZATION, GENERALIZATION_ITEM};
use crate::model::{ElementType, NodeId};
use crate::store::ModelStore;

/// Fixture builder that remembers nodes by a short key.
pub struct ModelFixture {
    pub store: ModelStore,
    nodes: HashMap<String, NodeId>,
}

impl ModelFixture {
    pub fn new() -> Self {
        Self {
            store: ModelStore::new(),
            nodes: HashMap::new(),
        }
    }

    /// Add a node of the given type.
    pub fn element(&mut self, key: &str, element_type: &'static ElementType) -> NodeId {
        let id = self.store.create(element_type);
        self.nodes.insert(key.to_string(), id);
        id
    }

    /// Add a node under a fixed id, so several stores can share it.
    pub fn element_with_id(&mut self, key: &str, element_type: &'static ElementType, id: u64) -> NodeId {
        let id = self
            .store
            .create_with_id(element_type, NodeId(id))
            .expect("fixture ids must be unique per store");
        self.nodes.insert(key.to_string(), id);
        id
    }

    /// Add a node with its `name` attribute set.
    pub fn named(&mut self, key: &str, element_type: &'static ElementType, name: &str) -> NodeId {
        let id = self.element(key, element_type);
        self.store
            .set_attribute(id, "name", name)
            .expect("fixture type must have a name attribute");
        id
    }

    pub fn diagram(&mut self, key: &str) -> NodeId {
        self.element(key, &DIAGRAM)
    }

    /// Add a presentation item on `diagram`, optionally showing `subject`.
    pub fn item(
        &mut self,
        key: &str,
        diagram: NodeId,
        element_type: &'static ElementType,
        subject: Option<NodeId>,
    ) -> NodeId {
        let id = create_item(&mut self.store, diagram, element_type).expect("fixture diagram must exist");
        if let Some(subject) = subject {
            self.store
                .set_reference(id, "subject", Some(subject))
                .expect("fixture item must accept a subject");
        }
        self.nodes.insert(key.to_string(), id);
        id
    }

    /// Id of a previously added node.
    pub fn id(&self, key: &str) -> NodeId {
        self.nodes[key]
    }

    /// Two classes on a diagram, `specific` generalizing to `general`.
    ///
    /// Keys: `diagram`, `general`, `specific`, `generalization`,
    /// `general_item`, `specific_item`, `generalization_item`.
    pub fn two_classes_and_a_generalization() -> Self {
        let mut fixture = Self::new();
        let diagram = fixture.diagram("diagram");
        let general = fixture.named("general", &CLASS, "Shape");
        let specific = fixture.named("specific", &CLASS, "Circle");
        let generalization = fixture.element("generalization", &GENERALIZATION);
        fixture
            .store
            .set_reference(generalization, "specific", Some(specific))
            .expect("generalization has a specific end");
        fixture
            .store
            .set_reference(generalization, "general", Some(general))
            .expect("generalization has a general end");

        let general_item = fixture.item("general_item", diagram, &CLASS_ITEM, Some(general));
        let specific_item = fixture.item("specific_item", diagram, &CLASS_ITEM, Some(specific));
        let generalization_item =
            fixture.item("generalization_item", diagram, &GENERALIZATION_ITEM, Some(generalization));
        fixture
            .store
            .set_reference(generalization_item, "head", Some(general_item))
            .expect("generalization item has a head");
        fixture
            .store
            .set_reference(generalization_item, "tail", Some(specific_item))
            .expect("generalization item has a tail");
        fixture
    }
}

impl Default for ModelFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_classes_and_a_generalization() {
        let fixture = ModelFixture::two_classes_and_a_generalization();
        let store = &fixture.store;
        let diagram = store.lookup(fixture.id("diagram")).unwrap();
        assert_eq!(diagram.collection("ownedPresentation").len(), 3);

        let generalization = store.lookup(fixture.id("generalization")).unwrap();
        assert_eq!(generalization.reference("general"), Some(fixture.id("general")));
        let specific = store.lookup(fixture.id("specific")).unwrap();
        assert_eq!(specific.collection("generalization"), &[fixture.id("generalization")]);
    }
}
