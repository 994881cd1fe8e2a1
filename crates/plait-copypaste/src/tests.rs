//! Unit tests for the copy and paste modules

use plait_core::lang::builtin::DIAGRAM;
use plait_core::lang::structure::{
    CLASS, CLASS_ITEM, GENERALIZATION, GENERALIZATION_ITEM, LITERAL_INTEGER, PACKAGE, PACKAGE_ITEM, PROPERTY, SLOT,
};
use plait_core::test_utils::ModelFixture;
use plait_core::{
    ElementType, ModelError, ModelStore, Node, NodeId, PropertyDef, PropertyValue, RecordedUpdates, ScalarType,
    SchemaOwnership, Serialized, Shape,
};

use crate::*;

fn only(ids: std::collections::BTreeSet<NodeId>) -> NodeId {
    assert_eq!(ids.len(), 1, "expected a single pasted item, got {:?}", ids);
    ids.into_iter().next().unwrap()
}

fn name_of(store: &ModelStore, id: NodeId) -> Option<&str> {
    store.lookup(id)?.get("name")?.as_str()
}

#[test]
fn test_copy_presentation_brings_its_subject() {
    let f = ModelFixture::two_classes_and_a_generalization();
    let data = copy_full(&f.store, &[f.id("specific_item")], None).unwrap();

    assert_eq!(data.len(), 2);
    assert!(matches!(data.elements[&f.id("specific_item")], CopyRecord::Presentation(_)));
    assert!(matches!(data.elements[&f.id("specific")], CopyRecord::Element(_)));
    assert_eq!(data.diagram_refs.iter().copied().collect::<Vec<_>>(), vec![f.id("diagram")]);
}

#[test]
fn test_copy_leaves_out_presentation_links() {
    let f = ModelFixture::two_classes_and_a_generalization();
    let data = copy_full(&f.store, &[f.id("specific_item")], None).unwrap();

    let CopyRecord::Element(class) = &data.elements[&f.id("specific")] else {
        panic!("class should be copied as an element");
    };
    assert!(class.data.iter().all(|(name, _)| *name != "presentation"));

    let CopyRecord::Presentation(item) = &data.elements[&f.id("specific_item")] else {
        panic!("item should be copied as a presentation");
    };
    assert_eq!(item.diagram, f.id("diagram"));
    assert!(item.data.iter().all(|(name, _)| !["diagram", "parent", "children"].contains(name)));
}

#[test]
fn test_copy_diagram_skips_items_showing_itself() {
    let mut f = ModelFixture::new();
    let diagram = f.diagram("diagram");
    let class = f.named("class", &CLASS, "Order");
    let class_item = f.item("class_item", diagram, &CLASS_ITEM, Some(class));
    let self_item = f.item("self_item", diagram, &PACKAGE_ITEM, Some(diagram));

    let records = copy(&f.store, diagram).unwrap();
    let ids: Vec<NodeId> = records.iter().map(|(id, _)| *id).collect();

    assert!(ids.contains(&diagram));
    assert!(ids.contains(&class_item));
    assert!(ids.contains(&class));
    assert!(!ids.contains(&self_item));
}

#[test]
fn test_copy_detached_presentation_fails() {
    let mut store = ModelStore::new();
    let item = store.create(&CLASS_ITEM);

    let err = copy(&store, item).unwrap_err();
    assert!(matches!(err, CopyError::DetachedPresentation(id) if id == item));
}

#[test]
fn test_copy_unknown_element_fails() {
    let store = ModelStore::new();
    let err = copy_full(&store, &[NodeId(u64::MAX)], None).unwrap_err();
    assert!(matches!(err, CopyError::Model(_)));
}

#[test]
fn test_paste_link_shares_the_subject() {
    let mut f = ModelFixture::two_classes_and_a_generalization();
    let diagram = f.id("diagram");
    let data = copy_full(&f.store, &[f.id("specific_item")], None).unwrap();
    let classes_before = f.store.select(&CLASS).count();

    let item = only(paste_link(&data, &mut f.store, diagram).unwrap());

    assert_ne!(item, f.id("specific_item"));
    assert_eq!(f.store.lookup(item).unwrap().reference("subject"), Some(f.id("specific")));
    assert_eq!(f.store.select(&CLASS).count(), classes_before);
    let specific = f.store.lookup(f.id("specific")).unwrap();
    assert_eq!(specific.collection("presentation").len(), 2);
}

#[test]
fn test_paste_full_duplicates_the_subject() {
    let mut f = ModelFixture::two_classes_and_a_generalization();
    let diagram = f.id("diagram");
    let data = copy_full(&f.store, &[f.id("specific_item")], None).unwrap();

    let item = only(paste_full(&data, &mut f.store, diagram).unwrap());
    let new_class = f.store.lookup(item).unwrap().reference("subject").unwrap();

    assert_ne!(new_class, f.id("specific"));
    assert_eq!(name_of(&f.store, new_class), Some("Circle"));
    assert_eq!(f.store.select(&CLASS).count(), 3);
}

#[test]
fn test_paste_full_does_not_steal_owned_elements() {
    let mut f = ModelFixture::two_classes_and_a_generalization();
    let diagram = f.id("diagram");
    let generalization = f.id("generalization");
    let data = copy_full(&f.store, &[f.id("specific_item")], None).unwrap();

    let item = only(paste_full(&data, &mut f.store, diagram).unwrap());
    let new_class = f.store.lookup(item).unwrap().reference("subject").unwrap();

    assert!(f.store.lookup(new_class).unwrap().collection("generalization").is_empty());
    assert_eq!(
        f.store.lookup(generalization).unwrap().reference("specific"),
        Some(f.id("specific"))
    );
    assert_eq!(
        f.store.lookup(f.id("specific")).unwrap().collection("generalization"),
        &[generalization]
    );
}

#[test]
fn test_paste_full_connected_items_rewires_ends() {
    let mut f = ModelFixture::two_classes_and_a_generalization();
    let diagram = f.id("diagram");
    let items = [f.id("general_item"), f.id("specific_item"), f.id("generalization_item")];
    let data = copy_full(&f.store, &items, None).unwrap();

    let pasted = paste_full(&data, &mut f.store, diagram).unwrap();
    assert_eq!(pasted.len(), 3);
    assert!(pasted.iter().all(|id| !items.contains(id)));

    let store = &f.store;
    let line = pasted
        .iter()
        .copied()
        .find(|id| store.lookup(*id).unwrap().is_a(&GENERALIZATION_ITEM))
        .unwrap();
    let line = store.lookup(line).unwrap();
    let head = line.reference("head").unwrap();
    let tail = line.reference("tail").unwrap();
    assert!(pasted.contains(&head));
    assert!(pasted.contains(&tail));

    let general = store.lookup(head).unwrap().reference("subject").unwrap();
    let specific = store.lookup(tail).unwrap().reference("subject").unwrap();
    assert_ne!(general, f.id("general"));
    assert_ne!(specific, f.id("specific"));
    assert_eq!(name_of(store, general), Some("Shape"));
    assert_eq!(name_of(store, specific), Some("Circle"));

    let generalization = line.reference("subject").unwrap();
    assert_ne!(generalization, f.id("generalization"));
    let generalization = store.lookup(generalization).unwrap();
    assert_eq!(generalization.reference("general"), Some(general));
    assert_eq!(generalization.reference("specific"), Some(specific));
    assert_eq!(store.lookup(specific).unwrap().collection("generalization"), &[generalization.id()]);
    assert_eq!(store.select(&GENERALIZATION).count(), 2);
}

#[test]
fn test_paste_full_reuses_ends_left_out_of_the_copy() {
    let mut f = ModelFixture::two_classes_and_a_generalization();
    let diagram = f.id("diagram");
    let data = copy_full(&f.store, &[f.id("generalization_item")], None).unwrap();

    let line = only(paste_full(&data, &mut f.store, diagram).unwrap());
    let line = f.store.lookup(line).unwrap();

    // Head and tail were not copied, so they resolve to the items already on the diagram.
    assert_eq!(line.reference("head"), Some(f.id("general_item")));
    assert_eq!(line.reference("tail"), Some(f.id("specific_item")));

    let generalization = f.store.lookup(line.reference("subject").unwrap()).unwrap();
    assert_ne!(generalization.id(), f.id("generalization"));
    assert_eq!(generalization.reference("general"), Some(f.id("general")));
    assert_eq!(generalization.reference("specific"), Some(f.id("specific")));
}

#[test]
fn test_paste_onto_another_diagram() {
    let mut f = ModelFixture::two_classes_and_a_generalization();
    let other = f.diagram("other");
    let data = copy_full(&f.store, &[f.id("specific_item")], None).unwrap();

    let item = only(paste_link(&data, &mut f.store, other).unwrap());

    assert_eq!(f.store.lookup(item).unwrap().reference("diagram"), Some(other));
    assert_eq!(f.store.lookup(other).unwrap().collection("ownedPresentation"), &[item]);
    assert_eq!(f.store.lookup(f.id("diagram")).unwrap().collection("ownedPresentation").len(), 3);
}

#[test]
fn test_paste_keeps_parent_only_on_its_diagram() {
    let mut f = ModelFixture::new();
    let diagram = f.diagram("diagram");
    let package = f.named("package", &PACKAGE, "shapes");
    let class = f.named("class", &CLASS, "Circle");
    let package_item = f.item("package_item", diagram, &PACKAGE_ITEM, Some(package));
    let class_item = f.item("class_item", diagram, &CLASS_ITEM, Some(class));
    f.store.set_reference(class_item, "parent", Some(package_item)).unwrap();
    let data = copy_full(&f.store, &[class_item], None).unwrap();

    let nested = only(paste_link(&data, &mut f.store, diagram).unwrap());
    assert_eq!(f.store.lookup(nested).unwrap().reference("parent"), Some(package_item));
    assert_eq!(f.store.lookup(package_item).unwrap().collection("children").len(), 2);

    let other = f.diagram("other");
    let loose = only(paste_link(&data, &mut f.store, other).unwrap());
    assert_eq!(f.store.lookup(loose).unwrap().reference("parent"), None);
}

#[test]
fn test_paste_reports_diagram_updates() {
    let mut f = ModelFixture::two_classes_and_a_generalization();
    let diagram = f.id("diagram");
    let data = copy_full(&f.store, &[f.id("specific_item")], None).unwrap();
    let mut recorded = RecordedUpdates::default();

    let item = only(paste(&data, &mut f.store, diagram, PasteMode::Link, &mut recorded).unwrap());

    assert_eq!(recorded.updates, vec![(diagram, vec![item])]);
}

#[test]
fn test_paste_into_another_model_drops_unresolved_references() {
    let f = ModelFixture::two_classes_and_a_generalization();
    let data = copy_full(&f.store, &[f.id("specific_item")], None).unwrap();

    let mut target = ModelStore::new();
    let diagram = target.create(&DIAGRAM);
    let item = only(paste_link(&data, &mut target, diagram).unwrap());

    // Nothing of the source model lives here, so even link mode creates the class.
    let class = target.lookup(item).unwrap().reference("subject").unwrap();
    assert_ne!(class, f.id("specific"));
    assert_eq!(name_of(&target, class), Some("Circle"));
    assert!(target.lookup(class).unwrap().collection("generalization").is_empty());
    assert_eq!(target.len(), 3);
}

#[test]
fn test_paste_full_handles_reference_cycles() {
    let mut store = ModelStore::new();
    let diagram = store.create(&DIAGRAM);
    let first = store.create(&PROPERTY);
    let second = store.create(&PROPERTY);
    store.set_reference(first, "redefinedProperty", Some(second)).unwrap();
    store.set_reference(second, "redefinedProperty", Some(first)).unwrap();

    let data = copy_full(&store, &[first, second], None).unwrap();
    let pasted = paste_full(&data, &mut store, diagram).unwrap();
    assert!(pasted.is_empty());

    let copies: Vec<NodeId> = store
        .select(&PROPERTY)
        .map(|n| n.id())
        .filter(|id| *id != first && *id != second)
        .collect();
    assert_eq!(copies.len(), 2);
    let a = store.lookup(copies[0]).unwrap().reference("redefinedProperty").unwrap();
    let b = store.lookup(copies[1]).unwrap().reference("redefinedProperty").unwrap();
    assert_eq!(a, copies[1]);
    assert_eq!(b, copies[0]);
}

#[test]
fn test_copy_full_closure_follows_ownership() {
    let mut f = ModelFixture::new();
    let target = f.diagram("target");
    let package = f.named("package", &PACKAGE, "shapes");
    let class = f.named("class", &CLASS, "Circle");
    let attribute = f.named("attribute", &PROPERTY, "radius");
    let diagram = f.diagram("diagram");
    f.store.add_reference(package, "packagedElement", class).unwrap();
    f.store.add_reference(class, "ownedAttribute", attribute).unwrap();
    f.store.add_reference(package, "ownedDiagram", diagram).unwrap();

    let shallow = copy_full(&f.store, &[package], None).unwrap();
    assert_eq!(shallow.len(), 1);

    let data = copy_full(&f.store, &[package], Some(&SchemaOwnership)).unwrap();
    assert_eq!(data.len(), 4);
    assert!(!data.elements.contains_key(&target));

    paste_full(&data, &mut f.store, target).unwrap();

    let store = &f.store;
    let new_package = store
        .select(&PACKAGE)
        .find(|n| n.id() != package)
        .unwrap();
    let new_class = new_package.collection("packagedElement")[0];
    assert_ne!(new_class, class);
    assert_eq!(name_of(store, new_class), Some("Circle"));
    let new_attribute = store.lookup(new_class).unwrap().collection("ownedAttribute")[0];
    assert_ne!(new_attribute, attribute);
    assert_eq!(store.lookup(new_attribute).unwrap().reference("class"), Some(new_class));
    let new_diagram = new_package.collection("ownedDiagram")[0];
    assert_ne!(new_diagram, diagram);

    // The originals keep what they own.
    assert_eq!(store.lookup(package).unwrap().collection("packagedElement"), &[class]);
    assert_eq!(store.lookup(class).unwrap().collection("ownedAttribute"), &[attribute]);
}

#[test]
fn test_paste_full_slot_value() {
    let mut store = ModelStore::new();
    let diagram = store.create(&DIAGRAM);
    let slot = store.create(&SLOT);
    let literal = store.create(&LITERAL_INTEGER);
    store.set_attribute(literal, "value", 42i64).unwrap();
    store.set_reference(slot, "value", Some(literal)).unwrap();

    let data = copy_full(&store, &[slot], Some(&SchemaOwnership)).unwrap();
    assert_eq!(data.len(), 2);
    paste_full(&data, &mut store, diagram).unwrap();

    let new_slot = store.select(&SLOT).find(|n| n.id() != slot).unwrap();
    let new_literal = new_slot.reference("value").unwrap();
    assert_ne!(new_literal, literal);
    let new_literal = store.lookup(new_literal).unwrap();
    assert_eq!(new_literal.get("value"), Some(&PropertyValue::Int(42)));
    assert_eq!(new_literal.reference("owningSlot"), Some(new_slot.id()));
    assert_eq!(store.lookup(literal).unwrap().reference("owningSlot"), Some(slot));
}

#[test]
fn test_paste_onto_non_diagram_leaves_store_untouched() {
    let mut f = ModelFixture::two_classes_and_a_generalization();
    let data = copy_full(&f.store, &[f.id("specific_item")], None).unwrap();
    let before = f.store.len();

    let general = f.id("general");
    let err = paste_full(&data, &mut f.store, general).unwrap_err();

    assert!(matches!(err, CopyError::Model(ModelError::NotADiagram(id)) if id == f.id("general")));
    assert_eq!(f.store.len(), before);
    assert_eq!(f.store.select(&CLASS).count(), 2);
}

#[test]
fn test_failed_paste_removes_partial_elements() {
    let mut f = ModelFixture::two_classes_and_a_generalization();
    let diagram = f.id("diagram");
    let mut data = copy_full(&f.store, &[f.id("specific_item")], None).unwrap();
    data.elements.insert(
        NodeId::MAX,
        CopyRecord::Element(ElementCopy {
            element_type: &PROPERTY,
            id: NodeId::MAX,
            data: vec![("lowerValue", Serialized::Value("many".to_string()))],
        }),
    );
    let before = f.store.len();

    let err = paste_full(&data, &mut f.store, diagram).unwrap_err();

    assert!(matches!(err, CopyError::Model(ModelError::InvalidValue { .. })));
    assert_eq!(f.store.len(), before);
    assert_eq!(f.store.lookup(diagram).unwrap().collection("ownedPresentation").len(), 3);
    assert_eq!(f.store.lookup(f.id("specific")).unwrap().collection("presentation"), &[f.id("specific_item")]);
}

#[test]
fn test_paste_runs_postload_on_new_elements() {
    let mut store = ModelStore::new();
    let diagram = store.create(&DIAGRAM);
    let attribute = store.create(&PROPERTY);
    store.set_attribute(attribute, "lowerValue", 3i64).unwrap();
    store.set_attribute(attribute, "upperValue", 1i64).unwrap();

    let data = copy_full(&store, &[attribute], None).unwrap();
    paste_full(&data, &mut store, diagram).unwrap();

    let copy = store.select(&PROPERTY).find(|n| n.id() != attribute).unwrap();
    assert_eq!(copy.get("upperValue"), Some(&PropertyValue::Int(3)));
    assert_eq!(store.lookup(attribute).unwrap().get("upperValue"), Some(&PropertyValue::Int(1)));
}

/// Counts the items showing it, which only settle once the whole bundle is loaded.
static SHOWN: ElementType = ElementType {
    name: "Shown",
    language: "Test",
    shape: Shape::Element,
    properties: &[
        PropertyDef::attribute("itemCount", ScalarType::Int),
        PropertyDef::collection("presentation").opposite("subject"),
    ],
    postload: Some(count_items),
};

fn count_items(node: &mut Node) {
    let count = node.collection("presentation").len() as i64;
    node.set_scalar("itemCount", Some(PropertyValue::Int(count)));
}

#[test]
fn test_paste_postloads_again_after_the_whole_bundle() {
    let mut f = ModelFixture::new();
    let diagram = f.diagram("diagram");
    let shown = f.element("shown", &SHOWN);
    let item = f.item("item", diagram, &CLASS_ITEM, Some(shown));

    let data = copy_full(&f.store, &[item], None).unwrap();
    let new_item = only(paste_full(&data, &mut f.store, diagram).unwrap());

    let new_shown = f.store.lookup(new_item).unwrap().reference("subject").unwrap();
    assert_ne!(new_shown, shown);
    let new_shown = f.store.lookup(new_shown).unwrap();
    assert_eq!(new_shown.collection("presentation"), &[new_item]);
    assert_eq!(new_shown.get("itemCount"), Some(&PropertyValue::Int(1)));
}
