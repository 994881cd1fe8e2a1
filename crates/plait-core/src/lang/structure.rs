//! A small class-modeling notation: packages, classes and their diagram items

use crate::model::{ElementType, Node, PropertyDef, PropertyValue, ScalarType, Shape};

use super::ModelingLanguage;

pub const LANGUAGE: &str = "Structure";

pub static PACKAGE: ElementType = ElementType {
    name: "Package",
    language: LANGUAGE,
    shape: Shape::Element,
    properties: &[
        PropertyDef::attribute("name", ScalarType::Str),
        PropertyDef::reference("package").owner().opposite("packagedElement"),
        PropertyDef::collection("packagedElement").owned().opposite("package"),
        PropertyDef::collection("ownedDiagram").owned().opposite("element"),
        PropertyDef::collection("presentation").opposite("subject"),
    ],
    postload: None,
};

pub static CLASS: ElementType = ElementType {
    name: "Class",
    language: LANGUAGE,
    shape: Shape::Element,
    properties: &[
        PropertyDef::attribute("name", ScalarType::Str),
        PropertyDef::attribute("isAbstract", ScalarType::Bool),
        PropertyDef::reference("package").owner().opposite("packagedElement"),
        PropertyDef::collection("ownedAttribute").owned().opposite("class"),
        PropertyDef::collection("generalization").owned().opposite("specific"),
        PropertyDef::collection("presentation").opposite("subject"),
    ],
    postload: None,
};

pub static PROPERTY: ElementType = ElementType {
    name: "Property",
    language: LANGUAGE,
    shape: Shape::Element,
    properties: &[
        PropertyDef::attribute("name", ScalarType::Str),
        PropertyDef::attribute("lowerValue", ScalarType::Int),
        PropertyDef::attribute("upperValue", ScalarType::UnlimitedNatural),
        PropertyDef::reference("class").owner().opposite("ownedAttribute"),
        PropertyDef::reference("type"),
        PropertyDef::reference("redefinedProperty"),
        PropertyDef::collection("presentation").opposite("subject"),
    ],
    postload: Some(normalize_multiplicity),
};

pub static GENERALIZATION: ElementType = ElementType {
    name: "Generalization",
    language: LANGUAGE,
    shape: Shape::Element,
    properties: &[
        PropertyDef::reference("specific").owner().opposite("generalization"),
        PropertyDef::reference("general"),
        PropertyDef::collection("presentation").opposite("subject"),
    ],
    postload: None,
};

pub static SLOT: ElementType = ElementType {
    name: "Slot",
    language: LANGUAGE,
    shape: Shape::Element,
    properties: &[
        PropertyDef::reference("definingFeature"),
        PropertyDef::reference("value").owned().opposite("owningSlot"),
        PropertyDef::collection("presentation").opposite("subject"),
    ],
    postload: None,
};

pub static LITERAL_INTEGER: ElementType = ElementType {
    name: "LiteralInteger",
    language: LANGUAGE,
    shape: Shape::Element,
    properties: &[
        PropertyDef::attribute("value", ScalarType::Int),
        PropertyDef::reference("owningSlot").owner().opposite("value"),
        PropertyDef::collection("presentation").opposite("subject"),
    ],
    postload: None,
};

pub static PACKAGE_ITEM: ElementType = ElementType {
    name: "PackageItem",
    language: LANGUAGE,
    shape: Shape::Presentation,
    properties: &[
        PropertyDef::reference("diagram").owner().opposite("ownedPresentation"),
        PropertyDef::reference("parent").opposite("children"),
        PropertyDef::collection("children").opposite("parent"),
        PropertyDef::reference("subject").opposite("presentation"),
        PropertyDef::attribute("width", ScalarType::Int),
        PropertyDef::attribute("height", ScalarType::Int),
    ],
    postload: None,
};

pub static CLASS_ITEM: ElementType = ElementType {
    name: "ClassItem",
    language: LANGUAGE,
    shape: Shape::Presentation,
    properties: &[
        PropertyDef::reference("diagram").owner().opposite("ownedPresentation"),
        PropertyDef::reference("parent").opposite("children"),
        PropertyDef::collection("children").opposite("parent"),
        PropertyDef::reference("subject").opposite("presentation"),
        PropertyDef::attribute("width", ScalarType::Int),
        PropertyDef::attribute("height", ScalarType::Int),
        PropertyDef::attribute("showAttributes", ScalarType::Bool),
    ],
    postload: None,
};

pub static GENERALIZATION_ITEM: ElementType = ElementType {
    name: "GeneralizationItem",
    language: LANGUAGE,
    shape: Shape::Presentation,
    properties: &[
        PropertyDef::reference("diagram").owner().opposite("ownedPresentation"),
        PropertyDef::reference("parent").opposite("children"),
        PropertyDef::collection("children").opposite("parent"),
        PropertyDef::reference("subject").opposite("presentation"),
        PropertyDef::reference("head"),
        PropertyDef::reference("tail"),
    ],
    postload: None,
};

/// An upper bound below the lower bound is raised to meet it.
fn normalize_multiplicity(node: &mut Node) {
    let lower = match node.get("lowerValue") {
        Some(PropertyValue::Int(lower)) => *lower,
        _ => return,
    };
    if let Some(PropertyValue::Int(upper)) = node.get("upperValue") {
        if *upper < lower {
            node.set_scalar("upperValue", Some(PropertyValue::Int(lower)));
        }
    }
}

/// Packages, classes, attributes and generalizations, plus their items.
pub struct StructureLanguage;

impl ModelingLanguage for StructureLanguage {
    fn name(&self) -> &str {
        LANGUAGE
    }

    fn element_types(&self) -> Vec<&'static ElementType> {
        vec![
            &PACKAGE,
            &CLASS,
            &PROPERTY,
            &GENERALIZATION,
            &SLOT,
            &LITERAL_INTEGER,
            &PACKAGE_ITEM,
            &CLASS_ITEM,
            &GENERALIZATION_ITEM,
        ]
    }
}
