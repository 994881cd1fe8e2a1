//! Element types every model carries, regardless of notation

use crate::model::{ElementType, PropertyDef, ScalarType, Shape};

use super::ModelingLanguage;

pub const LANGUAGE: &str = "Core";

pub static DIAGRAM: ElementType = ElementType {
    name: "Diagram",
    language: LANGUAGE,
    shape: Shape::Diagram,
    properties: &[
        PropertyDef::attribute("name", ScalarType::Str),
        PropertyDef::reference("element").owner().opposite("ownedDiagram"),
        PropertyDef::collection("ownedPresentation").owned().opposite("diagram"),
        PropertyDef::collection("presentation").opposite("subject"),
    ],
    postload: None,
};

pub static STYLE_SHEET: ElementType = ElementType {
    name: "StyleSheet",
    language: LANGUAGE,
    shape: Shape::StyleSheet,
    properties: &[
        PropertyDef::attribute("styleSheet", ScalarType::Str),
        PropertyDef::attribute("naturalLanguage", ScalarType::Str),
    ],
    postload: None,
};

pub static COMMENT: ElementType = ElementType {
    name: "Comment",
    language: LANGUAGE,
    shape: Shape::Element,
    properties: &[
        PropertyDef::attribute("body", ScalarType::Str),
        PropertyDef::collection("annotatedElement"),
        PropertyDef::collection("presentation").opposite("subject"),
    ],
    postload: None,
};

pub static ELEMENT_CHANGE: ElementType = ElementType {
    name: "ElementChange",
    language: LANGUAGE,
    shape: Shape::Element,
    properties: &[
        PropertyDef::attribute("op", ScalarType::Str),
        PropertyDef::attribute("elementId", ScalarType::Str),
        PropertyDef::attribute("elementName", ScalarType::Str),
        PropertyDef::attribute("modelingLanguage", ScalarType::Str),
        PropertyDef::attribute("diagramId", ScalarType::Str),
        PropertyDef::attribute("applied", ScalarType::Bool),
    ],
    postload: None,
};

pub static VALUE_CHANGE: ElementType = ElementType {
    name: "ValueChange",
    language: LANGUAGE,
    shape: Shape::Element,
    properties: &[
        PropertyDef::attribute("op", ScalarType::Str),
        PropertyDef::attribute("elementId", ScalarType::Str),
        PropertyDef::attribute("propertyName", ScalarType::Str),
        PropertyDef::attribute("propertyValue", ScalarType::Str),
        PropertyDef::attribute("propertyType", ScalarType::Str),
        PropertyDef::attribute("applied", ScalarType::Bool),
    ],
    postload: None,
};

pub static REF_CHANGE: ElementType = ElementType {
    name: "RefChange",
    language: LANGUAGE,
    shape: Shape::Element,
    properties: &[
        PropertyDef::attribute("op", ScalarType::Str),
        PropertyDef::attribute("elementId", ScalarType::Str),
        PropertyDef::attribute("propertyName", ScalarType::Str),
        PropertyDef::attribute("propertyRef", ScalarType::Str),
        PropertyDef::attribute("applied", ScalarType::Bool),
    ],
    postload: None,
};

/// Diagrams, the style sheet, comments and change records.
pub struct CoreModelingLanguage;

impl ModelingLanguage for CoreModelingLanguage {
    fn name(&self) -> &str {
        LANGUAGE
    }

    fn element_types(&self) -> Vec<&'static ElementType> {
        vec![&DIAGRAM, &STYLE_SHEET, &COMMENT, &ELEMENT_CHANGE, &VALUE_CHANGE, &REF_CHANGE]
    }
}
