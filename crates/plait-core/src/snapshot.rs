//! JSON snapshot documents describing a whole model store
//!
//! Property values use the same `[tag, payload]` transport form as
//! copy/paste, so a snapshot is just every node's serialized data plus
//! its id and type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::lang::ModelingLanguage;
use crate::model::NodeId;
use crate::serialize::{deserialize, serialize, Resolved, Serialized};
use crate::store::ModelStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub elements: Vec<ElementSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, Serialized>,
}

impl Snapshot {
    /// Capture every node of `store`, ordered by id.
    pub fn from_store(store: &ModelStore) -> Self {
        let mut elements: Vec<ElementSnapshot> = store
            .iter()
            .map(|(id, node)| ElementSnapshot {
                id,
                element_type: node.element_type().name.to_string(),
                namespace: Some(node.element_type().language.to_string()),
                properties: node
                    .save()
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), serialize(&value)))
                    .collect(),
            })
            .collect();
        elements.sort_by_key(|e| e.id);
        Snapshot { elements }
    }

    /// Materialize the snapshot as a new store, keeping every id.
    pub fn into_store(&self, language: &dyn ModelingLanguage) -> Result<ModelStore> {
        let mut store = ModelStore::new();

        for element in &self.elements {
            let element_type = language
                .lookup_element(&element.element_type, element.namespace.as_deref())?
                .ok_or_else(|| ModelError::UnknownType {
                    name: element.element_type.clone(),
                    namespace: element.namespace.clone(),
                })?;
            store.create_with_id(element_type, element.id)?;
        }

        for element in &self.elements {
            for (name, ser) in &element.properties {
                let values = deserialize(ser, &mut |id| store.contains(id).then_some(id));
                for value in values {
                    store.load(element.id, name, value)?;
                }
            }
        }

        // Opposite ends fill collections in load order; put the stored order back.
        for element in &self.elements {
            for (name, ser) in &element.properties {
                if !matches!(ser, Serialized::Collection(_)) {
                    continue;
                }
                let order: Vec<NodeId> = deserialize(ser, &mut |id| store.contains(id).then_some(id))
                    .into_iter()
                    .filter_map(|value| match value {
                        Resolved::Node(id) => Some(id),
                        Resolved::Value(_) => None,
                    })
                    .collect();
                store.reorder(element.id, name, &order)?;
            }
        }

        for element in &self.elements {
            store.postload(element.id);
        }

        tracing::debug!("Loaded snapshot with {} elements", store.len());
        Ok(store)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| match e.classify() {
            serde_json::error::Category::Data => ModelError::MalformedPayload(e.to_string()),
            _ => ModelError::Json(e),
        })
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
