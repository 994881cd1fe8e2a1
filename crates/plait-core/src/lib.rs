//! Plait Core — Model graph, node store, serializer and ownership relation

pub mod model;
pub mod store;
pub mod serialize;
pub mod ownership;
pub mod diagram;
pub mod lang;
pub mod snapshot;
pub mod error;
pub mod test_utils;


pub use model::{NodeId, Node, ElementType, PropertyDef, PropertyKind, PropertyValue, ScalarType, Shape};
pub use store::ModelStore;
pub use serialize::{Serialized, Resolved, PropertyData, serialize, deserialize, try_deserialize, copy_base_data};
pub use ownership::{Ownership, SchemaOwnership};
pub use diagram::{DiagramUpdate, RecordedUpdates, create_item, ensure_diagram, lookup_item};
pub use lang::{ModelingLanguage, CombinedModelingLanguage, CoreModelingLanguage, StructureLanguage, default_language};
pub use snapshot::{Snapshot, ElementSnapshot};
pub use error::{ModelError, Result};
