//! NetSim scenario engine
//!
//! Holds a scenario as an arena tree and edits it through flat, name-keyed
//! elements, the shape edit forms work with.
//!
//! # Core Concepts
//!
//! - [`ScenarioTree`]: arena of domains, zones, network locations, physical
//!   locations and processes, with explicit links to implicit children
//! - [`Element`]: flat field map with a per-field error slot
//! - [`ops`]: create / add / update / clone / remove
//! - [`validate`]: field, commit and whole-document checks
//! - [`parse_scenario`]: element table, graph and map views of a tree
//! - [`ScenarioEditor`]: validated editing session
//!
//! # Example
//!
//! ```rust,ignore
//! use netsim_engine::prelude::*;
//!
//! let mut editor = ScenarioEditor::create("demo", EngineConfig::default())?;
//! let op = Element::blank(NodeKind::Operator)
//!     .with(Field::Name, "operator-1")
//!     .with(Field::Parent, "demo");
//! let id = editor.add(&op)?;
//! assert_eq!(editor.element(&id).unwrap().name(), "operator-1");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod editor;
pub mod element;
pub mod error;
pub mod flatten;
pub mod id;
pub mod mapper;
pub mod ops;
pub mod registry;
pub mod tree;
pub mod validate;

pub use config::EngineConfig;
pub use editor::ScenarioEditor;
pub use element::{Element, Field, FieldEntry, FieldValue, NetCharAttr};
pub use error::{EngineError, Result};
pub use flatten::{
    parse_scenario, ElementTable, GraphData, GraphEdge, GraphNode, MapAsset, MapData,
    ParsedScenario,
};
pub use ops::{
    add_element_to_scenario, clone_element_in_scenario, create_new_scenario,
    get_element_from_scenario, remove_element_from_scenario, update_element_in_scenario,
};
pub use tree::{Node, NodeKey, ScenarioTree, Slot, TreeNode};
pub use validate::{
    validate_element, validate_scenario, validate_scenario_with, CommitMode, Issue,
    ValidationError,
};

/// Common imports for working with the engine
pub mod prelude {
    pub use crate::{
        parse_scenario, EngineConfig, EngineError, Element, Field, ScenarioEditor, ScenarioTree,
    };
    pub use netsim_model::{NodeKind, Scenario};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
