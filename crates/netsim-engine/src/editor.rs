//! Validated editing session over one scenario
//!
//! Wraps a [`ScenarioTree`] with an [`EngineConfig`] and runs the field and
//! commit validators before every add, update or clone.

use crate::config::EngineConfig;
use crate::element::Element;
use crate::error::{EngineError, Result};
use crate::flatten::{parse_scenario, ParsedScenario};
use crate::ops;
use crate::tree::ScenarioTree;
use crate::validate::{
    validate_element, validate_fields, validate_scenario_with, CommitMode, Issue,
};

/// A scenario plus the configuration its edits run under
#[derive(Debug, Clone)]
pub struct ScenarioEditor {
    tree: ScenarioTree,
    config: EngineConfig,
}

impl ScenarioEditor {
    /// Edit an existing tree
    #[inline]
    #[must_use]
    pub fn new(tree: ScenarioTree, config: EngineConfig) -> Self {
        Self { tree, config }
    }

    /// Start from a fresh scenario
    ///
    /// # Errors
    /// See [`ops::create_new_scenario`]
    pub fn create(name: &str, config: EngineConfig) -> Result<Self> {
        Ok(Self::new(ops::create_new_scenario(name)?, config))
    }

    /// Current tree
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &ScenarioTree {
        &self.tree
    }

    /// Configuration edits run under
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Give up the session and keep the tree
    #[must_use]
    pub fn into_tree(self) -> ScenarioTree {
        self.tree
    }

    /// Element view of the node with `id`
    #[must_use]
    pub fn element(&self, id: &str) -> Option<Element> {
        ops::get_element_from_scenario(&self.tree, id)
    }

    /// Validate then insert, returning the new id
    ///
    /// # Errors
    /// `Validation` when a check fails, otherwise see
    /// [`ops::add_element_to_scenario`]
    pub fn add(&mut self, element: &Element) -> Result<String> {
        let element = self.checked(element, CommitMode::Add)?;
        ops::add_element_with(&mut self.tree, &element, &self.config)
    }

    /// Validate then overwrite
    ///
    /// # Errors
    /// `Validation` when a check fails, otherwise see
    /// [`ops::update_element_in_scenario`]
    pub fn update(&mut self, element: &Element) -> Result<()> {
        let element = self.checked(element, CommitMode::Update)?;
        ops::update_element_with(&mut self.tree, &element)
    }

    /// Deep-copy a subtree, naming against the current table
    ///
    /// The copy is built on a scratch tree and every copied element passes
    /// the field and commit checks before the scratch tree replaces the
    /// current one.
    ///
    /// # Errors
    /// `Validation` when a copy fails a check, otherwise see
    /// [`ops::clone_element_in_scenario`]
    pub fn clone_element(&mut self, element: &Element) -> Result<String> {
        let table = parse_scenario(&self.tree).table;
        if !self.config.validate_on_commit {
            return ops::clone_element_with(&mut self.tree, element, &table, &self.config);
        }

        let mut scratch = self.tree.clone();
        let id = ops::clone_element_with(&mut scratch, element, &table, &self.config)?;
        let key = scratch
            .key_of_id(&id)
            .ok_or_else(|| EngineError::NotFound(id.clone()))?;
        let after = parse_scenario(&scratch).table;
        for k in scratch.subtree(key) {
            let Some(mut copy) = scratch
                .node(k)
                .and_then(|node| ops::get_element_from_scenario(&scratch, node.id()))
            else {
                continue;
            };
            validate_fields(&mut copy, &self.config);
            if let Err(err) = validate_element(&copy, &after, CommitMode::Update) {
                tracing::warn!(element = %copy.name(), %err, "rejected clone");
                return Err(err.into());
            }
        }
        self.tree = scratch;
        Ok(id)
    }

    /// Remove a node and its subtree
    ///
    /// # Errors
    /// See [`ops::remove_element_from_scenario`]
    pub fn remove(&mut self, element: &Element) -> Result<Vec<String>> {
        ops::remove_element_from_scenario(&mut self.tree, element)
    }

    /// Element table, graph and map of the current tree
    #[must_use]
    pub fn parse(&self) -> ParsedScenario {
        parse_scenario(&self.tree)
    }

    /// Every issue in the current tree
    #[must_use]
    pub fn validate(&self) -> Vec<Issue> {
        validate_scenario_with(&self.tree, &self.config)
    }

    fn checked(&self, element: &Element, mode: CommitMode) -> Result<Element> {
        let mut element = element.clone();
        if !self.config.validate_on_commit {
            return Ok(element);
        }
        validate_fields(&mut element, &self.config);
        let table = parse_scenario(&self.tree).table;
        if let Err(err) = validate_element(&element, &table, mode) {
            tracing::warn!(element = %element.name(), ?mode, %err, "rejected commit");
            return Err(err.into());
        }
        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Field;
    use crate::validate::ValidationError;
    use netsim_model::NodeKind;

    fn el(kind: NodeKind, name: &str, parent: &str) -> Element {
        Element::blank(kind)
            .with(Field::Name, name)
            .with(Field::Parent, parent)
    }

    fn editor() -> ScenarioEditor {
        let mut editor = ScenarioEditor::create("demo", EngineConfig::default()).unwrap();
        editor.add(&el(NodeKind::Operator, "op", "demo")).unwrap();
        editor.add(&el(NodeKind::Edge, "edge", "op")).unwrap();
        editor
    }

    #[test]
    fn rejects_bad_field_before_touching_tree() {
        let mut editor = editor();
        let before = editor.tree().len();
        let err = editor
            .add(&el(NodeKind::Zone, "Bad_Name", "op"))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::FieldErrors {
                field: Field::Name,
                ..
            })
        ));
        assert_eq!(editor.tree().len(), before);
    }

    #[test]
    fn port_conflict_then_free_port() {
        let mut editor = editor();
        let app = |name: &str, port: i64| {
            el(NodeKind::EdgeApp, name, "edge")
                .with(Field::Port, 80)
                .with(Field::ExtPort, port)
        };
        editor.add(&app("app-1", 32000)).unwrap();
        let err = editor.add(&app("app-2", 32000)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::PortConflict { .. })
        ));
        editor.add(&app("app-2", 32001)).unwrap();
        assert!(editor.validate().is_empty());
    }

    #[test]
    fn commit_checks_can_be_disabled() {
        let config = EngineConfig::default().with_validate_on_commit(false);
        let mut editor = ScenarioEditor::create("demo", config).unwrap();
        editor.add(&el(NodeKind::Operator, "op", "demo")).unwrap();
        let zone = el(NodeKind::Zone, "zone", "op").with(Field::MapColor, "blue");
        editor.add(&zone).unwrap();
        assert_eq!(editor.validate().len(), 1);
    }

    #[test]
    fn update_and_clone_round_trip_through_editor() {
        let mut editor = editor();
        let id = editor.tree().key_of_name("edge").map(|k| {
            editor.tree().node(k).unwrap().id().to_string()
        });
        let id = id.unwrap();
        let mut edge = editor.element(&id).unwrap();
        edge.set(Field::GeoLocation, "[7.42,43.73]");
        editor.update(&edge).unwrap();
        let updated = editor.element(&id).unwrap();
        assert!(!updated.text(Field::GeoLocation).is_empty());

        let copy = editor.clone_element(&updated).unwrap();
        let copied = editor.element(&copy).unwrap();
        assert_eq!(copied.name(), "edge-copy");
        assert_eq!(copied.text(Field::GeoLocation), updated.text(Field::GeoLocation));

        let removed = editor.remove(&copied).unwrap();
        assert_eq!(removed, vec![copy]);
    }
}
