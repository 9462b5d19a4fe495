//! Whole-scenario checks
//!
//! Id and name uniqueness are enforced by the arena itself, so a tree that
//! imported successfully already satisfies them.

use std::collections::BTreeSet;
use std::fmt;

use netsim_model::{AppDeployment, NodeKind};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::mapper;
use crate::tree::{Node, ScenarioTree};

use super::field::validate_fields;

/// One problem found in a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Name of the offending element
    pub element: String,
    pub message: String,
}

impl Issue {
    fn new(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.element, self.message)
    }
}

/// Every issue in the tree, in depth-first order
#[must_use]
pub fn validate_scenario(tree: &ScenarioTree) -> Vec<Issue> {
    validate_scenario_with(tree, &EngineConfig::default())
}

/// [`validate_scenario`] with field limits taken from `config`
#[must_use]
pub fn validate_scenario_with(tree: &ScenarioTree, config: &EngineConfig) -> Vec<Issue> {
    let mut issues = Vec::new();

    let mut root = mapper::scenario_element(tree);
    validate_fields(&mut root, config);
    issues.extend(
        root.errors()
            .map(|(field, msg)| Issue::new(tree.name(), format!("{field}: {msg}"))),
    );

    let mut exposed: Vec<(String, BTreeSet<i32>)> = Vec::new();
    for key in tree.depth_first() {
        let Some(node) = tree.node(key) else {
            continue;
        };
        let Some(kind) = node.kind() else {
            continue;
        };
        let name = node.name();

        let mut element = mapper::node_element(node, kind);
        validate_fields(&mut element, config);
        issues.extend(
            element
                .errors()
                .map(|(field, msg)| Issue::new(name, format!("{field}: {msg}"))),
        );

        match node {
            Node::PhysicalLocation(attrs) => {
                if kind == NodeKind::Ue {
                    let declares_dn = attrs
                        .data_network
                        .as_ref()
                        .is_some_and(|dn| dn.dnn.is_some() || dn.ecsp.is_some());
                    if declares_dn {
                        issues.push(Issue::new(name, "UE cannot declare a data network"));
                    }
                }
                if let Some(geo) = &attrs.geo_data {
                    if geo.path.is_none() && (geo.eop_mode.is_some() || geo.velocity.is_some()) {
                        issues.push(Issue::new(name, "end-of-path mode and velocity need a path"));
                    }
                }
            }
            Node::Process(process) => {
                match &process.deployment {
                    AppDeployment::Container(c) => {
                        if c.gpu_config.as_ref().is_some_and(|g| g.kind.is_none()) {
                            issues.push(Issue::new(name, "GPU count set without a GPU type"));
                        }
                        if let Some(cpu) = &c.cpu_config {
                            if let (Some(min), Some(max)) = (cpu.min, cpu.max) {
                                if min > max {
                                    issues.push(Issue::new(name, "CPU min exceeds max"));
                                }
                            }
                        }
                        if let Some(mem) = &c.memory_config {
                            if let (Some(min), Some(max)) = (mem.min, mem.max) {
                                if min > max {
                                    issues.push(Issue::new(name, "memory min exceeds max"));
                                }
                            }
                        }
                    }
                    AppDeployment::UserChart(chart) if chart.location.trim().is_empty() => {
                        issues.push(Issue::new(name, "user chart needs a location"));
                    }
                    _ => {}
                }

                let ports = process.external_ports();
                for (other, other_ports) in &exposed {
                    let shared: Vec<String> =
                        ports.intersection(other_ports).map(ToString::to_string).collect();
                    if !shared.is_empty() {
                        issues.push(Issue::new(
                            name,
                            format!("external port conflict with '{other}': {}", shared.join(", ")),
                        ));
                    }
                }
                if !ports.is_empty() {
                    exposed.push((name.to_string(), ports));
                }
            }
            _ => {}
        }
    }

    tracing::debug!(scenario = %tree.name(), issues = issues.len(), "validated scenario");
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, Field};
    use crate::ops::{add_element_to_scenario, create_new_scenario};

    fn el(kind: NodeKind, name: &str, parent: &str) -> Element {
        Element::blank(kind)
            .with(Field::Name, name)
            .with(Field::Parent, parent)
    }

    #[test]
    fn clean_scenario_has_no_issues() {
        let mut tree = create_new_scenario("demo").unwrap();
        add_element_to_scenario(&mut tree, &el(NodeKind::Operator, "op", "demo")).unwrap();
        assert!(validate_scenario(&tree).is_empty());
    }

    #[test]
    fn reports_every_issue() {
        let mut tree = create_new_scenario("demo").unwrap();
        add_element_to_scenario(&mut tree, &el(NodeKind::Operator, "op", "demo")).unwrap();
        add_element_to_scenario(&mut tree, &el(NodeKind::Poa, "poa", "op")).unwrap();
        let ue = el(NodeKind::Ue, "ue", "poa")
            .with(Field::DnName, "internet")
            .with(Field::GeoVelocity, 10.0);
        add_element_to_scenario(&mut tree, &ue).unwrap();
        add_element_to_scenario(&mut tree, &el(NodeKind::Edge, "edge", "op")).unwrap();
        for app in ["a1", "a2"] {
            let e = el(NodeKind::EdgeApp, app, "edge")
                .with(Field::Port, 80)
                .with(Field::ExtPort, 31000);
            add_element_to_scenario(&mut tree, &e).unwrap();
        }

        let issues = validate_scenario(&tree);
        let messages: Vec<String> = issues.iter().map(ToString::to_string).collect();
        assert_eq!(issues.len(), 3, "{messages:?}");
        assert!(messages.iter().any(|m| m.starts_with("ue: UE cannot")));
        assert!(messages.iter().any(|m| m.contains("need a path")));
        assert!(messages.iter().any(|m| m == "a2: external port conflict with 'a1': 31000"));
    }

    #[test]
    fn field_errors_surface_per_element() {
        let mut tree = create_new_scenario("demo").unwrap();
        add_element_to_scenario(&mut tree, &el(NodeKind::Operator, "op", "demo")).unwrap();
        let z = el(NodeKind::Zone, "zone", "op").with(Field::MapColor, "blue");
        add_element_to_scenario(&mut tree, &z).unwrap();
        let issues = validate_scenario(&tree);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].element, "zone");
        assert!(issues[0].message.starts_with("mapColor:"));
    }

    #[test]
    fn name_limit_comes_from_config() {
        let mut tree = create_new_scenario("demo").unwrap();
        add_element_to_scenario(&mut tree, &el(NodeKind::Operator, "operator-one", "demo")).unwrap();
        assert!(validate_scenario(&tree).is_empty());
        let strict = EngineConfig::default().with_max_name_len(8);
        let issues = validate_scenario_with(&tree, &strict);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].element, "operator-one");
    }
}
