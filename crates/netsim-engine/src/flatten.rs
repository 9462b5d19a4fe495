//! Read-only flattening of a scenario
//!
//! One depth-first walk produces the name-keyed element table used by the
//! validator and clone, a node/edge list for graph views, and the located
//! assets for map views.

use std::collections::HashSet;

use indexmap::IndexMap;
use netsim_model::{EopMode, NetCharScope, NodeKind};
use serde::Serialize;

use crate::element::Element;
use crate::mapper;
use crate::tree::{Node, NodeKey, ScenarioTree, Slot};

/// Elements by name, plus every name in use
///
/// Entries cover the scenario and every editable node. Names also include
/// implicit nodes, which have no entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ElementTable {
    entries: IndexMap<String, Element>,
    #[serde(skip)]
    names: HashSet<String>,
}

impl ElementTable {
    /// Empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, name: String, element: Element) {
        self.names.insert(name.clone());
        self.entries.insert(name, element);
    }

    fn reserve(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }

    /// Whether any node, implicit or not, uses this name
    #[inline]
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Element of an editable node
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Element> {
        self.entries.get(name)
    }

    /// Entries in depth-first order, scenario first
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Element)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every reserved name, including implicit nodes
    #[must_use]
    pub fn names(&self) -> &HashSet<String> {
        &self.names
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub level: i32,
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dashes: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// A node placed on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapAsset {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Vec<f64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eop_mode: Option<EopMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapData {
    pub ue: Vec<MapAsset>,
    pub poa: Vec<MapAsset>,
    pub compute: Vec<MapAsset>,
}

/// Result of [`parse_scenario`]
#[derive(Debug, Clone, Serialize)]
pub struct ParsedScenario {
    pub table: ElementTable,
    pub graph: GraphData,
    pub map: MapData,
}

/// Flatten a tree without mutating it
#[must_use]
pub fn parse_scenario(tree: &ScenarioTree) -> ParsedScenario {
    let mut table = ElementTable::new();
    let mut graph = GraphData::default();
    let mut map = MapData::default();

    table.insert(tree.name().to_string(), mapper::scenario_element(tree));
    graph.nodes.push(GraphNode {
        id: tree.name().to_string(),
        label: "Internet".to_string(),
        level: 0,
        group: "scenario".to_string(),
    });

    for key in tree.depth_first() {
        let Some(node) = tree.node(key) else {
            continue;
        };
        let Some(kind) = node.kind() else {
            table.reserve(node.name());
            continue;
        };
        if let Some(element) = mapper::to_element(tree, node.id()) {
            table.insert(node.name().to_string(), element);
        }

        let parent = tree.visible_parent(key);
        graph.nodes.push(GraphNode {
            id: node.id().to_string(),
            label: node.name().to_string(),
            level: graph_level(tree, key, kind),
            group: graph_group(node, kind),
        });
        graph.edges.push(GraphEdge {
            from: tree.id_of(parent).unwrap_or_default().to_string(),
            to: node.id().to_string(),
            label: edge_latency(tree, parent, kind).map(|ms| format!("{ms} ms")),
            dashes: kind == NodeKind::Ue,
        });

        if let Some(asset) = map_asset(node, kind) {
            match kind {
                NodeKind::Ue => map.ue.push(asset),
                k if k.is_poa() => map.poa.push(asset),
                _ => map.compute.push(asset),
            }
        }
    }

    tracing::debug!(
        entries = table.len(),
        nodes = graph.nodes.len(),
        "parsed scenario"
    );
    ParsedScenario { table, graph, map }
}

fn graph_level(tree: &ScenarioTree, key: NodeKey, kind: NodeKind) -> i32 {
    match kind {
        NodeKind::Scenario => 0,
        NodeKind::Operator | NodeKind::OperatorCellular => 1,
        NodeKind::Zone | NodeKind::CoreNetwork => 2,
        NodeKind::Poa | NodeKind::Poa4G | NodeKind::Poa5G | NodeKind::PoaWifi => 3,
        NodeKind::Edge => 3,
        NodeKind::Fog | NodeKind::Ue => 4,
        NodeKind::DistantCloud => -1,
        NodeKind::EdgeApp | NodeKind::MecService => {
            let on_edge = tree.parent_of(key).and_then(|p| tree.kind_of(p)) == Some(NodeKind::Edge);
            if on_edge {
                4
            } else {
                5
            }
        }
        NodeKind::UeApp => 5,
        NodeKind::CloudApp => -2,
    }
}

fn graph_group(node: &Node, kind: NodeKind) -> String {
    let (external, base) = match node {
        Node::Domain(_) => return "domain".to_string(),
        Node::Zone(_) => return "zone".to_string(),
        Node::NetworkLocation(_) => return "nLocPoa".to_string(),
        Node::PhysicalLocation(attrs) => (attrs.is_external, "pLoc"),
        Node::Process(p) => (p.is_external(), "proc"),
    };
    let scope = if external { "Ext" } else { "Int" };
    let suffix = match kind {
        NodeKind::Fog => "Fog",
        NodeKind::Edge => "Edge",
        NodeKind::Ue => "UE",
        NodeKind::CoreNetwork => "CN",
        NodeKind::DistantCloud => "DC",
        NodeKind::EdgeApp => "EdgeApp",
        NodeKind::MecService => "MecSvc",
        NodeKind::UeApp => "UEApp",
        NodeKind::CloudApp => "CloudApp",
        _ => "",
    };
    format!("{base}{scope}{suffix}")
}

/// Latency shown on the edge into a node of `kind`
fn edge_latency(tree: &ScenarioTree, parent: Slot, kind: NodeKind) -> Option<f64> {
    let half_inter_domain = || {
        let latency = tree
            .net_char()
            .map_or(NetCharScope::InterDomain.defaults().latency, |nc| nc.latency);
        Some(f64::from(latency) / 2.0)
    };
    let parent_latency = || {
        let latency = match parent {
            Slot::Root => tree.net_char().map(|nc| nc.latency),
            Slot::Node(k) => tree.node(k).and_then(Node::net_char).map(|nc| nc.latency),
        }?;
        (latency != 0).then(|| f64::from(latency))
    };
    match kind {
        NodeKind::Operator | NodeKind::OperatorCellular | NodeKind::DistantCloud => {
            half_inter_domain()
        }
        NodeKind::Poa | NodeKind::Poa4G | NodeKind::Poa5G | NodeKind::PoaWifi | NodeKind::Ue => {
            parent_latency()
        }
        _ => None,
    }
}

fn map_asset(node: &Node, kind: NodeKind) -> Option<MapAsset> {
    let geo = match node {
        Node::NetworkLocation(attrs) => attrs.geo_data.as_ref(),
        Node::PhysicalLocation(attrs) => attrs.geo_data.as_ref(),
        _ => None,
    }?;
    let location = geo.location.as_ref()?;
    Some(MapAsset {
        name: node.name().to_string(),
        kind: kind.label().to_string(),
        location: location.coordinates.clone(),
        radius: geo.radius,
        path: geo.path.as_ref().map(|p| p.coordinates.clone()),
        eop_mode: geo.eop_mode,
        velocity: geo.velocity,
    })
}
