//! Testing utilities for the NetSim workspace
//!
//! Shared fixtures and element builders.

#![allow(missing_docs)]

use netsim_engine::{
    add_element_to_scenario, create_new_scenario, Element, Field, NetCharAttr, ScenarioTree,
};
use netsim_model::{DocumentFormat, NetCharScope, NodeKind};

/// Blank element of `kind` with a name and parent
pub fn element(kind: NodeKind, name: &str, parent: &str) -> Element {
    Element::blank(kind)
        .with(Field::Name, name)
        .with(Field::Parent, parent)
}

/// Id of the node called `name`
pub fn id_of(tree: &ScenarioTree, name: &str) -> String {
    let key = tree
        .key_of_name(name)
        .unwrap_or_else(|| panic!("no node named {name}"));
    tree.node(key).unwrap().id().to_string()
}

/// Element view of the node called `name`
pub fn element_of(tree: &ScenarioTree, name: &str) -> Element {
    netsim_engine::get_element_from_scenario(tree, &id_of(tree, name)).unwrap()
}

pub fn add(tree: &mut ScenarioTree, kind: NodeKind, name: &str, parent: &str) -> String {
    add_element_to_scenario(tree, &element(kind, name, parent)).unwrap()
}

/// A scenario with one node of every kind
///
/// ```text
/// demo
/// ├── operator-1 (OPERATOR)
/// │   ├── zone-1
/// │   │   ├── poa-1 ── ue-1 ── ue-app-1
/// │   │   │        └─ fog-1 ── mec-svc-1
/// │   │   ├── poa-5g-1
/// │   │   └── edge-1 ── edge-app-1
/// │   ├── cn-1
/// │   └── poa-wifi-1
/// ├── operator-cell (OPERATOR CELLULAR)
/// │   └── poa-4g-1
/// └── cloud-1 ── cloud-app-1
/// ```
pub fn sample_scenario() -> ScenarioTree {
    let mut tree = create_new_scenario("demo").unwrap();
    add(&mut tree, NodeKind::Operator, "operator-1", "demo");
    add(&mut tree, NodeKind::OperatorCellular, "operator-cell", "demo");
    add(&mut tree, NodeKind::Zone, "zone-1", "operator-1");
    add(&mut tree, NodeKind::Poa, "poa-1", "zone-1");
    add(&mut tree, NodeKind::Poa5G, "poa-5g-1", "zone-1");
    add(&mut tree, NodeKind::PoaWifi, "poa-wifi-1", "operator-1");
    add(&mut tree, NodeKind::Poa4G, "poa-4g-1", "operator-cell");
    add(&mut tree, NodeKind::CoreNetwork, "cn-1", "operator-1");
    add(&mut tree, NodeKind::Edge, "edge-1", "zone-1");
    add(&mut tree, NodeKind::Fog, "fog-1", "poa-1");
    add(&mut tree, NodeKind::Ue, "ue-1", "poa-1");
    add(&mut tree, NodeKind::DistantCloud, "cloud-1", "");
    add(&mut tree, NodeKind::UeApp, "ue-app-1", "ue-1");
    add(&mut tree, NodeKind::MecService, "mec-svc-1", "fog-1");
    add(&mut tree, NodeKind::EdgeApp, "edge-app-1", "edge-1");
    add(&mut tree, NodeKind::CloudApp, "cloud-app-1", "cloud-1");
    tree
}

/// A scenario whose elements carry a value in every attribute their kind has
///
/// Same shape as [`sample_scenario`] minus the plain POA, with one process
/// per deployment style: container (edge-app-1), user chart (ue-app-1),
/// external (cloud-app-1).
pub fn populated_scenario() -> ScenarioTree {
    let inter_zone = |attr| Field::net_char(NetCharScope::InterZone, attr);
    let link = |attr| Field::net_char(NetCharScope::Link, attr);
    let poa_link = |attr| Field::net_char(NetCharScope::TerminalLink, attr);
    let app = |attr| Field::net_char(NetCharScope::App, attr);

    let mut tree = create_new_scenario("demo").unwrap();
    let elements = [
        element(NodeKind::Operator, "operator-1", "demo")
            .with(inter_zone(NetCharAttr::Latency), 7)
            .with(inter_zone(NetCharAttr::LatencyDistribution), "Pareto"),
        element(NodeKind::OperatorCellular, "operator-cell", "demo")
            .with(Field::CellularMcc, "001")
            .with(Field::CellularMnc, "01")
            .with(Field::CellularDefaultCellId, "1a2b3c4d5"),
        element(NodeKind::Zone, "zone-1", "operator-1")
            .with(Field::MapColor, "#A1B2C3")
            .with(
                Field::net_char(NetCharScope::IntraZone, NetCharAttr::ThroughputDl),
                750,
            ),
        element(NodeKind::Poa5G, "poa-5g-1", "zone-1")
            .with(Field::CellId5G, "1234abcd5")
            .with(Field::GeoLocation, "[7.418,43.734]")
            .with(Field::GeoRadius, 400)
            .with(poa_link(NetCharAttr::Latency), 2),
        element(NodeKind::PoaWifi, "poa-wifi-1", "operator-1")
            .with(Field::PoaMacId, "0a1b2c3d4e5f")
            .with(Field::GeoLocation, "[7.42,43.73]"),
        element(NodeKind::Poa4G, "poa-4g-1", "operator-cell")
            .with(Field::CellId4G, "abc1234")
            .with(poa_link(NetCharAttr::PacketLoss), 0.5),
        element(NodeKind::CoreNetwork, "cn-1", "operator-1")
            .with(Field::DnName, "apn-1")
            .with(Field::DnLadn, true)
            .with(Field::DnEcsp, "ecsp-1"),
        element(NodeKind::Edge, "edge-1", "zone-1")
            .with(Field::IsExternal, true)
            .with(Field::GeoLocation, "[7.41,43.72]")
            .with(link(NetCharAttr::LatencyVariation), 3),
        element(NodeKind::Fog, "fog-1", "poa-5g-1")
            .with(Field::Connected, false)
            .with(Field::GeoLocation, "[7.43,43.74]"),
        element(NodeKind::Ue, "ue-1", "poa-5g-1")
            .with(Field::Wireless, true)
            .with(Field::WirelessType, "wifi,5g")
            .with(Field::MacId, "aabbccddeeff")
            .with(Field::GeoLocation, "[7.41,43.73]")
            .with(Field::GeoPath, "[[7.41,43.73],[7.42,43.74]]")
            .with(Field::GeoEopMode, "LOOP")
            .with(Field::GeoVelocity, 12.5),
        element(NodeKind::DistantCloud, "cloud-1", "")
            .with(link(NetCharAttr::ThroughputUl), 250),
        element(NodeKind::EdgeApp, "edge-app-1", "edge-1")
            .with(Field::Image, "nginx:latest")
            .with(Field::EnvVar, "MODE=edge,LOG=debug")
            .with(Field::Cmd, "/bin/sh")
            .with(Field::CmdArgs, "-c,run")
            .with(Field::Port, 80)
            .with(Field::Protocol, "TCP")
            .with(Field::Group, "svc-group")
            .with(Field::ExtPort, 31500)
            .with(Field::GpuCount, 1)
            .with(Field::GpuType, "NVIDIA")
            .with(Field::CpuMin, 0.5)
            .with(Field::CpuMax, 2.0)
            .with(Field::MemoryMin, 128)
            .with(Field::MemoryMax, 512)
            .with(Field::PlacementId, "node-a")
            .with(app(NetCharAttr::Latency), 1),
        element(NodeKind::MecService, "mec-svc-1", "fog-1")
            .with(Field::Image, "mec:1.0")
            .with(Field::Port, 8080)
            .with(Field::Protocol, "UDP"),
        element(NodeKind::UeApp, "ue-app-1", "ue-1")
            .with(Field::ChartEnabled, true)
            .with(Field::ChartLoc, "/charts/ue-app")
            .with(Field::ChartVal, "/charts/ue-app/values.yaml")
            .with(Field::ChartGroup, "ue-group"),
        element(NodeKind::CloudApp, "cloud-app-1", "cloud-1")
            .with(Field::IsExternal, true)
            .with(Field::IngressSvcMap, "31800:svc:80:TCP")
            .with(Field::EgressSvcMap, "svc:grp:10.0.0.1:80:UDP"),
    ];
    for e in &elements {
        add_element_to_scenario(&mut tree, e).unwrap();
    }
    tree
}

/// The sample scenario rendered as a document
pub fn sample_document(format: DocumentFormat) -> String {
    sample_scenario().to_scenario().render(format).unwrap()
}
