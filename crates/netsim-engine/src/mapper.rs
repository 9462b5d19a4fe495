//! Element <-> tree node conversion
//!
//! [`to_element`] projects one node into a flat [`Element`];
//! [`to_tree_node`] builds a node back from one. Both directions go through
//! the per-level `read_*`/`write_*` pairs below, so every attribute one side
//! writes the other side reads.
//!
//! Nested values travel as strings on the element side: geo coordinates as
//! JSON arrays, service maps as `a:b:c` lists.

use std::collections::BTreeMap;

use netsim_model::{
    AppDeployment, CellConfig, CellularDomainConfig, Connectivity, ConnectivityModel, Container,
    CpuConfig, DataNetwork, DomainAttrs, DomainType, EgressServiceMap, EopMode, ExternalConfig,
    GeoData, GpuConfig, IngressServiceMap, LatencyDistribution, LineString, MemoryConfig, NetChar,
    NetCharScope, NetworkLocationAttrs, NetworkLocationType, NodeKind, PhysicalLocationAttrs,
    PhysicalLocationType, Point, Process, ProcessType, ServiceConfig, ServicePort, UserChart,
    WifiConfig, ZoneAttrs, ZoneType, DISPLAY_MAP_COLOR, THROUGHPUT_DEFAULT,
};

use crate::element::{Element, Field, FieldValue, NetCharAttr};
use crate::error::{EngineError, Result};
use crate::tree::{Node, ScenarioTree};

/// Flat projection of the node with `id`
///
/// `id` equal to the scenario name selects the root. Unknown ids and
/// implicit nodes give `None`.
#[must_use]
pub fn to_element(tree: &ScenarioTree, id: &str) -> Option<Element> {
    if id == tree.name() {
        return Some(scenario_element(tree));
    }
    let key = tree.key_of_id(id)?;
    let node = tree.node(key)?;
    let kind = node.kind()?;
    let mut element = node_element(node, kind);
    let parent = tree.visible_parent(key);
    element.set(Field::Parent, tree.name_of(parent).unwrap_or_default());
    Some(element)
}

/// Element of the scenario root
#[must_use]
pub fn scenario_element(tree: &ScenarioTree) -> Element {
    let mut element = Element::blank(NodeKind::Scenario);
    element.set(Field::Id, tree.name());
    element.set(Field::Name, tree.name());
    let model = tree.connectivity().unwrap_or_default().model;
    element.set(Field::ConnectivityModel, model.as_str());
    write_netchar(&mut element, NetCharScope::InterDomain, tree.net_char());
    element
}

/// Element of one non-root node, without its parent field
#[must_use]
pub fn node_element(node: &Node, kind: NodeKind) -> Element {
    let mut element = Element::blank(kind);
    element.set(Field::Id, node.id());
    element.set(Field::Name, node.name());
    write_netchar(&mut element, kind.netchar_scope(), node.net_char());
    match node {
        Node::Domain(attrs) => write_domain(&mut element, attrs),
        Node::Zone(attrs) => write_zone(&mut element, attrs),
        Node::NetworkLocation(attrs) => write_network_location(&mut element, attrs),
        Node::PhysicalLocation(attrs) => write_physical_location(&mut element, attrs),
        Node::Process(process) => write_process(&mut element, process),
    }
    element
}

/// Build a node of `kind` from an element
///
/// # Errors
/// `UnknownType` for the scenario kind, `Model` if the kind does not fit
/// its level's wire type
pub fn to_tree_node(kind: NodeKind, id: &str, element: &Element) -> Result<Node> {
    let name = element.name().trim().to_string();
    let id = id.to_string();
    let node = match kind {
        NodeKind::Scenario => return Err(EngineError::UnknownType(kind.label().to_string())),
        NodeKind::Operator | NodeKind::OperatorCellular => {
            let mut attrs = DomainAttrs {
                id,
                name,
                kind: DomainType::try_from(kind)?,
                net_char: None,
                cellular_domain_config: None,
            };
            read_domain(&mut attrs, element);
            Node::Domain(attrs)
        }
        NodeKind::Zone => {
            let mut attrs = ZoneAttrs {
                id,
                name,
                kind: ZoneType::Zone,
                net_char: None,
                meta: None,
            };
            read_zone(&mut attrs, element);
            Node::Zone(attrs)
        }
        NodeKind::Poa | NodeKind::Poa4G | NodeKind::Poa5G | NodeKind::PoaWifi => {
            let mut attrs = NetworkLocationAttrs {
                id,
                name,
                kind: NetworkLocationType::try_from(kind)?,
                net_char: None,
                geo_data: None,
                poa_4g_config: None,
                poa_5g_config: None,
                poa_wifi_config: None,
            };
            read_network_location(&mut attrs, element);
            Node::NetworkLocation(attrs)
        }
        NodeKind::DistantCloud
        | NodeKind::CoreNetwork
        | NodeKind::Edge
        | NodeKind::Fog
        | NodeKind::Ue => {
            let mut attrs = PhysicalLocationAttrs {
                id,
                name,
                kind: PhysicalLocationType::try_from(kind)?,
                is_external: false,
                connected: true,
                wireless: false,
                wireless_type: None,
                net_char: None,
                data_network: None,
                geo_data: None,
                mac_id: None,
            };
            read_physical_location(&mut attrs, element);
            Node::PhysicalLocation(attrs)
        }
        NodeKind::MecService | NodeKind::UeApp | NodeKind::EdgeApp | NodeKind::CloudApp => {
            Node::Process(read_process(ProcessType::try_from(kind)?, id, name, element))
        }
    };
    Ok(node)
}

/// Overwrite a node's attributes from an element, keeping id and name
///
/// Processes are rebuilt whole; the other levels are patched in place.
pub fn update_node(node: &mut Node, element: &Element) {
    match node {
        Node::Domain(attrs) => read_domain(attrs, element),
        Node::Zone(attrs) => read_zone(attrs, element),
        Node::NetworkLocation(attrs) => read_network_location(attrs, element),
        Node::PhysicalLocation(attrs) => read_physical_location(attrs, element),
        Node::Process(process) => {
            *process = read_process(
                process.kind,
                process.id.clone(),
                process.name.clone(),
                element,
            );
        }
    }
}

/// Write scenario-level netChar and connectivity
pub fn apply_scenario(tree: &mut ScenarioTree, element: &Element) {
    let model = ConnectivityModel::parse(element.text(Field::ConnectivityModel).trim())
        .unwrap_or_default();
    let net_char = read_netchar(element, NetCharScope::InterDomain);
    tree.set_deployment(net_char, Connectivity { model });
}

/// Absent netChar reads as zero latency with default throughput
fn write_netchar(element: &mut Element, scope: NetCharScope, nc: Option<&NetChar>) {
    let nc = nc.cloned().unwrap_or_default();
    let throughput = |v: i32| if v == 0 { THROUGHPUT_DEFAULT } else { v };
    element.set(Field::net_char(scope, NetCharAttr::Latency), nc.latency);
    element.set(
        Field::net_char(scope, NetCharAttr::LatencyVariation),
        nc.latency_variation,
    );
    element.set(
        Field::net_char(scope, NetCharAttr::LatencyDistribution),
        nc.latency_distribution.unwrap_or_default().as_str(),
    );
    element.set(
        Field::net_char(scope, NetCharAttr::ThroughputDl),
        throughput(nc.throughput_dl),
    );
    element.set(
        Field::net_char(scope, NetCharAttr::ThroughputUl),
        throughput(nc.throughput_ul),
    );
    element.set(
        Field::net_char(scope, NetCharAttr::PacketLoss),
        FieldValue::Float(nc.packet_loss),
    );
}

fn read_netchar(element: &Element, scope: NetCharScope) -> NetChar {
    let int = |attr| int32(element, Field::net_char(scope, attr));
    NetChar {
        latency: int(NetCharAttr::Latency).unwrap_or(0),
        latency_variation: int(NetCharAttr::LatencyVariation).unwrap_or(0),
        latency_distribution: element
            .text(Field::net_char(scope, NetCharAttr::LatencyDistribution))
            .trim()
            .parse::<LatencyDistribution>()
            .ok(),
        throughput_dl: int(NetCharAttr::ThroughputDl).unwrap_or(THROUGHPUT_DEFAULT),
        throughput_ul: int(NetCharAttr::ThroughputUl).unwrap_or(THROUGHPUT_DEFAULT),
        packet_loss: element
            .float(Field::net_char(scope, NetCharAttr::PacketLoss))
            .unwrap_or(0.0),
    }
}

fn write_domain(element: &mut Element, attrs: &DomainAttrs) {
    if let Some(cfg) = &attrs.cellular_domain_config {
        element.set(Field::CellularMcc, cfg.mcc.as_str());
        element.set(Field::CellularMnc, cfg.mnc.as_str());
        element.set(Field::CellularDefaultCellId, cfg.default_cell_id.as_str());
    }
}

fn read_domain(attrs: &mut DomainAttrs, element: &Element) {
    attrs.net_char = Some(read_netchar(element, NetCharScope::InterZone));
    attrs.cellular_domain_config = match attrs.kind {
        DomainType::OperatorCellular => {
            let cfg = CellularDomainConfig {
                mcc: element.opt_text(Field::CellularMcc).unwrap_or_default(),
                mnc: element.opt_text(Field::CellularMnc).unwrap_or_default(),
                default_cell_id: element
                    .opt_text(Field::CellularDefaultCellId)
                    .unwrap_or_default(),
            };
            let blank =
                cfg.mcc.is_empty() && cfg.mnc.is_empty() && cfg.default_cell_id.is_empty();
            (!blank).then_some(cfg)
        }
        _ => None,
    };
}

fn write_zone(element: &mut Element, attrs: &ZoneAttrs) {
    if let Some(color) = attrs.map_color() {
        element.set(Field::MapColor, color);
    }
}

fn read_zone(attrs: &mut ZoneAttrs, element: &Element) {
    attrs.net_char = Some(read_netchar(element, NetCharScope::IntraZone));
    let mut meta = attrs.meta.take().unwrap_or_default();
    match element.opt_text(Field::MapColor) {
        Some(color) => {
            meta.insert(DISPLAY_MAP_COLOR.to_string(), color);
        }
        None => {
            meta.remove(DISPLAY_MAP_COLOR);
        }
    }
    attrs.meta = (!meta.is_empty()).then_some(meta);
}

fn write_network_location(element: &mut Element, attrs: &NetworkLocationAttrs) {
    if let Some(geo) = &attrs.geo_data {
        write_location(element, geo);
        if let Some(radius) = geo.radius {
            element.set(Field::GeoRadius, radius);
        }
    }
    if let Some(cfg) = &attrs.poa_4g_config {
        element.set(Field::CellId4G, cfg.cell_id.as_str());
    }
    if let Some(cfg) = &attrs.poa_5g_config {
        element.set(Field::CellId5G, cfg.cell_id.as_str());
    }
    if let Some(cfg) = &attrs.poa_wifi_config {
        element.set(Field::PoaMacId, cfg.mac_id.as_str());
    }
}

fn read_network_location(attrs: &mut NetworkLocationAttrs, element: &Element) {
    attrs.net_char = Some(read_netchar(element, NetCharScope::TerminalLink));

    let mut geo = attrs.geo_data.take().unwrap_or_default();
    geo.location = element
        .opt_text(Field::GeoLocation)
        .and_then(|s| parse_location(&s));
    geo.radius = element.float(Field::GeoRadius);
    attrs.geo_data = (!geo.is_empty()).then_some(geo);

    let cell = |field| {
        element
            .opt_text(field)
            .map(|cell_id| CellConfig { cell_id })
    };
    attrs.poa_4g_config = None;
    attrs.poa_5g_config = None;
    attrs.poa_wifi_config = None;
    match attrs.kind {
        NetworkLocationType::Poa4G => attrs.poa_4g_config = cell(Field::CellId4G),
        NetworkLocationType::Poa5G => attrs.poa_5g_config = cell(Field::CellId5G),
        NetworkLocationType::PoaWifi => {
            attrs.poa_wifi_config = element
                .opt_text(Field::PoaMacId)
                .map(|mac_id| WifiConfig { mac_id });
        }
        NetworkLocationType::Poa | NetworkLocationType::Default => {}
    }
}

fn write_physical_location(element: &mut Element, attrs: &PhysicalLocationAttrs) {
    element.set(Field::IsExternal, attrs.is_external);
    element.set(Field::Connected, attrs.connected);
    element.set(Field::Wireless, attrs.wireless);
    if let Some(wt) = &attrs.wireless_type {
        element.set(Field::WirelessType, wt.as_str());
    }
    if let Some(mac) = &attrs.mac_id {
        element.set(Field::MacId, mac.as_str());
    }
    if let Some(dn) = &attrs.data_network {
        element.set(Field::DnName, dn.dnn.clone().unwrap_or_default());
        element.set(Field::DnLadn, dn.ladn);
        element.set(Field::DnEcsp, dn.ecsp.clone().unwrap_or_default());
    }
    if let Some(geo) = &attrs.geo_data {
        write_location(element, geo);
        if let Some(path) = &geo.path {
            element.set(Field::GeoPath, format_path(path));
        }
        if let Some(mode) = geo.eop_mode {
            element.set(Field::GeoEopMode, mode.as_str());
        }
        if let Some(velocity) = geo.velocity {
            element.set(Field::GeoVelocity, velocity);
        }
    }
}

fn read_physical_location(attrs: &mut PhysicalLocationAttrs, element: &Element) {
    attrs.net_char = Some(read_netchar(element, NetCharScope::Link));
    attrs.is_external = element.flag(Field::IsExternal);
    attrs.connected = element.flag(Field::Connected);
    attrs.wireless = element.flag(Field::Wireless);
    attrs.wireless_type = element.opt_text(Field::WirelessType);
    attrs.mac_id = element.opt_text(Field::MacId);

    let dn = DataNetwork {
        dnn: element.opt_text(Field::DnName),
        ladn: element.flag(Field::DnLadn),
        ecsp: element.opt_text(Field::DnEcsp),
    };
    attrs.data_network = (dn != DataNetwork::default()).then_some(dn);

    let mut geo = attrs.geo_data.take().unwrap_or_default();
    geo.location = element
        .opt_text(Field::GeoLocation)
        .and_then(|s| parse_location(&s));
    geo.path = element.opt_text(Field::GeoPath).and_then(|s| parse_path(&s));
    geo.eop_mode = element
        .opt_text(Field::GeoEopMode)
        .and_then(|s| EopMode::parse(&s));
    geo.velocity = element.float(Field::GeoVelocity);
    attrs.geo_data = (!geo.is_empty()).then_some(geo);
}

fn write_location(element: &mut Element, geo: &GeoData) {
    if let Some(point) = &geo.location {
        element.set(Field::GeoLocation, format_location(point));
    }
}

fn write_process(element: &mut Element, process: &Process) {
    if let Some(placement) = &process.placement_id {
        element.set(Field::PlacementId, placement.as_str());
    }
    match &process.deployment {
        AppDeployment::External(ext) => {
            element.set(Field::IsExternal, true);
            element.set(
                Field::IngressSvcMap,
                format_ingress(&ext.ingress_service_map),
            );
            element.set(Field::EgressSvcMap, format_egress(&ext.egress_service_map));
        }
        AppDeployment::UserChart(chart) => {
            element.set(Field::ChartEnabled, true);
            element.set(Field::ChartLoc, chart.location.as_str());
            if let Some(values) = &chart.alternate_values {
                element.set(Field::ChartVal, values.as_str());
            }
            if let Some(group) = &chart.group {
                element.set(Field::ChartGroup, group.as_str());
            }
        }
        AppDeployment::Container(c) => write_container(element, c),
    }
}

fn write_container(element: &mut Element, c: &Container) {
    let texts = [
        (Field::Image, &c.image),
        (Field::EnvVar, &c.environment),
        (Field::Cmd, &c.command_exe),
        (Field::CmdArgs, &c.command_arguments),
    ];
    for (field, value) in texts {
        if let Some(v) = value {
            element.set(field, v.as_str());
        }
    }
    if let Some(svc) = &c.service_config {
        if let Some(group) = &svc.me_svc_name {
            element.set(Field::Group, group.as_str());
        }
        if let Some(port) = svc.ports.first() {
            if let Some(protocol) = &port.protocol {
                element.set(Field::Protocol, protocol.as_str());
            }
            if let Some(p) = port.port {
                element.set(Field::Port, p);
            }
            if let Some(ext) = port.external_port {
                element.set(Field::ExtPort, ext);
            }
        }
    }
    if let Some(gpu) = &c.gpu_config {
        element.set(Field::GpuCount, gpu.count);
        if let Some(kind) = &gpu.kind {
            element.set(Field::GpuType, kind.as_str());
        }
    }
    if let Some(cpu) = &c.cpu_config {
        if let Some(min) = cpu.min {
            element.set(Field::CpuMin, min);
        }
        if let Some(max) = cpu.max {
            element.set(Field::CpuMax, max);
        }
    }
    if let Some(mem) = &c.memory_config {
        if let Some(min) = mem.min {
            element.set(Field::MemoryMin, min);
        }
        if let Some(max) = mem.max {
            element.set(Field::MemoryMax, max);
        }
    }
}

fn read_process(kind: ProcessType, id: String, name: String, element: &Element) -> Process {
    let deployment = if element.flag(Field::IsExternal) {
        AppDeployment::External(ExternalConfig {
            ingress_service_map: parse_ingress(&element.text(Field::IngressSvcMap)),
            egress_service_map: parse_egress(&element.text(Field::EgressSvcMap)),
        })
    } else if element.flag(Field::ChartEnabled) {
        AppDeployment::UserChart(UserChart {
            location: element.opt_text(Field::ChartLoc).unwrap_or_default(),
            alternate_values: element.opt_text(Field::ChartVal),
            group: element.opt_text(Field::ChartGroup),
        })
    } else {
        AppDeployment::Container(read_container(&name, element))
    };
    Process {
        id,
        name,
        kind,
        net_char: Some(read_netchar(element, NetCharScope::App)),
        placement_id: element.opt_text(Field::PlacementId),
        deployment,
    }
}

fn read_container(name: &str, element: &Element) -> Container {
    let service_config = int32(element, Field::Port).map(|port| ServiceConfig {
        name: name.to_string(),
        me_svc_name: element.opt_text(Field::Group),
        ports: vec![ServicePort {
            protocol: element.opt_text(Field::Protocol),
            port: Some(port),
            external_port: int32(element, Field::ExtPort),
        }],
    });
    let gpu_config = int32(element, Field::GpuCount)
        .filter(|&count| count != 0)
        .map(|count| GpuConfig {
            kind: element
                .opt_text(Field::GpuType)
                .map(|t| t.to_ascii_uppercase()),
            count,
        });
    let cpu = CpuConfig {
        min: element.float(Field::CpuMin),
        max: element.float(Field::CpuMax),
    };
    let memory = MemoryConfig {
        min: element.int(Field::MemoryMin),
        max: element.int(Field::MemoryMax),
    };
    Container {
        image: element.opt_text(Field::Image),
        environment: element.opt_text(Field::EnvVar),
        command_exe: element.opt_text(Field::Cmd),
        command_arguments: element.opt_text(Field::CmdArgs),
        service_config,
        gpu_config,
        cpu_config: (cpu.min.is_some() || cpu.max.is_some()).then_some(cpu),
        memory_config: (memory.min.is_some() || memory.max.is_some()).then_some(memory),
    }
}

fn int32(element: &Element, field: Field) -> Option<i32> {
    element.int(field).and_then(|v| i32::try_from(v).ok())
}

/// `[lon,lat]` text of a point
#[must_use]
pub fn format_location(point: &Point) -> String {
    serde_json::to_string(&point.coordinates).unwrap_or_default()
}

/// Parse `[lon,lat]`; `None` unless it is a numeric pair
#[must_use]
pub fn parse_location(s: &str) -> Option<Point> {
    let coordinates: Vec<f64> = serde_json::from_str(s).ok()?;
    (coordinates.len() == 2).then(|| Point::from_coordinates(coordinates))
}

/// `[[lon,lat],...]` text of a path
#[must_use]
pub fn format_path(path: &LineString) -> String {
    serde_json::to_string(&path.coordinates).unwrap_or_default()
}

/// Parse `[[lon,lat],...]`; `None` unless every entry is a numeric pair
#[must_use]
pub fn parse_path(s: &str) -> Option<LineString> {
    let coordinates: Vec<Vec<f64>> = serde_json::from_str(s).ok()?;
    let valid = !coordinates.is_empty() && coordinates.iter().all(|c| c.len() == 2);
    valid.then(|| LineString::from_coordinates(coordinates))
}

/// `extPort:name:port:protocol` entries, comma separated
#[must_use]
pub fn format_ingress(maps: &[IngressServiceMap]) -> String {
    maps.iter()
        .map(|m| format!("{}:{}:{}:{}", m.external_port, m.name, m.port, m.protocol))
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse ingress entries, skipping malformed ones
#[must_use]
pub fn parse_ingress(s: &str) -> Vec<IngressServiceMap> {
    entries(s)
        .filter_map(|entry| match entry.as_slice() {
            [ext, name, port, protocol] => Some(IngressServiceMap {
                name: (*name).to_string(),
                port: port.parse().ok()?,
                external_port: ext.parse().ok()?,
                protocol: protocol.to_ascii_uppercase(),
            }),
            _ => None,
        })
        .collect()
}

/// `name:meSvcName:ip:port:protocol` entries, comma separated
#[must_use]
pub fn format_egress(maps: &[EgressServiceMap]) -> String {
    maps.iter()
        .map(|m| {
            format!(
                "{}:{}:{}:{}:{}",
                m.name, m.me_svc_name, m.ip, m.port, m.protocol
            )
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse egress entries, skipping malformed ones
#[must_use]
pub fn parse_egress(s: &str) -> Vec<EgressServiceMap> {
    entries(s)
        .filter_map(|entry| match entry.as_slice() {
            [name, me_svc_name, ip, port, protocol] => Some(EgressServiceMap {
                name: (*name).to_string(),
                me_svc_name: (*me_svc_name).to_string(),
                ip: (*ip).to_string(),
                port: port.parse().ok()?,
                protocol: protocol.to_ascii_uppercase(),
            }),
            _ => None,
        })
        .collect()
}

fn entries(s: &str) -> impl Iterator<Item = Vec<&str>> {
    s.split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(|e| e.split(':').map(str::trim).collect())
}

/// Environment `K=V` list as a map; `None` when any entry lacks `=`
#[must_use]
pub fn parse_environment(s: &str) -> Option<BTreeMap<String, String>> {
    s.split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(|e| {
            let (k, v) = e.split_once('=')?;
            let k = k.trim();
            (!k.is_empty()).then(|| (k.to_string(), v.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{add_element_to_scenario, create_new_scenario};
    use pretty_assertions::assert_eq;

    #[test]
    fn ingress_codec() {
        let maps = parse_ingress("31000:svc:80:tcp, 31001:dns:53:UDP");
        assert_eq!(maps.len(), 2);
        assert_eq!(maps[0].external_port, 31000);
        assert_eq!(maps[0].protocol, "TCP");
        assert_eq!(format_ingress(&maps), "31000:svc:80:TCP,31001:dns:53:UDP");
    }

    #[test]
    fn malformed_entries_skipped() {
        assert!(parse_ingress("abc:svc:80:TCP").is_empty());
        assert!(parse_ingress("31000:svc:80").is_empty());
        let egress = parse_egress("svc:grp:10.0.0.1:80:udp,broken");
        assert_eq!(egress.len(), 1);
        assert_eq!(egress[0].ip, "10.0.0.1");
        assert_eq!(egress[0].protocol, "UDP");
    }

    #[test]
    fn geo_codecs() {
        let p = parse_location("[7.42, 43.73]").unwrap();
        assert_eq!(p.coordinates, vec![7.42, 43.73]);
        assert_eq!(format_location(&p), "[7.42,43.73]");
        assert!(parse_location("[1]").is_none());
        assert!(parse_location("nope").is_none());
        let path = parse_path("[[1,2],[3,4]]").unwrap();
        assert_eq!(path.coordinates.len(), 2);
        assert!(parse_path("[]").is_none());
    }

    #[test]
    fn environment_list() {
        let env = parse_environment("A=1, B = two").unwrap();
        assert_eq!(env.get("B").map(String::as_str), Some("two"));
        assert!(parse_environment("A=1,B").is_none());
        assert!(parse_environment("").unwrap().is_empty());
    }

    #[test]
    fn scenario_element_reads_deployment() {
        let tree = create_new_scenario("demo").unwrap();
        let e = to_element(&tree, "demo").unwrap();
        assert_eq!(e.kind(), Some(NodeKind::Scenario));
        assert_eq!(e.text(Field::ConnectivityModel), "OPEN");
        let latency = Field::net_char(NetCharScope::InterDomain, NetCharAttr::Latency);
        assert_eq!(e.int(latency), Some(50));
    }

    #[test]
    fn implicit_and_missing_nodes_have_no_element() {
        let tree = create_new_scenario("demo").unwrap();
        assert!(to_element(&tree, "PUBLIC").is_none());
        assert!(to_element(&tree, "PUBLIC-COMMON").is_none());
        assert!(to_element(&tree, "nope").is_none());
    }

    #[test]
    fn container_process_fields() {
        let e = Element::blank(NodeKind::EdgeApp)
            .with(Field::Name, "server")
            .with(Field::Port, "80")
            .with(Field::Protocol, "TCP")
            .with(Field::ExtPort, "32000")
            .with(Field::Group, "svc-group")
            .with(Field::GpuCount, 2)
            .with(Field::GpuType, "nvidia")
            .with(Field::CpuMax, 1.5);
        let Node::Process(p) = to_tree_node(NodeKind::EdgeApp, "p1", &e).unwrap() else {
            panic!("expected a process");
        };
        let AppDeployment::Container(c) = &p.deployment else {
            panic!("expected a container");
        };
        let svc = c.service_config.as_ref().unwrap();
        assert_eq!(svc.name, "server");
        assert_eq!(svc.me_svc_name.as_deref(), Some("svc-group"));
        assert_eq!(svc.ports[0].external_port, Some(32000));
        assert_eq!(c.gpu_config.as_ref().unwrap().kind.as_deref(), Some("NVIDIA"));
        assert_eq!(c.cpu_config.as_ref().unwrap().max, Some(1.5));
        assert!(c.memory_config.is_none());
    }

    #[test]
    fn external_flag_wins() {
        let e = Element::blank(NodeKind::EdgeApp)
            .with(Field::Name, "ext")
            .with(Field::IsExternal, true)
            .with(Field::ChartEnabled, true)
            .with(Field::Image, "ignored")
            .with(Field::IngressSvcMap, "31000:svc:80:TCP");
        let Node::Process(p) = to_tree_node(NodeKind::EdgeApp, "p1", &e).unwrap() else {
            panic!("expected a process");
        };
        assert!(p.is_external());
        assert_eq!(p.external_ports().into_iter().collect::<Vec<_>>(), vec![31000]);
    }

    #[test]
    fn zone_map_color_set_and_cleared() {
        let e = Element::blank(NodeKind::Zone)
            .with(Field::Name, "z1")
            .with(Field::MapColor, "#A1B2C3");
        let mut node = to_tree_node(NodeKind::Zone, "z1", &e).unwrap();
        let Node::Zone(attrs) = &node else {
            panic!("expected a zone")
        };
        assert_eq!(attrs.map_color(), Some("#A1B2C3"));

        update_node(&mut node, &e.clone().with(Field::MapColor, ""));
        let Node::Zone(attrs) = &node else {
            panic!("expected a zone")
        };
        assert!(attrs.meta.is_none());
    }

    #[test]
    fn network_location_update_keeps_path() {
        let e = Element::blank(NodeKind::Poa4G)
            .with(Field::Name, "poa")
            .with(Field::GeoLocation, "[1.0,2.0]")
            .with(Field::CellId4G, "1234567");
        let mut node = to_tree_node(NodeKind::Poa4G, "n1", &e).unwrap();
        if let Node::NetworkLocation(attrs) = &mut node {
            attrs.geo_data.as_mut().unwrap().path =
                Some(LineString::from_coordinates(vec![vec![0.0, 0.0]]));
        }
        update_node(&mut node, &e.clone().with(Field::GeoRadius, 250));
        let Node::NetworkLocation(attrs) = &node else {
            panic!("expected a network location")
        };
        let geo = attrs.geo_data.as_ref().unwrap();
        assert_eq!(geo.radius, Some(250.0));
        assert!(geo.path.is_some());
        assert_eq!(attrs.poa_4g_config.as_ref().unwrap().cell_id, "1234567");
        assert!(attrs.poa_5g_config.is_none());
    }

    #[test]
    fn element_parent_is_visible_parent() {
        let mut tree = create_new_scenario("demo").unwrap();
        let op = Element::blank(NodeKind::Operator)
            .with(Field::Name, "op-a")
            .with(Field::Parent, "demo");
        add_element_to_scenario(&mut tree, &op).unwrap();
        let edge = Element::blank(NodeKind::Edge)
            .with(Field::Name, "edge-1")
            .with(Field::Parent, "op-a");
        let id = add_element_to_scenario(&mut tree, &edge).unwrap();

        let e = to_element(&tree, &id).unwrap();
        assert_eq!(e.parent(), "op-a");
        assert_eq!(e.kind(), Some(NodeKind::Edge));
        assert_eq!(e.id(), id.as_str());
    }

    #[test]
    fn missing_netchar_reads_level_defaults() {
        let mut e = Element::new().with(Field::Name, "op");
        let node = to_tree_node(NodeKind::Operator, "d1", &e).unwrap();
        let nc = node.net_char().unwrap();
        assert_eq!(nc.latency, 0);
        assert_eq!(nc.throughput_dl, THROUGHPUT_DEFAULT);

        e = node_element(&node, NodeKind::Operator);
        let dl = Field::net_char(NetCharScope::InterZone, NetCharAttr::ThroughputDl);
        assert_eq!(e.int(dl), Some(1000));
    }

    #[test]
    fn absent_netchar_block_reads_as_zero() {
        let json = r#"{"name":"demo","deployment":{"domains":[
            {"id":"d1","name":"op","type":"OPERATOR","zones":[]}]}}"#;
        let tree = ScenarioTree::from_scenario(netsim_model::Scenario::from_json(json).unwrap())
            .unwrap();
        let e = to_element(&tree, "d1").unwrap();
        let attr = |a| e.int(Field::net_char(NetCharScope::InterZone, a));
        assert_eq!(attr(NetCharAttr::Latency), Some(0));
        assert_eq!(attr(NetCharAttr::LatencyVariation), Some(0));
        assert_eq!(attr(NetCharAttr::ThroughputUl), Some(i64::from(THROUGHPUT_DEFAULT)));
        assert_eq!(
            e.float(Field::net_char(NetCharScope::InterZone, NetCharAttr::PacketLoss)),
            Some(0.0)
        );
    }

    #[test]
    fn zero_gpu_count_means_no_gpu() {
        let e = Element::blank(NodeKind::EdgeApp)
            .with(Field::Name, "server")
            .with(Field::GpuCount, 0)
            .with(Field::GpuType, "NVIDIA");
        let Node::Process(p) = to_tree_node(NodeKind::EdgeApp, "p1", &e).unwrap() else {
            panic!("expected a process");
        };
        let AppDeployment::Container(c) = &p.deployment else {
            panic!("expected a container");
        };
        assert!(c.gpu_config.is_none());
    }
}
