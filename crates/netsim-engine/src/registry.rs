//! Per-kind field sets and blank elements
//!
//! Levels, wire types and parent rules live on [`NodeKind`]; this module
//! adds which [`Field`]s a kind edits and the defaults a fresh edit form
//! starts from.

use netsim_model::{ConnectivityModel, LatencyDistribution, NetCharScope, NodeKind};

use crate::element::{Element, Field, FieldValue, NetCharAttr};

const COMMON: &[Field] = &[Field::Id, Field::Type, Field::Parent, Field::Name];

const CELLULAR: &[Field] = &[
    Field::CellularMcc,
    Field::CellularMnc,
    Field::CellularDefaultCellId,
];

const POA: &[Field] = &[Field::GeoLocation, Field::GeoRadius];
const POA_4G: &[Field] = &[Field::GeoLocation, Field::GeoRadius, Field::CellId4G];
const POA_5G: &[Field] = &[Field::GeoLocation, Field::GeoRadius, Field::CellId5G];
const POA_WIFI: &[Field] = &[Field::GeoLocation, Field::GeoRadius, Field::PoaMacId];

const PHYSICAL_LOCATION: &[Field] = &[
    Field::IsExternal,
    Field::Connected,
    Field::Wireless,
    Field::WirelessType,
    Field::MacId,
    Field::DnName,
    Field::DnLadn,
    Field::DnEcsp,
    Field::GeoLocation,
    Field::GeoPath,
    Field::GeoEopMode,
    Field::GeoVelocity,
];

const PROCESS: &[Field] = &[
    Field::IsExternal,
    Field::Image,
    Field::Port,
    Field::Protocol,
    Field::Group,
    Field::ExtPort,
    Field::GpuCount,
    Field::GpuType,
    Field::CpuMin,
    Field::CpuMax,
    Field::MemoryMin,
    Field::MemoryMax,
    Field::PlacementId,
    Field::EnvVar,
    Field::Cmd,
    Field::CmdArgs,
    Field::IngressSvcMap,
    Field::EgressSvcMap,
    Field::ChartEnabled,
    Field::ChartLoc,
    Field::ChartVal,
    Field::ChartGroup,
];

const FLAGS: &[Field] = &[
    Field::IsExternal,
    Field::Connected,
    Field::Wireless,
    Field::DnLadn,
    Field::ChartEnabled,
];

/// Kind-specific fields, excluding id/type/parent/name and netChar
#[must_use]
pub fn kind_fields(kind: NodeKind) -> &'static [Field] {
    match kind {
        NodeKind::Scenario => &[Field::ConnectivityModel],
        NodeKind::Operator => &[],
        NodeKind::OperatorCellular => CELLULAR,
        NodeKind::Zone => &[Field::MapColor],
        NodeKind::Poa => POA,
        NodeKind::Poa4G => POA_4G,
        NodeKind::Poa5G => POA_5G,
        NodeKind::PoaWifi => POA_WIFI,
        NodeKind::DistantCloud
        | NodeKind::CoreNetwork
        | NodeKind::Edge
        | NodeKind::Fog
        | NodeKind::Ue => PHYSICAL_LOCATION,
        NodeKind::MecService | NodeKind::UeApp | NodeKind::EdgeApp | NodeKind::CloudApp => PROCESS,
    }
}

/// netChar fields a kind edits
pub fn netchar_fields(kind: NodeKind) -> impl Iterator<Item = Field> {
    let scope = kind.netchar_scope();
    NetCharAttr::ALL
        .into_iter()
        .map(move |attr| Field::net_char(scope, attr))
}

/// Every field a kind edits
#[must_use]
pub fn field_set(kind: NodeKind) -> Vec<Field> {
    COMMON
        .iter()
        .chain(kind_fields(kind))
        .copied()
        .chain(netchar_fields(kind))
        .collect()
}

/// Whether a kind edits this field
#[must_use]
pub fn has_field(kind: NodeKind, field: Field) -> bool {
    match field {
        Field::NetChar(scope, _) => scope == kind.netchar_scope(),
        other => COMMON.contains(&other) || kind_fields(kind).contains(&other),
    }
}

/// Seed netChar fields of `scope` with their level defaults
pub(crate) fn seed_netchar(element: &mut Element, scope: NetCharScope) {
    let d = scope.defaults();
    element.set(Field::net_char(scope, NetCharAttr::Latency), d.latency);
    element.set(
        Field::net_char(scope, NetCharAttr::LatencyVariation),
        d.latency_variation,
    );
    element.set(
        Field::net_char(scope, NetCharAttr::LatencyDistribution),
        LatencyDistribution::default().as_str(),
    );
    element.set(Field::net_char(scope, NetCharAttr::ThroughputDl), d.throughput);
    element.set(Field::net_char(scope, NetCharAttr::ThroughputUl), d.throughput);
    element.set(
        Field::net_char(scope, NetCharAttr::PacketLoss),
        FieldValue::Float(d.packet_loss),
    );
}

impl Element {
    /// Blank edit form for a kind
    ///
    /// Carries the type label, blank text fields, false flags (connected
    /// defaults to true) and the level's netChar defaults.
    #[must_use]
    pub fn blank(kind: NodeKind) -> Self {
        let mut element = Self::new()
            .with(Field::Id, "")
            .with(Field::Type, kind.label())
            .with(Field::Parent, "")
            .with(Field::Name, "");
        for field in kind_fields(kind) {
            let val = if FLAGS.contains(field) {
                FieldValue::Bool(*field == Field::Connected)
            } else {
                FieldValue::blank()
            };
            element.set(*field, val);
        }
        if kind == NodeKind::Scenario {
            element.set(Field::ConnectivityModel, ConnectivityModel::Open.as_str());
        }
        seed_netchar(&mut element, kind.netchar_scope());
        element
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_carries_type_and_defaults() {
        let e = Element::blank(NodeKind::Zone);
        assert_eq!(e.kind(), Some(NodeKind::Zone));
        assert_eq!(e.text(Field::MapColor), "");
        let latency = Field::net_char(NetCharScope::IntraZone, NetCharAttr::Latency);
        assert_eq!(e.int(latency), Some(5));
        let dl = Field::net_char(NetCharScope::IntraZone, NetCharAttr::ThroughputDl);
        assert_eq!(e.int(dl), Some(1000));
    }

    #[test]
    fn blank_flags() {
        let e = Element::blank(NodeKind::Ue);
        assert!(e.flag(Field::Connected));
        assert!(!e.flag(Field::Wireless));
        assert!(!e.flag(Field::IsExternal));
        assert_eq!(e.get(Field::DnLadn), Some(&FieldValue::Bool(false)));
    }

    #[test]
    fn scenario_defaults() {
        let e = Element::blank(NodeKind::Scenario);
        assert_eq!(e.text(Field::ConnectivityModel), "OPEN");
        let latency = Field::net_char(NetCharScope::InterDomain, NetCharAttr::Latency);
        assert_eq!(e.int(latency), Some(50));
    }

    #[test]
    fn field_sets_by_kind() {
        assert!(has_field(NodeKind::Poa4G, Field::CellId4G));
        assert!(!has_field(NodeKind::Poa5G, Field::CellId4G));
        assert!(has_field(NodeKind::EdgeApp, Field::GpuCount));
        assert!(!has_field(NodeKind::Edge, Field::GpuCount));
        assert!(has_field(
            NodeKind::Fog,
            Field::net_char(NetCharScope::Link, NetCharAttr::PacketLoss)
        ));
        assert!(!has_field(
            NodeKind::Fog,
            Field::net_char(NetCharScope::App, NetCharAttr::PacketLoss)
        ));
        assert_eq!(field_set(NodeKind::Operator).len(), 4 + 6);
    }

    #[test]
    fn every_kind_has_a_blank() {
        for kind in NodeKind::ALL {
            let e = Element::blank(kind);
            for field in field_set(kind) {
                assert!(e.contains(field), "{kind} missing {field}");
            }
        }
    }
}
