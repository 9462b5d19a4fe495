//! Flat element records
//!
//! An [`Element`] is the editing-time view of one tree node: a map from a
//! global field name to a value plus an optional validation error. Which
//! fields matter depends on the node kind (see [`crate::registry`]).

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use netsim_model::{NetCharScope, NodeKind};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::EngineError;

/// Attribute inside a netChar bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NetCharAttr {
    Latency,
    LatencyVariation,
    LatencyDistribution,
    ThroughputDl,
    ThroughputUl,
    PacketLoss,
}

impl NetCharAttr {
    pub const ALL: [Self; 6] = [
        Self::Latency,
        Self::LatencyVariation,
        Self::LatencyDistribution,
        Self::ThroughputDl,
        Self::ThroughputUl,
        Self::PacketLoss,
    ];

    const fn suffix(self) -> &'static str {
        match self {
            Self::Latency => "Latency",
            Self::LatencyVariation => "LatencyVariation",
            Self::LatencyDistribution => "LatencyDistribution",
            Self::ThroughputDl => "ThroughputDl",
            Self::ThroughputUl => "ThroughputUl",
            Self::PacketLoss => "PacketLoss",
        }
    }
}

const NETCHAR_FIELD_NAMES: [[&str; 6]; 6] = [
    [
        "interDomainLatency",
        "interDomainLatencyVariation",
        "interDomainLatencyDistribution",
        "interDomainThroughputDl",
        "interDomainThroughputUl",
        "interDomainPacketLoss",
    ],
    [
        "interZoneLatency",
        "interZoneLatencyVariation",
        "interZoneLatencyDistribution",
        "interZoneThroughputDl",
        "interZoneThroughputUl",
        "interZonePacketLoss",
    ],
    [
        "intraZoneLatency",
        "intraZoneLatencyVariation",
        "intraZoneLatencyDistribution",
        "intraZoneThroughputDl",
        "intraZoneThroughputUl",
        "intraZonePacketLoss",
    ],
    [
        "terminalLinkLatency",
        "terminalLinkLatencyVariation",
        "terminalLinkLatencyDistribution",
        "terminalLinkThroughputDl",
        "terminalLinkThroughputUl",
        "terminalLinkPacketLoss",
    ],
    [
        "linkLatency",
        "linkLatencyVariation",
        "linkLatencyDistribution",
        "linkThroughputDl",
        "linkThroughputUl",
        "linkPacketLoss",
    ],
    [
        "appLatency",
        "appLatencyVariation",
        "appLatencyDistribution",
        "appThroughputDl",
        "appThroughputUl",
        "appPacketLoss",
    ],
];

/// Global, kind-agnostic field names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Id,
    Type,
    Parent,
    Name,
    ConnectivityModel,
    CellularMcc,
    CellularMnc,
    CellularDefaultCellId,
    MapColor,
    CellId4G,
    CellId5G,
    PoaMacId,
    GeoLocation,
    GeoRadius,
    GeoPath,
    GeoEopMode,
    GeoVelocity,
    IsExternal,
    Connected,
    Wireless,
    WirelessType,
    MacId,
    DnName,
    DnLadn,
    DnEcsp,
    Image,
    Port,
    Protocol,
    Group,
    ExtPort,
    GpuCount,
    GpuType,
    CpuMin,
    CpuMax,
    MemoryMin,
    MemoryMax,
    PlacementId,
    EnvVar,
    Cmd,
    CmdArgs,
    IngressSvcMap,
    EgressSvcMap,
    ChartEnabled,
    ChartLoc,
    ChartVal,
    ChartGroup,
    NetChar(NetCharScope, NetCharAttr),
}

const SIMPLE_FIELDS: [Field; 46] = [
    Field::Id,
    Field::Type,
    Field::Parent,
    Field::Name,
    Field::ConnectivityModel,
    Field::CellularMcc,
    Field::CellularMnc,
    Field::CellularDefaultCellId,
    Field::MapColor,
    Field::CellId4G,
    Field::CellId5G,
    Field::PoaMacId,
    Field::GeoLocation,
    Field::GeoRadius,
    Field::GeoPath,
    Field::GeoEopMode,
    Field::GeoVelocity,
    Field::IsExternal,
    Field::Connected,
    Field::Wireless,
    Field::WirelessType,
    Field::MacId,
    Field::DnName,
    Field::DnLadn,
    Field::DnEcsp,
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

impl Field {
    /// netChar field of a scope
    #[inline]
    #[must_use]
    pub const fn net_char(scope: NetCharScope, attr: NetCharAttr) -> Self {
        Self::NetChar(scope, attr)
    }

    /// Every field, netChar fields last
    pub fn all() -> impl Iterator<Item = Self> {
        SIMPLE_FIELDS.into_iter().chain(
            NetCharScope::ALL
                .into_iter()
                .flat_map(|s| NetCharAttr::ALL.into_iter().map(move |a| Self::NetChar(s, a))),
        )
    }

    /// Wire name of the field
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Type => "elementType",
            Self::Parent => "parent",
            Self::Name => "name",
            Self::ConnectivityModel => "connectivityModel",
            Self::CellularMcc => "mcc",
            Self::CellularMnc => "mnc",
            Self::CellularDefaultCellId => "defaultCellId",
            Self::MapColor => "mapColor",
            Self::CellId4G => "cellId",
            Self::CellId5G => "nrCellId",
            Self::PoaMacId => "poaMacId",
            Self::GeoLocation => "location",
            Self::GeoRadius => "radius",
            Self::GeoPath => "path",
            Self::GeoEopMode => "eopMode",
            Self::GeoVelocity => "velocity",
            Self::IsExternal => "isExternal",
            Self::Connected => "connected",
            Self::Wireless => "wireless",
            Self::WirelessType => "wirelessType",
            Self::MacId => "macId",
            Self::DnName => "dnn",
            Self::DnLadn => "ladn",
            Self::DnEcsp => "ecsp",
            Self::Image => "image",
            Self::Port => "port",
            Self::Protocol => "protocol",
            Self::Group => "group",
            Self::ExtPort => "externalPort",
            Self::GpuCount => "gpuCount",
            Self::GpuType => "gpuType",
            Self::CpuMin => "cpuMin",
            Self::CpuMax => "cpuMax",
            Self::MemoryMin => "memoryMin",
            Self::MemoryMax => "memoryMax",
            Self::PlacementId => "placementId",
            Self::EnvVar => "envVar",
            Self::Cmd => "cmd",
            Self::CmdArgs => "cmdArgs",
            Self::IngressSvcMap => "ingressServiceMap",
            Self::EgressSvcMap => "egressServiceMap",
            Self::ChartEnabled => "userChartEnabled",
            Self::ChartLoc => "userChartLocation",
            Self::ChartVal => "userChartAlternateValues",
            Self::ChartGroup => "userChartGroup",
            Self::NetChar(scope, attr) => NETCHAR_FIELD_NAMES[scope as usize][attr as usize],
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(field) = SIMPLE_FIELDS.into_iter().find(|f| f.as_str() == s) {
            return Ok(field);
        }
        NetCharScope::ALL
            .into_iter()
            .find_map(|scope| {
                let attr = s.strip_prefix(scope.prefix())?;
                NetCharAttr::ALL
                    .into_iter()
                    .find(|a| a.suffix() == attr)
                    .map(|a| Self::NetChar(scope, a))
            })
            .ok_or_else(|| EngineError::UnknownField(s.to_string()))
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = Cow::<str>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Value held by one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Empty text value
    #[inline]
    #[must_use]
    pub fn blank() -> Self {
        Self::Text(String::new())
    }

    /// True for empty or whitespace-only text
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }

    /// Textual form
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s),
            Self::Bool(b) => Cow::Owned(b.to_string()),
            Self::Int(i) => Cow::Owned(i.to_string()),
            Self::Float(f) => Cow::Owned(f.to_string()),
        }
    }

    /// Integer form; text is parsed, blank is `None`
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Float form; text is parsed, blank is `None`
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }

    /// Boolean form; accepts `"true"`
    #[must_use]
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Text(s) => s.eq_ignore_ascii_case("true"),
            Self::Int(i) => *i != 0,
            Self::Float(_) => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// Value and pending validation error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub val: FieldValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

/// Flat projection of one tree node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Element {
    fields: BTreeMap<Field, FieldEntry>,
}

impl Element {
    /// Empty element
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    #[inline]
    #[must_use]
    pub fn with(mut self, field: Field, val: impl Into<FieldValue>) -> Self {
        self.set(field, val);
        self
    }

    /// Set a value, keeping any pending error
    pub fn set(&mut self, field: Field, val: impl Into<FieldValue>) {
        let val = val.into();
        self.fields
            .entry(field)
            .and_modify(|e| e.val = val.clone())
            .or_insert(FieldEntry { val, err: None });
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(&field).map(|e| &e.val)
    }

    /// Whether the field is present
    #[inline]
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    /// Remove a field
    pub fn remove(&mut self, field: Field) -> Option<FieldEntry> {
        self.fields.remove(&field)
    }

    /// Text value, empty when absent
    #[must_use]
    pub fn text(&self, field: Field) -> Cow<'_, str> {
        self.get(field)
            .map_or(Cow::Borrowed(""), FieldValue::as_text)
    }

    /// Trimmed text, `None` when absent or blank
    #[must_use]
    pub fn opt_text(&self, field: Field) -> Option<String> {
        let text = self.text(field);
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Integer value
    #[inline]
    #[must_use]
    pub fn int(&self, field: Field) -> Option<i64> {
        self.get(field).and_then(FieldValue::as_i64)
    }

    /// Float value
    #[inline]
    #[must_use]
    pub fn float(&self, field: Field) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_f64)
    }

    /// Boolean value, false when absent
    #[inline]
    #[must_use]
    pub fn flag(&self, field: Field) -> bool {
        self.get(field).is_some_and(FieldValue::as_bool)
    }

    /// Element kind from the type field
    #[must_use]
    pub fn kind(&self) -> Option<NodeKind> {
        self.text(Field::Type).parse().ok()
    }

    /// Name field
    #[inline]
    #[must_use]
    pub fn name(&self) -> Cow<'_, str> {
        self.text(Field::Name)
    }

    /// Parent field
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Cow<'_, str> {
        self.text(Field::Parent)
    }

    /// Id field
    #[inline]
    #[must_use]
    pub fn id(&self) -> Cow<'_, str> {
        self.text(Field::Id)
    }

    /// Record or clear a validation error
    pub fn set_err(&mut self, field: Field, err: Option<String>) {
        match self.fields.get_mut(&field) {
            Some(entry) => entry.err = err,
            None if err.is_some() => {
                self.fields.insert(
                    field,
                    FieldEntry {
                        val: FieldValue::blank(),
                        err,
                    },
                );
            }
            None => {}
        }
    }

    /// Pending error of a field
    #[inline]
    #[must_use]
    pub fn err(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).and_then(|e| e.err.as_deref())
    }

    /// Fields with pending errors
    pub fn errors(&self) -> impl Iterator<Item = (Field, &str)> {
        self.fields
            .iter()
            .filter_map(|(f, e)| e.err.as_deref().map(|msg| (*f, msg)))
    }

    /// Number of pending errors
    #[inline]
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Drop every pending error
    pub fn clear_errors(&mut self) {
        for entry in self.fields.values_mut() {
            entry.err = None;
        }
    }

    /// Iterate fields in key order
    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldEntry)> {
        self.fields.iter().map(|(f, e)| (*f, e))
    }
}
