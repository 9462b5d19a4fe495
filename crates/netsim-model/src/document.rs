//! Scenario document
//!
//! Nested wire shape exchanged with persistence (JSON and YAML, camelCase).
//! Each level splits its own attributes from its child list so the engine
//! can hold attributes in an arena and rebuild the nesting on export.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::kind::{DomainType, NetworkLocationType, PhysicalLocationType, ZoneType};
use crate::netchar::NetChar;
use crate::process::Process;

/// Zone meta key holding the map display color
pub const DISPLAY_MAP_COLOR: &str = "display.map.color";

/// Root document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub deployment: Deployment,
}

impl Scenario {
    /// Empty scenario with no domains
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            version: None,
            id: None,
            name: name.into(),
            description: None,
            deployment: Deployment::default(),
        }
    }
}

/// Deployment settings and the domain list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_char: Option<NetChar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connectivity: Option<Connectivity>,
    #[serde(default)]
    pub domains: Vec<Domain>,
}

/// Connectivity settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Connectivity {
    #[serde(default)]
    pub model: ConnectivityModel,
}

/// Connectivity models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum ConnectivityModel {
    #[default]
    #[serde(rename = "OPEN")]
    Open,
    #[serde(rename = "PDU")]
    Pdu,
}

impl ConnectivityModel {
    /// Wire string
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Pdu => "PDU",
        }
    }

    /// Parse a wire string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(Self::Open),
            "PDU" => Some(Self::Pdu),
            _ => None,
        }
    }
}

/// Operator or public domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Domain {
    #[serde(flatten)]
    pub attrs: DomainAttrs,
    #[serde(default)]
    pub zones: Vec<Zone>,
}

/// Domain attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainAttrs {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DomainType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_char: Option<NetChar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cellular_domain_config: Option<CellularDomainConfig>,
}

/// Cellular operator identifiers
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CellularDomainConfig {
    pub mcc: String,
    pub mnc: String,
    pub default_cell_id: String,
}

/// Zone inside a domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    #[serde(flatten)]
    pub attrs: ZoneAttrs,
    #[serde(default)]
    pub network_locations: Vec<NetworkLocation>,
}

/// Zone attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneAttrs {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ZoneType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_char: Option<NetChar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<BTreeMap<String, String>>,
}

impl ZoneAttrs {
    /// Display color from the meta map
    #[inline]
    #[must_use]
    pub fn map_color(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|m| m.get(DISPLAY_MAP_COLOR))
            .map(String::as_str)
    }
}

/// Point of access or default network location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkLocation {
    #[serde(flatten)]
    pub attrs: NetworkLocationAttrs,
    #[serde(default)]
    pub physical_locations: Vec<PhysicalLocation>,
}

/// Network location attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkLocationAttrs {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NetworkLocationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_char: Option<NetChar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_data: Option<GeoData>,
    #[serde(
        default,
        rename = "poa4GConfig",
        skip_serializing_if = "Option::is_none"
    )]
    pub poa_4g_config: Option<CellConfig>,
    #[serde(
        default,
        rename = "poa5GConfig",
        skip_serializing_if = "Option::is_none"
    )]
    pub poa_5g_config: Option<CellConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poa_wifi_config: Option<WifiConfig>,
}

/// Cellular POA config
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CellConfig {
    pub cell_id: String,
}

/// Wifi POA config
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct WifiConfig {
    pub mac_id: String,
}

/// Terminal, fog, edge or cloud compute node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PhysicalLocation {
    #[serde(flatten)]
    pub attrs: PhysicalLocationAttrs,
    #[serde(default)]
    pub processes: Vec<Process>,
}

/// Physical location attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalLocationAttrs {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PhysicalLocationType,
    #[serde(default)]
    pub is_external: bool,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub wireless: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wireless_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_char: Option<NetChar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_network: Option<DataNetwork>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_data: Option<GeoData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_id: Option<String>,
}

/// Data network served by a physical location
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DataNetwork {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnn: Option<String>,
    pub ladn: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecsp: Option<String>,
}

/// Geographic placement and mobility
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GeoData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<LineString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eop_mode: Option<EopMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
}

impl GeoData {
    /// True when no geo attribute is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.radius.is_none()
            && self.path.is_none()
            && self.eop_mode.is_none()
            && self.velocity.is_none()
    }
}

/// GeoJSON point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    #[serde(rename = "type", default = "Point::geo_type")]
    pub kind: String,
    pub coordinates: Vec<f64>,
}

impl Point {
    /// Point at longitude/latitude
    #[must_use]
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self::from_coordinates(vec![longitude, latitude])
    }

    /// Point from raw coordinates
    #[must_use]
    pub fn from_coordinates(coordinates: Vec<f64>) -> Self {
        Self {
            kind: Self::geo_type(),
            coordinates,
        }
    }

    fn geo_type() -> String {
        "Point".to_string()
    }
}

/// GeoJSON line string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LineString {
    #[serde(rename = "type", default = "LineString::geo_type")]
    pub kind: String,
    pub coordinates: Vec<Vec<f64>>,
}

impl LineString {
    /// Line string from raw coordinates
    #[must_use]
    pub fn from_coordinates(coordinates: Vec<Vec<f64>>) -> Self {
        Self {
            kind: Self::geo_type(),
            coordinates,
        }
    }

    fn geo_type() -> String {
        "LineString".to_string()
    }
}

/// End-of-path behaviour for moving terminals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum EopMode {
    #[serde(rename = "LOOP")]
    Loop,
    #[serde(rename = "REVERSE")]
    Reverse,
}

impl EopMode {
    /// Wire string
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loop => "LOOP",
            Self::Reverse => "REVERSE",
        }
    }

    /// Parse a wire string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LOOP" => Some(Self::Loop),
            "REVERSE" => Some(Self::Reverse),
            _ => None,
        }
    }
}
