//! Type registry
//!
//! Maps the seventeen editable node kinds to their tree level, wire type,
//! netChar scope and allowed parents. Wire-level type enums live here too,
//! including the implicit `PUBLIC`/`COMMON`/`DEFAULT` types that have no
//! editable kind.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::io::ModelError;
use crate::netchar::NetCharScope;

/// Name of the implicit public domain
pub const PUBLIC_DOMAIN_NAME: &str = "PUBLIC";

/// Suffix appended to a domain name for its implicit zone
pub const COMMON_SUFFIX: &str = "-COMMON";

/// Suffix appended to a zone name for its implicit network location
pub const DEFAULT_SUFFIX: &str = "-DEFAULT";

/// Depth in the scenario tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    Scenario,
    Domain,
    Zone,
    NetworkLocation,
    PhysicalLocation,
    Process,
}

impl Level {
    /// Level one step further from the root
    #[inline]
    #[must_use]
    pub const fn child(self) -> Option<Self> {
        match self {
            Self::Scenario => Some(Self::Domain),
            Self::Domain => Some(Self::Zone),
            Self::Zone => Some(Self::NetworkLocation),
            Self::NetworkLocation => Some(Self::PhysicalLocation),
            Self::PhysicalLocation => Some(Self::Process),
            Self::Process => None,
        }
    }

    /// Level one step closer to the root
    #[inline]
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Scenario => None,
            Self::Domain => Some(Self::Scenario),
            Self::Zone => Some(Self::Domain),
            Self::NetworkLocation => Some(Self::Zone),
            Self::PhysicalLocation => Some(Self::NetworkLocation),
            Self::Process => Some(Self::PhysicalLocation),
        }
    }

    /// Suffix naming the implicit child of a node at this level
    #[inline]
    #[must_use]
    pub const fn implicit_child_suffix(self) -> Option<&'static str> {
        match self {
            Self::Domain => Some(COMMON_SUFFIX),
            Self::Zone => Some(DEFAULT_SUFFIX),
            _ => None,
        }
    }
}

/// Editable node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Scenario,
    Operator,
    OperatorCellular,
    Zone,
    Poa,
    Poa4G,
    Poa5G,
    PoaWifi,
    DistantCloud,
    CoreNetwork,
    Edge,
    Fog,
    Ue,
    MecService,
    UeApp,
    EdgeApp,
    CloudApp,
}

const POA_FAMILY: &[NodeKind] = &[
    NodeKind::Poa,
    NodeKind::Poa4G,
    NodeKind::Poa5G,
    NodeKind::PoaWifi,
];

const OPERATORS: &[NodeKind] = &[NodeKind::Operator, NodeKind::OperatorCellular];

impl NodeKind {
    /// Every kind, root first
    pub const ALL: [Self; 17] = [
        Self::Scenario,
        Self::Operator,
        Self::OperatorCellular,
        Self::Zone,
        Self::Poa,
        Self::Poa4G,
        Self::Poa5G,
        Self::PoaWifi,
        Self::DistantCloud,
        Self::CoreNetwork,
        Self::Edge,
        Self::Fog,
        Self::Ue,
        Self::MecService,
        Self::UeApp,
        Self::EdgeApp,
        Self::CloudApp,
    ];

    /// Element-type label shown in edit forms
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scenario => "SCENARIO",
            Self::Operator => "OPERATOR",
            Self::OperatorCellular => "OPERATOR CELLULAR",
            Self::Zone => "ZONE",
            Self::Poa => "POA",
            Self::Poa4G => "POA-4G",
            Self::Poa5G => "POA-5G",
            Self::PoaWifi => "POA-WIFI",
            Self::DistantCloud => "DISTANT CLOUD",
            Self::CoreNetwork => "CORE NETWORK",
            Self::Edge => "EDGE",
            Self::Fog => "FOG",
            Self::Ue => "UE",
            Self::MecService => "MEC SERVICE",
            Self::UeApp => "UE APPLICATION",
            Self::EdgeApp => "EDGE APPLICATION",
            Self::CloudApp => "CLOUD APPLICATION",
        }
    }

    /// Tree level of nodes of this kind
    #[must_use]
    pub const fn level(self) -> Level {
        match self {
            Self::Scenario => Level::Scenario,
            Self::Operator | Self::OperatorCellular => Level::Domain,
            Self::Zone => Level::Zone,
            Self::Poa | Self::Poa4G | Self::Poa5G | Self::PoaWifi => Level::NetworkLocation,
            Self::DistantCloud | Self::CoreNetwork | Self::Edge | Self::Fog | Self::Ue => {
                Level::PhysicalLocation
            }
            Self::MecService | Self::UeApp | Self::EdgeApp | Self::CloudApp => Level::Process,
        }
    }

    /// Scope of the netChar fields this kind edits
    #[must_use]
    pub const fn netchar_scope(self) -> NetCharScope {
        match self.level() {
            Level::Scenario => NetCharScope::InterDomain,
            Level::Domain => NetCharScope::InterZone,
            Level::Zone => NetCharScope::IntraZone,
            Level::NetworkLocation => NetCharScope::TerminalLink,
            Level::PhysicalLocation => NetCharScope::Link,
            Level::Process => NetCharScope::App,
        }
    }

    /// Kinds a node of this kind may name as its parent
    #[must_use]
    pub fn allowed_parents(self) -> &'static [NodeKind] {
        match self {
            Self::Scenario => &[],
            Self::Operator | Self::OperatorCellular | Self::DistantCloud => &[Self::Scenario],
            Self::Zone => &[Self::Operator, Self::OperatorCellular, Self::Scenario],
            Self::Poa | Self::Poa4G | Self::Poa5G | Self::PoaWifi | Self::Edge => {
                &[Self::Zone, Self::Operator, Self::OperatorCellular]
            }
            Self::CoreNetwork => OPERATORS,
            Self::Fog | Self::Ue => POA_FAMILY,
            Self::MecService | Self::EdgeApp => &[Self::Edge, Self::Fog],
            Self::UeApp => &[Self::Ue],
            Self::CloudApp => &[Self::DistantCloud],
        }
    }

    /// Check the allowed-parent table
    #[inline]
    #[must_use]
    pub fn accepts_parent(self, parent: Self) -> bool {
        self.allowed_parents().contains(&parent)
    }

    /// Suffix used to name the implicit child this kind owns
    #[must_use]
    pub const fn implicit_child_suffix(self) -> Option<&'static str> {
        self.level().implicit_child_suffix()
    }

    /// Whether the kind belongs to the POA family
    #[inline]
    #[must_use]
    pub fn is_poa(self) -> bool {
        POA_FAMILY.contains(&self)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NodeKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.label() == s)
            .ok_or_else(|| ModelError::UnknownValue {
                what: "element type",
                value: s.to_string(),
            })
    }
}

/// Domain wire type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum DomainType {
    #[serde(rename = "OPERATOR")]
    Operator,
    #[serde(rename = "OPERATOR-CELLULAR")]
    OperatorCellular,
    #[serde(rename = "PUBLIC")]
    Public,
}

impl DomainType {
    /// Editable kind, `None` for the public domain
    #[must_use]
    pub const fn kind(self) -> Option<NodeKind> {
        match self {
            Self::Operator => Some(NodeKind::Operator),
            Self::OperatorCellular => Some(NodeKind::OperatorCellular),
            Self::Public => None,
        }
    }
}

/// Zone wire type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ZoneType {
    #[serde(rename = "ZONE")]
    Zone,
    #[serde(rename = "COMMON")]
    Common,
}

impl ZoneType {
    /// Editable kind, `None` for a common zone
    #[must_use]
    pub const fn kind(self) -> Option<NodeKind> {
        match self {
            Self::Zone => Some(NodeKind::Zone),
            Self::Common => None,
        }
    }
}

/// Network location wire type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum NetworkLocationType {
    #[serde(rename = "POA")]
    Poa,
    #[serde(rename = "POA-4G")]
    Poa4G,
    #[serde(rename = "POA-5G")]
    Poa5G,
    #[serde(rename = "POA-WIFI")]
    PoaWifi,
    #[serde(rename = "DEFAULT")]
    Default,
}

impl NetworkLocationType {
    /// Editable kind, `None` for a default network location
    #[must_use]
    pub const fn kind(self) -> Option<NodeKind> {
        match self {
            Self::Poa => Some(NodeKind::Poa),
            Self::Poa4G => Some(NodeKind::Poa4G),
            Self::Poa5G => Some(NodeKind::Poa5G),
            Self::PoaWifi => Some(NodeKind::PoaWifi),
            Self::Default => None,
        }
    }
}

/// Physical location wire type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum PhysicalLocationType {
    #[serde(rename = "UE")]
    Ue,
    #[serde(rename = "FOG")]
    Fog,
    #[serde(rename = "EDGE")]
    Edge,
    #[serde(rename = "CN")]
    Cn,
    #[serde(rename = "DC")]
    Dc,
}

impl PhysicalLocationType {
    /// Editable kind
    #[must_use]
    pub const fn kind(self) -> NodeKind {
        match self {
            Self::Ue => NodeKind::Ue,
            Self::Fog => NodeKind::Fog,
            Self::Edge => NodeKind::Edge,
            Self::Cn => NodeKind::CoreNetwork,
            Self::Dc => NodeKind::DistantCloud,
        }
    }
}

/// Process wire type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ProcessType {
    #[serde(rename = "UE-APP")]
    UeApp,
    #[serde(rename = "EDGE-APP")]
    EdgeApp,
    #[serde(rename = "CLOUD-APP")]
    CloudApp,
    #[serde(rename = "MEC-SVC")]
    MecSvc,
}

impl ProcessType {
    /// Editable kind
    #[must_use]
    pub const fn kind(self) -> NodeKind {
        match self {
            Self::UeApp => NodeKind::UeApp,
            Self::EdgeApp => NodeKind::EdgeApp,
            Self::CloudApp => NodeKind::CloudApp,
            Self::MecSvc => NodeKind::MecService,
        }
    }
}

impl TryFrom<NodeKind> for DomainType {
    type Error = ModelError;

    fn try_from(kind: NodeKind) -> Result<Self, Self::Error> {
        match kind {
            NodeKind::Operator => Ok(Self::Operator),
            NodeKind::OperatorCellular => Ok(Self::OperatorCellular),
            other => Err(ModelError::level_mismatch(other, Level::Domain)),
        }
    }
}

impl TryFrom<NodeKind> for NetworkLocationType {
    type Error = ModelError;

    fn try_from(kind: NodeKind) -> Result<Self, Self::Error> {
        match kind {
            NodeKind::Poa => Ok(Self::Poa),
            NodeKind::Poa4G => Ok(Self::Poa4G),
            NodeKind::Poa5G => Ok(Self::Poa5G),
            NodeKind::PoaWifi => Ok(Self::PoaWifi),
            other => Err(ModelError::level_mismatch(other, Level::NetworkLocation)),
        }
    }
}

impl TryFrom<NodeKind> for PhysicalLocationType {
    type Error = ModelError;

    fn try_from(kind: NodeKind) -> Result<Self, Self::Error> {
        match kind {
            NodeKind::Ue => Ok(Self::Ue),
            NodeKind::Fog => Ok(Self::Fog),
            NodeKind::Edge => Ok(Self::Edge),
            NodeKind::CoreNetwork => Ok(Self::Cn),
            NodeKind::DistantCloud => Ok(Self::Dc),
            other => Err(ModelError::level_mismatch(other, Level::PhysicalLocation)),
        }
    }
}

impl TryFrom<NodeKind> for ProcessType {
    type Error = ModelError;

    fn try_from(kind: NodeKind) -> Result<Self, Self::Error> {
        match kind {
            NodeKind::UeApp => Ok(Self::UeApp),
            NodeKind::EdgeApp => Ok(Self::EdgeApp),
            NodeKind::CloudApp => Ok(Self::CloudApp),
            NodeKind::MecService => Ok(Self::MecSvc),
            other => Err(ModelError::level_mismatch(other, Level::Process)),
        }
    }
}
