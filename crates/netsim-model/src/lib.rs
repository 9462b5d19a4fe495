//! NetSim scenario model
//!
//! The persisted shape of a network-topology scenario and the registry of
//! node kinds that can appear in it.
//!
//! # Core Concepts
//!
//! - [`Scenario`]: root document, `deployment.domains` nests five levels deep
//! - [`NodeKind`]: the seventeen editable element types and their rules
//! - [`NetChar`]: latency/jitter/throughput/loss bundle carried at every level
//! - [`AppDeployment`]: external, user-chart or container process deployment
//!
//! # Example
//!
//! ```rust,ignore
//! use netsim_model::{DocumentFormat, Scenario};
//!
//! let scenario = Scenario::parse(&text, DocumentFormat::Yaml)?;
//! println!("{}", scenario.to_json()?);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod document;
mod io;
mod kind;
mod netchar;
mod process;

pub use document::{
    CellConfig, CellularDomainConfig, Connectivity, ConnectivityModel, DataNetwork, Deployment,
    Domain, DomainAttrs, EopMode, GeoData, LineString, NetworkLocation, NetworkLocationAttrs,
    PhysicalLocation, PhysicalLocationAttrs, Point, Scenario, WifiConfig, Zone, ZoneAttrs,
    DISPLAY_MAP_COLOR,
};
pub use io::{DocumentFormat, ModelError};
pub use kind::{
    DomainType, Level, NetworkLocationType, NodeKind, PhysicalLocationType, ProcessType,
    ZoneType, COMMON_SUFFIX, DEFAULT_SUFFIX, PUBLIC_DOMAIN_NAME,
};
pub use netchar::{
    LatencyDistribution, NetChar, NetCharDefaults, NetCharScope, THROUGHPUT_DEFAULT,
};
pub use process::{
    AppDeployment, Container, CpuConfig, EgressServiceMap, ExternalConfig, GpuConfig,
    IngressServiceMap, MemoryConfig, Process, ServiceConfig, ServicePort, UserChart,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
