//! Process (application) nodes
//!
//! The wire form keeps every deployment attribute flat on the process.
//! [`AppDeployment`] gives the engine the discriminated union instead:
//! external, user chart or container, never a mix.

use std::collections::BTreeSet;

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::kind::ProcessType;
use crate::netchar::NetChar;

/// Application running on a physical location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProcessType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_char: Option<NetChar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement_id: Option<String>,
    #[serde(flatten)]
    pub deployment: AppDeployment,
}

impl Process {
    /// Whether the process runs outside the platform
    #[inline]
    #[must_use]
    pub fn is_external(&self) -> bool {
        matches!(self.deployment, AppDeployment::External(_))
    }

    /// Ports this process exposes outside the platform
    ///
    /// Union of service external ports and ingress service-map ports.
    #[must_use]
    pub fn external_ports(&self) -> BTreeSet<i32> {
        match &self.deployment {
            AppDeployment::External(ext) => ext
                .ingress_service_map
                .iter()
                .map(|m| m.external_port)
                .collect(),
            AppDeployment::Container(c) => c
                .service_config
                .iter()
                .flat_map(|svc| svc.ports.iter())
                .filter_map(|p| p.external_port)
                .collect(),
            AppDeployment::UserChart(_) => BTreeSet::new(),
        }
    }
}

/// How a process is deployed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDeployment", into = "RawDeployment")]
pub enum AppDeployment {
    /// Runs outside the platform, reached through service maps
    External(ExternalConfig),
    /// Deployed from a user-supplied chart
    UserChart(UserChart),
    /// Deployed from a container image
    Container(Container),
}

impl Default for AppDeployment {
    fn default() -> Self {
        Self::Container(Container::default())
    }
}

impl JsonSchema for AppDeployment {
    fn schema_name() -> String {
        RawDeployment::schema_name()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        RawDeployment::json_schema(gen)
    }
}

/// Service maps of an external process
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalConfig {
    pub ingress_service_map: Vec<IngressServiceMap>,
    pub egress_service_map: Vec<EgressServiceMap>,
}

/// Inbound mapping from a platform node port to an external service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngressServiceMap {
    pub name: String,
    pub port: i32,
    pub external_port: i32,
    pub protocol: String,
}

/// Outbound mapping from a platform service to an external address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EgressServiceMap {
    pub name: String,
    #[serde(default)]
    pub me_svc_name: String,
    pub ip: String,
    pub port: i32,
    pub protocol: String,
}

/// User chart deployment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserChart {
    pub location: String,
    pub alternate_values: Option<String>,
    pub group: Option<String>,
}

/// Container deployment
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Container {
    pub image: Option<String>,
    pub environment: Option<String>,
    pub command_exe: Option<String>,
    pub command_arguments: Option<String>,
    pub service_config: Option<ServiceConfig>,
    pub gpu_config: Option<GpuConfig>,
    pub cpu_config: Option<CpuConfig>,
    pub memory_config: Option<MemoryConfig>,
}

/// Service exposed by a container
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub me_svc_name: Option<String>,
    pub ports: Vec<ServicePort>,
}

/// One exposed port
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ServicePort {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_port: Option<i32>,
}

/// GPU request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GpuConfig {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub count: i32,
}

/// CPU request and limit in cores
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CpuConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Memory request and limit in MB
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MemoryConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

/// Flat wire form of [`AppDeployment`]
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
struct RawDeployment {
    is_external: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_config: Option<ExternalConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_chart_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_chart_alternate_values: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_chart_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    command_exe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    command_arguments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    service_config: Option<ServiceConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gpu_config: Option<GpuConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cpu_config: Option<CpuConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memory_config: Option<MemoryConfig>,
}

impl From<RawDeployment> for AppDeployment {
    fn from(raw: RawDeployment) -> Self {
        if raw.is_external {
            return Self::External(raw.external_config.unwrap_or_default());
        }
        match raw.user_chart_location.filter(|loc| !loc.is_empty()) {
            Some(location) => Self::UserChart(UserChart {
                location,
                alternate_values: raw.user_chart_alternate_values,
                group: raw.user_chart_group,
            }),
            None => Self::Container(Container {
                image: raw.image,
                environment: raw.environment,
                command_exe: raw.command_exe,
                command_arguments: raw.command_arguments,
                service_config: raw.service_config,
                gpu_config: raw.gpu_config,
                cpu_config: raw.cpu_config,
                memory_config: raw.memory_config,
            }),
        }
    }
}

impl From<AppDeployment> for RawDeployment {
    fn from(deployment: AppDeployment) -> Self {
        match deployment {
            AppDeployment::External(ext) => Self {
                is_external: true,
                external_config: Some(ext),
                ..Self::default()
            },
            AppDeployment::UserChart(chart) => Self {
                user_chart_location: Some(chart.location),
                user_chart_alternate_values: chart.alternate_values,
                user_chart_group: chart.group,
                ..Self::default()
            },
            AppDeployment::Container(c) => Self {
                image: c.image,
                environment: c.environment,
                command_exe: c.command_exe,
                command_arguments: c.command_arguments,
                service_config: c.service_config,
                gpu_config: c.gpu_config,
                cpu_config: c.cpu_config,
                memory_config: c.memory_config,
                ..Self::default()
            },
        }
    }
}
