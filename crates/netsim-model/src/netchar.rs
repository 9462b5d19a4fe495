//! Network characteristics
//!
//! Every tree level carries a `netChar` bundle. The level decides which
//! default constants apply when a value is absent.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::io::ModelError;

/// Throughput applied when a node leaves it unset (Mbps)
pub const THROUGHPUT_DEFAULT: i32 = 1000;

/// Latency, jitter, throughput and loss bundle
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NetChar {
    /// Latency in ms
    pub latency: i32,
    /// Latency variation (jitter) in ms
    pub latency_variation: i32,
    /// Latency distribution model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_distribution: Option<LatencyDistribution>,
    /// Downlink throughput in Mbps, 0 when unset
    pub throughput_dl: i32,
    /// Uplink throughput in Mbps, 0 when unset
    pub throughput_ul: i32,
    /// Packet loss percentage
    pub packet_loss: f64,
}

impl NetChar {
    /// Build a bundle from the default constants of a scope
    #[must_use]
    pub fn defaults_for(scope: NetCharScope) -> Self {
        let d = scope.defaults();
        Self {
            latency: d.latency,
            latency_variation: d.latency_variation,
            latency_distribution: (scope == NetCharScope::InterDomain)
                .then_some(LatencyDistribution::Normal),
            throughput_dl: d.throughput,
            throughput_ul: d.throughput,
            packet_loss: d.packet_loss,
        }
    }
}

/// Latency distribution models
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
pub enum LatencyDistribution {
    #[default]
    Normal,
    Pareto,
    Paretonormal,
    Uniform,
}

impl LatencyDistribution {
    /// All distributions in declaration order
    pub const ALL: [Self; 4] = [Self::Normal, Self::Pareto, Self::Paretonormal, Self::Uniform];

    /// Wire string
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Pareto => "Pareto",
            Self::Paretonormal => "Paretonormal",
            Self::Uniform => "Uniform",
        }
    }
}

impl fmt::Display for LatencyDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LatencyDistribution {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| ModelError::UnknownValue {
                what: "latency distribution",
                value: s.to_string(),
            })
    }
}

/// Tree level a netChar bundle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NetCharScope {
    /// Scenario deployment (between domains)
    InterDomain,
    /// Domain (between zones)
    InterZone,
    /// Zone (between network locations)
    IntraZone,
    /// Network location (terminal link)
    TerminalLink,
    /// Physical location link
    Link,
    /// Process
    App,
}

impl NetCharScope {
    /// All scopes, top of the tree first
    pub const ALL: [Self; 6] = [
        Self::InterDomain,
        Self::InterZone,
        Self::IntraZone,
        Self::TerminalLink,
        Self::Link,
        Self::App,
    ];

    /// Default constants for this scope
    #[inline]
    #[must_use]
    pub const fn defaults(self) -> NetCharDefaults {
        match self {
            Self::InterDomain => NetCharDefaults::INTER_DOMAIN,
            Self::InterZone => NetCharDefaults::INTER_ZONE,
            Self::IntraZone => NetCharDefaults::INTRA_ZONE,
            Self::TerminalLink => NetCharDefaults::TERMINAL_LINK,
            Self::Link => NetCharDefaults::LINK,
            Self::App => NetCharDefaults::APP,
        }
    }

    /// Field-name prefix used by flat elements
    #[inline]
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::InterDomain => "interDomain",
            Self::InterZone => "interZone",
            Self::IntraZone => "intraZone",
            Self::TerminalLink => "terminalLink",
            Self::Link => "link",
            Self::App => "app",
        }
    }
}

/// Documented default constants for one scope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetCharDefaults {
    pub latency: i32,
    pub latency_variation: i32,
    pub throughput: i32,
    pub packet_loss: f64,
}

impl NetCharDefaults {
    pub const INTER_DOMAIN: Self = Self::new(50, 10);
    pub const INTER_ZONE: Self = Self::new(6, 2);
    pub const INTRA_ZONE: Self = Self::new(5, 1);
    pub const TERMINAL_LINK: Self = Self::new(1, 1);
    pub const LINK: Self = Self::new(0, 0);
    pub const APP: Self = Self::new(0, 0);

    const fn new(latency: i32, latency_variation: i32) -> Self {
        Self {
            latency,
            latency_variation,
            throughput: THROUGHPUT_DEFAULT,
            packet_loss: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_defaults() {
        assert_eq!(NetCharScope::InterDomain.defaults().latency, 50);
        assert_eq!(NetCharScope::InterZone.defaults().latency_variation, 2);
        assert_eq!(NetCharScope::TerminalLink.defaults().throughput, 1000);
        assert_eq!(NetCharScope::App.defaults().latency, 0);
    }

    #[test]
    fn defaults_only_set_distribution_on_deployment() {
        let deployment = NetChar::defaults_for(NetCharScope::InterDomain);
        assert_eq!(
            deployment.latency_distribution,
            Some(LatencyDistribution::Normal)
        );
        let zone = NetChar::defaults_for(NetCharScope::IntraZone);
        assert_eq!(zone.latency_distribution, None);
        assert_eq!(zone.throughput_ul, THROUGHPUT_DEFAULT);
    }

    #[test]
    fn distribution_parse() {
        assert_eq!(
            "Paretonormal".parse::<LatencyDistribution>().unwrap(),
            LatencyDistribution::Paretonormal
        );
        assert!("normal".parse::<LatencyDistribution>().is_err());
    }

    #[test]
    fn missing_fields_deserialize_to_zero() {
        let nc: NetChar = serde_json::from_str(r#"{"latency": 3}"#).unwrap();
        assert_eq!(nc.latency, 3);
        assert_eq!(nc.throughput_dl, 0);
        assert_eq!(nc.latency_distribution, None);
    }
}
