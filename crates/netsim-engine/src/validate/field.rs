//! Per-field format and range checks

use std::ops::RangeInclusive;

use netsim_model::{ConnectivityModel, EopMode, LatencyDistribution};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::EngineConfig;
use crate::element::{Element, Field, FieldValue, NetCharAttr};
use crate::mapper;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(([a-z0-9][-a-z0-9.]*)?[a-z0-9])+$").unwrap());
static MAC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9A-Fa-f]{12}$").unwrap());
static CELL_4G_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9A-Fa-f]{1,7}$").unwrap());
static CELL_5G_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9A-Fa-f]{1,9}$").unwrap());
static MCC_MNC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{1,3}$").unwrap());
static WIRELESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^((,\s*)?(wifi|5g|4g|other))+$").unwrap());
static COLOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

const LATENCY: RangeInclusive<i64> = 0..=250_000;
const THROUGHPUT: RangeInclusive<i64> = 1..=1_000_000;
const PORT: RangeInclusive<i64> = 1..=65_535;
const EXTERNAL_PORT: RangeInclusive<i64> = 30_000..=32_767;
const GPU_COUNT: RangeInclusive<i64> = 1..=4;
const MEMORY: RangeInclusive<i64> = 1..=1_000_000;
const PACKET_LOSS: RangeInclusive<f64> = 0.0..=100.0;
const CPU: RangeInclusive<f64> = 0.1..=100.0;
const VELOCITY: RangeInclusive<f64> = 0.0..=1_000_000.0;
const RADIUS: RangeInclusive<f64> = 1.0..=1_000_000.0;

/// Check every non-blank field, writing errors into the element
///
/// Fields that pass have their previous error cleared. Returns the number
/// of fields left in error.
pub fn validate_fields(element: &mut Element, config: &EngineConfig) -> usize {
    let checks: Vec<(Field, Option<String>)> = element
        .iter()
        .filter(|(_, entry)| !entry.val.is_blank())
        .map(|(field, entry)| (field, check(field, &entry.val, config)))
        .collect();
    for (field, err) in checks {
        element.set_err(field, err);
    }
    let count = element.error_count();
    if count > 0 {
        tracing::debug!(count, name = %element.name(), "field validation failed");
    }
    count
}

fn check(field: Field, val: &FieldValue, config: &EngineConfig) -> Option<String> {
    let text = val.as_text();
    let text = text.trim();
    match field {
        Field::Name => {
            if text.len() > config.max_name_len {
                Some(format!("Maximum {} characters", config.max_name_len))
            } else {
                pattern(&NAME_RE, text, "Lowercase alphanumeric or '-' or '.'")
            }
        }
        Field::NetChar(_, attr) => match attr {
            NetCharAttr::Latency | NetCharAttr::LatencyVariation => int_in(val, &LATENCY),
            NetCharAttr::ThroughputDl | NetCharAttr::ThroughputUl => int_in(val, &THROUGHPUT),
            NetCharAttr::PacketLoss => float_in(val, &PACKET_LOSS),
            NetCharAttr::LatencyDistribution => text
                .parse::<LatencyDistribution>()
                .err()
                .map(|_| "Normal, Pareto, Paretonormal or Uniform".to_string()),
        },
        Field::ConnectivityModel => ConnectivityModel::parse(text)
            .is_none()
            .then(|| "OPEN or PDU".to_string()),
        Field::Port => int_in(val, &PORT),
        Field::ExtPort => int_in(val, &EXTERNAL_PORT),
        Field::GpuCount => int_in(val, &GPU_COUNT),
        Field::MemoryMin | Field::MemoryMax => int_in(val, &MEMORY),
        Field::CpuMin | Field::CpuMax => float_in(val, &CPU),
        Field::GeoVelocity => float_in(val, &VELOCITY),
        Field::GeoRadius => float_in(val, &RADIUS),
        Field::Protocol => protocol(text),
        Field::GeoEopMode => EopMode::parse(text)
            .is_none()
            .then(|| "LOOP or REVERSE".to_string()),
        Field::MacId | Field::PoaMacId => pattern(&MAC_RE, text, "12 hexadecimal digits"),
        Field::CellId4G => pattern(&CELL_4G_RE, text, "Up to 7 hexadecimal digits"),
        Field::CellId5G | Field::CellularDefaultCellId => {
            pattern(&CELL_5G_RE, text, "Up to 9 hexadecimal digits")
        }
        Field::CellularMcc | Field::CellularMnc => pattern(&MCC_MNC_RE, text, "Up to 3 digits"),
        Field::WirelessType => pattern(&WIRELESS_RE, text, "Comma-separated wifi, 5g, 4g or other"),
        Field::MapColor => pattern(&COLOR_RE, text, "Color as #RRGGBB"),
        Field::GeoLocation => mapper::parse_location(text)
            .is_none()
            .then(|| "Location as [longitude,latitude]".to_string()),
        Field::GeoPath => mapper::parse_path(text)
            .is_none()
            .then(|| "Path as [[longitude,latitude],...]".to_string()),
        Field::IngressSvcMap => ingress(text),
        Field::EgressSvcMap => egress(text),
        Field::EnvVar => mapper::parse_environment(text)
            .is_none()
            .then(|| "Environment as KEY=VALUE, comma separated".to_string()),
        _ => None,
    }
}

fn pattern(re: &Regex, text: &str, message: &str) -> Option<String> {
    (!re.is_match(text)).then(|| message.to_string())
}

fn int_in(val: &FieldValue, range: &RangeInclusive<i64>) -> Option<String> {
    match val.as_i64() {
        Some(v) if range.contains(&v) => None,
        Some(_) => Some(format!("Out of range ({}-{})", range.start(), range.end())),
        None => Some("Must be an integer".to_string()),
    }
}

fn float_in(val: &FieldValue, range: &RangeInclusive<f64>) -> Option<String> {
    match val.as_f64() {
        Some(v) if range.contains(&v) => None,
        Some(_) => Some(format!("Out of range ({}-{})", range.start(), range.end())),
        None => Some("Must be a number".to_string()),
    }
}

fn protocol(text: &str) -> Option<String> {
    let valid = text.eq_ignore_ascii_case("TCP") || text.eq_ignore_ascii_case("UDP");
    (!valid).then(|| "UDP or TCP".to_string())
}

fn entry_count(text: &str) -> usize {
    text.split(',').filter(|e| !e.trim().is_empty()).count()
}

fn ingress(text: &str) -> Option<String> {
    const FORMAT: &str = "Entries as extPort:name:port:protocol";
    let maps = mapper::parse_ingress(text);
    if maps.len() != entry_count(text) {
        return Some(FORMAT.to_string());
    }
    maps.iter().find_map(|m| {
        int_in(&FieldValue::from(m.external_port), &EXTERNAL_PORT)
            .or_else(|| int_in(&FieldValue::from(m.port), &PORT))
            .or_else(|| protocol(&m.protocol))
            .map(|e| format!("{}: {e}", m.name))
    })
}

fn egress(text: &str) -> Option<String> {
    const FORMAT: &str = "Entries as name:meSvcName:ip:port:protocol";
    let maps = mapper::parse_egress(text);
    if maps.len() != entry_count(text) {
        return Some(FORMAT.to_string());
    }
    maps.iter().find_map(|m| {
        int_in(&FieldValue::from(m.port), &PORT)
            .or_else(|| protocol(&m.protocol))
            .map(|e| format!("{}: {e}", m.name))
    })
}
