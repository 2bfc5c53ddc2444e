use crate::model::spectrum::{Axis, AxisChannel};
use crate::upstream::{first_number, first_present, first_string, list_items};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Condition reported by the monitoring platform. Authoritative for action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ExternalStatus {
    Normal,
    Satisfactory,
    Alert,
    Unacceptable,
    #[default]
    Unknown,
}

impl ExternalStatus {
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "normal" => ExternalStatus::Normal,
            "satisfactory" => ExternalStatus::Satisfactory,
            "alert" => ExternalStatus::Alert,
            "unacceptable" | "unsatisfactory" => ExternalStatus::Unacceptable,
            _ => ExternalStatus::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExternalStatus::Normal => "Normal",
            ExternalStatus::Satisfactory => "Satisfactory",
            ExternalStatus::Alert => "Alert",
            ExternalStatus::Unacceptable => "Unacceptable",
            ExternalStatus::Unknown => "Unknown",
        }
    }
}

/// ISO 10816 style zone computed by the analysis service. Shown as a cross-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SeverityZone {
    A,
    B,
    C,
    D,
}

impl SeverityZone {
    pub const ALL: [SeverityZone; 4] = [
        SeverityZone::A,
        SeverityZone::B,
        SeverityZone::C,
        SeverityZone::D,
    ];

    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let letter = trimmed
            .strip_prefix("Zone ")
            .or_else(|| trimmed.strip_prefix("zone "))
            .unwrap_or(trimmed);
        match letter.to_ascii_uppercase().as_str() {
            "A" => Some(SeverityZone::A),
            "B" => Some(SeverityZone::B),
            "C" => Some(SeverityZone::C),
            "D" => Some(SeverityZone::D),
            _ => None,
        }
    }

    pub fn letter(self) -> &'static str {
        match self {
            SeverityZone::A => "A",
            SeverityZone::B => "B",
            SeverityZone::C => "C",
            SeverityZone::D => "D",
        }
    }

    /// Reads `{"zone": "B", ...}` or a bare `"B"`.
    pub fn from_upstream(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Self::parse(text),
            Value::Object(_) => first_string(value, &["zone", "severityZone"])
                .and_then(|zone| Self::parse(&zone)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "high" => Confidence::High,
            "medium" => Confidence::Medium,
            _ => Confidence::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Confidence::Low => "Low",
            Confidence::Medium => "Medium",
            Confidence::High => "High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub fault_type: String,
    pub confidence: Confidence,
    pub evidence: Vec<String>,
    pub recommendation: String,
}

impl Diagnosis {
    pub const MAX_EVIDENCE: usize = 5;

    pub fn from_upstream(value: &Value) -> Option<Self> {
        let fault_type = first_string(value, &["faultType", "fault", "type"])?;
        let evidence = first_present(value, &["evidence"])
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        Some(Self {
            fault_type,
            confidence: first_string(value, &["confidence"])
                .map(|text| Confidence::parse(&text))
                .unwrap_or(Confidence::Low),
            evidence,
            recommendation: first_string(value, &["recommendation", "action"])
                .unwrap_or_else(|| "-".to_string()),
        })
    }

    /// Picks the most confident diagnosis and pools unique evidence from all of them.
    pub fn combine(diagnoses: &[Diagnosis]) -> Option<Diagnosis> {
        let mut best = diagnoses
            .iter()
            .fold(None::<&Diagnosis>, |best, candidate| match best {
                Some(current) if current.confidence >= candidate.confidence => Some(current),
                _ => Some(candidate),
            })?
            .clone();
        let mut evidence: Vec<String> = Vec::new();
        for item in diagnoses.iter().flat_map(|d| d.evidence.iter()) {
            if !evidence.contains(item) {
                evidence.push(item.clone());
            }
        }
        evidence.truncate(Self::MAX_EVIDENCE);
        best.evidence = evidence;
        Some(best)
    }
}

/// Scalar metrics for one axis; absent values render as `-`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisMetrics {
    pub velocity_rms: Option<f64>,
    pub acceleration_rms: Option<f64>,
    pub peak_amplitude: Option<f64>,
}

impl AxisMetrics {
    pub fn from_upstream(value: &Value) -> Self {
        let severity_velocity = value
            .get("severity")
            .and_then(|severity| first_number(severity, &["velocityRMS", "velocityRms"]));
        Self {
            velocity_rms: first_number(value, &["velocityRMS", "velocityRms", "vRms", "vrms"])
                .or(severity_velocity),
            acceleration_rms: first_number(
                value,
                &["accelerationRMS", "accelerationRms", "aRms", "arms"],
            ),
            peak_amplitude: first_number(value, &["peakAmplitude", "peak"]),
        }
    }

    /// Field-wise fallback: values present here win.
    pub fn or(self, fallback: AxisMetrics) -> AxisMetrics {
        AxisMetrics {
            velocity_rms: self.velocity_rms.or(fallback.velocity_rms),
            acceleration_rms: self.acceleration_rms.or(fallback.acceleration_rms),
            peak_amplitude: self.peak_amplitude.or(fallback.peak_amplitude),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.velocity_rms.is_none() && self.acceleration_rms.is_none() && self.peak_amplitude.is_none()
    }
}

/// Bearing entry from the bearing-location list, with its cached metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct BearingRecord {
    pub bearing_id: String,
    pub name: String,
    pub status: ExternalStatus,
    pub cached_metrics: BTreeMap<Axis, AxisMetrics>,
}

impl BearingRecord {
    pub fn bare(bearing_id: &str) -> Self {
        Self {
            bearing_id: bearing_id.to_string(),
            name: bearing_id.to_string(),
            status: ExternalStatus::Unknown,
            cached_metrics: BTreeMap::new(),
        }
    }

    pub fn from_upstream(value: &Value) -> Option<Self> {
        let bearing_id = first_string(value, &["_id", "bearingLocationId", "bearingId", "id"])?;
        let name = first_string(value, &["name", "bearingName"]).unwrap_or_else(|| bearing_id.clone());
        let status = first_string(value, &["statusName", "status"])
            .map(|text| ExternalStatus::parse(&text))
            .unwrap_or_default();
        let mut cached_metrics = BTreeMap::new();
        if let Some(Value::Object(per_axis)) = first_present(value, &["metrics", "axisMetrics", "latest"]) {
            for (key, metrics) in per_axis {
                if let Some(axis) = Axis::parse(key) {
                    cached_metrics.insert(axis, AxisMetrics::from_upstream(metrics));
                }
            }
        }
        Some(Self {
            bearing_id,
            name,
            status,
            cached_metrics,
        })
    }

    pub fn cached(&self, axis: Axis) -> AxisMetrics {
        self.cached_metrics.get(&axis).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineSummary {
    pub machine_id: String,
    pub name: String,
    pub machine_type: String,
    pub customer_id: String,
    pub area_id: String,
    pub bearing_ids: Vec<String>,
}

impl MachineSummary {
    pub fn bare(machine_id: &str) -> Self {
        Self {
            machine_id: machine_id.to_string(),
            name: machine_id.to_string(),
            machine_type: "-".to_string(),
            customer_id: "-".to_string(),
            area_id: "-".to_string(),
            bearing_ids: Vec::new(),
        }
    }

    pub fn from_upstream(value: &Value) -> Option<Self> {
        let machine_id = first_string(value, &["machineId", "_id", "id"])?;
        let bearing_ids = list_items(value, &["bearingIds", "bearings", "bearingLocations"])
            .iter()
            .filter_map(|item| match item {
                Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
                Value::String(_) => None,
                other => first_string(other, &["_id", "bearingLocationId", "bearingId"]),
            })
            .collect();
        Some(Self {
            name: first_string(value, &["name", "machineName"]).unwrap_or_else(|| machine_id.clone()),
            machine_type: first_string(value, &["machineType", "type"]).unwrap_or_else(|| "-".into()),
            customer_id: first_string(value, &["customerId", "customerName", "customer"])
                .unwrap_or_else(|| "-".into()),
            area_id: first_string(value, &["areaId", "area"]).unwrap_or_else(|| "-".into()),
            machine_id,
            bearing_ids,
        })
    }
}

/// Everything known about one bearing for a single analysis snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BearingAnalysis {
    pub bearing_id: String,
    pub machine_id: String,
    pub running_frequency: f64,
    pub sample_rate: f64,
    pub rpm: Option<f64>,
    pub external_status: ExternalStatus,
    pub computed_zone: Option<SeverityZone>,
    pub velocity_rms: Option<f64>,
    pub diagnosis: Option<Diagnosis>,
    pub channels: BTreeMap<Axis, AxisChannel>,
}

impl BearingAnalysis {
    pub fn channel(&self, axis: Axis) -> Option<&AxisChannel> {
        self.channels.get(&axis)
    }

    pub fn is_available(&self, axis: Axis) -> bool {
        self.channel(axis).is_some_and(AxisChannel::has_spectrum)
    }

    pub fn has_any_spectrum(&self) -> bool {
        Axis::ALL.iter().any(|axis| self.is_available(*axis))
    }
}

/// A bearing as it appears in a report: analysis plus resolved table metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BearingReport {
    pub name: String,
    pub analysis: BearingAnalysis,
    pub metrics: BTreeMap<Axis, AxisMetrics>,
}

impl BearingReport {
    pub fn metrics(&self, axis: Axis) -> AxisMetrics {
        self.metrics.get(&axis).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineReport {
    pub machine: MachineSummary,
    pub bearings: Vec<BearingReport>,
}

impl MachineReport {
    pub fn chart_count(&self) -> usize {
        self.bearings.len() * Axis::ALL.len()
    }

    pub fn has_any_spectrum(&self) -> bool {
        self.bearings.iter().any(|b| b.analysis.has_any_spectrum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_aliases_collapse_to_unacceptable() {
        assert_eq!(ExternalStatus::parse("Unacceptable"), ExternalStatus::Unacceptable);
        assert_eq!(ExternalStatus::parse("unsatisfactory"), ExternalStatus::Unacceptable);
        assert_eq!(ExternalStatus::parse(""), ExternalStatus::Unknown);
    }

    #[test]
    fn zone_reads_object_and_string_forms() {
        assert_eq!(SeverityZone::from_upstream(&json!({"zone": "c"})), Some(SeverityZone::C));
        assert_eq!(SeverityZone::from_upstream(&json!("Zone D")), Some(SeverityZone::D));
        assert_eq!(SeverityZone::from_upstream(&json!(3)), None);
    }

    #[test]
    fn combine_prefers_high_confidence_and_dedups_evidence() {
        let low = Diagnosis {
            fault_type: "Normal".into(),
            confidence: Confidence::Low,
            evidence: vec!["Low overall vibration levels".into()],
            recommendation: "Continue regular monitoring".into(),
        };
        let high = Diagnosis {
            fault_type: "Unbalance".into(),
            confidence: Confidence::High,
            evidence: vec!["Dominant 1× running frequency peak".into(), "Low overall vibration levels".into()],
            recommendation: "Schedule balancing service".into(),
        };
        let combined = Diagnosis::combine(&[low, high]).unwrap();
        assert_eq!(combined.fault_type, "Unbalance");
        assert_eq!(combined.evidence.len(), 2);
        assert!(Diagnosis::combine(&[]).is_none());
    }

    #[test]
    fn bearing_record_reads_cached_metrics_by_axis_alias() {
        let record = BearingRecord::from_upstream(&json!({
            "_id": "b-001",
            "bearingName": "DE Motor",
            "statusName": "Alert",
            "metrics": {"H-Axis": {"velocityRms": 2.4}, "V": {"aRms": "0.8"}}
        }))
        .unwrap();
        assert_eq!(record.name, "DE Motor");
        assert_eq!(record.status, ExternalStatus::Alert);
        assert_eq!(record.cached(Axis::H).velocity_rms, Some(2.4));
        assert_eq!(record.cached(Axis::V).acceleration_rms, Some(0.8));
        assert!(record.cached(Axis::A).is_empty());
    }

    #[test]
    fn metrics_fallback_is_field_wise() {
        let response = AxisMetrics {
            velocity_rms: Some(1.5),
            ..AxisMetrics::default()
        };
        let cached = AxisMetrics {
            velocity_rms: Some(9.9),
            acceleration_rms: Some(0.3),
            peak_amplitude: None,
        };
        let merged = response.or(cached);
        assert_eq!(merged.velocity_rms, Some(1.5));
        assert_eq!(merged.acceleration_rms, Some(0.3));
        assert_eq!(merged.peak_amplitude, None);
    }

    #[test]
    fn machine_summary_collects_embedded_bearing_ids() {
        let summary = MachineSummary::from_upstream(&json!({
            "_id": "m-42",
            "machineName": "Cooling Fan",
            "bearings": [{"_id": "b-1"}, " b-2 ", "", {"name": "orphan"}]
        }))
        .unwrap();
        assert_eq!(summary.name, "Cooling Fan");
        assert_eq!(summary.bearing_ids, vec!["b-1".to_string(), "b-2".to_string()]);
        assert_eq!(summary.customer_id, "-");
    }
}
