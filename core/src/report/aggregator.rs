use crate::collaborator::{AnalysisCollaborator, AnalysisKind, AnalysisRequest, DataSource};
use crate::model::{
    Axis, AxisChannel, AxisMetrics, BearingAnalysis, BearingRecord, BearingReport, Diagnosis,
    ExternalStatus, MachineReport, MachineSummary, SeverityZone,
};
use crate::prelude::{ReportError, ReportResult};
use crate::spectrum::{normalize_optional, SampleCap};
use crate::telemetry::{LogManager, Metrics, MetricsRecorder};
use crate::upstream::{first_bool, first_number, first_present, first_string, list_items, unwrap_envelope};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;

pub const SPECTRUM_KEYS: &[&str] = &["fftSpectrum", "spectrum", "fft", "FFT", "rawData", "data", "samples"];
pub const SAMPLE_RATE_KEYS: &[&str] = &["sampleRate", "sample_rate", "SR", "sr"];
pub const DEFAULT_SAMPLE_RATE: f64 = 10_000.0;

const LIST_WRAPPERS: &[&str] = &["data", "machines", "bearings", "bearingLocations", "items"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateOptions {
    pub date: NaiveDate,
    pub analysis_kind: AnalysisKind,
    pub data_source: DataSource,
    pub cap: SampleCap,
    pub default_sample_rate: f64,
}

impl AggregateOptions {
    pub fn for_report(date: NaiveDate) -> Self {
        Self {
            date,
            analysis_kind: AnalysisKind::default(),
            data_source: DataSource::default(),
            cap: SampleCap::Report,
            default_sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    pub fn for_display(date: NaiveDate) -> Self {
        Self {
            cap: SampleCap::Display,
            ..Self::for_report(date)
        }
    }
}

/// Bearing-level fields some responses carry; the first response that has
/// a field wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BearingContext {
    pub rpm: Option<f64>,
    pub running_frequency: Option<f64>,
    pub sample_rate: Option<f64>,
    pub external_status: Option<ExternalStatus>,
    pub overall_zone: Option<SeverityZone>,
    pub overall_diagnosis: Option<Diagnosis>,
}

impl BearingContext {
    fn from_response(body: &Value, axis_body: &Value) -> Self {
        let rpm = first_number(axis_body, &["rpm", "RPM"]).or_else(|| first_number(body, &["rpm", "RPM"]));
        let running_frequency = first_number(axis_body, &["runningFrequency", "running_frequency"])
            .or_else(|| first_number(body, &["runningFrequency", "running_frequency"]))
            .or_else(|| rpm.map(|rpm| rpm / 60.0))
            .filter(|hz| *hz > 0.0);
        let external_status = first_string(body, &["externalStatus", "statusName", "status"])
            .map(|text| ExternalStatus::parse(&text))
            .filter(|status| *status != ExternalStatus::Unknown);
        Self {
            rpm,
            running_frequency,
            sample_rate: first_number(axis_body, SAMPLE_RATE_KEYS)
                .or_else(|| first_number(body, SAMPLE_RATE_KEYS))
                .filter(|sr| *sr > 0.0),
            external_status,
            overall_zone: first_present(body, &["overallSeverity", "computedSeverityZone"])
                .and_then(SeverityZone::from_upstream),
            overall_diagnosis: first_present(body, &["overallDiagnosis"]).and_then(Diagnosis::from_upstream),
        }
    }

    /// Fills fields still missing here from `other`.
    fn absorb(&mut self, other: BearingContext) {
        self.rpm = self.rpm.or(other.rpm);
        self.running_frequency = self.running_frequency.or(other.running_frequency);
        self.sample_rate = self.sample_rate.or(other.sample_rate);
        self.external_status = self.external_status.or(other.external_status);
        self.overall_zone = self.overall_zone.or(other.overall_zone);
        if self.overall_diagnosis.is_none() {
            self.overall_diagnosis = other.overall_diagnosis;
        }
    }
}

/// Outcome of one per-axis request. Slots never affect their siblings.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisSlot {
    Resolved {
        channel: AxisChannel,
        metrics: AxisMetrics,
        zone: Option<SeverityZone>,
        diagnosis: Option<Diagnosis>,
        context: BearingContext,
    },
    Empty {
        reason: String,
    },
    Failed {
        error: String,
    },
}

impl AxisSlot {
    /// Interprets a per-axis response, comprehensive or single-axis.
    pub fn from_response(axis: Axis, response: &Value, options: &AggregateOptions) -> AxisSlot {
        if first_bool(response, &["success"]) == Some(false) {
            return AxisSlot::Empty {
                reason: first_string(response, &["error", "message", "detail"])
                    .unwrap_or_else(|| "Analysis service reported no result".to_string()),
            };
        }
        let body = unwrap_envelope(response);
        let axis_body = body
            .get("axisData")
            .and_then(|per_axis| per_axis.get(axis.wire_name()).or_else(|| per_axis.get(axis.code())))
            .unwrap_or(body);

        if first_bool(axis_body, &["available"]) == Some(false) {
            return AxisSlot::Empty {
                reason: first_string(axis_body, &["error", "message"])
                    .unwrap_or_else(|| "No data available for this axis".to_string()),
            };
        }

        let context = BearingContext::from_response(body, axis_body);
        let sample_rate = context.sample_rate.unwrap_or(options.default_sample_rate);
        let spectrum = normalize_optional(first_present(axis_body, SPECTRUM_KEYS), sample_rate, options.cap);
        let error = spectrum
            .is_empty()
            .then(|| format!("No spectrum returned for {}", axis.wire_name()));
        let severity = axis_body.get("severity");

        AxisSlot::Resolved {
            channel: AxisChannel {
                available: !spectrum.is_empty(),
                spectrum,
                harmonics: AxisChannel::harmonics_from_upstream(axis_body.get("harmonics")),
                peak_at_1x: AxisChannel::peak_from_upstream(axis_body),
                error,
            },
            metrics: AxisMetrics::from_upstream(axis_body),
            zone: severity
                .and_then(SeverityZone::from_upstream)
                .or_else(|| first_present(axis_body, &["zone"]).and_then(SeverityZone::from_upstream)),
            diagnosis: axis_body.get("diagnosis").and_then(Diagnosis::from_upstream),
            context,
        }
    }

    pub fn has_spectrum(&self) -> bool {
        matches!(self, AxisSlot::Resolved { channel, .. } if channel.has_spectrum())
    }
}

/// Collects everything a report needs from the analysis collaborator.
pub struct ReportAggregator<'a> {
    collaborator: &'a dyn AnalysisCollaborator,
    options: AggregateOptions,
    metrics: MetricsRecorder,
    log: LogManager,
}

impl<'a> ReportAggregator<'a> {
    pub fn new(collaborator: &'a dyn AnalysisCollaborator, options: AggregateOptions) -> Self {
        Self {
            collaborator,
            options,
            metrics: MetricsRecorder::new(),
            log: LogManager::scoped("aggregator"),
        }
    }

    pub fn options(&self) -> &AggregateOptions {
        &self.options
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.snapshot()
    }

    /// Machines with data on the configured date.
    pub async fn list_machines(&self) -> ReportResult<Vec<MachineSummary>> {
        self.metrics.record_request();
        match self.collaborator.machines(self.options.date).await {
            Ok(value) => Ok(list_items(&value, LIST_WRAPPERS)
                .iter()
                .filter_map(MachineSummary::from_upstream)
                .collect()),
            Err(err) => {
                self.metrics.record_failure();
                self.log.degraded(&format!("machine list unavailable: {}", err));
                Ok(Vec::new())
            }
        }
    }

    /// Report data for one machine; `bearing` restricts it to a single bearing.
    pub async fn machine_report(&self, machine_id: &str, bearing: Option<&str>) -> ReportResult<MachineReport> {
        let machine_id = machine_id.trim();
        if machine_id.is_empty() {
            return Err(ReportError::MissingIdentifier("machine id"));
        }
        let bearing = match bearing.map(str::trim) {
            Some("") => return Err(ReportError::MissingIdentifier("bearing id")),
            other => other,
        };
        let log = self.log.child(format!("machine {}", machine_id));

        self.metrics.record_request();
        let machine = match self.collaborator.machine(machine_id).await {
            Ok(value) => MachineSummary::from_upstream(unwrap_envelope(&value))
                .unwrap_or_else(|| MachineSummary::bare(machine_id)),
            Err(err) => {
                self.metrics.record_failure();
                log.degraded(&format!("machine record unavailable, using id only: {}", err));
                MachineSummary::bare(machine_id)
            }
        };

        let mut records = self.bearing_records(machine_id, &machine, &log).await;
        if let Some(bearing_id) = bearing {
            records.retain(|record| record.bearing_id == bearing_id);
            if records.is_empty() {
                log.degraded(&format!("bearing {} not in bearing list, analyzing it bare", bearing_id));
                records.push(BearingRecord::bare(bearing_id));
            }
        }
        log.record(&format!("{} bearing(s) to analyze", records.len()));

        let mut bearings = Vec::with_capacity(records.len());
        for record in &records {
            match self.analyze_bearing(machine_id, record).await {
                Ok(report) => bearings.push(report),
                Err(err) => log.degraded(&format!("skipping bearing {:?}: {}", record.bearing_id, err)),
            }
        }
        Ok(MachineReport { machine, bearings })
    }

    async fn bearing_records(&self, machine_id: &str, machine: &MachineSummary, log: &LogManager) -> Vec<BearingRecord> {
        self.metrics.record_request();
        let listed: Vec<BearingRecord> = match self.collaborator.bearings(machine_id).await {
            Ok(value) => list_items(&value, LIST_WRAPPERS)
                .iter()
                .filter_map(BearingRecord::from_upstream)
                .collect(),
            Err(err) => {
                self.metrics.record_failure();
                log.degraded(&format!("bearing list unavailable: {}", err));
                Vec::new()
            }
        };
        if listed.is_empty() && !machine.bearing_ids.is_empty() {
            return machine.bearing_ids.iter().map(|id| BearingRecord::bare(id)).collect();
        }
        listed
    }

    /// Requests H, V and A in order and merges the slots.
    pub async fn analyze_bearing(&self, machine_id: &str, record: &BearingRecord) -> ReportResult<BearingReport> {
        if machine_id.trim().is_empty() {
            return Err(ReportError::MissingIdentifier("machine id"));
        }
        if record.bearing_id.trim().is_empty() {
            return Err(ReportError::MissingIdentifier("bearing id"));
        }
        let log = self
            .log
            .child(format!("machine {}", machine_id))
            .child(format!("bearing {}", record.bearing_id));

        let mut slots = Vec::with_capacity(Axis::ALL.len());
        for axis in Axis::ALL {
            let request = AnalysisRequest {
                machine_id: machine_id.to_string(),
                bearing_id: record.bearing_id.clone(),
                axis,
                date: self.options.date,
                analysis_kind: self.options.analysis_kind,
                data_source: self.options.data_source,
            };
            self.metrics.record_request();
            let slot = match self.collaborator.analysis(&request).await {
                Ok(response) => AxisSlot::from_response(axis, &response, &self.options),
                Err(err) => {
                    self.metrics.record_failure();
                    log.degraded(&format!("{} request failed: {}", axis, err));
                    AxisSlot::Failed { error: err.to_string() }
                }
            };
            match &slot {
                AxisSlot::Empty { reason } => {
                    self.metrics.record_empty();
                    log.degraded(&format!("{} empty: {}", axis, reason));
                }
                AxisSlot::Resolved { channel, .. } if !channel.has_spectrum() => {
                    self.metrics.record_empty();
                    log.trace(&format!("{} resolved without spectrum", axis));
                }
                AxisSlot::Resolved { channel, .. } => {
                    log.trace(&format!("{} resolved with {} points", axis, channel.spectrum.len()));
                }
                AxisSlot::Failed { .. } => {}
            }
            slots.push((axis, slot));
        }

        Ok(self.merge(machine_id, record, slots))
    }

    fn merge(&self, machine_id: &str, record: &BearingRecord, slots: Vec<(Axis, AxisSlot)>) -> BearingReport {
        let mut context = BearingContext::default();
        let mut channels = BTreeMap::new();
        let mut metrics = BTreeMap::new();
        let mut zones = Vec::new();
        let mut diagnoses = Vec::new();

        for (axis, slot) in slots {
            let cached = record.cached(axis);
            match slot {
                AxisSlot::Resolved {
                    channel,
                    metrics: reported,
                    zone,
                    diagnosis,
                    context: seen,
                } => {
                    context.absorb(seen);
                    zones.extend(zone);
                    diagnoses.extend(diagnosis);
                    metrics.insert(axis, reported.or(cached));
                    channels.insert(axis, channel);
                }
                AxisSlot::Empty { reason: error } | AxisSlot::Failed { error } => {
                    metrics.insert(axis, cached);
                    channels.insert(axis, AxisChannel::unavailable(error));
                }
            }
        }

        let velocity_rms = metrics
            .values()
            .filter_map(|m: &AxisMetrics| m.velocity_rms)
            .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.max(v))));

        let analysis = BearingAnalysis {
            bearing_id: record.bearing_id.clone(),
            machine_id: machine_id.to_string(),
            running_frequency: context.running_frequency.unwrap_or(0.0),
            sample_rate: context.sample_rate.unwrap_or(self.options.default_sample_rate),
            rpm: context.rpm,
            external_status: context.external_status.unwrap_or(record.status),
            computed_zone: context.overall_zone.or_else(|| zones.iter().copied().max()),
            velocity_rms,
            diagnosis: context.overall_diagnosis.or_else(|| Diagnosis::combine(&diagnoses)),
            channels,
        };
        BearingReport {
            name: record.name.clone(),
            analysis,
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::FixtureCollaborator;
    use serde_json::json;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn vertical_response() -> Value {
        let spectrum: Vec<Value> = (0..20)
            .map(|i| json!({"frequency": i as f64 * 5.0, "amplitude": if i == 5 { 0.42 } else { 0.02 }}))
            .collect();
        json!({
            "success": true,
            "data": {
                "rpm": 1500,
                "SR": 20000,
                "fftSpectrum": spectrum,
                "peakAt1x": {"frequency": 25.0, "amplitude": 0.42},
                "harmonics": [{"harmonic": 2, "detectedFrequency": 50.0, "amplitude": 0.1, "isSignificant": true}],
                "severity": {"zone": "B", "velocityRMS": 2.1},
                "diagnosis": {"faultType": "Unbalance", "confidence": "High", "evidence": ["1× dominant"], "recommendation": "Balance rotor"}
            }
        })
    }

    fn fixture() -> FixtureCollaborator {
        FixtureCollaborator::default()
            .with_machine(json!({"_id": "m-0001", "name": "Pump 1", "machineType": "Pump"}))
            .with_bearings(
                "m-0001",
                json!({"data": [{
                    "_id": "b-0001",
                    "name": "DE",
                    "statusName": "Alert",
                    "metrics": {"H": {"velocityRms": 1.8, "aRms": 0.4}, "A": {"vRms": 0.9}}
                }]}),
            )
            .with_analysis("m-0001", "b-0001", Some(Axis::V), vertical_response())
            .with_analysis("m-0001", "b-0001", Some(Axis::A), json!({"success": false, "message": "no samples"}))
            .failing("m-0001/b-0001/H")
    }

    #[tokio::test]
    async fn failed_axes_do_not_affect_siblings() {
        let collaborator = fixture();
        let aggregator = ReportAggregator::new(&collaborator, AggregateOptions::for_report(date()));
        let report = aggregator.machine_report("m-0001", None).await.unwrap();

        assert_eq!(report.machine.name, "Pump 1");
        assert_eq!(report.bearings.len(), 1);
        let bearing = &report.bearings[0];
        let analysis = &bearing.analysis;
        assert!(analysis.is_available(Axis::V));
        assert!(!analysis.is_available(Axis::H));
        assert!(!analysis.is_available(Axis::A));
        assert_eq!(analysis.channel(Axis::V).unwrap().spectrum.len(), 20);
        assert_eq!(analysis.channel(Axis::A).unwrap().error.as_deref(), Some("no samples"));

        assert_eq!(bearing.metrics(Axis::H).velocity_rms, Some(1.8));
        assert_eq!(bearing.metrics(Axis::V).velocity_rms, Some(2.1));
        assert_eq!(bearing.metrics(Axis::A).velocity_rms, Some(0.9));

        assert_eq!(analysis.running_frequency, 25.0);
        assert_eq!(analysis.sample_rate, 20000.0);
        assert_eq!(analysis.external_status, ExternalStatus::Alert);
        assert_eq!(analysis.computed_zone, Some(SeverityZone::B));
        assert_eq!(analysis.velocity_rms, Some(2.1));
        assert_eq!(analysis.diagnosis.as_ref().unwrap().fault_type, "Unbalance");

        let metrics = aggregator.metrics();
        assert_eq!(metrics.requests, 5);
        assert_eq!(metrics.failures, 1);
        assert_eq!(metrics.empty, 1);
    }

    #[tokio::test]
    async fn comprehensive_response_fills_every_axis() {
        let mut axis_data = serde_json::Map::new();
        for axis in Axis::ALL {
            axis_data.insert(
                axis.wire_name().to_string(),
                json!({"fftSpectrum": [[10.0, 0.1], [20.0, 0.3]], "severity": {"zone": if axis == Axis::A { "C" } else { "A" }}}),
            );
        }
        let collaborator = FixtureCollaborator::default()
            .with_bearings("m-2", json!([{"_id": "b-9"}]))
            .with_analysis("m-2", "b-9", None, json!({"runningFrequency": 24.8, "axisData": axis_data}));
        let aggregator = ReportAggregator::new(&collaborator, AggregateOptions::for_report(date()));
        let report = aggregator.machine_report("m-2", None).await.unwrap();

        assert_eq!(report.machine, MachineSummary::bare("m-2"));
        let analysis = &report.bearings[0].analysis;
        assert!(Axis::ALL.iter().all(|axis| analysis.is_available(*axis)));
        assert_eq!(analysis.computed_zone, Some(SeverityZone::C));
        assert_eq!(analysis.running_frequency, 24.8);
    }

    #[tokio::test]
    async fn requested_bearing_outside_list_is_analyzed_bare() {
        let collaborator = fixture();
        let aggregator = ReportAggregator::new(&collaborator, AggregateOptions::for_report(date()));
        let report = aggregator.machine_report("m-0001", Some("b-0404")).await.unwrap();
        assert_eq!(report.bearings.len(), 1);
        assert_eq!(report.bearings[0].analysis.bearing_id, "b-0404");
        assert!(!report.bearings[0].analysis.has_any_spectrum());
        assert_eq!(report.bearings[0].analysis.computed_zone, None);
    }

    #[tokio::test]
    async fn blank_identifiers_are_fatal() {
        let collaborator = fixture();
        let aggregator = ReportAggregator::new(&collaborator, AggregateOptions::for_report(date()));
        assert!(matches!(
            aggregator.machine_report("  ", None).await,
            Err(ReportError::MissingIdentifier("machine id"))
        ));
        assert!(matches!(
            aggregator.machine_report("m-0001", Some("")).await,
            Err(ReportError::MissingIdentifier("bearing id"))
        ));
    }

    #[tokio::test]
    async fn blank_embedded_bearing_id_leaves_valid_bearings() {
        let collaborator = FixtureCollaborator::default()
            .with_machine(json!({"_id": "m-3", "bearingIds": ["", "b1"]}))
            .with_analysis("m-3", "b1", Some(Axis::V), vertical_response());
        let aggregator = ReportAggregator::new(&collaborator, AggregateOptions::for_report(date()));
        let report = aggregator.machine_report("m-3", None).await.unwrap();

        assert_eq!(report.bearings.len(), 1);
        assert_eq!(report.bearings[0].analysis.bearing_id, "b1");
        assert!(report.bearings[0].analysis.is_available(Axis::V));
    }

    #[tokio::test]
    async fn vertical_only_bearing_charts_selects_and_exports() {
        use crate::chart::{render_chart, AxisSelector, ChartInput, ChartLayout};
        use crate::export::spectrum_csv;

        let collaborator = fixture();
        let aggregator = ReportAggregator::new(&collaborator, AggregateOptions::for_display(date()));
        let report = aggregator.machine_report("m-0001", None).await.unwrap();
        let analysis = &report.bearings[0].analysis;

        let selector = AxisSelector::for_analysis(analysis);
        assert_eq!(selector.selected(), Some(Axis::V));
        assert!(!selector.is_enabled(Axis::H));
        assert!(!selector.is_enabled(Axis::A));

        let channel = analysis.channel(Axis::V).unwrap();
        let layout = ChartLayout::interactive(&channel.spectrum, analysis.running_frequency);
        let input = ChartInput {
            axis: Axis::V,
            channel,
            running_frequency: analysis.running_frequency,
        };
        let commands = render_chart(&input, &layout, None);
        assert!(commands
            .iter()
            .any(|c| c.text_content() == Some("1× Peak: 25.0 Hz, 0.420 mm/s")));

        let csv = spectrum_csv(analysis, Axis::V, date()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert!(lines.contains(&"Bearing ID,b-0001"));
        let header = lines
            .iter()
            .position(|l| *l == "Frequency (Hz),Amplitude (mm/s)")
            .unwrap();
        assert_eq!(lines.len() - header - 1, 20);
    }

    #[tokio::test]
    async fn machine_list_reads_envelope() {
        let collaborator = fixture().with_machine(json!({"machineId": "m-0002"}));
        let aggregator = ReportAggregator::new(&collaborator, AggregateOptions::for_report(date()));
        let machines = aggregator.list_machines().await.unwrap();
        let ids: Vec<_> = machines.iter().map(|m| m.machine_id.as_str()).collect();
        assert_eq!(ids, vec!["m-0001", "m-0002"]);
    }

    #[test]
    fn raw_samples_with_sample_rate_alias() {
        let samples: Vec<f64> = (0..1000).map(|i| (i % 7) as f64 * 0.01).collect();
        let response = json!({"rawData": samples, "SR": 20000, "rpm": "1470"});
        let options = AggregateOptions::for_display(date());
        match AxisSlot::from_response(Axis::H, &response, &options) {
            AxisSlot::Resolved { channel, context, .. } => {
                assert_eq!(channel.spectrum.len(), 500);
                assert!((context.running_frequency.unwrap() - 24.5).abs() < 1e-9);
            }
            other => panic!("unexpected slot {:?}", other),
        }
    }
}
