use crate::generator::template::harmonic_envelope;
use bearingcore::collaborator::FixtureCollaborator;
use bearingcore::math::stats::StatsHelper;
use bearingcore::model::Axis;
use bearingcore::severity::MachineClass;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::f64::consts::SQRT_2;

const MACHINE_NAMES: &[&str] = &[
    "Cooling Tower Fan",
    "Boiler Feed Pump",
    "Air Compressor",
    "Conveyor Drive",
    "Chiller",
];
const MACHINE_TYPES: &[&str] = &["Fan", "Pump", "Compressor", "Gearbox", "Motor"];
const BEARING_NAMES: &[&str] = &[
    "Motor DE",
    "Motor NDE",
    "Pump DE",
    "Pump NDE",
    "Gearbox Input",
    "Fan Bearing",
];
const STATUSES: &[&str] = &["Normal", "Normal", "Satisfactory", "Alert", "Unacceptable"];
const HARMONIC_COUNT: usize = 10;
/// Harmonics at or above this share of the 1x amplitude are significant.
const SIGNIFICANCE_RATIO: f64 = 0.1;

/// Configuration for generating a synthetic monitored fleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub machines: usize,
    pub bearings_per_machine: usize,
    /// Spectrum lines per axis.
    pub points: usize,
    pub noise: f64,
    /// Chance that an axis has no measurement.
    pub unavailable_ratio: f64,
    /// Chance that an axis request fails outright.
    pub failure_ratio: f64,
    pub seed: u64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            machines: 3,
            bearings_per_machine: 4,
            points: 400,
            noise: 0.02,
            unavailable_ratio: 0.1,
            failure_ratio: 0.03,
            seed: 0,
        }
    }
}

/// Payload layouts the analysis service has used; rotated per bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResponseShape {
    PointObjects,
    Pairs,
    Comprehensive,
}

impl ResponseShape {
    fn for_index(index: usize) -> Self {
        match index % 3 {
            0 => ResponseShape::PointObjects,
            1 => ResponseShape::Pairs,
            _ => ResponseShape::Comprehensive,
        }
    }
}

#[derive(Debug, Clone)]
struct AxisSignal {
    axis: Axis,
    spectrum: Vec<(f64, f64)>,
    harmonics: Vec<Value>,
    peak: (f64, f64),
    velocity_rms: f64,
    acceleration_rms: f64,
    diagnosis: Value,
}

fn object_id(rng: &mut StdRng, prefix: u32) -> String {
    format!("{:08x}{:016x}", prefix, rng.gen::<u64>())
}

fn diagnose(amplitudes: &[f64]) -> Value {
    let fundamental = amplitudes.first().copied().unwrap_or(0.0);
    let significant = amplitudes
        .iter()
        .filter(|amp| **amp >= fundamental * SIGNIFICANCE_RATIO)
        .count();
    let second = amplitudes.get(1).copied().unwrap_or(0.0);
    let (fault, confidence, recommendation) = if significant >= 5 {
        ("Mechanical Looseness", "Medium", "Check mounting bolts and bearing fit")
    } else if second >= fundamental * 0.5 {
        ("Misalignment", "Medium", "Verify shaft alignment")
    } else if fundamental > 1.5 {
        ("Unbalance", "High", "Schedule rotor balancing")
    } else {
        ("Normal", "Low", "Continue routine monitoring")
    };
    json!({
        "faultType": fault,
        "confidence": confidence,
        "evidence": [
            format!("{} significant harmonics", significant),
            format!("2x/1x ratio {:.2}", if fundamental > 0.0 { second / fundamental } else { 0.0 }),
        ],
        "recommendation": recommendation,
    })
}

fn build_axis(config: &FleetConfig, rng: &mut StdRng, axis: Axis, running_frequency: f64) -> AxisSignal {
    let fundamental: f64 = rng.gen_range(0.3..3.0);
    let decay: f64 = rng.gen_range(0.15..0.7);
    let mut amplitudes = Vec::with_capacity(HARMONIC_COUNT);
    for order in 0..HARMONIC_COUNT {
        let amp = fundamental * decay.powi(order as i32) * rng.gen_range(0.5..1.0);
        amplitudes.push(if order == 0 { fundamental } else { amp });
    }

    let points = config.points.max(16);
    let span = running_frequency * (HARMONIC_COUNT as f64 + 2.0);
    let step = span / points as f64;
    let width = (running_frequency * 0.02).max(step);
    let spectrum: Vec<(f64, f64)> = (0..points)
        .map(|index| {
            let frequency = index as f64 * step;
            let noise = rng.gen_range(0.0..config.noise.max(f64::EPSILON));
            (frequency, harmonic_envelope(frequency, running_frequency, &amplitudes, width) + noise)
        })
        .collect();

    let harmonics = amplitudes
        .iter()
        .enumerate()
        .map(|(index, amplitude)| {
            let order = index + 1;
            let target = running_frequency * order as f64;
            let detected = (target / step).round() * step;
            json!({
                "harmonic": order,
                "label": format!("{}×", order),
                "targetFrequency": target,
                "detectedFrequency": detected,
                "amplitude": amplitude,
                "isSignificant": *amplitude >= fundamental * SIGNIFICANCE_RATIO,
            })
        })
        .collect();

    let velocity_rms = StatsHelper::root_sum_square(&amplitudes) / SQRT_2;
    AxisSignal {
        axis,
        peak: ((running_frequency / step).round() * step, fundamental),
        spectrum,
        harmonics,
        velocity_rms,
        acceleration_rms: velocity_rms * running_frequency * 2.0 * std::f64::consts::PI / 1000.0,
        diagnosis: diagnose(&amplitudes),
    }
}

fn axis_body(signal: &AxisSignal, shape: ResponseShape, class: MachineClass) -> Value {
    let zone = class.band_for_velocity(signal.velocity_rms);
    let spectrum: Value = match shape {
        ResponseShape::PointObjects => signal
            .spectrum
            .iter()
            .map(|(f, a)| json!({"frequency": f, "amplitude": a}))
            .collect(),
        ResponseShape::Pairs => signal.spectrum.iter().map(|(f, a)| json!([f, a])).collect(),
        ResponseShape::Comprehensive => signal
            .spectrum
            .iter()
            .map(|(f, a)| json!({"freq": f, "magnitude": a}))
            .collect(),
    };
    let spectrum_key = if shape == ResponseShape::Pairs { "spectrum" } else { "fftSpectrum" };
    let mut body = json!({
        "available": true,
        "harmonics": signal.harmonics,
        "peakAt1x": {"frequency": signal.peak.0, "amplitude": signal.peak.1},
        "velocityRMS": signal.velocity_rms,
        "accelerationRMS": signal.acceleration_rms,
        "peakAmplitude": signal.peak.1,
        "severity": {"zone": zone.letter(), "velocityRMS": signal.velocity_rms},
        "diagnosis": signal.diagnosis,
    });
    body[spectrum_key] = spectrum;
    body
}

/// Builds a seeded fleet as canned collaborator responses.
pub fn build_fleet(config: &FleetConfig) -> FixtureCollaborator {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let class = MachineClass::default();
    let mut fleet = FixtureCollaborator::default();
    let mut bearing_index = 0usize;

    for machine_index in 0..config.machines {
        let machine_id = object_id(&mut rng, machine_index as u32 + 1);
        let mut bearing_entries = Vec::with_capacity(config.bearings_per_machine);
        let mut bearing_ids = Vec::with_capacity(config.bearings_per_machine);

        for local in 0..config.bearings_per_machine {
            let bearing_id = object_id(&mut rng, 0x100 + bearing_index as u32);
            let shape = ResponseShape::for_index(bearing_index);
            bearing_index += 1;

            let rpm: f64 = rng.gen_range(900.0..3600.0);
            let running_frequency = rpm / 60.0;
            let status = STATUSES[rng.gen_range(0..STATUSES.len())];
            let sample_rate = (running_frequency * 24.0).round();

            let mut cached = serde_json::Map::new();
            let mut comprehensive = serde_json::Map::new();
            for axis in Axis::ALL {
                if rng.gen_bool(config.failure_ratio.clamp(0.0, 1.0)) {
                    fleet = fleet.failing(FixtureCollaborator::analysis_key(&machine_id, &bearing_id, Some(axis)));
                    continue;
                }
                if rng.gen_bool(config.unavailable_ratio.clamp(0.0, 1.0)) {
                    let missing = json!({"available": false, "error": "No data available for this axis"});
                    match shape {
                        ResponseShape::Comprehensive => {
                            comprehensive.insert(axis.wire_name().to_string(), missing);
                        }
                        _ => {
                            fleet = fleet.with_analysis(
                                &machine_id,
                                &bearing_id,
                                Some(axis),
                                json!({"success": false, "message": "No data available for this axis"}),
                            );
                        }
                    }
                    continue;
                }

                let signal = build_axis(config, &mut rng, axis, running_frequency);
                cached.insert(
                    signal.axis.code().to_string(),
                    json!({
                        "velocityRms": signal.velocity_rms * 0.95,
                        "accelerationRms": signal.acceleration_rms * 0.95,
                    }),
                );
                let body = axis_body(&signal, shape, class);
                match shape {
                    ResponseShape::Comprehensive => {
                        comprehensive.insert(axis.wire_name().to_string(), body);
                    }
                    ResponseShape::PointObjects => {
                        let mut envelope = body;
                        envelope["rpm"] = json!(rpm);
                        envelope["externalStatus"] = json!(status);
                        fleet = fleet.with_analysis(
                            &machine_id,
                            &bearing_id,
                            Some(axis),
                            json!({"success": true, "data": envelope}),
                        );
                    }
                    ResponseShape::Pairs => {
                        let mut envelope = body;
                        envelope["runningFrequency"] = json!(running_frequency);
                        envelope["sampleRate"] = json!(sample_rate);
                        fleet = fleet.with_analysis(&machine_id, &bearing_id, Some(axis), envelope);
                    }
                }
            }

            if shape == ResponseShape::Comprehensive {
                fleet = fleet.with_analysis(
                    &machine_id,
                    &bearing_id,
                    None,
                    json!({
                        "success": true,
                        "data": {
                            "rpm": rpm,
                            "runningFrequency": running_frequency,
                            "SR": sample_rate,
                            "statusName": status,
                            "axisData": Value::Object(comprehensive),
                        }
                    }),
                );
            }

            bearing_entries.push(json!({
                "_id": bearing_id,
                "name": BEARING_NAMES[local % BEARING_NAMES.len()],
                "statusName": status,
                "metrics": Value::Object(cached),
            }));
            bearing_ids.push(bearing_id);
        }

        let name = format!(
            "{} {}",
            MACHINE_NAMES[machine_index % MACHINE_NAMES.len()],
            machine_index / MACHINE_NAMES.len() + 1
        );
        fleet = fleet
            .with_machine(json!({
                "_id": machine_id,
                "name": name,
                "machineType": MACHINE_TYPES[rng.gen_range(0..MACHINE_TYPES.len())],
                "customerId": "Demo Plant",
                "areaId": format!("Area {}", machine_index % 3 + 1),
                "bearingIds": bearing_ids,
            }))
            .with_bearings(&machine_id, json!({"success": true, "data": bearing_entries}));
    }

    fleet
}

#[cfg(test)]
mod tests {
    use super::*;
    use bearingcore::collaborator::AnalysisCollaborator;
    use bearingcore::report::{AggregateOptions, ReportAggregator};
    use chrono::NaiveDate;

    fn steady_config() -> FleetConfig {
        FleetConfig {
            machines: 2,
            bearings_per_machine: 3,
            points: 120,
            unavailable_ratio: 0.0,
            failure_ratio: 0.0,
            seed: 11,
            ..FleetConfig::default()
        }
    }

    #[test]
    fn fleet_is_reproducible_for_a_seed() {
        let first = build_fleet(&steady_config());
        let second = build_fleet(&steady_config());
        assert_eq!(first.machine_ids(), second.machine_ids());
        assert_eq!(first.machine_ids().len(), 2);
        assert_eq!(first.machine_ids()[0].len(), 24);
    }

    #[test]
    fn diagnosis_follows_harmonic_content() {
        let looseness = diagnose(&[1.0, 0.4, 0.3, 0.2, 0.15, 0.12]);
        assert_eq!(looseness["faultType"], "Mechanical Looseness");
        let misalignment = diagnose(&[1.0, 0.8, 0.05]);
        assert_eq!(misalignment["faultType"], "Misalignment");
        let unbalance = diagnose(&[2.5, 0.2, 0.01]);
        assert_eq!(unbalance["confidence"], "High");
    }

    #[tokio::test]
    async fn every_response_shape_aggregates_into_spectra() {
        let fleet = build_fleet(&steady_config());
        let machines = fleet.machines(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()).await.unwrap();
        assert_eq!(machines["data"].as_array().unwrap().len(), 2);

        let aggregator = ReportAggregator::new(
            &fleet,
            AggregateOptions::for_report(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
        );
        let machine_id = fleet.machine_ids()[0].clone();
        let report = aggregator.machine_report(&machine_id, None).await.unwrap();
        assert_eq!(report.bearings.len(), 3);
        for bearing in &report.bearings {
            for axis in Axis::ALL {
                let channel = bearing.analysis.channel(axis).unwrap();
                assert!(channel.has_spectrum(), "{} {}", bearing.name, axis);
                assert_eq!(channel.spectrum.len(), 120);
                assert_eq!(channel.harmonics.len(), 10);
            }
            assert!(bearing.analysis.running_frequency > 0.0);
            assert!(bearing.analysis.computed_zone.is_some());
        }
        assert_eq!(aggregator.metrics().failures, 0);
    }
}
