use crate::model::SpectrumPoint;
use crate::upstream::{as_number, first_number, first_present};
use serde_json::Value;

pub const FREQUENCY_ALIASES: &[&str] = &["frequency", "freq", "f", "hz", "x"];
pub const AMPLITUDE_ALIASES: &[&str] = &["amplitude", "amp", "magnitude", "velocity", "value", "y"];

/// Spacing of the placeholder frequency given to objects without one.
pub const PLACEHOLDER_FREQUENCY_STEP: f64 = 10.0;

/// Output bound for sample-array payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleCap {
    /// Interactive analysis view.
    Display,
    /// Batch reports, where volume turns into pages.
    Report,
}

impl SampleCap {
    pub fn limit(self) -> usize {
        match self {
            SampleCap::Display => 500,
            SampleCap::Report => 1000,
        }
    }
}

/// Upstream spectrum shapes, resolved once at ingestion.
#[derive(Debug, Clone, PartialEq)]
pub enum SpectrumPayload<'a> {
    /// Objects carrying frequency/amplitude under any known alias.
    Points(&'a [Value]),
    /// `[[frequency, amplitude], ...]`.
    Pairs(&'a [Value]),
    /// Raw magnitudes; frequencies come from the sample rate.
    Samples(Vec<f64>),
    Empty,
}

impl<'a> SpectrumPayload<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => match items.first() {
                None => SpectrumPayload::Empty,
                Some(first) if first_present(first, FREQUENCY_ALIASES).is_some() => {
                    SpectrumPayload::Points(items)
                }
                Some(Value::Array(pair)) if pair.len() >= 2 && as_number(&pair[0]).is_some() => {
                    SpectrumPayload::Pairs(items)
                }
                Some(_) => SpectrumPayload::Samples(items.iter().filter_map(as_number).collect()),
            },
            Value::String(text) => SpectrumPayload::Samples(
                text.split(',').filter_map(|part| part.trim().parse::<f64>().ok()).collect(),
            ),
            _ => SpectrumPayload::Empty,
        }
    }

    pub fn into_points(self, sample_rate: f64, cap: SampleCap) -> Vec<SpectrumPoint> {
        match self {
            SpectrumPayload::Points(items) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    let frequency = first_number(item, FREQUENCY_ALIASES)
                        .unwrap_or(idx as f64 * PLACEHOLDER_FREQUENCY_STEP);
                    let amplitude = first_number(item, AMPLITUDE_ALIASES).unwrap_or(0.0);
                    SpectrumPoint::new(frequency.max(0.0), amplitude.abs())
                })
                .collect(),
            SpectrumPayload::Pairs(items) => items
                .iter()
                .filter_map(|item| {
                    let pair = item.as_array()?;
                    let frequency = as_number(pair.first()?)?;
                    let amplitude = pair.get(1).and_then(as_number).unwrap_or(0.0);
                    Some(SpectrumPoint::new(frequency.max(0.0), amplitude.abs()))
                })
                .collect(),
            SpectrumPayload::Samples(values) => samples_to_points(&values, sample_rate, cap),
            SpectrumPayload::Empty => Vec::new(),
        }
    }
}

fn samples_to_points(values: &[f64], sample_rate: f64, cap: SampleCap) -> Vec<SpectrumPoint> {
    if values.is_empty() || !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Vec::new();
    }
    let resolution = sample_rate / values.len() as f64;
    let count = (values.len() / 2).min(cap.limit());
    values
        .iter()
        .take(count)
        .enumerate()
        .map(|(idx, value)| SpectrumPoint::new(idx as f64 * resolution, value.abs()))
        .collect()
}

/// Canonical spectrum from any upstream shape. Never fails; unusable input
/// yields an empty sequence.
pub fn normalize_spectrum(value: &Value, sample_rate: f64, cap: SampleCap) -> Vec<SpectrumPoint> {
    SpectrumPayload::classify(value).into_points(sample_rate, cap)
}

pub fn normalize_optional(value: Option<&Value>, sample_rate: f64, cap: SampleCap) -> Vec<SpectrumPoint> {
    value
        .map(|v| normalize_spectrum(v, sample_rate, cap))
        .unwrap_or_default()
}
