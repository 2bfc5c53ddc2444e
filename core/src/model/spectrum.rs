use crate::upstream::{first_bool, first_number, first_present, first_string};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Measurement direction of a bearing sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    H,
    V,
    A,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::H, Axis::V, Axis::A];

    pub fn code(self) -> &'static str {
        match self {
            Axis::H => "H",
            Axis::V => "V",
            Axis::A => "A",
        }
    }

    /// Name used by the analysis service (`H-Axis`, ...).
    pub fn wire_name(self) -> &'static str {
        match self {
            Axis::H => "H-Axis",
            Axis::V => "V-Axis",
            Axis::A => "A-Axis",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::H => "Horizontal",
            Axis::V => "Vertical",
            Axis::A => "Axial",
        }
    }

    pub fn parse(text: &str) -> Option<Axis> {
        let lowered = text.trim().to_ascii_lowercase();
        let stem = lowered
            .strip_suffix("-axis")
            .or_else(|| lowered.strip_suffix(" axis"))
            .unwrap_or(&lowered);
        match stem {
            "h" | "horizontal" => Some(Axis::H),
            "v" | "vertical" => Some(Axis::V),
            "a" | "axial" => Some(Axis::A),
            _ => None,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// One canonical spectrum sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumPoint {
    pub frequency: f64,
    pub amplitude: f64,
}

impl SpectrumPoint {
    pub fn new(frequency: f64, amplitude: f64) -> Self {
        Self {
            frequency,
            amplitude,
        }
    }

    /// Reads a `{frequency, amplitude}`-like object such as `peakAt1x`.
    pub fn from_upstream(value: &Value) -> Option<Self> {
        let frequency = first_number(value, &["frequency", "detectedFrequency", "freq", "f"])?;
        let amplitude = first_number(value, &["amplitude", "amp", "value"]).unwrap_or(0.0);
        Some(Self::new(frequency.max(0.0), amplitude.abs()))
    }
}

/// Harmonic of the running frequency as detected by the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarmonicMark {
    pub order: u32,
    pub expected_frequency: f64,
    pub detected_frequency: f64,
    pub amplitude: f64,
    pub is_significant: bool,
}

impl HarmonicMark {
    pub fn from_upstream(value: &Value) -> Option<Self> {
        let order = first_number(value, &["harmonic", "order", "n"])
            .or_else(|| {
                first_string(value, &["label"])
                    .and_then(|label| label.trim_end_matches(['×', 'x', 'X']).parse().ok())
            })
            .filter(|order| *order >= 1.0)? as u32;
        let detected_frequency =
            first_number(value, &["detectedFrequency", "frequency", "freq"]).unwrap_or(0.0);
        let expected_frequency = first_number(value, &["targetFrequency", "expectedFrequency"])
            .unwrap_or(detected_frequency);
        Some(Self {
            order,
            expected_frequency,
            detected_frequency,
            amplitude: first_number(value, &["amplitude", "amp"]).unwrap_or(0.0).abs(),
            is_significant: first_bool(value, &["isSignificant", "significant"]).unwrap_or(false),
        })
    }

    pub fn label(&self) -> String {
        format!("{}×", self.order)
    }
}

/// Per-axis view of one bearing measurement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisChannel {
    pub available: bool,
    pub spectrum: Vec<SpectrumPoint>,
    pub harmonics: Vec<HarmonicMark>,
    pub peak_at_1x: Option<SpectrumPoint>,
    pub error: Option<String>,
}

impl AxisChannel {
    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// True when there is something to plot.
    pub fn has_spectrum(&self) -> bool {
        self.available && !self.spectrum.is_empty()
    }

    pub fn harmonics_from_upstream(value: Option<&Value>) -> Vec<HarmonicMark> {
        value
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(HarmonicMark::from_upstream).collect())
            .unwrap_or_default()
    }

    pub fn peak_from_upstream(value: &Value) -> Option<SpectrumPoint> {
        first_present(value, &["peakAt1x", "peak1x", "peak"]).and_then(SpectrumPoint::from_upstream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn axis_parse_accepts_wire_and_long_names() {
        assert_eq!(Axis::parse("H-Axis"), Some(Axis::H));
        assert_eq!(Axis::parse("vertical"), Some(Axis::V));
        assert_eq!(Axis::parse(" a "), Some(Axis::A));
        assert_eq!(Axis::parse("radial"), None);
    }

    #[test]
    fn harmonic_reads_backend_shape() {
        let mark = HarmonicMark::from_upstream(&json!({
            "harmonic": 2,
            "label": "2×",
            "targetFrequency": 49.3,
            "detectedFrequency": 49.5,
            "amplitude": 0.12,
            "isSignificant": true
        }))
        .unwrap();
        assert_eq!(mark.order, 2);
        assert_eq!(mark.label(), "2×");
        assert!(mark.is_significant);
        assert!((mark.expected_frequency - 49.3).abs() < 1e-9);
    }

    #[test]
    fn harmonic_order_falls_back_to_label() {
        let mark = HarmonicMark::from_upstream(&json!({"label": "3×", "frequency": 75.0}))
            .unwrap();
        assert_eq!(mark.order, 3);
        assert_eq!(mark.expected_frequency, 75.0);
    }

    #[test]
    fn peak_requires_a_frequency() {
        assert!(AxisChannel::peak_from_upstream(&json!({"peakAt1x": {}})).is_none());
        let peak = AxisChannel::peak_from_upstream(&json!({
            "peakAt1x": {"frequency": 25.0, "amplitude": "0.42"}
        }))
        .unwrap();
        assert_eq!(peak, SpectrumPoint::new(25.0, 0.42));
    }
}
