//! Maps external statuses and computed zones to their display treatment.
//!
//! The two inputs are kept apart on purpose: the external status drives
//! action, the computed zone is shown next to it as a cross-check.

use crate::chart::draw::Rgba;
use crate::model::{ExternalStatus, SeverityZone};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IconKind {
    CheckCircle,
    Info,
    Warning,
    Critical,
    Help,
}

impl IconKind {
    /// Short glyph for text-only surfaces (tables, tooltips).
    pub fn glyph(self) -> &'static str {
        match self {
            IconKind::CheckCircle => "✔",
            IconKind::Info => "ℹ",
            IconKind::Warning => "⚠",
            IconKind::Critical => "✖",
            IconKind::Help => "?",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityStyle {
    pub zone: Option<SeverityZone>,
    pub icon: IconKind,
    pub color: Rgba,
    pub label: &'static str,
}

pub const ZONE_A_COLOR: Rgba = Rgba::rgb(0x10, 0xb9, 0x81);
pub const ZONE_B_COLOR: Rgba = Rgba::rgb(0x06, 0xb6, 0xd4);
pub const ZONE_C_COLOR: Rgba = Rgba::rgb(0xf5, 0x9e, 0x0b);
pub const ZONE_D_COLOR: Rgba = Rgba::rgb(0xef, 0x44, 0x44);
pub const UNKNOWN_COLOR: Rgba = Rgba::rgb(0x9c, 0xa3, 0xaf);

pub const UNKNOWN: SeverityStyle = SeverityStyle {
    zone: None,
    icon: IconKind::Help,
    color: UNKNOWN_COLOR,
    label: "Unknown",
};

pub fn classify_zone(zone: SeverityZone) -> SeverityStyle {
    match zone {
        SeverityZone::A => SeverityStyle {
            zone: Some(zone),
            icon: IconKind::CheckCircle,
            color: ZONE_A_COLOR,
            label: "Normal",
        },
        SeverityZone::B => SeverityStyle {
            zone: Some(zone),
            icon: IconKind::Info,
            color: ZONE_B_COLOR,
            label: "Satisfactory",
        },
        SeverityZone::C => SeverityStyle {
            zone: Some(zone),
            icon: IconKind::Warning,
            color: ZONE_C_COLOR,
            label: "Alert",
        },
        SeverityZone::D => SeverityStyle {
            zone: Some(zone),
            icon: IconKind::Critical,
            color: ZONE_D_COLOR,
            label: "Unacceptable",
        },
    }
}

pub fn classify_optional_zone(zone: Option<SeverityZone>) -> SeverityStyle {
    zone.map(classify_zone).unwrap_or(UNKNOWN)
}

pub fn classify_status(status: ExternalStatus) -> SeverityStyle {
    match status {
        ExternalStatus::Normal => classify_zone(SeverityZone::A),
        ExternalStatus::Satisfactory => classify_zone(SeverityZone::B),
        ExternalStatus::Alert => classify_zone(SeverityZone::C),
        ExternalStatus::Unacceptable => classify_zone(SeverityZone::D),
        ExternalStatus::Unknown => UNKNOWN,
    }
}

/// Accepts either a zone letter or a status name; anything else is Unknown.
pub fn classify(input: &str) -> SeverityStyle {
    let trimmed = input.trim();
    if trimmed.len() == 1 {
        if let Some(zone) = SeverityZone::parse(trimmed) {
            return classify_zone(zone);
        }
    }
    classify_status(ExternalStatus::parse(trimmed))
}

/// ISO 10816-3 machine groups used for the legend and velocity cell colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MachineClass {
    I,
    #[default]
    II,
    III,
    IV,
}

impl MachineClass {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_uppercase().as_str() {
            "I" | "1" => Some(MachineClass::I),
            "II" | "2" => Some(MachineClass::II),
            "III" | "3" => Some(MachineClass::III),
            "IV" | "4" => Some(MachineClass::IV),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MachineClass::I => "I",
            MachineClass::II => "II",
            MachineClass::III => "III",
            MachineClass::IV => "IV",
        }
    }

    /// Upper velocity RMS bound (mm/s) of zones A, B and C.
    pub fn zone_limits(self) -> [f64; 3] {
        match self {
            MachineClass::I => [0.71, 1.8, 4.5],
            MachineClass::II => [1.12, 2.8, 7.1],
            MachineClass::III => [1.8, 4.5, 11.2],
            MachineClass::IV => [2.8, 7.1, 18.0],
        }
    }

    /// Display band for a velocity cell. Not a substitute for the service's zone.
    pub fn band_for_velocity(self, velocity_rms: f64) -> SeverityZone {
        let [a, b, c] = self.zone_limits();
        if velocity_rms <= a {
            SeverityZone::A
        } else if velocity_rms <= b {
            SeverityZone::B
        } else if velocity_rms <= c {
            SeverityZone::C
        } else {
            SeverityZone::D
        }
    }

    pub fn threshold_text(self, zone: SeverityZone) -> String {
        let [a, b, c] = self.zone_limits();
        match zone {
            SeverityZone::A => format!("< {:.2} mm/s", a),
            SeverityZone::B => format!("{:.2} - {:.1} mm/s", a, b),
            SeverityZone::C => format!("{:.1} - {:.1} mm/s", b, c),
            SeverityZone::D => format!("> {:.1} mm/s", c),
        }
    }
}

pub fn zone_description(zone: SeverityZone) -> &'static str {
    match zone {
        SeverityZone::A => "Normal - Newly commissioned",
        SeverityZone::B => "Satisfactory - Unrestricted long-term operation",
        SeverityZone::C => "Alert - Restricted operation",
        SeverityZone::D => "Unacceptable - Immediate action required",
    }
}
