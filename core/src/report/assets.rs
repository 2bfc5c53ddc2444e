use crate::chart::draw::Rgba;
use std::sync::OnceLock;

/// Branding and boilerplate shared by every document of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportAssets {
    pub brand_name: String,
    pub brand_initials: String,
    pub brand_color: Rgba,
    pub footer_note: String,
    pub methodology: Vec<String>,
}

static SHARED: OnceLock<ReportAssets> = OnceLock::new();

impl ReportAssets {
    /// Created on first use and kept for the process lifetime.
    pub fn shared() -> &'static ReportAssets {
        SHARED.get_or_init(ReportAssets::standard)
    }

    pub fn standard() -> Self {
        Self {
            brand_name: "Vibration Condition Monitoring".to_string(),
            brand_initials: "VC".to_string(),
            brand_color: Rgba::rgb(0x1d, 0x4e, 0xd8),
            footer_note: "Generated by bearing-reporter".to_string(),
            methodology: vec![
                "Velocity spectra are computed by the analysis service from the recorded waveform.".to_string(),
                "Zones follow ISO 10816-3 velocity RMS limits for the configured machine class.".to_string(),
                "Status comes from the monitoring platform; the zone is shown as a cross-check.".to_string(),
            ],
        }
    }
}
