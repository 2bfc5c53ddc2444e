use crate::model::{Axis, BearingAnalysis};
use crate::prelude::{RenderError, RenderResult};
use chrono::NaiveDate;
use std::io::Write;

pub const DATA_HEADER: [&str; 2] = ["Frequency (Hz)", "Amplitude (mm/s)"];

/// Spectrum of one axis as CSV: a two-column metadata block, then the
/// frequency/amplitude rows.
pub fn spectrum_csv(analysis: &BearingAnalysis, axis: Axis, date: NaiveDate) -> RenderResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_spectrum_rows(analysis, axis, date, &mut writer)?;
    let bytes = writer
        .into_inner()
        .map_err(|err| RenderError::Encoding(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| RenderError::Encoding(err.to_string()))
}

pub fn write_spectrum_rows<W: Write>(
    analysis: &BearingAnalysis,
    axis: Axis,
    date: NaiveDate,
    writer: &mut csv::Writer<W>,
) -> RenderResult<()> {
    let points = analysis
        .channel(axis)
        .filter(|channel| channel.available)
        .map(|channel| channel.spectrum.as_slice())
        .unwrap_or(&[]);

    let metadata = [
        ("Machine ID", analysis.machine_id.clone()),
        ("Bearing ID", analysis.bearing_id.clone()),
        ("Axis", axis.wire_name().to_string()),
        ("Date", date.format("%Y-%m-%d").to_string()),
        ("RPM", analysis.rpm.map(|rpm| format!("{:.0}", rpm)).unwrap_or_else(|| "-".into())),
        ("Running Frequency (Hz)", format!("{:.2}", analysis.running_frequency)),
        ("Sample Rate (Hz)", format!("{:.0}", analysis.sample_rate)),
        ("External Status", analysis.external_status.label().to_string()),
        (
            "Computed Zone",
            analysis
                .computed_zone
                .map(|zone| zone.letter().to_string())
                .unwrap_or_else(|| "Unknown".into()),
        ),
        ("Points", points.len().to_string()),
    ];
    for (key, value) in metadata {
        writer.write_record([key, value.as_str()])?;
    }

    writer.write_record(DATA_HEADER)?;
    for point in points {
        writer.write_record([format!("{:.4}", point.frequency), format!("{:.6}", point.amplitude)])?;
    }
    writer.flush()?;
    Ok(())
}
