use crate::model::Axis;
use chrono::NaiveDate;

pub const SUFFIX_LEN: usize = 8;

/// Last eight characters of an identifier, enough to tell records apart.
pub fn id_suffix(id: &str) -> String {
    let trimmed = id.trim();
    let count = trimmed.chars().count();
    let suffix: String = trimmed.chars().skip(count.saturating_sub(SUFFIX_LEN)).collect();
    suffix
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn stamp(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn machine_report_name(machine_id: &str, date: NaiveDate) -> String {
    format!("VibrationReport_{}_{}.zip", id_suffix(machine_id), stamp(date))
}

pub fn combined_report_name(machine_count: usize, date: NaiveDate) -> String {
    format!("CombinedReport_{}machines_{}.zip", machine_count, stamp(date))
}

pub fn spectrum_csv_name(machine_id: &str, bearing_id: &str, axis: Axis, date: NaiveDate) -> String {
    format!(
        "Spectrum_{}_{}_{}_{}.csv",
        id_suffix(machine_id),
        id_suffix(bearing_id),
        axis.code(),
        stamp(date)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn suffix_keeps_last_eight_characters() {
        assert_eq!(id_suffix("65f1c0a2b3d4e5f6a7b8c9d0"), "a7b8c9d0");
        assert_eq!(id_suffix("m-1"), "m-1");
        assert_eq!(id_suffix("plant/line:7"), "t_line_7");
    }

    #[test]
    fn file_names_follow_conventions() {
        assert_eq!(
            machine_report_name("65f1c0a2b3d4e5f6a7b8c9d0", date()),
            "VibrationReport_a7b8c9d0_2024-03-01.zip"
        );
        assert_eq!(combined_report_name(3, date()), "CombinedReport_3machines_2024-03-01.zip");
        assert_eq!(
            spectrum_csv_name("m-0001", "bearing-0042", Axis::V, date()),
            "Spectrum_m-0001_ing-0042_V_2024-03-01.csv"
        );
    }
}
