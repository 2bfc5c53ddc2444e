pub mod csv;
pub mod naming;

pub use self::csv::spectrum_csv;
pub use naming::{combined_report_name, id_suffix, machine_report_name, spectrum_csv_name};
