pub mod bearing;
pub mod spectrum;

pub use bearing::{
    AxisMetrics, BearingAnalysis, BearingRecord, BearingReport, Confidence, Diagnosis,
    ExternalStatus, MachineReport, MachineSummary, SeverityZone,
};
pub use spectrum::{Axis, AxisChannel, HarmonicMark, SpectrumPoint};
