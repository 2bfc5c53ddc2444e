//! Core spectrum, chart, and report engine for bearing vibration analysis.
//!
//! Upstream analysis payloads are normalized once at ingestion; everything
//! downstream (the interactive chart, the CSV exporter, and the paginated
//! report composer) works on the canonical model types.

pub mod chart;
pub mod collaborator;
pub mod export;
pub mod math;
pub mod model;
pub mod prelude;
pub mod render;
pub mod report;
pub mod severity;
pub mod spectrum;
pub mod telemetry;
pub mod upstream;

pub use prelude::{CollaboratorError, PaintTarget, RenderError, ReportError};
