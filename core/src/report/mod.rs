pub mod aggregator;
pub mod assets;
pub mod composer;
pub mod document;
pub mod table;

pub use aggregator::{AggregateOptions, AxisSlot, BearingContext, ReportAggregator};
pub use assets::ReportAssets;
pub use composer::{compose_combined, compose_machine, ComposeOptions};
pub use document::{Document, Page, Section};
