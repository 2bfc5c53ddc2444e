pub mod normalize;

pub use normalize::{normalize_optional, normalize_spectrum, SampleCap, SpectrumPayload};
