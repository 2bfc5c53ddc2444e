//! Access to the external analysis service.
//!
//! Spectra and metrics are computed upstream; this crate only fetches and
//! interprets them. Responses are returned as raw JSON because their shape
//! varies between service versions.

pub mod fixture;
pub mod http;

use crate::model::Axis;
use crate::prelude::CollaboratorResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use fixture::FixtureCollaborator;
pub use http::HttpCollaborator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnalysisKind {
    #[default]
    MF,
    FFT,
}

impl AnalysisKind {
    pub fn wire_name(self) -> &'static str {
        match self {
            AnalysisKind::MF => "MF",
            AnalysisKind::FFT => "FFT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataSource {
    #[default]
    Offline,
    Online,
}

impl DataSource {
    pub fn wire_name(self) -> &'static str {
        match self {
            DataSource::Offline => "OFFLINE",
            DataSource::Online => "ONLINE",
        }
    }
}

/// One per-axis analysis request.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub machine_id: String,
    pub bearing_id: String,
    pub axis: Axis,
    pub date: NaiveDate,
    pub analysis_kind: AnalysisKind,
    pub data_source: DataSource,
}

#[async_trait]
pub trait AnalysisCollaborator: Send + Sync {
    /// Machines with measurements on `date`.
    async fn machines(&self, date: NaiveDate) -> CollaboratorResult<Value>;

    async fn machine(&self, machine_id: &str) -> CollaboratorResult<Value>;

    /// Bearing-location list, including cached per-axis metrics.
    async fn bearings(&self, machine_id: &str) -> CollaboratorResult<Value>;

    async fn analysis(&self, request: &AnalysisRequest) -> CollaboratorResult<Value>;
}
