use bearingcore::collaborator::{AnalysisKind, DataSource};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

impl DateQuery {
    pub fn date_or_today(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// Query string of `GET /analysis/{machine}/{bearing}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisQuery {
    pub axis: String,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub analysis: AnalysisKind,
    #[serde(default)]
    pub source: DataSource,
}

/// Body sent with every non-2xx answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
