use crate::collaborator::{AnalysisCollaborator, AnalysisRequest};
use crate::prelude::{CollaboratorError, CollaboratorResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Collaborator backed by the analysis service's REST API.
#[derive(Debug, Clone)]
pub struct HttpCollaborator {
    client: Client,
    base: Url,
}

impl HttpCollaborator {
    pub fn new(base_url: &str) -> CollaboratorResult<Self> {
        let base = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|err| CollaboratorError::InvalidUrl(format!("{}: {}", base_url, err)))?;
        if base.cannot_be_a_base() {
            return Err(CollaboratorError::InvalidUrl(base_url.to_string()));
        }
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> CollaboratorResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CollaboratorError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> CollaboratorResult<Value> {
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CollaboratorError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl AnalysisCollaborator for HttpCollaborator {
    async fn machines(&self, date: NaiveDate) -> CollaboratorResult<Value> {
        let mut url = self.endpoint(&["machines"])?;
        url.query_pairs_mut()
            .append_pair("date", &date.format("%Y-%m-%d").to_string());
        self.get_json(url).await
    }

    async fn machine(&self, machine_id: &str) -> CollaboratorResult<Value> {
        self.get_json(self.endpoint(&["machines", machine_id])?).await
    }

    async fn bearings(&self, machine_id: &str) -> CollaboratorResult<Value> {
        self.get_json(self.endpoint(&["machines", machine_id, "bearings"])?)
            .await
    }

    async fn analysis(&self, request: &AnalysisRequest) -> CollaboratorResult<Value> {
        let mut url = self.endpoint(&["analysis", &request.machine_id, &request.bearing_id])?;
        url.query_pairs_mut()
            .append_pair("axis", request.axis.wire_name())
            .append_pair("date", &request.date.format("%Y-%m-%d").to_string())
            .append_pair("analysis", request.analysis_kind.wire_name())
            .append_pair("source", request.data_source.wire_name());
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_escape_identifiers() {
        let collaborator = HttpCollaborator::new("http://127.0.0.1:9000/api/").unwrap();
        let url = collaborator.endpoint(&["machines", "m 1/2", "bearings"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/api/machines/m%201%2F2/bearings");
    }

    #[test]
    fn rejects_unparseable_base() {
        assert!(matches!(
            HttpCollaborator::new("not a url"),
            Err(CollaboratorError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpCollaborator::new("mailto:ops@example.com"),
            Err(CollaboratorError::InvalidUrl(_))
        ));
    }
}
