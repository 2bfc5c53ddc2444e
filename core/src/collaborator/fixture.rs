use crate::collaborator::{AnalysisCollaborator, AnalysisRequest};
use crate::model::Axis;
use crate::prelude::{CollaboratorError, CollaboratorResult};
use crate::upstream::first_string;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};

/// In-memory collaborator holding canned service responses.
///
/// Analyses are looked up as `machine/bearing/AXIS` first and then as
/// `machine/bearing` (a comprehensive response covering all axes). Any key
/// listed in `failing` answers with `CollaboratorError::Unavailable`; the
/// machine and bearing-list lookups use `machine/{id}` and `bearings/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureCollaborator {
    #[serde(default)]
    pub machines: Vec<Value>,
    #[serde(default)]
    pub bearings: BTreeMap<String, Value>,
    #[serde(default)]
    pub analyses: BTreeMap<String, Value>,
    #[serde(default)]
    pub failing: BTreeSet<String>,
}

impl FixtureCollaborator {
    pub fn analysis_key(machine_id: &str, bearing_id: &str, axis: Option<Axis>) -> String {
        match axis {
            Some(axis) => format!("{}/{}/{}", machine_id, bearing_id, axis.code()),
            None => format!("{}/{}", machine_id, bearing_id),
        }
    }

    pub fn with_machine(mut self, machine: Value) -> Self {
        self.machines.push(machine);
        self
    }

    pub fn with_bearings(mut self, machine_id: &str, bearings: Value) -> Self {
        self.bearings.insert(machine_id.to_string(), bearings);
        self
    }

    pub fn with_analysis(mut self, machine_id: &str, bearing_id: &str, axis: Option<Axis>, response: Value) -> Self {
        self.analyses
            .insert(Self::analysis_key(machine_id, bearing_id, axis), response);
        self
    }

    pub fn failing(mut self, key: impl Into<String>) -> Self {
        self.failing.insert(key.into());
        self
    }

    pub fn machine_ids(&self) -> Vec<String> {
        self.machines
            .iter()
            .filter_map(|m| first_string(m, &["machineId", "_id", "id"]))
            .collect()
    }

    fn guard(&self, key: &str) -> CollaboratorResult<()> {
        if self.failing.contains(key) {
            Err(CollaboratorError::Unavailable(key.to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AnalysisCollaborator for FixtureCollaborator {
    async fn machines(&self, _date: NaiveDate) -> CollaboratorResult<Value> {
        self.guard("machines")?;
        Ok(json!({"success": true, "data": self.machines}))
    }

    async fn machine(&self, machine_id: &str) -> CollaboratorResult<Value> {
        self.guard(&format!("machine/{}", machine_id))?;
        self.machines
            .iter()
            .find(|m| first_string(m, &["machineId", "_id", "id"]).as_deref() == Some(machine_id))
            .cloned()
            .ok_or_else(|| CollaboratorError::NotFound(format!("machine {}", machine_id)))
    }

    async fn bearings(&self, machine_id: &str) -> CollaboratorResult<Value> {
        self.guard(&format!("bearings/{}", machine_id))?;
        self.bearings
            .get(machine_id)
            .cloned()
            .ok_or_else(|| CollaboratorError::NotFound(format!("bearings for {}", machine_id)))
    }

    async fn analysis(&self, request: &AnalysisRequest) -> CollaboratorResult<Value> {
        let per_axis = Self::analysis_key(&request.machine_id, &request.bearing_id, Some(request.axis));
        let whole = Self::analysis_key(&request.machine_id, &request.bearing_id, None);
        self.guard(&per_axis)?;
        self.analyses
            .get(&per_axis)
            .or_else(|| self.analyses.get(&whole))
            .cloned()
            .ok_or(CollaboratorError::NotFound(per_axis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::{AnalysisKind, DataSource};

    fn request(axis: Axis) -> AnalysisRequest {
        AnalysisRequest {
            machine_id: "m-1".into(),
            bearing_id: "b-1".into(),
            axis,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            analysis_kind: AnalysisKind::MF,
            data_source: DataSource::Offline,
        }
    }

    #[tokio::test]
    async fn per_axis_entry_wins_over_comprehensive() {
        let fixture = FixtureCollaborator::default()
            .with_analysis("m-1", "b-1", None, json!({"kind": "all"}))
            .with_analysis("m-1", "b-1", Some(Axis::V), json!({"kind": "vertical"}));
        assert_eq!(fixture.analysis(&request(Axis::V)).await.unwrap()["kind"], "vertical");
        assert_eq!(fixture.analysis(&request(Axis::H)).await.unwrap()["kind"], "all");
    }

    #[tokio::test]
    async fn failing_keys_surface_as_unavailable() {
        let fixture = FixtureCollaborator::default()
            .with_analysis("m-1", "b-1", None, json!({}))
            .failing("m-1/b-1/A");
        assert!(matches!(
            fixture.analysis(&request(Axis::A)).await,
            Err(CollaboratorError::Unavailable(_))
        ));
        assert!(fixture.analysis(&request(Axis::H)).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_machine_is_not_found() {
        let fixture = FixtureCollaborator::default().with_machine(json!({"_id": "m-1"}));
        assert!(fixture.machine("m-1").await.is_ok());
        assert!(matches!(fixture.machine("m-2").await, Err(CollaboratorError::NotFound(_))));
        assert_eq!(fixture.machine_ids(), vec!["m-1".to_string()]);
    }
}
