use crate::service::model::{AnalysisQuery, DateQuery, ErrorBody};
use anyhow::Context;
use bearingcore::collaborator::{AnalysisCollaborator, AnalysisRequest, FixtureCollaborator};
use bearingcore::model::Axis;
use bearingcore::prelude::{CollaboratorError, CollaboratorResult};
use serde_json::Value;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::Filter;

pub fn service_bind_address(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

fn status_for(err: &CollaboratorError) -> StatusCode {
    match err {
        CollaboratorError::NotFound(_) => StatusCode::NOT_FOUND,
        CollaboratorError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn respond(result: CollaboratorResult<Value>) -> WithStatus<Json> {
    match result {
        Ok(body) => warp::reply::with_status(warp::reply::json(&body), StatusCode::OK),
        Err(err) => {
            log::warn!("answering with error: {}", err);
            warp::reply::with_status(warp::reply::json(&ErrorBody::new(err.to_string())), status_for(&err))
        }
    }
}

async fn list_machines(query: DateQuery, fleet: Arc<FixtureCollaborator>) -> Result<WithStatus<Json>, Infallible> {
    Ok(respond(fleet.machines(query.date_or_today()).await))
}

async fn get_machine(machine_id: String, fleet: Arc<FixtureCollaborator>) -> Result<WithStatus<Json>, Infallible> {
    Ok(respond(fleet.machine(&machine_id).await))
}

async fn list_bearings(machine_id: String, fleet: Arc<FixtureCollaborator>) -> Result<WithStatus<Json>, Infallible> {
    Ok(respond(fleet.bearings(&machine_id).await))
}

async fn get_analysis(
    machine_id: String,
    bearing_id: String,
    query: AnalysisQuery,
    fleet: Arc<FixtureCollaborator>,
) -> Result<WithStatus<Json>, Infallible> {
    let Some(axis) = Axis::parse(&query.axis) else {
        return Ok(warp::reply::with_status(
            warp::reply::json(&ErrorBody::new(format!("unknown axis {}", query.axis))),
            StatusCode::BAD_REQUEST,
        ));
    };
    let request = AnalysisRequest {
        machine_id,
        bearing_id,
        axis,
        date: DateQuery { date: query.date }.date_or_today(),
        analysis_kind: query.analysis,
        data_source: query.source,
    };
    log::debug!("analysis {}/{} {}", request.machine_id, request.bearing_id, axis);
    Ok(respond(fleet.analysis(&request).await))
}

/// Stand-in analysis service answering the collaborator endpoints from a fixture.
pub struct ServiceBridge {
    fleet: Arc<FixtureCollaborator>,
}

impl ServiceBridge {
    pub fn new(fleet: FixtureCollaborator) -> Self {
        Self { fleet: Arc::new(fleet) }
    }

    pub fn routes(&self) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
        let fleet = self.fleet.clone();
        let fleet_filter = warp::any().map(move || fleet.clone());

        let machines_route = warp::path!("machines")
            .and(warp::get())
            .and(warp::query::<DateQuery>())
            .and(fleet_filter.clone())
            .and_then(list_machines);

        let machine_route = warp::path!("machines" / String)
            .and(warp::get())
            .and(fleet_filter.clone())
            .and_then(get_machine);

        let bearings_route = warp::path!("machines" / String / "bearings")
            .and(warp::get())
            .and(fleet_filter.clone())
            .and_then(list_bearings);

        let analysis_route = warp::path!("analysis" / String / String)
            .and(warp::get())
            .and(warp::query::<AnalysisQuery>())
            .and(fleet_filter)
            .and_then(get_analysis);

        machines_route
            .or(machine_route)
            .or(bearings_route)
            .or(analysis_route)
            .with(warp::log("reporter::service"))
    }

    /// Serves until Ctrl+C.
    pub async fn serve(&self, addr: SocketAddr) -> anyhow::Result<()> {
        let (bound, server) = warp::serve(self.routes())
            .try_bind_with_graceful_shutdown(addr, async {
                if let Err(err) = signal::ctrl_c().await {
                    log::error!("ctrl-c handler failed: {}", err);
                }
            })
            .with_context(|| format!("binding analysis service on {}", addr))?;
        log::info!(
            "analysis service on http://{} with {} machine(s) (Ctrl+C to stop)",
            bound,
            self.fleet.machines.len()
        );
        server.await;
        log::info!("analysis service stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_fleet, FleetConfig};
    use bearingcore::collaborator::FixtureCollaborator;
    use serde_json::json;

    fn bridge() -> (ServiceBridge, String) {
        let fleet = build_fleet(&FleetConfig {
            machines: 1,
            bearings_per_machine: 1,
            points: 32,
            unavailable_ratio: 0.0,
            failure_ratio: 0.0,
            seed: 3,
            ..FleetConfig::default()
        });
        let machine_id = fleet.machine_ids()[0].clone();
        (ServiceBridge::new(fleet), machine_id)
    }

    #[tokio::test]
    async fn serves_machine_list_and_bearings() {
        let (bridge, machine_id) = bridge();
        let routes = bridge.routes();

        let listed = warp::test::request().path("/machines?date=2024-03-01").reply(&routes).await;
        assert_eq!(listed.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(listed.body()).unwrap();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let bearings = warp::test::request()
            .path(&format!("/machines/{}/bearings", machine_id))
            .reply(&routes)
            .await;
        assert_eq!(bearings.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(bearings.body()).unwrap();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn analysis_route_validates_axis_and_maps_errors() {
        let (bridge, machine_id) = bridge();
        let routes = bridge.routes();

        let bad_axis = warp::test::request()
            .path(&format!("/analysis/{}/b-1?axis=radial", machine_id))
            .reply(&routes)
            .await;
        assert_eq!(bad_axis.status(), StatusCode::BAD_REQUEST);

        let missing = warp::test::request()
            .path(&format!("/analysis/{}/b-1?axis=V-Axis&analysis=FFT&source=ONLINE", machine_id))
            .reply(&routes)
            .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        let body: ErrorBody = serde_json::from_slice(missing.body()).unwrap();
        assert!(!body.success);
    }

    #[tokio::test]
    async fn failing_keys_answer_service_unavailable() {
        let fleet = FixtureCollaborator::default()
            .with_machine(json!({"_id": "m-1"}))
            .failing("bearings/m-1");
        let routes = ServiceBridge::new(fleet).routes();

        let machine = warp::test::request().path("/machines/m-1").reply(&routes).await;
        assert_eq!(machine.status(), StatusCode::OK);
        let bearings = warp::test::request().path("/machines/m-1/bearings").reply(&routes).await;
        assert_eq!(bearings.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
