use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::{delete, get, post, put};
use axum::{Extension, Json, Router};
use fleetly_utils::DateRange;
use rest_types::{VehicleAvailabilityTO, VehicleDetailTO, VehicleTO};
use serde::Deserialize;
use time::Date;
use tracing::instrument;
use uuid::Uuid;

use crate::{error_handler, Context, RestError, RestStateDef};
use service::availability::AvailabilityService;
use service::vehicle::{Vehicle, VehicleService};

pub fn generate_route<RestState: RestStateDef>() -> Router<RestState> {
    Router::new()
        .route("/", get(get_all_vehicles::<RestState>))
        .route("/available", get(get_available_vehicles::<RestState>))
        .route("/slug/{slug}", get(get_vehicle_by_slug::<RestState>))
        .route("/{id}", get(get_vehicle::<RestState>))
        .route("/", post(create_vehicle::<RestState>))
        .route("/{id}", put(update_vehicle::<RestState>))
        .route("/{id}", delete(delete_vehicle::<RestState>))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

impl AvailabilityQuery {
    /// Caller-supplied days are inclusive; a missing range falls back to the
    /// service's "today" default.
    fn to_range(&self) -> Result<Option<DateRange>, RestError> {
        Ok(match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some(DateRange::days_inclusive(start, end)?),
            (Some(start), None) => Some(DateRange::single_day(start)),
            (None, _) => None,
        })
    }
}

#[instrument(skip(rest_state))]
pub async fn get_all_vehicles<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Query(query): Query<AvailabilityQuery>,
) -> Response {
    error_handler(
        (async {
            let range = query.to_range()?;
            let vehicles: Arc<[VehicleAvailabilityTO]> = rest_state
                .availability_service()
                .vehicle_overview(range, context.into(), None)
                .await?
                .iter()
                .map(VehicleAvailabilityTO::from)
                .collect();
            Ok(Response::builder()
                .status(200)
                .header("Content-Type", "application/json")
                .body(Body::new(serde_json::to_string(&vehicles).unwrap()))
                .unwrap())
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
pub async fn get_available_vehicles<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
) -> Response {
    error_handler(
        (async {
            let vehicles: Arc<[VehicleTO]> = rest_state
                .availability_service()
                .available_vehicles(context.into(), None)
                .await?
                .iter()
                .map(VehicleTO::from)
                .collect();
            Ok(Response::builder()
                .status(200)
                .header("Content-Type", "application/json")
                .body(Body::new(serde_json::to_string(&vehicles).unwrap()))
                .unwrap())
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
pub async fn get_vehicle<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(vehicle_id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            let detail = rest_state
                .availability_service()
                .vehicle_detail(vehicle_id, context.into(), None)
                .await?;
            Ok(Response::builder()
                .status(200)
                .header("Content-Type", "application/json")
                .body(Body::new(
                    serde_json::to_string(&VehicleDetailTO::from(&detail)).unwrap(),
                ))
                .unwrap())
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
pub async fn get_vehicle_by_slug<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(slug): Path<String>,
) -> Response {
    error_handler(
        (async {
            let detail = rest_state
                .availability_service()
                .vehicle_detail_by_slug(&slug, context.into(), None)
                .await?;
            Ok(Response::builder()
                .status(200)
                .header("Content-Type", "application/json")
                .body(Body::new(
                    serde_json::to_string(&VehicleDetailTO::from(&detail)).unwrap(),
                ))
                .unwrap())
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
pub async fn create_vehicle<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Json(vehicle): Json<VehicleTO>,
) -> Response {
    error_handler(
        (async {
            let vehicle = rest_state
                .vehicle_service()
                .create(&Vehicle::from(&vehicle), context.into(), None)
                .await?;
            Ok(Response::builder()
                .status(201)
                .header("Content-Type", "application/json")
                .body(Body::new(
                    serde_json::to_string(&VehicleTO::from(&vehicle)).unwrap(),
                ))
                .unwrap())
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
pub async fn update_vehicle<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(vehicle_id): Path<Uuid>,
    Json(vehicle): Json<VehicleTO>,
) -> Response {
    error_handler(
        (async {
            if vehicle_id != vehicle.id {
                return Err(RestError::InconsistentId(vehicle_id, vehicle.id));
            }
            let vehicle = rest_state
                .vehicle_service()
                .update(&Vehicle::from(&vehicle), context.into(), None)
                .await?;
            Ok(Response::builder()
                .status(200)
                .header("Content-Type", "application/json")
                .body(Body::new(
                    serde_json::to_string(&VehicleTO::from(&vehicle)).unwrap(),
                ))
                .unwrap())
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
pub async fn delete_vehicle<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(vehicle_id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            rest_state
                .vehicle_service()
                .delete(vehicle_id, context.into(), None)
                .await?;
            Ok(Response::builder().status(204).body(Body::empty()).unwrap())
        })
        .await,
    )
}
