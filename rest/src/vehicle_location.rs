use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use rest_types::VehicleLocationTO;
use tracing::instrument;
use uuid::Uuid;

use crate::{error_handler, Context, RestStateDef};
use service::vehicle_location::{VehicleLocation, VehicleLocationService};

pub fn generate_route<RestState: RestStateDef>() -> Router<RestState> {
    Router::new()
        .route("/", post(report_location::<RestState>))
        .route("/latest/{vehicle_id}", get(get_latest_location::<RestState>))
}

#[instrument(skip(rest_state))]
pub async fn report_location<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Json(location): Json<VehicleLocationTO>,
) -> Response {
    error_handler(
        (async {
            let location = rest_state
                .vehicle_location_service()
                .report(&VehicleLocation::from(&location), context.into(), None)
                .await?;
            Ok(Response::builder()
                .status(201)
                .header("Content-Type", "application/json")
                .body(Body::new(
                    serde_json::to_string(&VehicleLocationTO::from(&location)).unwrap(),
                ))
                .unwrap())
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
pub async fn get_latest_location<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(vehicle_id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            let location = rest_state
                .vehicle_location_service()
                .latest_for_vehicle(vehicle_id, context.into(), None)
                .await?;
            match location {
                Some(location) => Ok(Response::builder()
                    .status(200)
                    .header("Content-Type", "application/json")
                    .body(Body::new(
                        serde_json::to_string(&VehicleLocationTO::from(&location)).unwrap(),
                    ))
                    .unwrap()),
                None => Ok(Response::builder().status(404).body(Body::empty()).unwrap()),
            }
        })
        .await,
    )
}
