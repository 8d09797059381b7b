use std::sync::Arc;

use axum::{body::Body, response::Response, routing::get, Json, Router};
use thiserror::Error;
use utoipa::OpenApi;
use uuid::Uuid;

pub mod booking;
pub mod permission;
pub mod session;
pub mod vehicle;
pub mod vehicle_location;

pub use session::Context;

use service::availability::AvailabilityService;
use service::booking::BookingService;
use service::vehicle::VehicleService;
use service::vehicle_location::VehicleLocationService;
use service::PermissionService;

#[derive(Debug, Error)]
pub enum RestError {
    #[error("Service error")]
    ServiceError(#[from] service::ServiceError),

    #[error("Inconsistent id. Got {0} in path but {1} in body")]
    InconsistentId(Uuid, Uuid),

    #[error("Invalid query range: {0}")]
    InvalidQueryRange(#[from] fleetly_utils::DateRangeError),
}

fn error_handler(result: Result<Response, RestError>) -> Response {
    match result {
        Ok(response) => response,
        Err(err @ RestError::InconsistentId(_, _)) => Response::builder()
            .status(400)
            .body(Body::new(err.to_string()))
            .unwrap(),
        Err(err @ RestError::InvalidQueryRange(_)) => Response::builder()
            .status(422)
            .body(Body::new(err.to_string()))
            .unwrap(),
        Err(RestError::ServiceError(service::ServiceError::Forbidden)) => {
            Response::builder().status(403).body(Body::empty()).unwrap()
        }
        Err(RestError::ServiceError(service::ServiceError::DatabaseQueryError(e))) => {
            Response::builder()
                .status(500)
                .body(Body::new(e.to_string()))
                .unwrap()
        }
        Err(RestError::ServiceError(service::ServiceError::EntityAlreadyExists(id))) => {
            Response::builder()
                .status(409)
                .body(Body::new(id.to_string()))
                .unwrap()
        }
        Err(RestError::ServiceError(service::ServiceError::EntityNotFound(id))) => {
            Response::builder()
                .status(404)
                .body(Body::new(id.to_string()))
                .unwrap()
        }
        Err(RestError::ServiceError(err @ service::ServiceError::SlugNotFound(_))) => {
            Response::builder()
                .status(404)
                .body(Body::new(err.to_string()))
                .unwrap()
        }
        Err(RestError::ServiceError(err @ service::ServiceError::EntityConflicts(_, _, _))) => {
            Response::builder()
                .status(409)
                .body(Body::new(err.to_string()))
                .unwrap()
        }
        Err(RestError::ServiceError(err @ service::ServiceError::ValidationError(_))) => {
            Response::builder()
                .status(422)
                .body(Body::new(err.to_string()))
                .unwrap()
        }
        Err(RestError::ServiceError(err @ service::ServiceError::IdSetOnCreate)) => {
            Response::builder()
                .status(422)
                .body(Body::new(err.to_string()))
                .unwrap()
        }
        Err(RestError::ServiceError(err @ service::ServiceError::VersionSetOnCreate)) => {
            Response::builder()
                .status(422)
                .body(Body::new(err.to_string()))
                .unwrap()
        }
        Err(RestError::ServiceError(err @ service::ServiceError::CreatedSetOnCreate)) => {
            Response::builder()
                .status(422)
                .body(Body::new(err.to_string()))
                .unwrap()
        }
        Err(RestError::ServiceError(err @ service::ServiceError::DeletedSetOnCreate)) => {
            Response::builder()
                .status(422)
                .body(Body::new(err.to_string()))
                .unwrap()
        }
        // The conflict a double-booking attempt runs into.
        Err(RestError::ServiceError(err @ service::ServiceError::OverlappingDateRange)) => {
            Response::builder()
                .status(409)
                .body(Body::new(err.to_string()))
                .unwrap()
        }
        Err(RestError::ServiceError(err @ service::ServiceError::DateOrderWrong(_, _))) => {
            Response::builder()
                .status(422)
                .body(Body::new(err.to_string()))
                .unwrap()
        }
        Err(RestError::ServiceError(err @ service::ServiceError::InvalidStatusTransition(_, _))) => {
            Response::builder()
                .status(422)
                .body(Body::new(err.to_string()))
                .unwrap()
        }
        Err(RestError::ServiceError(err @ service::ServiceError::InternalError)) => {
            Response::builder()
                .status(500)
                .body(Body::new(err.to_string()))
                .unwrap()
        }
    }
}

pub trait RestStateDef: Clone + Send + Sync + 'static {
    type PermissionService: PermissionService<Context = Context> + Send + Sync + 'static;
    type VehicleService: VehicleService<Context = Context> + Send + Sync + 'static;
    type BookingService: BookingService<Context = Context> + Send + Sync + 'static;
    type AvailabilityService: AvailabilityService<Context = Context> + Send + Sync + 'static;
    type VehicleLocationService: VehicleLocationService<Context = Context> + Send + Sync + 'static;

    fn backend_version(&self) -> Arc<str>;

    fn permission_service(&self) -> Arc<Self::PermissionService>;
    fn vehicle_service(&self) -> Arc<Self::VehicleService>;
    fn booking_service(&self) -> Arc<Self::BookingService>;
    fn availability_service(&self) -> Arc<Self::AvailabilityService>;
    fn vehicle_location_service(&self) -> Arc<Self::VehicleLocationService>;
}

async fn version<RestState: RestStateDef>(
    rest_state: axum::extract::State<RestState>,
) -> Response {
    Response::builder()
        .status(200)
        .body(Body::new(rest_state.backend_version().to_string()))
        .unwrap()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(booking::BookingApiDoc::openapi())
}

pub async fn start_server<RestState: RestStateDef>(rest_state: RestState) {
    let app = Router::new()
        .route("/version", get(version::<RestState>))
        .route("/api-doc/openapi.json", get(openapi_json))
        .nest("/vehicle", vehicle::generate_route())
        .nest("/booking", booking::generate_route())
        .nest("/location", vehicle_location::generate_route())
        .nest("/permission", permission::generate_route())
        .layer(axum::middleware::from_fn(session::context_extractor))
        .with_state(rest_state);

    let bind_address =
        std::env::var("FLEETLY_HTTP_BIND").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    tracing::info!("Listening on {}", bind_address);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .expect("Could not bind server");
    axum::serve(listener, app)
        .await
        .expect("Could not start server");
}
