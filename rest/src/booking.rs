use std::sync::Arc;

use axum::body::Body;
use axum::extract::Path;
use axum::routing::{get, post, put};
use axum::{extract::State, response::Response};
use axum::{Extension, Json, Router};
use rest_types::{BookingStatusTO, BookingStatusUpdateTO, BookingTO, RescheduleBookingTO};
use tracing::instrument;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::{error_handler, Context, RestStateDef};
use service::booking::{Booking, BookingService};

pub fn generate_route<RestState: RestStateDef>() -> Router<RestState> {
    Router::new()
        .route("/", get(get_all_bookings::<RestState>))
        .route("/{id}", get(get_booking::<RestState>))
        .route(
            "/for-vehicle/{vehicle_id}",
            get(get_bookings_for_vehicle::<RestState>),
        )
        .route("/", post(create_booking::<RestState>))
        .route("/{id}", put(reschedule_booking::<RestState>))
        .route("/{id}/status", put(set_booking_status::<RestState>))
}

#[utoipa::path(
    get,
    path = "",
    responses(
        (status = 200, description = "List all bookings", body = Vec<BookingTO>),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument(skip(rest_state))]
pub async fn get_all_bookings<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
) -> Response {
    error_handler(
        (async {
            let bookings: Arc<[BookingTO]> = rest_state
                .booking_service()
                .get_all(context.into(), None)
                .await?
                .iter()
                .map(BookingTO::from)
                .collect();
            Ok(Response::builder()
                .status(200)
                .header("Content-Type", "application/json")
                .body(Body::new(serde_json::to_string(&bookings).unwrap()))
                .unwrap())
        })
        .await,
    )
}

#[utoipa::path(
    get,
    path = "/{id}",
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Get booking by ID", body = BookingTO),
        (status = 404, description = "Booking not found"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument(skip(rest_state))]
pub async fn get_booking<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(booking_id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            let booking = rest_state
                .booking_service()
                .get(booking_id, context.into(), None)
                .await?;
            Ok(Response::builder()
                .status(200)
                .header("Content-Type", "application/json")
                .body(Body::new(
                    serde_json::to_string(&BookingTO::from(&booking)).unwrap(),
                ))
                .unwrap())
        })
        .await,
    )
}

#[utoipa::path(
    get,
    path = "/for-vehicle/{vehicle_id}",
    params(
        ("vehicle_id" = Uuid, Path, description = "Vehicle ID")
    ),
    responses(
        (status = 200, description = "All bookings of one vehicle", body = Vec<BookingTO>),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument(skip(rest_state))]
pub async fn get_bookings_for_vehicle<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(vehicle_id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            let bookings: Arc<[BookingTO]> = rest_state
                .booking_service()
                .get_for_vehicle(vehicle_id, context.into(), None)
                .await?
                .iter()
                .map(BookingTO::from)
                .collect();
            Ok(Response::builder()
                .status(200)
                .header("Content-Type", "application/json")
                .body(Body::new(serde_json::to_string(&bookings).unwrap()))
                .unwrap())
        })
        .await,
    )
}

#[utoipa::path(
    post,
    path = "",
    request_body = BookingTO,
    responses(
        (status = 201, description = "Booking created", body = BookingTO),
        (status = 409, description = "Date range overlaps a blocking booking"),
        (status = 422, description = "Invalid booking"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument(skip(rest_state))]
pub async fn create_booking<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Json(booking): Json<BookingTO>,
) -> Response {
    error_handler(
        (async {
            let booking = rest_state
                .booking_service()
                .create(&Booking::from(&booking), context.into(), None)
                .await?;
            Ok(Response::builder()
                .status(201)
                .header("Content-Type", "application/json")
                .body(Body::new(
                    serde_json::to_string(&BookingTO::from(&booking)).unwrap(),
                ))
                .unwrap())
        })
        .await,
    )
}

#[utoipa::path(
    put,
    path = "/{id}",
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    request_body = RescheduleBookingTO,
    responses(
        (status = 200, description = "Booking rescheduled", body = BookingTO),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Date range overlaps a blocking booking or version conflict"),
        (status = 422, description = "Invalid date range"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument(skip(rest_state))]
pub async fn reschedule_booking<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(booking_id): Path<Uuid>,
    Json(reschedule): Json<RescheduleBookingTO>,
) -> Response {
    error_handler(
        (async {
            let booking = rest_state
                .booking_service()
                .reschedule(
                    booking_id,
                    reschedule.start_date,
                    reschedule.end_date,
                    reschedule.version,
                    context.into(),
                    None,
                )
                .await?;
            Ok(Response::builder()
                .status(200)
                .header("Content-Type", "application/json")
                .body(Body::new(
                    serde_json::to_string(&BookingTO::from(&booking)).unwrap(),
                ))
                .unwrap())
        })
        .await,
    )
}

#[utoipa::path(
    put,
    path = "/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    request_body = BookingStatusUpdateTO,
    responses(
        (status = 200, description = "Booking status changed", body = BookingTO),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Confirmation ran into an overlapping booking or version conflict"),
        (status = 422, description = "Transition not allowed"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument(skip(rest_state))]
pub async fn set_booking_status<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(booking_id): Path<Uuid>,
    Json(status_update): Json<BookingStatusUpdateTO>,
) -> Response {
    error_handler(
        (async {
            let booking = rest_state
                .booking_service()
                .set_status(
                    booking_id,
                    (&status_update.status).into(),
                    status_update.version,
                    context.into(),
                    None,
                )
                .await?;
            Ok(Response::builder()
                .status(200)
                .header("Content-Type", "application/json")
                .body(Body::new(
                    serde_json::to_string(&BookingTO::from(&booking)).unwrap(),
                ))
                .unwrap())
        })
        .await,
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        get_all_bookings,
        get_booking,
        get_bookings_for_vehicle,
        create_booking,
        reschedule_booking,
        set_booking_status,
    ),
    components(schemas(BookingTO, BookingStatusTO, RescheduleBookingTO, BookingStatusUpdateTO)),
    tags(
        (name = "booking", description = "Booking management")
    )
)]
pub struct BookingApiDoc;
