use axum::{
    extract::State,
    routing::get,
    Json,
};
use chrono::Utc;
use log::{error, info, warn};
use prenota_core::{is_open_or_default, BookingRequest, StatusUpdate};
use prenota_gateway::GatewayError;

use crate::{
    auth::AdminSession,
    schemas::{LenientJson, StatusUpdateSchema},
    serialized::{Ack, BookingAccepted, BookingsPage, StatusChanged},
    Router, ServerContext, ServerError, ServerResult,
};

#[utoipa::path(
    post,
    path = "/api/bookings",
    tag = "bookings",
    request_body(content = Object, description = "The booking form, every field loosely typed"),
    responses(
        (status = 200, body = BookingAccepted),
        (status = 400, body = ErrorBody, description = "The booking is incomplete or malformed"),
        (status = 403, body = ErrorBody, description = "Bookings are closed"),
        (status = 500, body = ErrorBody, description = "The script endpoint is not configured"),
        (status = 502, body = ErrorBody, description = "The intake endpoint refused the booking")
    )
)]
async fn submit_booking(
    State(context): State<ServerContext>,
    LenientJson(request): LenientJson<BookingRequest>,
) -> ServerResult<Json<BookingAccepted>> {
    let booking = request.validate(Utc::now(), &context.config.shop_name)?;

    let open = match context.gateway.settings().await {
        Ok(snapshot) => snapshot.bookings_open,
        Err(e @ GatewayError::MissingConfig(_)) => {
            error!("Cannot check whether bookings are open: {e}");
            return Err(e.into());
        }
        Err(e) => {
            warn!("Could not check whether bookings are open, accepting: {e}");
            None
        }
    };

    if !is_open_or_default(open) {
        info!("Refused a booking while bookings are closed");
        return Err(ServerError::BookingsClosed);
    }

    let response = context.gateway.submit_booking(&booking).await?;

    Ok(Json(BookingAccepted::new(response)))
}

#[utoipa::path(
    get,
    path = "/api/bookings",
    tag = "bookings",
    responses(
        (status = 200, body = Ack)
    )
)]
async fn alive() -> Json<Ack> {
    Json(Ack::default())
}

#[utoipa::path(
    get,
    path = "/api/admin/bookings",
    tag = "admin",
    security(
        ("AdminSession" = [])
    ),
    responses(
        (status = 200, body = BookingsPage),
        (status = 401, body = ErrorBody)
    )
)]
async fn list_bookings(
    _session: AdminSession,
    State(context): State<ServerContext>,
) -> ServerResult<Json<BookingsPage>> {
    let list = context.gateway.list_bookings().await?;

    Ok(Json(list.into()))
}

#[utoipa::path(
    post,
    path = "/api/admin/bookings",
    tag = "admin",
    request_body = StatusUpdateSchema,
    security(
        ("AdminSession" = [])
    ),
    responses(
        (status = 200, body = StatusChanged),
        (status = 400, body = ErrorBody, description = "Unknown status or no way to identify the booking"),
        (status = 401, body = ErrorBody)
    )
)]
async fn update_status(
    _session: AdminSession,
    State(context): State<ServerContext>,
    LenientJson(body): LenientJson<StatusUpdateSchema>,
) -> ServerResult<Json<StatusChanged>> {
    let update = StatusUpdate::new(
        &body.stato,
        Some(&body.timestamp_iso),
        Some(&body.telefono),
        Some(&body.data_iso),
        Some(&body.ora),
    )?;

    let updated = context.gateway.update_status(&update).await?;

    Ok(Json(updated.into()))
}

pub fn router() -> Router {
    Router::new().route("/bookings", get(alive).post(submit_booking))
}

pub fn admin_router() -> Router {
    Router::new().route("/bookings", get(list_bookings).post(update_status))
}
