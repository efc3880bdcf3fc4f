use axum::{extract::State, routing::get, Json};
use prenota_core::parse_bool_loose;
use serde_json::Value;

use crate::{
    auth::AdminSession,
    schemas::LenientJson,
    serialized::Settings,
    Router, ServerContext, ServerResult,
};

#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "settings",
    responses(
        (status = 200, body = Settings),
        (status = 500, body = ErrorBody)
    )
)]
async fn public_settings(State(context): State<ServerContext>) -> ServerResult<Json<Settings>> {
    let snapshot = context.gateway.settings().await?;

    Ok(Json(snapshot.into()))
}

#[utoipa::path(
    get,
    path = "/api/admin/settings",
    tag = "admin",
    security(
        ("AdminSession" = [])
    ),
    responses(
        (status = 200, body = Settings),
        (status = 401, body = ErrorBody)
    )
)]
async fn admin_settings(
    _session: AdminSession,
    State(context): State<ServerContext>,
) -> ServerResult<Json<Settings>> {
    public_settings(State(context)).await
}

#[utoipa::path(
    post,
    path = "/api/admin/settings",
    tag = "admin",
    request_body = BookingsOpenSchema,
    security(
        ("AdminSession" = [])
    ),
    responses(
        (status = 200, body = Settings),
        (status = 400, body = ErrorBody, description = "No usable value in the body"),
        (status = 401, body = ErrorBody)
    )
)]
async fn set_bookings_open(
    _session: AdminSession,
    State(context): State<ServerContext>,
    LenientJson(body): LenientJson<Value>,
) -> ServerResult<Json<Settings>> {
    let open = parse_bool_loose(&body)?;
    let snapshot = context.gateway.set_bookings_open(open).await?;

    Ok(Json(snapshot.into()))
}

pub fn router() -> Router {
    // POST is accepted as well, for clients that cannot send a bodyless GET
    Router::new().route("/settings", get(public_settings).post(public_settings))
}

pub fn admin_router() -> Router {
    Router::new().route("/settings", get(admin_settings).post(set_bookings_open))
}
