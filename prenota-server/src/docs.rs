use std::borrow::BorrowMut;

use axum::{response::IntoResponse, Json};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

use crate::{
    auth::{self, SESSION_COOKIE},
    bookings,
    schemas::{BookingsOpenSchema, LoginSchema, StatusUpdateSchema},
    serialized::{Ack, BookingAccepted, BookingsPage, ErrorBody, Settings, StatusChanged, Via},
    settings,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        auth::logout,
        auth::session,
        bookings::submit_booking,
        bookings::alive,
        bookings::list_bookings,
        bookings::update_status,
        settings::public_settings,
        settings::admin_settings,
        settings::set_bookings_open,
    ),
    components(schemas(
        Ack,
        BookingAccepted,
        BookingsPage,
        BookingsOpenSchema,
        ErrorBody,
        LoginSchema,
        Settings,
        StatusChanged,
        StatusUpdateSchema,
        Via,
    )),
    modifiers(&Security),
    info(
        title = "prenota",
        description = "prenota-server takes bookings from the public form and exposes the admin panel endpoints"
    )
)]
pub struct ApiDoc;

struct Security;

impl Modify for Security {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.borrow_mut() {
            let scheme = ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE));

            components.add_security_scheme("AdminSession", SecurityScheme::ApiKey(scheme))
        }
    }
}

pub async fn docs() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
