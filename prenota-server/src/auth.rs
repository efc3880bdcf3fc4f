use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap,
    },
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
    Json,
};
use cookie::{time::Duration, Cookie, SameSite};
use log::{info, warn};
use prenota_core::{create_token, verify_token};
use subtle::ConstantTimeEq;

use crate::{
    config::{ADMIN_PASSWORD_VAR, SESSION_SECRET_VAR},
    schemas::{LoginSchema, ValidatedJson},
    serialized::Ack,
    Router, ServerConfig, ServerContext, ServerError, ServerResult,
};

/// The cookie carrying the admin session token
pub const SESSION_COOKIE: &str = "admin_session";
pub const SESSION_DURATION_IN_DAYS: i64 = 7;

/// Proof that the request carries a valid admin session.
///
/// Handlers taking this extractor never run for unauthenticated requests,
/// which get a 401 without any detail on what was wrong.
#[derive(Debug)]
pub struct AdminSession;

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    ServerContext: FromRef<S>,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = ServerContext::from_ref(state);
        let secret = session_secret(&context.config)?;

        let token = session_cookie(&parts.headers);

        if !verify_token(token.as_deref(), secret) {
            return Err(ServerError::Unauthorized);
        }

        Ok(Self)
    }
}

fn session_secret(config: &ServerConfig) -> ServerResult<&str> {
    config
        .session_secret
        .as_deref()
        .ok_or(ServerError::MissingConfig(SESSION_SECRET_VAR))
}

/// Reads the session cookie out of every `Cookie` header on the request.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

fn session_cookie_header(value: String, max_age: Duration, production: bool) -> String {
    Cookie::build((SESSION_COOKIE, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .secure(production)
        .build()
        .to_string()
}

#[utoipa::path(
    post,
    path = "/api/admin/login",
    tag = "admin",
    request_body = LoginSchema,
    responses(
        (status = 200, body = Ack, description = "Session cookie was set"),
        (status = 401, body = ErrorBody, description = "Password errata"),
        (status = 500, body = ErrorBody, description = "Session secret or password not configured")
    )
)]
async fn login(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<LoginSchema>,
) -> ServerResult<impl IntoResponse> {
    let secret = session_secret(&context.config)?;
    let password = context
        .config
        .admin_password
        .as_deref()
        .ok_or(ServerError::MissingConfig(ADMIN_PASSWORD_VAR))?;

    let matches: bool = body.password.as_bytes().ct_eq(password.as_bytes()).into();

    if !matches {
        warn!("Refused admin login with a wrong password");
        return Err(ServerError::WrongPassword);
    }

    info!("Admin logged in");

    let cookie = session_cookie_header(
        create_token(secret),
        Duration::days(SESSION_DURATION_IN_DAYS),
        context.config.production,
    );

    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Json(Ack::default())))
}

#[utoipa::path(
    post,
    path = "/api/admin/logout",
    tag = "admin",
    responses(
        (status = 200, body = Ack, description = "Session cookie was cleared")
    )
)]
async fn logout(State(context): State<ServerContext>) -> impl IntoResponse {
    let cookie = session_cookie_header(String::new(), Duration::ZERO, context.config.production);

    (AppendHeaders([(SET_COOKIE, cookie)]), Json(Ack::default()))
}

#[utoipa::path(
    get,
    path = "/api/admin/session",
    tag = "admin",
    security(
        ("AdminSession" = [])
    ),
    responses(
        (status = 200, body = Ack, description = "The session cookie is valid"),
        (status = 401, body = ErrorBody)
    )
)]
async fn session(_session: AdminSession) -> Json<Ack> {
    Json(Ack::default())
}

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/session", get(session))
}

#[cfg(test)]
mod test {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_session_cookie_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("a=1; admin_session=abc.def; b=2"));

        assert_eq!(session_cookie(&headers).as_deref(), Some("abc.def"));
        assert_eq!(session_cookie(&HeaderMap::new()), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let header = session_cookie_header("t".into(), Duration::days(7), false);

        assert!(header.starts_with("admin_session=t"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Lax"));
        assert!(header.contains("Path=/"));
        assert!(header.contains("Max-Age=604800"));
        assert!(!header.contains("Secure"));

        let header = session_cookie_header(String::new(), Duration::ZERO, true);
        assert!(header.contains("Max-Age=0"));
        assert!(header.contains("Secure"));
    }
}
