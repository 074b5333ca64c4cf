use axum::{
    Extension, Json,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
    middleware::Next,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use shared::{abstract_trait::DynIdentityService, errors::ErrorResponse, model::Identity};
use tracing::warn;

pub const TOKEN_COOKIE: &str = "token";

type Rejection = (StatusCode, Json<ErrorResponse>);

/// Identity of the caller on routes where a token is optional.
#[derive(Debug, Clone, Default)]
pub struct MaybeIdentity(pub Option<Identity>);

fn reject(status: StatusCode, message: &str) -> Rejection {
    (status, Json(ErrorResponse::error(message)))
}

/// `token` cookie first, then `Authorization: Bearer`.
pub fn extract_token(cookie_jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    cookie_jar
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| auth_value.strip_prefix("Bearer "))
                .map(|token| token.trim().to_owned())
        })
        .filter(|token| !token.is_empty())
}

pub async fn auth_middleware(
    cookie_jar: CookieJar,
    Extension(identity_service): Extension<DynIdentityService>,
    mut req: Request<Body>,
    next: Next,
) -> Result<impl IntoResponse, Rejection> {
    let Some(token) = extract_token(&cookie_jar, req.headers()) else {
        return Err(reject(
            StatusCode::UNAUTHORIZED,
            "You are not logged in, please provide token",
        ));
    };

    let identity = identity_service.verify_token(&token).map_err(|err| {
        warn!("⚠️ Rejected token: {err}");
        reject(StatusCode::UNAUTHORIZED, "Invalid token")
    })?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Must run after `auth_middleware`.
pub async fn require_admin(
    Extension(identity): Extension<Identity>,
    req: Request<Body>,
    next: Next,
) -> Result<impl IntoResponse, Rejection> {
    if !identity.is_admin() {
        warn!("⚠️ {} tried to reach an admin route", identity.email);
        return Err(reject(StatusCode::FORBIDDEN, "Admin access required"));
    }

    Ok(next.run(req).await)
}

/// Never rejects; an absent or invalid token yields `MaybeIdentity(None)`.
pub async fn optional_auth_middleware(
    cookie_jar: CookieJar,
    Extension(identity_service): Extension<DynIdentityService>,
    mut req: Request<Body>,
    next: Next,
) -> impl IntoResponse {
    let identity = extract_token(&cookie_jar, req.headers())
        .and_then(|token| identity_service.verify_token(&token).ok());

    req.extensions_mut().insert(MaybeIdentity(identity));

    next.run(req).await
}
