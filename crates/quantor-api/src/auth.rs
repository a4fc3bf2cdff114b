use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::state::AppState;

/// One key from a JWKS document, as published by the dashboard's identity
/// provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Jwk {
    pub kid: String,
    pub kty: String,
    pub n: String,
    pub e: String,
    #[serde(default)]
    pub alg: Option<String>,
}

/// A fetched JWKS document — just the key set, cached whole per URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

/// Claims this service actually cares about; anything else in the token is
/// ignored.
#[derive(Debug, Clone, Deserialize)]
struct Claims {
    #[allow(dead_code)]
    sub: String,
    #[allow(dead_code)]
    exp: usize,
}

/// Bearer-JWT-against-cached-JWKS authentication middleware.
///
/// When `HQG_DASH_JWKS_URL` is unset the middleware is a no-op — this lets
/// the service run standalone (local dev, CI, load tests) without standing
/// up an identity provider. Health checks are always exempt.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let path = request.uri().path();
    if path.ends_with("/health") {
        return Ok(next.run(request).await);
    }

    let Some(jwks_url) = state.config.jwks_url.clone() else {
        return Ok(next.run(request).await);
    };

    let token = extract_bearer_token(&headers)?;
    let header = decode_header(&token).map_err(|_| AuthError::MalformedToken)?;
    let kid = header.kid.ok_or(AuthError::MalformedToken)?;

    let jwks = fetch_jwks(&state, &jwks_url).await?;
    let jwk = jwks
        .keys
        .iter()
        .find(|k| k.kid == kid)
        .ok_or(AuthError::UnknownKey)?;

    let decoding_key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
        .map_err(|_| AuthError::MalformedKey)?;
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = true;

    decode::<Claims>(&token, &decoding_key, &validation).map_err(|_| AuthError::InvalidToken)?;

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    auth.strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or(AuthError::MissingToken)
}

async fn fetch_jwks(state: &AppState, jwks_url: &str) -> Result<Jwks, AuthError> {
    {
        let mut cache = state.jwks_cache.lock().await;
        if let Some(jwks) = cache.get(jwks_url) {
            return Ok(jwks.clone());
        }
    }

    let jwks: Jwks = state
        .http_client
        .get(jwks_url)
        .send()
        .await
        .map_err(|_| AuthError::JwksUnavailable)?
        .json()
        .await
        .map_err(|_| AuthError::JwksUnavailable)?;

    state
        .jwks_cache
        .lock()
        .await
        .put(jwks_url.to_string(), jwks.clone());

    Ok(jwks)
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    MalformedToken,
    MalformedKey,
    UnknownKey,
    InvalidToken,
    JwksUnavailable,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "Missing bearer token. Provide via Authorization: Bearer <jwt> header.",
            ),
            AuthError::MalformedToken => (StatusCode::UNAUTHORIZED, "Malformed JWT."),
            AuthError::MalformedKey => (StatusCode::INTERNAL_SERVER_ERROR, "Malformed JWKS key."),
            AuthError::UnknownKey => (StatusCode::UNAUTHORIZED, "Unknown signing key."),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token."),
            AuthError::JwksUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "Could not fetch JWKS document.")
            }
        };

        (status, Json(json!({"success": false, "error": message}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_required() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", "Basic abc123".parse().unwrap());
        assert!(matches!(
            extract_bearer_token(&headers),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn empty_bearer_token_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", "Bearer ".parse().unwrap());
        assert!(matches!(
            extract_bearer_token(&headers),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn well_formed_bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");
    }
}
