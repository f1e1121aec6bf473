use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::validator::{HttpTokenValidator, TokenValidator, ValidationOutcome, ValidatorError};
use crate::config::OAuthConfig;
use crate::error::ApiError;

pub const MISSING_HEADER: &str = "Missing Authorization header";
pub const INVALID_HEADER: &str = "Invalid Authorization header";
pub const MALFORMED_HEADER: &str = "Malformed Authorization header";
pub const INVALID_TOKEN: &str = "Invalid or expired token";
pub const AUTH_UNAVAILABLE: &str = "Authentication service unavailable";

/// The Authorization header could not be read at all.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct MalformedHeader(pub String);

/// What the gateway does with one request.
#[derive(Debug, Clone, PartialEq)]
pub enum GateAction {
    PassThrough,
    Reject(ApiError),
    /// Ask the validator, sending this outbound Authorization value.
    Validate(HeaderValue),
}

/// Token gate in front of every non-excluded route.
pub struct OAuthGateway {
    excluded_prefixes: Vec<String>,
    validator: Arc<dyn TokenValidator>,
}

impl OAuthGateway {
    pub fn new(excluded_prefixes: Vec<String>, validator: Arc<dyn TokenValidator>) -> Self {
        Self {
            excluded_prefixes,
            validator,
        }
    }

    pub fn from_config(config: &OAuthConfig) -> Result<Self, ValidatorError> {
        let validator = HttpTokenValidator::from_config(config)?;
        Ok(Self::new(config.excluded_prefixes.clone(), Arc::new(validator)))
    }

    /// Root and allow-listed prefixes skip validation. Prefixes match
    /// case-insensitively; "/" is exact-only.
    pub fn is_excluded(&self, path: &str) -> bool {
        if path.is_empty() || path == "/" {
            return true;
        }
        self.excluded_prefixes
            .iter()
            .any(|prefix| starts_with_ignore_case(path, prefix))
    }

    pub fn decide(&self, path: &str, header: Option<&HeaderValue>) -> GateAction {
        if self.is_excluded(path) {
            return GateAction::PassThrough;
        }

        let Some(header) = header.filter(|h| !h.as_bytes().iter().all(u8::is_ascii_whitespace)) else {
            return GateAction::Reject(ApiError::unauthorized(MISSING_HEADER));
        };

        let token = std::str::from_utf8(header.as_bytes())
            .map_err(|e| MalformedHeader(e.to_string()))
            .and_then(extract_token);

        match token {
            Ok(Some(token)) => match outbound_header(&token) {
                Ok(value) => GateAction::Validate(value),
                Err(e) => {
                    error!("Error parsing Authorization header: {}", e);
                    GateAction::Reject(ApiError::bad_request(MALFORMED_HEADER))
                }
            },
            Ok(None) => {
                warn!("Could not extract token from Authorization header");
                GateAction::Reject(ApiError::unauthorized(INVALID_HEADER))
            }
            Err(e) => {
                error!("Error parsing Authorization header: {}", e);
                GateAction::Reject(ApiError::bad_request(MALFORMED_HEADER))
            }
        }
    }
}

fn starts_with_ignore_case(path: &str, prefix: &str) -> bool {
    path.len() >= prefix.len()
        && path.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Pull a bearer token out of a possibly sloppy Authorization value.
///
/// Accepts a raw OAuth token response (`{"access_token": ...}`), a
/// `Bearer <token>` value, or a comma/space separated list where the first
/// JWT-looking fragment wins. `Ok(None)` means nothing usable was found.
pub fn extract_token(raw: &str) -> Result<Option<String>, MalformedHeader> {
    let value = raw.trim();

    if value.starts_with('{') || value.contains("\"access_token\"") {
        if let Some(token) = token_from_json(value)? {
            return Ok(Some(token));
        }
    }

    if value.len() >= 7 && value.as_bytes()[..7].eq_ignore_ascii_case(b"bearer ") {
        return Ok(non_empty(value[7..].trim()));
    }

    let parts: Vec<&str> = value
        .split([',', ' '])
        .filter(|part| !part.is_empty())
        .collect();
    let chosen = parts
        .iter()
        .find(|part| part.matches('.').count() >= 2)
        .or_else(|| parts.first());

    Ok(chosen.and_then(|part| non_empty(part)))
}

/// Invalid JSON and a missing/empty `access_token` fall through to the other
/// heuristics. A non-object document or a non-string token is malformed.
fn token_from_json(value: &str) -> Result<Option<String>, MalformedHeader> {
    let Ok(parsed) = serde_json::from_str::<Value>(value) else {
        debug!("Authorization header looked like JSON but did not parse");
        return Ok(None);
    };

    let Value::Object(map) = parsed else {
        return Err(MalformedHeader("JSON Authorization value is not an object".to_string()));
    };

    match map.get("access_token") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(token)) => Ok(non_empty(token)),
        Some(_) => Err(MalformedHeader("access_token is not a string".to_string())),
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Every Authorization value on the request, joined with `,` the way a
/// repeated header folds into one.
pub fn combined_authorization(headers: &HeaderMap) -> Option<HeaderValue> {
    let values: Vec<&[u8]> = headers
        .get_all(AUTHORIZATION)
        .iter()
        .map(HeaderValue::as_bytes)
        .collect();

    match values.as_slice() {
        [] => None,
        [single] => HeaderValue::from_bytes(single).ok(),
        many => HeaderValue::from_bytes(&many.join(&b","[..])).ok(),
    }
}

/// Outbound value, built with the lenient byte constructor. Only control
/// characters are refused.
fn outbound_header(token: &str) -> Result<HeaderValue, MalformedHeader> {
    HeaderValue::from_bytes(format!("Bearer {}", token).as_bytes())
        .map_err(|e| MalformedHeader(e.to_string()))
}

/// Axum middleware wrapping [`OAuthGateway::decide`] and the validation call.
pub async fn oauth_validation_middleware(
    State(gateway): State<Arc<OAuthGateway>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let authorization = combined_authorization(request.headers());

    match gateway.decide(&path, authorization.as_ref()) {
        GateAction::PassThrough => next.run(request).await,
        GateAction::Reject(err) => err.into_response(),
        GateAction::Validate(authorization) => {
            match gateway.validator.validate(authorization).await {
                ValidationOutcome::Valid => next.run(request).await,
                ValidationOutcome::Rejected(status) => {
                    warn!("Token validation failed with status {} for request {}", status, path);
                    ApiError::unauthorized(INVALID_TOKEN).into_response()
                }
                ValidationOutcome::Unavailable(e) => {
                    error!("Error while validating token against oauth gateway: {}", e);
                    ApiError::service_unavailable(AUTH_UNAVAILABLE).into_response()
                }
            }
        }
    }
}
