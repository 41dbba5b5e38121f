/// Authentication extractors and utilities
use crate::{context::AppContext, error::PortalError};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Token scope for admin sessions
pub const SCOPE_ADMIN: &str = "admin";
/// Token scope for super admin sessions
pub const SCOPE_SUPER_ADMIN: &str = "super-admin";

/// JWT claims carried by portal bearer tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: admin or super admin id
    pub sub: String,
    /// Token scope ("admin" or "super-admin")
    pub scope: String,
    /// Token id, for log correlation
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issue a signed bearer token for the given subject and scope
pub fn issue_token(
    subject_id: i64,
    scope: &str,
    jwt_secret: &str,
    ttl_secs: i64,
) -> Result<String, PortalError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: subject_id.to_string(),
        scope: scope.to_string(),
        jti: uuid::Uuid::new_v4().to_string(),
        iat: now,
        exp: now + ttl_secs,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| PortalError::Internal(format!("Failed to issue token: {}", e)))
}

/// Verify a bearer token and return its claims
pub fn verify_token(token: &str, jwt_secret: &str) -> Result<Claims, PortalError> {
    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    // Allow some clock skew (5 minutes)
    validation.leeway = 300;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!("JWT verification failed: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    PortalError::Authentication("Token has expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    PortalError::Authentication("Invalid token signature".to_string())
                }
                _ => PortalError::Authentication(format!("Invalid token: {}", e)),
            }
        })
}

/// Extract a bearer token from the Authorization header
pub fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.to_string())
}

fn claims_from_parts(parts: &Parts, state: &AppContext, scope: &str) -> Result<i64, PortalError> {
    let token = extract_bearer_token(&parts.headers)
        .ok_or_else(|| PortalError::Authentication("Missing authorization header".to_string()))?;

    let claims = verify_token(&token, &state.config.authentication.jwt_secret)?;

    if claims.scope != scope {
        return Err(PortalError::Authorization(format!(
            "Requires {} scope",
            scope
        )));
    }

    claims
        .sub
        .parse::<i64>()
        .map_err(|_| PortalError::Authentication("Invalid subject claim".to_string()))
}

/// Authenticated admin context
#[derive(Debug, Clone)]
pub struct AdminAuthContext {
    pub admin_id: i64,
}

#[async_trait]
impl FromRequestParts<AppContext> for AdminAuthContext {
    type Rejection = PortalError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let admin_id = claims_from_parts(parts, state, SCOPE_ADMIN)?;
        Ok(AdminAuthContext { admin_id })
    }
}

/// Authenticated super admin context
#[derive(Debug, Clone)]
pub struct SuperAdminAuthContext {
    pub super_admin_id: i64,
}

#[async_trait]
impl FromRequestParts<AppContext> for SuperAdminAuthContext {
    type Rejection = PortalError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let super_admin_id = claims_from_parts(parts, state, SCOPE_SUPER_ADMIN)?;
        Ok(SuperAdminAuthContext { super_admin_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-test-secret-test-secret!";

    #[test]
    fn test_token_roundtrip() {
        let token = issue_token(42, SCOPE_ADMIN, SECRET, 3600).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.scope, SCOPE_ADMIN);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issue_token(42, SCOPE_ADMIN, SECRET, 3600).unwrap();
        let err = verify_token(&token, "another-secret-another-secret!!!").unwrap_err();
        assert!(matches!(err, PortalError::Authentication(_)));
    }

    #[test]
    fn test_scopes_are_distinct() {
        let admin_token = issue_token(1, SCOPE_ADMIN, SECRET, 3600).unwrap();
        let super_token = issue_token(1, SCOPE_SUPER_ADMIN, SECRET, 3600).unwrap();

        assert_eq!(verify_token(&admin_token, SECRET).unwrap().scope, "admin");
        assert_eq!(
            verify_token(&super_token, SECRET).unwrap().scope,
            "super-admin"
        );
    }
}
