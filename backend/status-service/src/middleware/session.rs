use crate::config::SessionConfig;
use crate::context::UserId;
use crate::error::AppError;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

/// Cookie set by the identity provider's frontend SDK.
pub const SESSION_COOKIE: &str = "__session";

/// Claims we read from a session token. Other claims are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Identity-provider user id
    pub sub: String,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>,
    /// Session id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

/// Verifies session tokens against the configured key.
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn from_config(cfg: &SessionConfig) -> Result<Self, String> {
        let (key, algorithm) = match (&cfg.public_key_pem, &cfg.hmac_secret) {
            (Some(pem), _) => (
                DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| format!("invalid SESSION_JWT_PUBLIC_KEY: {}", e))?,
                Algorithm::RS256,
            ),
            (None, Some(secret)) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            (None, None) => {
                return Err(
                    "either SESSION_JWT_PUBLIC_KEY or SESSION_JWT_SECRET must be set".to_string(),
                )
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = 5;
        if let Some(issuer) = &cfg.issuer {
            validation.set_issuer(&[issuer.as_str()]);
        }

        Ok(Self { key, validation })
    }

    pub fn verify(&self, token: &str) -> Result<UserId, AppError> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!("session token rejected: {}", e);
            AppError::Unauthenticated("Invalid or expired session".to_string())
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(AppError::Unauthenticated(
                "Session has no subject".to_string(),
            ));
        }

        Ok(UserId(data.claims.sub))
    }
}

/// Pull a session token from `Authorization: Bearer` or the session cookie.
fn extract_token(req: &ServiceRequest) -> Option<String> {
    if let Some(header) = req.headers().get("Authorization") {
        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string());
        if token.is_none() {
            tracing::debug!("ignoring Authorization header without a bearer token");
        }
        return token.filter(|t| !t.is_empty());
    }

    req.cookie(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Session gate.
///
/// A valid token attaches the caller's `UserId` to the request. A missing, malformed
/// or expired token attaches nothing: public procedures still answer, and procedures
/// that need a caller reject the request themselves.
#[derive(Clone)]
pub struct SessionMiddleware {
    verifier: Arc<SessionVerifier>,
}

impl SessionMiddleware {
    pub fn new(verifier: Arc<SessionVerifier>) -> Self {
        Self { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
            verifier: self.verifier.clone(),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    verifier: Arc<SessionVerifier>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let verifier = self.verifier.clone();

        Box::pin(async move {
            if let Some(token) = extract_token(&req) {
                match verifier.verify(&token) {
                    Ok(user_id) => {
                        req.extensions_mut().insert(user_id);
                    }
                    Err(err) => tracing::debug!(error = %err, "proceeding without a caller"),
                }
            }

            service.call(req).await
        })
    }
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<UserId>()
                .cloned()
                .ok_or_else(|| AppError::Unauthenticated("User not authenticated".to_string()).into()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-session-secret";

    fn verifier(issuer: Option<&str>) -> SessionVerifier {
        SessionVerifier::from_config(&SessionConfig {
            public_key_pem: None,
            hmac_secret: Some(SECRET.to_string()),
            issuer: issuer.map(str::to_string),
        })
        .unwrap()
    }

    fn token(sub: &str, exp_offset_secs: i64, iss: Option<&str>) -> String {
        #[derive(Serialize)]
        struct Claims<'a> {
            sub: &'a str,
            exp: i64,
            #[serde(skip_serializing_if = "Option::is_none")]
            iss: Option<&'a str>,
        }
        let exp = chrono::Utc::now().timestamp() + exp_offset_secs;
        encode(
            &Header::new(Algorithm::HS256),
            &Claims { sub, exp, iss },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_yields_subject() {
        let user = verifier(None).verify(&token("user_2abc", 300, None)).unwrap();
        assert_eq!(user, UserId("user_2abc".to_string()));
    }

    #[test]
    fn test_expired_token_rejected() {
        let err = verifier(None)
            .verify(&token("user_2abc", -3600, None))
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let v = verifier(Some("https://clerk.status.dev"));
        assert!(v
            .verify(&token("user_2abc", 300, Some("https://evil.example")))
            .is_err());
        assert!(v
            .verify(&token("user_2abc", 300, Some("https://clerk.status.dev")))
            .is_ok());
    }

    #[test]
    fn test_missing_key_material_is_config_error() {
        assert!(SessionVerifier::from_config(&SessionConfig::default()).is_err());
    }
}
