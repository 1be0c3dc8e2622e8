use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::AUTHORIZATION,
    web::Data,
};
use serde_json::json;

use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::model::role::Role;

/// Why a request was turned away at the auth boundary.
#[derive(Debug, PartialEq)]
pub enum Rejection {
    MissingHeader,
    BadEncoding,
    NotBearer,
    InvalidToken(String),
    UnknownRole(u8),
}

impl Rejection {
    fn into_response(self) -> HttpResponse {
        let body = match self {
            Rejection::MissingHeader => json!({"error": "Missing Authorization header"}),
            Rejection::BadEncoding => json!({"error": "Invalid Authorization header encoding"}),
            Rejection::NotBearer => {
                json!({"error": "Authorization header must start with Bearer"})
            }
            Rejection::InvalidToken(details) => {
                json!({"error": "Invalid or expired token", "details": details})
            }
            Rejection::UnknownRole(_) => json!({"error": "Invalid role"}),
        };
        HttpResponse::Unauthorized().json(body)
    }
}

/// Resolves the caller from the `Authorization: Bearer <jwt>` header.
pub fn authenticate(req: &ServiceRequest, secret: &str) -> Result<AuthUser, Rejection> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(Rejection::MissingHeader)?
        .to_str()
        .map_err(|_| Rejection::BadEncoding)?;
    let token = header.strip_prefix("Bearer ").ok_or(Rejection::NotBearer)?;

    let claims = verify_token(token.trim(), secret).map_err(Rejection::InvalidToken)?;
    let role = Role::from_id(claims.role).ok_or(Rejection::UnknownRole(claims.role))?;

    Ok(AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
    })
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    match authenticate(&req, &config.jwt_secret) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.call(req).await
        }
        Err(rejection) => {
            tracing::debug!(?rejection, path = %req.path(), "Request rejected");
            let resp = rejection.into_response();
            Ok(req.into_response(resp.map_into_boxed_body()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Claims, TokenType};
    use actix_web::test::TestRequest;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn token(role: u8) -> String {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        let claims = Claims {
            user_id: 11,
            sub: "rina".into(),
            role,
            exp: (now + 600) as usize,
            token_type: TokenType::Access,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"k")).unwrap()
    }

    #[test]
    fn bearer_token_resolves_the_caller() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, format!("Bearer {}", token(2))))
            .to_srv_request();
        let user = authenticate(&req, "k").unwrap();
        assert_eq!(user.user_id, 11);
        assert_eq!(user.username, "rina");
        assert_eq!(user.role, Role::Hr);
    }

    #[test]
    fn header_problems_are_told_apart() {
        let req = TestRequest::default().to_srv_request();
        assert_eq!(authenticate(&req, "k").unwrap_err(), Rejection::MissingHeader);

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, format!("Token {}", token(3))))
            .to_srv_request();
        assert_eq!(authenticate(&req, "k").unwrap_err(), Rejection::NotBearer);

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, format!("Bearer {}", token(3))))
            .to_srv_request();
        assert!(matches!(
            authenticate(&req, "other-secret"),
            Err(Rejection::InvalidToken(_))
        ));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, format!("Bearer {}", token(9))))
            .to_srv_request();
        assert_eq!(authenticate(&req, "k").unwrap_err(), Rejection::UnknownRole(9));
    }
}
