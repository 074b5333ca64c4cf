use crate::{
    abstract_trait::JwtServiceTrait,
    errors::ServiceError,
    model::{Identity, User, UserRole},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ACCESS_TOKEN: &str = "access";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    pub token_type: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub jwt_secret: String,
    pub ttl: Duration,
}

impl JwtConfig {
    pub fn new(jwt_secret: &str, ttl_minutes: i64) -> Self {
        JwtConfig {
            jwt_secret: jwt_secret.to_string(),
            ttl: Duration::minutes(ttl_minutes),
        }
    }
}

impl JwtServiceTrait for JwtConfig {
    fn generate_token(&self, user: &User) -> Result<String, ServiceError> {
        let now = Utc::now();

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role(),
            token_type: ACCESS_TOKEN.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )
        .map_err(ServiceError::Jwt)
    }

    fn verify_token(&self, token: &str) -> Result<Identity, ServiceError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_ref());
        let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => ServiceError::TokenExpired,
                _ => ServiceError::Jwt(err),
            })?;

        let claims = token_data.claims;

        if claims.token_type != ACCESS_TOKEN {
            return Err(ServiceError::InvalidTokenType);
        }

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| ServiceError::InvalidTokenType)?;

        Ok(Identity {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "admin@alsa.pt".into(),
            password: "hash".into(),
            name: Some("Admin".into()),
            role: role.into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn token_round_trips_identity() {
        let jwt = JwtConfig::new("test-secret", 60);
        let admin = user("admin");

        let token = jwt.generate_token(&admin).unwrap();
        let identity = jwt.verify_token(&token).unwrap();

        assert_eq!(identity.user_id, admin.id);
        assert_eq!(identity.email, "admin@alsa.pt");
        assert!(identity.is_admin());
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let token = JwtConfig::new("one", 60).generate_token(&user("client")).unwrap();

        assert!(matches!(
            JwtConfig::new("two", 60).verify_token(&token),
            Err(ServiceError::Jwt(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = JwtConfig::new("secret", -10)
            .generate_token(&user("client"))
            .unwrap();

        assert!(matches!(
            JwtConfig::new("secret", 60).verify_token(&token),
            Err(ServiceError::TokenExpired)
        ));
    }
}
