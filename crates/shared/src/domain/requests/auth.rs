use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::model::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(custom(function = "trimmed_email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "trimmed_email"))]
    #[schema(example = "customer@example.com")]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[serde(default)]
    pub name: Option<String>,

    /// Only honoured for `admin` when the caller already holds an admin token.
    #[serde(default)]
    pub role: Option<UserRole>,
}

impl RegisterRequest {
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }
}

impl LoginRequest {
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn trimmed_email(value: &str) -> Result<(), ValidationError> {
    if normalize_email(value).validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email").with_message("Invalid email format".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        let req = RegisterRequest {
            email: "  Ana.Silva@Example.PT ".into(),
            password: "secret1".into(),
            name: None,
            role: None,
        };

        assert_eq!(req.normalized_email(), "ana.silva@example.pt");
    }

    #[test]
    fn padded_email_still_validates() {
        let req: RegisterRequest =
            serde_json::from_value(json!({ "email": " A@B.pt ", "password": "123456" })).unwrap();

        assert!(req.validate().is_ok());
    }

    #[test]
    fn short_password_fails_validation() {
        let req: RegisterRequest =
            serde_json::from_value(json!({ "email": "a@b.pt", "password": "12345" })).unwrap();

        assert!(req.validate().is_err());
    }

    #[test]
    fn unknown_role_is_a_parse_error() {
        let parsed = serde_json::from_value::<RegisterRequest>(
            json!({ "email": "a@b.pt", "password": "123456", "role": "root" }),
        );

        assert!(parsed.is_err());
    }
}
