use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// OAuth2 password grant form (`application/x-www-form-urlencoded`), shared
/// by registration and login. `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct PasswordForm {
    #[serde(default)]
    pub grant_type: Option<String>,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
}

impl PasswordForm {
    /// `grant_type` may be omitted, but if present it must be `password`.
    pub fn check_grant_type(&self) -> Result<(), ApiError> {
        match self.grant_type.as_deref() {
            None | Some("password") => Ok(()),
            Some(_) => Err(ApiError::UnsupportedGrantType),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(grant_type: Option<&str>) -> PasswordForm {
        PasswordForm {
            grant_type: grant_type.map(str::to_string),
            username: "a@x.com".into(),
            password: "pw1".into(),
            scope: String::new(),
            client_id: None,
            client_secret: None,
        }
    }

    #[test]
    fn grant_type_is_optional_but_must_be_password() {
        assert!(form(None).check_grant_type().is_ok());
        assert!(form(Some("password")).check_grant_type().is_ok());
        assert!(matches!(
            form(Some("client_credentials")).check_grant_type(),
            Err(ApiError::UnsupportedGrantType)
        ));
    }

    #[test]
    fn token_response_serialization() {
        let json = serde_json::to_value(TokenResponse::bearer("abc".into())).unwrap();
        assert_eq!(json, serde_json::json!({"access_token": "abc", "token_type": "bearer"}));
    }
}
