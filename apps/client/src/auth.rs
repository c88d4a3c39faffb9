//! Registration and sign-in.
//!
//! Form rules are checked locally before anything is sent. Registration posts
//! the account, then performs the credential exchange so the new user ends up
//! signed in.

use serde_json::json;
use tracing::info;

use crate::errors::ClientError;
use crate::gateway::ResourceGateway;
use crate::models::{Role, User};
use crate::session::Credential;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.name.trim().is_empty() {
            return Err(ClientError::Validation("Name is required".to_string()));
        }
        if !self.email.contains('@') {
            return Err(ClientError::Validation(
                "A valid email address is required".to_string(),
            ));
        }
        if self.password != self.confirm_password {
            return Err(ClientError::Validation("Passwords do not match!".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ClientError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }
        Ok(())
    }
}

/// An identity and token ready for `SessionStore::login`.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: User,
    pub credential: Credential,
}

/// Exchanges email and password for an access token.
///
/// `anonymous` is a gateway carrying the public anonymous key.
pub async fn sign_in(
    anonymous: &ResourceGateway,
    email: &str,
    password: &str,
) -> Result<SignedIn, ClientError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ClientError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    let (user, credential) = anonymous
        .exchange_credentials(email.trim(), password)
        .await?;
    info!("Signed in {} as {}", user.email, user.role().as_str());
    Ok(SignedIn { user, credential })
}

/// Creates the account, then signs in with the same credentials.
pub async fn register(
    anonymous: &ResourceGateway,
    form: &RegistrationForm,
) -> Result<SignedIn, ClientError> {
    form.validate()?;

    anonymous
        .register_account(json!({
            "email": form.email.trim(),
            "password": form.password,
            "name": form.name.trim(),
            "role": form.role,
        }))
        .await?;
    info!("Account created for {}; signing in", form.email.trim());

    sign_in(anonymous, &form.email, &form.password).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ScriptedTransport;
    use crate::gateway::{Method, RequestBody};
    use serde_json::json;
    use std::sync::Arc;

    fn form() -> RegistrationForm {
        RegistrationForm {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "engine1".to_string(),
            confirm_password: "engine1".to_string(),
            role: Role::Hr,
        }
    }

    fn anonymous(transport: &Arc<ScriptedTransport>) -> ResourceGateway {
        ResourceGateway::new(transport.clone(), Credential::new("anon-key"))
    }

    #[test]
    fn test_mismatched_passwords_fail() {
        let mut f = form();
        f.confirm_password = "engine2".to_string();
        let err = f.validate().unwrap_err();
        assert_eq!(err.user_message(), "Passwords do not match!");
    }

    #[test]
    fn test_short_password_fails() {
        let mut f = form();
        f.password = "abc".to_string();
        f.confirm_password = "abc".to_string();
        let err = f.validate().unwrap_err();
        assert_eq!(
            err.user_message(),
            "Password must be at least 6 characters long"
        );
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_network() {
        let transport = Arc::new(ScriptedTransport::new());
        let mut f = form();
        f.password = "short".to_string();
        f.confirm_password = "short".to_string();

        assert!(register(&anonymous(&transport), &f).await.is_err());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_register_then_sign_in() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply(Method::Post, "auth/register", 200, json!({ "success": true }));
        transport.reply(
            Method::Post,
            "auth/login",
            200,
            json!({
                "success": true,
                "accessToken": "jwt-xyz",
                "user": {
                    "id": "hr-7",
                    "email": "ada@example.com",
                    "user_metadata": { "name": "Ada Lovelace", "role": "hr" }
                }
            }),
        );

        let signed_in = register(&anonymous(&transport), &form()).await.unwrap();
        assert!(signed_in.user.is_hr());
        assert_eq!(signed_in.credential.as_str(), "jwt-xyz");

        let requests = transport.requests();
        assert_eq!(requests[0].bearer, "anon-key");
        assert_eq!(
            requests[0].body,
            RequestBody::Json(json!({
                "email": "ada@example.com",
                "password": "engine1",
                "name": "Ada Lovelace",
                "role": "hr"
            }))
        );
    }

    #[tokio::test]
    async fn test_rejected_registration_surfaces_service_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply(
            Method::Post,
            "auth/register",
            400,
            json!({ "error": "User already registered" }),
        );

        let err = register(&anonymous(&transport), &form()).await.unwrap_err();
        assert_eq!(err.user_message(), "User already registered");
        assert_eq!(transport.count(Method::Post, "auth/login"), 0);
    }

    #[tokio::test]
    async fn test_bad_credentials_are_auth_errors() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply(
            Method::Post,
            "auth/login",
            200,
            json!({ "success": false, "error": "Invalid login credentials" }),
        );
        let err = sign_in(&anonymous(&transport), "ada@example.com", "wrong-pass")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Auth(msg) if msg == "Invalid login credentials"));
    }
}
