use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

use crate::models::ids::UserId;

/// The authenticated account as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_staff: bool,
}

/// Body of `GET check-auth/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    #[serde(default)]
    pub user: Option<User>,
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Request body for creating an account.
#[derive(Debug, Serialize)]
pub struct SignupPayload {
    pub username: String,
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

/// Request body for completing a password reset from an emailed link.
#[derive(Debug, Serialize)]
pub struct PasswordResetConfirm {
    pub uid: String,
    pub token: String,
    #[serde(rename = "new_password1", serialize_with = "expose")]
    pub new_password: SecretString,
    #[serde(rename = "new_password2", serialize_with = "expose")]
    pub confirm_password: SecretString,
}

#[derive(Serialize)]
pub(crate) struct LoginBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct LoginResponse {
    pub user: User,
}
