//! Route table and login redirects.
//!
//! The gateway only reports [`GatewayError::Unauthorized`]; whether that sends
//! the user to the login page is decided here, from the page they are on.

use std::fmt;

use inventory_gateway::{GatewayError, SessionContext};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Signup,
    ForgotPassword,
    ResetConfirm { uid: String, token: String },
    Dashboard,
    Products,
    Sales,
    Branches,
    Stock,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::ResetConfirm { uid, token } => format!("/reset/{uid}/{token}"),
            Route::Dashboard => "/".to_string(),
            Route::Products => "/products".to_string(),
            Route::Sales => "/sales".to_string(),
            Route::Branches => "/branches".to_string(),
            Route::Stock => "/stock".to_string(),
        }
    }

    /// Parses an application path. A trailing slash is ignored.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        let route = match trimmed {
            "" => Route::Dashboard,
            "/login" => Route::Login,
            "/signup" => Route::Signup,
            "/forgot-password" => Route::ForgotPassword,
            "/products" => Route::Products,
            "/sales" => Route::Sales,
            "/branches" => Route::Branches,
            "/stock" => Route::Stock,
            other => {
                let rest = other.strip_prefix("/reset/")?;
                let (uid, token) = rest.split_once('/')?;
                if uid.is_empty() || token.is_empty() || token.contains('/') {
                    return None;
                }
                Route::ResetConfirm {
                    uid: uid.to_string(),
                    token: token.to_string(),
                }
            }
        };
        Some(route)
    }

    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Route::Login | Route::Signup | Route::ForgotPassword | Route::ResetConfirm { .. }
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

const PUBLIC_PREFIXES: [&str; 4] = ["/login", "/signup", "/forgot-password", "/reset"];

/// Whether `path` is one of the login, signup or password-reset pages.
pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    RedirectToLogin,
}

pub fn guard(route: &Route, session: &SessionContext) -> Navigation {
    if route.is_public() || session.is_authenticated() {
        Navigation::Proceed
    } else {
        Navigation::RedirectToLogin
    }
}

/// Reacts to a failed gateway call made from `current_path`.
///
/// Unauthorized on a protected page ends the session and redirects. Pages
/// whose path starts with a public prefix never redirect, even when the rest
/// of the path does not parse.
pub fn on_gateway_error(
    err: &GatewayError,
    current_path: &str,
    session: &SessionContext,
) -> Navigation {
    if !err.is_unauthorized() {
        return Navigation::Proceed;
    }
    if is_public_path(current_path) {
        return Navigation::Proceed;
    }
    info!(path = current_path, "session expired, redirecting to login");
    session.clear();
    Navigation::RedirectToLogin
}
