//! Development-only login
//!
//! Compiled only with the `dev-login` feature and registered only in
//! development deployments. Accepts one fixed credential pair and hands out
//! a mock session token.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::synthesized::SyntheticRequest;

pub const DEV_USERNAME: &str = "devuser";
pub const DEV_PASSWORD: &str = "devpassword";

#[derive(Debug, Deserialize)]
pub struct DevLoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DevUser {
    pub user_name: &'static str,
    pub email: &'static str,
    pub display_name: &'static str,
    pub roles: [&'static str; 3],
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DevLoginResponse {
    Accepted {
        authenticated: bool,
        token: String,
        user: DevUser,
    },
    Rejected {
        authenticated: bool,
        message: &'static str,
    },
}

/// POST /api/auth/dev-login
pub fn dev_login(req: &SyntheticRequest<'_>) -> Response {
    let credentials = req
        .request
        .body
        .as_json()
        .and_then(|value| serde_json::from_value::<DevLoginRequest>(value.clone()).ok());

    match credentials {
        Some(c) if c.username == DEV_USERNAME && c.password == DEV_PASSWORD => {
            info!(username = %c.username, "Development login accepted");
            let body = DevLoginResponse::Accepted {
                authenticated: true,
                token: format!("dev-token-{}", uuid::Uuid::new_v4()),
                user: DevUser {
                    user_name: DEV_USERNAME,
                    email: "devuser@example.com",
                    display_name: "Dev User",
                    roles: ["Admin", "Manager", "User"],
                },
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        _ => {
            warn!("Development login rejected");
            let body = DevLoginResponse::Rejected {
                authenticated: false,
                message: "Invalid credentials",
            };
            (StatusCode::UNAUTHORIZED, Json(body)).into_response()
        }
    }
}
