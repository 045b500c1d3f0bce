// middleware.rs
//
// Identity is established upstream (gateway-verified); requests arrive with
// trusted x-user-id / x-user-role headers that are mapped into an AuthContext
// extension for the handlers.
use axum::{extract::Request, middleware::Next, response::IntoResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HttpError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Client,
    Lawyer,
    Admin,
}

impl UserRole {
    pub fn from_header(value: &str) -> Option<Self> {
        match value {
            "client" => Some(UserRole::Client),
            "lawyer" => Some(UserRole::Lawyer),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: UserRole,
}

pub async fn auth(mut req: Request, next: Next) -> Result<impl IntoResponse, HttpError> {
    let user_id = req
        .headers()
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HttpError::unauthorized("Missing x-user-id header".to_string()))?;

    let user_id = Uuid::parse_str(user_id)
        .map_err(|_| HttpError::unauthorized("Invalid x-user-id header".to_string()))?;

    let role = req
        .headers()
        .get("x-user-role")
        .and_then(|v| v.to_str().ok())
        .and_then(UserRole::from_header)
        .ok_or_else(|| HttpError::unauthorized("Missing or invalid x-user-role header".to_string()))?;

    req.extensions_mut().insert(AuthContext { user_id, role });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_header() {
        assert_eq!(UserRole::from_header("client"), Some(UserRole::Client));
        assert_eq!(UserRole::from_header("lawyer"), Some(UserRole::Lawyer));
        assert_eq!(UserRole::from_header("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_header("Admin"), None);
        assert_eq!(UserRole::from_header(""), None);
    }

    #[test]
    fn test_only_admin_is_admin() {
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Client.is_admin());
        assert!(!UserRole::Lawyer.is_admin());
    }
}
