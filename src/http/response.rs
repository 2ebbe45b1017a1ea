//! Response bodies.
//!
//! The payloads are fixed; only `/health` reflects configuration (the
//! service name).

use serde::{Deserialize, Serialize};

/// Plain-text body of `GET /`.
pub const GREETING: &str = "Hello from Grafana LGTM Test App!";

/// Body of the deliberate failure on `GET /api/error`.
pub const TEST_ERROR_MESSAGE: &str = "This is a test error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<String>,
}

impl Default for UsersResponse {
    fn default() -> Self {
        Self {
            users: ["user1", "user2", "user3"].map(String::from).to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsResponse {
    pub items: Vec<String>,
}

impl Default for ItemsResponse {
    fn default() -> Self {
        Self {
            items: ["item1", "item2", "item3", "item4"].map(String::from).to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn test_error() -> Self {
        Self {
            error: TEST_ERROR_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

impl HealthResponse {
    pub fn healthy(service: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            service: service.to_string(),
        }
    }
}
