use serde::{Deserialize, Serialize};

/// One record of the `api/home/service/content` response array. The backend
/// returns at most one usable record; extra records are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
}

/// One card of the `api/home` / `api/home/services` listing. The icon and
/// link fields carry pre-rendered HTML fragments, not plain values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeApiItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub field_services_icon: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub field_linkto: String,
}

/// One row of the `api/search` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub view_node: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub result: LoginResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResult {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub success: bool,
    pub result: Option<TokenResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResult {
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserInfoResponse {
    #[serde(default)]
    pub success: bool,
    pub result: Option<serde_json::Value>,
}
