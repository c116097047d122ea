use std::time::Duration;

use anyhow::Context as _;
use serde::de::DeserializeOwned;
use url::Url;

use crate::formats::{
    ContentRecord, HomeApiItem, LoginResponse, SearchRecord, TokenResponse, UserInfoResponse,
};

pub const SEARCH_ENDPOINT: &str = "api/search";
pub const HOME_ENDPOINT: &str = "api/home";
pub const SERVICE_LIST_ENDPOINT: &str = "api/home/services";
pub const SERVICE_CONTENT_ENDPOINT: &str = "api/home/service/content";
pub const LOGIN_ENDPOINT: &str = "login/app/rest/keycloak/auth";
pub const ACCESS_TOKEN_ENDPOINT: &str = "login/app/rest/keycloak/token";
pub const USER_INFO_ENDPOINT: &str = "login/app/rest/keycloak/welcome";

/// Normalized fetch failures. The view layer only distinguishes "the request
/// never produced a usable response" from "the backend answered but had no
/// content for this identifier".
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed")]
    Transport(#[source] reqwest::Error),
    #[error("unexpected status: {0}")]
    Status(reqwest::StatusCode),
    #[error("invalid response body")]
    Decode(#[source] reqwest::Error),
    #[error("invalid request url")]
    BadUrl(#[from] url::ParseError),
    #[error("content not found")]
    NotFound,
}

impl FetchError {
    /// True when this failure means "well-formed response, nothing there".
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// A guide article as returned by the content endpoint.
#[derive(Debug, Clone)]
pub struct GuideContent {
    pub title: String,
    pub body: String,
}

/// Thin GET-only client for the help-center backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base: Url) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("build http client")?;
        Ok(Self { http, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        bearer: Option<&str>,
    ) -> Result<T, FetchError> {
        let url = self.base.join(endpoint)?;

        let mut request = self.http.get(url).query(query);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(FetchError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        response.json::<T>().await.map_err(FetchError::Decode)
    }

    /// Fetch one article body by its opaque content identifier. An empty
    /// response array or a record without a body is reported as not-found.
    pub async fn service_content(&self, uuid: &str) -> Result<GuideContent, FetchError> {
        let records: Vec<ContentRecord> = self
            .get_json(SERVICE_CONTENT_ENDPOINT, &[("uuid", uuid)], None)
            .await?;
        first_content(records)
    }

    pub async fn home(&self) -> Result<Vec<HomeApiItem>, FetchError> {
        self.get_json(HOME_ENDPOINT, &[], None).await
    }

    pub async fn services(&self) -> Result<Vec<HomeApiItem>, FetchError> {
        self.get_json(SERVICE_LIST_ENDPOINT, &[], None).await
    }

    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchRecord>, FetchError> {
        let limit = limit.to_string();
        self.get_json(SEARCH_ENDPOINT, &[("limit", limit.as_str()), ("query", query)], None)
            .await
    }

    /// Ask the identity provider for the redirect URL that starts a login.
    pub async fn login_url(&self) -> Result<Url, FetchError> {
        let response: LoginResponse = self.get_json(LOGIN_ENDPOINT, &[], None).await?;
        Ok(Url::parse(&response.result.url)?)
    }

    /// Exchange the callback token for an access token.
    pub async fn access_token(&self, callback_token: &str) -> Result<String, FetchError> {
        let response: TokenResponse = self
            .get_json(ACCESS_TOKEN_ENDPOINT, &[("token", callback_token)], None)
            .await?;
        match (response.success, response.result) {
            (true, Some(result)) => Ok(result.access_token),
            _ => Err(FetchError::NotFound),
        }
    }

    /// Fetch the authenticated user's profile with a bearer token.
    pub async fn user_info(&self, access_token: &str) -> Result<serde_json::Value, FetchError> {
        let response: UserInfoResponse = self
            .get_json(USER_INFO_ENDPOINT, &[], Some(access_token))
            .await?;
        match (response.success, response.result) {
            (true, Some(profile)) => Ok(profile),
            _ => Err(FetchError::NotFound),
        }
    }
}

fn first_content(records: Vec<ContentRecord>) -> Result<GuideContent, FetchError> {
    let Some(first) = records.into_iter().next() else {
        return Err(FetchError::NotFound);
    };
    match first.body {
        Some(body) if !body.trim().is_empty() => Ok(GuideContent {
            title: first.title,
            body,
        }),
        _ => Err(FetchError::NotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, body: Option<&str>) -> ContentRecord {
        ContentRecord {
            title: title.to_owned(),
            body: body.map(str::to_owned),
        }
    }

    #[test]
    fn first_content_takes_the_first_record() {
        let content = first_content(vec![
            record("WiFi", Some("<p>campus wifi</p>")),
            record("stale", Some("<p>ignored</p>")),
        ])
        .unwrap();
        assert_eq!(content.title, "WiFi");
        assert_eq!(content.body, "<p>campus wifi</p>");
    }

    #[test]
    fn empty_array_is_not_found() {
        let err = first_content(Vec::new()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn missing_or_blank_body_is_not_found() {
        assert!(first_content(vec![record("t", None)]).unwrap_err().is_not_found());
        assert!(
            first_content(vec![record("t", Some("  \n"))])
                .unwrap_err()
                .is_not_found()
        );
    }
}
