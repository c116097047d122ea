use std::sync::Arc;

use anyhow::Context as _;
use chrono::{Duration, Utc};

use crate::store::KeyValueStore;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const AUTH_USER_KEY: &str = "auth_user";
pub const AUTH_EXPIRES_KEY: &str = "auth_expires_at";

/// How long a persisted profile stays valid.
pub fn default_profile_ttl() -> Duration {
    Duration::hours(24)
}

/// Explicit session context: loaded at startup, consulted with an expiry
/// check on every read, cleared on logout. Components that need auth state
/// take this instead of reaching for globals.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn access_token(&self) -> anyhow::Result<Option<String>> {
        self.store.get(ACCESS_TOKEN_KEY).await
    }

    pub async fn save_access_token(&self, token: &str) -> anyhow::Result<()> {
        self.store
            .set(ACCESS_TOKEN_KEY, token)
            .await
            .context("persist access token")
    }

    /// The persisted profile, or `None` when absent or expired. Expired
    /// entries are removed on read.
    pub async fn profile(&self) -> anyhow::Result<Option<serde_json::Value>> {
        let Some(raw_expiry) = self.store.get(AUTH_EXPIRES_KEY).await? else {
            return Ok(None);
        };
        let Some(raw_profile) = self.store.get(AUTH_USER_KEY).await? else {
            return Ok(None);
        };

        let expires_at: i64 = raw_expiry
            .trim()
            .parse()
            .context("parse auth expiry timestamp")?;
        if Utc::now().timestamp_millis() > expires_at {
            tracing::debug!("stored profile expired; clearing it");
            self.clear_profile().await?;
            return Ok(None);
        }

        let profile = serde_json::from_str(&raw_profile).context("parse stored profile")?;
        Ok(Some(profile))
    }

    pub async fn save_profile(
        &self,
        profile: &serde_json::Value,
        ttl: Duration,
    ) -> anyhow::Result<()> {
        let expires_at = Utc::now() + ttl;
        let json = serde_json::to_string(profile).context("serialize profile")?;
        self.store.set(AUTH_USER_KEY, &json).await?;
        self.store
            .set(AUTH_EXPIRES_KEY, &expires_at.timestamp_millis().to_string())
            .await?;
        Ok(())
    }

    async fn clear_profile(&self) -> anyhow::Result<()> {
        self.store.remove(AUTH_USER_KEY).await?;
        self.store.remove(AUTH_EXPIRES_KEY).await?;
        Ok(())
    }

    /// Logout: drop the token and profile.
    pub async fn clear(&self) -> anyhow::Result<()> {
        self.store.remove(ACCESS_TOKEN_KEY).await?;
        self.clear_profile().await
    }

    /// Remembered carousel page for a widget instance.
    pub async fn remembered_page(&self, widget: &str) -> anyhow::Result<Option<u32>> {
        let Some(raw) = self.store.get(&page_key(widget)).await? else {
            return Ok(None);
        };
        let page = raw.trim().parse().context("parse remembered page")?;
        Ok(Some(page))
    }

    pub async fn remember_page(&self, widget: &str, page: u32) -> anyhow::Result<()> {
        self.store.set(&page_key(widget), &page.to_string()).await
    }
}

fn page_key(widget: &str) -> String {
    format!("carousel_page:{widget}")
}
