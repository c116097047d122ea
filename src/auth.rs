use std::time::Duration;

use anyhow::Context as _;
use tokio::sync::mpsc;
use url::Url;

use crate::api::ApiClient;
use crate::session::{Session, default_profile_ttl};

/// Message kind the login popup posts back when the identity provider
/// finished.
pub const LOGIN_SUCCESS: &str = "LOGIN_SUCCESS";

/// A message received from another window. Only the origin and the `type`
/// field matter to the auth flow.
#[derive(Debug, Clone)]
pub struct WindowMessage {
    pub origin: String,
    pub kind: String,
}

/// Wait for the first `LOGIN_SUCCESS` message from `expected_origin`.
///
/// One-shot by construction: the receiver is consumed, so the subscription
/// cannot outlive the wait. Messages from other origins or of other kinds
/// are ignored, and the whole wait is bounded by `deadline`.
pub async fn wait_for_login_signal(
    mut messages: mpsc::Receiver<WindowMessage>,
    expected_origin: &str,
    deadline: Duration,
) -> anyhow::Result<()> {
    let wait = async {
        while let Some(message) = messages.recv().await {
            if message.origin != expected_origin {
                tracing::debug!(origin = %message.origin, "ignoring message from foreign origin");
                continue;
            }
            if message.kind != LOGIN_SUCCESS {
                continue;
            }
            return Ok(());
        }
        anyhow::bail!("login window closed without a success message")
    };

    tokio::time::timeout(deadline, wait)
        .await
        .context("timed out waiting for login confirmation")?
}

/// The two legs of the login handshake. Popup opening is delegated to the
/// hosting shell via a callback; this module only sequences the exchanges.
pub struct LoginFlow<'a> {
    api: &'a ApiClient,
    session: &'a Session,
}

impl<'a> LoginFlow<'a> {
    pub fn new(api: &'a ApiClient, session: &'a Session) -> Self {
        Self { api, session }
    }

    /// First leg: ask the backend where to send the user and hand the URL to
    /// the popup opener.
    pub async fn begin(&self, open_window: impl FnOnce(&Url)) -> anyhow::Result<()> {
        let login_url = self.api.login_url().await.context("fetch login url")?;
        open_window(&login_url);
        Ok(())
    }

    /// Second leg, entered from the `/callback` route: exchange the callback
    /// token, persist the access token, then fetch and persist the profile
    /// with a 24-hour expiry.
    pub async fn complete(&self, callback_token: &str) -> anyhow::Result<()> {
        let access_token = self
            .api
            .access_token(callback_token)
            .await
            .context("exchange callback token")?;
        self.session.save_access_token(&access_token).await?;

        let profile = self
            .api
            .user_info(&access_token)
            .await
            .context("fetch user profile")?;
        self.session
            .save_profile(&profile, default_profile_ttl())
            .await
            .context("persist profile")?;

        Ok(())
    }
}
