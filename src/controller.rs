use std::sync::Arc;

use url::Url;

use crate::api::{ApiClient, FetchError, GuideContent};
use crate::headings::Heading;
use crate::menu::{Crumb, MenuTree};
use crate::transform::Transformer;

pub const NOT_FOUND_MESSAGE: &str = "Content not found";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load content";

/// What the guide view is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// No article selected (root path).
    Idle,
    /// A fetch is in flight for the current path.
    Loading,
    Ready(ArticleView),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleView {
    pub title: String,
    pub html: String,
    pub headings: Vec<Heading>,
}

/// Tags one navigation action. A fetch result is only applied when its
/// ticket still matches the controller's generation, so a response for a
/// superseded path is discarded on arrival.
#[derive(Debug, Clone)]
pub struct NavigationTicket {
    generation: u64,
    pub path: String,
    pub identifier: String,
}

/// Drives the guide view: resolves navigation paths against the menu,
/// fetches article bodies by identifier, runs the content transform, and
/// keeps the breadcrumb trail in sync with the current path.
pub struct GuideController {
    menu: Arc<MenuTree>,
    api: ApiClient,
    transformer: Transformer,
    wiki_origin: Url,
    state: ViewState,
    current_path: String,
    breadcrumbs: Vec<Crumb>,
    generation: u64,
}

impl GuideController {
    pub fn new(menu: Arc<MenuTree>, api: ApiClient, wiki_origin: Url) -> Self {
        Self {
            menu,
            api,
            transformer: Transformer::new(wiki_origin.clone()),
            wiki_origin,
            state: ViewState::Idle,
            current_path: "/".to_owned(),
            breadcrumbs: Vec::new(),
            generation: 0,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// Breadcrumb trail for the current path, root to leaf. Recomputed on
    /// every path change, never cached across navigations.
    pub fn breadcrumbs(&self) -> &[Crumb] {
        &self.breadcrumbs
    }

    /// Start a navigation. Returns the ticket for the fetch this navigation
    /// needs, or `None` when no fetch should happen (root path, or a path
    /// the menu does not know).
    pub fn begin_navigation(&mut self, path: &str) -> Option<NavigationTicket> {
        self.generation += 1;
        self.current_path = path.to_owned();
        self.breadcrumbs = self.menu.breadcrumbs(path).unwrap_or_default();

        if path == "/" || path.is_empty() {
            self.state = ViewState::Idle;
            return None;
        }

        let Some(entry) = self.menu.find_by_link(path) else {
            tracing::warn!(path, "navigation to a path the menu does not know");
            self.state = ViewState::Error(NOT_FOUND_MESSAGE.to_owned());
            return None;
        };

        self.state = ViewState::Loading;
        Some(NavigationTicket {
            generation: self.generation,
            path: path.to_owned(),
            identifier: entry.identifier.clone(),
        })
    }

    /// Apply the result of the fetch belonging to `ticket`. A stale ticket
    /// (another navigation started since) is discarded without touching the
    /// view.
    pub fn apply_fetch_result(
        &mut self,
        ticket: &NavigationTicket,
        result: Result<GuideContent, FetchError>,
    ) {
        if ticket.generation != self.generation {
            tracing::debug!(
                path = %ticket.path,
                generation = ticket.generation,
                current = self.generation,
                "discarding stale fetch result"
            );
            return;
        }

        match result {
            Ok(content) => {
                let article = self.transformer.transform(&content.body, |_| {});
                self.state = ViewState::Ready(ArticleView {
                    title: content.title,
                    html: article.html,
                    headings: article.headings,
                });
            }
            Err(err) if err.is_not_found() => {
                self.state = ViewState::Error(NOT_FOUND_MESSAGE.to_owned());
            }
            Err(err) => {
                tracing::warn!(path = %ticket.path, ?err, "guide fetch failed");
                self.state = ViewState::Error(LOAD_FAILED_MESSAGE.to_owned());
            }
        }
    }

    /// Navigate and fetch in one step.
    pub async fn navigate(&mut self, path: &str) {
        let Some(ticket) = self.begin_navigation(path) else {
            return;
        };
        let result = self.api.service_content(&ticket.identifier).await;
        self.apply_fetch_result(&ticket, result);
    }

    /// Re-enter navigation from an in-article link control. The href must
    /// carry the wiki origin; anything else is ignored (ordinary links are
    /// handled by the browser, not by us).
    pub fn article_link_path(&self, href: &str) -> Option<String> {
        let origin = self.wiki_origin.as_str().trim_end_matches('/');
        let rest = href.strip_prefix(origin)?;
        if rest.is_empty() {
            return Some("/".to_owned());
        }
        rest.starts_with('/').then(|| rest.to_owned())
    }
}
