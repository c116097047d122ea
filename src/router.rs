//! Maps location paths onto the application's top-level screens.

/// Top-level screens of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Categories,
    /// The guide viewer; `subpath` is the wiki path below `/guides`,
    /// normalized to start with `/` ("/" for the guides landing page).
    Guides { subpath: String },
    Faq,
    About,
    /// Identity-provider redirect target; carries the one-time token from
    /// the query string when present.
    Callback { token: Option<String> },
}

impl Route {
    /// Resolve a location into a route. `query` is the raw query string
    /// without the leading `?`. Unknown paths fall back to the home screen.
    pub fn parse(path: &str, query: &str) -> Route {
        let path = path.trim_end_matches('/');
        match path {
            "" | "/home" => Route::Home,
            "/categories" => Route::Categories,
            "/faq" => Route::Faq,
            "/about" => Route::About,
            "/callback" => Route::Callback {
                token: query_param(query, "token"),
            },
            _ => {
                if let Some(rest) = path.strip_prefix("/guides") {
                    if rest.is_empty() || rest.starts_with('/') {
                        let subpath = if rest.is_empty() { "/" } else { rest };
                        return Route::Guides {
                            subpath: subpath.to_owned(),
                        };
                    }
                }
                tracing::debug!(%path, "unknown path, falling back to home");
                Route::Home
            }
        }
    }
}

fn query_param(query: &str, name: &str) -> Option<String> {
    // Decoded per form rules ('+' is a space), matching what the identity
    // provider put into the redirect URL.
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
