use std::path::PathBuf;

use anyhow::Context as _;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://helpcenter.example.edu/";
pub const DEFAULT_WIKI_ORIGIN: &str = "https://wiki.example.edu/";

/// Runtime configuration. Flags win over environment variables, environment
/// variables win over the built-in defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: Url,
    pub wiki_origin: Url,
    pub store_dir: PathBuf,
    pub menu_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn resolve(
        api_base: Option<String>,
        wiki_origin: Option<String>,
        store_dir: Option<PathBuf>,
        menu_path: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let api_base = api_base
            .or_else(|| std::env::var("HELPCENTER_API_BASE").ok())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_owned());
        let wiki_origin = wiki_origin
            .or_else(|| std::env::var("HELPCENTER_WIKI_ORIGIN").ok())
            .unwrap_or_else(|| DEFAULT_WIKI_ORIGIN.to_owned());
        let store_dir = store_dir
            .or_else(|| std::env::var("HELPCENTER_STORE_DIR").ok().map(PathBuf::from))
            .unwrap_or_else(default_store_dir);

        Ok(Self {
            api_base: parse_http_url(&api_base).context("invalid api base url")?,
            wiki_origin: parse_http_url(&wiki_origin).context("invalid wiki origin url")?,
            store_dir,
            menu_path,
        })
    }
}

fn default_store_dir() -> PathBuf {
    std::env::temp_dir().join("helpcenter-session")
}

fn parse_http_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("parse url {raw}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("unsupported scheme {} in {raw}", url.scheme());
    }
    Ok(url)
}
