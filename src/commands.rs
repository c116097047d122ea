//! Implementations behind the CLI subcommands.

use std::sync::Arc;

use anyhow::Context as _;

use crate::api::ApiClient;
use crate::auth::LoginFlow;
use crate::cli::{CallbackArgs, GuideArgs, SearchArgs};
use crate::config::AppConfig;
use crate::controller::{GuideController, ViewState};
use crate::listing;
use crate::menu::MenuTree;
use crate::session::Session;
use crate::store::LocalFsStore;

fn load_menu(config: &AppConfig) -> anyhow::Result<MenuTree> {
    match &config.menu_path {
        Some(path) => MenuTree::from_file(path)
            .with_context(|| format!("load menu from {}", path.display())),
        None => MenuTree::bundled(),
    }
}

fn open_session(config: &AppConfig) -> Session {
    Session::new(Arc::new(LocalFsStore::new(&config.store_dir)))
}

pub async fn guide(config: &AppConfig, args: GuideArgs) -> anyhow::Result<()> {
    let menu = Arc::new(load_menu(config)?);
    let api = ApiClient::new(config.api_base.clone())?;
    let mut controller = GuideController::new(menu, api, config.wiki_origin.clone());

    controller.navigate(&args.path).await;

    match controller.state() {
        ViewState::Ready(article) => {
            let trail: Vec<&str> = controller
                .breadcrumbs()
                .iter()
                .map(|crumb| crumb.title.as_str())
                .collect();
            if !trail.is_empty() {
                println!("{}", trail.join(" > "));
            }
            println!("# {}", article.title);
            if args.html {
                println!("{}", article.html);
            } else {
                for heading in &article.headings {
                    let indent = "  ".repeat(usize::from(heading.level.saturating_sub(1)));
                    println!("{indent}- {} (#{})", heading.text, heading.identifier);
                }
            }
            Ok(())
        }
        ViewState::Error(message) => anyhow::bail!("{message}"),
        ViewState::Idle | ViewState::Loading => Ok(()),
    }
}

pub async fn search(config: &AppConfig, args: SearchArgs) -> anyhow::Result<()> {
    let api = ApiClient::new(config.api_base.clone())?;
    let records = api
        .search(&args.query, args.limit)
        .await
        .context("search request")?;
    let hits = listing::search_hits(records);

    tracing::info!(count = hits.len(), query = %args.query, "search finished");
    for hit in hits {
        println!("{}\t{}", hit.path, hit.title);
    }
    Ok(())
}

pub async fn services(config: &AppConfig) -> anyhow::Result<()> {
    let api = ApiClient::new(config.api_base.clone())?;
    let items = api.services().await.context("fetch service list")?;
    let cards = listing::service_cards(&items, &config.wiki_origin);

    for card in cards {
        println!("{}\t{}\t{}", card.id, card.title, card.link_to);
    }
    Ok(())
}

pub async fn home(config: &AppConfig) -> anyhow::Result<()> {
    let api = ApiClient::new(config.api_base.clone())?;
    let items = api.home().await.context("fetch home items")?;
    let cards = listing::service_cards(&items, &config.wiki_origin);

    for card in cards {
        println!("{}\t{}\t{}", card.id, card.title, card.link_to);
    }
    Ok(())
}

pub async fn callback(config: &AppConfig, args: CallbackArgs) -> anyhow::Result<()> {
    let api = ApiClient::new(config.api_base.clone())?;
    let session = open_session(config);
    let flow = LoginFlow::new(&api, &session);

    flow.complete(&args.token).await.context("complete login")?;
    tracing::info!("login completed");
    println!("logged in");
    Ok(())
}

pub async fn logout(config: &AppConfig) -> anyhow::Result<()> {
    let session = open_session(config);
    session.clear().await.context("clear session")?;
    println!("logged out");
    Ok(())
}
