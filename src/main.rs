use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    helpcenter::logging::init().context("init logging")?;

    let cli = helpcenter::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let config = helpcenter::config::AppConfig::resolve(
        cli.api_base,
        cli.wiki_origin,
        cli.store_dir,
        cli.menu,
    )
    .context("resolve configuration")?;

    match cli.command {
        helpcenter::cli::Command::Guide(args) => {
            helpcenter::commands::guide(&config, args).await.context("guide")?;
        }
        helpcenter::cli::Command::Search(args) => {
            helpcenter::commands::search(&config, args)
                .await
                .context("search")?;
        }
        helpcenter::cli::Command::Services => {
            helpcenter::commands::services(&config).await.context("services")?;
        }
        helpcenter::cli::Command::Home => {
            helpcenter::commands::home(&config).await.context("home")?;
        }
        helpcenter::cli::Command::Callback(args) => {
            helpcenter::commands::callback(&config, args)
                .await
                .context("callback")?;
        }
        helpcenter::cli::Command::Logout => {
            helpcenter::commands::logout(&config).await.context("logout")?;
        }
    }

    Ok(())
}
