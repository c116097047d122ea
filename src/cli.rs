use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Backend API base URL (env: HELPCENTER_API_BASE).
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Wiki origin whose links open in the guide viewer
    /// (env: HELPCENTER_WIKI_ORIGIN).
    #[arg(long, global = true)]
    pub wiki_origin: Option<String>,

    /// Directory for the on-disk session store (env: HELPCENTER_STORE_DIR).
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    /// Navigation menu JSON file (defaults to the bundled menu).
    #[arg(long, global = true)]
    pub menu: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a guide, transform it, and print the result.
    Guide(GuideArgs),
    /// Search the help center.
    Search(SearchArgs),
    /// List the service cards shown on the home screen.
    Services,
    /// Print the home screen carousel items.
    Home,
    /// Complete a login with the token from the identity-provider callback.
    Callback(CallbackArgs),
    /// Clear the stored session.
    Logout,
}

#[derive(Debug, Args)]
pub struct GuideArgs {
    /// Guide path, e.g. /help/network/wifi.
    #[arg(long)]
    pub path: String,

    /// Print the transformed HTML body instead of the outline.
    #[arg(long, default_value_t = false)]
    pub html: bool,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Search terms.
    #[arg(long)]
    pub query: String,

    /// Maximum number of hits to print.
    #[arg(long, default_value_t = 5)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct CallbackArgs {
    /// One-time token from the callback URL.
    #[arg(long)]
    pub token: String,
}
