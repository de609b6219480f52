//! 命令行入口
//!
//! 解析参数后构建客户端与控制器，再分发到各命令模块。

pub mod auth_cmd;
pub mod explore_cmd;
pub mod prompt_cmd;

use crate::backends::SupabaseClient;
use crate::config::Config;
use crate::models::SortOrder;
use crate::services::{AuthService, ExploreFeed, PromptStore, SessionStore};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "promptdeck")]
#[command(version)]
#[command(about = "Keep, search and share your prompt library")]
#[command(long_about = "
promptdeck manages a personal library of prompts stored in a hosted
Supabase project. Prompts can be kept private or shared on the public
feed.

Example usage:
  promptdeck login --email you@example.com
  promptdeck add --title \"Summarize\" --content \"Summarize the text below\"
  promptdeck list --search summar
  promptdeck explore --oldest
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.promptdeck/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account
    Signup {
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign out and forget the session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Change the account password
    Passwd,
    /// Permanently delete the account
    DeleteAccount {
        /// Skip the confirmation question
        #[arg(long)]
        yes: bool,
    },
    /// List your prompts
    List {
        /// Case-insensitive filter on title and content
        #[arg(long)]
        search: Option<String>,
        /// Print card previews as HTML
        #[arg(long)]
        html: bool,
    },
    /// Render a prompt as an HTML document
    Show { id: String },
    /// Create a prompt
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Share on the public feed
        #[arg(long)]
        public: bool,
    },
    /// Replace a prompt's title, content and visibility
    Edit {
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        public: bool,
    },
    /// Delete a prompt
    Delete {
        id: String,
        /// Skip the confirmation question
        #[arg(long)]
        yes: bool,
    },
    /// Browse public prompts
    Explore {
        /// Oldest first instead of newest first
        #[arg(long)]
        oldest: bool,
        #[arg(long)]
        search: Option<String>,
    },
    /// Copy a prompt's content to the clipboard
    Copy { id: String },
}

fn confirm(question: &str) -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(question)
        .default(false)
        .interact()?)
}

fn email_or_prompt(email: Option<String>) -> Result<String> {
    match email {
        Some(email) => Ok(email),
        None => Ok(Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("Email")
            .interact_text()?),
    }
}

/// Hidden input. With `confirm_label` set the password is asked twice and
/// re-asked until both entries match.
fn read_password(label: &str, confirm_label: Option<&str>) -> Result<String> {
    let theme = ColorfulTheme::default();
    let mut prompt = Password::with_theme(&theme).with_prompt(label);
    if let Some(confirm_label) = confirm_label {
        prompt = prompt.with_confirmation(confirm_label, "Passwords do not match");
    }
    Ok(prompt.interact()?)
}

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let client = SupabaseClient::from_config(&config).context("Supabase 配置无效")?;
    let sessions = SessionStore::from_config(&config);
    let mut auth = AuthService::new(Arc::new(client.clone())).with_session_store(sessions);
    tracing::debug!("[CLI] 使用后端 {}", client.base_url());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Signup { email } => {
            let email = email_or_prompt(email)?;
            let password = read_password("Password", Some("Confirm password"))?;
            auth_cmd::signup(&mut auth, &email, &password, &password, &mut out).await
        }
        Commands::Login { email } => {
            let email = email_or_prompt(email)?;
            let password = read_password("Password", None)?;
            auth_cmd::login(&mut auth, &email, &password, &mut out).await
        }
        Commands::Logout => auth_cmd::logout(&mut auth, &mut out).await,
        Commands::Whoami => auth_cmd::whoami(&mut auth, &mut out).await,
        Commands::Passwd => {
            auth.require_session()?;
            let password = read_password("New password", Some("Confirm new password"))?;
            auth_cmd::passwd(&auth, &password, &password, &mut out).await
        }
        Commands::DeleteAccount { yes } => {
            let remote = client.clone().with_access_token(auth.access_token());
            auth_cmd::delete_account(&mut auth, &remote, yes, confirm, &mut out).await
        }
        Commands::Explore { oldest, search } => {
            let remote = Arc::new(client.with_access_token(auth.access_token()));
            let mut feed = ExploreFeed::new(remote);
            let order = if oldest {
                SortOrder::Oldest
            } else {
                SortOrder::Newest
            };
            explore_cmd::explore(&mut feed, order, search.as_deref(), &mut out).await
        }
        command => {
            // 以下命令都操作当前用户自己的 prompt
            let session = auth.require_session()?;
            let user_id = session.user.id.clone();
            let remote = Arc::new(client.with_access_token(Some(session.access_token.clone())));
            let mut store = PromptStore::new(remote);
            run_prompt_command(command, &mut store, &user_id, &mut out).await
        }
    }
}

async fn run_prompt_command<W: Write>(
    command: Commands,
    store: &mut PromptStore<SupabaseClient>,
    user_id: &str,
    out: &mut W,
) -> Result<()> {
    match command {
        Commands::List { search, html } => {
            prompt_cmd::list(store, search.as_deref(), html, out).await
        }
        Commands::Show { id } => prompt_cmd::show(store, &id, out).await,
        Commands::Add {
            title,
            content,
            public,
        } => prompt_cmd::add(store, user_id, &title, &content, public, out).await,
        Commands::Edit {
            id,
            title,
            content,
            public,
        } => prompt_cmd::edit(store, &id, &title, &content, public, out).await,
        Commands::Delete { id, yes } => prompt_cmd::delete(store, &id, yes, confirm, out).await,
        Commands::Copy { id } => prompt_cmd::copy(store, &id, out).await,
        other => Err(anyhow!("not a prompt command: {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "promptdeck",
            "add",
            "--title",
            "Greeting",
            "--content",
            "Say hi",
            "--public",
        ])
        .unwrap();
        match cli.command {
            Commands::Add {
                title,
                content,
                public,
            } => {
                assert_eq!(title, "Greeting");
                assert_eq!(content, "Say hi");
                assert!(public);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "promptdeck",
            "delete",
            "42",
            "--yes",
            "--config",
            "/tmp/c.yaml",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.yaml")));
        assert!(matches!(cli.command, Commands::Delete { ref id, yes: true } if id == "42"));
    }

    #[test]
    fn test_parse_explore_and_delete_account() {
        let cli = Cli::try_parse_from(["promptdeck", "explore", "--oldest", "--search", "poem"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Explore { oldest: true, search: Some(ref q) } if q == "poem"
        ));

        let cli = Cli::try_parse_from(["promptdeck", "delete-account"]).unwrap();
        assert!(matches!(cli.command, Commands::DeleteAccount { yes: false }));
    }

    #[test]
    fn test_add_requires_title_and_content() {
        assert!(Cli::try_parse_from(["promptdeck", "add", "--title", "x"]).is_err());
    }
}
