//! CLI tool to inspect storefront content through the frontend data client.
//!
//! Usage: `cargo run --bin kickoff-probe -- [--locale xx] <command>`
//!
//! The client mode and base URLs come from `config.yml` and the
//! `KICKOFF_*` environment variables, like the server.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use kickoff::client::{format_date, SiteClient};
use kickoff::config::Config;

#[derive(Parser)]
#[command(name = "kickoff-probe")]
#[command(about = "Fetch storefront content the way the site does")]
#[command(version)]
struct Cli {
    /// Content locale (en, it, es, fr, de)
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Configuration file
    #[arg(long, default_value = "config.yml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List articles, newest first
    Articles {
        #[arg(default_value_t = 1)]
        page: u32,
        #[arg(default_value_t = 10)]
        page_size: u32,
    },
    /// List the articles of one category
    Category {
        slug: String,
        #[arg(default_value_t = 1)]
        page: u32,
        #[arg(default_value_t = 10)]
        page_size: u32,
    },
    /// Print one article as JSON
    Article { slug: String },
    /// List every category
    Categories,
    /// Print the homepage sections as JSON
    Homepage,
    /// Print the global settings as JSON
    Global,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_with_env(&cli.config)?;
    let client = SiteClient::new(&config.client, &config.cms)?;
    if let Some(locale) = &cli.locale {
        client.set_locale(locale);
    }
    eprintln!("Using {:?} mode, locale {}", client.mode(), client.locale());

    match cli.command {
        Command::Articles { page, page_size } => {
            let list = client.get_articles(page, page_size).await?;
            for article in &list.data {
                let date = article.display_date().map(format_date).unwrap_or_default();
                println!("{:<40} {:<20} {}", article.slug, date, article.title);
            }
            if let Some(p) = list.meta.pagination {
                println!("page {}/{} ({} total)", p.page, p.page_count, p.total);
            }
        }
        Command::Category { slug, page, page_size } => {
            let list = client.get_articles_by_category(&slug, page, page_size).await?;
            for article in &list.data {
                println!("{:<40} {}", article.slug, article.title);
            }
        }
        Command::Article { slug } => match client.get_article_by_slug(&slug).await? {
            Some(article) => print_json(&article)?,
            None => bail!("article not found: {}", slug),
        },
        Command::Categories => {
            for category in client.get_categories().await?.data {
                println!("{:<24} {}", category.slug, category.name);
            }
        }
        Command::Homepage => print_json(&client.get_homepage().await)?,
        Command::Global => print_json(&client.get_global().await)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_articles_defaults() {
        let cli = Cli::try_parse_from(["kickoff-probe", "articles"]).unwrap();
        assert!(matches!(cli.command, Command::Articles { page: 1, page_size: 10 }));
        assert!(cli.locale.is_none());
    }

    #[test]
    fn test_global_locale_after_subcommand() {
        let cli = Cli::try_parse_from(["kickoff-probe", "category", "matchday", "2", "--locale", "it"]).unwrap();
        assert_eq!(cli.locale.as_deref(), Some("it"));
        match cli.command {
            Command::Category { slug, page, page_size } => {
                assert_eq!(slug, "matchday");
                assert_eq!(page, 2);
                assert_eq!(page_size, 10);
            }
            _ => panic!("expected category command"),
        }
    }

    #[test]
    fn test_invalid_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["kickoff-probe", "articles", "x"]).is_err());
        assert!(Cli::try_parse_from(["kickoff-probe", "article"]).is_err());
        assert!(Cli::try_parse_from(["kickoff-probe", "unknown"]).is_err());
    }

    #[test]
    fn test_help_is_generated() {
        let err = Cli::try_parse_from(["kickoff-probe", "--help"]).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
