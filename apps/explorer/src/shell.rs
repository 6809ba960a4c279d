//! Interactive browsing loop. Commands run as independent tasks so a slow
//! response can be superseded by a newer command; a renderer task prints every
//! published view change.

use std::sync::Arc;

use client_core::{Explorer, ExplorerEvent};
use shared::domain::{Category, MovieId, UnknownCategory};
use thiserror::Error;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::warn;

use crate::render::{render_detail, render_list, ImageLinks};

pub const HELP: &str = "\
commands:
  category <now_playing|popular|top_rated|upcoming>
  search <text>       search by title (empty text clears the search)
  clear               clear the search
  home                back to Now Playing
  next | prev         change page
  page <n>            jump to page n
  open <id>           show movie details
  back                close the details view
  refresh             reload the current page
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Category(Category),
    Search(String),
    Home,
    Next,
    Previous,
    Page(u32),
    Open(MovieId),
    Back,
    Refresh,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("'{0}' is not a valid number")]
    InvalidNumber(String),
    #[error(transparent)]
    Category(#[from] UnknownCategory),
}

pub fn parse_command(line: &str) -> Result<ShellCommand, CommandError> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(word, rest)| (word, rest.trim()))
        .unwrap_or((line, ""));

    match word.to_ascii_lowercase().as_str() {
        "" => Err(CommandError::Empty),
        "category" | "cat" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("category"));
            }
            Ok(ShellCommand::Category(rest.parse()?))
        }
        "search" | "s" => Ok(ShellCommand::Search(rest.to_string())),
        "clear" => Ok(ShellCommand::Search(String::new())),
        "home" => Ok(ShellCommand::Home),
        "next" | "n" => Ok(ShellCommand::Next),
        "prev" | "previous" | "p" => Ok(ShellCommand::Previous),
        "page" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("page"));
            }
            rest.parse()
                .map(ShellCommand::Page)
                .map_err(|_| CommandError::InvalidNumber(rest.to_string()))
        }
        "open" | "o" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("open"));
            }
            rest.parse()
                .map(|id| ShellCommand::Open(MovieId(id)))
                .map_err(|_| CommandError::InvalidNumber(rest.to_string()))
        }
        "back" => Ok(ShellCommand::Back),
        "refresh" | "r" => Ok(ShellCommand::Refresh),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

async fn execute(explorer: &Explorer, command: ShellCommand) {
    match command {
        ShellCommand::Category(category) => {
            explorer.select_category(category).await;
        }
        ShellCommand::Search(text) => {
            explorer.set_search_text(&text).await;
        }
        ShellCommand::Home => {
            explorer.go_home().await;
        }
        ShellCommand::Next => {
            explorer.next_page().await;
        }
        ShellCommand::Previous => {
            explorer.previous_page().await;
        }
        ShellCommand::Page(page) => {
            explorer.go_to_page(page).await;
        }
        ShellCommand::Open(id) => {
            explorer.load_detail(id).await;
        }
        ShellCommand::Back => {
            explorer.close_detail().await;
            let list = explorer.list_snapshot().await;
            println!("{}", render_list(&list));
        }
        ShellCommand::Refresh => {
            explorer.refresh().await;
        }
        ShellCommand::Help | ShellCommand::Quit => {}
    }
}

pub async fn run(explorer: Arc<Explorer>, images: ImageLinks) -> anyhow::Result<()> {
    let mut events = explorer.subscribe_events();
    let renderer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ExplorerEvent::ListChanged(snapshot)) => println!("{}", render_list(&snapshot)),
                Ok(ExplorerEvent::DetailChanged(snapshot)) => {
                    let rendered = render_detail(&snapshot, &images);
                    if !rendered.is_empty() {
                        println!("{rendered}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "renderer fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("{HELP}\n");
    tokio::spawn({
        let explorer = explorer.clone();
        async move {
            explorer.open().await;
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(ShellCommand::Quit) => break,
            Ok(ShellCommand::Help) => println!("{HELP}"),
            Ok(command) => {
                let explorer = explorer.clone();
                tokio::spawn(async move { execute(&explorer, command).await });
            }
            Err(CommandError::Empty) => {}
            Err(err) => eprintln!("{err}"),
        }
    }

    renderer.abort();
    Ok(())
}
