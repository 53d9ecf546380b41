use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tirtha_core::{
    entities::{FavoriteKind, Language},
    gateways::auth::Credentials,
};

use crate::{
    app::App,
    config::Config,
    shell::{self, Command, MapTokenAction, Shell},
    views::Route,
};

#[derive(Debug, Parser)]
#[command(name = "tirtha", version, about = "Discover holy places, routes and events")]
pub struct Cli {
    /// Configuration file (default: tirtha.toml)
    #[arg(long, short, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print a page, e.g. `/cities/vns?tab=routes`
    Open {
        #[arg(default_value = "/", value_parser = parse_route)]
        path: Route,
        /// Print the data issues found while loading the page
        #[arg(long)]
        diagnostics: bool,
    },
    /// Browse interactively
    Shell {
        #[arg(default_value = "/", value_parser = parse_route)]
        path: Route,
    },
    /// Show or switch the language
    Lang {
        #[arg(value_parser = parse_language)]
        code: Option<Language>,
    },
    /// Show, store or remove the access token of the map provider
    MapToken {
        #[arg(conflicts_with = "clear")]
        token: Option<String>,
        #[arg(long)]
        clear: bool,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    /// Add or remove a favorite
    Favorite {
        #[arg(value_parser = parse_favorite_kind)]
        kind: FavoriteKind,
        id: String,
        #[arg(long)]
        remove: bool,
    },
}

fn parse_route(path: &str) -> Result<Route, String> {
    Route::parse(path).map_err(|err| err.to_string())
}

fn parse_language(code: &str) -> Result<Language, String> {
    shell::parse_language(code).map_err(|err| err.to_string())
}

fn parse_favorite_kind(kind: &str) -> Result<FavoriteKind, String> {
    shell::parse_favorite_kind(kind).map_err(|err| err.to_string())
}

impl Commands {
    fn into_command(self) -> Command {
        match self {
            Self::Open { path, .. } | Self::Shell { path } => Command::Open(path),
            Self::Lang { code } => Command::Language(code),
            Self::MapToken { token, clear } => Command::MapToken(match (token, clear) {
                (_, true) => MapTokenAction::Clear,
                (Some(token), false) => MapTokenAction::Set(token),
                (None, false) => MapTokenAction::Show,
            }),
            Self::Login { email, password } => Command::SignIn(Credentials { email, password }),
            Self::Logout => Command::SignOut,
            Self::Favorite { kind, id, remove } => Command::Favorite {
                kind,
                id: id.into(),
                remove,
            },
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli { config, command } = cli;
    let cfg = Config::try_load_from_file_or_default(config.as_ref())?;
    let app = App::try_new(&cfg)?;
    app.start().await;

    let command = command.unwrap_or(Commands::Shell { path: Route::Home });
    match command {
        Commands::Shell { path } => shell::run(&app, path).await,
        Commands::Open { path, diagnostics } => {
            let mut shell = Shell::new(&app);
            println!("{}", shell.execute(Command::Open(path)).await);
            if diagnostics {
                println!("{}", shell.execute(Command::Diagnostics).await);
            }
            Ok(())
        }
        command => {
            let mut shell = Shell::new(&app);
            println!("{}", shell.execute(command.into_command()).await);
            Ok(())
        }
    }
}
