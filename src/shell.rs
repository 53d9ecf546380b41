//! Interactive navigation in the terminal.

use thiserror::Error;
use tirtha_core::{
    entities::{FavoriteKind, Id, Language},
    gateways::auth::{Credentials, OAuthProvider},
};
use tokio::io::{self, AsyncBufReadExt as _, AsyncWriteExt as _, BufReader};

use crate::{
    app::App,
    views::{CityTab, Navigator, Notice, Page, Rendered, Route, RouteError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapTokenAction {
    Show,
    Set(String),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(Route),
    /// Switch the tab of the current city page
    Tab(CityTab),
    Back,
    Reload,
    /// Toggle the item of the current page
    ToggleFavorite,
    Favorite {
        kind: FavoriteKind,
        id: Id,
        remove: bool,
    },
    Language(Option<Language>),
    SignIn(Credentials),
    SignUp(Credentials),
    SignOut,
    OAuth(OAuthProvider),
    MapToken(MapTokenAction),
    Diagnostics,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command '{0}', try 'help'")]
    UnknownCommand(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error("Unsupported language '{0}'")]
    Language(String),
    #[error("Unknown favorite kind '{0}'")]
    FavoriteKind(String),
    #[error("Unknown provider '{0}'")]
    Provider(String),
}

const HELP: &str = "\
open <path>             open a page, e.g. /cities/vns?tab=map
cities | home | profile | auth
search <text>           search in all languages
tab <points|routes|events|map>
back | reload
fav [<kind> <id>]       toggle a favorite (kind: city, point, route, event)
unfav <kind> <id>       remove a favorite
lang [en|ru|hi]         show or switch the language
login <email> <password>
signup <email> <password>
logout
oauth <google|apple>    print the sign-in URL of a provider
map-token [<token>|--clear]
diagnostics             show recent data issues
quit";

fn parse_credentials(args: &[&str], usage: &'static str) -> Result<Credentials, ParseError> {
    match args {
        [email, password] => Ok(Credentials {
            email: (*email).to_owned(),
            password: (*password).to_owned(),
        }),
        _ => Err(ParseError::Usage(usage)),
    }
}

pub fn parse_language(code: &str) -> Result<Language, ParseError> {
    Language::parse_code(code).map_err(|_| ParseError::Language(code.to_owned()))
}

pub fn parse_favorite_kind(kind: &str) -> Result<FavoriteKind, ParseError> {
    // Accept the storage vocabulary as well
    let kind = if kind.eq_ignore_ascii_case("spot") {
        "point"
    } else {
        kind
    };
    kind.parse()
        .map_err(|_| ParseError::FavoriteKind(kind.to_owned()))
}

/// Parse one line of input.
///
/// Returns `None` for blank lines.
pub fn parse_command(line: &str) -> Option<Result<Command, ParseError>> {
    let mut words = line.split_whitespace();
    let name = words.next()?;
    let args: Vec<_> = words.collect();
    let command: Result<Command, ParseError> = match (name, args.as_slice()) {
        ("open" | "go", [path]) => Route::parse(path).map(Command::Open).map_err(Into::into),
        ("open" | "go", _) => Err(ParseError::Usage("open <path>")),
        (path, []) if path.starts_with('/') => {
            Route::parse(path).map(Command::Open).map_err(Into::into)
        }
        ("home", []) => Ok(Command::Open(Route::Home)),
        ("cities", []) => Ok(Command::Open(Route::Cities)),
        ("profile", []) => Ok(Command::Open(Route::Profile)),
        ("auth", []) => Ok(Command::Open(Route::Auth)),
        ("search", words) => Ok(Command::Open(Route::Search(words.join(" ")))),
        ("tab", [tab]) => tab
            .parse()
            .map(Command::Tab)
            .map_err(|_| RouteError::UnknownTab((*tab).to_owned()).into()),
        ("tab", _) => Err(ParseError::Usage("tab <points|routes|events|map>")),
        ("back", []) => Ok(Command::Back),
        ("reload", []) => Ok(Command::Reload),
        ("fav", []) => Ok(Command::ToggleFavorite),
        ("fav" | "unfav", [kind, id]) => parse_favorite_kind(kind).map(|kind| Command::Favorite {
            kind,
            id: (*id).into(),
            remove: name == "unfav",
        }),
        ("fav" | "unfav", _) => Err(ParseError::Usage("fav [<kind> <id>]")),
        ("lang", []) => Ok(Command::Language(None)),
        ("lang", [code]) => parse_language(code).map(|l| Command::Language(Some(l))),
        ("login", args) => {
            parse_credentials(args, "login <email> <password>").map(Command::SignIn)
        }
        ("signup", args) => {
            parse_credentials(args, "signup <email> <password>").map(Command::SignUp)
        }
        ("logout", []) => Ok(Command::SignOut),
        ("oauth", [provider]) => match provider.to_lowercase().as_str() {
            "google" => Ok(Command::OAuth(OAuthProvider::Google)),
            "apple" => Ok(Command::OAuth(OAuthProvider::Apple)),
            _ => Err(ParseError::Provider((*provider).to_owned())),
        },
        ("map-token", []) => Ok(Command::MapToken(MapTokenAction::Show)),
        ("map-token", ["--clear"]) => Ok(Command::MapToken(MapTokenAction::Clear)),
        ("map-token", [token]) => Ok(Command::MapToken(MapTokenAction::Set((*token).to_owned()))),
        ("diagnostics", []) => Ok(Command::Diagnostics),
        ("help" | "?", _) => Ok(Command::Help),
        ("quit" | "exit" | "q", []) => Ok(Command::Quit),
        (name, _) => Err(ParseError::UnknownCommand(name.to_owned())),
    };
    Some(command)
}

/// Executes commands against the application.
pub struct Shell<'a> {
    app: &'a App,
    nav: Navigator<'a>,
}

impl<'a> Shell<'a> {
    pub fn new(app: &'a App) -> Self {
        Self {
            app,
            nav: Navigator::new(app),
        }
    }

    fn render(&self, page: &Page) -> String {
        Rendered::new(page, &self.app.translator, &self.app.session).to_string()
    }

    fn notice(&self, notice: Notice) -> String {
        notice.display(&self.app.translator).to_string()
    }

    async fn reload_page(&mut self) -> Option<String> {
        let page = self.nav.reload().await?;
        Some(Rendered::new(page, &self.app.translator, &self.app.session).to_string())
    }

    /// Execute a command and return the text to show.
    pub async fn execute(&mut self, command: Command) -> String {
        let app = self.app;
        let tr = &app.translator;
        match command {
            Command::Open(route) => {
                let page = self.nav.open(route).await;
                Rendered::new(page, tr, &app.session).to_string()
            }
            Command::Tab(tab) => match self.nav.current() {
                Some(Route::City { id, .. }) => {
                    let route = Route::City { id: id.clone(), tab };
                    let page = self.nav.open(route).await;
                    Rendered::new(page, tr, &app.session).to_string()
                }
                _ => tr.t("common.not_found").to_owned(),
            },
            Command::Back => match self.nav.back().await {
                Some(page) => Rendered::new(page, tr, &app.session).to_string(),
                None => String::new(),
            },
            Command::Reload => self.reload_page().await.unwrap_or_default(),
            Command::ToggleFavorite => {
                let Some((kind, id)) = self.nav.page().and_then(Page::favorite_target) else {
                    return tr.t("common.not_found").to_owned();
                };
                let result = app.session.toggle_favorite(kind, &id).await;
                self.notice(Notice::favorite(&result))
            }
            Command::Favorite { kind, id, remove } => {
                let result = if remove {
                    app.session.remove_favorite(kind, &id).await
                } else {
                    app.session.add_favorite(kind, &id).await
                };
                self.notice(Notice::favorite(&result))
            }
            Command::Language(None) => tr
                .language_names()
                .into_iter()
                .map(|n| {
                    let marker = if n.language == tr.language() { '*' } else { ' ' };
                    format!("{marker} {} {}", n.language.code(), n.name)
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Command::Language(Some(language)) => {
                let notice = match tr.set_language(language) {
                    Ok(()) => Notice::success("language.changed"),
                    Err(err) => Notice::error("settings.error").with_detail(err.to_string()),
                };
                let mut output = self.notice(notice);
                if let Some(page) = self.reload_page().await {
                    output = format!("{output}\n\n{page}");
                }
                output
            }
            Command::SignIn(credentials) => {
                let result = app.session.sign_in_with_password(&credentials).await;
                self.notice(Notice::sign_in(&result))
            }
            Command::SignUp(credentials) => {
                let result = app.session.sign_up(&credentials).await;
                self.notice(Notice::sign_up(&result))
            }
            Command::SignOut => {
                let result = app.session.sign_out().await;
                self.notice(Notice::sign_out(&result))
            }
            Command::OAuth(provider) => match app.session.oauth_authorize_url(provider, None) {
                Ok(url) => url.to_string(),
                Err(err) => self.notice(Notice::sign_in(&Err(err))),
            },
            Command::MapToken(MapTokenAction::Show) => app
                .map_token()
                .unwrap_or_else(|| tr.t("map.token_required").to_owned()),
            Command::MapToken(MapTokenAction::Set(token)) => {
                self.notice(Notice::map_token(&app.set_map_token(&token)))
            }
            Command::MapToken(MapTokenAction::Clear) => {
                self.notice(Notice::map_token(&app.set_map_token("")))
            }
            Command::Diagnostics => {
                let recent = app.diagnostics.recent();
                if recent.is_empty() {
                    return tr.t("common.no_items").to_owned();
                }
                recent
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Command::Help => HELP.to_owned(),
            Command::Quit => String::new(),
        }
    }

    pub fn current_page(&self) -> Option<String> {
        self.nav.page().map(|page| self.render(page))
    }
}

/// Read commands from stdin until it is closed or the user quits.
///
/// Session changes pushed by the auth service are applied meanwhile.
pub async fn run(app: &App, start: Route) -> anyhow::Result<()> {
    let follow_auth_events = async {
        app.session.follow_auth_events().await;
        log::debug!("The auth service stopped sending events");
        std::future::pending::<anyhow::Result<()>>().await
    };
    tokio::select! {
        result = read_commands(app, start) => result,
        never = follow_auth_events => never,
    }
}

async fn read_commands(app: &App, start: Route) -> anyhow::Result<()> {
    let mut shell = Shell::new(app);
    let mut stdout = io::stdout();
    let mut lines = BufReader::new(io::stdin()).lines();

    let output = shell.execute(Command::Open(start)).await;
    stdout.write_all(format!("{output}\n").as_bytes()).await?;
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let output = match parse_command(&line) {
            None => continue,
            Some(Ok(Command::Quit)) => break,
            Some(Ok(command)) => shell.execute(command).await,
            Some(Err(err)) => err.to_string(),
        };
        if !output.is_empty() {
            stdout.write_all(format!("{output}\n").as_bytes()).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;

    fn parse(line: &str) -> Result<Command, ParseError> {
        parse_command(line).expect("a command")
    }

    #[test]
    fn parse_navigation() {
        assert!(parse_command("   ").is_none());
        assert_eq!(parse("/cities"), Ok(Command::Open(Route::Cities)));
        assert_eq!(parse("open /points/7"), Ok(Command::Open(Route::Point("7".into()))));
        assert_eq!(
            parse("search ganga  aarti"),
            Ok(Command::Open(Route::Search("ganga aarti".into())))
        );
        assert_eq!(parse("tab MAP"), Ok(Command::Tab(CityTab::Map)));
        assert!(matches!(parse("tab shops"), Err(ParseError::Route(RouteError::UnknownTab(_)))));
        assert!(matches!(parse("/nowhere"), Err(ParseError::Route(_))));
        assert_eq!(parse("dance"), Err(ParseError::UnknownCommand("dance".into())));
    }

    #[test]
    fn parse_favorites() {
        assert_eq!(parse("fav"), Ok(Command::ToggleFavorite));
        assert_eq!(
            parse("fav spot 7"),
            Ok(Command::Favorite {
                kind: FavoriteKind::Point,
                id: "7".into(),
                remove: false
            })
        );
        assert_eq!(
            parse("unfav route r1"),
            Ok(Command::Favorite {
                kind: FavoriteKind::Route,
                id: "r1".into(),
                remove: true
            })
        );
        assert!(matches!(parse("fav shop 1"), Err(ParseError::FavoriteKind(_))));
    }

    #[test]
    fn parse_settings_and_auth() {
        assert_eq!(parse("lang"), Ok(Command::Language(None)));
        assert_eq!(parse("lang hi"), Ok(Command::Language(Some(Language::Hi))));
        assert_eq!(parse("lang de"), Err(ParseError::Language("de".into())));
        assert_eq!(
            parse("map-token --clear"),
            Ok(Command::MapToken(MapTokenAction::Clear))
        );
        assert!(matches!(parse("login a@b.c"), Err(ParseError::Usage(_))));
        assert_eq!(parse("oauth Apple"), Ok(Command::OAuth(OAuthProvider::Apple)));
        assert_eq!(parse("q"), Ok(Command::Quit));
    }

    #[tokio::test]
    async fn favorite_the_current_page() {
        let (_, app) = test_app();
        let mut shell = Shell::new(&app);
        shell.execute(Command::Open(Route::Point("1".into()))).await;

        let output = shell.execute(Command::ToggleFavorite).await;
        assert_eq!(output, "ℹ Sign in to save favorites");

        let output = shell
            .execute(parse("login sita@example.org secret").unwrap())
            .await;
        assert_eq!(output, "✓ Signed in");
        let output = shell.execute(Command::ToggleFavorite).await;
        assert_eq!(output, "✓ Added to favorites");
        assert!(shell.current_page().unwrap().contains("Kashi Vishwanath"));
        let output = shell.execute(Command::Reload).await;
        assert!(output.starts_with("# ★ Kashi Vishwanath"));
        let output = shell.execute(Command::ToggleFavorite).await;
        assert_eq!(output, "✓ Removed from favorites");
    }

    #[tokio::test]
    async fn switch_language_and_tabs() {
        let (_, app) = test_app();
        let mut shell = Shell::new(&app);
        assert_eq!(
            shell.execute(Command::Tab(CityTab::Map)).await,
            "Not found"
        );
        shell.execute(Command::Open(Route::city("vns".into()))).await;
        let output = shell.execute(Command::Language(Some(Language::Hi))).await;
        assert!(output.starts_with("✓ भाषा बदल दी गई\n\n# वाराणसी"));
        let output = shell.execute(Command::Tab(CityTab::Map)).await;
        assert!(output.contains("[नक्शा]"));
        assert!(output.contains(app.translator.t("map.token_required")));
        let listing = shell.execute(Command::Language(None)).await;
        assert!(listing.lines().any(|l| l.starts_with("* hi")));
    }

    #[tokio::test]
    async fn manage_the_map_token() {
        let (_, app) = test_app();
        let mut shell = Shell::new(&app);
        let output = shell
            .execute(Command::MapToken(MapTokenAction::Set("pk.1".into())))
            .await;
        assert_eq!(output, "✓ Map token saved");
        assert_eq!(shell.execute(Command::MapToken(MapTokenAction::Show)).await, "pk.1");
        shell.execute(Command::MapToken(MapTokenAction::Clear)).await;
        assert!(app.map_token().is_none());
    }
}
