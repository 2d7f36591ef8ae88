use crate::app::App;
use crate::storage::Storage;
use crate::view;
use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error};

const HELP: &str = "\
Type a title to search. Commands:
  :open <n|id>   open (or close) a search result
  :back          close the detail view
  :rate <n>      rate the open movie
  :add           add the open movie to your watched list
  :rm <n|id>     remove a movie from your watched list
  :watched       show your watched list and stats
  :help          show this help
  :quit          leave
";

#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Position(usize),
    Id(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Query(String),
    Open(Target),
    Back,
    Rate(u8),
    Add,
    Remove(Target),
    Watched,
    Help,
    Quit,
}

fn parse_target(arg: &str) -> Result<Target, String> {
    if arg.is_empty() {
        return Err("expected a position or an id".to_string());
    }
    Ok(match arg.parse::<usize>() {
        Ok(position) => Target::Position(position),
        Err(_) => Target::Id(arg.to_string()),
    })
}

/// Lines starting with `:` are commands, everything else is a query.
pub fn parse_line(line: &str) -> Result<Command, String> {
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Command::Query(line.to_string()));
    };

    let (name, arg) = match command.trim().split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command.trim(), ""),
    };

    match name {
        "open" | "o" => Ok(Command::Open(parse_target(arg)?)),
        "back" | "b" => Ok(Command::Back),
        "rate" | "r" => arg
            .parse::<u8>()
            .map(Command::Rate)
            .map_err(|_| format!("'{}' is not a rating", arg)),
        "add" | "a" => Ok(Command::Add),
        "rm" | "remove" => Ok(Command::Remove(parse_target(arg)?)),
        "watched" | "w" => Ok(Command::Watched),
        "help" | "h" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command ':{}'", other)),
    }
}

fn render_watched_panel<S: Storage>(app: &App<S>) -> String {
    let mut out = view::render_stats(&app.stats());
    out.push_str(&view::render_watched(app.watched()));
    out
}

fn render_detail_panel<S: Storage>(app: &App<S>) -> String {
    let state = app.detail_state();
    let watched = state
        .selected_id
        .as_deref()
        .and_then(|id| app.watched_entry(id));
    view::render_detail(&state, watched, app.max_stars())
}

/// Applies one command and returns what to print, or `None` to stop.
pub async fn execute<S: Storage>(app: &mut App<S>, command: Command) -> Option<String> {
    debug!(?command, "Executing command");

    let output = match command {
        Command::Quit => return None,
        Command::Help => HELP.to_string(),
        Command::Query(query) => view::render_search(&app.set_query(&query).await),
        Command::Open(Target::Position(position)) => match app.select_result(position).await {
            Some(state) if state.selected_id.is_none() => render_watched_panel(app),
            Some(_) => render_detail_panel(app),
            None => format!(
                "No search result at position {} ({} results)\n",
                position,
                app.search_state().results.len()
            ),
        },
        Command::Open(Target::Id(id)) => {
            let state = app.select(&id).await;
            if state.selected_id.is_none() {
                render_watched_panel(app)
            } else {
                render_detail_panel(app)
            }
        }
        Command::Back => {
            app.back();
            render_watched_panel(app)
        }
        Command::Rate(rating) => match app.rate(rating) {
            Ok(_) => render_detail_panel(app),
            Err(e) => format!("{}\n", e),
        },
        Command::Add => match app.add_selected() {
            Ok(entry) => format!("Added {} to your watched list\n{}", entry.title, render_watched_panel(app)),
            Err(e) => format!("{}\n", e),
        },
        Command::Remove(target) => {
            let id = match target {
                Target::Id(id) => Some(id),
                Target::Position(position) => position
                    .checked_sub(1)
                    .and_then(|i| app.watched().get(i))
                    .map(|e| e.id.clone()),
            };
            match id {
                None => "No watched movie at that position\n".to_string(),
                Some(id) => match app.remove_watched(&id) {
                    Ok(0) => format!("{} is not in your watched list\n", id),
                    Ok(_) => render_watched_panel(app),
                    Err(e) => {
                        error!("Failed to update watched list: {:#}", e);
                        format!("Failed to update watched list: {}\n", e)
                    }
                },
            }
        }
        Command::Watched => render_watched_panel(app),
    };

    Some(output)
}

pub async fn run<S: Storage>(app: &mut App<S>) -> Result<()> {
    println!("🍿 Moviez\n{}", HELP);
    print!("{}", render_watched_panel(app));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match execute(app, command).await {
            Some(output) => print!("{}", output),
            None => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::omdb::fake::{detail, result, FakeApi};
    use crate::storage::MemoryStorage;
    use crate::watched::WatchedStore;
    use std::sync::Arc;

    fn app(api: FakeApi) -> App<MemoryStorage> {
        let store = WatchedStore::load(MemoryStorage::default()).unwrap();
        App::new(Arc::new(api), store, 3, 10)
    }

    #[test]
    fn parses_commands_and_queries() {
        assert_eq!(parse_line("inception"), Ok(Command::Query("inception".to_string())));
        assert_eq!(parse_line(":open 2"), Ok(Command::Open(Target::Position(2))));
        assert_eq!(
            parse_line(":o tt0133093"),
            Ok(Command::Open(Target::Id("tt0133093".to_string())))
        );
        assert_eq!(parse_line(":rate 7"), Ok(Command::Rate(7)));
        assert_eq!(parse_line(":add"), Ok(Command::Add));
        assert_eq!(parse_line(":rm 1"), Ok(Command::Remove(Target::Position(1))));
        assert_eq!(parse_line(":q"), Ok(Command::Quit));
        assert!(parse_line(":rate seven").is_err());
        assert!(parse_line(":open").is_err());
        assert!(parse_line(":dance").is_err());
    }

    #[test]
    fn empty_line_is_an_empty_query() {
        assert_eq!(parse_line(""), Ok(Command::Query(String::new())));
    }

    #[tokio::test]
    async fn session_flow() {
        let mut app = app(
            FakeApi::new()
                .with_search("inception", vec![result("tt1", "Inception"), result("tt2", "Inception 2")])
                .with_detail(detail("tt1", "Inception")),
        );

        let out = execute(&mut app, Command::Query("inception".to_string())).await.unwrap();
        assert!(out.contains("Found 2 results"));

        let out = execute(&mut app, Command::Open(Target::Position(1))).await.unwrap();
        assert!(out.contains("Christopher Nolan"));

        let out = execute(&mut app, Command::Add).await.unwrap();
        assert!(out.contains("Choose a rating"));

        execute(&mut app, Command::Rate(8)).await.unwrap();
        let out = execute(&mut app, Command::Add).await.unwrap();
        assert!(out.contains("Added Inception"));
        assert!(out.contains("1 movies"));

        let out = execute(&mut app, Command::Remove(Target::Position(1))).await.unwrap();
        assert!(out.contains("0 movies"));

        assert!(execute(&mut app, Command::Quit).await.is_none());
    }

    #[tokio::test]
    async fn reopening_same_result_closes_detail() {
        let mut app = app(
            FakeApi::new()
                .with_search("inception", vec![result("tt1", "Inception")])
                .with_detail(detail("tt1", "Inception")),
        );
        execute(&mut app, Command::Query("inception".to_string())).await;
        execute(&mut app, Command::Open(Target::Position(1))).await;
        let out = execute(&mut app, Command::Open(Target::Position(1))).await.unwrap();
        assert!(out.contains("Movies you watched"));
        assert_eq!(app.detail_state().selected_id, None);
    }

    #[tokio::test]
    async fn removing_unknown_id_reports_it() {
        let mut app = app(FakeApi::new());
        let out = execute(&mut app, Command::Remove(Target::Id("tt404".to_string())))
            .await
            .unwrap();
        assert!(out.contains("tt404 is not in your watched list"));
    }
}
