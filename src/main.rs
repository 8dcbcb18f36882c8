use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use querybar::autocomplete::Autocompleter;
use querybar::config::{self, Config};
use querybar::session::{Motion, SearchSession};
use querybar::source::{ApiSource, OfflineSource, SuggestionSource};

const HELP: &str = "\
Type a query to replace the current one. Commands:
  :cursor N   move the cursor to byte offset N
  :left :right :home :end
              move the cursor by a character or to either end
  :wl :wr     move the cursor by a word
  :bs :del    delete before or after the cursor
  :next       highlight the next suggestion
  :prev       highlight the previous suggestion
  :accept     accept the highlighted suggestion
  :pick N     accept suggestion N
  :submit     run the search
  :clear      empty the query
  :quit       exit";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Query(String),
    Cursor(usize),
    Move(Motion),
    Delete { forward: bool },
    Next,
    Prev,
    Accept,
    Pick(usize),
    Submit,
    Clear,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let Some(rest) = line.strip_prefix(':') else {
        return Ok(Command::Query(line.to_string()));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let mut number = || {
        parts
            .next()
            .ok_or_else(|| format!(":{name} needs a number"))?
            .parse::<usize>()
            .map_err(|e| format!(":{name}: {e}"))
    };

    match name {
        "cursor" => Ok(Command::Cursor(number()?)),
        "pick" => Ok(Command::Pick(number()?)),
        "left" => Ok(Command::Move(Motion::Left)),
        "right" => Ok(Command::Move(Motion::Right)),
        "wl" => Ok(Command::Move(Motion::WordLeft)),
        "wr" => Ok(Command::Move(Motion::WordRight)),
        "home" => Ok(Command::Move(Motion::Start)),
        "end" => Ok(Command::Move(Motion::End)),
        "bs" => Ok(Command::Delete { forward: false }),
        "del" => Ok(Command::Delete { forward: true }),
        "next" => Ok(Command::Next),
        "prev" => Ok(Command::Prev),
        "accept" => Ok(Command::Accept),
        "submit" => Ok(Command::Submit),
        "clear" => Ok(Command::Clear),
        "help" => Ok(Command::Help),
        "quit" | "q" => Ok(Command::Quit),
        _ => Err(format!("Unknown command: :{name}")),
    }
}

fn render(session: &SearchSession) {
    let buffer = session.buffer();
    let (before, after) = buffer.content().split_at(buffer.cursor_byte_pos());
    println!("> {before}|{after}");

    let active = session.dropdown().active_index();
    let mut index = 0;
    for group in session.dropdown().groups() {
        println!("  {}", group.title);
        for item in &group.items {
            let marker = if active == Some(index) { '*' } else { ' ' };
            if item.description.is_empty() || item.description == item.value {
                println!("  {marker}{index:>3}  {}", item.value);
            } else {
                println!("  {marker}{index:>3}  {}  {}", item.value, item.description);
            }
            index += 1;
        }
    }
}

fn build_source(config: &Config) -> Arc<dyn SuggestionSource> {
    match &config.api {
        Some(api) => match ApiSource::new(api) {
            Ok(source) => Arc::new(source),
            Err(e) => {
                eprintln!("Ignoring [api] section: {e}");
                Arc::new(OfflineSource)
            }
        },
        None => Arc::new(OfflineSource),
    }
}

#[tokio::main]
async fn main() -> Result<(), io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.get(1).map(String::as_str) == Some("init") {
        return match Config::init() {
            Ok(true) => {
                println!(
                    "Created config file at: {}",
                    config::get_config_path().display()
                );
                Ok(())
            }
            Ok(false) => {
                println!(
                    "Config file already exists at: {}",
                    config::get_config_path().display()
                );
                Ok(())
            }
            Err(e) => {
                eprintln!("Failed to create config file: {e}");
                Err(io::Error::other(e.to_string()))
            }
        };
    }

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {e}");
        Config::default()
    });

    let engine = Arc::new(Autocompleter::from_config(build_source(&config), &config));
    let mut session = SearchSession::new(engine, args.get(1).map(String::as_str))
        .on_search(|query| println!("search: {query}"));

    session.refresh().await;
    render(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        match command {
            Command::Query(query) => {
                session.buffer_mut().set_content(&query);
                session.refresh().await;
            }
            Command::Cursor(pos) => session.set_cursor(pos).await,
            Command::Move(motion) => session.move_cursor(motion).await,
            Command::Delete { forward } => {
                session.delete_char(forward).await;
            }
            Command::Next => session.dropdown_mut().select_next(),
            Command::Prev => session.dropdown_mut().select_prev(),
            Command::Accept => {
                if !session.accept_active().await {
                    eprintln!("Nothing to accept");
                }
            }
            Command::Pick(index) => {
                if !session.pick(index).await {
                    eprintln!("No suggestion {index}");
                }
            }
            Command::Submit => {
                session.submit().await;
            }
            Command::Clear => {
                session.clear();
                session.refresh().await;
            }
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::Quit => break,
        }

        render(&session);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_queries() {
        assert_eq!(
            parse_command("is:unresolved brows"),
            Ok(Command::Query("is:unresolved brows".to_string()))
        );
    }

    #[test]
    fn parses_numeric_commands() {
        assert_eq!(parse_command(":cursor 4"), Ok(Command::Cursor(4)));
        assert_eq!(parse_command(":pick 0"), Ok(Command::Pick(0)));
        assert!(parse_command(":pick").is_err());
        assert!(parse_command(":pick x").is_err());
    }

    #[test]
    fn parses_editing_commands() {
        assert_eq!(parse_command(":home"), Ok(Command::Move(Motion::Start)));
        assert_eq!(parse_command(":wr"), Ok(Command::Move(Motion::WordRight)));
        assert_eq!(parse_command(":bs"), Ok(Command::Delete { forward: false }));
        assert_eq!(parse_command(":del"), Ok(Command::Delete { forward: true }));
    }

    #[test]
    fn rejects_unknown_commands() {
        assert_eq!(parse_command(":q"), Ok(Command::Quit));
        assert!(parse_command(":frobnicate").is_err());
    }
}
