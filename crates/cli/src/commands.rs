//! Line commands accepted on stdin.

use anyhow::{anyhow, bail, Context, Result};

use reelscout_core::{CatalogId, FilterSpec};

pub const HELP: &str = "\
Commands:
  type <text>        update search text (debounced)
  search <text>      search now
  filter [genre=<id>] [year=<yyyy>] [rating=<0-10>]
  clear              clear filters
  more               load the next page
  trending           refresh trending items
  details <id>       show item details
  fav <id>           toggle favorite
  favs               list favorites
  genres             list genres
  metrics            print metrics
  quit               exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Type(String),
    Search(String),
    Filter(FilterSpec),
    Clear,
    More,
    Trending,
    Details(CatalogId),
    Favorite(CatalogId),
    Favorites,
    Genres,
    Metrics,
    Help,
    Quit,
}

/// Parse one input line. Empty lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let command = match name.to_lowercase().as_str() {
        "type" | "t" => Command::Type(rest.to_string()),
        "search" | "s" => Command::Search(rest.to_string()),
        "filter" | "f" => Command::Filter(parse_filter(rest)?),
        "clear" => Command::Clear,
        "more" | "m" => Command::More,
        "trending" => Command::Trending,
        "details" | "d" => Command::Details(parse_id(rest)?),
        "fav" => Command::Favorite(parse_id(rest)?),
        "favs" => Command::Favorites,
        "genres" => Command::Genres,
        "metrics" => Command::Metrics,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => bail!("Unknown command: {} (try 'help')", other),
    };
    Ok(Some(command))
}

fn parse_id(arg: &str) -> Result<CatalogId> {
    arg.parse()
        .with_context(|| format!("Expected a numeric id, got '{}'", arg))
}

fn parse_filter(args: &str) -> Result<FilterSpec> {
    let mut spec = FilterSpec::new();
    for arg in args.split_whitespace() {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected key=value, got '{}'", arg))?;
        match key {
            "genre" => spec.genre = Some(value.parse().context("Invalid genre id")?),
            "year" => spec.year = Some(value.parse().context("Invalid year")?),
            "rating" => {
                let rating: u8 = value.parse().context("Invalid rating")?;
                if rating > 10 {
                    bail!("Rating must be between 0 and 10");
                }
                spec.min_rating = Some(rating);
            }
            other => bail!("Unknown filter: {}", other),
        }
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_parse_search_keeps_text() {
        let command = assert_ok!(parse("search  the dark knight "));
        assert_eq!(command, Some(Command::Search("the dark knight".to_string())));

        let command = assert_ok!(parse("type"));
        assert_eq!(command, Some(Command::Type(String::new())));
    }

    #[test]
    fn test_parse_filter() {
        let command = assert_ok!(parse("filter genre=28 year=2020 rating=7"));
        assert_eq!(
            command,
            Some(Command::Filter(
                FilterSpec::new()
                    .with_genre(28)
                    .with_year(2020)
                    .with_min_rating(7)
            ))
        );

        let command = assert_ok!(parse("filter"));
        assert_eq!(command, Some(Command::Filter(FilterSpec::new())));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_err!(parse("filter rating=11"));
        assert_err!(parse("filter colour=red"));
        assert_err!(parse("fav abc"));
        assert_err!(parse("dance"));
    }

    #[test]
    fn test_parse_blank_line() {
        assert_eq!(assert_ok!(parse("   ")), None);
    }
}
