//! Parsing of the line-oriented commands typed at the prompt.

use shared::domain::ExpenseId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    Page(u32),
    Limit(u32),
    Filter(String),
    ClearFilter,
    Amount(String),
    Description(String),
    /// Submit the form, optionally filling it first.
    Add {
        amount: Option<String>,
        description: Option<String>,
    },
    Delete(ExpenseId),
    Refresh,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),
    #[error("'{0}' needs {1}")]
    MissingArgument(&'static str, &'static str),
    #[error("'{0}' is not a valid number")]
    InvalidNumber(String),
}

pub const HELP: &str = "\
commands:
  next | prev              move one page
  page N                   jump to page N
  limit N                  show N expenses per page
  filter TEXT | clear      filter the current page
  amount X | desc TEXT     fill in the new expense form
  add [X TEXT]             submit the form
  delete ID                delete an expense
  refresh                  reload the current page
  help | quit";

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "next" | "n" => Command::Next,
        "prev" | "previous" | "p" => Command::Previous,
        "page" => Command::Page(parse_number(rest, "page", "a page number")?),
        "limit" => Command::Limit(parse_number(rest, "limit", "a page size")?),
        "filter" | "f" if rest.is_empty() => Command::ClearFilter,
        "filter" | "f" => Command::Filter(rest.to_string()),
        "clear" => Command::ClearFilter,
        "amount" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("amount", "a value"));
            }
            Command::Amount(rest.to_string())
        }
        "desc" | "description" => Command::Description(rest.to_string()),
        "add" => parse_add(rest),
        "delete" | "del" | "rm" => {
            let id = parse_number::<i64>(rest, "delete", "an expense id")?;
            Command::Delete(ExpenseId(id))
        }
        "refresh" | "r" => Command::Refresh,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_add(rest: &str) -> Command {
    if rest.is_empty() {
        return Command::Add {
            amount: None,
            description: None,
        };
    }
    let (amount, description) = match rest.split_once(char::is_whitespace) {
        Some((amount, description)) => (amount, Some(description.trim().to_string())),
        None => (rest, None),
    };
    Command::Add {
        amount: Some(amount.to_string()),
        description,
    }
}

fn parse_number<T: std::str::FromStr>(
    raw: &str,
    command: &'static str,
    what: &'static str,
) -> Result<T, CommandError> {
    if raw.is_empty() {
        return Err(CommandError::MissingArgument(command, what));
    }
    raw.parse::<T>()
        .map_err(|_| CommandError::InvalidNumber(raw.to_string()))
}
