//! Line commands accepted by the terminal dashboard.

use std::str::FromStr;

use crate::models::task::Category;

pub const HELP: &str = "\
commands:
  login | logout
  day <1-30>                select a day
  add <category> <text>     submit a category form for the selected day
  draft <category> <text>   fill a form without submitting
  edit <id>                 load a task into its form
  progress <id>             mark a task in process
  done <id>                 mark a task successful
  delete <id>               delete a task
  skip                      toggle mokel for the selected day
  show | help | quit
categories: todo, hapalan, planner, chat";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login,
    Logout,
    Day(i32),
    Add(Category, String),
    Draft(Category, String),
    Edit(i64),
    InProcess(i64),
    Success(i64),
    Delete(i64),
    Skip,
    Show,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}' (try `help`)")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

fn number<T: FromStr>(arg: &str, usage: &'static str) -> Result<T, CommandError> {
    arg.trim().parse().map_err(|_| CommandError::Usage(usage))
}

fn category_text(rest: &str, usage: &'static str) -> Result<(Category, String), CommandError> {
    let (tag, text) = rest.trim().split_once(' ').ok_or(CommandError::Usage(usage))?;
    let category = Category::parse(tag).ok_or(CommandError::Usage(usage))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    Ok((category, text.to_string()))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }
        let (name, rest) = line.split_once(' ').unwrap_or((line, ""));

        match name {
            "login" => Ok(Command::Login),
            "logout" => Ok(Command::Logout),
            "day" => number(rest, "day <1-30>").map(Command::Day),
            "add" => category_text(rest, "add <category> <text>")
                .map(|(c, text)| Command::Add(c, text)),
            "draft" => category_text(rest, "draft <category> <text>")
                .map(|(c, text)| Command::Draft(c, text)),
            "edit" => number(rest, "edit <id>").map(Command::Edit),
            "progress" => number(rest, "progress <id>").map(Command::InProcess),
            "done" => number(rest, "done <id>").map(Command::Success),
            "delete" => number(rest, "delete <id>").map(Command::Delete),
            "skip" | "mokel" => Ok(Command::Skip),
            "show" => Ok(Command::Show),
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
