//! Command parsing — turns a typed line into a [`Command`].
//!
//! Keywords are case-insensitive; titles, content, and learned text keep
//! the case they were typed in. Anything that is not a command is
//! conversation.

use chrono::{Local, NaiveDate};
use regex_lite::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use zalo_notes::UNTITLED;
use zalo_tasks::{TaskEdit, TaskStatus, parse_date_from};

static ADD_TASK: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?)(?:\s+due\s+(.+?))?(?:\s+priority\s+(\S+))?$").ok()
});

static EDIT_TASK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^(\S+)\s+(name|due|priority)\s+(.+)$").ok());

const DATE_HINT: &str = "Try YYYY-MM-DD, 'today', 'tomorrow', or '3 days from now'.";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,

    SaveNote { title: String, content: String },
    UpdateNote { title: String, content: String },
    ListNotes,
    ViewNote(String),
    DeleteNote(String),

    AddTask {
        name: String,
        due: Option<NaiveDate>,
        priority: Option<String>,
    },
    ListTasks(TaskStatus),
    CompleteTask(u32),
    EditTask { id: u32, edit: TaskEdit },
    Reminders,

    Learn {
        topic: String,
        info: String,
        context: Option<String>,
    },
    Forget {
        topic: String,
        response: Option<String>,
    },
    Export(Option<PathBuf>),
    Import(PathBuf),
    Topics,

    /// A recognized command with unusable arguments; holds the message to show.
    Invalid(String),
    /// Free-form conversation.
    Chat(String),
}

impl Command {
    /// Parse `line`, resolving relative due dates against the local date.
    pub fn parse(line: &str) -> Self {
        Self::parse_at(line, Local::now().date_naive())
    }

    /// Parse `line`, resolving relative due dates against `today`.
    pub fn parse_at(line: &str, today: NaiveDate) -> Self {
        let line = line.trim();

        if line.eq_ignore_ascii_case("help") {
            return Self::Help;
        }
        if line.eq_ignore_ascii_case("list notes") {
            return Self::ListNotes;
        }
        if line.eq_ignore_ascii_case("reminders") {
            return Self::Reminders;
        }
        if line.eq_ignore_ascii_case("/topics") {
            return Self::Topics;
        }

        if let Some(rest) = strip_keyword(line, "save note") {
            return parse_save_note(rest);
        }
        if let Some(rest) = strip_keyword(line, "update note") {
            return match rest.split_once(':') {
                Some((title, content)) if !title.trim().is_empty() => Self::UpdateNote {
                    title: title.trim().to_string(),
                    content: content.trim().to_string(),
                },
                _ => Self::Invalid("Usage: update note <title>: <content>".into()),
            };
        }
        if let Some(rest) = strip_keyword(line, "view note") {
            return required(rest, "Usage: view note <title>", Self::ViewNote);
        }
        if let Some(rest) = strip_keyword(line, "delete note") {
            return required(rest, "Usage: delete note <title>", Self::DeleteNote);
        }

        if let Some(rest) = strip_keyword(line, "add task") {
            return parse_add_task(rest, today);
        }
        if let Some(rest) = strip_keyword(line, "list tasks") {
            if rest.is_empty() {
                return Self::ListTasks(TaskStatus::Active);
            }
            return match rest.parse() {
                Ok(status) => Self::ListTasks(status),
                Err(message) => Self::Invalid(message),
            };
        }
        if let Some(rest) = strip_keyword(line, "complete task") {
            return match parse_id(rest) {
                Ok(id) => Self::CompleteTask(id),
                Err(message) => Self::Invalid(message),
            };
        }
        if let Some(rest) = strip_keyword(line, "edit task") {
            return parse_edit_task(rest, today);
        }

        if let Some(rest) = strip_keyword(line, "/learn") {
            return parse_learn(rest);
        }
        if let Some(rest) = strip_keyword(line, "/forget") {
            return match rest.split_once(char::is_whitespace) {
                Some((topic, response)) => Self::Forget {
                    topic: topic.to_string(),
                    response: Some(response.trim().to_string()),
                },
                None if !rest.is_empty() => Self::Forget {
                    topic: rest.to_string(),
                    response: None,
                },
                None => Self::Invalid("Usage: /forget <topic> [<response>]".into()),
            };
        }
        if let Some(rest) = strip_keyword(line, "/export") {
            return Self::Export((!rest.is_empty()).then(|| PathBuf::from(rest)));
        }
        if let Some(rest) = strip_keyword(line, "/import") {
            return required(rest, "Usage: /import <path>", |p| {
                Self::Import(PathBuf::from(p))
            });
        }

        Self::Chat(line.to_string())
    }
}

/// The remainder after `keyword` when `line` starts with it as whole words.
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let head = line.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &line[keyword.len()..];
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

fn required(rest: &str, usage: &str, build: impl FnOnce(String) -> Command) -> Command {
    if rest.is_empty() {
        Command::Invalid(usage.into())
    } else {
        build(rest.to_string())
    }
}

fn parse_save_note(rest: &str) -> Command {
    let (title, content) = match rest.split_once(':') {
        Some((title, content)) if !title.trim().is_empty() => (title.trim(), content.trim()),
        Some((_, content)) => (UNTITLED, content.trim()),
        None => (UNTITLED, rest),
    };
    if content.is_empty() {
        return Command::Invalid("Nothing to save. Usage: save note <title>: <content>".into());
    }
    Command::SaveNote {
        title: title.to_string(),
        content: content.to_string(),
    }
}

fn parse_add_task(rest: &str, today: NaiveDate) -> Command {
    let Some(caps) = ADD_TASK.as_ref().and_then(|re| re.captures(rest)) else {
        return Command::Invalid(
            "Usage: add task <name> [due <date>] [priority <level>]".into(),
        );
    };

    let due = match caps.get(2) {
        Some(raw) => match parse_date_from(raw.as_str(), today) {
            Some(date) => Some(date),
            None => {
                return Command::Invalid(format!(
                    "I couldn't understand the due date '{}'. {DATE_HINT}",
                    raw.as_str()
                ));
            }
        },
        None => None,
    };

    Command::AddTask {
        name: caps[1].trim().to_string(),
        due,
        priority: caps.get(3).map(|p| p.as_str().to_lowercase()),
    }
}

fn parse_edit_task(rest: &str, today: NaiveDate) -> Command {
    let Some(caps) = EDIT_TASK.as_ref().and_then(|re| re.captures(rest)) else {
        return Command::Invalid("Usage: edit task <id> name|due|priority <value>".into());
    };
    let id = match parse_id(&caps[1]) {
        Ok(id) => id,
        Err(message) => return Command::Invalid(message),
    };

    let value = caps[3].trim();
    let clears = value.eq_ignore_ascii_case("none");
    let edit = match caps[2].to_lowercase().as_str() {
        "name" => TaskEdit::Name(value.to_string()),
        "due" if clears => TaskEdit::Due(None),
        "due" => match parse_date_from(value, today) {
            Some(date) => TaskEdit::Due(Some(date)),
            None => {
                return Command::Invalid(format!(
                    "I couldn't understand the due date '{value}'. {DATE_HINT}"
                ));
            }
        },
        _ if clears => TaskEdit::Priority(None),
        _ => TaskEdit::Priority(Some(value.to_lowercase())),
    };

    Command::EditTask { id, edit }
}

fn parse_id(raw: &str) -> Result<u32, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("Task id must be a number, got '{}'.", raw.trim()))
}

fn parse_learn(rest: &str) -> Command {
    const USAGE: &str = "Usage: /learn <topic> <information> [--context <topic>]";

    let (body, context) = match rest.split_once("--context") {
        Some((body, ctx)) => {
            let ctx = ctx.trim();
            if ctx.is_empty() {
                return Command::Invalid(USAGE.into());
            }
            (body.trim(), Some(ctx.to_string()))
        }
        None => (rest, None),
    };

    match body.split_once(char::is_whitespace) {
        Some((topic, info)) if !info.trim().is_empty() => Command::Learn {
            topic: topic.to_string(),
            info: info.trim().to_string(),
            context,
        },
        _ => Command::Invalid(USAGE.into()),
    }
}
