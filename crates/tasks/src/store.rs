//! Task store — active and completed task lists in one JSON document.
//!
//! Storage location: `~/.zalo/data/tasks.json` unless configured otherwise.
//!
//! ```json
//! { "active_tasks": [ ... ], "completed_tasks": [ ... ] }
//! ```

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};
use zalo_core::error::StorageError;
use zalo_core::storage::{read_document, write_document};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Active,
    Completed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(format!(
                "Invalid status '{other}'. Use 'active' or 'completed'."
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Option<String>,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Midnight at the start of the due date.
    fn due_at(&self) -> Option<NaiveDateTime> {
        self.due_date.map(|d| d.and_time(NaiveTime::MIN))
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID: {}, Name: {}", self.id, self.name)?;
        if let Some(due) = self.due_date {
            write!(f, ", Due: {due}")?;
        }
        if let Some(priority) = &self.priority {
            write!(f, ", Priority: {priority}")?;
        }
        Ok(())
    }
}

/// A single-field change to an active task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEdit {
    Name(String),
    Due(Option<NaiveDate>),
    Priority(Option<String>),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TaskLists {
    #[serde(default)]
    active_tasks: Vec<Task>,
    #[serde(default)]
    completed_tasks: Vec<Task>,
}

pub struct TaskStore {
    path: PathBuf,
    lists: TaskLists,
}

impl TaskStore {
    /// Load tasks from `path`, creating an empty file if none exists.
    ///
    /// Unreadable or corrupt files are logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lists = match read_document::<TaskLists>(&path) {
            Ok(Some(lists)) => lists,
            Ok(None) => {
                let lists = TaskLists::default();
                match write_document(&path, &lists) {
                    Ok(()) => info!(path = %path.display(), "Created empty task list"),
                    Err(e) => warn!(error = %e, "Could not create task file"),
                }
                lists
            }
            Err(e) => {
                warn!(error = %e, "Tasks unavailable, starting empty");
                TaskLists::default()
            }
        };
        debug!(
            path = %path.display(),
            active = lists.active_tasks.len(),
            completed = lists.completed_tasks.len(),
            "Task store loaded"
        );
        Self { path, lists }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add an active task and return its id.
    ///
    /// Ids are one past the highest id ever handed out, so completing a task
    /// never frees its id for reuse.
    pub fn add(
        &mut self,
        name: &str,
        due_date: Option<NaiveDate>,
        priority: Option<String>,
    ) -> Result<u32, StorageError> {
        let id = self
            .all_tasks()
            .map(|t| t.id)
            .max()
            .unwrap_or(0)
            + 1;

        let mut lists = self.lists.clone();
        lists.active_tasks.push(Task {
            id,
            name: name.trim().to_string(),
            created_at: Utc::now(),
            due_date,
            priority,
            status: TaskStatus::Active,
            completed_at: None,
        });
        self.commit(lists)?;
        Ok(id)
    }

    /// Apply `edit` to the active task `id`. Returns `false` if not found.
    pub fn edit(&mut self, id: u32, edit: TaskEdit) -> Result<bool, StorageError> {
        let mut lists = self.lists.clone();
        let Some(task) = lists.active_tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        match edit {
            TaskEdit::Name(name) => task.name = name,
            TaskEdit::Due(due) => task.due_date = due,
            TaskEdit::Priority(priority) => task.priority = priority,
        }
        self.commit(lists)?;
        Ok(true)
    }

    /// Tasks with `status`, optionally only those with the given priority.
    pub fn list(&self, status: TaskStatus, priority: Option<&str>) -> Vec<&Task> {
        let tasks = match status {
            TaskStatus::Active => &self.lists.active_tasks,
            TaskStatus::Completed => &self.lists.completed_tasks,
        };
        tasks
            .iter()
            .filter(|t| {
                priority.is_none_or(|p| {
                    t.priority.as_deref().is_some_and(|tp| tp.eq_ignore_ascii_case(p))
                })
            })
            .collect()
    }

    /// Move the active task `id` to the completed list.
    ///
    /// Returns `false` if no active task has that id.
    pub fn complete(&mut self, id: u32) -> Result<bool, StorageError> {
        let mut lists = self.lists.clone();
        let Some(pos) = lists.active_tasks.iter().position(|t| t.id == id) else {
            return Ok(false);
        };
        let mut task = lists.active_tasks.remove(pos);
        task.status = TaskStatus::Completed;
        task.completed_at = Some(Utc::now());
        lists.completed_tasks.push(task);
        self.commit(lists)?;
        Ok(true)
    }

    /// Active tasks due between `now` and `now + window`, inclusive.
    pub fn due_within(&self, now: NaiveDateTime, window: Duration) -> Vec<&Task> {
        self.lists
            .active_tasks
            .iter()
            .filter(|t| {
                t.due_at().is_some_and(|due| {
                    let remaining = due - now;
                    remaining >= Duration::zero() && remaining <= window
                })
            })
            .collect()
    }

    /// Human-readable reminder for tasks due within `window`.
    pub fn reminders(&self, now: NaiveDateTime, window: Duration) -> String {
        let due = self.due_within(now, window);
        if due.is_empty() {
            return format!(
                "No upcoming tasks due in the next {} hours.",
                window.num_hours()
            );
        }

        let mut lines = vec!["Upcoming Tasks:".to_string()];
        for task in due {
            if let Some(date) = task.due_date {
                lines.push(format!("- Task {}: {} (Due: {date})", task.id, task.name));
            }
        }
        lines.join("\n")
    }

    fn all_tasks(&self) -> impl Iterator<Item = &Task> {
        self.lists
            .active_tasks
            .iter()
            .chain(self.lists.completed_tasks.iter())
    }

    fn commit(&mut self, lists: TaskLists) -> Result<(), StorageError> {
        write_document(&self.path, &lists)?;
        self.lists = lists;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, TaskStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::open(dir.path().join("tasks.json"));
        (dir, store)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn at(d: u32, h: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn open_creates_file_with_both_lists() {
        let (dir, _tasks) = store();
        let content = std::fs::read_to_string(dir.path().join("tasks.json")).unwrap();
        assert!(content.contains("active_tasks"));
        assert!(content.contains("completed_tasks"));
    }

    #[test]
    fn add_and_list() {
        let (_dir, mut tasks) = store();
        let id = tasks
            .add("write report", Some(day(20)), Some("high".into()))
            .unwrap();
        assert_eq!(id, 1);

        let active = tasks.list(TaskStatus::Active, None);
        assert_eq!(active.len(), 1);
        assert_eq!(
            active[0].to_string(),
            "ID: 1, Name: write report, Due: 2026-10-20, Priority: high"
        );
    }

    #[test]
    fn ids_are_not_reused_after_completion() {
        let (_dir, mut tasks) = store();
        tasks.add("one", None, None).unwrap();
        tasks.add("two", None, None).unwrap();
        assert!(tasks.complete(1).unwrap());
        assert_eq!(tasks.add("three", None, None).unwrap(), 3);
    }

    #[test]
    fn complete_moves_task() {
        let (dir, mut tasks) = store();
        tasks.add("one", None, None).unwrap();
        assert!(tasks.complete(1).unwrap());
        assert!(!tasks.complete(1).unwrap());

        let reopened = TaskStore::open(dir.path().join("tasks.json"));
        assert!(reopened.list(TaskStatus::Active, None).is_empty());
        let done = reopened.list(TaskStatus::Completed, None);
        assert_eq!(done[0].status, TaskStatus::Completed);
        assert!(done[0].completed_at.is_some());
    }

    #[test]
    fn edit_changes_one_field() {
        let (_dir, mut tasks) = store();
        tasks.add("draft", None, None).unwrap();
        assert!(tasks.edit(1, TaskEdit::Priority(Some("low".into()))).unwrap());
        assert!(tasks.edit(1, TaskEdit::Name("final".into())).unwrap());
        assert!(!tasks.edit(9, TaskEdit::Due(None)).unwrap());

        let task = tasks.list(TaskStatus::Active, None)[0];
        assert_eq!(task.name, "final");
        assert_eq!(task.priority.as_deref(), Some("low"));
    }

    #[test]
    fn list_filters_by_priority() {
        let (_dir, mut tasks) = store();
        tasks.add("a", None, Some("high".into())).unwrap();
        tasks.add("b", None, Some("low".into())).unwrap();
        tasks.add("c", None, None).unwrap();

        let high = tasks.list(TaskStatus::Active, Some("HIGH"));
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].name, "a");
    }

    #[test]
    fn due_within_window() {
        let (_dir, mut tasks) = store();
        tasks.add("tomorrow", Some(day(20)), None).unwrap();
        tasks.add("next week", Some(day(27)), None).unwrap();
        tasks.add("overdue", Some(day(18)), None).unwrap();
        tasks.add("undated", None, None).unwrap();

        let due = tasks.due_within(at(19, 9), Duration::hours(24));
        let names: Vec<_> = due.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["tomorrow"]);
    }

    #[test]
    fn reminders_format() {
        let (_dir, mut tasks) = store();
        assert_eq!(
            tasks.reminders(at(19, 9), Duration::hours(24)),
            "No upcoming tasks due in the next 24 hours."
        );

        tasks.add("pay rent", Some(day(20)), None).unwrap();
        assert_eq!(
            tasks.reminders(at(19, 9), Duration::hours(24)),
            "Upcoming Tasks:\n- Task 1: pay rent (Due: 2026-10-20)"
        );
    }

    #[test]
    fn status_parsing() {
        assert_eq!("Completed".parse::<TaskStatus>(), Ok(TaskStatus::Completed));
        assert_eq!("active".parse::<TaskStatus>(), Ok(TaskStatus::Active));
        assert!("archived".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn task_json_shape() {
        let task = Task {
            id: 1,
            name: "x".into(),
            created_at: Utc::now(),
            due_date: Some(day(20)),
            priority: None,
            status: TaskStatus::Active,
            completed_at: None,
        };
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"due_date\":\"2026-10-20\""));
        assert!(json.contains("\"status\":\"active\""));
        assert!(json.contains("\"priority\":null"));
        assert!(!json.contains("completed_at"));
    }
}
