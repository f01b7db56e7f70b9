//! The assistant — routes each line to notes, tasks, knowledge, or chat.
//!
//! `respond` never fails. Storage problems are logged and phrased as a
//! reply so the conversation loop keeps going.

use crate::command::Command;
use crate::responder::Responder;
use chrono::{Duration, Local};
use std::path::Path;
use tracing::{debug, warn};
use zalo_config::AppConfig;
use zalo_core::KnowledgeStorage;
use zalo_core::error::{KnowledgeError, StorageError};
use zalo_knowledge::{InMemoryStore, JsonFileStore, KnowledgeBase};
use zalo_notes::NoteStore;
use zalo_tasks::{TaskStatus, TaskStore};

pub const HELP: &str = "\
Available commands:
Notepad:
- save note <title>: <content>
- update note <title>: <content>
- list notes
- view note <title>
- delete note <title>

Tasks:
- add task <name> [due <date>] [priority <level>]
- list tasks [completed]
- complete task <id>
- edit task <id> name|due|priority <value>
- reminders

Learning:
- /learn <topic> <information> [--context <topic>]
- /forget <topic> [<response>]
- /topics
- /export [path]
- /import <path>";

pub struct Assistant {
    name: String,
    knowledge: KnowledgeBase,
    notes: NoteStore,
    tasks: TaskStore,
    responder: Responder,
    reminder_window: Duration,
}

impl Assistant {
    /// Open every store named in `config`.
    ///
    /// With `ephemeral`, learned knowledge lives only for this process;
    /// notes and tasks are still read from and written to disk.
    pub fn from_config(config: &AppConfig, ephemeral: bool) -> Self {
        Self::new(
            config,
            open_knowledge(config, ephemeral),
            NoteStore::open(config.notes_path()),
            TaskStore::open(config.tasks_path()),
        )
    }

    pub fn new(
        config: &AppConfig,
        knowledge: KnowledgeBase,
        notes: NoteStore,
        tasks: TaskStore,
    ) -> Self {
        Self {
            name: config.assistant_name.clone(),
            knowledge,
            notes,
            tasks,
            responder: Responder::new(&config.assistant_name, &config.user_name)
                .with_auto_learn(config.knowledge.auto_learn),
            reminder_window: Duration::hours(i64::from(config.tasks.reminder_window_hours)),
        }
    }

    /// Seed both the knowledge selector and the small-talk picker.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.knowledge = self.knowledge.with_seed(seed);
        self.responder = self.responder.with_seed(seed);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn greeting(&self) -> &'static str {
        "Hello! How can I help you today?"
    }

    /// Handle one line of input and produce the reply.
    pub fn respond(&mut self, line: &str) -> String {
        let command = Command::parse(line);
        debug!(?command, "Routing input");
        if !matches!(command, Command::Chat(_)) {
            self.responder.observe(line);
        }

        match command {
            Command::Help => HELP.to_string(),

            Command::SaveNote { title, content } => match self.notes.add(&title, &content) {
                Ok(()) => format!("Note '{title}' saved successfully."),
                Err(e) => storage_failure(&e),
            },
            Command::UpdateNote { title, content } => {
                match self.notes.update(&title, &content) {
                    Ok(true) => format!("Note '{title}' updated."),
                    Ok(false) => "Note not found.".into(),
                    Err(e) => storage_failure(&e),
                }
            }
            Command::ListNotes => {
                let titles = self.notes.list();
                if titles.is_empty() {
                    "No notes found".into()
                } else {
                    titles.join("\n")
                }
            }
            Command::ViewNote(title) => self
                .notes
                .get(&title)
                .map(|note| note.content.clone())
                .unwrap_or_else(|| "Note not found.".into()),
            Command::DeleteNote(title) => match self.notes.delete(&title) {
                Ok(true) => format!("Note '{title}' deleted."),
                Ok(false) => "Note not found.".into(),
                Err(e) => storage_failure(&e),
            },

            Command::AddTask {
                name,
                due,
                priority,
            } => match self.tasks.add(&name, due, priority) {
                Ok(id) => format!("Task '{name}' added successfully with ID {id}!"),
                Err(e) => storage_failure(&e),
            },
            Command::ListTasks(status) => {
                let tasks = self.tasks.list(status, None);
                if tasks.is_empty() {
                    format!("No {status} tasks found.")
                } else {
                    tasks
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            Command::CompleteTask(id) => match self.tasks.complete(id) {
                Ok(true) => format!("Task {id} marked as completed!"),
                Ok(false) => format!("Task {id} not found."),
                Err(e) => storage_failure(&e),
            },
            Command::EditTask { id, edit } => match self.tasks.edit(id, edit) {
                Ok(true) => format!("Task {id} updated successfully!"),
                Ok(false) => format!("Task {id} not found."),
                Err(e) => storage_failure(&e),
            },
            Command::Reminders => self
                .tasks
                .reminders(Local::now().naive_local(), self.reminder_window),

            Command::Learn {
                topic,
                info,
                context,
            } => match self.knowledge.learn(&topic, &info, context.as_deref()) {
                Ok(learned) => learned.to_string(),
                Err(e) => knowledge_failure(&e),
            },
            Command::Forget { topic, response } => {
                match self.knowledge.forget(&topic, response.as_deref()) {
                    Ok(outcome) => outcome.to_string(),
                    Err(e) => knowledge_failure(&e),
                }
            }
            Command::Export(path) => match self.knowledge.export(path.as_deref()) {
                Ok(written) => format!("Knowledge exported to {}", written.display()),
                Err(e) => knowledge_failure(&e),
            },
            Command::Import(path) => self.import(&path),
            Command::Topics => {
                let topics: Vec<&str> = self.knowledge.topics().collect();
                if topics.is_empty() {
                    "I haven't learned anything yet.".into()
                } else {
                    format!("Topics I know about:\n- {}", topics.join("\n- "))
                }
            }

            Command::Invalid(message) => message,
            Command::Chat(text) => self.responder.respond(&text, &mut self.knowledge),
        }
    }

    fn import(&mut self, path: &Path) -> String {
        match self.knowledge.import(path) {
            Ok(count) => format!("Imported {count} topics from {}", path.display()),
            Err(e) => knowledge_failure(&e),
        }
    }

    /// Task count due inside the reminder window, for the session banner.
    pub fn due_soon(&self) -> usize {
        self.tasks
            .due_within(Local::now().naive_local(), self.reminder_window)
            .len()
    }

    pub fn active_tasks(&self) -> usize {
        self.tasks.list(TaskStatus::Active, None).len()
    }
}

/// The knowledge base described by `config`, tuned by its `[knowledge]` table.
pub fn open_knowledge(config: &AppConfig, ephemeral: bool) -> KnowledgeBase {
    let storage: Box<dyn KnowledgeStorage> = if ephemeral {
        Box::new(InMemoryStore::default())
    } else {
        Box::new(JsonFileStore::new(config.knowledge_path()))
    };

    KnowledgeBase::open(storage)
        .with_threshold(config.knowledge.similarity_threshold)
        .with_context_sensitivity(config.knowledge.context_sensitive)
        .with_history_limit(config.knowledge.history_limit)
}

fn storage_failure(error: &StorageError) -> String {
    warn!(error = %error, "Storage operation failed");
    format!("Sorry, I couldn't complete that. {error}")
}

fn knowledge_failure(error: &KnowledgeError) -> String {
    match error {
        KnowledgeError::InvalidInput(reason) => format!("I can't do that: {reason}."),
        KnowledgeError::Storage(e) => storage_failure(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assistant() -> (tempfile::TempDir, Assistant) {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..AppConfig::default()
        };
        let assistant = Assistant::from_config(&config, false).with_seed(3);
        (dir, assistant)
    }

    #[test]
    fn help_lists_commands() {
        let (_dir, mut zalo) = assistant();
        let help = zalo.respond("help");
        assert!(help.contains("save note"));
        assert!(help.contains("/learn"));
    }

    #[test]
    fn note_lifecycle() {
        let (_dir, mut zalo) = assistant();
        assert_eq!(
            zalo.respond("save note Meeting: Discuss project updates"),
            "Note 'Meeting' saved successfully."
        );
        assert_eq!(zalo.respond("list notes"), "Meeting");
        assert_eq!(zalo.respond("view note Meeting"), "Discuss project updates");
        assert_eq!(zalo.respond("update note Meeting: Agenda"), "Note 'Meeting' updated.");
        assert_eq!(zalo.respond("view note Meeting"), "Agenda");
        assert_eq!(zalo.respond("delete note Meeting"), "Note 'Meeting' deleted.");
        assert_eq!(zalo.respond("view note Meeting"), "Note not found.");
        assert_eq!(zalo.respond("list notes"), "No notes found");
    }

    #[test]
    fn task_lifecycle() {
        let (_dir, mut zalo) = assistant();
        assert_eq!(zalo.respond("list tasks"), "No active tasks found.");
        assert_eq!(
            zalo.respond("add task file taxes priority high"),
            "Task 'file taxes' added successfully with ID 1!"
        );
        assert_eq!(
            zalo.respond("list tasks"),
            "ID: 1, Name: file taxes, Priority: high"
        );
        assert_eq!(zalo.respond("edit task 1 name file returns"), "Task 1 updated successfully!");
        assert_eq!(zalo.respond("complete task 1"), "Task 1 marked as completed!");
        assert_eq!(zalo.respond("complete task 1"), "Task 1 not found.");
        assert_eq!(
            zalo.respond("list tasks completed"),
            "ID: 1, Name: file returns, Priority: high"
        );
        assert_eq!(zalo.active_tasks(), 0);
    }

    #[test]
    fn reminders_with_nothing_due() {
        let (_dir, mut zalo) = assistant();
        assert_eq!(
            zalo.respond("reminders"),
            "No upcoming tasks due in the next 24 hours."
        );
    }

    #[test]
    fn learn_then_chat() {
        let (_dir, mut zalo) = assistant();
        assert_eq!(
            zalo.respond("/learn python A programming language"),
            "Learned about python!"
        );
        assert_eq!(zalo.respond("pithon"), "A programming language");
        assert_eq!(zalo.respond("/topics"), "Topics I know about:\n- python");
        assert_eq!(
            zalo.respond("/forget python"),
            "Forgot everything about python"
        );
        assert_eq!(zalo.respond("/forget python"), "Nothing to forget");
        assert_eq!(zalo.respond("/topics"), "I haven't learned anything yet.");
    }

    #[test]
    fn export_and_import_through_commands() {
        let (dir, mut zalo) = assistant();
        zalo.respond("/learn hello Hi there!");
        let backup = dir.path().join("kb.backup.json");
        let reply = zalo.respond(&format!("/export {}", backup.display()));
        assert!(reply.starts_with("Knowledge exported to"));

        let (_other_dir, mut fresh) = assistant();
        let reply = fresh.respond(&format!("/import {}", backup.display()));
        assert!(reply.starts_with("Imported 1 topics"));
        assert_eq!(fresh.respond("hello"), "Hi there!");
    }

    #[test]
    fn import_of_missing_file_is_a_reply() {
        let (dir, mut zalo) = assistant();
        let reply = zalo.respond(&format!("/import {}", dir.path().join("nope.json").display()));
        assert!(reply.starts_with("Sorry, I couldn't complete that."));
        assert!(reply.contains("file not found"));
    }

    #[test]
    fn invalid_arguments_are_explained() {
        let (_dir, mut zalo) = assistant();
        assert!(zalo.respond("complete task soon").contains("must be a number"));
    }

    #[test]
    fn ephemeral_knowledge_cannot_export_to_default_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..AppConfig::default()
        };
        let mut zalo = Assistant::from_config(&config, true);
        zalo.respond("/learn hello Hi there!");
        assert!(zalo.respond("/export").starts_with("I can't do that"));
        assert!(!config.knowledge_path().exists());
    }
}
