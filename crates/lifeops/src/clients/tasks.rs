//! Google Tasks: lists, tasks, subtasks

use chrono::NaiveDate;
use log::info;
use serde_json::{Value, json};
use std::sync::Arc;

use super::segment;
use crate::error::Result;
use crate::models::{Task, TaskList, TaskStatus};
use crate::parse::{self, Batch, Raw};
use crate::service::{ServiceCache, ServiceHandle};

/// The account's default task list
pub const DEFAULT_TASKLIST: &str = "@default";

/// Fields for a task to create
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub notes: Option<String>,
    pub due: Option<NaiveDate>,
    /// Create as a subtask of this task
    pub parent: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn due(mut self, date: NaiveDate) -> Self {
        self.due = Some(date);
        self
    }

    pub fn under(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    fn to_body(&self) -> Value {
        let mut body = json!({ "title": self.title });
        if let Some(notes) = &self.notes {
            body["notes"] = json!(notes);
        }
        if let Some(due) = self.due {
            body["due"] = json!(due_timestamp(due));
        }
        body
    }
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub due: Option<NaiveDate>,
}

impl TaskUpdate {
    fn to_body(&self) -> Value {
        let mut body = json!({});
        if let Some(title) = &self.title {
            body["title"] = json!(title);
        }
        if let Some(notes) = &self.notes {
            body["notes"] = json!(notes);
        }
        if let Some(due) = self.due {
            body["due"] = json!(due_timestamp(due));
        }
        body
    }
}

/// Tasks stores due dates as midnight UTC; the time part is ignored
fn due_timestamp(date: NaiveDate) -> String {
    date.format("%Y-%m-%dT00:00:00.000Z").to_string()
}

pub struct TasksClient {
    service: Arc<ServiceHandle>,
}

impl TasksClient {
    pub fn new(cache: &ServiceCache) -> Result<Self> {
        Ok(Self {
            service: cache.tasks()?,
        })
    }

    pub fn list_task_lists(&self) -> Result<Batch<TaskList>> {
        let response = self.service.get("users/@me/lists", &[])?;
        Ok(Batch::parse(
            Raw::new("tasklists", &response).arr("items"),
            parse::tasklist,
        ))
    }

    pub fn create_tasklist(&self, title: &str) -> Result<TaskList> {
        let response = self
            .service
            .post("users/@me/lists", &[], &json!({ "title": title }))?;
        let list = parse::tasklist(&response)?;
        info!("Created task list {}: {}", list.id, title);
        Ok(list)
    }

    pub fn delete_tasklist(&self, tasklist_id: &str) -> Result<()> {
        self.service
            .delete(&format!("users/@me/lists/{}", segment(tasklist_id)))?;
        info!("Deleted task list {}", tasklist_id);
        Ok(())
    }

    pub fn get_tasks(
        &self,
        tasklist_id: &str,
        include_completed: bool,
        max_results: u32,
    ) -> Result<Batch<Task>> {
        let show = if include_completed { "true" } else { "false" };
        let max_results = max_results.to_string();
        let response = self.service.get(
            &tasks_path(tasklist_id),
            &[
                ("showCompleted", show),
                ("showHidden", show),
                ("maxResults", &max_results),
            ],
        )?;
        Ok(Batch::parse(
            Raw::new("tasks", &response).arr("items"),
            parse::task,
        ))
    }

    pub fn get_open_tasks(&self, tasklist_id: &str, max_results: u32) -> Result<Batch<Task>> {
        self.get_tasks(tasklist_id, false, max_results)
    }

    pub fn get_task(&self, tasklist_id: &str, task_id: &str) -> Result<Task> {
        parse::task(&self.service.get(&task_path(tasklist_id, task_id), &[])?)
    }

    pub fn create_task(&self, tasklist_id: &str, task: &NewTask) -> Result<Task> {
        let query: Vec<(&str, &str)> = task
            .parent
            .as_deref()
            .map(|parent| ("parent", parent))
            .into_iter()
            .collect();
        let response = self
            .service
            .post(&tasks_path(tasklist_id), &query, &task.to_body())?;
        let created = parse::task(&response)?;
        info!("Created task {}: {}", created.id, created.title);
        Ok(created)
    }

    pub fn complete_task(&self, tasklist_id: &str, task_id: &str) -> Result<Task> {
        self.patch(
            tasklist_id,
            task_id,
            &json!({ "status": TaskStatus::Completed.as_api() }),
        )
    }

    /// Mark open again; the completion timestamp is cleared
    pub fn reopen_task(&self, tasklist_id: &str, task_id: &str) -> Result<Task> {
        self.patch(
            tasklist_id,
            task_id,
            &json!({ "status": TaskStatus::NeedsAction.as_api(), "completed": null }),
        )
    }

    pub fn update_task(
        &self,
        tasklist_id: &str,
        task_id: &str,
        update: &TaskUpdate,
    ) -> Result<Task> {
        self.patch(tasklist_id, task_id, &update.to_body())
    }

    pub fn delete_task(&self, tasklist_id: &str, task_id: &str) -> Result<()> {
        self.service.delete(&task_path(tasklist_id, task_id))?;
        info!("Deleted task {}", task_id);
        Ok(())
    }

    fn patch(&self, tasklist_id: &str, task_id: &str, body: &Value) -> Result<Task> {
        let response = self
            .service
            .patch(&task_path(tasklist_id, task_id), &[], body)?;
        let task = parse::task(&response)?;
        info!("Updated task {} ({})", task.id, task.status.as_api());
        Ok(task)
    }
}

fn tasks_path(tasklist_id: &str) -> String {
    format!("lists/{}/tasks", segment(tasklist_id))
}

fn task_path(tasklist_id: &str, task_id: &str) -> String {
    format!("lists/{}/tasks/{}", segment(tasklist_id), segment(task_id))
}
