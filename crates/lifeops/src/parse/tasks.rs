use serde_json::Value;

use super::Raw;
use crate::error::Result;
use crate::models::{Task, TaskList, TaskStatus};

pub fn task(value: &Value) -> Result<Task> {
    let raw = Raw::new("task", value);
    Ok(Task {
        id: raw.id("id")?,
        title: raw.str("title"),
        status: TaskStatus::from_api(&raw.str("status")),
        notes: raw.str("notes"),
        due: raw.time("due"),
        completed_at: raw.time("completed"),
        parent_id: raw.opt_str("parent"),
    })
}

pub fn tasklist(value: &Value) -> Result<TaskList> {
    let raw = Raw::new("tasklist", value);
    Ok(TaskList {
        id: raw.id("id")?,
        title: raw.str("title"),
        updated: raw.time("updated"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_completed_subtask() {
        let t = task(&json!({
            "id": "t1",
            "title": "Sign lease",
            "status": "completed",
            "due": "2025-03-01T00:00:00.000Z",
            "completed": "2025-02-28T17:03:11.000Z",
            "parent": "t0"
        }))
        .unwrap();
        assert!(t.is_done());
        assert!(t.is_subtask());
        assert!(t.due.is_some());
        assert!(t.completed_at.is_some());
    }

    #[test]
    fn test_task_defaults() {
        let t = task(&json!({"id": "t2", "due": "not a date"})).unwrap();
        assert_eq!(t.status, TaskStatus::NeedsAction);
        assert_eq!(t.due, None);
        assert_eq!(t.parent_id, None);
    }

    #[test]
    fn test_tasklist() {
        let l = tasklist(&json!({"id": "l1", "title": "Work", "updated": "2025-01-01T00:00:00Z"})).unwrap();
        assert_eq!(l.title, "Work");
        assert!(tasklist(&json!({"title": "x"})).is_err());
    }
}
