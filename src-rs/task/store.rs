use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::error;

use super::types::{Task, TaskStatus};
use crate::result::AnalyzerError;

/// In-memory task registry. Records live for the life of the process.
pub struct TaskStore {
    tasks: RwLock<HashMap<String, Task>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
        }
    }

    pub fn create(&self, id: &str, user_id: i64, group_id: Option<i64>) -> Task {
        let task = Task::new(id, user_id, group_id);
        self.write().insert(id.to_string(), task.clone());
        task
    }

    /// Replaces the stored record, refusing anything that would move the
    /// task backwards or out of a terminal state.
    pub fn update(&self, task: &Task) -> Result<(), AnalyzerError> {
        let mut map = self.write();
        let current = map
            .get_mut(&task.id)
            .ok_or_else(|| AnalyzerError::TaskNotFound(task.id.clone()))?;
        if !is_allowed(current.status, task.status) {
            return Err(AnalyzerError::InvalidTransition {
                id: task.id.clone(),
                from: current.status.to_string(),
                to: task.status.to_string(),
            });
        }
        *current = task.clone();
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.read().get(id).cloned()
    }

    pub fn list_by_requester(&self, user_id: i64) -> Vec<Task> {
        self.read()
            .values()
            .filter(|task| task.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn count_with_status(&self, status: TaskStatus) -> usize {
        self.read().values().filter(|task| task.status == status).count()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Records are replaced whole, so a poisoned map is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Task>> {
        self.tasks.read().unwrap_or_else(|poisoned| {
            error!("task store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Task>> {
        self.tasks.write().unwrap_or_else(|poisoned| {
            error!("task store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

fn is_allowed(current: TaskStatus, next: TaskStatus) -> bool {
    if current == next {
        return !current.is_terminal();
    }
    current.can_transition_to(next)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn created_task_is_visible_immediately() {
        let store = TaskStore::new();
        let task = store.create("ABCDEF12", 10, Some(5));
        let fetched = store.get("ABCDEF12").unwrap();
        assert_eq!(fetched.id, task.id);
        assert_eq!(fetched.status, TaskStatus::Pending);
        assert_eq!(fetched.group_id, Some(5));
    }

    #[test]
    fn unknown_task_is_none() {
        let store = TaskStore::new();
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn list_by_requester_filters_and_handles_empty() {
        let store = TaskStore::new();
        assert!(store.list_by_requester(1).is_empty());
        store.create("T1", 1, None);
        store.create("T2", 2, None);
        store.create("T3", 1, Some(8));
        let mut ids: Vec<String> = store.list_by_requester(1).into_iter().map(|t| t.id).collect();
        ids.sort();
        assert_eq!(ids, vec!["T1".to_string(), "T3".to_string()]);
        assert!(store.list_by_requester(3).is_empty());
    }

    #[test]
    fn update_rejects_backward_moves() {
        let store = TaskStore::new();
        let mut task = store.create("T1", 1, None);
        let pending = task.clone();
        task.mark_running().unwrap();
        store.update(&task).unwrap();
        task.mark_completed(None).unwrap();
        store.update(&task).unwrap();

        assert!(store.update(&pending).is_err());
        assert!(store.update(&task).is_err());
        assert_eq!(store.get("T1").unwrap().status, TaskStatus::Completed);
    }

    #[test]
    fn update_of_unknown_task_fails() {
        let store = TaskStore::new();
        let task = Task::new("ghost", 1, None);
        assert!(matches!(store.update(&task), Err(AnalyzerError::TaskNotFound(_))));
    }

    #[test]
    fn concurrent_creates_are_all_recorded() {
        let store = Arc::new(TaskStore::new());
        let handles: Vec<_> = (0..16)
            .map(|idx| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.create(&format!("T{idx}"), idx % 3, None);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 16);
        assert_eq!(store.count_with_status(TaskStatus::Pending), 16);
    }

    #[test]
    fn store_stays_usable_after_a_panicking_writer() {
        let store = Arc::new(TaskStore::new());
        store.create("T1", 1, None);
        let poisoner = {
            let store = store.clone();
            std::thread::spawn(move || {
                let _guard = store.tasks.write().unwrap();
                panic!("writer died");
            })
        };
        assert!(poisoner.join().is_err());
        assert!(store.tasks.is_poisoned());

        let task = store.create("T2", 1, None);
        assert_eq!(store.get(&task.id).unwrap().status, TaskStatus::Pending);
        assert_eq!(store.list_by_requester(1).len(), 2);
        assert_eq!(store.len(), 2);
    }
}
