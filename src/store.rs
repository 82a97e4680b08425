// Task store: in-memory task list with sort, filter and persistence

use crate::error::ValidationError;
use crate::filter::Filter;
use crate::migrate;
use crate::models::{Priority, Stats, Task, now_ms};
use crate::storage::Storage;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Fixed key the whole collection is stored under
pub const STORAGE_KEY: &str = "tasks";

/// Tunables that shape `add_task`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreSettings {
    /// Priority used when the caller does not pass one
    pub default_priority: Priority,
    /// Upper bound on trimmed text length, in characters
    pub max_text_len: Option<usize>,
}

/// Snapshot handed to the presentation layer after every call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub filter: Filter,
    pub tasks: Vec<Task>,
    pub stats: Stats,
}

/// Owns the task collection and the active filter
///
/// Every mutation persists the full collection before returning. Storage failures are
/// logged and swallowed; the in-memory list stays authoritative for the session.
pub struct TaskStore<S: Storage> {
    storage: S,
    tasks: Vec<Task>,
    /// Stored records that do not decode as tasks, written back untouched on save
    unrecognized: Vec<Value>,
    filter: Filter,
    settings: StoreSettings,
}

impl<S: Storage> TaskStore<S> {
    /// Create a store over `storage` and load whatever it holds
    pub fn open(storage: S) -> Self {
        Self::with_settings(storage, StoreSettings::default())
    }

    pub fn with_settings(storage: S, settings: StoreSettings) -> Self {
        let mut store = Self {
            storage,
            tasks: Vec::new(),
            unrecognized: Vec::new(),
            filter: Filter::default(),
            settings,
        };
        store.load_tasks();
        store
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn settings(&self) -> StoreSettings {
        self.settings
    }

    /// Tasks in their current internal order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add a task; `None` priority falls back to the configured default
    pub fn add_task(&mut self, raw_text: &str, priority: Option<Priority>) -> Result<TaskView, ValidationError> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if let Some(max) = self.settings.max_text_len {
            let len = text.chars().count();
            if len > max {
                return Err(ValidationError::TextTooLong { len, max });
            }
        }

        let priority = priority.unwrap_or(self.settings.default_priority);
        let task = Task::new(self.next_id(), text, priority);
        debug!(id = task.id, %priority, "add_task: created");

        self.tasks.push(task);
        self.sort_tasks_by_priority();
        self.save_tasks();

        Ok(self.view())
    }

    /// Flip `completed` on the matching task; unknown ids are ignored
    ///
    /// Does not re-sort. The next `render` pass does.
    pub fn toggle_task(&mut self, id: i64) -> TaskView {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                debug!(id, completed = task.completed, "toggle_task: flipped");
                self.save_tasks();
            }
            None => debug!(id, "toggle_task: no such task"),
        }

        self.view()
    }

    /// Remove the matching task; unknown ids are ignored
    pub fn delete_task(&mut self, id: i64) -> TaskView {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);

        if self.tasks.len() != before {
            debug!(id, "delete_task: removed");
            self.save_tasks();
        } else {
            debug!(id, "delete_task: no such task");
        }

        self.view()
    }

    /// Switch the active filter. Does not re-sort.
    pub fn set_filter(&mut self, filter: Filter) -> TaskView {
        self.filter = filter;
        self.view()
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Incomplete first, then by priority rank, then newest first
    pub fn sort_tasks_by_priority(&mut self) {
        // sort_by is stable, so full ties keep their relative order
        self.tasks.sort_by(priority_order);
    }

    pub fn filtered_tasks(&self) -> Vec<Task> {
        self.filter.apply(&self.tasks)
    }

    pub fn compute_stats(&self) -> Stats {
        Stats::from_tasks(&self.tasks)
    }

    /// Current order, filtered, with stats. No sorting.
    pub fn view(&self) -> TaskView {
        TaskView {
            filter: self.filter,
            tasks: self.filtered_tasks(),
            stats: self.compute_stats(),
        }
    }

    /// The render pass: sort, then build the view
    pub fn render(&mut self) -> TaskView {
        self.sort_tasks_by_priority();
        self.view()
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write the full collection (filter ignored). Failures are logged, never returned.
    pub fn save_tasks(&mut self) {
        let json = match encode_tasks(&self.tasks, &self.unrecognized) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = ?e, "Failed to serialize tasks, keeping in-memory state");
                return;
            }
        };

        if let Err(e) = self.storage.set(STORAGE_KEY, &json) {
            warn!(error = ?e, count = self.tasks.len(), "Failed to persist tasks, keeping in-memory state");
        }
    }

    /// Replace the collection with what storage holds
    ///
    /// Absent, unreadable or malformed data yields an empty collection.
    pub fn load_tasks(&mut self) {
        (self.tasks, self.unrecognized) = match self.storage.get(STORAGE_KEY) {
            Ok(Some(raw)) => decode_tasks(&raw),
            Ok(None) => (Vec::new(), Vec::new()),
            Err(e) => {
                warn!(error = ?e, "Failed to read stored tasks, starting empty");
                (Vec::new(), Vec::new())
            }
        };

        info!(count = self.tasks.len(), unrecognized = self.unrecognized.len(), "Loaded tasks");
    }

    /// Stored records that do not decode as tasks, kept as loaded
    pub fn unrecognized(&self) -> &[Value] {
        &self.unrecognized
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    /// Ids in use, including those of unrecognized records
    fn used_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.tasks
            .iter()
            .map(|t| t.id)
            .chain(self.unrecognized.iter().filter_map(|v| v.get("id").and_then(Value::as_i64)))
    }

    /// Millisecond clock, bumped past the largest existing id when needed
    ///
    /// Once `i64::MAX` is taken, falls back to the lowest free non-negative id.
    fn next_id(&self) -> i64 {
        let now = now_ms();
        match self.used_ids().max() {
            Some(max) if max >= now => match max.checked_add(1) {
                Some(id) => id,
                None => {
                    let used: HashSet<i64> = self.used_ids().collect();
                    let id = (0..=i64::MAX).find(|id| !used.contains(id)).unwrap_or(0);
                    warn!(id, "Task ids exhausted past i64::MAX, reusing a free id");
                    id
                }
            },
            _ => now,
        }
    }
}

/// Comparator used by `sort_tasks_by_priority`
pub fn priority_order(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| a.priority.rank().cmp(&b.priority.rank()))
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Tasks first, then unrecognized records as they were loaded
fn encode_tasks(tasks: &[Task], unrecognized: &[Value]) -> serde_json::Result<String> {
    let mut records = Vec::with_capacity(tasks.len() + unrecognized.len());
    for task in tasks {
        records.push(serde_json::to_value(task)?);
    }
    records.extend(unrecognized.iter().cloned());
    serde_json::to_string(&records)
}

fn decode_tasks(raw: &str) -> (Vec<Task>, Vec<Value>) {
    let mut records = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(records)) => records,
        Ok(other) => {
            warn!(kind = json_kind(&other), "Stored tasks are not a JSON array, starting empty");
            return (Vec::new(), Vec::new());
        }
        Err(e) => {
            warn!(error = ?e, "Failed to parse stored tasks, starting empty");
            return (Vec::new(), Vec::new());
        }
    };

    let patched = migrate::fill_missing_priority(&mut records);
    if patched > 0 {
        info!(patched, "Defaulted missing priority to medium");
    }

    let mut tasks = Vec::with_capacity(records.len());
    let mut unrecognized = Vec::new();
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Task>(record.clone()) {
            Ok(task) => tasks.push(task),
            Err(e) => {
                warn!(index, error = ?e, "Keeping stored record that does not decode as a task");
                unrecognized.push(record);
            }
        }
    }

    (tasks, unrecognized)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
