use std::sync::{Arc, Mutex, PoisonError};

use crate::models::{FilterType, PersistedState, Stats, Task, TaskListView};
use crate::storage::{FileStore, KeyValueStore, PersistentStore, TASKS_KEY};

/// Where a controller is in its load/save lifecycle.
///
/// `Hydrating` never writes: the stored snapshot has not been read yet and writing the
/// empty defaults would clobber it. `Synchronized` writes the full snapshot after every
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Hydrating,
    Synchronized,
}

/// Owns the task collection and the active filter, and keeps the store in step with them.
#[derive(Debug)]
pub struct TaskList<B> {
    store: PersistentStore<B>,
    tasks: Vec<Task>,
    filter: FilterType,
    phase: Phase,
}

impl<B: KeyValueStore> TaskList<B> {
    /// Creates an empty, not yet hydrated controller. Call [`TaskList::hydrate`] next.
    pub fn new(store: PersistentStore<B>) -> Self {
        Self {
            store,
            tasks: Vec::new(),
            filter: FilterType::All,
            phase: Phase::Hydrating,
        }
    }

    pub fn open(store: PersistentStore<B>) -> Self {
        let mut list = Self::new(store);
        list.hydrate();
        list
    }

    /// Loads the stored snapshot and switches to write-through. Runs at most once;
    /// returns `false` if the controller was already hydrated.
    pub fn hydrate(&mut self) -> bool {
        if self.phase == Phase::Synchronized {
            log::debug!("task list already hydrated");
            return false;
        }

        // Decode failures are logged by the store; an empty list is the fallback.
        let snapshot = self.store.get(TASKS_KEY, PersistedState::default());
        log::info!(
            "task list hydrated tasks={} filter={}",
            snapshot.tasks.len(),
            snapshot.filter
        );
        self.tasks = snapshot.tasks;
        self.filter = snapshot.filter;
        self.phase = Phase::Synchronized;
        self.commit();
        true
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loaded(&self) -> bool {
        self.phase == Phase::Synchronized
    }

    /// Appends a new open task. Text is trimmed; blank text is ignored and returns `None`.
    pub fn add_task(&mut self, text: &str) -> Option<Task> {
        let text = text.trim();
        if text.is_empty() {
            log::debug!("add_task ignored blank text");
            return None;
        }
        let task = Task::new(text);
        self.tasks.push(task.clone());
        self.commit();
        Some(task)
    }

    pub fn toggle_task(&mut self, id: &str) {
        match self.tasks.iter_mut().find(|task| task.id() == id) {
            Some(task) => task.toggle(),
            None => log::debug!("toggle_task found no task id={id}"),
        }
        self.commit();
    }

    pub fn delete_task(&mut self, id: &str) {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id() != id);
        if self.tasks.len() == before {
            log::debug!("delete_task found no task id={id}");
        }
        self.commit();
    }

    pub fn clear_completed(&mut self) {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed());
        log::debug!("clear_completed removed={}", before - self.tasks.len());
        self.commit();
    }

    pub fn set_filter(&mut self, filter: FilterType) {
        self.filter = filter;
        self.commit();
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }

    /// The whole collection in insertion order, regardless of filter.
    pub fn all_tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        visible_tasks(&self.tasks, self.filter).collect()
    }

    pub fn stats(&self) -> Stats {
        compute_stats(&self.tasks)
    }

    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            tasks: self.tasks.clone(),
            filter: self.filter,
        }
    }

    pub fn view(&self) -> TaskListView {
        TaskListView {
            tasks: self.visible_tasks().into_iter().cloned().collect(),
            filter: self.filter,
            stats: self.stats(),
            loaded: self.is_loaded(),
        }
    }

    pub fn store(&self) -> &PersistentStore<B> {
        &self.store
    }

    fn commit(&self) {
        match self.phase {
            Phase::Hydrating => log::trace!("write skipped until hydration completes"),
            Phase::Synchronized => self.store.set(TASKS_KEY, &self.snapshot()),
        }
    }
}

/// Tasks matching `filter`, in their original order.
pub fn visible_tasks(tasks: &[Task], filter: FilterType) -> impl Iterator<Item = &Task> {
    tasks.iter().filter(move |task| filter.matches(task))
}

pub fn compute_stats(tasks: &[Task]) -> Stats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.completed()).count();
    Stats {
        total,
        completed,
        active: total - completed,
    }
}

/// Shared handle used by the desktop commands; every call runs under one lock.
pub struct AppState<B> {
    inner: Arc<Mutex<TaskList<B>>>,
}

pub type DesktopState = AppState<FileStore>;

impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: KeyValueStore> AppState<B> {
    pub fn new(list: TaskList<B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(list)),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut TaskList<B>) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Like [`AppState::with`], but hydrates first so the closure never sees pre-load state.
    pub fn with_loaded<R>(&self, f: impl FnOnce(&mut TaskList<B>) -> R) -> R {
        self.with(|list| {
            list.hydrate();
            f(list)
        })
    }
}
