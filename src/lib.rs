#[cfg(any(test, feature = "app"))]
pub mod commands;
#[cfg(any(test, feature = "app"))]
pub mod events;
pub mod input;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;

pub use input::TaskInput;
pub use models::{FilterType, PersistedState, Stats, Task, TaskListView};
pub use state::{compute_stats, visible_tasks, AppState, Phase, TaskList};
pub use storage::{
    FileStore, KeyValueStore, MemoryStore, PersistentStore, StorageError, TASKS_KEY,
};

#[cfg(all(feature = "app", not(test)))]
use tauri::Manager;

#[cfg(all(feature = "app", not(test)))]
use crate::commands::*;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
#[cfg(all(feature = "app", not(test)))]
pub fn run() {
    tauri::Builder::default()
        .setup(|app| {
            let data_dir = app.path().app_data_dir()?;
            if let Err(error) = logging::init_logging(&data_dir) {
                eprintln!("failed to initialize logging: {error}");
            }

            let store = FileStore::new(data_dir);
            store.ensure_dirs()?;

            let list = TaskList::open(PersistentStore::new(store));
            app.manage::<state::DesktopState>(AppState::new(list));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            load_state,
            add_task,
            toggle_task,
            delete_task,
            clear_completed,
            set_filter,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
