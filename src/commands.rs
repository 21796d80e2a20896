#[cfg(all(feature = "app", not(test)))]
use crate::events::EVENT_STATE_UPDATED;
use crate::input::TaskInput;
use crate::models::{FilterType, TaskListView};
#[cfg(all(feature = "app", not(test)))]
use crate::state::DesktopState;
use crate::state::{AppState, TaskList};
use crate::storage::KeyValueStore;

#[cfg(all(feature = "app", not(test)))]
use tauri::{AppHandle, Emitter, Runtime, State};

#[derive(Debug, serde::Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

pub trait CommandCtx {
    fn emit_state_updated(&self, payload: TaskListView);
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

fn err<T>(message: &str) -> CommandResult<T> {
    CommandResult {
        ok: false,
        data: None,
        error: Some(message.to_string()),
    }
}

fn publish<B: KeyValueStore>(ctx: &impl CommandCtx, list: &TaskList<B>) -> TaskListView {
    let view = list.view();
    ctx.emit_state_updated(view.clone());
    view
}

#[cfg(all(feature = "app", not(test)))]
struct TauriCommandCtx<'a, R: Runtime> {
    app: &'a AppHandle<R>,
}

#[cfg(all(feature = "app", not(test)))]
impl<R: Runtime> CommandCtx for TauriCommandCtx<'_, R> {
    fn emit_state_updated(&self, payload: TaskListView) {
        if let Err(error) = self.app.emit(EVENT_STATE_UPDATED, payload) {
            log::warn!("emit {EVENT_STATE_UPDATED} failed: {error}");
        }
    }
}

fn load_state_impl<B: KeyValueStore>(state: &AppState<B>) -> CommandResult<TaskListView> {
    state.with_loaded(|list| ok(list.view()))
}

fn add_task_impl<B: KeyValueStore>(
    ctx: &impl CommandCtx,
    state: &AppState<B>,
    text: String,
) -> CommandResult<TaskListView> {
    let mut input = TaskInput::from(text);
    state.with_loaded(|list| match input.submit(list) {
        Some(_) => ok(publish(ctx, list)),
        None => err("task text is empty"),
    })
}

fn toggle_task_impl<B: KeyValueStore>(
    ctx: &impl CommandCtx,
    state: &AppState<B>,
    task_id: String,
) -> CommandResult<TaskListView> {
    state.with_loaded(|list| {
        list.toggle_task(&task_id);
        ok(publish(ctx, list))
    })
}

fn delete_task_impl<B: KeyValueStore>(
    ctx: &impl CommandCtx,
    state: &AppState<B>,
    task_id: String,
) -> CommandResult<TaskListView> {
    state.with_loaded(|list| {
        list.delete_task(&task_id);
        ok(publish(ctx, list))
    })
}

fn clear_completed_impl<B: KeyValueStore>(
    ctx: &impl CommandCtx,
    state: &AppState<B>,
) -> CommandResult<TaskListView> {
    state.with_loaded(|list| {
        list.clear_completed();
        ok(publish(ctx, list))
    })
}

fn set_filter_impl<B: KeyValueStore>(
    ctx: &impl CommandCtx,
    state: &AppState<B>,
    filter: FilterType,
) -> CommandResult<TaskListView> {
    state.with_loaded(|list| {
        list.set_filter(filter);
        ok(publish(ctx, list))
    })
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn load_state(state: State<DesktopState>) -> CommandResult<TaskListView> {
    load_state_impl(state.inner())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn add_task(
    app: AppHandle,
    state: State<DesktopState>,
    text: String,
) -> CommandResult<TaskListView> {
    let ctx = TauriCommandCtx { app: &app };
    add_task_impl(&ctx, state.inner(), text)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn toggle_task(
    app: AppHandle,
    state: State<DesktopState>,
    task_id: String,
) -> CommandResult<TaskListView> {
    let ctx = TauriCommandCtx { app: &app };
    toggle_task_impl(&ctx, state.inner(), task_id)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn delete_task(
    app: AppHandle,
    state: State<DesktopState>,
    task_id: String,
) -> CommandResult<TaskListView> {
    let ctx = TauriCommandCtx { app: &app };
    delete_task_impl(&ctx, state.inner(), task_id)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn clear_completed(app: AppHandle, state: State<DesktopState>) -> CommandResult<TaskListView> {
    let ctx = TauriCommandCtx { app: &app };
    clear_completed_impl(&ctx, state.inner())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn set_filter(
    app: AppHandle,
    state: State<DesktopState>,
    filter: FilterType,
) -> CommandResult<TaskListView> {
    let ctx = TauriCommandCtx { app: &app };
    set_filter_impl(&ctx, state.inner(), filter)
}
