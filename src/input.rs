use crate::models::Task;
use crate::state::TaskList;
use crate::storage::KeyValueStore;

/// Text entry buffer in front of [`TaskList::add_task`].
///
/// Blank input is never forwarded. A successful submission forwards the trimmed text and
/// clears the buffer; a rejected one leaves the buffer as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskInput {
    buffer: String,
}

impl TaskInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    /// Whether the submit action should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.buffer.trim().is_empty()
    }

    pub fn take_submission(&mut self) -> Option<String> {
        let trimmed = self.buffer.trim();
        if trimmed.is_empty() {
            return None;
        }
        let text = trimmed.to_string();
        self.buffer.clear();
        Some(text)
    }

    pub fn submit<B: KeyValueStore>(&mut self, list: &mut TaskList<B>) -> Option<Task> {
        let text = self.take_submission()?;
        list.add_task(&text)
    }
}

impl From<String> for TaskInput {
    fn from(buffer: String) -> Self {
        Self { buffer }
    }
}
