use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type Timestamp = DateTime<Utc>;

/// A single todo entry. Only `completed` can change after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: String,
    text: String,
    completed: bool,
    #[serde(with = "iso_timestamp")]
    created_at: Timestamp,
}

impl Task {
    /// Creates an open task with a fresh UUID, stamped with the current time.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            completed: false,
            // Stored timestamps carry millisecond precision; match it so a reload is lossless.
            created_at: Utc::now().trunc_subsecs(3),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub(crate) fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    #[default]
    All,
    Active,
    Completed,
}

impl FilterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::All => "all",
            FilterType::Active => "active",
            FilterType::Completed => "completed",
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            FilterType::All => true,
            FilterType::Active => !task.completed,
            FilterType::Completed => task.completed,
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFilterError(String);

impl fmt::Display for ParseFilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown filter: {}", self.0)
    }
}

impl std::error::Error for ParseFilterError {}

impl FromStr for FilterType {
    type Err = ParseFilterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(FilterType::All),
            "active" => Ok(FilterType::Active),
            "completed" => Ok(FilterType::Completed),
            other => Err(ParseFilterError(other.to_string())),
        }
    }
}

/// The record kept under [`crate::storage::TASKS_KEY`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(alias = "todos")]
    pub tasks: Vec<Task>,
    #[serde(default, deserialize_with = "lenient_filter")]
    pub filter: FilterType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
}

/// Everything the UI renders: the filtered list plus filter, counts and load status.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskListView {
    pub tasks: Vec<Task>,
    pub filter: FilterType,
    pub stats: Stats,
    pub loaded: bool,
}

// Missing, null, empty or unrecognised filters all read back as `all`.
fn lenient_filter<'de, D>(deserializer: D) -> Result<FilterType, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default())
}

mod iso_timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    // Local date-time forms without an offset; read as UTC.
    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(raw.trim()).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid ISO-8601 timestamp: {raw:?}"))
        })
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
            return Some(value.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_task_is_open_with_unique_id() {
        let a = Task::new("write report");
        let b = Task::new("write report");
        assert_eq!(a.text(), "write report");
        assert!(!a.completed());
        assert!(!a.id().is_empty());
        assert_ne!(a.id(), b.id());
        assert_eq!(a.created_at().timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn task_serializes_with_camel_case_and_iso_timestamp() {
        let json = r#"{"id":"1","text":"Stored todo","completed":false,"createdAt":"2023-01-01T00:00:00.000Z"}"#;
        let task: Task = serde_json::from_str(json).expect("task should deserialize");
        assert_eq!(task.id(), "1");
        assert_eq!(
            task.created_at(),
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).single().unwrap()
        );

        let value = serde_json::to_value(&task).expect("serialize task");
        assert_eq!(
            value,
            serde_json::json!({
              "id": "1",
              "text": "Stored todo",
              "completed": false,
              "createdAt": "2023-01-01T00:00:00.000Z"
            })
        );
    }

    #[test]
    fn task_accepts_offset_timestamps() {
        let json = r#"{"id":"1","text":"t","completed":true,"createdAt":"2023-01-01T03:00:00+03:00"}"#;
        let task: Task = serde_json::from_str(json).expect("task should deserialize");
        assert_eq!(
            task.created_at(),
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).single().unwrap()
        );
    }

    #[test]
    fn timestamps_without_offset_read_as_utc() {
        let expected = Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).single().unwrap();
        assert_eq!(iso_timestamp::parse("2023-01-01T10:00:00.000"), Some(expected));
        assert_eq!(iso_timestamp::parse("2023-01-01T10:00:00"), Some(expected));
        assert_eq!(iso_timestamp::parse("2023-01-01T10:00"), Some(expected));
        assert_eq!(
            iso_timestamp::parse("2023-01-01"),
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).single()
        );
        assert_eq!(iso_timestamp::parse("2023-01-01T10:00:00.000Z"), Some(expected));
        assert_eq!(iso_timestamp::parse("01/01/2023"), None);
    }

    #[test]
    fn task_rejects_malformed_timestamp() {
        let json = r#"{"id":"1","text":"t","completed":false,"createdAt":"yesterday"}"#;
        assert!(serde_json::from_str::<Task>(json).is_err());
    }

    #[test]
    fn toggle_flips_completion_only() {
        let mut task = Task::new("a");
        let before = task.clone();
        task.toggle();
        assert!(task.completed());
        assert_eq!(task.id(), before.id());
        assert_eq!(task.created_at(), before.created_at());
        task.toggle();
        assert_eq!(task, before);
    }

    #[test]
    fn filter_parses_and_displays_wire_names() {
        for filter in [FilterType::All, FilterType::Active, FilterType::Completed] {
            assert_eq!(filter.to_string().parse::<FilterType>(), Ok(filter));
        }
        assert!("Active".parse::<FilterType>().is_err());
        assert_eq!(
            serde_json::to_value(FilterType::Completed).unwrap(),
            serde_json::json!("completed")
        );
    }

    #[test]
    fn filter_matches_by_completion() {
        let open = Task::new("open");
        let mut done = Task::new("done");
        done.toggle();

        assert!(FilterType::All.matches(&open) && FilterType::All.matches(&done));
        assert!(FilterType::Active.matches(&open) && !FilterType::Active.matches(&done));
        assert!(!FilterType::Completed.matches(&open) && FilterType::Completed.matches(&done));
    }

    #[test]
    fn persisted_state_defaults_missing_or_falsy_filter_to_all() {
        for json in [
            r#"{"tasks":[]}"#,
            r#"{"tasks":[],"filter":null}"#,
            r#"{"tasks":[],"filter":""}"#,
            r#"{"tasks":[],"filter":false}"#,
            r#"{"tasks":[],"filter":"archived"}"#,
        ] {
            let state: PersistedState = serde_json::from_str(json).expect(json);
            assert_eq!(state.filter, FilterType::All, "{json}");
        }

        let state: PersistedState =
            serde_json::from_str(r#"{"tasks":[],"filter":"active"}"#).unwrap();
        assert_eq!(state.filter, FilterType::Active);
    }

    #[test]
    fn persisted_state_reads_legacy_todos_field() {
        let json = r#"
        {
          "todos": [
            { "id": "1", "text": "Stored todo", "completed": false, "createdAt": "2023-01-01T00:00:00.000Z" }
          ],
          "filter": "completed"
        }
        "#;
        let state: PersistedState = serde_json::from_str(json).expect("legacy record");
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.filter, FilterType::Completed);

        let value = serde_json::to_value(&state).unwrap();
        assert!(value.get("tasks").is_some());
        assert!(value.get("todos").is_none());
    }

    #[test]
    fn persisted_state_requires_task_list() {
        assert!(serde_json::from_str::<PersistedState>(r#"{"filter":"all"}"#).is_err());
        assert!(serde_json::from_str::<PersistedState>("null").is_err());
    }

    #[test]
    fn view_serializes_for_the_frontend() {
        let view = TaskListView {
            tasks: Vec::new(),
            filter: FilterType::Active,
            stats: Stats::default(),
            loaded: true,
        };
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            serde_json::json!({
              "tasks": [],
              "filter": "active",
              "stats": { "total": 0, "completed": 0, "active": 0 },
              "loaded": true
            })
        );
    }
}
