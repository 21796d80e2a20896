use std::path::{Path, PathBuf};

pub const LOG_DIR: &str = "logs";
pub const LOG_FILE_BASENAME: &str = "todo-app";
pub const LOG_FILE_SUFFIX: &str = "log";
pub const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const LOG_ROTATE_KEEP_FILES: usize = 10;
pub const LOG_ENV_VAR: &str = "TODO_APP_LOG";

/// Log files sit next to the task data, in their own subdirectory.
pub fn log_directory(app_data_dir: &Path) -> PathBuf {
    app_data_dir.join(LOG_DIR)
}

/// Picks the first non-blank spec from the app variable, then `RUST_LOG`, then the build default.
pub fn resolve_log_spec(app_var: Option<String>, rust_log: Option<String>) -> String {
    let default_spec = if cfg!(debug_assertions) {
        "warn,todo_app_lib=debug"
    } else {
        "warn,todo_app_lib=info"
    };
    app_var
        .filter(|value| !value.trim().is_empty())
        .or_else(|| rust_log.filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| default_spec.to_string())
}

#[cfg(all(feature = "app", not(test)))]
pub fn init_logging(app_data_dir: &Path) -> Result<(), flexi_logger::FlexiLoggerError> {
    use flexi_logger::{
        detailed_format, Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming, WriteMode,
    };

    let directory = log_directory(app_data_dir);
    std::fs::create_dir_all(&directory)?;

    let spec = resolve_log_spec(
        std::env::var(LOG_ENV_VAR).ok(),
        std::env::var("RUST_LOG").ok(),
    );

    Logger::try_with_str(spec)?
        .log_to_file(
            FileSpec::default()
                .directory(&directory)
                .basename(LOG_FILE_BASENAME)
                .suffix(LOG_FILE_SUFFIX),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_files(detailed_format)
        .rotate(
            Criterion::Size(LOG_ROTATE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(LOG_ROTATE_KEEP_FILES),
        )
        .duplicate_to_stdout(if cfg!(debug_assertions) {
            Duplicate::Info
        } else {
            Duplicate::None
        })
        .start()?;

    install_panic_hook();

    log::info!(
        "logger initialized dir={} rotate_size_bytes={} keep_files={}",
        directory.display(),
        LOG_ROTATE_SIZE_BYTES,
        LOG_ROTATE_KEEP_FILES
    );
    Ok(())
}

/// Best-effort text of a panic payload; `panic!` produces either `&str` or `String`.
pub fn panic_payload_text(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&str>() {
        *text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.as_str()
    } else {
        "<opaque payload>"
    }
}

#[cfg(all(feature = "app", not(test)))]
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info: &std::panic::PanicHookInfo<'_>| {
        let thread = std::thread::current();
        let location = match info.location() {
            Some(loc) => format!("{}:{}", loc.file(), loc.line()),
            None => String::from("?"),
        };
        log::error!(
            "panic thread={} at={location}: {}\n{}",
            thread.name().unwrap_or("unnamed"),
            panic_payload_text(info.payload()),
            std::backtrace::Backtrace::force_capture()
        );
        log::logger().flush();
        previous(info);
    }));
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_directory_is_a_subdirectory_of_app_data() {
        let dir = Path::new("/tmp/app");
        assert_eq!(log_directory(dir), Path::new("/tmp/app/logs"));
    }

    #[test]
    fn resolve_log_spec_prefers_app_variable() {
        assert_eq!(
            resolve_log_spec(Some("trace".into()), Some("info".into())),
            "trace"
        );
        assert_eq!(resolve_log_spec(Some("  ".into()), Some("info".into())), "info");
        assert_eq!(resolve_log_spec(None, Some("error".into())), "error");
    }

    #[test]
    fn resolve_log_spec_falls_back_to_build_default() {
        let spec = resolve_log_spec(None, Some(String::new()));
        assert!(spec.starts_with("warn,todo_app_lib="));
    }

    #[test]
    fn panic_payload_text_reads_str_and_string() {
        let static_payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_payload_text(static_payload.as_ref()), "boom");

        let owned = std::panic::catch_unwind(|| panic!("code {}", 7)).unwrap_err();
        assert_eq!(panic_payload_text(owned.as_ref()), "code 7");

        let other: Box<dyn std::any::Any + Send> = Box::new(42_u8);
        assert_eq!(panic_payload_text(other.as_ref()), "<opaque payload>");
    }

    #[test]
    fn capture_records_errors_for_current_thread() {
        capture::install();
        log::info!("not an error");
        log::error!("broken op=test");
        assert_eq!(capture::errors(), vec!["broken op=test".to_string()]);

        capture::install();
        assert!(capture::errors().is_empty());
    }
}
