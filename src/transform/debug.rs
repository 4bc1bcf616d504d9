use chrono::Utc;
use std::fs;
use std::path::PathBuf;

/// Best-effort sink for raw service responses that failed to parse.
///
/// Recording never fails the pipeline: problems creating the directory or
/// writing the file are logged and swallowed.
#[derive(Clone, Debug, Default)]
pub struct DebugSink {
    directory: Option<PathBuf>,
}

impl DebugSink {
    pub fn new(directory: impl Into<PathBuf>) -> DebugSink {
        DebugSink {
            directory: Some(directory.into()),
        }
    }

    pub fn disabled() -> DebugSink {
        DebugSink { directory: None }
    }

    /// Writes `content` to a timestamped artifact file, if enabled.
    pub fn record(&self, content: &str) {
        let Some(directory) = &self.directory else {
            return;
        };
        if let Err(error) = fs::create_dir_all(directory) {
            tracing::warn!(%error, "cannot create debug artifact directory");
            return;
        }
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%6f");
        let path = directory.join(format!("llm_raw_{}Z.txt", stamp));
        if let Err(error) = fs::write(&path, content) {
            tracing::warn!(%error, path = %path.display(), "cannot write debug artifact");
        }
    }
}
