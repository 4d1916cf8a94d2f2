use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use vistrain_core::SessionResult;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot open result store {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write session result: {0}")]
    Write(#[from] std::io::Error),
    #[error("failed to encode session result: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination for completed session summaries.
pub trait SessionSink {
    fn submit(&mut self, result: &SessionResult) -> Result<(), StoreError>;
}

/// Hand a result to a sink without letting a failure reach the session.
pub fn submit_logged<S: SessionSink + ?Sized>(sink: &mut S, result: &SessionResult) -> bool {
    match sink.submit(result) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, mode = %result.mode, "session result not stored");
            false
        }
    }
}

/// Appends one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesStore {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonLinesStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| StoreError::Open {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), "result store opened");
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionSink for JsonLinesStore {
    fn submit(&mut self, result: &SessionResult) -> Result<(), StoreError> {
        serde_json::to_writer(&mut self.writer, result)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps results in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub results: Vec<SessionResult>,
}

impl SessionSink for MemorySink {
    fn submit(&mut self, result: &SessionResult) -> Result<(), StoreError> {
        self.results.push(result.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vistrain_core::TrainingMode;

    struct Broken;

    impl SessionSink for Broken {
        fn submit(&mut self, _: &SessionResult) -> Result<(), StoreError> {
            Err(StoreError::Write(std::io::Error::other("disk full")))
        }
    }

    fn result() -> SessionResult {
        SessionResult::from_trials(TrainingMode::Orientation, 20, &[], None, 12.5)
    }

    #[test]
    fn json_lines_appends_one_object_per_line() {
        let path = std::env::temp_dir().join(format!("vistrain-store-{}.jsonl", std::process::id()));
        let _ = std::fs::remove_file(&path);
        {
            let mut store = JsonLinesStore::open(&path).unwrap();
            store.submit(&result()).unwrap();
            store.submit(&result()).unwrap();
        }
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["totalTrials"], 20);
        assert_eq!(parsed["mode"], "orientation");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn failures_are_swallowed() {
        assert!(!submit_logged(&mut Broken, &result()));
        let mut memory = MemorySink::default();
        assert!(submit_logged(&mut memory, &result()));
        assert_eq!(memory.results.len(), 1);
    }

    #[test]
    fn open_error_names_the_path() {
        let err = JsonLinesStore::open("/nonexistent-dir/results.jsonl").unwrap_err();
        assert!(err.to_string().contains("/nonexistent-dir/results.jsonl"));
    }
}
