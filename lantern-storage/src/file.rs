//! Counter state as two plain-text files.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lantern_core::{validate_step, CounterState, CounterStore, LanternResult, StorageError};
use tracing::{debug, warn};

pub const COUNT_FILE: &str = "count.txt";
pub const STEP_FILE: &str = "step.txt";

/// Stores `count` and `step` as decimal text in `count.txt` and `step.txt`.
///
/// Missing or unparsable files read as the defaults. Writes are not
/// coordinated: concurrent writers race and the last one wins.
#[derive(Debug, Clone)]
pub struct FileCounterStore {
    dir: PathBuf,
}

impl FileCounterStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_value(&self, file: &str, default: i64) -> LanternResult<i64> {
        let path = self.dir.join(file);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text.trim().parse().unwrap_or_else(|_| {
                warn!(path = %path.display(), "unparsable counter file, using default");
                default
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(default),
            Err(e) => Err(StorageError::ReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
            .into()),
        }
    }

    async fn write_value(&self, file: &str, value: i64) -> LanternResult<()> {
        let path = self.dir.join(file);
        let write_failed = |e: std::io::Error| StorageError::WriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        };
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(write_failed)?;
        tokio::fs::write(&path, value.to_string())
            .await
            .map_err(write_failed)?;
        debug!(path = %path.display(), value, "counter file written");
        Ok(())
    }
}

#[async_trait]
impl CounterStore for FileCounterStore {
    async fn read_state(&self) -> LanternResult<CounterState> {
        Ok(CounterState {
            count: self.read_value(COUNT_FILE, CounterState::DEFAULT_COUNT).await?,
            step: self.read_value(STEP_FILE, CounterState::DEFAULT_STEP).await?,
        })
    }

    async fn apply_delta(&self, delta: i64) -> LanternResult<()> {
        let state = self.read_state().await?;
        let count = state.applied(delta)?;
        self.write_value(COUNT_FILE, count).await
    }

    async fn set_step(&self, step: i64) -> LanternResult<()> {
        let step = validate_step(step)?;
        self.write_value(STEP_FILE, step).await
    }
}
