//! In-memory counter state.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use lantern_core::{
    validate_step, CounterState, CounterStore, LanternError, LanternResult, StorageError,
};

/// Counter pair held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    state: Mutex<CounterState>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: CounterState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> LanternResult<MutexGuard<'_, CounterState>> {
        self.state
            .lock()
            .map_err(|_| LanternError::from(StorageError::LockPoisoned))
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn read_state(&self) -> LanternResult<CounterState> {
        Ok(*self.lock()?)
    }

    async fn apply_delta(&self, delta: i64) -> LanternResult<()> {
        let mut state = self.lock()?;
        state.count = state.applied(delta)?;
        Ok(())
    }

    async fn set_step(&self, step: i64) -> LanternResult<()> {
        let step = validate_step(step)?;
        self.lock()?.step = step;
        Ok(())
    }
}
