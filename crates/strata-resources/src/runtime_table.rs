// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Per-instance registry of queues, keyed custom data and teardown sweeps.
//!
//! The [`RuntimeTable`] holds state that lives outside the core device objects:
//! memoized queue handles, backend- or extension-specific data stored under a
//! string key, and callbacks run at two teardown points. A sweep callback is
//! paired with a data key and only runs if that key is still present, so
//! removing the data disables its callback.

use std::any::Any;
use std::collections::HashMap;

use strata_core::renderer::api::*;
use strata_core::renderer::{GraphicsBackend, ResourceError};

type SweepFn = Box<dyn FnOnce(&mut (dyn Any + Send + Sync)) + Send>;

struct SweepCallback {
    key: String,
    callback: SweepFn,
}

/// When a sweep callback runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SweepPhase {
    /// On an explicit [`RuntimeTable::early_sweep`], before dependent teardown.
    Early,
    /// When the table itself is dropped.
    Drop,
}

/// A registry attached to one backend instance.
#[derive(Default)]
pub struct RuntimeTable {
    queues: HashMap<(DeviceId, QueueType, u32), QueueId>,
    custom_data: HashMap<String, Box<dyn Any + Send + Sync>>,
    early_sweeps: Vec<SweepCallback>,
    drop_sweeps: Vec<SweepCallback>,
}

impl std::fmt::Debug for RuntimeTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.custom_data.keys().collect();
        keys.sort();
        f.debug_struct("RuntimeTable")
            .field("queues", &self.queues.len())
            .field("custom_data", &keys)
            .field("early_sweeps", &self.early_sweeps.len())
            .field("drop_sweeps", &self.drop_sweeps.len())
            .finish()
    }
}

impl RuntimeTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Queues ---

    /// Returns the queue for `(device, queue_type, index)`, asking the backend
    /// only the first time.
    pub fn get_queue(
        &mut self,
        backend: &dyn GraphicsBackend,
        queue_type: QueueType,
        index: u32,
    ) -> Result<QueueId, ResourceError> {
        let key = (backend.device_id(), queue_type, index);
        if let Some(queue) = self.queues.get(&key) {
            return Ok(*queue);
        }
        let queue = backend.get_queue(queue_type, index)?;
        self.queues.insert(key, queue);
        Ok(queue)
    }

    /// Returns a queue that was already resolved.
    #[must_use]
    pub fn try_get_queue(
        &self,
        device: DeviceId,
        queue_type: QueueType,
        index: u32,
    ) -> Option<QueueId> {
        self.queues.get(&(device, queue_type, index)).copied()
    }

    /// Records a queue obtained elsewhere.
    pub fn add_queue(&mut self, device: DeviceId, queue_type: QueueType, index: u32, queue: QueueId) {
        self.queues.insert((device, queue_type, index), queue);
    }

    // --- Custom data ---

    /// Stores `value` under `key`, returning the value it replaced.
    pub fn add_custom_data<T: Any + Send + Sync>(
        &mut self,
        key: impl Into<String>,
        value: T,
    ) -> Option<Box<dyn Any + Send + Sync>> {
        self.custom_data.insert(key.into(), Box::new(value))
    }

    /// Retrieves the value stored under `key` if it has type `T`.
    #[must_use]
    pub fn try_get_custom_data<T: Any>(&self, key: &str) -> Option<&T> {
        self.custom_data
            .get(key)
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Retrieves the value stored under `key` mutably if it has type `T`.
    pub fn try_get_custom_data_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.custom_data
            .get_mut(key)
            .and_then(|value| value.downcast_mut::<T>())
    }

    /// Removes the value stored under `key`, disabling any sweep paired with it.
    pub fn remove_custom_data(&mut self, key: &str) -> Option<Box<dyn Any + Send + Sync>> {
        self.custom_data.remove(key)
    }

    /// Returns `true` if a value is stored under `key`.
    #[must_use]
    pub fn contains_custom_data(&self, key: &str) -> bool {
        self.custom_data.contains_key(key)
    }

    // --- Sweeps ---

    /// Registers a callback for `phase`, paired with the data stored under `key`.
    pub fn add_sweep<F>(&mut self, phase: SweepPhase, key: impl Into<String>, callback: F)
    where
        F: FnOnce(&mut (dyn Any + Send + Sync)) + Send + 'static,
    {
        let sweep = SweepCallback {
            key: key.into(),
            callback: Box::new(callback),
        };
        match phase {
            SweepPhase::Early => self.early_sweeps.push(sweep),
            SweepPhase::Drop => self.drop_sweeps.push(sweep),
        }
    }

    /// Registers a callback receiving the paired data as `T`.
    ///
    /// If the data has another type when the sweep runs, the callback is skipped
    /// with a warning.
    pub fn add_typed_sweep<T, F>(&mut self, phase: SweepPhase, key: impl Into<String>, callback: F)
    where
        T: Any,
        F: FnOnce(&mut T) + Send + 'static,
    {
        let key = key.into();
        let label = key.clone();
        self.add_sweep(phase, key, move |data| match data.downcast_mut::<T>() {
            Some(value) => callback(value),
            None => log::warn!(
                "RuntimeTable: Data under '{}' is not a {}, skipping its sweep",
                label,
                std::any::type_name::<T>()
            ),
        });
    }

    /// Runs the early-phase callbacks once, in registration order.
    ///
    /// Returns the number of callbacks that ran.
    pub fn early_sweep(&mut self) -> usize {
        let sweeps = std::mem::take(&mut self.early_sweeps);
        self.run_sweeps(sweeps)
    }

    fn run_sweeps(&mut self, sweeps: Vec<SweepCallback>) -> usize {
        let mut ran = 0;
        for sweep in sweeps {
            match self.custom_data.get_mut(&sweep.key) {
                Some(data) => {
                    (sweep.callback)(&mut **data);
                    ran += 1;
                }
                None => log::debug!(
                    "RuntimeTable: '{}' was removed, skipping its sweep",
                    sweep.key
                ),
            }
        }
        ran
    }
}

impl Drop for RuntimeTable {
    fn drop(&mut self) {
        let sweeps = std::mem::take(&mut self.drop_sweeps);
        let ran = self.run_sweeps(sweeps);
        if ran > 0 {
            log::debug!("RuntimeTable: Ran {ran} drop sweeps");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use strata_infra::HeadlessBackend;

    struct ExtensionState {
        handles: Vec<u32>,
    }

    #[test]
    fn test_queue_lookups_are_memoized() {
        let backend = HeadlessBackend::new();
        let mut table = RuntimeTable::new();

        let first = table.get_queue(&backend, QueueType::Graphics, 0).unwrap();
        let second = table.get_queue(&backend, QueueType::Graphics, 0).unwrap();
        assert_eq!(first, second);
        assert_eq!(backend.call_counts().get_queue, 1);
        assert_eq!(
            table.try_get_queue(backend.device_id(), QueueType::Graphics, 0),
            Some(first)
        );
        assert!(table
            .try_get_queue(backend.device_id(), QueueType::Compute, 0)
            .is_none());
    }

    #[test]
    fn test_failed_queue_lookup_is_not_cached() {
        let backend = HeadlessBackend::with_queue_counts(1, 0, 0);
        let mut table = RuntimeTable::new();
        assert!(table.get_queue(&backend, QueueType::Compute, 0).is_err());
        assert!(table.get_queue(&backend, QueueType::Compute, 0).is_err());
        assert_eq!(backend.call_counts().get_queue, 2);
    }

    #[test]
    fn test_custom_data_round_trip() {
        let mut table = RuntimeTable::new();
        assert!(table
            .add_custom_data("ext.debug", ExtensionState { handles: vec![1] })
            .is_none());
        table
            .try_get_custom_data_mut::<ExtensionState>("ext.debug")
            .unwrap()
            .handles
            .push(2);
        assert_eq!(
            table
                .try_get_custom_data::<ExtensionState>("ext.debug")
                .unwrap()
                .handles,
            vec![1, 2]
        );
        assert!(table.try_get_custom_data::<u32>("ext.debug").is_none());
        assert!(table.remove_custom_data("ext.debug").is_some());
        assert!(!table.contains_custom_data("ext.debug"));
    }

    #[test]
    fn test_early_sweep_runs_once_and_only_for_present_keys() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut table = RuntimeTable::new();
        table.add_custom_data("kept", ExtensionState { handles: vec![] });
        table.add_custom_data("removed", ExtensionState { handles: vec![] });

        for key in ["kept", "removed"] {
            let counter = counter.clone();
            table.add_typed_sweep::<ExtensionState, _>(SweepPhase::Early, key, move |state| {
                state.handles.clear();
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        table.remove_custom_data("removed");

        assert_eq!(table.early_sweep(), 1);
        assert_eq!(table.early_sweep(), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_sweep_runs_when_table_is_dropped() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let mut table = RuntimeTable::new();
            table.add_custom_data("pool", 5u32);
            let c = counter.clone();
            table.add_sweep(SweepPhase::Drop, "pool", move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            });
            table.early_sweep();
            assert_eq!(counter.load(Ordering::SeqCst), 0);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_typed_sweep_with_wrong_type_is_skipped() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut table = RuntimeTable::new();
        table.add_custom_data("value", 1u64);
        let c = counter.clone();
        table.add_typed_sweep::<String, _>(SweepPhase::Early, "value", move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        table.early_sweep();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
