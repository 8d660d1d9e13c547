//! Metric capture for session tests.

use std::future::Future;

use metrics::{SharedString, Unit};
use metrics_util::{
    CompositeKey,
    debugging::{DebugValue, DebuggingRecorder},
};

/// Every metric captured by [`recorded`].
pub type Recorded = Vec<(CompositeKey, Option<Unit>, Option<SharedString>, DebugValue)>;

/// Run `future` on a current-thread runtime with a local debugging recorder
/// installed, returning its output and the recorded metrics.
///
/// # Panics
///
/// Panics if the runtime cannot be built.
pub fn recorded<F: Future>(future: F) -> (F::Output, Recorded) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build test runtime");
    let output = metrics::with_local_recorder(&recorder, || runtime.block_on(future));
    (output, snapshotter.snapshot().into_vec())
}

/// Sum of every counter named `name` whose labels include all of `labels`.
#[must_use]
pub fn counter_total(recorded: &Recorded, name: &str, labels: &[(&str, &str)]) -> u64 {
    recorded
        .iter()
        .filter(|(key, _, _, _)| {
            key.key().name() == name
                && labels.iter().all(|(label, value)| {
                    key.key()
                        .labels()
                        .any(|l| l.key() == *label && l.value() == *value)
                })
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(count) => *count,
            _ => 0,
        })
        .sum()
}
