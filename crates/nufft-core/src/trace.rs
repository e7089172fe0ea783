//! Structured traces for operator-level calls.
//!
//! Each `plan`/`forward`/`adjoint`/`selfadjoint` invocation appends one entry
//! to a process-global log that tests and hosts can drain with
//! [`take_operator_traces`]. Entries render as single JSON lines.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorTrace {
    pub operation_id: String,
    pub operation: &'static str,
    pub image_elements: usize,
    pub sample_elements: usize,
    pub batch: usize,
    pub timing_ns: u128,
}

impl OperatorTrace {
    #[must_use]
    pub fn to_json_line(&self) -> String {
        format!(
            "{{\"operation_id\":\"{}\",\"operation\":\"{}\",\"image_elements\":{},\"sample_elements\":{},\"batch\":{},\"timing_ns\":{}}}",
            self.operation_id,
            self.operation,
            self.image_elements,
            self.sample_elements,
            self.batch,
            self.timing_ns,
        )
    }
}

static TRACE_LOG: OnceLock<Mutex<Vec<OperatorTrace>>> = OnceLock::new();
static OPERATION_COUNTER: AtomicU64 = AtomicU64::new(1);

fn trace_log() -> &'static Mutex<Vec<OperatorTrace>> {
    TRACE_LOG.get_or_init(|| Mutex::new(Vec::new()))
}

pub(crate) fn next_operation_id() -> String {
    let next = OPERATION_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("nufft-op-{next:016x}")
}

pub(crate) fn record_trace(trace: OperatorTrace) {
    if let Ok(mut log) = trace_log().lock() {
        log.push(trace);
    }
}

/// Drain all recorded traces, oldest first.
#[must_use]
pub fn take_operator_traces() -> Vec<OperatorTrace> {
    if let Ok(mut log) = trace_log().lock() {
        let mut out = Vec::with_capacity(log.len());
        std::mem::swap(&mut *log, &mut out);
        return out;
    }
    Vec::new()
}
