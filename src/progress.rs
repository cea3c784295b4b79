//! Progress reporting hook.
//!
//! The engine itself has no process-wide progress singleton (§9: "there
//! is no process-wide progress singleton"). Callers that want feedback
//! pass a `&dyn ProgressSink`; the engine calls it synchronously from
//! whichever thread finishes a block. Simplified from this codebase's
//! original `ProgressTracker`, which weighted files/bytes/shards — GXD
//! has only blocks, so there is nothing to weight against.

/// Caller-supplied progress callback. Implemented for any
/// `Fn(u64, u64, u64) + Send + Sync` closure via the blanket impl below,
/// so most callers never need to name this trait directly.
pub trait ProgressSink: Send + Sync {
    /// Called after each block is written (compress) or emitted
    /// (decompress/seek). `done`/`total` are block counts; `bytes` is
    /// that block's original (decoded) size.
    fn on_block_done(&self, done: u64, total: u64, bytes: u64);
}

impl<F> ProgressSink for F
where
    F: Fn(u64, u64, u64) + Send + Sync,
{
    fn on_block_done(&self, done: u64, total: u64, bytes: u64) {
        self(done, total, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[test]
    fn closure_sink_receives_calls() {
        let total_bytes = Arc::new(AtomicU64::new(0));
        let tb = total_bytes.clone();
        let sink: Box<dyn ProgressSink> = Box::new(move |_done: u64, _total: u64, bytes: u64| {
            tb.fetch_add(bytes, Ordering::Relaxed);
        });
        sink.on_block_done(1, 2, 10);
        sink.on_block_done(2, 2, 5);
        assert_eq!(total_bytes.load(Ordering::Relaxed), 15);
    }
}
