use std::sync::atomic::{AtomicU64, Ordering};

// IDs are process-global, monotonically increasing counters. Keyframe identities key the
// tracker's fired-set, so they must never collide across sequences.
static NEXT_KEYFRAME_ID: AtomicU64 = AtomicU64::new(0);
static NEXT_SEQUENCE_ID: AtomicU64 = AtomicU64::new(0);

pub(crate) fn next_keyframe_id() -> u64 {
    NEXT_KEYFRAME_ID.fetch_add(1, Ordering::Relaxed)
}

pub(crate) fn next_sequence_id() -> u64 {
    NEXT_SEQUENCE_ID.fetch_add(1, Ordering::Relaxed)
}
