use std::sync::atomic::{AtomicUsize, Ordering};

// Single static counter for all scene objects
static NEXT_OBJECT_ID: AtomicUsize = AtomicUsize::new(1);

pub fn generate_id() -> usize {
    NEXT_OBJECT_ID.fetch_add(1, Ordering::SeqCst)
}

/// Prefix of every saved drawing id
pub const DRAWING_ID_PREFIX: &str = "drawing-";

/// Fresh id for a saved drawing record. UUID v7 is time-ordered, so ids sort
/// by creation time and never collide within the same millisecond.
pub fn generate_drawing_id() -> String {
    format!("{}{}", DRAWING_ID_PREFIX, uuid::Uuid::now_v7().simple())
}
