//! The queue operations over an optional queue handle.
//!
//! Callers that may hold no queue at all (a command driver that has not run
//! `new` yet, or whose `new` failed) go through these functions. An absent
//! queue is never a fault: inserts and removes report `false`, `size` reports
//! 0, and everything else does nothing.

use tracing::debug;

use crate::boxed::try_box;
use crate::error::{Error, Result};
use crate::queue::Queue;

fn present<T>(queue: Option<T>) -> Result<T> {
    queue.ok_or_else(|| {
        debug!("operation on absent queue");
        Error::Absent
    })
}

/// Allocates an empty queue. `None` only if the allocation fails.
pub fn new() -> Option<Box<Queue>> {
    try_box(Queue::new())
        .map_err(Error::Alloc)
        .inspect_err(|e| debug!(%e, "queue allocation failed"))
        .ok()
}

/// Releases the queue, every node, and every value.
pub fn free(queue: Option<Box<Queue>>) {
    drop(queue);
}

pub fn insert_head(queue: Option<&mut Queue>, value: &str) -> bool {
    present(queue)
        .and_then(|queue| queue.insert_head(value))
        .is_ok()
}

pub fn insert_tail(queue: Option<&mut Queue>, value: &str) -> bool {
    present(queue)
        .and_then(|queue| queue.insert_tail(value))
        .is_ok()
}

/// Removes the head, copying its value into `buf` (truncated and
/// NUL-terminated) when a buffer is given.
pub fn remove_head(queue: Option<&mut Queue>, buf: Option<&mut [u8]>) -> bool {
    present(queue)
        .and_then(|queue| queue.remove_head(buf))
        .is_ok()
}

pub fn size(queue: Option<&Queue>) -> usize {
    queue.map_or(0, Queue::len)
}

pub fn reverse(queue: Option<&mut Queue>) {
    if let Ok(queue) = present(queue) {
        queue.reverse();
    }
}

pub fn sort(queue: Option<&mut Queue>) {
    if let Ok(queue) = present(queue) {
        queue.sort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(queue: &Queue) -> Vec<&str> {
        queue.iter().collect()
    }

    #[test]
    fn absent_queue() {
        assert!(!insert_head(None, "a"));
        assert!(!insert_tail(None, "a"));
        assert!(!remove_head(None, None));
        assert_eq!(size(None), 0);
        reverse(None);
        sort(None);
        free(None);
    }

    #[test]
    fn lifecycle() {
        let mut queue = new();
        assert_eq!(size(queue.as_deref()), 0);
        assert!(!remove_head(queue.as_deref_mut(), None));

        assert!(insert_tail(queue.as_deref_mut(), "banana"));
        assert!(insert_tail(queue.as_deref_mut(), "apple"));
        assert!(insert_head(queue.as_deref_mut(), "cherry"));
        assert_eq!(size(queue.as_deref()), 3);

        sort(queue.as_deref_mut());
        assert_eq!(
            queue.as_deref().map(contents),
            Some(vec!["apple", "banana", "cherry"])
        );

        reverse(queue.as_deref_mut());
        let mut buf = [0u8; 16];
        assert!(remove_head(queue.as_deref_mut(), Some(&mut buf[..])));
        assert_eq!(&buf[..7], b"cherry\0");
        assert_eq!(size(queue.as_deref()), 2);

        free(queue);
    }
}
