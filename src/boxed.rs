//! Allocation that reports failure instead of aborting the process.
//!
//! `Box::new` and `String::from` call `handle_alloc_error` when the allocator
//! returns null. Insertion must fail cleanly instead, so nodes and value
//! copies go through these helpers. A failure hands back the `Layout` that
//! could not be satisfied.

use std::alloc::{self, Layout};

pub fn try_box<T>(value: T) -> Result<Box<T>, Layout> {
    let layout = Layout::new::<T>();
    if layout.size() == 0 {
        return Ok(Box::new(value));
    }

    unsafe {
        let ptr = alloc::alloc(layout) as *mut T;
        if ptr.is_null() {
            return Err(layout);
        }
        // `ptr` is fresh memory laid out for `T`, so writing and handing it to
        // `Box` transfers ownership exactly once.
        ptr.write(value);
        Ok(Box::from_raw(ptr))
    }
}

pub fn try_copy_str(s: &str) -> Result<String, Layout> {
    let mut copy = String::new();
    copy.try_reserve_exact(s.len())
        .map_err(|_| Layout::for_value(s.as_bytes()))?;
    copy.push_str(s);
    Ok(copy)
}
