//! A FIFO of owned strings backed by a singly linked chain of raw nodes.
//!
//! Every node is allocated with `Box` and turned into a raw pointer with
//! `Box::into_raw`; `head`, `tail` and each `next` are plain `*mut Node`.
//! The chain owns the nodes it links, and a node only goes back into a `Box`
//! at the moment it is freed, so no pointer into the chain is ever
//! invalidated by moving an owner around.

use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::ptr;

use tracing::{debug, trace};

use crate::boxed::{try_box, try_copy_str};
use crate::error::{Error, Result};

type Link = *mut Node;

struct Node {
    value: String,
    next: Link,
}

impl Node {
    /// Allocates a detached node holding a copy of `value`, returning the
    /// layout that could not be allocated on failure.
    ///
    /// If the node allocation fails the copied value is dropped here, so
    /// nothing leaks on either failure path.
    fn try_new(value: &str) -> std::result::Result<Link, Layout> {
        let value = try_copy_str(value)?;
        let node = try_box(Node {
            value,
            next: ptr::null_mut(),
        })?;
        Ok(Box::into_raw(node))
    }
}

pub struct Queue {
    head: Link,
    tail: Link,
    size: usize,
}

impl Queue {
    pub fn new() -> Self {
        Queue {
            head: ptr::null_mut(),
            tail: ptr::null_mut(),
            size: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_null()
    }

    /// Copies `value` into a new node in front of the current head.
    ///
    /// On `Err(Error::Alloc)` the queue is exactly as it was.
    pub fn insert_head(&mut self, value: &str) -> Result<()> {
        let node = Node::try_new(value)
            .map_err(Error::Alloc)
            .inspect_err(|e| debug!(%e, "insert at head failed"))?;

        unsafe {
            (*node).next = self.head;
        }
        if self.tail.is_null() {
            self.tail = node;
        }
        self.head = node;
        self.size += 1;

        trace!(size = self.size, "inserted at head");
        Ok(())
    }

    /// Copies `value` into a new node behind the current tail. On an empty
    /// queue this is the same as [`Queue::insert_head`].
    pub fn insert_tail(&mut self, value: &str) -> Result<()> {
        let node = Node::try_new(value)
            .map_err(Error::Alloc)
            .inspect_err(|e| debug!(%e, "insert at tail failed"))?;
        self.link_tail(node);

        trace!(size = self.size, "inserted at tail");
        Ok(())
    }

    fn link_tail(&mut self, node: Link) {
        if self.tail.is_null() {
            self.head = node;
        } else {
            // `tail` is the last live node of this queue's chain.
            unsafe {
                (*self.tail).next = node;
            }
        }
        self.tail = node;
        self.size += 1;
    }

    /// Removes the head node and returns its value.
    pub fn pop_head(&mut self) -> Option<String> {
        if self.head.is_null() {
            return None;
        }

        // The head came from `Box::into_raw` and is unlinked right here, so
        // it is turned back into a `Box` exactly once.
        let node = unsafe { Box::from_raw(self.head) };
        self.head = node.next;
        if self.head.is_null() {
            self.tail = ptr::null_mut();
        }
        self.size -= 1;

        trace!(size = self.size, "removed head");
        Some(node.value)
    }

    /// Removes the head node, copying its value into `buf` when one is given.
    ///
    /// At most `buf.len() - 1` bytes of the value are written, followed by a
    /// NUL terminator. Returns the number of value bytes written, which is 0
    /// when no buffer is given. The node is removed even if the value had to
    /// be truncated.
    pub fn remove_head(&mut self, buf: Option<&mut [u8]>) -> Result<usize> {
        let Some(value) = self.pop_head() else {
            debug!("remove from empty queue");
            return Err(Error::Empty);
        };

        Ok(match buf {
            Some(buf) => copy_truncated(&value, buf),
            None => 0,
        })
    }

    pub fn peek_head(&self) -> Option<&str> {
        unsafe { self.head.as_ref() }.map(|node| node.value.as_str())
    }

    pub fn peek_tail(&self) -> Option<&str> {
        unsafe { self.tail.as_ref() }.map(|node| node.value.as_str())
    }

    /// Reverses the chain in place by flipping every `next` link.
    pub fn reverse(&mut self) {
        if self.size < 2 {
            return;
        }

        let mut prev: Link = ptr::null_mut();
        let mut curr = self.head;
        unsafe {
            while !curr.is_null() {
                let next = (*curr).next;
                (*curr).next = prev;
                prev = curr;
                curr = next;
            }
        }
        self.tail = self.head;
        self.head = prev;

        debug!(size = self.size, "reversed");
    }

    /// Sorts the values in ascending byte-wise order with a top-down merge
    /// sort over the existing nodes.
    ///
    /// Equal values may come out in either relative order. The merge happens
    /// to take from the front half first, but nothing outside this module
    /// should depend on it.
    pub fn sort(&mut self) {
        if self.size < 2 {
            return;
        }

        // The chain is well formed and owned by `self` for the whole call.
        unsafe {
            self.head = merge_sort(self.head);
            self.tail = last_node(self.head);
        }

        debug!(size = self.size, "sorted");
    }

    pub fn clear(&mut self) {
        let mut cur = self.head;
        while !cur.is_null() {
            let node = unsafe { Box::from_raw(cur) };
            cur = node.next;
        }
        self.head = ptr::null_mut();
        self.tail = ptr::null_mut();
        self.size = 0;
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head,
            _marker: PhantomData,
        }
    }
}

fn copy_truncated(value: &str, buf: &mut [u8]) -> usize {
    let Some(room) = buf.len().checked_sub(1) else {
        debug!(len = value.len(), "no room for terminator, value discarded");
        return 0;
    };

    let n = value.len().min(room);
    if n < value.len() {
        debug!(len = value.len(), kept = n, "value truncated on remove");
    }
    buf[..n].copy_from_slice(&value.as_bytes()[..n]);
    buf[n] = 0;
    n
}

// The helpers below take a chain by its first node. Callers must pass null
// or a node of a well-formed chain that nothing else is accessing.

unsafe fn last_node(head: Link) -> Link {
    let mut cur = head;
    unsafe {
        while !cur.is_null() && !(*cur).next.is_null() {
            cur = (*cur).next;
        }
    }
    cur
}

unsafe fn merge_sort(head: Link) -> Link {
    unsafe {
        if head.is_null() || (*head).next.is_null() {
            return head;
        }

        let back = split(head);
        merge(merge_sort(head), merge_sort(back))
    }
}

/// Cuts a chain of at least two nodes after its midpoint and returns the
/// back half.
///
/// `slow` moves one node per step and `fast` two; the cut goes after `slow`
/// once `fast` runs off the chain.
unsafe fn split(head: Link) -> Link {
    unsafe {
        let mut slow = head;
        let mut fast = (*head).next;
        while !fast.is_null() && !(*fast).next.is_null() {
            slow = (*slow).next;
            fast = (*(*fast).next).next;
        }

        let back = (*slow).next;
        (*slow).next = ptr::null_mut();
        back
    }
}

unsafe fn merge(mut left: Link, mut right: Link) -> Link {
    let mut merged: Link = ptr::null_mut();
    let mut tail = &mut merged;

    unsafe {
        while !left.is_null() && !right.is_null() {
            let src = if (*left).value <= (*right).value {
                &mut left
            } else {
                &mut right
            };
            let node = *src;
            *src = (*node).next;
            *tail = node;
            tail = &mut (*node).next;
        }
    }
    *tail = if left.is_null() { right } else { left };

    merged
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Queue {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl PartialEq for Queue {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.iter().eq(other.iter())
    }
}

impl Eq for Queue {}

impl<S: AsRef<str>> Extend<S> for Queue {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for value in iter {
            match Node::try_new(value.as_ref()) {
                Ok(node) => self.link_tail(node),
                // Same behavior as the std collections on OOM.
                Err(layout) => alloc::handle_alloc_error(layout),
            }
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for Queue {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut queue = Queue::new();
        queue.extend(iter);
        queue
    }
}

pub struct Iter<'a> {
    next: *const Node,
    _marker: PhantomData<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        // Nodes stay alive and unmodified while the queue is borrowed.
        let node: &'a Node = unsafe { self.next.as_ref()? };
        self.next = node.next;
        Some(node.value.as_str())
    }
}

impl<'a> IntoIterator for &'a Queue {
    type Item = &'a str;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct IntoIter(Queue);

impl Iterator for IntoIter {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop_head()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len(), Some(self.0.len()))
    }
}

impl ExactSizeIterator for IntoIter {}

impl IntoIterator for Queue {
    type Item = String;
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}
