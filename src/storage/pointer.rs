//! # Interior-Page Pointers
//!
//! An interior B-tree page with N cells yields N+1 `Pointer` values, one per
//! child subtree. Each pointer carries the half-open key range the child
//! covers: `None` endpoints are unbounded, `Some(k)` endpoints are inclusive.
//! The first pointer is left-unbounded, the last is right-unbounded and names
//! the page's right-most child.

#[derive(Debug, Clone, PartialEq)]
pub struct Pointer<K> {
    pub left: Option<K>,
    pub right: Option<K>,
    pub child: u32,
}

impl<K> Pointer<K> {
    pub fn new(left: Option<K>, right: Option<K>, child: u32) -> Self {
        Self { left, right, child }
    }
}
