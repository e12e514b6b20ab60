//! Handle registries
//!
//! A script cannot hold native objects, only cells. Every object the bridge
//! creates is parked in a registry and the script gets back an opaque handle.
//! Handles are validated against the live set on every call, so a stale,
//! forged or foreign value simply fails to resolve.
//!
//! Handle values come from one process-wide sequence shared by every
//! registry in every script. Two live objects never share a value, a value
//! is never handed out again while still live, and a value minted for one
//! registry can never resolve in another.

use std::sync::atomic::{AtomicU32, Ordering};

use amx_sdk::Cell;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{HandleKind, RegexError, RegexResult};

// ============================================================================
// Handle allocation
// ============================================================================

static NEXT_HANDLE: AtomicU32 = AtomicU32::new(1);

/// Next positive handle value; wraps back to 1 after `i32::MAX`.
fn next_handle() -> Cell {
    let prev = NEXT_HANDLE
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |h| {
            Some(if h >= i32::MAX as u32 { 1 } else { h + 1 })
        })
        .unwrap_or_else(|h| h);
    prev as Cell
}

// ============================================================================
// Registry
// ============================================================================

/// Thread-safe registry mapping handles to owned objects of one kind.
pub struct HandleRegistry<T> {
    kind: HandleKind,
    map: DashMap<Cell, T>,
}

impl<T> HandleRegistry<T> {
    /// Create an empty registry for objects of `kind`.
    pub fn new(kind: HandleKind) -> Self {
        Self {
            kind,
            map: DashMap::new(),
        }
    }

    /// Take ownership of `value` and return its handle (never 0).
    pub fn insert(&self, value: T) -> Cell {
        loop {
            // Only after the sequence wraps can a value still be live here.
            if let Entry::Vacant(slot) = self.map.entry(next_handle()) {
                let handle = *slot.key();
                slot.insert(value);
                return handle;
            }
        }
    }

    /// Run `f` against the object behind `handle`. The reference does not
    /// escape the call.
    pub fn with<F, R>(&self, handle: Cell, f: F) -> Option<R>
    where
        F: FnOnce(&T) -> R,
    {
        if handle == 0 {
            return None;
        }
        self.map.get(&handle).map(|entry| f(entry.value()))
    }

    /// Like [`with`](Self::with), but an unknown handle is an
    /// `InvalidHandle` error for this registry's kind.
    pub fn resolve<F, R>(&self, handle: Cell, f: F) -> RegexResult<R>
    where
        F: FnOnce(&T) -> R,
    {
        self.with(handle, f).ok_or(RegexError::InvalidHandle {
            kind: self.kind,
            handle,
        })
    }

    /// Whether `handle` is currently live.
    pub fn contains(&self, handle: Cell) -> bool {
        handle != 0 && self.map.contains_key(&handle)
    }

    /// Destroy the object behind `handle`. Returns whether anything was
    /// removed.
    pub fn remove(&self, handle: Cell) -> bool {
        self.map.remove(&handle).is_some()
    }

    /// Destroy every object; returns how many there were.
    pub fn clear(&self) -> usize {
        let mut dropped = 0;
        self.map.retain(|_, _| {
            dropped += 1;
            false
        });
        dropped
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no objects are live.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_resolve() {
        let reg = HandleRegistry::new(HandleKind::Regex);
        let h = reg.insert(String::from("abc"));
        assert_ne!(h, 0);
        assert_eq!(reg.with(h, |s| s.clone()), Some("abc".to_string()));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_zero_never_resolves() {
        let reg = HandleRegistry::new(HandleKind::Regex);
        reg.insert(1u8);
        assert!(reg.with(0, |_| ()).is_none());
        assert!(!reg.contains(0));
        assert!(!reg.remove(0));
    }

    #[test]
    fn test_remove_once() {
        let reg = HandleRegistry::new(HandleKind::MatchResults);
        let h = reg.insert(vec![1, 2, 3]);
        assert!(reg.remove(h));
        assert!(!reg.remove(h));
        assert!(reg.with(h, |_| ()).is_none());
        assert_eq!(
            reg.resolve(h, |_| ()),
            Err(RegexError::InvalidHandle {
                kind: HandleKind::MatchResults,
                handle: h,
            })
        );
    }

    #[test]
    fn test_handles_unique_across_registries() {
        let patterns = HandleRegistry::new(HandleKind::Regex);
        let matches = HandleRegistry::new(HandleKind::MatchResults);
        let p = patterns.insert("pattern");
        let m = matches.insert("match");
        assert_ne!(p, m);
        assert!(matches.with(p, |_| ()).is_none());
        assert!(patterns.with(m, |_| ()).is_none());
    }

    #[test]
    fn test_freed_handle_not_reissued() {
        let reg = HandleRegistry::new(HandleKind::Regex);
        let a = reg.insert(1);
        reg.remove(a);
        let b = reg.insert(2);
        assert_ne!(a, b);
        assert!(reg.with(a, |_| ()).is_none());
    }

    #[test]
    fn test_clear() {
        let reg = HandleRegistry::new(HandleKind::Regex);
        let handles: Vec<_> = (0..5).map(|i| reg.insert(i)).collect();
        assert_eq!(reg.clear(), 5);
        assert!(reg.is_empty());
        assert!(handles.iter().all(|&h| !reg.contains(h)));
    }

    #[test]
    fn test_concurrent_inserts_are_distinct() {
        let reg = std::sync::Arc::new(HandleRegistry::new(HandleKind::Regex));
        let threads: Vec<_> = (0..4)
            .map(|t| {
                let reg = reg.clone();
                std::thread::spawn(move || (0..100).map(|i| reg.insert(t * 100 + i)).collect::<Vec<_>>())
            })
            .collect();
        let mut all: Vec<Cell> = threads.into_iter().flat_map(|t| t.join().unwrap()).collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 400);
        assert_eq!(reg.len(), 400);
    }
}
