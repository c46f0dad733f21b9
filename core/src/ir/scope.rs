//! file: core/src/ir/scope.rs
//! description: lexical scope names threaded through a translation.
//!
//! `ScopeTracker` is a stack of scope names. Entering a scope hands back a
//! `ScopeGuard`; the scope is left when the guard drops, so every exit
//! pairs with its enter even when the translation inside returns early
//! with an error.

use std::ops::{Deref, DerefMut};

pub const DEFAULT_SEPARATOR: &str = "_";

#[derive(Debug, Clone)]
pub struct ScopeTracker {
    stack: Vec<String>,
    separator: String,
}

impl Default for ScopeTracker {
    fn default() -> Self {
        ScopeTracker::new()
    }
}

impl ScopeTracker {
    pub fn new() -> Self {
        ScopeTracker::with_separator(DEFAULT_SEPARATOR)
    }

    pub fn with_separator(separator: impl Into<String>) -> Self {
        ScopeTracker {
            stack: Vec::new(),
            separator: separator.into(),
        }
    }

    /// Enter the scope `name`. An empty name enters nothing, but still
    /// returns a guard so callers need not special-case it.
    pub fn enter(&mut self, name: &str) -> ScopeGuard<'_> {
        let pushed = !name.is_empty();
        if pushed {
            self.stack.push(name.to_string());
        }
        ScopeGuard {
            tracker: self,
            pushed,
        }
    }

    /// The qualified name of the current scope, outermost first. Empty at
    /// the top level.
    pub fn current(&self) -> String {
        self.stack.join(&self.separator)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    fn exit(&mut self) {
        debug_assert!(!self.stack.is_empty(), "scope stack underflow");
        self.stack.pop();
    }
}

/// Keeps a scope entered for as long as it lives. Derefs to the tracker so
/// nested scopes are entered through the guard.
#[derive(Debug)]
pub struct ScopeGuard<'s> {
    tracker: &'s mut ScopeTracker,
    pushed: bool,
}

impl Deref for ScopeGuard<'_> {
    type Target = ScopeTracker;

    fn deref(&self) -> &ScopeTracker {
        self.tracker
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut ScopeTracker {
        self.tracker
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if self.pushed {
            self.tracker.exit();
        }
    }
}
