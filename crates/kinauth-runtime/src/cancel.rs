//! [`CancelToken`] – cooperative cancellation for long-running attempts.
//!
//! A token is a shared flag built on [`tokio::sync::watch`]. Clones observe
//! the same flag. A [`child`][CancelToken::child] token is cancelled either
//! directly or when any ancestor is, so the application can cancel every
//! attempt at shutdown while a single attempt can still be cancelled on its
//! own.
//!
//! # Example
//!
//! ```rust
//! use kinauth_runtime::cancel::CancelToken;
//!
//! let app = CancelToken::new();
//! let attempt = app.child();
//!
//! attempt.cancel();
//! assert!(attempt.is_cancelled());
//! assert!(!app.is_cancelled());
//!
//! let other = app.child();
//! app.cancel();
//! assert!(other.is_cancelled());
//! ```

use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::watch;

#[derive(Debug)]
struct Inner {
    flag: watch::Sender<bool>,
    children: Mutex<Vec<Weak<Inner>>>,
    // Keeps the chain to the root alive while any descendant is, so a
    // dropped intermediate token still relays cancellation downwards.
    parent: Option<Arc<Inner>>,
}

impl Inner {
    fn cancel(&self) {
        self.flag.send_replace(true);
        let children = std::mem::take(
            &mut *self.children.lock().unwrap_or_else(PoisonError::into_inner),
        );
        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel();
        }
    }
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    fn with_parent(parent: Option<Arc<Inner>>) -> Self {
        let (flag, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                flag,
                children: Mutex::new(Vec::new()),
                parent,
            }),
        }
    }

    /// A token that is cancelled together with `self` but can also be
    /// cancelled independently.
    pub fn child(&self) -> Self {
        let child = Self::with_parent(Some(Arc::clone(&self.inner)));
        {
            let mut children = self
                .inner
                .children
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            children.retain(|w| w.strong_count() > 0);
            children.push(Arc::downgrade(&child.inner));
        }
        // Parent cancelled before the child was registered.
        if self.is_cancelled() {
            child.cancel();
        }
        child
    }

    /// Idempotent.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        let mut node = Some(&self.inner);
        while let Some(inner) = node {
            if *inner.flag.borrow() {
                return true;
            }
            node = inner.parent.as_ref();
        }
        false
    }

    /// Resolves once the token (or an ancestor) is cancelled. Resolves
    /// immediately if that already happened.
    pub async fn cancelled(&self) {
        let mut rx = self.inner.flag.subscribe();
        // The sender lives as long as `self`, so this only returns once the
        // flag is set.
        let _ = rx.wait_for(|c| *c).await;
    }
}
