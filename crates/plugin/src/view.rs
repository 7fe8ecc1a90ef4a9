//! Views: keyed aggregates folded from the event stream.
//!
//! A view type declares the event variants it folds and a routing function
//! from an event to a view identity. State lives in a typed repository; the
//! engine folds through a type-erased [`FoldSink`], while renderers read
//! snapshots through the strongly-typed [`RepositoryHandle`]. No `Any`
//! downcasts anywhere.

use indexmap::IndexMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use stencil_api::{CompilerEvent, EventKind, ViewKey};

/// An event-folded aggregate.
///
/// Created lazily on the first routed event; only `fold` for the declared
/// variants ever mutates it.
pub trait View: Default + Clone + Send + Sync + 'static {
    /// The event variants this view folds.
    fn kinds() -> &'static [EventKind];

    /// Routes an event to the identity of the view instance it belongs to.
    ///
    /// `None` means this particular event carries nothing for this view
    /// type, even though its variant is declared in [`Self::kinds`].
    fn route(event: &CompilerEvent) -> Option<ViewKey>;

    /// Folds one event into the state.
    fn fold(&mut self, event: &CompilerEvent);
}

/// Strongly-typed storage of all instances of one view type.
#[derive(Debug)]
pub struct ViewRepository<V: View> {
    states: IndexMap<ViewKey, V>,
}

impl<V: View> Default for ViewRepository<V> {
    fn default() -> Self {
        Self {
            states: IndexMap::new(),
        }
    }
}

impl<V: View> ViewRepository<V> {
    /// Routes and folds one event, creating the view instance if absent.
    pub fn fold_event(&mut self, event: &CompilerEvent) {
        if !V::kinds().contains(&event.kind()) {
            return;
        }
        let Some(key) = V::route(event) else {
            return;
        };
        self.states.entry(key).or_default().fold(event);
    }

    pub fn get(&self, key: &ViewKey) -> Option<&V> {
        self.states.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ViewKey, &V)> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Type-erased fold target; the engine's view store holds a list of these.
pub trait FoldSink: Send {
    fn kinds(&self) -> &'static [EventKind];
    fn fold(&mut self, event: &CompilerEvent);
}

/// Shared handle to a typed repository.
///
/// The plugin keeps a clone for its renderers and hands the engine a
/// [`FoldSink`] over the same storage. During the rendering phase no writer
/// exists, so reads need no coordination beyond the lock.
pub struct RepositoryHandle<V: View> {
    inner: Arc<RwLock<ViewRepository<V>>>,
}

impl<V: View> Clone for RepositoryHandle<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: View> Default for RepositoryHandle<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: View> RepositoryHandle<V> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ViewRepository::default())),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ViewRepository<V>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ViewRepository<V>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// An immutable snapshot of one view instance.
    pub fn get(&self, key: &ViewKey) -> Option<V> {
        self.read().get(key).cloned()
    }

    /// An immutable snapshot of every instance, in first-routed order.
    pub fn snapshot(&self) -> IndexMap<ViewKey, V> {
        self.read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// A fold sink over the same storage, for engine registration.
    pub fn sink(&self) -> Box<dyn FoldSink> {
        Box::new(RepositorySink {
            inner: Arc::clone(&self.inner),
        })
    }
}

struct RepositorySink<V: View> {
    inner: Arc<RwLock<ViewRepository<V>>>,
}

impl<V: View> FoldSink for RepositorySink<V> {
    fn kinds(&self) -> &'static [EventKind] {
        V::kinds()
    }

    fn fold(&mut self, event: &CompilerEvent) {
        self.inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .fold_event(event);
    }
}

impl<V: View> RepositoryHandle<V> {
    /// Folds one event directly; test helper and single-threaded engines.
    pub fn fold_event(&self, event: &CompilerEvent) {
        self.write().fold_event(event);
    }
}
