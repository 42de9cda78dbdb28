// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observable ordered collections.
//!
//! [`ListModel`] is the interface the list engine reads items through. It is
//! deliberately small: a length, positional lookup, and an items-changed
//! notification describing a single splice. [`ListStore`] is a ready-made
//! vector-backed implementation.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::signal::{HandlerId, Signal};

/// A single splice: at `position`, `removed` items were replaced by `added` items.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ItemsChanged {
    /// First index affected by the change.
    pub position: usize,
    /// Number of items removed at `position`.
    pub removed: usize,
    /// Number of items inserted at `position`.
    pub added: usize,
}

/// An ordered, observable collection.
///
/// Implementations use interior mutability and notify items-changed handlers
/// *after* the collection has been updated, so handlers observe the new
/// contents.
pub trait ListModel {
    /// Item handle returned by [`ListModel::item`].
    ///
    /// This is usually a cheap shared handle such as `Rc<T>`; the list engine
    /// keeps a clone per materialized row.
    type Item: Clone;

    /// Current number of items.
    fn n_items(&self) -> usize;

    /// Returns the item at `index`, or `None` if out of range.
    fn item(&self, index: usize) -> Option<Self::Item>;

    /// Registers a handler called after every change.
    fn connect_items_changed(&self, handler: Box<dyn FnMut(ItemsChanged)>) -> HandlerId;

    /// Removes a handler registered with [`ListModel::connect_items_changed`].
    fn disconnect_items_changed(&self, id: HandlerId);
}

/// A vector-backed [`ListModel`].
///
/// ```rust
/// use understory_model_list::{ListModel, ListStore};
///
/// let store = ListStore::from_vec(vec!["a", "b"]);
/// store.append("c");
/// assert_eq!(store.n_items(), 3);
/// assert_eq!(store.item(2), Some("c"));
/// ```
pub struct ListStore<T> {
    items: RefCell<Vec<T>>,
    items_changed: Signal<ItemsChanged>,
}

impl<T: Clone> ListStore<T> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Creates a store holding `items`.
    #[must_use]
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: RefCell::new(items),
            items_changed: Signal::new(),
        }
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Returns `true` if the store holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Returns a clone of the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.borrow().get(index).cloned()
    }

    /// Appends an item.
    pub fn append(&self, item: T) {
        let position = self.len();
        self.splice(position, 0, [item]);
    }

    /// Inserts an item at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position > len()`.
    pub fn insert(&self, position: usize, item: T) {
        self.splice(position, 0, [item]);
    }

    /// Removes and returns the item at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position >= len()`.
    pub fn remove(&self, position: usize) -> T {
        let removed = self.items.borrow_mut().remove(position);
        self.items_changed.emit(&ItemsChanged {
            position,
            removed: 1,
            added: 0,
        });
        removed
    }

    /// Replaces `n_removed` items at `position` with `additions`.
    ///
    /// Emits a single notification. A splice that neither removes nor adds
    /// anything is silent.
    ///
    /// # Panics
    ///
    /// Panics if `position + n_removed > len()`.
    pub fn splice(&self, position: usize, n_removed: usize, additions: impl IntoIterator<Item = T>) {
        let added = {
            let mut items = self.items.borrow_mut();
            assert!(
                position + n_removed <= items.len(),
                "splice range {position}..{} out of bounds for length {}",
                position + n_removed,
                items.len()
            );
            let before = items.len();
            drop(items.splice(position..position + n_removed, additions));
            items.len() + n_removed - before
        };
        if n_removed == 0 && added == 0 {
            return;
        }
        self.items_changed.emit(&ItemsChanged {
            position,
            removed: n_removed,
            added,
        });
    }

    /// Removes every item.
    pub fn clear(&self) {
        let len = self.len();
        self.splice(0, len, []);
    }
}

impl<T: Clone> Default for ListStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ListModel for ListStore<T> {
    type Item = T;

    fn n_items(&self) -> usize {
        self.len()
    }

    fn item(&self, index: usize) -> Option<T> {
        self.get(index)
    }

    fn connect_items_changed(&self, mut handler: Box<dyn FnMut(ItemsChanged)>) -> HandlerId {
        self.items_changed
            .connect(Box::new(move |change: &ItemsChanged| handler(*change)))
    }

    fn disconnect_items_changed(&self, id: HandlerId) {
        self.items_changed.disconnect(id);
    }
}

impl<T> fmt::Debug for ListStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListStore")
            .field("len", &self.items.borrow().len())
            .field("items_changed", &self.items_changed)
            .finish()
    }
}
