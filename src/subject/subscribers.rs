use smallvec::SmallVec;

use crate::{error::Error, sink::Subscriber};

/// Listener list of a subject, keyed by the id handed out on `add`.
///
/// Uses `SmallVec<[_; 2]>` so the common case of one or two listeners does
/// not allocate. Delivery never iterates the list itself: callers take a
/// [`snapshot`](Subscribers::snapshot) (or [`drain`](Subscribers::drain) it)
/// and deliver after releasing their borrow, so listeners may attach or
/// detach while a value is being broadcast.
pub struct Subscribers<Ob> {
  next_id: usize,
  items: SmallVec<[(usize, Ob); 2]>,
}

impl<Ob> Default for Subscribers<Ob> {
  fn default() -> Self { Self { next_id: 0, items: SmallVec::new() } }
}

impl<Ob> Subscribers<Ob> {
  /// Add an observer and return its unique ID.
  #[inline]
  pub fn add(&mut self, observer: Ob) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    self.items.push((id, observer));
    id
  }

  /// Remove an observer by ID.
  pub fn remove(&mut self, id: usize) -> Option<Ob> {
    let pos = self.items.iter().position(|(item_id, _)| *item_id == id)?;
    Some(self.items.remove(pos).1)
  }

  #[inline]
  pub fn contains(&self, id: usize) -> bool { self.items.iter().any(|(item_id, _)| *item_id == id) }

  #[inline]
  pub fn len(&self) -> usize { self.items.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  /// Take every observer out of the list, in attach order.
  pub fn drain(&mut self) -> SmallVec<[Ob; 2]> {
    self.items.drain(..).map(|(_, observer)| observer).collect()
  }
}

impl<Ob: Clone> Subscribers<Ob> {
  /// The current observers, in attach order.
  pub fn snapshot(&self) -> SmallVec<[Ob; 2]> {
    self.items.iter().map(|(_, observer)| observer.clone()).collect()
  }
}

/// Deliver `value` to every listener. The last listener receives the moved
/// value, every other one a clone.
pub(crate) fn broadcast_value<Item: Clone>(
  listeners: SmallVec<[Subscriber<Item>; 2]>, value: Item,
) {
  let mut iter = listeners.into_iter().peekable();
  while let Some(listener) = iter.next() {
    if iter.peek().is_some() {
      listener.next(value.clone());
    } else {
      listener.next(value);
      break;
    }
  }
}

pub(crate) fn broadcast_error<Item>(listeners: SmallVec<[Subscriber<Item>; 2]>, err: Error) {
  for listener in listeners {
    listener.error(err.clone());
  }
}

pub(crate) fn broadcast_complete<Item>(listeners: SmallVec<[Subscriber<Item>; 2]>) {
  for listener in listeners {
    listener.complete();
  }
}
