//! Observer trait and implementations
//!
//! The Observer is the consumer at the end of a stream. Every notification is
//! optional except `next`; `open` fires once when the subscription starts,
//! before the producer is invoked. A run ends with exactly one of `error`,
//! `complete` or `cancelled`, unless it never ends.

use crate::{error::Error, subscription::Subscription};

/// Observer trait: the consumer of a stream.
pub trait Observer<Item> {
  /// Called once with the subscription handle before any other notification.
  ///
  /// Stopping the subscription here means the producer is never invoked.
  fn open(&mut self, _subscription: &Subscription) {}

  /// Receive the next value.
  fn next(&mut self, value: Item);

  /// The stream failed. No further notifications follow.
  fn error(&mut self, _err: Error) {}

  /// The stream completed. No further notifications follow.
  fn complete(&mut self) {}

  /// The subscription was stopped by its consumer before the stream ended.
  /// No further notifications follow.
  fn cancelled(&mut self) {}
}

/// A bare closure observes values only; errors and completion are ignored.
impl<Item, F> Observer<Item> for F
where
  F: FnMut(Item),
{
  #[inline]
  fn next(&mut self, value: Item) { self(value) }
}

/// An observer assembled from independently optional callbacks.
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
///
/// use rxfuse::prelude::*;
///
/// let log = Rc::new(RefCell::new(vec![]));
/// let (l1, l2) = (log.clone(), log.clone());
/// from_iter(vec![1, 2]).start(
///   ObserverAll::new()
///     .on_next(move |v: i32| l1.borrow_mut().push(v.to_string()))
///     .on_complete(move || l2.borrow_mut().push("done".to_string())),
/// );
/// assert_eq!(*log.borrow(), vec!["1", "2", "done"]);
/// ```
pub struct ObserverAll<Item> {
  open: Option<Box<dyn FnMut(&Subscription)>>,
  next: Option<Box<dyn FnMut(Item)>>,
  error: Option<Box<dyn FnMut(Error)>>,
  complete: Option<Box<dyn FnMut()>>,
  cancelled: Option<Box<dyn FnMut()>>,
}

impl<Item> Default for ObserverAll<Item> {
  fn default() -> Self {
    ObserverAll { open: None, next: None, error: None, complete: None, cancelled: None }
  }
}

impl<Item> ObserverAll<Item> {
  pub fn new() -> Self { Self::default() }

  pub fn on_open(mut self, f: impl FnMut(&Subscription) + 'static) -> Self {
    self.open = Some(Box::new(f));
    self
  }

  pub fn on_next(mut self, f: impl FnMut(Item) + 'static) -> Self {
    self.next = Some(Box::new(f));
    self
  }

  pub fn on_error(mut self, f: impl FnMut(Error) + 'static) -> Self {
    self.error = Some(Box::new(f));
    self
  }

  pub fn on_complete(mut self, f: impl FnMut() + 'static) -> Self {
    self.complete = Some(Box::new(f));
    self
  }

  pub fn on_cancel(mut self, f: impl FnMut() + 'static) -> Self {
    self.cancelled = Some(Box::new(f));
    self
  }
}

impl<Item> Observer<Item> for ObserverAll<Item> {
  fn open(&mut self, subscription: &Subscription) {
    if let Some(open) = self.open.as_mut() {
      open(subscription);
    }
  }

  fn next(&mut self, value: Item) {
    if let Some(next) = self.next.as_mut() {
      next(value);
    }
  }

  fn error(&mut self, err: Error) {
    if let Some(error) = self.error.as_mut() {
      error(err);
    }
  }

  fn complete(&mut self) {
    if let Some(complete) = self.complete.as_mut() {
      complete();
    }
  }

  fn cancelled(&mut self) {
    if let Some(cancelled) = self.cancelled.as_mut() {
      cancelled();
    }
  }
}
