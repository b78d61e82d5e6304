//! The producer-facing side of the source protocol.
//!
//! A producer is handed a sink and pushes `next`, `error` and `complete`
//! notifications into it. Operator stages decorate a downstream sink by
//! overriding `next` and delegating the rest, so `error`, `complete`,
//! `is_active` and `disable` reach the same runner for every stage of a
//! subscription.

use std::{
  cell::{Cell, RefCell},
  collections::VecDeque,
  panic::{catch_unwind, AssertUnwindSafe},
  rc::Rc,
};

use crate::{error::Error, subscription::Subscription};

/// The capability set a producer delivers into.
pub trait Sink<Item> {
  /// Deliver the next value.
  fn next(&mut self, value: Item);

  /// Terminate the subscription with an error.
  fn error(&mut self, err: Error);

  /// Terminate the subscription normally.
  fn complete(&mut self);

  /// Whether the subscription still accepts values.
  fn is_active(&self) -> bool;

  /// Mark the subscription inactive without running its teardown or
  /// notifying the consumer.
  fn disable(&mut self);

  /// The subscription this sink ultimately delivers into, if any.
  fn subscription(&self) -> Option<Subscription> { None }
}

/// Implements the non-`next` methods of [`Sink`] by delegating to a
/// downstream sink stored in `self.$field`.
macro_rules! sink_passthrough {
  ($field:ident) => {
    #[inline]
    fn error(&mut self, err: $crate::error::Error) { self.$field.error(err) }

    #[inline]
    fn complete(&mut self) { self.$field.complete() }

    #[inline]
    fn is_active(&self) -> bool { self.$field.is_active() }

    #[inline]
    fn disable(&mut self) { self.$field.disable() }

    #[inline]
    fn subscription(&self) -> Option<$crate::subscription::Subscription> {
      self.$field.subscription()
    }
  };
}
pub(crate) use sink_passthrough;

enum Event<Item> {
  Next(Item),
  Error(Error),
  Complete,
  Disable,
}

struct SubscriberInner<Item, S: ?Sized> {
  pending: RefCell<VecDeque<Event<Item>>>,
  closing: Cell<bool>,
  subscription: Option<Subscription>,
  sink: RefCell<S>,
}

/// The sink handed to base producers.
///
/// `Subscriber` is the safe delivery boundary of a subscription:
///
/// - `next` is a no-op once the subscription is inactive;
/// - a panic raised anywhere downstream of `next` (a stage function, a `tap`
///   effect, the consumer's callback) is caught and delivered once as
///   [`Error::CallbackPanic`] on this same sink;
/// - events pushed from inside a `next` that is still running on this
///   subscriber are queued and delivered in call order as soon as that `next`
///   returns, so a consumer may feed its own source synchronously.
pub struct Subscriber<Item>(Rc<SubscriberInner<Item, dyn Sink<Item>>>);

impl<Item> Clone for Subscriber<Item> {
  #[inline]
  fn clone(&self) -> Self { Subscriber(self.0.clone()) }
}

impl<Item> Subscriber<Item> {
  pub(crate) fn new<S>(sink: S) -> Self
  where
    S: Sink<Item> + 'static,
  {
    let inner: Rc<SubscriberInner<Item, dyn Sink<Item>>> = Rc::new(SubscriberInner {
      pending: RefCell::new(VecDeque::new()),
      closing: Cell::new(false),
      subscription: sink.subscription(),
      sink: RefCell::new(sink),
    });
    Subscriber(inner)
  }

  pub fn next(&self, value: Item) { self.push(Event::Next(value)) }

  pub fn error(&self, err: Error) { self.close(Event::Error(err)) }

  pub fn complete(&self) { self.close(Event::Complete) }

  pub fn disable(&self) { self.close(Event::Disable) }

  /// Whether the subscription still accepts values.
  ///
  /// While a value is being delivered on this subscriber the answer comes
  /// from the subscription state, so a stop issued by the consumer is visible
  /// right away.
  pub fn is_active(&self) -> bool {
    if self.0.closing.get() {
      return false;
    }
    match self.0.sink.try_borrow() {
      Ok(sink) => sink.is_active(),
      Err(_) => self.0.subscription.as_ref().map_or(true, |s| s.state().is_active()),
    }
  }

  fn close(&self, event: Event<Item>) {
    self.0.closing.set(true);
    self.push(event);
  }

  fn push(&self, event: Event<Item>) {
    let Ok(mut sink) = self.0.sink.try_borrow_mut() else {
      self.0.pending.borrow_mut().push_back(event);
      return;
    };
    let mut event = Some(event);
    while let Some(current) = event {
      deliver(&mut *sink, current);
      event = self.0.pending.borrow_mut().pop_front();
    }
  }
}

fn deliver<Item>(sink: &mut dyn Sink<Item>, event: Event<Item>) {
  match event {
    Event::Next(value) => {
      if !sink.is_active() {
        return;
      }
      if let Err(payload) = catch_unwind(AssertUnwindSafe(|| sink.next(value))) {
        let err = Error::callback_panic(payload);
        tracing::warn!(%err, "callback panicked, terminating subscription");
        sink.error(err);
      }
    }
    Event::Error(err) => sink.error(err),
    Event::Complete => sink.complete(),
    Event::Disable => sink.disable(),
  }
}

impl<Item> Sink<Item> for Subscriber<Item> {
  #[inline]
  fn next(&mut self, value: Item) { Subscriber::next(self, value) }

  #[inline]
  fn error(&mut self, err: Error) { Subscriber::error(self, err) }

  #[inline]
  fn complete(&mut self) { Subscriber::complete(self) }

  #[inline]
  fn is_active(&self) -> bool { Subscriber::is_active(self) }

  #[inline]
  fn disable(&mut self) { Subscriber::disable(self) }

  #[inline]
  fn subscription(&self) -> Option<Subscription> { self.0.subscription.clone() }
}
