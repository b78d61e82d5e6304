//! Streams and the producers behind them.
//!
//! A [`Stream`] wraps a [`Producer`]. Every operator call returns a new
//! stream whose producer is either the previous stage with the new operation
//! fused into it, or a new stage of a different kind reading from the
//! previous one. Nothing runs until [`Stream::start`] binds a consumer.

use std::rc::Rc;

use crate::{
  observer::Observer,
  ops::{Fuse, Predicate},
  runner,
  sink::{Sink, Subscriber},
  subscription::{Subscription, Teardown},
};

mod create;
pub use create::*;
mod from_iter;
pub use from_iter::*;
mod of;
pub use of::*;
mod trivial;
pub use trivial::*;

/// Something that pushes values into a sink once per subscription.
///
/// `produce` is called once for every `start`; each call is an independent
/// run with its own per-subscription state.
pub trait Producer {
  type Item: 'static;

  fn produce<S>(&self, sink: S) -> Teardown
  where
    S: Sink<Self::Item> + 'static;
}

/// A lazily evaluated stream of values.
///
/// Operators take the stream by value and are chainable; `Stream` is `Clone`
/// so a stage can be shared by several chains. Stage functions are `Fn` and
/// may be invoked by many subscriptions.
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
///
/// use rxfuse::prelude::*;
///
/// let out = Rc::new(RefCell::new(vec![]));
/// let c_out = out.clone();
/// from_iter(1..=10)
///   .filter(|v| v % 2 == 0)
///   .map(|v| v * 10)
///   .take(3)
///   .subscribe(move |v| c_out.borrow_mut().push(v));
/// assert_eq!(*out.borrow(), vec![20, 40, 60]);
/// ```
#[derive(Clone)]
pub struct Stream<P>(pub(crate) P);

/// A stream whose producer type is erased.
pub type BoxedStream<Item> = Stream<Safe<dyn Fn(Subscriber<Item>) -> Teardown, Item>>;

impl<P: Fuse> Stream<P> {
  /// Transform every value.
  pub fn map<B: 'static>(self, f: impl Fn(P::Item) -> B + 'static) -> Stream<P::Transformed<B>> {
    Stream(self.0.fuse_transform(Rc::new(f)))
  }

  /// Run a side effect for every value and forward it unchanged.
  pub fn tap(self, f: impl Fn(&P::Item) + 'static) -> Stream<P::Transformed<P::Item>> {
    self.map(move |v| {
      f(&v);
      v
    })
  }

  /// Forward only the values matching `predicate`.
  pub fn filter(self, predicate: impl Fn(&P::Item) -> bool + 'static) -> Stream<P::Filtered> {
    Stream(self.0.fuse_filter(Rc::new(predicate)))
  }

  /// Forward the first `count` values, then complete.
  ///
  /// `take(0)` completes as soon as the stream is started, without
  /// subscribing to the source.
  pub fn take(self, count: usize) -> Stream<P::Sliced> {
    Stream(self.0.fuse_slice(0, Some(count)))
  }

  /// Drop the first `count` values.
  pub fn skip(self, count: usize) -> Stream<P::Sliced> { Stream(self.0.fuse_slice(count, None)) }

  /// Forward values while `predicate` holds. The first value failing it is
  /// dropped and the stream completes.
  pub fn take_while(self, predicate: impl Fn(&P::Item) -> bool + 'static) -> Stream<P::Bounded> {
    let stop: Predicate<P::Item> = Rc::new(move |v: &P::Item| !predicate(v));
    Stream(self.0.fuse_while(stop))
  }

  /// Drop every value for which `predicate` holds.
  ///
  /// The predicate is evaluated for each value independently: a later value
  /// matching it is dropped even after an earlier one has passed.
  pub fn skip_while(self, predicate: impl Fn(&P::Item) -> bool + 'static) -> Stream<P::Filtered> {
    self.filter(move |v| !predicate(v))
  }
}

impl<P: Producer> Stream<P> {
  /// Subscribe `observer` and return the subscription handle.
  pub fn start<O>(&self, observer: O) -> Subscription
  where
    O: Observer<P::Item> + 'static,
  {
    runner::run(&self.0, observer)
  }

  /// Subscribe with a callback receiving values only.
  pub fn subscribe(&self, next: impl FnMut(P::Item) + 'static) -> Subscription {
    self.start(next)
  }

  /// Erase the producer type, e.g. to store streams of different shapes in
  /// one collection.
  pub fn into_boxed(self) -> BoxedStream<P::Item>
  where
    P: 'static,
  {
    let producer = self.0;
    let func: Rc<dyn Fn(Subscriber<P::Item>) -> Teardown> =
      Rc::new(move |subscriber: Subscriber<P::Item>| producer.produce(subscriber));
    Stream(Safe::from_rc(func))
  }

  #[inline]
  pub fn producer(&self) -> &P { &self.0 }
}
