//! Starting a stream: binds a consumer to a producer through the
//! subscription state machine.

use std::{
  cell::{Cell, RefCell},
  panic::{catch_unwind, AssertUnwindSafe},
  rc::Rc,
};

use crate::{
  error::Error,
  observable::Producer,
  observer::Observer,
  sink::Sink,
  subscription::{Subscription, SubscriptionCore, SubscriptionState},
};

/// The innermost sink of every subscription.
///
/// Owns the transition into a terminal state: the producer's teardown runs
/// before the consumer hears about completion or failure, and nothing reaches
/// the consumer once the state has left `Active`, except the `cancelled`
/// notice of a stop issued from inside the consumer's own `next`, which is
/// delivered as soon as that `next` returns.
pub(crate) struct RunnerSink<O> {
  core: Rc<SubscriptionCore>,
  observer: Rc<RefCell<O>>,
  cancel_pending: Rc<Cell<bool>>,
}

impl<O> RunnerSink<O> {
  fn finish(&self, to: SubscriptionState) -> bool {
    if self.core.finish(to) {
      drop(self.core.take_on_cancel());
      self.core.run_teardown();
      true
    } else {
      false
    }
  }
}

impl<Item, O: Observer<Item>> Sink<Item> for RunnerSink<O> {
  fn next(&mut self, value: Item) {
    if self.core.state().is_active() {
      self.observer.borrow_mut().next(value);
      if self.cancel_pending.take() {
        self.observer.borrow_mut().cancelled();
      }
    }
  }

  fn error(&mut self, err: Error) {
    if self.finish(SubscriptionState::Errored) {
      self.observer.borrow_mut().error(err);
    }
  }

  fn complete(&mut self) {
    if self.finish(SubscriptionState::Completed) {
      self.observer.borrow_mut().complete();
    }
  }

  #[inline]
  fn is_active(&self) -> bool { self.core.state().is_active() }

  fn disable(&mut self) {
    if self.core.finish(SubscriptionState::Cancelled) {
      drop(self.core.take_on_cancel());
    }
  }

  fn subscription(&self) -> Option<Subscription> { Some(Subscription(self.core.clone())) }
}

/// Subscribe `observer` to `producer`.
///
/// `open` runs first; if the consumer stops the subscription there the
/// producer is never invoked and the consumer is told it was cancelled. A
/// panic raised while the producer sets itself up is delivered as
/// [`Error::ProducerPanic`] unless the run already ended.
pub(crate) fn run<P, O>(producer: &P, mut observer: O) -> Subscription
where
  P: Producer,
  O: Observer<P::Item> + 'static,
{
  let subscription = Subscription::new();
  observer.open(&subscription);
  if !subscription.0.activate() {
    tracing::trace!("subscription stopped during open, producer not invoked");
    observer.cancelled();
    return subscription;
  }

  let observer = Rc::new(RefCell::new(observer));
  let cancel_pending = Rc::new(Cell::new(false));
  subscription.0.on_cancel({
    let (observer, cancel_pending) = (observer.clone(), cancel_pending.clone());
    move || match observer.try_borrow_mut() {
      Ok(mut observer) => observer.cancelled(),
      Err(_) => cancel_pending.set(true),
    }
  });
  let sink =
    RunnerSink { core: subscription.0.clone(), observer: observer.clone(), cancel_pending };
  match catch_unwind(AssertUnwindSafe(|| producer.produce(sink))) {
    Ok(teardown) => subscription.0.attach(teardown),
    Err(payload) => {
      let err = Error::producer_panic(payload);
      tracing::warn!(%err, "producer panicked while subscribing");
      if subscription.0.finish(SubscriptionState::Errored) {
        drop(subscription.0.take_on_cancel());
        observer.borrow_mut().error(err);
      }
    }
  }
  subscription
}
