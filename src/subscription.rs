use std::{
  cell::{Cell, RefCell},
  fmt::{Debug, Formatter},
  rc::Rc,
};

/// The cleanup action a producer returns when it is subscribed.
///
/// `stop` consumes the teardown, so it can run at most once. Producers that
/// hold nothing to release return [`Teardown::noop`].
#[must_use]
#[derive(Default)]
pub struct Teardown(Option<Box<dyn FnOnce()>>);

impl Teardown {
  pub fn new(f: impl FnOnce() + 'static) -> Self { Teardown(Some(Box::new(f))) }

  #[inline]
  pub fn noop() -> Self { Teardown(None) }

  /// Release whatever the producer holds for this subscription.
  pub fn stop(self) {
    if let Some(f) = self.0 {
      f()
    }
  }

  #[inline]
  pub fn is_noop(&self) -> bool { self.0.is_none() }
}

impl Debug for Teardown {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Teardown").field("noop", &self.is_noop()).finish()
  }
}

impl From<Subscription> for Teardown {
  fn from(subscription: Subscription) -> Self { Teardown::new(move || subscription.stop()) }
}

/// Lifecycle of one subscription.
///
/// `Idle → Active → Completed | Errored | Cancelled`; every state after
/// `Active` is terminal.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SubscriptionState {
  /// Created, producer not invoked yet.
  Idle,
  /// Values may be delivered.
  Active,
  /// Ended through `complete`.
  Completed,
  /// Ended through `error`.
  Errored,
  /// Ended by the consumer (or disabled) before the producer finished.
  Cancelled,
}

impl SubscriptionState {
  #[inline]
  pub fn is_active(self) -> bool { self == SubscriptionState::Active }

  #[inline]
  pub fn is_terminal(self) -> bool {
    matches!(
      self,
      SubscriptionState::Completed | SubscriptionState::Errored | SubscriptionState::Cancelled
    )
  }
}

/// State shared by the runner sink and every [`Subscription`] clone of a run.
pub(crate) struct SubscriptionCore {
  state: Cell<SubscriptionState>,
  teardown: RefCell<Option<Teardown>>,
  on_cancel: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl SubscriptionCore {
  pub(crate) fn new() -> Self {
    SubscriptionCore {
      state: Cell::new(SubscriptionState::Idle),
      teardown: RefCell::new(None),
      on_cancel: RefCell::new(None),
    }
  }

  #[inline]
  pub(crate) fn state(&self) -> SubscriptionState { self.state.get() }

  /// `Idle → Active`. Returns false if the run already ended.
  pub(crate) fn activate(&self) -> bool {
    if self.state.get() == SubscriptionState::Idle {
      self.state.set(SubscriptionState::Active);
      true
    } else {
      false
    }
  }

  /// Move into the terminal state `to`. Only the first caller wins; every
  /// later call reports `false` and must not notify anyone.
  pub(crate) fn finish(&self, to: SubscriptionState) -> bool {
    debug_assert!(to.is_terminal());
    if self.state.get().is_terminal() {
      return false;
    }
    tracing::trace!(from = ?self.state.get(), ?to, "subscription finished");
    self.state.set(to);
    true
  }

  /// Store the producer's teardown, or run it right away if the run already
  /// ended while the producer was still being set up.
  pub(crate) fn attach(&self, teardown: Teardown) {
    if self.state.get().is_terminal() {
      teardown.stop();
    } else {
      *self.teardown.borrow_mut() = Some(teardown);
    }
  }

  /// Register the consumer notification run when the subscription is
  /// stopped.
  pub(crate) fn on_cancel(&self, notify: impl FnOnce() + 'static) {
    *self.on_cancel.borrow_mut() = Some(Box::new(notify));
  }

  pub(crate) fn take_on_cancel(&self) -> Option<Box<dyn FnOnce()>> {
    self.on_cancel.borrow_mut().take()
  }

  pub(crate) fn run_teardown(&self) {
    let teardown = self.teardown.borrow_mut().take();
    if let Some(teardown) = teardown {
      teardown.stop();
    }
  }
}

/// Handle to a running subscription, returned by `Stream::start` and passed to
/// `Observer::open`.
///
/// Clones refer to the same run. Stopping is idempotent and may happen from
/// inside the subscription's own callbacks.
#[derive(Clone)]
pub struct Subscription(pub(crate) Rc<SubscriptionCore>);

impl Subscription {
  pub(crate) fn new() -> Self { Subscription(Rc::new(SubscriptionCore::new())) }

  /// Cancel the subscription: the producer's teardown runs once, then the
  /// consumer is told it was cancelled. Nothing else is delivered afterwards.
  ///
  /// Stopping a subscription that already ended is a no-op.
  pub fn stop(&self) {
    if self.0.finish(SubscriptionState::Cancelled) {
      self.0.run_teardown();
      if let Some(notify) = self.0.take_on_cancel() {
        notify();
      }
    }
  }

  #[inline]
  pub fn is_closed(&self) -> bool { self.0.state().is_terminal() }

  #[inline]
  pub fn state(&self) -> SubscriptionState { self.0.state() }

  /// Activates "RAII" behavior for this subscription. `stop()` will be called
  /// automatically as soon as the returned guard goes out of scope.
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard { SubscriptionGuard(self) }
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription").field("state", &self.state()).finish()
  }
}

/// Stops the wrapped subscription when dropped.
///
/// If you don't assign the guard to a variable the subscription is stopped
/// immediately.
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard(Subscription);

impl SubscriptionGuard {
  pub fn subscription(&self) -> &Subscription { &self.0 }
}

impl Drop for SubscriptionGuard {
  #[inline]
  fn drop(&mut self) { self.0.stop() }
}
