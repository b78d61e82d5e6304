//! Hot, push-driven sources: a [`Subject`] fans values out to every attached
//! listener, and [`emitter`] pairs one with a [`Controller`] that feeds it.

use std::collections::VecDeque;

use crate::{
  error::Error,
  observable::{create, Safe, Stream},
  observer::Observer,
  rc::MutRc,
  sink::Subscriber,
  subscription::{Subscription, Teardown},
};

mod subscribers;
pub use subscribers::Subscribers;
use subscribers::{broadcast_complete, broadcast_error, broadcast_value};

/// Options shared by [`emitter`] and [`multicast`](crate::ops::multicast).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubjectOptions {
  /// Replay the most recent value to every listener that attaches later.
  pub immediate: bool,
}

impl SubjectOptions {
  #[must_use]
  pub fn immediate(mut self, immediate: bool) -> Self {
    self.immediate = immediate;
    self
  }
}

pub type EmitterOptions = SubjectOptions;

#[derive(Clone, Debug)]
enum Phase {
  Idle,
  Open,
  Completed,
  Errored(Error),
}

enum Signal<Item> {
  Next(Item),
  Error(Error),
  Complete,
}

struct SubjectState<Item> {
  phase: Phase,
  listeners: Subscribers<Subscriber<Item>>,
  immediate: bool,
  latest: Option<Item>,
  emitting: bool,
  queue: VecDeque<Signal<Item>>,
}

/// A single upstream fanned out to any number of listeners.
///
/// Values are only accepted while the subject is open. In immediate mode the
/// subject remembers the last value that reached at least one listener and
/// replays it to listeners attaching afterwards, even once the subject has
/// terminated.
///
/// Signals raised while the subject is still delivering (a listener pushing a
/// value or completing from inside its own callback) are queued and delivered
/// once every listener has received the current one, so all listeners observe
/// the same order.
pub struct Subject<Item>(MutRc<SubjectState<Item>>);

impl<Item> Clone for Subject<Item> {
  fn clone(&self) -> Self { Subject(self.0.clone()) }
}

impl<Item: Clone + 'static> Subject<Item> {
  pub fn new(options: SubjectOptions) -> Self {
    Subject(MutRc::own(SubjectState {
      phase: Phase::Idle,
      listeners: Subscribers::default(),
      immediate: options.immediate,
      latest: None,
      emitting: false,
      queue: VecDeque::new(),
    }))
  }

  /// Start accepting values. No-op unless the subject is idle.
  pub fn open(&self) {
    let mut state = self.0.rc_deref_mut();
    if matches!(state.phase, Phase::Idle) {
      state.phase = Phase::Open;
    }
  }

  pub fn next(&self, value: Item) { self.emit(Signal::Next(value)) }

  /// Terminate with `err`. Every current listener receives it and is
  /// detached; later listeners receive it on attach.
  pub fn error(&self, err: Error) { self.emit(Signal::Error(err)) }

  /// Terminate normally. Every current listener completes and is detached;
  /// later listeners complete on attach.
  pub fn complete(&self) { self.emit(Signal::Complete) }

  fn emit(&self, signal: Signal<Item>) {
    {
      let mut state = self.0.rc_deref_mut();
      state.queue.push_back(signal);
      if state.emitting {
        return;
      }
      state.emitting = true;
    }
    let _emitting = Emitting(&self.0);
    loop {
      let signal = self.0.rc_deref_mut().queue.pop_front();
      match signal {
        Some(Signal::Next(value)) => self.deliver_next(value),
        Some(Signal::Error(err)) => self.deliver_error(err),
        Some(Signal::Complete) => self.deliver_complete(),
        None => break,
      }
    }
  }

  fn deliver_next(&self, value: Item) {
    let listeners = {
      let mut state = self.0.rc_deref_mut();
      if !matches!(state.phase, Phase::Open) {
        tracing::trace!(phase = ?state.phase, "value dropped, subject is not open");
        return;
      }
      if state.listeners.is_empty() {
        return;
      }
      if state.immediate {
        state.latest = Some(value.clone());
      }
      state.listeners.snapshot()
    };
    broadcast_value(listeners, value);
  }

  fn deliver_error(&self, err: Error) {
    let listeners = {
      let mut state = self.0.rc_deref_mut();
      if state.is_closed() {
        return;
      }
      tracing::debug!(%err, listeners = state.listeners.len(), "subject errored");
      state.phase = Phase::Errored(err.clone());
      state.listeners.drain()
    };
    broadcast_error(listeners, err);
  }

  fn deliver_complete(&self) {
    let listeners = {
      let mut state = self.0.rc_deref_mut();
      if state.is_closed() {
        return;
      }
      tracing::debug!(listeners = state.listeners.len(), "subject completed");
      state.phase = Phase::Completed;
      state.listeners.drain()
    };
    broadcast_complete(listeners);
  }

  /// Attach a listener. Returns its id, or `None` if the subject had already
  /// terminated and the listener received the terminal event right away.
  pub fn attach(&self, listener: Subscriber<Item>) -> Option<usize> {
    let (id, replay, terminal) = {
      let mut state = self.0.rc_deref_mut();
      let replay = if state.immediate { state.latest.clone() } else { None };
      match state.phase.clone() {
        Phase::Completed => (None, replay, Some(None)),
        Phase::Errored(err) => (None, replay, Some(Some(err))),
        Phase::Idle | Phase::Open => (Some(state.listeners.add(listener.clone())), replay, None),
      }
    };
    if let Some(value) = replay {
      listener.next(value);
    }
    match terminal {
      Some(Some(err)) => listener.error(err),
      Some(None) => listener.complete(),
      None => {}
    }
    id
  }

  pub fn detach(&self, id: usize) { self.0.rc_deref_mut().listeners.remove(id); }

  pub fn listener_count(&self) -> usize { self.0.rc_deref().listeners.len() }

  pub fn is_open(&self) -> bool { matches!(self.0.rc_deref().phase, Phase::Open) }

  pub fn is_closed(&self) -> bool { self.0.rc_deref().is_closed() }

  /// A stream attaching every subscriber to this subject.
  pub fn stream(&self) -> Stream<Safe<impl Fn(Subscriber<Item>) -> Teardown, Item>> {
    let subject = self.clone();
    create(move |subscriber: Subscriber<Item>| match subject.attach(subscriber) {
      Some(id) => {
        let subject = subject.clone();
        Teardown::new(move || subject.detach(id))
      }
      None => Teardown::noop(),
    })
  }
}

impl<Item> SubjectState<Item> {
  fn is_closed(&self) -> bool { matches!(self.phase, Phase::Completed | Phase::Errored(_)) }
}

/// Clears the emitting flag when the outermost delivery loop exits.
struct Emitting<'a, Item>(&'a MutRc<SubjectState<Item>>);

impl<Item> Drop for Emitting<'_, Item> {
  fn drop(&mut self) { self.0.rc_deref_mut().emitting = false; }
}

/// Feeds a subject from an upstream subscription: the upstream opening opens
/// the subject, and its values and terminal event are forwarded.
impl<Item: Clone + 'static> Observer<Item> for Subject<Item> {
  fn open(&mut self, _subscription: &Subscription) { Subject::open(self) }

  fn next(&mut self, value: Item) { Subject::next(self, value) }

  fn error(&mut self, err: Error) { Subject::error(self, err) }

  fn complete(&mut self) { Subject::complete(self) }
}

/// The push side of an [`emitter`].
///
/// Values pushed before [`open`](Controller::open) are dropped. `error` and
/// `complete` terminate the emitter whether or not it was opened.
pub struct Controller<Item>(Subject<Item>);

impl<Item> Clone for Controller<Item> {
  fn clone(&self) -> Self { Controller(self.0.clone()) }
}

impl<Item: Clone + 'static> Controller<Item> {
  pub fn open(&self) { self.0.open() }

  pub fn next(&self, value: Item) { self.0.next(value) }

  pub fn error(&self, err: Error) { self.0.error(err) }

  pub fn complete(&self) { self.0.complete() }

  pub fn is_open(&self) -> bool { self.0.is_open() }

  pub fn is_closed(&self) -> bool { self.0.is_closed() }

  pub fn listener_count(&self) -> usize { self.0.listener_count() }
}

/// Creates a hot stream together with the controller that drives it.
///
/// Every value pushed through the controller reaches the listeners attached
/// at that moment.
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
///
/// use rxfuse::prelude::*;
///
/// let (controller, stream) = emitter::<i32>(EmitterOptions::default().immediate(true));
/// controller.open();
/// let out = Rc::new(RefCell::new(vec![]));
/// let c_out = out.clone();
/// stream.subscribe(move |v| c_out.borrow_mut().push(v));
/// controller.next(1);
///
/// let c_out = out.clone();
/// stream.subscribe(move |v| c_out.borrow_mut().push(v * 10));
/// controller.next(2);
/// assert_eq!(*out.borrow(), vec![1, 10, 2, 20]);
/// ```
pub fn emitter<Item>(
  options: EmitterOptions,
) -> (Controller<Item>, Stream<Safe<impl Fn(Subscriber<Item>) -> Teardown, Item>>)
where
  Item: Clone + 'static,
{
  let subject = Subject::new(options);
  let stream = subject.stream();
  (Controller(subject), stream)
}
