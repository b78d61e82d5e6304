use std::rc::Rc;

use crate::{
  error::Error,
  observable::{create, Producer, Safe, Stream},
  observer::Observer,
  rc::MutRc,
  sink::Subscriber,
  subscription::{Subscription, Teardown},
};

/// The sources combined by [`merge_latest`]: either a list, or a list of
/// keyed entries.
pub enum Sources<K, P> {
  Indexed(Vec<Stream<P>>),
  Keyed(Vec<(K, Stream<P>)>),
}

impl<P> From<Vec<Stream<P>>> for Sources<usize, P> {
  fn from(streams: Vec<Stream<P>>) -> Self { Sources::Indexed(streams) }
}

/// The latest value of every source, shaped like the [`Sources`] it was
/// built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot<K, Item> {
  Indexed(Vec<Item>),
  /// Entries in the order the sources were given.
  Keyed(Vec<(K, Item)>),
}

impl<K, Item> Snapshot<K, Item> {
  pub fn len(&self) -> usize {
    match self {
      Snapshot::Indexed(values) => values.len(),
      Snapshot::Keyed(entries) => entries.len(),
    }
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  /// The value of the source at `position`.
  pub fn value(&self, position: usize) -> Option<&Item> {
    match self {
      Snapshot::Indexed(values) => values.get(position),
      Snapshot::Keyed(entries) => entries.get(position).map(|(_, v)| v),
    }
  }

  /// The value of the source registered under `key`. Always `None` for an
  /// indexed snapshot.
  pub fn get(&self, key: &K) -> Option<&Item>
  where
    K: PartialEq,
  {
    match self {
      Snapshot::Indexed(_) => None,
      Snapshot::Keyed(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
    }
  }

  /// The values in source order, dropping keys.
  pub fn into_values(self) -> Vec<Item> {
    match self {
      Snapshot::Indexed(values) => values,
      Snapshot::Keyed(entries) => entries.into_iter().map(|(_, v)| v).collect(),
    }
  }
}

struct MergeState<Item> {
  latest: Vec<Option<Item>>,
  filled: usize,
  completed: usize,
  closed: bool,
  inner: Vec<Subscription>,
}

fn stop_all<Item>(state: &MutRc<MergeState<Item>>) {
  let inner = std::mem::take(&mut state.rc_deref_mut().inner);
  for subscription in inner {
    subscription.stop();
  }
}

struct MergeObserver<K, Item> {
  index: usize,
  keys: Rc<Option<Vec<K>>>,
  state: MutRc<MergeState<Item>>,
  downstream: Subscriber<Snapshot<K, Item>>,
}

impl<K, Item> Observer<Item> for MergeObserver<K, Item>
where
  K: Clone,
  Item: Clone,
{
  fn next(&mut self, value: Item) {
    let snapshot = {
      let mut state = self.state.rc_deref_mut();
      let slot = &mut state.latest[self.index];
      let first = slot.is_none();
      *slot = Some(value);
      if first {
        state.filled += 1;
      }
      if state.filled < state.latest.len() {
        return;
      }
      let values = state.latest.iter().flatten().cloned();
      match &*self.keys {
        Some(keys) => Snapshot::Keyed(keys.iter().cloned().zip(values).collect()),
        None => Snapshot::Indexed(values.collect()),
      }
    };
    self.downstream.next(snapshot);
  }

  fn error(&mut self, err: Error) {
    {
      let mut state = self.state.rc_deref_mut();
      if state.closed {
        return;
      }
      state.closed = true;
    }
    tracing::debug!(source = self.index, %err, "merge_latest: source failed");
    stop_all(&self.state);
    self.downstream.error(err);
  }

  fn complete(&mut self) {
    let all_done = {
      let mut state = self.state.rc_deref_mut();
      state.completed += 1;
      let all_done = !state.closed && state.completed == state.latest.len();
      if all_done {
        state.closed = true;
      }
      all_done
    };
    if all_done {
      self.downstream.complete();
    }
  }
}

/// Combines several streams into one emitting a [`Snapshot`] of the latest
/// value of every source.
///
/// Nothing is emitted until every source has produced at least one value;
/// after that every value from any source yields a new snapshot. The result
/// completes once all sources completed, and fails as soon as any source
/// fails, stopping the remaining ones. Without sources it completes at once.
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
///
/// use rxfuse::prelude::*;
///
/// let (a, a_stream) = emitter::<i32>(EmitterOptions::default());
/// let (b, b_stream) = emitter::<i32>(EmitterOptions::default());
/// a.open();
/// b.open();
///
/// let out = Rc::new(RefCell::new(vec![]));
/// let c_out = out.clone();
/// merge_latest(vec![a_stream, b_stream])
///   .subscribe(move |snapshot| c_out.borrow_mut().push(snapshot.into_values()));
///
/// a.next(1);
/// b.next(10);
/// a.next(2);
/// assert_eq!(*out.borrow(), vec![vec![1, 10], vec![2, 10]]);
/// ```
pub fn merge_latest<K, P>(
  sources: impl Into<Sources<K, P>>,
) -> Stream<Safe<impl Fn(Subscriber<Snapshot<K, P::Item>>) -> Teardown, Snapshot<K, P::Item>>>
where
  K: Clone + 'static,
  P: Producer + 'static,
  P::Item: Clone,
{
  let (keys, streams) = match sources.into() {
    Sources::Indexed(streams) => (None, streams),
    Sources::Keyed(entries) => {
      let (keys, streams): (Vec<K>, Vec<Stream<P>>) = entries.into_iter().unzip();
      (Some(keys), streams)
    }
  };
  let keys = Rc::new(keys);
  let streams = Rc::new(streams);

  create(move |subscriber: Subscriber<Snapshot<K, P::Item>>| {
    let count = streams.len();
    if count == 0 {
      subscriber.complete();
      return Teardown::noop();
    }
    tracing::debug!(sources = count, "merge_latest: subscribing sources");
    let state = MutRc::own(MergeState {
      latest: (0..count).map(|_| None).collect(),
      filled: 0,
      completed: 0,
      closed: false,
      inner: Vec::with_capacity(count),
    });
    for (index, stream) in streams.iter().enumerate() {
      if state.rc_deref().closed || !subscriber.is_active() {
        break;
      }
      let subscription = stream.start(MergeObserver {
        index,
        keys: keys.clone(),
        state: state.clone(),
        downstream: subscriber.clone(),
      });
      state.rc_deref_mut().inner.push(subscription);
    }
    Teardown::new(move || stop_all(&state))
  })
}
