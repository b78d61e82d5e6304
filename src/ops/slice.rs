use std::rc::Rc;

use crate::{
  observable::Producer,
  ops::{Filter, Fuse, Predicate, Transform, While},
  sink::{sink_passthrough, Sink},
  subscription::Teardown,
};

/// Stage dropping a prefix and completing after a bounded number of upstream
/// values; built by `skip` and `take`.
///
/// Upstream values are counted per subscription. Values at positions
/// `skip..limit` are forwarded, and the stage completes right after the
/// value at position `limit - 1`, forwarded or not. A `limit` of zero
/// completes at subscription time without subscribing upstream.
pub struct Slice<S> {
  source: S,
  skip: usize,
  limit: Option<usize>,
}

impl<S: Clone> Clone for Slice<S> {
  fn clone(&self) -> Self {
    Slice { source: self.source.clone(), skip: self.skip, limit: self.limit }
  }
}

/// Upstream position after which a `skip` then `take` pair completes.
fn limit_of(skip: usize, take: Option<usize>) -> Option<usize> {
  match take {
    Some(0) => Some(0),
    Some(take) => Some(skip.saturating_add(take)),
    None => None,
  }
}

impl<S> Slice<S> {
  pub(crate) fn new(source: S, skip: usize, take: Option<usize>) -> Self {
    Slice { source, skip, limit: limit_of(skip, take) }
  }
}

impl<S> Producer for Slice<S>
where
  S: Producer,
{
  type Item = S::Item;

  fn produce<K>(&self, mut sink: K) -> Teardown
  where
    K: Sink<S::Item> + 'static,
  {
    if self.limit == Some(0) {
      sink.complete();
      return Teardown::noop();
    }
    self.source.produce(SliceSink { downstream: sink, seen: 0, skip: self.skip, limit: self.limit })
  }
}

struct SliceSink<K> {
  downstream: K,
  seen: usize,
  skip: usize,
  limit: Option<usize>,
}

impl<Item, K> Sink<Item> for SliceSink<K>
where
  K: Sink<Item>,
{
  fn next(&mut self, value: Item) {
    let position = self.seen;
    self.seen += 1;
    if position >= self.skip {
      self.downstream.next(value);
    }
    if self.limit == Some(self.seen) {
      self.downstream.complete();
    }
  }

  sink_passthrough!(downstream);
}

impl<S> Fuse for Slice<S>
where
  S: Producer,
{
  type Transformed<B: 'static> = Transform<Self, S::Item, B>;
  type Filtered = Filter<Self, S::Item>;
  type Sliced = Slice<S>;
  type Bounded = While<Self, S::Item>;

  fn fuse_transform<B: 'static>(self, func: Rc<dyn Fn(S::Item) -> B>) -> Self::Transformed<B> {
    Transform::new(self, func)
  }

  fn fuse_filter(self, predicate: Predicate<S::Item>) -> Self::Filtered {
    Filter::new(self, predicate)
  }

  /// The appended slice counts the values this one forwards, which start at
  /// upstream position `self.skip`.
  fn fuse_slice(self, skip: usize, take: Option<usize>) -> Slice<S> {
    let limit = match limit_of(skip, take) {
      Some(0) => Some(0),
      Some(outer) => {
        let outer = self.skip.saturating_add(outer);
        Some(self.limit.map_or(outer, |inner| inner.min(outer)))
      }
      None => self.limit,
    };
    Slice { source: self.source, skip: self.skip.saturating_add(skip), limit }
  }

  fn fuse_while(self, stop: Predicate<S::Item>) -> Self::Bounded { While::new(self, stop) }
}
