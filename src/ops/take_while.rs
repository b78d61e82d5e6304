use std::rc::Rc;

use crate::{
  observable::Producer,
  ops::{Filter, Fuse, Predicate, Slice, Transform},
  sink::{sink_passthrough, Sink},
  subscription::Teardown,
};

/// Stage completing at the first value matching its stop predicate; built by
/// `take_while`. The value that triggers completion is not forwarded.
pub struct While<S, Item> {
  source: S,
  stop: Predicate<Item>,
}

impl<S: Clone, Item> Clone for While<S, Item> {
  fn clone(&self) -> Self { While { source: self.source.clone(), stop: self.stop.clone() } }
}

impl<S, Item> While<S, Item> {
  pub(crate) fn new(source: S, stop: Predicate<Item>) -> Self { While { source, stop } }
}

impl<S, Item> Producer for While<S, Item>
where
  S: Producer<Item = Item>,
  Item: 'static,
{
  type Item = Item;

  fn produce<K>(&self, sink: K) -> Teardown
  where
    K: Sink<Item> + 'static,
  {
    self.source.produce(WhileSink { downstream: sink, stop: self.stop.clone() })
  }
}

struct WhileSink<K, Item> {
  downstream: K,
  stop: Predicate<Item>,
}

impl<K, Item> Sink<Item> for WhileSink<K, Item>
where
  K: Sink<Item>,
{
  fn next(&mut self, value: Item) {
    if (self.stop)(&value) {
      self.downstream.complete();
    } else {
      self.downstream.next(value);
    }
  }

  sink_passthrough!(downstream);
}

impl<S, Item> Fuse for While<S, Item>
where
  S: Producer<Item = Item>,
  Item: 'static,
{
  type Transformed<B: 'static> = Transform<Self, Item, B>;
  type Filtered = Filter<Self, Item>;
  type Sliced = Slice<Self>;
  type Bounded = While<S, Item>;

  fn fuse_transform<B: 'static>(self, func: Rc<dyn Fn(Item) -> B>) -> Self::Transformed<B> {
    Transform::new(self, func)
  }

  fn fuse_filter(self, predicate: Predicate<Item>) -> Self::Filtered {
    Filter::new(self, predicate)
  }

  fn fuse_slice(self, skip: usize, take: Option<usize>) -> Self::Sliced {
    Slice::new(self, skip, take)
  }

  fn fuse_while(self, stop: Predicate<Item>) -> While<S, Item> {
    let first = self.stop;
    While { source: self.source, stop: Rc::new(move |v: &Item| first(v) || stop(v)) }
  }
}
