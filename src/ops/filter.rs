use std::rc::Rc;

use crate::{
  observable::Producer,
  ops::{Fuse, Predicate, Slice, Transform, While},
  sink::{sink_passthrough, Sink},
  subscription::Teardown,
};

/// Stage forwarding only values that satisfy a predicate; built by `filter`
/// and `skip_while`.
pub struct Filter<S, Item> {
  source: S,
  predicate: Predicate<Item>,
}

impl<S: Clone, Item> Clone for Filter<S, Item> {
  fn clone(&self) -> Self {
    Filter { source: self.source.clone(), predicate: self.predicate.clone() }
  }
}

impl<S, Item> Filter<S, Item> {
  pub(crate) fn new(source: S, predicate: Predicate<Item>) -> Self { Filter { source, predicate } }
}

impl<S, Item> Producer for Filter<S, Item>
where
  S: Producer<Item = Item>,
  Item: 'static,
{
  type Item = Item;

  fn produce<K>(&self, sink: K) -> Teardown
  where
    K: Sink<Item> + 'static,
  {
    self.source.produce(FilterSink { downstream: sink, predicate: self.predicate.clone() })
  }
}

struct FilterSink<K, Item> {
  downstream: K,
  predicate: Predicate<Item>,
}

impl<K, Item> Sink<Item> for FilterSink<K, Item>
where
  K: Sink<Item>,
{
  #[inline]
  fn next(&mut self, value: Item) {
    if (self.predicate)(&value) {
      self.downstream.next(value)
    }
  }

  sink_passthrough!(downstream);
}

impl<S, Item> Fuse for Filter<S, Item>
where
  S: Producer<Item = Item>,
  Item: 'static,
{
  type Transformed<B: 'static> = Transform<Self, Item, B>;
  type Filtered = Filter<S, Item>;
  type Sliced = Slice<Self>;
  type Bounded = While<Self, Item>;

  fn fuse_transform<B: 'static>(self, func: Rc<dyn Fn(Item) -> B>) -> Self::Transformed<B> {
    Transform::new(self, func)
  }

  fn fuse_filter(self, predicate: Predicate<Item>) -> Filter<S, Item> {
    let first = self.predicate;
    Filter { source: self.source, predicate: Rc::new(move |v: &Item| first(v) && predicate(v)) }
  }

  fn fuse_slice(self, skip: usize, take: Option<usize>) -> Self::Sliced {
    Slice::new(self, skip, take)
  }

  fn fuse_while(self, stop: Predicate<Item>) -> Self::Bounded { While::new(self, stop) }
}

#[cfg(test)]
mod test {
  use std::{
    cell::{Cell, RefCell},
    rc::Rc,
  };

  use crate::prelude::*;

  #[test]
  fn fork_and_shared() {
    let out = Rc::new(RefCell::new(vec![]));
    let evens = from_iter(0..6).filter(|v| v % 2 == 0);
    let (o1, o2) = (out.clone(), out.clone());
    evens.clone().subscribe(move |v| o1.borrow_mut().push(v));
    evens.filter(|v| *v > 0).subscribe(move |v| o2.borrow_mut().push(v));
    assert_eq!(*out.borrow(), vec![0, 2, 4, 2, 4]);
  }

  #[test]
  fn fused_predicates_short_circuit() {
    let second_calls = Rc::new(Cell::new(0));
    let c_calls = second_calls.clone();
    let out = Rc::new(RefCell::new(vec![]));
    let c_out = out.clone();
    from_iter(1..=6)
      .filter(|v| v % 2 == 0)
      .filter(move |v| {
        c_calls.set(c_calls.get() + 1);
        *v > 2
      })
      .subscribe(move |v| c_out.borrow_mut().push(v));
    assert_eq!(*out.borrow(), vec![4, 6]);
    assert_eq!(second_calls.get(), 3);
  }

  #[test]
  fn skip_while_drops_every_matching_value() {
    let out = Rc::new(RefCell::new(vec![]));
    let c_out = out.clone();
    from_iter(vec![1, 2, 5, 1, 6])
      .skip_while(|v| *v < 3)
      .subscribe(move |v| c_out.borrow_mut().push(v));
    assert_eq!(*out.borrow(), vec![5, 6]);
  }
}
