use std::rc::Rc;

use crate::{
  observable::Producer,
  ops::{Filter, Fuse, Predicate, Slice, While},
  sink::{sink_passthrough, Sink},
  subscription::Teardown,
};

/// Stage applying a function to every value; built by `map` and `tap`.
///
/// Consecutive transforms are composed into one function.
pub struct Transform<S, In, Out> {
  source: S,
  func: Rc<dyn Fn(In) -> Out>,
}

impl<S: Clone, In, Out> Clone for Transform<S, In, Out> {
  fn clone(&self) -> Self { Transform { source: self.source.clone(), func: self.func.clone() } }
}

impl<S, In, Out> Transform<S, In, Out> {
  pub(crate) fn new(source: S, func: Rc<dyn Fn(In) -> Out>) -> Self { Transform { source, func } }
}

impl<S, In, Out> Producer for Transform<S, In, Out>
where
  S: Producer<Item = In>,
  In: 'static,
  Out: 'static,
{
  type Item = Out;

  fn produce<K>(&self, sink: K) -> Teardown
  where
    K: Sink<Out> + 'static,
  {
    self.source.produce(TransformSink { downstream: sink, func: self.func.clone() })
  }
}

struct TransformSink<K, In, Out> {
  downstream: K,
  func: Rc<dyn Fn(In) -> Out>,
}

impl<K, In, Out> Sink<In> for TransformSink<K, In, Out>
where
  K: Sink<Out>,
{
  #[inline]
  fn next(&mut self, value: In) { self.downstream.next((self.func)(value)) }

  sink_passthrough!(downstream);
}

impl<S, In, Out> Fuse for Transform<S, In, Out>
where
  S: Producer<Item = In>,
  In: 'static,
  Out: 'static,
{
  type Transformed<B: 'static> = Transform<S, In, B>;
  type Filtered = Filter<Self, Out>;
  type Sliced = Slice<Self>;
  type Bounded = While<Self, Out>;

  fn fuse_transform<B: 'static>(self, func: Rc<dyn Fn(Out) -> B>) -> Transform<S, In, B> {
    let first = self.func;
    Transform { source: self.source, func: Rc::new(move |v| func(first(v))) }
  }

  fn fuse_filter(self, predicate: Predicate<Out>) -> Self::Filtered { Filter::new(self, predicate) }

  fn fuse_slice(self, skip: usize, take: Option<usize>) -> Self::Sliced {
    Slice::new(self, skip, take)
  }

  fn fuse_while(self, stop: Predicate<Out>) -> Self::Bounded { While::new(self, stop) }
}
