use std::{marker::PhantomData, rc::Rc};

use crate::{
  observable::{Producer, Stream},
  ops::{Filter, Fuse, Predicate, Slice, Transform, While},
  sink::{Sink, Subscriber},
  subscription::Teardown,
};

/// The base stage of every stream: a user producer function behind the safe
/// delivery boundary.
///
/// The function receives a [`Subscriber`] for each subscription and returns
/// the teardown that releases whatever it set up.
pub struct Safe<F: ?Sized, Item> {
  func: Rc<F>,
  _marker: PhantomData<fn() -> Item>,
}

impl<F: ?Sized, Item> Clone for Safe<F, Item> {
  fn clone(&self) -> Self { Safe { func: self.func.clone(), _marker: PhantomData } }
}

impl<F: ?Sized, Item> Safe<F, Item> {
  pub(crate) fn from_rc(func: Rc<F>) -> Self { Safe { func, _marker: PhantomData } }
}

impl<F, Item> Producer for Safe<F, Item>
where
  F: Fn(Subscriber<Item>) -> Teardown + ?Sized,
  Item: 'static,
{
  type Item = Item;

  #[inline]
  fn produce<S>(&self, sink: S) -> Teardown
  where
    S: Sink<Item> + 'static,
  {
    (self.func)(Subscriber::new(sink))
  }
}

impl<F, Item> Fuse for Safe<F, Item>
where
  F: Fn(Subscriber<Item>) -> Teardown + ?Sized,
  Item: 'static,
{
  type Transformed<B: 'static> = Transform<Self, Item, B>;
  type Filtered = Filter<Self, Item>;
  type Sliced = Slice<Self>;
  type Bounded = While<Self, Item>;

  fn fuse_transform<B: 'static>(self, func: Rc<dyn Fn(Item) -> B>) -> Self::Transformed<B> {
    Transform::new(self, func)
  }

  fn fuse_filter(self, predicate: Predicate<Item>) -> Self::Filtered {
    Filter::new(self, predicate)
  }

  fn fuse_slice(self, skip: usize, take: Option<usize>) -> Self::Sliced {
    Slice::new(self, skip, take)
  }

  fn fuse_while(self, stop: Predicate<Item>) -> Self::Bounded { While::new(self, stop) }
}

/// Creates a stream from a producer function.
///
/// The function runs once per `start`. Values pushed into the subscriber
/// after it completed, errored or was stopped are ignored, and a panic raised
/// by anything downstream of `next` terminates the subscription with
/// [`Error::CallbackPanic`](crate::error::Error::CallbackPanic).
///
/// # Examples
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
///
/// use rxfuse::prelude::*;
///
/// let out = Rc::new(RefCell::new(vec![]));
/// let c_out = out.clone();
/// create(|subscriber: Subscriber<i32>| {
///   subscriber.next(1);
///   subscriber.next(2);
///   subscriber.complete();
///   subscriber.next(3);
///   Teardown::noop()
/// })
/// .subscribe(move |v| c_out.borrow_mut().push(v));
/// assert_eq!(*out.borrow(), vec![1, 2]);
/// ```
pub fn create<Item, F>(producer: F) -> Stream<Safe<F, Item>>
where
  F: Fn(Subscriber<Item>) -> Teardown + 'static,
  Item: 'static,
{
  Stream(Safe::from_rc(Rc::new(producer)))
}
