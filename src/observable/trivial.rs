use crate::{
  error::Error,
  observable::{create, Safe, Stream},
  sink::Subscriber,
  subscription::Teardown,
};

/// Creates a stream that produces no values and completes immediately.
pub fn empty<Item: 'static>() -> Stream<Safe<impl Fn(Subscriber<Item>) -> Teardown, Item>> {
  create(|subscriber: Subscriber<Item>| {
    subscriber.complete();
    Teardown::noop()
  })
}

/// Creates a stream that emits no values and terminates with `err`.
pub fn throw<Item: 'static>(
  err: Error,
) -> Stream<Safe<impl Fn(Subscriber<Item>) -> Teardown, Item>> {
  create(move |subscriber: Subscriber<Item>| {
    subscriber.error(err.clone());
    Teardown::noop()
  })
}

/// Creates a stream that never emits anything and never terminates.
pub fn never<Item: 'static>() -> Stream<Safe<impl Fn(Subscriber<Item>) -> Teardown, Item>> {
  create(|_: Subscriber<Item>| Teardown::noop())
}
