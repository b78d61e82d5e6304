use crate::{
  observable::{create, Safe, Stream},
  sink::Subscriber,
  subscription::Teardown,
};

/// Creates a stream producing a single value.
///
/// Completes immediately after emitting the value given. Never emits an error.
///
/// # Examples
///
/// ```
/// use rxfuse::prelude::*;
///
/// of(123).subscribe(|v| println!("{},", v));
/// ```
pub fn of<Item>(v: Item) -> Stream<Safe<impl Fn(Subscriber<Item>) -> Teardown, Item>>
where
  Item: Clone + 'static,
{
  create(move |subscriber: Subscriber<Item>| {
    subscriber.next(v.clone());
    subscriber.complete();
    Teardown::noop()
  })
}
