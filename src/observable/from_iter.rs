use crate::{
  observable::{create, Safe, Stream},
  sink::Subscriber,
  subscription::Teardown,
};

/// Creates a stream that produces values from an iterator.
///
/// Completes when all elements have been emitted. Never emits an error.
/// Each subscription iterates its own clone of `iter`, and iteration stops
/// early once the subscription is no longer active.
///
/// # Arguments
///
/// * `iter` - An iterator to get all the values from.
///
/// # Examples
///
/// A simple example for a range:
///
/// ```
/// use rxfuse::prelude::*;
///
/// from_iter(0..10).subscribe(|v| println!("{},", v));
/// ```
///
/// Or with a vector:
///
/// ```
/// use rxfuse::prelude::*;
///
/// from_iter(vec![0, 1, 2, 3]).subscribe(|v| println!("{},", v));
/// ```
pub fn from_iter<Iter>(
  iter: Iter,
) -> Stream<Safe<impl Fn(Subscriber<Iter::Item>) -> Teardown, Iter::Item>>
where
  Iter: IntoIterator + Clone + 'static,
  Iter::Item: 'static,
{
  create(move |subscriber: Subscriber<Iter::Item>| {
    let mut values = iter.clone().into_iter();
    while subscriber.is_active() {
      match values.next() {
        Some(v) => subscriber.next(v),
        None => break,
      }
    }
    subscriber.complete();
    Teardown::noop()
  })
}
