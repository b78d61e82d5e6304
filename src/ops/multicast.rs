use std::{cell::Cell, rc::Rc};

use crate::{
  observable::{create, Producer, Safe, Stream},
  sink::Subscriber,
  subject::{Subject, SubjectOptions},
  subscription::Teardown,
};

pub type MulticastOptions = SubjectOptions;

struct Hub<P: Producer> {
  source: Stream<P>,
  subject: Subject<P::Item>,
  started: Cell<bool>,
}

/// Shares one subscription to `source` among every listener.
///
/// The source is started when the first listener attaches and keeps running
/// for as long as it produces: stopping a listener only detaches that
/// listener. Listeners attaching after the source terminated receive the
/// terminal event immediately, preceded by the latest value in immediate
/// mode.
pub fn multicast<P>(
  source: Stream<P>,
  options: MulticastOptions,
) -> Stream<Safe<impl Fn(Subscriber<P::Item>) -> Teardown, P::Item>>
where
  P: Producer + 'static,
  P::Item: Clone,
{
  let hub = Rc::new(Hub { source, subject: Subject::new(options), started: Cell::new(false) });
  create(move |subscriber: Subscriber<P::Item>| {
    let id = hub.subject.attach(subscriber);
    if !hub.started.replace(true) {
      tracing::debug!(immediate = options.immediate, "multicast: starting shared source");
      // The shared run is owned by the subject; no listener may stop it.
      let _shared = hub.source.start(hub.subject.clone());
    }
    match id {
      Some(id) => {
        let subject = hub.subject.clone();
        Teardown::new(move || subject.detach(id))
      }
      None => Teardown::noop(),
    }
  })
}

impl<P> Stream<P>
where
  P: Producer + 'static,
  P::Item: Clone,
{
  /// See [`multicast`].
  pub fn multicast(
    self,
    options: MulticastOptions,
  ) -> Stream<Safe<impl Fn(Subscriber<P::Item>) -> Teardown, P::Item>> {
    multicast(self, options)
  }
}

#[cfg(test)]
mod test {
  use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    time::Duration,
  };

  use crate::{fake_timer::FakeClock, prelude::*};

  fn ms(millis: u64) -> Duration { Duration::from_millis(millis) }

  #[derive(Default)]
  struct Record {
    opens: u32,
    values: Vec<usize>,
    errors: u32,
    completes: u32,
    cancels: u32,
  }

  fn recorder(record: &Rc<RefCell<Record>>) -> ObserverAll<usize> {
    let (r1, r2, r3, r4, r5) =
      (record.clone(), record.clone(), record.clone(), record.clone(), record.clone());
    ObserverAll::new()
      .on_open(move |_: &Subscription| r1.borrow_mut().opens += 1)
      .on_next(move |v| r2.borrow_mut().values.push(v))
      .on_error(move |_| r3.borrow_mut().errors += 1)
      .on_complete(move || r4.borrow_mut().completes += 1)
      .on_cancel(move || r5.borrow_mut().cancels += 1)
  }

  #[test]
  fn shares_values_across_listeners() {
    let clock = FakeClock::new();
    let source = clock.interval(ms(100), 3).multicast(MulticastOptions::default());
    let (first, second) = (Rc::default(), Rc::default());
    source.start(recorder(&first));
    source.start(recorder(&second));

    clock.advance(ms(300));

    for record in [&first, &second] {
      let r = record.borrow();
      assert_eq!(r.opens, 1);
      assert_eq!(r.values, vec![1, 2, 3]);
      assert_eq!(r.errors, 0);
      assert_eq!(r.completes, 1);
    }
  }

  #[test]
  fn source_starts_once() {
    let starts = Rc::new(Cell::new(0));
    let c_starts = starts.clone();
    let source = create(move |_: Subscriber<i32>| {
      c_starts.set(c_starts.get() + 1);
      Teardown::noop()
    })
    .multicast(MulticastOptions::default());
    source.subscribe(|_| {});
    source.subscribe(|_| {});
    assert_eq!(starts.get(), 1);
  }

  #[test]
  fn immediate_replays_latest_to_late_listener() {
    let clock = FakeClock::new();
    let source =
      clock.interval(ms(100), 3).multicast(MulticastOptions::default().immediate(true));
    let (first, second) = (Rc::default(), Rc::default());
    source.start(recorder(&first));

    clock.advance(ms(250));
    source.start(recorder(&second));
    clock.advance(ms(50));

    assert_eq!(first.borrow().values, vec![1, 2, 3]);
    assert_eq!(first.borrow().completes, 1);
    let r = second.borrow();
    assert_eq!(r.opens, 1);
    assert_eq!(r.values, vec![2, 3]);
    assert_eq!(r.completes, 1);
  }

  #[test]
  fn values_before_the_first_listener_are_not_replayed() {
    let (controller, subject) = emitter::<usize>(EmitterOptions::default().immediate(true));
    let source = subject.multicast(MulticastOptions::default());
    let (first, second) = (Rc::default(), Rc::default());

    controller.open();
    controller.next(1);
    source.start(recorder(&first));
    source.start(recorder(&second));
    controller.next(2);
    controller.next(3);
    controller.complete();

    for record in [&first, &second] {
      let r = record.borrow();
      assert_eq!(r.opens, 1);
      assert_eq!(r.values, vec![2, 3]);
      assert_eq!(r.completes, 1);
    }
  }

  #[test]
  fn stopping_one_listener_leaves_the_others() {
    let clock = FakeClock::new();
    let source = clock.interval(ms(100), 3).multicast(MulticastOptions::default());
    let (first, second) = (Rc::default(), Rc::default());
    source.start(recorder(&first));
    let cancelled = source.start(recorder(&second));

    clock.advance(ms(200));
    cancelled.stop();
    clock.advance(ms(100));

    assert_eq!(first.borrow().values, vec![1, 2, 3]);
    assert_eq!(first.borrow().completes, 1);
    assert_eq!(first.borrow().cancels, 0);
    let r = second.borrow();
    assert_eq!(r.values, vec![1, 2]);
    assert_eq!(r.completes, 0);
    assert_eq!(r.cancels, 1);
    assert_eq!(cancelled.state(), SubscriptionState::Cancelled);
  }

  #[test]
  fn late_listener_after_completion() {
    let source = from_iter(vec![1usize, 2]).multicast(MulticastOptions::default().immediate(true));
    let (first, late) = (Rc::default(), Rc::default());
    source.start(recorder(&first));
    source.start(recorder(&late));
    assert_eq!(first.borrow().values, vec![1, 2]);
    assert_eq!(late.borrow().values, vec![2]);
    assert_eq!(late.borrow().completes, 1);
  }
}
