//! Integration tests for rxfuse
//!
//! Exercises operator chains end to end through the public API: fusion
//! equivalence, termination rules, multicasting and `merge_latest` driven by
//! a virtual clock.

use std::{
  cell::{Cell, RefCell},
  rc::Rc,
  time::Duration,
};

use rxfuse::{fake_timer::FakeClock, prelude::*};

fn ms(millis: u64) -> Duration { Duration::from_millis(millis) }

/// Everything a subscription delivered, in order.
#[derive(Debug, PartialEq)]
enum Event<T> {
  Open,
  Next(T),
  Error(String),
  Complete,
}

type Events<T> = Rc<RefCell<Vec<Event<T>>>>;

fn record<T: 'static>(events: &Events<T>) -> ObserverAll<T> {
  let (e1, e2, e3, e4) = (events.clone(), events.clone(), events.clone(), events.clone());
  ObserverAll::new()
    .on_open(move |_: &Subscription| e1.borrow_mut().push(Event::Open))
    .on_next(move |v| e2.borrow_mut().push(Event::Next(v)))
    .on_error(move |e: Error| e3.borrow_mut().push(Event::Error(e.to_string())))
    .on_complete(move || e4.borrow_mut().push(Event::Complete))
}

fn run<P: Producer<Item = i32>>(stream: &Stream<P>) -> Vec<Event<i32>> {
  let events = Events::default();
  stream.start(record(&events));
  events.take()
}

fn values<T: Clone>(events: &[Event<T>]) -> Vec<T> {
  events
    .iter()
    .filter_map(|e| match e {
      Event::Next(v) => Some(v.clone()),
      _ => None,
    })
    .collect()
}

#[test]
fn test_basic_chain_integration() {
  let result = Rc::new(RefCell::new(Vec::new()));
  let result_clone = result.clone();

  from_iter(1..=10)
    .map(|x| x * 2)
    .filter(|&x| x > 10)
    .take(3)
    .subscribe(move |v| result_clone.borrow_mut().push(v));

  assert_eq!(*result.borrow(), vec![12, 14, 16]);
}

#[test]
fn test_complex_chain_with_multiple_operators() {
  let result = Rc::new(RefCell::new(Vec::new()));
  let result_clone = result.clone();

  from_iter(1..=20)
    .filter(|&x| x % 2 == 0) // Even numbers only
    .map(|x| x * x) // Square them
    .take_while(|&x| x < 200) // 4, 16, 36, 64, 100, 144
    .skip(2)
    .skip_while(|&x| x == 100)
    .subscribe(move |v| result_clone.borrow_mut().push(v));

  assert_eq!(*result.borrow(), vec![36, 64, 144]);
}

#[test]
fn take_zero_completes_once_without_values() {
  let expected = vec![Event::Open, Event::Complete];
  assert_eq!(run(&from_iter(0..10).take(0)), expected);
  assert_eq!(run(&never().take(0)), expected);
  assert_eq!(run(&empty().take(0)), expected);
  assert_eq!(run(&throw(Error::msg("unused")).take(0)), expected);
  assert_eq!(run(&from_iter(0..10).map(|v| v + 1).skip(3).take(0)), expected);
}

#[test]
fn consecutive_skips_add_up() {
  for a in 0..6 {
    for b in 0..6 {
      let fused = run(&from_iter(0..8).skip(a).skip(b));
      let direct = run(&from_iter(0..8).skip(a + b));
      assert_eq!(fused, direct, "skip({a}).skip({b})");
    }
  }
}

#[test]
fn consecutive_takes_use_the_minimum() {
  for a in 0..6 {
    for b in 0..6 {
      let fused = run(&from_iter(0..8).take(a).take(b));
      let direct = run(&from_iter(0..8).take(a.min(b)));
      assert_eq!(fused, direct, "take({a}).take({b})");
    }
  }
}

#[test]
fn fused_slices_complete_when_nested_ones_would() {
  // A hot source shows when completion happens, not just what is delivered.
  for (a, b) in [(2, 1), (2, 3), (3, 0), (1, 1)] {
    let (controller, stream) = emitter::<i32>(EmitterOptions::default());
    controller.open();
    let events = Events::default();
    stream.take(a).skip(b).start(record(&events));
    let mut sent = 0;
    while !matches!(events.borrow().last(), Some(Event::Complete)) {
      controller.next(sent);
      sent += 1;
    }
    assert_eq!(sent, a as i32, "take({a}).skip({b})");
  }
}

#[test]
fn termination_is_idempotent() {
  let next_calls = Rc::new(Cell::new(0));
  let complete_calls = Rc::new(Cell::new(0));
  let error_calls = Rc::new(Cell::new(0));
  let (n, c, e) = (next_calls.clone(), complete_calls.clone(), error_calls.clone());
  create(|subscriber: Subscriber<i32>| {
    subscriber.next(1);
    subscriber.error(Error::msg("first"));
    subscriber.next(2);
    subscriber.complete();
    subscriber.error(Error::msg("second"));
    Teardown::noop()
  })
  .map(|v| v * 2)
  .filter(|_| true)
  .start(
    ObserverAll::new()
      .on_next(move |_| n.set(n.get() + 1))
      .on_complete(move || c.set(c.get() + 1))
      .on_error(move |_| e.set(e.get() + 1)),
  );
  assert_eq!(next_calls.get(), 1);
  assert_eq!(complete_calls.get(), 0);
  assert_eq!(error_calls.get(), 1);
}

#[test]
fn teardown_runs_exactly_once() {
  let teardowns = Rc::new(Cell::new(0));
  let slot: Rc<RefCell<Option<Subscriber<i32>>>> = Rc::new(RefCell::new(None));
  let (c_teardowns, c_slot) = (teardowns.clone(), slot.clone());
  let source = create(move |subscriber: Subscriber<i32>| {
    *c_slot.borrow_mut() = Some(subscriber);
    let c_teardowns = c_teardowns.clone();
    Teardown::new(move || c_teardowns.set(c_teardowns.get() + 1))
  });

  let sub = source.clone().take(2).start(|_: i32| {});
  let subscriber = slot.borrow_mut().take().expect("producer ran");
  subscriber.next(1);
  subscriber.next(2);
  sub.stop();
  subscriber.complete();
  assert_eq!(teardowns.get(), 1);

  let sub = source.start(|_: i32| {});
  sub.stop();
  sub.stop();
  if let Some(subscriber) = slot.borrow_mut().take() {
    subscriber.complete();
  }
  assert_eq!(teardowns.get(), 2);
}

#[test]
fn empty_lifecycle() {
  assert_eq!(run(&empty()), vec![Event::Open, Event::Complete]);

  let events = Events::default();
  let sub = empty::<i32>().start(record(&events));
  sub.stop();
  assert_eq!(*events.borrow(), vec![Event::Open, Event::Complete]);
  assert_eq!(sub.state(), SubscriptionState::Completed);
}

#[test]
fn subscription_guard_stops_on_drop() {
  let clock = FakeClock::new();
  let out = Rc::new(RefCell::new(vec![]));
  {
    let c_out = out.clone();
    let _guard = clock
      .interval(ms(10), 100)
      .subscribe(move |v| c_out.borrow_mut().push(v))
      .unsubscribe_when_dropped();
    clock.advance(ms(30));
  }
  clock.advance(ms(100));
  assert_eq!(*out.borrow(), vec![1, 2, 3]);
  assert_eq!(clock.pending(), 0);
}

#[test]
fn merge_latest_over_intervals() {
  let clock = FakeClock::new();
  let events = Events::default();
  merge_latest(vec![clock.interval(ms(100), 3), clock.interval(ms(200), 2)])
    .map(Snapshot::into_values)
    .start(record(&events));

  clock.advance(ms(200));
  assert_eq!(values(&events.borrow()), vec![vec![2, 1]]);
  clock.advance(ms(200));
  assert_eq!(
    *events.borrow(),
    vec![
      Event::Open,
      Event::Next(vec![2, 1]),
      Event::Next(vec![3, 1]),
      Event::Next(vec![3, 2]),
      Event::Complete,
    ]
  );
}

#[test]
fn merge_latest_keyed_over_emitters() {
  let (temperature, t_stream) = emitter::<i32>(EmitterOptions::default());
  let (humidity, h_stream) = emitter::<i32>(EmitterOptions::default());
  temperature.open();
  humidity.open();

  let events = Events::default();
  merge_latest(Sources::Keyed(vec![("temperature", t_stream), ("humidity", h_stream)]))
    .start(record(&events));

  temperature.next(20);
  temperature.next(21);
  humidity.next(40);
  humidity.complete();
  temperature.next(22);
  temperature.complete();

  assert_eq!(
    values(&events.borrow()),
    vec![
      Snapshot::Keyed(vec![("temperature", 21), ("humidity", 40)]),
      Snapshot::Keyed(vec![("temperature", 22), ("humidity", 40)]),
    ]
  );
  assert_eq!(events.borrow().last(), Some(&Event::Complete));
}

#[test]
fn multicast_listeners_see_identical_events() {
  let clock = FakeClock::new();
  let shared = clock.interval(ms(100), 3).map(|v| v * 10).multicast(MulticastOptions::default());
  let (first, second) = (Events::default(), Events::default());
  shared.start(record(&first));
  shared.start(record(&second));
  clock.advance(ms(300));

  let expected =
    vec![Event::Open, Event::Next(10), Event::Next(20), Event::Next(30), Event::Complete];
  assert_eq!(*first.borrow(), expected);
  assert_eq!(*second.borrow(), expected);
}

#[test]
fn multicast_error_reaches_every_listener_once() {
  let (controller, stream) = emitter::<i32>(EmitterOptions::default());
  let shared = stream.multicast(MulticastOptions::default());
  let (first, second) = (Events::default(), Events::default());
  shared.start(record(&first));
  shared.start(record(&second));
  controller.open();
  controller.next(1);
  controller.error(Error::msg("sensor offline"));
  controller.error(Error::msg("again"));

  let expected = vec![Event::Open, Event::Next(1), Event::Error("sensor offline".to_string())];
  assert_eq!(*first.borrow(), expected);
  assert_eq!(*second.borrow(), expected);
}

#[test]
fn multicast_immediate_replays_before_new_values() {
  let clock = FakeClock::new();
  let shared = clock.interval(ms(100), 3).multicast(MulticastOptions::default().immediate(true));
  let (first, late) = (Events::default(), Events::default());
  shared.start(record(&first));
  clock.advance(ms(150));
  shared.start(record(&late));
  assert_eq!(*late.borrow(), vec![Event::Open, Event::Next(1)]);
  clock.advance(ms(200));
  assert_eq!(values(&late.borrow()), vec![1, 2, 3]);
  assert_eq!(values(&first.borrow()), vec![1, 2, 3]);
}

#[test]
fn multicast_on_fused_chain_downstream() {
  let clock = FakeClock::new();
  let shared = clock.interval(ms(10), 10).multicast(MulticastOptions::default());
  let (evens, firsts) = (Events::default(), Events::default());
  shared.clone().filter(|v| v % 2 == 0).start(record(&evens));
  let limited = shared.take(2).start(record(&firsts));
  clock.advance(ms(100));

  assert_eq!(values(&evens.borrow()), vec![2, 4, 6, 8, 10]);
  assert_eq!(evens.borrow().last(), Some(&Event::Complete));
  assert_eq!(values(&firsts.borrow()), vec![1, 2]);
  assert_eq!(limited.state(), SubscriptionState::Completed);
}
