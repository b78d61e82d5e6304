//! A virtual clock for driving time-based streams in tests.

use std::{collections::VecDeque, time::Duration};

use crate::{
  observable::{create, Safe, Stream},
  rc::MutRc,
  sink::Subscriber,
  subscription::Teardown,
};

/// Virtual time source. Nothing happens until [`advance`](FakeClock::advance)
/// is called; timers due at the same instant fire in creation order.
#[derive(Clone, Default)]
pub struct FakeClock(MutRc<InnerTimer>);

#[derive(Default)]
struct InnerTimer {
  current: Duration,
  next_id: usize,
  vec: VecDeque<TimerTask>,
}

struct TimerTask {
  id: usize,
  at: Duration,
  period: Duration,
  seq: usize,
  count: usize,
  subscriber: Subscriber<usize>,
}

impl FakeClock {
  pub fn new() -> Self { Self::default() }

  /// Time elapsed since the clock was created.
  pub fn current_time(&self) -> Duration { self.0.rc_deref().current }

  /// Number of timers waiting to fire.
  pub fn pending(&self) -> usize { self.0.rc_deref().vec.len() }

  /// A stream emitting `1, 2, ..., count`, one value every `period`,
  /// completing right after the last one. Each subscription gets its own
  /// timer, scheduled relative to the moment it subscribes.
  pub fn interval(
    &self,
    period: Duration,
    count: usize,
  ) -> Stream<Safe<impl Fn(Subscriber<usize>) -> Teardown, usize>> {
    let clock = self.clone();
    create(move |subscriber: Subscriber<usize>| {
      if count == 0 {
        subscriber.complete();
        return Teardown::noop();
      }
      let id = {
        let mut inner = clock.0.rc_deref_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let at = inner.current + period;
        order_insert(&mut inner.vec, TimerTask { id, at, period, seq: 1, count, subscriber });
        id
      };
      let clock = clock.clone();
      Teardown::new(move || clock.0.rc_deref_mut().vec.retain(|t| t.id != id))
    })
  }

  /// Move time forward by `duration`, firing every timer due up to and
  /// including the new time.
  pub fn advance(&self, duration: Duration) {
    let to = self.current_time() + duration;

    while let Some(task) = self.turn_to_first_expired(to) {
      let TimerTask { id, at, period, seq, count, subscriber } = task;
      subscriber.next(seq);
      if seq == count {
        subscriber.complete();
      } else if subscriber.is_active() {
        let task = TimerTask { id, at: at + period, period, seq: seq + 1, count, subscriber };
        order_insert(&mut self.0.rc_deref_mut().vec, task);
      }
    }

    self.0.rc_deref_mut().current = to;
  }

  fn turn_to_first_expired(&self, to: Duration) -> Option<TimerTask> {
    let mut inner = self.0.rc_deref_mut();
    if inner.vec.front()?.at > to {
      return None;
    }
    let task = inner.vec.pop_front()?;
    inner.current = task.at;
    Some(task)
  }
}

fn order_insert(tasks: &mut VecDeque<TimerTask>, task: TimerTask) {
  let key = (task.at, task.id);
  let position = match tasks.make_contiguous().binary_search_by(|t| (t.at, t.id).cmp(&key)) {
    Ok(p) => p,
    Err(p) => p,
  };
  tasks.insert(position, task);
}
