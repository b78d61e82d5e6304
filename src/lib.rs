//! # rxfuse: push-based event streams with stage fusion
//!
//! A stream is built by chaining operators onto a producer, and does nothing
//! until it is started. Consecutive operators of the same kind are fused into
//! a single stage, so `map(f).map(g)` costs one sink per subscription.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxfuse::prelude::*;
//!
//! from_iter(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe(|v| println!("Value: {}", v));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Stream`] | A lazily evaluated stream and its operators |
//! | [`Producer`] | Pushes values into a [`Sink`] once per subscription |
//! | [`Subscriber`] | The sink handed to producers; catches callback panics |
//! | [`Observer`] | Consumes `open`, `next`, `error`, `complete` and `cancelled` events |
//! | [`Subscription`] | Handle to stop an active subscription |
//! | [`Subject`] | Fans one source out to many listeners |
//!
//! Everything is single-threaded: streams, subjects and subscriptions are
//! built on `Rc` and are neither `Send` nor `Sync`.
//!
//! Failures inside user callbacks are caught with
//! [`catch_unwind`](std::panic::catch_unwind) and delivered through the error
//! channel, which requires the default `panic = "unwind"` strategy.
//!
//! [`Stream`]: observable::Stream
//! [`Producer`]: observable::Producer
//! [`Sink`]: sink::Sink
//! [`Subscriber`]: sink::Subscriber
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`Subject`]: subject::Subject

pub mod error;
pub mod fake_timer;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
mod runner;
pub mod sink;
pub mod subject;
pub mod subscription;

pub use prelude::*;
