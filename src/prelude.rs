//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

pub use crate::{
  error::Error,
  observable::{
    create, empty, from_iter, never, of, throw, BoxedStream, Producer, Safe, Stream,
  },
  observer::{Observer, ObserverAll},
  ops::{
    merge_latest, multicast, Filter, Fuse, MulticastOptions, Predicate, Slice, Snapshot, Sources,
    Transform, While,
  },
  sink::{Sink, Subscriber},
  subject::{emitter, Controller, EmitterOptions, Subject, SubjectOptions},
  subscription::{Subscription, SubscriptionGuard, SubscriptionState, Teardown},
};
