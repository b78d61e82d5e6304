//! The error channel shared by every stream.
//!
//! A stream's `error` notification always carries an [`Error`]. Failures that
//! originate inside user callbacks (a panicking `map`, `tap` or `next`) are
//! caught at the delivery boundary and surface here instead of unwinding
//! through the producer.

use std::{any::Any, sync::Arc};

/// Error delivered through a stream's error channel.
///
/// `Error` is `Clone` because multicast subjects and `merge_latest` fan one
/// failure out to several listeners.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
  /// A callback invoked while delivering a value panicked.
  #[error("callback panicked: {message}")]
  CallbackPanic { message: String },

  /// The producer panicked while the subscription was being set up.
  #[error("producer panicked during subscription: {message}")]
  ProducerPanic { message: String },

  /// A plain error message, usually raised through `throw` or a controller.
  #[error("{0}")]
  Message(String),

  /// An arbitrary error value raised by user code.
  #[error("{0}")]
  Custom(Arc<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Create an error carrying only a message.
  pub fn msg(message: impl Into<String>) -> Self { Error::Message(message.into()) }

  /// Wrap any error value.
  pub fn custom<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Custom(Arc::new(err))
  }

  pub(crate) fn callback_panic(payload: Box<dyn Any + Send>) -> Self {
    Error::CallbackPanic { message: panic_message(payload.as_ref()) }
  }

  pub(crate) fn producer_panic(payload: Box<dyn Any + Send>) -> Self {
    Error::ProducerPanic { message: panic_message(payload.as_ref()) }
  }

  /// Whether this error was produced by catching a panic.
  pub fn is_panic(&self) -> bool {
    matches!(self, Error::CallbackPanic { .. } | Error::ProducerPanic { .. })
  }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(s) = payload.downcast_ref::<&'static str>() {
    (*s).to_string()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "non-string panic payload".to_string()
  }
}
