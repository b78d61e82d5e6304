//! Operator stages and how they fuse.
//!
//! There are four stage kinds besides the base producer ([`Safe`]):
//!
//! | kind          | built by                         | fusing two of the same kind |
//! |---------------|----------------------------------|-----------------------------|
//! | [`Transform`] | `map`, `tap`                     | compose the functions       |
//! | [`Filter`]    | `filter`, `skip_while`           | AND the predicates          |
//! | [`Slice`]     | `take`, `skip`                   | combine the bounds          |
//! | [`While`]     | `take_while`                     | OR the stop predicates      |
//!
//! Appending an operator of the same kind as the last stage rewrites that
//! stage in place; any other kind wraps the last stage as its source. A chain
//! of `n` consecutive operators of one kind therefore costs a single sink per
//! subscription.
//!
//! [`Safe`]: crate::observable::Safe

use std::rc::Rc;

use crate::observable::Producer;

mod filter;
pub use filter::*;
mod map;
pub use map::*;
mod merge_latest;
pub use merge_latest::*;
mod multicast;
pub use multicast::*;
mod slice;
pub use slice::*;
mod take_while;
pub use take_while::*;

/// A shared, reusable predicate over borrowed values.
pub type Predicate<Item> = Rc<dyn Fn(&Item) -> bool>;

/// Appends one operation to a stage, fusing when the kinds match.
///
/// Every stage kind implements `Fuse`; the associated types name the stage
/// that results from appending each kind of operation.
pub trait Fuse: Producer + Sized {
  type Transformed<B: 'static>: Fuse<Item = B>;
  type Filtered: Fuse<Item = Self::Item>;
  type Sliced: Fuse<Item = Self::Item>;
  type Bounded: Fuse<Item = Self::Item>;

  fn fuse_transform<B: 'static>(self, func: Rc<dyn Fn(Self::Item) -> B>)
    -> Self::Transformed<B>;

  fn fuse_filter(self, predicate: Predicate<Self::Item>) -> Self::Filtered;

  /// Drop `skip` values, then forward at most `take` values.
  fn fuse_slice(self, skip: usize, take: Option<usize>) -> Self::Sliced;

  /// Complete at the first value for which `stop` holds.
  fn fuse_while(self, stop: Predicate<Self::Item>) -> Self::Bounded;
}
