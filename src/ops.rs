//! Operators.
//!
//! Every operator is an inherent method on [`Observable`](crate::Observable)
//! that captures its parameters and returns a new observable. Subscribing
//! to the result builds one sink per subscription: the sink observes the
//! upstream, transforms the events and forwards them through its embedded
//! `Sink`, which enforces the event grammar and owns the upstream
//! subscription.

mod catch_error;
mod compact_map;
mod concat;
mod filter;
mod first;
mod map;
mod multicast;
mod observe_on;
mod reduce;
mod ref_count;
mod skip_until;
mod subscribe_on;
mod take;
