//! Transaction operations: reads, the invariant-checked writes and the
//! helpers they share.

mod helpers;
mod list;
pub(in crate::ops) mod write;
