//! Protocol codecs.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets, ranges and constants (source of truth)
//! - `reader`: safe byte access and protocol conventions
//! - `writer`: header emission in wire order
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `packet`: the immutable packet value and its `serialize`/`deserialize`
//! - `error`: explicit, actionable errors
//!
//! Codecs are pure and contain no I/O. `deserialize` folds "not this
//! protocol" and "malformed" into `None`; the layered `parse_*` functions keep
//! the distinction for callers that care.

pub mod artnet;
pub(crate) mod common;
mod packet;
pub mod sacn;

pub use common::text::truncate_utf8;
pub use packet::{DMX_MAX_SLOTS, DmxDataPacket, NULL_START_CODE, next_sequence};
