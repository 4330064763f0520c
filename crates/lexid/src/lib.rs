//! Decentralized 128-bit IDs that are unique, time-ordered, and
//! lexicographically sortable in their raw byte form.
//!
//! Each [`Id`] packs five big-endian fields into 16 bytes:
//!
//! ```text
//! ┌────────┬────────────────────────┬──────────┬──────────┬──────────┐
//! │ 16 bits│        64 bits         │ 16 bits  │ 16 bits  │ 16 bits  │
//! │ epoch  │  timestamp (ms)        │ region   │ node     │ sequence │
//! └────────┴────────────────────────┴──────────┴──────────┴──────────┘
//! ```
//!
//! Because the layout is big-endian, comparing the raw bytes, the hex
//! form, or the `u128` value all agree with generation order.
//!
//! A [`Generator`] is created per (region, node) pair and mints IDs
//! locally with no coordination. Clock rollbacks are absorbed by either
//! waiting the drift out (small regressions) or bumping the epoch field
//! (large ones), so the stream of IDs from one generator never decreases.
//!
//! # Example
//!
//! ```
//! use lexid::Generator;
//!
//! let generator = Generator::new(1, 42)?;
//! let id = generator.next()?;
//!
//! let parts = id.decode();
//! assert_eq!(parts.region_id, 1);
//! assert_eq!(parts.node_id, 42);
//!
//! let parsed = lexid::Id::parse(&id.to_hex())?;
//! assert_eq!(parsed, id);
//! # Ok::<(), lexid::Error>(())
//! ```

mod error;
mod generator;
mod id;
mod mutex;
#[cfg(feature = "serde")]
mod serde;
mod time;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::time::*;
