//! Region-chained bump allocation with scratch marks.
//!
//! Provides a manually managed memory pool: allocation is a cursor bump,
//! and reclamation happens only in bulk, either for the whole arena or for
//! everything allocated since a saved mark.
//!
//! # Architecture
//!
//! ```text
//! Arena (owning handle)
//! ├── Region[0] ── Region[1] ── ... ── Region[n]   (forward-only, append-only)
//! │      ▲ start                ▲ end (next allocation tried here first)
//! ├── MarkStack (serials of marks that may still be popped)
//! └── ArenaConfig (first-region budget, GrowthPolicy)
//! ```
//!
//! Requests are rounded up to whole machine words ([`WORD`] bytes). When
//! the region at `end` is full the arena walks forward, appending a region
//! sized by the [`GrowthPolicy`] once the chain is exhausted. Existing
//! regions never move, so earlier pointers stay valid.
//!
//! # Reclamation
//!
//! - [`Arena::reset`]: every allocation and mark becomes invalid; regions
//!   are kept.
//! - [`Arena::scratch_mark`] / [`Arena::pop_scratch`]: roll back to a saved
//!   position, resetting every region after the marked one.
//! - [`Arena::destroy`] (or drop): all regions return to the system.
//!
//! # Misuse policy
//!
//! Popping an invalidated or foreign mark logs at `error` level and panics.
//! System allocation failure is an ordinary [`ArenaError::OutOfMemory`].
//!
//! # Safety
//!
//! All raw-memory handling is confined to `raw.rs` and the typed views on
//! [`Arena`], each block with a `// SAFETY:` justification.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod config;
pub mod error;
pub mod mark;
mod raw;
pub mod region;
pub mod stats;

// Public re-exports for the primary API surface.
pub use arena::Arena;
pub use config::{ArenaConfig, GrowthPolicy, GB, KB, MB};
pub use error::ArenaError;
pub use mark::ArenaMark;
pub use raw::{words_for, WORD};
pub use region::Region;
pub use stats::{ArenaStats, RegionStats};
