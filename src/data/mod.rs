//! Scheduler input data.
//!
//! A data provider hands the core three read-only pieces, bundled in
//! [`StandData`]:
//!
//! - [`OutcomeArray`]: outcomes indexed `[stand][mgmt][period][variable]`
//! - [`AxisMap`]: stand identifiers and `(rx, offset)` regime definitions
//! - [`ValidMgmts`]: the feasible regimes of each stand
//!
//! Extraction from relational or geospatial sources is out of scope; the
//! [`synthetic`] providers and the [`ArtifactStore`] cache boundary are
//! the only provider-side pieces shipped here.

mod cache;
pub mod synthetic;
mod types;

#[cfg(feature = "serde")]
pub use cache::DirStore;
pub use cache::{cached, ArtifactStore, MemoryStore};
pub use types::{AxisMap, Mgmt, OutcomeArray, StandData, StandId, ValidMgmts};
