//! Target adapters: the per-integration configuration table that drives the
//! generic renderer.

mod registry;
pub mod target;
pub(crate) mod utils;

pub use registry::{all_targets, find_target, target_names};
pub use target::{CleanupPolicy, EnvelopeFormat, NamingStrategy, RenderTarget, OWNERSHIP_MARKER};
