#![deny(missing_docs)]
#![doc = "Shared plumbing for the tailsplit rare-event estimator: structured errors, deterministic RNG handles and artefact provenance."]

pub mod errors;
pub mod provenance;
pub mod rng;

pub use errors::{ErrorInfo, SplitError};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
