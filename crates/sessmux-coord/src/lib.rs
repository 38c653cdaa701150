//! Session↔terminal association: the registry seam and the watermark
//! coordinator that decides when a freshly indexed session is offered
//! for binding.

pub mod coordinator;
pub mod registry;

pub use coordinator::{AssociationCoordinator, AssociationOutcome, DEFAULT_MAX_ASSOCIATION_AGE_MS};
pub use registry::{AssociationRegistry, InMemoryTerminalRegistry, TerminalCandidate};
