// Access-code subsystem: time-boxed, single-use entry codes.
//
// A code is issued to an ACTIVE member of an organization, lives for a
// fixed window, and is consumed exactly once by a VALIDATOR or ADMIN of
// the same organization. Invalid codes stay in storage as an audit trail.

pub mod error;
pub mod model;
pub mod service;
pub mod store;

pub use error::CodeError;
pub use model::AccessCode;
pub use service::{AccessCodeService, MemberSummary, Validation};
pub use store::CodeStore;
