//! Post admission control for twok.
//!
//! Requesters are identified by IP address. Each admitted post records its
//! time in the requester ledger; attempts within the configured interval
//! are rejected.

mod gate;
mod repository;
mod requester;

pub use gate::{Admission, PostAdmissionGate};
pub use repository::RequesterRepository;
pub use requester::Requester;
