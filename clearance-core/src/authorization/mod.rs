//! Dual-accumulator authorization.
//!
//! Every security level and every department owns one accumulator. Enrolling
//! an identifier adds its element to the accumulator of its level and to the
//! accumulator of its department, and hands back one witness for each. Access
//! is granted only when both witnesses verify against the current values.
//!
//! ```text
//!   enroll(id, level, dept)
//!        │
//!        ├─► level accumulator  ── add, persist ──┐
//!        │                                        ├─► DualWitness
//!        └─► dept accumulator   ── add, persist ──┘
//!                 │ failure
//!                 └─► remove from level accumulator, persist
//! ```
//!
//! Any mutation of an accumulator invalidates outstanding witnesses for it.
//! Holders recover with [`AuthorizationService::refresh`] or by applying the
//! public update equations of [`crate::accumulator::MembershipWitness`].

mod credential;
mod error;
mod service;

pub use credential::DualWitness;
pub use error::AuthzError;
pub use service::AuthorizationService;
