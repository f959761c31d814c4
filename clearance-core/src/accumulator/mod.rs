//! Pairing-based dynamic accumulator
//!
//! A positive accumulator over BLS12-381 in the style of Nguyen / VB
//! accumulators. The manager holds the trapdoor `sk`; anyone holding the
//! public key `Q̃ = sk·P̃` and the current value `V` can check a membership
//! witness with a single pairing equation:
//!
//! ```text
//!     e(C, y·P̃ + Q̃) == e(V, P̃)
//! ```
//!
//! Every add or remove changes `V`, so a witness issued before a mutation stops
//! verifying. Holders recover either by asking the manager to re-issue, or by
//! applying [`MembershipWitness::update_on_add`] /
//! [`MembershipWitness::update_on_remove`] with public data.

mod element;
mod error;
mod keys;
mod value;
mod witness;

pub use element::{Element, ElementBytes};
pub use error::Error;
pub use keys::{PublicKey, SecretKey};
pub use value::Accumulator;
pub use witness::{MembershipWitness, WITNESS_BYTES, decode_witness, verify_encoded};

use cosmian_crypto_core::reexport::rand_core::CryptoRngCore;

/// Set up a new accumulator: keys derived from `seed`, value sampled from `rng`.
pub fn create(
    seed: &[u8],
    rng: &mut impl CryptoRngCore,
) -> Result<(SecretKey, PublicKey, Accumulator), Error> {
    let sk = SecretKey::new(seed)?;
    let pk = sk.public_key();
    Ok((sk, pk, Accumulator::random(rng)))
}
