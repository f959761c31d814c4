//! Payload encryption under a key derived from an ABE session element.

use super::CryptoError;
use chacha20poly1305::{
    ChaCha20Poly1305, Key, KeyInit, Nonce,
    aead::{Aead, Payload},
};
use cosmian_crypto_core::reexport::rand_core::CryptoRngCore;
use zeroize::Zeroizing;

pub trait AE<const KEY_LENGTH: usize> {
    type Error: std::error::Error;

    fn encrypt(
        rng: &mut impl CryptoRngCore,
        key: &[u8; KEY_LENGTH],
        ptx: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, Self::Error>;

    fn decrypt(
        key: &[u8; KEY_LENGTH],
        ctx: &[u8],
        aad: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, Self::Error>;
}

pub const DEM_KEY_LENGTH: usize = 32;

const NONCE_LENGTH: usize = 12;

/// ChaCha20-Poly1305 with a random nonce prepended to the ciphertext.
#[derive(Debug, Clone, Copy)]
pub struct ChaChaDem;

impl AE<DEM_KEY_LENGTH> for ChaChaDem {
    type Error = CryptoError;

    fn encrypt(
        rng: &mut impl CryptoRngCore,
        key: &[u8; DEM_KEY_LENGTH],
        ptx: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, Self::Error> {
        let mut nonce = [0u8; NONCE_LENGTH];
        rng.fill_bytes(&mut nonce);

        let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
        let body = cipher
            .encrypt(Nonce::from_slice(&nonce), Payload { msg: ptx, aad })
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut ctx = Vec::with_capacity(NONCE_LENGTH + body.len());
        ctx.extend_from_slice(&nonce);
        ctx.extend_from_slice(&body);
        Ok(ctx)
    }

    fn decrypt(
        key: &[u8; DEM_KEY_LENGTH],
        ctx: &[u8],
        aad: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, Self::Error> {
        if ctx.len() < NONCE_LENGTH {
            return Err(CryptoError::DecryptionFailed);
        }
        let (nonce, body) = ctx.split_at(NONCE_LENGTH);

        let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
        cipher
            .decrypt(Nonce::from_slice(nonce), Payload { msg: body, aad })
            .map(Zeroizing::new)
            .map_err(|_| CryptoError::DecryptionFailed)
    }
}
