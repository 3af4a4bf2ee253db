//! Toy record cipher for client records at rest.
//!
//! A deliberately small RSA-shaped scheme over individual symbols: key
//! generation draws two distinct primes from a caller-supplied pool, and
//! records are transformed one symbol at a time by modular exponentiation.
//! Not a real cryptosystem; it exists to keep stored records from being
//! casually readable.
//!
//! ## Design
//!
//! - Pure functions only. Randomness comes from a caller-provided RNG so
//!   key generation is deterministic under a seeded generator.
//! - The modulus stays below the surrogate range, so ciphertext is always
//!   a valid `String` of the same symbol length as the input.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cipher;

pub use cipher::{
    CipherError, KeyPair, MAX_MODULUS, PrivateKey, PublicKey, decrypt_record, encrypt_record,
    generate_key_pair, verify_key_pair,
};
