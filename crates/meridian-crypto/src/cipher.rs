//! Per-symbol modular-exponentiation record cipher.
//!
//! Each input symbol maps to exactly one output symbol via `m^e mod n`,
//! which bounds the representable alphabet by the modulus. Key generation
//! rejects any modulus at or above the surrogate range so every ciphertext
//! symbol is a valid Unicode scalar.

use rand::Rng;
use thiserror::Error;

/// Upper bound on the modulus: the first UTF-16 surrogate codepoint.
/// Keeping `n` below it guarantees `char::from_u32` accepts every
/// ciphertext symbol.
pub const MAX_MODULUS: u64 = 0xD800;

/// Errors from key generation and record transforms.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// The prime pool holds fewer than two distinct primes.
    #[error("prime pool needs at least two distinct primes, got {count}")]
    InsufficientPrimes {
        /// Number of distinct primes supplied.
        count: usize,
    },

    /// The product of the selected primes is outside the usable range.
    #[error("modulus {n} is outside the usable range (must be below {MAX_MODULUS})")]
    InvalidModulus {
        /// The rejected modulus.
        n: u64,
    },

    /// A record symbol has no residue below the modulus.
    #[error("symbol {symbol:?} (U+{codepoint:04X}) is not representable under modulus {n}")]
    SymbolOutOfRange {
        /// The offending symbol.
        symbol: char,
        /// Its codepoint.
        codepoint: u32,
        /// The key's modulus.
        n: u64,
    },

    /// No modular inverse exists for the chosen exponent.
    #[error("exponent {e} has no inverse modulo {phi}")]
    KeyDerivation {
        /// The public exponent.
        e: u64,
        /// Euler's totient of the modulus.
        phi: u64,
    },
}

/// Public half of a key pair: modulus and encryption exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    /// Modulus `p * q`.
    pub n: u64,
    /// Encryption exponent, coprime to `(p-1)(q-1)`.
    pub e: u64,
}

/// Private half of a key pair: the prime factors and decryption exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivateKey {
    /// First prime factor.
    pub p: u64,
    /// Second prime factor.
    pub q: u64,
    /// Decryption exponent, the inverse of `e` modulo `(p-1)(q-1)`.
    pub d: u64,
}

/// A matched public/private key pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPair {
    /// Key used to encrypt records.
    pub public: PublicKey,
    /// Key used to decrypt records.
    pub private: PrivateKey,
}

/// Generate a key pair from a caller-supplied prime pool.
///
/// Two distinct primes are drawn from the pool; the decryption exponent is
/// the modular inverse of a randomly chosen encryption exponent, so
/// `d * e ≡ 1 (mod φ)` holds by construction.
pub fn generate_key_pair<R: Rng + ?Sized>(
    primes: &[u64],
    rng: &mut R,
) -> Result<KeyPair, CipherError> {
    let mut pool: Vec<u64> = primes.to_vec();
    pool.sort_unstable();
    pool.dedup();
    if pool.len() < 2 {
        return Err(CipherError::InsufficientPrimes { count: pool.len() });
    }

    let p = pool.remove(rng.gen_range(0..pool.len()));
    let q = pool[rng.gen_range(0..pool.len())];

    let n = p * q;
    if n >= MAX_MODULUS {
        return Err(CipherError::InvalidModulus { n });
    }
    let phi = (p - 1) * (q - 1);
    // phi = 2 (the {2, 3} pool) leaves no exponent in 2..phi.
    if phi < 3 {
        return Err(CipherError::InvalidModulus { n });
    }

    let mut e = rng.gen_range(2..phi);
    while gcd(e, phi) != 1 {
        e = rng.gen_range(2..phi);
    }
    let d = mod_inverse(e, phi).ok_or(CipherError::KeyDerivation { e, phi })?;

    Ok(KeyPair { public: PublicKey { n, e }, private: PrivateKey { p, q, d } })
}

/// Encrypt a record symbol-by-symbol with the public key.
///
/// One input symbol maps to exactly one output symbol. Symbols with a
/// codepoint at or above the modulus are rejected.
pub fn encrypt_record(record: &str, key: &PublicKey) -> Result<String, CipherError> {
    transform(record, key.n, key.e)
}

/// Decrypt a ciphertext symbol-by-symbol with the private key.
pub fn decrypt_record(cipher: &str, key: &PrivateKey) -> Result<String, CipherError> {
    transform(cipher, key.p * key.q, key.d)
}

/// Check that a key pair round-trips every symbol its modulus admits.
///
/// The probe covers the ASCII range clipped to the modulus; a pair from
/// [`generate_key_pair`] always passes.
pub fn verify_key_pair(pair: &KeyPair) -> bool {
    let bound = pair.public.n.min(0x80) as u32;
    let probe: String = (1..bound).filter_map(char::from_u32).collect();
    if probe.is_empty() {
        return false;
    }

    encrypt_record(&probe, &pair.public)
        .and_then(|cipher| decrypt_record(&cipher, &pair.private))
        .is_ok_and(|plain| plain == probe)
}

fn transform(input: &str, n: u64, exponent: u64) -> Result<String, CipherError> {
    let mut output = String::with_capacity(input.len());
    for symbol in input.chars() {
        let codepoint = symbol as u32;
        if u64::from(codepoint) >= n {
            return Err(CipherError::SymbolOutOfRange { symbol, codepoint, n });
        }
        let residue = pow_mod(u64::from(codepoint), exponent, n);
        // residue < n < MAX_MODULUS, below the surrogate range.
        let encoded = char::from_u32(residue as u32).ok_or(CipherError::SymbolOutOfRange {
            symbol,
            codepoint: residue as u32,
            n,
        })?;
        output.push(encoded);
    }
    Ok(output)
}

fn pow_mod(base: u64, mut exponent: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let mut result: u128 = 1;
    let mut base = u128::from(base) % u128::from(modulus);
    let modulus = u128::from(modulus);
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = result * base % modulus;
        }
        base = base * base % modulus;
        exponent >>= 1;
    }
    result as u64
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

/// Extended Euclid. Returns the inverse of `a` modulo `m`, or `None` when
/// `gcd(a, m) != 1`.
fn mod_inverse(a: u64, m: u64) -> Option<u64> {
    let (mut old_r, mut r) = (i128::from(a), i128::from(m));
    let (mut old_s, mut s) = (1i128, 0i128);

    while r != 0 {
        let quotient = old_r / r;
        (old_r, r) = (r, old_r - quotient * r);
        (old_s, s) = (s, old_s - quotient * s);
    }

    if old_r != 1 {
        return None;
    }
    Some(old_s.rem_euclid(i128::from(m)) as u64)
}
