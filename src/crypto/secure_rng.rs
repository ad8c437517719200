use anyhow::{anyhow, Result};
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Mutex;

/// Cryptographically secure random number generator backed by the OS
///
/// Random wipe passes draw from the platform CSPRNG via ring's
/// `SystemRandom`.
pub struct SecureRNG {
    rng: SystemRandom,
}

impl Default for SecureRNG {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureRNG {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }

    /// Fill buffer with cryptographically secure random bytes
    pub fn fill_bytes(&self, dest: &mut [u8]) -> Result<()> {
        self.rng
            .fill(dest)
            .map_err(|_| anyhow!("OS random source failed"))?;
        Ok(())
    }
}

/// Thread-safe wrapper for SecureRNG
pub struct ThreadSafeRNG {
    inner: Mutex<SecureRNG>,
}

impl ThreadSafeRNG {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SecureRNG::new()),
        }
    }

    pub fn fill_bytes(&self, dest: &mut [u8]) -> Result<()> {
        let rng = self.inner.lock().unwrap();
        rng.fill_bytes(dest)
    }
}

impl Default for ThreadSafeRNG {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static::lazy_static! {
    static ref GLOBAL_RNG: ThreadSafeRNG = ThreadSafeRNG::new();
}

/// Get the global secure RNG instance
pub fn get_secure_rng() -> &'static ThreadSafeRNG {
    &GLOBAL_RNG
}

/// Convenience function to fill bytes using the global RNG
pub fn secure_random_bytes(dest: &mut [u8]) -> Result<()> {
    GLOBAL_RNG.fill_bytes(dest)
}

/// Calculate Shannon entropy of data in bits per byte
pub fn calculate_entropy(data: &[u8]) -> f64 {
    let mut counts = [0u64; 256];
    for &byte in data {
        counts[byte as usize] += 1;
    }

    let length = data.len() as f64;
    let mut entropy = 0.0;

    for &count in &counts {
        if count > 0 {
            let probability = count as f64 / length;
            entropy -= probability * probability.log2();
        }
    }

    entropy
}
