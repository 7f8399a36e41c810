//! Z-Secure Vault - Chaos Mixing
//!
//! Deterministic diffusion of a byte buffer through a discretized Lorenz
//! system, seeded from the buffer itself. Used as the preprocessing step of
//! biometric key derivation: it spreads the entropy of a face-encoding
//! buffer before PBKDF2 stretching. The exact emission rule is part of the
//! Z-Secure format and must not change between versions.

use sha2::{Digest, Sha256};

use crate::error::{ZsecureError, ZsecureResult};

/// Lorenz system parameters (classic chaotic regime)
const SIGMA: f64 = 10.0;
const RHO: f64 = 28.0;
const BETA: f64 = 8.0 / 3.0;

/// Integration step
const DT: f64 = 0.01;

/// Chaos mixer configuration
#[derive(Debug, Clone)]
pub struct ChaosConfig {
    /// Number of Lorenz iterations (= length of the emitted byte sequence)
    pub iterations: usize,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self { iterations: 1000 }
    }
}

/// Deterministic chaos-based byte mixer
///
/// `mix` is a pure function: the same input always produces the same
/// 32-byte digest. No state is held across calls.
#[derive(Debug, Clone, Default)]
pub struct ChaosMixer {
    config: ChaosConfig,
}

impl ChaosMixer {
    pub fn new(config: ChaosConfig) -> Self {
        Self { config }
    }

    /// Mix a byte buffer into a 32-byte digest.
    ///
    /// Seeds three Lorenz state variables from byte sums at offsets
    /// 0/1/2 (mod 3), iterates the system emitting one byte per step,
    /// XORs the input against the emitted sequence cyclically, and
    /// hashes the result with SHA-256.
    pub fn mix(&self, data: &[u8]) -> ZsecureResult<[u8; 32]> {
        if data.is_empty() {
            return Err(ZsecureError::InvalidInput(
                "chaos mix input must not be empty".into(),
            ));
        }

        let (mut x, mut y, mut z) = seed_state(data);

        let mut sequence = Vec::with_capacity(self.config.iterations);
        for _ in 0..self.config.iterations {
            let dx = SIGMA * (y - x);
            let dy = x * (RHO - z) - y;
            let dz = x * y - BETA * z;

            x += dx * DT;
            y += dy * DT;
            z += dz * DT;

            sequence.push(emit_byte(x, y, z));
        }

        // XOR input against the chaos sequence, wrapping the shorter one
        let mixed: Vec<u8> = data
            .iter()
            .enumerate()
            .map(|(i, &byte)| byte ^ sequence[i % sequence.len()])
            .collect();

        let digest = Sha256::digest(&mixed);
        Ok(digest.into())
    }
}

/// Seed the Lorenz state from the input buffer.
///
/// Each component sums every 3rd byte (offsets 0, 1, 2) and normalizes the
/// sum into [0, 1) via `sum % 1000 / 1000`.
fn seed_state(data: &[u8]) -> (f64, f64, f64) {
    let sum_at = |offset: usize| -> f64 {
        let sum: u64 = data
            .iter()
            .skip(offset)
            .step_by(3)
            .map(|&b| u64::from(b))
            .sum();
        (sum % 1000) as f64 / 1000.0
    };
    (sum_at(0), sum_at(1), sum_at(2))
}

/// One pseudorandom byte per iteration: `round(|x|·|y|·|z|·1e6) mod 256`.
fn emit_byte(x: f64, y: f64, z: f64) -> u8 {
    let magnitude = (x.abs() * y.abs() * z.abs() * 1_000_000.0).round();
    (magnitude % 256.0) as u8
}
