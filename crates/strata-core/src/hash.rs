// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Deterministic, value-based hashing for descriptor types.
//!
//! Everything that is used as a deduplication key goes through this module:
//! pipeline-layout characteristics, render-pass and framebuffer keys, and the
//! fixed-function state descriptors. Hashing is field-wise over explicit values,
//! fed as little-endian bytes into a seeded XXH3 stream, so a digest is stable
//! across runs and platforms. Plain-old-data keys are hashed over their bytes,
//! which is only sound because [`bytemuck::Pod`] forbids padding.

use bytemuck::Pod;
use xxhash_rust::xxh3::{xxh3_64_with_seed, Xxh3};

/// Seed shared by every structural digest.
pub const STRUCTURAL_SEED: u64 = 0x5354_5241_5441_0001;

/// A streaming hasher producing stable 64-bit digests.
#[derive(Clone)]
pub struct StructuralHasher {
    inner: Xxh3,
}

impl StructuralHasher {
    /// Creates a hasher seeded with [`STRUCTURAL_SEED`].
    pub fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(STRUCTURAL_SEED),
        }
    }

    /// Feeds raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    /// Feeds a single byte.
    pub fn write_u8(&mut self, value: u8) {
        self.inner.update(&[value]);
    }

    /// Feeds a `u32` in little-endian order.
    pub fn write_u32(&mut self, value: u32) {
        self.inner.update(&value.to_le_bytes());
    }

    /// Feeds a `u64` in little-endian order.
    pub fn write_u64(&mut self, value: u64) {
        self.inner.update(&value.to_le_bytes());
    }

    /// Feeds an `i32` in little-endian order.
    pub fn write_i32(&mut self, value: i32) {
        self.inner.update(&value.to_le_bytes());
    }

    /// Feeds an `f32` by bit pattern.
    pub fn write_f32(&mut self, value: f32) {
        self.write_u32(value.to_bits());
    }

    /// Feeds a boolean as a single byte.
    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(value as u8);
    }

    /// Feeds a string, length-prefixed so that `("ab", "c")` and `("a", "bc")` differ.
    pub fn write_str(&mut self, value: &str) {
        self.write_u64(value.len() as u64);
        self.inner.update(value.as_bytes());
    }

    /// Returns the digest of everything written so far.
    pub fn finish(&self) -> u64 {
        self.inner.digest()
    }
}

impl Default for StructuralHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Field-wise, order-sensitive structural hashing.
///
/// Unlike [`std::hash::Hash`], implementations must be deterministic across
/// processes: enums are written as their discriminant, floats by bit pattern.
pub trait StructuralHash {
    /// Writes this value into `state`.
    fn structural_hash(&self, state: &mut StructuralHasher);

    /// Convenience: hashes this value alone with a fresh hasher.
    fn structural_digest(&self) -> u64 {
        let mut state = StructuralHasher::new();
        self.structural_hash(&mut state);
        state.finish()
    }
}

impl<T: StructuralHash> StructuralHash for [T] {
    fn structural_hash(&self, state: &mut StructuralHasher) {
        state.write_u64(self.len() as u64);
        for item in self {
            item.structural_hash(state);
        }
    }
}

impl<T: StructuralHash> StructuralHash for Vec<T> {
    fn structural_hash(&self, state: &mut StructuralHasher) {
        self.as_slice().structural_hash(state);
    }
}

impl<T: StructuralHash> StructuralHash for Option<T> {
    fn structural_hash(&self, state: &mut StructuralHasher) {
        match self {
            Some(value) => {
                state.write_u8(1);
                value.structural_hash(state);
            }
            None => state.write_u8(0),
        }
    }
}

/// Hashes the exact byte content of a plain-old-data value.
pub fn pod_hash<T: Pod>(value: &T) -> u64 {
    xxh3_64_with_seed(bytemuck::bytes_of(value), STRUCTURAL_SEED)
}

/// Compares two plain-old-data values byte for byte.
pub fn pod_eq<T: Pod>(a: &T, b: &T) -> bool {
    bytemuck::bytes_of(a) == bytemuck::bytes_of(b)
}

/// Wide hash of a shader resource name.
pub fn name_hash(name: &str) -> u64 {
    xxh3_64_with_seed(name.as_bytes(), STRUCTURAL_SEED)
}
