//! Deterministic random streams for parallel batches.
//!
//! A root seed is expanded into independent per-chunk seeds with
//! HMAC-SHA256 over a domain tag and the stream index, so a batch split
//! across threads draws the same numbers no matter how it is scheduled.
use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

const BATCH_STREAM_TAG: &[u8] = b"pullsim/batch";

/// Derive a sub-seed of `root` for `domain_tag`.
#[must_use]
pub fn derive_stream_seed(root: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&root.to_le_bytes()) else {
        // HMAC accepts keys of any length.
        return root;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

fn batch_stream_seed(root: u64, stream: u64) -> u64 {
    let mut tag = [0u8; BATCH_STREAM_TAG.len() + 8];
    tag[..BATCH_STREAM_TAG.len()].copy_from_slice(BATCH_STREAM_TAG);
    tag[BATCH_STREAM_TAG.len()..].copy_from_slice(&stream.to_le_bytes());
    derive_stream_seed(root, &tag)
}

/// Hands out never-repeating stream indices under one root seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSequence {
    root: u64,
    next_stream: u64,
}

impl SeedSequence {
    #[must_use]
    pub const fn new(root: u64) -> Self {
        Self {
            root,
            next_stream: 0,
        }
    }

    /// Seed the root from operating-system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(ChaCha20Rng::from_entropy().next_u64())
    }

    #[must_use]
    pub const fn root(&self) -> u64 {
        self.root
    }

    /// Reserve `len` consecutive streams for one batch.
    pub const fn reserve(&mut self, len: u64) -> StreamBlock {
        let block = StreamBlock {
            root: self.root,
            first: self.next_stream,
            len,
        };
        self.next_stream = self.next_stream.wrapping_add(len);
        block
    }
}

/// Contiguous range of stream indices owned by one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamBlock {
    root: u64,
    first: u64,
    len: u64,
}

impl StreamBlock {
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Generator for the `offset`-th stream of the block.
    #[must_use]
    pub fn rng(&self, offset: u64) -> SmallRng {
        SmallRng::seed_from_u64(batch_stream_seed(self.root, self.first.wrapping_add(offset)))
    }
}
