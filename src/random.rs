//! Explicit random streams.
//!
//! Every run owns a private [`ChaCha8Rng`]. Runs sharing a seed are
//! separated by stream number, so a batch is reproducible from one seed
//! and no generator state is ever shared between threads.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Random generator used by the annealer.
pub type RunRng = ChaCha8Rng;

/// Creates the generator for `stream` under `seed`.
pub fn create_rng(seed: u64, stream: u64) -> RunRng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(stream);
    rng
}

/// Draws a fresh seed from OS entropy.
pub fn entropy_seed() -> u64 {
    rand::random()
}
