pub mod secure_rng;


// Re-export
pub use secure_rng::{calculate_entropy, get_secure_rng, secure_random_bytes};
