//! Private and public key resolution

mod private;
mod public;

pub use private::{PRIVATE_TYPE_MISMATCH, PrivateKeyResolver};
pub use public::{PUBLIC_TYPE_MISMATCH, PinnedKeyResolver, PublicKeyResolver, SourcePublicKeyResolver};
