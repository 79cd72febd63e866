pub mod types;
pub mod keys;
pub mod aad;
pub mod mac;
pub mod block;
pub mod aead;

pub use types::*;
pub use keys::*;
pub use aad::*;
pub use mac::*;
pub use block::*;
pub use aead::*;
