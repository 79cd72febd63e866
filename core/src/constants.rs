//! constants.rs
//! Fixed sizes, numeric identifiers, algorithm names and streaming defaults.

/// AES block size and the only accepted IV length (bytes).
pub const BLOCK_LEN: usize = 16;
pub const IV_LEN: usize = 16;

/// Length of the AL field (64-bit big-endian AAD bit length).
pub const AL_LEN: usize = 8;

/// Largest AAD (bytes) whose bit length still fits in the low 32 bits of AL.
pub const MAX_AAD_LEN: usize = (u32::MAX / 8) as usize;

/// Block cipher identifiers (mirrored by `CipherId`).
pub mod cipher_ids {
    pub const AES128_CBC: u16 = 0x0101;
    pub const AES192_CBC: u16 = 0x0102;
    pub const AES256_CBC: u16 = 0x0103;
}

/// Keyed-hash identifiers (mirrored by `HashId`).
pub mod hash_ids {
    pub const SHA256: u16 = 0x0001;
    pub const SHA384: u16 = 0x0002;
    pub const SHA512: u16 = 0x0003;
}

/// Registered construction names.
pub mod alg_names {
    pub const AES_128_CBC_HMAC_SHA_256: &str = "aes-128-cbc-hmac-sha-256";
    pub const AES_192_CBC_HMAC_SHA_384: &str = "aes-192-cbc-hmac-sha-384";
    pub const AES_256_CBC_HMAC_SHA_512: &str = "aes-256-cbc-hmac-sha-512";
    pub const AES_256_CBC_HMAC_SHA_384: &str = "aes-256-cbc-hmac-sha-384";
}

/// Defaults when Option<T> is None
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024; // 64 KiB
pub const MIN_CHUNK_SIZE: usize = 1;
/// Max chunk size sanity bound (32 MiB).
pub const MAX_CHUNK_SIZE: usize = 32 * 1024 * 1024;

/// Bounded channel depth between the pipeline reader and the cipher thread.
pub const DEFAULT_QUEUE_CAP: usize = 8;
pub const MAX_QUEUE_CAP: usize = 1024;
