// Any single-bit change to ciphertext, AAD, IV or tag must fail authentication.

#[cfg(test)]
mod tests {
    use cbc_hmac_core::crypto::{AeadStream, CryptoError};
    use cbc_hmac_core::registry::{create_decipher, list_supported_algorithms, AlgorithmRegistry};
    use cbc_hmac_core::stream::{open, seal, Sealed};

    const IV: [u8; 16] = [0x42; 16];
    const AAD: &[u8] = b"routing-header:v1";
    const PLAINTEXT: &[u8] = b"attack at dawn, bring the blue folder and two spare keys";

    fn key_for(alg: &str) -> Vec<u8> {
        let len = AlgorithmRegistry::standard().resolve(alg).expect("known").key_len();
        (0..len).map(|i| (i as u8).wrapping_mul(31)).collect()
    }

    fn sealed(alg: &str) -> Sealed {
        seal(alg, &key_for(alg), &IV, AAD, PLAINTEXT).expect("seal")
    }

    #[test]
    fn flipped_ciphertext_bits_rejected() {
        for alg in list_supported_algorithms() {
            let s = sealed(alg);
            for i in 0..s.ciphertext.len() {
                let mut ct = s.ciphertext.clone();
                ct[i] ^= 1 << (i % 8);
                let res = open(alg, &key_for(alg), &IV, AAD, &ct, &s.tag);
                assert_eq!(res, Err(CryptoError::AuthenticationFailed), "{alg} byte {i}");
            }
        }
    }

    #[test]
    fn flipped_tag_bits_rejected() {
        for alg in list_supported_algorithms() {
            let s = sealed(alg);
            for i in 0..s.tag.len() {
                let mut tag = s.tag.clone();
                tag[i] ^= 0x01;
                let res = open(alg, &key_for(alg), &IV, AAD, &s.ciphertext, &tag);
                assert_eq!(res, Err(CryptoError::AuthenticationFailed), "{alg} tag byte {i}");
            }
        }
    }

    #[test]
    fn altered_aad_or_iv_rejected() {
        let alg = "aes-256-cbc-hmac-sha-512";
        let s = sealed(alg);
        let key = key_for(alg);

        let mut aad = AAD.to_vec();
        aad[0] ^= 0x20;
        assert_eq!(open(alg, &key, &IV, &aad, &s.ciphertext, &s.tag), Err(CryptoError::AuthenticationFailed));
        assert_eq!(open(alg, &key, &IV, b"", &s.ciphertext, &s.tag), Err(CryptoError::AuthenticationFailed));

        let mut iv = IV;
        iv[15] ^= 0x80;
        assert_eq!(open(alg, &key, &iv, AAD, &s.ciphertext, &s.tag), Err(CryptoError::AuthenticationFailed));
    }

    #[test]
    fn truncated_or_extended_tag_rejected() {
        let alg = "aes-128-cbc-hmac-sha-256";
        let s = sealed(alg);
        let key = key_for(alg);
        let short = &s.tag[..s.tag.len() - 1];
        let mut long = s.tag.clone();
        long.push(0);
        assert_eq!(open(alg, &key, &IV, AAD, &s.ciphertext, short), Err(CryptoError::AuthenticationFailed));
        assert_eq!(open(alg, &key, &IV, AAD, &s.ciphertext, &long), Err(CryptoError::AuthenticationFailed));
        assert_eq!(open(alg, &key, &IV, AAD, &s.ciphertext, &[]), Err(CryptoError::AuthenticationFailed));
    }

    #[test]
    fn truncated_ciphertext_rejected_as_forgery() {
        let alg = "aes-192-cbc-hmac-sha-384";
        let s = sealed(alg);
        let key = key_for(alg);
        for cut in [1, 15, 16] {
            let ct = &s.ciphertext[..s.ciphertext.len() - cut];
            assert_eq!(open(alg, &key, &IV, AAD, ct, &s.tag), Err(CryptoError::AuthenticationFailed));
        }
    }

    #[test]
    fn wrong_key_rejected() {
        let alg = "aes-256-cbc-hmac-sha-384";
        let s = sealed(alg);
        let mut key = key_for(alg);
        // First byte belongs to the MAC key.
        key[0] ^= 1;
        assert_eq!(open(alg, &key, &IV, AAD, &s.ciphertext, &s.tag), Err(CryptoError::AuthenticationFailed));
    }

    /// Tag over `AAD || IV || ct || AL` for aes-128-cbc-hmac-sha-256.
    fn forge_tag(mac_key: &[u8], aad: &[u8], iv: &[u8], ct: &[u8]) -> Vec<u8> {
        use hmac::{Hmac, Mac};
        let mut mac = Hmac::<sha2::Sha256>::new_from_slice(mac_key).expect("any key length");
        mac.update(aad);
        mac.update(iv);
        mac.update(ct);
        mac.update(&((aad.len() as u64) * 8).to_be_bytes());
        mac.finalize().into_bytes()[..16].to_vec()
    }

    #[test]
    fn authenticated_but_malformed_ciphertext_is_invalid() {
        let alg = "aes-128-cbc-hmac-sha-256";
        let key: Vec<u8> = (0u8..32).collect();
        let iv = [0u8; 16];

        // Not a multiple of the block size.
        let ct = [0x11u8; 19];
        let tag = forge_tag(&key[..16], b"", &iv, &ct);
        assert!(matches!(open(alg, &key, &iv, b"", &ct, &tag), Err(CryptoError::InvalidCiphertext(_))));

        // Empty ciphertext.
        let tag = forge_tag(&key[..16], b"", &iv, &[]);
        assert!(matches!(open(alg, &key, &iv, b"", &[], &tag), Err(CryptoError::InvalidCiphertext(_))));

        // One block whose decryption ends in 0x6d: bad padding.
        let ct = [0u8; 16];
        let tag = forge_tag(&key[..16], b"", &iv, &ct);
        assert!(matches!(open(alg, &key, &iv, b"", &ct, &tag), Err(CryptoError::InvalidCiphertext(_))));
    }

    #[test]
    fn provisional_plaintext_then_failure() {
        let alg = "aes-128-cbc-hmac-sha-256";
        let s = sealed(alg);
        let mut tag = s.tag.clone();
        tag[0] ^= 0xff;

        let mut decipher = create_decipher(alg, &key_for(alg), &IV).expect("decipher");
        decipher.set_aad(AAD).expect("aad");
        decipher.set_auth_tag(&tag).expect("tag");
        // update releases all but the last block, unauthenticated.
        let provisional = decipher.update(&s.ciphertext).expect("update");
        assert_eq!(provisional.len(), s.ciphertext.len() - 16);
        assert_eq!(decipher.finalize(), Err(CryptoError::AuthenticationFailed));
    }
}
