// crypto.rs - authenticator and password-hiding primitives (RFC 2865 §5.2, RFC 2869)
//
// Everything here is a pure function of its byte inputs. MD5 and HMAC-MD5
// are cryptographically weak but mandated by the protocol; do not swap them
// for something stronger without breaking wire compatibility.

use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use rand::RngCore;

/// MD5 digest of the concatenated input.
pub fn md5(bytes: &[u8]) -> [u8; 16] {
    let mut hasher = Md5::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// HMAC-MD5 of `bytes` under `key`.
///
/// # Panics
///
/// Never: HMAC accepts keys of any length.
pub fn hmac_md5(key: &[u8], bytes: &[u8]) -> [u8; 16] {
    let mut mac = Hmac::<Md5>::new_from_slice(key).expect("HMAC-MD5 accepts keys of any length");
    mac.update(bytes);
    mac.finalize().into_bytes().into()
}

/// Request Authenticator for Accounting-Request / Disconnect-Request /
/// CoA-Request packets:
/// `MD5(code || id || length || 16 zero bytes || attributes || secret)`.
///
/// `header_and_attributes` is the full serialized packet with the 16
/// authenticator bytes at offset 4 already zeroed.
pub fn request_authenticator(header_and_attributes: &[u8], secret: &[u8]) -> [u8; 16] {
    let mut buf = Vec::with_capacity(header_and_attributes.len() + secret.len());
    buf.extend_from_slice(header_and_attributes);
    buf.extend_from_slice(secret);
    md5(&buf)
}

/// Response Authenticator:
/// `MD5(code || id || length || request_authenticator || attributes || secret)`.
///
/// `header_and_attributes` is the full serialized packet with the 16
/// authenticator bytes at offset 4 set to `request_authenticator`.
pub fn response_authenticator(header_and_attributes: &[u8], secret: &[u8]) -> [u8; 16] {
    request_authenticator(header_and_attributes, secret)
}

/// Message-Authenticator (RFC 2869):
/// `HMAC-MD5(secret, code || id || length || authenticator || attributes_with_MA_zeroed)`.
pub fn message_authenticator(packet_with_ma_zeroed: &[u8], secret: &[u8]) -> [u8; 16] {
    hmac_md5(secret, packet_with_ma_zeroed)
}

/// Generate a 16-byte authenticator from a cryptographically strong source,
/// with no zero bytes, for Access-Request and Status-Server packets
/// (Invariant 1).
pub fn random_authenticator() -> [u8; 16] {
    let mut rng = rand::thread_rng();
    let mut out = [0u8; 16];
    loop {
        rng.fill_bytes(&mut out);
        if !out.contains(&0) {
            return out;
        }
    }
}

/// Hide a User-Password per RFC 2865 §5.2.
///
/// The cleartext is padded with zero bytes to a multiple of 16 (max 128)
/// before XORing against the MD5 keystream derived from `secret` and
/// `authenticator`. Cleartext longer than 128 bytes is truncated to 128
/// bytes first, matching the padded buffer's hard cap.
pub fn hide_password(secret: &[u8], authenticator: &[u8; 16], cleartext: &[u8]) -> Vec<u8> {
    let cleartext = &cleartext[..cleartext.len().min(128)];
    let padded_len = padded_password_len(cleartext.len());
    let mut padded = vec![0u8; padded_len];
    padded[..cleartext.len()].copy_from_slice(cleartext);

    let mut out = vec![0u8; padded_len];
    let mut prev_block: [u8; 16] = *authenticator;
    for (chunk_idx, chunk) in padded.chunks_exact(16).enumerate() {
        let b = keystream_block(secret, &prev_block);
        let out_chunk = &mut out[chunk_idx * 16..chunk_idx * 16 + 16];
        for i in 0..16 {
            out_chunk[i] = chunk[i] ^ b[i];
        }
        prev_block.copy_from_slice(out_chunk);
    }
    out
}

/// Reverse [`hide_password`]. Returns the padded plaintext byte string; the
/// caller trims trailing zero bytes only when converting to a UTF-8 string.
///
/// Returns `None` if `hidden` is empty or not a multiple of 16 bytes —
/// the wire never carries a validly-hidden password of any other length,
/// and a wire-supplied value of arbitrary length must not be processed
/// as though it were one.
pub fn unhide_password(secret: &[u8], authenticator: &[u8; 16], hidden: &[u8]) -> Option<Vec<u8>> {
    if hidden.is_empty() || hidden.len() % 16 != 0 {
        return None;
    }

    let mut out = vec![0u8; hidden.len()];
    let mut prev_block: [u8; 16] = *authenticator;
    for (chunk_idx, chunk) in hidden.chunks_exact(16).enumerate() {
        let b = keystream_block(secret, &prev_block);
        let out_chunk = &mut out[chunk_idx * 16..chunk_idx * 16 + 16];
        for i in 0..16 {
            out_chunk[i] = chunk[i] ^ b[i];
        }
        prev_block.copy_from_slice(chunk);
    }
    Some(out)
}

fn keystream_block(secret: &[u8], prev_block: &[u8; 16]) -> [u8; 16] {
    let mut buf = Vec::with_capacity(secret.len() + 16);
    buf.extend_from_slice(secret);
    buf.extend_from_slice(prev_block);
    md5(&buf)
}

fn padded_password_len(cleartext_len: usize) -> usize {
    let len = cleartext_len.min(128).max(1);
    ((len + 15) / 16) * 16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_known_vector() {
        // RFC 1321 test vector.
        assert_eq!(
            md5(b"abc"),
            [
                0x90, 0x01, 0x50, 0x98, 0x3c, 0xd2, 0x4f, 0xb0, 0xd6, 0x96, 0x3f, 0x7d, 0x28, 0xe1,
                0x7f, 0x72
            ]
        );
    }

    #[test]
    fn password_round_trip() {
        let secret = b"xyzzy5461";
        let authenticator = [0x42u8; 16];
        let cleartext = b"arctangent";

        let hidden = hide_password(secret, &authenticator, cleartext);
        let recovered = unhide_password(secret, &authenticator, &hidden).unwrap();

        assert_eq!(&recovered[..cleartext.len()], cleartext);
        assert!(recovered[cleartext.len()..].iter().all(|&b| b == 0));
    }

    #[test]
    fn hide_password_truncates_cleartext_over_128_bytes() {
        let secret = b"xyzzy5461";
        let authenticator = [0x42u8; 16];
        let cleartext = vec![b'a'; 200];

        let hidden = hide_password(secret, &authenticator, &cleartext);
        assert_eq!(hidden.len(), 128);

        let recovered = unhide_password(secret, &authenticator, &hidden).unwrap();
        assert_eq!(&recovered[..128], &cleartext[..128]);
    }

    #[test]
    fn unhide_password_rejects_length_not_multiple_of_16() {
        let secret = b"xyzzy5461";
        let authenticator = [0x42u8; 16];
        assert!(unhide_password(secret, &authenticator, &[0u8; 1]).is_none());
        assert!(unhide_password(secret, &authenticator, &[0u8; 17]).is_none());
        assert!(unhide_password(secret, &authenticator, &[]).is_none());
    }

    #[test]
    fn s1_known_answer_hidden_password_prefix() {
        let secret = b"xyzzy5461";
        let authenticator = [
            0x0c, 0x0b, 0xa4, 0x7e, 0xa2, 0x93, 0x4c, 0x49, 0x6f, 0xd0, 0x3a, 0xe7, 0xe1, 0x62,
            0x5d, 0x82,
        ];
        let hidden = hide_password(secret, &authenticator, b"arctangent");
        let expected_prefix = [
            0x0d, 0xbb, 0x81, 0xd1, 0x32, 0xf7, 0xfa, 0x18, 0x95, 0x43, 0xf1, 0xfe, 0xb3, 0xcf,
            0x77, 0x35,
        ];
        assert_eq!(&hidden[..16], &expected_prefix);
    }

    #[test]
    fn random_authenticator_has_no_zero_bytes() {
        for _ in 0..64 {
            let a = random_authenticator();
            assert!(!a.contains(&0));
        }
    }
}
