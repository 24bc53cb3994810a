//! ECDSA signature with DER serialization and RFC6979 deterministic nonces.
//!
//! Supports DER encoding/decoding, low-S normalization, and verification.
//! `sign` returns a normalized signature. `sign_unnormalized` and
//! `sign_randomized` compute `s = k^-1 (z + r d)` directly, so about half of
//! their signatures are high-S; `sign_randomized` mixes extra entropy into
//! the RFC6979 nonce.

use k256::ecdsa;
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::point::AffineCoordinates;
use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, ProjectivePoint, Scalar, U256};
use rand::{CryptoRng, RngCore};
use sha2::Sha256;

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// The secp256k1 curve order N.
/// N = FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
pub const CURVE_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36,
    0x41, 0x41,
];

/// Half of the secp256k1 curve order (N/2, rounded down).
pub const HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B,
    0x20, 0xA0,
];

/// An ECDSA signature with R and S components.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// The R component of the signature (32 bytes, big-endian).
    r: [u8; 32],
    /// The S component of the signature (32 bytes, big-endian).
    s: [u8; 32],
}

impl Signature {
    /// Create a signature from raw R and S 32-byte arrays.
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Signature { r, s }
    }

    /// Access the R component of the signature.
    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// Access the S component of the signature.
    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Whether `s` lies in the lower half of the curve order (`s <= N/2`).
    pub fn is_low_s(&self) -> bool {
        !is_greater_than(&self.s, &HALF_ORDER)
    }

    /// Replace a high `s` with `N - s`.
    ///
    /// # Returns
    /// `true` if `s` was changed.
    pub fn normalize_s(&mut self) -> bool {
        if self.is_low_s() {
            return false;
        }
        self.s = subtract_from_order(&self.s);
        true
    }

    /// Parse a DER-encoded ECDSA signature.
    ///
    /// Expected format: 0x30 <len> 0x02 <r_len> <r> 0x02 <s_len> <s>
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or an error if the DER encoding is malformed
    /// or either component is zero or not below the curve order.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() < 8 {
            return Err(PrimitivesError::InvalidSignature(
                "malformed signature: too short".to_string(),
            ));
        }

        if bytes[0] != 0x30 {
            return Err(PrimitivesError::InvalidSignature(
                "malformed signature: no header magic".to_string(),
            ));
        }

        let sig_len = bytes[1] as usize;
        if sig_len + 2 > bytes.len() || sig_len + 2 < 8 {
            return Err(PrimitivesError::InvalidSignature(
                "malformed signature: bad length".to_string(),
            ));
        }

        let data = &bytes[..sig_len + 2];
        let mut idx = 2;

        // R
        if data[idx] != 0x02 {
            return Err(PrimitivesError::InvalidSignature(
                "malformed signature: no 1st int marker".to_string(),
            ));
        }
        idx += 1;
        let r_len = data[idx] as usize;
        idx += 1;
        if r_len == 0 || idx + r_len > data.len() - 3 {
            return Err(PrimitivesError::InvalidSignature(
                "malformed signature: bogus R length".to_string(),
            ));
        }
        let r_bytes = &data[idx..idx + r_len];
        idx += r_len;

        // S
        if data[idx] != 0x02 {
            return Err(PrimitivesError::InvalidSignature(
                "malformed signature: no 2nd int marker".to_string(),
            ));
        }
        idx += 1;
        let s_len = data[idx] as usize;
        idx += 1;
        if s_len == 0 || idx + s_len > data.len() {
            return Err(PrimitivesError::InvalidSignature(
                "malformed signature: bogus S length".to_string(),
            ));
        }
        let s_bytes = &data[idx..idx + s_len];

        let r = to_32_bytes(r_bytes)?;
        let s = to_32_bytes(s_bytes)?;

        if is_zero(&r) {
            return Err(PrimitivesError::InvalidSignature(
                "signature R is zero".to_string(),
            ));
        }
        if is_zero(&s) {
            return Err(PrimitivesError::InvalidSignature(
                "signature S is zero".to_string(),
            ));
        }
        if !is_less_than(&r, &CURVE_ORDER) {
            return Err(PrimitivesError::InvalidSignature(
                "signature R is >= curve.N".to_string(),
            ));
        }
        if !is_less_than(&s, &CURVE_ORDER) {
            return Err(PrimitivesError::InvalidSignature(
                "signature S is >= curve.N".to_string(),
            ));
        }

        Ok(Signature { r, s })
    }

    /// Serialize the signature in DER format with low-S normalization.
    ///
    /// Output format: 0x30 <len> 0x02 <r_len> <r_bytes> 0x02 <s_len> <s_bytes>
    ///
    /// The encoded S is always in the lower half of the curve order, so a
    /// high-S value held by this struct never reaches the wire.
    pub fn to_der(&self) -> Vec<u8> {
        let s = if is_greater_than(&self.s, &HALF_ORDER) {
            subtract_from_order(&self.s)
        } else {
            self.s
        };

        let rb = canonicalize_int(&self.r);
        let sb = canonicalize_int(&s);

        let total_len = 6 + rb.len() + sb.len();
        let mut out = Vec::with_capacity(total_len);
        out.push(0x30);
        out.push((total_len - 2) as u8);
        out.push(0x02);
        out.push(rb.len() as u8);
        out.extend_from_slice(&rb);
        out.push(0x02);
        out.push(sb.len() as u8);
        out.extend_from_slice(&sb);
        out
    }

    /// Sign a 32-byte digest with RFC6979 nonces, returning a low-S signature.
    pub fn sign(hash: &[u8; 32], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let mut sig = Self::sign_unnormalized(hash, priv_key)?;
        sig.normalize_s();
        Ok(sig)
    }

    /// Sign a 32-byte digest with the RFC6979 nonce, leaving `s` as computed.
    ///
    /// The same digest and key always produce the same (r, s), and `s` may
    /// be above N/2.
    pub fn sign_unnormalized(
        hash: &[u8; 32],
        priv_key: &PrivateKey,
    ) -> Result<Self, PrimitivesError> {
        sign_raw(hash, priv_key, &[])
    }

    /// Like [`Signature::sign_unnormalized`], with 32 bytes from `rng` fed to
    /// RFC6979 as additional data so every call uses a fresh nonce.
    pub fn sign_randomized<R: RngCore + CryptoRng>(
        hash: &[u8; 32],
        priv_key: &PrivateKey,
        rng: &mut R,
    ) -> Result<Self, PrimitivesError> {
        let mut extra = [0u8; 32];
        rng.fill_bytes(&mut extra);
        sign_raw(hash, priv_key, &extra)
    }

    /// Verify this signature against a 32-byte digest and public key.
    pub fn verify(&self, hash: &[u8; 32], pub_key: &PublicKey) -> bool {
        let k256_sig = match ecdsa::Signature::from_scalars(
            FieldBytes::from(self.r),
            FieldBytes::from(self.s),
        ) {
            Ok(sig) => sig,
            Err(_) => return false,
        };

        pub_key
            .verifying_key()
            .verify_prehash(hash, &k256_sig)
            .is_ok()
    }
}

/// Plain ECDSA over secp256k1: `r = x(kG) mod N`, `s = k^-1 (z + r d) mod N`.
fn sign_raw(
    hash: &[u8; 32],
    priv_key: &PrivateKey,
    extra: &[u8],
) -> Result<Signature, PrimitivesError> {
    let d: Scalar = **priv_key.signing_key().as_nonzero_scalar();
    let z = <Scalar as Reduce<U256>>::reduce_bytes(&FieldBytes::from(*hash));

    let k_bytes = rfc6979::generate_k::<Sha256, _>(
        &d.to_repr(),
        &FieldBytes::from(CURVE_ORDER),
        &z.to_repr(),
        extra,
    );
    let k = Option::<Scalar>::from(Scalar::from_repr(k_bytes))
        .ok_or_else(|| PrimitivesError::InvalidSignature("nonce out of range".to_string()))?;
    let k_inv = Option::<Scalar>::from(k.invert())
        .ok_or_else(|| PrimitivesError::InvalidSignature("nonce is zero".to_string()))?;

    let big_r = (ProjectivePoint::GENERATOR * k).to_affine();
    let r = <Scalar as Reduce<U256>>::reduce_bytes(&big_r.x());
    let s = k_inv * (z + r * d);

    if r == Scalar::ZERO || s == Scalar::ZERO {
        return Err(PrimitivesError::InvalidSignature(
            "signature component is zero".to_string(),
        ));
    }

    let mut sig = Signature::new([0u8; 32], [0u8; 32]);
    sig.r.copy_from_slice(&r.to_repr());
    sig.s.copy_from_slice(&s.to_repr());
    Ok(sig)
}

/// Canonicalize an integer for DER encoding.
///
/// Strips leading zeros from the big-endian representation and adds
/// a 0x00 padding byte if the high bit is set.
fn canonicalize_int(val: &[u8; 32]) -> Vec<u8> {
    let mut start = 0;
    while start < 31 && val[start] == 0 {
        start += 1;
    }
    let trimmed = &val[start..];

    if trimmed[0] & 0x80 != 0 {
        let mut out = Vec::with_capacity(trimmed.len() + 1);
        out.push(0x00);
        out.extend_from_slice(trimmed);
        out
    } else {
        trimmed.to_vec()
    }
}

/// Convert a variable-length big-endian byte slice to a fixed 32-byte array.
fn to_32_bytes(bytes: &[u8]) -> Result<[u8; 32], PrimitivesError> {
    let mut trimmed = bytes;
    while trimmed.len() > 1 && trimmed[0] == 0 {
        trimmed = &trimmed[1..];
    }
    if trimmed.len() > 32 {
        return Err(PrimitivesError::InvalidSignature(
            "integer value too large for 32 bytes".to_string(),
        ));
    }
    let mut out = [0u8; 32];
    out[32 - trimmed.len()..].copy_from_slice(trimmed);
    Ok(out)
}

fn is_zero(val: &[u8; 32]) -> bool {
    val.iter().all(|&b| b == 0)
}

/// Big-endian a < b.
fn is_less_than(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a < b
}

/// Big-endian a > b.
fn is_greater_than(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a > b
}

/// Compute N - val where N is the secp256k1 curve order.
fn subtract_from_order(val: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;
    for i in (0..32).rev() {
        let diff = CURVE_ORDER[i] as i32 - val[i] as i32 - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{sha256, sha256d};

    #[test]
    fn test_signatures_der_parsing() {
        let valid_sig: Vec<u8> = vec![
            0x30, 0x44, 0x02, 0x20, 0x4e, 0x45, 0xe1, 0x69, 0x32, 0xb8, 0xaf, 0x51, 0x49, 0x61,
            0xa1, 0xd3, 0xa1, 0xa2, 0x5f, 0xdf, 0x3f, 0x4f, 0x77, 0x32, 0xe9, 0xd6, 0x24, 0xc6,
            0xc6, 0x15, 0x48, 0xab, 0x5f, 0xb8, 0xcd, 0x41, 0x02, 0x20, 0x18, 0x15, 0x22, 0xec,
            0x8e, 0xca, 0x07, 0xde, 0x48, 0x60, 0xa4, 0xac, 0xdd, 0x12, 0x90, 0x9d, 0x83, 0x1c,
            0xc5, 0x6c, 0xbb, 0xac, 0x46, 0x22, 0x08, 0x22, 0x21, 0xa8, 0x76, 0x8d, 0x1d, 0x09,
        ];
        let parsed = Signature::from_der(&valid_sig).unwrap();
        assert_eq!(parsed.to_der(), valid_sig);

        assert!(Signature::from_der(&[]).is_err());

        let mut bad_magic = valid_sig.clone();
        bad_magic[0] = 0x31;
        assert!(Signature::from_der(&bad_magic).is_err());

        let mut bad_marker = valid_sig.clone();
        bad_marker[2] = 0x03;
        assert!(Signature::from_der(&bad_marker).is_err());
    }

    #[test]
    fn test_high_s_is_negated() {
        let mut sig = Signature::new(
            hex_to_32("a196ed0e7ebcbe7b63fe1d8eecbdbde03a67ceba4fc8f6482bdcb9606a911404"),
            hex_to_32("971729c7fa944b465b35250c6570a2f31acbb14b13d1565fab7330dcb2b3dfb1"),
        );
        assert!(!sig.is_low_s());

        // DER output is normalized even before normalize_s is called.
        let expected = hex::decode(
            "3045022100a196ed0e7ebcbe7b63fe1d8eecbdbde03a67ceba4fc8f6482bdcb9606a911404\
             022068e8d638056bb4b9a4cadaf39a8f5d0b9fe32b9b9b7749dc145f2db01d826190",
        )
        .unwrap();
        assert_eq!(sig.to_der(), expected);

        assert!(sig.normalize_s());
        assert!(sig.is_low_s());
        assert_eq!(
            hex::encode(sig.s()),
            "68e8d638056bb4b9a4cadaf39a8f5d0b9fe32b9b9b7749dc145f2db01d826190"
        );
        // Second call is a no-op.
        assert!(!sig.normalize_s());
    }

    #[test]
    fn test_half_order_boundary() {
        let at_half = Signature::new([1u8; 32], HALF_ORDER);
        assert!(at_half.is_low_s());

        let mut above = HALF_ORDER;
        above[31] += 1;
        let mut sig = Signature::new([1u8; 32], above);
        assert!(!sig.is_low_s());
        sig.normalize_s();
        // N - (N/2 + 1) == N/2 for odd N.
        assert_eq!(sig.s(), &HALF_ORDER);
    }

    #[test]
    fn test_zero_signature_der() {
        let sig = Signature::new([0u8; 32], [0u8; 32]);
        let expected: Vec<u8> = vec![0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00];
        assert_eq!(sig.to_der(), expected);
    }

    /// RFC6979 deterministic signing against known Trezor/CoreBitcoin vectors.
    #[test]
    fn test_rfc6979() {
        let tests = vec![
            (
                "cca9fbcc1b41e5a95d369eaa6ddcff73b61a4efaa279cfc6567e8daa39cbaf50",
                "sample",
                "3045022100af340daf02cc15c8d5d08d7735dfe6b98a474ed373bdb5fbecf7571be52b384202205009fb27f37034a9b24b707b7c6b79ca23ddef9e25f7282e8a797efe53a8f124",
            ),
            (
                "0000000000000000000000000000000000000000000000000000000000000001",
                "Satoshi Nakamoto",
                "3045022100934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d802202442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5",
            ),
            (
                "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140",
                "Satoshi Nakamoto",
                "3045022100fd567d121db66e382991534ada77a6bd3106f0a1098c231e47993447cd6af2d002206b39cd0eb1bc8603e159ef5c20a5c8ad685a45b06ce9bebed3f153d10d93bed5",
            ),
            (
                "f8b8af8ce3c7cca5e300d33939540c10d45ce001b8f252bfbc57ba0342904181",
                "Alan Turing",
                "304402207063ae83e7f62bbb171798131b4a0564b956930092b33b07b395615d9ec7e15c022058dfcc1e00a35e1572f366ffe34ba0fc47db1e7189759b9fb233c5b05ab388ea",
            ),
        ];

        for (key_hex, msg, expected_sig_hex) in &tests {
            let priv_key = PrivateKey::from_hex(key_hex).unwrap();
            let hash = sha256(msg.as_bytes());

            let sig = priv_key.sign(&hash).unwrap();
            assert_eq!(hex::encode(sig.to_der()), *expected_sig_hex, "RFC6979 '{}'", msg);
            assert!(sig.is_low_s());
            assert!(priv_key.pub_key().verify(&hash, &sig));

            // Deterministic: a second signature is identical.
            assert_eq!(Signature::sign_unnormalized(&hash, &priv_key).unwrap().r(), sig.r());
        }
    }

    #[test]
    fn test_randomized_signature_verifies() {
        let priv_key = PrivateKey::from_hex(
            "cca9fbcc1b41e5a95d369eaa6ddcff73b61a4efaa279cfc6567e8daa39cbaf50",
        )
        .unwrap();
        let hash = sha256(b"randomized");
        let mut rng = rand::rngs::OsRng;

        let mut a = Signature::sign_randomized(&hash, &priv_key, &mut rng).unwrap();
        let mut b = Signature::sign_randomized(&hash, &priv_key, &mut rng).unwrap();
        assert_ne!(a.r(), b.r(), "fresh entropy should change the nonce");

        a.normalize_s();
        b.normalize_s();
        assert!(a.verify(&hash, &priv_key.pub_key()));
        assert!(b.verify(&hash, &priv_key.pub_key()));
    }

    #[test]
    fn test_unnormalized_keeps_high_s() {
        let priv_key = PrivateKey::from_hex(
            "eaf02ca348c524e6392655ba4d29603cd1a7347d9d65cfe93ce1ebffdca22694",
        )
        .unwrap();
        let hash = sha256d(b"high-s");

        let raw = Signature::sign_unnormalized(&hash, &priv_key).unwrap();
        assert_eq!(
            hex::encode(raw.r()),
            "58bef2b3881c405e3e5e51ecf107b0618f765a0e4ba357ad80211a85c7597d0d"
        );
        assert_eq!(
            hex::encode(raw.s()),
            "cc16962d77ee4e33beffdb072f0b65e87420ac9c42c7f5d507052fc8d50ebce5"
        );
        assert!(!raw.is_low_s());
        // k256 verification accepts either half.
        assert!(raw.verify(&hash, &priv_key.pub_key()));

        let sig = Signature::sign(&hash, &priv_key).unwrap();
        assert_eq!(sig.r(), raw.r());
        assert_eq!(
            hex::encode(sig.s()),
            "33e969d28811b1cc410024f8d0f49a16468e304a6c80aa66b8cd2ec3fb27845c"
        );
        assert!(sig.verify(&hash, &priv_key.pub_key()));
    }

    #[test]
    fn test_unnormalized_s_covers_both_halves() {
        let priv_key = PrivateKey::from_hex(
            "eaf02ca348c524e6392655ba4d29603cd1a7347d9d65cfe93ce1ebffdca22694",
        )
        .unwrap();
        let high = (0u32..64)
            .map(|i| sha256d(&i.to_le_bytes()))
            .filter(|hash| {
                !Signature::sign_unnormalized(hash, &priv_key)
                    .unwrap()
                    .is_low_s()
            })
            .count();
        assert_eq!(high, 31);
    }

    #[test]
    fn test_verify_rejects_wrong_digest() {
        let priv_key = PrivateKey::from_hex(
            "0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        let sig = priv_key.sign(&sha256(b"one")).unwrap();
        assert!(!sig.verify(&sha256(b"two"), &priv_key.pub_key()));
    }

    fn hex_to_32(s: &str) -> [u8; 32] {
        let bytes = hex::decode(s).unwrap();
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(&bytes);
        out
    }
}
