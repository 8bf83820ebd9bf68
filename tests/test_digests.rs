//! Cross-checks of the in-crate hash and MAC primitives against
//! independent implementations, across lengths that straddle every rate
//! and block boundary.

use sha2::Digest as _;
use sha3::digest::{ExtendableOutput, Update as _, XofReader};
use sha3::Digest as _;
use tiny_keccak::Hasher as _;

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 131 % 251) as u8).collect()
}

const LENGTHS: [usize; 16] = [0, 1, 3, 31, 32, 55, 56, 63, 64, 71, 72, 104, 135, 136, 168, 300];

#[test]
fn sha2_matches_reference_crate() {
    for len in LENGTHS {
        let data = pattern(len);
        assert_eq!(
            pqkit::Sha256::digest(&data).to_vec(),
            sha2::Sha256::digest(&data).to_vec(),
            "sha256 len {len}"
        );
        assert_eq!(
            pqkit::Sha384::digest(&data).to_vec(),
            sha2::Sha384::digest(&data).to_vec(),
            "sha384 len {len}"
        );
        assert_eq!(
            pqkit::Sha512::digest(&data).to_vec(),
            sha2::Sha512::digest(&data).to_vec(),
            "sha512 len {len}"
        );
    }
}

#[test]
fn sha3_matches_reference_crate() {
    for len in LENGTHS {
        let data = pattern(len);
        assert_eq!(
            pqkit::Sha3_256::digest(&data).to_vec(),
            sha3::Sha3_256::digest(&data).to_vec(),
            "sha3-256 len {len}"
        );
        assert_eq!(
            pqkit::Sha3_384::digest(&data).to_vec(),
            sha3::Sha3_384::digest(&data).to_vec(),
            "sha3-384 len {len}"
        );
        assert_eq!(
            pqkit::Sha3_512::digest(&data).to_vec(),
            sha3::Sha3_512::digest(&data).to_vec(),
            "sha3-512 len {len}"
        );
    }
}

#[test]
fn shake_matches_reference_crate() {
    for len in LENGTHS {
        let data = pattern(len);
        for outlen in [1usize, 32, 135, 137, 333] {
            let mut ours = vec![0u8; outlen];
            pqkit::Shake128::xof(&data, &mut ours);
            let mut theirs = vec![0u8; outlen];
            let mut state = sha3::Shake128::default();
            state.update(&data);
            state.finalize_xof().read(&mut theirs);
            assert_eq!(ours, theirs, "shake128 len {len} out {outlen}");

            let mut ours = vec![0u8; outlen];
            pqkit::Shake256::xof(&data, &mut ours);
            let mut theirs = vec![0u8; outlen];
            let mut state = sha3::Shake256::default();
            state.update(&data);
            state.finalize_xof().read(&mut theirs);
            assert_eq!(ours, theirs, "shake256 len {len} out {outlen}");
        }
    }
}

#[test]
fn cshake_matches_tiny_keccak() {
    let name = b"function name";
    let custom = b"customization string";
    for len in LENGTHS {
        let data = pattern(len);

        let mut ours = [0u8; 64];
        pqkit::CShake128::xof(name, custom, &data, &mut ours);
        let mut theirs = [0u8; 64];
        let mut state = tiny_keccak::CShake::v128(name, custom);
        state.update(&data);
        state.finalize(&mut theirs);
        assert_eq!(ours, theirs, "cshake128 len {len}");

        let mut ours = [0u8; 64];
        pqkit::CShake256::xof(name, custom, &data, &mut ours);
        let mut theirs = [0u8; 64];
        let mut state = tiny_keccak::CShake::v256(name, custom);
        state.update(&data);
        state.finalize(&mut theirs);
        assert_eq!(ours, theirs, "cshake256 len {len}");
    }
}

#[test]
fn kmac_matches_tiny_keccak() {
    let key = b"a keyed mac key of decent length";
    let custom = b"kmac customization";
    for len in LENGTHS {
        let data = pattern(len);
        for taglen in [16usize, 32, 64] {
            let mut ours = vec![0u8; taglen];
            pqkit::Kmac128::compute(key, custom, &data, &mut ours);
            let mut theirs = vec![0u8; taglen];
            let mut state = tiny_keccak::Kmac::v128(key, custom);
            state.update(&data);
            state.finalize(&mut theirs);
            assert_eq!(ours, theirs, "kmac128 len {len} tag {taglen}");

            let mut ours = vec![0u8; taglen];
            pqkit::Kmac256::compute(key, custom, &data, &mut ours);
            let mut theirs = vec![0u8; taglen];
            let mut state = tiny_keccak::Kmac::v256(key, custom);
            state.update(&data);
            state.finalize(&mut theirs);
            assert_eq!(ours, theirs, "kmac256 len {len} tag {taglen}");
        }
    }
}
