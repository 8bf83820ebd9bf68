use pqkit::drbg::NistCtrDrbg;
use pqkit::mldsa::params::{Dsa44Params, Dsa65Params, Dsa87Params, DsaParams};
use pqkit::mldsa::MlDsa;
use pqkit::traits::SignatureScheme;
use rand::rngs::OsRng;

fn run_dsa_test<P: DsaParams>() {
    let dsa = MlDsa::<P>::new();

    let (pk, sk) = dsa.key_gen(&mut OsRng);
    assert_eq!(pk.0.len(), P::PUBLICKEY_BYTES);
    assert_eq!(sk.0.len(), P::SECRETKEY_BYTES);

    let message = b"interop message for the signature suite";
    let signature = dsa.sign(message, &sk, &mut OsRng).unwrap();
    assert_eq!(signature.len(), P::SIGNATURE_BYTES);
    assert!(dsa.verify(message, &signature, &pk), "{}", P::NAME);
}

#[test]
fn test_ml_dsa_44() {
    run_dsa_test::<Dsa44Params>();
}

#[test]
fn test_ml_dsa_65() {
    run_dsa_test::<Dsa65Params>();
}

#[test]
fn test_ml_dsa_87() {
    run_dsa_test::<Dsa87Params>();
}

/// A 33-byte message signed under a DRBG-driven keypair round-trips, and
/// the whole transcript is reproducible from the seed.
#[test]
fn test_drbg_signature_transcript() {
    let seed: [u8; 48] = hex::decode(
        "061550234d158c5ec95595fe04ef7a25767f2e24cc2bc479d09d86dc9abcfde7\
         056a8c266f9ef97ed08541dbd2e1ffa1",
    )
    .unwrap()
    .try_into()
    .unwrap();

    let dsa = MlDsa::<Dsa65Params>::new();
    let message = [0xB1u8; 33];

    let mut rng1 = NistCtrDrbg::new(&seed, &[]).unwrap();
    let (pk1, sk1) = dsa.key_gen(&mut rng1);
    let sig1 = dsa.sign(&message, &sk1, &mut rng1).unwrap();

    let mut rng2 = NistCtrDrbg::new(&seed, &[]).unwrap();
    let (pk2, sk2) = dsa.key_gen(&mut rng2);
    let sig2 = dsa.sign(&message, &sk2, &mut rng2).unwrap();

    assert_eq!(pk1.0, pk2.0);
    assert_eq!(sk1.0, sk2.0);
    assert_eq!(sig1, sig2);
    assert!(dsa.verify(&message, &sig1, &pk1));
}

/// Any single flipped bit in the signature must fail verification.
#[test]
fn test_bit_flips_reject() {
    let dsa = MlDsa::<Dsa44Params>::new();
    let (pk, sk) = dsa.key_gen(&mut OsRng);
    let message = b"bit flip sweep";
    let signature = dsa.sign(message, &sk, &mut OsRng).unwrap();

    // Sweep a spread of positions covering c-tilde, z and the hints.
    let step = signature.len() / 40;
    for i in (0..signature.len()).step_by(step.max(1)) {
        for bit in [0u8, 4, 7] {
            let mut bad = signature.clone();
            bad[i] ^= 1 << bit;
            assert!(
                !dsa.verify(message, &bad, &pk),
                "flip at byte {i} bit {bit} must reject"
            );
        }
    }
}
