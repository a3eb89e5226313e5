//! Golden test vector validation
//!
//! The vectors were produced by an independent PBKDF2-HMAC-SHA512 +
//! AES-256-ECB implementation with fixed IVs and salts.

use cedcrypt::{CipherEngine, Envelope};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GoldenVector {
    comment: String,
    passphrase: String,
    plaintext: String,
    iv: String,
    salt: String,
    envelope: String,
}

struct Decoded {
    passphrase: Vec<u8>,
    plaintext: Vec<u8>,
    iv: Vec<u8>,
    salt: Vec<u8>,
    envelope: Vec<u8>,
}

impl GoldenVector {
    fn decode(&self) -> Result<Decoded, hex::FromHexError> {
        Ok(Decoded {
            passphrase: hex::decode(&self.passphrase)?,
            plaintext: hex::decode(&self.plaintext)?,
            iv: hex::decode(&self.iv)?,
            salt: hex::decode(&self.salt)?,
            envelope: hex::decode(&self.envelope)?,
        })
    }
}

fn load_golden_vectors() -> Vec<GoldenVector> {
    let json_data = include_str!("../testdata/golden-vectors.json");
    serde_json::from_str(json_data).expect("failed to parse golden vectors")
}

/// Run golden vector tests on specified indices
///
/// If `indices` is None, tests all vectors. Otherwise tests only
/// the specified indices.
fn run_golden_vector_tests(indices: Option<&[usize]>) {
    let vectors = load_golden_vectors();
    let engine = CipherEngine::new();

    let selected: Vec<(usize, &GoldenVector)> = match indices {
        Some(idx) => idx
            .iter()
            .map(|&i| {
                assert!(
                    i < vectors.len(),
                    "Index {} is out of bounds (only {} vectors available)",
                    i,
                    vectors.len()
                );
                (i, &vectors[i])
            })
            .collect(),
        None => vectors.iter().enumerate().collect(),
    };

    println!("Testing {} golden vectors", selected.len());

    let mut passed = 0;
    let mut failed = 0;

    for (i, vector) in selected {
        let decoded = match vector.decode() {
            Ok(decoded) => decoded,
            Err(e) => {
                eprintln!("Vector {}: FAILED to decode hex - {}", i, e);
                eprintln!("  Comment: {}", vector.comment);
                failed += 1;
                continue;
            }
        };

        let envelope = match engine.encrypt_deterministic(
            &decoded.plaintext,
            &decoded.passphrase,
            &decoded.iv,
            &decoded.salt,
        ) {
            Ok(envelope) => envelope,
            Err(e) => {
                eprintln!("Vector {}: FAILED to encrypt - {}", i, e);
                eprintln!("  Comment: {}", vector.comment);
                failed += 1;
                continue;
            }
        };

        if envelope != decoded.envelope {
            eprintln!("Vector {}: FAILED - envelope mismatch", i);
            eprintln!("  Comment: {}", vector.comment);
            eprintln!("  Expected: {}", vector.envelope);
            eprintln!("  Actual:   {}", hex::encode(&envelope));
            failed += 1;
            continue;
        }

        let parsed = Envelope::parse(&decoded.envelope, engine.config())
            .expect("golden envelope should parse");
        if parsed.iv() != decoded.iv.as_slice() || parsed.salt() != decoded.salt.as_slice() {
            eprintln!("Vector {}: FAILED - trailer fields misparsed", i);
            eprintln!("  Comment: {}", vector.comment);
            failed += 1;
            continue;
        }

        let decrypted = match engine.decrypt(&decoded.envelope, &decoded.passphrase) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Vector {}: FAILED to decrypt - {}", i, e);
                eprintln!("  Comment: {}", vector.comment);
                failed += 1;
                continue;
            }
        };

        if decrypted != decoded.plaintext {
            eprintln!("Vector {}: FAILED - plaintext mismatch", i);
            eprintln!("  Comment: {}", vector.comment);
            eprintln!("  Expected length: {}", decoded.plaintext.len());
            eprintln!("  Actual length: {}", decrypted.len());
            failed += 1;
            continue;
        }

        passed += 1;
    }

    let total = passed + failed;
    println!(
        "Results: {} passed, {} failed out of {} total",
        passed, failed, total
    );

    assert_eq!(failed, 0, "Some golden vectors failed validation");
    assert!(passed > 0, "No golden vectors were tested");
}

/// Test a small subset of diverse golden vectors for regular testing
/// (each vector costs two 500,000-round key derivations).
#[test]
fn test_golden_vectors_subset() {
    // Empty plaintext, single padded block, non-UTF-8 passphrase
    let test_indices = [0, 1, 4];
    run_golden_vector_tests(Some(&test_indices));
}

/// Test all golden vectors (run with --ignored flag)
///
/// Run with: cargo test test_all_golden_vectors -- --ignored
#[test]
#[ignore]
fn test_all_golden_vectors() {
    run_golden_vector_tests(None);
}

#[test]
fn test_vectors_are_well_formed() {
    let engine = CipherEngine::new();
    let overhead = engine.block_len() + engine.config().salt_len();

    for vector in load_golden_vectors() {
        let decoded = vector.decode().expect("vector hex should decode");
        assert_eq!(decoded.plaintext.len() % engine.block_len(), 0);
        assert_eq!(decoded.envelope.len(), decoded.plaintext.len() + overhead);
    }
}
