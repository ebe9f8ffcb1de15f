//! Cache key computation
//!
//! Keys are BLAKE3 digests over length-prefixed fields, so no choice of
//! path, content or finding text can make two different inputs collide by
//! concatenation. Each key kind hashes under its own derive-key context.

use crate::types::{Fingerprint, Hash};

const ANALYSIS_CONTEXT: &str = "repo-audit 2024 analysis-key v1";
const REWRITE_CONTEXT: &str = "repo-audit 2024 rewrite-key v1";

fn update_field(hasher: &mut blake3::Hasher, field: &[u8]) {
    hasher.update(&(field.len() as u64).to_le_bytes());
    hasher.update(field);
}

fn digest_analysis(path: &str, content: &str) -> Hash {
    let mut hasher = blake3::Hasher::new_derive_key(ANALYSIS_CONTEXT);
    update_field(&mut hasher, path.as_bytes());
    update_field(&mut hasher, content.as_bytes());
    *hasher.finalize().as_bytes()
}

fn digest_rewrite<S: AsRef<str>>(path: &str, content: &str, findings: &[S]) -> Hash {
    let mut hasher = blake3::Hasher::new_derive_key(REWRITE_CONTEXT);
    update_field(&mut hasher, path.as_bytes());
    update_field(&mut hasher, content.as_bytes());
    hasher.update(&(findings.len() as u64).to_le_bytes());
    for finding in findings {
        update_field(&mut hasher, finding.as_ref().as_bytes());
    }
    *hasher.finalize().as_bytes()
}

/// Fingerprint for the findings of one file revision
pub fn analysis_key(path: &str, content: &str) -> Fingerprint {
    format!("analysis:{}", hex::encode(digest_analysis(path, content)))
}

/// Fingerprint for a rewrite of one file revision driven by `findings`.
///
/// Findings are an ordered sequence: the same findings in another order
/// produce another key.
pub fn rewrite_key<S: AsRef<str>>(path: &str, content: &str, findings: &[S]) -> Fingerprint {
    format!(
        "rewrite:{}",
        hex::encode(digest_rewrite(path, content, findings))
    )
}
