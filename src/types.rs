//! Core types shared across the tree, cache and session layers.

/// Fingerprint: deterministic cache key derived from every input that
/// determines a cached result's validity
pub type Fingerprint = String;

/// ContentId: opaque identifier the source host assigns to a file's content (blob sha)
pub type ContentId = String;

/// Hash: Generic 256-bit hash value
pub type Hash = [u8; 32];
