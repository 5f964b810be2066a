//! Node naming.
//!
//! Node names double as lookup keys in value tables and as task names in
//! compiled workflows, so they are restricted to lowercase ASCII letters,
//! digits and `-`.

use anyhow::anyhow;

use crate::error::Result;

/// Normalize a name to the node character set.
///
/// `_` and any other character outside `[a-z0-9-]` become `-`. Leading and
/// trailing dashes are trimmed. An empty result becomes `node`.
pub fn normalize(name: &str) -> String {
    let mapped: String = name
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();

    let trimmed = mapped.trim_matches('-');
    if trimmed.is_empty() {
        "node".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Random lowercase hex string of `len` characters.
pub fn random_suffix(len: usize) -> Result<String> {
    let mut bytes = vec![0u8; len.div_ceil(2)];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| anyhow!("Failed to generate random bytes: {}", e))?;
    let mut suffix = hex::encode(bytes);
    suffix.truncate(len);
    Ok(suffix)
}

/// Normalized `base` followed by `-` and a random suffix.
///
/// With a suffix length of zero the normalized base is returned unchanged.
pub fn generate(base: &str, suffix_len: usize) -> Result<String> {
    let base = normalize(base);
    if suffix_len == 0 {
        return Ok(base);
    }
    Ok(format!("{}-{}", base, random_suffix(suffix_len)?))
}
