//! Generation of unique identifiers for derived instances.
//!
//! Identifiers are created under the `2.25` root,
//! followed by the decimal form of a 128-bit value
//! built from the current time, the process identifier,
//! a process wide counter and a randomly keyed hash.
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use dicom_codec_core::uids::UUID_ROOT;

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new globally unique UID.
///
/// The result has at most 64 characters, as required for the UI value representation.
///
/// # Example
///
/// ```
/// # use dicom_codec::uid::generate_uid;
/// let uid = generate_uid();
/// assert!(uid.starts_with("2.25."));
/// assert!(uid.len() <= 64);
/// ```
pub fn generate_uid() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut hasher = RandomState::new().build_hasher();
    nanos.hash(&mut hasher);
    std::process::id().hash(&mut hasher);
    count.hash(&mut hasher);
    let noise = hasher.finish();

    // time and counter in the upper half, noise in the lower half;
    // the top bit is cleared so that the number stays within 39 digits
    let high = (nanos as u64 ^ count.rotate_left(48)) & 0x7FFF_FFFF_FFFF_FFFF;
    let value = (u128::from(high) << 64) | u128::from(noise);
    format!("{}.{}", UUID_ROOT, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn uids_are_valid_and_distinct() {
        let uids: HashSet<_> = (0..1000).map(|_| generate_uid()).collect();
        assert_eq!(uids.len(), 1000);
        for uid in &uids {
            assert!(uid.len() <= 64);
            let suffix = uid.strip_prefix("2.25.").unwrap();
            assert!(suffix.bytes().all(|b| b.is_ascii_digit()));
            assert!(!suffix.starts_with('0') || suffix == "0");
        }
    }
}
