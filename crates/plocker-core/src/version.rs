//! Sentinel versions and the host's version ordering.
//!
//! The host decides whether an update is available by comparing the
//! installed manifest version against the published one, segment by segment.
//! Prefixing the installed version with a large epoch makes the installed copy
//! compare as newer than any realistic release.

use std::cmp::Ordering;

/// Epoch prefixed to the captured version while a plugin is locked.
pub const SENTINEL_EPOCH: &str = "9999.";

/// Sentinel written by the earliest settings schema, which did not record the
/// original version.
pub const LEGACY_SENTINEL_VERSION: &str = "9999.0.0";

/// Builds the locked version for a captured original version.
pub fn sentinel_version(original: &str) -> String {
    format!("{SENTINEL_EPOCH}{original}")
}

/// Returns true when `version` carries the sentinel epoch.
pub fn is_sentinel(version: &str) -> bool {
    version.starts_with(SENTINEL_EPOCH)
}

/// Compares two dotted versions the way the host's update check does.
///
/// Anything from the first `-` or `+` on (a pre-release or build suffix) is
/// ignored. Each remaining `.`-separated segment contributes the value of its
/// leading digits; a segment without leading digits, or a missing trailing
/// segment, counts as zero. So `1.2` equals `1.2.0`, `2.0.0-beta.1` equals
/// `2.0.0`, and `1.10.0` is newer than `1.9.9`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left: Vec<u64> = release_part(a).split('.').map(segment_value).collect();
    let right: Vec<u64> = release_part(b).split('.').map(segment_value).collect();
    let len = left.len().max(right.len());
    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

fn release_part(version: &str) -> &str {
    version.trim().split(['-', '+']).next().unwrap_or_default()
}

fn segment_value(segment: &str) -> u64 {
    segment
        .chars()
        .map_while(|c| c.to_digit(10))
        .fold(0u64, |acc, d| acc.saturating_mul(10).saturating_add(u64::from(d)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sentinel_prefixes_the_original() {
        assert_eq!(sentinel_version("1.2.3"), "9999.1.2.3");
        assert!(is_sentinel("9999.1.2.3"));
        assert!(is_sentinel(LEGACY_SENTINEL_VERSION));
        assert!(!is_sentinel("1.2.3"));
        assert!(!is_sentinel("99990.1"));
    }

    #[test]
    fn compares_numerically_per_segment() {
        assert_eq!(compare_versions("1.10.0", "1.9.9"), Ordering::Greater);
        assert_eq!(compare_versions("1.2", "1.2.0"), Ordering::Equal);
        assert_eq!(compare_versions("0.9.1", "0.10.0"), Ordering::Less);
        assert_eq!(compare_versions("2.0.0-beta.1", "2.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("v1", "0"), Ordering::Equal);
    }

    #[test]
    fn prerelease_and_build_suffixes_are_ignored() {
        assert_eq!(compare_versions("2.0.0-beta.7", "2.0.0-beta.1"), Ordering::Equal);
        assert_eq!(compare_versions("1.0.0+build.7", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.0.1-rc.1", "1.0.0"), Ordering::Greater);
        assert_eq!(compare_versions("9999.1.2.3-beta", "10.0.0"), Ordering::Greater);
    }

    #[test]
    fn oversized_segments_saturate_instead_of_wrapping() {
        assert_eq!(
            compare_versions("99999999999999999999999.0", "1.0"),
            Ordering::Greater
        );
    }

    #[test]
    fn legacy_sentinel_outranks_releases() {
        assert_eq!(
            compare_versions(LEGACY_SENTINEL_VERSION, "3.14.1"),
            Ordering::Greater
        );
    }

    proptest! {
        #[test]
        fn sentinel_outranks_any_realistic_release(
            major in 0u64..9999,
            minor in 0u64..1000,
            patch in 0u64..1000,
            pub_major in 0u64..9999,
            pub_minor in 0u64..100_000,
            pub_patch in 0u64..100_000,
        ) {
            let installed = format!("{major}.{minor}.{patch}");
            let published = format!("{pub_major}.{pub_minor}.{pub_patch}");
            prop_assert_eq!(
                compare_versions(&sentinel_version(&installed), &published),
                Ordering::Greater
            );
        }

        #[test]
        fn comparison_is_antisymmetric(
            a in "[0-9]{1,4}(\\.[0-9]{1,4}){0,3}",
            b in "[0-9]{1,4}(\\.[0-9]{1,4}){0,3}",
        ) {
            prop_assert_eq!(compare_versions(&a, &b), compare_versions(&b, &a).reverse());
        }
    }
}
