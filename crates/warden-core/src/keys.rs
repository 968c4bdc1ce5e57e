//! Identity index paths
//!
//! The remote database addresses nodes by `/`-separated path segments and
//! rejects `.`, `#`, `$`, `[`, `]` and `/` inside a segment.

use crate::types::IndexKey;

/// Characters the remote database refuses inside a key segment
const FORBIDDEN: [char; 6] = ['.', '#', '$', '[', ']', '/'];

/// Replace forbidden characters with `_` so the value is a single segment.
///
/// `203.0.113.9` becomes `203_0_113_9`.
pub fn sanitize_segment(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| {
            if FORBIDDEN.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Path of the ban record for a key
pub fn ban_path(key: IndexKey, value: &str) -> String {
    let segment = sanitize_segment(value);
    match key {
        IndexKey::Username => format!("bans/users/{segment}"),
        IndexKey::Origin => format!("bans/ips/{segment}"),
        IndexKey::Fingerprint => format!("bans/fingerprints/{segment}"),
    }
}

/// Path of the username set observed under an origin or fingerprint.
///
/// Usernames are not indexed this way; `None` for [`IndexKey::Username`].
pub fn identity_path(key: IndexKey, value: &str) -> Option<String> {
    let segment = sanitize_segment(value);
    match key {
        IndexKey::Username => None,
        IndexKey::Origin => Some(format!("identity/ips/{segment}")),
        IndexKey::Fingerprint => Some(format!("identity/fingerprints/{segment}")),
    }
}

/// Path of a user's profile record
pub fn profile_path(username: &str) -> String {
    format!("users/{}", sanitize_segment(username))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn paths_match_index_layout() {
        assert_eq!(ban_path(IndexKey::Username, "alice"), "bans/users/alice");
        assert_eq!(ban_path(IndexKey::Origin, "203.0.113.9"), "bans/ips/203_0_113_9");
        assert_eq!(ban_path(IndexKey::Fingerprint, "k3x9"), "bans/fingerprints/k3x9");
        assert_eq!(
            identity_path(IndexKey::Origin, "203.0.113.9").as_deref(),
            Some("identity/ips/203_0_113_9")
        );
        assert_eq!(identity_path(IndexKey::Username, "alice"), None);
        assert_eq!(profile_path("bob"), "users/bob");
    }

    #[test]
    fn ipv6_colons_survive() {
        assert_eq!(sanitize_segment("2001:db8::1"), "2001:db8::1");
    }

    proptest! {
        #[test]
        fn sanitized_segment_has_no_forbidden_chars(raw in ".{0,40}") {
            let out = sanitize_segment(&raw);
            prop_assert!(!out.chars().any(|c| FORBIDDEN.contains(&c)));
        }
    }
}
