//! Container image reference parsing
//!
//! Only the part needed to label scan results with a scanner version: the
//! digest, the tag, or `latest` when neither is given.

use crate::{Error, Result};

/// Tag assumed for references without tag or digest
pub const LATEST_TAG: &str = "latest";

/// Extract the version token from an image reference.
///
/// - `repo/image@sha256:<hex>` yields `sha256:<hex>`
/// - `repo/image:tag` yields `tag`
/// - `repo/image` yields `latest`
///
/// Only a colon in the last path segment separates a tag, so the port in
/// `registry:5000/image` is never read as one.
pub fn version_from_image_ref(reference: &str) -> Result<String> {
    let reference = reference.trim();

    if reference.is_empty() {
        return Err(invalid(reference, "reference is empty"));
    }
    if reference.chars().any(char::is_whitespace) {
        return Err(invalid(reference, "reference contains whitespace"));
    }

    if let Some((_, digest)) = reference.split_once('@') {
        if digest.is_empty() {
            return Err(invalid(reference, "digest is empty"));
        }
        return Ok(digest.to_string());
    }

    let last_segment = match reference.rfind('/') {
        Some(idx) => &reference[idx + 1..],
        None => reference,
    };
    if last_segment.is_empty() {
        return Err(invalid(reference, "image name is empty"));
    }

    match last_segment.rsplit_once(':') {
        Some((_, "")) => Err(invalid(reference, "tag is empty")),
        Some((_, tag)) => Ok(tag.to_string()),
        None => Ok(LATEST_TAG.to_string()),
    }
}

fn invalid(reference: &str, reason: &str) -> Error {
    Error::InvalidImageRef {
        reference: reference.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_from_tagged_refs() {
        let cases = [
            ("docker.io/aquasec/trivy:0.9.1", "0.9.1"),
            ("aquasec/trivy:0.9.1", "0.9.1"),
            ("aquasec/trivy:latest", "latest"),
            ("trivy:0.14.0", "0.14.0"),
            ("quay.io/fairwinds/polaris:1.2", "1.2"),
        ];

        for (reference, expected) in cases {
            assert_eq!(
                version_from_image_ref(reference).unwrap(),
                expected,
                "reference: {}",
                reference
            );
        }
    }

    #[test]
    fn test_version_from_digest_ref() {
        let digest = "sha256:5020dac24a63ef4f24452a0c63ebbfe93a5309e40f6353d1ee8221d2184ee954";
        let reference = format!("docker.io/aquasec/trivy@{}", digest);

        assert_eq!(version_from_image_ref(&reference).unwrap(), digest);
    }

    #[test]
    fn test_digest_wins_over_tag() {
        let reference = "aquasec/trivy:0.14.0@sha256:abcdef";
        assert_eq!(version_from_image_ref(reference).unwrap(), "sha256:abcdef");
    }

    #[test]
    fn test_bare_ref_is_latest() {
        assert_eq!(version_from_image_ref("aquasec/trivy").unwrap(), "latest");
        assert_eq!(version_from_image_ref("trivy").unwrap(), "latest");
    }

    #[test]
    fn test_registry_port_is_not_a_tag() {
        assert_eq!(
            version_from_image_ref("registry:5000/image").unwrap(),
            "latest"
        );
        assert_eq!(
            version_from_image_ref("registry:5000/image:tag").unwrap(),
            "tag"
        );
        assert_eq!(
            version_from_image_ref("localhost:5000/team/kube-bench:0.4.0").unwrap(),
            "0.4.0"
        );
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(version_from_image_ref("  aquasec/trivy:0.9.1\n").unwrap(), "0.9.1");
    }

    #[test]
    fn test_malformed_refs() {
        for reference in ["", "   ", "aquasec/trivy@", "aquasec/trivy:", "aquasec/", "aquasec/tri vy:1"] {
            let err = version_from_image_ref(reference).unwrap_err();
            assert!(
                matches!(err, Error::InvalidImageRef { .. }),
                "expected InvalidImageRef for {:?}, got {:?}",
                reference,
                err
            );
        }
    }
}
