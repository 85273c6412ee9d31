//! Configuration key names
//!
//! Every key is `<component>.<property>`. Readers and writers both go through
//! these constants.

pub const TRIVY_IMAGE_REF: &str = "trivy.imageRef";
pub const TRIVY_MODE: &str = "trivy.mode";
pub const TRIVY_SERVER_URL: &str = "trivy.serverURL";
pub const TRIVY_SEVERITY: &str = "trivy.severity";
pub const TRIVY_HTTP_PROXY: &str = "trivy.httpProxy";
pub const TRIVY_HTTPS_PROXY: &str = "trivy.httpsProxy";
pub const TRIVY_NO_PROXY: &str = "trivy.noProxy";

/// Stored in the secret resource
pub const TRIVY_GITHUB_TOKEN: &str = "trivy.githubToken";
/// Stored in the secret resource
pub const TRIVY_SERVER_TOKEN: &str = "trivy.serverToken";

pub const KUBE_BENCH_IMAGE_REF: &str = "kube-bench.imageRef";

pub const KUBE_HUNTER_IMAGE_REF: &str = "kube-hunter.imageRef";
pub const KUBE_HUNTER_QUICK: &str = "kube-hunter.quick";

pub const POLARIS_IMAGE_REF: &str = "polaris.imageRef";
pub const POLARIS_CONFIG_YAML: &str = "polaris.config.yaml";

/// Keys whose values are sensitive and belong in the secret resource
pub const SECRET_KEYS: &[&str] = &[TRIVY_GITHUB_TOKEN, TRIVY_SERVER_TOKEN];

/// Whether a key is conventionally kept in the secret resource
pub fn is_secret_key(key: &str) -> bool {
    SECRET_KEYS.contains(&key)
}
