use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use serde::Serialize;
use starboard_common::version_from_image_ref;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageVersion<'a> {
    image_ref: &'a str,
    version: &'a str,
}

/// Print the version token of an image reference
pub fn handle_version(image_ref: &str, format: OutputFormat) -> Result<()> {
    let version = version_from_image_ref(image_ref)
        .with_context(|| format!("Cannot derive a version from '{}'", image_ref))?;

    output::print_single(
        &version,
        &ImageVersion {
            image_ref,
            version: &version,
        },
        format,
    )
}
