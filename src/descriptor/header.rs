//! Package header reader
//!
//! Plugin and theme files declare their metadata in a comment block at the
//! top of the file:
//!
//! ```text
//! /**
//!  * Plugin Name: My Plugin
//!  * Version:     2.0.0
//!  * Update URI:  https://github.com/owner/my-plugin
//!  */
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::descriptor::traits::{DescriptorError, DescriptorSource};
use crate::descriptor::types::{LocalDescriptor, PackageKind};

/// Only the beginning of the file is scanned for headers
const HEADER_READ_LIMIT: u64 = 8 * 1024;

const THEME_STYLESHEET: &str = "style.css";
const THEME_FUNCTIONS: &str = "functions.php";

/// Descriptor source that reads `Version` and `Update URI` from file headers
pub struct HeaderDescriptorSource {
    /// Regex for the `Version:` header line
    version_re: Regex,
    /// Regex for the `Update URI:` header line
    update_uri_re: Regex,
    /// Trailing comment terminators to strip from a header value
    cleanup_re: Regex,
}

impl HeaderDescriptorSource {
    pub fn new() -> Self {
        Self {
            version_re: header_regex("Version"),
            update_uri_re: header_regex("Update URI"),
            cleanup_re: Regex::new(r"\s*(?:\*/|\?>).*").unwrap(),
        }
    }

    /// Extract a header value from file contents
    fn header_value(&self, re: &Regex, content: &str) -> Option<String> {
        let raw = re.captures(content)?.get(1)?.as_str();
        let value = self.cleanup_re.replace(raw, "");
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    fn read_head(path: &Path) -> Result<String, DescriptorError> {
        let io_err = |source| DescriptorError::Io {
            path: path.display().to_string(),
            source,
        };

        let file = File::open(path).map_err(io_err)?;
        let mut buf = Vec::new();
        file.take(HEADER_READ_LIMIT)
            .read_to_end(&mut buf)
            .map_err(io_err)?;

        Ok(String::from_utf8_lossy(&buf).replace('\r', "\n"))
    }
}

impl Default for HeaderDescriptorSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorSource for HeaderDescriptorSource {
    fn read(&self, path: &Path) -> Result<LocalDescriptor, DescriptorError> {
        let dir = path
            .parent()
            .ok_or_else(|| DescriptorError::NoSlug(path.display().to_string()))?;
        let slug = dir
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| DescriptorError::NoSlug(path.display().to_string()))?
            .to_string();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();

        // Themes keep their headers in style.css, even when loaded via functions.php
        let (header_path, kind) = match file_name {
            THEME_FUNCTIONS | THEME_STYLESHEET => (dir.join(THEME_STYLESHEET), PackageKind::Theme),
            _ => (path.to_path_buf(), PackageKind::Plugin),
        };
        let header_file = header_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(file_name);
        let package_file = format!("{}/{}", slug, header_file);

        let content = Self::read_head(&header_path)?;

        let local_version = self
            .header_value(&self.version_re, &content)
            .ok_or_else(|| DescriptorError::MissingVersion(header_path.display().to_string()))?;
        let update_source_url = self.header_value(&self.update_uri_re, &content);

        debug!(
            "Read {} {} version {} (update source: {:?})",
            kind, package_file, local_version, update_source_url
        );

        Ok(LocalDescriptor {
            package_file,
            slug,
            local_version,
            update_source_url,
            kind,
        })
    }
}

fn header_regex(field: &str) -> Regex {
    Regex::new(&format!(
        r"(?mi)^(?:[ \t]*<\?php)?[ \t/*#@]*{}:(.*)$",
        regex::escape(field)
    ))
    .unwrap()
}
