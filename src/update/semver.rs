use std::cmp::Ordering;

use semver::Version;

/// Strip a leading `v`/`V` from a tag so it becomes a comparable version token.
///
/// Examples:
/// - "v2.1.0" -> "2.1.0"
/// - "2.1.0" -> "2.1.0"
pub fn normalize_version(version: &str) -> &str {
    let trimmed = version.trim();
    trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed)
}

/// Parse a version string into a semver::Version, normalizing partial versions.
///
/// Handles partial versions like "1" or "1.2" by padding with zeros,
/// keeping any pre-release or build suffix.
/// Does NOT strip 'v' prefix (use `normalize_version` first if needed).
///
/// Examples:
/// - "1" -> Version(1, 0, 0)
/// - "1.2" -> Version(1, 2, 0)
/// - "1.2-beta.1" -> Version(1, 2, 0, pre: beta.1)
pub fn parse_version(version: &str) -> Option<Version> {
    let suffix_idx = version.find(['-', '+']).unwrap_or(version.len());
    let (core, suffix) = version.split_at(suffix_idx);
    let parts: Vec<&str> = core.split('.').collect();
    let normalized = match parts.len() {
        1 => format!("{}.0.0{}", parts[0], suffix),
        2 => format!("{}.{}.0{}", parts[0], parts[1], suffix),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// Compare two version strings.
///
/// Both sides are normalized with [`normalize_version`]. When both parse as
/// semantic versions, semver precedence decides and build metadata is
/// ignored. Otherwise the versions are
/// compared component by component: numeric components numerically, numeric
/// before alphanumeric, alphanumeric lexicographically, and missing trailing
/// components count as `0`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a = normalize_version(a);
    let b = normalize_version(b);

    match (parse_version(a), parse_version(b)) {
        (Some(a), Some(b)) => a.cmp_precedence(&b),
        _ => compare_components(a, b),
    }
}

/// Returns true if `remote` is strictly newer than `local`
pub fn is_newer(remote: &str, local: &str) -> bool {
    compare_versions(remote, local) == Ordering::Greater
}

fn compare_components(a: &str, b: &str) -> Ordering {
    let split = |v: &str| -> Vec<String> {
        v.split(['.', '-', '+', '_'])
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    };
    let a_parts = split(a);
    let b_parts = split(b);
    let len = a_parts.len().max(b_parts.len());

    for i in 0..len {
        let left = a_parts.get(i).map(String::as_str).unwrap_or("0");
        let right = b_parts.get(i).map(String::as_str).unwrap_or("0");

        let ordering = match (left.parse::<u64>(), right.parse::<u64>()) {
            (Ok(l), Ok(r)) => l.cmp(&r),
            (Ok(_), Err(_)) => Ordering::Greater,
            (Err(_), Ok(_)) => Ordering::Less,
            (Err(_), Err(_)) => left.cmp(right),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}
