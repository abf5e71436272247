use semver::Version;

/// Strip the leading range operator (`^` or `~`) from a version string.
///
/// Strings without such a prefix are returned unchanged. A malformed doubled
/// operator (`"^~1.0.0"`) is stripped entirely so the result is always a fixed
/// point.
///
/// Examples:
/// - "^4.17.0" -> "4.17.0"
/// - "~1.2.3" -> "1.2.3"
/// - "1.2.3" -> "1.2.3"
pub fn normalize_version(version: &str) -> &str {
    version.trim_start_matches(['^', '~'])
}

/// Parse a three-component semantic version.
///
/// An optional leading `v` is accepted. Anything else that is not a complete
/// `MAJOR.MINOR.PATCH` version (ranges, tags, partial versions) yields `None`.
pub fn parse_version(version: &str) -> Option<Version> {
    let trimmed = version.trim();
    let stripped = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(stripped).ok()
}

/// Weighted, signed distance between two versions used for ranking updates.
///
/// The most significant differing component decides: a major change weighs
/// 10000 per step, a minor change 100 per step, a patch change 1 per step.
/// Lower components are ignored once a higher one differs, so
/// `1.2.3 -> 2.0.0` is exactly 10000 and `1.2.3 -> 1.3.0` is exactly 100.
/// Returns 0 when either side does not parse.
pub fn version_distance(current: &str, latest: &str) -> i64 {
    let (Some(current), Some(latest)) = (parse_version(current), parse_version(latest)) else {
        return 0;
    };

    let major = latest.major as i64 - current.major as i64;
    let minor = latest.minor as i64 - current.minor as i64;
    let patch = latest.patch as i64 - current.patch as i64;

    if major != 0 {
        major * 10_000
    } else if minor != 0 {
        minor * 100
    } else {
        patch
    }
}

/// Find the semantically maximum version from a list
///
/// Handles both `v`-prefixed (e.g., "v1.0.0") and non-prefixed versions.
/// Invalid versions are skipped.
pub fn find_semantic_max<'a, I>(versions: I) -> Option<String>
where
    I: IntoIterator<Item = &'a String>,
{
    versions
        .into_iter()
        .filter_map(|v| parse_version(v).map(|parsed| (v, parsed)))
        .max_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(original, _)| original.clone())
}
