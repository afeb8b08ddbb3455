use itertools::Itertools;
use semver::Version;

const CORE_SEGMENTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Tag { name: name.into() }
    }

    pub fn value(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<Version> {
        parse_version(&self.name)
    }

    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
    }
}

/// Parses a tag or constraint operand as a semantic version.
///
/// Accepts an optional `v` prefix and partial cores (`1`, `1.2`), which are padded with zeros.
pub fn parse_version(raw: &str) -> Option<Version> {
    parse_version_with_segments(raw).map(|(version, _)| version)
}

/// Like [`parse_version`], also returning how many core segments were written out.
pub(super) fn parse_version_with_segments(raw: &str) -> Option<(Version, usize)> {
    let raw = raw.trim();
    let raw = raw.strip_prefix('v').unwrap_or(raw);

    let (core, suffix) = match raw.find(['-', '+']) {
        Some(idx) => raw.split_at(idx),
        None => (raw, ""),
    };

    let segments: Vec<&str> = core.split('.').collect();
    if segments.len() > CORE_SEGMENTS
        || segments
            .iter()
            .any(|segment| segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let padded = segments
        .iter()
        .copied()
        .chain(std::iter::repeat("0"))
        .take(CORE_SEGMENTS)
        .join(".");

    Version::parse(&format!("{}{}", padded, suffix))
        .ok()
        .map(|version| (version, segments.len()))
}
