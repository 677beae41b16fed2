use regex::Regex;
use std::sync::LazyLock;

use super::Version;
use crate::error::{Error, Result};

static RESTRICTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\[(])\s*([^,\[\]()]*?)\s*(?:(,)\s*([^,\[\]()]*?)\s*)?([\])])$")
        .expect("restriction pattern is valid")
});

static GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\[(][^\[\]()]*[\])]").expect("group pattern is valid"));

/// A constraint on plugin versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRange {
    /// `*` or empty: any version
    Any,
    /// A bare version, matched by version equality
    Exact(Version),
    /// One or more bracketed restrictions, matched if any contains the version
    Restrictions(Vec<Restriction>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: Version,
    pub inclusive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restriction {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

impl Restriction {
    pub fn contains(&self, version: &Version) -> bool {
        let above_lower = match &self.lower {
            Some(bound) if bound.inclusive => version >= &bound.version,
            Some(bound) => version > &bound.version,
            None => true,
        };
        let below_upper = match &self.upper {
            Some(bound) if bound.inclusive => version <= &bound.version,
            Some(bound) => version < &bound.version,
            None => true,
        };
        above_lower && below_upper
    }
}

impl VersionRange {
    /// Parse a Maven-style version range
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() || text == "*" {
            return Ok(VersionRange::Any);
        }

        if !text.contains(['[', ']', '(', ')']) {
            if text.contains(',') {
                return Err(Error::MalformedRule(format!(
                    "Version range '{text}' has a comma outside brackets"
                )));
            }
            return Ok(VersionRange::Exact(Version::parse(text)));
        }

        let mut restrictions = Vec::new();
        let mut last_end = 0;
        for group in GROUP_RE.find_iter(text) {
            let separator = &text[last_end..group.start()];
            let expected_separator = if restrictions.is_empty() { "" } else { "," };
            if separator.trim() != expected_separator {
                return Err(Error::MalformedRule(format!(
                    "Unexpected '{separator}' in version range '{text}'"
                )));
            }
            restrictions.push(parse_restriction(group.as_str(), text)?);
            last_end = group.end();
        }

        if restrictions.is_empty() || !text[last_end..].trim().is_empty() {
            return Err(Error::MalformedRule(format!(
                "Unbalanced brackets in version range '{text}'"
            )));
        }

        Ok(VersionRange::Restrictions(restrictions))
    }

    pub fn contains(&self, version: &str) -> bool {
        let version = Version::parse(version);
        match self {
            VersionRange::Any => true,
            VersionRange::Exact(expected) => &version == expected,
            VersionRange::Restrictions(restrictions) => {
                restrictions.iter().any(|r| r.contains(&version))
            }
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, VersionRange::Any)
    }
}

fn parse_restriction(group: &str, text: &str) -> Result<Restriction> {
    let captures = RESTRICTION_RE.captures(group).ok_or_else(|| {
        Error::MalformedRule(format!("Invalid restriction '{group}' in version range '{text}'"))
    })?;

    let lower_inclusive = &captures[1] == "[";
    let upper_inclusive = &captures[5] == "]";
    let lower = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
    let has_comma = captures.get(3).is_some();

    if !has_comma {
        // `[1.0]` pins a single version
        if !lower_inclusive || !upper_inclusive || lower.is_empty() {
            return Err(Error::MalformedRule(format!(
                "Single version restriction '{group}' must use inclusive brackets"
            )));
        }
        let bound = Bound {
            version: Version::parse(lower),
            inclusive: true,
        };
        return Ok(Restriction {
            lower: Some(bound.clone()),
            upper: Some(bound),
        });
    }

    let upper = captures.get(4).map(|m| m.as_str()).unwrap_or_default();
    let lower = (!lower.is_empty()).then(|| Bound {
        version: Version::parse(lower),
        inclusive: lower_inclusive,
    });
    let upper = (!upper.is_empty()).then(|| Bound {
        version: Version::parse(upper),
        inclusive: upper_inclusive,
    });

    if let (Some(lo), Some(hi)) = (&lower, &upper) {
        let empty = lo.version > hi.version
            || (lo.version == hi.version && !(lo.inclusive && hi.inclusive));
        if empty {
            return Err(Error::MalformedRule(format!(
                "Restriction '{group}' in version range '{text}' is empty"
            )));
        }
    }

    Ok(Restriction { lower, upper })
}
