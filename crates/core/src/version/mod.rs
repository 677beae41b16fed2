//! Plugin version ordering and version range constraints

pub mod range;

pub use range::VersionRange;

use std::cmp::Ordering;
use std::fmt;

/// A comparable plugin version
///
/// Versions are split into numeric and qualifier segments on `.`, `-`, `_`
/// and digit/letter transitions. Trailing zeros and release qualifiers are
/// dropped, so `1.0`, `1.0.0` and `1-final` compare equal to `1`.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Number(u64),
    Qualifier(String),
}

impl Version {
    pub fn parse(raw: &str) -> Self {
        let mut items = tokenize(raw.trim());
        while let Some(last) = items.last() {
            let trailing = match last {
                Item::Number(n) => *n == 0,
                Item::Qualifier(q) => qualifier_rank(q) == RELEASE_RANK,
            };
            if !trailing {
                break;
            }
            items.pop();
        }
        Self {
            raw: raw.trim().to_string(),
            items,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn tokenize(raw: &str) -> Vec<Item> {
    let mut items = Vec::new();
    for segment in raw.split(['.', '-', '_']) {
        let mut current = String::new();
        let mut current_is_digit = None;
        for c in segment.chars() {
            let is_digit = c.is_ascii_digit();
            if current_is_digit.is_some_and(|d| d != is_digit) {
                items.push(to_item(&current));
                current.clear();
            }
            current.push(c);
            current_is_digit = Some(is_digit);
        }
        if !current.is_empty() {
            items.push(to_item(&current));
        }
    }
    items
}

fn to_item(token: &str) -> Item {
    match token.parse::<u64>() {
        Ok(n) => Item::Number(n),
        Err(_) => Item::Qualifier(token.to_ascii_lowercase()),
    }
}

const RELEASE_RANK: u8 = 5;

fn qualifier_rank(qualifier: &str) -> u8 {
    match qualifier {
        "alpha" | "a" => 0,
        "beta" | "b" => 1,
        "milestone" | "m" => 2,
        "rc" | "cr" => 3,
        "snapshot" => 4,
        "" | "ga" | "final" | "release" => RELEASE_RANK,
        "sp" => 6,
        _ => 7,
    }
}

fn compare_items(left: &Item, right: &Item) -> Ordering {
    match (left, right) {
        (Item::Number(a), Item::Number(b)) => a.cmp(b),
        (Item::Number(_), Item::Qualifier(_)) => Ordering::Greater,
        (Item::Qualifier(_), Item::Number(_)) => Ordering::Less,
        (Item::Qualifier(a), Item::Qualifier(b)) => qualifier_rank(a)
            .cmp(&qualifier_rank(b))
            .then_with(|| a.cmp(b)),
    }
}

/// Compare an item against the implicit padding of a shorter version
fn compare_to_padding(item: &Item) -> Ordering {
    match item {
        Item::Number(n) => n.cmp(&0),
        Item::Qualifier(q) => qualifier_rank(q).cmp(&RELEASE_RANK),
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.items.len().max(other.items.len());
        for i in 0..len {
            let ordering = match (self.items.get(i), other.items.get(i)) {
                (Some(a), Some(b)) => compare_items(a, b),
                (Some(a), None) => compare_to_padding(a),
                (None, Some(b)) => compare_to_padding(b).reverse(),
                (None, None) => Ordering::Equal,
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s)
    }

    #[test]
    fn test_trailing_zeros_are_equal() {
        assert_eq!(v("1.0"), v("1"));
        assert_eq!(v("1.0.0"), v("1"));
        assert_eq!(v("1-final"), v("1.0"));
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(v("1.2") < v("1.10"));
        assert!(v("2.0") > v("1.9.9"));
        assert!(v("1.0.1") > v("1.0"));
    }

    #[test]
    fn test_qualifiers_sort_before_release() {
        assert!(v("1.0-SNAPSHOT") < v("1.0"));
        assert!(v("1.0-alpha-1") < v("1.0-beta-1"));
        assert!(v("1.0-rc1") < v("1.0"));
        assert!(v("1.0-SNAPSHOT") > v("1.0-rc1"));
        assert!(v("1.0-sp1") > v("1.0"));
    }
}
