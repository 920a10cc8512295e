//! Semigroup trait for accumulating validation errors
//!
//! Field validation never stops at the first bad field: every field is
//! checked and the failures are merged into one report. `Semigroup` is the
//! merge operation. It must be associative:
//!
//! ```text
//! a.combine(b).combine(c) == a.combine(b.combine(c))
//! ```
//!
//! # Examples
//!
//! ```
//! use bites_forms::Semigroup;
//! use std::collections::BTreeMap;
//!
//! let mut first = BTreeMap::new();
//! first.insert("email", "invalid");
//! let mut second = BTreeMap::new();
//! second.insert("email", "missing");
//! second.insert("phone", "invalid");
//!
//! // The first report wins for a key present in both.
//! let merged = first.combine(second);
//! assert_eq!(merged["email"], "invalid");
//! assert_eq!(merged["phone"], "invalid");
//! ```

use std::collections::BTreeMap;

/// A type that supports an associative binary operation.
///
/// `combine` takes both operands by value; clone first if you still need
/// the originals.
pub trait Semigroup: Sized {
    /// Merge `other` into `self`.
    fn combine(self, other: Self) -> Self;
}

impl<T> Semigroup for Vec<T> {
    #[inline]
    fn combine(mut self, other: Self) -> Self {
        self.extend(other);
        self
    }
}

impl Semigroup for String {
    #[inline]
    fn combine(mut self, other: Self) -> Self {
        self.push_str(&other);
        self
    }
}

// Left-biased: a key already present keeps its first value.
impl<K: Ord, V> Semigroup for BTreeMap<K, V> {
    fn combine(mut self, other: Self) -> Self {
        for (key, value) in other {
            self.entry(key).or_insert(value);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_semigroup() {
        assert_eq!(vec![1, 2].combine(vec![3]), vec![1, 2, 3]);
    }

    #[test]
    fn test_string_semigroup() {
        let joined = "Revisa ".to_string().combine("el formulario".to_string());
        assert_eq!(joined, "Revisa el formulario");
    }

    #[test]
    fn test_map_keeps_first_value() {
        let left = BTreeMap::from([("email", 1)]);
        let right = BTreeMap::from([("email", 2), ("city", 3)]);

        let merged = left.combine(right);
        assert_eq!(merged, BTreeMap::from([("email", 1), ("city", 3)]));
    }

    #[test]
    fn test_map_associativity() {
        let a = BTreeMap::from([("a", 1)]);
        let b = BTreeMap::from([("a", 2), ("b", 2)]);
        let c = BTreeMap::from([("b", 3), ("c", 3)]);

        let left = a.clone().combine(b.clone()).combine(c.clone());
        let right = a.combine(b.combine(c));
        assert_eq!(left, right);
    }

    #[test]
    fn test_vec_associativity() {
        let a = vec!["x"];
        let b = vec!["y"];
        let c = vec!["z"];

        let left = a.clone().combine(b.clone()).combine(c.clone());
        let right = a.combine(b.combine(c));
        assert_eq!(left, right);
    }
}
