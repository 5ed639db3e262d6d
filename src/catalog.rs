//! The position catalog.
//!
//! A [`Catalog`] is an ordered list of named layouts.  Each [`LayoutEntry`]
//! carries one or more candidate rectangles and the key that triggers it.
//! The built-in catalog is compiled into the binary from `positions.json`
//! and maps the numeric keypad onto a 3×3 screen grid:
//!
//! ```text
//!  KP_7 topleft     KP_8 topmiddle     KP_9 topright
//!  KP_4 left        KP_5 middle        KP_6 right
//!  KP_1 bottomleft  KP_2 bottommiddle  KP_3 bottomright
//! ```
//!
//! Candidate order matters: index `0` is the primary placement, later
//! entries are what repeated presses cycle to.

use crate::geometry::RectPercent;
use serde::Deserialize;
use std::collections::HashMap;

const BUILTIN_POSITIONS: &str = include_str!("positions.json");

/// One named layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayoutEntry {
    /// Identifier used for lookups; never shown to the user.
    pub name: String,
    /// Candidate placements in cycling order.  Never empty.
    pub candidates: Vec<RectPercent>,
    /// Key name appended to the shared modifier prefix, e.g. `"KP_7"`.
    #[serde(rename = "key")]
    pub accelerator: String,
}

/// Read-only, ordered table of [`LayoutEntry`]s with unique names.
///
/// Iteration follows insertion order, which also decides which entry wins
/// when two of them resolve to the same keycode (see
/// [`KeyBindingTable::build`](crate::bindings::KeyBindingTable::build)).
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<LayoutEntry>,
    by_name: HashMap<String, usize>,
}

/// A catalog that violates one of its invariants.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to decode catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("layout #{0} has an empty name")]
    EmptyName(usize),
    #[error("duplicate layout name {0:?}")]
    DuplicateName(String),
    #[error("layout {0:?} has no candidate rectangles")]
    NoCandidates(String),
    #[error("layout {0:?} has a non-finite candidate rectangle")]
    NonFinite(String),
    #[error("layout {0:?} has no accelerator key")]
    NoAccelerator(String),
}

impl Catalog {
    /// Build a catalog, checking that names are unique and non-empty and
    /// that every entry has a key and at least one finite candidate.
    pub fn new(entries: Vec<LayoutEntry>) -> Result<Self, CatalogError> {
        let mut by_name = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if entry.name.is_empty() {
                return Err(CatalogError::EmptyName(index));
            }
            if entry.candidates.is_empty() {
                return Err(CatalogError::NoCandidates(entry.name.clone()));
            }
            if !entry.candidates.iter().all(RectPercent::is_finite) {
                return Err(CatalogError::NonFinite(entry.name.clone()));
            }
            if entry.accelerator.trim().is_empty() {
                return Err(CatalogError::NoAccelerator(entry.name.clone()));
            }
            if by_name.insert(entry.name.clone(), index).is_some() {
                return Err(CatalogError::DuplicateName(entry.name.clone()));
            }
        }
        Ok(Self { entries, by_name })
    }

    /// Decode a catalog from its JSON form (an array of
    /// `{"name", "key", "candidates": [[x, y, w, h], …]}` objects).
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<LayoutEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    /// The compiled-in numeric keypad catalog.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_POSITIONS)
    }

    pub fn get(&self, name: &str) -> Option<&LayoutEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayoutEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, key: &str, candidates: Vec<RectPercent>) -> LayoutEntry {
        LayoutEntry {
            name: name.into(),
            candidates,
            accelerator: key.into(),
        }
    }

    fn half() -> RectPercent {
        RectPercent::new(0.0, 0.0, 50.0, 100.0)
    }

    #[test]
    fn builtin_catalog_covers_the_keypad() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), 9);
        let mut keys: Vec<&str> = catalog.iter().map(|e| e.accelerator.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["KP_1", "KP_2", "KP_3", "KP_4", "KP_5", "KP_6", "KP_7", "KP_8", "KP_9"]
        );
        assert!(catalog.iter().all(|e| e.candidates.len() == 2));
    }

    #[test]
    fn builtin_topleft_cycles_third_then_half() {
        let catalog = Catalog::builtin().unwrap();
        let topleft = catalog.get("topleft").unwrap();
        assert_eq!(topleft.accelerator, "KP_7");
        assert_eq!(
            topleft.candidates,
            vec![
                RectPercent::new(0.0, 0.0, 33.33, 50.0),
                RectPercent::new(0.0, 0.0, 50.0, 50.0),
            ]
        );
    }

    #[test]
    fn builtin_keeps_file_order() {
        let catalog = Catalog::builtin().unwrap();
        let names: Vec<&str> = catalog.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"topleft"));
        assert_eq!(names.last(), Some(&"right"));
    }

    #[test]
    fn lookup_of_unknown_name_is_none() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.get("nowhere").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = Catalog::new(vec![
            entry("left", "KP_4", vec![half()]),
            entry("left", "KP_6", vec![half()]),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateName(n) if n == "left"));
    }

    #[test]
    fn empty_candidates_are_rejected() {
        let err = Catalog::new(vec![entry("left", "KP_4", vec![])]).unwrap_err();
        assert!(matches!(err, CatalogError::NoCandidates(_)));
    }

    #[test]
    fn missing_accelerator_is_rejected() {
        let err = Catalog::new(vec![entry("left", " ", vec![half()])]).unwrap_err();
        assert!(matches!(err, CatalogError::NoAccelerator(_)));
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = Catalog::new(vec![entry("", "KP_4", vec![half()])]).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyName(0)));
    }

    #[test]
    fn non_finite_candidate_is_rejected() {
        let bad = RectPercent::new(f64::NAN, 0.0, 50.0, 50.0);
        let err = Catalog::new(vec![entry("left", "KP_4", vec![bad])]).unwrap_err();
        assert!(matches!(err, CatalogError::NonFinite(_)));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            Catalog::from_json(r#"[{"name": "x"}]"#),
            Err(CatalogError::Json(_))
        ));
    }

    #[test]
    fn overlapping_and_overflowing_candidates_are_legal() {
        let catalog = Catalog::from_json(
            r#"[{"name": "wide", "key": "KP_0", "candidates": [[80, 0, 50, 100], [0, 0, 100, 100]]}]"#,
        )
        .unwrap();
        assert_eq!(catalog.get("wide").unwrap().candidates.len(), 2);
    }
}
