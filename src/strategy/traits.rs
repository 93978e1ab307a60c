// src/strategy/traits.rs

use std::fmt::Debug;

/// Shared surface of the pattern and algorithm catalogs.
///
/// Both catalogs are closed enums; this trait gives them a common way to be
/// listed and looked up by their wire tag (e.g. `"peak_hours"`).
pub trait CatalogEntry: Debug + Copy + Sized + 'static {
    /// Every variant, in display order.
    const ALL: &'static [Self];

    /// Stable machine tag.
    fn tag(&self) -> &'static str;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;
}

/// Finds the catalog entry whose tag matches exactly.
pub fn lookup<T: CatalogEntry>(tag: &str) -> Option<T> {
    T::ALL.iter().copied().find(|entry| entry.tag() == tag)
}
