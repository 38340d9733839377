pub mod catalog;
pub mod error;
pub mod loader;

pub use catalog::{Catalog, ResolvedAttribute, TableKind};
pub use loader::Dataset;

/// Calendar month abbreviations indexed by month number minus one.
pub const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Returns the abbreviation for a 1-based month number, or `None` when the
/// number falls outside 1-12.
pub fn month_abbr(month: i64) -> Option<&'static str> {
    if (1..=12).contains(&month) {
        Some(MONTH_ABBR[(month - 1) as usize])
    } else {
        None
    }
}

/// Resolves a month abbreviation (as shown in the UI selector) back to its
/// 1-based month number.
pub fn month_number(abbr: &str) -> Option<i64> {
    MONTH_ABBR
        .iter()
        .position(|a| *a == abbr)
        .map(|i| (i + 1) as i64)
}
