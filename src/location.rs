//! Source locations.
//!
//! Lines and columns are zero-based internally (matching offsets into the
//! scanner's cursor); human-facing rendering (`to_human`, `Display` on
//! [`crate::diagnostics::Message`]) adds one to both.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Location {
    pub first_line: u32,
    pub first_column: u32,
    pub last_line: u32,
    pub last_column: u32,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl Location {
    /// A zero-width location at a single point.
    pub fn point(line: u32, column: u32, offset: usize) -> Self {
        Self {
            first_line: line,
            first_column: column,
            last_line: line,
            last_column: column,
            start_offset: offset,
            end_offset: offset,
        }
    }

    /// Combine two locations into one spanning both.
    ///
    /// # Panics
    ///
    /// Panics if `a.start_offset > b.end_offset` — callers must merge
    /// locations in source order.
    pub fn merge(a: Location, b: Location) -> Location {
        assert!(
            a.start_offset <= b.end_offset,
            "Location::merge called out of order: {a:?} then {b:?}"
        );
        let (first_line, first_column, start_offset) = if a.start_offset <= b.start_offset {
            (a.first_line, a.first_column, a.start_offset)
        } else {
            (b.first_line, b.first_column, b.start_offset)
        };
        let (last_line, last_column, end_offset) = if a.end_offset >= b.end_offset {
            (a.last_line, a.last_column, a.end_offset)
        } else {
            (b.last_line, b.last_column, b.end_offset)
        };
        Location {
            first_line,
            first_column,
            last_line,
            last_column,
            start_offset,
            end_offset,
        }
    }

    /// 1-based `(first_line, first_column, last_line, last_column)`, for display.
    pub fn to_human(self) -> (u32, u32, u32, u32) {
        (
            self.first_line + 1,
            self.first_column + 1,
            self.last_line + 1,
            self.last_column + 1,
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fl, fc, ll, lc) = self.to_human();
        write!(f, "{fl}.{fc} \u{2013} {ll}.{lc}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_spans_both_locations() {
        let a = Location {
            first_line: 0,
            first_column: 0,
            last_line: 0,
            last_column: 4,
            start_offset: 0,
            end_offset: 4,
        };
        let b = Location {
            first_line: 1,
            first_column: 0,
            last_line: 1,
            last_column: 2,
            start_offset: 5,
            end_offset: 7,
        };
        let merged = Location::merge(a, b);
        assert_eq!(merged.first_line, 0);
        assert_eq!(merged.last_line, 1);
        assert_eq!(merged.start_offset, 0);
        assert_eq!(merged.end_offset, 7);
    }

    #[test]
    fn human_display_is_one_based() {
        let loc = Location::point(0, 0, 0);
        assert_eq!(loc.to_human(), (1, 1, 1, 1));
    }
}
