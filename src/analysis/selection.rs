//! Column selection and unit grouping
//!
//! # Index syntax
//!
//! Comma-separated indices and inclusive ranges:
//!
//! ```text
//! "0,2:4"        → [0, 2, 3, 4]
//! "0,1,3:10,29"  → [0, 1, 3, 4, ..., 10, 29]
//! ```
//!
//! Malformed tokens (`"x"`, `"1:"`, `"5:2"`, `"-1"`) are logged with
//! `log::warn!` and skipped; a bad token never aborts the selection.
//!
//! Ranges are bounded by the column count before they are expanded: a range
//! reaching past the last column is clamped to it, and a range starting past
//! it is dropped. `"0:4000000000"` over 48 columns is simply `0..48`.
//!
//! # Units
//!
//! Column headers carry their unit in brackets (`"D-20VA006:Pressure [barg]"`).
//! The unit is the text between the last `[` and the next `]`, trimmed;
//! headers without brackets get the unit `"unknown"`.

/// Unit assigned to headers without a bracketed suffix
pub const UNKNOWN_UNIT: &str = "unknown";

/// Parse an index list against `available` columns, keeping input order and duplicates
///
/// Ranges are clamped to `available` before expansion. Single indices are
/// kept as written, so a caller can still see (and skip) an out-of-range one.
///
/// # Example
/// ```
/// use setpoint_sweep::analysis::parse_indices;
///
/// assert_eq!(parse_indices("0,2:4", 10), vec![0, 2, 3, 4]);
/// assert_eq!(parse_indices("3, x, 1", 10), vec![3, 1]);
/// assert_eq!(parse_indices("7:999999", 10), vec![7, 8, 9]);
/// ```
pub fn parse_indices(input: &str, available: usize) -> Vec<usize> {
    let mut indices = Vec::new();

    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token.split_once(':') {
            Some((start, end)) => match (start.trim().parse::<usize>(), end.trim().parse::<usize>()) {
                (Ok(start), Ok(_)) if start >= available => {
                    log::warn!("Range '{token}' starts past the last column ({available} available), skipped");
                }
                (Ok(start), Ok(end)) if start <= end => {
                    let last = end.min(available - 1);
                    if last < end {
                        log::warn!("Range '{token}' clamped to {start}:{last} ({available} columns available)");
                    }
                    indices.extend(start..=last);
                }
                (Ok(_), Ok(_)) => log::warn!("Invalid range '{token}': start is after end, skipped"),
                _ => log::warn!("Invalid range '{token}', skipped"),
            },
            None => match token.parse::<usize>() {
                Ok(index) => indices.push(index),
                Err(_) => log::warn!("Invalid index '{token}', skipped"),
            },
        }
    }

    indices
}

/// Parse an index list against `available` columns: sorted, unique, in range
///
/// Out-of-range indices are logged and dropped.
///
/// # Example
/// ```
/// use setpoint_sweep::analysis::select_columns;
///
/// assert_eq!(select_columns("4,0,2:4,99", 5), vec![0, 2, 3, 4]);
/// assert_eq!(select_columns("0:4000000000", 3), vec![0, 1, 2]);
/// ```
pub fn select_columns(input: &str, available: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = parse_indices(input, available)
        .into_iter()
        .filter(|&index| {
            let ok = index < available;
            if !ok {
                log::warn!("Index {index} is out of range (0-{}), skipped", available.saturating_sub(1));
            }
            ok
        })
        .collect();

    indices.sort_unstable();
    indices.dedup();
    indices
}

/// Unit of a column header
///
/// # Example
/// ```
/// use setpoint_sweep::analysis::parse_unit;
///
/// assert_eq!(parse_unit("D-20VA006:Pressure [barg]"), "barg");
/// assert_eq!(parse_unit("OutletStream[0].f [ kg/h ]"), "kg/h");
/// assert_eq!(parse_unit("Counter"), "unknown");
/// ```
pub fn parse_unit(header: &str) -> &str {
    if !(header.contains('[') && header.contains(']')) {
        return UNKNOWN_UNIT;
    }

    let tail = header.rsplit('[').next().unwrap_or(header);
    tail.split(']').next().unwrap_or(tail).trim()
}

/// Columns sharing a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitGroup {
    pub unit: String,

    /// Column indices, in selection order
    pub columns: Vec<usize>,
}

/// Group selected columns by unit, ordered by first appearance
///
/// Indices outside `headers` are ignored.
pub fn group_by_unit<S: AsRef<str>>(headers: &[S], selection: &[usize]) -> Vec<UnitGroup> {
    let mut groups: Vec<UnitGroup> = Vec::new();

    for &index in selection {
        let Some(header) = headers.get(index) else {
            continue;
        };
        let unit = parse_unit(header.as_ref());

        match groups.iter_mut().find(|g| g.unit == unit) {
            Some(group) => group.columns.push(index),
            None => groups.push(UnitGroup {
                unit: unit.to_string(),
                columns: vec![index],
            }),
        }
    }

    groups
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_indices_ranges_inclusive() {
        assert_eq!(parse_indices("0,2:4", 10), vec![0, 2, 3, 4]);
        assert_eq!(parse_indices(" 7 : 8 ,1", 10), vec![7, 8, 1]);
    }

    #[test]
    fn test_parse_indices_skips_malformed() {
        assert_eq!(parse_indices("a,1,2:,:3,5:2,-1,4", 10), vec![1, 4]);
        assert!(parse_indices("", 10).is_empty());
        assert!(parse_indices(",,", 10).is_empty());
    }

    #[test]
    fn test_parse_indices_bounds_ranges_before_expanding() {
        // End clamped to the last column, never expanded to four billion entries
        assert_eq!(parse_indices("46:4000000000", 48), vec![46, 47]);
        assert_eq!(parse_indices(&format!("0:{}", usize::MAX), 2), vec![0, 1]);

        // Start at or past the bound drops the whole range
        assert_eq!(parse_indices("1,48:4000000000,2", 48), vec![1, 2]);
        assert!(parse_indices("0:5", 0).is_empty());

        // Single indices are kept for the caller to range-check
        assert_eq!(parse_indices("99,0:1", 2), vec![99, 0, 1]);
    }

    #[test]
    fn test_select_columns_huge_range_is_clamped() {
        assert_eq!(select_columns("0:4000000000", 48), (0..48).collect::<Vec<_>>());
        assert_eq!(select_columns("3000000000:4000000000,5", 48), vec![5]);
    }

    #[test]
    fn test_select_columns_sorted_unique_in_range() {
        assert_eq!(select_columns("3,1,1:2,10", 4), vec![1, 2, 3]);
        assert!(select_columns("5", 0).is_empty());
    }

    #[test]
    fn test_parse_unit_variants() {
        assert_eq!(parse_unit("ModelTime [s]"), "s");
        assert_eq!(parse_unit("LedaBoundary:OutletStream[0].f [kg/h]"), "kg/h");
        assert_eq!(parse_unit("weird ]"), "unknown");
        assert_eq!(parse_unit("x []"), "");
    }

    #[test]
    fn test_group_by_unit_first_appearance() {
        let headers = ["ModelTime [s]", "F1 [kg/h]", "P [barg]", "F2 [kg/h]", "Mode"];
        let groups = group_by_unit(&headers, &[3, 2, 1, 4, 9]);

        assert_eq!(
            groups,
            vec![
                UnitGroup { unit: "kg/h".into(), columns: vec![3, 1] },
                UnitGroup { unit: "barg".into(), columns: vec![2] },
                UnitGroup { unit: "unknown".into(), columns: vec![4] },
            ]
        );
    }
}
