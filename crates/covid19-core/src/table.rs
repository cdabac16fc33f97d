//! Small typed-table toolkit: hash outer join, sort-then-scan grouping and date pivots.

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

use chrono::NaiveDate;

/// Full outer hash join on `K`.
///
/// Rows come out in left order (one row per right match), followed by right rows that
/// matched nothing, in right order.
pub fn outer_join<K, A, B>(left: Vec<(K, A)>, right: Vec<(K, B)>) -> Vec<(K, Option<A>, Option<B>)>
where
    K: Eq + Hash + Clone,
    A: Clone,
    B: Clone,
{
    let mut index: HashMap<K, Vec<usize>> = HashMap::with_capacity(right.len());
    for (pos, (key, _)) in right.iter().enumerate() {
        index.entry(key.clone()).or_default().push(pos);
    }

    let mut matched = vec![false; right.len()];
    let mut joined = Vec::with_capacity(left.len().max(right.len()));

    for (key, value) in left {
        match index.get(&key) {
            Some(positions) => {
                for &pos in positions {
                    matched[pos] = true;
                    joined.push((key.clone(), Some(value.clone()), Some(right[pos].1.clone())));
                }
            }
            None => joined.push((key, Some(value), None)),
        }
    }

    for ((key, value), used) in right.into_iter().zip(matched) {
        if !used {
            joined.push((key, None, Some(value)));
        }
    }

    joined
}

/// Sorts rows by key and folds runs of equal keys with `combine`.
pub fn group_sorted<K, V, F>(mut rows: Vec<(K, V)>, mut combine: F) -> Vec<(K, V)>
where
    K: Ord,
    F: FnMut(&mut V, V),
{
    rows.sort_by(|a, b| a.0.cmp(&b.0));

    let mut grouped: Vec<(K, V)> = Vec::with_capacity(rows.len());
    for (key, value) in rows {
        match grouped.last_mut() {
            Some((last, acc)) if *last == key => combine(acc, value),
            _ => grouped.push((key, value)),
        }
    }
    grouped
}

/// Date-indexed wide table. `values[row][column]`; cells without data are zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotTable {
    pub index: Vec<NaiveDate>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<i64>>,
}

impl PivotTable {
    /// Builds a pivot from `((date, column), value)` cells. Dates and column labels are
    /// emitted in ascending order; repeated cells are summed.
    pub fn from_cells<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = ((NaiveDate, String), i64)>,
    {
        let cells: Vec<((NaiveDate, String), i64)> = cells.into_iter().collect();

        let index: Vec<NaiveDate> = cells
            .iter()
            .map(|((date, _), _)| *date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let columns: Vec<String> = cells
            .iter()
            .map(|((_, column), _)| column.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let row_of: HashMap<NaiveDate, usize> =
            index.iter().enumerate().map(|(pos, date)| (*date, pos)).collect();
        let column_of: HashMap<&str, usize> = columns
            .iter()
            .enumerate()
            .map(|(pos, column)| (column.as_str(), pos))
            .collect();

        let mut values = vec![vec![0i64; columns.len()]; index.len()];
        for ((date, column), value) in &cells {
            let row = row_of[date];
            let col = column_of[column.as_str()];
            values[row][col] += *value;
        }

        Self {
            index,
            columns,
            values,
        }
    }

    /// Places tables side by side over the union of their dates. Column labels become
    /// `<column>_<suffix>`.
    pub fn hconcat(parts: Vec<(String, PivotTable)>) -> Self {
        let index: Vec<NaiveDate> = parts
            .iter()
            .flat_map(|(_, table)| table.index.iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let row_of: HashMap<NaiveDate, usize> =
            index.iter().enumerate().map(|(pos, date)| (*date, pos)).collect();

        let mut columns = Vec::new();
        let mut values = vec![Vec::new(); index.len()];

        for (suffix, table) in parts {
            let offset = columns.len();
            columns.extend(
                table
                    .columns
                    .iter()
                    .map(|column| format!("{column}_{suffix}")),
            );
            for row in values.iter_mut() {
                row.resize(columns.len(), 0);
            }
            for (date, row) in table.index.iter().zip(table.values) {
                let target = &mut values[row_of[date]];
                for (col, value) in row.into_iter().enumerate() {
                    target[offset + col] = value;
                }
            }
        }

        Self {
            index,
            columns,
            values,
        }
    }

    pub fn height(&self) -> usize {
        self.index.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<Vec<i64>> {
        let col = self.columns.iter().position(|column| column == name)?;
        Some(self.values.iter().map(|row| row[col]).collect())
    }

    pub fn get(&self, date: NaiveDate, column: &str) -> Option<i64> {
        let row = self.index.iter().position(|d| *d == date)?;
        let col = self.columns.iter().position(|c| c == column)?;
        Some(self.values[row][col])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    #[test]
    fn outer_join_keeps_both_sides() {
        let left = vec![("a", 1), ("b", 2)];
        let right = vec![("b", 20), ("c", 30)];
        let joined = outer_join(left, right);
        assert_eq!(
            joined,
            vec![
                ("a", Some(1), None),
                ("b", Some(2), Some(20)),
                ("c", None, Some(30)),
            ]
        );
    }

    #[test]
    fn outer_join_repeats_left_row_per_right_match() {
        let joined = outer_join(vec![("a", 1)], vec![("a", 10), ("a", 11)]);
        assert_eq!(joined, vec![("a", Some(1), Some(10)), ("a", Some(1), Some(11))]);
    }

    #[test]
    fn group_sorted_sums_runs() {
        let grouped = group_sorted(vec![("b", 1), ("a", 2), ("b", 3)], |acc, v| *acc += v);
        assert_eq!(grouped, vec![("a", 2), ("b", 4)]);
    }

    #[test]
    fn pivot_zero_fills_missing_cells() {
        let table = PivotTable::from_cells(vec![
            ((day(2), "Europe".to_string()), 5),
            ((day(1), "Asia".to_string()), 1),
            ((day(2), "Asia".to_string()), 2),
        ]);
        assert_eq!(table.index, vec![day(1), day(2)]);
        assert_eq!(table.columns, vec!["Asia", "Europe"]);
        assert_eq!(table.values, vec![vec![1, 0], vec![2, 5]]);
        assert_eq!(table.get(day(2), "Europe"), Some(5));
    }

    #[test]
    fn hconcat_suffixes_columns_and_aligns_dates() {
        let a = PivotTable::from_cells(vec![((day(1), "X".to_string()), 1)]);
        let b = PivotTable::from_cells(vec![((day(2), "X".to_string()), 7)]);
        let joined = PivotTable::hconcat(vec![("confirmed".into(), a), ("deaths".into(), b)]);
        assert_eq!(joined.columns, vec!["X_confirmed", "X_deaths"]);
        assert_eq!(joined.values, vec![vec![1, 0], vec![0, 7]]);
    }
}
