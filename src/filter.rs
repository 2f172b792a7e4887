use crate::types::SalesRecord;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const ALL: &str = "ALL";

/// One filter dimension: either unconstrained or pinned to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selector<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selector<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(wanted) => wanted == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selector::All)
    }
}

impl<T: FromStr> FromStr for Selector<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case(ALL) {
            Ok(Selector::All)
        } else {
            s.parse().map(Selector::Only)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::All => f.write_str(ALL),
            Selector::Only(v) => v.fmt(f),
        }
    }
}

impl<'de, T> Deserialize<'de> for Selector<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The three active selectors. `Filter::default()` selects everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Filter {
    pub store: Selector<u32>,
    pub year: Selector<i32>,
    pub week: Selector<u32>,
}

impl Filter {
    pub fn matches(&self, r: &SalesRecord) -> bool {
        self.store.matches(&r.store) && self.year.matches(&r.year) && self.week.matches(&r.week)
    }

    pub fn is_unconstrained(&self) -> bool {
        self.store.is_all() && self.year.is_all() && self.week.is_all()
    }

    /// Borrow the matching rows, keeping table order.
    pub fn apply<'a>(&self, records: &'a [SalesRecord]) -> FilteredView<'a> {
        let rows = if self.is_unconstrained() {
            records.iter().collect()
        } else {
            records.iter().filter(|r| self.matches(r)).collect()
        };
        FilteredView { rows }
    }
}

/// Rows of a loaded table that satisfy the current filter.
#[derive(Debug, Clone, Default)]
pub struct FilteredView<'a> {
    rows: Vec<&'a SalesRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a SalesRecord> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Distinct, ascending values offered by each drop-down (before "ALL").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectorOptions {
    pub stores: Vec<u32>,
    pub years: Vec<i32>,
    pub weeks: Vec<u32>,
}

impl SelectorOptions {
    pub fn from_records(records: &[SalesRecord]) -> Self {
        let mut stores = BTreeSet::new();
        let mut years = BTreeSet::new();
        let mut weeks = BTreeSet::new();
        for r in records {
            stores.insert(r.store);
            years.insert(r.year);
            weeks.insert(r.week);
        }
        SelectorOptions {
            stores: stores.into_iter().collect(),
            years: years.into_iter().collect(),
            weeks: weeks.into_iter().collect(),
        }
    }
}

/// Drop-down entries: "ALL" followed by each value.
pub fn choices<T: ToString>(values: &[T]) -> Vec<String> {
    std::iter::once(ALL.to_string())
        .chain(values.iter().map(T::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_sales;
    use crate::loader::tests::SAMPLE;

    #[test]
    fn selector_parses_sentinel_and_values() {
        assert_eq!("ALL".parse::<Selector<u32>>().unwrap(), Selector::All);
        assert_eq!("all".parse::<Selector<u32>>().unwrap(), Selector::All);
        assert_eq!("".parse::<Selector<u32>>().unwrap(), Selector::All);
        assert_eq!(" 7 ".parse::<Selector<u32>>().unwrap(), Selector::Only(7));
        assert!("seven".parse::<Selector<u32>>().is_err());
        assert_eq!(Selector::Only(2011).to_string(), "2011");
        assert_eq!(Selector::<i32>::All.to_string(), "ALL");
    }

    #[test]
    fn unconstrained_filter_keeps_whole_table() {
        let table = parse_sales(SAMPLE.as_bytes()).unwrap();
        let view = Filter::default().apply(&table.records);
        assert_eq!(view.len(), table.len());
        assert!(view.iter().zip(&table.records).all(|(a, b)| std::ptr::eq(a, b)));
    }

    #[test]
    fn every_combination_is_a_consistent_subset() {
        let table = parse_sales(SAMPLE.as_bytes()).unwrap();
        let opts = &table.options;
        let stores = std::iter::once(Selector::All).chain(opts.stores.iter().map(|s| Selector::Only(*s)));
        for store in stores {
            let years = std::iter::once(Selector::All)
                .chain(opts.years.iter().map(|y| Selector::Only(*y)))
                .chain(std::iter::once(Selector::Only(1999)));
            for year in years {
                let weeks = std::iter::once(Selector::All).chain(opts.weeks.iter().map(|w| Selector::Only(*w)));
                for week in weeks {
                    let filter = Filter { store, year, week };
                    let view = filter.apply(&table.records);
                    assert!(view.len() <= table.len());
                    assert!(view.iter().all(|r| filter.matches(r)));
                    let expected = table.records.iter().filter(|r| filter.matches(r)).count();
                    assert_eq!(view.len(), expected);
                }
            }
        }
    }

    #[test]
    fn predicates_are_conjunctive() {
        let table = parse_sales(SAMPLE.as_bytes()).unwrap();
        let filter = Filter {
            store: Selector::Only(1),
            year: Selector::Only(2010),
            week: Selector::All,
        };
        let view = filter.apply(&table.records);
        assert_eq!(view.len(), 1);
        assert_eq!(view.iter().next().map(|r| r.weekly_sales), Some(100.0));
    }

    #[test]
    fn choices_lead_with_all() {
        assert_eq!(choices(&[1u32, 2]), vec!["ALL", "1", "2"]);
        assert_eq!(choices::<u32>(&[]), vec!["ALL"]);
    }
}
