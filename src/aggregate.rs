use crate::filter::FilteredView;
use crate::types::{GroupSales, HolidayPoint, SalesRecord, StoreMeta, StoreSales};
use crate::util::{average, format_number};
use std::collections::{BTreeMap, HashSet};

pub const TOP_STORES: usize = 5;

/// Sum `weekly_sales` per key, keys ascending.
fn sum_by<'a, K, F>(view: &FilteredView<'a>, key: F) -> Vec<GroupSales<K>>
where
    K: Ord,
    F: Fn(&'a SalesRecord) -> K,
{
    let mut map: BTreeMap<K, f64> = BTreeMap::new();
    for r in view.iter() {
        *map.entry(key(r)).or_insert(0.0) += r.weekly_sales;
    }
    map.into_iter()
        .map(|(key, weekly_sales)| GroupSales { key, weekly_sales })
        .collect()
}

/// Headline figure. Sums the forecast column, unlike every other aggregate.
pub fn total_sales(view: &FilteredView) -> f64 {
    view.iter().map(|r| r.sales_forecast).sum()
}

pub fn format_total(total: f64) -> String {
    format_number(total, 0)
}

pub fn sales_by_store(view: &FilteredView) -> Vec<StoreSales> {
    sum_by(view, |r| r.store)
        .into_iter()
        .map(|g| StoreSales {
            store: g.key,
            weekly_sales: g.weekly_sales,
        })
        .collect()
}

/// The `n` stores with the highest summed weekly sales. The sort is stable,
/// so equal sums keep ascending store order.
pub fn top_stores(view: &FilteredView, n: usize) -> Vec<StoreSales> {
    let mut stores = sales_by_store(view);
    stores.sort_by(|a, b| b.weekly_sales.total_cmp(&a.weekly_sales));
    stores.truncate(n);
    stores
}

/// Distinct (store, size, type) rows of the view for the given stores, in
/// first-seen order.
pub fn store_metadata(view: &FilteredView, top: &[StoreSales]) -> Vec<StoreMeta> {
    let wanted: HashSet<u32> = top.iter().map(|s| s.store).collect();
    let mut seen: HashSet<(u32, u64, &str)> = HashSet::new();
    let mut out = Vec::new();
    for r in view.iter().filter(|r| wanted.contains(&r.store)) {
        if seen.insert((r.store, r.size.to_bits(), r.store_type.as_str())) {
            out.push(StoreMeta {
                store: r.store,
                size: r.size,
                store_type: r.store_type.clone(),
            });
        }
    }
    out
}

pub fn sales_by_type(view: &FilteredView) -> Vec<GroupSales<String>> {
    sum_by(view, |r| r.store_type.clone())
}

pub fn sales_by_holiday(view: &FilteredView) -> Vec<GroupSales<bool>> {
    sum_by(view, |r| r.is_holiday)
}

pub fn sales_by_month(view: &FilteredView) -> Vec<GroupSales<u32>> {
    sum_by(view, |r| r.month)
}

/// Mean weekly sales per week number, weeks ascending.
pub fn weekly_mean(view: &FilteredView) -> Vec<GroupSales<u32>> {
    let mut map: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for r in view.iter() {
        map.entry(r.week).or_default().push(r.weekly_sales);
    }
    map.into_iter()
        .map(|(week, sales)| GroupSales {
            key: week,
            weekly_sales: average(&sales),
        })
        .collect()
}

/// Weeks containing a holiday row, in the order they first appear, placed on
/// the weekly mean curve.
pub fn holiday_weeks(view: &FilteredView, weekly: &[GroupSales<u32>]) -> Vec<HolidayPoint> {
    let mut seen = HashSet::new();
    view.iter()
        .filter(|r| r.is_holiday && seen.insert(r.week))
        .filter_map(|r| {
            weekly.iter().find(|w| w.key == r.week).map(|w| HolidayPoint {
                x: r.week,
                y: w.weekly_sales,
            })
        })
        .collect()
}

/// Holiday rows only, summed per month. The marker height is the holiday
/// share of the month, not the month total.
pub fn holiday_months(view: &FilteredView) -> Vec<HolidayPoint> {
    let mut map: BTreeMap<u32, f64> = BTreeMap::new();
    for r in view.iter().filter(|r| r.is_holiday) {
        *map.entry(r.month).or_insert(0.0) += r.weekly_sales;
    }
    map.into_iter().map(|(x, y)| HolidayPoint { x, y }).collect()
}

/// Everything the dashboard shows for one filtered view.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub row_count: usize,
    pub total_sales: f64,
    pub top_stores: Vec<StoreSales>,
    pub top_store_metadata: Vec<StoreMeta>,
    pub by_type: Vec<GroupSales<String>>,
    pub by_holiday: Vec<GroupSales<bool>>,
    pub weekly_mean: Vec<GroupSales<u32>>,
    pub holiday_weeks: Vec<HolidayPoint>,
    pub by_store: Vec<StoreSales>,
    pub by_month: Vec<GroupSales<u32>>,
    pub holiday_months: Vec<HolidayPoint>,
}

impl Dashboard {
    pub fn compute(view: &FilteredView) -> Self {
        let top_stores = top_stores(view, TOP_STORES);
        let top_store_metadata = store_metadata(view, &top_stores);
        let weekly_mean = weekly_mean(view);
        let holiday_weeks = holiday_weeks(view, &weekly_mean);
        Dashboard {
            row_count: view.len(),
            total_sales: total_sales(view),
            top_stores,
            top_store_metadata,
            by_type: sales_by_type(view),
            by_holiday: sales_by_holiday(view),
            weekly_mean,
            holiday_weeks,
            by_store: sales_by_store(view),
            by_month: sales_by_month(view),
            holiday_months: holiday_months(view),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn total_sales_label(&self) -> String {
        format_total(self.total_sales)
    }
}
