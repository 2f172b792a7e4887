use chrono::NaiveDate;
use serde::Deserialize;
use tabled::Tabled;

/// Column names every sales export must carry.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "Date",
    "Store",
    "Year",
    "Week",
    "Month",
    "Weekly_Sales",
    "sales_forec",
    "Size",
    "Type",
    "IsHoliday",
];

#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Store")]
    pub store: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Week")]
    pub week: Option<String>,
    #[serde(rename = "Month")]
    pub month: Option<String>,
    #[serde(rename = "Weekly_Sales")]
    pub weekly_sales: Option<String>,
    #[serde(rename = "sales_forec")]
    pub sales_forecast: Option<String>,
    #[serde(rename = "Size")]
    pub size: Option<String>,
    #[serde(rename = "Type")]
    pub store_type: Option<String>,
    #[serde(rename = "IsHoliday")]
    pub is_holiday: Option<String>,
}

/// One (store, week) observation after type coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub store: u32,
    pub size: f64,
    pub store_type: String,
    pub year: i32,
    pub week: u32,
    pub month: u32,
    pub date: NaiveDate,
    pub weekly_sales: f64,
    pub sales_forecast: f64,
    pub is_holiday: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreSales {
    pub store: u32,
    pub weekly_sales: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreMeta {
    pub store: u32,
    pub size: f64,
    pub store_type: String,
}

/// Summed weekly sales for one group key (type, holiday flag, month, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSales<K> {
    pub key: K,
    pub weekly_sales: f64,
}

/// A point that gets a "Holiday" marker on the trend charts.
#[derive(Debug, Clone, PartialEq)]
pub struct HolidayPoint {
    pub x: u32,
    pub y: f64,
}

// Display rows for terminal output. Numbers are pre-formatted the same way
// the dashboard shows them.

#[derive(Debug, Clone, Tabled)]
pub struct TopStoreRow {
    #[tabled(rename = "Store")]
    pub store: u32,
    #[tabled(rename = "Weekly_Sales")]
    pub weekly_sales: String,
}

#[derive(Debug, Clone, Tabled)]
pub struct StoreMetaRow {
    #[tabled(rename = "Store")]
    pub store: u32,
    #[tabled(rename = "Size")]
    pub size: String,
    #[tabled(rename = "Type")]
    pub store_type: String,
}

#[derive(Debug, Clone, Tabled)]
pub struct GroupRow {
    #[tabled(rename = "Group")]
    pub group: String,
    #[tabled(rename = "Weekly_Sales")]
    pub weekly_sales: String,
}
