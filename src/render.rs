// HTML rendering for the dashboard page.
//
// Rendering is stateless: every request builds the filtered view, computes
// the aggregates from scratch and lays them out according to the configured
// grid. The selectors submit on change, so each interaction is one GET.

use crate::aggregate::Dashboard;
use crate::charts::{self, Chart};
use crate::config::{DashboardConfig, Layout};
use crate::filter::{choices, Filter, FilteredView, Selector};
use crate::loader::SalesTable;
use crate::util::{format_int, format_number};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde::Deserialize;
use std::fmt::Display;

pub const PAGE_TITLE: &str = "Walmart Sales Dashboard";

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; display: flex; min-height: 100vh; }
.sidebar { width: 260px; padding: 16px; background: linear-gradient(to bottom, #f2f2f2, #ffffff); color: #1F618D; }
.sidebar label { display: block; margin-top: 12px; font-weight: 600; }
.sidebar select, .sidebar input[type=file] { width: 100%; margin-top: 4px; }
.sidebar button { margin-top: 8px; color: #ffffff; background: #1F618D; border: 0; padding: 6px 12px; border-radius: 4px; }
main { flex: 1; padding: 16px 24px; overflow-x: auto; }
.total-sales { border: 2px solid #1F618D; border-radius: 5px; padding: 10px; background: #f2f2f2; color: black; width: 300px; }
.total-sales .label { font-size: 20px; }
.total-sales .value { font-size: 24px; font-weight: bold; }
.grid { display: grid; gap: 16px; margin-top: 16px; }
.cols-2 { grid-template-columns: repeat(2, minmax(0, 1fr)); }
.cols-3 { grid-template-columns: repeat(3, minmax(0, 1fr)); }
.chart { min-height: 380px; }
table { border-collapse: collapse; font-size: 14px; }
th, td { border: 1px solid #ddd; padding: 4px 8px; text-align: right; }
th { background: #f2f2f2; }
.error { border: 2px solid #C0392B; border-radius: 5px; padding: 10px; color: #C0392B; }
.note { color: #666; font-size: 13px; }
@media (max-width: 900px) { .cols-2, .cols-3 { grid-template-columns: 1fr; } }
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Filtered raw table only
    Dataset,
    /// Summary, tables and charts
    #[default]
    Dashboard,
}

/// Query string of `GET /`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct DashboardQuery {
    pub store: Selector<u32>,
    pub year: Selector<i32>,
    pub week: Selector<u32>,
    pub mode: ViewMode,
}

impl DashboardQuery {
    pub fn filter(&self) -> Filter {
        Filter {
            store: self.store,
            year: self.year,
            week: self.week,
        }
    }
}

/// What the page shows, decided by the session state.
pub enum PageView<'a> {
    /// No file yet: only the upload prompt.
    Upload,
    /// The last upload could not be loaded.
    Failed { message: &'a str },
    Loaded {
        file_name: &'a str,
        table: &'a SalesTable,
        query: DashboardQuery,
    },
}

pub fn render_page(cfg: &DashboardConfig, page: &PageView) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (PAGE_TITLE) }
                style { (PreEscaped(STYLE)) }
                @if matches!(page, PageView::Loaded { .. }) {
                    script src=(cfg.echarts_url) {}
                }
            }
            body {
                (sidebar(page))
                main {
                    @match page {
                        PageView::Upload => {
                            h2 { "Upload a sales CSV to begin" }
                            p class="note" {
                                "Required columns: Date, Store, Year, Week, Month, Weekly_Sales, sales_forec, Size, Type, IsHoliday."
                            }
                        },
                        PageView::Failed { message } => {
                            div class="error" {
                                strong { "Could not load the file: " }
                                (message)
                            }
                        },
                        PageView::Loaded { file_name, table, query } => {
                            (loaded_body(cfg, file_name, table, query))
                        }
                    }
                }
            }
        }
    }
}

fn sidebar(page: &PageView) -> Markup {
    let loaded = match page {
        PageView::Loaded { table, query, .. } => Some((*table, *query)),
        _ => None,
    };
    html! {
        aside class="sidebar" {
            h2 { (PAGE_TITLE) }
            form method="post" action="/upload" enctype="multipart/form-data" {
                label for="file" { "Choose a CSV file" }
                input id="file" type="file" name="file" accept=".csv,text/csv" required;
                button type="submit" { "Upload" }
            }
            @if let Some((table, query)) = loaded {
                h3 { "Options" }
                form method="get" action="/" {
                    label { "Select an option" }
                    @for (value, label) in [(ViewMode::Dataset, "Dataset"), (ViewMode::Dashboard, "Dashboard")] {
                        div {
                            input type="radio" name="mode" value=(label.to_lowercase())
                                checked[query.mode == value] onchange="this.form.submit()";
                            " " (label)
                        }
                    }
                    (selector("store", "Select Store", &table.options.stores, &query.store))
                    (selector("year", "Select Year", &table.options.years, &query.year))
                    (selector("week", "Select Week", &table.options.weeks, &query.week))
                    noscript { button type="submit" { "Apply" } }
                }
            }
        }
    }
}

fn selector<T: Display>(name: &str, label: &str, values: &[T], current: &Selector<T>) -> Markup {
    let current = current.to_string();
    html! {
        label for=(name) { (label) }
        select id=(name) name=(name) onchange="this.form.submit()" {
            @for choice in choices(values) {
                option value=(choice) selected[choice == current] { (choice) }
            }
        }
    }
}

fn loaded_body(cfg: &DashboardConfig, file_name: &str, table: &SalesTable, query: &DashboardQuery) -> Markup {
    let view = query.filter().apply(&table.records);
    html! {
        p class="note" {
            (file_name) ": " (format_int(table.len())) " rows loaded"
            @if table.is_empty() { " (header only)" }
        }
        @match query.mode {
            ViewMode::Dataset => (data_table(cfg, &view)),
            ViewMode::Dashboard => {
                (dashboard_body(cfg, &Dashboard::compute(&view)))
                h3 { "Filtered Data:" }
                (data_table(cfg, &view))
            },
        }
    }
}

/// Summary panel, the two top-store tables and the chart grid.
pub fn dashboard_body(cfg: &DashboardConfig, dash: &Dashboard) -> Markup {
    html! {
        div class="total-sales" {
            span class="label" { "Total Sales: " }
            span class="value" { (dash.total_sales_label()) }
        }
        div class="grid cols-2" {
            div {
                h3 { "Top 5 Sales Stores" }
                table {
                    thead { tr { th { "Store" } th { "Weekly_Sales" } } }
                    tbody {
                        @for s in &dash.top_stores {
                            tr { td { (s.store) } td { (format_number(s.weekly_sales, 2)) } }
                        }
                    }
                }
            }
            div {
                h3 { "Top Stores Size" }
                table {
                    thead { tr { th { "Store" } th { "Size" } th { "Type" } } }
                    tbody {
                        @for m in &dash.top_store_metadata {
                            tr { td { (m.store) } td { (format_number(m.size, 0)) } td { (m.store_type) } }
                        }
                    }
                }
            }
        }
        // Charts are skipped entirely for an empty selection.
        @if !dash.is_empty() {
            (chart_grid(cfg.layout, dash))
        }
    }
}

fn chart_grid(layout: Layout, dash: &Dashboard) -> Markup {
    let by_type = charts::sales_by_type_chart(dash);
    let by_holiday = charts::sales_by_holiday_chart(dash);
    let trend = charts::weekly_trend_chart(dash);
    let by_store = charts::sales_by_store_chart(dash);
    let by_month = charts::sales_by_month_chart(dash);
    let all = [&by_type, &by_holiday, &trend, &by_store, &by_month];

    html! {
        @match layout {
            Layout::TwoColumn => {
                div class="grid cols-2" { (container(&by_type)) (container(&by_holiday)) }
                div class="grid" { (container(&trend)) (container(&by_store)) (container(&by_month)) }
            },
            Layout::ThreeColumn => {
                div class="grid cols-3" { (container(&by_type)) (container(&by_holiday)) (container(&trend)) }
                div class="grid cols-2" { (container(&by_store)) (container(&by_month)) }
            },
        }
        script { (PreEscaped(charts::init_script(&all))) }
    }
}

fn container(chart: &Chart) -> Markup {
    html! { div id=(chart.id) class="chart" {} }
}

fn data_table(cfg: &DashboardConfig, view: &FilteredView) -> Markup {
    let shown = view.len().min(cfg.max_table_rows);
    html! {
        @if view.is_empty() {
            p class="note" { "No rows match the current selection." }
        }
        @if shown < view.len() {
            p class="note" {
                "Showing first " (format_int(shown)) " of " (format_int(view.len())) " rows."
            }
        }
        table class="data" {
            thead {
                tr {
                    @for col in ["Date", "Store", "Year", "Week", "Month", "Weekly_Sales", "sales_forec", "Size", "Type", "IsHoliday"] {
                        th { (col) }
                    }
                }
            }
            tbody {
                @for r in view.iter().take(shown) {
                    tr {
                        td { (r.date.format("%Y-%m-%d").to_string()) }
                        td { (r.store) }
                        td { (r.year) }
                        td { (r.week) }
                        td { (r.month) }
                        td { (format_number(r.weekly_sales, 2)) }
                        td { (format_number(r.sales_forecast, 2)) }
                        td { (format_number(r.size, 0)) }
                        td { (r.store_type) }
                        td { (r.is_holiday) }
                    }
                }
            }
        }
    }
}
