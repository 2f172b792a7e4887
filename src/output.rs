use crate::aggregate::Dashboard;
use crate::types::{GroupRow, GroupSales, HolidayPoint, StoreMetaRow, TopStoreRow};
use crate::util::format_number;
use std::fmt::Display;
use tabled::{settings::Style, Table, Tabled};

pub fn markdown_table<T: Tabled>(rows: &[T]) -> String
where
    T: Clone,
{
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows.to_vec()).with(Style::markdown()).to_string()
}

fn group_rows<K: Display>(groups: &[GroupSales<K>], decimals: usize) -> Vec<GroupRow> {
    groups
        .iter()
        .map(|g| GroupRow {
            group: g.key.to_string(),
            weekly_sales: format_number(g.weekly_sales, decimals),
        })
        .collect()
}

fn holiday_rows(points: &[HolidayPoint]) -> Vec<GroupRow> {
    points
        .iter()
        .map(|p| GroupRow {
            group: p.x.to_string(),
            weekly_sales: format_number(p.y, 2),
        })
        .collect()
}

/// The dashboard as plain text: headline figure followed by each table.
pub fn summary_text(dash: &Dashboard) -> String {
    let top: Vec<TopStoreRow> = dash
        .top_stores
        .iter()
        .map(|s| TopStoreRow {
            store: s.store,
            weekly_sales: format_number(s.weekly_sales, 2),
        })
        .collect();
    let meta: Vec<StoreMetaRow> = dash
        .top_store_metadata
        .iter()
        .map(|m| StoreMetaRow {
            store: m.store,
            size: format_number(m.size, 0),
            store_type: m.store_type.clone(),
        })
        .collect();

    let by_store: Vec<GroupRow> = dash
        .by_store
        .iter()
        .map(|s| GroupRow {
            group: s.store.to_string(),
            weekly_sales: format_number(s.weekly_sales, 2),
        })
        .collect();

    let sections = [
        ("Top 5 Sales Stores", markdown_table(&top)),
        ("Top Stores Size", markdown_table(&meta)),
        ("Sales by Type", markdown_table(&group_rows(&dash.by_type, 2))),
        ("Sales by Holiday", markdown_table(&group_rows(&dash.by_holiday, 2))),
        ("Average Sales per Week", markdown_table(&group_rows(&dash.weekly_mean, 2))),
        ("Holiday Weeks", markdown_table(&holiday_rows(&dash.holiday_weeks))),
        ("Sales by Store", markdown_table(&by_store)),
        ("Sales by Month", markdown_table(&group_rows(&dash.by_month, 2))),
        ("Holiday Months", markdown_table(&holiday_rows(&dash.holiday_months))),
    ];

    let mut out = format!(
        "Total Sales: {}\n({} rows selected)\n",
        dash.total_sales_label(),
        crate::util::format_int(dash.row_count)
    );
    for (title, table) in sections {
        out.push_str(&format!("\n{}\n\n{}\n", title, table));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Filter, Selector};
    use crate::loader::parse_sales;
    use crate::loader::tests::SAMPLE;

    #[test]
    fn summary_lists_every_section() {
        let table = parse_sales(SAMPLE.as_bytes()).unwrap();
        let dash = Dashboard::compute(&Filter::default().apply(&table.records));
        let text = summary_text(&dash);
        assert!(text.starts_with("Total Sales: 1,640\n(5 rows selected)"));
        assert!(text.contains("| Store | Weekly_Sales |"));
        assert!(text.contains("| 1     | 1,300.00     |"));
        assert!(text.contains("Sales by Holiday"));
        assert!(text.contains("| true  | 1,500.00     |"));

        let by_store = text.split("Sales by Store").nth(1).unwrap();
        assert!(by_store.contains("| 2     | 300.00       |"));
        assert!(by_store.contains("| 3     | 70.50        |"));
        let holiday_weeks = text.split("Holiday Weeks").nth(1).unwrap();
        assert!(holiday_weeks.contains("| 6     | 750.00       |"));
        let holiday_months = text.split("Holiday Months").nth(1).unwrap();
        assert!(holiday_months.contains("| 2     | 1,500.00     |"));
    }

    #[test]
    fn empty_selection_prints_placeholders() {
        let table = parse_sales(SAMPLE.as_bytes()).unwrap();
        let filter = Filter {
            week: Selector::Only(40),
            ..Filter::default()
        };
        let dash = Dashboard::compute(&filter.apply(&table.records));
        let text = summary_text(&dash);
        assert!(text.starts_with("Total Sales: 0\n"));
        assert_eq!(text.matches("(no rows)").count(), 9);
    }
}
