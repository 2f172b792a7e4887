// ECharts option documents for the dashboard charts.
//
// Each builder returns a `Chart` holding the DOM id of its container and the
// option JSON; `render` places the containers and emits one init script.

use crate::aggregate::Dashboard;
use crate::types::{GroupSales, HolidayPoint};
use serde_json::{json, Value};

const TYPE_COLORS: [&str; 3] = ["#85C1E9", "#2E86C1", "#1F618D"];
const HOLIDAY_COLORS: [&str; 2] = ["#1F618D", "#228FD4"];

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub id: &'static str,
    pub options: Value,
}

fn donut(title: &str, slices: Vec<(String, f64)>, colors: &[&str]) -> Value {
    let data: Vec<Value> = slices
        .into_iter()
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect();
    json!({
        "title": { "text": title },
        "tooltip": { "trigger": "item" },
        "legend": { "bottom": 0 },
        "color": colors,
        "series": [{
            "type": "pie",
            "radius": ["30%", "70%"],
            "data": data,
        }],
    })
}

fn holiday_marks(points: &[HolidayPoint]) -> Value {
    let data: Vec<Value> = points
        .iter()
        .map(|p| json!({ "coord": [p.x.to_string(), p.y], "value": "Holiday" }))
        .collect();
    json!({
        "symbol": "pin",
        "label": { "formatter": "Holiday" },
        "data": data,
    })
}

fn category_axis<K: ToString>(name: &str, groups: &[GroupSales<K>]) -> Value {
    let labels: Vec<String> = groups.iter().map(|g| g.key.to_string()).collect();
    json!({ "type": "category", "name": name, "data": labels })
}

fn values<K>(groups: &[GroupSales<K>]) -> Vec<f64> {
    groups.iter().map(|g| g.weekly_sales).collect()
}

pub fn sales_by_type_chart(dash: &Dashboard) -> Chart {
    let slices = dash
        .by_type
        .iter()
        .map(|g| (g.key.clone(), g.weekly_sales))
        .collect();
    Chart {
        id: "sales-by-type",
        options: donut("Predicted Sales by Type", slices, &TYPE_COLORS),
    }
}

pub fn sales_by_holiday_chart(dash: &Dashboard) -> Chart {
    let slices = dash
        .by_holiday
        .iter()
        .map(|g| (if g.key { "Holiday" } else { "Regular" }.to_string(), g.weekly_sales))
        .collect();
    Chart {
        id: "sales-by-holiday",
        options: donut("Predicted Sales by Holiday", slices, &HOLIDAY_COLORS),
    }
}

pub fn weekly_trend_chart(dash: &Dashboard) -> Chart {
    Chart {
        id: "weekly-trend",
        options: json!({
            "title": { "text": "Average Predicted Sales per Week" },
            "tooltip": { "trigger": "axis" },
            "xAxis": category_axis("Week", &dash.weekly_mean),
            "yAxis": { "type": "value", "name": "Value" },
            "series": [{
                "type": "line",
                "name": "Average Predicted Sales",
                "data": values(&dash.weekly_mean),
                "markPoint": holiday_marks(&dash.holiday_weeks),
            }],
        }),
    }
}

pub fn sales_by_store_chart(dash: &Dashboard) -> Chart {
    let labels: Vec<String> = dash.by_store.iter().map(|s| s.store.to_string()).collect();
    let data: Vec<f64> = dash.by_store.iter().map(|s| s.weekly_sales).collect();
    Chart {
        id: "sales-by-store",
        options: json!({
            "title": { "text": "Total Sales Predicted by Store" },
            "tooltip": { "trigger": "axis" },
            "xAxis": { "type": "category", "name": "Store", "data": labels },
            "yAxis": { "type": "value", "name": "Total Sales" },
            "series": [{ "type": "bar", "data": data }],
        }),
    }
}

pub fn sales_by_month_chart(dash: &Dashboard) -> Chart {
    Chart {
        id: "sales-by-month",
        options: json!({
            "title": { "text": "Total Sales Predicted by Month" },
            "tooltip": { "trigger": "axis" },
            "xAxis": category_axis("Month", &dash.by_month),
            "yAxis": { "type": "value", "name": "Total Sales" },
            "series": [{
                "type": "bar",
                "data": values(&dash.by_month),
                "markPoint": holiday_marks(&dash.holiday_months),
            }],
        }),
    }
}

/// Inline script initializing every chart once the page has loaded.
pub fn init_script(charts: &[&Chart]) -> String {
    let body = charts
        .iter()
        .map(|chart| {
            format!(
                "(function() {{\n  const el = document.getElementById({id});\n  if (!el) return;\n  const chart = echarts.init(el);\n  chart.setOption({options});\n  window.addEventListener('resize', () => chart.resize());\n}})();",
                id = Value::from(chart.id),
                // Keep user-supplied labels from closing the script element.
                options = chart.options.to_string().replace("</", "<\\/"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("document.addEventListener('DOMContentLoaded', function() {{\n{body}\n}});")
}
