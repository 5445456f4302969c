use crate::models::{StatsSeries, TimePoint};
use serde::Serialize;

pub struct WishCategory {
    pub key: &'static str,
    pub label: &'static str,
    pub color: &'static str,
}

pub static WISH_CATEGORIES: [WishCategory; 3] = [
    WishCategory {
        key: "completed",
        label: "Splněná přání",
        color: "#85b52d",
    },
    WishCategory {
        key: "inprogress",
        label: "Přání, která se plní",
        color: "#facc38",
    },
    WishCategory {
        key: "free",
        label: "Přání, která můžete plnit",
        color: "#d42e3c",
    },
];

const MONEY_LABEL: &str = "Peníze";
const MONEY_COLOR: &str = "#5bc0de";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisFormat {
    Percent,
    BigNum,
    Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartPoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<i64>,
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartDataset {
    pub label: &'static str,
    pub background_color: &'static str,
    pub data: Vec<ChartPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartConfig {
    pub canvas: &'static str,
    pub stacked: bool,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub y_format: AxisFormat,
    pub legend: bool,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartsResponse {
    pub generated_at: i64,
    pub money_total: Option<String>,
    // proportions, counts, money
    pub charts: Vec<ChartConfig>,
}

pub fn build_charts(stats: &StatsSeries) -> ChartsResponse {
    let money_total = stats
        .money
        .last()
        .map(|entry| format!("{} Kč", format_big_num(entry.value().round() as i64)));

    ChartsResponse {
        generated_at: stats.timestamp.timestamp(),
        money_total,
        charts: vec![
            proportions_chart(stats),
            counts_chart(stats),
            money_chart(stats),
        ],
    }
}

fn common_len(stats: &StatsSeries) -> usize {
    WISH_CATEGORIES
        .iter()
        .map(|cat| stats.series(cat.key).len())
        .min()
        .unwrap_or(0)
}

fn category_series(stats: &StatsSeries) -> Vec<(&'static WishCategory, &[TimePoint])> {
    let len = common_len(stats);
    WISH_CATEGORIES
        .iter()
        .map(|cat| (cat, &stats.series(cat.key)[..len]))
        .collect()
}

pub fn proportions_chart(stats: &StatsSeries) -> ChartConfig {
    let series = category_series(stats);
    let len = common_len(stats);
    let totals: Vec<f64> = (0..len)
        .map(|i| series.iter().map(|(_, points)| points[i].y).sum::<f64>())
        .collect();

    let datasets = series
        .iter()
        .map(|(cat, points)| ChartDataset {
            label: cat.label,
            background_color: cat.color,
            data: points
                .iter()
                .zip(&totals)
                .map(|(point, total)| {
                    let y = if *total == 0.0 { 0.0 } else { point.y / total * 100.0 };
                    ChartPoint {
                        t: Some(point.t),
                        y,
                        label: format!("{y:.1}%"),
                    }
                })
                .collect(),
        })
        .collect();

    ChartConfig {
        canvas: "wishes_stacked",
        stacked: true,
        y_min: Some(0.0),
        y_max: Some(100.0),
        y_format: AxisFormat::Percent,
        legend: true,
        datasets,
    }
}

pub fn counts_chart(stats: &StatsSeries) -> ChartConfig {
    let datasets = category_series(stats)
        .into_iter()
        .map(|(cat, points)| ChartDataset {
            label: cat.label,
            background_color: cat.color,
            data: points
                .iter()
                .map(|point| ChartPoint {
                    t: Some(point.t),
                    y: point.y,
                    label: format_big_num(point.y.round() as i64),
                })
                .collect(),
        })
        .collect();

    ChartConfig {
        canvas: "wishes_count",
        stacked: true,
        y_min: None,
        y_max: None,
        y_format: AxisFormat::BigNum,
        legend: true,
        datasets,
    }
}

pub fn money_chart(stats: &StatsSeries) -> ChartConfig {
    let data = stats
        .money
        .iter()
        .map(|entry| ChartPoint {
            t: entry.timestamp(),
            y: entry.value(),
            label: format!("{} Kč", format_big_num(entry.value().round() as i64)),
        })
        .collect();

    ChartConfig {
        canvas: "money",
        stacked: true,
        y_min: None,
        y_max: None,
        y_format: AxisFormat::Money,
        legend: false,
        datasets: vec![ChartDataset {
            label: MONEY_LABEL,
            background_color: MONEY_COLOR,
            data,
        }],
    }
}

pub fn format_big_num(num: i64) -> String {
    let digits = num.unsigned_abs().to_string();
    let mut groups = Vec::with_capacity(digits.len() / 3 + 1);
    let mut end = digits.len();
    while end > 3 {
        groups.push(&digits[end - 3..end]);
        end -= 3;
    }
    groups.push(&digits[..end]);
    groups.reverse();

    let joined = groups.join(" ");
    if num < 0 { format!("-{joined}") } else { joined }
}
