use crate::models::{LocationEntry, Locations};
use crate::render::escape_html;
use serde::Serialize;
use std::collections::BTreeMap;

pub const MASTER_FILL: &str = "master";
const DEFAULT_FILL: &str = "defaultFill";

const PALETTE: [(&str, &str); 3] = [
    (DEFAULT_FILL, "#dddddd"),
    (MASTER_FILL, "#d42e3c"),
    ("donor", "#85b52d"),
];
const FALLBACK_COLOR: &str = "#facc38";

#[derive(Debug, Clone, Serialize)]
pub struct CountryView {
    #[serde(rename = "fillKey")]
    pub fill_key: String,
    pub messages: Vec<String>,
    pub tooltip: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldMapConfig {
    pub fills: BTreeMap<String, String>,
    pub data: BTreeMap<String, CountryView>,
}

pub fn build_world_map(mut locations: Locations, master_country: &str) -> WorldMapConfig {
    locations
        .entry(master_country.to_string())
        .or_insert_with(|| LocationEntry {
            fill_key: MASTER_FILL.to_string(),
            messages: None,
        })
        .fill_key = MASTER_FILL.to_string();

    let mut fills: BTreeMap<String, String> = PALETTE
        .iter()
        .map(|(key, color)| (key.to_string(), color.to_string()))
        .collect();

    let data = locations
        .into_iter()
        .map(|(code, entry)| {
            fills
                .entry(entry.fill_key.clone())
                .or_insert_with(|| FALLBACK_COLOR.to_string());
            let messages = entry.messages.unwrap_or_default();
            let view = CountryView {
                tooltip: tooltip_html(&messages),
                fill_key: entry.fill_key,
                messages,
            };
            (code, view)
        })
        .collect();

    WorldMapConfig { fills, data }
}

fn tooltip_html(messages: &[String]) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let items: String = messages
        .iter()
        .map(|message| format!("<li>{}</li>", escape_html(message)))
        .collect();
    format!("<ul>{items}</ul>")
}
