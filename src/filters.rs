use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

// Characters `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const NO_PRICE: i64 = -1;

const FILTER_KEYS: [&str; 5] = ["darky", "zazitky", "thingOp", "thing", "price"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThingOp {
    #[default]
    Contains,
    Excludes,
}

impl ThingOp {
    pub fn as_str(self) -> &'static str {
        match self {
            ThingOp::Contains => "contains",
            ThingOp::Excludes => "excludes",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "contains" => Some(ThingOp::Contains),
            "excludes" => Some(ThingOp::Excludes),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub darky: bool,
    pub zazitky: bool,
    #[serde(rename = "thingOp")]
    pub thing_op: ThingOp,
    pub thing: String,
    pub price: Option<i64>,
    pub extra: Vec<(String, String)>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            darky: true,
            zazitky: true,
            thing_op: ThingOp::Contains,
            thing: String::new(),
            price: None,
            extra: Vec::new(),
        }
    }
}

impl FilterState {
    pub fn from_query(query: &str) -> Self {
        Self::capture(parse_pairs(query))
    }

    pub fn capture<K, V>(controls: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut state = Self::default();
        for (key, value) in controls {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "darky" => {
                    if let Some(flag) = parse_flag(value) {
                        state.darky = flag;
                    }
                }
                "zazitky" => {
                    if let Some(flag) = parse_flag(value) {
                        state.zazitky = flag;
                    }
                }
                "thingOp" => {
                    if let Some(op) = ThingOp::parse(value) {
                        state.thing_op = op;
                    }
                }
                "thing" => state.thing = value.trim().to_lowercase(),
                "price" => state.price = parse_price(value),
                _ => {
                    if !state.extra.iter().any(|(existing, _)| existing == key) {
                        state.extra.push((key.to_string(), value.to_string()));
                    }
                }
            }
        }
        state
    }

    pub fn to_query(&self) -> String {
        let price = self.price.unwrap_or(NO_PRICE).to_string();
        let fixed = [
            ("darky", bool_str(self.darky)),
            ("zazitky", bool_str(self.zazitky)),
            ("thingOp", self.thing_op.as_str()),
            ("thing", self.thing.as_str()),
            ("price", price.as_str()),
        ];
        fixed
            .into_iter()
            .chain(
                self.extra
                    .iter()
                    .filter(|(key, _)| !FILTER_KEYS.contains(&key.as_str()))
                    .map(|(key, value)| (key.as_str(), value.as_str())),
            )
            .map(|(key, value)| format!("{}={}", encode_component(key), encode_component(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn has_text_filter(&self) -> bool {
        !self.thing.is_empty()
    }
}

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

fn parse_pairs(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            Some((decode_component(key)?, decode_component(value)?))
        })
        .collect()
}

fn decode_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "true" | "1" | "on" => Some(true),
        "false" | "0" | "off" => Some(false),
        _ => None,
    }
}

fn parse_price(value: &str) -> Option<i64> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|price| *price != NO_PRICE)
}

fn bool_str(flag: bool) -> &'static str {
    if flag { "true" } else { "false" }
}
