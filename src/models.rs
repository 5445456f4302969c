use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WishKind {
    #[serde(rename = "dárek")]
    Gift,
    #[serde(rename = "zážitek")]
    Experience,
}

impl WishKind {
    pub fn slug(self) -> &'static str {
        match self {
            WishKind::Gift => "darek",
            WishKind::Experience => "zazitek",
        }
    }

    pub fn type_code(self) -> u8 {
        match self {
            WishKind::Gift => 2,
            WishKind::Experience => 3,
        }
    }
}

// Anything that is not an experience is treated as a gift.
impl<'de> Deserialize<'de> for WishKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(if raw == "zážitek" {
            WishKind::Experience
        } else {
            WishKind::Gift
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wish {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    pub place: String,
    pub thing: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub price: Option<(u64, u64)>,
    pub typ: WishKind,
}

impl Wish {
    // The scraper writes `0` when no age was given.
    pub fn age(&self) -> Option<u32> {
        self.age.filter(|age| *age > 0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(deserialize_with = "deserialize_coords")]
    pub coords: [f64; 2],
    #[serde(default)]
    pub wishes: Vec<Wish>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeadlineStats {
    pub money: Option<u64>,
    pub completed: Option<u64>,
    pub inprogress: Option<u64>,
    pub free: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub places: Vec<Place>,
    #[serde(default)]
    pub stats: Option<HeadlineStats>,
}

impl Dataset {
    pub fn wish_count(&self) -> usize {
        self.places.iter().map(|place| place.wishes.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub t: i64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MoneyEntry {
    Point(TimePoint),
    Bare(f64),
}

impl MoneyEntry {
    pub fn value(&self) -> f64 {
        match self {
            MoneyEntry::Point(point) => point.y,
            MoneyEntry::Bare(value) => *value,
        }
    }

    pub fn timestamp(&self) -> Option<i64> {
        match self {
            MoneyEntry::Point(point) => Some(point.t),
            MoneyEntry::Bare(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSeries {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub completed: Vec<TimePoint>,
    #[serde(default)]
    pub inprogress: Vec<TimePoint>,
    #[serde(default)]
    pub free: Vec<TimePoint>,
    #[serde(default)]
    pub money: Vec<MoneyEntry>,
}

impl StatsSeries {
    pub fn series(&self, key: &str) -> &[TimePoint] {
        match key {
            "completed" => &self.completed,
            "inprogress" => &self.inprogress,
            "free" => &self.free,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationEntry {
    #[serde(rename = "fillKey")]
    pub fill_key: String,
    #[serde(default)]
    pub messages: Option<Vec<String>>,
}

pub type Locations = BTreeMap<String, LocationEntry>;

#[derive(Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Number(f64),
    Text(String),
}

fn deserialize_coords<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[f64; 2], D::Error> {
    let [lat, lon] = <[Coordinate; 2]>::deserialize(deserializer)?;
    let parse = |coord: Coordinate| -> Result<f64, D::Error> {
        match coord {
            Coordinate::Number(value) => Ok(value),
            Coordinate::Text(text) => text.trim().parse::<f64>().map_err(|err| {
                serde::de::Error::custom(format!("bad coordinate {text:?}: {err}"))
            }),
        }
    };
    Ok([parse(lat)?, parse(lon)?])
}
