use std::{env, path::PathBuf};

pub const DEFAULT_LINK_BASE: &str = "https://jeziskovavnoucata.rozhlas.cz/prani";
pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_MASTER_COUNTRY: &str = "CZE";
pub const DEFAULT_MAX_SESSIONS: usize = 512;

#[derive(Debug, Clone, serde::Serialize)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: u8,
    pub max_zoom: u8,
    pub tile_url: String,
    pub access_token: Option<String>,
    pub attribution: String,
    pub keep_popups_open: bool,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: [49.7437572, 15.3386383],
            zoom: 8,
            max_zoom: 18,
            tile_url: DEFAULT_TILE_URL.to_string(),
            access_token: None,
            attribution: "Map data &copy; <a href=\"https://www.openstreetmap.org/\">OpenStreetMap</a> contributors, <a href=\"https://creativecommons.org/licenses/by-sa/2.0/\">CC-BY-SA</a>".to_string(),
            keep_popups_open: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub link_base: String,
    pub master_country: String,
    pub max_sessions: usize,
    pub map: MapView,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            data_dir: PathBuf::from("data"),
            link_base: DEFAULT_LINK_BASE.to_string(),
            master_country: DEFAULT_MASTER_COUNTRY.to_string(),
            max_sessions: DEFAULT_MAX_SESSIONS,
            map: MapView::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let mut map = defaults.map;
        if let Some(url) = lookup("WISH_TILE_URL") {
            map.tile_url = url;
        }
        map.access_token = lookup("WISH_TILE_TOKEN").filter(|token| !token.is_empty());

        Self {
            port: lookup("PORT")
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(defaults.port),
            data_dir: lookup("WISH_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            link_base: lookup("WISH_LINK_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(defaults.link_base),
            master_country: lookup("WISH_MASTER_COUNTRY")
                .map(|code| code.trim().to_uppercase())
                .filter(|code| !code.is_empty())
                .unwrap_or(defaults.master_country),
            max_sessions: lookup("WISH_MAX_SESSIONS")
                .and_then(|value| value.parse::<usize>().ok())
                .filter(|max| *max > 0)
                .unwrap_or(defaults.max_sessions),
            map,
        }
    }
}
