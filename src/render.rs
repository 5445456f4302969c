use crate::filters::{encode_component, FilterState, ThingOp};
use crate::models::{Dataset, HeadlineStats, Place, Wish, WishKind};
use crate::stats::format_big_num;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerIcon {
    Default,
    Experience,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub wish_id: u64,
    pub icon: MarkerIcon,
    pub popup: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterLayer {
    pub place: String,
    pub coords: [f64; 2],
    pub markers: Vec<Marker>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderPass {
    pub query: String,
    pub filters: FilterState,
    pub removed_layers: usize,
    pub layers: Vec<ClusterLayer>,
    pub shown: usize,
    pub total: usize,
    pub places: usize,
    pub generated_at: i64,
    pub status: String,
    pub headline: Option<String>,
}

pub struct MapSession {
    data: Arc<Dataset>,
    link_base: String,
    layers: Vec<ClusterLayer>,
}

impl MapSession {
    pub fn new(data: Arc<Dataset>, link_base: impl Into<String>) -> Self {
        Self {
            data,
            link_base: link_base.into(),
            layers: Vec::new(),
        }
    }

    pub fn layers(&self) -> &[ClusterLayer] {
        &self.layers
    }

    pub fn clear(&mut self) -> usize {
        let removed = self.layers.len();
        self.layers.clear();
        removed
    }

    pub fn render(&mut self, filters: &FilterState) -> RenderPass {
        let removed_layers = self.clear();

        for place in &self.data.places {
            let markers: Vec<Marker> = place
                .wishes
                .iter()
                .filter(|wish| matches_filters(wish, filters))
                .map(|wish| Marker {
                    wish_id: wish.id,
                    icon: match wish.typ {
                        WishKind::Experience => MarkerIcon::Experience,
                        WishKind::Gift => MarkerIcon::Default,
                    },
                    popup: format_wish(wish, &self.link_base),
                })
                .collect();

            if markers.is_empty() {
                continue;
            }
            self.layers.push(ClusterLayer {
                place: place_label(place),
                coords: place.coords,
                markers,
            });
        }

        let shown = self.layers.iter().map(|layer| layer.markers.len()).sum();
        let total = self.data.wish_count();
        let places = self.data.places.len();
        let status = format!("{places} míst, {total} přání. Zobrazeno {shown} z {total}.");

        RenderPass {
            query: filters.to_query(),
            filters: filters.clone(),
            removed_layers,
            layers: self.layers.clone(),
            shown,
            total,
            places,
            generated_at: self.data.timestamp.timestamp(),
            status,
            headline: self.data.stats.as_ref().and_then(headline),
        }
    }
}

pub fn matches_filters(wish: &Wish, filters: &FilterState) -> bool {
    matches_text(wish, filters) && matches_price(wish, filters) && matches_category(wish, filters)
}

fn matches_text(wish: &Wish, filters: &FilterState) -> bool {
    if !filters.has_text_filter() {
        return true;
    }
    let contained = wish.thing.to_lowercase().contains(&filters.thing);
    match filters.thing_op {
        ThingOp::Contains => contained,
        ThingOp::Excludes => !contained,
    }
}

fn matches_price(wish: &Wish, filters: &FilterState) -> bool {
    match (filters.price, wish.price) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(wanted), Some((min, _))) => i64::try_from(min).is_ok_and(|min| min == wanted),
    }
}

fn matches_category(wish: &Wish, filters: &FilterState) -> bool {
    match wish.typ {
        WishKind::Experience => filters.zazitky,
        WishKind::Gift => filters.darky,
    }
}

pub fn format_wish(wish: &Wish, link_base: &str) -> String {
    let mut html = String::new();
    html.push_str(&format!("<div><b>{}</b>", escape_html(&wish.name)));
    if let Some(age) = wish.age() {
        html.push_str(&format!(", {age} let"));
    }
    html.push_str(&format!(
        "<b style=\"float: right\">{}</b></div>",
        escape_html(&wish.place)
    ));
    html.push_str(&format!("<h4>{}</h4>", escape_html(&wish.thing)));
    if let Some((min, max)) = wish.price {
        html.push_str(&format!("<div>{min} až {max} Kč</div>"));
    }
    html.push_str(&format!("<p>{}</p>", escape_html(&wish.text)));
    html.push_str(&format!(
        "<a href=\"{}\" target=\"_blank\">CHCI VĚNOVAT...</a>",
        escape_html(&wish_link(wish, link_base))
    ));
    html
}

pub fn wish_link(wish: &Wish, link_base: &str) -> String {
    format!(
        "{}/{}/?type={}&town={}&fulltext={}",
        link_base.trim_end_matches('/'),
        wish.typ.slug(),
        wish.typ.type_code(),
        encode_component(&wish.place),
        encode_component(&wish.thing),
    )
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn place_label(place: &Place) -> String {
    place
        .name
        .clone()
        .or_else(|| place.wishes.first().map(|wish| wish.place.clone()))
        .unwrap_or_default()
}

pub fn headline(stats: &HeadlineStats) -> Option<String> {
    let parts: Vec<String> = [
        stats.completed.map(|n| format!("splněno {} přání", format_big_num(n as i64))),
        stats.inprogress.map(|n| format!("plní se {}", format_big_num(n as i64))),
        stats.free.map(|n| format!("čeká {}", format_big_num(n as i64))),
        stats.money.map(|n| format!("věnováno {} Kč", format_big_num(n as i64))),
    ]
    .into_iter()
    .flatten()
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    const BASE: &str = "https://example.org/prani";

    fn wish(id: u64, thing: &str, price: Option<(u64, u64)>, typ: WishKind) -> Wish {
        Wish {
            id,
            name: format!("Babička {id}"),
            age: Some(80),
            place: "Brno".to_string(),
            thing: thing.to_string(),
            text: "Moc by mě to potěšilo.".to_string(),
            price,
            typ,
        }
    }

    fn dataset() -> Arc<Dataset> {
        Arc::new(Dataset {
            timestamp: DateTime::from_timestamp(1_607_176_800, 0).unwrap(),
            places: vec![
                Place {
                    name: Some("Brno".to_string()),
                    coords: [49.19, 16.61],
                    wishes: vec![
                        wish(1, "Kolo", Some((500, 1000)), WishKind::Gift),
                        wish(2, "Helma na kolo", Some((200, 500)), WishKind::Gift),
                        wish(3, "Výlet do ZOO", None, WishKind::Experience),
                    ],
                },
                Place {
                    name: Some("Praha".to_string()),
                    coords: [50.08, 14.43],
                    wishes: vec![
                        wish(4, "Deka", Some((200, 500)), WishKind::Gift),
                        wish(5, "Koncert", Some((500, 1000)), WishKind::Experience),
                    ],
                },
            ],
            stats: None,
        })
    }

    fn shown_ids(pass: &RenderPass) -> Vec<u64> {
        let mut ids: Vec<u64> = pass
            .layers
            .iter()
            .flat_map(|layer| layer.markers.iter().map(|marker| marker.wish_id))
            .collect();
        ids.sort_unstable();
        ids
    }

    fn render(query: &str) -> RenderPass {
        let mut session = MapSession::new(dataset(), BASE);
        session.render(&FilterState::from_query(query))
    }

    #[test]
    fn default_filters_show_everything() {
        let pass = render("");
        assert_eq!(shown_ids(&pass), vec![1, 2, 3, 4, 5]);
        assert_eq!(pass.total, 5);
        assert_eq!(pass.places, 2);
        assert_eq!(pass.layers.len(), 2);
    }

    #[test]
    fn marker_count_equals_wishes_passing_all_predicates() {
        let data = dataset();
        for query in [
            "thing=kolo",
            "price=500",
            "darky=false",
            "zazitky=false&price=200",
            "thingOp=excludes&thing=kolo&price=500",
        ] {
            let filters = FilterState::from_query(query);
            let expected = data
                .places
                .iter()
                .flat_map(|place| place.wishes.iter())
                .filter(|wish| matches_filters(wish, &filters))
                .count();
            let mut session = MapSession::new(Arc::clone(&data), BASE);
            let pass = session.render(&filters);
            assert_eq!(pass.shown, expected, "query {query}");
            assert_eq!(shown_ids(&pass).len(), expected, "query {query}");
        }
        assert_eq!(shown_ids(&render("price=500")), vec![1, 5]);
        assert_eq!(shown_ids(&render("darky=false")), vec![3, 5]);
    }

    #[test]
    fn excludes_is_complement_of_contains() {
        for (rest, thing) in [
            ("", "kolo"),
            ("&price=500", "kolo"),
            ("&darky=false", "koncert"),
            ("&price=500&darky=false", "koncert"),
            ("&zazitky=false&price=200", "helma"),
        ] {
            let base = shown_ids(&render(rest));
            let contains = shown_ids(&render(&format!("thingOp=contains&thing={thing}{rest}")));
            let excludes = shown_ids(&render(&format!("thingOp=excludes&thing={thing}{rest}")));
            let mut union: Vec<u64> = contains.iter().chain(excludes.iter()).copied().collect();
            union.sort_unstable();
            assert_eq!(union, base, "filters {rest} thing {thing}");
            assert!(
                contains.iter().all(|id| !excludes.contains(id)),
                "filters {rest} thing {thing}"
            );
        }
        assert_eq!(shown_ids(&render("thing=kolo")), vec![1, 2]);
        assert_eq!(shown_ids(&render("thingOp=excludes&thing=koncert&price=500&darky=false")), Vec::<u64>::new());
        assert_eq!(shown_ids(&render("thingOp=excludes&thing=kolo&price=500")), vec![5]);
    }

    #[test]
    fn wish_without_price_never_matches_price_filter() {
        for price in ["0", "200", "500", "1000"] {
            let ids = shown_ids(&render(&format!("price={price}")));
            assert!(!ids.contains(&3), "price {price}");
        }
        assert!(shown_ids(&render("price=-1")).contains(&3));
    }

    #[test]
    fn rerender_removes_previous_layers() {
        let mut session = MapSession::new(dataset(), BASE);
        let first = session.render(&FilterState::from_query("price=500"));
        assert_eq!(first.removed_layers, 0);
        assert_eq!(first.layers.len(), 2);

        let second = session.render(&FilterState::from_query("price=200"));
        assert_eq!(second.removed_layers, 2);
        assert_eq!(shown_ids(&second), vec![2, 4]);
        assert_eq!(session.layers().len(), second.layers.len());
        let drawn: usize = session.layers().iter().map(|layer| layer.markers.len()).sum();
        assert_eq!(drawn, 2);
    }

    #[test]
    fn empty_layers_are_not_attached() {
        let pass = render("thing=deka");
        assert_eq!(pass.layers.len(), 1);
        assert_eq!(pass.layers[0].place, "Praha");
    }

    #[test]
    fn experiences_get_their_own_icon() {
        let pass = render("darky=false");
        assert!(
            pass.layers
                .iter()
                .flat_map(|layer| &layer.markers)
                .all(|marker| marker.icon == MarkerIcon::Experience)
        );
    }

    #[test]
    fn popup_contains_escaped_fields_and_link() {
        let mut gift = wish(7, "Auto <RC>", Some((100, 300)), WishKind::Gift);
        gift.place = "Ústí nad Labem".to_string();
        let html = format_wish(&gift, BASE);
        assert!(html.starts_with("<div><b>Babička 7</b>, 80 let<b style=\"float: right\">Ústí nad Labem</b></div>"));
        assert!(html.contains("<h4>Auto &lt;RC&gt;</h4>"));
        assert!(html.contains("<div>100 až 300 Kč</div>"));
        assert!(html.contains(
            "href=\"https://example.org/prani/darek/?type=2&amp;town=%C3%9Ast%C3%AD%20nad%20Labem&amp;fulltext=Auto%20%3CRC%3E\""
        ));
    }

    #[test]
    fn popup_omits_missing_age_and_price() {
        let mut trip = wish(8, "Výlet", None, WishKind::Experience);
        trip.age = Some(0);
        let html = format_wish(&trip, BASE);
        assert!(!html.contains(" let"));
        assert!(!html.contains("Kč"));
        assert!(wish_link(&trip, BASE).starts_with("https://example.org/prani/zazitek/?type=3&"));
    }

    #[test]
    fn status_line_reports_filtered_counts() {
        let pass = render("thing=kolo");
        assert_eq!(pass.status, "2 míst, 5 přání. Zobrazeno 2 z 5.");
        assert_eq!(pass.generated_at, 1_607_176_800);
        assert_eq!(pass.headline, None);
        assert_eq!(
            pass.query,
            "darky=true&zazitky=true&thingOp=contains&thing=kolo&price=-1"
        );
    }

    #[test]
    fn headline_lists_known_totals() {
        let stats = HeadlineStats {
            money: Some(1_234_567),
            completed: Some(12_000),
            inprogress: None,
            free: Some(40),
        };
        assert_eq!(
            headline(&stats).as_deref(),
            Some("splněno 12 000 přání, čeká 40, věnováno 1 234 567 Kč")
        );
        assert_eq!(headline(&HeadlineStats::default()), None);

        let mut data = (*dataset()).clone();
        data.stats = Some(stats);
        let pass = MapSession::new(Arc::new(data), BASE).render(&FilterState::default());
        assert!(pass.headline.is_some_and(|line| line.starts_with("splněno 12 000")));
    }
}
