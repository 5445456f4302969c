use crate::config::MapView;
use crate::filters::{FilterState, ThingOp, NO_PRICE};
use crate::render::escape_html;

const PRICE_STEPS: [i64; 6] = [0, 200, 500, 1000, 2000, 5000];

pub fn render_map_page(filters: &FilterState, map: &MapView, session: u64) -> String {
    MAP_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{SESSION}}", &session.to_string())
        .replace("{{DARKY}}", checked(filters.darky))
        .replace("{{ZAZITKY}}", checked(filters.zazitky))
        .replace("{{OP_CONTAINS}}", selected(filters.thing_op == ThingOp::Contains))
        .replace("{{OP_EXCLUDES}}", selected(filters.thing_op == ThingOp::Excludes))
        .replace("{{PRICE_OPTIONS}}", &price_options(filters.price))
        .replace("{{MAP_CONFIG}}", &script_json(map))
        .replace("{{EXTRA_FIELDS}}", &extra_fields(filters))
        .replace("{{THING}}", &escape_html(&filters.thing))
}

pub fn render_stats_page() -> String {
    STATS_HTML.replace("{{STYLE}}", STYLE)
}

fn checked(flag: bool) -> &'static str {
    if flag { "checked" } else { "" }
}

fn selected(flag: bool) -> &'static str {
    if flag { "selected" } else { "" }
}

fn price_options(current: Option<i64>) -> String {
    let mut steps: Vec<i64> = PRICE_STEPS.to_vec();
    if let Some(price) = current.filter(|price| !steps.contains(price)) {
        steps.push(price);
        steps.sort_unstable();
    }

    let mut html = format!(
        "<option value=\"{NO_PRICE}\" {}>Jakákoli cena</option>",
        selected(current.is_none())
    );
    for step in steps {
        html.push_str(&format!(
            "<option value=\"{step}\" {}>od {step} Kč</option>",
            selected(current == Some(step))
        ));
    }
    html
}

// Incidental UI fields ride along as hidden inputs so the next capture keeps them.
fn extra_fields(filters: &FilterState) -> String {
    filters
        .extra
        .iter()
        .map(|(key, value)| {
            format!(
                "<input type=\"hidden\" name=\"{}\" value=\"{}\" />",
                escape_html(key),
                escape_html(value)
            )
        })
        .collect()
}

fn script_json(value: &impl serde::Serialize) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/")
}


const STYLE: &str = r#"
    :root {
      --bg-1: #f8f3e6;
      --ink: #2b2a28;
      --accent: #d42e3c;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.92);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg-1);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
    }

    header {
      padding: 14px 20px;
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
    }

    header h1 {
      margin: 0;
      font-size: 1.5rem;
    }

    header nav a {
      color: var(--accent-2);
      font-weight: 600;
    }

    .status {
      font-size: 0.9rem;
      color: #6b645d;
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }
"#;

const MAP_HTML: &str = r#"<!DOCTYPE html>
<html lang="cs">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Mapa přání</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
  <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.css" />
  <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.Default.css" />
  <style>
    {{STYLE}}

    #filters {
      display: flex;
      flex-wrap: wrap;
      gap: 12px 20px;
      align-items: center;
      padding: 0 20px 12px;
    }

    #map {
      height: calc(100vh - 140px);
      box-shadow: var(--shadow);
    }
  </style>
</head>
<body>
  <header>
    <h1>Mapa přání</h1>
    <nav><a href="/stats">Statistiky</a></nav>
    <div class="status" id="generatedon"></div>
  </header>

  <div class="status" id="headline"></div>

  <form id="filters" onsubmit="return false">
    <label><input id="cbDarky" name="darky" type="checkbox" {{DARKY}}> Dárky</label>
    <label><input id="cbZazitky" name="zazitky" type="checkbox" {{ZAZITKY}}> Zážitky</label>
    <select id="thingOp" name="thingOp">
      <option value="contains" {{OP_CONTAINS}}>obsahuje</option>
      <option value="excludes" {{OP_EXCLUDES}}>neobsahuje</option>
    </select>
    <input id="thing" name="thing" type="search" placeholder="např. kolo" value="{{THING}}" />
    <select id="price" name="price">{{PRICE_OPTIONS}}</select>
    {{EXTRA_FIELDS}}
  </form>

  <div id="map"></div>

  <script src="https://cdnjs.cloudflare.com/ajax/libs/moment.js/2.29.4/moment-with-locales.min.js"></script>
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <script src="https://unpkg.com/leaflet.markercluster@1.5.3/dist/leaflet.markercluster.js"></script>
  <script>
    moment.locale('cs');

    const config = {{MAP_CONFIG}};
    const session = {{SESSION}};
    const form = document.getElementById('filters');
    const statusEl = document.getElementById('generatedon');
    const headlineEl = document.getElementById('headline');

    const greenIcon = new L.Icon({
      iconUrl: 'https://cdn.jsdelivr.net/gh/pointhi/leaflet-color-markers@master/img/marker-icon-2x-green.png',
      shadowUrl: 'https://unpkg.com/leaflet@1.9.4/dist/images/marker-shadow.png',
      iconSize: [25, 41],
      iconAnchor: [12, 41],
      popupAnchor: [1, -34],
      shadowSize: [41, 41]
    });

    const map = L.map('map', { closePopupOnClick: !config.keep_popups_open })
      .setView(config.center, config.zoom);

    L.tileLayer(config.tile_url, {
      attribution: config.attribution,
      maxZoom: config.max_zoom,
      accessToken: config.access_token || undefined
    }).addTo(map);

    let drawn = [];

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const currentControls = () => {
      const params = new URLSearchParams();
      Array.from(form.elements).forEach((el) => {
        if (!el.name) {
          return;
        }
        params.append(el.name, el.type === 'checkbox' ? String(el.checked) : el.value);
      });
      return params;
    };

    const draw = (pass) => {
      drawn.forEach((layer) => map.removeLayer(layer));
      drawn = [];

      pass.layers.forEach((layer) => {
        const group = L.markerClusterGroup();
        layer.markers.forEach((item) => {
          const options = item.icon === 'experience' ? { icon: greenIcon } : {};
          L.marker(layer.coords, options)
            .bindPopup(item.popup, { autoClose: !config.keep_popups_open })
            .addTo(group);
        });
        map.addLayer(group);
        drawn.push(group);
      });

      const updated = moment(pass.generated_at, 'X').format('D. MMMM Y, H:mm');
      setStatus('Poslední aktualizace ' + updated + ', ' + pass.status, 'ok');
      headlineEl.textContent = pass.headline || '';
      history.replaceState(null, '', '?' + pass.query);
    };

    // Only the newest pass may draw; older responses are dropped.
    let latestRender = 0;
    let inflight = null;

    const render = async () => {
      const seq = ++latestRender;
      if (inflight) {
        inflight.abort();
      }
      inflight = new AbortController();
      const url = '/api/sessions/' + session + '/passes/' + seq + '?' + currentControls().toString();
      const res = await fetch(url, { signal: inflight.signal });
      if (seq !== latestRender) {
        return;
      }
      if (!res.ok) {
        throw new Error((await res.text()) || 'Nepodařilo se načíst data');
      }
      const pass = await res.json();
      if (seq !== latestRender) {
        return;
      }
      draw(pass);
    };

    const rerender = () =>
      render().catch((err) => {
        if (err.name !== 'AbortError') {
          setStatus(err.message, 'error');
        }
      });

    let typing = null;
    form.addEventListener('change', rerender);
    form.addEventListener('input', (event) => {
      if (event.target.type !== 'search') {
        return;
      }
      clearTimeout(typing);
      typing = setTimeout(rerender, 300);
    });

    rerender();
  </script>
</body>
</html>
"#;

const STATS_HTML: &str = r#"<!DOCTYPE html>
<html lang="cs">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Statistiky přání</title>
  <style>
    {{STYLE}}

    main {
      width: min(1100px, 100%);
      margin: 0 auto;
      padding: 0 18px 48px;
      display: grid;
      gap: 28px;
    }

    section {
      background: var(--card);
      border-radius: 20px;
      padding: 18px;
      box-shadow: var(--shadow);
    }

    section h2 {
      margin: 0 0 12px;
      font-size: 1.2rem;
    }

    .chart {
      width: 100%;
    }

    #world {
      position: relative;
      width: 100%;
      height: 520px;
    }
  </style>
</head>
<body>
  <header>
    <h1>Statistiky přání</h1>
    <nav><a href="/">Mapa</a></nav>
    <div class="status" id="generatedon"></div>
  </header>

  <main>
    <section>
      <h2>Poměr přání</h2>
      <canvas class="chart" id="wishes_stacked"></canvas>
    </section>
    <section>
      <h2>Počet přání</h2>
      <canvas class="chart" id="wishes_count"></canvas>
    </section>
    <section>
      <h2>Vybrané peníze <span id="money_total"></span></h2>
      <canvas class="chart" id="money"></canvas>
    </section>
    <section>
      <h2>Odkud se posílají dárky</h2>
      <div id="world"></div>
      <div class="status" id="world_status"></div>
    </section>
  </main>

  <script src="https://cdnjs.cloudflare.com/ajax/libs/moment.js/2.29.4/moment-with-locales.min.js"></script>
  <script src="https://cdnjs.cloudflare.com/ajax/libs/Chart.js/2.9.4/Chart.min.js"></script>
  <script src="https://cdnjs.cloudflare.com/ajax/libs/d3/3.5.17/d3.min.js"></script>
  <script src="https://cdnjs.cloudflare.com/ajax/libs/topojson/1.6.9/topojson.min.js"></script>
  <script src="https://cdnjs.cloudflare.com/ajax/libs/datamaps/0.5.9/datamaps.world.min.js"></script>
  <script>
    moment.locale('cs');

    const statusEl = document.getElementById('generatedon');
    const worldStatusEl = document.getElementById('world_status');

    const setStatus = (el, message, type) => {
      el.textContent = message;
      el.dataset.type = type || '';
    };

    document.querySelectorAll('.chart').forEach((el) => {
      el.style.height = ((el.clientWidth / 16 * 9) | 0) + 'px';
    });

    const groupDigits = (value) =>
      String(Math.round(value)).replace(/\B(?=(\d{3})+(?!\d))/g, ' ');

    const tickFormats = {
      percent: (value) => value + '%',
      big_num: (value) => groupDigits(value),
      money: (value) => groupDigits(value) + ' Kč'
    };

    const timeAxis = {
      type: 'time',
      time: {
        parser: (value) => moment(value, 'X'),
        unit: 'hour',
        displayFormats: { hour: 'D. MMM, H:mm' },
        tooltipFormat: 'D. MMMM, H:mm'
      }
    };

    const drawChart = (chart) => {
      const datasets = chart.datasets.map((ds) => ({
        label: ds.label,
        backgroundColor: ds.background_color,
        data: ds.data.map((p) => (p.t === undefined ? p.y : { t: p.t, y: p.y })),
        pointHoverRadius: 8,
        pointHoverBorderColor: 'grey',
        pointRadius: 0
      }));

      const ticks = { callback: tickFormats[chart.y_format] };
      if (chart.y_min !== null) {
        ticks.min = chart.y_min;
      }
      if (chart.y_max !== null) {
        ticks.max = chart.y_max;
      }

      new Chart(chart.canvas, {
        type: 'line',
        data: { datasets },
        options: {
          hover: { intersect: false },
          legend: { display: chart.legend },
          scales: {
            yAxes: [{ stacked: chart.stacked, ticks }],
            xAxes: [timeAxis]
          },
          tooltips: {
            mode: 'index',
            intersect: false,
            callbacks: {
              label: (item, data) =>
                data.datasets[item.datasetIndex].label + ': ' +
                chart.datasets[item.datasetIndex].data[item.index].label
            }
          }
        }
      });
    };

    // One chart per animation frame, strictly in order.
    const drawInFrames = (charts) => {
      if (!charts.length) {
        return;
      }
      requestAnimationFrame(() => {
        drawChart(charts[0]);
        drawInFrames(charts.slice(1));
      });
    };

    const loadCharts = async () => {
      const res = await fetch('/api/charts');
      if (!res.ok) {
        throw new Error((await res.text()) || 'Nepodařilo se načíst statistiky');
      }
      const payload = await res.json();
      setStatus(statusEl, 'Poslední aktualizace ' + moment(payload.generated_at, 'X').format('D. MMMM Y, H:mm'), 'ok');
      document.getElementById('money_total').textContent = payload.money_total ? '(' + payload.money_total + ')' : '';
      drawInFrames(payload.charts);
    };

    const loadWorld = async () => {
      const res = await fetch('/api/world');
      if (!res.ok) {
        throw new Error((await res.text()) || 'Nepodařilo se načíst mapu');
      }
      const world = await res.json();
      new Datamap({
        element: document.getElementById('world'),
        projection: 'mercator',
        fills: world.fills,
        data: world.data,
        geographyConfig: {
          popupTemplate: (geo, data) =>
            '<div class="hoverinfo"><strong>' + geo.properties.name + '</strong>' +
            (data ? data.tooltip : '') + '</div>'
        }
      });
    };

    loadCharts().catch((err) => setStatus(statusEl, err.message, 'error'));
    loadWorld().catch((err) => setStatus(worldStatusEl, err.message, 'error'));
  </script>
</body>
</html>
"#;
