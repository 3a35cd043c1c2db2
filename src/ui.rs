use crate::models::{PlaybackStatus, StatsSummary, ViewResponse};
use crate::overlay::Shape;
use v_htmlescape::escape;

pub fn render_index(view: &ViewResponse) -> String {
    let notice = match (&view.catalog_error, view.timeline_visible) {
        (Some(err), _) => format!(
            r#"<p class="notice error">Dates unavailable: {}</p>"#,
            escape(err)
        ),
        (None, false) => r#"<p class="notice">No dates available.</p>"#.to_string(),
        (None, true) => String::new(),
    };
    let fetch_error = view
        .fetch_error
        .as_deref()
        .map(|err| format!(r#"<span class="fetch-error">{}</span>"#, escape(err)))
        .unwrap_or_default();
    let stats = view.stats.as_ref().map(render_stats_panel).unwrap_or_default();
    let refresh = view.playback == PlaybackStatus::Playing || view.loading;

    INDEX_HTML
        .replace("{{NOTICE}}", &notice)
        .replace(
            "{{TIMELINE_HIDDEN}}",
            if view.timeline_visible { "" } else { "hidden" },
        )
        .replace("{{GLYPH}}", &view.playback_glyph)
        .replace("{{SLIDER_MAX}}", &view.slider_max.to_string())
        .replace("{{SLIDER_VALUE}}", &view.current_index.to_string())
        .replace("{{DATE_LABEL}}", &escape(&view.date_label).to_string())
        .replace("{{DATE_VALUE}}", &escape(view.current_date.as_deref().unwrap_or("")).to_string())
        .replace("{{FETCH_ERROR}}", &fetch_error)
        .replace("{{STATS}}", &stats)
        .replace("{{ACTUAL_CHECKED}}", checked(view.layers.actual))
        .replace("{{PREDICTED_CHECKED}}", checked(view.layers.predicted))
        .replace("{{SHAPE_COUNT}}", &view.shapes.len().to_string())
        .replace("{{SHAPES}}", &render_shapes(&view.shapes))
        .replace("{{AUTO_REFRESH}}", if refresh { "true" } else { "false" })
}

pub fn render_stats_panel(stats: &StatsSummary) -> String {
    let rows = [
        ("Total Regions:", "", stats.total),
        ("Actual Cases:", "actual-cases", stats.actual_positive),
        ("Predicted Cases:", "predicted-cases", stats.predicted_positive),
        ("High Risk (≥50%):", "high-risk", stats.high_risk),
        ("Medium Risk (20-50%):", "medium-risk", stats.medium_risk),
    ];

    let mut html = String::from("<h4>Statistics</h4>\n");
    for (label, class, value) in rows {
        html.push_str(&format!(
            r#"<div class="stat-item"><span class="stat-label">{label}</span><span class="stat-value {class}">{value}</span></div>"#
        ));
        html.push('\n');
    }
    html
}

fn render_shapes(shapes: &[Shape]) -> String {
    shapes
        .iter()
        .map(|shape| {
            let style = shape.style();
            let kind = match shape {
                Shape::Region { .. } => "region".to_string(),
                Shape::Marker { layer, radius, .. } => format!("{layer:?} marker, {radius:.0} m"),
            };
            format!(
                r#"<li><span class="swatch" style="border:{weight}px solid {color};background:{fill};opacity:{opacity}"></span><code>{id}</code> <small>{kind}</small><details>{popup}</details></li>"#,
                weight = style.weight,
                color = style.color,
                fill = style.fill_color,
                opacity = style.fill_opacity.max(0.3),
                id = escape(shape.region_id()),
                kind = kind,
                popup = shape.popup(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn checked(on: bool) -> &'static str {
    if on { "checked" } else { "" }
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Case Risk Timeline</title>
  <style>
    :root {
      --ink: #22303c;
      --muted: #66727d;
      --card: #ffffff;
      --accent: #d64545;
      --accent-2: #3b6ea8;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: #eef2f5;
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 24px;
    }

    .app {
      max-width: 960px;
      margin: 0 auto;
      display: grid;
      gap: 18px;
    }

    .card {
      background: var(--card);
      border-radius: 14px;
      box-shadow: 0 10px 30px rgba(34, 48, 60, 0.12);
      padding: 18px 22px;
    }

    .timeline {
      display: flex;
      align-items: center;
      gap: 14px;
    }

    .timeline input[type="range"] {
      flex: 1;
    }

    #current-date {
      font-weight: 600;
      min-width: 110px;
    }

    .notice.error,
    .fetch-error {
      color: var(--accent);
    }

    .stat-item {
      display: flex;
      justify-content: space-between;
      padding: 4px 0;
    }

    .actual-cases { color: var(--accent); }
    .predicted-cases { color: var(--accent-2); }
    .high-risk { color: #b00020; }
    .medium-risk { color: #c77700; }

    .overlay ul {
      list-style: none;
      padding: 0;
      margin: 0;
      display: grid;
      gap: 6px;
    }

    .swatch {
      display: inline-block;
      width: 18px;
      height: 18px;
      margin-right: 8px;
      vertical-align: middle;
    }

    small {
      color: var(--muted);
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Case Risk Timeline</h1>
      {{NOTICE}}
    </header>

    <section class="card timeline" {{TIMELINE_HIDDEN}}>
      <form method="post" action="/timeline/toggle">
        <button id="play-pause" type="submit">{{GLYPH}}</button>
      </form>
      <form id="seek-form" method="post" action="/timeline/seek" class="timeline">
        <input id="timeline-slider" type="range" name="index" min="0" max="{{SLIDER_MAX}}" value="{{SLIDER_VALUE}}" />
        <noscript><button type="submit">Go</button></noscript>
      </form>
      <input id="date-picker" type="date" value="{{DATE_VALUE}}" />
      <span id="current-date">{{DATE_LABEL}}</span>
      {{FETCH_ERROR}}
    </section>

    <section class="card" id="stats-panel">
      {{STATS}}
    </section>

    <section class="card">
      <form method="post" action="/timeline/layers">
        <label><input id="actual-layer-checkbox" type="checkbox" name="actual" {{ACTUAL_CHECKED}} /> Actual cases</label>
        <label><input id="predicted-layer-checkbox" type="checkbox" name="predicted" {{PREDICTED_CHECKED}} /> Predicted cases</label>
        <button type="submit">Apply</button>
      </form>
    </section>

    <section class="card overlay">
      <h4>Overlay ({{SHAPE_COUNT}} shapes)</h4>
      <ul>
{{SHAPES}}
      </ul>
    </section>
  </main>

  <script>
    const slider = document.getElementById('timeline-slider');
    const picker = document.getElementById('date-picker');

    slider.addEventListener('change', () => {
      document.getElementById('seek-form').submit();
    });

    picker.addEventListener('change', async () => {
      const res = await fetch('/api/seek', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ date: picker.value })
      });
      if (!res.ok) {
        alert(await res.text());
      }
      location.reload();
    });

    if ({{AUTO_REFRESH}}) {
      setTimeout(() => location.reload(), 500);
    }
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LayerVisibility;

    fn view() -> ViewResponse {
        ViewResponse {
            enabled: true,
            timeline_visible: true,
            catalog_error: None,
            date_count: 2,
            slider_max: 1,
            current_index: 0,
            current_date: Some("2021-01-01".to_string()),
            date_label: "2021-01-01".to_string(),
            playback: PlaybackStatus::Stopped,
            playback_glyph: PlaybackStatus::Stopped.glyph().to_string(),
            loading: false,
            fetch_error: None,
            rendered_date: Some("2021-01-01".to_string()),
            overlay_revision: 1,
            stats: Some(StatsSummary {
                total: 3,
                actual_positive: 2,
                predicted_positive: 1,
                ..StatsSummary::default()
            }),
            layers: LayerVisibility::default(),
            shapes: Vec::new(),
        }
    }

    #[test]
    fn page_reflects_view() {
        let html = render_index(&view());
        assert!(html.contains(r#"max="1" value="0""#));
        assert!(html.contains(r#"<span id="current-date">2021-01-01</span>"#));
        assert!(html.contains("▶️"));
        assert!(html.contains(r#"<span class="stat-value actual-cases">2</span>"#));
        assert!(html.contains("if (false)"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn disabled_viewer_hides_timeline() {
        let mut disabled = view();
        disabled.enabled = false;
        disabled.timeline_visible = false;
        disabled.catalog_error = Some("date catalog responded with status 503".to_string());
        let html = render_index(&disabled);
        assert!(html.contains(r#"<section class="card timeline" hidden>"#));
        assert!(html.contains("Dates unavailable: date catalog responded with status 503"));
    }
}
