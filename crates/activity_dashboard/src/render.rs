//! Self-contained HTML dashboard rendering.
//!
//! The page embeds the full report model as JSON and draws charts client side
//! with Chart.js. Tables are rendered server side so the page stays readable
//! when the CDN script cannot load.

use std::fmt::Write as _;

use activity_stats::model::{ActivityRow, ReportModel, Summary, TypeBreakdown};
use activity_stats::utils::format_duration;
use activity_stats::YearScope;

use crate::error::DashboardResult;

const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js";

/// Render the complete dashboard page.
pub fn render_html(report: &ReportModel) -> DashboardResult<String> {
    let data = embed_json(report)?;
    let summary = &report.summary;

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Activity Report</title>
<script src="{cdn}"></script>
<style>
{css}
</style>
</head>
<body>
<main class="container">
<header>
<h1>Activity Report</h1>
<p class="subtitle">{scope}</p>
</header>
{cards}
<section class="chart-grid">
<div class="chart-box"><h2>Monthly Distance</h2><div class="chart-wrap"><canvas id="monthly-chart"></canvas></div></div>
<div class="chart-box"><h2>Cumulative Distance</h2><div class="chart-wrap"><canvas id="cumulative-chart"></canvas></div></div>
<div class="chart-box"><h2>Heart Rate Zones{filter}</h2><div class="chart-wrap"><canvas id="zones-chart"></canvas></div></div>
<div class="chart-box"><h2>Cadence Distribution{filter}</h2><div class="chart-wrap"><canvas id="cadence-chart"></canvas></div></div>
<div class="chart-box wide"><h2>Pace vs Heart Rate{filter}</h2><div class="chart-wrap"><canvas id="pace-hr-chart"></canvas></div></div>
</section>
<section class="boards">
{top_distance}
{top_climb}
</section>
{types}
{activities}
</main>
<footer>Generated {generated} &middot; HR zones use max {max_hr} / rest {rest_hr} bpm</footer>
<script id="report-data" type="application/json">{data}</script>
<script>
{js}
</script>
</body>
</html>
"#,
        cdn = CHART_JS_CDN,
        css = DASHBOARD_CSS,
        scope = html_escape(&scope_description(summary)),
        cards = render_summary_cards(summary),
        filter = filter_suffix(summary),
        top_distance = render_leaderboard(
            "Longest Activities",
            "Distance (km)",
            &report.top_distance,
            |row| format!("{:.2}", row.distance_km),
        ),
        top_climb = render_leaderboard(
            "Biggest Climbs",
            "Ascent (m)",
            &report.top_climb,
            |row| format!("{:.0}", row.elevation_gain_m),
        ),
        types = render_type_table(&report.activity_types),
        activities = render_activity_table(&report.activities),
        generated = html_escape(&report.generated_at),
        max_hr = summary.max_hr,
        rest_hr = summary.rest_hr,
        data = data,
        js = DASHBOARD_JS,
    ))
}

/// Serialize the model for a `<script type="application/json">` block.
///
/// `<`, `>` and `&` only occur inside JSON strings, so the unicode escapes
/// keep the payload identical after `JSON.parse` while making a literal
/// `</script>` in an activity title harmless.
fn embed_json(report: &ReportModel) -> DashboardResult<String> {
    let json = serde_json::to_string(report)?;
    Ok(json
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}

fn scope_description(summary: &Summary) -> String {
    match (summary.year_scope, summary.scope_year) {
        (YearScope::AllYears, _) => "All years, cumulative distance across the whole history".into(),
        (YearScope::PerYear, _) => "All years, cumulative distance resets every January".into(),
        (YearScope::LatestYear, Some(year)) => format!("Monthly and cumulative distance for {year}"),
        (YearScope::LatestYear, None) => "Latest year".into(),
    }
}

fn filter_suffix(summary: &Summary) -> String {
    summary
        .sport_filter
        .as_deref()
        .map(|f| format!(" <span class=\"tag\">{}</span>", html_escape(f)))
        .unwrap_or_default()
}

fn render_summary_cards(summary: &Summary) -> String {
    let mut cards = vec![
        card("Activities", &summary.total_activities.to_string()),
        card("Distance", &format!("{:.1} km", summary.total_distance_km)),
        card("Time", &summary.total_duration_display),
        card("Elevation", &format!("{:.0} m", summary.total_elevation_m)),
        card("Calories", &summary.total_calories.to_string()),
    ];
    if summary.skipped_rows > 0 {
        cards.push(format!(
            "<div class=\"card warn\"><span class=\"label\">Skipped rows</span><span class=\"value\">{}</span></div>",
            summary.skipped_rows
        ));
    }
    format!("<section class=\"cards\">\n{}\n</section>", cards.join("\n"))
}

fn card(label: &str, value: &str) -> String {
    format!(
        "<div class=\"card\"><span class=\"label\">{}</span><span class=\"value\">{}</span></div>",
        html_escape(label),
        html_escape(value)
    )
}

fn render_leaderboard<F>(title: &str, metric_label: &str, rows: &[ActivityRow], metric: F) -> String
where
    F: Fn(&ActivityRow) -> String,
{
    let mut html = format!(
        "<div class=\"board\"><h2>{}</h2>\n<table>\n<thead><tr><th>#</th><th>Date</th><th>Type</th><th>Title</th><th class=\"num\">{}</th></tr></thead>\n<tbody>\n",
        html_escape(title),
        html_escape(metric_label)
    );
    if rows.is_empty() {
        html.push_str("<tr><td colspan=\"5\" class=\"empty\">No activities</td></tr>\n");
    }
    for (idx, row) in rows.iter().enumerate() {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"num\">{}</td></tr>",
            idx + 1,
            html_escape(&row.date),
            html_escape(&row.activity_type),
            html_escape(row.title.as_deref().unwrap_or("")),
            metric(row)
        );
    }
    html.push_str("</tbody>\n</table></div>");
    html
}

fn render_type_table(types: &[TypeBreakdown]) -> String {
    let mut html = String::from(
        "<section class=\"panel\"><h2>By Activity Type</h2>\n<table class=\"sortable\">\n<thead><tr><th data-sort=\"text\">Type</th><th data-sort=\"num\" class=\"num\">Count</th><th data-sort=\"num\" class=\"num\">Distance (km)</th><th data-sort=\"num\" class=\"num\">Time</th></tr></thead>\n<tbody>\n",
    );
    for t in types {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{:.1}</td><td class=\"num\" data-value=\"{}\">{}</td></tr>",
            html_escape(&t.activity_type),
            t.count,
            t.distance_km,
            t.duration_secs,
            format_duration(t.duration_secs)
        );
    }
    html.push_str("</tbody>\n</table></section>");
    html
}

fn render_activity_table(rows: &[ActivityRow]) -> String {
    let mut html = String::from(
        "<section class=\"panel\"><h2>All Activities</h2>\n\
<input id=\"activity-search\" type=\"search\" placeholder=\"Filter by type or title\" aria-label=\"Filter activities\">\n\
<div class=\"table-scroll\"><table id=\"activity-table\" class=\"sortable\">\n<thead><tr>\
<th data-sort=\"text\">Date</th>\
<th data-sort=\"text\">Type</th>\
<th data-sort=\"text\">Title</th>\
<th data-sort=\"num\" class=\"num\">Distance (km)</th>\
<th data-sort=\"num\" class=\"num\">Time</th>\
<th data-sort=\"text\" class=\"num\">Pace</th>\
<th data-sort=\"num\" class=\"num\">Avg HR</th>\
<th data-sort=\"num\" class=\"num\">Max HR</th>\
<th data-sort=\"num\" class=\"num\">Cadence</th>\
<th data-sort=\"num\" class=\"num\">Ascent (m)</th>\
<th data-sort=\"num\" class=\"num\">Calories</th>\
</tr></thead>\n<tbody>\n",
    );
    for row in rows {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"num\">{:.2}</td><td class=\"num\" data-value=\"{}\">{}</td><td class=\"num\">{}</td>{}{}{}<td class=\"num\">{:.0}</td>{}</tr>",
            html_escape(&row.date),
            html_escape(&row.activity_type),
            html_escape(row.title.as_deref().unwrap_or("")),
            row.distance_km,
            row.duration_secs,
            html_escape(&row.duration_display),
            html_escape(row.pace_display.as_deref().unwrap_or("")),
            optional_cell(row.avg_hr),
            optional_cell(row.max_hr),
            optional_cell(row.avg_cadence),
            row.elevation_gain_m,
            optional_cell(row.calories),
        );
    }
    html.push_str("</tbody>\n</table></div></section>");
    html
}

fn optional_cell(value: Option<u32>) -> String {
    match value {
        Some(v) => format!("<td class=\"num\">{v}</td>"),
        None => "<td class=\"num missing\" data-value=\"\">-</td>".to_string(),
    }
}

/// Escape text for HTML element content and double-quoted attributes.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const DASHBOARD_CSS: &str = r#"
:root {
  --bg: #f5f6f8;
  --panel: #ffffff;
  --text: #1f2933;
  --muted: #6b7785;
  --border: #e1e5ea;
  --accent: #2f80ed;
  --warn: #d97706;
}
* { box-sizing: border-box; }
body {
  margin: 0;
  font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
  background: var(--bg);
  color: var(--text);
}
.container { max-width: 1280px; margin: 0 auto; padding: 24px; }
header h1 { margin: 0 0 4px; font-size: 28px; }
.subtitle { margin: 0 0 20px; color: var(--muted); }
h2 { font-size: 16px; margin: 0 0 12px; }
.cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr)); gap: 12px; margin-bottom: 20px; }
.card { background: var(--panel); border: 1px solid var(--border); border-radius: 8px; padding: 14px 16px; }
.card .label { display: block; color: var(--muted); font-size: 12px; text-transform: uppercase; letter-spacing: .04em; }
.card .value { display: block; font-size: 24px; font-weight: 600; margin-top: 4px; }
.card.warn .value { color: var(--warn); }
.chart-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(420px, 1fr)); gap: 16px; margin-bottom: 20px; }
.chart-box, .board, .panel { background: var(--panel); border: 1px solid var(--border); border-radius: 8px; padding: 16px; }
.chart-box.wide { grid-column: 1 / -1; }
.chart-wrap { position: relative; height: 300px; }
.boards { display: grid; grid-template-columns: repeat(auto-fit, minmax(420px, 1fr)); gap: 16px; margin-bottom: 20px; }
.panel { margin-bottom: 20px; }
.tag { background: #e8f0fe; color: var(--accent); border-radius: 4px; padding: 1px 6px; font-size: 12px; font-weight: 500; }
table { width: 100%; border-collapse: collapse; font-size: 14px; }
th, td { padding: 6px 8px; border-bottom: 1px solid var(--border); text-align: left; white-space: nowrap; }
td:nth-child(3) { white-space: normal; }
th { color: var(--muted); font-weight: 600; }
th[data-sort] { cursor: pointer; user-select: none; }
th[data-dir="asc"]::after { content: " \25B2"; }
th[data-dir="desc"]::after { content: " \25BC"; }
.num { text-align: right; }
.missing, .empty { color: var(--muted); }
.table-scroll { overflow-x: auto; }
#activity-search { width: 100%; max-width: 320px; padding: 6px 10px; margin-bottom: 12px; border: 1px solid var(--border); border-radius: 6px; }
footer { text-align: center; color: var(--muted); font-size: 12px; padding: 16px 0 32px; }
"#;

const DASHBOARD_JS: &str = r#"
const REPORT = JSON.parse(document.getElementById('report-data').textContent);
const ACCENT = '#2f80ed';
const ZONE_COLORS = ['#9ecae1', '#6baed6', '#fdae6b', '#fd8d3c', '#e6550d'];

function showEmpty(id, message) {
  const canvas = document.getElementById(id);
  if (!canvas) return;
  const p = document.createElement('p');
  p.className = 'empty';
  p.textContent = message;
  canvas.replaceWith(p);
}

function paceLabel(minutes) {
  let m = Math.floor(minutes);
  let s = Math.round((minutes - m) * 60);
  if (s === 60) { m += 1; s = 0; }
  return m + ':' + String(s).padStart(2, '0');
}

const baseOptions = {
  responsive: true,
  maintainAspectRatio: false,
  plugins: { legend: { display: false } },
};

function drawCharts() {
  if (typeof Chart === 'undefined') {
    ['monthly-chart', 'cumulative-chart', 'zones-chart', 'cadence-chart', 'pace-hr-chart']
      .forEach(id => showEmpty(id, 'Charts need the Chart.js script, which could not be loaded.'));
    return;
  }

  if (REPORT.monthly.length) {
    new Chart(document.getElementById('monthly-chart'), {
      type: 'bar',
      data: {
        labels: REPORT.monthly.map(m => m.month),
        datasets: [{ label: 'km', data: REPORT.monthly.map(m => m.distance_km), backgroundColor: ACCENT }],
      },
      options: { ...baseOptions, scales: { y: { beginAtZero: true, title: { display: true, text: 'km' } } } },
    });
  } else {
    showEmpty('monthly-chart', 'No distance recorded.');
  }

  if (REPORT.cumulative.length) {
    new Chart(document.getElementById('cumulative-chart'), {
      type: 'line',
      data: {
        labels: REPORT.cumulative.map(p => p.date),
        datasets: [{
          label: 'km',
          data: REPORT.cumulative.map(p => p.total_km),
          borderColor: ACCENT,
          backgroundColor: 'rgba(47, 128, 237, 0.15)',
          fill: true,
          pointRadius: 0,
          tension: 0.1,
        }],
      },
      options: { ...baseOptions, scales: { y: { beginAtZero: true, title: { display: true, text: 'km' } } } },
    });
  } else {
    showEmpty('cumulative-chart', 'No distance recorded.');
  }

  if (REPORT.hr_zones.some(z => z.count > 0)) {
    new Chart(document.getElementById('zones-chart'), {
      type: 'doughnut',
      data: {
        labels: REPORT.hr_zones.map(z => z.label),
        datasets: [{ data: REPORT.hr_zones.map(z => z.count), backgroundColor: ZONE_COLORS }],
      },
      options: { responsive: true, maintainAspectRatio: false, plugins: { legend: { position: 'right' } } },
    });
  } else {
    showEmpty('zones-chart', 'No heart rate data.');
  }

  if (REPORT.cadence.length) {
    new Chart(document.getElementById('cadence-chart'), {
      type: 'bar',
      data: {
        labels: REPORT.cadence.map(b => b.label),
        datasets: [{ label: 'activities', data: REPORT.cadence.map(b => b.count), backgroundColor: ACCENT }],
      },
      options: {
        ...baseOptions,
        scales: {
          x: { title: { display: true, text: 'steps per minute' } },
          y: { beginAtZero: true, ticks: { precision: 0 } },
        },
      },
    });
  } else {
    showEmpty('cadence-chart', 'No cadence data.');
  }

  if (REPORT.pace_hr.length) {
    new Chart(document.getElementById('pace-hr-chart'), {
      type: 'scatter',
      data: {
        datasets: [{
          label: 'activities',
          data: REPORT.pace_hr.map(p => ({ x: p.pace_min_per_km, y: p.avg_hr, meta: p })),
          backgroundColor: ACCENT,
        }],
      },
      options: {
        ...baseOptions,
        scales: {
          x: { title: { display: true, text: 'pace (min/km)' }, ticks: { callback: v => paceLabel(v) } },
          y: { title: { display: true, text: 'avg HR (bpm)' } },
        },
        plugins: {
          legend: { display: false },
          tooltip: {
            callbacks: {
              label: ctx => {
                const p = ctx.raw.meta;
                const name = p.title ? p.title : p.activity_type;
                return `${p.date} ${name}: ${paceLabel(p.pace_min_per_km)} /km, ${p.avg_hr} bpm`;
              },
            },
          },
        },
      },
    });
  } else {
    showEmpty('pace-hr-chart', 'No activities with both pace and heart rate.');
  }
}

function cellValue(row, col) {
  const cell = row.cells[col];
  return cell.dataset.value !== undefined ? cell.dataset.value : cell.textContent.trim();
}

function toNumber(v) {
  const n = parseFloat(v);
  return Number.isNaN(n) ? -Infinity : n;
}

function makeSortable(table) {
  const headers = Array.from(table.querySelectorAll('th[data-sort]'));
  headers.forEach(th => {
    th.addEventListener('click', () => {
      const tbody = table.tBodies[0];
      const rows = Array.from(tbody.rows);
      const col = th.cellIndex;
      const numeric = th.dataset.sort === 'num';
      const asc = th.dataset.dir !== 'asc';
      headers.forEach(h => h.removeAttribute('data-dir'));
      th.dataset.dir = asc ? 'asc' : 'desc';
      rows.sort((a, b) => {
        const av = cellValue(a, col);
        const bv = cellValue(b, col);
        let cmp;
        if (numeric) {
          const na = toNumber(av);
          const nb = toNumber(bv);
          cmp = na === nb ? 0 : (na < nb ? -1 : 1);
        } else {
          cmp = av.localeCompare(bv);
        }
        return asc ? cmp : -cmp;
      });
      rows.forEach(r => tbody.appendChild(r));
    });
  });
}

function wireSearch() {
  const input = document.getElementById('activity-search');
  const table = document.getElementById('activity-table');
  if (!input || !table) return;
  input.addEventListener('input', () => {
    const needle = input.value.trim().toLowerCase();
    Array.from(table.tBodies[0].rows).forEach(row => {
      const text = (row.cells[1].textContent + ' ' + row.cells[2].textContent).toLowerCase();
      row.style.display = !needle || text.includes(needle) ? '' : 'none';
    });
  });
}

document.querySelectorAll('table.sortable').forEach(makeSortable);
wireSearch();
drawCharts();
"#;
