//! Console rendering of the dashboard. `render_frame` is a pure function of a
//! state snapshot; `run` redraws it after every store change.

use std::fmt::Write as _;
use std::time::Duration;

use colored::{ColoredString, Colorize};
use lib_coldchain::configs::MonitorConfig;
use lib_coldchain::domain::Profile;
use lib_coldchain::views::{
    alert_panel::alert_panel,
    charts::{gforce_chart, history_chart, temperature_chart, ChartSeries},
    deliveries::{delivery_detail, delivery_rows},
    kpi_cards::kpi_cards,
    map::{self, MapMarker},
    package_stats::{empty_message, package_rows},
    Status,
};
use lib_coldchain::{AppStore, DashboardState};
use tokio_util::sync::CancellationToken;

/// Redraws are coalesced to at most one per this period.
const MIN_REDRAW: Duration = Duration::from_millis(200);
const SPARK: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// View settings taken from the configuration.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub profile: Profile,
    pub thresholds: lib_coldchain::views::Thresholds,
    pub chart_points: usize,
    pub clear_screen: bool,
}

impl From<&MonitorConfig> for RenderOptions {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            profile: config.profile,
            thresholds: config.thresholds,
            chart_points: config.chart_points,
            clear_screen: true,
        }
    }
}

pub async fn run(store: AppStore, options: RenderOptions, cancel: CancellationToken) {
    let mut rx = store.subscribe();
    loop {
        let frame = render_frame(&rx.borrow_and_update(), &options);
        if options.clear_screen {
            print!("\x1B[2J\x1B[H");
        }
        println!("{}", frame);

        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(MIN_REDRAW) => {}
        }
    }
    tracing::debug!("renderer stopped");
}

pub fn render_frame(state: &DashboardState, options: &RenderOptions) -> String {
    let mut out = String::new();
    header(&mut out, state, options);

    match options.profile {
        Profile::Shipments => {
            kpi_section(&mut out, state);
            package_section(&mut out, state, options);
            chart_section(&mut out, &temperature_chart(&state.temperature_series, &options.thresholds, options.chart_points));
            chart_section(&mut out, &gforce_chart(&state.gforce_series, &options.thresholds, options.chart_points));
            let markers = if state.locations.is_empty() {
                map::markers_from_telemetry(&state.telemetry, &options.thresholds)
            } else {
                map::markers_from_locations(&state.locations, &options.thresholds)
            };
            map_section(&mut out, &markers, state.loading);
        }
        Profile::Deliveries => {
            delivery_section(&mut out, state, options);
            detail_section(&mut out, state, options);
            map_section(
                &mut out,
                &map::markers_from_telemetry(&state.telemetry, &options.thresholds),
                state.loading,
            );
        }
    }

    alert_section(&mut out, state);
    let _ = writeln!(
        out,
        "\n{}",
        "[r] refrescar  [l] lista de entregas  [d <id>] detalle  [c] cerrar detalle  [q] salir".dimmed()
    );
    out
}

fn header(out: &mut String, state: &DashboardState, options: &RenderOptions) {
    let title = match options.profile {
        Profile::Shipments => "Monitor de Envíos",
        Profile::Deliveries => "Monitor de Entregas",
    };
    let connection = if state.connected {
        "● Conectado".green()
    } else {
        "○ Desconectado".red()
    };
    let updated = state
        .last_update
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());

    let _ = write!(out, "{}  {}  Última actualización: {}", title.bold(), connection, updated);
    if state.loading {
        let _ = write!(out, "  {}", "actualizando...".yellow());
    }
    out.push('\n');

    if let Some(error) = &state.error {
        let _ = writeln!(out, "{}", format!("! {}", error).white().on_red());
    }
}

fn kpi_section(out: &mut String, state: &DashboardState) {
    section(out, "Indicadores Clave de Rendimiento");
    for card in kpi_cards(&state.kpis, state.loading) {
        let _ = writeln!(out, "  {:<32} {}", card.title, paint(&card.value, card.color));
    }
}

fn package_section(out: &mut String, state: &DashboardState, options: &RenderOptions) {
    section(out, "Estadísticas de Envíos");
    let rows = package_rows(&state.telemetry, &options.thresholds);
    if rows.is_empty() {
        let _ = writeln!(out, "  {}", empty_message(state.loading).dimmed());
        return;
    }
    let _ = writeln!(
        out,
        "  {:<12} {:>10} {:>8} {:>7} {:>9} {:<20} {}",
        "ID Envío", "Temp", "Fuerza G", "Batería", "Señal", "Estado", "Hora"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "  {:<12} {:>10} {:>8} {:>7} {:>9} {} {}",
            row.package_id,
            row.temperature,
            row.g_force,
            row.battery,
            row.signal,
            status_cell(row.status, row.reason, 20),
            row.updated
        );
    }
}

fn delivery_section(out: &mut String, state: &DashboardState, options: &RenderOptions) {
    section(out, "Entregas Activas");
    let rows = delivery_rows(&state.active_deliveries, &options.thresholds);
    if rows.is_empty() {
        let placeholder = if state.loading {
            lib_coldchain::views::deliveries::LOADING_MESSAGE
        } else {
            lib_coldchain::views::deliveries::EMPTY_MESSAGE
        };
        let _ = writeln!(out, "  {}", placeholder.dimmed());
        return;
    }
    let _ = writeln!(
        out,
        "  {:<12} {:>10} {:>8} {:>8} {:<8} {}",
        "ID Entrega", "Temp", "Humedad", "Vibr.", "Estado", "Última Actualización"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "  {:<12} {:>10} {:>8} {:>8} {} {}",
            row.delivery_id,
            row.temperature,
            row.humidity,
            row.vibration,
            status_cell(row.status, row.status.label(), 8),
            row.updated
        );
    }
}

fn detail_section(out: &mut String, state: &DashboardState, options: &RenderOptions) {
    let Some(detail) = delivery_detail(
        state.selected_delivery.as_ref(),
        &state.delivery_history,
        &options.thresholds,
    ) else {
        return;
    };
    section(out, &format!("Detalle de Entrega: {}", detail.delivery_id));
    for tile in &detail.tiles {
        let _ = writeln!(out, "  {:<12} {}", tile.title, paint(&tile.value, tile.status.color_class()));
    }
    let _ = writeln!(
        out,
        "  {:<12} {}",
        "Estado",
        paint(detail.status.label(), detail.status.color_class())
    );
    let _ = writeln!(out, "  Última actualización: {} ({} puntos)", detail.updated, detail.history_points);
    chart_section(
        out,
        &history_chart(&state.delivery_history, &options.thresholds, options.chart_points),
    );
}

fn chart_section(out: &mut String, chart: &ChartSeries) {
    section(out, chart.title);
    if chart.is_empty() {
        let _ = writeln!(out, "  {}", "sin datos".dimmed());
        return;
    }
    let _ = writeln!(
        out,
        "  {}  máx {}{}  crítico {}{}",
        sparkline(chart),
        chart.max().unwrap_or_default(),
        chart.unit,
        chart.critical,
        chart.unit
    );
    if let (Some(first), Some(last)) = (chart.labels.first(), chart.labels.last()) {
        let _ = writeln!(out, "  {} → {}", first, last);
    }
}

fn map_section(out: &mut String, markers: &[MapMarker], loading: bool) {
    section(out, "Ubicación");
    if markers.is_empty() {
        let (lat, lng) = map::center(markers);
        let note = if loading { map::LOADING_MESSAGE } else { "sin posiciones" };
        let _ = writeln!(out, "  {} (centro {:.4}, {:.4})", note.dimmed(), lat, lng);
        return;
    }
    for marker in markers {
        let _ = writeln!(
            out,
            "  {} {:>9.4} {:>9.4}  {}",
            paint("◆", marker.status.color_class()),
            marker.lat,
            marker.lng,
            marker.popup
        );
    }
    if let Some(b) = map::bounds(markers) {
        let _ = writeln!(
            out,
            "  {}",
            format!("límites {:.2},{:.2} / {:.2},{:.2}", b.south, b.west, b.north, b.east).dimmed()
        );
    }
}

fn alert_section(out: &mut String, state: &DashboardState) {
    let panel = alert_panel(&state.alerts, state.loading);
    section(out, &format!("Alertas ({})", panel.badge));
    if let Some(placeholder) = panel.placeholder {
        let _ = writeln!(out, "  {}", placeholder.dimmed());
        return;
    }
    for item in &panel.items {
        let _ = writeln!(
            out,
            "  {} {} {} {}",
            paint(&item.title, item.class),
            item.detail,
            item.package_id.dimmed(),
            item.timestamp.dimmed()
        );
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", title.bold().underline());
}

fn status_cell(status: Status, text: &str, width: usize) -> ColoredString {
    paint(&format!("{:<width$}", text, width = width), status.color_class())
}

fn paint(text: &str, class: &str) -> ColoredString {
    match class {
        "success" => text.green(),
        "warning" => text.yellow(),
        "danger" => text.red().bold(),
        "info" | "primary" => text.cyan(),
        "secondary" | "light" => text.dimmed(),
        _ => text.normal(),
    }
}

fn sparkline(chart: &ChartSeries) -> String {
    let lo = chart.values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = chart.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;
    chart
        .values
        .iter()
        .map(|v| {
            let idx = if span > 0.0 {
                (((v - lo) / span) * (SPARK.len() - 1) as f64).round() as usize
            } else {
                0
            };
            let glyph = SPARK[idx.min(SPARK.len() - 1)].to_string();
            if *v > chart.critical {
                glyph.red().to_string()
            } else {
                glyph
            }
        })
        .collect()
}
