//! Ratatui-based terminal UI.
//!
//! The TUI provides a form for describing a property (floor area, rooms,
//! categorical fields, construction year), then renders the predicted price
//! category, the price estimate, and a price-vs-floor-area sensitivity chart.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::pipeline::{self, PredictContext, PredictionOutput};
use crate::domain::{
    FLOOR_AREA_MAX, FLOOR_AREA_MIN, ModelPaths, PropertyRecord, ROOMS_MAX, ROOMS_MIN, YEAR_MIN,
    year_max,
};
use crate::encode::OrdinalMap;
use crate::error::AppError;
use crate::report::fmt_eur;

mod plotters_chart;

use plotters_chart::PricePlottersChart;

const FIELD_COUNT: usize = 7;
const FIELD_AREA: usize = 0;
const FIELD_BEDROOMS: usize = 1;
const FIELD_BATHROOMS: usize = 2;
const FIELD_TYPE: usize = 3;
const FIELD_COUNTY: usize = 4;
const FIELD_BER: usize = 5;
const FIELD_YEAR: usize = 6;

/// Start the TUI.
///
/// Artifacts are resolved *before* the terminal enters raw mode so that the
/// interactive picker (a plain stdin prompt) still works.
pub fn run(paths: &ModelPaths) -> Result<(), AppError> {
    let ctx = PredictContext::load(paths)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(ctx)?;
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    ctx: PredictContext,
    record: PropertyRecord,
    selected_field: usize,
    editing: bool,
    edit_input: String,
    status: String,
    out: Option<PredictionOutput>,
    curve: Vec<(f64, f64)>,
}

impl App {
    fn new(ctx: PredictContext) -> Result<Self, AppError> {
        let mut app = Self {
            ctx,
            record: PropertyRecord::default_input(),
            selected_field: 0,
            editing: false,
            edit_input: String::new(),
            status: "Ready.".to_string(),
            out: None,
            curve: Vec::new(),
        };
        app.recompute()?;
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        if self.editing {
            return self.handle_value_edit(code);
        }

        match code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field < FIELD_COUNT - 1 {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1)?,
            KeyCode::Right => self.adjust_field(1)?,
            KeyCode::Enter => {
                if matches!(self.selected_field, FIELD_AREA | FIELD_YEAR) {
                    self.editing = true;
                    self.edit_input.clear();
                    self.status =
                        "Editing value. Enter to apply, Esc to cancel.".to_string();
                }
            }
            KeyCode::Char('r') => {
                self.record = PropertyRecord::default_input();
                self.recompute()?;
                self.status = "Form reset to defaults.".to_string();
            }
            KeyCode::Char('d') => {
                match crate::debug::write_debug_bundle(&self.ctx, &self.record) {
                    Ok(path) => {
                        self.status = format!("Wrote debug bundle: {}", path.display());
                    }
                    Err(err) => {
                        self.status = format!("Debug write failed: {err}");
                    }
                }
            }
            _ => {}
        }

        Ok(false)
    }

    fn handle_value_edit(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Esc => {
                self.editing = false;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = false;
                self.apply_edit_input()?;
            }
            KeyCode::Backspace => {
                self.edit_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '.' {
                    self.edit_input.push(c);
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn apply_edit_input(&mut self) -> Result<(), AppError> {
        let trimmed = self.edit_input.trim();
        if trimmed.is_empty() {
            self.status = "Empty input; value unchanged.".to_string();
            return Ok(());
        }

        match self.selected_field {
            FIELD_AREA => match trimmed.parse::<f64>() {
                Ok(v) => {
                    self.record.floor_area_m2 = v.clamp(FLOOR_AREA_MIN, FLOOR_AREA_MAX);
                    self.recompute()?;
                    self.status = format!("area: {:.0} m2", self.record.floor_area_m2);
                }
                Err(e) => {
                    self.status = format!("Invalid area '{trimmed}': {e}");
                }
            },
            FIELD_YEAR => match trimmed.parse::<i32>() {
                Ok(v) => {
                    self.record.year_built = v.clamp(YEAR_MIN, year_max());
                    self.recompute()?;
                    self.status = format!("year: {}", self.record.year_built);
                }
                Err(e) => {
                    self.status = format!("Invalid year '{trimmed}': {e}");
                }
            },
            _ => {}
        }
        Ok(())
    }

    fn adjust_field(&mut self, delta: i64) -> Result<(), AppError> {
        match self.selected_field {
            FIELD_AREA => {
                let next = self.record.floor_area_m2 + 10.0 * delta as f64;
                self.record.floor_area_m2 = next.clamp(FLOOR_AREA_MIN, FLOOR_AREA_MAX);
                self.status = format!("area: {:.0} m2", self.record.floor_area_m2);
            }
            FIELD_BEDROOMS => {
                self.record.bedrooms =
                    step_count(self.record.bedrooms, delta);
                self.status = format!("bedrooms: {}", self.record.bedrooms);
            }
            FIELD_BATHROOMS => {
                self.record.bathrooms =
                    step_count(self.record.bathrooms, delta);
                self.status = format!("bathrooms: {}", self.record.bathrooms);
            }
            FIELD_TYPE => {
                self.record.property_type =
                    cycle_label(&self.ctx.tables.property_type, &self.record.property_type, delta);
                self.status = format!("type: {}", self.record.property_type);
            }
            FIELD_COUNTY => {
                self.record.county =
                    cycle_label(&self.ctx.tables.county, &self.record.county, delta);
                self.status = format!("county: {}", self.record.county);
            }
            FIELD_BER => {
                self.record.ber_rating =
                    cycle_label(&self.ctx.tables.ber_rating, &self.record.ber_rating, delta);
                self.status = format!("BER: {}", self.record.ber_rating);
            }
            FIELD_YEAR => {
                let next = self.record.year_built + 10 * delta as i32;
                self.record.year_built = next.clamp(YEAR_MIN, year_max());
                self.status = format!("year: {}", self.record.year_built);
            }
            _ => {}
        }
        self.recompute()
    }

    fn recompute(&mut self) -> Result<(), AppError> {
        let out = pipeline::run_predict(&self.ctx, &self.record)?;
        self.curve = pipeline::price_curve(&self.ctx, &self.record, 200)?;
        self.out = Some(out);
        Ok(())
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("hcast", Style::default().fg(Color::Cyan)),
            Span::raw(" — Ireland House Price Predictor"),
        ]));

        if let Some(out) = &self.out {
            lines.push(Line::from(vec![
                Span::raw("category: "),
                Span::styled(
                    out.category.clone(),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
                Span::raw("  price: "),
                Span::styled(
                    fmt_eur(out.price_eur),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
            ]));

            let warn = if out.warnings.is_empty() {
                "none".to_string()
            } else {
                out.warnings.join("; ")
            };
            lines.push(Line::from(Span::styled(
                format!(
                    "schema: clf={} reg={} | warnings: {warn}",
                    out.clf_schema.source().display_name(),
                    out.reg_schema.source().display_name(),
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(9)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_form(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title("Price vs floor area")
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(out) = &self.out else {
            let msg = Paragraph::new("Waiting for prediction...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let marker = (self.record.floor_area_m2, out.price_eur);
        let (x_bounds, y_bounds) = chart_bounds(&self.curve, marker);

        let (chart_rect, insets) = chart_layout(inner);
        let widget = PricePlottersChart {
            curve: &self.curve,
            marker: Some(marker),
            x_bounds,
            y_bounds,
            x_label: "floor area (m2)",
            y_label: "price (€k)".to_string(),
            fmt_x: fmt_axis_area,
            fmt_y: fmt_axis_price_k,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds);
        }
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items = vec![
            ListItem::new(format!("Floor area: {:.0} m2", self.record.floor_area_m2)),
            ListItem::new(format!("Bedrooms: {}", self.record.bedrooms)),
            ListItem::new(format!("Bathrooms: {}", self.record.bathrooms)),
            ListItem::new(format!("Property type: {}", self.record.property_type)),
            ListItem::new(format!("County: {}", self.record.county)),
            ListItem::new(format!("BER rating: {}", self.record.ber_rating)),
            ListItem::new(format!("Year built: {}", self.record.year_built)),
        ];

        let list = List::new(items)
            .block(Block::default().title("Property").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing {
            let hint = Paragraph::new(format!("> {}", self.edit_input))
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit value  r reset  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Step a room count by one, staying inside the form bounds.
fn step_count(current: u32, delta: i64) -> u32 {
    let next = if delta >= 0 {
        current.saturating_add(1)
    } else {
        current.saturating_sub(1)
    };
    next.clamp(ROOMS_MIN, ROOMS_MAX)
}

/// Cycle to the adjacent label in an ordinal list, wrapping at the ends.
///
/// A label outside the list (possible after a reset of the tables) restarts
/// from the first entry.
fn cycle_label(map: &OrdinalMap, current: &str, delta: i64) -> String {
    let labels = map.labels();
    if labels.is_empty() {
        return current.to_string();
    }
    let pos = labels.iter().position(|l| l == current).unwrap_or(0) as i64;
    let next = (pos + delta).rem_euclid(labels.len() as i64) as usize;
    labels[next].clone()
}

/// Compute chart bounds from the curve plus the marker, with a small pad.
fn chart_bounds(curve: &[(f64, f64)], marker: (f64, f64)) -> ([f64; 2], [f64; 2]) {
    let x_bounds = [FLOOR_AREA_MIN, FLOOR_AREA_MAX];

    let (mut y_min, mut y_max) = (marker.1, marker.1);
    for &(_, y) in curve {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    (x_bounds, [y_min - pad, y_max + pad])
}

fn fmt_axis_area(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_price_k(v: f64) -> String {
    format!("{:.0}", v / 1000.0)
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_axis_area(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_price_k(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("floor area (m2)")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("price (€k)")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::CategoryTables;

    #[test]
    fn cycle_label_wraps_both_ways() {
        let tables = CategoryTables::training_order();
        assert_eq!(cycle_label(&tables.county, "Dublin", -1), "Other");
        assert_eq!(cycle_label(&tables.county, "Other", 1), "Dublin");
        assert_eq!(cycle_label(&tables.county, "Cork", 1), "Galway");
    }

    #[test]
    fn cycle_label_recovers_from_unknown_current() {
        let tables = CategoryTables::training_order();
        assert_eq!(cycle_label(&tables.county, "Atlantis", 1), "Cork");
    }

    #[test]
    fn step_count_respects_bounds() {
        assert_eq!(step_count(ROOMS_MAX, 1), ROOMS_MAX);
        assert_eq!(step_count(ROOMS_MIN, -1), ROOMS_MIN);
        assert_eq!(step_count(3, 1), 4);
    }

    #[test]
    fn chart_bounds_include_the_marker() {
        let curve = vec![(20.0, 100_000.0), (500.0, 400_000.0)];
        let (x, y) = chart_bounds(&curve, (250.0, 500_000.0));
        assert_eq!(x, [FLOOR_AREA_MIN, FLOOR_AREA_MAX]);
        assert!(y[0] < 100_000.0);
        assert!(y[1] > 500_000.0);
    }
}
