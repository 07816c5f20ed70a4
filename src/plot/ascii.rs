//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - price sensitivity curve: `-` line
//! - the property being predicted: `X` marker

/// Render the price-vs-floor-area sensitivity plot.
///
/// `curve` is `(floor area m2, price eur)` pairs; `marker` is the current
/// property's position on that curve.
pub fn render_ascii_plot(
    curve: &[(f64, f64)],
    marker: Option<(f64, f64)>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((x_min, x_max)) = x_range(curve) else {
        return "Plot: no curve points.\n".to_string();
    };
    let (y_min, y_max) = y_range(curve, marker).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curve first (so the marker can overlay).
    draw_curve(&mut grid, curve, x_min, x_max, y_min, y_max);

    if let Some((mx, my)) = marker {
        let x = map_x(mx, x_min, x_max, width);
        let y = map_y(my, y_min, y_max, height);
        grid[y][x] = 'X';
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: area=[{x_min:.0}, {x_max:.0}] m2 | price=[{}, {}]\n",
        crate::report::fmt_eur(y_min),
        crate::report::fmt_eur(y_max),
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn x_range(curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for &(x, _) in curve {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn y_range(curve: &[(f64, f64)], marker: Option<(f64, f64)>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in curve {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if let Some((_, y)) = marker {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let cx = map_x(x, x_min, x_max, width);
        let cy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, cx, cy, '-');
        } else {
            grid[cy][cx] = '-';
        }
        prev = Some((cx, cy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_golden_snapshot_small() {
        // Linear curve from (20, 100k) to (500, 500k); marker at the far end.
        let curve = vec![(20.0, 100_000.0), (500.0, 500_000.0)];
        let txt = render_ascii_plot(&curve, Some((500.0, 500_000.0)), 10, 5);

        let expected = concat!(
            "Plot: area=[20, 500] m2 | price=[€80,000, €520,000]\n",
            "        -X\n",
            "      --  \n",
            "    --    \n",
            "  --      \n",
            "--        \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_curve_does_not_panic() {
        let txt = render_ascii_plot(&[], None, 40, 10);
        assert!(txt.contains("no curve points"));
    }
}
