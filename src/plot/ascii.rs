//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed daily totals: `o`
//! - fitted trend line, extended to the horizon: `-`
//! - projected value at the horizon: `*`

use crate::domain::ForecastResult;

/// Render a forecast. Returns a one-line note when there is nothing to plot.
pub fn render_ascii_plot(forecast: &ForecastResult, width: usize, height: usize) -> String {
    let (Some(trend), Some(first)) = (&forecast.trend, forecast.daily_points.first()) else {
        return "Plot: not enough history to draw a trend.\n".to_string();
    };

    let width = width.max(10);
    let height = height.max(5);

    let points: Vec<(f64, f64)> = forecast
        .daily_points
        .iter()
        .map(|p| ((p.date - first.date).num_days() as f64, p.total_profit))
        .collect();

    let last_x = points.last().map(|&(x, _)| x).unwrap_or(0.0);
    let x_min = 0.0;
    let x_max = last_x + f64::from(trend.horizon_days);
    let x_max = if x_max > x_min { x_max } else { x_min + 1.0 };

    let slope = trend.model_details.slope;
    let intercept = trend.model_details.intercept;
    let line = sample_line(slope, intercept, x_min, x_max, width);
    let projection = (x_max, slope * x_max + intercept);

    let (y_min, y_max) = y_range(&points, &line).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the line first so points can overlay it.
    draw_polyline(&mut grid, &line, x_min, x_max, y_min, y_max);

    for &(x, y) in &points {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let col = map_x(projection.0, x_min, x_max, width);
    let row = map_y(projection.1, y_min, y_max, height);
    grid[row][col] = '*';

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: days=[{x_min:.0}, {x_max:.0}] from {} | profit=[{y_min:.2}, {y_max:.2}]\n",
        first.date
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn sample_line(slope: f64, intercept: f64, x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let x = x_min + u * (x_max - x_min);
            (x, slope * x + intercept)
        })
        .collect()
}

fn y_range(points: &[(f64, f64)], line: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points.iter().chain(line) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() && max_y.is_finite() {
        // Flat series: open a band around the level.
        let pad = (min_y.abs() * 0.1).max(1.0);
        Some((min_y - pad, max_y + pad))
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

fn draw_polyline(
    grid: &mut [Vec<char>],
    line: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    if line.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in line {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_segment(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_segment(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
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
    use crate::domain::SaleRow;
    use crate::forecast::forecast_profit_trend;

    #[test]
    fn plot_golden_snapshot_small() {
        let rows = vec![
            SaleRow::new("2024-01-01", Some(100.0)),
            SaleRow::new("2024-01-02", Some(110.0)),
        ];
        let forecast = forecast_profit_trend(&rows, 1);

        let txt = render_ascii_plot(&forecast, 10, 5);
        let expected = concat!(
            "Plot: days=[0, 2] from 2024-01-01 | profit=[99.00, 121.00]\n",
            "         *\n",
            "      --- \n",
            "    -o    \n",
            " ---      \n",
            "o         \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn flat_series_still_renders() {
        let rows = vec![
            SaleRow::new("2024-01-01", Some(50.0)),
            SaleRow::new("2024-01-03", Some(50.0)),
        ];
        let txt = render_ascii_plot(&forecast_profit_trend(&rows, 7), 20, 6);
        assert_eq!(txt.lines().count(), 7);
        assert!(txt.contains('*'));
        assert!(txt.contains('o'));
    }

    #[test]
    fn insufficient_data_has_no_grid() {
        let txt = render_ascii_plot(&forecast_profit_trend(Vec::<SaleRow>::new(), 7), 20, 6);
        assert_eq!(txt.lines().count(), 1);
    }
}
