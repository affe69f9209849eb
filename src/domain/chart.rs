//! Chart periods, coordinates and series preparation.

use chrono::DateTime;
use strum::{EnumIter, IntoEnumIterator};

/// Selectable time-range granularity for chart data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Period {
    Hour,
    Day,
    Week,
    Month,
    Year,
    All,
}

impl Period {
    /// Every period, in selector order.
    pub fn all() -> Vec<Period> {
        Period::iter().collect()
    }

    /// Title shown on the period selector button.
    pub fn title(&self) -> &'static str {
        match self {
            Period::Hour => "1H",
            Period::Day => "1D",
            Period::Week => "1W",
            Period::Month => "1M",
            Period::Year => "1Y",
            Period::All => "All",
        }
    }

    /// Value of the gateway's `period` query parameter.
    pub fn query_key(&self) -> &'static str {
        match self {
            Period::Hour => "1h",
            Period::Day => "1d",
            Period::Week => "1w",
            Period::Month => "1m",
            Period::Year => "1y",
            Period::All => "all",
        }
    }
}

/// A time/value pair; `x` is a unix timestamp in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

/// Which way a point moved relative to the period's reference point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    None,
}

/// Signed change between a point and the period's first point.
#[derive(Debug, Clone, PartialEq)]
pub struct Diff {
    pub direction: Direction,
    pub percent: String,
    pub fiat: String,
}

/// Header-ready description of one chart point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointInformation {
    pub amount: String,
    pub date: String,
    pub diff: Diff,
}

/// How consecutive points are joined when drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    Stepped,
}

/// A drawable series. Stepped series materialize the corner points, so
/// the renderer always connects neighbours with straight segments.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub points: Vec<(f64, f64)>,
    pub interpolation: Interpolation,
}

/// Transforms raw coordinates into a drawable series. The finest-grain
/// period is stepped; every coarser period is linear.
pub fn prepare_series(coordinates: &[Coordinate], period: Period) -> ChartSeries {
    match period {
        Period::Hour => ChartSeries {
            points: stepped_points(coordinates),
            interpolation: Interpolation::Stepped,
        },
        _ => ChartSeries {
            points: coordinates.iter().map(|c| (c.x, c.y)).collect(),
            interpolation: Interpolation::Linear,
        },
    }
}

fn stepped_points(coordinates: &[Coordinate]) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(coordinates.len() * 2);
    for pair in coordinates.windows(2) {
        points.push((pair[0].x, pair[0].y));
        points.push((pair[1].x, pair[0].y));
    }
    if let Some(last) = coordinates.last() {
        points.push((last.x, last.y));
    }
    points
}

/// Derives the header information for the point at `index`, diffed
/// against the first point of the loaded period.
pub fn point_information(
    coordinates: &[Coordinate],
    index: usize,
    period: Period,
    currency: &str,
) -> Option<PointInformation> {
    let point = coordinates.get(index)?;
    let reference = coordinates.first()?;

    let direction = if point.y > reference.y {
        Direction::Up
    } else if point.y < reference.y {
        Direction::Down
    } else {
        Direction::None
    };

    let percent = if reference.y.abs() > f64::EPSILON {
        format!("{:+.2}%", (point.y - reference.y) / reference.y * 100.0)
    } else {
        "0%".to_string()
    };
    let fiat = format!("{:+.2} {currency}", point.y - reference.y);

    Some(PointInformation {
        amount: format!("{:.2} {currency}", point.y),
        date: date_label(point.x, period),
        diff: Diff {
            direction,
            percent,
            fiat,
        },
    })
}

fn date_label(x: f64, period: Period) -> String {
    let Some(timestamp) = DateTime::from_timestamp(x as i64, 0) else {
        return String::new();
    };
    match period {
        Period::Hour | Period::Day => timestamp.format("%-d %b, %H:%M").to_string(),
        _ => timestamp.format("%-d %b %Y").to_string(),
    }
}
