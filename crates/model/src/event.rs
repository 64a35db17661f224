//! Pointer samples driving the region selection.
//!
//! Samples can be replayed from JSONL (one JSON object per line, `#` lines
//! ignored), which is how scripted captures and tests feed the tracker.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Monotonic timestamp in nanoseconds since the capture session started.
pub type TimestampNs = u64;

/// What happened to the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    /// Primary button pressed.
    Down,
    /// Pointer moved while the button is held.
    Drag,
    /// Primary button released.
    Up,
    /// The cancel key (escape) was pressed.
    Cancel,
}

/// A single timestamped pointer sample in window-space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    /// Monotonic nanoseconds since session start.
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    pub kind: PointerKind,

    /// Window-space X (points).
    pub x: f64,
    /// Window-space Y (points).
    pub y: f64,
}

impl PointerSample {
    pub fn new(timestamp_ns: TimestampNs, kind: PointerKind, x: f64, y: f64) -> Self {
        Self {
            timestamp_ns,
            kind,
            x,
            y,
        }
    }

    pub fn down(timestamp_ns: TimestampNs, x: f64, y: f64) -> Self {
        Self::new(timestamp_ns, PointerKind::Down, x, y)
    }

    pub fn drag(timestamp_ns: TimestampNs, x: f64, y: f64) -> Self {
        Self::new(timestamp_ns, PointerKind::Drag, x, y)
    }

    pub fn up(timestamp_ns: TimestampNs, x: f64, y: f64) -> Self {
        Self::new(timestamp_ns, PointerKind::Up, x, y)
    }

    /// The cancel key carries no meaningful position.
    pub fn cancel(timestamp_ns: TimestampNs) -> Self {
        Self::new(timestamp_ns, PointerKind::Cancel, 0.0, 0.0)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Build the down/drag/up sequence of a straight drag between two points.
///
/// `steps` intermediate drag samples are interpolated; samples are spaced
/// `interval_ns` apart.
pub fn straight_drag(from: Point, to: Point, steps: usize, interval_ns: u64) -> Vec<PointerSample> {
    let mut samples = Vec::with_capacity(steps + 2);
    samples.push(PointerSample::down(0, from.x, from.y));
    for i in 1..=steps {
        let t = i as f64 / (steps + 1) as f64;
        samples.push(PointerSample::drag(
            i as u64 * interval_ns,
            from.x + (to.x - from.x) * t,
            from.y + (to.y - from.y) * t,
        ));
    }
    let end_ns = (steps as u64 + 1) * interval_ns;
    samples.push(PointerSample::drag(end_ns, to.x, to.y));
    samples.push(PointerSample::up(end_ns, to.x, to.y));
    samples
}

/// Parse samples from JSONL content (one JSON object per line).
pub fn parse_samples(jsonl: &str) -> Result<Vec<PointerSample>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize samples to JSONL format.
pub fn serialize_samples(samples: &[PointerSample]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for sample in samples {
        output.push_str(&serde_json::to_string(sample)?);
        output.push('\n');
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_format() {
        let sample = PointerSample::down(1234, 10.5, 20.0);
        let json = serde_json::to_string(&sample).unwrap();
        assert!(json.contains("\"t\":1234"));
        assert!(json.contains("\"kind\":\"down\""));
        assert!(json.contains("\"x\":10.5"));
    }

    #[test]
    fn test_parse_samples_skips_comments_and_blank_lines() {
        let jsonl = concat!(
            "# scripted drag\n\n",
            "{\"t\":0,\"kind\":\"down\",\"x\":1.0,\"y\":2.0}\n",
            "{\"t\":5,\"kind\":\"cancel\",\"x\":0.0,\"y\":0.0}\n",
        );
        let parsed = parse_samples(jsonl).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].position(), Point::new(1.0, 2.0));
        assert_eq!(parsed[1].kind, PointerKind::Cancel);
    }

    #[test]
    fn test_jsonl_roundtrip() {
        let samples = straight_drag(Point::new(0.0, 0.0), Point::new(10.0, 10.0), 2, 1_000);
        let jsonl = serialize_samples(&samples).unwrap();
        assert_eq!(parse_samples(&jsonl).unwrap(), samples);
    }

    #[test]
    fn test_straight_drag_shape() {
        let samples = straight_drag(Point::new(10.0, 10.0), Point::new(110.0, 160.0), 3, 8_000_000);
        assert_eq!(samples.first().unwrap().kind, PointerKind::Down);
        assert_eq!(samples.last().unwrap().kind, PointerKind::Up);
        assert_eq!(samples.last().unwrap().position(), Point::new(110.0, 160.0));
        assert!(samples
            .windows(2)
            .all(|w| w[0].timestamp_ns <= w[1].timestamp_ns));
    }
}
