//! Reading point sets from text.
//!
//! The format is one point per line, written as two whitespace-separated numbers `x y`. Blank
//! lines are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{PackedTreeError, Result};
use crate::r#type::Point;

/// Read points from `reader`, stopping after `limit` points if given.
///
/// Fails with [`PackedTreeError::InvalidInput`] on the first line that does not hold exactly two
/// finite numbers, or if `limit` is given and the input holds fewer points.
pub fn read_points<R: BufRead>(reader: R, limit: Option<usize>) -> Result<Vec<Point>> {
    let mut points = Vec::with_capacity(limit.unwrap_or(0));
    for (line_index, line) in reader.lines().enumerate() {
        if limit.is_some_and(|limit| points.len() >= limit) {
            break;
        }
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        points.push(parse_point(&line, line_index + 1)?);
    }

    if let Some(limit) = limit {
        if points.len() < limit {
            return Err(PackedTreeError::InvalidInput(format!(
                "Read {} points when expected {}.",
                points.len(),
                limit
            )));
        }
    }
    Ok(points)
}

/// Read points from the file at `path`. See [`read_points`].
pub fn read_points_from_path(path: impl AsRef<Path>, limit: Option<usize>) -> Result<Vec<Point>> {
    let file = File::open(path)?;
    read_points(BufReader::new(file), limit)
}

fn parse_point(line: &str, line_number: usize) -> Result<Point> {
    let mut fields = line.split_whitespace();
    let (Some(x), Some(y), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(PackedTreeError::InvalidInput(format!(
            "Line {}: expected two coordinates, got {:?}.",
            line_number, line
        )));
    };
    Ok(Point::new(
        parse_coord(x, line_number)?,
        parse_coord(y, line_number)?,
    ))
}

fn parse_coord(field: &str, line_number: usize) -> Result<f32> {
    match field.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(PackedTreeError::InvalidInput(format!(
            "Line {}: {:?} is not a finite number.",
            line_number, field
        ))),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reads_points() {
        let text = "0 0\n1.5   -2\n\n  3e1\t4\n";
        let points = read_points(text.as_bytes(), None).unwrap();
        assert_eq!(
            points,
            vec![
                Point::new(0., 0.),
                Point::new(1.5, -2.),
                Point::new(30., 4.)
            ]
        );
    }

    #[test]
    fn stops_at_limit() {
        let text = "0 0\n1 1\nnot a point\n";
        let points = read_points(text.as_bytes(), Some(2)).unwrap();
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn rejects_short_input() {
        let err = read_points("0 0\n".as_bytes(), Some(2)).unwrap_err();
        assert!(matches!(err, PackedTreeError::InvalidInput(_)));
    }

    #[test]
    fn rejects_malformed_records() {
        for text in ["0 zero\n", "1\n", "1 2 3\n", "nan 1\n", "inf 0\n"] {
            let err = read_points(text.as_bytes(), None).unwrap_err();
            assert!(
                matches!(err, PackedTreeError::InvalidInput(ref msg) if msg.starts_with("Line 1")),
                "{text:?} gave {err}"
            );
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_points_from_path("does/not/exist.txt", None).unwrap_err();
        assert!(matches!(err, PackedTreeError::Io(_)));
    }
}
