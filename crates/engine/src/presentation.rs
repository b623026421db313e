//! Textual rendering of raw room coordinates
//!
//! The domain always reports positions as `{"x", "y"}` in meters. What the
//! agent sees is chosen here: plain coordinates, nothing at all, or a square
//! on an 8x8 board laid over the room.

use std::fmt;
use std::str::FromStr;

use roomsense_domain::{Position, Room};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Board size used by [`PositionFormat::Chessboard`]
const BOARD: f64 = 8.0;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum PresentationError {
    #[error("Invalid board square '{0}': expected a file a-h followed by a rank 1-8")]
    InvalidSquare(String),

    #[error("Position format '{0}' cannot be parsed back into coordinates")]
    NotParseable(PositionFormat),

    #[error("Unknown position format: {0}")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionFormat {
    /// `(x, y)` in meters from the room origin
    #[default]
    Relative,
    /// Every position reads "in the current room"
    Roomless,
    /// Square of an 8x8 board stretched over the room, `a1`..`h8`
    Chessboard,
}

impl fmt::Display for PositionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relative => write!(f, "relative"),
            Self::Roomless => write!(f, "roomless"),
            Self::Chessboard => write!(f, "chessboard"),
        }
    }
}

impl FromStr for PositionFormat {
    type Err = PresentationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relative" => Ok(Self::Relative),
            "roomless" => Ok(Self::Roomless),
            "chessboard" | "chess" => Ok(Self::Chessboard),
            other => Err(PresentationError::UnknownFormat(other.to_string())),
        }
    }
}

impl PositionFormat {
    pub fn render(&self, position: Position, room: &Room) -> String {
        match self {
            Self::Relative => format!("({}, {})", position.x, position.y),
            Self::Roomless => "in the current room".to_string(),
            Self::Chessboard => to_square(position, room),
        }
    }

    /// Coordinates for a textual position. Board squares map to the centre
    /// of the square.
    pub fn parse(&self, text: &str, room: &Room) -> Result<Position, PresentationError> {
        match self {
            Self::Chessboard => from_square(text, room),
            Self::Relative => parse_pair(text),
            Self::Roomless => Err(PresentationError::NotParseable(*self)),
        }
    }

    /// Replace every `"position": {"x", "y"}` object inside `payload`
    /// with its rendered form.
    pub fn rewrite(&self, payload: &mut Value, room: &Room) {
        match payload {
            Value::Array(items) => {
                for item in items {
                    self.rewrite(item, room);
                }
            }
            Value::Object(map) => {
                for (key, value) in map.iter_mut() {
                    if key == "position" {
                        if let Some(position) = as_position(value) {
                            *value = Value::from(self.render(position, room));
                            continue;
                        }
                    }
                    self.rewrite(value, room);
                }
            }
            _ => {}
        }
    }
}

fn as_position(value: &Value) -> Option<Position> {
    let x = value.get("x")?.as_f64()?;
    let y = value.get("y")?.as_f64()?;
    Some(Position::new(x, y))
}

/// Index of the board cell covering `value` on an axis of length `extent`.
fn cell(value: f64, extent: f64) -> u8 {
    if extent <= 0.0 {
        return 0;
    }
    ((value / extent) * BOARD).floor().clamp(0.0, BOARD - 1.0) as u8
}

fn to_square(position: Position, room: &Room) -> String {
    let file = (b'a' + cell(position.x, room.extend_x())) as char;
    let rank = 8 - cell(position.y, room.extend_y());
    format!("{}{}", file, rank)
}

fn from_square(text: &str, room: &Room) -> Result<Position, PresentationError> {
    let invalid = || PresentationError::InvalidSquare(text.to_string());
    let mut chars = text.trim().chars();
    let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(invalid());
    };

    let file = file.to_ascii_lowercase();
    if !('a'..='h').contains(&file) {
        return Err(invalid());
    }
    let rank = rank.to_digit(10).filter(|r| (1..=8).contains(r)).ok_or_else(invalid)?;

    let column = f64::from(file as u8 - b'a');
    let row = f64::from(8 - rank);
    Ok(Position::new(
        (column + 0.5) / BOARD * room.extend_x(),
        (row + 0.5) / BOARD * room.extend_y(),
    ))
}

fn parse_pair(text: &str) -> Result<Position, PresentationError> {
    let invalid = || PresentationError::InvalidSquare(text.to_string());
    let inner = text.trim().trim_start_matches('(').trim_end_matches(')');
    let (x, y) = inner.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse::<f64>().map_err(|_| invalid())?;
    let y = y.trim().parse::<f64>().map_err(|_| invalid())?;
    Ok(Position::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn room() -> Room {
        Room::new("main", 4.0, 4.0)
    }

    #[test]
    fn relative_matches_plain_coordinates() {
        let format = PositionFormat::Relative;
        assert_eq!(format.render(Position::new(4.0, 1.75), &room()), "(4, 1.75)");
        assert_eq!(
            format.parse("(4, 1.75)", &room()).unwrap(),
            Position::new(4.0, 1.75)
        );
    }

    #[test]
    fn chessboard_corners() {
        let format = PositionFormat::Chessboard;
        assert_eq!(format.render(Position::new(0.0, 0.0), &room()), "a8");
        assert_eq!(format.render(Position::new(4.0, 4.0), &room()), "h1");
        assert_eq!(format.render(Position::new(2.1, 0.6), &room()), "e7");
    }

    #[test]
    fn chessboard_parses_to_square_centre() {
        let format = PositionFormat::Chessboard;
        let position = format.parse("A8", &room()).unwrap();
        assert_eq!(position, Position::new(0.25, 0.25));
        assert_eq!(format.render(position, &room()), "a8");

        let position = format.parse("h1", &room()).unwrap();
        assert_eq!(position, Position::new(3.75, 3.75));
    }

    #[test]
    fn chessboard_rejects_bad_squares() {
        let format = PositionFormat::Chessboard;
        for bad in ["i1", "a9", "a0", "a", "a10", ""] {
            assert!(
                matches!(format.parse(bad, &room()), Err(PresentationError::InvalidSquare(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn roomless_hides_coordinates() {
        let format = PositionFormat::Roomless;
        assert_eq!(format.render(Position::new(1.0, 2.0), &room()), "in the current room");
        assert!(format.parse("anything", &room()).is_err());
    }

    #[test]
    fn rewrite_only_touches_position_objects() {
        let mut payload = json!([
            { "name": "table", "position": { "x": 0.0, "y": 3.0 },
              "contents": [{ "name": "key" }] },
            { "name": "note", "position": "already text" }
        ]);
        PositionFormat::Relative.rewrite(&mut payload, &room());
        assert_eq!(payload[0]["position"], "(0, 3)");
        assert_eq!(payload[0]["contents"][0]["name"], "key");
        assert_eq!(payload[1]["position"], "already text");
    }

    #[test]
    fn format_names_round_trip() {
        for format in [
            PositionFormat::Relative,
            PositionFormat::Roomless,
            PositionFormat::Chessboard,
        ] {
            assert_eq!(format.to_string().parse::<PositionFormat>().unwrap(), format);
        }
        assert!("hex".parse::<PositionFormat>().is_err());
    }
}
