use serde::{Deserialize, Serialize};
use std::fmt;

/// Four-way direction used by tilt reports and tumbling-E optotypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Clockwise rotation applied to a right-facing glyph.
    pub fn rotation_degrees(self) -> f32 {
        match self {
            Direction::Right => 0.0,
            Direction::Down => 90.0,
            Direction::Left => 180.0,
            Direction::Up => 270.0,
        }
    }
}

/// Side a Gabor patch leans towards in the left/right discrimination task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TiltSide {
    Left,
    Right,
}

impl TiltSide {
    pub fn as_direction(self) -> Direction {
        match self {
            TiltSide::Left => Direction::Left,
            TiltSide::Right => Direction::Right,
        }
    }

    /// Signed orientation for a tilt magnitude: left is negative.
    pub fn signed(self, magnitude: f64) -> f64 {
        match self {
            TiltSide::Left => -magnitude,
            TiltSide::Right => magnitude,
        }
    }
}

/// A letter from the confusable optotype set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Letter(char);

impl Letter {
    pub const CONFUSABLE: [char; 13] = [
        'O', 'Q', 'C', 'D', 'H', 'M', 'N', 'K', 'X', 'R', 'S', 'Z', 'V',
    ];

    pub const ALL: [Letter; 13] = [
        Letter('O'), Letter('Q'), Letter('C'), Letter('D'), Letter('H'), Letter('M'), Letter('N'),
        Letter('K'), Letter('X'), Letter('R'), Letter('S'), Letter('Z'), Letter('V'),
    ];

    /// Case-insensitive; `None` for characters outside the confusable set.
    pub fn new(c: char) -> Option<Self> {
        let upper = c.to_ascii_uppercase();
        Self::CONFUSABLE
            .contains(&upper)
            .then_some(Letter(upper))
    }

    pub fn all() -> impl Iterator<Item = Letter> {
        Self::ALL.into_iter()
    }

    pub fn as_char(self) -> char {
        self.0
    }
}

impl TryFrom<char> for Letter {
    type Error = String;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Letter::new(c).ok_or_else(|| format!("'{c}' is not an optotype letter"))
    }
}

impl From<Letter> for char {
    fn from(l: Letter) -> char {
        l.0
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Screen quadrant for peripheral trials, indexed 0..4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    TopRight,
    TopLeft,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopRight,
        Quadrant::TopLeft,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    /// Patch centre as fractions of the viewport.
    pub fn anchor(self) -> (f32, f32) {
        match self {
            Quadrant::TopRight => (0.7, 0.3),
            Quadrant::TopLeft => (0.3, 0.3),
            Quadrant::BottomLeft => (0.3, 0.7),
            Quadrant::BottomRight => (0.7, 0.7),
        }
    }
}

/// Outcome of the distance prompt shown after a completed chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceDecision {
    Stay,
    MoveFurther,
}

/// A candidate response from any input channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
    Direction(Direction),
    Letter(Letter),
    /// Crowding patch index, row-major in a 2x2 grid.
    Position(u8),
    Quadrant(Quadrant),
    Distance(DistanceDecision),
}

impl From<Direction> for Answer {
    fn from(d: Direction) -> Self {
        Answer::Direction(d)
    }
}

impl From<Letter> for Answer {
    fn from(l: Letter) -> Self {
        Answer::Letter(l)
    }
}

impl From<Quadrant> for Answer {
    fn from(q: Quadrant) -> Self {
        Answer::Quadrant(q)
    }
}

impl From<DistanceDecision> for Answer {
    fn from(d: DistanceDecision) -> Self {
        Answer::Distance(d)
    }
}

/// The answers a trial will accept. Order is presentation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSet(Vec<Answer>);

impl AnswerSet {
    pub fn tilt() -> Self {
        Self(vec![Direction::Left.into(), Direction::Right.into()])
    }

    pub fn directions() -> Self {
        Direction::ALL.iter().map(|&d| Answer::from(d)).collect()
    }

    pub fn positions(count: u8) -> Self {
        (0..count).map(Answer::Position).collect()
    }

    pub fn quadrants() -> Self {
        Quadrant::ALL.iter().map(|&q| Answer::from(q)).collect()
    }

    pub fn letters(choices: &[Letter]) -> Self {
        choices.iter().map(|&l| Answer::from(l)).collect()
    }

    pub fn distance() -> Self {
        Self(vec![
            DistanceDecision::Stay.into(),
            DistanceDecision::MoveFurther.into(),
        ])
    }

    pub fn contains(&self, answer: &Answer) -> bool {
        self.0.contains(answer)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Answer> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Answer> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = Answer>>(iter: I) -> Self {
        let mut out = Vec::new();
        for a in iter {
            if !out.contains(&a) {
                out.push(a);
            }
        }
        Self(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_table_matches_confusable_set() {
        let chars: Vec<char> = Letter::all().map(Letter::as_char).collect();
        assert_eq!(chars, Letter::CONFUSABLE);
        assert!(Letter::ALL.iter().all(|&l| Letter::new(l.as_char()) == Some(l)));
    }

    #[test]
    fn letters_outside_the_set_are_rejected() {
        assert_eq!(Letter::new('q').map(Letter::as_char), Some('Q'));
        assert!(Letter::new('A').is_none());
        assert!(Letter::new('7').is_none());
    }

    #[test]
    fn answer_set_deduplicates() {
        let set: AnswerSet = [Answer::Position(1), Answer::Position(1), Answer::Position(2)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Answer::Position(2)));
        assert!(!set.contains(&Answer::Position(0)));
    }

    #[test]
    fn tilt_set_only_accepts_horizontal_directions() {
        let set = AnswerSet::tilt();
        assert!(set.contains(&Direction::Left.into()));
        assert!(!set.contains(&Direction::Up.into()));
    }
}
