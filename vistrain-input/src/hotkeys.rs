use vistrain_core::{Answer, Direction, DistanceDecision, Letter, Quadrant};

/// Toolkit-neutral key identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Digit(u8),
    Char(char),
}

/// Which kind of answer the active surface is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseContext {
    /// Left/right tilt report (orientation and contrast modes).
    Tilt,
    Crowding,
    Peripheral,
    ChartDirections,
    ChartLetters,
    DistancePrompt,
}

fn arrow(key: Key) -> Option<Direction> {
    match key {
        Key::ArrowUp => Some(Direction::Up),
        Key::ArrowDown => Some(Direction::Down),
        Key::ArrowLeft => Some(Direction::Left),
        Key::ArrowRight => Some(Direction::Right),
        _ => None,
    }
}

/// 1-based digit keys to a 0-based index.
fn digit_index(key: Key) -> Option<usize> {
    match key {
        Key::Digit(d @ 1..=4) => Some(d as usize - 1),
        Key::Char(c) => c
            .to_digit(10)
            .filter(|d| (1..=4).contains(d))
            .map(|d| d as usize - 1),
        _ => None,
    }
}

pub fn map_key(key: Key, context: ResponseContext) -> Option<Answer> {
    match context {
        ResponseContext::Tilt => match arrow(key)? {
            d @ (Direction::Left | Direction::Right) => Some(d.into()),
            _ => None,
        },
        ResponseContext::ChartDirections => arrow(key).map(Answer::from),
        ResponseContext::Crowding => digit_index(key).map(|i| Answer::Position(i as u8)),
        ResponseContext::Peripheral => digit_index(key)
            .and_then(Quadrant::from_index)
            .map(Answer::from),
        ResponseContext::ChartLetters => match key {
            Key::Char(c) => Letter::new(c).map(Answer::from),
            _ => None,
        },
        ResponseContext::DistancePrompt => match key {
            Key::ArrowLeft | Key::Char('s' | 'S') => Some(DistanceDecision::Stay.into()),
            Key::ArrowRight | Key::Enter | Key::Char('f' | 'F') => {
                Some(DistanceDecision::MoveFurther.into())
            }
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilt_ignores_vertical_arrows() {
        assert_eq!(map_key(Key::ArrowUp, ResponseContext::Tilt), None);
        assert_eq!(
            map_key(Key::ArrowLeft, ResponseContext::Tilt),
            Some(Direction::Left.into())
        );
    }

    #[test]
    fn digits_are_one_based() {
        assert_eq!(
            map_key(Key::Digit(1), ResponseContext::Crowding),
            Some(Answer::Position(0))
        );
        assert_eq!(
            map_key(Key::Char('4'), ResponseContext::Peripheral),
            Some(Quadrant::BottomRight.into())
        );
        assert_eq!(map_key(Key::Digit(5), ResponseContext::Crowding), None);
        assert_eq!(map_key(Key::Digit(0), ResponseContext::Peripheral), None);
    }

    #[test]
    fn letters_map_case_insensitively() {
        assert_eq!(
            map_key(Key::Char('k'), ResponseContext::ChartLetters),
            Letter::new('K').map(Answer::from)
        );
        assert_eq!(map_key(Key::Char('a'), ResponseContext::ChartLetters), None);
    }

    #[test]
    fn distance_prompt_keys() {
        assert_eq!(
            map_key(Key::Enter, ResponseContext::DistancePrompt),
            Some(DistanceDecision::MoveFurther.into())
        );
        assert_eq!(
            map_key(Key::Char('s'), ResponseContext::DistancePrompt),
            Some(DistanceDecision::Stay.into())
        );
    }
}
