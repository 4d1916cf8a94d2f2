//! Maps transcribed speech to answers.
//!
//! Recognisers often return homophones ("write" for "right", "see" for
//! "C"), so each answer carries a list of accepted spellings. Only the last
//! word is considered, falling back to the one before it to tolerate a
//! trailing filler word.

use crate::hotkeys::ResponseContext;
use vistrain_core::{Answer, Direction, DistanceDecision, Letter, Quadrant};

const DIRECTION_WORDS: &[(&str, Direction)] = &[
    ("up", Direction::Up),
    ("top", Direction::Up),
    ("above", Direction::Up),
    ("app", Direction::Up),
    ("uhp", Direction::Up),
    ("uh", Direction::Up),
    ("down", Direction::Down),
    ("bottom", Direction::Down),
    ("below", Direction::Down),
    ("don", Direction::Down),
    ("doubt", Direction::Down),
    ("left", Direction::Left),
    ("lift", Direction::Left),
    ("laughed", Direction::Left),
    ("lft", Direction::Left),
    ("right", Direction::Right),
    ("write", Direction::Right),
    ("wright", Direction::Right),
    ("rite", Direction::Right),
    ("light", Direction::Right),
    ("ride", Direction::Right),
];

const LETTER_WORDS: &[(&str, char)] = &[
    ("oh", 'O'),
    ("zero", 'O'),
    ("cue", 'Q'),
    ("queue", 'Q'),
    ("cute", 'Q'),
    ("see", 'C'),
    ("sea", 'C'),
    ("si", 'C'),
    ("dee", 'D'),
    ("the", 'D'),
    ("age", 'H'),
    ("ache", 'H'),
    ("aitch", 'H'),
    ("em", 'M'),
    ("am", 'M'),
    ("en", 'N'),
    ("and", 'N'),
    ("in", 'N'),
    ("kay", 'K'),
    ("okay", 'K'),
    ("cake", 'K'),
    ("ex", 'X'),
    ("acts", 'X'),
    ("eggs", 'X'),
    ("are", 'R'),
    ("our", 'R'),
    ("er", 'R'),
    ("es", 'S'),
    ("as", 'S'),
    ("ass", 'S'),
    ("yes", 'S'),
    ("zee", 'Z'),
    ("zed", 'Z'),
    ("said", 'Z'),
    ("vee", 'V'),
    ("we", 'V'),
    ("ve", 'V'),
    ("bee", 'V'),
];

const COMMAND_WORDS: &[(&str, DistanceDecision)] = &[
    ("stay", DistanceDecision::Stay),
    ("same", DistanceDecision::Stay),
    ("here", DistanceDecision::Stay),
    ("again", DistanceDecision::Stay),
    ("repeat", DistanceDecision::Stay),
    ("forward", DistanceDecision::MoveFurther),
    ("further", DistanceDecision::MoveFurther),
    ("farther", DistanceDecision::MoveFurther),
    ("next", DistanceDecision::MoveFurther),
    ("advance", DistanceDecision::MoveFurther),
    ("move", DistanceDecision::MoveFurther),
];

const NUMBER_WORDS: &[(&str, usize)] = &[
    ("one", 0),
    ("won", 0),
    ("two", 1),
    ("to", 1),
    ("too", 1),
    ("three", 2),
    ("tree", 2),
    ("four", 3),
    ("for", 3),
];

fn lookup<T: Copy>(table: &[(&str, T)], word: &str) -> Option<T> {
    table.iter().find(|(w, _)| *w == word).map(|(_, v)| *v)
}

fn letter(word: &str) -> Option<Letter> {
    let mut chars = word.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Letter::new(c);
    }
    lookup(LETTER_WORDS, word).and_then(Letter::new)
}

fn number(word: &str) -> Option<usize> {
    match word.parse::<usize>() {
        Ok(n @ 1..=4) => Some(n - 1),
        Ok(_) => None,
        Err(_) => lookup(NUMBER_WORDS, word),
    }
}

fn match_word(word: &str, context: ResponseContext) -> Option<Answer> {
    match context {
        ResponseContext::Tilt => lookup(DIRECTION_WORDS, word)
            .filter(|d| matches!(d, Direction::Left | Direction::Right))
            .map(Answer::from),
        ResponseContext::ChartDirections => lookup(DIRECTION_WORDS, word).map(Answer::from),
        ResponseContext::ChartLetters => letter(word).map(Answer::from),
        ResponseContext::Crowding => number(word).map(|i| Answer::Position(i as u8)),
        ResponseContext::Peripheral => number(word)
            .and_then(Quadrant::from_index)
            .map(Answer::from),
        ResponseContext::DistancePrompt => lookup(COMMAND_WORDS, word).map(Answer::from),
    }
}

fn words(transcript: &str) -> Vec<String> {
    let cleaned: String = transcript
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().map(str::to_owned).collect()
}

/// Match the final (or penultimate) word of a transcript against the
/// vocabulary of `context`. Distance commands are recognised in every
/// context so the chart prompt can be answered by voice.
pub fn match_transcript(transcript: &str, context: ResponseContext) -> Option<Answer> {
    let words = words(transcript);
    let tail = words.iter().rev().take(2);
    for word in tail.clone() {
        if let Some(answer) = match_word(word, context) {
            return Some(answer);
        }
    }
    tail.filter_map(|w| lookup(COMMAND_WORDS, w))
        .next()
        .map(Answer::from)
}

/// Distance command only, ignoring answer vocabularies.
pub fn match_command(transcript: &str) -> Option<DistanceDecision> {
    words(transcript)
        .iter()
        .rev()
        .take(2)
        .find_map(|w| lookup(COMMAND_WORDS, w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn homophones_map_to_directions() {
        assert_eq!(
            match_transcript("Write.", ResponseContext::ChartDirections),
            Some(Direction::Right.into())
        );
        assert_eq!(
            match_transcript("um it's below", ResponseContext::ChartDirections),
            Some(Direction::Down.into())
        );
    }

    #[test]
    fn penultimate_word_is_a_fallback() {
        assert_eq!(
            match_transcript("left please", ResponseContext::Tilt),
            Some(Direction::Left.into())
        );
        assert_eq!(match_transcript("up please", ResponseContext::Tilt), None);
    }

    #[test]
    fn letters_accept_single_chars_and_names() {
        let k = Letter::new('K').map(Answer::from);
        assert_eq!(match_transcript("okay", ResponseContext::ChartLetters), k);
        assert_eq!(match_transcript("k", ResponseContext::ChartLetters), k);
        assert_eq!(match_transcript("b", ResponseContext::ChartLetters), None);
    }

    #[test]
    fn numbers_select_positions() {
        assert_eq!(
            match_transcript("number three", ResponseContext::Crowding),
            Some(Answer::Position(2))
        );
        assert_eq!(
            match_transcript("2", ResponseContext::Peripheral),
            Some(Quadrant::TopLeft.into())
        );
    }

    #[test]
    fn commands_work_everywhere() {
        assert_eq!(
            match_transcript("move forward", ResponseContext::ChartLetters),
            Some(DistanceDecision::MoveFurther.into())
        );
        assert_eq!(match_command("let's stay"), Some(DistanceDecision::Stay));
        assert_eq!(match_command("hello"), None);
    }

    #[test]
    fn empty_transcript_matches_nothing() {
        assert_eq!(match_transcript("  ...  ", ResponseContext::ChartDirections), None);
    }
}
