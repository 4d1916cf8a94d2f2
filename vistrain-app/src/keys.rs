use vistrain_input::Key;
use winit::keyboard::KeyCode;

/// Shell commands bound to keys that never carry an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// Start, pause or resume the training session.
    Toggle,
    SwitchSurface,
    /// Next training mode, or the other chart vocabulary.
    CycleMode,
    CycleBinocular,
    WidenGap,
    NarrowGap,
}

pub fn command(code: KeyCode) -> Option<Command> {
    Some(match code {
        KeyCode::Escape => Command::Quit,
        KeyCode::Space => Command::Toggle,
        KeyCode::F1 => Command::SwitchSurface,
        KeyCode::F2 => Command::CycleMode,
        KeyCode::F3 => Command::CycleBinocular,
        KeyCode::BracketRight => Command::WidenGap,
        KeyCode::BracketLeft => Command::NarrowGap,
        _ => return None,
    })
}

pub fn answer_key(code: KeyCode) -> Option<Key> {
    use KeyCode::*;
    let key = match code {
        ArrowUp => Key::ArrowUp,
        ArrowDown => Key::ArrowDown,
        ArrowLeft => Key::ArrowLeft,
        ArrowRight => Key::ArrowRight,
        Enter | NumpadEnter => Key::Enter,
        Digit1 | Numpad1 => Key::Digit(1),
        Digit2 | Numpad2 => Key::Digit(2),
        Digit3 | Numpad3 => Key::Digit(3),
        Digit4 | Numpad4 => Key::Digit(4),
        _ => return letter(code).map(Key::Char),
    };
    Some(key)
}

fn letter(code: KeyCode) -> Option<char> {
    use KeyCode::*;
    const LETTERS: [(KeyCode, char); 26] = [
        (KeyA, 'a'), (KeyB, 'b'), (KeyC, 'c'), (KeyD, 'd'), (KeyE, 'e'), (KeyF, 'f'),
        (KeyG, 'g'), (KeyH, 'h'), (KeyI, 'i'), (KeyJ, 'j'), (KeyK, 'k'), (KeyL, 'l'),
        (KeyM, 'm'), (KeyN, 'n'), (KeyO, 'o'), (KeyP, 'p'), (KeyQ, 'q'), (KeyR, 'r'),
        (KeyS, 's'), (KeyT, 't'), (KeyU, 'u'), (KeyV, 'v'), (KeyW, 'w'), (KeyX, 'x'),
        (KeyY, 'y'), (KeyZ, 'z'),
    ];
    LETTERS.iter().find(|(k, _)| *k == code).map(|&(_, c)| c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vistrain_core::{Answer, Letter};
    use vistrain_input::{map_key, ResponseContext};

    #[test]
    fn commands_and_answers_do_not_overlap() {
        for code in [KeyCode::Escape, KeyCode::Space, KeyCode::F1, KeyCode::BracketLeft] {
            assert!(command(code).is_some());
            assert_eq!(answer_key(code), None);
        }
    }

    #[test]
    fn physical_letters_reach_the_chart() {
        let key = answer_key(KeyCode::KeyZ).unwrap();
        assert_eq!(
            map_key(key, ResponseContext::ChartLetters),
            Letter::new('Z').map(Answer::from)
        );
        assert_eq!(answer_key(KeyCode::Numpad3), Some(Key::Digit(3)));
    }
}
