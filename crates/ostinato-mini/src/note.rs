use crate::error::ParseError;
use crate::span::Span;

/// Parses a note name like `c4`, `c#3`, or `db3` into a MIDI number.
///
/// The layout is letter, optional accidental (`#` or `b`), octave digit.
/// Octave 4 holds middle C, so `c4` is 60 and `a4` is 69. Enharmonic
/// spellings map to the same number: `c#3` and `db3` are both 49.
pub fn parse_note(text: &str, span: Span) -> Result<u8, ParseError> {
    let invalid = || ParseError::InvalidNote {
        text: text.to_string(),
        span,
    };

    let mut chars = text.chars();
    let letter = chars.next().ok_or_else(invalid)?;
    let pitch_class: i64 = match letter.to_ascii_lowercase() {
        'c' => 0,
        'd' => 2,
        'e' => 4,
        'f' => 5,
        'g' => 7,
        'a' => 9,
        'b' => 11,
        _ => return Err(invalid()),
    };

    let mut next = chars.next().ok_or_else(invalid)?;
    let accidental: i64 = match next {
        '#' => {
            next = chars.next().ok_or_else(invalid)?;
            1
        }
        'b' => {
            next = chars.next().ok_or_else(invalid)?;
            -1
        }
        _ => 0,
    };

    let octave = next.to_digit(10).ok_or_else(invalid)? as i64;
    if chars.next().is_some() {
        return Err(invalid());
    }

    let midi = (octave + 1) * 12 + pitch_class + accidental;
    if !(0..=127).contains(&midi) {
        return Err(ParseError::NoteOutOfRange { value: midi, span });
    }
    Ok(midi as u8)
}

/// Converts a pattern-level voice number (1 to 12) to a zero-based voice
/// index.
pub fn voice_index(value: f64, span: Span) -> Result<usize, ParseError> {
    if value.fract() != 0.0 {
        return Err(ParseError::invalid("voice must be an integer", span));
    }
    let value = value as i64;
    if !(1..=12).contains(&value) {
        return Err(ParseError::VoiceOutOfRange { value, span });
    }
    Ok((value - 1) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(text: &str) -> Result<u8, ParseError> {
        parse_note(text, Span::new(0, text.len()))
    }

    #[test]
    fn middle_c_and_concert_a() {
        assert_eq!(note("c4"), Ok(60));
        assert_eq!(note("a4"), Ok(69));
    }

    #[test]
    fn enharmonic_spellings_agree() {
        assert_eq!(note("c#3"), Ok(49));
        assert_eq!(note("db3"), Ok(49));
    }

    #[test]
    fn accidentals_and_octaves() {
        assert_eq!(note("c0"), Ok(12));
        assert_eq!(note("e2"), Ok(40));
        assert_eq!(note("bb3"), Ok(58));
        assert_eq!(note("g9"), Ok(127));
    }

    #[test]
    fn rejects_malformed_names() {
        for bad in ["h3", "c", "c#", "4c", "c44", "c4\"", ""] {
            let err = note(bad).unwrap_err();
            assert!(
                err.to_string().contains("invalid note"),
                "expected invalid note error for {bad:?}, got {err}"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_octaves() {
        assert!(matches!(
            note("a9"),
            Err(ParseError::NoteOutOfRange { value: 129, .. })
        ));
    }

    #[test]
    fn voice_numbers_are_one_based() {
        let span = Span::new(0, 1);
        assert_eq!(voice_index(1.0, span), Ok(0));
        assert_eq!(voice_index(12.0, span), Ok(11));
        assert!(matches!(
            voice_index(0.0, span),
            Err(ParseError::VoiceOutOfRange { value: 0, .. })
        ));
        assert!(matches!(
            voice_index(13.0, span),
            Err(ParseError::VoiceOutOfRange { value: 13, .. })
        ));
    }
}
