use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EscapeError {
    #[error("string ends with a lone backslash")]
    Dangling,
    #[error("truncated \\{0} escape")]
    Truncated(char),
    #[error("invalid hex digits in \\{0} escape")]
    BadHex(char),
    #[error("escape encodes invalid code point {0:#x}")]
    BadCodePoint(u32),
}

/// Expand backslash escapes (`\uXXXX`, `\UXXXXXXXX`, `\xHH`, `\n`, `\\`, ...)
/// left in upstream text. Already-decoded characters pass through untouched
/// and unknown escapes are kept verbatim.
pub fn decode_unicode_escapes(input: &str) -> Result<String, EscapeError> {
    if !input.contains('\\') {
        return Ok(input.to_string());
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            return Err(EscapeError::Dangling);
        };
        match esc {
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'x' => out.push(code_point(read_hex(&mut chars, 'x', 2)?)?),
            'U' => out.push(code_point(read_hex(&mut chars, 'U', 8)?)?),
            'u' => {
                let hi = read_hex(&mut chars, 'u', 4)?;
                if (0xD800..0xDC00).contains(&hi) {
                    // High surrogate: only meaningful when a low one follows.
                    let mut lookahead = chars.clone();
                    if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
                        let lo = read_hex(&mut lookahead, 'u', 4)?;
                        if (0xDC00..0xE000).contains(&lo) {
                            chars = lookahead;
                            out.push(code_point(0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00))?);
                            continue;
                        }
                    }
                    return Err(EscapeError::BadCodePoint(hi));
                }
                out.push(code_point(hi)?);
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    Ok(out)
}

/// Decode a team name for publication, falling back to the raw text.
pub fn display_name(raw: &str) -> String {
    match decode_unicode_escapes(raw) {
        Ok(s) => s,
        Err(e) => {
            warn!("Could not decode '{}': {}", raw, e);
            raw.to_string()
        }
    }
}

fn read_hex<I>(chars: &mut I, kind: char, digits: usize) -> Result<u32, EscapeError>
where
    I: Iterator<Item = char>,
{
    let mut value = 0u32;
    for _ in 0..digits {
        let c = chars.next().ok_or(EscapeError::Truncated(kind))?;
        let d = c.to_digit(16).ok_or(EscapeError::BadHex(kind))?;
        value = value * 16 + d;
    }
    Ok(value)
}

fn code_point(v: u32) -> Result<char, EscapeError> {
    char::from_u32(v).ok_or(EscapeError::BadCodePoint(v))
}
