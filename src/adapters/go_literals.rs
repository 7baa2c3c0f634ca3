//! Go string literal scanner.
//!
//! Walks Go source the way the Go scanner does for the purposes of host
//! extraction: comments and rune literals are skipped, raw (`` `...` ``) and
//! interpreted (`"..."`) strings come out as whole tokens with their escapes
//! resolved. Nothing else about the language is understood.

use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("invalid escape sequence")]
    InvalidEscape,

    #[error("invalid code point")]
    InvalidCodePoint,
}

/// Source is not lexically valid Go.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ScanError {
    pub line: usize,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    /// 1-based line of the opening quote.
    pub line: usize,
    /// The literal as written, quotes included.
    pub source: String,
    pub value: Result<String, LiteralError>,
}

/// Every string literal in `src`, in source order.
pub fn string_literals(src: &str) -> Result<Vec<StringLiteral>, ScanError> {
    let mut scanner = Scanner {
        input: src,
        chars: src.char_indices().peekable(),
        line: 1,
    };

    let mut literals = Vec::new();
    while let Some(literal) = scanner.next_literal()? {
        literals.push(literal);
    }
    Ok(literals)
}

struct Scanner<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
}

impl<'a> Scanner<'a> {
    fn next_literal(&mut self) -> Result<Option<StringLiteral>, ScanError> {
        while let Some((start, c)) = self.chars.next() {
            match c {
                '\n' => self.line += 1,
                '/' => match self.chars.peek() {
                    Some((_, '/')) => self.skip_line_comment(),
                    Some((_, '*')) => {
                        self.chars.next();
                        self.skip_block_comment()?;
                    }
                    _ => {}
                },
                '\'' => self.skip_rune()?,
                '`' => return self.raw_string(start).map(Some),
                '"' => return self.interpreted_string(start).map(Some),
                _ => {}
            }
        }
        Ok(None)
    }

    fn error(&self, line: usize, message: &'static str) -> ScanError {
        ScanError { line, message }
    }

    fn skip_line_comment(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c == '\n' {
                return;
            }
            self.chars.next();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), ScanError> {
        let line = self.line;
        while let Some((_, c)) = self.chars.next() {
            match c {
                '\n' => self.line += 1,
                '*' if matches!(self.chars.peek(), Some((_, '/'))) => {
                    self.chars.next();
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(self.error(line, "comment not terminated"))
    }

    fn skip_rune(&mut self) -> Result<(), ScanError> {
        while let Some((_, c)) = self.chars.next() {
            match c {
                '\\' => {
                    if let Some((_, '\n')) = self.chars.next() {
                        break;
                    }
                }
                '\'' => return Ok(()),
                '\n' => break,
                _ => {}
            }
        }
        Err(self.error(self.line, "rune literal not terminated"))
    }

    fn raw_string(&mut self, start: usize) -> Result<StringLiteral, ScanError> {
        let line = self.line;
        let mut value = String::new();

        while let Some((end, c)) = self.chars.next() {
            match c {
                '`' => {
                    return Ok(StringLiteral {
                        line,
                        source: self.input[start..end + 1].to_string(),
                        value: Ok(value),
                    });
                }
                // Go drops carriage returns from raw strings.
                '\r' => {}
                '\n' => {
                    self.line += 1;
                    value.push(c);
                }
                _ => value.push(c),
            }
        }
        Err(self.error(line, "raw string literal not terminated"))
    }

    fn interpreted_string(&mut self, start: usize) -> Result<StringLiteral, ScanError> {
        let line = self.line;

        while let Some((end, c)) = self.chars.next() {
            match c {
                '\\' => {
                    if !matches!(self.chars.peek(), Some((_, '\n')) | None) {
                        self.chars.next();
                    }
                }
                '"' => {
                    let source = &self.input[start..end + 1];
                    return Ok(StringLiteral {
                        line,
                        source: source.to_string(),
                        value: unquote(&source[1..source.len() - 1]),
                    });
                }
                '\n' => break,
                _ => {}
            }
        }
        Err(self.error(line, "string literal not terminated"))
    }
}

/// Resolves the escapes of an interpreted string body (quotes stripped).
pub fn unquote(body: &str) -> Result<String, LiteralError> {
    let mut out: Vec<u8> = Vec::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            push_char(&mut out, c);
            continue;
        }

        let escape = chars.next().ok_or(LiteralError::InvalidEscape)?;
        match escape {
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0b),
            '\\' => out.push(b'\\'),
            '"' => out.push(b'"'),
            'x' => out.push(read_digits(&mut chars, 2, 16)? as u8),
            'u' | 'U' => {
                let width = if escape == 'u' { 4 } else { 8 };
                let code = read_digits(&mut chars, width, 16)?;
                let decoded = char::from_u32(code).ok_or(LiteralError::InvalidCodePoint)?;
                push_char(&mut out, decoded);
            }
            '0'..='7' => {
                let rest = read_digits(&mut chars, 2, 8)?;
                let value = (escape as u32 - '0' as u32) * 64 + rest;
                out.push(u8::try_from(value).map_err(|_| LiteralError::InvalidEscape)?);
            }
            _ => return Err(LiteralError::InvalidEscape),
        }
    }

    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

fn read_digits(chars: &mut std::str::Chars<'_>, count: usize, radix: u32) -> Result<u32, LiteralError> {
    let mut value = 0u32;
    for _ in 0..count {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(radix))
            .ok_or(LiteralError::InvalidEscape)?;
        value = value * radix + digit;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(src: &str) -> Vec<String> {
        string_literals(src)
            .unwrap()
            .into_iter()
            .map(|literal| literal.value.unwrap())
            .collect()
    }

    #[test]
    fn test_comments_are_skipped() {
        let src = r#"// see "https://docs.acme.com/keys"
/* also "https://old.acme.com"
   spans lines */
u := "https://api.acme.com/v1" // trailing "https://x.acme.com"
"#;
        assert_eq!(values(src), vec!["https://api.acme.com/v1"]);
    }

    #[test]
    fn test_raw_string_is_one_token() {
        let src = "body := `{\"callback\": \"https://hooks.other.com/x\"}`\n";
        assert_eq!(
            values(src),
            vec![r#"{"callback": "https://hooks.other.com/x"}"#]
        );
    }

    #[test]
    fn test_raw_string_drops_carriage_returns() {
        assert_eq!(values("x := `a\r\nb`"), vec!["a\nb"]);
    }

    #[test]
    fn test_quote_and_slashes_inside_rune_or_string() {
        let src = r#"q := '"'
s := '\''
p := "// not a comment"
u := "https://api.acme.com""#;
        assert_eq!(values(src), vec!["// not a comment", "https://api.acme.com"]);
    }

    #[test]
    fn test_escapes_are_resolved() {
        let src = r#"a := "https://api.acme.com/v1?q=\"x\""
b := "tab\there \x41é\101\\""#;
        assert_eq!(
            values(src),
            vec![r#"https://api.acme.com/v1?q="x""#, "tab\there Aé\u{41}\\"]
        );
    }

    #[test]
    fn test_line_numbers_and_source() {
        let literals = string_literals("package x\n\n\nvar u = \"https://a.b\"\n").unwrap();
        assert_eq!(literals.len(), 1);
        assert_eq!(literals[0].line, 4);
        assert_eq!(literals[0].source, "\"https://a.b\"");
    }

    #[test]
    fn test_invalid_escape_is_reported_per_literal() {
        let literals = string_literals(r#"a := "bad \q escape"; b := "ok""#).unwrap();
        assert_eq!(literals[0].value, Err(LiteralError::InvalidEscape));
        assert_eq!(literals[1].value, Ok("ok".to_string()));
    }

    #[test]
    fn test_unterminated_literals_fail_the_scan() {
        assert!(string_literals("a := \"open\nb := 1").is_err());
        assert!(string_literals("a := `open").is_err());
        assert!(string_literals("/* open").is_err());
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r"\U0001F600").unwrap(), "\u{1F600}");
        assert_eq!(unquote(r"\ud800"), Err(LiteralError::InvalidCodePoint));
        assert_eq!(unquote(r"\400"), Err(LiteralError::InvalidEscape));
        assert_eq!(unquote(r"\x4"), Err(LiteralError::InvalidEscape));
    }
}
