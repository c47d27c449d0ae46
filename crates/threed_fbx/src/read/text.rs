//! Scanner for text documents.
//!
//! ```text
//! ; comments run to the end of the line
//! Objects:  {
//!     Geometry: 1000, "Geometry::Cube", "Mesh" {
//!         Vertices: *6 {
//!             a: 0,0,0,1,1,1
//!         }
//!     }
//! }
//! ```
//!
//! Scanning happens in two steps. The lexer splits the text into brackets, commas, keys and
//! data words; a bare word becomes a key when a `:` follows it on the same line. The fold step
//! then types every data word and collapses array literals (`*N { a: ... }`) into one data
//! token, so text and binary documents reach the parser as the same token kinds.

use std::iter::Peekable;
use std::vec::IntoIter;

use tracing::{debug, instrument, trace};

use crate::error::{GrammarError, GrammarErrorKind, Result};
use crate::token::{Position, Scanner, Token, TokenKind};
use crate::value::{parse_integer, parse_real, PropertyValue};

/// Key introducing the elements of an array literal
const ARRAY_KEY: &str = "a";

#[derive(Debug, Clone, PartialEq)]
enum Lexeme {
    Open,
    Close,
    Comma,
    Key(String),
    Word(String),
    Quoted(String),
}

impl Lexeme {
    fn describe(&self) -> String {
        match self {
            Lexeme::Open => "`{`".into(),
            Lexeme::Close => "`}`".into(),
            Lexeme::Comma => "`,`".into(),
            Lexeme::Key(key) => format!("key `{}`", key),
            Lexeme::Word(word) => format!("`{}`", word),
            Lexeme::Quoted(text) => format!("{:?}", text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Lexed {
    lexeme: Lexeme,
    position: Position,
}

fn at(line: usize, column: usize) -> Position {
    Position::LineColumn { line, column }
}

/// A bare word being collected: byte index where it starts and its position
#[derive(Debug, Clone, Copy)]
struct Pending {
    start: usize,
    line: usize,
    column: usize,
}

struct Lexer<'a> {
    text: &'a str,
    output: Vec<Lexed>,
    pending: Option<Pending>,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            output: Vec::new(),
            pending: None,
        }
    }

    fn push(&mut self, lexeme: Lexeme, line: usize, column: usize) {
        self.output.push(Lexed {
            lexeme,
            position: at(line, column),
        });
    }

    /// Emit the pending word, which ends before byte `end`, as a key or as data
    fn flush(&mut self, end: usize, as_key: bool) {
        if let Some(pending) = self.pending.take() {
            let word = self.text[pending.start..end].to_owned();
            let lexeme = if as_key {
                Lexeme::Key(word)
            } else {
                Lexeme::Word(word)
            };
            self.push(lexeme, pending.line, pending.column);
        }
    }

    fn run(mut self) -> Result<Vec<Lexed>> {
        let text = self.text;
        let bytes = text.as_bytes();
        let mut line = 1;
        let mut column = 0;
        let mut i = 0;

        while i < bytes.len() {
            let c = bytes[i];
            // Count characters, not UTF-8 continuation bytes
            if c & 0xc0 != 0x80 {
                column += 1;
            }

            match c {
                b'\n' => {
                    self.flush(i, false);
                    line += 1;
                    column = 0;
                }
                b';' => {
                    self.flush(i, false);
                    while i + 1 < bytes.len() && bytes[i + 1] != b'\n' {
                        i += 1;
                    }
                }
                b'"' => {
                    self.flush(i, false);
                    let (start_line, start_column) = (line, column);
                    let start = i + 1;
                    loop {
                        i += 1;
                        match bytes.get(i) {
                            None => {
                                return Err(GrammarError::new(
                                    GrammarErrorKind::UnterminatedString,
                                    at(start_line, start_column),
                                )
                                .into())
                            }
                            Some(b'"') => break,
                            Some(b'\n') => {
                                line += 1;
                                column = 0;
                            }
                            Some(b) if b & 0xc0 != 0x80 => column += 1,
                            Some(_) => {}
                        }
                    }
                    column += 1;
                    let quoted = self.text[start..i].to_owned();
                    self.push(Lexeme::Quoted(quoted), start_line, start_column);
                }
                b'{' => {
                    self.flush(i, true);
                    self.push(Lexeme::Open, line, column);
                }
                b'}' => {
                    self.flush(i, false);
                    self.push(Lexeme::Close, line, column);
                }
                b',' => {
                    self.flush(i, false);
                    self.push(Lexeme::Comma, line, column);
                }
                b':' => {
                    if self.pending.is_none() {
                        return Err(
                            GrammarError::new(GrammarErrorKind::StrayColon, at(line, column))
                                .into(),
                        );
                    }
                    self.flush(i, true);
                }
                c if c.is_ascii_whitespace() => {
                    if self.pending.is_some() {
                        let mut j = i + 1;
                        while j < bytes.len() && bytes[j] != b'\n' && bytes[j].is_ascii_whitespace()
                        {
                            j += 1;
                        }
                        if bytes.get(j) == Some(&b':') {
                            self.flush(i, true);
                            column += j - i;
                            i = j;
                        } else {
                            self.flush(i, false);
                        }
                    }
                }
                _ => {
                    if self.pending.is_none() {
                        self.pending = Some(Pending {
                            start: i,
                            line,
                            column,
                        });
                    }
                }
            }
            i += 1;
        }

        self.flush(bytes.len(), false);
        Ok(self.output)
    }
}

/// Declared length of an array literal header such as `*24`
fn array_length(word: &str) -> Option<usize> {
    let digits = word.strip_prefix('*')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn unexpected(lexed: &Lexed, expected: &'static str) -> GrammarError {
    GrammarError::new(
        GrammarErrorKind::UnexpectedToken {
            found: lexed.lexeme.describe(),
            expected,
        },
        lexed.position,
    )
}

/// Consume `{ a: v, v, ... }` following an array header at `position`
fn fold_array(
    lexemes: &mut Peekable<IntoIter<Lexed>>,
    declared: usize,
    position: Position,
) -> Result<PropertyValue> {
    // The opening bracket was peeked by the caller
    lexemes.next();
    if matches!(lexemes.peek(), Some(Lexed { lexeme: Lexeme::Key(key), .. }) if key == ARRAY_KEY)
    {
        lexemes.next();
    }

    let mut words = Vec::with_capacity(declared);
    loop {
        let Some(lexed) = lexemes.next() else {
            return Err(GrammarError::new(
                GrammarErrorKind::UnexpectedEnd {
                    expected: "`}` closing the array literal",
                },
                position,
            )
            .into());
        };
        match &lexed.lexeme {
            Lexeme::Close => break,
            Lexeme::Comma => {}
            Lexeme::Word(word) => words.push((word.clone(), lexed.position)),
            _ => return Err(unexpected(&lexed, "an array element").into()),
        }
    }

    if words.len() != declared {
        return Err(GrammarError::new(
            GrammarErrorKind::ArrayCountMismatch {
                declared,
                actual: words.len(),
            },
            position,
        )
        .into());
    }

    let integers: Option<Vec<i64>> = words.iter().map(|(w, _)| parse_integer(w)).collect();
    if let Some(integers) = integers {
        return Ok(PropertyValue::Int64Array(integers));
    }

    let reals = words
        .into_iter()
        .map(|(word, position)| {
            parse_real(&word).ok_or_else(|| {
                GrammarError::new(GrammarErrorKind::InvalidArrayElement(word), position)
            })
        })
        .collect::<core::result::Result<Vec<f64>, _>>()?;
    Ok(PropertyValue::Float64Array(reals))
}

fn fold(lexemes: Vec<Lexed>) -> Result<Vec<Token>> {
    let mut tokens = Vec::with_capacity(lexemes.len());
    let mut lexemes = lexemes.into_iter().peekable();

    while let Some(Lexed { lexeme, position }) = lexemes.next() {
        let kind = match lexeme {
            Lexeme::Open => TokenKind::OpenScope,
            Lexeme::Close => TokenKind::CloseScope,
            Lexeme::Comma => TokenKind::Separator,
            Lexeme::Key(key) => TokenKind::Key(key),
            Lexeme::Quoted(text) => TokenKind::Data(PropertyValue::String(text)),
            Lexeme::Word(word) => {
                let opens_array = matches!(
                    lexemes.peek(),
                    Some(Lexed {
                        lexeme: Lexeme::Open,
                        ..
                    })
                );
                match array_length(&word) {
                    Some(declared) if opens_array => {
                        trace!(%position, declared, "array literal");
                        TokenKind::Data(fold_array(&mut lexemes, declared, position)?)
                    }
                    _ => TokenKind::Data(PropertyValue::from_literal(&word)),
                }
            }
        };
        tokens.push(Token::new(kind, position));
    }
    Ok(tokens)
}

/// [`Scanner`] for text documents
#[derive(Debug, Default, Clone, Copy)]
pub struct TextScanner;

impl TextScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Scanner for TextScanner {
    #[instrument(skip_all, fields(length = buffer.len()))]
    fn scan(&self, buffer: &[u8]) -> Result<Vec<Token>> {
        let text = std::str::from_utf8(buffer)?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let lexemes = Lexer::new(text).run()?;
        trace!(lexemes = lexemes.len(), "lexed text document");
        let tokens = fold(lexemes)?;

        debug!(tokens = tokens.len(), "text scan complete");
        Ok(tokens)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::TextScanner;
    use crate::error::{Error, GrammarError, GrammarErrorKind, Result};
    use crate::token::{Position, Scanner, Token, TokenKind};
    use crate::value::PropertyValue;

    fn scan(text: &str) -> Result<Vec<Token>> {
        TextScanner::new().scan(text.as_bytes())
    }

    fn kinds(text: &str) -> Result<Vec<TokenKind>> {
        Ok(scan(text)?.into_iter().map(|t| t.kind).collect())
    }

    fn grammar(result: Result<Vec<Token>>) -> GrammarError {
        match result {
            Err(Error::Grammar(e)) => e,
            other => panic!("expected a grammar error, got {:?}", other),
        }
    }

    fn key(k: &str) -> TokenKind {
        TokenKind::Key(k.into())
    }

    fn string(s: &str) -> TokenKind {
        TokenKind::Data(PropertyValue::String(s.into()))
    }

    #[test]
    fn keys_and_values() -> Result<()> {
        assert_eq!(
            kinds("Creator: \"Blender\", 7400, 0.5, T\n")?,
            vec![
                key("Creator"),
                string("Blender"),
                TokenKind::Separator,
                TokenKind::Data(PropertyValue::Int64(7400)),
                TokenKind::Separator,
                TokenKind::Data(PropertyValue::Float64(0.5)),
                TokenKind::Separator,
                string("T"),
            ]
        );
        Ok(())
    }

    #[test]
    fn key_reclassified_across_horizontal_whitespace() -> Result<()> {
        assert_eq!(
            kinds("Version \t: 100")?,
            vec![key("Version"), TokenKind::Data(PropertyValue::Int64(100))]
        );
        // A colon on the next line does not make a key
        assert!(matches!(
            grammar(scan("Version\n: 100")).kind,
            GrammarErrorKind::StrayColon
        ));
        Ok(())
    }

    #[test]
    fn scopes_and_comments() -> Result<()> {
        let text = "; FBX 7.4.0 project file\n\
                    ; ----------------------\n\
                    Objects:  { ; objects: follow\n\
                    \tModel: 1, \"Model::Cube\" {\n\
                    \t}\n\
                    }\n";
        assert_eq!(
            kinds(text)?,
            vec![
                key("Objects"),
                TokenKind::OpenScope,
                key("Model"),
                TokenKind::Data(PropertyValue::Int64(1)),
                TokenKind::Separator,
                string("Model::Cube"),
                TokenKind::OpenScope,
                TokenKind::CloseScope,
                TokenKind::CloseScope,
            ]
        );
        Ok(())
    }

    #[test]
    fn positions_are_line_and_column() -> Result<()> {
        let tokens = scan("A: 1\n  B: \"x\"")?;
        let positions: Vec<Position> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(
            positions,
            vec![
                Position::LineColumn { line: 1, column: 1 },
                Position::LineColumn { line: 1, column: 4 },
                Position::LineColumn { line: 2, column: 3 },
                Position::LineColumn { line: 2, column: 6 },
            ]
        );
        Ok(())
    }

    #[test]
    fn folds_array_literals() -> Result<()> {
        let text = "Vertices: *6 {\n\ta: 0,1,2,\n3.5,4,-5e-1\n}\n\
                    PolygonVertexIndex: *3 {\n\ta: 0,1,-3\n}\n\
                    Empty: *0 {\n}\n";
        assert_eq!(
            kinds(text)?,
            vec![
                key("Vertices"),
                TokenKind::Data(PropertyValue::Float64Array(vec![
                    0.0, 1.0, 2.0, 3.5, 4.0, -0.5
                ])),
                key("PolygonVertexIndex"),
                TokenKind::Data(PropertyValue::Int64Array(vec![0, 1, -3])),
                key("Empty"),
                TokenKind::Data(PropertyValue::Int64Array(vec![])),
            ]
        );
        Ok(())
    }

    #[test]
    fn rejects_array_count_mismatch() {
        let error = grammar(scan("Vertices: *4 {\n\ta: 0,1,2\n}\n"));
        assert_eq!(
            error,
            GrammarError::new(
                GrammarErrorKind::ArrayCountMismatch {
                    declared: 4,
                    actual: 3
                },
                Position::LineColumn { line: 1, column: 11 }
            )
        );
    }

    #[test]
    fn rejects_non_numeric_array_element() {
        let error = grammar(scan("Vertices: *2 {\n\ta: 0,x\n}\n"));
        assert_eq!(
            error.kind,
            GrammarErrorKind::InvalidArrayElement("x".into())
        );
        assert_eq!(error.position, Position::LineColumn { line: 2, column: 7 });
    }

    #[test]
    fn rejects_unclosed_array_literal() {
        assert!(matches!(
            grammar(scan("Vertices: *2 {\n\ta: 0,1\n")).kind,
            GrammarErrorKind::UnexpectedEnd { .. }
        ));
    }

    #[test]
    fn rejects_stray_colon() {
        assert_eq!(
            grammar(scan("A: 1\n  : 2\n")),
            GrammarError::new(
                GrammarErrorKind::StrayColon,
                Position::LineColumn { line: 2, column: 3 }
            )
        );
    }

    #[test]
    fn rejects_unterminated_quote() {
        assert_eq!(
            grammar(scan("Name: \"Cube\n")),
            GrammarError::new(
                GrammarErrorKind::UnterminatedString,
                Position::LineColumn { line: 1, column: 7 }
            )
        );
    }

    #[test]
    fn quoted_text_keeps_separators() -> Result<()> {
        assert_eq!(
            kinds("P: \"Lcl Translation\", \"a;b,c{}\"")?,
            vec![
                key("P"),
                string("Lcl Translation"),
                TokenKind::Separator,
                string("a;b,c{}"),
            ]
        );
        Ok(())
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert!(matches!(
            TextScanner::new().scan(b"Name: \xff\n"),
            Err(Error::Utf8Error(_))
        ));
    }
}
