//! The generic document tree and the parser building it from tokens.

use std::iter::Peekable;
use std::vec::IntoIter;

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::error::{GrammarError, GrammarErrorKind, Result};
use crate::token::{Position, Token, TokenKind};
use crate::value::PropertyValue;

/// Deepest nesting of scopes accepted from a document
pub const MAX_DEPTH: usize = 128;

/// One named record: a property list and at most one nested scope
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub key: String,
    pub properties: Vec<PropertyValue>,
    pub child: Option<Scope>,
    /// Where the element's key was found
    pub position: Position,
}

impl Element {
    pub fn new(key: impl Into<String>, position: Position) -> Self {
        Self {
            key: key.into(),
            properties: Vec::new(),
            child: None,
            position,
        }
    }

    pub fn property(&self, index: usize) -> Option<&PropertyValue> {
        self.properties.get(index)
    }

    pub fn child(&self) -> Option<&Scope> {
        self.child.as_ref()
    }

    /// Elements named `key` in the child scope
    pub fn elements(&self, key: &str) -> &[Element] {
        self.child().map(|c| c.elements(key)).unwrap_or_default()
    }

    /// First element named `key` in the child scope
    pub fn first(&self, key: &str) -> Option<&Element> {
        self.child()?.first(key)
    }

    /// First property of the first child element named `key`, as in `Vertices: *24 { ... }`
    pub fn value(&self, key: &str) -> Option<&PropertyValue> {
        self.first(key)?.property(0)
    }
}

/// A multi-map from element name to the elements carrying it, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    elements: IndexMap<String, Vec<Element>>,
    /// `(key index, element index)` of every element, as declared
    order: Vec<(usize, usize)>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, element: Element) {
        let entry = self.elements.entry(element.key.clone());
        let key_index = entry.index();
        let elements = entry.or_default();
        self.order.push((key_index, elements.len()));
        elements.push(element);
    }

    /// All elements named `key`
    pub fn elements(&self, key: &str) -> &[Element] {
        self.elements.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn first(&self, key: &str) -> Option<&Element> {
        self.elements(key).first()
    }

    /// Distinct keys, in order of first appearance
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Element])> {
        self.elements
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Every element in declaration order, across keys
    pub fn in_order(&self) -> impl Iterator<Item = &Element> {
        self.order.iter().filter_map(|&(key, index)| {
            self.elements
                .get_index(key)
                .and_then(|(_, elements)| elements.get(index))
        })
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

fn unexpected(token: &Token, expected: &'static str) -> GrammarError {
    GrammarError::new(
        GrammarErrorKind::UnexpectedToken {
            found: token.kind.describe(),
            expected,
        },
        token.position,
    )
}

/// Data tokens may follow each other directly only when the second one starts the next line
fn continues(previous: Position, next: Position) -> bool {
    matches!((previous.line(), next.line()), (Some(a), Some(b)) if b == a + 1)
}

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
}

impl Parser {
    /// Parse elements until the end of input (top level) or the `}` matching `opened_at`
    fn parse_scope(&mut self, depth: usize, opened_at: Option<Position>) -> Result<Scope> {
        if depth >= MAX_DEPTH {
            let position = opened_at.unwrap_or(Position::Offset(0));
            return Err(
                GrammarError::new(GrammarErrorKind::NestingTooDeep(MAX_DEPTH), position).into(),
            );
        }

        let mut scope = Scope::new();
        loop {
            let Some(token) = self.tokens.next() else {
                return match opened_at {
                    Some(position) => Err(GrammarError::new(
                        GrammarErrorKind::UnexpectedEnd { expected: "`}`" },
                        position,
                    )
                    .into()),
                    None => Ok(scope),
                };
            };

            match token.kind {
                TokenKind::CloseScope if opened_at.is_some() => return Ok(scope),
                TokenKind::Key(key) => {
                    let element = self.parse_element(Element::new(key, token.position), depth)?;
                    scope.insert(element);
                }
                _ => {
                    let expected = if opened_at.is_some() {
                        "a key or `}`"
                    } else {
                        "a key"
                    };
                    return Err(unexpected(&token, expected).into());
                }
            }
        }
    }

    fn parse_element(&mut self, mut element: Element, depth: usize) -> Result<Element> {
        let mut previous_data: Option<Position> = None;
        let mut separator: Option<Position> = None;

        loop {
            let Some(next) = self.tokens.peek() else {
                return match separator {
                    Some(position) => Err(GrammarError::new(
                        GrammarErrorKind::UnexpectedEnd {
                            expected: "a value after `,`",
                        },
                        position,
                    )
                    .into()),
                    None => Ok(element),
                };
            };

            match &next.kind {
                TokenKind::Key(_) | TokenKind::CloseScope => {
                    if separator.is_some() {
                        return Err(unexpected(next, "a value after `,`").into());
                    }
                    return Ok(element);
                }
                TokenKind::OpenScope => {
                    if separator.is_some() {
                        return Err(unexpected(next, "a value after `,`").into());
                    }
                    let opened_at = next.position;
                    self.tokens.next();
                    element.child = Some(self.parse_scope(depth + 1, Some(opened_at))?);
                    return Ok(element);
                }
                TokenKind::Separator => {
                    if previous_data.is_none() {
                        return Err(unexpected(next, "a value").into());
                    }
                    separator = Some(next.position);
                    previous_data = None;
                    self.tokens.next();
                }
                TokenKind::Data(_) => {
                    if let Some(previous) = previous_data {
                        if !continues(previous, next.position) {
                            return Err(unexpected(next, "`,`, `{`, `}` or a key").into());
                        }
                    }
                    previous_data = Some(next.position);
                    separator = None;
                    if let Some(Token {
                        kind: TokenKind::Data(value),
                        ..
                    }) = self.tokens.next()
                    {
                        element.properties.push(value);
                    }
                }
            }
        }
    }
}

/// Build the document tree from a token sequence produced by either scanner
#[instrument(skip_all, fields(tokens = tokens.len()))]
pub fn parse(tokens: Vec<Token>) -> Result<Scope> {
    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
    };
    let root = parser.parse_scope(0, None)?;
    debug!(elements = root.len(), "parsed document");
    Ok(root)
}
