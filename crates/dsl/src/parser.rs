//! Command parser
//!
//! Hand-written parser over the lexed token stream. The notation is a
//! fixed closed set of ten operation shapes, so there is no general
//! grammar: the leading token selects exactly one shape matcher, which
//! must consume the whole command.

use std::str::FromStr;

use crate::ast::{PhaseName, Request, DEFAULT_DECAY_RATE};
use crate::lexer::{lex, LexError, Spanned, Token};

/// Error produced while parsing a command
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("empty command")]
    Empty,

    #[error("command does not start with a known operator: found {found}")]
    UnknownShape { found: String },

    #[error("expected {expected}, found {found}")]
    Expected { expected: String, found: String },

    #[error("expected a number for {what}, found {found}")]
    ExpectedNumber { what: String, found: String },

    #[error("unknown phase state '{name}' (expected crystalline, normal, liquid, gas or plasma)")]
    UnknownPhase { name: String },

    #[error("{what} must be a positive integer, found {found}")]
    InvalidCount { what: String, found: String },

    #[error("network requires at least 3 fields, found {count}")]
    TooFewFields { count: usize },

    #[error("trailing input after command: {found}")]
    TrailingInput { found: String },
}

/// Parse one command string into a [`Request`]
pub fn parse(command: &str) -> Result<Request, ParseError> {
    let tokens = lex(command)?;
    let mut stream = TokenStream::new(&tokens);

    let request = match stream.peek() {
        None => return Err(ParseError::Empty),
        Some(Token::NablaF) => exchange(&mut stream)?,
        Some(Token::CycleRegenerate) => regenerate(&mut stream)?,
        Some(Token::PartialDecay) => decay(&mut stream)?,
        Some(Token::NablaNabla) => symbiosis(&mut stream)?,
        Some(Token::Otimes) => entangle(&mut stream)?,
        Some(Token::Tilde) => resonance(&mut stream)?,
        Some(Token::PartialPhase) => phase_transition(&mut stream)?,
        Some(Token::CycleSup) => fractal(&mut stream)?,
        Some(Token::NablaSpatial) => spatial(&mut stream)?,
        Some(Token::NablaCubedF) => network(&mut stream)?,
        Some(other) => {
            return Err(ParseError::UnknownShape {
                found: other.describe(),
            })
        }
    };

    if let Some(extra) = stream.peek() {
        return Err(ParseError::TrailingInput {
            found: extra.describe(),
        });
    }
    Ok(request)
}

// =============================================================================
// Shape matchers
// =============================================================================

/// ∇F(a↔b)|∂E/∂t=0
fn exchange(s: &mut TokenStream<'_, '_>) -> Result<Request, ParseError> {
    s.expect(&Token::NablaF)?;
    s.expect(&Token::ParenOpen)?;
    let a = s.ident()?;
    s.expect(&Token::Bidirectional)?;
    let b = s.ident()?;
    s.expect(&Token::ParenClose)?;
    s.expect(&Token::Pipe)?;
    s.expect(&Token::EnergyConstraint)?;
    Ok(Request::Exchange { a, b })
}

/// ∮regenerate(field, energy)
fn regenerate(s: &mut TokenStream<'_, '_>) -> Result<Request, ParseError> {
    s.expect(&Token::CycleRegenerate)?;
    s.expect(&Token::ParenOpen)?;
    let field = s.ident()?;
    s.expect(&Token::Comma)?;
    let energy = s.number("energy input")?;
    s.expect(&Token::ParenClose)?;
    Ok(Request::Regenerate { field, energy })
}

/// ∂decay(field, rate); the rate may be omitted
fn decay(s: &mut TokenStream<'_, '_>) -> Result<Request, ParseError> {
    s.expect(&Token::PartialDecay)?;
    s.expect(&Token::ParenOpen)?;
    let field = s.ident()?;
    let rate = if s.consume(&Token::Comma) {
        s.number("decay rate")?
    } else {
        DEFAULT_DECAY_RATE
    };
    s.expect(&Token::ParenClose)?;
    Ok(Request::Decay { field, rate })
}

/// ∇∇(a⇄b)
fn symbiosis(s: &mut TokenStream<'_, '_>) -> Result<Request, ParseError> {
    s.expect(&Token::NablaNabla)?;
    s.expect(&Token::ParenOpen)?;
    let a = s.ident()?;
    s.expect(&Token::Reciprocal)?;
    let b = s.ident()?;
    s.expect(&Token::ParenClose)?;
    Ok(Request::Symbiosis { a, b })
}

/// ⊗(a, b)
fn entangle(s: &mut TokenStream<'_, '_>) -> Result<Request, ParseError> {
    s.expect(&Token::Otimes)?;
    s.expect(&Token::ParenOpen)?;
    let a = s.ident()?;
    s.expect(&Token::Comma)?;
    let b = s.ident()?;
    s.expect(&Token::ParenClose)?;
    Ok(Request::Entangle { a, b })
}

/// ~(a ≈ b)
fn resonance(s: &mut TokenStream<'_, '_>) -> Result<Request, ParseError> {
    s.expect(&Token::Tilde)?;
    s.expect(&Token::ParenOpen)?;
    let a = s.ident()?;
    s.expect(&Token::Approx)?;
    let b = s.ident()?;
    s.expect(&Token::ParenClose)?;
    Ok(Request::Resonance { a, b })
}

/// ∂phase(field, target)
fn phase_transition(s: &mut TokenStream<'_, '_>) -> Result<Request, ParseError> {
    s.expect(&Token::PartialPhase)?;
    s.expect(&Token::ParenOpen)?;
    let field = s.ident()?;
    s.expect(&Token::Comma)?;
    let name = s.ident()?;
    let target =
        PhaseName::from_str(&name).map_err(|_| ParseError::UnknownPhase { name })?;
    s.expect(&Token::ParenClose)?;
    Ok(Request::PhaseTransition { field, target })
}

/// ∮^n(field, depth)
fn fractal(s: &mut TokenStream<'_, '_>) -> Result<Request, ParseError> {
    s.expect(&Token::CycleSup)?;
    let order = s.count("cycle order")?;
    s.expect(&Token::ParenOpen)?;
    let field = s.ident()?;
    s.expect(&Token::Comma)?;
    let depth = s.count("fractal depth")?;
    s.expect(&Token::ParenClose)?;
    Ok(Request::Fractal {
        field,
        order,
        depth,
    })
}

/// ∇spatial(a, b)
fn spatial(s: &mut TokenStream<'_, '_>) -> Result<Request, ParseError> {
    s.expect(&Token::NablaSpatial)?;
    s.expect(&Token::ParenOpen)?;
    let a = s.ident()?;
    s.expect(&Token::Comma)?;
    let b = s.ident()?;
    s.expect(&Token::ParenClose)?;
    Ok(Request::SpatialGradient { a, b })
}

/// ∇³F(a↔b↔c...) with an optional |∂E/∂t=0 suffix
fn network(s: &mut TokenStream<'_, '_>) -> Result<Request, ParseError> {
    s.expect(&Token::NablaCubedF)?;
    s.expect(&Token::ParenOpen)?;
    let mut fields = vec![s.ident()?];
    while s.consume(&Token::Bidirectional) {
        fields.push(s.ident()?);
    }
    s.expect(&Token::ParenClose)?;
    if s.consume(&Token::Pipe) {
        s.expect(&Token::EnergyConstraint)?;
    }
    if fields.len() < 3 {
        return Err(ParseError::TooFewFields {
            count: fields.len(),
        });
    }
    Ok(Request::Network { fields })
}

// =============================================================================
// Token stream
// =============================================================================

/// Cursor over lexed tokens with single-token lookahead
struct TokenStream<'a, 'src> {
    tokens: &'a [Spanned<Token<'src>>],
    pos: usize,
}

impl<'a, 'src> TokenStream<'a, 'src> {
    fn new(tokens: &'a [Spanned<Token<'src>>]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<&Token<'src>> {
        let token = self.tokens.get(self.pos).map(|t| &t.token);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn found(&self) -> String {
        match self.peek() {
            Some(token) => token.describe(),
            None => "end of command".to_string(),
        }
    }

    /// Advance past `expected` or fail
    fn expect(&mut self, expected: &Token<'_>) -> Result<(), ParseError> {
        if self.peek() == Some(expected) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::Expected {
                expected: expected.describe(),
                found: self.found(),
            })
        }
    }

    /// Advance past `token` if present, reporting whether it was
    fn consume(&mut self, token: &Token<'_>) -> bool {
        if self.peek() == Some(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume an identifier token
    fn ident(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.to_string();
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::Expected {
                expected: "a field name".to_string(),
                found: self.found(),
            }),
        }
    }

    /// Consume a numeric token as f64
    fn number(&mut self, what: &str) -> Result<f64, ParseError> {
        match self.peek() {
            Some(Token::Integer(s)) | Some(Token::Float(s)) => {
                // The lexer only emits numeric slices, so this parse cannot fail
                let value: f64 = s.parse().unwrap_or_default();
                self.advance();
                Ok(value)
            }
            _ => Err(ParseError::ExpectedNumber {
                what: what.to_string(),
                found: self.found(),
            }),
        }
    }

    /// Consume a positive integer token (≥ 1)
    fn count(&mut self, what: &str) -> Result<u32, ParseError> {
        match self.peek() {
            Some(Token::Integer(s)) => match s.parse::<u32>() {
                Ok(n) if n >= 1 => {
                    self.advance();
                    Ok(n)
                }
                _ => Err(ParseError::InvalidCount {
                    what: what.to_string(),
                    found: s.to_string(),
                }),
            },
            _ => Err(ParseError::InvalidCount {
                what: what.to_string(),
                found: self.found(),
            }),
        }
    }
}
