//! Lexer for the cyclic field-operation notation
//!
//! Uses Logos for fast, compile-time optimized tokenization. The operator
//! glyphs are matched as whole tokens, so the lexer already disambiguates
//! the leading operator of each command shape.

use logos::{Logos, Span};

/// Token type for the cyclic notation
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token<'src> {
    // === Operation heads ===
    /// Multi-field network: ∇³F(a↔b↔c...)
    #[token("∇³F")]
    NablaCubedF,
    /// Symbiosis: ∇∇(a⇄b)
    #[token("∇∇")]
    NablaNabla,
    /// Bidirectional exchange: ∇F(a↔b)|∂E/∂t=0
    #[token("∇F")]
    NablaF,
    /// Spatial gradient flow: ∇spatial(a, b)
    #[token("∇spatial")]
    NablaSpatial,
    /// Regenerative cycle: ∮regenerate(field, energy)
    #[token("∮regenerate")]
    CycleRegenerate,
    /// Fractal generation: ∮^n(field, depth)
    #[token("∮^")]
    CycleSup,
    /// Natural decay: ∂decay(field, rate)
    #[token("∂decay")]
    PartialDecay,
    /// Phase transition: ∂phase(field, target)
    #[token("∂phase")]
    PartialPhase,
    /// Quantum entanglement: ⊗(a, b)
    #[token("⊗")]
    Otimes,
    /// Resonance: ~(a ≈ b)
    #[token("~")]
    Tilde,

    // === Connectors ===
    #[token("↔")]
    Bidirectional,
    #[token("⇄")]
    Reciprocal,
    #[token("≈")]
    Approx,
    /// The conservation constraint suffix of exchange commands
    #[token("∂E/∂t=0")]
    EnergyConstraint,
    #[token("|")]
    Pipe,

    // === Punctuation ===
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token(",")]
    Comma,

    // === Literals ===
    /// Integer literal
    #[regex(r"-?[0-9]+", |lex| lex.slice())]
    Integer(&'src str),

    /// Float literal (scientific notation supported)
    #[regex(r"-?[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice())]
    #[regex(r"-?[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice())]
    Float(&'src str),

    /// Field or phase-state identifier
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice())]
    Ident(&'src str),
}

impl Token<'_> {
    /// Short description for error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier '{name}'"),
            Token::Integer(n) => format!("integer '{n}'"),
            Token::Float(n) => format!("number '{n}'"),
            other => format!("'{}'", other.glyph()),
        }
    }

    fn glyph(&self) -> &'static str {
        match self {
            Token::NablaCubedF => "∇³F",
            Token::NablaNabla => "∇∇",
            Token::NablaF => "∇F",
            Token::NablaSpatial => "∇spatial",
            Token::CycleRegenerate => "∮regenerate",
            Token::CycleSup => "∮^",
            Token::PartialDecay => "∂decay",
            Token::PartialPhase => "∂phase",
            Token::Otimes => "⊗",
            Token::Tilde => "~",
            Token::Bidirectional => "↔",
            Token::Reciprocal => "⇄",
            Token::Approx => "≈",
            Token::EnergyConstraint => "∂E/∂t=0",
            Token::Pipe => "|",
            Token::ParenOpen => "(",
            Token::ParenClose => ")",
            Token::Comma => ",",
            _ => "",
        }
    }
}

/// A token with its source span
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub token: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(token: T, span: Span) -> Self {
        Self { token, span }
    }
}

/// Tokenize a command into a vector of spanned tokens
pub fn lex(source: &str) -> Result<Vec<Spanned<Token<'_>>>, LexError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push(Spanned::new(token, lexer.span())),
            Err(()) => {
                return Err(LexError {
                    span: lexer.span(),
                    slice: lexer.slice().to_string(),
                });
            }
        }
    }

    Ok(tokens)
}

/// Error during lexing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unrecognized input '{slice}' at byte {}", span.start)]
pub struct LexError {
    pub span: Span,
    pub slice: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_heads() {
        let tokens = lex("∇F ∇∇ ∇³F ∇spatial ⊗ ~").unwrap();
        assert_eq!(tokens.len(), 6);
        assert_eq!(tokens[0].token, Token::NablaF);
        assert_eq!(tokens[1].token, Token::NablaNabla);
        assert_eq!(tokens[2].token, Token::NablaCubedF);
        assert_eq!(tokens[3].token, Token::NablaSpatial);
        assert_eq!(tokens[4].token, Token::Otimes);
        assert_eq!(tokens[5].token, Token::Tilde);
    }

    #[test]
    fn test_exchange_command() {
        let tokens = lex("∇F(sun↔planet)|∂E/∂t=0").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.token.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                Token::NablaF,
                Token::ParenOpen,
                Token::Ident("sun"),
                Token::Bidirectional,
                Token::Ident("planet"),
                Token::ParenClose,
                Token::Pipe,
                Token::EnergyConstraint,
            ]
        );
    }

    #[test]
    fn test_fractal_command() {
        let tokens = lex("∮^2(seed, 3)").unwrap();
        assert_eq!(tokens[0].token, Token::CycleSup);
        assert_eq!(tokens[1].token, Token::Integer("2"));
        assert_eq!(tokens[3].token, Token::Ident("seed"));
        assert_eq!(tokens[5].token, Token::Integer("3"));
    }

    #[test]
    fn test_numbers() {
        let tokens = lex("42 -17 3.14 1e10 5.67e-8").unwrap();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0].token, Token::Integer("42"));
        assert_eq!(tokens[1].token, Token::Integer("-17"));
        assert_eq!(tokens[2].token, Token::Float("3.14"));
        assert_eq!(tokens[3].token, Token::Float("1e10"));
        assert_eq!(tokens[4].token, Token::Float("5.67e-8"));
    }

    #[test]
    fn test_identifiers() {
        let tokens = lex("plant particle_A core_temp2").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].token, Token::Ident("plant"));
        assert_eq!(tokens[1].token, Token::Ident("particle_A"));
        assert_eq!(tokens[2].token, Token::Ident("core_temp2"));
    }

    #[test]
    fn test_unknown_character() {
        let err = lex("∇F(a↔b)|∂E/∂t=0 €").unwrap_err();
        assert_eq!(err.slice, "€");
    }

    #[test]
    fn test_bare_partial_is_error() {
        // ∂ only appears inside composite tokens
        assert!(lex("∂(a)").is_err());
    }
}
