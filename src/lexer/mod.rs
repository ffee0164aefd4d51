pub mod token;

use crate::diagnostics::CheckError;
use crate::span::{Span, Spanned};
use logos::Logos;
use token::Token;

pub fn lex(source: &str) -> Result<Vec<Spanned<Token>>, CheckError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(tok) => {
                // Skip comments
                if matches!(tok, Token::Comment) {
                    continue;
                }
                tokens.push(Spanned::new(tok, Span::new(span.start, span.end)));
            }
            Err(()) => {
                let slice = &source[span.start..span.end];
                // A literal that matched the integer regex but failed the
                // parse callback lands here too; the only way that happens
                // is overflow.
                let msg = if slice.bytes().all(|b| b.is_ascii_digit() || b == b'_') {
                    format!("integer literal out of range: {slice}")
                } else {
                    format!("unexpected character '{slice}'")
                };
                return Err(CheckError::syntax(msg, Span::new(span.start, span.end)));
            }
        }
    }

    Ok(tokens)
}
