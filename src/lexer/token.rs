use logos::Logos;
use std::fmt;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")]
pub enum Token {
    // Keywords
    #[token("func")]
    Func,
    #[token("type")]
    Type,
    #[token("struct")]
    Struct,
    #[token("interface")]
    Interface,
    #[token("var")]
    Var,
    #[token("return")]
    Return,
    #[token("extern")]
    Extern,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("nil")]
    Nil,

    // Literals
    #[regex(r"[0-9][0-9_]*", |lex| lex.slice().replace('_', "").parse::<i64>().ok())]
    IntLit(i64),

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*", |lex| lex.slice().replace('_', "").parse::<f64>().ok())]
    FloatLit(f64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        let raw = &s[1..s.len()-1];
        let mut result = String::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some('n') => result.push('\n'),
                    Some('r') => result.push('\r'),
                    Some('t') => result.push('\t'),
                    Some('\\') => result.push('\\'),
                    Some('"') => result.push('"'),
                    Some(other) => { result.push('\\'); result.push(other); }
                    None => result.push('\\'),
                }
            } else {
                result.push(c);
            }
        }
        Some(result)
    })]
    StringLit(String),

    // Identifiers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    // Punctuation and operators
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(";")]
    Semi,
    #[token("*")]
    Star,
    #[token("&")]
    Amp,
    #[token(":=")]
    ColonEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("=")]
    Eq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("/")]
    Slash,

    #[regex(r"//[^\n]*")]
    Comment,

    #[token("\n")]
    Newline,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Token::Func => "'func'",
            Token::Type => "'type'",
            Token::Struct => "'struct'",
            Token::Interface => "'interface'",
            Token::Var => "'var'",
            Token::Return => "'return'",
            Token::Extern => "'extern'",
            Token::True => "'true'",
            Token::False => "'false'",
            Token::Nil => "'nil'",
            Token::IntLit(_) => "integer literal",
            Token::FloatLit(_) => "float literal",
            Token::StringLit(_) => "string literal",
            Token::Ident => "identifier",
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::LBrace => "'{'",
            Token::RBrace => "'}'",
            Token::Comma => "','",
            Token::Dot => "'.'",
            Token::Semi => "';'",
            Token::Star => "'*'",
            Token::Amp => "'&'",
            Token::ColonEq => "':='",
            Token::EqEq => "'=='",
            Token::BangEq => "'!='",
            Token::Eq => "'='",
            Token::Plus => "'+'",
            Token::Minus => "'-'",
            Token::Slash => "'/'",
            Token::Comment => "comment",
            Token::Newline => "newline",
        };
        write!(f, "{s}")
    }
}
