//! Lexer for symbolic list values (flag names, permission specs) using logos

use logos::Logos;

/// One entry of a comma/pipe/whitespace separated list
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n,|]+")]
pub enum ListToken<'a> {
    #[regex(r"[A-Za-z_][A-Za-z0-9_\-]*", |lex| lex.slice())]
    Word(&'a str),

    #[regex(r"[0-9]+", |lex| lex.slice())]
    Number(&'a str),
}

impl<'a> ListToken<'a> {
    /// The source text of the token
    pub fn text(&self) -> &'a str {
        match self {
            ListToken::Word(s) | ListToken::Number(s) => s,
        }
    }
}

/// Tokenize a list, yielding the offending slice for anything that is neither
/// a word nor a number.
pub fn tokenize(text: &str) -> impl Iterator<Item = Result<ListToken<'_>, &str>> + '_ {
    ListToken::lexer(text)
        .spanned()
        .map(move |(token, span)| token.map_err(|_| &text[span]))
}
