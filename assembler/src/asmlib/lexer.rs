//! Splitting source lines into words, and classifying operands.
//!
//! A line is a sequence of words separated by whitespace.  Operand
//! lists may be written with commas (`SWAP R1, R2`); anything from
//! the first comma in a word onwards is discarded.  The first word is
//! the mnemonic, and a line whose mnemonic contains `//` is a
//! comment.
//!
//! Each operand word is then classified once, here, so that the rest
//! of the assembler deals in [`Operand`] values rather than
//! re-examining strings.

use logos::Logos;

use super::ast::Operand;
use super::symbol::SymbolName;


pub(crate) const COMMENT_MARKER: &str = "//";

/// The words of a line which is neither blank nor a comment.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Words<'a> {
    pub(crate) mnemonic: &'a str,
    pub(crate) operands: Vec<&'a str>,
}

fn before_comma(word: &str) -> &str {
    match word.find(',') {
        Some(pos) => &word[..pos],
        None => word,
    }
}

/// Split `line` into its mnemonic and operand words.  Returns `None`
/// for blank lines and comments.
pub(crate) fn split_line(line: &str) -> Option<Words<'_>> {
    let mut words = line.split_whitespace().map(before_comma);
    let mnemonic = words.next()?;
    if mnemonic.contains(COMMENT_MARKER) {
        return None;
    }
    Some(Words {
        mnemonic,
        operands: words.collect(),
    })
}

fn capture_constant(lex: &mut logos::Lexer<Token>) -> Option<i64> {
    lex.slice()[1..].parse().ok()
}

fn capture_number(lex: &mut logos::Lexer<Token>) -> Option<i64> {
    lex.slice().parse().ok()
}

fn capture_register(lex: &mut logos::Lexer<Token>) -> Option<u32> {
    lex.slice()[1..].parse().ok()
}

fn capture_text(lex: &mut logos::Lexer<Token>) -> String {
    lex.slice().to_string()
}

/// Operand words.  A word which does not lex as exactly one of these
/// is taken to be a symbol name.
#[derive(Debug, PartialEq, Eq, Logos, Clone)]
pub(crate) enum Token {
    /// `#10`, an explicit decimal constant.
    #[regex("#-?[0-9]+", capture_constant)]
    Constant(i64),

    /// `10`, a bare decimal number.
    #[regex("-?[0-9]+", capture_number)]
    Number(i64),

    /// `0x2AD00`.  Hexadecimal literals are copied to the output
    /// unchanged.
    #[regex("0[xX][0-9a-fA-F]+", capture_text)]
    Hex(String),

    /// `R3`.  A name like `R3X` is a symbol, not a register, because
    /// the longer match wins.
    #[regex("R[0-9]+", capture_register, priority = 10)]
    Register(u32),

    /// `@NAME`: a symbol whose value is filled in by the final
    /// substitution pass.  The `@` is part of the name, so it is
    /// defined by `VAR @NAME` or `LABEL @NAME`.
    #[regex("@[^@\\s,]+", capture_text)]
    Indirect(String),

    #[regex("[^#@0-9\\s,-][^\\s,]*", capture_text)]
    Name(String),
}

impl From<Token> for Operand {
    fn from(token: Token) -> Operand {
        match token {
            Token::Constant(n) | Token::Number(n) => Operand::Literal(n),
            Token::Hex(digits) => Operand::Hex(digits),
            Token::Register(n) => Operand::Register(n),
            Token::Indirect(name) => Operand::Indirect(SymbolName::from(name)),
            Token::Name(name) => Operand::Symbol(SymbolName::from(name)),
        }
    }
}

/// Classify a single operand word.
pub(crate) fn classify_operand(word: &str) -> Operand {
    let mut lexer = Token::lexer(word);
    match (lexer.next(), lexer.next()) {
        (Some(Ok(token)), None) => Operand::from(token),
        _ => Operand::Symbol(SymbolName::from(word)),
    }
}
