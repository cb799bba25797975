use std::{error::Error, fmt::Display};

use super::token::Location;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    UnterminatedString,
    UnterminatedCharLiteral,
    UnterminatedComment,
    UnrecognizedCharacter(char),
    MalformedNumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub location: Location,
}

impl Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match &self.kind {
            LexErrorKind::UnterminatedString => "unterminated string literal".to_owned(),
            LexErrorKind::UnterminatedCharLiteral => "unterminated character literal".to_owned(),
            LexErrorKind::UnterminatedComment => "unterminated comment".to_owned(),
            LexErrorKind::UnrecognizedCharacter(c) => format!("unrecognized character '{c}'"),
            LexErrorKind::MalformedNumber => "malformed numeric literal".to_owned(),
        };
        write!(f, "{}: {msg}", self.location)
    }
}

impl Error for LexError {}
