//! PGN reader: splits a game into tag pairs and SAN move tokens.
//!
//! Only the first game in the text is read. Move legality is not checked
//! here; see [`crate::engine`].

use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_till, take_until, take_while1};
use nom::character::complete::{anychar, char, digit1, multispace0, multispace1, none_of};
use nom::combinator::{map, not, recognize, value};
use nom::multi::{fold_many0, many0_count};
use nom::sequence::{delimited, pair, preceded, terminated};

use crate::error::{NotationError, Result};

/// A single game as seen by the tokenizer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PgnGame {
    pub tags: Vec<(String, String)>,
    pub moves: Vec<String>,
}

impl PgnGame {
    /// First tag value with the given name (case-sensitive, as PGN tags are).
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Tag(&'a str, String),
    Move(&'a str),
    /// Game termination marker.
    End,
    Skip,
}

fn line_comment(input: &str) -> IResult<&str, &str> {
    preceded(char(';'), take_till(|c: char| c == '\n'))(input)
}

fn brace_comment(input: &str) -> IResult<&str, &str> {
    delimited(char('{'), take_until("}"), char('}'))(input)
}

fn nag(input: &str) -> IResult<&str, &str> {
    preceded(char('$'), digit1)(input)
}

/// Whitespace, comments, NAGs and (nested) variations.
fn skipped(input: &str) -> IResult<&str, ()> {
    alt((
        value((), multispace1),
        value((), line_comment),
        value((), brace_comment),
        value((), nag),
        variation,
    ))(input)
}

fn variation(input: &str) -> IResult<&str, ()> {
    value(
        (),
        delimited(
            char('('),
            many0_count(alt((skipped, value((), move_number), value((), san)))),
            preceded(multispace0, char(')')),
        ),
    )(input)
}

/// Quoted tag value with `\"` and `\\` escapes.
fn tag_value(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        fold_many0(
            alt((preceded(char('\\'), anychar), none_of("\\\""))),
            String::new,
            |mut text, c| {
                text.push(c);
                text
            },
        ),
        char('"'),
    )(input)
}

fn tag_pair(input: &str) -> IResult<&str, (&str, String)> {
    delimited(
        pair(char('['), multispace0),
        pair(
            terminated(
                take_while1(|c: char| c.is_alphanumeric() || c == '_'),
                multispace0,
            ),
            tag_value,
        ),
        pair(multispace0, char(']')),
    )(input)
}

fn termination(input: &str) -> IResult<&str, &str> {
    alt((tag("1-0"), tag("0-1"), tag("1/2-1/2"), tag("*")))(input)
}

/// `12.`, `12...` or a bare `12`. Digits followed by `-` are castling, not a number.
fn move_number(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        terminated(digit1, not(char('-'))),
        many0_count(char('.')),
    ))(input)
}

fn san(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || "+#=-!?".contains(c))(input)
}

fn token(input: &str) -> IResult<&str, Token<'_>> {
    alt((
        value(Token::Skip, skipped),
        map(tag_pair, |(name, text)| Token::Tag(name, text)),
        value(Token::End, termination),
        value(Token::Skip, move_number),
        map(san, Token::Move),
    ))(input)
}

pub fn parse(text: &str) -> Result<PgnGame> {
    // `%` escapes only apply in the first column.
    let body = text
        .lines()
        .filter(|line| !line.starts_with('%'))
        .collect::<Vec<_>>()
        .join("\n");

    let mut game = PgnGame::default();
    let mut rest = body.as_str();
    while !rest.is_empty() {
        let (next, item) = token(rest).map_err(|_| unreadable(rest, game.moves.len() + 1))?;
        match item {
            Token::Tag(name, text) => game.tags.push((name.to_string(), text)),
            Token::Move(san) => {
                if let Some(san) = normalize_san(san) {
                    game.moves.push(san);
                }
            }
            Token::End => break,
            Token::Skip => {}
        }
        rest = next;
    }

    Ok(game)
}

fn unreadable(rest: &str, ply: usize) -> NotationError {
    match rest.chars().next() {
        Some('{') => NotationError::UnterminatedPgn { what: "comment" },
        Some('(') => NotationError::UnterminatedPgn { what: "variation" },
        Some('[') => NotationError::UnterminatedPgn { what: "tag pair" },
        _ => NotationError::InvalidPgn {
            ply,
            token: rest
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string(),
            reason: "unexpected character".to_string(),
        },
    }
}

/// Strip annotation glyphs and spell zero-castling with letters.
fn normalize_san(token: &str) -> Option<String> {
    let san = token.trim_end_matches(['!', '?']);
    if san.is_empty() {
        None
    } else if san.starts_with("0-0") {
        Some(san.replace('0', "O"))
    } else {
        Some(san.to_string())
    }
}
