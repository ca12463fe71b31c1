//! The `--search` expression grammar (`SPEC_FULL.md` §A/§C): a small `nom`
//! parser-combinator grammar, in the same style the teacher uses for its
//! PDDL grammar (`parsers/`), pointed at function-call syntax like
//! `astar(lmcut())` or `eager_greedy([hadd(), hff()], pruning=stubborn_sets_simple())`.
//!
//! This module only builds the generic call-expression AST; turning that AST
//! into a runnable search configuration is `cli::config::build_search_config`.

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, alphanumeric1, char, multispace0};
use nom::combinator::{map, recognize};
use nom::multi::separated_list0;
use nom::number::complete::recognize_float;
use nom::sequence::{delimited, pair, preceded, separated_pair};
use nom::IResult;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigExpr {
    /// `name(arg, arg, ...)`.
    Call { name: String, args: Vec<ConfigExpr> },
    /// `[expr, expr, ...]`.
    List(Vec<ConfigExpr>),
    /// `name=expr`.
    Kwarg(String, Box<ConfigExpr>),
    Number(f64),
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        nom::multi::many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn number(input: &str) -> IResult<&str, ConfigExpr> {
    map(recognize_float, |s: &str| ConfigExpr::Number(s.parse().unwrap_or(0.0)))(input)
}

fn kwarg(input: &str) -> IResult<&str, ConfigExpr> {
    map(
        separated_pair(identifier, ws(char('=')), expr),
        |(name, value)| ConfigExpr::Kwarg(name.to_string(), Box::new(value)),
    )(input)
}

fn list(input: &str) -> IResult<&str, ConfigExpr> {
    map(
        delimited(
            ws(char('[')),
            separated_list0(ws(char(',')), expr),
            ws(char(']')),
        ),
        ConfigExpr::List,
    )(input)
}

fn call(input: &str) -> IResult<&str, ConfigExpr> {
    map(
        pair(
            identifier,
            delimited(
                ws(char('(')),
                separated_list0(ws(char(',')), expr),
                ws(char(')')),
            ),
        ),
        |(name, args)| ConfigExpr::Call {
            name: name.to_string(),
            args,
        },
    )(input)
}

fn bare_ident(input: &str) -> IResult<&str, ConfigExpr> {
    map(identifier, |name| ConfigExpr::Call {
        name: name.to_string(),
        args: Vec::new(),
    })(input)
}

fn expr(input: &str) -> IResult<&str, ConfigExpr> {
    ws(alt((kwarg, call, list, number, bare_ident)))(input)
}

/// Parses a complete `--search` configuration string, requiring the whole
/// input (modulo surrounding whitespace) to be consumed.
pub fn parse(input: &str) -> Result<ConfigExpr, String> {
    match expr(input) {
        Ok((rest, parsed)) if rest.trim().is_empty() => Ok(parsed),
        Ok((rest, _)) => Err(format!("unexpected trailing input: {rest:?}")),
        Err(e) => Err(format!("{e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_bare_call_with_no_arguments() {
        let parsed = parse("lmcut()").unwrap();
        assert_eq!(
            parsed,
            ConfigExpr::Call {
                name: "lmcut".to_string(),
                args: vec![]
            }
        );
    }

    #[test]
    fn parses_nested_calls_lists_and_kwargs() {
        let parsed = parse("eager_greedy([hadd(), hff()], pruning=stubborn_sets_simple())").unwrap();
        match parsed {
            ConfigExpr::Call { name, args } => {
                assert_eq!(name, "eager_greedy");
                assert_eq!(args.len(), 2);
                assert!(matches!(args[0], ConfigExpr::List(_)));
                assert!(matches!(args[1], ConfigExpr::Kwarg(_, _)));
            }
            _ => panic!("expected a call"),
        }
    }

    #[test]
    fn parses_numeric_arguments() {
        let parsed = parse("wastar(hadd(), w=2)").unwrap();
        match parsed {
            ConfigExpr::Call { args, .. } => {
                assert!(matches!(args[1], ConfigExpr::Kwarg(ref k, _) if k == "w"));
            }
            _ => panic!("expected a call"),
        }
    }

    #[test]
    fn rejects_unparseable_trailing_garbage() {
        assert!(parse("astar(lmcut())) )").is_err());
    }
}
