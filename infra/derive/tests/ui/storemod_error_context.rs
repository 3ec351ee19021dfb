use std::borrow::Cow;
use storemod_derive::storemod_error;

#[storemod_error]
pub enum ParseError {
    #[error("Parse error{}: {source}", format_context(.context))]
    Parse { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },

    #[error("Rejected{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn parse(raw: &str) -> Result<i64, ParseError> {
    Ok(raw.parse::<i64>().context("reading the counter")?)
}

fn reject() -> Result<(), ParseError> {
    Err(ParseError::Rejected { message: "negative".into(), context: None })
}

fn main() {
    assert_eq!(parse("42").ok(), Some(42));

    let err = parse("x").err().map(|e| e.to_string());
    assert_eq!(
        err.as_deref(),
        Some("Parse error (reading the counter): invalid digit found in string")
    );

    let err = reject().context("validating input").err().map(|e| e.to_string());
    assert_eq!(err.as_deref(), Some("Rejected (validating input): negative"));
}
