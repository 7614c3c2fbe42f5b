use winnow::{
    ascii::{line_ending, space0, space1, till_line_ending},
    combinator::{alt, delimited, eof, opt, preceded, repeat, separated},
    prelude::*,
    token::take_while,
};

// Line-oriented definition format:
//
//   non_terminals: S A B
//   terminals: a b
//   start: S
//
//   S -> aA | b
//   A -> a | epsilon
//
// Blank lines and `#` comments are allowed anywhere. Symbol resolution
// happens later, against the declared alphabets.
#[derive(Debug)]
pub(super) struct ParsedGrammar<'s> {
    pub(super) non_terminals: Vec<&'s str>,
    pub(super) terminals: Vec<&'s str>,
    pub(super) start_symbol: &'s str,
    pub(super) rules: Vec<(&'s str, Vec<&'s str>)>,
}

pub(super) fn grammar_definition<'s>(input: &mut &'s str) -> ModalResult<ParsedGrammar<'s>> {
    skip_empty(input)?;
    let non_terminals = section("non_terminals:", input)?;
    skip_empty(input)?;
    let terminals = section("terminals:", input)?;
    skip_empty(input)?;
    let start_symbol = start_line(input)?;

    let rules: Vec<(&str, Vec<&str>)> =
        repeat(1.., preceded(skip_empty, rule)).parse_next(input)?;

    skip_empty(input)?;
    (space0, opt(('#', till_line_ending)), eof)
        .void()
        .parse_next(input)?;

    Ok(ParsedGrammar {
        non_terminals,
        terminals,
        start_symbol,
        rules,
    })
}

fn name<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    take_while(1.., |c: char| !c.is_whitespace() && c != '|' && c != '#').parse_next(input)
}

fn section<'s>(keyword: &'static str, input: &mut &'s str) -> ModalResult<Vec<&'s str>> {
    (space0, keyword).void().parse_next(input)?;
    let names = preceded(space0, separated(0.., name, space1)).parse_next(input)?;
    end_of_line(input)?;

    Ok(names)
}

fn start_line<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    (space0, "start:", space0).void().parse_next(input)?;
    let start_symbol = name(input)?;
    end_of_line(input)?;

    Ok(start_symbol)
}

fn rule<'s>(input: &mut &'s str) -> ModalResult<(&'s str, Vec<&'s str>)> {
    let lhs = preceded(space0, name).parse_next(input)?;
    delimited(space1, alt(("->", "→")), space1)
        .void()
        .parse_next(input)?;
    let alternatives = separated(1.., name, delimited(space0, '|', space0)).parse_next(input)?;
    end_of_line(input)?;

    Ok((lhs, alternatives))
}

fn end_of_line(input: &mut &str) -> ModalResult<()> {
    (space0, opt(('#', till_line_ending)))
        .void()
        .parse_next(input)?;
    alt((line_ending.void(), eof.void())).parse_next(input)
}

fn skip_empty(input: &mut &str) -> ModalResult<()> {
    repeat(0.., (space0, opt(('#', till_line_ending)), line_ending)).parse_next(input)
}
