//! Parser for queue scenario scripts.
//!
//! The format is line oriented. Everything after a `#` is a comment, blank
//! lines are skipped, and each remaining line holds exactly one command:
//!
//! ```text
//! create 3
//! append 1 2 3 4 5
//! fetch 10 0      # drains 3, 4, 5
//! expect 3 4 5
//! ```

use crate::{Command, Script, ScriptError, Step};
use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{digit1, i32, i64, space1};
use nom::combinator::{all_consuming, map, map_res, value};
use nom::multi::{many0, many1};
use nom::sequence::{preceded, tuple};

/// Parses a whole script.
///
/// Fails on the first line that does not hold a valid command.
pub fn parse_script(text: &str) -> Result<Script, ScriptError> {
    let mut steps = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        match all_consuming(command)(line) {
            Ok((_, command)) => steps.push(Step {
                line: idx + 1,
                command,
            }),
            Err(_) => {
                return Err(ScriptError::Syntax {
                    line: idx + 1,
                    text: line.to_string(),
                });
            }
        }
    }

    tracing::debug!(steps = steps.len(), "script parsed");
    Ok(Script { steps })
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn command(input: &str) -> IResult<&str, Command> {
    alt((
        create, append, fetch, expect, empty, clear, running, release,
    ))(input)
}

fn count(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>)(input)
}

fn create(input: &str) -> IResult<&str, Command> {
    map(preceded(tag("create"), preceded(space1, count)), Command::Create)(input)
}

fn append(input: &str) -> IResult<&str, Command> {
    map(
        preceded(tag("append"), many1(preceded(space1, i32))),
        Command::Append,
    )(input)
}

fn fetch(input: &str) -> IResult<&str, Command> {
    map(
        tuple((tag("fetch"), space1, count, space1, i64)),
        |(_, _, max, _, timeout_ms)| Command::Fetch { max, timeout_ms },
    )(input)
}

fn expect(input: &str) -> IResult<&str, Command> {
    map(
        preceded(tag("expect"), many0(preceded(space1, i32))),
        Command::Expect,
    )(input)
}

fn empty(input: &str) -> IResult<&str, Command> {
    value(Command::Empty, tag("empty"))(input)
}

fn clear(input: &str) -> IResult<&str, Command> {
    value(Command::Clear, tag("clear"))(input)
}

fn running(input: &str) -> IResult<&str, Command> {
    map(
        preceded(
            tag("running"),
            preceded(
                space1,
                alt((value(true, tag("true")), value(false, tag("false")))),
            ),
        ),
        Command::Running,
    )(input)
}

fn release(input: &str) -> IResult<&str, Command> {
    value(Command::Release, tag("release"))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands(text: &str) -> Vec<Command> {
        parse_script(text)
            .unwrap()
            .steps
            .into_iter()
            .map(|s| s.command)
            .collect()
    }

    #[test]
    fn parses_every_command() {
        let text = "\
create 3
append 1 -2 3
fetch 10 -1
expect 3 4 5
expect
empty
clear
running false
running true
release
";
        assert_eq!(
            commands(text),
            vec![
                Command::Create(3),
                Command::Append(vec![1, -2, 3]),
                Command::Fetch {
                    max: 10,
                    timeout_ms: -1
                },
                Command::Expect(vec![3, 4, 5]),
                Command::Expect(vec![]),
                Command::Empty,
                Command::Clear,
                Command::Running(false),
                Command::Running(true),
                Command::Release,
            ]
        );
    }

    #[test]
    fn skips_comments_and_blanks_but_keeps_line_numbers() {
        let script = parse_script("# header\n\ncreate 2   # two slots\n  append 7\n").unwrap();
        let lines: Vec<_> = script.steps.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![3, 4]);
        assert_eq!(script.steps[0].command, Command::Create(2));
    }

    #[test]
    fn append_needs_a_value() {
        assert!(matches!(
            parse_script("append"),
            Err(ScriptError::Syntax { line: 1, .. })
        ));
    }

    #[test]
    fn rejects_trailing_garbage() {
        let err = parse_script("create 2\nclearall\n").unwrap_err();
        match err {
            ScriptError::Syntax { line, text } => {
                assert_eq!(line, 2);
                assert_eq!(text, "clearall");
            }
        }
    }

    #[test]
    fn rejects_negative_capacity() {
        assert!(parse_script("create -1").is_err());
        assert!(parse_script("fetch -1 0").is_err());
    }
}
