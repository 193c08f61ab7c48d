//! Scenario script execution.
//!
//! Replays a parsed script against a live queue, one step at a time, and
//! writes a line per step describing what happened. An `expect` step that
//! does not match the previous fetch stops the run with an error naming the
//! script line.

use anyhow::{Context, Result, anyhow, bail};
use cq_core::{QueueHandle, Slot};
use cq_io::{Command, Script, loader};
use std::io::{self, Write};

pub fn run_script(path: &str) -> Result<()> {
    let script = loader::load_script_file(path)?;
    println!("Running {} ({} steps)", path, script.steps.len());

    let stdout = io::stdout();
    execute(&script, &mut stdout.lock())?;

    println!("Done.");
    Ok(())
}

/// Executes every step of `script`, reporting to `out`.
pub fn execute<W: Write>(script: &Script, out: &mut W) -> Result<()> {
    let mut queue: Option<QueueHandle> = None;
    let mut last_fetch: Vec<Slot> = Vec::new();

    for step in &script.steps {
        let line = step.line;
        let missing = || anyhow!("line {}: no queue has been created", line);

        match &step.command {
            Command::Create(capacity) => {
                if let Some(mut old) = queue.take() {
                    old.release();
                }
                let handle = QueueHandle::create(*capacity)
                    .with_context(|| format!("line {}: create failed", line))?;
                writeln!(out, "{:4}: create {} -> ok", line, capacity)?;
                queue = Some(handle);
            }
            Command::Release => {
                queue.as_mut().ok_or_else(missing)?.release();
                writeln!(out, "{:4}: release -> ok", line)?;
            }
            command => {
                let handle = queue.as_ref().ok_or_else(missing)?;
                run_step(handle, command, line, &mut last_fetch, out)?;
            }
        }
    }

    if let Some(mut handle) = queue {
        handle.release();
    }
    Ok(())
}

fn run_step<W: Write>(
    queue: &QueueHandle,
    command: &Command,
    line: usize,
    last_fetch: &mut Vec<Slot>,
    out: &mut W,
) -> Result<()> {
    let at = || format!("line {}", line);

    match command {
        Command::Append(values) => {
            for &v in values {
                queue.append(v).with_context(at)?;
            }
            writeln!(out, "{:4}: append {:?} -> ok", line, values)?;
        }
        Command::Fetch { max, timeout_ms } => {
            // A fetch never returns more than the capacity.
            let mut buf = vec![0; (*max).min(queue.capacity().with_context(at)?)];
            let n = queue.fetch_ms(&mut buf, *timeout_ms).with_context(at)?;
            buf.truncate(n);
            writeln!(out, "{:4}: fetch {} {} -> {} {:?}", line, max, timeout_ms, n, buf)?;
            *last_fetch = buf;
        }
        Command::Expect(values) => {
            if *last_fetch != *values {
                bail!(
                    "line {}: expected {:?}, last fetch returned {:?}",
                    line,
                    values,
                    last_fetch
                );
            }
            writeln!(out, "{:4}: expect {:?} -> ok", line, values)?;
        }
        Command::Empty => {
            let empty = queue.is_empty().with_context(at)?;
            writeln!(out, "{:4}: empty -> {}", line, empty)?;
        }
        Command::Clear => {
            queue.clear_all().with_context(at)?;
            writeln!(out, "{:4}: clear -> ok", line)?;
        }
        Command::Running(flag) => {
            queue.set_running(*flag).with_context(at)?;
            writeln!(out, "{:4}: running {} -> ok", line, flag)?;
        }
        Command::Create(_) | Command::Release => {
            bail!("line {}: lifecycle commands are not queue steps", line)
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cq_io::parser::parse_script;

    fn run(text: &str) -> Result<String> {
        let script = parse_script(text)?;
        let mut out = Vec::new();
        execute(&script, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn bundled_scenarios_pass() {
        let report = run(include_str!("../scenarios/basic.cq")).unwrap();
        assert!(report.contains("fetch 10 0 -> 3 [3, 4, 5]"));
        assert!(report.contains("empty -> true"));
    }

    #[test]
    fn expect_mismatch_names_line() {
        let err = run("create 2\nappend 1\nfetch 4 0\nexpect 2\n").unwrap_err();
        assert!(err.to_string().starts_with("line 4"));
    }

    #[test]
    fn steps_before_create_fail() {
        let err = run("append 1\n").unwrap_err();
        assert!(err.to_string().contains("no queue"));
    }

    #[test]
    fn use_after_release_is_reported() {
        let err = run("create 2\nrelease\nrelease\nappend 1\n").unwrap_err();
        assert!(format!("{err:#}").contains("released"));
    }

    #[test]
    fn huge_fetch_count_is_bounded_by_capacity() {
        let report = run("create 2\nappend 7 8 9\nfetch 18446744073709551615 0\nexpect 8 9\n").unwrap();
        assert!(report.contains("fetch 18446744073709551615 0 -> 2 [8, 9]"));
    }

    #[test]
    fn invalid_capacity_is_reported() {
        let err = run("create 0\n").unwrap_err();
        assert!(format!("{err:#}").contains("invalid queue capacity 0"));
    }
}
