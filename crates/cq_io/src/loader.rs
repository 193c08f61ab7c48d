use crate::Script;
use crate::parser::parse_script;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Loads and parses a scenario script file.
pub fn load_script_file<P: AsRef<Path>>(path: P) -> Result<Script> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to open script {}", path.display()))?;
    let script =
        parse_script(&text).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Command;
    use std::io::Write;

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "create 4\nappend 9").unwrap();

        let script = load_script_file(file.path()).unwrap();
        assert_eq!(script.steps.len(), 2);
        assert_eq!(script.steps[1].command, Command::Append(vec![9]));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_script_file("/definitely/not/here.cq").unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.cq"));
    }

    #[test]
    fn parse_error_keeps_line_number() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "create 4\nbogus").unwrap();

        let err = load_script_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }
}
