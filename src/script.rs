use std::fs;
use std::path::Path;

use crate::{util, Error, Result};

/// Relocate one source script: the body is not translated, only wrapped in a
/// commented-out block inside a minimal stub that parses in the target
/// scripting environment.
pub fn convert(src: &Path, dst: &Path) -> Result<()> {
    let body = fs::read_to_string(src).map_err(|e| Error::io(src, e))?;
    let file = util::file_name(src).unwrap_or("script");
    fs::write(dst, stub(file, &body)).map_err(|e| Error::io(dst, e))
}

fn stub(file: &str, body: &str) -> String {
    let mut out = format!(
        "# Converted from {file}\n\nextends Node\n\n\
         # TODO: port the original script body\n\n# Original source:\n"
    );
    for line in body.lines() {
        if line.is_empty() {
            out.push_str("#\n");
        } else {
            out.push_str("# ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_shape() {
        let src = "using Engine;\n\nclass Player : Behaviour {\n    void Update() {}\n}\n";
        let s = stub("Player.cs", src);
        assert!(s.starts_with("# Converted from Player.cs\n"));
        assert!(s.contains("\nextends Node\n"));
        assert!(s.contains("# TODO: port the original script body"));
        assert!(s.contains("# using Engine;\n"));
        assert!(s.contains("# class Player : Behaviour {\n"));
        // every body line survives, commented
        for line in src.lines().filter(|l| !l.is_empty()) {
            assert!(s.contains(&format!("# {line}\n")));
        }
        // nothing outside comments except the two stub statements
        for line in s.lines() {
            assert!(
                line.is_empty() || line.starts_with('#') || line == "extends Node",
                "uncommented line: {line}"
            );
        }
    }
}
