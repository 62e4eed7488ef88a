use crate::{Token, TokenList};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Load a token stream from a JSON-Lines file: one [`Token`] object per
/// line. The producing scanner is expected to have already appended the
/// trailing `FILE_END` pivot; this loader only parses and validates it's
/// there.
pub fn load_token_stream(path: &Path) -> Result<TokenList> {
    let file = File::open(path).with_context(|| format!("opening token stream {path:?}"))?;
    let reader = BufReader::new(file);

    let mut tokens = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading {path:?} line {}", lineno + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let token: Token = serde_json::from_str(&line)
            .with_context(|| format!("parsing token at {path:?} line {}", lineno + 1))?;
        tokens.push(token);
    }

    TokenList::new(tokens).with_context(|| format!("validating token stream {path:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_a_well_formed_stream() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"kind":1,"line":1,"column":0,"length":1}}"#).unwrap();
        writeln!(file, r#"{{"kind":4294967295,"line":2,"column":0,"length":0}}"#).unwrap();
        let list = load_token_stream(file.path()).unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn rejects_a_stream_missing_file_end() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"kind":1,"line":1,"column":0,"length":1}}"#).unwrap();
        assert!(load_token_stream(file.path()).is_err());
    }

    #[test]
    fn skips_blank_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"kind":1,"line":1,"column":0,"length":1}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"kind":4294967295,"line":2,"column":0,"length":0}}"#).unwrap();
        let list = load_token_stream(file.path()).unwrap();
        assert_eq!(list.len(), 2);
    }
}
