//! Discovery and loading of JSON AST dumps.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use fpp_ast::Ast;
use tracing::debug;

/// Expand `inputs` into a sorted, deduplicated list of dump files.
///
/// Directories contribute every `*.json` file below them; anything else is
/// taken as a glob pattern, so a plain path matches itself.
pub fn discover(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let path = Path::new(input);
        let pattern = if path.is_dir() {
            path.join("**").join("*.json").to_string_lossy().into_owned()
        } else {
            input.clone()
        };
        let before = files.len();
        for entry in glob::glob(&pattern).with_context(|| format!("invalid input pattern `{input}`"))? {
            let file = entry.with_context(|| format!("failed to read an entry of `{input}`"))?;
            if file.is_file() {
                files.push(file);
            }
        }
        if files.len() == before {
            bail!("no AST dumps found for `{input}`");
        }
    }
    files.sort();
    files.dedup();
    debug!(files = files.len(), "discovered AST dumps");
    Ok(files)
}

/// Read and validate one dump.
pub fn load(path: &Path) -> Result<Ast> {
    let json = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let ast = Ast::from_json(&json).with_context(|| format!("invalid AST dump {}", path.display()))?;
    debug!(path = %path.display(), nodes = ast.nodes.len(), tokens = ast.tokens.len(), "loaded AST");
    Ok(ast)
}

pub fn load_all(inputs: &[String]) -> Result<Vec<Ast>> {
    discover(inputs)?.iter().map(|path| load(path)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpp_ast::AstBuilder;

    #[test]
    fn directories_are_searched_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        let json = AstBuilder::new().finish().to_json().unwrap();
        fs::write(dir.path().join("b.json"), &json).unwrap();
        fs::write(nested.join("a.json"), &json).unwrap();
        fs::write(dir.path().join("notes.txt"), "skip me").unwrap();

        let input = dir.path().to_string_lossy().into_owned();
        let files = discover(&[input.clone(), input]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().is_some_and(|e| e == "json")));
    }

    #[test]
    fn missing_inputs_are_reported() {
        let err = discover(&["/nonexistent/dump.json".to_string()]).unwrap_err();
        assert!(err.to_string().contains("no AST dumps found"));
    }

    #[test]
    fn invalid_dumps_carry_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }
}
