//! `.sw` script files as the shell sees them: creation, discovery, and a
//! small line buffer for editing.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::diagnostics::{Diagnostic, DiagnosticKind, Result, SelectwayError};

pub const EXTENSION: &str = "sw";

pub fn has_script_extension(path: &Path) -> bool {
    path.extension().map(|ext| ext == EXTENSION).unwrap_or(false)
}

/// Creates (or truncates) an empty script. The name must end in `.sw`.
pub fn create_script(path: &Path) -> Result<()> {
    if !has_script_extension(path) {
        return Err(usage("File name must end with .sw"));
    }
    fs::write(path, "")?;
    Ok(())
}

/// `.sw` files directly inside `dir`, sorted by path.
pub fn list_scripts(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut scripts = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_script_extension(&path) {
            scripts.push(path);
        }
    }
    scripts.sort();
    Ok(scripts)
}

/// Lines of one script held in memory until saved. Line numbers are 1-based.
#[derive(Debug, Clone)]
pub struct ScriptBuffer {
    path: PathBuf,
    lines: Vec<String>,
}

impl ScriptBuffer {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let source = fs::read_to_string(&path)?;
        let lines = if source.is_empty() {
            Vec::new()
        } else {
            source.split('\n').map(str::to_string).collect()
        };
        Ok(Self { path, lines })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Numbered listing, one entry per line.
    pub fn render(&self) -> Vec<String> {
        self.lines
            .iter()
            .enumerate()
            .map(|(idx, line)| format!("{}: {line}", idx + 1))
            .collect()
    }

    pub fn add(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn replace(&mut self, number: usize, line: impl Into<String>) -> Result<()> {
        let idx = self.index(number)?;
        self.lines[idx] = line.into();
        Ok(())
    }

    pub fn delete(&mut self, number: usize) -> Result<String> {
        let idx = self.index(number)?;
        Ok(self.lines.remove(idx))
    }

    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, self.lines.join("\n"))?;
        Ok(())
    }

    fn index(&self, number: usize) -> Result<usize> {
        if number == 0 || number > self.lines.len() {
            return Err(usage("Invalid line number."));
        }
        Ok(number - 1)
    }
}

fn usage(message: &str) -> SelectwayError {
    SelectwayError::from(Diagnostic::new(DiagnosticKind::Usage, message))
}
