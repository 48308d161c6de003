//! Splits a paragraph into directive lines and their bodies.

use crate::error::PipelineError;

/// One directive line plus the text that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDirective {
    pub line: String,
    pub body: String,
}

/// Split `text` into directives.
///
/// A line whose first non-blank character is `marker` starts a directive;
/// every following line up to the next directive is its body.  Non-blank
/// text before the first directive is rejected.
pub fn split_script(text: &str, marker: char) -> Result<Vec<ScriptDirective>, PipelineError> {
    let mut directives: Vec<ScriptDirective> = Vec::new();
    let mut body: Vec<&str> = Vec::new();

    for (lineno, line) in text.lines().enumerate() {
        if line.trim_start().starts_with(marker) {
            if let Some(last) = directives.last_mut() {
                last.body = body.join("\n");
            }
            body.clear();
            directives.push(ScriptDirective {
                line: line.trim().to_string(),
                body: String::new(),
            });
        } else if directives.is_empty() {
            if !line.trim().is_empty() {
                return Err(PipelineError::MalformedCommand(format!(
                    "line {}: text before the first '{marker}' directive",
                    lineno + 1
                )));
            }
        } else {
            body.push(line);
        }
    }

    if let Some(last) = directives.last_mut() {
        last.body = body.join("\n");
    }
    Ok(directives)
}
