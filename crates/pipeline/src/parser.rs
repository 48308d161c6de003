//! Directive-line grammar: `<in|process|out> <stage> [param ...] <last>`.

use crate::error::PipelineError;
use crate::stage::StageRole;

/// Marker that introduces a directive line in a paragraph.
pub const DEFAULT_MARKER: char = '%';

/// A tokenized directive line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub role: StageRole,
    pub stage_name: String,
    pub parameters: Vec<String>,
}

/// Strip every `marker` and collapse whitespace runs (tabs included) to a
/// single space.
pub fn normalize(line: &str, marker: char) -> String {
    line.replace(marker, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a directive line using [`DEFAULT_MARKER`].
pub fn parse(line: &str) -> Result<ParsedCommand, PipelineError> {
    parse_with_marker(line, DEFAULT_MARKER)
}

/// Parse a directive line.
///
/// Parameters are the tokens after the stage name, excluding the final
/// token: `in http a b c` yields `["a", "b"]`, and `in http a` yields none.
pub fn parse_with_marker(line: &str, marker: char) -> Result<ParsedCommand, PipelineError> {
    let normalized = normalize(line, marker);
    let tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();

    if tokens.len() < 2 {
        return Err(PipelineError::MalformedCommand(format!(
            "expected '<in|process|out> <stage>', got '{normalized}'"
        )));
    }

    let role = StageRole::from_keyword(tokens[0])
        .ok_or_else(|| PipelineError::UnknownCommandType(tokens[0].to_string()))?;

    let parameters = if tokens.len() > 2 {
        tokens[2..tokens.len() - 1]
            .iter()
            .map(|t| t.to_string())
            .collect()
    } else {
        Vec::new()
    };

    Ok(ParsedCommand {
        role,
        stage_name: tokens[1].to_string(),
        parameters,
    })
}
