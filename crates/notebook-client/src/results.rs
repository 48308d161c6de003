//! Accessors for paragraph results inside server frames.
//!
//! Two shapes are supported:
//!
//! - a `NOTE` frame: `data.note.paragraphs[i].result.{msg,code,type}`
//! - a `PARAGRAPH` frame: `data.paragraph.result.{msg,code,type}`
//!
//! Every accessor fails with [`ClientError::MalformedResponse`] naming the
//! first missing step of the path.

use serde_json::Value;

use crate::error::ClientError;

enum Step<'a> {
    Key(&'a str),
    Index(usize),
}

fn walk<'a>(frame: &'a Value, steps: &[Step<'_>]) -> Result<&'a str, ClientError> {
    let mut current = frame;
    let mut path = String::new();
    for step in steps {
        let next = match step {
            Step::Key(key) => {
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(key);
                current.get(*key)
            }
            Step::Index(i) => {
                path.push_str(&format!("[{i}]"));
                current.get(*i)
            }
        };
        current = next.ok_or_else(|| ClientError::MalformedResponse(path.clone()))?;
    }
    current
        .as_str()
        .ok_or(ClientError::MalformedResponse(path))
}

fn note_paragraph_field<'a>(
    frame: &'a Value,
    index: usize,
    field: &str,
) -> Result<&'a str, ClientError> {
    walk(
        frame,
        &[
            Step::Key("data"),
            Step::Key("note"),
            Step::Key("paragraphs"),
            Step::Index(index),
            Step::Key("result"),
            Step::Key(field),
        ],
    )
}

fn paragraph_field<'a>(frame: &'a Value, field: &str) -> Result<&'a str, ClientError> {
    walk(
        frame,
        &[
            Step::Key("data"),
            Step::Key("paragraph"),
            Step::Key("result"),
            Step::Key(field),
        ],
    )
}

/// Output text of paragraph `index` in a note frame.
pub fn note_paragraph_result(frame: &Value, index: usize) -> Result<&str, ClientError> {
    note_paragraph_field(frame, index, "msg")
}

/// Result code (`SUCCESS`, `ERROR`, ...) of paragraph `index` in a note frame.
pub fn note_paragraph_code(frame: &Value, index: usize) -> Result<&str, ClientError> {
    note_paragraph_field(frame, index, "code")
}

/// Display type (`TEXT`, `HTML`, `TABLE`, ...) of paragraph `index` in a note frame.
pub fn note_paragraph_type(frame: &Value, index: usize) -> Result<&str, ClientError> {
    note_paragraph_field(frame, index, "type")
}

/// Output text of a paragraph frame.
pub fn paragraph_result(frame: &Value) -> Result<&str, ClientError> {
    paragraph_field(frame, "msg")
}

pub fn paragraph_code(frame: &Value) -> Result<&str, ClientError> {
    paragraph_field(frame, "code")
}

pub fn paragraph_type(frame: &Value) -> Result<&str, ClientError> {
    paragraph_field(frame, "type")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn note_frame() -> Value {
        json!({
            "op": "NOTE",
            "data": {"note": {"id": "2C78F5XN6", "paragraphs": [
                {"id": "p0", "result": {"code": "SUCCESS", "type": "TEXT", "msg": "ok"}},
                {"id": "p1"}
            ]}}
        })
    }

    #[test]
    fn note_paragraph_fields() {
        let frame = note_frame();
        assert_eq!(note_paragraph_result(&frame, 0).unwrap(), "ok");
        assert_eq!(note_paragraph_code(&frame, 0).unwrap(), "SUCCESS");
        assert_eq!(note_paragraph_type(&frame, 0).unwrap(), "TEXT");
    }

    #[test]
    fn missing_result_is_malformed() {
        let frame = note_frame();
        match note_paragraph_result(&frame, 1) {
            Err(ClientError::MalformedResponse(path)) => {
                assert_eq!(path, "data.note.paragraphs[1].result")
            }
            other => panic!("expected MalformedResponse, got: {other:?}"),
        }
    }

    #[test]
    fn index_out_of_range_is_malformed() {
        match note_paragraph_code(&note_frame(), 5) {
            Err(ClientError::MalformedResponse(path)) => {
                assert_eq!(path, "data.note.paragraphs[5]")
            }
            other => panic!("expected MalformedResponse, got: {other:?}"),
        }
    }

    #[test]
    fn paragraph_frame_fields() {
        let frame = json!({
            "op": "PARAGRAPH",
            "data": {"paragraph": {"status": "FINISHED",
                "result": {"code": "SUCCESS", "type": "TEXT", "msg": "11\n"}}}
        });
        assert_eq!(paragraph_result(&frame).unwrap(), "11\n");
        assert_eq!(paragraph_code(&frame).unwrap(), "SUCCESS");
        assert_eq!(paragraph_type(&frame).unwrap(), "TEXT");
    }

    #[test]
    fn non_string_leaf_is_malformed() {
        let frame = json!({"data": {"paragraph": {"result": {"msg": ["a"]}}}});
        assert!(matches!(
            paragraph_result(&frame),
            Err(ClientError::MalformedResponse(ref p)) if p == "data.paragraph.result.msg"
        ));
    }
}
