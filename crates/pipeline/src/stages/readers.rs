//! Input stages.  Each one ignores its input and produces the paragraph's data.

use std::time::Duration;

use serde_json::Value;

use crate::error::{StageError, StageResult};
use crate::stage::{ExecutionContext, PropertyLookup, Stage};

/// Emits the directive body as HTML.
#[derive(Debug, Default)]
pub struct HtmlReader {
    html: String,
}

#[async_trait::async_trait]
impl Stage for HtmlReader {
    fn set_body(&mut self, body: &str) {
        self.html = body.to_string();
    }

    async fn execute(
        &self,
        _input: Value,
        _props: &dyn PropertyLookup,
        _ctx: &ExecutionContext,
    ) -> StageResult {
        Ok(Value::String(self.html.clone()))
    }
}

/// Emits the directive body as plain text.
#[derive(Debug, Default)]
pub struct TextReader {
    text: String,
}

#[async_trait::async_trait]
impl Stage for TextReader {
    fn set_body(&mut self, body: &str) {
        self.text = body.to_string();
    }

    async fn execute(
        &self,
        _input: Value,
        _props: &dyn PropertyLookup,
        _ctx: &ExecutionContext,
    ) -> StageResult {
        Ok(Value::String(self.text.clone()))
    }
}

/// Parses the directive body as JSON.
#[derive(Debug, Default)]
pub struct JsonReader {
    raw: String,
}

#[async_trait::async_trait]
impl Stage for JsonReader {
    fn set_body(&mut self, body: &str) {
        self.raw = body.to_string();
    }

    async fn execute(
        &self,
        _input: Value,
        _props: &dyn PropertyLookup,
        _ctx: &ExecutionContext,
    ) -> StageResult {
        serde_json::from_str(&self.raw)
            .map_err(|e| StageError::InvalidInput(format!("body is not JSON: {e}")))
    }
}

/// Fetches text over HTTP.
///
/// URLs come from the directive parameters; with none, the trimmed body is
/// the URL.  One URL yields a string, several yield an array of strings.
#[derive(Debug)]
pub struct HttpReader {
    client: reqwest::Client,
    urls: Vec<String>,
}

impl HttpReader {
    pub fn new(timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("http client: {e}"))?;
        Ok(Self {
            client,
            urls: Vec::new(),
        })
    }

    async fn fetch(&self, url: &str) -> Result<String, StageError> {
        tracing::debug!(url = %url, "fetching");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StageError::Failed(format!("GET {url}: {e}")))?;
        let resp = resp
            .error_for_status()
            .map_err(|e| StageError::Failed(format!("GET {url}: {e}")))?;
        resp.text()
            .await
            .map_err(|e| StageError::Failed(format!("reading {url}: {e}")))
    }
}

#[async_trait::async_trait]
impl Stage for HttpReader {
    fn set_parameters(&mut self, parameters: &[String]) {
        self.urls.extend(parameters.iter().cloned());
    }

    fn set_body(&mut self, body: &str) {
        let body = body.trim();
        if self.urls.is_empty() && !body.is_empty() {
            self.urls.push(body.to_string());
        }
    }

    async fn execute(
        &self,
        _input: Value,
        _props: &dyn PropertyLookup,
        _ctx: &ExecutionContext,
    ) -> StageResult {
        match self.urls.as_slice() {
            [] => Err(StageError::InvalidInput("no URL given".into())),
            [url] => Ok(Value::String(self.fetch(url).await?)),
            urls => {
                let mut texts = Vec::with_capacity(urls.len());
                for url in urls {
                    texts.push(Value::String(self.fetch(url).await?));
                }
                Ok(Value::Array(texts))
            }
        }
    }
}

/// Runs the body through another notebook interpreter.
///
/// The first parameter names the interpreter; without one the body must
/// carry its own `%interpreter` line.
#[derive(Debug, Default)]
pub struct InterpreterReader {
    interpreter: String,
    code: String,
}

#[async_trait::async_trait]
impl Stage for InterpreterReader {
    fn set_parameters(&mut self, parameters: &[String]) {
        if let Some(name) = parameters.first() {
            self.interpreter = name.clone();
        }
    }

    fn set_body(&mut self, body: &str) {
        self.code = body.to_string();
    }

    async fn execute(
        &self,
        _input: Value,
        _props: &dyn PropertyLookup,
        ctx: &ExecutionContext,
    ) -> StageResult {
        let invoker = ctx
            .interpreter
            .as_ref()
            .ok_or_else(|| StageError::Unavailable("no interpreter backend configured".into()))?;
        let text = invoker.interpret(&self.interpreter, &self.code).await?;
        Ok(Value::String(text))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::stage::InterpreterInvoker;

    async fn run(stage: &dyn Stage, ctx: &ExecutionContext) -> StageResult {
        stage.execute(Value::Null, &HashMap::new(), ctx).await
    }

    #[tokio::test]
    async fn html_reader_passes_body_through() {
        let mut r = HtmlReader::default();
        r.set_body("<h1>hi</h1>");
        assert_eq!(run(&r, &ExecutionContext::new()).await.unwrap(), "<h1>hi</h1>");
    }

    #[tokio::test]
    async fn json_reader_parses_body() {
        let mut r = JsonReader::default();
        r.set_body(r#"{"series": [1, 2]}"#);
        assert_eq!(
            run(&r, &ExecutionContext::new()).await.unwrap(),
            serde_json::json!({"series": [1, 2]})
        );
    }

    #[tokio::test]
    async fn json_reader_rejects_garbage() {
        let mut r = JsonReader::default();
        r.set_body("{not json");
        assert!(matches!(
            run(&r, &ExecutionContext::new()).await,
            Err(StageError::InvalidInput(_))
        ));
    }

    #[test]
    fn http_reader_prefers_parameters_over_body() {
        let mut r = HttpReader::new(Duration::from_secs(1)).unwrap();
        r.set_parameters(&["http://a".into(), "http://b".into()]);
        r.set_body("http://ignored");
        assert_eq!(r.urls, vec!["http://a", "http://b"]);
    }

    #[test]
    fn http_reader_falls_back_to_body() {
        let mut r = HttpReader::new(Duration::from_secs(1)).unwrap();
        r.set_parameters(&[]);
        r.set_body("  http://example.com/data.json \n");
        assert_eq!(r.urls, vec!["http://example.com/data.json"]);
    }

    #[tokio::test]
    async fn http_reader_without_url_is_invalid() {
        let r = HttpReader::new(Duration::from_secs(1)).unwrap();
        assert!(matches!(
            run(&r, &ExecutionContext::new()).await,
            Err(StageError::InvalidInput(_))
        ));
    }

    struct Upper;

    #[async_trait::async_trait]
    impl InterpreterInvoker for Upper {
        async fn interpret(&self, interpreter: &str, code: &str) -> Result<String, StageError> {
            Ok(format!("{interpreter}:{}", code.to_uppercase()))
        }
    }

    #[tokio::test]
    async fn interpreter_reader_delegates() {
        let mut r = InterpreterReader::default();
        r.set_parameters(&["sh".into()]);
        r.set_body("echo 11");
        let ctx = ExecutionContext::new().with_interpreter(Arc::new(Upper));
        assert_eq!(run(&r, &ctx).await.unwrap(), "sh:ECHO 11");
    }

    #[tokio::test]
    async fn interpreter_reader_needs_backend() {
        let r = InterpreterReader::default();
        assert!(matches!(
            run(&r, &ExecutionContext::new()).await,
            Err(StageError::Unavailable(_))
        ));
    }
}
