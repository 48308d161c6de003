//! Output stages.  Each one renders its input as a notebook display string
//! (`%text`, `%html`, `%table`, `%angular`).

use serde_json::Value;

use super::as_text;
use crate::error::{StageError, StageResult};
use crate::stage::{ExecutionContext, PropertyLookup, Stage};

/// Property naming the script URL that provides the `echarts` global.
pub const ECHARTS_SCRIPT_PROPERTY: &str = "echarts.script";

macro_rules! display_writer {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Default)]
        pub struct $name;

        #[async_trait::async_trait]
        impl Stage for $name {
            fn set_body(&mut self, _body: &str) {}

            async fn execute(
                &self,
                input: Value,
                _props: &dyn PropertyLookup,
                _ctx: &ExecutionContext,
            ) -> StageResult {
                Ok(Value::String(format!(concat!($prefix, " {}"), as_text(&input))))
            }
        }
    };
}

display_writer!(
    /// Displays the input as plain text.
    TextWriter,
    "%text"
);
display_writer!(
    /// Displays the input as raw HTML.
    HtmlWriter,
    "%html"
);
display_writer!(
    /// Hands the input to the notebook's angular display system.
    AngularWriter,
    "%angular"
);

/// Displays inline SVG markup.
#[derive(Debug, Default)]
pub struct SvgWriter;

#[async_trait::async_trait]
impl Stage for SvgWriter {
    fn set_body(&mut self, _body: &str) {}

    async fn execute(
        &self,
        input: Value,
        _props: &dyn PropertyLookup,
        _ctx: &ExecutionContext,
    ) -> StageResult {
        let svg = as_text(&input);
        if !svg.contains("<svg") {
            return Err(StageError::InvalidInput("input is not SVG markup".into()));
        }
        Ok(Value::String(format!("%html {svg}")))
    }
}

/// Displays an image from a URL, a data URI, or raw base64.
///
/// Parameter 0 overrides the MIME type used for raw base64 (default
/// `image/png`); the body, when present, becomes the alt text.
#[derive(Debug)]
pub struct ImageWriter {
    mime: String,
    alt: String,
}

impl Default for ImageWriter {
    fn default() -> Self {
        Self {
            mime: "image/png".into(),
            alt: String::new(),
        }
    }
}

#[async_trait::async_trait]
impl Stage for ImageWriter {
    fn set_parameters(&mut self, parameters: &[String]) {
        if let Some(mime) = parameters.first() {
            self.mime = mime.clone();
        }
    }

    fn set_body(&mut self, body: &str) {
        self.alt = body.trim().to_string();
    }

    async fn execute(
        &self,
        input: Value,
        _props: &dyn PropertyLookup,
        _ctx: &ExecutionContext,
    ) -> StageResult {
        let data = as_text(&input);
        let data = data.trim();
        if data.is_empty() {
            return Err(StageError::InvalidInput("no image data".into()));
        }
        let src = if data.starts_with("http://")
            || data.starts_with("https://")
            || data.starts_with("data:")
            || data.starts_with('/')
        {
            data.to_string()
        } else {
            format!("data:{};base64,{data}", self.mime)
        };
        Ok(Value::String(format!(
            "%html <img src=\"{src}\" alt=\"{}\"/>",
            self.alt
        )))
    }
}

/// Displays a JSON array as a notebook table.
///
/// Accepts an array of objects (header from the first object's keys) or an
/// array of arrays (first row is the header).
#[derive(Debug, Default)]
pub struct TableWriter;

impl TableWriter {
    fn cell(value: &Value) -> String {
        as_text(value).replace(['\t', '\n', '\r'], " ")
    }

    fn render(rows: &[Value]) -> Result<String, StageError> {
        let mut lines: Vec<String> = Vec::with_capacity(rows.len() + 1);
        match rows.first() {
            None => return Ok(String::new()),
            Some(Value::Object(first)) => {
                let header: Vec<&String> = first.keys().collect();
                lines.push(header.iter().map(|k| k.as_str()).collect::<Vec<_>>().join("\t"));
                for row in rows {
                    let obj = row.as_object().ok_or_else(|| {
                        StageError::InvalidInput("table rows must all be objects".into())
                    })?;
                    let cells: Vec<String> = header
                        .iter()
                        .map(|k| obj.get(k.as_str()).map(Self::cell).unwrap_or_default())
                        .collect();
                    lines.push(cells.join("\t"));
                }
            }
            Some(Value::Array(_)) => {
                for row in rows {
                    let cells = row.as_array().ok_or_else(|| {
                        StageError::InvalidInput("table rows must all be arrays".into())
                    })?;
                    lines.push(cells.iter().map(Self::cell).collect::<Vec<_>>().join("\t"));
                }
            }
            Some(_) => {
                return Err(StageError::InvalidInput(
                    "table rows must be objects or arrays".into(),
                ))
            }
        }
        Ok(lines.join("\n"))
    }
}

#[async_trait::async_trait]
impl Stage for TableWriter {
    fn set_body(&mut self, _body: &str) {}

    async fn execute(
        &self,
        input: Value,
        _props: &dyn PropertyLookup,
        _ctx: &ExecutionContext,
    ) -> StageResult {
        let input = match input {
            Value::String(s) => serde_json::from_str(&s)
                .map_err(|e| StageError::InvalidInput(format!("table input is not JSON: {e}")))?,
            other => other,
        };
        let rows = input
            .as_array()
            .ok_or_else(|| StageError::InvalidInput("table input must be a JSON array".into()))?;
        Ok(Value::String(format!("%table {}", Self::render(rows)?)))
    }
}

/// Renders an ECharts option object into a chart container.
///
/// Parameter 0 is the width and parameter 1 the height (CSS lengths,
/// default `100%` x `400px`).  When the input is `Null` the body is used
/// as the option.
#[derive(Debug)]
pub struct EChartsWriter {
    width: String,
    height: String,
    option: String,
}

impl Default for EChartsWriter {
    fn default() -> Self {
        Self {
            width: "100%".into(),
            height: "400px".into(),
            option: String::new(),
        }
    }
}

#[async_trait::async_trait]
impl Stage for EChartsWriter {
    fn set_parameters(&mut self, parameters: &[String]) {
        if let Some(w) = parameters.first() {
            self.width = w.clone();
        }
        if let Some(h) = parameters.get(1) {
            self.height = h.clone();
        }
    }

    fn set_body(&mut self, body: &str) {
        self.option = body.trim().to_string();
    }

    async fn execute(
        &self,
        input: Value,
        props: &dyn PropertyLookup,
        ctx: &ExecutionContext,
    ) -> StageResult {
        let option = match input {
            Value::Null if self.option.is_empty() => {
                return Err(StageError::InvalidInput("no chart option given".into()))
            }
            Value::Null => parse_option(&self.option)?,
            Value::String(s) => parse_option(&s)?,
            other => other,
        };
        if !option.is_object() {
            return Err(StageError::InvalidInput("chart option must be a JSON object".into()));
        }

        let id = match &ctx.paragraph_id {
            Some(p) => format!("echarts_{}", p.replace(|c: char| !c.is_ascii_alphanumeric(), "_")),
            None => format!("echarts_{}", uuid::Uuid::new_v4().simple()),
        };
        let script = props
            .property(ECHARTS_SCRIPT_PROPERTY)
            .map(|src| format!("<script type=\"text/javascript\" src=\"{src}\"></script>\n"))
            .unwrap_or_default();

        Ok(Value::String(format!(
            "%html {script}<div id=\"{id}\" style=\"width: {w};height: {h};\"></div>\n\
             <script type=\"text/javascript\">\n\
             echarts.init(document.getElementById('{id}')).setOption({option});\n\
             </script>",
            w = self.width,
            h = self.height,
        )))
    }
}

fn parse_option(raw: &str) -> Result<Value, StageError> {
    serde_json::from_str(raw)
        .map_err(|e| StageError::InvalidInput(format!("chart option is not JSON: {e}")))
}
