//! Built-in stages: input readers and output writers.

pub mod readers;
pub mod writers;

use std::time::Duration;

use serde_json::Value;
use ze_domain::config::PipelineConfig;

use crate::registry::StageDescriptor;
use crate::stage::{Stage, StageRole};

/// Every built-in stage, ready to be registered.
pub(crate) fn builtin_descriptors(config: &PipelineConfig) -> Vec<StageDescriptor> {
    let http_timeout = Duration::from_secs(config.http_timeout_secs);
    vec![
        // ── Input ────────────────────────────────────────────────────
        StageDescriptor::of::<readers::HtmlReader>(StageRole::Input, "html"),
        StageDescriptor::of::<readers::TextReader>(StageRole::Input, "text"),
        StageDescriptor::of::<readers::JsonReader>(StageRole::Input, "json"),
        StageDescriptor::of::<readers::InterpreterReader>(StageRole::Input, "intpr"),
        StageDescriptor::new(StageRole::Input, "http", move || {
            readers::HttpReader::new(http_timeout).map(|r| Box::new(r) as Box<dyn Stage>)
        }),
        // ── Output ───────────────────────────────────────────────────
        StageDescriptor::of::<writers::AngularWriter>(StageRole::Output, "angular"),
        StageDescriptor::of::<writers::EChartsWriter>(StageRole::Output, "echarts"),
        StageDescriptor::of::<writers::HtmlWriter>(StageRole::Output, "html"),
        StageDescriptor::of::<writers::ImageWriter>(StageRole::Output, "image"),
        StageDescriptor::of::<writers::SvgWriter>(StageRole::Output, "svg"),
        StageDescriptor::of::<writers::TableWriter>(StageRole::Output, "table"),
        StageDescriptor::of::<writers::TextWriter>(StageRole::Output, "text"),
    ]
}

/// Render a stage value as display text.  Strings are used verbatim.
pub fn as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
