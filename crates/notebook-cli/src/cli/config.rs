use std::io::Write;

use ze_domain::config::{Config, ConfigIssue, ConfigSeverity};

/// Tally of one validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
}

impl Summary {
    pub fn passed(&self) -> bool {
        self.errors == 0
    }
}

/// Write every issue to `out`, errors before warnings, followed by a
/// one-line tally naming `config_path`.
pub fn validate(config: &Config, config_path: &str, out: &mut impl Write) -> std::io::Result<Summary> {
    let mut issues: Vec<ConfigIssue> = config.validate();
    issues.sort_by_key(|i| i.severity != ConfigSeverity::Error);

    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    let summary = Summary {
        errors,
        warnings: issues.len() - errors,
    };

    for issue in &issues {
        writeln!(out, "{issue}")?;
    }
    match (summary.errors, summary.warnings) {
        (0, 0) => writeln!(out, "{config_path}: ok")?,
        (e, w) => writeln!(out, "{config_path}: {e} error(s), {w} warning(s)")?,
    }
    Ok(summary)
}

/// Dump the resolved config (with all defaults filled in) as TOML.
pub fn show(config: &Config) -> anyhow::Result<()> {
    let output = toml::to_string_pretty(config)
        .map_err(|e| anyhow::anyhow!("failed to serialize config: {e}"))?;
    print!("{output}");
    Ok(())
}
