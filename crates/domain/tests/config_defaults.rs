use std::io::Write;

use ze_domain::config::Config;

#[test]
fn default_endpoint_is_local_notebook() {
    let config = Config::default();
    assert_eq!(config.notebook.endpoint, "ws://localhost:8080/ws");
    assert_eq!(config.notebook.queue_capacity, 10);
    assert_eq!(config.notebook.max_frame_size, 99_999);
}

#[test]
fn default_credentials_are_anonymous() {
    let config = Config::default();
    assert_eq!(config.notebook.principal, "anonymous");
    assert_eq!(config.notebook.ticket, "anonymous");
    assert_eq!(config.notebook.roles, "");
}

#[test]
fn partial_notebook_section_keeps_defaults() {
    let toml_str = r#"
[notebook]
endpoint = "wss://notebooks.example.com/ws"
queue_capacity = 2
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.notebook.endpoint, "wss://notebooks.example.com/ws");
    assert_eq!(config.notebook.queue_capacity, 2);
    assert_eq!(config.notebook.connect_timeout_secs, 10);
    assert_eq!(config.pipeline.directive_marker, '%');
}

#[test]
fn pipeline_section_parses() {
    let toml_str = r##"
[pipeline]
directive_marker = "#"
http_timeout_secs = 5
"##;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.pipeline.directive_marker, '#');
    assert_eq!(config.pipeline.http_timeout_secs, 5);
}

#[test]
fn load_reads_file_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[notebook]\nprincipal = \"ethan\"\nticket = \"t-1\"").unwrap();
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.notebook.principal, "ethan");
    assert_eq!(config.notebook.ticket, "t-1");
}

#[test]
fn load_reports_bad_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[notebook\nendpoint = ").unwrap();
    assert!(matches!(
        Config::load(file.path()),
        Err(ze_domain::Error::Toml(_))
    ));
}
