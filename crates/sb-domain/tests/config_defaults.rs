use sb_domain::config::Config;

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "localhost");
    assert_eq!(config.server.port, 8000);
}

#[test]
fn explicit_host_parses_from_toml() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 3210
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 3210);
}

#[test]
fn routing_section_parses_partial_overrides() {
    let toml_str = r#"
[routing]
confidence_threshold = 0.35
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.routing.confidence_threshold, 0.35);
    assert_eq!(config.routing.skill_match_weight, 1.5);
}

#[test]
fn bootstrap_agents_parse_from_toml_array() {
    let toml_str = r#"
[bootstrap]
default_agents = ["http://localhost:9001", "http://localhost:9002"]
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.bootstrap.default_agents.len(), 2);
}
