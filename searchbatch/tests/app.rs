use clap::Parser;
use searchbatch::{build_agent, Cli};
use searchbatch_core::SearchbatchError;

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["searchbatch"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn builds_agent_with_search_tool() {
    let agent = build_agent(&cli(&["--api-key", "sk-test"])).unwrap();
    let names: Vec<&str> = agent.tool_specs().iter().map(|spec| spec.name.as_str()).collect();
    assert_eq!(names, vec!["duckduckgo-search"]);
}

#[test]
fn builds_agent_with_file_history() {
    let dir = tempfile::tempdir().unwrap();
    let history = dir.path().to_str().unwrap();
    assert!(build_agent(&cli(&["--api-key", "sk-test", "--history-dir", history])).is_ok());
}

#[test]
fn blank_api_key_is_a_config_error() {
    let err = build_agent(&cli(&["--api-key", "  "])).unwrap_err();
    assert!(matches!(err, SearchbatchError::InvalidConfig(_)));
}

#[test]
fn zero_iterations_is_a_config_error() {
    let err = build_agent(&cli(&["--api-key", "sk-test", "--max-iterations", "0"])).unwrap_err();
    assert!(matches!(err, SearchbatchError::InvalidConfig(_)));
}
