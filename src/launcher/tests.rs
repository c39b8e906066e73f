//! Unit tests for launcher command parsing and spawning

use super::*;
use serial_test::serial;

fn base_env() -> Vec<String> {
    vec![
        "HOME=/home/user".to_string(),
        "A=old".to_string(),
        "PATH=/usr/bin".to_string(),
    ]
}

#[test]
fn test_plain_command_inherits_environment() {
    let spec = build_exec("/bin/x --y", &base_env());
    assert_eq!(spec.argv, vec!["/bin/x", "--y"]);
    assert_eq!(spec.envp, base_env());
}

#[test]
fn test_leading_assignments_override_and_append() {
    let spec = build_exec("A=1 B=2 /bin/x --y", &base_env());
    assert_eq!(spec.argv, vec!["/bin/x", "--y"]);

    // A replaces the inherited entry in place, B is appended
    assert!(spec.envp.contains(&"A=1".to_string()));
    assert!(!spec.envp.contains(&"A=old".to_string()));
    assert!(spec.envp.contains(&"B=2".to_string()));
    assert!(spec.envp.contains(&"HOME=/home/user".to_string()));
    assert!(spec.envp.contains(&"PATH=/usr/bin".to_string()));
}

#[test]
fn test_assignment_after_command_is_an_argument() {
    let spec = build_exec("/bin/x A=1", &base_env());
    assert_eq!(spec.argv, vec!["/bin/x", "A=1"]);
    assert_eq!(spec.envp, base_env());
}

#[test]
fn test_override_matches_on_key_prefix() {
    // The match compares only the key's bytes against the entry head, so
    // FOO=1 also claims an inherited FOOBAR entry (first match wins).
    let inherited = vec!["FOOBAR=x".to_string(), "FOO=y".to_string()];
    let spec = build_exec("FOO=1 /bin/x", &inherited);
    assert_eq!(spec.envp, vec!["FOO=1".to_string(), "FOO=y".to_string()]);
}

#[test]
fn test_second_override_of_same_key_wins_once() {
    let spec = build_exec("A=1 A=2 /bin/x", &base_env());
    let a_entries: Vec<&String> = spec
        .envp
        .iter()
        .filter(|e| e.starts_with("A="))
        .collect();
    assert_eq!(a_entries, vec![&"A=2".to_string()]);
}

#[test]
fn test_empty_and_assignment_only_commands() {
    let spec = build_exec("", &base_env());
    assert!(spec.argv.is_empty());

    let spec = build_exec("A=1 B=2", &base_env());
    assert!(spec.argv.is_empty());
    assert!(spec.envp.contains(&"A=1".to_string()));

    assert!(matches!(
        spawn_detached(&spec),
        Err(ShellError::EmptyCommand)
    ));
}

#[test]
fn test_whitespace_runs_are_single_separators() {
    let spec = build_exec("  A=1   /bin/x    --y  ", &base_env());
    assert_eq!(spec.argv, vec!["/bin/x", "--y"]);
    assert!(spec.envp.contains(&"A=1".to_string()));
}

#[test]
fn test_nul_byte_is_rejected() {
    let spec = ExecSpec {
        argv: vec!["/bin/x\0--y".to_string()],
        envp: vec![],
    };
    assert!(matches!(
        spawn_detached(&spec),
        Err(ShellError::NulInCommand)
    ));
}

#[test]
#[serial]
fn test_inherited_env_reflects_process_environment() {
    std::env::set_var("HALO_SHELL_TEST_MARKER", "present");
    let env = inherited_env();
    assert!(env.contains(&"HALO_SHELL_TEST_MARKER=present".to_string()));
    std::env::remove_var("HALO_SHELL_TEST_MARKER");
}

#[test]
#[serial]
fn test_override_against_real_environment() {
    std::env::set_var("HALO_SHELL_TEST_A", "old");
    let spec = build_exec("HALO_SHELL_TEST_A=new /bin/x", &inherited_env());
    assert!(spec.envp.contains(&"HALO_SHELL_TEST_A=new".to_string()));
    assert!(!spec.envp.contains(&"HALO_SHELL_TEST_A=old".to_string()));
    std::env::remove_var("HALO_SHELL_TEST_A");
}
