//! Tests for `workflow` subcommands.

use super::command;
use crate::cli::{Cli, CliCommand, WorkflowCommand};
use clap::Parser;

fn workflow(args: &[&str]) -> WorkflowCommand {
    match command(args) {
        CliCommand::Workflow { command } => command,
        _ => panic!("expected Workflow"),
    }
}

#[test]
fn cli_parse_workflow_list_and_sessions() {
    assert!(matches!(
        workflow(&["tdusers", "workflow", "list"]),
        WorkflowCommand::List
    ));
    assert!(matches!(
        workflow(&["tdusers", "workflow", "sessions"]),
        WorkflowCommand::Sessions
    ));
}

#[test]
fn cli_parse_workflow_run_by_name() {
    match workflow(&[
        "tdusers",
        "workflow",
        "run",
        "--name",
        "etl.daily",
        "--param",
        "target=2024-03",
        "--param",
        "full=true",
        "--wait",
        "--poll-interval",
        "30",
    ]) {
        WorkflowCommand::Run {
            id,
            name,
            params,
            wait,
            poll_interval,
            timeout,
        } => {
            assert!(id.is_none());
            assert_eq!(name.as_deref(), Some("etl.daily"));
            assert_eq!(params, ["target=2024-03", "full=true"]);
            assert!(wait);
            assert_eq!(poll_interval, Some(30));
            assert!(timeout.is_none());
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_workflow_run_by_id() {
    match workflow(&["tdusers", "workflow", "run", "--id", "1234"]) {
        WorkflowCommand::Run { id, name, wait, .. } => {
            assert_eq!(id.as_deref(), Some("1234"));
            assert!(name.is_none());
            assert!(!wait);
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_workflow_run_needs_exactly_one_target() {
    assert!(Cli::try_parse_from(["tdusers", "workflow", "run"]).is_err());
    assert!(
        Cli::try_parse_from(["tdusers", "workflow", "run", "--id", "1", "--name", "a.b"]).is_err()
    );
}

#[test]
fn cli_parse_workflow_check() {
    match workflow(&["tdusers", "workflow", "check", "777"]) {
        WorkflowCommand::Check { session_id } => assert_eq!(session_id, "777"),
        _ => panic!("expected Check"),
    }
}
