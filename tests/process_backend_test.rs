//! Integration tests for the process backend.

#![cfg(unix)]

use tempfile::TempDir;
use tracegraph::{
    ComponentDef, Expr, GraphError, Interpreter, PipelineDef, ProcessBackend, Tracer, Value,
    ValueType,
};

fn no_args() -> Vec<(String, Expr)> {
    Vec::new()
}

fn shell(function: &str, script: &str) -> ComponentDef {
    ComponentDef::new(function).command(["sh", "-c", script, "sh"])
}

#[test]
fn child_output_becomes_component_value() {
    let answer = shell("answer", r#"echo '{"output": 42}'"#).returns(ValueType::Integer);
    let main = PipelineDef::new("main").body(move |t, _| {
        let value = t.call(&answer, no_args())?;
        Ok(Some(value.into()))
    });
    let pipeline = Tracer::new().invoke(&main, no_args()).unwrap();
    let outcome = Interpreter::new(ProcessBackend::new()).run(&pipeline).unwrap();
    assert_eq!(outcome.value, Some(Value::Integer(42)));
}

#[test]
fn inputs_are_passed_as_flags() {
    let shout = shell(
        "shout",
        r#"printf '{"output": "%s!"}\n' "${1#--phrase=}""#,
    )
    .param("phrase", ValueType::String)
    .returns(ValueType::String);
    let main = PipelineDef::new("main").body(move |t, _| {
        let first = t.call(&shout, [("phrase", "winter")])?;
        let second = t.call(&shout, [("phrase", first)])?;
        Ok(Some(second.into()))
    });
    let pipeline = Tracer::new().invoke(&main, no_args()).unwrap();
    let outcome = Interpreter::new(ProcessBackend::new()).run(&pipeline).unwrap();
    assert_eq!(outcome.value, Some(Value::from("winter!!")));
}

#[test]
fn working_directory_and_environment_are_applied() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("house.txt"), "Stark").unwrap();
    let read = shell(
        "read",
        r#"printf '{"output": "%s %s"}\n' "$(cat house.txt)" "$MOTTO""#,
    )
    .returns(ValueType::String);
    let main = PipelineDef::new("main").body(move |t, _| {
        let value = t.call(&read, no_args())?;
        Ok(Some(value.into()))
    });
    let pipeline = Tracer::new().invoke(&main, no_args()).unwrap();
    let backend = ProcessBackend::new()
        .with_cwd(temp.path())
        .with_env("MOTTO", "Winter");
    let outcome = Interpreter::new(backend).run(&pipeline).unwrap();
    assert_eq!(outcome.value, Some(Value::from("Stark Winter")));
}

#[test]
fn non_zero_exit_is_a_backend_error() {
    let fail = shell("fail", "echo broken >&2; exit 3").returns(ValueType::String);
    let main = PipelineDef::new("main").body(move |t, _| {
        t.call(&fail, no_args())?;
        Ok(None)
    });
    let pipeline = Tracer::new().invoke(&main, no_args()).unwrap();
    let err = Interpreter::new(ProcessBackend::new())
        .run(&pipeline)
        .unwrap_err();
    match err {
        GraphError::BackendExecution { message, .. } => {
            assert!(message.contains("code 3"));
            assert!(message.contains("broken"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn missing_command_is_a_backend_error() {
    let bare = ComponentDef::new("bare").returns(ValueType::String);
    let main = PipelineDef::new("main").body(move |t, _| {
        t.call(&bare, no_args())?;
        Ok(None)
    });
    let pipeline = Tracer::new().invoke(&main, no_args()).unwrap();
    let err = Interpreter::new(ProcessBackend::new())
        .run(&pipeline)
        .unwrap_err();
    assert!(matches!(err, GraphError::BackendExecution { .. }));
}

#[test]
fn malformed_output_is_a_backend_error() {
    let noisy = shell("noisy", "echo not json").returns(ValueType::String);
    let main = PipelineDef::new("main").body(move |t, _| {
        t.call(&noisy, no_args())?;
        Ok(None)
    });
    let pipeline = Tracer::new().invoke(&main, no_args()).unwrap();
    let err = Interpreter::new(ProcessBackend::new())
        .run(&pipeline)
        .unwrap_err();
    assert!(matches!(err, GraphError::BackendExecution { .. }));
}
