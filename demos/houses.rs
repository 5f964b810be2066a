//! Conditional pipelines and ordering dependencies.
//!
//! ```text
//! cargo run --example houses -- "Ned Stark"
//! RUST_LOG=tracegraph=debug cargo run --example houses -- "Tyrion Lannister"
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use tracegraph::compile::compile;
use tracegraph::{run_local, ComponentDef, Expr, PipelineDef, Tracer, Value, ValueType};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. The default shows one line per executed component.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tracegraph=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

fn split_name() -> tracegraph::Result<ComponentDef> {
    let output = ValueType::record(
        "Output",
        [("first", ValueType::String), ("last", ValueType::String)],
    )?;
    Ok(ComponentDef::new("split_name")
        .param("name", ValueType::String)
        .returns(output)
        .body(|inputs| {
            let names: Vec<&str> = inputs.str("name")?.split(' ').collect();
            let first = names.first().copied().unwrap_or_default();
            let last = names.last().copied().unwrap_or_default();
            Ok(tracegraph::Record::positional([Value::from(first), Value::from(last)]).into())
        }))
}

fn hello() -> ComponentDef {
    ComponentDef::new("hello")
        .param("first_name", ValueType::String)
        .param("last_name", ValueType::String)
        .returns(ValueType::String)
        .body(|inputs| {
            Ok(Value::from(format!(
                "Seven blessings, {} of house {}!",
                inputs.str("first_name")?,
                inputs.str("last_name")?
            )))
        })
}

fn lannister_motto() -> ComponentDef {
    ComponentDef::new("house_motto")
        .returns(ValueType::String)
        .body(|_| Ok(Value::from("A Lannister always pays their debts...")))
}

fn echo() -> ComponentDef {
    ComponentDef::new("echo")
        .param("phrase", ValueType::String)
        .returns(ValueType::String)
        .body(|inputs| Ok(Value::from(inputs.str("phrase")?)))
}

fn houses() -> PipelineDef {
    PipelineDef::new("houses").param("name").body(|t, args| {
        let parts = t.call(&split_name()?, [("name", args.get("name")?)])?;
        let [first, last] = <[Expr; 2]>::try_from(parts.outputs()?)
            .map_err(|_| tracegraph::GraphError::contract("split_name returns two fields"))?;

        t.when_equal(&last, "Lannister", |t| {
            let motto = t.call(&lannister_motto(), Vec::<(String, Expr)>::new())?;
            t.call(&echo(), [("phrase", motto)])?;
            Ok(())
        })?;

        t.when_not_equal(&last, "Lannister", |t| {
            let motto = t.call(&echo(), [("phrase", "Winter is coming...")])?;
            t.depends_on(&[motto.into()], |t| {
                t.call(
                    &hello(),
                    [("first_name", first.clone()), ("last_name", last.clone())],
                )?;
                Ok(())
            })?;
            Ok(())
        })?;

        let mottos = (0..3)
            .map(|_| {
                t.call(&lannister_motto(), Vec::<(String, Expr)>::new())
                    .map(Expr::from)
            })
            .collect::<tracegraph::Result<Vec<_>>>()?;
        t.depends_on(&mottos, |t| {
            t.call(&echo(), [("phrase", "That's too many Lannisters...")])?;
            Ok(())
        })?;

        let first_name_length = t.length(parts.field("first"))?;
        Ok(Some(first_name_length.into()))
    })
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Ned Stark".to_string());

    let pipeline = Tracer::new().invoke(&houses(), [("name", name.as_str())])?;
    tracing::debug!("Compiled workflow:\n{}", compile(&pipeline)?.to_yaml()?);

    let outcome = run_local(&pipeline)?;
    for step in outcome.skipped() {
        tracing::info!("skipped {}", step.path);
    }
    if let Some(value) = outcome.value {
        println!("first name length: {}", value);
    }
    Ok(())
}
