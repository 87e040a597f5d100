use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rester::config::Config;
use rester::storage::InMemoryCollection;
use rester::{FieldKind, Fields, PersistenceAdapter, RecordId, Schema, StoreFailurePolicy};

/// rester - walk a record through create, update, replace and delete
#[derive(Parser, Debug)]
#[command(name = "rester")]
#[command(version, about, long_about = None)]
struct Cli {
    /// How backend failures are reported: distinct or legacy
    #[arg(long, env = "RESTER_STORE_FAILURE")]
    store_failure: Option<StoreFailurePolicy>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(policy) = cli.store_failure {
        config.store_failure = policy;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let schema = Schema::new()
        .required("title", FieldKind::String)
        .field("description", FieldKind::String)
        .field("value", FieldKind::Number);
    let collection = Arc::new(InMemoryCollection::new("resources", schema));

    let adapter = PersistenceAdapter::builder()
        .collection(collection)
        .config(config.adapter_config())
        .build()?;

    tracing::info!(store_failure = %config.store_failure, "Adapter ready");

    step(
        "create (missing title)",
        adapter.create(fields(json!({"description": "bar"}))?).await,
    );

    let id = adapter
        .create(fields(json!({"title": "foo", "description": "bar"}))?)
        .await?;
    step("create", Ok::<_, rester::NormalizedError>(&id));

    step("update", adapter.update(&id, fields(json!({"value": 1}))?).await);
    step(
        "update (bad value)",
        adapter.update(&id, fields(json!({"value": "asdf"}))?).await,
    );
    step("lookup", adapter.lookup(Some(&id)).await);
    step(
        "replace",
        adapter
            .replace(&id, fields(json!({"title": "baz", "value": 2}))?)
            .await,
    );
    step("list", adapter.lookup(None).await);
    step("delete", adapter.delete(&id).await);
    step("lookup (deleted)", adapter.lookup(Some(&id)).await);
    step("lookup (malformed id)", adapter.find(&RecordId::new("asdf")).await);

    Ok(())
}

/// Prints one step of the walkthrough as JSON.
fn step<T: Serialize>(label: &str, outcome: Result<T, rester::NormalizedError>) {
    let rendered = match outcome {
        Ok(value) => json!({ "ok": value }),
        Err(err) => json!({ "error": err }),
    };
    println!("{label}: {rendered}");
}

/// Converts a JSON object literal into record fields. Anything else is an error.
fn fields(value: Value) -> Result<Fields> {
    Ok(serde_json::from_value(value)?)
}
