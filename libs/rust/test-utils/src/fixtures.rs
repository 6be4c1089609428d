//! Test fixtures with sample data.
//!
//! A small todo-service contract: a consumer called `web-app` listing,
//! creating and fetching todos behind the `/todo-service` base path.

use pact_ledger::{
    Interaction, InteractionOptions, MockResponse, Pact, PactDefinition, PactFile, PactOptions,
    RecordedRequest, ResolvedEnvironment, SpecVersion, build_interaction,
};
use serde_json::{Value, json};
use std::path::Path;

/// Consumer name used by the fixtures.
pub const CONSUMER: &str = "web-app";

/// Provider name used by the fixtures.
pub const PROVIDER: &str = "todo-service";

/// Base path the provider is mounted under.
pub const BASE_PATH: &str = "/todo-service";

/// Two sample todos.
#[must_use]
pub fn todos() -> Value {
    json!([
        { "id": 1, "title": "write contract tests", "done": false },
        { "id": 2, "title": "publish pacts", "done": true },
    ])
}

/// Environment for the fixture consumer writing into `output_dir`.
#[must_use]
pub fn sample_environment(version: SpecVersion, output_dir: &Path) -> ResolvedEnvironment {
    ResolvedEnvironment::new(CONSUMER, version).with_options(
        PactOptions::default()
            .with_base_path(BASE_PATH)
            .with_output_dir(output_dir),
    )
}

/// `GET /todo-service/todos` returning [`todos`].
#[must_use]
pub fn list_todos(version: SpecVersion) -> Interaction {
    build_interaction(
        version,
        RecordedRequest::new("GET", "/todo-service/todos").with_header("accept", "application/json"),
        MockResponse::ok(todos()).with_header("content-type", "application/json"),
        &InteractionOptions::default()
            .with_description("list todos")
            .with_provider_state("todos exist"),
    )
}

/// `POST /todo-service/todos` creating a todo.
#[must_use]
pub fn create_todo(version: SpecVersion) -> Interaction {
    build_interaction(
        version,
        RecordedRequest::new("POST", "/todo-service/todos")
            .with_header("content-type", "application/json")
            .with_body(json!({ "title": "write contract tests" })),
        MockResponse::ok(json!({ "id": 3, "title": "write contract tests", "done": false }))
            .with_status(201),
        &InteractionOptions::default().with_description("create todo"),
    )
}

/// `GET /todo-service/todos/{id}` without a description.
#[must_use]
pub fn get_todo(version: SpecVersion, id: u32) -> Interaction {
    build_interaction(
        version,
        RecordedRequest::new("GET", format!("/todo-service/todos/{id}")),
        MockResponse::ok(json!({ "id": id, "title": "write contract tests", "done": false })),
        &InteractionOptions::default(),
    )
}

/// Ledger for the fixture pair, stripping [`BASE_PATH`].
///
/// # Panics
///
/// Panics if the ledger rejects the fixture definition.
#[must_use]
pub fn sample_pact(version: SpecVersion) -> Pact {
    let definition = PactDefinition::new(CONSUMER, PROVIDER).with_version(version.as_str());
    match Pact::new(definition, PactOptions::default().with_base_path(BASE_PATH)) {
        Ok(pact) => pact,
        Err(err) => panic!("invalid fixture pact: {err}"),
    }
}

/// Pact file recorded from [`list_todos`] and [`create_todo`].
///
/// # Panics
///
/// Panics if the ledger rejects a fixture interaction.
#[must_use]
pub fn sample_pact_file(version: SpecVersion) -> PactFile {
    let mut pact = sample_pact(version);
    for interaction in [list_todos(version), create_todo(version)] {
        if let Err(err) = pact.record(interaction) {
            panic!("fixture interaction rejected: {err}");
        }
    }
    pact.generate_pact_file()
}
