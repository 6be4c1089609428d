//! Builds tier-shaped interactions from transport-neutral parts.

use super::common::{InteractionOptions, MockResponse, RecordedRequest, header};
use super::{Interaction, SpecVersion, v2, v3, v4};
use serde_json::Value;

/// Build an interaction for `version`.
///
/// The description is taken from `options` and left empty otherwise, so the
/// ledger derives its default one.
#[must_use]
pub fn build_interaction(
    version: SpecVersion,
    request: RecordedRequest,
    response: MockResponse,
    options: &InteractionOptions,
) -> Interaction {
    let description = options.description.clone().unwrap_or_default();
    let rules = options.matching_rules.clone().unwrap_or_default();
    let generators = options.generators.clone().unwrap_or_default();

    match version {
        SpecVersion::V2 => Interaction::V2(v2::Interaction {
            description,
            provider_state: options.resolved_state(),
            request: v2::Request {
                method: request.method,
                path: request.path,
                query: request.query.filter(|q| !q.is_empty()),
                headers: request.headers,
                body: request.body,
                matching_rules: rules.request,
            },
            response: v2::Response {
                status: response.status,
                headers: response.headers,
                body: response.body,
                matching_rules: rules.response,
            },
            metadata: options.metadata.clone(),
        }),
        SpecVersion::V3 => Interaction::V3(v3::Interaction {
            description,
            provider_states: options.resolved_states(),
            request: v3::Request {
                method: request.method,
                path: request.path,
                query: decoded_query(request.query.as_deref()),
                headers: request.headers,
                body: request.body,
                matching_rules: rules.request,
                generators: generators.request,
            },
            response: v3::Response {
                status: response.status,
                headers: response.headers,
                body: response.body,
                matching_rules: rules.response,
                generators: generators.response,
            },
            metadata: options.metadata.clone(),
        }),
        SpecVersion::V4 => {
            let request_body = wrap_body(request.body, request.headers.as_ref());
            let response_body = wrap_body(response.body, response.headers.as_ref());
            Interaction::V4(v4::Interaction {
                kind: v4::SYNCHRONOUS_HTTP.to_string(),
                description,
                provider_states: options.resolved_states(),
                request: v4::Request {
                    method: request.method,
                    path: request.path,
                    query: decoded_query(request.query.as_deref()),
                    headers: request.headers,
                    body: request_body,
                    matching_rules: rules.request,
                    generators: generators.request,
                },
                response: v4::Response {
                    status: response.status,
                    headers: response.headers,
                    body: response_body,
                    matching_rules: rules.response,
                    generators: generators.response,
                },
                pending: None,
                metadata: options.metadata.clone(),
            })
        }
    }
}

fn decoded_query(raw: Option<&str>) -> Option<v3::Query> {
    raw.map(v3::parse_query).filter(|query| !query.is_empty())
}

fn wrap_body(content: Option<Value>, headers: Option<&super::Headers>) -> Option<v4::Body> {
    let content_type = headers
        .and_then(|h| header(h, "content-type"))
        .unwrap_or(v4::DEFAULT_CONTENT_TYPE);
    content.map(|content| v4::Body::new(content, content_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ProviderStates, SideRules};
    use serde_json::json;

    fn request() -> RecordedRequest {
        RecordedRequest::new("GET", "/todos").with_query("status=done")
    }

    #[test]
    fn test_v2_keeps_flat_body_and_raw_query() {
        let interaction = build_interaction(
            SpecVersion::V2,
            request(),
            MockResponse::ok(json!([])),
            &InteractionOptions::default().with_provider_state("todos exist"),
        );

        let Interaction::V2(inner) = interaction else {
            panic!("expected a V2 interaction");
        };
        assert_eq!(inner.request.query.as_deref(), Some("status=done"));
        assert_eq!(inner.response.body, Some(json!([])));
        assert_eq!(inner.provider_state.as_deref(), Some("todos exist"));
        assert!(inner.description.is_empty());
    }

    #[test]
    fn test_v3_decodes_query_and_states() {
        let interaction = build_interaction(
            SpecVersion::V3,
            request(),
            MockResponse::ok(json!([])),
            &InteractionOptions::default()
                .with_provider_states(ProviderStates::Name("todos exist".into()))
                .with_generators(SideRules {
                    request: None,
                    response: Some(json!({ "body": { "$.id": { "type": "Uuid" } } })),
                }),
        );

        let Interaction::V3(inner) = interaction else {
            panic!("expected a V3 interaction");
        };
        assert_eq!(inner.request.query.unwrap()["status"], vec!["done"]);
        assert_eq!(inner.provider_states.unwrap()[0].name, "todos exist");
        assert!(inner.response.generators.is_some());
    }

    #[test]
    fn test_v4_wraps_bodies_with_content_type() {
        let response = MockResponse::ok(json!("plain")).with_header("Content-Type", "text/plain");
        let interaction = build_interaction(
            SpecVersion::V4,
            request().with_body(json!({ "name": "Todo" })),
            response,
            &InteractionOptions::default().with_description("list todos"),
        );

        let Interaction::V4(inner) = interaction else {
            panic!("expected a V4 interaction");
        };
        assert_eq!(inner.kind, v4::SYNCHRONOUS_HTTP);
        assert_eq!(inner.description, "list todos");
        assert_eq!(inner.request.body, Some(v4::Body::json(json!({ "name": "Todo" }))));
        assert_eq!(
            inner.response.body,
            Some(v4::Body::new(json!("plain"), "text/plain"))
        );
    }

    #[test]
    fn test_metadata_carried_on_every_tier() {
        let options = InteractionOptions::default()
            .with_description("list todos")
            .with_metadata("team", json!("web"));

        for version in [SpecVersion::V2, SpecVersion::V3, SpecVersion::V4] {
            let interaction =
                build_interaction(version, request(), MockResponse::ok(json!([])), &options);
            let value = serde_json::to_value(&interaction).unwrap();
            assert_eq!(value["metadata"], json!({ "team": "web" }));
            assert_eq!(Interaction::from_value(version, value).unwrap(), interaction);
        }
    }
}
