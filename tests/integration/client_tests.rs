//! Batch client integration tests

#[cfg(test)]
mod tests {
    use crate::assert_ok;
    use crate::common::{BatchResponder, StepOutcome, service_config};
    use graph_batch::http::{BaseUrlConverter, Method, RequestInformation, SequentialIdGenerator};
    use graph_batch::{
        BatchClient, BatchError, BatchRequestContent, BatchRequestContentCollection,
        BatchRequestStep, ErrorMapping, HttpRequest, ReqwestExecutor, ServiceError, StepBody,
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn batch_server(responder: BatchResponder, expected_posts: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1.0/$batch"))
            .and(header("content-type", "application/json"))
            .respond_with(responder)
            .expect(expected_posts)
            .mount(&server)
            .await;
        server
    }

    fn client(server: &MockServer, limit: usize) -> BatchClient<ReqwestExecutor> {
        assert_ok!(BatchClient::from_config(service_config(&server.uri(), limit)))
    }

    #[tokio::test]
    async fn test_post_content_with_dependencies() {
        let server = batch_server(BatchResponder::new(), 1).await;
        let client = client(&server, 20);
        let root = format!("{}/v1.0", server.uri());

        let content = BatchRequestContent::from_steps([
            BatchRequestStep::new("A", HttpRequest::get(&format!("{}/me", root)).unwrap()).unwrap(),
            BatchRequestStep::new(
                "B",
                HttpRequest::post(&format!("{}/me/events", root), StepBody::json(json!({"k": 1})))
                    .unwrap(),
            )
            .unwrap()
            .with_depends_on(["A"]),
        ])
        .unwrap();

        let response = assert_ok!(client.post_content(&content).await);

        let a: Value = response.get_by_id_as("A").unwrap().unwrap();
        assert_eq!(a["url"], "/me");
        assert_eq!(a["method"], "GET");
        assert_eq!(a["dependsOn"], Value::Null);

        let b: Value = response.get_by_id_as("B").unwrap().unwrap();
        assert_eq!(b["method"], "POST");
        assert_eq!(b["dependsOn"], json!(["A"]));
        assert_eq!(b["echo"], json!({"k": 1}));
    }

    #[tokio::test]
    async fn test_post_collection_splits_and_resolves_ids() {
        let responder = BatchResponder::new()
            .with_outcome("5", StepOutcome::Error(404, "Request_ResourceNotFound"))
            .with_outcome("12", StepOutcome::Error(429, "TooManyRequests"));
        let server = batch_server(responder, 3).await;
        let client = client(&server, 5);
        let root = format!("{}/v1.0", server.uri());

        let mut collection = BatchRequestContentCollection::with_limit_and_id_generator(
            5,
            Arc::new(SequentialIdGenerator::new()),
        )
        .unwrap();
        for i in 1..=12 {
            collection
                .add_request(HttpRequest::get(&format!("{}/users/u{}", root, i)).unwrap())
                .unwrap();
        }

        let responses = assert_ok!(client.post_collection(&mut collection).await);
        assert_eq!(responses.len(), 3);

        let user: Value = responses.get_by_id_as("11").unwrap().unwrap();
        assert_eq!(user["url"], "/users/u11");
        assert!(responses.get_by_id("99").unwrap().is_none());

        match responses.get_by_id_as::<Value>("5") {
            Err(BatchError::Service(error)) => {
                assert_eq!(error.status, 404);
                assert_eq!(error.code.as_deref(), Some("Request_ResourceNotFound"));
                assert_eq!(error.message.as_deref(), Some("step 5 failed"));
                assert_eq!(error.request_id(), Some("req-5"));
            }
            other => panic!("expected Service error, got {:?}", other),
        }

        let statuses = responses.get_all_status_codes().unwrap();
        assert_eq!(statuses.len(), 12);
        let retry = collection.build_failed_requests_collection(&statuses).unwrap();
        let mut failed: Vec<&str> = retry.get_all_steps().into_keys().collect();
        failed.sort_unstable();
        assert_eq!(failed, ["12", "5"]);
    }

    #[tokio::test]
    async fn test_malformed_step_does_not_hide_others() {
        let responder = BatchResponder::new().with_outcome("2", StepOutcome::Malformed);
        let server = batch_server(responder, 1).await;
        let client = client(&server, 20);
        let root = format!("{}/v1.0", server.uri());

        let content = BatchRequestContent::from_steps(
            ["1", "2", "3"].map(|id| {
                BatchRequestStep::new(id, HttpRequest::get(&format!("{}/me", root)).unwrap())
                    .unwrap()
            }),
        )
        .unwrap();

        let response = assert_ok!(client.post_content(&content).await);
        assert!(matches!(
            response.get_by_id("2"),
            Err(BatchError::MalformedElement { ref id, .. }) if id == "2"
        ));
        assert_eq!(response.get_by_id("1").unwrap().unwrap().status, 200);
        assert_eq!(response.get_by_id("3").unwrap().unwrap().status, 200);
        assert_eq!(response.parse_count(), 1);
    }

    #[tokio::test]
    async fn test_step_errors_use_client_error_mapping() {
        let responder = BatchResponder::new().with_outcome("1", StepOutcome::Error(403, "Forbidden"));
        let server = batch_server(responder, 1).await;
        let mapping = ErrorMapping::new()
            .with("403", |e: ServiceError| BatchError::Mapped {
                status: e.status,
                source: Box::new(e),
            })
            .unwrap();
        let client = client(&server, 20).with_error_mapping(mapping);

        let content = BatchRequestContent::from_steps([BatchRequestStep::new(
            "1",
            HttpRequest::get(&format!("{}/v1.0/sites/root", server.uri())).unwrap(),
        )
        .unwrap()])
        .unwrap();

        let response = assert_ok!(client.post_content(&content).await);
        let err = response.get_by_id_as::<Value>("1").unwrap_err();
        assert!(matches!(err, BatchError::Mapped { status: 403, .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_failed_exchange_raises_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1.0/$batch"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"code": "InvalidAuthenticationToken", "message": "Access token is empty."}
            })))
            .expect(1)
            .mount(&server)
            .await;
        let client = client(&server, 20);

        let content = BatchRequestContent::from_steps([BatchRequestStep::new(
            "1",
            HttpRequest::get(&format!("{}/v1.0/me", server.uri())).unwrap(),
        )
        .unwrap()])
        .unwrap();

        let err = client.post_content(&content).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("InvalidAuthenticationToken"));
    }

    #[tokio::test]
    async fn test_converted_requests_round_trip() {
        let server = batch_server(BatchResponder::new(), 1).await;
        let client = client(&server, 20);
        let converter = BaseUrlConverter::new(&client.config().base_url).unwrap();

        let mut collection = client.new_collection().unwrap();
        let id = collection
            .add_request_info(
                &converter,
                RequestInformation::new(Method::GET, "/me/messages")
                    .with_query("$select", "subject")
                    .with_query("$top", "3"),
            )
            .await
            .unwrap();

        let responses = assert_ok!(client.post_collection(&mut collection).await);
        let body: Value = responses.get_by_id_as(&id).unwrap().unwrap();
        assert_eq!(body["url"], "/me/messages?$select=subject&$top=3");
    }
}
