//! reqwest transport integration tests

#[cfg(test)]
mod tests {
    use crate::common::service_config;
    use graph_batch::http::ReqwestExecutor;
    use graph_batch::{BatchError, HttpRequest, RequestExecutor, StepBody};
    use serde_json::{Value, json};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_collects_status_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/users"))
            .and(query_param("$top", "2"))
            .and(header("ConsistencyLevel", "eventual"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("request-id", "abc-123")
                    .set_body_json(json!({"value": [{"id": "1"}, {"id": "2"}]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let executor = ReqwestExecutor::new(&service_config(&server.uri(), 20)).unwrap();
        let request = HttpRequest::get(&format!("{}/v1.0/users?$top=2", server.uri()))
            .unwrap()
            .with_header("ConsistencyLevel", "eventual");

        let response = executor.execute(request).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.header("Request-Id"), Some("abc-123"));
        let body: Value = response.deserialize().unwrap();
        assert_eq!(body["value"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_body_content_type_is_inferred() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1.0/me/events"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"subject": "standup"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "evt-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let executor = ReqwestExecutor::new(&service_config(&server.uri(), 20)).unwrap();
        let request = HttpRequest::post(
            &format!("{}/v1.0/me/events", server.uri()),
            StepBody::json(json!({"subject": "standup"})),
        )
        .unwrap();

        let response = executor.execute(request).await.unwrap();
        assert_eq!(response.status, 201);
    }

    #[tokio::test]
    async fn test_error_status_is_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let executor = ReqwestExecutor::new(&service_config(&server.uri(), 20)).unwrap();
        let response = executor
            .execute(HttpRequest::get(&format!("{}/v1.0/me", server.uri())).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status, 503);
        assert!(!response.is_success());
        assert_eq!(response.text().unwrap(), "unavailable");
    }

    #[tokio::test]
    async fn test_connection_failure_is_a_transport_error() {
        // Nothing listens on the reserved port 1.
        let uri = "http://127.0.0.1:1";

        let executor = ReqwestExecutor::new(&service_config(&uri, 20)).unwrap();
        let err = executor
            .execute(HttpRequest::get(&format!("{}/v1.0/me", uri)).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, BatchError::Transport(_)));
        assert!(err.is_retryable());
    }
}
