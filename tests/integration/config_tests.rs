//! Configuration loading integration tests

#[cfg(test)]
mod tests {
    use graph_batch::config::{ENV_BASE_URL, ENV_REQUEST_LIMIT, ENV_TIMEOUT_SECS};
    use graph_batch::{BatchClient, BatchConfig, BatchError};
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_yaml_file_drives_client_paging() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url: https://graph.microsoft.com/beta").unwrap();
        writeln!(file, "batch_request_limit: 4").unwrap();
        writeln!(file, "timeout_secs: 30").unwrap();
        writeln!(file, "user_agent: sync-worker/2.1").unwrap();

        let config = BatchConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.user_agent, "sync-worker/2.1");
        assert_eq!(config.batch_endpoint(), "https://graph.microsoft.com/beta/$batch");

        let client = BatchClient::from_config(config).unwrap();
        assert_eq!(client.new_collection().unwrap().limit(), 4);
    }

    #[test]
    fn test_yaml_file_with_invalid_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batch_request_limit: 50").unwrap();

        let result = BatchConfig::from_file(file.path().to_str().unwrap());
        assert!(matches!(result, Err(BatchError::Config(_))));
    }

    #[test]
    fn test_yaml_file_with_bad_syntax() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batch_request_limit: [unterminated").unwrap();

        let result = BatchConfig::from_file(file.path().to_str().unwrap());
        assert!(matches!(result, Err(BatchError::Config(msg)) if msg.contains("parse")));
    }

    #[test]
    fn test_lookup_overrides_every_key() {
        let vars = HashMap::from([
            (ENV_BASE_URL, "https://graph.microsoft.us/v1.0"),
            (ENV_REQUEST_LIMIT, "10"),
            (ENV_TIMEOUT_SECS, "15"),
        ]);

        let config =
            BatchConfig::from_lookup(|key| vars.get(key).map(|value| value.to_string())).unwrap();
        assert_eq!(config.base_url, "https://graph.microsoft.us/v1.0");
        assert_eq!(config.batch_request_limit, 10);
        assert_eq!(config.timeout_secs, 15);
    }

    #[test]
    fn test_lookup_rejects_zero_timeout() {
        let result =
            BatchConfig::from_lookup(|key| (key == ENV_TIMEOUT_SECS).then(|| "0".to_string()));
        assert!(matches!(result, Err(BatchError::Config(_))));
    }
}
