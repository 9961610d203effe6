//! Configuration utilities for testing.

use crate::config::AcwdConfig;
use crate::test_utils::fixtures::constants::{PASSWORD, USERNAME};

/// Builder for creating test portal configurations.
#[derive(Debug)]
pub struct TestAcwdConfigBuilder {
    url: String,
    username: String,
    password: String,
    request_timeout_sec: u64,
}

impl TestAcwdConfigBuilder {
    /// Creates a new test config builder with default values.
    pub fn new() -> Self {
        Self {
            url: "http://test.local/portal/".to_string(),
            username: USERNAME.to_string(),
            password: PASSWORD.to_string(),
            request_timeout_sec: 5,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_request_timeout_sec(mut self, request_timeout_sec: u64) -> Self {
        self.request_timeout_sec = request_timeout_sec;
        self
    }

    pub fn build(self) -> AcwdConfig {
        AcwdConfig {
            url: self.url,
            username: self.username,
            password: self.password,
            request_timeout_sec: self.request_timeout_sec,
        }
    }
}

/// Creates a default test portal configuration.
pub fn test_acwd_config() -> AcwdConfig {
    TestAcwdConfigBuilder::new().build()
}

/// Creates a test portal configuration pointing at a mock server.
pub fn test_acwd_config_with_url(url: impl Into<String>) -> AcwdConfig {
    TestAcwdConfigBuilder::new().with_url(url).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acwd_config_builder() {
        let config = TestAcwdConfigBuilder::new()
            .with_url("http://custom.local")
            .with_username("custom_user")
            .with_password("custom_pass")
            .with_request_timeout_sec(2)
            .build();

        assert_eq!(config.url, "http://custom.local");
        assert_eq!(config.username, "custom_user");
        assert_eq!(config.password, "custom_pass");
        assert_eq!(config.request_timeout_sec, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_convenience_functions() {
        assert_eq!(test_acwd_config().url, "http://test.local/portal/");
        assert_eq!(
            test_acwd_config_with_url("http://mock.local").url,
            "http://mock.local"
        );
    }
}
