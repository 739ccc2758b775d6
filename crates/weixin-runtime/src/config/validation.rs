//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, LoggingConfig, WeixinConfig};
use weixin_core::Credentials;

/// Length of a message encryption key as issued by the platform.
pub const AES_KEY_LENGTH: usize = 43;

/// Validates the entire configuration.
pub fn validate_config(config: &WeixinConfig) -> ConfigResult<()> {
    validate_credentials(&config.app)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// The token and app id are required; the encryption key is optional but
/// must have the platform's length when given.
fn validate_credentials(app: &Credentials) -> ConfigResult<()> {
    if app.token.as_deref().is_none_or(str::is_empty) {
        return Err(ConfigError::missing_field("app.token"));
    }

    if app.app_id.as_deref().is_none_or(str::is_empty) {
        return Err(ConfigError::missing_field("app.app_id"));
    }

    if let Some(key) = app.encoding_aes_key.as_deref().filter(|k| !k.is_empty()) {
        let len = key.chars().count();
        if len != AES_KEY_LENGTH {
            return Err(ConfigError::validation(format!(
                "encoding_aes_key must be {AES_KEY_LENGTH} characters, got {len}"
            )));
        }
    }

    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> WeixinConfig {
        WeixinConfig {
            app: Credentials {
                token: Some("token".into()),
                app_id: Some("wx0123".into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_minimal_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_validate_missing_credentials() {
        let result = validate_config(&WeixinConfig::default());
        assert!(matches!(result, Err(ConfigError::MissingField { field }) if field == "app.token"));

        let mut config = valid();
        config.app.app_id = Some(String::new());
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::MissingField { field }) if field == "app.app_id"));
    }

    #[test]
    fn test_validate_aes_key_length() {
        let mut config = valid();
        config.app.encoding_aes_key = Some("short".into());
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));

        config.app.encoding_aes_key = Some("k".repeat(AES_KEY_LENGTH));
        assert!(validate_config(&config).is_ok());

        // empty means "not configured"
        config.app.encoding_aes_key = Some(String::new());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = valid();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("weixin.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
