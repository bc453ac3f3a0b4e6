/// Weather client errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Chart decode error: {0}")]
    ChartDecode(#[from] base64::DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = WeatherError::Parse("expected value".into());
        assert_eq!(err.to_string(), "Parse error: expected value");
    }
}
