use trendcast_core::{AppError, ConfigError, NetworkError, ReqwestErrorExt, WeatherError};
use trendcast_weather::WeatherError as ClientError;

/// Lift weather client errors into the application taxonomy.
pub trait ClientErrorExt {
    fn into_app_error(self) -> AppError;
}

impl ClientErrorExt for ClientError {
    fn into_app_error(self) -> AppError {
        match self {
            ClientError::Network(e) => AppError::Network(e.into_network_error()),
            ClientError::Parse(s) => AppError::Network(NetworkError::InvalidResponse(s)),
            ClientError::InvalidBaseUrl(s) => AppError::Config(ConfigError::Invalid(s)),
            ClientError::ChartDecode(e) => {
                AppError::Weather(WeatherError::InvalidPayload(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_maps_to_invalid_response() {
        let err = ClientError::Parse("eof".into()).into_app_error();
        assert!(matches!(
            err,
            AppError::Network(NetworkError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_bad_base_url_maps_to_config() {
        let err = ClientError::InvalidBaseUrl("nope".into()).into_app_error();
        assert!(matches!(err, AppError::Config(ConfigError::Invalid(_))));
    }
}
