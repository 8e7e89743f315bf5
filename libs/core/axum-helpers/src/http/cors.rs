use axum::http::{HeaderValue, Method, header};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// Creates a CORS layer restricted to the given origins.
///
/// - Common HTTP methods (GET, POST, PUT, DELETE, PATCH, OPTIONS)
/// - Common headers (Content-Type, Authorization, Accept)
/// - 1 hour max age
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Creates a permissive CORS layer (any origin, method and header).
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Builds the CORS layer from `CORS_ALLOWED_ORIGIN`.
///
/// The variable holds comma-separated origins, e.g.
/// `http://localhost:3000,https://app.example.com`. When it is unset or
/// blank every origin is allowed.
pub fn cors_layer_from_env() -> io::Result<CorsLayer> {
    let Some(origins) = core_config::env_optional("CORS_ALLOWED_ORIGIN") else {
        warn!("CORS_ALLOWED_ORIGIN not set, allowing any origin");
        return Ok(create_permissive_cors_layer());
    };

    let allowed_origins = parse_origins(&origins)?;
    info!("CORS configured with allowed origins: {}", origins);

    Ok(create_cors_layer(allowed_origins))
}

fn parse_origins(origins: &str) -> io::Result<Vec<HeaderValue>> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {}", e),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        let origins = parse_origins("http://localhost:3000, https://app.example.com,").unwrap();
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[1], "https://app.example.com");
    }

    #[test]
    fn test_parse_origins_rejects_invalid_header() {
        assert!(parse_origins("http://bad\norigin").is_err());
    }

    #[test]
    fn test_layer_from_env() {
        temp_env::with_var_unset("CORS_ALLOWED_ORIGIN", || {
            assert!(cors_layer_from_env().is_ok());
        });
        temp_env::with_var("CORS_ALLOWED_ORIGIN", Some("http://localhost:5173"), || {
            assert!(cors_layer_from_env().is_ok());
        });
    }
}
