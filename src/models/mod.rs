/*
 * Models module aggregator organizing all data structures for the federated content search service.
 * I'm providing a clean interface to provider, content, and search entities with comprehensive serialization support.
 */

pub mod content;
pub mod provider;
pub mod search;

pub use content::{
    Content, ContentKind, ContentTag, ContentWithScore, NormalizedRecord, NormalizedStats, Score,
    Statistics, Tag,
};
pub use provider::Provider;
pub use search::{
    Pagination, SearchParams, SearchResponse, SearchResultItem, SearchResultScore,
    SearchResultStats, SortMode, ValidatedSearchParams,
};

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Standard API response wrapper for consistent response formatting
/// I'm implementing consistent API response structure across all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub metadata: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
    pub request_duration_ms: Option<u128>,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            metadata: None,
            timestamp: Utc::now(),
            request_duration_ms: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.request_duration_ms = Some(duration_ms);
        self
    }
}

/// Health check response structure for system monitoring
/// I'm providing standardized health check information across all services
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime_seconds: u64,
    pub services: std::collections::HashMap<String, ServiceHealth>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: HealthStatus,
    pub response_time_ms: Option<u64>,
    pub last_check: DateTime<Utc>,
    pub error_message: Option<String>,
}

/// Model validation trait for consistent data validation
pub trait Validate {
    type Error;

    fn validate(&self) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_builder() {
        let response = ApiResponse::new(42).with_duration(5);
        assert_eq!(response.data, 42);
        assert_eq!(response.request_duration_ms, Some(5));
    }
}
