//! CPU utilization sampled from a CloudWatch-style metric statistics API.

use crate::config::MetricsApiConfig;
use crate::core::{CpuUtilization, MetricSnapshot, MetricSource, SourceKind, TimeWindow};
use crate::sources::MetricError;
use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use tracing::debug;

const NAMESPACE: &str = "AWS/EC2";
const METRIC_NAME: &str = "CPUUtilization";

/// Queries average and maximum CPU utilization of one instance over the
/// cycle's time window. One statistics query per cycle, no retry.
pub struct CloudWatchCpuSource {
    client: reqwest::Client,
    endpoint: String,
    instance_id: String,
    period_seconds: u64,
}

impl CloudWatchCpuSource {
    pub fn new(api: &MetricsApiConfig, instance_id: String, period_seconds: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: api.url(),
            instance_id,
            period_seconds,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct StatisticsQuery<'a> {
    namespace: &'a str,
    metric_name: &'a str,
    start_time: String,
    end_time: String,
    period: u64,
    statistics: [&'a str; 2],
    dimensions: [Dimension<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Dimension<'a> {
    name: &'a str,
    value: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StatisticsResponse {
    #[serde(default)]
    datapoints: Vec<Datapoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Datapoint {
    average: f64,
    maximum: f64,
}

#[async_trait]
impl MetricSource for CloudWatchCpuSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Cpu
    }

    async fn sample(&self, window: &TimeWindow) -> Result<MetricSnapshot, MetricError> {
        let query = StatisticsQuery {
            namespace: NAMESPACE,
            metric_name: METRIC_NAME,
            start_time: window.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            end_time: window.end.to_rfc3339_opts(SecondsFormat::Secs, true),
            period: self.period_seconds,
            statistics: ["Maximum", "Average"],
            dimensions: [Dimension {
                name: "InstanceId",
                value: &self.instance_id,
            }],
        };

        debug!(
            instance_id = %self.instance_id,
            start = %query.start_time,
            end = %query.end_time,
            "querying CPU utilization statistics"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&query)
            .send()
            .await
            .map_err(|e| MetricError::Query(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetricError::Query(format!(
                "metrics API returned status {status}"
            )));
        }

        let body: StatisticsResponse = response
            .json()
            .await
            .map_err(|e| MetricError::MalformedResponse(e.to_string()))?;

        // The whole window is covered by a single period, so exactly one
        // datapoint is expected. Extras are ignored, absence is an error.
        let point = body.datapoints.first().ok_or(MetricError::NoData)?;

        Ok(MetricSnapshot::Cpu(CpuUtilization {
            average: point.average,
            maximum: point.maximum,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_window() -> TimeWindow {
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap();
        TimeWindow::lookback(end, Duration::minutes(60))
    }

    fn source_for(server: &MockServer) -> CloudWatchCpuSource {
        let api = MetricsApiConfig {
            region: "us-east-2".to_string(),
            endpoint: Some(format!("{}/statistics", server.uri())),
        };
        CloudWatchCpuSource::new(&api, "i-0123456789abcdef0".to_string(), 3600)
    }

    #[tokio::test]
    async fn parses_the_first_datapoint() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/statistics"))
            .and(body_partial_json(json!({
                "Namespace": "AWS/EC2",
                "MetricName": "CPUUtilization",
                "Period": 3600,
                "Dimensions": [{ "Name": "InstanceId", "Value": "i-0123456789abcdef0" }],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Datapoints": [
                    { "Average": 41.2, "Maximum": 88.5, "Unit": "Percent" }
                ]
            })))
            .mount(&server)
            .await;

        let snapshot = source_for(&server).sample(&test_window()).await.unwrap();

        assert_eq!(
            snapshot,
            MetricSnapshot::Cpu(CpuUtilization {
                average: 41.2,
                maximum: 88.5,
            })
        );
    }

    #[tokio::test]
    async fn empty_datapoints_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/statistics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Datapoints": [] })))
            .mount(&server)
            .await;

        let result = source_for(&server).sample(&test_window()).await;
        assert!(matches!(result, Err(MetricError::NoData)));
    }

    #[tokio::test]
    async fn server_error_is_a_query_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/statistics"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = source_for(&server).sample(&test_window()).await;
        assert!(matches!(result, Err(MetricError::Query(_))));
    }

    #[tokio::test]
    async fn malformed_body_is_reported_as_such() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/statistics"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = source_for(&server).sample(&test_window()).await;
        assert!(matches!(result, Err(MetricError::MalformedResponse(_))));
    }
}
