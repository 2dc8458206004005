//! HTTP access to the Pushgateway

use crate::config::with_trailing_slash;
use crate::error::{ClientError, RequestFailure};
use crate::models::DeleteTarget;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Thin reqwest wrapper for the two Pushgateway calls the pruner makes
#[derive(Clone)]
pub struct PushgatewayClient {
    http: reqwest::Client,
    base_url: Url,
    metrics_url: Url,
}

impl PushgatewayClient {
    /// Create a client for `base_url`. Every request is bounded by `timeout`.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ClientError> {
        if base_url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }
        let base_url = with_trailing_slash(base_url);
        let metrics_url = base_url.join("metrics")?;

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            metrics_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn metrics_url(&self) -> &Url {
        &self.metrics_url
    }

    /// `{base}/metrics/job/{job}/{label}/{value}`, each segment percent-encoded
    pub fn delete_url(&self, target: &DeleteTarget) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "metrics",
                "job",
                target.job.as_str(),
                target.label.as_str(),
                target.value.as_str(),
            ]);
        }
        url
    }

    /// GET the exposition text. Anything other than 200 is a failure.
    pub async fn fetch_metrics(&self) -> Result<String, RequestFailure> {
        debug!(url = %self.metrics_url, "Trying to get metrics from pushgateway...");

        let response = self.http.get(self.metrics_url.clone()).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            debug!(status = status.as_u16(), "GET /metrics not status 200");
            return Err(RequestFailure::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }

    /// DELETE one grouping. Statuses of 300 and above are failures.
    pub async fn delete_grouping(
        &self,
        target: &DeleteTarget,
    ) -> Result<StatusCode, RequestFailure> {
        let url = self.delete_url(target);
        debug!(url = %url, "Delete URL");

        let response = self.http.delete(url).send().await?;
        let status = response.status();
        if status.as_u16() >= 300 {
            return Err(RequestFailure::Status(status.as_u16()));
        }
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::DELETE, Method::GET, MockServer};

    fn target(job: &str, label: &str, value: &str) -> DeleteTarget {
        DeleteTarget {
            job: job.to_string(),
            label: label.to_string(),
            value: value.to_string(),
        }
    }

    fn client(base: &str) -> PushgatewayClient {
        PushgatewayClient::new(Url::parse(base).unwrap(), Duration::from_millis(2000)).unwrap()
    }

    #[test]
    fn test_urls_from_base_without_slash() {
        let client = client("http://gw:9091");

        assert_eq!(client.metrics_url().as_str(), "http://gw:9091/metrics");
        assert_eq!(
            client.delete_url(&target("batch", "instance", "host1")).as_str(),
            "http://gw:9091/metrics/job/batch/instance/host1"
        );
    }

    #[test]
    fn test_urls_keep_path_prefix() {
        let client = client("http://gw:9091/pushgateway/");

        assert_eq!(client.metrics_url().as_str(), "http://gw:9091/pushgateway/metrics");
        assert_eq!(
            client.delete_url(&target("batch", "instance", "host1")).as_str(),
            "http://gw:9091/pushgateway/metrics/job/batch/instance/host1"
        );
    }

    #[test]
    fn test_delete_url_encodes_segments() {
        let client = client("http://gw:9091/");
        let url = client.delete_url(&target("nightly job", "instance", "10.0.0.1:80/x"));

        assert_eq!(
            url.as_str(),
            "http://gw:9091/metrics/job/nightly%20job/instance/10.0.0.1:80%2Fx"
        );
    }

    #[tokio::test]
    async fn test_fetch_metrics_ok() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/metrics");
                then.status(200).body("push_time_seconds{job=\"a\",instance=\"b\"} 1");
            })
            .await;

        let body = client(&server.base_url()).fetch_metrics().await.unwrap();

        mock.assert_async().await;
        assert!(body.starts_with("push_time_seconds"));
    }

    #[test]
    fn test_new_rejects_non_base_url() {
        let err = PushgatewayClient::new(
            Url::parse("mailto:ops@example.com").unwrap(),
            Duration::from_millis(2000),
        )
        .err()
        .unwrap();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_fetch_metrics_follows_redirect() {
        let server = MockServer::start_async().await;
        let redirect = server
            .mock_async(|when, then| {
                when.method(GET).path("/metrics");
                then.status(302).header("Location", "/real/metrics");
            })
            .await;
        let real = server
            .mock_async(|when, then| {
                when.method(GET).path("/real/metrics");
                then.status(200).body("push_time_seconds{job=\"a\",instance=\"b\"} 1");
            })
            .await;

        let body = client(&server.base_url()).fetch_metrics().await.unwrap();

        redirect.assert_async().await;
        real.assert_async().await;
        assert!(body.starts_with("push_time_seconds"));
    }

    #[tokio::test]
    async fn test_fetch_metrics_non_200() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/metrics");
                then.status(204);
            })
            .await;

        let err = client(&server.base_url()).fetch_metrics().await.unwrap_err();
        assert_eq!(err, RequestFailure::Status(204));
    }

    #[tokio::test]
    async fn test_fetch_metrics_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/metrics");
                then.status(200).delay(Duration::from_millis(500));
            })
            .await;

        let client = PushgatewayClient::new(
            Url::parse(&server.base_url()).unwrap(),
            Duration::from_millis(50),
        )
        .unwrap();

        let err = client.fetch_metrics().await.unwrap_err();
        assert!(matches!(err, RequestFailure::Transport(_)));
    }

    #[tokio::test]
    async fn test_delete_grouping_status() {
        let server = MockServer::start_async().await;
        let accepted = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/metrics/job/batch/instance/host1");
                then.status(202);
            })
            .await;
        let missing = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/metrics/job/batch/instance/host2");
                then.status(404);
            })
            .await;

        let client = client(&server.base_url());
        let status = client
            .delete_grouping(&target("batch", "instance", "host1"))
            .await
            .unwrap();
        let err = client
            .delete_grouping(&target("batch", "instance", "host2"))
            .await
            .unwrap_err();

        accepted.assert_async().await;
        missing.assert_async().await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(err, RequestFailure::Status(404));
    }
}
