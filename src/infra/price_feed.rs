//! Chart data source backed by the gateway.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::chart::{Coordinate, Period, PointInformation, point_information};
use crate::domain::presenter::{ChartDataError, ChartDataSource};
use crate::infra::gateway::Gateway;

/// Fetches price coordinates and retains the last loaded series so the
/// point-inspection header can be computed without another request.
pub struct PriceFeed {
    gateway: Gateway,
    currency: String,
    coordinates: Mutex<Vec<Coordinate>>,
}

impl PriceFeed {
    pub fn new(gateway: Gateway, currency: impl Into<String>) -> Self {
        Self {
            gateway,
            currency: currency.into(),
            coordinates: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChartDataSource for PriceFeed {
    async fn series(&self, period: Period) -> Result<Vec<Coordinate>, ChartDataError> {
        let coordinates = self.gateway.chart(period, &self.currency).await?;
        *self.coordinates.lock().expect("coordinates lock") = coordinates.clone();
        Ok(coordinates)
    }

    fn coordinates(&self) -> Vec<Coordinate> {
        self.coordinates.lock().expect("coordinates lock").clone()
    }

    fn point_info(&self, index: usize, period: Period) -> Option<PointInformation> {
        point_information(&self.coordinates(), index, period, &self.currency)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn series_retains_coordinates_for_point_info() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/rates/chart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "points": [[1_700_000_000.0, 2.0], [1_700_000_060.0, 2.5]]
            })))
            .mount(&server)
            .await;

        let feed = PriceFeed::new(Gateway::new(server.uri()).expect("client"), "USD");
        assert!(feed.coordinates().is_empty());

        let series = feed.series(Period::Week).await.expect("series");
        assert_eq!(series.len(), 2);
        assert_eq!(feed.coordinates().len(), 2);

        let info = feed.point_info(1, Period::Week).expect("in range");
        assert_eq!(info.amount, "2.50 USD");
        assert_eq!(info.diff.percent, "+25.00%");
    }

    #[tokio::test]
    async fn gateway_failure_is_classified() {
        let feed = PriceFeed::new(Gateway::new("http://127.0.0.1:9").expect("client"), "USD");
        let error = feed.series(Period::Week).await.expect_err("error");
        assert!(matches!(error, ChartDataError::Offline(_)));
    }
}
