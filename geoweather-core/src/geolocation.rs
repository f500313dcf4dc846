use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::debug;

use crate::{Coordinates, error::LocationError};

const PUBLIC_IP_URL: &str = "https://ifconfig.me/ip";
const IP_INFO_URL: &str = "https://ipinfo.io";

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    /// Resolve the current machine's approximate coordinates.
    async fn locate(&self) -> Result<Coordinates, LocationError>;
}

/// Locates the caller by public IP: ifconfig.me for the address, ipinfo.io
/// for the coordinates.
#[derive(Debug, Clone)]
pub struct IpInfoGeolocator {
    ip_url: String,
    info_url: String,
    round_coordinates: bool,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpInfo {
    loc: String,
    #[serde(default)]
    city: Option<String>,
}

impl IpInfoGeolocator {
    pub fn new(round_coordinates: bool) -> Self {
        Self::with_endpoints(PUBLIC_IP_URL.to_string(), IP_INFO_URL.to_string(), round_coordinates)
    }

    pub fn with_endpoints(ip_url: String, info_url: String, round_coordinates: bool) -> Self {
        Self {
            ip_url,
            info_url,
            round_coordinates,
            http: Client::new(),
        }
    }

    async fn public_ip(&self) -> Result<String, LocationError> {
        let res = self
            .http
            .get(&self.ip_url)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| LocationError::PublicIp(e.to_string()))?;

        let ip = res
            .text()
            .await
            .map_err(|e| LocationError::PublicIp(e.to_string()))?
            .trim()
            .to_string();

        if ip.is_empty() {
            return Err(LocationError::PublicIp("empty response".to_string()));
        }

        Ok(ip)
    }

    async fn ip_info(&self, ip: &str) -> Result<IpInfo, LocationError> {
        let url = format!("{}/{ip}", self.info_url.trim_end_matches('/'));
        let failed = |e: reqwest::Error| LocationError::LocationInfo {
            ip: ip.to_string(),
            reason: e.to_string(),
        };

        self.http
            .get(&url)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(failed)?
            .json::<IpInfo>()
            .await
            .map_err(failed)
    }
}

#[async_trait]
impl Geolocator for IpInfoGeolocator {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        let ip = self.public_ip().await?;
        let info = self.ip_info(&ip).await?;
        debug!(%ip, loc = %info.loc, city = ?info.city, "resolved location");

        Coordinates::parse_loc(&info.loc, self.round_coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server_with_info(info: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.7\n"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/info/203.0.113.7"))
            .respond_with(info)
            .mount(&server)
            .await;
        server
    }

    fn geolocator(server: &MockServer, round: bool) -> IpInfoGeolocator {
        IpInfoGeolocator::with_endpoints(
            format!("{}/ip", server.uri()),
            format!("{}/info", server.uri()),
            round,
        )
    }

    #[tokio::test]
    async fn locate_resolves_coordinates() {
        let server = server_with_info(ResponseTemplate::new(200).set_body_string(
            r#"{"ip": "203.0.113.7", "city": "Yerevan", "loc": "40.1811,44.5136"}"#,
        ))
        .await;

        let coords = geolocator(&server, false).locate().await.unwrap();
        assert_eq!(coords.latitude(), 40.1811);
        assert_eq!(coords.longitude(), 44.5136);

        let rounded = geolocator(&server, true).locate().await.unwrap();
        assert_eq!((rounded.latitude(), rounded.longitude()), (40.2, 44.5));
    }

    #[tokio::test]
    async fn missing_loc_is_location_error() {
        let server =
            server_with_info(ResponseTemplate::new(200).set_body_string(r#"{"ip": "203.0.113.7"}"#))
                .await;

        let err = geolocator(&server, false).locate().await.unwrap_err();
        assert!(matches!(err, LocationError::LocationInfo { ip, .. } if ip == "203.0.113.7"));
    }

    #[tokio::test]
    async fn malformed_loc_is_location_error() {
        let server = server_with_info(
            ResponseTemplate::new(200).set_body_string(r#"{"loc": "somewhere"}"#),
        )
        .await;

        let err = geolocator(&server, false).locate().await.unwrap_err();
        assert!(matches!(err, LocationError::MalformedLocation(_)));
    }

    #[tokio::test]
    async fn unreachable_ip_service_is_location_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = geolocator(&server, false).locate().await.unwrap_err();
        assert!(matches!(err, LocationError::PublicIp(_)));
    }
}
