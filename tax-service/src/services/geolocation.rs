//! Region detection from the client's IP address.

use std::net::IpAddr;

/// Country and first-level subdivision an IP address resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub country_code: String,
    pub region_code: String,
}

/// GeoIP database lookup owned by the host.
pub trait GeoLocator: Send + Sync {
    /// `None` when the address is unknown or has no subdivision data.
    fn locate(&self, ip: IpAddr) -> Option<Location>;
}

/// Region for a request whose country is already known.
///
/// The located region is only trusted when the located country agrees with
/// the request country; otherwise the region does not belong to it.
pub fn detect_region(
    client_ip: Option<IpAddr>,
    request_country: Option<&str>,
    locator: &dyn GeoLocator,
) -> Option<String> {
    let ip = client_ip?;
    let country = request_country?;
    let location = locator.locate(ip)?;

    if location.country_code.eq_ignore_ascii_case(country) {
        Some(location.region_code)
    } else {
        tracing::debug!(
            ip = %ip,
            request_country = country,
            located_country = %location.country_code,
            "Located country differs from request country, ignoring region"
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLocator(Option<Location>);

    impl GeoLocator for FixedLocator {
        fn locate(&self, _ip: IpAddr) -> Option<Location> {
            self.0.clone()
        }
    }

    fn california() -> FixedLocator {
        FixedLocator(Some(Location {
            country_code: "US".to_string(),
            region_code: "CA".to_string(),
        }))
    }

    #[test]
    fn test_region_detected_when_countries_agree() {
        let ip = "203.0.113.7".parse().ok();
        assert_eq!(
            detect_region(ip, Some("US"), &california()),
            Some("CA".to_string())
        );
    }

    #[test]
    fn test_region_dropped_when_countries_differ() {
        let ip = "203.0.113.7".parse().ok();
        assert_eq!(detect_region(ip, Some("CA"), &california()), None);
    }

    #[test]
    fn test_no_region_without_ip_country_or_location() {
        let ip = "203.0.113.7".parse().ok();
        assert_eq!(detect_region(None, Some("US"), &california()), None);
        assert_eq!(detect_region(ip, None, &california()), None);
        assert_eq!(detect_region(ip, Some("US"), &FixedLocator(None)), None);
    }
}
