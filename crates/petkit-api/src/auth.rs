use chrono::{DateTime, Local, Utc};
use md5::{Digest, Md5};
use secrecy::SecretString;
use serde::Serialize;
use url::Url;

use crate::error::Error;
use crate::models::WireSession;

/// Region code served by the compiled-in domestic gateway.
pub const DOMESTIC_REGION: &str = "CN";
/// Base URL for the domestic data-center.
pub const DOMESTIC_GATEWAY: &str = "http://api.petkit.cn/6/";
/// Passport host serving the region directory.
pub const PASSPORT_URL: &str = "https://passport.petkt.com/";

/// Account credentials for password login.
///
/// The password is only ever sent as an MD5 hex digest.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    /// Region name or id as shown in the mobile app (`"US"`, `"DE"`, `"CN"`).
    pub region: String,
    /// IANA zone name. `None` reports `UTC`.
    pub timezone: Option<String>,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<SecretString>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            region: region.into(),
            timezone: None,
        }
    }

    /// Whether the region is served by the fixed domestic gateway.
    pub fn is_domestic(&self) -> bool {
        self.region.eq_ignore_ascii_case(DOMESTIC_REGION)
    }
}

/// Where the client looks for its regional base URL.
///
/// Both are configurable so tests can point them at a mock server.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Passport host; the directory lives at `v1/regionservers` under it.
    pub passport: Url,
    /// Gateway bound for the domestic region without a directory lookup.
    pub domestic_gateway: Url,
}

impl Endpoints {
    /// The vendor's public passport host and domestic gateway.
    pub fn production() -> Result<Self, Error> {
        Self::new(PASSPORT_URL, DOMESTIC_GATEWAY)
    }

    pub fn new(passport: &str, domestic_gateway: &str) -> Result<Self, Error> {
        Ok(Self {
            passport: normalize_base(Url::parse(passport)?),
            domestic_gateway: normalize_base(Url::parse(domestic_gateway)?),
        })
    }
}

/// Ensure a base URL ends with `/` so relative joins append instead of replace.
pub(crate) fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// The authenticated session issued by `user/login`.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SecretString,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    /// Declared time-to-live in seconds.
    pub expires_in: i64,
    pub region: Option<String>,
}

impl Session {
    /// Build from the wire shape. `createdAt` falls back to `now`.
    pub(crate) fn from_wire(wire: WireSession, now: DateTime<Utc>) -> Self {
        let created_at = wire
            .created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map_or(now, |dt| dt.with_timezone(&Utc));
        Self {
            id: SecretString::from(wire.id),
            user_id: wire.user_id,
            created_at,
            expires_in: wire.expires_in,
            region: wire.region,
        }
    }

    /// Whether the session is past its TTL at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        (now - self.created_at).num_seconds() >= self.expires_in
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Hex-encoded MD5 of the password, as the login form expects.
pub fn password_digest(password: &str) -> String {
    hex::encode(Md5::digest(password.as_bytes()))
}

/// Local UTC offset in hours, formatted the way the app sends it (`"-5.0"`).
pub fn utc_offset_hours() -> String {
    let seconds = Local::now().offset().local_minus_utc();
    format!("{:.1}", f64::from(seconds) / 3600.0)
}

/// Client fingerprint serialized into the `client` login field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub locale: String,
    pub name: String,
    pub os_version: String,
    pub platform: String,
    pub source: String,
    pub timezone: String,
    pub timezone_id: String,
    pub version: String,
}

impl ClientInfo {
    pub fn new(locale: &str, timezone: &str, timezone_id: &str, version: &str) -> Self {
        Self {
            locale: locale.to_owned(),
            name: "Pixel 8".into(),
            os_version: "14".into(),
            platform: "android".into(),
            source: "app.petkit-android".into(),
            timezone: timezone.to_owned(),
            timezone_id: timezone_id.to_owned(),
            version: version.to_owned(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(created_at: DateTime<Utc>, ttl: i64) -> Session {
        Session {
            id: SecretString::from("token"),
            user_id: "1".into(),
            created_at,
            expires_in: ttl,
            region: None,
        }
    }

    #[test]
    fn digest_matches_known_md5() {
        assert_eq!(
            password_digest("password"),
            "5f4dcc3b5aa765d61d8327deb882cf99"
        );
    }

    #[test]
    fn session_expires_exactly_at_ttl() {
        let created = Utc::now();
        let s = session(created, 3600);
        assert!(!s.is_expired_at(created + Duration::seconds(3599)));
        assert!(s.is_expired_at(created + Duration::seconds(3600)));
    }

    #[test]
    fn zero_ttl_is_always_expired() {
        let created = Utc::now();
        assert!(session(created, 0).is_expired_at(created));
    }

    #[test]
    fn created_at_falls_back_to_now() {
        let now = Utc::now();
        let wire = WireSession {
            id: "abc".into(),
            user_id: "7".into(),
            expires_in: 60,
            created_at: Some("not a date".into()),
            region: None,
        };
        assert_eq!(Session::from_wire(wire, now).created_at, now);
    }

    #[test]
    fn created_at_parses_rfc3339() {
        let wire = WireSession {
            id: "abc".into(),
            user_id: "7".into(),
            expires_in: 60,
            created_at: Some("2024-03-01T10:00:00Z".into()),
            region: Some("US".into()),
        };
        let s = Session::from_wire(wire, Utc::now());
        assert_eq!(s.created_at.to_rfc3339(), "2024-03-01T10:00:00+00:00");
    }

    #[test]
    fn domestic_region_is_case_insensitive() {
        assert!(Credentials::new("u", "p", "cn").is_domestic());
        assert!(!Credentials::new("u", "p", "US").is_domestic());
    }

    #[test]
    fn endpoints_gain_trailing_slash() {
        let ep = Endpoints::new("http://localhost:1234", "http://localhost:1234/6").unwrap();
        assert_eq!(ep.passport.as_str(), "http://localhost:1234/");
        assert_eq!(ep.domestic_gateway.as_str(), "http://localhost:1234/6/");
    }

    #[test]
    fn production_endpoints_parse() {
        let ep = Endpoints::production().unwrap();
        assert_eq!(ep.passport.as_str(), PASSPORT_URL);
        assert_eq!(ep.domestic_gateway.as_str(), DOMESTIC_GATEWAY);
    }

    #[test]
    fn client_info_is_camel_case() {
        let info = ClientInfo::new("en-US", "1.0", "Europe/Berlin", "12.4.1");
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["timezoneId"], "Europe/Berlin");
        assert_eq!(json["osVersion"], "14");
    }
}
