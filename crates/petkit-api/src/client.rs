// Vendor API HTTP client
//
// Wraps the shared `Transport` with region-aware URL construction, session
// header injection, and envelope unwrapping. Endpoint groups (session,
// account, devices) are implemented as inherent methods in separate files
// to keep this module focused on request mechanics.

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use url::Url;

use crate::auth::{ClientInfo, Credentials, Endpoints, Session, normalize_base};
use crate::error::Error;
use crate::models::{Envelope, Params};
use crate::transport::{SESSION_HEADERS, Transport, TransportConfig, redact_token};

/// The data-center an account is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionBinding {
    /// Region id as reported by the directory (or the domestic code).
    pub id: String,
    /// Base URL every request for this account is joined onto.
    pub gateway: Url,
}

impl RegionBinding {
    pub fn new(id: impl Into<String>, gateway: Url) -> Self {
        Self {
            id: id.into(),
            gateway: normalize_base(gateway),
        }
    }
}

/// Raw HTTP client for the vendor's mobile-app API.
///
/// Handles the `{ result, error }` envelope, region-bound URL
/// construction, and session lifecycle. Every authenticated call first
/// passes through [`ensure_valid_session`](Self::ensure_valid_session).
pub struct ApiClient {
    transport: Transport,
    credentials: Credentials,
    endpoints: Endpoints,
    client_info: ClientInfo,
    api_version: String,
    pub(crate) region: RwLock<Option<RegionBinding>>,
    pub(crate) session: RwLock<Option<Session>>,
    /// Serializes logins so concurrent callers with a stale session
    /// trigger exactly one re-login.
    pub(crate) login_lock: Mutex<()>,
}

impl ApiClient {
    /// Create a client from credentials and a `TransportConfig`.
    ///
    /// A timezone on the credentials overrides `config.timezone_id`.
    pub fn new(
        credentials: Credentials,
        endpoints: Endpoints,
        mut config: TransportConfig,
    ) -> Result<Self, Error> {
        if let Some(tz) = &credentials.timezone {
            config.timezone_id.clone_from(tz);
        }
        let transport = Transport::new(&config)?;
        Ok(Self::with_transport(credentials, endpoints, &config, transport))
    }

    /// Create a client around a pre-built `Transport`.
    pub fn with_transport(
        credentials: Credentials,
        endpoints: Endpoints,
        config: &TransportConfig,
        transport: Transport,
    ) -> Self {
        let client_info = ClientInfo::new(
            &config.locale,
            &config.timezone,
            &config.timezone_id,
            &config.api_version,
        );
        Self {
            transport,
            credentials,
            endpoints,
            client_info,
            api_version: config.api_version.clone(),
            region: RwLock::new(None),
            session: RwLock::new(None),
            login_lock: Mutex::new(()),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub(crate) fn client_info(&self) -> &ClientInfo {
        &self.client_info
    }

    pub(crate) fn api_version(&self) -> &str {
        &self.api_version
    }

    /// The currently bound region, if any login has resolved one.
    pub async fn region(&self) -> Option<RegionBinding> {
        self.region.read().await.clone()
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join a relative API path onto the bound gateway.
    pub(crate) async fn api_url(&self, path: &str) -> Result<Url, Error> {
        let guard = self.region.read().await;
        let binding = guard.as_ref().ok_or(Error::NotLoggedIn)?;
        Ok(binding.gateway.join(path.trim_start_matches('/'))?)
    }

    // ── Session headers ──────────────────────────────────────────────

    /// Both session headers carrying the current token.
    pub(crate) async fn session_headers(&self) -> Result<HeaderMap, Error> {
        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(Error::NotLoggedIn)?;
        let token = session.id.expose_secret();

        let mut value = HeaderValue::from_str(token).map_err(|_| Error::InvalidHeader {
            name: SESSION_HEADERS[0],
        })?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        for name in SESSION_HEADERS {
            let header =
                HeaderName::from_bytes(name.as_bytes()).map_err(|_| Error::InvalidHeader { name })?;
            headers.insert(header, value.clone());
        }
        debug!(session = %redact_token(token), "attaching session headers");
        Ok(headers)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Authenticated GET with query parameters.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &Params,
    ) -> Result<T, Error> {
        self.authenticated(Method::GET, path, params).await
    }

    /// Authenticated POST with a form-encoded body.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &Params,
    ) -> Result<T, Error> {
        self.authenticated(Method::POST, path, params).await
    }

    /// Generic authenticated call returning the raw `result` payload.
    pub async fn request_value(
        &self,
        method: Method,
        path: &str,
        params: &Params,
    ) -> Result<serde_json::Value, Error> {
        self.authenticated(method, path, params).await
    }

    async fn authenticated<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &Params,
    ) -> Result<T, Error> {
        self.ensure_valid_session().await?;
        let url = self.api_url(path).await?;
        let headers = self.session_headers().await?;
        self.send(method, url, params, Some(headers)).await
    }

    /// Unauthenticated call against an absolute URL (login, directory).
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        params: &Params,
        headers: Option<HeaderMap>,
    ) -> Result<T, Error> {
        let mut builder = self.transport.http().request(method.clone(), url);
        builder = if method == Method::GET {
            builder.query(params)
        } else {
            builder.form(params)
        };
        if let Some(headers) = headers {
            builder = builder.headers(headers);
        }
        let request = builder.build()?;
        let resp = self.transport.execute(request).await?;
        parse_envelope(resp).await
    }
}

/// Unwrap `{ result, error }`, mapping a vendor error code to a typed error.
pub(crate) async fn parse_envelope<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, Error> {
    let body = resp.text().await?;

    let envelope: Envelope = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: body.clone(),
    })?;

    if let Some(err) = envelope.error {
        debug!(code = err.code, msg = ?err.msg, "vendor error");
        return Err(Error::from_vendor(err.code, err.msg.unwrap_or_default()));
    }

    let result = envelope.result.unwrap_or(serde_json::Value::Null);
    serde_json::from_value(result).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}
