// Session lifecycle
//
// Region resolution, password / one-time-code login, explicit refresh,
// and the validity check every authenticated call runs first. An expired
// session is always replaced by a full re-login; `refresh_session` is
// only ever called on request.

use chrono::Utc;
use reqwest::Method;
use secrecy::ExposeSecret;
use tracing::{debug, info, warn};

use crate::auth::{Session, password_digest};
use crate::client::{ApiClient, RegionBinding};
use crate::error::Error;
use crate::models::{LoginResult, Params, RegionList};

impl ApiClient {
    /// Find the gateway for the configured region.
    ///
    /// The domestic code binds the compiled-in gateway without a network
    /// call. Anything else is matched case-insensitively against the name
    /// and id of each directory entry.
    pub async fn resolve_region(&self) -> Result<RegionBinding, Error> {
        let wanted = &self.credentials().region;

        if self.credentials().is_domestic() {
            debug!(region = %wanted, "binding domestic gateway");
            return Ok(RegionBinding::new(
                wanted.to_uppercase(),
                self.endpoints().domestic_gateway.clone(),
            ));
        }

        let url = self.endpoints().passport.join("v1/regionservers")?;
        let directory: RegionList = self
            .send(Method::GET, url, &Params::new(), None)
            .await?;
        debug!(entries = directory.list.len(), "region directory fetched");

        let server = directory
            .list
            .into_iter()
            .find(|s| s.name.eq_ignore_ascii_case(wanted) || s.id.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::RegionNotFound {
                region: wanted.clone(),
            })?;

        let gateway = url::Url::parse(&server.gateway)?;
        debug!(region = %server.id, gateway = %gateway, "region resolved");
        Ok(RegionBinding::new(server.id, gateway))
    }

    /// Log in with the configured password, or with a one-time code
    /// previously requested through [`request_login_code`](Self::request_login_code).
    ///
    /// Any existing session is discarded before the attempt.
    pub async fn login(&self, one_time_code: Option<&str>) -> Result<(), Error> {
        let _guard = self.login_lock.lock().await;
        self.login_locked(one_time_code).await
    }

    /// Login body shared by `login` and the automatic re-login path.
    /// Caller must hold `login_lock`.
    async fn login_locked(&self, one_time_code: Option<&str>) -> Result<(), Error> {
        *self.session.write().await = None;

        let binding = self.resolve_region().await?;
        *self.region.write().await = Some(binding.clone());

        let creds = self.credentials();
        let client_json = serde_json::to_string(self.client_info()).map_err(|e| {
            Error::Deserialization {
                message: e.to_string(),
                body: String::new(),
            }
        })?;

        let mut form = Params::new();
        form.insert("client".into(), client_json);
        form.insert("encrypt".into(), "1".into());
        form.insert("oldVersion".into(), self.api_version().to_owned());
        form.insert("region".into(), binding.id.clone());
        form.insert("username".into(), creds.username.clone());
        match one_time_code {
            Some(code) => form.insert("validCode".into(), code.to_owned()),
            None => form.insert(
                "password".into(),
                password_digest(creds.password.expose_secret()),
            ),
        };

        debug!(username = %creds.username, region = %binding.id, "logging in");
        let url = binding.gateway.join("user/login")?;
        let result: LoginResult = match self.send(Method::POST, url, &form, None).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "login failed");
                return Err(e);
            }
        };

        let session = Session::from_wire(result.session, Utc::now());
        info!(
            user_id = %session.user_id,
            expires_in = session.expires_in,
            "login successful"
        );
        *self.session.write().await = Some(session);
        Ok(())
    }

    /// Ask the vendor to send a one-time login code to the account.
    pub async fn request_login_code(&self) -> Result<(), Error> {
        let binding = self.resolve_region().await?;
        let url = binding.gateway.join("user/sendcodeforquicklogin")?;

        let mut params = Params::new();
        params.insert("username".into(), self.credentials().username.clone());
        params.insert("regionId".into(), binding.id.clone());

        *self.region.write().await = Some(binding);
        let _: serde_json::Value = self.send(Method::GET, url, &params, None).await?;
        debug!("login code requested");
        Ok(())
    }

    /// Exchange the current session for a fresh one.
    ///
    /// Never called automatically; an expired session goes through a full
    /// re-login instead.
    pub async fn refresh_session(&self) -> Result<(), Error> {
        let _guard = self.login_lock.lock().await;
        let url = self.api_url("user/refreshsession").await?;
        let headers = self.session_headers().await?;

        let result: LoginResult = self
            .send(Method::POST, url, &Params::new(), Some(headers))
            .await?;
        let session = Session::from_wire(result.session, Utc::now());
        debug!(expires_in = session.expires_in, "session refreshed");
        *self.session.write().await = Some(session);
        Ok(())
    }

    /// Discard the session. The region binding is kept.
    pub async fn logout(&self) {
        *self.session.write().await = None;
        debug!("session discarded");
    }

    /// A session exists and has not passed its TTL.
    pub async fn is_logged_in(&self) -> bool {
        self.session
            .read()
            .await
            .as_ref()
            .is_some_and(|s| !s.is_expired())
    }

    /// Snapshot of the current session, if any.
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Log in if there is no session or it has passed its TTL.
    pub async fn ensure_valid_session(&self) -> Result<(), Error> {
        if self.is_logged_in().await {
            return Ok(());
        }
        let _guard = self.login_lock.lock().await;
        // Another caller may have logged in while we waited.
        if self.is_logged_in().await {
            return Ok(());
        }
        debug!("session missing or expired, logging in");
        self.login_locked(None).await
    }
}
