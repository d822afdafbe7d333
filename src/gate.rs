//! The access gate: who is calling, may they proceed, and where do they go
//! when they may not.
//!
//! One gate serves two client populations. Browsers (HTML format) are
//! redirected to the login form and carried back afterwards through session
//! state. Machine clients (any other format) get a `401` Basic challenge and
//! are expected to retry with credentials. The split is made on the
//! negotiated [`ResponseFormat`] alone.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::basic_auth::{self, BasicCredentials};
use crate::credentials::{CredentialError, CredentialStore};
use crate::error::GateError;
use crate::flash::FlashMessage;
use crate::format::ResponseFormat;
use crate::locale::TranslationCatalog;
use crate::principal::Principal;
use crate::session_state::GateSession;

pub const LOGIN_NOTICE: &str = "Please log in";
pub const ADMIN_DENIED: &str = "You must be admin to do that";

#[derive(Debug, Clone)]
pub struct GateSettings {
    /// Realm named in the `WWW-Authenticate` challenge.
    pub realm: String,
    /// Where browsers are sent to log in.
    pub login_path: String,
    /// Where browsers are sent after an admin check fails.
    pub root_path: String,
    /// Upper bound on each credential store call.
    pub credential_timeout: Duration,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            realm: "Web Password".to_string(),
            login_path: "/session/new".to_string(),
            root_path: "/".to_string(),
            credential_timeout: Duration::from_secs(5),
        }
    }
}

/// A `302 Found` redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found(pub String);

impl Found {
    pub fn location(&self) -> &str {
        &self.0
    }
}

impl IntoResponse for Found {
    fn into_response(self) -> Response {
        let location = HeaderValue::from_str(&self.0).unwrap_or_else(|_| {
            tracing::warn!(location = %self.0, "redirect target is not a valid header value");
            HeaderValue::from_static("/")
        });
        (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
    }
}

/// Why the gate stopped a request, and how to answer it.
#[derive(Debug)]
pub enum Rejection {
    /// Anonymous browser: go to the login form.
    LoginRedirect(Found),
    /// Anonymous machine client: retry with Basic credentials.
    Challenge { realm: String },
    /// Non-admin browser: back to the root page.
    AdminRedirect(Found),
    /// Non-admin machine client.
    AdminForbidden,
    /// A collaborator failed.
    Failed(GateError),
}

impl From<GateError> for Rejection {
    fn from(err: GateError) -> Self {
        Rejection::Failed(err)
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Rejection::LoginRedirect(found) | Rejection::AdminRedirect(found) => {
                found.into_response()
            }
            Rejection::Challenge { realm } => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, basic_auth::challenge(&realm))],
                "HTTP Basic: Access denied.\n",
            )
                .into_response(),
            Rejection::AdminForbidden => (StatusCode::FORBIDDEN, ADMIN_DENIED).into_response(),
            Rejection::Failed(err) => err.into_response(),
        }
    }
}

/// Outcome of [`AccessGate::resolve_locale`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleResolution {
    /// Locale the rest of the request renders in.
    pub locale: String,
    /// Set when the requested locale could not be loaded.
    pub notice: Option<FlashMessage>,
}

#[derive(Clone)]
pub struct AccessGate {
    credentials: Arc<dyn CredentialStore>,
    catalog: TranslationCatalog,
    settings: GateSettings,
}

impl AccessGate {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        catalog: TranslationCatalog,
        settings: GateSettings,
    ) -> Self {
        Self {
            credentials,
            catalog,
            settings,
        }
    }

    pub fn settings(&self) -> &GateSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &TranslationCatalog {
        &self.catalog
    }

    /// Checks a login and password against the credential store, within the
    /// configured time limit.
    pub async fn authenticate(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Option<Principal>, GateError> {
        self.bounded(self.credentials.authenticate(login, password))
            .await
    }

    /// Works out who the request acts as.
    ///
    /// The session principal wins; Basic credentials are only consulted when
    /// the session has none (or one that no longer exists, which is cleared).
    ///
    /// Side effect: a principal authenticated from Basic credentials is
    /// written to the session, so a client that also keeps the session
    /// cookie skips the password check on later requests.
    pub async fn resolve_principal(
        &self,
        session: &GateSession,
        credentials: Option<&BasicCredentials>,
    ) -> Result<Option<Principal>, GateError> {
        if let Some(id) = session.principal_id().await? {
            if let Some(principal) = self.bounded(self.credentials.find_by_id(id)).await? {
                tracing::debug!(principal_id = %id, login = %principal.login, "principal from session");
                return Ok(Some(principal));
            }
            tracing::info!(principal_id = %id, "session principal no longer exists");
            session.set_principal_id(None).await?;
        }

        let Some(credentials) = credentials else {
            return Ok(None);
        };

        let authenticated = self
            .authenticate(&credentials.login, &credentials.password)
            .await?;

        match authenticated {
            Some(principal) => {
                session.set_principal_id(Some(principal.id)).await?;
                tracing::debug!(login = %principal.login, "principal from basic credentials");
                Ok(Some(principal))
            }
            None => {
                tracing::info!(login = %credentials.login, "basic credentials rejected");
                Ok(None)
            }
        }
    }

    /// Lets authenticated requests through.
    ///
    /// Anonymous browsers have their path remembered in the session and are
    /// redirected to the login form with a notice. Anonymous machine clients
    /// get a challenge and the session is left alone.
    pub async fn enforce_authenticated(
        &self,
        principal: Option<&Principal>,
        format: ResponseFormat,
        session: &GateSession,
        current_path: &str,
    ) -> Result<(), Rejection> {
        if principal.is_some() {
            return Ok(());
        }

        tracing::info!(path = current_path, ?format, "anonymous request denied");
        if format.is_html() {
            session.set_original_request_path(current_path).await?;
            session
                .push_flash(FlashMessage::notice(LOGIN_NOTICE))
                .await?;
            Err(Rejection::LoginRedirect(Found(
                self.settings.login_path.clone(),
            )))
        } else {
            Err(Rejection::Challenge {
                realm: self.settings.realm.clone(),
            })
        }
    }

    /// Lets administrators through. Anyone else is sent back to the root
    /// page (browsers) or refused with `403` (machine clients).
    pub async fn enforce_admin(
        &self,
        principal: Option<&Principal>,
        format: ResponseFormat,
        session: &GateSession,
    ) -> Result<(), Rejection> {
        if principal.is_some_and(Principal::is_admin) {
            return Ok(());
        }

        tracing::info!(
            login = principal.map(|p| p.login.as_str()).unwrap_or("-"),
            "admin check failed"
        );
        if format.is_html() {
            session
                .push_flash(FlashMessage::error(ADMIN_DENIED))
                .await?;
            Err(Rejection::AdminRedirect(Found(
                self.settings.root_path.clone(),
            )))
        } else {
            Err(Rejection::AdminForbidden)
        }
    }

    /// Remembers `current_path` as the bounce-back target, replacing any
    /// previous one.
    pub async fn record_return_location(
        &self,
        session: &GateSession,
        current_path: &str,
    ) -> Result<(), GateError> {
        session.set_return_to(current_path).await
    }

    /// Redirects to the bounce-back target, or `default_path` when there is
    /// none. The target is consumed either way.
    pub async fn redirect_back_or_default(
        &self,
        session: &GateSession,
        default_path: &str,
    ) -> Result<Found, GateError> {
        let target = session
            .take_return_to()
            .await?
            .unwrap_or_else(|| default_path.to_string());
        Ok(Found(target))
    }

    /// Picks the request's locale and makes sure its translations are loaded.
    ///
    /// A requested locale sticks in the session. When the active locale
    /// cannot be loaded the request carries on in the default locale: the
    /// failure is logged, its resource path is dropped from the search path,
    /// the session locale is reset and a notice is returned for the page.
    pub async fn resolve_locale(
        &self,
        session: &GateSession,
        requested: Option<&str>,
    ) -> Result<LocaleResolution, GateError> {
        if let Some(requested) = requested.filter(|l| !l.is_empty()) {
            session.set_locale(Some(requested)).await?;
        }

        let default = self.catalog.default_locale().to_string();
        let locale = session.locale().await?.unwrap_or_else(|| default.clone());

        let Err(err) = self.catalog.ensure_loaded(&locale).await else {
            return Ok(LocaleResolution {
                locale,
                notice: None,
            });
        };

        tracing::error!(locale = %locale, error = %err, "translation load failed");
        self.catalog.discard(&locale);
        session.set_locale(Some(&default)).await?;

        if locale != default {
            if let Err(err) = self.catalog.ensure_loaded(&default).await {
                tracing::error!(locale = %default, error = %err, "default translation load failed");
                self.catalog.discard(&default);
            }
        }

        Ok(LocaleResolution {
            notice: Some(FlashMessage::error(format!(
                "{locale} translation not available"
            ))),
            locale: default,
        })
    }

    async fn bounded<T>(
        &self,
        lookup: impl Future<Output = Result<T, CredentialError>>,
    ) -> Result<T, GateError> {
        let limit = self.settings.credential_timeout;
        tokio::time::timeout(limit, lookup)
            .await
            .map_err(|_| GateError::CredentialTimeout(limit))?
            .map_err(GateError::from)
    }
}
