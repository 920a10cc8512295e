//! Unsubscribe flow
//!
//! Marketing emails link to `/unsubscribe?email=..&token=..`, carrying the
//! token generated when the row was stored. The page calls the
//! `unsubscribe_by_token` procedure once and shows one of a fixed set of
//! messages. The procedure answers with a bare string or a one-element
//! array of strings, depending on how the function is declared.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::backend::Backend;
use crate::context::ResultExt;
use crate::Translator;

/// Name of the remote procedure.
pub const RPC_FUNCTION: &str = "unsubscribe_by_token";

/// Why a link could not be turned into a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnsubscribeError {
    /// The query string lacks a non-empty parameter
    #[error("missing {0} parameter")]
    MissingParameter(&'static str),
}

/// Parameters of an unsubscribe link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsubscribeRequest {
    /// Subscriber address, as it appears in the link
    #[serde(rename = "p_email")]
    pub email: String,
    /// Opaque token stored with the subscription
    #[serde(rename = "p_token")]
    pub token: String,
}

impl UnsubscribeRequest {
    /// Read `email` and `token` from a query string (leading `?` allowed).
    ///
    /// ```
    /// use bites_forms::unsubscribe::{UnsubscribeError, UnsubscribeRequest};
    ///
    /// let request = UnsubscribeRequest::from_query("?email=ana%40bar.es&token=abc").unwrap();
    /// assert_eq!(request.email, "ana@bar.es");
    /// assert_eq!(
    ///     UnsubscribeRequest::from_query("email=ana%40bar.es&token="),
    ///     Err(UnsubscribeError::MissingParameter("token"))
    /// );
    /// ```
    pub fn from_query(query: &str) -> Result<Self, UnsubscribeError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut email = None;
        let mut token = None;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "email" => &mut email,
                "token" => &mut token,
                _ => continue,
            };
            if slot.is_none() && !value.trim().is_empty() {
                *slot = Some(value.trim().to_string());
            }
        }
        Ok(UnsubscribeRequest {
            email: email.ok_or(UnsubscribeError::MissingParameter("email"))?,
            token: token.ok_or(UnsubscribeError::MissingParameter("token"))?,
        })
    }

    /// Link to the unsubscribe page on `site` for this subscriber.
    pub fn link(&self, site: &Url) -> Url {
        let mut url = site.clone();
        url.set_path("/unsubscribe");
        url.set_fragment(None);
        url.query_pairs_mut()
            .clear()
            .append_pair("email", &self.email)
            .append_pair("token", &self.token);
        url
    }
}

/// Answer of the remote procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcOutcome {
    /// Subscription removed
    Success,
    /// Token unknown, mismatched or already used
    InvalidOrAlreadyUnsubscribed,
    /// The procedure caught an error of its own
    UnexpectedError,
    /// Anything else, kept for the log
    Unknown(String),
}

impl RpcOutcome {
    /// Classify a procedure result: a string, or an array whose first
    /// element is one.
    ///
    /// ```
    /// use bites_forms::unsubscribe::RpcOutcome;
    /// use serde_json::json;
    ///
    /// assert_eq!(RpcOutcome::from_value(&json!(["success"])), RpcOutcome::Success);
    /// assert_eq!(RpcOutcome::from_value(&json!(null)), RpcOutcome::Unknown("null".into()));
    /// ```
    pub fn from_value(value: &Value) -> Self {
        let first = match value {
            Value::Array(items) => items.first().unwrap_or(&Value::Null),
            other => other,
        };
        match first.as_str() {
            Some("success") => RpcOutcome::Success,
            Some("invalid_or_already_unsubscribed") => RpcOutcome::InvalidOrAlreadyUnsubscribed,
            Some("unexpected_error") => RpcOutcome::UnexpectedError,
            Some(other) => RpcOutcome::Unknown(other.to_string()),
            None => RpcOutcome::Unknown(first.to_string()),
        }
    }

    fn message_key(&self) -> &'static str {
        match self {
            RpcOutcome::Success => "unsubscribe.success",
            RpcOutcome::InvalidOrAlreadyUnsubscribed => "unsubscribe.invalidOrAlreadyUnsubscribed",
            RpcOutcome::UnexpectedError => "unsubscribe.unexpectedError",
            RpcOutcome::Unknown(_) => "unsubscribe.unknownResponse",
        }
    }
}

/// What the unsubscribe page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsubscribeStatus {
    /// Request in flight
    Loading(String),
    /// Subscription removed
    Success(String),
    /// Anything else, with the message to show
    Error(String),
}

impl UnsubscribeStatus {
    /// Status shown before the procedure answers.
    pub fn loading(i18n: &Translator) -> Self {
        UnsubscribeStatus::Loading(i18n.text("unsubscribe.loading"))
    }

    /// Message to display.
    pub fn message(&self) -> &str {
        match self {
            UnsubscribeStatus::Loading(msg)
            | UnsubscribeStatus::Success(msg)
            | UnsubscribeStatus::Error(msg) => msg,
        }
    }
}

/// Process an unsubscribe link's query string.
///
/// Missing parameters are reported without calling the backend. Transport
/// and API failures, unknown answers and each known answer map to their own
/// message.
pub async fn unsubscribe<B: Backend>(backend: &B, i18n: &Translator, query: &str) -> UnsubscribeStatus {
    let request = match UnsubscribeRequest::from_query(query) {
        Ok(request) => request,
        Err(err) => {
            warn!(error = %err, "unsubscribe link is incomplete");
            return UnsubscribeStatus::Error(i18n.text("unsubscribe.missingParameters"));
        }
    };

    let args = match serde_json::to_value(&request) {
        Ok(args) => args,
        Err(err) => {
            error!(error = %err, "could not encode unsubscribe arguments");
            return UnsubscribeStatus::Error(i18n.text("unsubscribe.requestFailed"));
        }
    };

    let response = backend
        .rpc(RPC_FUNCTION, args)
        .await
        .context(format!("calling {RPC_FUNCTION}"));
    let value = match response {
        Ok(value) => value,
        Err(err) => {
            error!(error = ?err, "unsubscribe request failed");
            return UnsubscribeStatus::Error(i18n.text("unsubscribe.requestFailed"));
        }
    };
    debug!(response = %value, "unsubscribe procedure answered");

    let outcome = RpcOutcome::from_value(&value);
    let message = i18n.text(outcome.message_key());
    match outcome {
        RpcOutcome::Success => {
            info!("subscriber removed");
            UnsubscribeStatus::Success(message)
        }
        RpcOutcome::Unknown(raw) => {
            warn!(response = %raw, "unknown unsubscribe response");
            UnsubscribeStatus::Error(message)
        }
        other => {
            info!(outcome = ?other, "unsubscribe refused");
            UnsubscribeStatus::Error(message)
        }
    }
}
