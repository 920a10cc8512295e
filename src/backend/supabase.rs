//! Supabase over HTTP
//!
//! Talks to PostgREST (`/rest/v1`) for tables and remote procedures and to
//! the storage API (`/storage/v1`) for signed links. Both APIs accept the
//! project's anon key as `apikey` header and bearer token.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::{Backend, BackendError};
use crate::config::SiteConfig;

/// [`Backend`] backed by a Supabase project.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    base: Url,
    http: reqwest::Client,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base", &self.inner.base.as_str())
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    /// Client for the project in `config`.
    pub fn new(config: &SiteConfig) -> Result<Self, BackendError> {
        let key = header::HeaderValue::from_str(&config.anon_key)
            .map_err(|e| BackendError::Encoding(format!("anon key: {e}")))?;
        let bearer = header::HeaderValue::from_str(&format!("Bearer {}", config.anon_key))
            .map_err(|e| BackendError::Encoding(format!("anon key: {e}")))?;

        let mut headers = header::HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(header::AUTHORIZATION, bearer);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let mut base = config.supabase_url.clone();
        if base.cannot_be_a_base() {
            return Err(BackendError::Encoding(format!(
                "{} cannot be used as a base URL",
                config.supabase_url
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(SupabaseClient {
            inner: Arc::new(ClientInner { base, http }),
        })
    }

    fn endpoint<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Url {
        let mut url = self.inner.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<Value>,
    hint: Option<String>,
    // storage API shape
    error: Option<String>,
}

fn api_error(status: StatusCode, body: &[u8]) -> BackendError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let message = parsed
        .message
        .or_else(|| parsed.error.clone())
        .unwrap_or_else(|| {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                text
            }
        });
    let details = match parsed.details {
        Some(Value::String(text)) => Some(text),
        Some(Value::Null) | None => parsed.hint,
        Some(other) => Some(other.to_string()),
    };
    BackendError::Api {
        status: status.as_u16(),
        code: parsed.code.or(parsed.error),
        message,
        details,
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await?;
    Err(api_error(status, &body))
}

impl Backend for SupabaseClient {
    async fn insert(&self, table: &str, row: Value) -> Result<(), BackendError> {
        let url = self.endpoint(["rest", "v1", table]);
        debug!(%url, "inserting row");
        let response = self
            .inner
            .http
            .post(url)
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn find_one(
        &self,
        table: &str,
        filters: &[(&str, &str)],
    ) -> Result<Option<Value>, BackendError> {
        let mut url = self.endpoint(["rest", "v1", table]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", "id");
            for (column, value) in filters {
                query.append_pair(column, &format!("eq.{value}"));
            }
            query.append_pair("limit", "1");
        }
        debug!(table, "looking up row");
        let response = self.inner.http.get(url).send().await?;
        let rows: Vec<Value> = check(response).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value, BackendError> {
        let url = self.endpoint(["rest", "v1", "rpc", function]);
        debug!(function, "calling remote procedure");
        let response = self.inner.http.post(url).json(&args).send().await?;
        let body = check(response).await?.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn signed_url(
        &self,
        bucket: &str,
        path: &str,
        ttl: Duration,
    ) -> Result<Url, BackendError> {
        let url = self.endpoint(
            ["storage", "v1", "object", "sign", bucket]
                .into_iter()
                .chain(path.split('/')),
        );
        debug!(bucket, path, ttl_secs = ttl.as_secs(), "signing download link");
        let response = self
            .inner
            .http
            .post(url)
            .json(&json!({ "expiresIn": ttl.as_secs() }))
            .send()
            .await?;

        #[derive(Deserialize)]
        struct Signed {
            #[serde(rename = "signedURL")]
            signed_url: Option<String>,
        }

        let signed: Signed = check(response).await?.json().await?;
        let relative = signed
            .signed_url
            .filter(|s| !s.is_empty())
            .ok_or_else(|| BackendError::Decode("response has no signedURL".into()))?;

        let storage = self.endpoint(["storage", "v1"]);
        Url::parse(&format!("{}{}", storage.as_str().trim_end_matches('/'), relative))
            .map_err(|e| BackendError::Decode(format!("signedURL: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> SupabaseClient {
        SupabaseClient::new(&SiteConfig::new(Url::parse(base).unwrap(), "anon")).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let c = client("https://p.supabase.co");
        assert_eq!(
            c.endpoint(["rest", "v1", "leads"]).as_str(),
            "https://p.supabase.co/rest/v1/leads"
        );

        let nested = client("https://example.com/supabase");
        assert_eq!(
            nested.endpoint(["rest", "v1", "rpc", "unsubscribe_by_token"]).as_str(),
            "https://example.com/supabase/rest/v1/rpc/unsubscribe_by_token"
        );
    }

    #[test]
    fn test_endpoint_escapes_file_names() {
        let c = client("https://p.supabase.co/");
        assert_eq!(
            c.endpoint(["storage", "v1", "object", "sign", "catalogos", "Catálogo es.pdf"])
                .as_str(),
            "https://p.supabase.co/storage/v1/object/sign/catalogos/Cat%C3%A1logo%20es.pdf"
        );
    }

    #[test]
    fn test_postgrest_error_body() {
        let err = api_error(
            StatusCode::CONFLICT,
            br#"{"code":"23505","message":"duplicate key value violates unique constraint \"leads_email_key\"","details":"Key (email)=(a@b.co) already exists.","hint":null}"#,
        );
        assert_eq!(err.code(), Some("23505"));
        assert!(err.is_unique_violation(None));
        assert!(matches!(
            err,
            BackendError::Api { status: 409, details: Some(ref d), .. } if d.starts_with("Key (email)")
        ));
    }

    #[test]
    fn test_storage_error_body() {
        let err = api_error(
            StatusCode::BAD_REQUEST,
            br#"{"statusCode":"404","error":"not_found","message":"Object not found"}"#,
        );
        assert_eq!(
            err,
            BackendError::Api {
                status: 400,
                code: Some("not_found".into()),
                message: "Object not found".into(),
                details: None,
            }
        );
    }

    #[test]
    fn test_non_json_error_body() {
        let err = api_error(StatusCode::BAD_GATEWAY, b"");
        assert_eq!(
            err,
            BackendError::Api {
                status: 502,
                code: None,
                message: "Bad Gateway".into(),
                details: None,
            }
        );
    }
}
