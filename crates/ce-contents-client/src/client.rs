// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Contents API client implementation

use ce_domain_types::{
    AuthenticatedUser, DirectoryEntry, FileBlob, FileText, RepositoryContext, RepositorySummary,
    VersionToken, WriteOutcome,
};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::AuthConfig;
use crate::encoding::{decode_text, encode_text};
use crate::error::{ContentsError, Result};
use crate::transport::{
    HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, RetryPolicy, RetryingTransport,
};

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = "contents-editor/0.1";
pub const DEFAULT_AFFILIATION: &str = "owner,collaborator,organization_member";
/// Page size of the repository listing; filtering happens client-side
pub const REPOSITORY_PAGE_SIZE: u32 = 100;

/// Tunables for [`ContentsClient`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub user_agent: String,
    pub retry: RetryPolicy,
    pub affiliation: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryPolicy::default(),
            affiliation: DEFAULT_AFFILIATION.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct FileResponse {
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListingResponse {
    Many(Vec<DirectoryEntry>),
    One(DirectoryEntry),
}

#[derive(Serialize)]
struct PutContentsBody<'a> {
    message: &'a str,
    content: &'a str,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Serialize)]
struct DeleteContentsBody<'a> {
    message: &'a str,
    branch: &'a str,
    sha: &'a str,
}

#[derive(Deserialize)]
struct ShaOnly {
    sha: String,
}

#[derive(Deserialize)]
struct PutContentsResponse {
    content: Option<ShaOnly>,
    #[serde(default)]
    commit: Option<ShaOnly>,
}

/// Typed operations over the hosted repository contents API
#[derive(Debug, Clone)]
pub struct ContentsClient<T = ReqwestTransport> {
    transport: RetryingTransport<T>,
    base_url: Url,
    auth: AuthConfig,
    affiliation: String,
}

impl ContentsClient<ReqwestTransport> {
    /// Create a client talking to the network through `reqwest`
    pub fn new(base_url: Url, auth: AuthConfig, options: ClientOptions) -> Result<Self> {
        let transport = ReqwestTransport::new(&options.user_agent)?;
        Self::with_transport(base_url, auth, transport, options)
    }

    /// Create a client from a base URL string
    pub fn from_url(base_url: &str, auth: AuthConfig, options: ClientOptions) -> Result<Self> {
        Self::new(Url::parse(base_url)?, auth, options)
    }
}

impl<T: HttpTransport> ContentsClient<T> {
    /// Create a client on top of an arbitrary transport
    pub fn with_transport(
        base_url: Url,
        auth: AuthConfig,
        transport: T,
        options: ClientOptions,
    ) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(ContentsError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            transport: RetryingTransport::new(transport, options.retry),
            base_url,
            auth,
            affiliation: options.affiliation,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    pub fn transport(&self) -> &RetryingTransport<T> {
        &self.transport
    }

    /// Fetch a file's raw blob and version token
    pub async fn read_file(&self, ctx: &RepositoryContext, path: &str) -> Result<FileBlob> {
        tracing::debug!(owner = %ctx.owner, repo = %ctx.repo, branch = %ctx.branch, path, "Reading file");
        let url = self.contents_url(ctx, path, true)?;
        let response = self.execute(Method::GET, url, None).await?;
        let file: FileResponse = response.json_body()?;

        if file.encoding.as_deref() == Some("none") {
            return Err(ContentsError::Malformed(format!(
                "{} is too large to be served inline",
                path
            )));
        }
        let content = file
            .content
            .ok_or_else(|| ContentsError::Malformed(format!("response for {} has no content", path)))?;

        Ok(FileBlob {
            version: VersionToken::new(file.sha),
            content_base64: content,
        })
    }

    /// Fetch a file and decode it to text
    pub async fn read_text(&self, ctx: &RepositoryContext, path: &str) -> Result<FileText> {
        let blob = self.read_file(ctx, path).await?;
        Ok(FileText {
            version: blob.version,
            text: decode_text(&blob.content_base64)?,
        })
    }

    /// Update an existing file; the host answers 409 when `version` is stale
    pub async fn write_file(
        &self,
        ctx: &RepositoryContext,
        path: &str,
        message: &str,
        content_base64: &str,
        version: &VersionToken,
    ) -> Result<WriteOutcome> {
        tracing::debug!(owner = %ctx.owner, repo = %ctx.repo, path, sha = %version, "Updating file");
        self.put_contents(ctx, path, message, content_base64, Some(version)).await
    }

    /// Create a new file; identical to an update minus the `sha`
    pub async fn create_file(
        &self,
        ctx: &RepositoryContext,
        path: &str,
        message: &str,
        content_base64: &str,
    ) -> Result<WriteOutcome> {
        tracing::debug!(owner = %ctx.owner, repo = %ctx.repo, path, "Creating file");
        self.put_contents(ctx, path, message, content_base64, None).await
    }

    /// Encode `text` and create or update depending on `version`
    pub async fn put_text(
        &self,
        ctx: &RepositoryContext,
        path: &str,
        message: &str,
        text: &str,
        version: Option<&VersionToken>,
    ) -> Result<WriteOutcome> {
        let encoded = encode_text(text);
        match version {
            Some(version) => self.write_file(ctx, path, message, &encoded, version).await,
            None => self.create_file(ctx, path, message, &encoded).await,
        }
    }

    /// Delete a file at its current version
    pub async fn delete_file(
        &self,
        ctx: &RepositoryContext,
        path: &str,
        message: &str,
        version: &VersionToken,
    ) -> Result<()> {
        tracing::debug!(owner = %ctx.owner, repo = %ctx.repo, path, sha = %version, "Deleting file");
        let url = self.contents_url(ctx, path, false)?;
        let body = DeleteContentsBody {
            message,
            branch: &ctx.branch,
            sha: version.as_str(),
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| ContentsError::Malformed(format!("cannot encode request: {}", e)))?;
        self.execute(Method::DELETE, url, Some(body)).await?;
        Ok(())
    }

    /// List a directory; a file path yields a single-element listing
    pub async fn list_directory(
        &self,
        ctx: &RepositoryContext,
        path: &str,
    ) -> Result<Vec<DirectoryEntry>> {
        tracing::debug!(owner = %ctx.owner, repo = %ctx.repo, branch = %ctx.branch, path, "Listing directory");
        let url = self.contents_url(ctx, path, true)?;
        let response = self.execute(Method::GET, url, None).await?;

        match response.json_body::<ListingResponse>()? {
            ListingResponse::Many(entries) => Ok(entries),
            ListingResponse::One(entry) => Ok(vec![entry]),
        }
    }

    /// Most recently updated repositories the caller can push to, at most `limit`
    pub async fn list_accessible_repositories(&self, limit: usize) -> Result<Vec<RepositorySummary>> {
        let mut url = self.endpoint(["user", "repos"])?;
        url.query_pairs_mut()
            .append_pair("per_page", &REPOSITORY_PAGE_SIZE.to_string())
            .append_pair("sort", "updated")
            .append_pair("direction", "desc")
            .append_pair("affiliation", &self.affiliation);

        let response = self.execute(Method::GET, url, None).await?;
        let fetched: Vec<RepositorySummary> = response.json_body()?;
        let total = fetched.len();

        let editable: Vec<RepositorySummary> = fetched
            .into_iter()
            .filter(RepositorySummary::is_editable)
            .take(limit)
            .collect();

        tracing::debug!(fetched = total, kept = editable.len(), limit, "Listed repositories");
        Ok(editable)
    }

    /// Identity check for the held credential
    pub async fn current_user(&self) -> Result<AuthenticatedUser> {
        let url = self.endpoint(["user"])?;
        let response = self.execute(Method::GET, url, None).await?;
        response.json_body()
    }

    // Private helper methods

    async fn put_contents(
        &self,
        ctx: &RepositoryContext,
        path: &str,
        message: &str,
        content_base64: &str,
        version: Option<&VersionToken>,
    ) -> Result<WriteOutcome> {
        let url = self.contents_url(ctx, path, false)?;
        let body = PutContentsBody {
            message,
            content: content_base64,
            branch: &ctx.branch,
            sha: version.map(VersionToken::as_str),
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| ContentsError::Malformed(format!("cannot encode request: {}", e)))?;

        let response = self.execute(Method::PUT, url, Some(body)).await?;
        let parsed: PutContentsResponse = response.json_body()?;
        let content = parsed.content.ok_or_else(|| {
            ContentsError::Malformed(format!("write response for {} has no content", path))
        })?;

        Ok(WriteOutcome {
            version: VersionToken::new(content.sha),
            commit: parsed.commit.map(|c| c.sha),
        })
    }

    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<HttpResponse> {
        let mut request = HttpRequest::new(method, url).with_headers(self.auth.headers()?);
        if let Some(body) = body {
            request = request.with_json(body);
        }

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            tracing::debug!(status = response.status.as_u16(), "Request rejected");
        }
        response.error_for_status()
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ContentsError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `/repos/{owner}/{repo}/contents/{path}`, with `?ref=` for reads
    fn contents_url(&self, ctx: &RepositoryContext, path: &str, with_ref: bool) -> Result<Url> {
        let fixed = ["repos", ctx.owner.as_str(), ctx.repo.as_str(), "contents"];
        let path_segments = path.split('/').filter(|s| !s.is_empty());
        let mut url = self.endpoint(fixed.into_iter().chain(path_segments))?;
        if with_ref && !ctx.branch.is_empty() {
            url.query_pairs_mut().append_pair("ref", &ctx.branch);
        }
        Ok(url)
    }
}
