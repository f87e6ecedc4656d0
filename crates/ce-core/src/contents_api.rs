// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Contents API - Abstract Remote Content Interface
//!
//! This module defines the `ContentsApi` trait the editor core talks to. The
//! production implementation is [`ContentsClient`]; tests plug in in-memory
//! hosts with the same compare-and-swap semantics.

use async_trait::async_trait;
use ce_contents_client::{ContentsClient, ContentsError, HttpTransport};
use ce_domain_types::{
    AuthenticatedUser, DirectoryEntry, FileText, RepositoryContext, RepositorySummary,
    VersionToken, WriteOutcome,
};
use std::sync::Arc;

pub type ApiResult<T> = std::result::Result<T, ContentsError>;

/// Remote content operations used by the editor core
///
/// Text crosses this boundary already decoded; the implementation owns the
/// wire encoding.
#[async_trait]
pub trait ContentsApi: Send + Sync {
    /// Read a file as text together with its version token
    async fn read_text(&self, ctx: &RepositoryContext, path: &str) -> ApiResult<FileText>;

    /// Create (`version == None`) or update (`version == Some`) a file
    async fn put_text(
        &self,
        ctx: &RepositoryContext,
        path: &str,
        message: &str,
        text: &str,
        version: Option<&VersionToken>,
    ) -> ApiResult<WriteOutcome>;

    /// Delete a file at `version`
    async fn delete_file(
        &self,
        ctx: &RepositoryContext,
        path: &str,
        message: &str,
        version: &VersionToken,
    ) -> ApiResult<()>;

    /// List one directory; a file path yields a single entry
    async fn list_directory(
        &self,
        ctx: &RepositoryContext,
        path: &str,
    ) -> ApiResult<Vec<DirectoryEntry>>;

    /// Editable repositories, most recently updated first
    async fn list_accessible_repositories(&self, limit: usize)
        -> ApiResult<Vec<RepositorySummary>>;

    /// Identity check for the held credential
    async fn current_user(&self) -> ApiResult<AuthenticatedUser>;
}

#[async_trait]
impl<T> ContentsApi for ContentsClient<T>
where
    T: HttpTransport + 'static,
{
    async fn read_text(&self, ctx: &RepositoryContext, path: &str) -> ApiResult<FileText> {
        ContentsClient::read_text(self, ctx, path).await
    }

    async fn put_text(
        &self,
        ctx: &RepositoryContext,
        path: &str,
        message: &str,
        text: &str,
        version: Option<&VersionToken>,
    ) -> ApiResult<WriteOutcome> {
        ContentsClient::put_text(self, ctx, path, message, text, version).await
    }

    async fn delete_file(
        &self,
        ctx: &RepositoryContext,
        path: &str,
        message: &str,
        version: &VersionToken,
    ) -> ApiResult<()> {
        ContentsClient::delete_file(self, ctx, path, message, version).await
    }

    async fn list_directory(
        &self,
        ctx: &RepositoryContext,
        path: &str,
    ) -> ApiResult<Vec<DirectoryEntry>> {
        ContentsClient::list_directory(self, ctx, path).await
    }

    async fn list_accessible_repositories(
        &self,
        limit: usize,
    ) -> ApiResult<Vec<RepositorySummary>> {
        ContentsClient::list_accessible_repositories(self, limit).await
    }

    async fn current_user(&self) -> ApiResult<AuthenticatedUser> {
        ContentsClient::current_user(self).await
    }
}

#[async_trait]
impl<A: ContentsApi + ?Sized> ContentsApi for Arc<A> {
    async fn read_text(&self, ctx: &RepositoryContext, path: &str) -> ApiResult<FileText> {
        (**self).read_text(ctx, path).await
    }

    async fn put_text(
        &self,
        ctx: &RepositoryContext,
        path: &str,
        message: &str,
        text: &str,
        version: Option<&VersionToken>,
    ) -> ApiResult<WriteOutcome> {
        (**self).put_text(ctx, path, message, text, version).await
    }

    async fn delete_file(
        &self,
        ctx: &RepositoryContext,
        path: &str,
        message: &str,
        version: &VersionToken,
    ) -> ApiResult<()> {
        (**self).delete_file(ctx, path, message, version).await
    }

    async fn list_directory(
        &self,
        ctx: &RepositoryContext,
        path: &str,
    ) -> ApiResult<Vec<DirectoryEntry>> {
        (**self).list_directory(ctx, path).await
    }

    async fn list_accessible_repositories(
        &self,
        limit: usize,
    ) -> ApiResult<Vec<RepositorySummary>> {
        (**self).list_accessible_repositories(limit).await
    }

    async fn current_user(&self) -> ApiResult<AuthenticatedUser> {
        (**self).current_user().await
    }
}
