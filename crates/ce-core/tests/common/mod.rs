// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! In-memory contents host shared by the integration tests
//!
//! Writes follow the real host's compare-and-swap rules: creating an existing
//! file fails with 422, updating with a stale token fails with 409 and a
//! missing file fails with 404. Calls can be slowed down per path to stage
//! races.

#![allow(dead_code)]

use async_trait::async_trait;
use ce_contents_client::{ContentsError, HttpError};
use ce_core::{ApiResult, ContentsApi, ControllerOptions, EditorController};
use ce_domain_types::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutCall {
    pub path: String,
    pub message: String,
    pub text: String,
    pub version: Option<VersionToken>,
}

#[derive(Default)]
pub struct FakeHost {
    files: Mutex<BTreeMap<String, (String, VersionToken)>>,
    next_version: Mutex<u64>,
    read_delays: Mutex<HashMap<String, Duration>>,
    list_delays: Mutex<HashMap<String, Duration>>,
    write_delays: Mutex<HashMap<String, Duration>>,
    pub listed: Mutex<Vec<String>>,
    pub puts: Mutex<Vec<PutCall>>,
    pub deletes: Mutex<Vec<(String, String, VersionToken)>>,
    reject_identity: Mutex<bool>,
}

fn http(status: u16, message: &str) -> ContentsError {
    ContentsError::Http(HttpError {
        status,
        status_text: String::new(),
        body: format!(r#"{{"message":"{message}"}}"#),
    })
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_files(files: &[(&str, &str)]) -> Arc<Self> {
        let host = Self::new();
        for (path, text) in files {
            host.external_write(path, text);
        }
        host
    }

    fn bump(&self) -> VersionToken {
        let mut next = self.next_version.lock().unwrap();
        *next += 1;
        VersionToken::new(format!("v{}", *next))
    }

    /// Change a file behind the editor's back
    pub fn external_write(&self, path: &str, text: &str) -> VersionToken {
        let version = self.bump();
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), (text.to_string(), version.clone()));
        version
    }

    pub fn remove(&self, path: &str) {
        self.files.lock().unwrap().remove(path);
    }

    pub fn version_of(&self, path: &str) -> Option<VersionToken> {
        self.files.lock().unwrap().get(path).map(|(_, v)| v.clone())
    }

    pub fn text_of(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).map(|(t, _)| t.clone())
    }

    pub fn delay_read(&self, path: &str, delay: Duration) {
        self.read_delays.lock().unwrap().insert(path.to_string(), delay);
    }

    pub fn delay_list(&self, path: &str, delay: Duration) {
        self.list_delays.lock().unwrap().insert(path.to_string(), delay);
    }

    pub fn delay_write(&self, path: &str, delay: Duration) {
        self.write_delays.lock().unwrap().insert(path.to_string(), delay);
    }

    pub fn reject_identity(&self) {
        *self.reject_identity.lock().unwrap() = true;
    }

    pub fn list_count(&self, path: &str) -> usize {
        self.listed.lock().unwrap().iter().filter(|p| *p == path).count()
    }

    pub fn last_put(&self) -> Option<PutCall> {
        self.puts.lock().unwrap().last().cloned()
    }

    async fn pause(delays: &Mutex<HashMap<String, Duration>>, path: &str) {
        let delay = delays.lock().unwrap().get(path).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ContentsApi for FakeHost {
    async fn read_text(&self, _ctx: &RepositoryContext, path: &str) -> ApiResult<FileText> {
        Self::pause(&self.read_delays, path).await;
        let files = self.files.lock().unwrap();
        let (text, version) = files.get(path).ok_or_else(|| http(404, "Not Found"))?;
        Ok(FileText {
            version: version.clone(),
            text: text.clone(),
        })
    }

    async fn put_text(
        &self,
        _ctx: &RepositoryContext,
        path: &str,
        message: &str,
        text: &str,
        version: Option<&VersionToken>,
    ) -> ApiResult<WriteOutcome> {
        self.puts.lock().unwrap().push(PutCall {
            path: path.to_string(),
            message: message.to_string(),
            text: text.to_string(),
            version: version.cloned(),
        });
        Self::pause(&self.write_delays, path).await;

        let current = self.version_of(path);
        match (version, current) {
            (None, Some(_)) => return Err(http(422, "sha wasn't supplied")),
            (Some(_), None) => return Err(http(404, "Not Found")),
            (Some(expected), Some(current)) if *expected != current => {
                return Err(http(409, "does not match"))
            }
            _ => {}
        }

        let version = self.external_write(path, text);
        Ok(WriteOutcome {
            version,
            commit: Some("c0ffee".to_string()),
        })
    }

    async fn delete_file(
        &self,
        _ctx: &RepositoryContext,
        path: &str,
        message: &str,
        version: &VersionToken,
    ) -> ApiResult<()> {
        self.deletes
            .lock()
            .unwrap()
            .push((path.to_string(), message.to_string(), version.clone()));

        let mut files = self.files.lock().unwrap();
        match files.get(path) {
            None => Err(http(404, "Not Found")),
            Some((_, current)) if current != version => Err(http(409, "does not match")),
            Some(_) => {
                files.remove(path);
                Ok(())
            }
        }
    }

    async fn list_directory(
        &self,
        _ctx: &RepositoryContext,
        path: &str,
    ) -> ApiResult<Vec<DirectoryEntry>> {
        self.listed.lock().unwrap().push(path.to_string());
        Self::pause(&self.list_delays, path).await;

        let files = self.files.lock().unwrap();
        if let Some((text, version)) = files.get(path) {
            return Ok(vec![DirectoryEntry {
                name: path.rsplit('/').next().unwrap_or(path).to_string(),
                path: path.to_string(),
                version: version.clone(),
                size: text.len() as u64,
                kind: EntryKind::File,
            }]);
        }

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{path}/")
        };
        let mut dirs = BTreeSet::new();
        let mut entries = Vec::new();
        for (file, (text, version)) in files.iter() {
            let Some(rest) = file.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    dirs.insert(dir.to_string());
                }
                None => entries.push(DirectoryEntry {
                    name: rest.to_string(),
                    path: file.clone(),
                    version: version.clone(),
                    size: text.len() as u64,
                    kind: EntryKind::File,
                }),
            }
        }
        if entries.is_empty() && dirs.is_empty() && !path.is_empty() {
            return Err(http(404, "Not Found"));
        }

        entries.extend(dirs.into_iter().map(|dir| DirectoryEntry {
            path: format!("{prefix}{dir}"),
            name: dir,
            version: VersionToken::new("tree"),
            size: 0,
            kind: EntryKind::Dir,
        }));
        Ok(entries)
    }

    async fn list_accessible_repositories(
        &self,
        _limit: usize,
    ) -> ApiResult<Vec<RepositorySummary>> {
        Ok(Vec::new())
    }

    async fn current_user(&self) -> ApiResult<AuthenticatedUser> {
        if *self.reject_identity.lock().unwrap() {
            return Err(http(401, "Bad credentials"));
        }
        Ok(AuthenticatedUser {
            login: "octocat".to_string(),
            name: None,
        })
    }
}

pub fn ctx() -> RepositoryContext {
    RepositoryContext::new("octo", "notes", "main")
}

/// A signed-in controller on `ctx()` backed by `host`
pub fn signed_in(
    host: &Arc<FakeHost>,
    options: ControllerOptions,
) -> EditorController<Arc<FakeHost>> {
    let controller = EditorController::new(options);
    controller.sign_in(Arc::clone(host));
    controller.set_context(ctx());
    controller
}
