// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Repository File Index - Search Overlay Data Source
//!
//! Walks a repository breadth-first over an explicit work queue, bounded by
//! depth and by the number of files collected.

use ce_config::SearchConfig;
use ce_domain_types::RepositoryContext;
use std::collections::VecDeque;

use crate::contents_api::ContentsApi;
use crate::Result;

/// File paths found by [`index_repository`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileIndex {
    pub files: Vec<String>,
    /// The walk stopped at a bound before seeing everything
    pub truncated: bool,
}

impl FileIndex {
    /// Paths containing `query`, case-insensitively
    pub fn matching(&self, query: &str) -> Vec<&str> {
        let query = query.trim().to_lowercase();
        self.files
            .iter()
            .map(String::as_str)
            .filter(|path| path.to_lowercase().contains(&query))
            .collect()
    }
}

/// Collect file paths of `ctx`, at most `config.max_files`
///
/// Directories deeper than `config.max_depth` (root = 0) are not listed. A
/// failed listing below the root is logged and skipped.
pub async fn index_repository<A>(
    api: &A,
    ctx: &RepositoryContext,
    config: SearchConfig,
) -> Result<FileIndex>
where
    A: ContentsApi + ?Sized,
{
    let mut index = FileIndex::default();
    let mut queue: VecDeque<(String, usize)> = VecDeque::from([(String::new(), 0)]);

    while let Some((dir, depth)) = queue.pop_front() {
        if index.files.len() >= config.max_files {
            index.truncated = true;
            break;
        }

        let entries = match api.list_directory(ctx, &dir).await {
            Ok(entries) => entries,
            Err(e) if dir.is_empty() => return Err(e.into()),
            Err(e) => {
                tracing::warn!(owner = %ctx.owner, repo = %ctx.repo, path = %dir, error = %e, "Skipping directory");
                continue;
            }
        };

        let mut entries = entries.into_iter();
        while let Some(entry) = entries.next() {
            if entry.kind.is_dir() {
                if depth < config.max_depth {
                    queue.push_back((entry.path, depth + 1));
                } else {
                    index.truncated = true;
                }
                continue;
            }

            index.files.push(entry.path);
            if index.files.len() >= config.max_files {
                // Full: whatever is left unlisted makes the result partial
                index.truncated |= entries.len() > 0 || !queue.is_empty();
                queue.clear();
                break;
            }
        }
    }

    tracing::debug!(
        owner = %ctx.owner,
        repo = %ctx.repo,
        files = index.files.len(),
        truncated = index.truncated,
        "Indexed repository"
    );
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contents_api::ApiResult;
    use async_trait::async_trait;
    use ce_contents_client::{ContentsError, HttpError};
    use ce_domain_types::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Listing-only host: directory path -> entries
    #[derive(Default)]
    struct Listings {
        dirs: HashMap<String, Vec<DirectoryEntry>>,
        listed: Mutex<Vec<String>>,
    }

    impl Listings {
        fn add(&mut self, dir: &str, files: &[&str], subdirs: &[&str]) {
            let join = |name: &str| {
                if dir.is_empty() {
                    name.to_string()
                } else {
                    format!("{dir}/{name}")
                }
            };
            let mut entries: Vec<DirectoryEntry> = files
                .iter()
                .map(|f| DirectoryEntry {
                    name: f.to_string(),
                    path: join(f),
                    version: VersionToken::new("x"),
                    size: 1,
                    kind: EntryKind::File,
                })
                .collect();
            entries.extend(subdirs.iter().map(|d| DirectoryEntry {
                name: d.to_string(),
                path: join(d),
                version: VersionToken::new("x"),
                size: 0,
                kind: EntryKind::Dir,
            }));
            self.dirs.insert(dir.to_string(), entries);
        }
    }

    fn not_found() -> ContentsError {
        ContentsError::Http(HttpError {
            status: 404,
            status_text: "Not Found".into(),
            body: String::new(),
        })
    }

    #[async_trait]
    impl ContentsApi for Listings {
        async fn read_text(&self, _: &RepositoryContext, _: &str) -> ApiResult<FileText> {
            Err(not_found())
        }

        async fn put_text(
            &self,
            _: &RepositoryContext,
            _: &str,
            _: &str,
            _: &str,
            _: Option<&VersionToken>,
        ) -> ApiResult<WriteOutcome> {
            Err(not_found())
        }

        async fn delete_file(
            &self,
            _: &RepositoryContext,
            _: &str,
            _: &str,
            _: &VersionToken,
        ) -> ApiResult<()> {
            Err(not_found())
        }

        async fn list_directory(
            &self,
            _: &RepositoryContext,
            path: &str,
        ) -> ApiResult<Vec<DirectoryEntry>> {
            self.listed.lock().unwrap().push(path.to_string());
            self.dirs.get(path).cloned().ok_or_else(not_found)
        }

        async fn list_accessible_repositories(
            &self,
            _: usize,
        ) -> ApiResult<Vec<RepositorySummary>> {
            Ok(Vec::new())
        }

        async fn current_user(&self) -> ApiResult<AuthenticatedUser> {
            Err(not_found())
        }
    }

    fn ctx() -> RepositoryContext {
        RepositoryContext::new("octo", "notes", "main")
    }

    /// a0/a1/a2/a3/a4/a5, each level holding one file
    fn deep() -> Listings {
        let mut host = Listings::default();
        let mut dir = String::new();
        for level in 0..6 {
            let name = format!("a{level}");
            let file = format!("f{level}.md");
            host.add(&dir, &[file.as_str()], &[name.as_str()]);
            dir = if dir.is_empty() { name } else { format!("{dir}/{name}") };
        }
        host.add(&dir, &["leaf.md"], &[]);
        host
    }

    #[tokio::test]
    async fn test_breadth_first_within_bounds() {
        let mut host = Listings::default();
        host.add("", &["README.md"], &["docs", "src"]);
        host.add("docs", &["guide.md"], &[]);
        host.add("src", &["main.rs", "lib.rs"], &[]);

        let index = index_repository(&host, &ctx(), SearchConfig::default()).await.unwrap();
        assert_eq!(
            index.files,
            vec!["README.md", "docs/guide.md", "src/main.rs", "src/lib.rs"]
        );
        assert!(!index.truncated);
        assert_eq!(*host.listed.lock().unwrap(), vec!["", "docs", "src"]);
    }

    #[tokio::test]
    async fn test_max_depth() {
        let host = deep();
        let config = SearchConfig {
            max_depth: 2,
            max_files: 500,
        };

        let index = index_repository(&host, &ctx(), config).await.unwrap();
        assert_eq!(index.files, vec!["f0.md", "a0/f1.md", "a0/a1/f2.md"]);
        assert!(index.truncated);
        assert_eq!(host.listed.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_max_files() {
        let host = deep();
        let config = SearchConfig {
            max_depth: 10,
            max_files: 4,
        };

        let index = index_repository(&host, &ctx(), config).await.unwrap();
        assert_eq!(index.files.len(), 4);
        assert!(index.truncated);
        assert_eq!(index.files[3], "a0/a1/a2/f3.md");
        // No listing past the one that filled the index
        assert_eq!(
            *host.listed.lock().unwrap(),
            vec!["", "a0", "a0/a1", "a0/a1/a2"]
        );
    }

    #[tokio::test]
    async fn test_exact_fit_is_not_truncated() {
        let mut host = Listings::default();
        host.add("", &["README.md"], &["docs"]);
        host.add("docs", &["guide.md"], &[]);
        let config = SearchConfig {
            max_depth: 10,
            max_files: 2,
        };

        let index = index_repository(&host, &ctx(), config).await.unwrap();
        assert_eq!(index.files, vec!["README.md", "docs/guide.md"]);
        assert!(!index.truncated);

        host.add("docs", &["guide.md"], &["api"]);
        host.add("docs/api", &[], &[]);
        let index = index_repository(&host, &ctx(), config).await.unwrap();
        assert!(index.truncated);
        assert!(!host.listed.lock().unwrap().contains(&"docs/api".to_string()));
    }

    #[tokio::test]
    async fn test_failed_subdirectory_is_skipped_but_root_fails() {
        let mut host = Listings::default();
        host.add("", &["a.md"], &["gone"]);
        let index = index_repository(&host, &ctx(), SearchConfig::default()).await.unwrap();
        assert_eq!(index.files, vec!["a.md"]);

        let empty = Listings::default();
        let err = index_repository(&empty, &ctx(), SearchConfig::default()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_matching() {
        let index = FileIndex {
            files: vec!["docs/Guide.md".into(), "src/main.rs".into()],
            truncated: false,
        };
        assert_eq!(index.matching("guide"), vec!["docs/Guide.md"]);
        assert_eq!(index.matching("").len(), 2);
    }
}
