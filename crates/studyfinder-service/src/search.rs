//! Search/listing service — free-text search over group listings.

use std::collections::HashSet;

use studyfinder_core::FinderResult;
use studyfinder_core::models::group::GroupDetails;
use studyfinder_core::repository::GroupRepository;
use tracing::warn;

use crate::feed::Feed;

pub struct SearchService<G: GroupRepository> {
    group_repo: G,
}

impl<G: GroupRepository> SearchService<G> {
    pub fn new(group_repo: G) -> Self {
        Self { group_repo }
    }

    /// Default search: the union variant, matching name, bio, and
    /// subject tags.
    pub async fn search(&self, query: &str) -> Feed {
        self.search_with(query, true).await
    }

    /// Case-insensitive substring search over name and bio, optionally
    /// extended to subject tags.
    ///
    /// Blank queries return an empty feed without touching the store.
    /// Store failures degrade to an empty feed, logged and flagged.
    pub async fn search_with(&self, query: &str, include_subjects: bool) -> Feed {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Feed::default();
        }

        match self.run(trimmed, include_subjects).await {
            Ok(groups) => Feed {
                groups,
                degraded: false,
            },
            Err(e) => {
                warn!(error = %e, query = trimmed, "search failed; serving empty feed");
                Feed {
                    groups: Vec::new(),
                    degraded: true,
                }
            }
        }
    }

    async fn run(
        &self,
        query: &str,
        include_subjects: bool,
    ) -> FinderResult<Vec<GroupDetails>> {
        // Name/bio containment is pushed to the store.
        let by_text = self.group_repo.search_name_bio(query).await?;
        if !include_subjects {
            return Ok(by_text);
        }

        // Subject tags are matched in memory over a full listing.
        let needle = query.to_lowercase();
        let by_subject = self
            .group_repo
            .list_all()
            .await?
            .into_iter()
            .filter(|g| {
                g.group
                    .subjects
                    .iter()
                    .any(|s| s.to_lowercase().contains(&needle))
            });

        // Merge keyed by group id so a group matching on several fields
        // is listed once, then re-sort newest first.
        let mut seen = HashSet::new();
        let mut merged: Vec<GroupDetails> = Vec::new();
        for group in by_text.into_iter().chain(by_subject) {
            if seen.insert(group.group.id) {
                merged.push(group);
            }
        }
        merged.sort_by(|a, b| b.group.created_at.cmp(&a.group.created_at));

        Ok(merged)
    }
}
