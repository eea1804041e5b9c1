//! Port abstraction for the read-only tag catalogue.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::tag::Tag;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by tag repository adapters.
    pub enum TagPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "tag repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "tag repository query failed: {message}",
    }
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    /// All tags ordered by id.
    async fn list(&self) -> Result<Vec<Tag>, TagPersistenceError>;

    /// Fetch one tag by id.
    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, TagPersistenceError>;

    /// Fetch the subset of `ids` that exist, in id order.
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Tag>, TagPersistenceError>;
}

/// In-memory `TagRepository` used by handler tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryTagRepository {
    tags: Mutex<Vec<Tag>>,
}

impl InMemoryTagRepository {
    /// Pre-populate the catalogue.
    pub fn with_tags(tags: Vec<Tag>) -> Self {
        Self {
            tags: Mutex::new(tags),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Tag>> {
        self.tags
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TagRepository for InMemoryTagRepository {
    async fn list(&self) -> Result<Vec<Tag>, TagPersistenceError> {
        let mut tags = self.lock().clone();
        tags.sort_by_key(|tag| tag.id);
        Ok(tags)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, TagPersistenceError> {
        Ok(self.lock().iter().find(|tag| tag.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Tag>, TagPersistenceError> {
        let mut matched: Vec<Tag> = self
            .lock()
            .iter()
            .filter(|tag| ids.contains(&tag.id))
            .cloned()
            .collect();
        matched.sort_by_key(|tag| tag.id);
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tag(id: i32, name: &str, color: &str, slug: &str) -> Tag {
        Tag::try_from_parts(id, name, color, slug).expect("valid tag")
    }

    #[rstest]
    #[tokio::test]
    async fn find_by_ids_skips_missing_tags() {
        let repo = InMemoryTagRepository::with_tags(vec![
            tag(1, "Breakfast", "#49B64E", "breakfast"),
            tag(2, "Dinner", "#3333FF", "dinner"),
        ]);
        let matched = repo.find_by_ids(&[2, 7]).await.expect("query");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].slug.as_ref(), "dinner");
    }
}
