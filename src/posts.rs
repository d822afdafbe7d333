//! Post and thread persistence.
//!
//! Threads are posts without a parent. Replies always point at the root
//! thread: replying to a reply files the new post under that reply's thread.

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use crate::entity::{post, user};
use crate::principal::Principal;

#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub anonymous: bool,
}

impl NewPost {
    /// Trims the fields and rejects empty ones.
    pub fn validated(self) -> Result<Self, &'static str> {
        let title = self.title.trim().to_string();
        let body = self.body.trim().to_string();
        if title.is_empty() {
            return Err("title must not be empty");
        }
        if body.is_empty() {
            return Err("body must not be empty");
        }
        Ok(Self {
            title,
            body,
            anonymous: self.anonymous,
        })
    }
}

/// What clients see of a post. `author` is withheld for anonymous posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostView {
    pub id: i32,
    pub thread_id: Option<i32>,
    pub title: String,
    pub body: String,
    pub anonymous: bool,
    pub author: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

impl PostView {
    fn from_row((post, author): (post::Model, Option<user::Model>)) -> Self {
        let author = if post.anonymous {
            None
        } else {
            author.map(|u| u.display_name())
        };
        Self {
            id: post.id,
            thread_id: post.thread_id,
            title: post.title,
            body: post.body,
            anonymous: post.anonymous,
            author,
            created_at: post.created_at,
        }
    }
}

/// A thread with its replies, oldest reply first.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadView {
    #[serde(flatten)]
    pub post: PostView,
    pub replies: Vec<PostView>,
}

#[derive(Debug, Clone)]
pub struct PostRepository {
    conn: DatabaseConnection,
}

impl PostRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create_thread(
        &self,
        author: &Principal,
        post: NewPost,
    ) -> Result<PostView, DbErr> {
        self.insert(author, None, post).await
    }

    /// Adds a reply under `parent_id`'s thread. `None` when the parent does
    /// not exist.
    pub async fn reply(
        &self,
        author: &Principal,
        parent_id: i32,
        post: NewPost,
    ) -> Result<Option<PostView>, DbErr> {
        let Some(parent) = post::Entity::find_by_id(parent_id).one(&self.conn).await? else {
            return Ok(None);
        };
        let thread_id = parent.thread_id.unwrap_or(parent.id);
        self.insert(author, Some(thread_id), post).await.map(Some)
    }

    /// A post with its replies when it is a thread. A reply is returned on
    /// its own.
    pub async fn find(&self, id: i32) -> Result<Option<ThreadView>, DbErr> {
        let Some(row) = post::Entity::find_by_id(id)
            .find_also_related(user::Entity)
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let replies = if row.0.is_thread() {
            post::Entity::find()
                .filter(post::Column::ThreadId.eq(id))
                .find_also_related(user::Entity)
                .order_by_asc(post::Column::CreatedAt)
                .order_by_asc(post::Column::Id)
                .all(&self.conn)
                .await?
                .into_iter()
                .map(PostView::from_row)
                .collect()
        } else {
            Vec::new()
        };

        Ok(Some(ThreadView {
            post: PostView::from_row(row),
            replies,
        }))
    }

    /// Most recent threads first.
    pub async fn threads(&self, limit: u64) -> Result<Vec<PostView>, DbErr> {
        let rows = post::Entity::find()
            .filter(post::Column::ThreadId.is_null())
            .find_also_related(user::Entity)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(PostView::from_row).collect())
    }

    /// Posts whose title or body contains `query`, newest first.
    pub async fn search(&self, query: &str, limit: u64) -> Result<Vec<PostView>, DbErr> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let rows = post::Entity::find()
            .filter(
                Condition::any()
                    .add(post::Column::Title.contains(query))
                    .add(post::Column::Body.contains(query)),
            )
            .find_also_related(user::Entity)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(PostView::from_row).collect())
    }

    async fn insert(
        &self,
        author: &Principal,
        thread_id: Option<i32>,
        post: NewPost,
    ) -> Result<PostView, DbErr> {
        let created = post::ActiveModel {
            user_id: Set(author.user_id),
            thread_id: Set(thread_id),
            title: Set(post.title),
            body: Set(post.body),
            anonymous: Set(post.anonymous),
            created_at: Set(chrono::Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        tracing::debug!(post_id = created.id, ?thread_id, login = %author.login, "post created");
        let author_name = (!created.anonymous).then(|| author.display_name.clone());
        Ok(PostView {
            author: author_name,
            ..PostView::from_row((created, None))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::SeaOrmCredentialStore;
    use crate::test_support::{memory_db, register};

    fn new_post(title: &str, anonymous: bool) -> NewPost {
        NewPost {
            title: title.to_string(),
            body: format!("{title} body"),
            anonymous,
        }
    }

    #[tokio::test]
    async fn replies_attach_to_root_thread() {
        let db = memory_db().await;
        let author = register(&SeaOrmCredentialStore::new(db.clone()), "cwl1", "pw").await;
        let posts = PostRepository::new(db);

        let thread = posts
            .create_thread(&author, new_post("Sunny Days", false))
            .await
            .unwrap();
        let reply = posts
            .reply(&author, thread.id, new_post("Agreed", false))
            .await
            .unwrap()
            .unwrap();
        let nested = posts
            .reply(&author, reply.id, new_post("Me too", true))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(reply.thread_id, Some(thread.id));
        assert_eq!(nested.thread_id, Some(thread.id));
        assert!(posts
            .reply(&author, 999, new_post("Lost", false))
            .await
            .unwrap()
            .is_none());

        let found = posts.find(thread.id).await.unwrap().unwrap();
        assert_eq!(found.post.author.as_deref(), Some("Test cwl1"));
        let titles: Vec<_> = found.replies.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Agreed", "Me too"]);
        assert_eq!(found.replies[1].author, None);
    }

    #[tokio::test]
    async fn threads_and_search() {
        let db = memory_db().await;
        let author = register(&SeaOrmCredentialStore::new(db.clone()), "cwl1", "pw").await;
        let posts = PostRepository::new(db);

        let surfing = posts
            .create_thread(&author, new_post("Surfing", false))
            .await
            .unwrap();
        posts
            .create_thread(&author, new_post("Rock Pooling", false))
            .await
            .unwrap();
        posts
            .reply(&author, surfing.id, new_post("Surfing is cold", false))
            .await
            .unwrap();

        let threads = posts.threads(10).await.unwrap();
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].title, "Rock Pooling");

        let hits = posts.search("Surf", 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(posts.search("   ", 10).await.unwrap().is_empty());
    }

    #[test]
    fn validation_trims_and_rejects_blanks() {
        let ok = NewPost {
            title: "  Hi ".to_string(),
            body: " there ".to_string(),
            anonymous: false,
        }
        .validated()
        .unwrap();
        assert_eq!((ok.title.as_str(), ok.body.as_str()), ("Hi", "there"));

        assert!(NewPost {
            title: " ".to_string(),
            body: "x".to_string(),
            anonymous: false,
        }
        .validated()
        .is_err());
    }
}
