//! Postgres implementation of [`ForumStore`].
//!
//! Queries are plain `sqlx::query` calls wrapped in `db.query` spans. Reply
//! writes run in a transaction together with the parent post's last-replied
//! update. Schema lives in `sql/schema.sql`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{Instrument, info_span};

use super::{
    ForumStore, NewPost, NewReply, NewUser, Post, PostDetail, PostOrder, PostQuery, PostSummary,
    Reply, ReplySummary, StoreError, User,
};

const POST_SUMMARY_COLUMNS: &str = r"
    p.id, p.user_id, u.nickname, p.title, p.content,
    p.last_replied_user_id, lu.nickname AS last_replied_nickname,
    p.last_replied_time, p.created, p.updated
";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_span(operation: &'static str, statement: &str) -> tracing::Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == "23505")
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == "23503")
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        credential: row.try_get("credential")?,
        nickname: row.try_get("nickname")?,
        mobile: row.try_get("mobile")?,
        url: row.try_get("url")?,
        magic_number: row.try_get("magic_number")?,
        created: row.try_get("created")?,
        updated: row.try_get("updated")?,
    })
}

fn post_from_row(row: &PgRow) -> Result<Post, sqlx::Error> {
    Ok(Post {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        last_replied_user_id: row.try_get("last_replied_user_id")?,
        last_replied_time: row.try_get("last_replied_time")?,
        created: row.try_get("created")?,
        updated: row.try_get("updated")?,
    })
}

fn post_summary_from_row(row: &PgRow) -> Result<PostSummary, sqlx::Error> {
    Ok(PostSummary {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        nickname: row.try_get("nickname")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        last_replied_user_id: row.try_get("last_replied_user_id")?,
        last_replied_nickname: row.try_get("last_replied_nickname")?,
        last_replied_time: row.try_get("last_replied_time")?,
        created: row.try_get("created")?,
        updated: row.try_get("updated")?,
    })
}

fn reply_from_row(row: &PgRow) -> Result<Reply, sqlx::Error> {
    Ok(Reply {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        post_id: row.try_get("post_id")?,
        reply_id: row.try_get("reply_id")?,
        content: row.try_get("content")?,
        created: row.try_get("created")?,
        updated: row.try_get("updated")?,
    })
}

fn reply_summary_from_row(row: &PgRow) -> Result<ReplySummary, sqlx::Error> {
    Ok(ReplySummary {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        nickname: row.try_get("nickname")?,
        post_id: row.try_get("post_id")?,
        reply_id: row.try_get("reply_id")?,
        content: row.try_get("content")?,
        created: row.try_get("created")?,
        updated: row.try_get("updated")?,
    })
}

#[async_trait]
impl ForumStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let query = "SELECT 1";
        sqlx::query(query)
            .execute(&self.pool)
            .instrument(db_span("SELECT", query))
            .await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<i64, StoreError> {
        let query = r"
            INSERT INTO users (username, credential, nickname, mobile, url, magic_number)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
        ";
        let row = sqlx::query(query)
            .bind(&user.username)
            .bind(&user.credential)
            .bind(&user.nickname)
            .bind(&user.mobile)
            .bind(&user.url)
            .bind(user.magic_number)
            .fetch_one(&self.pool)
            .instrument(db_span("INSERT", query))
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    StoreError::Conflict("username already exists")
                } else {
                    StoreError::Database(err)
                }
            })?;
        Ok(row.try_get("id")?)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let query = "SELECT * FROM users WHERE id = $1";
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", query))
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let query = "SELECT * FROM users WHERE username = $1";
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", query))
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<(Vec<PostSummary>, i64), StoreError> {
        let order = match query.order {
            PostOrder::Updated => "p.updated DESC, p.id DESC",
            PostOrder::LastReplied => "p.last_replied_time DESC, p.id DESC",
        };
        let select = format!(
            r"
            SELECT {POST_SUMMARY_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.user_id
            JOIN users lu ON lu.id = p.last_replied_user_id
            WHERE ($1::BIGINT IS NULL OR p.user_id = $1)
            ORDER BY {order}
            LIMIT $2 OFFSET $3
            "
        );
        let rows = sqlx::query(&select)
            .bind(query.user_id)
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&self.pool)
            .instrument(db_span("SELECT", &select))
            .await?;
        let posts = rows
            .iter()
            .map(post_summary_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let count = "SELECT COUNT(*) AS total FROM posts WHERE ($1::BIGINT IS NULL OR user_id = $1)";
        let total: i64 = sqlx::query(count)
            .bind(query.user_id)
            .fetch_one(&self.pool)
            .instrument(db_span("SELECT", count))
            .await?
            .try_get("total")?;

        Ok((posts, total))
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>, StoreError> {
        let query = "SELECT * FROM posts WHERE id = $1";
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", query))
            .await?;
        Ok(row.as_ref().map(post_from_row).transpose()?)
    }

    async fn post_detail(&self, id: i64) -> Result<Option<PostDetail>, StoreError> {
        let select = format!(
            r"
            SELECT {POST_SUMMARY_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.user_id
            JOIN users lu ON lu.id = p.last_replied_user_id
            WHERE p.id = $1
            "
        );
        let Some(row) = sqlx::query(&select)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", &select))
            .await?
        else {
            return Ok(None);
        };
        let post = post_summary_from_row(&row)?;

        let replies = r"
            SELECT r.id, r.user_id, u.nickname, r.post_id, r.reply_id, r.content, r.created, r.updated
            FROM replies r
            JOIN users u ON u.id = r.user_id
            WHERE r.post_id = $1
            ORDER BY r.created ASC, r.id ASC
        ";
        let rows = sqlx::query(replies)
            .bind(id)
            .fetch_all(&self.pool)
            .instrument(db_span("SELECT", replies))
            .await?;
        let replies = rows
            .iter()
            .map(reply_summary_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(PostDetail { post, replies }))
    }

    async fn create_post(&self, post: NewPost) -> Result<i64, StoreError> {
        let now: DateTime<Utc> = Utc::now();
        let query = r"
            INSERT INTO posts (user_id, title, content, last_replied_user_id, last_replied_time, created, updated)
            VALUES ($1, $2, $3, $1, $4, $4, $4)
            RETURNING id
        ";
        let row = sqlx::query(query)
            .bind(post.user_id)
            .bind(&post.title)
            .bind(&post.content)
            .bind(now)
            .fetch_one(&self.pool)
            .instrument(db_span("INSERT", query))
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    StoreError::MissingReference("posts.user_id")
                } else {
                    StoreError::Database(err)
                }
            })?;
        Ok(row.try_get("id")?)
    }

    async fn update_post(
        &self,
        id: i64,
        user_id: i64,
        title: &str,
        content: &str,
    ) -> Result<bool, StoreError> {
        let query = r"
            UPDATE posts SET title = $3, content = $4, updated = NOW()
            WHERE id = $1 AND user_id = $2
        ";
        let result = sqlx::query(query)
            .bind(id)
            .bind(user_id)
            .bind(title)
            .bind(content)
            .execute(&self.pool)
            .instrument(db_span("UPDATE", query))
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_reply(&self, id: i64) -> Result<Option<Reply>, StoreError> {
        let query = "SELECT * FROM replies WHERE id = $1";
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", query))
            .await?;
        Ok(row.as_ref().map(reply_from_row).transpose()?)
    }

    async fn create_reply(&self, reply: NewReply) -> Result<i64, StoreError> {
        let now: DateTime<Utc> = Utc::now();
        let mut tx = self.pool.begin().await?;

        let insert = r"
            INSERT INTO replies (user_id, post_id, reply_id, content, created, updated)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id
        ";
        let row = sqlx::query(insert)
            .bind(reply.user_id)
            .bind(reply.post_id)
            .bind(reply.reply_id)
            .bind(&reply.content)
            .bind(now)
            .fetch_one(&mut *tx)
            .instrument(db_span("INSERT", insert))
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    StoreError::MissingReference("replies")
                } else {
                    StoreError::Database(err)
                }
            })?;
        let id: i64 = row.try_get("id")?;

        let bump = r"
            UPDATE posts SET last_replied_user_id = $2, last_replied_time = $3
            WHERE id = $1
        ";
        sqlx::query(bump)
            .bind(reply.post_id)
            .bind(reply.user_id)
            .bind(now)
            .execute(&mut *tx)
            .instrument(db_span("UPDATE", bump))
            .await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn update_reply(
        &self,
        id: i64,
        user_id: i64,
        post_id: i64,
        content: &str,
    ) -> Result<bool, StoreError> {
        let now: DateTime<Utc> = Utc::now();
        let mut tx = self.pool.begin().await?;

        let update = r"
            UPDATE replies SET content = $4, updated = $5
            WHERE id = $1 AND user_id = $2 AND post_id = $3
        ";
        let result = sqlx::query(update)
            .bind(id)
            .bind(user_id)
            .bind(post_id)
            .bind(content)
            .bind(now)
            .execute(&mut *tx)
            .instrument(db_span("UPDATE", update))
            .await?;
        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let bump = r"
            UPDATE posts SET last_replied_user_id = $2, last_replied_time = $3
            WHERE id = $1
        ";
        sqlx::query(bump)
            .bind(post_id)
            .bind(user_id)
            .bind(now)
            .execute(&mut *tx)
            .instrument(db_span("UPDATE", bump))
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
