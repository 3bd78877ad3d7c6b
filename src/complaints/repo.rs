use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Complaint {
    pub id: i64,
    pub text: String,
    pub is_closed: bool,
    pub owner_id: i64,
}

impl Complaint {
    pub async fn create<'e, E>(db: E, text: &str, owner_id: i64) -> anyhow::Result<Complaint>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let complaint = sqlx::query_as::<_, Complaint>(
            r#"
            INSERT INTO complaints (text, owner_id)
            VALUES (?, ?)
            RETURNING id, text, is_closed, owner_id
            "#,
        )
        .bind(text)
        .bind(owner_id)
        .fetch_one(db)
        .await
        .context("insert complaint")?;
        Ok(complaint)
    }

    /// All complaints owned by `owner_id`, oldest first.
    pub async fn list_by_owner<'e, E>(db: E, owner_id: i64) -> anyhow::Result<Vec<Complaint>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, Complaint>(
            r#"
            SELECT id, text, is_closed, owner_id
            FROM complaints
            WHERE owner_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(db)
        .await
        .context("list complaints by owner")?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::User;
    use crate::state::test_pool;

    #[tokio::test]
    async fn created_complaints_default_to_open() {
        let db = test_pool().await;
        let owner = User::create(&db, "a@x.com", "pw1").await.expect("user");
        let c = Complaint::create(&db, "leak", owner.id).await.expect("complaint");
        assert_eq!(c.text, "leak");
        assert_eq!(c.owner_id, owner.id);
        assert!(!c.is_closed);
    }

    #[tokio::test]
    async fn listing_is_scoped_to_owner() {
        let db = test_pool().await;
        let alice = User::create(&db, "alice@x.com", "pw").await.expect("alice");
        let bob = User::create(&db, "bob@x.com", "pw").await.expect("bob");

        let first = Complaint::create(&db, "noise", alice.id).await.expect("c1");
        Complaint::create(&db, "smell", bob.id).await.expect("c2");
        let third = Complaint::create(&db, "heat", alice.id).await.expect("c3");

        let listed = Complaint::list_by_owner(&db, alice.id).await.expect("list");
        assert_eq!(listed, vec![first, third]);

        let listed = Complaint::list_by_owner(&db, bob.id).await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].text, "smell");
    }

    #[tokio::test]
    async fn owner_must_exist() {
        let db = test_pool().await;
        assert!(Complaint::create(&db, "orphan", 999).await.is_err());
    }
}
