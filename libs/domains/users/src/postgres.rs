use async_trait::async_trait;
use database::postgres::check_health;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait, QueryOrder, Statement,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{UserError, UserResult},
    models::{NewUser, User, UserChanges},
    repository::UserRepository,
};

/// PostgreSQL implementation of UserRepository using SeaORM
#[derive(Clone)]
pub struct PostgresUserRepository {
    db: DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Unique violations on `users.email` surface as a conflict
fn map_write_err(err: DbErr, email: Option<&str>) -> UserError {
    let err_str = err.to_string();
    match email {
        Some(email)
            if err_str.contains("duplicate key") || err_str.contains("unique constraint") =>
        {
            UserError::DuplicateEmail(email.to_string())
        }
        _ => UserError::Storage(format!("Database error: {}", err)),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, input: NewUser) -> UserResult<User> {
        let email = input.email.clone();
        let active_model: entity::ActiveModel = User::new(input).into();

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err(e, Some(&email)))?;

        tracing::info!(user_id = %model.id, "Created user");
        Ok(model.into())
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Name)
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT * FROM users WHERE LOWER(email) = LOWER($1) LIMIT 1",
            [email.into()],
        );

        let model = entity::Entity::find().from_raw_sql(stmt).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> UserResult<Option<User>> {
        let Some(model) = entity::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        if changes == UserChanges::default() {
            return Ok(Some(model.into()));
        }

        let email = changes.email.clone();
        let mut active_model: entity::ActiveModel = model.into();
        if let Some(name) = changes.name {
            active_model.name = Set(name);
        }
        if let Some(email) = changes.email {
            active_model.email = Set(email);
        }
        if let Some(hash) = changes.password_hash {
            active_model.password_hash = Set(hash);
        }
        if let Some(bio) = changes.bio {
            active_model.bio = Set(bio);
        }
        if let Some(contact) = changes.contact {
            active_model.contact = Set(contact);
        }
        if let Some(module) = changes.module {
            active_model.module = Set(module);
        }

        let updated = active_model
            .update(&self.db)
            .await
            .map_err(|e| map_write_err(e, email.as_deref()))?;

        tracing::info!(user_id = %id, "Updated user");
        Ok(Some(updated.into()))
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(user_id = %id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn health_check(&self) -> UserResult<()> {
        check_health(&self.db)
            .await
            .map_err(|e| UserError::Storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction};

    fn model(email: &str) -> entity::Model {
        entity::Model {
            id: Uuid::new_v4(),
            name: "Ada Lovelace".into(),
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
            bio: None,
            contact: "2025550143".into(),
            module: "analytics".into(),
        }
    }

    #[tokio::test]
    async fn test_create_inserts_and_returns_user() {
        let stored = model("ada@example.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored.clone()]])
            .into_connection();
        let repo = PostgresUserRepository::new(db);

        let user = repo
            .create(NewUser {
                name: stored.name.clone(),
                email: stored.email.clone(),
                password_hash: stored.password_hash.clone(),
                bio: None,
                contact: stored.contact.clone(),
                module: stored.module.clone(),
            })
            .await
            .unwrap();

        assert_eq!(user.id, stored.id);
        assert_eq!(user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_unique_violation_maps_to_duplicate_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom(
                "duplicate key value violates unique constraint \"users_email_key\"".into(),
            )])
            .into_connection();
        let repo = PostgresUserRepository::new(db);

        let err = repo
            .create(NewUser {
                name: "Ada Lovelace".into(),
                email: "ada@example.com".into(),
                password_hash: "h".into(),
                bio: None,
                contact: "2025550143".into(),
                module: "analytics".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::DuplicateEmail(ref e) if e == "ada@example.com"));
    }

    #[tokio::test]
    async fn test_find_by_email_compares_lowercased() {
        let stored = model("Ada@Example.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored.clone()]])
            .into_connection();
        let repo = PostgresUserRepository::new(db);

        let found = repo.find_by_email("ada@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(stored.id));

        let log = repo.db.into_transaction_log();
        assert_eq!(
            log,
            vec![Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                "SELECT * FROM users WHERE LOWER(email) = LOWER($1) LIMIT 1",
                ["ada@example.com".into()],
            )]
        );
    }

    #[tokio::test]
    async fn test_find_by_id_missing_is_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PostgresUserRepository::new(db);

        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_reads_then_writes() {
        let stored = model("ada@example.com");
        let mut renamed = stored.clone();
        renamed.name = "Grace Hopper".into();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored.clone()], vec![renamed.clone()]])
            .into_connection();
        let repo = PostgresUserRepository::new(db);

        let updated = repo
            .update(
                stored.id,
                UserChanges {
                    name: Some("Grace Hopper".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Grace Hopper");
        assert_eq!(updated.email, stored.email);
        assert_eq!(repo.db.into_transaction_log().len(), 2);
    }

    #[tokio::test]
    async fn test_update_missing_user_skips_write() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PostgresUserRepository::new(db);

        let result = repo
            .update(
                Uuid::new_v4(),
                UserChanges {
                    name: Some("Grace Hopper".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(repo.db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_reports_rows_affected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let repo = PostgresUserRepository::new(db);

        assert!(repo.delete(Uuid::new_v4()).await.unwrap());
        assert!(!repo.delete(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_storage_errors_propagate() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".into())])
            .into_connection();
        let repo = PostgresUserRepository::new(db);

        let err = repo.find_all().await.unwrap_err();
        assert!(matches!(err, UserError::Storage(_)));
    }

    #[tokio::test]
    async fn test_health_check_fails_when_database_is_down() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection refused".into())])
            .into_connection();
        let repo = PostgresUserRepository::new(db);

        let err = repo.health_check().await.unwrap_err();
        assert!(matches!(err, UserError::Storage(msg) if msg.contains("connection refused")));
    }
}
