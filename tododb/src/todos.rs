//! Owner-scoped task CRUD.
//!
//! Every operation takes the id of the authenticated owner. Rows belonging to
//! somebody else behave exactly like rows that do not exist.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, Set, Statement,
};

use crate::connection::TodoDb;
use crate::contract::{Deleted, parse_id};
use crate::entity::todo;
use crate::error::{Result, TodoError};

#[derive(Clone)]
pub struct TodoStore {
    db: TodoDb,
}

impl TodoStore {
    pub fn new(db: TodoDb) -> Self {
        Self { db }
    }

    /// All tasks of `owner`, oldest first.
    pub async fn list(&self, owner: i32) -> Result<Vec<todo::Model>> {
        let todos = todo::Entity::find()
            .filter(todo::Column::UserId.eq(owner))
            .order_by_asc(todo::Column::Id)
            .all(self.db.inner())
            .await?;
        Ok(todos)
    }

    /// Insert a new, not yet done task. `text` is trimmed and must not end up empty.
    pub async fn create(&self, owner: i32, text: &str) -> Result<todo::Model> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TodoError::validation("text is required"));
        }

        let new_todo = todo::ActiveModel {
            text: Set(text.to_string()),
            done: Set(false),
            user_id: Set(Some(owner)),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let inserted = new_todo.insert(self.db.inner()).await?;
        log::debug!("User {owner} created todo {}", inserted.id);
        Ok(inserted)
    }

    /// Flip `done` with a single `NOT done` statement, so concurrent toggles
    /// never lose an update.
    pub async fn toggle(&self, owner: i32, id: i64) -> Result<todo::Model> {
        let id = parse_id(id)?;
        let conn = self.db.inner();

        let updated = todo::Model::find_by_statement(Statement::from_sql_and_values(
            conn.get_database_backend(),
            "UPDATE todos SET done = NOT done
             WHERE id = $1 AND user_id = $2
             RETURNING id, text, done, user_id, created_at",
            [id.into(), owner.into()],
        ))
        .one(conn)
        .await?;

        updated.ok_or(TodoError::NotFound)
    }

    /// Remove a task. Reports [`TodoError::NotFound`] when nothing matched.
    pub async fn delete(&self, owner: i32, id: i64) -> Result<Deleted> {
        let id = parse_id(id)?;

        let result = todo::Entity::delete_many()
            .filter(todo::Column::Id.eq(id))
            .filter(todo::Column::UserId.eq(owner))
            .exec(self.db.inner())
            .await?;

        if result.rows_affected == 0 {
            return Err(TodoError::NotFound);
        }
        log::debug!("User {owner} deleted todo {id}");
        Ok(Deleted::default())
    }
}
