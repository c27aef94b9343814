//! Request and response shapes shared by the REST routes and the RPC procedures.
//!
//! Inputs are lenient at the serde layer (missing fields deserialize to empty
//! values) so that every malformed input is reported by the same validation
//! path with a readable message.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::TodoError;

/// Input of `createTodo` / `POST /api/todos`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub text: String,
}

/// Input of `toggleTodo` and `deleteTodo`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TodoId {
    pub id: i64,
}

/// Checks the id is a positive integer that fits the `todos.id` column.
pub(crate) fn parse_id(id: i64) -> Result<i32, TodoError> {
    if id <= 0 {
        return Err(TodoError::validation("id must be a positive integer"));
    }
    i32::try_from(id).map_err(|_| TodoError::validation("id is out of range"))
}

/// Parses a path segment such as the `:id` in `/api/todos/:id`.
impl FromStr for TodoId {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<i64>()
            .map_err(|_| TodoError::validation("id must be a positive integer"))?;
        parse_id(id)?;
        Ok(TodoId { id })
    }
}

/// Output of `deleteTodo`: a confirmation, not the deleted row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub message: String,
}

impl Default for Deleted {
    fn default() -> Self {
        Deleted {
            message: "Deleted".to_string(),
        }
    }
}

/// Username and password, for both registration and login.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /api/auth/google`: the ID token handed to the browser by Google.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleLogin {
    #[serde(default, alias = "idToken", alias = "token")]
    pub credential: String,
}

/// The public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i32,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl From<user::Model> for UserProfile {
    fn from(user: user::Model) -> Self {
        UserProfile {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// The typed procedures served under `/rpc/:procedure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    ListTodos,
    CreateTodo,
    ToggleTodo,
    DeleteTodo,
}

impl Procedure {
    pub const ALL: [Procedure; 4] = [
        Procedure::ListTodos,
        Procedure::CreateTodo,
        Procedure::ToggleTodo,
        Procedure::DeleteTodo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Procedure::ListTodos => "listTodos",
            Procedure::CreateTodo => "createTodo",
            Procedure::ToggleTodo => "toggleTodo",
            Procedure::DeleteTodo => "deleteTodo",
        }
    }
}

impl FromStr for Procedure {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Procedure::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or(TodoError::NotFound)
    }
}
