//! Table descriptors shared by unit tests.

use crate::expr::Expr;
use crate::schema::{ColumnDef, ColumnKey, Draft, Table, TableRef, TableSchema};
use crate::value::{Value, ValueKind};
use chrono::{DateTime, NaiveDateTime, Utc};

const USER_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", ValueKind::Int8).primary_key(),
    ColumnDef::new("name", ValueKind::Text),
    ColumnDef::new("email", ValueKind::Text).nullable(),
    ColumnDef::new("deleted_at", ValueKind::Timestamp).nullable(),
    ColumnDef::new("created_at", ValueKind::TimestampTz).read_only(),
];

pub static USERS: TableSchema = TableSchema::new("users")
    .in_schema("public")
    .with_columns(USER_COLUMNS)
    .with_baseline(not_deleted);

pub const ID: ColumnKey<i64> = ColumnKey::new(0);
pub const NAME: ColumnKey<String> = ColumnKey::new(1);
pub const EMAIL: ColumnKey<Option<String>> = ColumnKey::new(2);
pub const DELETED_AT: ColumnKey<Option<NaiveDateTime>> = ColumnKey::new(3);
pub const CREATED_AT: ColumnKey<DateTime<Utc>> = ColumnKey::new(4);

fn not_deleted(t: &TableRef) -> Expr<bool> {
    t.col(DELETED_AT).is_null()
}

const POST_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", ValueKind::Int8).primary_key(),
    ColumnDef::new("user_id", ValueKind::Int8),
    ColumnDef::new("title", ValueKind::Text),
];

pub static POSTS: TableSchema = TableSchema::new("posts").with_columns(POST_COLUMNS);

pub const POST_ID: ColumnKey<i64> = ColumnKey::new(0);
pub const POST_USER_ID: ColumnKey<i64> = ColumnKey::new(1);
pub const TITLE: ColumnKey<String> = ColumnKey::new(2);

const TAG_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("post_id", ValueKind::Int8).primary_key(),
    ColumnDef::new("tag", ValueKind::Text).primary_key(),
    ColumnDef::new("weight", ValueKind::Int4),
];

pub static TAGS: TableSchema = TableSchema::new("post_tags").with_columns(TAG_COLUMNS);

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
}

impl Table for User {
    fn schema() -> &'static TableSchema {
        &USERS
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into(),
            self.name.clone().into(),
            self.email.clone().into(),
            Value::Null,
            Value::Null,
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub id: Option<i64>,
    pub name: String,
    pub email: Option<String>,
}

impl NewUser {
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            email: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

impl Draft for NewUser {
    type Row = User;
    type Key = i64;

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into(),
            self.name.clone().into(),
            self.email.clone().into(),
            Value::Null,
            Value::Null,
        ]
    }

    fn into_row(self, key: i64) -> User {
        User {
            id: key,
            name: self.name,
            email: self.email,
        }
    }

    fn from_row(row: User) -> Self {
        Self {
            id: Some(row.id),
            name: row.name,
            email: row.email,
        }
    }
}
