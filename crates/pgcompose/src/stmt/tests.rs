use super::*;
use crate::expr::Expr;
use crate::fixtures::{
    EMAIL, ID, NAME, NewUser, POST_ID, POST_USER_ID, POSTS, TAGS, TITLE, USERS, User,
};
use crate::predicate::Where;
use crate::schema::{ColumnDef, ColumnKey, TableSchema};
use crate::value::ValueKind;

// ==================== SELECT ====================

#[test]
fn select_defaults_to_all_columns_with_baseline() {
    let users = USERS.table();
    assert_eq!(
        Select::from(&users).to_sql(),
        concat!(
            r#"SELECT "users"."id", "users"."name", "users"."email", "users"."deleted_at", "users"."created_at""#,
            "\n",
            r#"FROM "public"."users""#,
            "\n",
            r#"WHERE ("users"."deleted_at") IS NULL"#,
        )
    );
}

#[test]
fn select_filter_is_anded_after_baseline() {
    let users = USERS.table();
    let (sql, values) = Select::from(&users)
        .column(users.col(ID))
        .filter(users.col(NAME).eq("bob"))
        .build()
        .unwrap();
    assert_eq!(
        sql,
        concat!(
            r#"SELECT "users"."id""#,
            "\n",
            r#"FROM "public"."users""#,
            "\n",
            r#"WHERE (("users"."deleted_at") IS NULL) AND (("users"."name") = ($1))"#,
        )
    );
    assert_eq!(values, vec![Value::Text("bob".into())]);
}

#[test]
fn unscoped_select_skips_baseline() {
    let users = USERS.table();
    let sql = Select::from(&users).column(users.col(ID)).unscoped().to_sql();
    assert_eq!(sql, "SELECT \"users\".\"id\"\nFROM \"public\".\"users\"");
}

#[test]
fn empty_scope_matches_nothing() {
    let users = USERS.table();
    let sql = Select::from(&users)
        .column(users.col(ID))
        .filter(users.col(ID).eq(1_i64))
        .none()
        .to_sql();
    assert_eq!(
        sql,
        "SELECT \"users\".\"id\"\nFROM \"public\".\"users\"\nWHERE FALSE"
    );
}

#[test]
fn or_where_collapses_both_sides() {
    let posts = POSTS.table();
    let sql = Select::from(&posts)
        .column(posts.col(POST_ID))
        .filter(posts.col(POST_USER_ID).eq(1_i64))
        .or_where(Where::new().filter(posts.col(TITLE).eq("x")))
        .to_sql();
    assert_eq!(
        sql,
        concat!(
            r#"SELECT "posts"."id""#,
            "\n",
            r#"FROM "posts""#,
            "\n",
            r#"WHERE (("posts"."user_id") = ($1)) OR (("posts"."title") = ($2))"#,
        )
    );
}

#[test]
fn joined_table_baseline_goes_into_on() {
    let posts = POSTS.table();
    let users = USERS.table();
    let query = Select::from(&posts)
        .column(posts.col(TITLE))
        .column(users.col(NAME))
        .inner_join(&users, posts.col(POST_USER_ID).eq(users.col(ID)));
    assert_eq!(
        query.to_sql(),
        concat!(
            r#"SELECT "posts"."title", "users"."name""#,
            "\n",
            r#"FROM "posts""#,
            "\n",
            r#"INNER JOIN "public"."users" ON (("posts"."user_id") = ("users"."id")) AND (("users"."deleted_at") IS NULL)"#,
        )
    );

    let unscoped = query.unscoped().to_sql();
    assert!(unscoped.ends_with(r#"ON ("posts"."user_id") = ("users"."id")"#));
}

#[test]
fn duplicate_join_is_reported_on_build() {
    let users = USERS.table();
    let query = Select::from(&users).left_join(&USERS.table(), Expr::constant(true));
    assert_eq!(
        query.build().unwrap_err(),
        BuildError::DuplicateTable("users".to_string())
    );

    let aliased = Select::from(&users).left_join(&USERS.alias("u2"), Expr::constant(true));
    assert!(aliased.validate().is_ok());
}

#[test]
fn order_limit_offset_render_in_order() {
    let users = USERS.table();
    let (sql, values) = Select::from(&users)
        .column(users.col(ID))
        .unscoped()
        .order_by(users.col(NAME).asc().nulls_last())
        .order_by(users.col(ID).desc())
        .limit(10)
        .offset(20)
        .build()
        .unwrap();
    assert_eq!(
        sql,
        concat!(
            r#"SELECT "users"."id""#,
            "\n",
            r#"FROM "public"."users""#,
            "\n",
            r#"ORDER BY "users"."name" ASC NULLS LAST, "users"."id" DESC"#,
            "\nLIMIT $1\nOFFSET $2",
        )
    );
    assert_eq!(values, vec![Value::Int8(10), Value::Int8(20)]);
}

#[test]
fn distinct_and_group_by() {
    let posts = POSTS.table();
    let sql = Select::from(&posts)
        .column(posts.col(TITLE))
        .distinct()
        .to_sql();
    assert_eq!(sql, "SELECT DISTINCT \"posts\".\"title\"\nFROM \"posts\"");

    let grouped = Select::from(&posts)
        .column(posts.col(POST_USER_ID))
        .group_by(posts.col(POST_USER_ID))
        .having(Expr::<bool>::raw("count(*) > 1"))
        .to_sql();
    assert_eq!(
        grouped,
        concat!(
            r#"SELECT "posts"."user_id""#,
            "\n",
            r#"FROM "posts""#,
            "\n",
            r#"GROUP BY "posts"."user_id""#,
            "\nHAVING count(*) > 1",
        )
    );
}

#[test]
fn merged_clause_set_applies() {
    let posts = POSTS.table();
    let page = ClauseSet {
        limit: Some(5),
        ..ClauseSet::new()
    };
    let sql = Select::from(&posts)
        .column(posts.col(POST_ID))
        .merge(page)
        .to_sql();
    assert_eq!(sql, "SELECT \"posts\".\"id\"\nFROM \"posts\"\nLIMIT $1");
}

#[test]
fn build_rejects_too_many_params() {
    let users = USERS.table();
    let query = Select::from(&users)
        .unscoped()
        .filter(users.col(ID).in_list([1_i64, 2, 3]));
    let config = BuildConfig::new().with_max_params(2);
    assert_eq!(
        query.build_with(&config).unwrap_err(),
        BuildError::TooManyParams { count: 3, max: 2 }
    );
    assert!(query.build().is_ok());
}

#[test]
fn rendering_is_deterministic() {
    let users = USERS.table();
    let query = Select::from(&users).filter(users.col(NAME).like("a%"));
    assert_eq!(query.to_sql(), query.to_sql());
    assert_eq!(query.build().unwrap(), query.build().unwrap());
}

// ==================== Compound ====================

#[test]
fn union_all_numbers_bindings_across_arms() {
    let posts = POSTS.table();
    let arm = |user: i64| {
        Select::from(&posts)
            .column(posts.col(POST_ID))
            .filter(posts.col(POST_USER_ID).eq(user))
    };
    let (sql, values) = arm(1).union_all(&arm(2)).build().unwrap();
    assert_eq!(
        sql,
        concat!(
            r#"SELECT "posts"."id""#,
            "\n",
            r#"FROM "posts""#,
            "\n",
            r#"WHERE ("posts"."user_id") = ($1)"#,
            "\nUNION ALL\n",
            r#"SELECT "posts"."id""#,
            "\n",
            r#"FROM "posts""#,
            "\n",
            r#"WHERE ("posts"."user_id") = ($2)"#,
        )
    );
    assert_eq!(values, vec![Value::Int8(1), Value::Int8(2)]);
}

#[test]
fn compound_drops_empty_arms() {
    let posts = POSTS.table();
    let query = Select::from(&posts).column(posts.col(POST_ID));
    let expected = query.to_sql();
    assert_eq!(query.except(&Fragment::empty()).to_sql(), expected);
}

#[test]
fn arms_with_limits_are_parenthesized() {
    let posts = POSTS.table();
    let newest = Select::from(&posts)
        .column(posts.col(POST_ID))
        .order_by(posts.col(POST_ID).desc())
        .limit(1);
    let any_two = Select::from(&posts).column(posts.col(POST_ID)).limit(2);
    let (sql, values) = newest.union(&any_two).build().unwrap();
    assert_eq!(
        sql,
        concat!(
            "(\n",
            "  SELECT \"posts\".\"id\"\n",
            "  FROM \"posts\"\n",
            "  ORDER BY \"posts\".\"id\" DESC\n",
            "  LIMIT $1\n",
            ")\n",
            "UNION\n",
            "(\n",
            "  SELECT \"posts\".\"id\"\n",
            "  FROM \"posts\"\n",
            "  LIMIT $2\n",
            ")",
        )
    );
    assert_eq!(values, vec![Value::Int8(1), Value::Int8(2)]);
}

#[test]
fn empty_arms_follow_set_semantics() {
    let q = Fragment::literal("SELECT 1");
    let empty = Fragment::empty();
    assert_eq!(Compound::new(&empty).union(&q).to_sql(), "SELECT 1");
    assert!(Compound::new(&empty).except(&q).to_fragment().is_empty());
    assert_eq!(Compound::new(&q).except(&empty).to_sql(), "SELECT 1");
    assert!(Compound::new(&q).intersect(&empty).to_fragment().is_empty());
    assert!(Compound::new(&empty).intersect(&q).to_fragment().is_empty());
}

#[test]
fn intersect_applies_to_everything_before_it() {
    let one = Fragment::literal("SELECT 1");
    let two = Fragment::literal("SELECT 2");
    let three = Fragment::literal("SELECT 3");
    assert_eq!(
        Compound::new(&one).union(&two).intersect(&three).to_sql(),
        "(\n  SELECT 1\n  UNION\n  SELECT 2\n)\nINTERSECT\nSELECT 3"
    );
    assert_eq!(
        Compound::new(&one)
            .union(&Compound::new(&two).intersect(&three))
            .to_sql(),
        "SELECT 1\nUNION\n(\n  SELECT 2\n  INTERSECT\n  SELECT 3\n)"
    );
}

// ==================== INSERT ====================

#[test]
fn insert_with_every_key_bound_is_verbatim() {
    let users = USERS.table();
    let a = NewUser::new("a").with_id(1);
    let b = NewUser::new("b").with_id(2);
    let insert = Insert::into(&users).drafts([&a, &b]);
    assert_eq!(insert.resolve().unwrap().plan, PrimaryKeyPlan::AllBound);
    assert_eq!(
        insert.to_sql(),
        concat!(
            r#"INSERT INTO "public"."users" ("id", "name", "email", "deleted_at")"#,
            "\nVALUES ($1, $2, $3, $4), ($5, $6, $7, $8)",
        )
    );
}

#[test]
fn insert_with_no_key_bound_omits_key_columns() {
    let users = USERS.table();
    let insert = Insert::into(&users).drafts([&NewUser::new("a"), &NewUser::new("b")]);
    assert_eq!(insert.resolve().unwrap().plan, PrimaryKeyPlan::OmitKey);
    let (sql, values) = insert.build().unwrap();
    assert_eq!(
        sql,
        concat!(
            r#"INSERT INTO "public"."users" ("name", "email", "deleted_at")"#,
            "\nVALUES ($1, $2, $3), ($4, $5, $6)",
        )
    );
    assert_eq!(values[0], Value::Text("a".into()));
    assert_eq!(values[3], Value::Text("b".into()));
}

#[test]
fn insert_with_mixed_keys_uses_default() {
    let users = USERS.table();
    let bound = NewUser::new("a").with_id(1);
    let unbound = NewUser::new("b");
    let insert = Insert::into(&users).drafts([&bound, &unbound]);
    assert_eq!(insert.resolve().unwrap().plan, PrimaryKeyPlan::KeepWithDefault);
    let (sql, values) = insert.build().unwrap();
    assert_eq!(
        sql,
        concat!(
            r#"INSERT INTO "public"."users" ("id", "name", "email", "deleted_at")"#,
            "\nVALUES ($1, $2, $3, $4), (DEFAULT, $5, $6, $7)",
        )
    );
    assert_eq!(values.len(), 7);
    assert_eq!(values[0], Value::Int8(1));
}

#[test]
fn insert_rows_skip_read_only_columns() {
    let users = USERS.table();
    let user = User {
        id: 9,
        name: "z".into(),
        email: Some("z@x".into()),
    };
    let sql = Insert::into(&users).row(&user).to_sql();
    assert!(!sql.contains("created_at"));
    assert!(sql.contains(r#"("id", "name", "email", "deleted_at")"#));
}

#[test]
fn upsert_targets_primary_key() {
    let draft = NewUser::new("a").with_id(7);
    let (sql, values) = Insert::upsert(&draft).build().unwrap();
    assert_eq!(
        sql,
        concat!(
            r#"INSERT INTO "public"."users" ("id", "name", "email", "deleted_at")"#,
            "\nVALUES ($1, $2, $3, $4)\n",
            r#"ON CONFLICT ("id") DO UPDATE SET "name" = "excluded"."name", "email" = "excluded"."email", "deleted_at" = "excluded"."deleted_at""#,
        )
    );
    assert_eq!(values[0], Value::Int8(7));
}

#[test]
fn upsert_of_unbound_draft_keeps_key_as_default() {
    let draft = NewUser::new("a");
    let insert = Insert::upsert(&draft);
    assert_eq!(insert.resolve().unwrap().plan, PrimaryKeyPlan::KeepWithDefault);
    assert!(insert.to_sql().contains("VALUES (DEFAULT, $1, $2, $3)"));
}

#[test]
fn conflict_do_nothing_and_filters() {
    let users = USERS.table();
    let insert = Insert::into(&users)
        .draft(&NewUser::new("a").with_id(1))
        .on_conflict(&["email"])
        .on_conflict_where(users.col(EMAIL).is_not_null())
        .do_nothing();
    assert!(insert.to_sql().ends_with(
        r#"ON CONFLICT ("email") WHERE ("users"."email") IS NOT NULL DO NOTHING"#
    ));

    let guarded = Insert::into(&users)
        .draft(&NewUser::new("a").with_id(1))
        .on_conflict_key()
        .do_update([Assignment::new(&users, NAME, "b")])
        .do_update_where(users.col(ID).gt(0_i64));
    assert!(guarded.to_sql().ends_with(
        r#"ON CONFLICT ("id") DO UPDATE SET "name" = $5 WHERE ("users"."id") > ($6)"#
    ));
}

#[test]
fn conflict_update_without_target_is_rejected() {
    let users = USERS.table();
    let insert = Insert::into(&users)
        .draft(&NewUser::new("a").with_id(1))
        .on_conflict(&[])
        .do_update_excluded();
    assert!(insert.build().unwrap_err().is_validation());
}

#[test]
fn unknown_conflict_column_is_reported() {
    let users = USERS.table();
    let insert = Insert::into(&users)
        .draft(&NewUser::new("a"))
        .on_conflict(&["nope"]);
    assert_eq!(
        insert.validate().unwrap_err(),
        BuildError::unknown_column("users", "nope")
    );
}

#[test]
fn insert_values_checks_column_count() {
    let posts = POSTS.table();
    let ok = Insert::into(&posts)
        .values(vec![Value::Int8(1), Value::Int8(2), "t".into()])
        .returning(posts.col(POST_ID));
    assert_eq!(
        ok.to_sql(),
        concat!(
            r#"INSERT INTO "posts" ("id", "user_id", "title")"#,
            "\nVALUES ($1, $2, $3)\n",
            r#"RETURNING "posts"."id""#,
        )
    );

    let bad = Insert::into(&posts).values(vec![Value::Int8(1)]);
    assert_eq!(
        bad.build().unwrap_err(),
        BuildError::ColumnCount {
            expected: 3,
            found: 1
        }
    );
}

#[test]
fn insert_from_select_and_default_values() {
    let users = USERS.table();
    let posts = POSTS.table();
    let source = Select::from(&users)
        .column(users.col(ID))
        .column(users.col(NAME))
        .unscoped();
    let sql = Insert::into(&posts)
        .columns(&["user_id", "title"])
        .select(&source)
        .to_sql();
    assert_eq!(
        sql,
        concat!(
            r#"INSERT INTO "posts" ("user_id", "title")"#,
            "\n",
            r#"SELECT "users"."id", "users"."name""#,
            "\n",
            r#"FROM "public"."users""#,
        )
    );

    assert_eq!(
        Insert::into(&users).default_values().to_sql(),
        "INSERT INTO \"public\".\"users\"\nDEFAULT VALUES"
    );
}

#[test]
fn empty_insert_renders_nothing() {
    let users = USERS.table();
    let insert = Insert::into(&users);
    assert!(insert.to_fragment().is_empty());
    assert_eq!(insert.build().unwrap(), (String::new(), Vec::new()));
}

#[test]
fn composite_key_with_partial_null_is_not_omitted() {
    let rows = vec![vec![Value::Int8(1), Value::Null, Value::Int4(3)]];
    let resolved = resolve_primary_key(TAGS.columns, rows, false);
    assert_eq!(resolved.plan, PrimaryKeyPlan::KeepWithDefault);
    assert_eq!(resolved.columns, vec!["post_id", "tag", "weight"]);
    assert_eq!(
        resolved.rows[0],
        vec![
            Cell::Value(Value::Int8(1)),
            Cell::Default,
            Cell::Value(Value::Int4(3))
        ]
    );

    let unbound = vec![vec![Value::Null, Value::Null, Value::Int4(3)]];
    let resolved = resolve_primary_key(TAGS.columns, unbound, false);
    assert_eq!(resolved.plan, PrimaryKeyPlan::OmitKey);
    assert_eq!(resolved.columns, vec!["weight"]);
}

#[test]
fn key_only_table_never_omits_every_column() {
    const KEY_ONLY: &[ColumnDef] = &[ColumnDef::new("id", ValueKind::Int8).primary_key()];
    let resolved = resolve_primary_key(KEY_ONLY, vec![vec![Value::Null]], false);
    assert_eq!(resolved.plan, PrimaryKeyPlan::KeepWithDefault);
    assert_eq!(resolved.rows, vec![vec![Cell::Default]]);
}

#[test]
fn read_only_table_inserts_one_default_row_per_row() {
    const LOG_COLUMNS: &[ColumnDef] = &[
        ColumnDef::new("id", ValueKind::Int8).primary_key().read_only(),
        ColumnDef::new("logged_at", ValueKind::TimestampTz).read_only(),
    ];
    static LOGS: TableSchema = TableSchema::new("logs").with_columns(LOG_COLUMNS);
    let logs = LOGS.table();

    let (sql, values) = Insert::into(&logs)
        .values(vec![Value::Null, Value::Null])
        .values(vec![Value::Null, Value::Null])
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO \"logs\" (\"id\")\nVALUES (DEFAULT), (DEFAULT)"
    );
    assert!(values.is_empty());

    let single = Insert::into(&logs).values(vec![Value::Null, Value::Null]);
    assert_eq!(single.to_sql(), "INSERT INTO \"logs\"\nDEFAULT VALUES");

    let no_columns = Insert::into(&logs)
        .columns(&[])
        .values(Vec::new())
        .values(Vec::new());
    assert!(no_columns.build().unwrap_err().is_validation());
}

// ==================== UPDATE / DELETE ====================

#[test]
fn update_sets_columns_with_baseline() {
    let users = USERS.table();
    let (sql, values) = Update::table(&users)
        .set(NAME, "bob")
        .set(EMAIL, None::<String>)
        .filter(users.col(ID).eq(1_i64))
        .returning(users.col(ID))
        .build()
        .unwrap();
    assert_eq!(
        sql,
        concat!(
            r#"UPDATE "public"."users""#,
            "\n",
            r#"SET "name" = $1, "email" = NULL"#,
            "\n",
            r#"WHERE (("users"."deleted_at") IS NULL) AND (("users"."id") = ($2))"#,
            "\n",
            r#"RETURNING "users"."id""#,
        )
    );
    assert_eq!(values, vec![Value::Text("bob".into()), Value::Int8(1)]);
}

#[test]
fn mistyped_column_key_is_rejected() {
    let users = USERS.table();
    let id_as_text: ColumnKey<String> = ColumnKey::new(0);
    let update = Update::table(&users)
        .set(id_as_text, "not a number")
        .filter(users.col(ID).eq(1_i64));
    assert_eq!(
        update.build().unwrap_err(),
        BuildError::incompatible_kinds("id", ValueKind::Int8, ValueKind::Text)
    );

    let out_of_range: ColumnKey<i64> = ColumnKey::new(99);
    assert!(
        Update::table(&users)
            .set(out_of_range, 1_i64)
            .build()
            .unwrap_err()
            .is_validation()
    );

    let upsert = Insert::into(&users)
        .draft(&NewUser::new("a").with_id(1))
        .on_conflict_key()
        .do_update([Assignment::new(&users, id_as_text, "x")]);
    assert!(upsert.validate().unwrap_err().is_incompatible_kinds());
}

#[test]
fn update_without_assignments_renders_nothing() {
    let users = USERS.table();
    let update = Update::table(&users).filter(users.col(ID).eq(1_i64));
    assert!(update.to_fragment().is_empty());
}

#[test]
fn update_with_raw_assignment() {
    let posts = POSTS.table();
    let sql = Update::table(&posts)
        .set_raw("title", "upper(\"title\")")
        .to_sql();
    assert_eq!(sql, "UPDATE \"posts\"\nSET \"title\" = upper(\"title\")");
}

#[test]
fn delete_with_scopes() {
    let users = USERS.table();
    let (sql, values) = Delete::from(&users)
        .unscoped()
        .filter(users.col(ID).eq(3_i64))
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "DELETE FROM \"public\".\"users\"\nWHERE (\"users\".\"id\") = ($1)"
    );
    assert_eq!(values, vec![Value::Int8(3)]);

    assert_eq!(
        Delete::from(&users).none().returning_all().to_sql(),
        concat!(
            r#"DELETE FROM "public"."users""#,
            "\nWHERE FALSE\n",
            r#"RETURNING "users"."id", "users"."name", "users"."email", "users"."deleted_at", "users"."created_at""#,
        )
    );
}

#[test]
fn delete_default_scope_uses_baseline_only() {
    let users = USERS.table();
    assert_eq!(
        Delete::from(&users).to_sql(),
        "DELETE FROM \"public\".\"users\"\nWHERE (\"users\".\"deleted_at\") IS NULL"
    );
}

#[test]
fn statement_kinds() {
    let users = USERS.table();
    assert_eq!(Select::from(&users).kind(), StatementKind::Select);
    assert_eq!(Delete::from(&users).kind(), StatementKind::Delete);
    assert_eq!(Fragment::literal("SELECT 1").kind(), StatementKind::Raw);
    assert_eq!(StatementKind::Compound.to_string(), "compound");
}
