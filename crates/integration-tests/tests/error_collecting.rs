//! Error-collecting guards: a denial nulls the field out, records one
//! response error, and leaves the rest of the query alone.

use engine::{AuthConfig, ConstValue, FailureMode, Guard, Request, Schema};
use integration_tests::{admin, blog_registry, member, runtime, CurrentUser};

fn collecting() -> AuthConfig {
    AuthConfig::new().with_failure_mode(FailureMode::CollectErrors)
}

fn owner_only() -> Guard {
    Guard::new(|ctx| {
        let Some(user) = ctx.request.typed_get::<CurrentUser>() else {
            return false;
        };
        match ctx.argument("userId") {
            Some(ConstValue::Number(number)) => number.as_u64() == Some(user.id),
            _ => false,
        }
    })
}

fn admin_only() -> Guard {
    Guard::new(|ctx| {
        ctx.request
            .typed_get::<CurrentUser>()
            .is_some_and(CurrentUser::is_admin)
    })
}

#[test]
fn denied_nullable_field_becomes_null_and_siblings_resolve() {
    runtime().block_on(async {
        let schema = Schema::build(blog_registry())
            .with_auth(collecting())
            .guard("Query.posts", owner_only())
            .finish()
            .unwrap();

        let response = schema
            .execute(Request::new("query { posts(userId: 2) { id } publicInfo }").with_context(admin()))
            .await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "posts": null,
            "publicInfo": "welcome"
          },
          "errors": [
            {
              "message": "Not authorized to access Query.posts",
              "locations": [
                {
                  "line": 1,
                  "column": 9
                }
              ],
              "path": [
                "posts"
              ],
              "extensions": {
                "code": "UNAUTHORIZED",
                "typeName": "Query",
                "fieldName": "posts"
              }
            }
          ]
        }
        "###);
    });
}

#[test]
fn denied_non_null_field_nulls_the_nearest_nullable_ancestor() {
    runtime().block_on(async {
        let schema = Schema::build(blog_registry())
            .with_auth(collecting())
            .guard("User.posts", admin_only())
            .finish()
            .unwrap();

        // User.posts is `[Post!]!`: the null cannot sit there, so `user`
        // (nullable) is nulled instead, with exactly one error.
        let response = schema
            .execute(Request::new("query { user(id: 2) { name posts { id } } }").with_context(member(2)))
            .await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "user": null
          },
          "errors": [
            {
              "message": "Not authorized to access User.posts",
              "locations": [
                {
                  "line": 1,
                  "column": 28
                }
              ],
              "path": [
                "user",
                "posts"
              ],
              "extensions": {
                "code": "UNAUTHORIZED",
                "typeName": "User",
                "fieldName": "posts"
              }
            }
          ]
        }
        "###);
    });
}

#[test]
fn denied_non_null_root_field_nulls_the_whole_data() {
    runtime().block_on(async {
        let schema = Schema::build(blog_registry())
            .with_auth(collecting())
            .guard("Mutation.createPost", admin_only())
            .finish()
            .unwrap();

        // Mutation.createPost is `Post!`: propagation reaches the root, so
        // data is null as a whole, not merely the field.
        let response = schema
            .execute(Request::new(r#"mutation { createPost(title: "Hi") { id } }"#).with_context(member(1)))
            .await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": null,
          "errors": [
            {
              "message": "Not authorized to access Mutation.createPost",
              "locations": [
                {
                  "line": 1,
                  "column": 12
                }
              ],
              "path": [
                "createPost"
              ],
              "extensions": {
                "code": "UNAUTHORIZED",
                "typeName": "Mutation",
                "fieldName": "createPost"
              }
            }
          ]
        }
        "###);
    });
}

#[test]
fn unrelated_branches_are_untouched_by_a_denial() {
    runtime().block_on(async {
        let schema = Schema::build(blog_registry())
            .with_auth(collecting())
            .guard("Post.secretNotes", admin_only())
            .finish()
            .unwrap();

        let response = schema
            .execute(Request::new("query { posts(userId: 1) { id secretNotes } user(id: 1) { name } }").with_context(member(2)))
            .await;

        // secretNotes is nullable: each denied occurrence nulls locally.
        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "posts": [
              {
                "id": 1,
                "secretNotes": null
              }
            ],
            "user": {
              "name": "Alice"
            }
          },
          "errors": [
            {
              "message": "Not authorized to access Post.secretNotes",
              "locations": [
                {
                  "line": 1,
                  "column": 31
                }
              ],
              "path": [
                "posts",
                0,
                "secretNotes"
              ],
              "extensions": {
                "code": "UNAUTHORIZED",
                "typeName": "Post",
                "fieldName": "secretNotes"
              }
            }
          ]
        }
        "###);
    });
}
