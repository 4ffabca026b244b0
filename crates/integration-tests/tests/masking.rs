//! Per-request schema masking: hidden fields and arguments behave exactly
//! as if they were never defined, in validation, execution and
//! introspection alike.

use engine::{Guard, MetaType, Request, Schema};
use integration_tests::{admin, anonymous, blog_registry, runtime, CurrentUser};
use pretty_assertions::assert_eq;

fn admins_only_mask() -> Guard {
    Guard::new(|ctx| {
        ctx.request
            .typed_get::<CurrentUser>()
            .is_some_and(CurrentUser::is_admin)
    })
}

#[test]
fn masked_field_is_indistinguishable_from_an_undefined_one() {
    runtime().block_on(async {
        let masked = Schema::build(blog_registry())
            .mask("Query.auditLog", admins_only_mask())
            .finish()
            .unwrap();

        let mut registry = blog_registry();
        if let Some(MetaType::Object(query)) = registry.types.get_mut("Query") {
            query.fields.shift_remove("auditLog");
        }
        let undefined = Schema::build(registry).finish().unwrap();

        let masked_response = masked
            .execute(Request::new("query { auditLog }").with_context(anonymous()))
            .await;
        let undefined_response = undefined
            .execute(Request::new("query { auditLog }").with_context(anonymous()))
            .await;

        assert_eq!(masked_response.to_json_value(), undefined_response.to_json_value());
        insta::assert_json_snapshot!(masked_response, @r###"
        {
          "errors": [
            {
              "message": "Query does not have a field named 'auditLog'",
              "locations": [
                {
                  "line": 1,
                  "column": 9
                }
              ],
              "extensions": {
                "code": "OPERATION_VALIDATION_ERROR"
              }
            }
          ]
        }
        "###);
    });
}

#[test]
fn the_masked_field_still_exists_for_authorized_requests() {
    runtime().block_on(async {
        let schema = Schema::build(blog_registry())
            .mask("Query.auditLog", admins_only_mask())
            .finish()
            .unwrap();

        let response = schema
            .execute(Request::new("query { auditLog }").with_context(admin()))
            .await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "auditLog": [
              "boot",
              "login"
            ]
          }
        }
        "###);
    });
}

#[test]
fn masked_argument_is_not_accepted() {
    runtime().block_on(async {
        let schema = Schema::build(blog_registry())
            .mask("Query.posts.userId", admins_only_mask())
            .finish()
            .unwrap();

        // Using the hidden argument fails validation.
        let response = schema
            .execute(Request::new("query { posts(userId: 2) { id } }").with_context(anonymous()))
            .await;
        insta::assert_json_snapshot!(response, @r###"
        {
          "errors": [
            {
              "message": "The field `posts` does not have an argument named `userId`",
              "locations": [
                {
                  "line": 1,
                  "column": 15
                }
              ],
              "extensions": {
                "code": "OPERATION_VALIDATION_ERROR"
              }
            }
          ]
        }
        "###);

        // Without it the field behaves as if the argument was never
        // declared, required or not.
        let response = schema
            .execute(Request::new("query { posts { id } }").with_context(anonymous()))
            .await;
        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "posts": []
          }
        }
        "###);

        // For an admin the argument exists and is required again.
        let response = schema
            .execute(Request::new("query { posts { id } }").with_context(admin()))
            .await;
        insta::assert_json_snapshot!(response, @r###"
        {
          "errors": [
            {
              "message": "Missing argument named 'userId' for field 'posts'",
              "locations": [
                {
                  "line": 1,
                  "column": 9
                }
              ],
              "extensions": {
                "code": "OPERATION_VALIDATION_ERROR"
              }
            }
          ]
        }
        "###);
    });
}

#[test]
fn introspection_respects_the_mask() {
    runtime().block_on(async {
        let schema = Schema::build(blog_registry())
            .mask("Query.auditLog", admins_only_mask())
            .finish()
            .unwrap();
        let query = r#"query { __type(name: "Query") { fields { name } } }"#;

        let response = schema.execute(Request::new(query).with_context(anonymous())).await;
        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "__type": {
              "fields": [
                {
                  "name": "posts"
                },
                {
                  "name": "user"
                },
                {
                  "name": "publicInfo"
                }
              ]
            }
          }
        }
        "###);

        let response = schema.execute(Request::new(query).with_context(admin())).await;
        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "__type": {
              "fields": [
                {
                  "name": "posts"
                },
                {
                  "name": "user"
                },
                {
                  "name": "publicInfo"
                },
                {
                  "name": "auditLog"
                }
              ]
            }
          }
        }
        "###);
    });
}

#[test]
fn masking_and_guards_stay_independent() {
    runtime().block_on(async {
        // Visible to admins only, and even then the guard denies everyone:
        // the two mechanisms never merge into one check.
        let schema = Schema::build(blog_registry())
            .mask("Query.auditLog", admins_only_mask())
            .guard("Query.auditLog", Guard::new(|_| false))
            .finish()
            .unwrap();

        let response = schema
            .execute(Request::new("query { auditLog }").with_context(anonymous()))
            .await;
        assert_eq!(
            response.errors[0].message,
            "Query does not have a field named 'auditLog'"
        );

        let response = schema
            .execute(Request::new("query { auditLog }").with_context(admin()))
            .await;
        assert_eq!(response.errors[0].message, "Not authorized to access: Query.auditLog");
        assert!(response.data.is_none());
    });
}

#[test]
fn disabled_introspection_is_rejected() {
    runtime().block_on(async {
        let schema = Schema::build(blog_registry())
            .disable_introspection()
            .finish()
            .unwrap();

        let response = schema
            .execute(Request::new("query { __schema { types { name } } }").with_context(anonymous()))
            .await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": null,
          "errors": [
            {
              "message": "Unauthorized for introspection.",
              "locations": [
                {
                  "line": 1,
                  "column": 9
                }
              ],
              "path": [
                "__schema"
              ],
              "extensions": {
                "code": "UNAUTHORIZED"
              }
            }
          ]
        }
        "###);
    });
}
