use serde_json::json;

use crate::common::{Auth, TestApp, USER1, USER2, routes, test_config, test_users};
use fragments_server::utils::hash::owner_id;

mod create_fragment {
    use super::*;

    #[tokio::test]
    async fn unauthenticated_requests_are_denied() {
        let app = TestApp::spawn().await;

        let res = app
            .post_fragment(Auth::Anonymous, "text/plain", "hello")
            .await;
        res.assert_error(401);

        let res = app
            .post_fragment(Auth::Basic("user1@email.com", "wrong"), "text/plain", "hello")
            .await;
        res.assert_error(401);
    }

    #[tokio::test]
    async fn creates_plain_text_fragment() {
        let app = TestApp::spawn().await;

        let res = app
            .post_fragment(USER1, "text/plain", "This is a fragment")
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["status"], "ok");
        let fragment = &res.body["fragment"];
        assert!(fragment["id"].as_str().is_some());
        assert_eq!(fragment["ownerId"], owner_id("user1@email.com"));
        assert_eq!(fragment["type"], "text/plain");
        assert_eq!(fragment["size"], 18);
        assert_eq!(fragment["created"], fragment["updated"]);
    }

    #[tokio::test]
    async fn location_header_points_at_the_fragment() {
        let app = TestApp::spawn().await;

        let res = app.post_fragment(USER1, "text/plain", "located").await;
        assert_eq!(res.status, 201);

        let id = res.fragment_id();
        let location = res.header("location").expect("Location header");
        assert_eq!(location, app.url(&routes::fragment(&id)));

        let fetched = app
            .client
            .get(location)
            .basic_auth("user1@email.com", Some("password1"))
            .send()
            .await
            .unwrap();
        assert_eq!(fetched.status(), 200);
        assert_eq!(fetched.text().await.unwrap(), "located");
    }

    #[tokio::test]
    async fn location_uses_configured_api_url() {
        let mut config = test_config();
        config.server.api_url = Some("https://fragments.example.com".into());
        let app = TestApp::spawn_with(config, test_users()).await;

        let res = app.post_fragment(USER1, "text/plain", "x").await;
        let id = res.fragment_id();
        assert_eq!(
            res.header("location").unwrap(),
            format!("https://fragments.example.com/v1/fragments/{id}")
        );
    }

    #[tokio::test]
    async fn keeps_charset_parameter() {
        let app = TestApp::spawn().await;

        let res = app
            .post_fragment(USER1, "text/plain; charset=utf-8", "with charset")
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["fragment"]["type"], "text/plain; charset=utf-8");
    }

    #[tokio::test]
    async fn accepts_every_supported_type() {
        let app = TestApp::spawn().await;
        for content_type in [
            "text/plain",
            "text/markdown",
            "text/html",
            "application/json",
            "image/png",
            "image/jpeg",
            "image/webp",
            "image/gif",
        ] {
            let res = app.post_fragment(USER1, content_type, "payload").await;
            assert_eq!(res.status, 201, "{content_type}: {}", res.text);
        }
    }

    #[tokio::test]
    async fn unsupported_type_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_fragment(USER1, "application/msword", "doc")
            .await;
        res.assert_error(415);

        let res = app.post_fragment(USER1, "not a type", "doc").await;
        res.assert_error(415);

        let res = app.post_fragment(USER1, "text/plain;", "doc").await;
        res.assert_error(415);
    }

    #[tokio::test]
    async fn missing_content_type_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .post(app.url(routes::FRAGMENTS))
            .basic_auth("user1@email.com", Some("password1"))
            .body("no type")
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), 415);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let mut config = test_config();
        config.server.max_body_size = 64;
        let app = TestApp::spawn_with(config, test_users()).await;

        let res = app
            .post_fragment(USER1, "text/plain", vec![b'a'; 65])
            .await;
        res.assert_error(413);

        let res = app
            .post_fragment(USER1, "text/plain", vec![b'a'; 64])
            .await;
        assert_eq!(res.status, 201);
    }
}

mod list_fragments {
    use super::*;

    #[tokio::test]
    async fn unauthenticated_requests_are_denied() {
        let app = TestApp::spawn().await;
        app.get(routes::FRAGMENTS, Auth::Anonymous)
            .await
            .assert_error(401);
    }

    #[tokio::test]
    async fn empty_for_new_user() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::FRAGMENTS, USER1).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!({ "status": "ok", "fragments": [] }));
    }

    #[tokio::test]
    async fn lists_ids_in_creation_order() {
        let app = TestApp::spawn().await;
        let first = app.create_fragment(USER1, "text/plain", "one").await;
        let second = app.create_fragment(USER1, "text/markdown", "# two").await;

        let res = app.get(routes::FRAGMENTS, USER1).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["fragments"], json!([first, second]));
    }

    #[tokio::test]
    async fn expand_returns_full_records() {
        let app = TestApp::spawn().await;
        let id = app.create_fragment(USER1, "text/plain", "expanded").await;

        let res = app
            .get(&format!("{}?expand=1", routes::FRAGMENTS), USER1)
            .await;

        assert_eq!(res.status, 200);
        let fragments = res.body["fragments"].as_array().unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0]["id"], id);
        assert_eq!(fragments[0]["type"], "text/plain");
        assert_eq!(fragments[0]["size"], 8);
        assert_eq!(fragments[0]["ownerId"], owner_id("user1@email.com"));
    }

    #[tokio::test]
    async fn other_users_fragments_are_not_listed() {
        let app = TestApp::spawn().await;
        app.create_fragment(USER1, "text/plain", "mine").await;

        let res = app.get(routes::FRAGMENTS, USER2).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["fragments"], json!([]));
    }
}

mod get_fragment {
    use super::*;

    #[tokio::test]
    async fn returns_raw_payload_with_declared_type() {
        let app = TestApp::spawn().await;
        let id = app
            .create_fragment(USER1, "text/plain; charset=utf-8", "raw data")
            .await;

        let res = app.get(&routes::fragment(&id), USER1).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.text, "raw data");
        assert_eq!(
            res.header("content-type"),
            Some("text/plain; charset=utf-8")
        );
    }

    #[tokio::test]
    async fn binary_payload_is_unchanged() {
        let app = TestApp::spawn().await;
        let payload: Vec<u8> = (0..=255).collect();
        let id = app
            .create_fragment(USER1, "image/png", payload.clone())
            .await;

        let res = app.get(&routes::fragment(&id), USER1).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.bytes, payload);
        assert_eq!(res.header("content-type"), Some("image/png"));
    }

    #[tokio::test]
    async fn missing_fragment_is_not_found() {
        let app = TestApp::spawn().await;
        app.get(&routes::fragment("does-not-exist"), USER1)
            .await
            .assert_error(404);
    }

    #[tokio::test]
    async fn other_users_fragment_is_not_found() {
        let app = TestApp::spawn().await;
        let id = app.create_fragment(USER1, "text/plain", "private").await;

        app.get(&routes::fragment(&id), USER2)
            .await
            .assert_error(404);
    }

    #[tokio::test]
    async fn info_returns_metadata() {
        let app = TestApp::spawn().await;
        let created = app.post_fragment(USER1, "text/markdown", "# info").await;
        let id = created.fragment_id();

        let res = app.get(&routes::fragment_info(&id), USER1).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "ok");
        assert_eq!(res.body["fragment"], created.body["fragment"]);

        app.get(&routes::fragment_info("missing"), USER1)
            .await
            .assert_error(404);
    }
}

mod update_fragment {
    use super::*;

    #[tokio::test]
    async fn replaces_payload_and_size() {
        let app = TestApp::spawn().await;
        let created = app.post_fragment(USER1, "text/plain", "short").await;
        let id = created.fragment_id();

        let res = app
            .put_fragment(USER1, &id, "text/plain", "a much longer payload")
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "ok");
        assert_eq!(res.body["fragment"]["id"], id);
        assert_eq!(res.body["fragment"]["size"], 21);
        assert_eq!(
            res.body["fragment"]["created"],
            created.body["fragment"]["created"]
        );
        assert_ne!(
            res.body["fragment"]["updated"],
            created.body["fragment"]["updated"]
        );

        let fetched = app.get(&routes::fragment(&id), USER1).await;
        assert_eq!(fetched.text, "a much longer payload");
    }

    #[tokio::test]
    async fn parameters_may_differ() {
        let app = TestApp::spawn().await;
        let id = app.create_fragment(USER1, "text/plain", "v1").await;

        let res = app
            .put_fragment(USER1, &id, "text/plain; charset=utf-8", "v2")
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["fragment"]["type"], "text/plain");
    }

    #[tokio::test]
    async fn type_cannot_change() {
        let app = TestApp::spawn().await;
        let id = app.create_fragment(USER1, "text/plain", "v1").await;

        app.put_fragment(USER1, &id, "text/markdown", "# v2")
            .await
            .assert_error(400);

        let fetched = app.get(&routes::fragment(&id), USER1).await;
        assert_eq!(fetched.text, "v1");
    }

    #[tokio::test]
    async fn missing_fragment_is_not_found() {
        let app = TestApp::spawn().await;
        app.put_fragment(USER1, "missing", "text/plain", "data")
            .await
            .assert_error(404);
    }

    #[tokio::test]
    async fn other_users_fragment_is_not_found() {
        let app = TestApp::spawn().await;
        let id = app.create_fragment(USER1, "text/plain", "mine").await;

        app.put_fragment(USER2, &id, "text/plain", "theirs")
            .await
            .assert_error(404);
    }
}

mod delete_fragment {
    use super::*;

    #[tokio::test]
    async fn deletes_fragment() {
        let app = TestApp::spawn().await;
        let id = app.create_fragment(USER1, "text/plain", "bye").await;

        let res = app.delete(&routes::fragment(&id), USER1).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!({ "status": "ok" }));

        app.get(&routes::fragment(&id), USER1)
            .await
            .assert_error(404);
        let list = app.get(routes::FRAGMENTS, USER1).await;
        assert_eq!(list.body["fragments"], json!([]));
    }

    #[tokio::test]
    async fn missing_fragment_is_not_found() {
        let app = TestApp::spawn().await;
        app.delete(&routes::fragment("missing"), USER1)
            .await
            .assert_error(404);
    }

    #[tokio::test]
    async fn cannot_delete_other_users_fragment() {
        let app = TestApp::spawn().await;
        let id = app.create_fragment(USER1, "text/plain", "keep").await;

        app.delete(&routes::fragment(&id), USER2)
            .await
            .assert_error(404);

        let res = app.get(&routes::fragment(&id), USER1).await;
        assert_eq!(res.status, 200);
    }
}
