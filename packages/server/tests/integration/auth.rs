use crate::common::{Auth, TestApp, USER1, routes, test_config};
use fragments_server::auth::Authenticator;
use fragments_server::config::AuthMode;
use fragments_server::utils::{hash::owner_id, jwt};

const SECRET: &[u8] = b"integration-secret";

async fn spawn_jwt() -> TestApp {
    let mut config = test_config();
    config.auth.mode = AuthMode::Jwt;
    TestApp::spawn_with(config, Authenticator::jwt(SECRET)).await
}

fn token(email: &str) -> String {
    jwt::sign(email, SECRET, chrono::Duration::minutes(10)).unwrap()
}

mod basic_auth {
    use super::*;

    #[tokio::test]
    async fn owner_id_is_hashed_email() {
        let app = TestApp::spawn().await;

        let res = app.post_fragment(USER1, "text/plain", "x").await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["fragment"]["ownerId"], owner_id("user1@email.com"));
        assert_ne!(res.body["fragment"]["ownerId"], "user1@email.com");
    }

    #[tokio::test]
    async fn unknown_user_is_denied() {
        let app = TestApp::spawn().await;
        app.get(
            routes::FRAGMENTS,
            Auth::Basic("someone@email.com", "password1"),
        )
        .await
        .assert_error(401);
    }

    #[tokio::test]
    async fn bearer_token_is_not_accepted() {
        let app = TestApp::spawn().await;
        app.get(routes::FRAGMENTS, Auth::Bearer(&token("user1@email.com")))
            .await
            .assert_error(401);
    }
}

mod jwt_auth {
    use super::*;

    #[tokio::test]
    async fn valid_token_is_accepted() {
        let app = spawn_jwt().await;
        let token = token("user1@email.com");

        let res = app
            .post_fragment(Auth::Bearer(&token), "text/plain", "via jwt")
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["fragment"]["ownerId"], owner_id("user1@email.com"));

        let list = app.get(routes::FRAGMENTS, Auth::Bearer(&token)).await;
        assert_eq!(list.body["fragments"][0], res.body["fragment"]["id"]);
    }

    #[tokio::test]
    async fn same_email_sees_same_fragments_across_schemes() {
        let basic = TestApp::spawn().await;
        let jwt = spawn_jwt().await;

        let a = basic.post_fragment(USER1, "text/plain", "a").await;
        let b = jwt
            .post_fragment(
                Auth::Bearer(&token("user1@email.com")),
                "text/plain",
                "b",
            )
            .await;

        assert_eq!(a.body["fragment"]["ownerId"], b.body["fragment"]["ownerId"]);
    }

    #[tokio::test]
    async fn bad_tokens_are_denied() {
        let app = spawn_jwt().await;

        let forged = jwt::sign("user1@email.com", b"other-secret", chrono::Duration::minutes(10))
            .unwrap();
        let expired = jwt::sign("user1@email.com", SECRET, chrono::Duration::hours(-2)).unwrap();

        for auth in [
            Auth::Bearer("not-a-jwt"),
            Auth::Bearer(&forged),
            Auth::Bearer(&expired),
            USER1,
            Auth::Anonymous,
        ] {
            app.get(routes::FRAGMENTS, auth).await.assert_error(401);
        }
    }
}
