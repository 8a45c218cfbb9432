use crate::common::{Auth, TestApp, routes};

mod health_check {
    use super::*;

    #[tokio::test]
    async fn is_public_and_uncached() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::HEALTH, Auth::Anonymous).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.header("cache-control"), Some("no-cache"));
        assert_eq!(res.body["status"], "ok");
        assert_eq!(res.body["name"], "fragments-server");
        assert!(res.body["version"].is_string());
        assert!(res.body["hostname"].is_string());
    }
}

mod fallback {
    use super::*;

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get("/no-such-route", Auth::Anonymous).await;

        res.assert_error(404);
        assert_eq!(res.body["error"]["message"], "not found");
    }
}

mod openapi {
    use super::*;

    #[tokio::test]
    async fn documents_fragment_routes() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::OPENAPI, Auth::Anonymous).await;

        assert_eq!(res.status, 200);
        let paths = &res.body["paths"];
        assert!(paths["/v1/fragments"]["get"].is_object());
        assert!(paths["/v1/fragments"]["post"].is_object());
        assert!(paths["/v1/fragments/{id}"]["put"].is_object());
        assert!(paths["/v1/fragments/{id}/info"]["get"].is_object());
        assert!(res.body["components"]["securitySchemes"]["basic"].is_object());
    }
}
