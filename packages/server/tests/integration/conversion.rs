use crate::common::{TestApp, USER1, png_bytes, routes};

mod text_conversions {
    use super::*;

    #[tokio::test]
    async fn markdown_to_html() {
        let app = TestApp::spawn().await;
        let id = app
            .create_fragment(USER1, "text/markdown", "# some markdown data\n")
            .await;

        let res = app.get(&routes::fragment_as(&id, "html"), USER1).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.header("content-type"), Some("text/html"));
        assert_eq!(res.text, "<h1>some markdown data</h1>\n");
    }

    #[tokio::test]
    async fn markdown_to_text() {
        let app = TestApp::spawn().await;
        let id = app
            .create_fragment(USER1, "text/markdown", "# some markdown data\n")
            .await;

        let res = app.get(&routes::fragment_as(&id, "txt"), USER1).await;

        assert_eq!(res.status, 200);
        assert!(res.header("content-type").unwrap().contains("text/plain"));
        assert_eq!(res.text, "SOME MARKDOWN DATA");
    }

    #[tokio::test]
    async fn html_to_text() {
        let app = TestApp::spawn().await;
        let id = app
            .create_fragment(
                USER1,
                "text/html",
                "<h2>Notes</h2><p>First <b>bold</b> line</p><ul><li>a</li><li>b</li></ul>",
            )
            .await;

        let res = app.get(&routes::fragment_as(&id, "txt"), USER1).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.text, "NOTES\n\nFirst bold line\n\n * a\n * b");
    }

    #[tokio::test]
    async fn json_to_text_is_compact_and_ordered() {
        let app = TestApp::spawn().await;
        let id = app
            .create_fragment(
                USER1,
                "application/json",
                "{ \"zeta\": 1,\n  \"alpha\": [true, null] }",
            )
            .await;

        let res = app.get(&routes::fragment_as(&id, "txt"), USER1).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.header("content-type"), Some("text/plain"));
        assert_eq!(res.text, r#"{"zeta":1,"alpha":[true,null]}"#);
    }

    #[tokio::test]
    async fn same_type_extension_returns_payload() {
        let app = TestApp::spawn().await;
        let id = app.create_fragment(USER1, "text/plain", "plain").await;

        let res = app.get(&routes::fragment_as(&id, "txt"), USER1).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.text, "plain");
        assert_eq!(res.header("content-type"), Some("text/plain"));
    }

    #[tokio::test]
    async fn invalid_json_fails_conversion() {
        let app = TestApp::spawn().await;
        let id = app
            .create_fragment(USER1, "application/json", "{ not json")
            .await;

        app.get(&routes::fragment_as(&id, "txt"), USER1)
            .await
            .assert_error(500);
    }
}

mod unsupported_conversions {
    use super::*;

    #[tokio::test]
    async fn illegal_target_is_rejected() {
        let app = TestApp::spawn().await;
        let id = app.create_fragment(USER1, "text/plain", "plain").await;

        for ext in ["html", "md", "json", "png"] {
            app.get(&routes::fragment_as(&id, ext), USER1)
                .await
                .assert_error(415);
        }
    }

    #[tokio::test]
    async fn unknown_extension_is_rejected() {
        let app = TestApp::spawn().await;
        let id = app.create_fragment(USER1, "text/markdown", "# x").await;

        app.get(&routes::fragment_as(&id, "docx"), USER1)
            .await
            .assert_error(415);
    }

    #[tokio::test]
    async fn missing_fragment_wins_over_bad_extension() {
        let app = TestApp::spawn().await;
        app.get(&routes::fragment_as("missing", "docx"), USER1)
            .await
            .assert_error(404);
    }

    #[tokio::test]
    async fn images_cannot_become_text() {
        let app = TestApp::spawn().await;
        let id = app
            .create_fragment(USER1, "image/png", png_bytes(2, 2))
            .await;

        app.get(&routes::fragment_as(&id, "txt"), USER1)
            .await
            .assert_error(415);
    }
}

mod image_conversions {
    use super::*;

    #[tokio::test]
    async fn png_converts_to_every_image_type() {
        let app = TestApp::spawn().await;
        let id = app
            .create_fragment(USER1, "image/png", png_bytes(6, 4))
            .await;

        let cases = [
            ("png", "image/png", image::ImageFormat::Png),
            ("jpg", "image/jpeg", image::ImageFormat::Jpeg),
            ("jpeg", "image/jpeg", image::ImageFormat::Jpeg),
            ("webp", "image/webp", image::ImageFormat::WebP),
            ("gif", "image/gif", image::ImageFormat::Gif),
        ];
        for (ext, content_type, format) in cases {
            let res = app.get(&routes::fragment_as(&id, ext), USER1).await;

            assert_eq!(res.status, 200, "{ext}: {}", res.text);
            assert_eq!(res.header("content-type"), Some(content_type));
            assert_eq!(image::guess_format(&res.bytes).unwrap(), format);

            let decoded = image::load_from_memory(&res.bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (6, 4));
        }
    }

    #[tokio::test]
    async fn corrupt_image_fails_conversion() {
        let app = TestApp::spawn().await;
        let id = app
            .create_fragment(USER1, "image/png", b"not really a png".to_vec())
            .await;

        app.get(&routes::fragment_as(&id, "jpg"), USER1)
            .await
            .assert_error(500);
    }
}
