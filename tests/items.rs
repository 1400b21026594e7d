//! Items CRUD against a mock backend.

mod common;

use common::{MockServerFixture, TEST_API_KEY};
use mockito::Matcher;
use rag_kb_sdk::{ItemId, ItemPatch, NewItem};
use serde_json::json;

#[tokio::test]
async fn list_items_accepts_bare_array() {
    let mut fixture = MockServerFixture::new().await;
    let bare = fixture
        .server
        .mock("GET", "/api/items")
        .match_header("x-api-key", TEST_API_KEY)
        .with_status(200)
        .with_body(r#"[{"id":1,"title":"a","tags":["t"]},{"id":"2","text":"b"}]"#)
        .create_async()
        .await;

    let items = fixture.client().list_items().await.unwrap();
    bare.assert_async().await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, Some(ItemId::new("1")));
    assert_eq!(items[1].text.as_deref(), Some("b"));
}

#[tokio::test]
async fn list_items_accepts_envelope() {
    let mut fixture = MockServerFixture::new().await;
    let _wrapped = fixture
        .mock_json("GET", "/api/items", 200, json!({"items": [{"id": "x"}]}))
        .await;
    let items = fixture.client().list_items().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, Some(ItemId::new("x")));
}

#[tokio::test]
async fn get_item_includes_neighbors() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json(
            "GET",
            "/api/items/abc",
            200,
            json!({
                "id": "abc",
                "title": "Ownership",
                "state": "active",
                "user_id": 9,
                "neighbors": [{"id": "def", "title": "Borrowing"}]
            }),
        )
        .await;

    let detail = fixture.client().get_item("abc").await.unwrap();
    assert_eq!(detail.item.title.as_deref(), Some("Ownership"));
    assert_eq!(detail.item.user_id, Some(ItemId::new("9")));
    assert_eq!(detail.neighbors[0].id, Some(ItemId::new("def")));
}

#[tokio::test]
async fn get_missing_item_is_404_not_found() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json("GET", "/api/items/missing", 404, json!({"error": "not found"}))
        .await;

    let err = fixture.client().get_item("missing").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.message(), "not found");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn item_ids_are_encoded_as_one_segment() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock(
            "GET",
            Matcher::Regex(r"^/api/items/a(%20| )b(%2F|%2f)c$".to_string()),
        )
        .with_status(200)
        .with_body(r#"{"id":"a b/c"}"#)
        .create_async()
        .await;

    let detail = fixture.client().get_item("a b/c").await.unwrap();
    mock.assert_async().await;
    assert_eq!(detail.item.id, Some(ItemId::new("a b/c")));
}

#[tokio::test]
async fn create_item_without_title_or_text_never_calls_server() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_unreachable("POST", "/api/items").await;

    let err = fixture
        .client()
        .create_item(&NewItem::new().url("https://example.com"))
        .await
        .unwrap_err();
    let err_empty = fixture
        .client()
        .create_item(&NewItem::default())
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(err.is_validation());
    assert!(err_empty.is_validation());
    assert_eq!(err_empty.status(), Some(400));
}

#[tokio::test]
async fn create_item_posts_only_given_fields() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/api/items")
        .match_body(Matcher::Json(json!({"title": "Pinning", "tags": ["async"]})))
        .with_status(201)
        .with_body(r#"{"id":17,"title":"Pinning","tags":["async"],"state":"pending"}"#)
        .create_async()
        .await;

    let created = fixture
        .client()
        .create_item(&NewItem::new().title("Pinning").tags(["async"]))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(created.id, Some(ItemId::from(17u64)));
    assert_eq!(created.state.as_deref(), Some("pending"));
}

#[tokio::test]
async fn create_item_surfaces_field_errors() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json(
            "POST",
            "/api/items",
            422,
            json!({"error": "invalid item", "errors": ["url must be absolute"]}),
        )
        .await;

    let err = fixture
        .client()
        .create_item(&NewItem::new().title("t").url("relative"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert_eq!(err.field_errors(), vec!["url must be absolute"]);
}

#[tokio::test]
async fn update_item_puts_partial_fields() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("PUT", "/api/items/5")
        .match_body(Matcher::Json(json!({"state": "archived"})))
        .with_status(200)
        .with_body(r#"{"id":5,"title":"old","state":"archived"}"#)
        .create_async()
        .await;

    let updated = fixture
        .client()
        .update_item("5", &ItemPatch::new().state("archived"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(updated.state.as_deref(), Some("archived"));
}

#[tokio::test]
async fn update_and_delete_require_an_id() {
    let mut fixture = MockServerFixture::new().await;
    let put = fixture.mock_unreachable("PUT", "/api/items/").await;
    let delete = fixture.mock_unreachable("DELETE", "/api/items/").await;

    let client = fixture.client();
    assert!(client
        .update_item("", &ItemPatch::new().title("x"))
        .await
        .unwrap_err()
        .is_validation());
    assert!(client.delete_item("  ").await.unwrap_err().is_validation());
    assert!(client.get_item("").await.unwrap_err().is_validation());

    put.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn delete_item_returns_confirmation() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json("DELETE", "/api/items/42", 200, json!({"message": "Item deleted"}))
        .await;

    let resp = fixture.client().delete_item("42").await.unwrap();
    mock.assert_async().await;
    assert_eq!(resp.message, "Item deleted");
}
