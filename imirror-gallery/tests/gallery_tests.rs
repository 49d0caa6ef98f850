//! Gallery controller: reload, filtering, tag management, missing records

mod helpers;

use std::sync::Arc;

use helpers::{media_item, stub, StubMediaApi};
use imirror_common::events::EventBus;
use imirror_gallery::services::gallery::GalleryController;

fn controller(api: StubMediaApi) -> (GalleryController, Arc<StubMediaApi>) {
    let api = stub(api);
    let controller = GalleryController::new(api.clone(), EventBus::new(16));
    (controller, api)
}

#[tokio::test]
async fn reload_replaces_the_item_list() {
    let (controller, api) = controller(StubMediaApi::with_items(vec![
        media_item("m1", "a.jpg", &["paris"]),
    ]));

    assert_eq!(controller.reload().await.expect("reload"), 1);
    assert_eq!(controller.item_count().await, 1);

    api.items.lock().unwrap().push(media_item("m2", "b.jpg", &["rome"]));
    assert_eq!(controller.reload().await.expect("reload"), 2);
    assert_eq!(controller.item_count().await, 2);
}

#[tokio::test]
async fn toggle_replaces_rather_than_adds() {
    let (controller, _api) = controller(StubMediaApi::default());

    assert_eq!(controller.toggle_tag("Paris").await, vec!["paris"]);
    // A different tag replaces the selection
    assert_eq!(controller.toggle_tag("rome").await, vec!["rome"]);
    // Re-toggling the selected tag clears it
    assert!(controller.toggle_tag("ROME").await.is_empty());
}

#[tokio::test]
async fn visible_items_honor_tag_and_search_filters() {
    let (controller, _api) = controller(StubMediaApi::with_items(vec![
        media_item("m1", "eiffel.jpg", &["paris"]),
        media_item("m2", "colosseum.jpg", &["rome"]),
        media_item("m3", "louvre.jpg", &["paris", "museum"]),
    ]));
    controller.reload().await.expect("reload");

    controller.toggle_tag("paris").await;
    let visible = controller.visible_items().await;
    assert_eq!(visible.len(), 2);

    controller.set_search("louvre").await;
    let visible = controller.visible_items().await;
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, "m3");

    controller.clear_tags().await;
    controller.set_search("").await;
    assert_eq!(controller.visible_items().await.len(), 3);
}

#[tokio::test]
async fn deleting_a_tag_updates_every_carrier_and_the_index() {
    let (controller, api) = controller(StubMediaApi::with_items(vec![
        media_item("m1", "a.jpg", &["paris", "beach"]),
        media_item("m2", "b.jpg", &["paris"]),
        media_item("m3", "c.jpg", &["rome"]),
    ]));
    controller.reload().await.expect("reload");
    controller.toggle_tag("paris").await;

    let updated = controller.delete_tag_everywhere("paris").await.expect("delete");

    assert_eq!(updated, 2);
    // Carriers got full-replace tag lists without the deleted tag
    let calls = api.updated_tags.lock().unwrap().clone();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], ("m1".to_string(), vec!["beach".to_string()]));
    assert_eq!(calls[1], ("m2".to_string(), Vec::new()));

    // The derived index no longer knows the tag, and the selection dropped it
    let index = controller.tag_index().await;
    assert!(index.iter().all(|(tag, _)| tag != "paris"));
    assert!(controller.filters().await.selected_tags.is_empty());
}

#[tokio::test]
async fn tag_index_orders_by_count_then_name() {
    let (controller, _api) = controller(StubMediaApi::with_items(vec![
        media_item("m1", "a.jpg", &["paris", "beach"]),
        media_item("m2", "b.jpg", &["paris"]),
        media_item("m3", "c.jpg", &["alps"]),
    ]));
    controller.reload().await.expect("reload");

    let index = controller.tag_index().await;
    assert_eq!(
        index,
        vec![
            ("paris".to_string(), 2),
            ("alps".to_string(), 1),
            ("beach".to_string(), 1),
        ]
    );
}

#[tokio::test]
async fn missing_records_sort_to_the_end() {
    let (controller, _api) = controller(StubMediaApi::with_items(vec![
        media_item("m1", "a.jpg", &[]),
        media_item("m2", "b.jpg", &[]),
        media_item("m3", "c.jpg", &[]),
    ]));
    controller.reload().await.expect("reload");
    controller.mark_missing("m1").await;

    let visible = controller.visible_items().await;
    let ids: Vec<&str> = visible.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["m2", "m3", "m1"]);
    assert!(controller.is_missing("m1").await);
}

#[tokio::test]
async fn removing_a_missing_record_deletes_and_reloads() {
    let (controller, api) = controller(StubMediaApi::with_items(vec![
        media_item("m1", "a.jpg", &[]),
        media_item("m2", "b.jpg", &[]),
    ]));
    controller.reload().await.expect("reload");
    controller.mark_missing("m1").await;

    controller.remove_missing("m1").await.expect("remove");

    assert_eq!(*api.deleted.lock().unwrap(), vec!["m1"]);
    assert_eq!(controller.item_count().await, 1);
    // The stale missing mark went away with the record
    assert!(!controller.is_missing("m1").await);
}
