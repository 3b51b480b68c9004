//! Create, edit, and delete flows against in-memory doubles.

use pest_gallery_core::flows::{CreateDialog, DeletePrompt, EditDialog};
use pest_gallery_core::{GalleryActions, GalleryError, RecordStore};
use pest_gallery_protocol::{Category, CreatePestRequest, RecordId};
use pest_gallery_test_utils::{
    ApiCalls, FailingImageHost, InMemoryPestApi, StaticImageHost, record, write_image,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::TempDir;

struct Harness {
    api: Arc<InMemoryPestApi>,
    host: Arc<StaticImageHost>,
    actions: GalleryActions,
    store: RecordStore,
}

fn harness() -> Harness {
    let api = Arc::new(InMemoryPestApi::new(vec![
        record("1", Category::Negative, "aphid"),
        record("2", Category::Positive, "ladybug"),
        record("3", Category::Neutral, "moth"),
    ]));
    let host = Arc::new(StaticImageHost::new("https://x/y.jpg"));
    let store = RecordStore::new(api.clone(), false);
    let actions = GalleryActions::new(store.clone(), host.clone());
    Harness {
        api,
        host,
        actions,
        store,
    }
}

fn ids(store: &RecordStore) -> Vec<String> {
    store
        .collection_state()
        .data
        .unwrap_or_default()
        .iter()
        .map(|record| record.id.to_string())
        .collect()
}

#[tokio::test]
async fn create_without_image_never_writes() {
    let h = harness();
    h.store.read().await.expect("initial load");
    let mut dialog = CreateDialog::default();
    dialog.open();
    dialog.form_mut().expect("editing").name = "Aphid".to_string();

    let err = dialog.begin_submit().expect_err("missing image");

    assert_eq!(err, GalleryError::MissingImage);
    assert_eq!(h.api.calls().writes(), 0);
    assert!(h.host.uploads().is_empty());
}

#[tokio::test]
async fn create_posts_exact_body_and_refreshes_once() {
    let h = harness();
    h.store.read().await.expect("initial load");
    let temp = TempDir::new().expect("tmp");
    let image = write_image(temp.path(), "aphid.jpg");

    let mut dialog = CreateDialog::default();
    dialog.open();
    let form = dialog.form_mut().expect("editing");
    form.name = "Aphid".to_string();
    form.description = "d".to_string();
    form.image_path = image.display().to_string();
    let submission = dialog.begin_submit().expect("valid form");

    let result = h.actions.create(submission).await;
    dialog.finish(&result);

    assert!(!dialog.is_open());
    assert_eq!(
        h.api.created(),
        vec![CreatePestRequest {
            name: "Aphid".to_string(),
            description: "d".to_string(),
            text: None,
            image_url: "https://x/y.jpg".to_string(),
            category: Category::Negative,
        }]
    );
    let body = serde_json::to_value(&h.api.created()[0]).expect("json");
    assert_eq!(
        body,
        serde_json::json!({
            "name": "Aphid",
            "description": "d",
            "imageUrl": "https://x/y.jpg",
            "category": "negative"
        })
    );
    assert_eq!(h.host.uploads().len(), 1);
    assert_eq!(h.host.uploads()[0].mime_type, "image/jpeg");
    assert_eq!(
        h.api.calls(),
        ApiCalls {
            list: 2,
            create: 1,
            ..ApiCalls::default()
        }
    );
    assert_eq!(ids(&h.store), vec!["1", "2", "3", "mem-1"]);
}

#[tokio::test]
async fn upload_failure_creates_nothing() {
    let api = Arc::new(InMemoryPestApi::new(Vec::new()));
    let host = Arc::new(FailingImageHost::default());
    let actions = GalleryActions::new(RecordStore::new(api.clone(), false), host.clone());
    let temp = TempDir::new().expect("tmp");

    let mut dialog = CreateDialog::default();
    dialog.open();
    dialog.form_mut().expect("editing").image_path =
        write_image(temp.path(), "bug.png").display().to_string();
    let submission = dialog.begin_submit().expect("valid");

    let result = actions.create(submission).await;
    dialog.finish(&result);

    assert!(matches!(result, Err(GalleryError::Upload(_))));
    assert_eq!(host.attempts(), 1);
    assert_eq!(api.calls().create, 0);
    assert!(matches!(dialog.error(), Some(GalleryError::Upload(_))));
}

#[tokio::test]
async fn non_image_file_is_rejected_before_upload() {
    let h = harness();
    let temp = TempDir::new().expect("tmp");
    let notes = temp.path().join("notes.txt");
    std::fs::write(&notes, "not an image").expect("write");

    let mut dialog = CreateDialog::default();
    dialog.open();
    dialog.form_mut().expect("editing").image_path = notes.display().to_string();
    let submission = dialog.begin_submit().expect("path present");

    let err = h.actions.create(submission).await.expect_err("invalid");

    assert!(err.is_validation());
    assert!(h.host.uploads().is_empty());
    assert_eq!(h.api.calls().writes(), 0);
}

#[tokio::test]
async fn create_failure_returns_dialog_to_editing() {
    let h = harness();
    h.api.set_fail_writes(true);
    let temp = TempDir::new().expect("tmp");

    let mut dialog = CreateDialog::default();
    dialog.open();
    dialog.form_mut().expect("editing").image_path =
        write_image(temp.path(), "a.jpg").display().to_string();
    let submission = dialog.begin_submit().expect("valid");
    let result = h.actions.create(submission).await;
    dialog.finish(&result);

    assert!(matches!(
        dialog.error(),
        Some(GalleryError::Status { status: 500, .. })
    ));
    assert_eq!(h.api.calls().list, 0);
}

#[tokio::test]
async fn edit_replaces_fields_and_refreshes_once() {
    let h = harness();
    let records = h.store.read().await.expect("initial load");
    let target = records[1].clone();
    h.store
        .read_one(&target.id)
        .await
        .expect("detail cached");

    let mut dialog = EditDialog::default();
    dialog.open(&target);
    let form = dialog.form_mut().expect("editing");
    form.description = "eats aphids by the hundred".to_string();
    form.category = Category::Neutral;
    let submission = dialog.begin_submit().expect("submit");

    let result = h.actions.update(submission).await;
    dialog.finish(&result);

    assert!(!dialog.is_open());
    assert_eq!(h.api.calls().list, 2);
    let updated = h.api.updated();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].0, target.id);
    assert_eq!(updated[0].1.name, target.name);
    assert_eq!(updated[0].1.image_url, target.image_url);
    let refreshed = h.store.collection_state().data.expect("data");
    assert_eq!(refreshed[1].description, "eats aphids by the hundred");
    assert_eq!(refreshed[1].category, Category::Neutral);
    assert_eq!(refreshed[1].image_url, target.image_url);

    let mut detail = h.store.subscribe_record(&target.id);
    detail
        .wait_for(|state| {
            state
                .data
                .as_ref()
                .is_some_and(|record| record.category == Category::Neutral)
        })
        .await
        .expect("record refreshed");
}

#[tokio::test]
async fn failed_refresh_after_write_keeps_cached_collection() {
    let h = harness();
    h.store.read().await.expect("initial load");
    h.api.set_fail_reads(true);

    let records = h.store.collection_state().data.expect("data");
    let mut dialog = EditDialog::default();
    dialog.open(&records[2]);
    dialog.form_mut().expect("editing").name = "Tiger moth".to_string();
    let submission = dialog.begin_submit().expect("submit");
    let result = h.actions.update(submission).await;
    dialog.finish(&result);

    assert!(result.is_ok());
    assert!(!dialog.is_open());
    assert_eq!(h.api.calls().list, 2);
    let state = h.store.collection_state();
    assert_eq!(ids(&h.store), vec!["1", "2", "3"]);
    assert_eq!(state.data.expect("data")[2].name, "pest 3");
    assert!(matches!(
        state.error,
        Some(GalleryError::Status { status: 500, .. })
    ));
    assert!(!state.loading);
}

#[tokio::test]
async fn edit_failure_keeps_dialog_open() {
    let h = harness();
    let records = h.store.read().await.expect("initial load");
    h.api.set_fail_writes(true);

    let mut dialog = EditDialog::default();
    dialog.open(&records[0]);
    let submission = dialog.begin_submit().expect("submit");
    let result = h.actions.update(submission).await;
    dialog.finish(&result);

    assert!(dialog.is_open());
    assert!(dialog.error().is_some());
    assert_eq!(h.api.calls().list, 1);
}

#[tokio::test]
async fn delete_removes_exactly_that_record() {
    let h = harness();
    let records = h.store.read().await.expect("initial load");
    let mut prompt = DeletePrompt::default();
    prompt.request(&records[0]);
    let id = prompt.confirm().expect("confirmed");

    let result = h.actions.delete(&id).await;
    assert_eq!(prompt.finish(result), None);

    assert_eq!(ids(&h.store), vec!["2", "3"]);
    assert_eq!(
        h.store.read().await.expect("read").len(),
        2,
        "subsequent reads no longer include the deleted id"
    );
    assert_eq!(h.api.calls().list, 2);
    assert!(!h.store.is_record_cached(&RecordId::new("1")));
}

#[tokio::test]
async fn delete_failure_leaves_record_visible() {
    let h = harness();
    let records = h.store.read().await.expect("initial load");
    h.api.set_fail_writes(true);
    let mut prompt = DeletePrompt::default();
    prompt.request(&records[2]);
    let id = prompt.confirm().expect("confirmed");

    let err = prompt.finish(h.actions.delete(&id).await);

    assert!(err.is_some());
    assert_eq!(ids(&h.store), vec!["1", "2", "3"]);
    assert_eq!(h.api.calls().list, 1);
}
