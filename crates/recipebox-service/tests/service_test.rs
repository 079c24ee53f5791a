//! End-to-end workflow through `RecipeService` with session-based identity.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use common::{FaultyStore, ingredients, step_texts, steps, tenant};
use recipebox_core::{RecipeId, RecipeUpdate, Tag};
use recipebox_db_memory::InMemoryStore;
use recipebox_service::{Navigation, RecipeService, ServiceError, Session, SessionResolver};
use recipebox_storage::AggregateStore;

fn service() -> (Arc<InMemoryStore>, RecipeService<SessionResolver>) {
    let store = Arc::new(InMemoryStore::new());
    (store.clone(), RecipeService::new(store, SessionResolver))
}

fn session(id: &str) -> Session {
    Session::authenticated(tenant(id))
}

fn edit_id(nav: Navigation) -> RecipeId {
    match nav {
        Navigation::Edit(id) => id,
        other => panic!("expected edit navigation, got {other:?}"),
    }
}

fn update(title: &str, source: &str, step_list: &[&str]) -> RecipeUpdate {
    RecipeUpdate {
        title: Some(title.to_string()),
        source: Some(source.to_string()),
        steps: steps(step_list),
        ingredients: Vec::new(),
    }
}

#[tokio::test]
async fn test_create_edit_view_flow() {
    let (_store, service) = service();
    let alice = session("alice");

    let id = edit_id(service.create(&alice).await.unwrap());

    let form = service.edit_form(&alice, &id).await.unwrap();
    assert_eq!(form.title, "");
    assert_eq!(form.source, "");
    assert!(form.steps.is_empty());

    let mut submission = update("Pasta", "Grandma", &["Boil water", "Add pasta", "Drain"]);
    submission.ingredients = ingredients(&[("200 g", "spaghetti")]);
    let nav = service.submit_update(&alice, &id, submission).await.unwrap();
    assert_eq!(nav, Navigation::View(id.clone()));
    assert_eq!(nav.location(), format!("/recipes/{id}"));

    let shorter = update("Pasta", "Grandma", &["Boil water", "Add pasta"]);
    service.submit_update(&alice, &id, shorter).await.unwrap();

    let recipe = service.view(&alice, &id).await.unwrap();
    assert_eq!(recipe.title.as_deref(), Some("Pasta"));
    assert_eq!(recipe.source.as_deref(), Some("Grandma"));
    assert_eq!(
        step_texts(&recipe),
        vec![(0, "Boil water".to_string()), (1, "Add pasta".to_string())]
    );
    // Ingredients were not resubmitted, so the collection is now empty
    assert!(recipe.ingredients.is_empty());

    let listed = service.list(&alice).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title.as_deref(), Some("Pasta"));
}

#[tokio::test]
async fn test_unauthenticated_requests_short_circuit() {
    let inner = Arc::new(InMemoryStore::new());
    let counting = Arc::new(FaultyStore::new(inner.clone(), true, false));
    let service = RecipeService::new(counting.clone(), SessionResolver);
    let anonymous = Session::anonymous();
    let id = RecipeId::new("anything").unwrap();

    let errors = vec![
        service.list(&anonymous).await.unwrap_err(),
        service.view(&anonymous, &id).await.unwrap_err(),
        service.edit_form(&anonymous, &id).await.unwrap_err(),
        service
            .submit_update(&anonymous, &id, update("t", "s", &["x"]))
            .await
            .unwrap_err(),
        service.delete(&anonymous, &id).await.unwrap_err(),
        service.create(&anonymous).await.unwrap_err(),
    ];

    for err in errors {
        assert!(matches!(err, ServiceError::Unauthenticated));
        assert_eq!(err.status_code(), 401);
    }
    assert_eq!(inner.count(), 0);
    assert_eq!(counting.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_validation_happens_before_any_write() {
    let inner = Arc::new(InMemoryStore::new());
    let counting = Arc::new(FaultyStore::new(inner.clone(), true, false));
    let service = RecipeService::new(counting.clone(), SessionResolver);
    let alice = session("alice");
    let id = edit_id(service.create(&alice).await.unwrap());

    let invalid = RecipeUpdate {
        title: Some(String::new()),
        source: None,
        steps: steps(&["would be lost"]),
        ingredients: Vec::new(),
    };
    let err = service.submit_update(&alice, &id, invalid).await.unwrap_err();

    match &err {
        ServiceError::Validation(errors) => {
            assert_eq!(errors.get("title"), Some("Title is required"));
            assert_eq!(errors.get("source"), Some("Invalid source type"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(err.status_code(), 400);
    assert_eq!(counting.writes.load(Ordering::SeqCst), 0);

    let recipe = service.view(&alice, &id).await.unwrap();
    assert!(recipe.steps.is_empty());
}

#[tokio::test]
async fn test_tenants_cannot_see_or_touch_each_other() {
    let (store, service) = service();
    let alice = session("alice");
    let mallory = session("mallory");

    let id = edit_id(service.create(&alice).await.unwrap());
    service
        .submit_update(&alice, &id, update("Soup", "", &["Chop", "Simmer"]))
        .await
        .unwrap();

    assert!(service.view(&mallory, &id).await.unwrap_err().is_not_found());
    assert!(service.edit_form(&mallory, &id).await.unwrap_err().is_not_found());
    assert!(
        service
            .submit_update(&mallory, &id, update("Mine now", "", &[]))
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(service.delete(&mallory, &id).await.unwrap_err().is_not_found());
    assert!(service.list(&mallory).await.unwrap().is_empty());

    // A foreign id is indistinguishable from a missing one
    let missing = RecipeId::new("does-not-exist").unwrap();
    let foreign = service.view(&mallory, &id).await.unwrap_err();
    let absent = service.view(&mallory, &missing).await.unwrap_err();
    assert_eq!(foreign.status_code(), absent.status_code());

    let recipe = store
        .fetch_recipe(&id, &tenant("alice"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(recipe.title.as_deref(), Some("Soup"));
    assert_eq!(recipe.steps.len(), 2);
}

#[tokio::test]
async fn test_delete_then_delete_again() {
    let (store, service) = service();
    let alice = session("alice");
    let id = edit_id(service.create(&alice).await.unwrap());

    let nav = service.delete(&alice, &id).await.unwrap();
    assert_eq!(nav, Navigation::List);
    assert_eq!(nav.location(), "/recipes");
    assert_eq!(store.count(), 0);

    // Gone recipes are reported as missing; the store-level delete stays idempotent
    assert!(service.delete(&alice, &id).await.unwrap_err().is_not_found());
    assert_eq!(store.delete_recipe(&id, &tenant("alice")).await.unwrap(), 0);
}

#[tokio::test]
async fn test_store_failure_is_opaque_and_rolled_back() {
    let inner = Arc::new(InMemoryStore::new());
    let alice = session("alice");
    let healthy = RecipeService::new(inner.clone(), SessionResolver);
    let id = edit_id(healthy.create(&alice).await.unwrap());
    healthy
        .submit_update(&alice, &id, update("Bread", "Book", &["Knead"]))
        .await
        .unwrap();

    let broken = RecipeService::new(
        Arc::new(FaultyStore::new(inner.clone(), true, true)),
        SessionResolver,
    );
    let mut submission = update("Renamed", "Book", &["Knead", "Bake"]);
    submission.ingredients = ingredients(&[("500 g", "flour")]);
    let err = broken.submit_update(&alice, &id, submission).await.unwrap_err();

    assert_eq!(err.status_code(), 500);
    assert_eq!(err.public_message(), "Internal server error");

    let recipe = healthy.view(&alice, &id).await.unwrap();
    assert_eq!(recipe.title.as_deref(), Some("Bread"));
    assert_eq!(step_texts(&recipe), vec![(0, "Knead".to_string())]);
}

#[tokio::test]
async fn test_view_and_form_show_tags_and_sorted_children() {
    let (store, service) = service();
    let alice = session("alice");
    let id = edit_id(service.create(&alice).await.unwrap());
    service
        .submit_update(&alice, &id, update("Cake", "", &["Mix", "Bake", "Cool"]))
        .await
        .unwrap();
    store
        .attach_tag(
            &id,
            Tag {
                name: "dessert".into(),
                display_name: "Dessert".into(),
            },
        )
        .await
        .unwrap();

    let form = service.edit_form(&alice, &id).await.unwrap();
    let indices: Vec<u32> = form.steps.iter().map(|s| s.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(form.tags[0].display_name, "Dessert");

    let listed = service.list(&alice).await.unwrap();
    assert_eq!(listed[0].tags.len(), 1);
}
