use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use digital_menu_api::{
    catalog::{BURGER_ID, ESPRESSO_ID, LATTE_ID},
    config::AppConfig,
    domain::{
        customization::CustomizationSelection, order::OrderValidationError, status::OrderStatus,
    },
    dto::{
        auth::LoginRequest,
        cart::AddToCartRequest,
        kitchen::UpdateOrderStatusRequest,
        menu::{CreateMenuItemRequest, UpdateMenuItemRequest},
        orders::{EmailOrderRequest, SubmitOrderRequest, TableNumberInput},
    },
    error::AppError,
    feed::OrderEvent,
    middleware::{auth::{AuthUser, decode_token}, session::CustomerSession},
    models::{LocalizedText, Order},
    notify::{EmailTemplateParams, LogNotifier, NotifyError, OrderNotifier},
    routes::params::OrderListQuery,
    services::{
        auth_service, cart_service, email_order_service,
        kitchen_service::{self, FeedMessage},
        menu_service,
        order_service, tracking_service::{self, TrackingError},
    },
    state::AppState,
    store::{MemoryStore, OrderStore},
};
use futures::StreamExt;
use uuid::Uuid;

const SECRET: &str = "test-secret";

fn memory_state() -> (AppState, Arc<MemoryStore>) {
    memory_state_with_feed(256)
}

fn memory_state_with_feed(capacity: usize) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let config = AppConfig {
        order_feed_capacity: capacity,
        ..AppConfig::local(SECRET)
    };
    let state = AppState::new(store.clone(), Arc::new(LogNotifier), config);
    (state, store)
}

fn staff() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: "staff".into(),
    }
}

fn add(item_id: Uuid) -> AddToCartRequest {
    AddToCartRequest {
        item_id,
        customizations: None,
    }
}

fn submit(name: &str, table: &str) -> SubmitOrderRequest {
    SubmitOrderRequest {
        customer_name: name.into(),
        table_number: Some(TableNumberInput::Text(table.into())),
        notes: None,
        language: Some("en".into()),
    }
}

async fn place_order(state: &AppState, session: CustomerSession) -> Order {
    cart_service::add_to_cart(state, session, add(ESPRESSO_ID), "en")
        .await
        .unwrap();
    order_service::submit_order(state, session, submit("Aino", "4"))
        .await
        .unwrap()
        .data
        .unwrap()
        .order
}

#[tokio::test]
async fn cart_totals_and_order_submission() {
    let (state, _) = memory_state();
    let session = CustomerSession(Uuid::new_v4());

    cart_service::add_to_cart(&state, session, add(ESPRESSO_ID), "en")
        .await
        .unwrap();
    let cart = cart_service::add_to_cart(&state, session, add(BURGER_ID), "en")
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(cart.total_price, 1840);
    assert_eq!(cart.total_price_display, "€18.40");
    assert_eq!(cart.estimated_prep_time, 18);
    assert_eq!(cart.total_items, 2);

    let err = order_service::submit_order(&state, session, submit("  ", "4"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(OrderValidationError::NameRequired)
    ));
    let cart = cart_service::get_cart(&state, session, "en").await.unwrap().data.unwrap();
    assert_eq!(cart.total_items, 2, "a rejected order leaves the cart alone");

    let err = order_service::submit_order(&state, session, submit("Aino", "0"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(OrderValidationError::TableInvalid)
    ));

    let placed = order_service::submit_order(&state, session, submit(" Aino ", "7"))
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(placed.order.status, OrderStatus::Received);
    assert_eq!(placed.order.customer_name, "Aino");
    assert_eq!(placed.order.table_number, 7);
    assert_eq!(placed.order.total_price, 1840);
    assert_eq!(placed.order.estimated_prep_time, 18);
    assert_eq!(placed.order.items.len(), 2);
    assert_eq!(placed.order_number.len(), 4);

    let cart = cart_service::get_cart(&state, session, "en").await.unwrap().data.unwrap();
    assert!(cart.lines.is_empty());

    let last = order_service::last_order(&state, session).await.unwrap().data.unwrap();
    assert_eq!(last.order_id, Some(placed.order_id));

    let list = kitchen_service::list_orders(&state, &staff(), OrderListQuery::default())
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(list.items.len(), 1);
    assert_eq!(list.counts.all, 1);
    assert_eq!(list.counts.received, 1);
}

#[tokio::test]
async fn oversized_table_numbers_are_rejected_before_storage() {
    let (state, _) = memory_state();
    let session = CustomerSession(Uuid::new_v4());
    cart_service::add_to_cart(&state, session, add(ESPRESSO_ID), "en")
        .await
        .unwrap();

    let request = SubmitOrderRequest {
        table_number: Some(TableNumberInput::Number(3_000_000_000)),
        ..submit("Aino", "1")
    };
    let err = order_service::submit_order(&state, session, request)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(OrderValidationError::TableInvalid)
    ));
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    let cart = cart_service::read_cart(&state, session).await.unwrap();
    assert_eq!(cart.total_items(), 1);
}

#[tokio::test]
async fn empty_cart_cannot_be_ordered() {
    let (state, _) = memory_state();
    let session = CustomerSession(Uuid::new_v4());

    let err = order_service::submit_order(&state, session, submit("Aino", "3"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(OrderValidationError::EmptyCart)
    ));
}

#[tokio::test]
async fn customized_items_get_their_own_line() {
    let (state, _) = memory_state();
    let session = CustomerSession(Uuid::new_v4());

    cart_service::add_to_cart(&state, session, add(LATTE_ID), "en")
        .await
        .unwrap();
    let large_oat = AddToCartRequest {
        item_id: LATTE_ID,
        customizations: Some(
            CustomizationSelection::new()
                .with_single("size", "large")
                .with_single("milk", "oat"),
        ),
    };
    let cart = cart_service::add_to_cart(&state, session, large_oat, "en")
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(cart.lines.len(), 2);
    assert_eq!(cart.total_price, 480 + 480 + 50 + 60);

    let err = cart_service::remove_item(&state, session, LATTE_ID, "en")
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.code(), Some("ambiguous-line"));

    let line_id = cart.lines[1].line_id;
    let cart = cart_service::remove_line(&state, session, line_id, "en")
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.total_price, 480);
}

#[tokio::test]
async fn store_outage_keeps_the_cart() {
    let (state, store) = memory_state();
    let session = CustomerSession(Uuid::new_v4());
    cart_service::add_to_cart(&state, session, add(BURGER_ID), "en")
        .await
        .unwrap();

    store.set_offline(true);
    let err = order_service::submit_order(&state, session, submit("Aino", "2"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(err.is_retryable());
    store.set_offline(false);

    let cart = cart_service::get_cart(&state, session, "en").await.unwrap().data.unwrap();
    assert_eq!(cart.total_items, 1);
    assert_eq!(state.store.count_orders(None).await.unwrap(), 0);
}

#[tokio::test]
async fn menu_falls_back_while_the_store_is_down() {
    let (state, store) = memory_state();
    store.set_offline(true);

    let menu = menu_service::get_menu(&state, "fi").await.unwrap().data.unwrap();
    assert!(menu.fallback);
    assert!(menu.special.is_some());
    assert_eq!(menu.sections[0].category.id, "coffee");
    assert_eq!(menu.sections[0].name, "Kahvi");
}

#[tokio::test]
async fn kitchen_changes_reach_the_customer_subscription() {
    let (state, _) = memory_state();
    let session = CustomerSession(Uuid::new_v4());
    let order = place_order(&state, session).await;
    let user = staff();

    let mut subscription = tracking_service::subscribe(&state, order.id).await.unwrap();
    let first = subscription.next().await.unwrap().unwrap();
    assert_eq!(first.status, OrderStatus::Received);

    let moved = kitchen_service::advance_order(&state, &user, order.id)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(moved.status, OrderStatus::Preparing);
    let seen = subscription.next().await.unwrap().unwrap();
    assert_eq!(seen.status, OrderStatus::Preparing);

    // Repeating the same move is a no-op and publishes nothing.
    let again = kitchen_service::update_order_status(
        &state,
        &user,
        order.id,
        UpdateOrderStatusRequest {
            status: "preparing".into(),
        },
    )
    .await
    .unwrap()
    .data
    .unwrap();
    assert_eq!(again.status, OrderStatus::Preparing);

    let err = kitchen_service::update_order_status(
        &state,
        &user,
        order.id,
        UpdateOrderStatusRequest {
            status: "received".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Transition(_)));

    kitchen_service::advance_order(&state, &user, order.id)
        .await
        .unwrap();
    let seen = subscription.next().await.unwrap().unwrap();
    assert_eq!(seen.status, OrderStatus::Ready);

    let err = kitchen_service::advance_order(&state, &user, order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Transition(_)));

    kitchen_service::delete_order(&state, &user, order.id)
        .await
        .unwrap();
    assert_eq!(
        subscription.next().await,
        Some(Err(TrackingError::NotFound))
    );
    assert_eq!(subscription.next().await, None);
}

#[tokio::test]
async fn lagging_tracking_never_goes_backwards() {
    let (state, _) = memory_state_with_feed(2);
    let order = place_order(&state, CustomerSession(Uuid::new_v4())).await;
    let user = staff();

    let mut subscription = tracking_service::subscribe(&state, order.id).await.unwrap();
    let first = subscription.next().await.unwrap().unwrap();
    assert_eq!(first.status, OrderStatus::Received);

    // Three events into a buffer of two: the subscriber lags and re-reads.
    place_order(&state, CustomerSession(Uuid::new_v4())).await;
    for _ in 0..2 {
        kitchen_service::advance_order(&state, &user, order.id)
            .await
            .unwrap();
    }

    let seen = subscription.next().await.unwrap().unwrap();
    assert_eq!(seen.status, OrderStatus::Ready);

    // The buffered preparing and ready events are skipped; removal ends it.
    kitchen_service::delete_order(&state, &user, order.id)
        .await
        .unwrap();
    assert_eq!(
        subscription.next().await,
        Some(Err(TrackingError::NotFound))
    );
    assert_eq!(subscription.next().await, None);
}

#[tokio::test]
async fn kitchen_feed_streams_order_changes() {
    let (state, _) = memory_state();
    let mut feed = Box::pin(kitchen_service::order_feed(&state));

    let order = place_order(&state, CustomerSession(Uuid::new_v4())).await;
    match feed.next().await {
        Some(FeedMessage::Event(OrderEvent::Upserted { order: placed })) => {
            assert_eq!(placed.id, order.id);
            assert_eq!(placed.status, OrderStatus::Received);
        }
        other => panic!("unexpected feed message: {other:?}"),
    }

    kitchen_service::advance_order(&state, &staff(), order.id)
        .await
        .unwrap();
    match feed.next().await {
        Some(FeedMessage::Event(OrderEvent::Upserted { order: moved })) => {
            assert_eq!(moved.status, OrderStatus::Preparing);
        }
        other => panic!("unexpected feed message: {other:?}"),
    }

    kitchen_service::delete_order(&state, &staff(), order.id)
        .await
        .unwrap();
    assert_eq!(
        feed.next().await,
        Some(FeedMessage::Event(OrderEvent::Removed { order_id: order.id }))
    );
}

#[tokio::test]
async fn lagging_kitchen_feed_asks_for_a_resync() {
    let (state, _) = memory_state_with_feed(1);
    let mut feed = Box::pin(kitchen_service::order_feed(&state));

    place_order(&state, CustomerSession(Uuid::new_v4())).await;
    let latest = place_order(&state, CustomerSession(Uuid::new_v4())).await;

    assert_eq!(feed.next().await, Some(FeedMessage::Resync { skipped: 1 }));
    match feed.next().await {
        Some(FeedMessage::Event(OrderEvent::Upserted { order })) => {
            assert_eq!(order.id, latest.id);
        }
        other => panic!("unexpected feed message: {other:?}"),
    }
}

#[tokio::test]
async fn placed_orders_keep_their_prices_after_menu_edits() {
    let (state, _) = memory_state();
    let user = staff();
    let session = CustomerSession(Uuid::new_v4());

    let item = menu_service::create_item(
        &state,
        &user,
        CreateMenuItemRequest {
            name: LocalizedText::new("Flat White", "Flat white"),
            description: LocalizedText::default(),
            price: 460,
            prep_time: 4,
            category: "coffee".into(),
            badge: None,
            customizations: None,
            available: true,
        },
    )
    .await
    .unwrap()
    .data
    .unwrap();

    cart_service::add_to_cart(&state, session, add(item.id), "en")
        .await
        .unwrap();
    let order = order_service::submit_order(&state, session, submit("Aino", "3"))
        .await
        .unwrap()
        .data
        .unwrap()
        .order;
    assert_eq!(order.total_price, 460);

    menu_service::update_item(
        &state,
        &user,
        item.id,
        UpdateMenuItemRequest {
            price: Some(520),
            ..UpdateMenuItemRequest::default()
        },
    )
    .await
    .unwrap();

    let stored = state.store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(stored.total_price, 460);
    assert_eq!(stored.items[0].price, 460);
    assert_eq!(stored.items[0].item_id, Some(item.id));
}

#[tokio::test]
async fn tracking_an_unknown_order_fails_with_not_found() {
    let (state, _) = memory_state();
    let err = tracking_service::subscribe(&state, Uuid::new_v4())
        .await
        .err()
        .unwrap();
    assert_eq!(err, TrackingError::NotFound);

    let err = tracking_service::get_tracking(&state, Uuid::new_v4(), "en")
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn customers_cannot_drive_the_kitchen() {
    let (state, _) = memory_state();
    let session = CustomerSession(Uuid::new_v4());
    let order = place_order(&state, session).await;
    let customer = AuthUser {
        user_id: Uuid::new_v4(),
        role: "customer".into(),
    };

    let err = kitchen_service::advance_order(&state, &customer, order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    let stored = state.store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Received);
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<EmailTemplateParams>>,
    fail: bool,
}

#[async_trait]
impl OrderNotifier for RecordingNotifier {
    async fn send_order(&self, params: &EmailTemplateParams) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Transport("connection reset".into()));
        }
        self.sent.lock().unwrap().push(params.clone());
        Ok(())
    }
}

fn email_request() -> EmailOrderRequest {
    EmailOrderRequest {
        customer_name: "Aino".into(),
        customer_phone: "040 123 4567".into(),
        customer_email: None,
        notes: None,
        language: Some("en".into()),
    }
}

#[tokio::test]
async fn email_orders_go_to_the_notifier() {
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        notifier.clone(),
        AppConfig::local(SECRET),
    );
    let session = CustomerSession(Uuid::new_v4());
    cart_service::add_to_cart(&state, session, add(ESPRESSO_ID), "en")
        .await
        .unwrap();
    cart_service::add_to_cart(&state, session, add(BURGER_ID), "en")
        .await
        .unwrap();

    let sent = email_order_service::send_email_order(&state, session, email_request())
        .await
        .unwrap()
        .data
        .unwrap();
    assert!(sent.sent);
    assert_eq!(sent.params.order_total, "€18.40");

    let recorded = notifier.sent.lock().unwrap().clone();
    assert_eq!(recorded.len(), 1);
    assert_eq!(
        recorded[0].order_items,
        "Espresso x1 - €3.50\nBurger & Fries x1 - €14.90"
    );

    let cart = cart_service::get_cart(&state, session, "en").await.unwrap().data.unwrap();
    assert!(cart.lines.is_empty());
    assert_eq!(state.store.count_orders(None).await.unwrap(), 0);
}

#[tokio::test]
async fn failed_email_keeps_the_cart() {
    let notifier = Arc::new(RecordingNotifier {
        fail: true,
        ..RecordingNotifier::default()
    });
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        notifier,
        AppConfig::local(SECRET),
    );
    let session = CustomerSession(Uuid::new_v4());
    cart_service::add_to_cart(&state, session, add(ESPRESSO_ID), "en")
        .await
        .unwrap();

    let err = email_order_service::send_email_order(&state, session, email_request())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Notification(_)));
    assert!(err.is_retryable());

    let cart = cart_service::get_cart(&state, session, "en").await.unwrap().data.unwrap();
    assert_eq!(cart.total_items, 1);
}

#[tokio::test]
async fn staff_edit_the_menu() {
    let (state, _) = memory_state();
    let user = staff();

    let created = menu_service::create_item(
        &state,
        &user,
        CreateMenuItemRequest {
            name: LocalizedText::new("Flat White", "Flat white"),
            description: LocalizedText::default(),
            price: 460,
            prep_time: 4,
            category: "coffee".into(),
            badge: None,
            customizations: None,
            available: true,
        },
    )
    .await
    .unwrap()
    .data
    .unwrap();

    let menu = menu_service::get_menu(&state, "en").await.unwrap().data.unwrap();
    assert!(!menu.fallback);
    assert_eq!(menu.sections.len(), 1);
    assert_eq!(menu.sections[0].items[0].id, created.id);

    let updated = menu_service::update_item(
        &state,
        &user,
        created.id,
        UpdateMenuItemRequest {
            price: Some(490),
            ..UpdateMenuItemRequest::default()
        },
    )
    .await
    .unwrap()
    .data
    .unwrap();
    assert_eq!(updated.price, 490);
    assert_eq!(updated.name, created.name);

    let err = menu_service::create_item(
        &state,
        &user,
        CreateMenuItemRequest {
            name: LocalizedText::single("en", "Mystery"),
            description: LocalizedText::default(),
            price: 100,
            prep_time: 1,
            category: "coffee".into(),
            badge: None,
            customizations: None,
            available: true,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    menu_service::delete_item(&state, &user, created.id)
        .await
        .unwrap();
    let menu = menu_service::get_menu(&state, "en").await.unwrap().data.unwrap();
    assert!(menu.fallback);
}

#[tokio::test]
async fn staff_login_issues_a_usable_token() {
    let (state, _) = memory_state();
    let account = auth_service::ensure_staff_account(
        state.store.as_ref(),
        "Kitchen@Example.com",
        "kitchen123",
        "staff",
    )
    .await
    .unwrap();
    assert_eq!(account.email, "kitchen@example.com");

    let err = auth_service::login_user(
        &state,
        LoginRequest {
            email: "kitchen@example.com".into(),
            password: "wrong".into(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    let login = auth_service::login_user(
        &state,
        LoginRequest {
            email: "kitchen@example.com".into(),
            password: "kitchen123".into(),
        },
    )
    .await
    .unwrap()
    .data
    .unwrap();
    let token = login.token.strip_prefix("Bearer ").unwrap();
    let claims = decode_token(token, SECRET).unwrap();
    assert_eq!(claims.sub, account.id.to_string());
    assert_eq!(claims.role, "staff");
}
