#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use crate::actor_framework::FrameworkError;
    use crate::actors::NotificationService;
    use crate::app_system::{Config, StoreSystem};
    use crate::cart_actor::CartError;
    use crate::clients::{
        CartClient, NotificationClient, OrderClient, OrderLineRequest, PlaceOrder, PricingRules, ProductClient,
        PromoClient, UserClient,
    };
    use crate::domain::order::tests::shipping;
    use crate::domain::product::tests::product;
    use crate::domain::{
        Cart, CustomizationOptions, DiscountType, ItemCustomization, Order, OrderStatus, PaymentMethod,
        PaymentStatus, Product, ProductCreate, PromoCode, PromoCodeCreate, Role, User, UserCreate,
    };
    use crate::mailer::LogMailer;
    use crate::mock_framework::{create_mock_client, expect_action, expect_get};
    use crate::order_actor::OrderError;
    use crate::product_actor::{ProductAction, ProductActionResult, ProductError};

    fn customer(id: &str) -> User {
        User {
            id: id.into(),
            name: "Asha".into(),
            email: "asha@example.com".into(),
            phone: None,
            role: Role::Customer,
            password_hash: String::new(),
            wishlist: vec![],
            created_at: Utc::now(),
        }
    }

    fn line(product_id: &str, quantity: u32) -> OrderLineRequest {
        OrderLineRequest {
            product_id: product_id.into(),
            quantity,
            customization: ItemCustomization::default(),
        }
    }

    fn checkout(items: Vec<OrderLineRequest>, promo_code: Option<&str>) -> PlaceOrder {
        PlaceOrder {
            items,
            shipping_details: shipping(),
            payment_method: PaymentMethod::Cod,
            promo_code: promo_code.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_failed_reservation_releases_earlier_lines() {
        // 1. Setup Mocks
        let (user_inner, mut user_rx) = create_mock_client::<User>(10);
        let (product_inner, mut product_rx) = create_mock_client::<Product>(10);
        let (order_inner, _order_rx) = create_mock_client::<Order>(10);
        let (promo_inner, _promo_rx) = create_mock_client::<PromoCode>(10);
        let (cart_inner, _cart_rx) = create_mock_client::<Cart>(10);
        let (_notifications, notifier): (NotificationService, NotificationClient) = NotificationService::new(10, 10);

        let product_client = ProductClient::new(product_inner);
        let order_client = OrderClient::new(
            order_inner,
            UserClient::new(user_inner),
            product_client.clone(),
            PromoClient::new(promo_inner),
            CartClient::new(cart_inner, product_client),
            notifier,
            Arc::new(LogMailer),
            PricingRules::default(),
        );

        // 2. Execute checkout in background
        let order_task = tokio::spawn(async move {
            order_client
                .place_order("user_1".into(), checkout(vec![line("product_1", 2), line("product_2", 1)], None))
                .await
        });

        // 3. Verify Interactions

        // Expect User Get
        let (user_id, responder) = expect_get(&mut user_rx).await.expect("Expected User Get");
        assert_eq!(user_id, "user_1");
        responder.send(Ok(Some(customer("user_1")))).unwrap();

        // Expect a Get per line while pricing
        for expected in ["product_1", "product_2"] {
            let (id, responder) = expect_get(&mut product_rx).await.expect("Expected Product Get");
            assert_eq!(id, expected);
            responder.send(Ok(Some(product(expected, 300.0, 5)))).unwrap();
        }

        // First reservation succeeds
        let (id, action, responder) = expect_action(&mut product_rx).await.expect("Expected Reserve");
        assert_eq!(id, "product_1");
        assert!(matches!(action, ProductAction::ReserveStock(2)));
        responder.send(Ok(ProductActionResult::ReserveStock(3))).unwrap();

        // Second one is rejected by the store
        let (id, action, responder) = expect_action(&mut product_rx).await.expect("Expected Reserve");
        assert_eq!(id, "product_2");
        assert!(matches!(action, ProductAction::ReserveStock(1)));
        responder
            .send(Err(FrameworkError::Rejected("Insufficient stock: 0 available, 1 requested".into())))
            .unwrap();

        // The first reservation is handed back
        let (id, action, responder) = expect_action(&mut product_rx).await.expect("Expected Release");
        assert_eq!(id, "product_1");
        assert!(matches!(action, ProductAction::ReleaseStock(2)));
        responder.send(Ok(ProductActionResult::ReleaseStock(5))).unwrap();

        // 4. Verify Result
        let result = order_task.await.unwrap();
        assert_eq!(
            result,
            Err(OrderError::InsufficientStock("Insufficient stock: 0 available, 1 requested".into()))
        );
    }

    // --- Full system: real actors behind the clients ---

    async fn register(system: &StoreSystem, name: &str, email: &str) -> User {
        system
            .user_client
            .register(UserCreate {
                name: name.into(),
                email: email.into(),
                password: "roses123".into(),
                phone: None,
                role: Role::Customer,
            })
            .await
            .unwrap()
    }

    async fn stock_product(system: &StoreSystem, price: f64, stock: u32) -> Product {
        system
            .product_client
            .create_product(ProductCreate {
                name: "Red Roses".into(),
                description: String::new(),
                price,
                original_price: None,
                category: "Bouquets".into(),
                images: vec![],
                stock,
                is_active: true,
                vendor_id: None,
                combo_items: vec![],
                customization_options: Default::default(),
            })
            .await
            .unwrap()
    }

    async fn promo(system: &StoreSystem, code: &str, usage_limit: Option<u32>) -> PromoCode {
        let now = Utc::now();
        system
            .promo_client
            .create_promo_code(PromoCodeCreate {
                code: code.into(),
                description: String::new(),
                discount_type: DiscountType::Percentage,
                discount_value: 10.0,
                minimum_order_amount: 0.0,
                maximum_discount_amount: None,
                usage_limit,
                usage_limit_per_user: None,
                valid_from: now - Duration::days(1),
                valid_until: now + Duration::days(7),
                is_active: true,
                applicable_categories: vec![],
                excluded_categories: vec![],
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn last_promo_use_goes_to_exactly_one_concurrent_checkout() {
        let system = StoreSystem::new(&Config::default(), Arc::new(LogMailer));
        let roses = stock_product(&system, 500.0, 10).await;
        promo(&system, "LASTONE", Some(1)).await;
        let asha = register(&system, "Asha", "asha@example.com").await;
        let ravi = register(&system, "Ravi", "ravi@example.com").await;

        let attempts = [asha.id.clone(), ravi.id.clone()].map(|user_id| {
            let orders = system.order_client.clone();
            let request = checkout(vec![line(&roses.id, 1)], Some("lastone"));
            tokio::spawn(async move { orders.place_order(user_id, request).await })
        });

        let mut placed = Vec::new();
        let mut rejected = Vec::new();
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(order) => placed.push(order),
                Err(e) => rejected.push(e),
            }
        }
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].discount, 50.0);
        assert!(matches!(rejected.as_slice(), [OrderError::InvalidPromoCode(_)]));

        let code = system.promo_client.find_by_code("LASTONE".into()).await.unwrap().unwrap();
        assert_eq!(code.used_count, 1);
        assert_eq!(code.redemptions.len(), 1);
        assert_eq!(code.redemptions[0].order_number, placed[0].order_number);

        // The losing checkout put its stock back.
        assert_eq!(system.product_client.check_stock(roses.id).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn order_lifecycle_cancel_rules_and_cod_payment() {
        let system = StoreSystem::new(&Config::default(), Arc::new(LogMailer));
        let roses = stock_product(&system, 600.0, 4).await;
        let asha = register(&system, "Asha", "asha@example.com").await;
        let ravi = register(&system, "Ravi", "ravi@example.com").await;
        let orders = &system.order_client;

        let order = orders
            .place_order(asha.id.clone(), checkout(vec![line(&roses.id, 2)], None))
            .await
            .unwrap();
        assert_eq!(order.subtotal, 1200.0);
        assert_eq!(order.delivery_charge, 0.0);
        assert_eq!(order.payment.status, PaymentStatus::Pending);

        // Someone else's order is invisible to them.
        assert!(matches!(
            orders.cancel(order.id.clone(), &ravi, None).await,
            Err(OrderError::Forbidden(_))
        ));

        for status in [OrderStatus::Received, OrderStatus::BeingMade, OrderStatus::OutForDelivery] {
            orders.update_status(order.id.clone(), status, None).await.unwrap();
        }
        assert!(matches!(
            orders.cancel(order.id.clone(), &asha, Some("Too late".into())).await,
            Err(OrderError::ValidationError(_))
        ));

        let delivered = orders
            .update_status(order.id.clone(), OrderStatus::Delivered, Some("Left with the guard".into()))
            .await
            .unwrap();
        assert_eq!(delivered.payment.status, PaymentStatus::Paid);
        assert_eq!(delivered.tracking_history.len(), 5);
        assert_eq!(delivered.tracking_history[4].message, "Left with the guard");
        assert_eq!(system.product_client.check_stock(roses.id).await.unwrap(), 2);

        let mine = orders.list_mine(asha.id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert!(orders.list_mine(ravi.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn checkout_clears_the_cart() {
        let system = StoreSystem::new(&Config::default(), Arc::new(LogMailer));
        let roses = stock_product(&system, 300.0, 5).await;
        let asha = register(&system, "Asha", "asha@example.com").await;

        let cart = system
            .cart_client
            .add_item(asha.id.clone(), roses.id.clone(), 2, ItemCustomization::default())
            .await
            .unwrap();
        assert_eq!(cart.lines.len(), 1);

        // Adding past the stock level counts what is already in the cart.
        assert!(system
            .cart_client
            .add_item(asha.id.clone(), roses.id.clone(), 4, ItemCustomization::default())
            .await
            .is_err());

        system
            .order_client
            .place_order(asha.id.clone(), checkout(vec![line(&roses.id, 2)], None))
            .await
            .unwrap();
        let cart = system.cart_client.cart_for(asha.id).await.unwrap();
        assert!(cart.lines.is_empty());
    }

    #[tokio::test]
    async fn cart_quantities_stay_within_stock() {
        let system = StoreSystem::new(&Config::default(), Arc::new(LogMailer));
        let roses = system
            .product_client
            .create_product(ProductCreate {
                name: "Red Roses".into(),
                description: String::new(),
                price: 300.0,
                original_price: None,
                category: "Bouquets".into(),
                images: vec![],
                stock: 5,
                is_active: true,
                vendor_id: None,
                combo_items: vec![],
                customization_options: CustomizationOptions {
                    allow_message_card: true,
                    message_card_price: 50.0,
                    ..Default::default()
                },
            })
            .await
            .unwrap();
        let asha = register(&system, "Asha", "asha@example.com").await;
        let carts = &system.cart_client;

        let plain = carts
            .add_item(asha.id.clone(), roses.id.clone(), 3, ItemCustomization::default())
            .await
            .unwrap();
        let plain_line = plain.lines[0].line_id.clone();
        let with_card = ItemCustomization {
            message_card: Some("Happy birthday".into()),
            ..Default::default()
        };
        let cart = carts
            .add_item(asha.id.clone(), roses.id.clone(), 2, with_card)
            .await
            .unwrap();
        assert_eq!(cart.lines.len(), 2);

        // The card line already holds 2 of the 5 units.
        assert!(matches!(
            carts.set_quantity(asha.id.clone(), plain_line.clone(), 5).await,
            Err(CartError::Product(ProductError::InsufficientStock(_)))
        ));
        let cart = carts.set_quantity(asha.id.clone(), plain_line, 3).await.unwrap();
        assert_eq!(cart.item_count(), 5);

        // A quantity that would overflow the running total is refused outright.
        assert!(matches!(
            carts
                .add_item(asha.id.clone(), roses.id.clone(), u32::MAX, ItemCustomization::default())
                .await,
            Err(CartError::ValidationError(_))
        ));
        assert_eq!(carts.cart_for(asha.id).await.unwrap().item_count(), 5);
    }

    #[tokio::test]
    async fn reviews_keep_product_rating_in_sync() {
        let system = StoreSystem::new(&Config::default(), Arc::new(LogMailer));
        let roses = stock_product(&system, 300.0, 5).await;
        let asha = register(&system, "Asha", "asha@example.com").await;
        let ravi = register(&system, "Ravi", "ravi@example.com").await;
        let reviews = &system.review_client;

        let first = reviews
            .add_review(roses.id.clone(), &asha, 5, "Gorgeous".into())
            .await
            .unwrap();
        reviews
            .add_review(roses.id.clone(), &ravi, 4, "Fresh and fragrant".into())
            .await
            .unwrap();
        // One review per customer and product.
        assert!(reviews.add_review(roses.id.clone(), &asha, 1, "Again".into()).await.is_err());

        let rated = system.product_client.require(roses.id.clone()).await.unwrap();
        assert_eq!(rated.rating_average, 4.5);
        assert_eq!(rated.review_count, 2);

        assert!(reviews.remove_review(first.id.clone(), &ravi).await.is_err());
        reviews.remove_review(first.id, &asha).await.unwrap();
        let rated = system.product_client.require(roses.id.clone()).await.unwrap();
        assert_eq!(rated.rating_average, 4.0);
        assert_eq!(rated.review_count, 1);
        assert_eq!(reviews.list_for_product(roses.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_reviews_all_count_toward_rating() {
        let system = StoreSystem::new(&Config::default(), Arc::new(LogMailer));
        let roses = stock_product(&system, 300.0, 5).await;

        let mut tasks = Vec::new();
        for i in 0..8u8 {
            let author = register(&system, "Reviewer", &format!("reviewer{i}@example.com")).await;
            let reviews = system.review_client.clone();
            let product_id = roses.id.clone();
            let rating = if i % 2 == 0 { 5 } else { 4 };
            tasks.push(tokio::spawn(async move {
                reviews.add_review(product_id, &author, rating, "Lovely".into()).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let rated = system.product_client.require(roses.id).await.unwrap();
        assert_eq!(rated.review_count, 8);
        assert_eq!(rated.rating_average, 4.5);
    }

    #[tokio::test]
    async fn shutdown_stops_every_actor() {
        let system = StoreSystem::new(&Config::default(), Arc::new(LogMailer));
        register(&system, "Asha", "asha@example.com").await;
        system.shutdown(std::time::Duration::from_secs(2)).await.unwrap();
    }
}
