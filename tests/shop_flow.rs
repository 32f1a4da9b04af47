mod common;

use std::net::SocketAddr;

use rust_decimal::Decimal;
use storefront::{
    routes::create_app,
    shop::{ApiClient, CartStore, Checkout, CheckoutError, CheckoutForm, Step},
};

async fn spawn_server() -> anyhow::Result<SocketAddr> {
    let state = common::setup_state().await?;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, create_app(state)).await {
            eprintln!("test server stopped: {err}");
        }
    });
    Ok(addr)
}

fn shipping_and_payment() -> CheckoutForm {
    CheckoutForm {
        first_name: "Grace".into(),
        last_name: "Hopper".into(),
        email: "grace@example.com".into(),
        address: "1 Compiler Rd".into(),
        city: "Arlington".into(),
        postal_code: "22201".into(),
        country: "US".into(),
        card_number: "4000056655665556".into(),
        card_expiry: "01/30".into(),
        card_cvc: "321".into(),
    }
}

// browse -> add to cart -> checkout wizard -> order placed -> cart cleared
#[tokio::test]
async fn browse_cart_and_checkout() -> anyhow::Result<()> {
    let addr = spawn_server().await?;
    let client = ApiClient::new(format!("http://{addr}"))?;
    let dir = tempfile::tempdir()?;
    let cart_path = dir.path().join("cart.json");

    let page = client.list_products(1, 2).await?;
    assert_eq!(page.products.len(), 2);
    assert_eq!(page.total_pages, 2);

    let headphones = client.get_product(page.products[0].id).await?;
    let laptop = client.get_product(3).await?;

    let mut store = CartStore::open(&cart_path)?;
    store.update(|cart| cart.add(headphones, Some(2)))?;
    store.update(|cart| cart.add(laptop, None))?;
    assert_eq!(store.cart().totals().total, Decimal::new(131997, 2));

    let mut checkout = Checkout::with_form(shipping_and_payment());
    assert!(matches!(
        checkout.submit(&client, &mut store).await,
        Err(CheckoutError::NotAtReview)
    ));
    assert_eq!(checkout.next(), Ok(Step::Payment));
    assert_eq!(checkout.next(), Ok(Step::Review));

    let created = checkout.submit(&client, &mut store).await?;
    assert_eq!(created.order_items.len(), 2);
    assert_eq!(created.order.total, Decimal::new(131997, 2));
    assert_eq!(
        created.order.shipping_address,
        "1 Compiler Rd, Arlington, 22201, US"
    );
    assert_eq!(checkout.step(), Step::Shipping);

    assert!(store.cart().is_empty());
    assert!(CartStore::open(&cart_path)?.cart().is_empty());

    let fetched = client.get_order(created.order.id).await?;
    assert_eq!(fetched.order_items, created.order_items);
    Ok(())
}

#[tokio::test]
async fn failed_order_keeps_the_cart() -> anyhow::Result<()> {
    let addr = spawn_server().await?;
    let client = ApiClient::new(format!("http://{addr}"))?;
    let dir = tempfile::tempdir()?;

    let mut ghost = client.get_product(1).await?;
    ghost.id = 404;

    let mut store = CartStore::open(dir.path().join("cart.json"))?;
    store.update(|cart| cart.add(ghost, None))?;

    let mut checkout = Checkout::with_form(shipping_and_payment());
    checkout.next().map_err(|e| anyhow::anyhow!("{e:?}"))?;
    checkout.next().map_err(|e| anyhow::anyhow!("{e:?}"))?;

    let err = checkout.submit(&client, &mut store).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to process order. Please try again.");
    match err {
        CheckoutError::Submit(source) => assert_eq!(source.status(), Some(400)),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(store.cart().items().len(), 1);
    assert_eq!(checkout.step(), Step::Review);
    Ok(())
}

#[tokio::test]
async fn client_reports_api_errors() -> anyhow::Result<()> {
    let addr = spawn_server().await?;
    let client = ApiClient::new(format!("http://{addr}/"))?;

    let err = client.get_product(999).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("Product not found"));
    Ok(())
}
