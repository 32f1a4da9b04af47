//! Plain-text renderings of the catalog, product page, cart and order review.

use rust_decimal::Decimal;

use crate::{
    dto::{orders::CreatedOrder, products::ProductPage},
    models::Product,
    shop::cart::{Cart, CartTotals},
};

pub fn format_price(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

pub fn stock_label(stock: i32) -> String {
    if stock > 0 {
        format!("{stock} in stock")
    } else {
        "Out of stock".to_string()
    }
}

pub fn catalog(page: &ProductPage) -> String {
    let mut out = String::new();
    if page.products.is_empty() {
        out.push_str("No products found.\n");
    }
    for product in &page.products {
        out.push_str(&format!(
            "[{}] {:<24} {:>10}  {}\n",
            product.id,
            product.name,
            format_price(product.price),
            stock_label(product.stock)
        ));
    }
    out.push_str(&format!(
        "Page {} of {}\n",
        page.current_page,
        page.total_pages.max(1)
    ));
    out
}

pub fn product_detail(product: &Product) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", product.name));
    out.push_str(&format!("{}\n", format_price(product.price)));
    if let Some(description) = &product.description {
        out.push_str(&format!("{description}\n"));
    }
    if let Some(image_url) = &product.image_url {
        out.push_str(&format!("Image: {image_url}\n"));
    }
    out.push_str(&format!("{}\n", stock_label(product.stock)));
    out
}

pub fn cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Your cart is empty.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!("Shopping Cart ({} items)\n", cart.item_count()));
    for item in cart.items() {
        out.push_str(&format!(
            "[{}] {:<24} {:>10} x {:<3} {:>10}\n",
            item.id(),
            item.product.name,
            format_price(item.product.price),
            item.quantity,
            format_price(item.line_total())
        ));
    }
    out.push_str(&totals(&cart.totals()));
    out
}

pub fn totals(totals: &CartTotals) -> String {
    let mut out = String::new();
    out.push_str(&format!("Subtotal {:>12}\n", format_price(totals.subtotal)));
    out.push_str(&format!("Tax (10%) {:>11}\n", format_price(totals.tax)));
    out.push_str(&format!("Total {:>15}\n", format_price(totals.total)));
    out
}

/// The review step: one line per cart item and the grand total.
pub fn order_summary(cart: &Cart) -> String {
    let mut out = String::new();
    for item in cart.items() {
        out.push_str(&format!(
            "{} x {}  {}\n",
            item.product.name,
            item.quantity,
            format_price(item.line_total())
        ));
    }
    out.push_str(&format!("Total  {}\n", format_price(cart.totals().total)));
    out
}

pub fn confirmation(created: &CreatedOrder) -> String {
    format!(
        "Order #{} placed: {} line(s), total {}, status {}.\n",
        created.order.id,
        created.order_items.len(),
        format_price(created.order.total),
        created.order.status.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shop::cart::tests::product;

    #[test]
    fn prices_have_two_decimals() {
        assert_eq!(format_price(Decimal::new(9999, 2)), "$99.99");
        assert_eq!(format_price(Decimal::new(120, 0)), "$120.00");
        assert_eq!(format_price(Decimal::new(1319967, 3)), "$1319.97");
    }

    #[test]
    fn stock_labels() {
        assert_eq!(stock_label(30), "30 in stock");
        assert_eq!(stock_label(0), "Out of stock");
    }

    #[test]
    fn catalog_lists_products_and_pages() {
        let page = ProductPage {
            products: vec![product(1, 9999, 50), product(2, 19999, 0)],
            total_pages: 2,
            current_page: 1,
        };
        let text = catalog(&page);
        assert!(text.contains("[1] Product 1"));
        assert!(text.contains("$199.99"));
        assert!(text.contains("Out of stock"));
        assert!(text.ends_with("Page 1 of 2\n"));
    }

    #[test]
    fn cart_view_shows_totals() {
        let mut c = Cart::new();
        c.add(product(1, 9999, 50), Some(2));
        let text = cart(&c);
        assert!(text.starts_with("Shopping Cart (2 items)"));
        assert!(text.contains("$199.98"));
        assert!(text.contains("$20.00"));
        assert!(text.contains("$219.98"));
        assert_eq!(cart(&Cart::new()), "Your cart is empty.\n");
    }

    #[test]
    fn summary_lists_lines_and_total() {
        let mut c = Cart::new();
        c.add(product(3, 99999, 20), None);
        let text = order_summary(&c);
        assert!(text.contains("Product 3 x 1  $999.99"));
        assert!(text.contains("Total  $1099.99"));
    }
}
