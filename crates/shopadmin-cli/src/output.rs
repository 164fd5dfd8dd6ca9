//! Plain-text rendering of API resources for the terminal.

use shopadmin_core::dashboard::Dashboard;
use shopadmin_core::models::{ContactMessage, Order, Page, Product, User};
use shopadmin_core::utils::{
    format_date, format_flag, format_optional, format_price_with_currency, truncate_string,
};
use shopadmin_core::SessionData;

const NAME_WIDTH: usize = 28;
const SUBJECT_WIDTH: usize = 36;

fn date(value: Option<&str>) -> String {
    value.map(format_date).unwrap_or_else(|| "-".to_string())
}

fn page_footer<T>(page: &Page<T>, page_size: u32) {
    println!(
        "\nPage {} of {} ({} total)",
        page.current_page.max(1),
        page.total_pages(page_size),
        page.count
    );
}

pub fn session(session: &SessionData) {
    println!("Logged in as {}", session.display_name());
    if let Some(ref email) = session.email {
        println!("  Email: {}", email);
    }
    println!("  Admin: {}", format_flag(session.is_admin));
    println!("  Since: {}", session.created_at.format("%Y-%m-%d %H:%M UTC"));
}

pub fn users(page: &Page<User>, page_size: u32) {
    println!("{:<6} {:<20} {:<30} {:<6}", "ID", "USERNAME", "EMAIL", "ADMIN");
    for user in &page.results {
        println!(
            "{:<6} {:<20} {:<30} {:<6}",
            user.id,
            truncate_string(&user.username, 20),
            truncate_string(&user.email, 30),
            format_flag(user.has_admin_rights())
        );
    }
    page_footer(page, page_size);
}

pub fn user(user: &User) {
    println!("User #{}", user.id);
    println!("  Username: {}", user.username);
    println!("  Name:     {}", user.full_name());
    println!("  Email:    {}", user.email);
    println!("  Admin:    {}", format_flag(user.has_admin_rights()));
}

pub fn products(page: &Page<Product>, page_size: u32) {
    println!(
        "{:<6} {:<28} {:<16} {:>14} {:>6}",
        "ID", "NAME", "CATEGORY", "PRICE", "STOCK"
    );
    for product in &page.results {
        println!(
            "{:<6} {:<28} {:<16} {:>14} {:>6}",
            product.id,
            truncate_string(product.display_name(), NAME_WIDTH),
            truncate_string(&format_optional(product.category.as_deref(), "-"), 16),
            format_price_with_currency(product.price, &product.price_currency),
            product.stock()
        );
    }
    page_footer(page, page_size);
}

pub fn product(product: &Product) {
    println!("Product #{}: {}", product.id, product.display_name());
    println!(
        "  Price:    {}",
        format_price_with_currency(product.price, &product.price_currency)
    );
    println!("  Stock:    {}", product.stock());
    println!("  Category: {}", format_optional(product.category.as_deref(), "-"));
    println!("  Brand:    {}", format_optional(product.brand.as_deref(), "-"));
    println!(
        "  Rating:   {:.1} ({} reviews)",
        product.rating,
        product.num_reviews.unwrap_or(0)
    );
    if let Some(ref description) = product.description {
        println!("\n{}", description);
    }
}

pub fn orders(page: &Page<Order>, page_size: u32) {
    println!(
        "{:<6} {:<12} {:>12} {:<5} {:<9} {:<10} {:<16}",
        "ID", "DATE", "TOTAL", "PAID", "DELIVERED", "STATUS", "COUNTRY"
    );
    for order in &page.results {
        println!(
            "{:<6} {:<12} {:>12} {:<5} {:<9} {:<10} {:<16}",
            order.id,
            date(order.created_at.as_deref()),
            format_price_with_currency(order.total_price, "USD"),
            format_flag(order.is_paid),
            format_flag(order.is_delivered),
            order.status,
            truncate_string(order.country(), 16)
        );
    }
    page_footer(page, page_size);
}

pub fn order(order: &Order) {
    println!("Order #{}", order.id);
    println!("  Placed:    {}", date(order.created_at.as_deref()));
    println!("  Payment:   {}", format_optional(order.payment_method.as_deref(), "-"));
    println!("  Paid:      {}", format_flag(order.is_paid));
    println!("  Delivered: {}", format_flag(order.is_delivered));
    println!("  Refunded:  {}", format_flag(order.is_refunded));
    println!("  Status:    {}", order.status);
    println!("  Tracking:  {}", format_optional(order.tracking_number.as_deref(), "-"));
    println!("  ETA:       {}", format_optional(order.estimated_delivery.as_deref(), "-"));
    if order.awaits_transfer_approval() {
        println!("  Transfer confirmed by customer, awaiting approval");
    }
    if let Some(ref address) = order.shipping_address {
        println!(
            "  Ship to:   {}, {} {}, {}",
            format_optional(address.address.as_deref(), "-"),
            format_optional(address.city.as_deref(), "-"),
            format_optional(address.postal_code.as_deref(), ""),
            order.country()
        );
    }

    println!("\n  Items:");
    for item in &order.items {
        println!(
            "    {:>3} x {:<28} {:>12}",
            item.qty.unwrap_or(0),
            truncate_string(item.name.as_deref().unwrap_or("-"), NAME_WIDTH),
            format_price_with_currency(item.price, "USD")
        );
    }
    println!("  Tax:      {}", format_price_with_currency(order.tax_price, "USD"));
    println!("  Shipping: {}", format_price_with_currency(order.shipping_price, "USD"));
    println!("  Total:    {}", format_price_with_currency(order.total_price, "USD"));
}

pub fn messages(page: &Page<ContactMessage>, page_size: u32) {
    println!(
        "{:<6} {:<1} {:<28} {:<36} {:<12}",
        "ID", "", "FROM", "SUBJECT", "RECEIVED"
    );
    for message in &page.results {
        println!(
            "{:<6} {:<1} {:<28} {:<36} {:<12}",
            message.id,
            if message.is_read { " " } else { "*" },
            truncate_string(message.sender(), NAME_WIDTH),
            truncate_string(&format_optional(message.subject.as_deref(), "(no subject)"), SUBJECT_WIDTH),
            date(message.created_at.as_deref())
        );
    }
    page_footer(page, page_size);
}

pub fn message(message: &ContactMessage) {
    println!("Message #{} from {}", message.id, message.sender());
    println!("  Subject:  {}", format_optional(message.subject.as_deref(), "(no subject)"));
    println!("  Received: {}", date(message.created_at.as_deref()));
    println!("\n{}", format_optional(message.message.as_deref(), ""));
    if message.has_reply() {
        println!("\nReply:\n{}", format_optional(message.admin_reply.as_deref(), ""));
    }
}

pub fn dashboard(d: &Dashboard) {
    println!("Overview");
    println!("  Total sales:  {}", format_price_with_currency(d.total_sales, "USD"));
    println!("  Total income: {}", format_price_with_currency(d.total_income, "USD"));
    println!("  Orders paid:  {} of {}", d.orders_paid, d.order_count);
    println!("  Users:        {}", d.user_count);
    println!("  Products:     {}", d.product_count);

    println!("\nLast 7 days");
    for day in &d.last_7_days {
        println!(
            "  {} {}  {:>12}",
            day.label,
            day.date,
            format_price_with_currency(day.sales, "USD")
        );
    }

    println!("\nMonthly earnings");
    for month in &d.monthly {
        println!("  {}  {:>12}", month.month, format_price_with_currency(month.value, "USD"));
    }

    println!("\nTop products");
    for product in &d.top_products {
        println!(
            "  {:<6} {:<28} {:>14} stock {}",
            product.id,
            truncate_string(product.display_name(), NAME_WIDTH),
            format_price_with_currency(product.price, &product.price_currency),
            product.stock()
        );
    }

    println!("\nTop countries");
    for country in &d.top_countries {
        println!(
            "  {:<20} {:>12}",
            truncate_string(&country.country, 20),
            format_price_with_currency(country.revenue, "USD")
        );
    }

    println!("\nRecent orders");
    for order in &d.recent_orders {
        println!(
            "  #{:<6} {:<12} {:>12} paid {}",
            order.id,
            date(order.created_at.as_deref()),
            format_price_with_currency(order.total_price, "USD"),
            format_flag(order.is_paid)
        );
    }
}
