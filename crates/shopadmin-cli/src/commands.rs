//! Command dispatch for the `shopadmin` binary.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context as _, Result};
use tracing::{debug, warn};

use shopadmin_core::api::messages::MESSAGE_PAGE_SIZE;
use shopadmin_core::models::{
    ListQuery, OrderUpdate, PaidFilter, ProductForm, ProductImage, TrackingUpdate, UserUpdate,
};
use shopadmin_core::{
    ApiClient, BulkDelete, Config, CredentialStore, Dashboard, FileSessionStore, LoginRedirect,
};

use crate::args::{
    Cli, Command, ListArgs, MessagesCommand, OrdersCommand, ProductArgs, ProductsCommand,
    UsersCommand,
};
use crate::output;

/// Rows per page on the list commands
const LIST_PAGE_SIZE: u32 = 10;

const EMAIL_ENV: &str = "SHOPADMIN_EMAIL";
const PASSWORD_ENV: &str = "SHOPADMIN_PASSWORD";

/// Tells the terminal user to sign in again once the session is gone
struct CliRedirect;

impl LoginRedirect for CliRedirect {
    fn redirect_to_login(&self) {
        eprintln!("Session expired. Run `shopadmin login` to sign in again.");
    }
}

struct Context {
    config: Config,
    client: ApiClient,
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let store = FileSessionStore::new(Config::config_dir()?);
    let client = ApiClient::new(&config.api_url(), Arc::new(store))?
        .with_redirect(Arc::new(CliRedirect));
    debug!(api_url = %client.base_url(), command = ?cli.command, "Running command");

    let mut ctx = Context { config, client };

    let command = match cli.command {
        Command::Login { email, remember } => return login(&mut ctx, email, remember).await,
        Command::Logout => return logout(&ctx),
        command => command,
    };

    let session = ctx.client.ensure_admin(ctx.config.admin_check()).await?;

    match command {
        Command::Whoami => {
            output::session(&session);
            Ok(())
        }
        Command::Dashboard => {
            let dashboard = Dashboard::load(&ctx.client).await?;
            output::dashboard(&dashboard);
            Ok(())
        }
        Command::Users(command) => users(&ctx, command).await,
        Command::Products(command) => products(&ctx, command).await,
        Command::Orders(command) => orders(&ctx, command).await,
        Command::Messages(command) => messages(&ctx, command).await,
        Command::Login { .. } | Command::Logout => Ok(()),
    }
}

// ===== Session =====

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}


fn login_email(ctx: &Context, email: Option<String>) -> Result<String> {
    if let Some(email) = email
        .or_else(|| std::env::var(EMAIL_ENV).ok())
        .filter(|e| !e.is_empty())
    {
        return Ok(email);
    }

    let email = match ctx.config.last_email {
        Some(ref last) => {
            let input = prompt(&format!("Email [{}]: ", last))?;
            if input.is_empty() {
                last.clone()
            } else {
                input
            }
        }
        None => prompt("Email: ")?,
    };
    if email.is_empty() {
        bail!("Email is required");
    }
    Ok(email)
}

fn login_password(email: &str) -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        if !password.is_empty() {
            return Ok(password);
        }
    }

    match CredentialStore::remembered_password(email) {
        Ok(Some(password)) => {
            let input = prompt("Use stored password? [Y/n]: ")?;
            if !input.eq_ignore_ascii_case("n") {
                return Ok(password);
            }
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Keychain unavailable"),
    }

    rpassword::prompt_password("Password: ").context("Failed to read password")
}

async fn login(ctx: &mut Context, email: Option<String>, remember: bool) -> Result<()> {
    let email = login_email(ctx, email)?;
    let password = login_password(&email)?;

    eprintln!("Authenticating...");
    let session = ctx.client.login(&email, &password).await?;

    if remember {
        if let Err(e) = CredentialStore::remember(&email, &password) {
            warn!(error = %e, "Failed to store credentials");
        }
    }

    ctx.config.last_email = Some(email);
    if let Err(e) = ctx.config.save() {
        warn!(error = %e, "Failed to save config");
    }

    println!("Logged in as {}", session.display_name());
    if !session.is_admin {
        println!("This account is not marked as an administrator; admin commands may be refused.");
    }
    Ok(())
}

fn logout(ctx: &Context) -> Result<()> {
    ctx.client.logout()?;
    if let Some(ref email) = ctx.config.last_email {
        if let Err(e) = CredentialStore::forget(email) {
            warn!(error = %e, "Failed to remove stored password");
        }
    }
    println!("Logged out");
    Ok(())
}

// ===== Resources =====

fn list_query(list: ListArgs) -> ListQuery {
    ListQuery::new(list.page, LIST_PAGE_SIZE).search(list.search)
}

fn report_deleted(kind: &str, result: BulkDelete) -> Result<()> {
    println!("Deleted {} {}", result.deleted.len(), kind);
    match result.failed {
        Some((id, e)) => Err(anyhow!("Failed to delete {} {}: {}", kind, id, e)),
        None => Ok(()),
    }
}

async fn users(ctx: &Context, command: UsersCommand) -> Result<()> {
    match command {
        UsersCommand::List(list) => {
            let page = ctx.client.list_users(&list_query(list)).await?;
            output::users(&page, LIST_PAGE_SIZE);
        }
        UsersCommand::Show { id } => {
            let user = ctx.client.get_user(id).await?;
            output::user(&user);
        }
        UsersCommand::Update {
            id,
            username,
            email,
            name,
            admin,
        } => {
            let update = UserUpdate {
                username,
                email,
                name,
                is_admin: admin,
                password: None,
            };
            let user = ctx.client.update_user(id, &update).await?;
            println!("User updated");
            output::user(&user);
        }
        UsersCommand::Delete { ids } => {
            let result = ctx.client.delete_users(&ids).await;
            report_deleted("user(s)", result)?;
        }
    }
    Ok(())
}

/// Overlay the product options given on the command line onto a form
fn apply_product_options(form: &mut ProductForm, fields: ProductArgs) -> Result<()> {
    if let Some(name) = fields.name {
        form.name = name;
    }
    if let Some(description) = fields.description {
        form.description = description;
    }
    if let Some(price) = fields.price {
        form.price = price;
    }
    if let Some(currency) = fields.currency {
        form.price_currency = currency.to_uppercase();
    }
    if let Some(stock) = fields.stock {
        form.count_in_stock = stock;
    }
    if fields.sku.is_some() {
        form.sku = fields.sku;
    }
    if fields.category.is_some() {
        form.category = fields.category;
    }
    if let Some(path) = fields.image {
        form.image = Some(ProductImage::from_path(&path)?);
    }
    Ok(())
}

async fn products(ctx: &Context, command: ProductsCommand) -> Result<()> {
    match command {
        ProductsCommand::List { list, category } => {
            let page = ctx
                .client
                .list_products(&list_query(list), category.as_deref())
                .await?;
            output::products(&page, LIST_PAGE_SIZE);
        }
        ProductsCommand::Show { id } => {
            let product = ctx.client.get_product(id).await?;
            output::product(&product);
        }
        ProductsCommand::Create(fields) => {
            let mut form = ProductForm::default();
            apply_product_options(&mut form, fields)?;
            let product = ctx.client.create_product(&form).await?;
            println!("Product created");
            output::product(&product);
        }
        ProductsCommand::Update { id, fields } => {
            let existing = ctx.client.get_product(id).await?;
            let mut form = ProductForm::from_product(&existing);
            apply_product_options(&mut form, fields)?;
            let product = ctx.client.update_product(id, &form).await?;
            println!("Product updated");
            output::product(&product);
        }
        ProductsCommand::Delete { ids } => {
            let result = ctx.client.delete_products(&ids).await;
            report_deleted("product(s)", result)?;
        }
    }
    Ok(())
}

async fn flag_update(ctx: &Context, id: i64, update: OrderUpdate) -> Result<()> {
    let order = ctx.client.update_order(id, &update).await?;
    output::order(&order);
    Ok(())
}

async fn orders(ctx: &Context, command: OrdersCommand) -> Result<()> {
    match command {
        OrdersCommand::List { list, paid, unpaid } => {
            let paid = match (paid, unpaid) {
                (true, _) => PaidFilter::Paid,
                (false, true) => PaidFilter::Unpaid,
                (false, false) => PaidFilter::All,
            };
            let page = ctx.client.list_orders(&list_query(list), paid).await?;
            output::orders(&page, LIST_PAGE_SIZE);
        }
        OrdersCommand::Show { id } => {
            let order = ctx.client.get_order(id).await?;
            output::order(&order);
        }
        OrdersCommand::MarkPaid { id } => {
            flag_update(ctx, id, OrderUpdate {
                is_paid: Some(true),
                ..Default::default()
            })
            .await?
        }
        OrdersCommand::MarkDelivered { id } => {
            flag_update(ctx, id, OrderUpdate {
                is_delivered: Some(true),
                ..Default::default()
            })
            .await?
        }
        OrdersCommand::MarkRefunded { id } => {
            flag_update(ctx, id, OrderUpdate {
                is_refunded: Some(true),
                ..Default::default()
            })
            .await?
        }
        OrdersCommand::Tracking {
            id,
            status,
            number,
            eta,
        } => {
            let update = TrackingUpdate {
                status,
                tracking_number: number,
                estimated_delivery: eta,
            };
            let (detail, order) = ctx.client.update_tracking(id, &update).await?;
            println!("{}", detail);
            output::order(&order);
        }
        OrdersCommand::ApproveTransfer { id } => {
            let (detail, order) = ctx.client.approve_transfer(id).await?;
            println!("{}", detail);
            output::order(&order);
        }
    }
    Ok(())
}

async fn messages(ctx: &Context, command: MessagesCommand) -> Result<()> {
    match command {
        MessagesCommand::List { page } => {
            let page = ctx.client.list_messages(page).await?;
            output::messages(&page, MESSAGE_PAGE_SIZE);
        }
        MessagesCommand::Show { id } => {
            let message = ctx.client.open_message(id).await?;
            output::message(&message);
        }
        MessagesCommand::Reply { id, text } => {
            let message = ctx.client.reply_to_message(id, &text.join(" ")).await?;
            println!("Reply sent");
            output::message(&message);
        }
    }
    Ok(())
}
