use std::sync::Arc;

use anyhow::{bail, Context};
use storefront_client::config::{ADMIN_STORE_FILE, SESSION_STORE_FILE};
use storefront_client::{
    AdminSession, ApiClient, AsyncResource, CartStore, Catalog, Checkout, ClientConfig, FileStore,
    HttpTransport, ProductFilter, SessionStatus, SessionStore, TokenSlot,
};
use storefront_core::{CartItem, Money, NewProduct, Product, Registration, ShippingDetails};
use tracing::debug;

use crate::cli::*;

/// Everything a command may need, wired the same way for every run.
struct App {
    api: ApiClient,
    session: Arc<SessionStore>,
    catalog: Catalog,
    admin: AdminSession,
}

impl App {
    fn build(config: &ClientConfig) -> anyhow::Result<Self> {
        let session_path = config
            .storage
            .file(SESSION_STORE_FILE)
            .context("No data directory available; set STOREFRONT_STORAGE_PATH")?;
        let admin_path = config
            .storage
            .file(ADMIN_STORE_FILE)
            .context("No data directory available; set STOREFRONT_STORAGE_PATH")?;
        debug!(?session_path, ?admin_path, "Token files");

        let transport = HttpTransport::new(&config.api.base_url)?;
        let api = ApiClient::new(
            Arc::new(transport),
            TokenSlot::session(Arc::new(FileStore::new(session_path))),
        );

        Ok(App {
            session: Arc::new(SessionStore::new(api.clone())),
            catalog: Catalog::new(api.clone()),
            admin: AdminSession::new(api.clone(), TokenSlot::admin(Arc::new(FileStore::new(admin_path)))),
            api,
        })
    }
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = ClientConfig::load(cli.config)?;
    let app = App::build(&config)?;

    let status = app.session.bootstrap().await;
    debug!(%status, "Session ready");

    match cli.command {
        Command::Products(args) => cmd_products(&app, args).await,
        Command::Product { id } => cmd_product(&app, id).await,
        Command::Categories => cmd_categories(&app).await,
        Command::Brands => cmd_brands(&app).await,
        Command::Login { email, password } => cmd_login(&app, &email, &password).await,
        Command::Logout => {
            app.session.logout()?;
            println!("Logged out.");
            Ok(())
        }
        Command::Whoami => cmd_whoami(&app),
        Command::Register(args) => cmd_register(&app, args).await,
        Command::Order(args) => cmd_order(&app, args).await,
        Command::Orders => cmd_orders(&app).await,
        Command::Admin(command) => cmd_admin(&app, command).await,
    }
}

/// Waits for the first fetch and turns a failure into an error.
async fn load<T: Clone>(resource: AsyncResource<T>) -> anyhow::Result<T> {
    let state = resource.settled().await;
    if let Some(err) = state.error {
        return Err(err.into());
    }
    state.data.context("Server returned no data")
}

fn print_product_line(product: &Product) {
    let price = if product.is_discounted() {
        format!("{} (-{}%, was {})", product.unit_price(), product.discount, product.price)
    } else {
        product.price.to_string()
    };
    println!("{:>5}  {:<32} {:>10}  stock {}", product.id, product.name, price, product.stock);
}

// =============================================================================
// Catalog
// =============================================================================

async fn cmd_products(app: &App, args: ProductsArgs) -> anyhow::Result<()> {
    let filter = ProductFilter {
        search: args.query.unwrap_or_default(),
        category_id: args.category,
        brand_id: args.brand,
    };
    let products = load(app.catalog.products(&filter)).await?;

    if products.is_empty() {
        println!("No products found.");
    }
    for product in &products {
        print_product_line(product);
    }
    Ok(())
}

async fn cmd_product(app: &App, id: i64) -> anyhow::Result<()> {
    let product = load(app.catalog.product(Some(id))).await?;

    print_product_line(&product);
    if let Some(category) = &product.category {
        println!("       category: {}", category.name);
    }
    if let Some(brand) = &product.brand {
        println!("       brand:    {}", brand.name);
    }
    if !product.colors.is_empty() {
        println!("       colors:   {}", product.colors);
    }
    let image = product.primary_image();
    if !image.is_empty() {
        println!("       image:    {}", image);
    }
    println!();
    println!("{}", product.description);
    Ok(())
}

async fn cmd_categories(app: &App) -> anyhow::Result<()> {
    for category in load(app.catalog.categories()).await? {
        println!("{:>5}  {}", category.id, category.name);
    }
    Ok(())
}

async fn cmd_brands(app: &App) -> anyhow::Result<()> {
    for brand in load(app.catalog.brands()).await? {
        println!("{:>5}  {}", brand.id, brand.name);
    }
    Ok(())
}

// =============================================================================
// Session
// =============================================================================

async fn cmd_login(app: &App, email: &str, password: &str) -> anyhow::Result<()> {
    let user = app.session.login(email, password).await?;
    println!("Logged in as {}.", user.display_name());
    Ok(())
}

fn cmd_whoami(app: &App) -> anyhow::Result<()> {
    match app.session.user() {
        Some(user) => println!("{} (id {})", user.display_name(), user.id),
        None => println!("Not logged in."),
    }
    Ok(())
}

async fn cmd_register(app: &App, args: RegisterArgs) -> anyhow::Result<()> {
    let mut form = Registration::new(args.email, args.password);
    form.name = args.name;
    form.username = args.username;

    app.session.register(&form).await?;
    println!("Account created. Log in with `storefront login`.");
    Ok(())
}

// =============================================================================
// Orders
// =============================================================================

async fn cmd_order(app: &App, args: OrderArgs) -> anyhow::Result<()> {
    if app.session.status() != SessionStatus::Authenticated {
        bail!("Log in first with `storefront login`");
    }

    let cart = Arc::new(CartStore::new());
    for (id, quantity) in args.items {
        let product = load(app.catalog.product(Some(id)))
            .await
            .with_context(|| format!("Could not load product {}", id))?;

        cart.add_to_cart(CartItem::from_product(&product));
        let current = cart
            .snapshot()
            .get(id)
            .map(|item| item.quantity)
            .unwrap_or(1);
        cart.update_quantity(id, current.saturating_add(quantity - 1));
    }

    for item in cart.items() {
        println!("{:>3} x {:<32} {:>10}", item.quantity, item.name, item.line_total().to_string());
    }
    println!("Total: {}", cart.total());

    let checkout = Checkout::new(app.api.clone(), app.session.clone(), cart);
    let shipping = ShippingDetails {
        name: args.name,
        address: args.address,
        phone: args.phone,
    };
    let receipt = checkout.place_order(&shipping).await?;

    println!("Order placed. Invoice {}.", receipt.invoice);
    Ok(())
}

async fn cmd_orders(app: &App) -> anyhow::Result<()> {
    if app.session.status() != SessionStatus::Authenticated {
        bail!("Log in first with `storefront login`");
    }

    let checkout = Checkout::new(app.api.clone(), app.session.clone(), Arc::new(CartStore::new()));
    let orders = checkout.order_history().await?;

    if orders.is_empty() {
        println!("No orders yet.");
    }
    for order in &orders {
        println!(
            "{}  {}  {:<10} {:>10}",
            order.invoice,
            order.date_created.format("%Y-%m-%d %H:%M"),
            order.status.as_deref().unwrap_or("-"),
            order.total().to_string()
        );
        for line in order.orders.values() {
            println!("      {:>3} x {}", line.quantity, line.name);
        }
    }
    Ok(())
}

// =============================================================================
// Admin
// =============================================================================

async fn cmd_admin(app: &App, command: AdminCommand) -> anyhow::Result<()> {
    match command {
        AdminCommand::Login { username, password } => {
            app.admin.login(&username, &password).await?;
            println!("Administrator logged in.");
        }
        AdminCommand::Logout => {
            app.admin.logout()?;
            println!("Administrator logged out.");
        }
        AdminCommand::CreateProduct(args) => {
            let product = NewProduct {
                name: args.name,
                price: Money::from_major_f64(args.price),
                discount: args.discount,
                stock: args.stock,
                colors: args.colors,
                description: args.description,
                category_id: args.category,
                brand_id: args.brand,
                image_1: args.image,
            };
            let created = app.admin.create_product(&product).await?;
            println!("Created product {}.", created.id);
            print_product_line(&created);
        }
        AdminCommand::DeleteProduct { id } => {
            app.admin.delete_product(id).await?;
            println!("Deleted product {}.", id);
        }
    }
    Ok(())
}
