use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use storefront_core::validation::validate_quantity;

#[derive(Parser)]
#[command(name = "storefront", about = "Storefront command-line client", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (defaults to storefront.toml in the config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List products, newest first
    Products(ProductsArgs),
    /// Show one product
    Product { id: i64 },
    /// List categories
    Categories,
    /// List brands
    Brands,
    /// Log in and remember the session
    Login { email: String, password: String },
    /// Forget the stored session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Create a customer account
    Register(RegisterArgs),
    /// Put products in a cart and place the order
    Order(OrderArgs),
    /// Show past orders
    Orders,
    /// Store administration
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Args)]
pub struct ProductsArgs {
    #[arg(short, long)]
    pub query: Option<String>,
    #[arg(long)]
    pub category: Option<i64>,
    #[arg(long)]
    pub brand: Option<i64>,
}

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub username: Option<String>,
}

#[derive(Args)]
pub struct OrderArgs {
    /// `<product id>:<quantity>`, repeatable
    #[arg(long = "item", required = true, value_parser = parse_item)]
    pub items: Vec<(i64, i64)>,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub phone: String,
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Log in as administrator
    Login { username: String, password: String },
    /// Forget the administrator session
    Logout,
    /// Add a product to the catalog
    CreateProduct(CreateProductArgs),
    /// Remove a product from the catalog
    DeleteProduct { id: i64 },
}

#[derive(Args)]
pub struct CreateProductArgs {
    #[arg(long)]
    pub name: String,
    /// Price in major units, e.g. 19.99
    #[arg(long)]
    pub price: f64,
    #[arg(long, default_value_t = 0)]
    pub discount: u32,
    #[arg(long)]
    pub stock: i64,
    #[arg(long)]
    pub colors: String,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub category: i64,
    #[arg(long)]
    pub brand: i64,
    #[arg(long)]
    pub image: Option<String>,
}

fn parse_item(raw: &str) -> Result<(i64, i64), String> {
    let (id, quantity) = raw.split_once(':').unwrap_or((raw, "1"));
    let id = id
        .trim()
        .parse()
        .map_err(|_| format!("invalid product id in '{}'", raw))?;
    let quantity = quantity
        .trim()
        .parse()
        .map_err(|_| format!("invalid quantity in '{}'", raw))?;
    validate_quantity(quantity).map_err(|err| format!("{} in '{}'", err, raw))?;
    Ok((id, quantity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item() {
        assert_eq!(parse_item("3:2"), Ok((3, 2)));
        assert_eq!(parse_item("7"), Ok((7, 1)));
        assert!(parse_item("x:1").is_err());
        assert!(parse_item("3:0").is_err());
        assert!(parse_item("3:-2").unwrap_err().contains("quantity"));
    }

    #[test]
    fn test_order_args_parse() {
        let cli = Cli::try_parse_from([
            "storefront", "order", "--item", "1:2", "--item", "4",
            "--name", "Ann", "--address", "1 Main St", "--phone", "555",
        ])
        .unwrap();

        match cli.command {
            Command::Order(args) => assert_eq!(args.items, vec![(1, 2), (4, 1)]),
            _ => panic!("expected order command"),
        }
    }
}
