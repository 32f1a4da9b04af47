//! Terminal storefront: browse the catalog, keep a cart on disk and check out
//! against the storefront API.

use std::io::{self, Lines, StdinLock, Write};
use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront::shop::{
    ApiClient, CartStore, Checkout, CheckoutForm, ClientError, FETCH_PRODUCT_FAILED,
    FETCH_PRODUCTS_FAILED, Field, Step,
    api::{CATALOG_PAGE_SIZE, DEFAULT_API_URL},
    cart::DEFAULT_CART_PATH,
    checkout::FieldErrors,
    views,
};

/// Browse the storefront, manage your cart and place orders
#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the storefront API
    #[arg(long, global = true, env = "STOREFRONT_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// File the cart is kept in between runs
    #[arg(long, global = true, env = "STOREFRONT_CART_PATH", default_value = DEFAULT_CART_PATH)]
    cart_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of the catalog
    Products {
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, default_value_t = CATALOG_PAGE_SIZE)]
        limit: u64,
    },

    /// Show a product's details
    Product { id: i32 },

    /// Add a product to the cart
    Add {
        id: i32,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },

    /// Remove a product from the cart
    Remove { id: i32 },

    /// Change the quantity of a cart line (bounded by stock)
    SetQuantity { id: i32, quantity: u32 },

    /// Show the cart and its totals
    Cart,

    /// Run the shipping -> payment -> review checkout
    Checkout(CheckoutArgs),
}

#[derive(Args)]
struct CheckoutArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    postal_code: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    card_number: Option<String>,
    #[arg(long)]
    card_expiry: Option<String>,
    #[arg(long)]
    card_cvc: Option<String>,

    /// Place the order without prompting; every field must be given as a flag
    #[arg(long)]
    yes: bool,
}

impl CheckoutArgs {
    fn form(&self) -> CheckoutForm {
        let mut form = CheckoutForm::default();
        let values = [
            (Field::FirstName, &self.first_name),
            (Field::LastName, &self.last_name),
            (Field::Email, &self.email),
            (Field::Address, &self.address),
            (Field::City, &self.city),
            (Field::PostalCode, &self.postal_code),
            (Field::Country, &self.country),
            (Field::CardNumber, &self.card_number),
            (Field::CardExpiry, &self.card_expiry),
            (Field::CardCvc, &self.card_cvc),
        ];
        for (field, value) in values {
            if let Some(value) = value {
                form.set(field, value.clone());
            }
        }
        form
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let client = ApiClient::new(&cli.api_url)?;
    let mut store = CartStore::open(&cli.cart_file)?;

    match cli.command {
        Commands::Products { page, limit } => {
            let page = client
                .list_products(page, limit)
                .await
                .map_err(|err| fetch_error(err, FETCH_PRODUCTS_FAILED))?;
            print!("{}", views::catalog(&page));
        }
        Commands::Product { id } => {
            let product = fetch_product(&client, id).await?;
            print!("{}", views::product_detail(&product));
        }
        Commands::Add { id, quantity } => {
            let product = fetch_product(&client, id).await?;
            let quantity = store.cart().check_stock(&product, quantity)?;
            let name = product.name.clone();
            store.update(|cart| cart.add(product, Some(quantity)))?;
            println!(
                "Added {quantity} x {name}. Cart: {} item(s).",
                store.cart().item_count()
            );
        }
        Commands::Remove { id } => {
            if !store.update(|cart| cart.remove(id))? {
                bail!("Product {id} is not in your cart");
            }
            print!("{}", views::cart(store.cart()));
        }
        Commands::SetQuantity { id, quantity } => {
            let Some(stored) = store.update(|cart| cart.update_quantity(id, quantity))? else {
                bail!("Product {id} is not in your cart");
            };
            if stored != quantity {
                println!("Quantity adjusted to {stored}.");
            }
            print!("{}", views::cart(store.cart()));
        }
        Commands::Cart => print!("{}", views::cart(store.cart())),
        Commands::Checkout(args) => checkout(&client, &mut store, &args).await?,
    }

    Ok(())
}

async fn fetch_product(client: &ApiClient, id: i32) -> Result<storefront::models::Product> {
    client.get_product(id).await.map_err(|err| {
        if err.status() == Some(404) {
            anyhow!("Product not found")
        } else {
            fetch_error(err, FETCH_PRODUCT_FAILED)
        }
    })
}

fn fetch_error(err: ClientError, message: &'static str) -> anyhow::Error {
    tracing::debug!(error = %err, "fetch failed");
    anyhow!(message)
}

async fn checkout(client: &ApiClient, store: &mut CartStore, args: &CheckoutArgs) -> Result<()> {
    if store.cart().is_empty() {
        bail!("Your cart is empty.");
    }

    let mut wizard = Checkout::with_form(args.form());
    if args.yes {
        while wizard.step() != Step::Review {
            if let Err(errors) = wizard.next() {
                print_errors(&errors);
                bail!("Checkout details are incomplete");
            }
        }
        print!("{}", views::order_summary(store.cart()));
    } else if !run_wizard(&mut wizard, store)? {
        println!("Checkout cancelled.");
        return Ok(());
    }

    let created = wizard.submit(client, store).await?;
    print!("{}", views::confirmation(&created));
    Ok(())
}

/// Walk the wizard on stdin. Returns `false` if the shopper quits.
fn run_wizard(wizard: &mut Checkout, store: &CartStore) -> Result<bool> {
    let mut lines = io::stdin().lines();
    loop {
        let step = wizard.step();
        println!("\nStep {} of 3: {}", step.number(), step.title());

        if step == Step::Review {
            print!("{}", views::order_summary(store.cart()));
            match prompt(&mut lines, "[p]lace order, [b]ack, [q]uit")?.as_str() {
                "p" | "place" => return Ok(true),
                "b" | "back" => {
                    wizard.back();
                }
                "q" | "quit" => return Ok(false),
                _ => {}
            }
            continue;
        }

        for field in step.fields() {
            let current = wizard.form().value(*field).to_string();
            let answer = prompt(&mut lines, &format!("{} [{}]", field.label(), current))?;
            if !answer.is_empty() {
                wizard.form_mut().set(*field, answer);
            }
        }

        let choices = if step == Step::Shipping {
            "[n]ext, [q]uit"
        } else {
            "[n]ext, [b]ack, [q]uit"
        };
        match prompt(&mut lines, choices)?.as_str() {
            "b" | "back" => {
                wizard.back();
            }
            "q" | "quit" => return Ok(false),
            _ => {
                if let Err(errors) = wizard.next() {
                    print_errors(&errors);
                }
            }
        }
    }
}

fn prompt(lines: &mut Lines<StdinLock<'static>>, label: &str) -> Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(line?.trim().to_string()),
        None => bail!("input closed before checkout finished"),
    }
}

fn print_errors(errors: &FieldErrors) {
    for (field, message) in errors {
        println!("  {field}: {message}");
    }
}
