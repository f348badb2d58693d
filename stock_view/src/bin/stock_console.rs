use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use inventory_gateway::{
    AuthGateway, DataGateway, GatewayConfig, GatewayError, InMemoryGateway, RestGateway,
    SessionContext,
    models::{BranchId, ProductId, StockId},
};
use rust_decimal::Decimal;
use secrecy::SecretString;
use shared_utils::env::get_env_var;
use stock_view::{
    BranchForm, BranchesViewModel, DashboardSummary, Navigation, ProductForm, ProductsViewModel,
    Route, SalesViewModel, StatusMessage, StockRows, StockViewModel, SubmitError, auth_gate,
};
use tracing::{info, warn};

const PASSWORD_ENV: &str = "INVENTORY_PASSWORD";
const DEMO_USER: &str = "demo";

#[derive(Parser)]
#[command(version, about = "Inventory stock console")]
struct Cli {
    /// Work against seeded in-process data instead of the REST API.
    #[arg(long)]
    offline: bool,
    /// TOML file with `base_url` and `timeout_secs`. Defaults to the environment.
    #[arg(long, value_name = "FILE", conflicts_with = "offline")]
    config: Option<PathBuf>,
    /// Log in before running the command. The password comes from INVENTORY_PASSWORD.
    #[arg(long)]
    username: Option<String>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Show stock, totalled per product unless a branch is given.
    Stock {
        #[arg(long)]
        branch: Option<i64>,
    },
    /// Add stock, merging into an existing branch/product record.
    AddStock(StockArgs),
    UpdateStock {
        id: i64,
        #[command(flatten)]
        stock: StockArgs,
    },
    DeleteStock {
        id: i64,
    },
    /// Record a sale.
    Sell(StockArgs),
    Products,
    /// Add a product, optionally with initial stock at one branch.
    AddProduct {
        #[command(flatten)]
        product: ProductArgs,
        #[arg(long, requires = "stock")]
        branch: Option<i64>,
        #[arg(long, requires = "branch")]
        stock: Option<u32>,
    },
    UpdateProduct {
        id: i64,
        #[command(flatten)]
        product: ProductArgs,
    },
    /// Delete a product with its stock and sales.
    DeleteProduct {
        id: i64,
    },
    Branches,
    AddBranch(BranchArgs),
    UpdateBranch {
        id: i64,
        #[command(flatten)]
        branch: BranchArgs,
    },
    /// Delete a branch with its stock and sales.
    DeleteBranch {
        id: i64,
    },
    Dashboard,
}

#[derive(Args)]
struct ProductArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    price: Decimal,
}

#[derive(Args)]
struct BranchArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    location: String,
}

#[derive(Args)]
struct StockArgs {
    #[arg(long)]
    branch: i64,
    #[arg(long)]
    product: i64,
    #[arg(long)]
    quantity: u32,
}

impl Cmd {
    fn route(&self) -> Route {
        match self {
            Cmd::Sell(_) => Route::Sales,
            Cmd::Products
            | Cmd::AddProduct { .. }
            | Cmd::UpdateProduct { .. }
            | Cmd::DeleteProduct { .. } => Route::Products,
            Cmd::Branches
            | Cmd::AddBranch(_)
            | Cmd::UpdateBranch { .. }
            | Cmd::DeleteBranch { .. } => Route::Branches,
            Cmd::Dashboard => Route::Dashboard,
            _ => Route::Stock,
        }
    }
}

type Gateways = (Arc<dyn DataGateway>, Arc<dyn AuthGateway>);

fn split<G>(gateway: G) -> Gateways
where
    G: DataGateway + AuthGateway + 'static,
{
    let gateway = Arc::new(gateway);
    let data: Arc<dyn DataGateway> = gateway.clone();
    (data, gateway)
}

fn demo_gateway() -> InMemoryGateway {
    let gateway = InMemoryGateway::new();
    let main = gateway.seed_branch("Main Store", "High Street");
    let north = gateway.seed_branch("North Branch", "Ring Road");
    let pen = gateway.seed_product("Pen", Decimal::new(150, 2));
    let book = gateway.seed_product("Book", Decimal::new(1250, 2));
    gateway.seed_stock(main.id, pen.id, 10);
    gateway.seed_stock(north.id, pen.id, 5);
    gateway.seed_stock(main.id, book.id, 2);
    gateway.seed_user(DEMO_USER, "demo@example.com", DEMO_USER);
    gateway
}

fn connect(cli: &Cli) -> Result<Gateways> {
    if cli.offline {
        info!("using seeded in-memory data");
        return Ok(split(demo_gateway()));
    }
    let config = match &cli.config {
        Some(path) => GatewayConfig::from_toml_path(path)?,
        None => GatewayConfig::from_env()?,
    };
    info!(base_url = %config.base_url, "connecting to inventory API");
    Ok(split(RestGateway::new(config)?))
}

fn print_message(message: Option<&StatusMessage>) {
    match message {
        Some(message) if message.is_error() => eprintln!("{}", message.text),
        Some(message) => println!("{}", message.text),
        None => {}
    }
}

fn print_rows(rows: &StockRows) {
    match rows {
        StockRows::Aggregated(rows) => {
            for row in rows {
                println!(
                    "{:<24} {:>8}  {}",
                    row.product_name,
                    row.total_quantity,
                    row.branches.join(", ")
                );
            }
        }
        StockRows::Branch(records) => {
            for record in records {
                println!(
                    "#{:<5} {:<24} {:>8}",
                    record.id.0, record.product_name, record.quantity
                );
            }
        }
    }
}

/// Fails with a login hint if the gateway reported an expired session.
fn check_session(err: &GatewayError, route: &Route, session: &SessionContext) -> Result<()> {
    if auth_gate::on_gateway_error(err, &route.path(), session) == Navigation::RedirectToLogin {
        bail!("session expired; log in again with --username and {PASSWORD_ENV}");
    }
    Ok(())
}

async fn run(cmd: Cmd, data: Arc<dyn DataGateway>) -> Result<(), GatewayError> {
    match cmd {
        Cmd::Stock { branch } => {
            let mut vm = StockViewModel::new(data);
            vm.load().await?;
            vm.set_filter(branch.map(BranchId));
            if let Some(label) = vm.selected_branch_label() {
                println!("{label}");
            }
            print_rows(&vm.rows());
        }
        Cmd::AddStock(args) => {
            let mut vm = StockViewModel::new(data);
            let form = vm.form_mut();
            form.branch = Some(BranchId(args.branch));
            form.product = Some(ProductId(args.product));
            form.quantity = Some(args.quantity);
            let result = vm.submit().await;
            print_message(vm.message());
            submitted(result)?;
        }
        Cmd::UpdateStock { id, stock } => {
            let mut vm = StockViewModel::new(data);
            vm.load().await?;
            let Some(record) = vm.records().iter().find(|r| r.id == StockId(id)).cloned() else {
                return Err(GatewayError::NotFound {
                    message: Some(format!("Stock {id} not found")),
                });
            };
            vm.begin_edit(&record);
            let form = vm.form_mut();
            form.branch = Some(BranchId(stock.branch));
            form.product = Some(ProductId(stock.product));
            form.quantity = Some(stock.quantity);
            let result = vm.submit().await;
            print_message(vm.message());
            submitted(result)?;
        }
        Cmd::DeleteStock { id } => {
            let mut vm = StockViewModel::new(data);
            let result = vm.delete(StockId(id)).await;
            print_message(vm.message());
            result?;
        }
        Cmd::Sell(args) => {
            let mut vm = SalesViewModel::new(data);
            vm.load().await?;
            let form = vm.form_mut();
            form.branch = Some(BranchId(args.branch));
            form.product = Some(ProductId(args.product));
            form.quantity = Some(args.quantity);
            if let Some(shortfall) = vm.advisory_shortfall() {
                warn!("{shortfall}");
            }
            let result = vm.submit().await.map(|_| ());
            print_message(vm.message());
            submitted(result)?;
        }
        Cmd::Products => {
            let mut vm = ProductsViewModel::new(data);
            vm.load().await?;
            for product in vm.products() {
                println!("#{:<5} {:<24} {:>10}", product.id.0, product.name, product.price);
            }
        }
        Cmd::AddProduct {
            product,
            branch,
            stock,
        } => {
            let mut vm = ProductsViewModel::new(data);
            *vm.form_mut() = ProductForm {
                name: product.name,
                price: Some(product.price),
                branch: branch.map(BranchId),
                stock_quantity: stock,
            };
            let result = vm.submit().await.map(|_| ());
            print_message(vm.message());
            submitted(result)?;
        }
        Cmd::UpdateProduct { id, product } => {
            let mut vm = ProductsViewModel::new(data);
            vm.load().await?;
            let Some(current) = vm.products().iter().find(|p| p.id == ProductId(id)).cloned() else {
                return Err(GatewayError::NotFound {
                    message: Some(format!("Product {id} not found")),
                });
            };
            vm.begin_edit(&current);
            let form = vm.form_mut();
            form.name = product.name;
            form.price = Some(product.price);
            let result = vm.submit().await.map(|_| ());
            print_message(vm.message());
            submitted(result)?;
        }
        Cmd::DeleteProduct { id } => {
            let mut vm = ProductsViewModel::new(data);
            let result = vm.delete(ProductId(id)).await;
            print_message(vm.message());
            result?;
        }
        Cmd::Branches => {
            let mut vm = BranchesViewModel::new(data);
            vm.load().await?;
            for branch in vm.branches() {
                println!("#{:<5} {:<24} {}", branch.id.0, branch.name, branch.location);
            }
        }
        Cmd::AddBranch(args) => {
            let mut vm = BranchesViewModel::new(data);
            *vm.form_mut() = BranchForm {
                name: args.name,
                location: args.location,
            };
            let result = vm.submit().await.map(|_| ());
            print_message(vm.message());
            submitted(result)?;
        }
        Cmd::UpdateBranch { id, branch } => {
            let mut vm = BranchesViewModel::new(data);
            vm.load().await?;
            let Some(current) = vm.branches().iter().find(|b| b.id == BranchId(id)).cloned() else {
                return Err(GatewayError::NotFound {
                    message: Some(format!("Branch {id} not found")),
                });
            };
            vm.begin_edit(&current);
            *vm.form_mut() = BranchForm {
                name: branch.name,
                location: branch.location,
            };
            let result = vm.submit().await.map(|_| ());
            print_message(vm.message());
            submitted(result)?;
        }
        Cmd::DeleteBranch { id } => {
            let mut vm = BranchesViewModel::new(data);
            let result = vm.delete(BranchId(id)).await;
            print_message(vm.message());
            result?;
        }
        Cmd::Dashboard => {
            let summary = DashboardSummary::load(data.as_ref()).await?;
            println!("Products:      {}", summary.total_products);
            println!("Branches:      {}", summary.total_branches);
            println!("Stock records: {}", summary.total_stock_records);
            println!("Units held:    {}", summary.total_stock_units);
            println!("Sales:         {}", summary.total_sales);
        }
    }
    Ok(())
}

/// Validation failures were already printed; only gateway errors propagate.
fn submitted(result: Result<(), SubmitError>) -> Result<(), GatewayError> {
    match result {
        Ok(()) | Err(SubmitError::Invalid(_)) => Ok(()),
        Err(SubmitError::Gateway(err)) => Err(err),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let (data, auth) = connect(&cli)?;
    let session = SessionContext::new(auth);
    session.init().await.context("checking session")?;

    if let Some(username) = &cli.username {
        let password = SecretString::new(get_env_var(PASSWORD_ENV)?.into());
        session.login(username, &password).await.context("logging in")?;
    } else if cli.offline {
        let password = SecretString::new(DEMO_USER.into());
        session.login(DEMO_USER, &password).await.context("logging in")?;
    }

    let route = cli.cmd.route();
    if auth_gate::guard(&route, &session) == Navigation::RedirectToLogin {
        bail!("{route} requires a login; pass --username and set {PASSWORD_ENV}");
    }

    if let Err(err) = run(cli.cmd, data).await {
        check_session(&err, &route, &session)?;
        return Err(err.into());
    }
    Ok(())
}
