use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use vendor_payouts::application::payout_service::PayoutService;
use vendor_payouts::application::settlement::SimulatedProcessor;
use vendor_payouts::application::vendor_service::VendorService;
use vendor_payouts::config::Config;
use vendor_payouts::domain::payout::{PayoutFilter, PayoutRequest, PayoutStatus};
use vendor_payouts::domain::ports::{PayoutStoreRef, VendorStoreRef};
use vendor_payouts::domain::vendor::{VendorFilter, VendorPatch, VendorRegistration, VendorStatus};
use vendor_payouts::infrastructure::in_memory::{InMemoryStore, InMemoryVendorCache};
use vendor_payouts::interfaces::output::{ListingWriter, OutputFormat};
use vendor_payouts::interfaces::requests::read_request;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a vendor from a JSON registration file
    Register { request: PathBuf },
    /// Fetch a vendor by id
    Get { id: Uuid },
    /// Fetch the vendor owned by a user
    GetByUser { user_id: Uuid },
    /// Apply a JSON patch file to a vendor
    Update { id: Uuid, patch: PathBuf },
    /// Activate a pending or suspended vendor
    Approve { id: Uuid },
    /// Suspend an active vendor
    Suspend { id: Uuid },
    /// Reject a pending vendor
    Reject { id: Uuid },
    /// List vendors, newest first
    ListVendors {
        #[arg(long)]
        status: Option<VendorStatus>,
        #[arg(long)]
        search: Option<String>,
        #[command(flatten)]
        window: Window,
    },
    /// Create a payout from a JSON payout request file
    CreatePayout { request: PathBuf },
    /// Fetch a payout by id
    GetPayout { id: Uuid },
    /// List payouts, newest first
    ListPayouts {
        #[arg(long)]
        vendor_id: Option<Uuid>,
        #[arg(long)]
        status: Option<PayoutStatus>,
        #[command(flatten)]
        window: Window,
    },
    /// Move a pending payout to processing and start settlement
    ProcessPayout {
        id: Uuid,
        /// Wait for settlement and print the final payout. Without it the
        /// process may exit before settlement finishes, leaving the payout
        /// in `processing`
        #[arg(long)]
        wait: bool,
    },
    /// Sum of pending payout amounts for a vendor
    PendingAmount { vendor_id: Uuid },
}

#[derive(clap::Args)]
struct Window {
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    page: i64,
    #[arg(long, default_value_t = 20, allow_negative_numbers = true)]
    limit: i64,
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
    {
        eprintln!("tracing init failed: {e}");
    }
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(config: &Config) -> Result<(VendorStoreRef, PayoutStoreRef)> {
    use vendor_payouts::infrastructure::rocksdb::RocksDBStore;

    if let Some(db_path) = &config.db_path {
        // Use persistent storage (RocksDB)
        let store = Arc::new(RocksDBStore::open(db_path).into_diagnostic()?);
        let vendors: VendorStoreRef = store.clone();
        let payouts: PayoutStoreRef = store;
        return Ok((vendors, payouts));
    }
    Ok(in_memory_stores())
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(config: &Config) -> Result<(VendorStoreRef, PayoutStoreRef)> {
    if config.db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_stores())
}

fn in_memory_stores() -> (VendorStoreRef, PayoutStoreRef) {
    let store = Arc::new(InMemoryStore::new());
    let vendors: VendorStoreRef = store.clone();
    let payouts: PayoutStoreRef = store;
    (vendors, payouts)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.config;

    let (vendor_store, payout_store) = open_stores(&config)?;
    let vendors = VendorService::new(
        vendor_store.clone(),
        Arc::new(InMemoryVendorCache::new()),
        &config,
    );
    let payouts = PayoutService::new(payout_store, vendor_store, Arc::new(SimulatedProcessor));

    let stdout = io::stdout();
    let mut out = ListingWriter::new(stdout.lock());

    match cli.command {
        Command::Register { request } => {
            let request: VendorRegistration = read_request(&request).into_diagnostic()?;
            let vendor = vendors.register(request).await.into_diagnostic()?;
            out.write_json(&vendor).into_diagnostic()?;
        }
        Command::Get { id } => {
            let vendor = vendors.get(id).await.into_diagnostic()?;
            out.write_json(&vendor).into_diagnostic()?;
        }
        Command::GetByUser { user_id } => {
            let vendor = vendors.get_by_user_id(user_id).await.into_diagnostic()?;
            out.write_json(&vendor).into_diagnostic()?;
        }
        Command::Update { id, patch } => {
            let patch: VendorPatch = read_request(&patch).into_diagnostic()?;
            let vendor = vendors.update(id, patch).await.into_diagnostic()?;
            out.write_json(&vendor).into_diagnostic()?;
        }
        Command::Approve { id } => {
            let vendor = vendors.approve(id).await.into_diagnostic()?;
            out.write_json(&vendor).into_diagnostic()?;
        }
        Command::Suspend { id } => {
            let vendor = vendors.suspend(id).await.into_diagnostic()?;
            out.write_json(&vendor).into_diagnostic()?;
        }
        Command::Reject { id } => {
            let vendor = vendors.reject(id).await.into_diagnostic()?;
            out.write_json(&vendor).into_diagnostic()?;
        }
        Command::ListVendors {
            status,
            search,
            window,
        } => {
            let filter = VendorFilter { status, search };
            let page = vendors
                .list(&filter, config.pagination(window.page, window.limit))
                .await
                .into_diagnostic()?;
            out.write_vendors(&page, window.format).into_diagnostic()?;
        }
        Command::CreatePayout { request } => {
            let request: PayoutRequest = read_request(&request).into_diagnostic()?;
            let payout = payouts.create(request).await.into_diagnostic()?;
            out.write_json(&payout).into_diagnostic()?;
        }
        Command::GetPayout { id } => {
            let payout = payouts.get(id).await.into_diagnostic()?;
            out.write_json(&payout).into_diagnostic()?;
        }
        Command::ListPayouts {
            vendor_id,
            status,
            window,
        } => {
            let filter = PayoutFilter { vendor_id, status };
            let page = payouts
                .list(&filter, config.pagination(window.page, window.limit))
                .await
                .into_diagnostic()?;
            out.write_payouts(&page, window.format).into_diagnostic()?;
        }
        Command::ProcessPayout { id, wait } => {
            let receipt = payouts.process(id).await.into_diagnostic()?;
            if wait {
                let settled = receipt.settlement.outcome().await.into_diagnostic()?;
                out.write_json(&settled).into_diagnostic()?;
            } else {
                out.write_json(&receipt.payout).into_diagnostic()?;
            }
        }
        Command::PendingAmount { vendor_id } => {
            let amount = payouts.pending_amount(vendor_id).await.into_diagnostic()?;
            out.write_json(&serde_json::json!({
                "vendor_id": vendor_id,
                "pending_amount": amount,
            }))
            .into_diagnostic()?;
        }
    }

    Ok(())
}
