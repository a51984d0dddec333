// UI layer: runs one subcommand. Missing options are asked for with
// `dialoguer`, destructive token operations need a confirmation, and a
// spinner is shown while the request is in flight.

use crate::api::ReportingClient;
use crate::cli::{
    wire_name, Commands, ConfirmArgs, DateType, FinancialReportArgs, ReportSubtype, ReportType,
    SalesReportArgs,
};
use crate::transport::{RawResponse, Transport};
use anyhow::Result;
use clap::ValueEnum;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Dispatch a parsed subcommand against the client.
pub fn run<T: Transport>(client: &mut ReportingClient<T>, command: Commands) -> Result<()> {
    match command {
        Commands::GenerateToken(args) => {
            if confirmed(&args, "This will delete your old token. Do you want to proceed?")? {
                let reply = with_spinner("Generating token...", || client.generate_token());
                println!("{reply}");
            }
        }
        Commands::ViewToken => {
            println!("{}", with_spinner("Fetching token...", || client.view_token()));
        }
        Commands::DeleteToken(args) => {
            if confirmed(&args, "This will delete your token. Do you want to proceed?")? {
                println!("{}", with_spinner("Deleting token...", || client.delete_token()));
            }
        }
        Commands::GetAccounts(args) => {
            let service = choose_or(args.service, "Service")?;
            println!("{}", with_spinner("Fetching accounts...", || client.get_accounts(service)));
        }
        Commands::GetStatus(args) => {
            let service = choose_or(args.service, "Service")?;
            println!("{}", with_spinner("Fetching status...", || client.get_status(service)));
        }
        Commands::GetVendors(args) => {
            let account = input_or(args.account, "Account")?;
            println!("{}", with_spinner("Fetching vendors...", || client.get_vendors(&account)));
        }
        Commands::GetReportVersion(args) => {
            let report_type: ReportType = choose_or(args.report_type, "Report type")?;
            let report_subtype: ReportSubtype = choose_or(args.report_subtype, "Report subtype")?;
            let (report_type, report_subtype) = (wire_name(&report_type), wire_name(&report_subtype));
            let reply = with_spinner("Fetching report version...", || {
                client.get_report_version(&report_type, &report_subtype)
            });
            println!("{reply}");
        }
        Commands::GetVendorAndRegions(args) => {
            let account = input_or(args.account, "Account")?;
            let vendor = input_or(args.vendor, "Vendor")?;
            let reply = with_spinner("Fetching vendor regions...", || {
                client.get_vendor_and_regions(&account, &vendor)
            });
            println!("{reply}");
        }
        Commands::GetSalesReport(args) => sales_report(client, args)?,
        Commands::GetFinancialReport(args) => financial_report(client, args)?,
    }
    Ok(())
}

fn sales_report<T: Transport>(client: &ReportingClient<T>, args: SalesReportArgs) -> Result<()> {
    let account = input_or(args.account, "Account")?;
    let vendor = input_or(args.vendor, "Vendor")?;
    let date_type: DateType = choose_or(args.date_type, "Date type")?;
    let date = input_or(args.date, "Date")?;
    let dir = path_or(args.path)?;

    let date_type = wire_name(&date_type);
    let result = with_spinner("Downloading sales report...", || {
        client.get_sales_report(&account, &vendor, &date_type, &date)
    });
    report_saved(result.map_err(Into::into).and_then(|res| save_report(&res, &dir)));
    Ok(())
}

fn financial_report<T: Transport>(
    client: &ReportingClient<T>,
    args: FinancialReportArgs,
) -> Result<()> {
    let account = input_or(args.account, "Account")?;
    let vendor = input_or(args.vendor, "Vendor")?;
    let region = input_or(args.region, "Region")?;
    let fiscal_year = input_or(args.fiscal_year, "Fiscal year")?;
    let fiscal_period = input_or(args.fiscal_period, "Fiscal period")?;
    let dir = path_or(args.path)?;

    let result = with_spinner("Downloading financial report...", || {
        client.try_get_financial_report(&account, &vendor, &region, &fiscal_year, &fiscal_period)
    });
    report_saved(result.map_err(Into::into).and_then(|res| save_report(&res, &dir)));
    Ok(())
}

/// Print where a report went, or why it did not.
fn report_saved(result: Result<PathBuf>) {
    match result {
        Ok(path) => println!("Report saved to {}", path.display()),
        Err(e) => println!("{e}"),
    }
}

/// Write a report body to `dir`, named after its `filename` header.
pub fn save_report(res: &RawResponse, dir: &Path) -> Result<PathBuf> {
    let filename = res.filename()?;
    let name = Path::new(filename)
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report file name '{filename}'"))?;
    let path = dir.join(name);
    std::fs::write(&path, &res.body)?;
    tracing::info!(path = %path.display(), bytes = res.body.len(), "Saved report");
    Ok(path)
}

fn confirmed(args: &ConfirmArgs, prompt: &str) -> Result<bool> {
    if args.yes {
        return Ok(true);
    }
    let ok = Confirm::new().with_prompt(prompt).default(false).interact()?;
    if !ok {
        println!("Aborted!");
    }
    Ok(ok)
}

fn input_or(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(Input::new().with_prompt(prompt).interact_text()?),
    }
}

/// Use the given value or let the user pick one of the enum's variants.
fn choose_or<V: ValueEnum + Clone>(value: Option<V>, prompt: &str) -> Result<V> {
    if let Some(v) = value {
        return Ok(v);
    }
    let variants = V::value_variants();
    let items: Vec<String> = variants.iter().map(wire_name).collect();
    let selection = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()?;
    Ok(variants[selection].clone())
}

fn path_or(value: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = value {
        return Ok(path);
    }
    let cwd = std::env::current_dir()?;
    let path: String = Input::new()
        .with_prompt("Path")
        .default(cwd.display().to_string())
        .interact_text()?;
    Ok(PathBuf::from(path))
}

fn with_spinner<R>(message: &'static str, f: impl FnOnce() -> R) -> R {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = f();
    spinner.finish_and_clear();
    result
}
