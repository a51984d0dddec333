//! Command-line definitions.
//!
//! Options left out on the command line are asked for interactively, so all
//! of them are optional here.

use crate::query::Service;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Client for the sales and finance reporting service
#[derive(Parser, Debug)]
#[command(name = "reporter", version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the credential file
    #[arg(short, long, global = true, env = "REPORTER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new access token, replacing the current one
    #[command(alias = "GenerateToken")]
    GenerateToken(ConfirmArgs),

    /// Show the current access token and its expiration date
    #[command(alias = "ViewToken")]
    ViewToken,

    /// Delete the current access token
    #[command(alias = "DeleteToken")]
    DeleteToken(ConfirmArgs),

    /// List the accounts available to the user
    #[command(alias = "GetAccounts")]
    GetAccounts(ServiceArgs),

    /// Show the service status
    #[command(alias = "GetStatus")]
    GetStatus(ServiceArgs),

    /// List the vendor numbers of an account
    #[command(alias = "GetVendors")]
    GetVendors(AccountArgs),

    /// Show the current version of a report type
    #[command(name = "get-report-version", alias = "GetReportType")]
    GetReportVersion(ReportVersionArgs),

    /// Show a vendor's number and its financial report regions
    #[command(alias = "GetVendorAndRegions")]
    GetVendorAndRegions(VendorArgs),

    /// Download a summary sales report
    #[command(alias = "GetSalesReport")]
    GetSalesReport(SalesReportArgs),

    /// Download a financial report
    #[command(alias = "GetFinancialReport")]
    GetFinancialReport(FinancialReportArgs),
}

#[derive(Parser, Debug)]
pub struct ConfirmArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser, Debug)]
pub struct ServiceArgs {
    #[arg(long, value_enum)]
    pub service: Option<Service>,
}

#[derive(Parser, Debug)]
pub struct AccountArgs {
    #[arg(long)]
    pub account: Option<String>,
}

#[derive(Parser, Debug)]
pub struct VendorArgs {
    #[arg(long)]
    pub account: Option<String>,

    #[arg(long)]
    pub vendor: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ReportVersionArgs {
    #[arg(long, value_enum)]
    pub report_type: Option<ReportType>,

    #[arg(long, value_enum)]
    pub report_subtype: Option<ReportSubtype>,
}

#[derive(Parser, Debug)]
pub struct SalesReportArgs {
    #[arg(long)]
    pub account: Option<String>,

    #[arg(long)]
    pub vendor: Option<String>,

    #[arg(long, value_enum)]
    pub date_type: Option<DateType>,

    /// Report date, e.g. 20261017 for a daily report
    #[arg(long)]
    pub date: Option<String>,

    /// Directory the report is saved to (defaults to the working directory)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct FinancialReportArgs {
    #[arg(long)]
    pub account: Option<String>,

    #[arg(long)]
    pub vendor: Option<String>,

    /// Region code, e.g. US
    #[arg(long)]
    pub region: Option<String>,

    #[arg(long)]
    pub fiscal_year: Option<String>,

    #[arg(long)]
    pub fiscal_period: Option<String>,

    /// Directory the report is saved to (defaults to the working directory)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "PascalCase")]
pub enum DateType {
    Yearly,
    Monthly,
    Weekly,
    Daily,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportType {
    #[value(name = "Sales")]
    Sales,
    #[value(name = "Subscription")]
    Subscription,
    #[value(name = "SubscriptionEvent")]
    SubscriptionEvent,
    #[value(name = "Subscriber")]
    Subscriber,
    #[value(name = "Newsstand")]
    Newsstand,
    #[value(name = "Pre-Order")]
    PreOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportSubtype {
    #[value(name = "Summary")]
    Summary,
    #[value(name = "Detailed")]
    Detailed,
    #[value(name = "Opt-In")]
    OptIn,
}

/// Wire name of a value enum, as the service expects it.
pub fn wire_name<V: ValueEnum>(value: &V) -> String {
    value
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}
