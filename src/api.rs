// API client module: one blocking client that posts queries to the sales and
// finance reporting endpoints and decodes what comes back.
//
// Every operation comes in two forms. `try_*` returns a `Result` with the
// real error. The plain form returns a `Reply`, where a failure is reported
// as its error text in place of the data; that is what the command line
// prints. Report downloads (`get_sales_report`) only exist in the typed form.

use crate::config::{CredentialStore, Endpoints};
use crate::decode::{self, Account, MessageInfo, StatusInfo, TokenInfo, VendorRegions};
use crate::error::Result;
use crate::logging::redact_payload;
use crate::query::{Command, Query, QueryBuilder, Service};
use crate::reply::Reply;
use crate::transport::{HttpTransport, RawResponse, Transport, SERVICE_REQUEST_ID};

/// Client holding the transport, the credential store and the endpoints
/// derived from it.
pub struct ReportingClient<T: Transport = HttpTransport> {
    transport: T,
    store: CredentialStore,
    endpoints: Endpoints,
}

impl ReportingClient<HttpTransport> {
    /// Create a client that talks to the configured endpoints over HTTPS.
    pub fn from_store(store: CredentialStore) -> Result<Self> {
        Ok(Self::new(HttpTransport::new()?, store))
    }
}

impl<T: Transport> ReportingClient<T> {
    pub fn new(transport: T, store: CredentialStore) -> Self {
        let endpoints = store.credentials().endpoints();
        Self {
            transport,
            store,
            endpoints,
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn endpoint(&self, service: Service) -> &str {
        match service {
            Service::Sales => &self.endpoints.sales,
            Service::Finance => &self.endpoints.finance,
        }
    }

    fn query(&self, command: Command) -> QueryBuilder<'_> {
        QueryBuilder::new(self.store.credentials(), command)
    }

    /// Send a query to the endpoint of its service. Anything but 200 is
    /// decoded as an error document.
    fn post(&self, query: Query) -> Result<RawResponse> {
        let endpoint = self.endpoint(query.command.service());
        tracing::debug!(
            %endpoint,
            command = %query.command,
            payload = %redact_payload(&query.payload),
            "Posting query"
        );

        let form = query.form()?;
        let res = self.transport.post(endpoint, &form)?;
        if res.is_success() {
            Ok(res)
        } else {
            tracing::warn!(status = %res.status, command = %query.command, "Request rejected");
            Err(decode::api_error(&res.text()))
        }
    }

    /// Issue a new access token and write it to the credential store.
    ///
    /// The first request only yields a `service_request_id` header; the
    /// second one, sent with that id, returns the token.
    #[tracing::instrument(skip(self))]
    pub fn try_generate_token(&mut self) -> Result<TokenInfo> {
        let command = Command::new(Service::Sales, "generateToken");
        let first = self.post(self.query(command.clone()).password().build()?)?;
        let request_id = first.header(SERVICE_REQUEST_ID)?.to_string();
        tracing::debug!(%request_id, "Token request accepted");

        let res = self.post(
            self.query(command)
                .password()
                .url_param("isExistingToken", "Y")
                .url_param("requestId", request_id)
                .build()?,
        )?;
        let info = decode::token(&res.text())?;
        self.store.set_token(info.access_token.clone())?;
        tracing::info!(expires = %info.expiration_date, "Stored new access token");
        Ok(info)
    }

    pub fn generate_token(&mut self) -> Reply<TokenInfo> {
        self.try_generate_token().into()
    }

    pub fn try_view_token(&self) -> Result<TokenInfo> {
        let command = Command::new(Service::Sales, "viewToken");
        let res = self.post(self.query(command).password().build()?)?;
        decode::token(&res.text())
    }

    pub fn view_token(&self) -> Reply<TokenInfo> {
        self.try_view_token().into()
    }

    pub fn try_delete_token(&self) -> Result<MessageInfo> {
        let command = Command::new(Service::Sales, "deleteToken");
        let res = self.post(self.query(command).password().build()?)?;
        decode::message(&res.text())
    }

    pub fn delete_token(&self) -> Reply<MessageInfo> {
        self.try_delete_token().into()
    }

    pub fn try_get_accounts(&self, service: Service) -> Result<Vec<Account>> {
        let command = Command::new(service, "getAccounts");
        let res = self.post(self.query(command).access_token().build()?)?;
        decode::accounts(&res.text())
    }

    pub fn get_accounts(&self, service: Service) -> Reply<Vec<Account>> {
        self.try_get_accounts(service).into()
    }

    pub fn try_get_vendors(&self, account: &str) -> Result<Vec<String>> {
        let command = Command::new(Service::Sales, "getVendors");
        let query = self
            .query(command)
            .param("account", account)
            .access_token()
            .build()?;
        decode::vendors(&self.post(query)?.text())
    }

    pub fn get_vendors(&self, account: &str) -> Reply<Vec<String>> {
        self.try_get_vendors(account).into()
    }

    pub fn try_get_status(&self, service: Service) -> Result<StatusInfo> {
        let command = Command::new(service, "getStatus");
        let res = self.post(self.query(command).access_token().build()?)?;
        decode::status(&res.text())
    }

    pub fn get_status(&self, service: Service) -> Reply<StatusInfo> {
        self.try_get_status(service).into()
    }

    pub fn try_get_vendor_and_regions(&self, account: &str, vendor: &str) -> Result<VendorRegions> {
        let command = Command::new(Service::Finance, "getVendorsAndRegions");
        let query = self
            .query(command)
            .access_token()
            .param("account", account)
            .param("vendor", vendor)
            .build()?;
        decode::vendor_regions(&self.post(query)?.text())
    }

    pub fn get_vendor_and_regions(&self, account: &str, vendor: &str) -> Reply<VendorRegions> {
        self.try_get_vendor_and_regions(account, vendor).into()
    }

    pub fn try_get_report_version(&self, report_type: &str, report_subtype: &str) -> Result<MessageInfo> {
        let command = Command::new(Service::Sales, "getReportVersion")
            .arg(report_type)
            .arg(report_subtype);
        let res = self.post(self.query(command).access_token().build()?)?;
        decode::message(&res.text())
    }

    pub fn get_report_version(&self, report_type: &str, report_subtype: &str) -> Reply<MessageInfo> {
        self.try_get_report_version(report_type, report_subtype).into()
    }

    /// Download a summary sales report. The response is returned as is; its
    /// `filename` header names the file the body belongs in.
    #[tracing::instrument(skip(self))]
    pub fn get_sales_report(
        &self,
        account: &str,
        vendor: &str,
        date_type: &str,
        date: &str,
    ) -> Result<RawResponse> {
        let command = Command::new(Service::Sales, "getReport")
            .arg(vendor)
            .arg("Sales")
            .arg("Summary")
            .arg(date_type)
            .arg(date);
        let query = self
            .query(command)
            .param("account", account)
            .access_token()
            .build()?;
        self.post(query)
    }

    /// Financial report for one vendor, region and fiscal period.
    pub fn try_get_financial_report(
        &self,
        account: &str,
        vendor: &str,
        region: &str,
        fiscal_year: &str,
        fiscal_period: &str,
    ) -> Result<RawResponse> {
        let command = Command::new(Service::Finance, "getReport")
            .arg(vendor)
            .arg(region)
            .arg("Financial")
            .arg(fiscal_year)
            .arg(fiscal_period);
        let query = self
            .query(command)
            .param("account", account)
            .access_token()
            .build()?;
        self.post(query)
    }

    pub fn get_financial_report(
        &self,
        account: &str,
        vendor: &str,
        region: &str,
        fiscal_year: &str,
        fiscal_period: &str,
    ) -> Reply<String> {
        self.try_get_financial_report(account, vendor, region, fiscal_year, fiscal_period)
            .map(report_text)
            .into()
    }

    /// Post a `Sales.getReport` command built from `args`.
    fn sales_report(&self, args: &[&str]) -> Result<RawResponse> {
        let command = args
            .iter()
            .fold(Command::new(Service::Sales, "getReport"), |c, a| c.arg(*a));
        self.post(self.query(command).access_token().build()?)
    }

    pub fn try_get_subscription_report(&self, vendor: &str, date: &str, version: &str) -> Result<RawResponse> {
        self.sales_report(&[vendor, "Subscription", "Summary", "Daily", date, version])
    }

    pub fn get_subscription_report(&self, vendor: &str, date: &str, version: &str) -> Reply<String> {
        self.try_get_subscription_report(vendor, date, version)
            .map(report_text)
            .into()
    }

    pub fn try_get_subscription_event_report(
        &self,
        vendor: &str,
        date: &str,
        version: &str,
    ) -> Result<RawResponse> {
        self.sales_report(&[vendor, "SubscriptionEvent", "Summary", "Daily", date, version])
    }

    pub fn get_subscription_event_report(&self, vendor: &str, date: &str, version: &str) -> Reply<String> {
        self.try_get_subscription_event_report(vendor, date, version)
            .map(report_text)
            .into()
    }

    pub fn try_get_subscriber_report(&self, vendor: &str, date: &str, version: &str) -> Result<RawResponse> {
        self.sales_report(&[vendor, "Subscriber", "Detailed", "Daily", date, version])
    }

    pub fn get_subscriber_report(&self, vendor: &str, date: &str, version: &str) -> Reply<String> {
        self.try_get_subscriber_report(vendor, date, version)
            .map(report_text)
            .into()
    }

    pub fn try_get_newsstand_report(&self, vendor: &str, date_type: &str, date: &str) -> Result<RawResponse> {
        self.sales_report(&[vendor, "Newsstand", "Detailed", date_type, date])
    }

    pub fn get_newsstand_report(&self, vendor: &str, date_type: &str, date: &str) -> Reply<String> {
        self.try_get_newsstand_report(vendor, date_type, date)
            .map(report_text)
            .into()
    }

    pub fn try_get_opt_in_report(&self, vendor: &str, date: &str) -> Result<RawResponse> {
        self.sales_report(&[vendor, "Sales", "Opt-In", "Weekly", date])
    }

    pub fn get_opt_in_report(&self, vendor: &str, date: &str) -> Reply<String> {
        self.try_get_opt_in_report(vendor, date).map(report_text).into()
    }

    pub fn try_get_pre_order_report(&self, vendor: &str, date_type: &str, date: &str) -> Result<RawResponse> {
        self.sales_report(&[vendor, "Pre-Order", "Summary", date_type, date])
    }

    pub fn get_pre_order_report(&self, vendor: &str, date_type: &str, date: &str) -> Reply<String> {
        self.try_get_pre_order_report(vendor, date_type, date)
            .map(report_text)
            .into()
    }
}

fn report_text(res: RawResponse) -> String {
    res.text().into_owned()
}
