use crate::domain::model::{
    InvestorFirm, InvestorsResponse, Issuer, IssuerResponse, IssuersResponse, PageEnvelope,
    PageResult, PaginationParams, Portfolio, PortfoliosResponse,
};
use crate::utils::error::{ConnectorError, Result};
use reqwest::{header, redirect, Client};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://mock-api.carta.com/v1alpha1/";

/// Page size used while draining the issuers nested under a portfolio.
pub const PORTFOLIO_ISSUERS_PAGE_SIZE: u32 = 100;

/// Thin client over the Carta REST API.
///
/// Every call is a single GET round trip. Nothing is retried or cached; callers
/// drive pagination with the cursor returned in each [`PageResult`].
#[derive(Debug, Clone)]
pub struct CartaClient {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl CartaClient {
    pub fn new(base_url: &str, access_token: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, access_token, Duration::from_secs(30))
    }

    pub fn with_timeout(
        base_url: &str,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        // 3xx 也視為失敗，不自動跟隨轉址
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()?;

        Self::with_client(client, base_url, access_token)
    }

    pub fn with_client(
        client: Client,
        base_url: &str,
        access_token: impl Into<String>,
    ) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ConnectorError::InvalidConfigValue {
                field: "base_url".to_string(),
                value: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            access_token: access_token.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns all issuers (companies to invest in) visible to the caller, one page at a time.
    pub async fn get_issuers(&self, params: &PaginationParams) -> Result<PageResult<Issuer>> {
        let url = self.endpoint(&["issuers"])?;
        self.fetch_page::<IssuersResponse>(url, params).await
    }

    pub async fn get_issuer(&self, issuer_id: &str) -> Result<Issuer> {
        let url = self.endpoint(&["issuers", issuer_id])?;
        let response: IssuerResponse = self.get_json(url, &[]).await?;
        Ok(response.issuer)
    }

    pub async fn get_investors(
        &self,
        params: &PaginationParams,
    ) -> Result<PageResult<InvestorFirm>> {
        let url = self.endpoint(&["investors", "firms"])?;
        self.fetch_page::<InvestorsResponse>(url, params).await
    }

    pub async fn get_issuers_for_portfolio(
        &self,
        portfolio_id: &str,
        params: &PaginationParams,
    ) -> Result<PageResult<Issuer>> {
        let url = self.endpoint(&["portfolios", portfolio_id, "issuers"])?;
        self.fetch_page::<IssuersResponse>(url, params).await
    }

    /// Fetches one page of portfolios and fills in each portfolio's issuer ids.
    ///
    /// The nested issuer collection of every portfolio on the page is drained
    /// before the page is returned. If any nested fetch fails the whole page is
    /// discarded and the error names the portfolio being aggregated.
    #[tracing::instrument(skip(self), fields(page_token = %params.after))]
    pub async fn get_portfolios(
        &self,
        params: &PaginationParams,
    ) -> Result<PageResult<Portfolio>> {
        let url = self.endpoint(&["portfolios"])?;
        let mut page = self.fetch_page::<PortfoliosResponse>(url, params).await?;

        for portfolio in page.items.iter_mut() {
            let issuers = self
                .drain_portfolio_issuers(&portfolio.id)
                .await
                .map_err(|e| ConnectorError::Aggregation {
                    portfolio_id: portfolio.id.clone(),
                    source: Box::new(e),
                })?;

            portfolio.issuer_ids = issuers.into_iter().map(|issuer| issuer.id).collect();
            tracing::debug!(
                "Portfolio {} aggregated with {} issuers",
                portfolio.id,
                portfolio.issuer_ids.len()
            );
        }

        Ok(page)
    }

    async fn drain_portfolio_issuers(&self, portfolio_id: &str) -> Result<Vec<Issuer>> {
        let mut issuers = Vec::new();
        let mut after = String::new();

        loop {
            let params = PaginationParams::new(PORTFOLIO_ISSUERS_PAGE_SIZE, after);
            let PageResult { items, next } =
                self.get_issuers_for_portfolio(portfolio_id, &params).await?;
            issuers.extend(items);

            if next.is_empty() {
                break;
            }
            after = next;
        }

        Ok(issuers)
    }

    async fn fetch_page<E: PageEnvelope>(
        &self,
        url: Url,
        params: &PaginationParams,
    ) -> Result<PageResult<E::Item>> {
        let envelope: E = self.get_json(url, &params.query_pairs()).await?;
        let (items, next) = envelope.into_parts();

        // 服務端回傳相同的 token 時視為最後一頁，避免無限迴圈
        let next = if !next.is_empty() && next == params.after {
            tracing::warn!(
                "Service echoed page token '{}' back, treating page as the last one",
                next
            );
            String::new()
        } else {
            next
        };

        Ok(PageResult { items, next })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        mut url: Url,
        query: &[(&'static str, String)],
    ) -> Result<T> {
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
        }
        let endpoint = url.path().to_string();

        tracing::debug!("Making API request to: {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);
        if status.as_u16() >= 300 {
            return Err(ConnectorError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| ConnectorError::Decode { endpoint, source })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ConnectorError::Config {
                message: format!("base URL cannot be a base: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
