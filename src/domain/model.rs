use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A company available for investment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issuer {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "legalName", default)]
    pub name: String,
    #[serde(default)]
    pub website: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestorFirm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A named grouping of issuers.
///
/// `issuer_ids` is never read from the portfolio payload itself; it is filled in
/// from the nested `portfolios/{id}/issuers` collection once that has been drained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "legalName", default)]
    pub name: String,
    #[serde(rename = "issuerIds", skip_deserializing, default)]
    pub issuer_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    #[serde(rename = "pageSize")]
    pub size: u32,
    #[serde(rename = "pageToken")]
    pub after: String,
}

impl PaginationParams {
    pub fn new(size: u32, after: impl Into<String>) -> Self {
        Self {
            size,
            after: after.into(),
        }
    }

    /// 只帶出有值的查詢參數：size 為 0 或 after 為空時省略
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(2);
        if self.size != 0 {
            pairs.push(("pageSize", self.size.to_string()));
        }
        if !self.after.is_empty() {
            pairs.push(("pageToken", self.after.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    /// Empty when there are no further pages.
    pub next: String,
}

impl<T> PageResult<T> {
    pub fn has_more(&self) -> bool {
        !self.next.is_empty()
    }
}

/// JSON envelope of one page of a collection.
pub trait PageEnvelope: DeserializeOwned {
    type Item;

    fn into_parts(self) -> (Vec<Self::Item>, String);
}

#[derive(Debug, Deserialize)]
pub struct IssuersResponse {
    #[serde(default)]
    pub issuers: Vec<Issuer>,
    #[serde(rename = "nextPageToken", default)]
    pub next: String,
}

#[derive(Debug, Deserialize)]
pub struct InvestorsResponse {
    #[serde(default)]
    pub firms: Vec<InvestorFirm>,
    #[serde(rename = "nextPageToken", default)]
    pub next: String,
}

#[derive(Debug, Deserialize)]
pub struct PortfoliosResponse {
    #[serde(default)]
    pub portfolios: Vec<Portfolio>,
    #[serde(rename = "nextPageToken", default)]
    pub next: String,
}

#[derive(Debug, Deserialize)]
pub struct IssuerResponse {
    pub issuer: Issuer,
}

impl PageEnvelope for IssuersResponse {
    type Item = Issuer;

    fn into_parts(self) -> (Vec<Issuer>, String) {
        (self.issuers, self.next)
    }
}

impl PageEnvelope for InvestorsResponse {
    type Item = InvestorFirm;

    fn into_parts(self) -> (Vec<InvestorFirm>, String) {
        (self.firms, self.next)
    }
}

impl PageEnvelope for PortfoliosResponse {
    type Item = Portfolio;

    fn into_parts(self) -> (Vec<Portfolio>, String) {
        (self.portfolios, self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs_omits_defaults() {
        let params = PaginationParams::new(0, "");
        assert!(params.query_pairs().is_empty());
    }

    #[test]
    fn test_query_pairs_includes_size_and_token() {
        let params = PaginationParams::new(50, "tok1");
        assert_eq!(
            params.query_pairs(),
            vec![("pageSize", "50".to_string()), ("pageToken", "tok1".to_string())]
        );
    }

    #[test]
    fn test_query_pairs_token_only() {
        let params = PaginationParams::new(0, "tok1");
        assert_eq!(params.query_pairs(), vec![("pageToken", "tok1".to_string())]);
    }

    #[test]
    fn test_envelope_tolerates_missing_fields() {
        let page: IssuersResponse = serde_json::from_str(r#"{"issuers":[{"id":"i1"}]}"#).unwrap();
        let (items, next) = page.into_parts();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "i1");
        assert_eq!(items[0].name, "");
        assert!(next.is_empty());
    }

    #[test]
    fn test_portfolio_payload_issuers_are_ignored() {
        let page: PortfoliosResponse = serde_json::from_str(
            r#"{"portfolios":[{"id":"p1","legalName":"Fund I","issuerIds":["x"]}],"nextPageToken":"n"}"#,
        )
        .unwrap();

        assert_eq!(page.portfolios[0].name, "Fund I");
        assert!(page.portfolios[0].issuer_ids.is_empty());
        assert_eq!(page.next, "n");
    }
}
