//! Blocking REST client for a Kite-style brokerage API.

use std::collections::HashMap;

use log::{debug, info};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use zeroize::Zeroizing;

use super::auth;
use super::types::{Envelope, FullQuote, PositionsData, SessionData, UserProfile};
use crate::Brokerage;
use crate::error::BrokerError;
use crate::types::{
    HoldingEntry, LtpQuote, MarginSummary, MarketDepth, OrderReceipt, OrderRequest, PositionEntry,
    QuoteId, Segment, SegmentMargins, Variety,
};

const DEFAULT_BASE_URL: &str = "https://api.kite.trade";
const API_VERSION: &str = "3";

/// Blocking REST client holding an authenticated session.
pub struct KiteClient {
    http: Client,
    api_key: String,
    access_token: Zeroizing<String>,
    base_url: String,
}

impl KiteClient {
    /// Establish a session with an access token obtained from the login
    /// flow.
    ///
    /// The token is validated against the profile endpoint up front: an
    /// expired or revoked token fails here, before any run starts.
    pub fn connect(api_key: &str, access_token: &str) -> Result<Self, BrokerError> {
        Self::connect_to(DEFAULT_BASE_URL, api_key, access_token)
    }

    /// Like [`KiteClient::connect`], against a non-default base URL.
    pub fn connect_to(
        base_url: &str,
        api_key: &str,
        access_token: &str,
    ) -> Result<Self, BrokerError> {
        let client = Self {
            http: Client::new(),
            api_key: api_key.to_string(),
            access_token: Zeroizing::new(access_token.to_string()),
            base_url: base_url.trim_end_matches('/').to_string(),
        };

        let profile: UserProfile = client.get("/user/profile", &[])?;
        info!("Session established for user {}", profile.user_id);
        Ok(client)
    }

    /// Exchange a request token from the login redirect for an access
    /// token.
    pub fn generate_session(
        api_key: &str,
        api_secret: &str,
        request_token: &str,
    ) -> Result<SessionData, BrokerError> {
        Self::generate_session_at(DEFAULT_BASE_URL, api_key, api_secret, request_token)
    }

    /// Like [`KiteClient::generate_session`], against a non-default base
    /// URL.
    pub fn generate_session_at(
        base_url: &str,
        api_key: &str,
        api_secret: &str,
        request_token: &str,
    ) -> Result<SessionData, BrokerError> {
        let checksum = auth::session_checksum(api_key, request_token, api_secret);
        let url = format!("{}/session/token", base_url.trim_end_matches('/'));
        let form = [
            ("api_key", api_key),
            ("request_token", request_token),
            ("checksum", checksum.as_str()),
        ];

        let resp = Client::new()
            .post(&url)
            .header("X-Kite-Version", API_VERSION)
            .form(&form)
            .send()
            .map_err(|e| BrokerError::Connection(format!("session request failed: {e}")))?;

        unwrap_envelope(resp)
    }

    fn auth_header(&self) -> String {
        format!("token {}:{}", self.api_key, self.access_token.as_str())
    }

    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, BrokerError> {
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header("X-Kite-Version", API_VERSION)
            .header("Authorization", self.auth_header())
            .query(query)
            .send()
            .map_err(|e| BrokerError::Connection(format!("GET {path} failed: {e}")))?;

        unwrap_envelope(resp)
    }

    fn quote_query<'a>(quotes: &'a [QuoteId]) -> Vec<(&'static str, &'a str)> {
        quotes.iter().map(|q| ("i", q.as_str())).collect()
    }
}

impl Brokerage for KiteClient {
    fn holdings(&self) -> Result<Vec<HoldingEntry>, BrokerError> {
        let holdings: Vec<HoldingEntry> = self.get("/portfolio/holdings", &[])?;
        info!("Fetched {} holdings", holdings.len());
        Ok(holdings)
    }

    fn day_positions(&self) -> Result<Vec<PositionEntry>, BrokerError> {
        let positions: PositionsData = self.get("/portfolio/positions", &[])?;
        debug!(
            "Fetched positions: {} day, {} net",
            positions.day.len(),
            positions.net.len()
        );
        Ok(positions.day)
    }

    fn ltp(&self, quotes: &[QuoteId]) -> Result<HashMap<String, LtpQuote>, BrokerError> {
        if quotes.is_empty() {
            return Ok(HashMap::new());
        }
        let prices: HashMap<String, LtpQuote> =
            self.get("/quote/ltp", &Self::quote_query(quotes))?;
        debug!("Fetched LTP for {}/{} quote ids", prices.len(), quotes.len());
        Ok(prices)
    }

    fn depth(&self, quotes: &[QuoteId]) -> Result<HashMap<String, MarketDepth>, BrokerError> {
        if quotes.is_empty() {
            return Ok(HashMap::new());
        }
        let full: HashMap<String, FullQuote> = self.get("/quote", &Self::quote_query(quotes))?;
        Ok(full.into_iter().map(|(id, q)| (id, q.depth)).collect())
    }

    fn place_order(
        &self,
        variety: Variety,
        order: &OrderRequest,
    ) -> Result<OrderReceipt, BrokerError> {
        let url = format!("{}/orders/{}", self.base_url, variety.as_str());
        let quantity = order.quantity.to_string();
        let price = order.price.map(|p| format!("{p:.2}"));

        let mut form: Vec<(&str, &str)> = vec![
            ("tradingsymbol", order.tradingsymbol.as_str()),
            ("exchange", order.exchange.as_str()),
            ("transaction_type", order.transaction_type.as_str()),
            ("order_type", order.order_type.as_str()),
            ("quantity", quantity.as_str()),
            ("product", order.product.as_str()),
            ("validity", "DAY"),
        ];
        if let Some(ref p) = price {
            form.push(("price", p.as_str()));
        }

        debug!(
            "Submitting order: {} {} x{} ({})",
            order.transaction_type,
            order.tradingsymbol,
            order.quantity,
            order.order_type.as_str()
        );

        let resp = self
            .http
            .post(&url)
            .header("X-Kite-Version", API_VERSION)
            .header("Authorization", self.auth_header())
            .form(&form)
            .send()
            .map_err(|e| BrokerError::Order(format!("order request failed: {e}")))?;

        unwrap_envelope(resp)
    }

    fn margins(&self, segment: Option<Segment>) -> Result<MarginSummary, BrokerError> {
        match segment {
            None => self.get("/user/margins", &[]),
            Some(seg) => {
                let path = format!("/user/margins/{}", seg.as_str());
                let margins: SegmentMargins = self.get(&path, &[])?;
                Ok(match seg {
                    Segment::Equity => MarginSummary {
                        equity: Some(margins),
                        commodity: None,
                    },
                    Segment::Commodity => MarginSummary {
                        equity: None,
                        commodity: Some(margins),
                    },
                })
            }
        }
    }
}

fn unwrap_envelope<T: DeserializeOwned>(resp: Response) -> Result<T, BrokerError> {
    let status = resp.status();
    let body = resp
        .text()
        .map_err(|e| BrokerError::Connection(format!("failed to read response body: {e}")))?;
    decode_envelope(status, &body)
}

/// Decode the standard `{status, data, message, error_type}` envelope,
/// mapping API-level failures onto [`BrokerError`].
pub fn decode_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
) -> Result<T, BrokerError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(BrokerError::RateLimit);
    }

    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|e| BrokerError::Other(format!("unexpected response ({status}): {e}")))?;

    if envelope.status == "success" {
        if let Some(data) = envelope.data {
            return Ok(data);
        }
    }

    let message = envelope
        .message
        .unwrap_or_else(|| format!("HTTP {status} with no error message"));
    Err(match envelope.error_type.as_deref() {
        Some("TokenException") | Some("PermissionException") => BrokerError::Auth(message),
        Some("OrderException") => BrokerError::Order(message),
        Some("InputException") => BrokerError::InvalidInstrument(message),
        Some("NetworkException") => BrokerError::Connection(message),
        _ => BrokerError::Other(message),
    })
}
