//! Transaction verification against public block explorers.
//!
//! Each chain has one explorer strategy, registered in a lookup table when
//! the dispatcher is built. Verification makes a single HTTP call and reads
//! one chain-specific field as the "confirmed" signal.
//!
//! # Failure Model
//!
//! `verify` never fails: a missing API key, a network error, a timeout or
//! an unexpected response all yield `false`. The reason is only logged.

use std::{collections::HashMap, time::Duration};

use serde_json::{Value, json};
use url::Url;

use crate::models::account::{Currency, UsdtNetwork};

/// Explorer API keys, one per keyed explorer. `None` disables that chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplorerKeys {
    pub etherscan: Option<String>,
    pub bscscan: Option<String>,
    pub blockcypher: Option<String>,
    pub toncenter: Option<String>,
}

/// Base URLs of the explorers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerEndpoints {
    pub blockcypher: String,
    pub etherscan: String,
    pub bscscan: String,
    pub solana_rpc: String,
    pub ripple_data: String,
    pub tronscan: String,
    pub toncenter: String,
}

impl Default for ExplorerEndpoints {
    fn default() -> Self {
        Self {
            blockcypher: "https://api.blockcypher.com".to_string(),
            etherscan: "https://api.etherscan.io".to_string(),
            bscscan: "https://api.bscscan.com".to_string(),
            solana_rpc: "https://api.mainnet-beta.solana.com".to_string(),
            ripple_data: "https://data.ripple.com".to_string(),
            tronscan: "https://apilist.tronscan.org".to_string(),
            toncenter: "https://toncenter.com".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("no API key configured for {0}")]
    MissingApiKey(Currency),

    #[error("no explorer registered for {0}")]
    Unsupported(Currency),

    #[error("empty transaction id")]
    EmptyTransactionId,

    #[error("invalid explorer URL: {0}")]
    BadUrl(#[from] url::ParseError),

    #[error("explorer request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// One explorer API and the shape of its answer.
#[derive(Debug, Clone)]
enum Explorer {
    /// `GET /v1/btc/main/txs/{id}`, confirmed when `confirmations > 0`
    BlockCypher { base_url: String, token: Option<String> },
    /// Etherscan-style `gettxreceiptstatus`, confirmed when `result.status == "1"`
    Etherscan { base_url: String, api_key: Option<String> },
    /// JSON-RPC `getTransaction`, confirmed when `result` is not null
    SolanaRpc { url: String },
    /// `GET /v2/transactions/{id}`, confirmed when `result == "success"`
    RippleData { base_url: String },
    /// `GET /api/transaction-info?hash=`, confirmed when `ret[0].contractRet == "SUCCESS"`
    Tronscan { base_url: String },
    /// `GET /api/v2/getTransaction?hash=`, confirmed when `result` is not null
    Toncenter { base_url: String, api_key: Option<String> },
}

/// Append path segments to a base URL, percent-encoding each one.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, VerifyError> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn required<'a>(key: &'a Option<String>, chain: Currency) -> Result<&'a str, VerifyError> {
    key.as_deref().ok_or(VerifyError::MissingApiKey(chain))
}

async fn get_json(request: reqwest::RequestBuilder) -> Result<Value, VerifyError> {
    Ok(request.send().await?.error_for_status()?.json::<Value>().await?)
}

impl Explorer {
    async fn check(
        &self,
        client: &reqwest::Client,
        chain: Currency,
        txid: &str,
    ) -> Result<bool, VerifyError> {
        match self {
            Explorer::BlockCypher { base_url, token } => {
                let token = required(token, chain)?;
                let url = endpoint(base_url, &["v1", "btc", "main", "txs", txid])?;
                let body = get_json(client.get(url).query(&[("token", token)])).await?;
                Ok(body["confirmations"].as_u64().unwrap_or(0) > 0)
            }
            Explorer::Etherscan { base_url, api_key } => {
                let api_key = required(api_key, chain)?;
                let url = endpoint(base_url, &["api"])?;
                let body = get_json(client.get(url).query(&[
                    ("module", "transaction"),
                    ("action", "gettxreceiptstatus"),
                    ("txhash", txid),
                    ("apikey", api_key),
                ]))
                .await?;
                Ok(body["status"] == "1" && body["result"]["status"] == "1")
            }
            Explorer::SolanaRpc { url } => {
                let payload = json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "method": "getTransaction",
                    "params": [txid, {"encoding": "json", "maxSupportedTransactionVersion": 0}]
                });
                let body = get_json(client.post(Url::parse(url)?).json(&payload)).await?;
                Ok(!body["result"].is_null())
            }
            Explorer::RippleData { base_url } => {
                let url = endpoint(base_url, &["v2", "transactions", txid])?;
                let body = get_json(client.get(url)).await?;
                Ok(body["result"] == "success")
            }
            Explorer::Tronscan { base_url } => {
                let url = endpoint(base_url, &["api", "transaction-info"])?;
                let body = get_json(client.get(url).query(&[("hash", txid)])).await?;
                Ok(body["ret"][0]["contractRet"] == "SUCCESS")
            }
            Explorer::Toncenter { base_url, api_key } => {
                let api_key = required(api_key, chain)?;
                let url = endpoint(base_url, &["api", "v2", "getTransaction"])?;
                let body =
                    get_json(client.get(url).query(&[("hash", txid), ("api_key", api_key)])).await?;
                Ok(!body["result"].is_null())
            }
        }
    }
}

/// Chain whose explorer confirms a deposit in `currency`.
///
/// USDT is verified on the chain of its sub-network, and on Ethereum when
/// no sub-network was recorded.
pub fn settlement_chain(currency: Currency, network: Option<UsdtNetwork>) -> Currency {
    match currency {
        Currency::Usdt => network.map_or(Currency::Eth, UsdtNetwork::chain),
        other => other,
    }
}

/// Verification dispatcher: a table of explorer strategies keyed by chain.
#[derive(Debug, Clone)]
pub struct VerificationDispatcher {
    client: reqwest::Client,
    explorers: HashMap<Currency, Explorer>,
}

impl VerificationDispatcher {
    /// Build the dispatcher with one shared HTTP client and a fixed timeout.
    pub fn new(
        keys: ExplorerKeys,
        endpoints: ExplorerEndpoints,
        timeout: Duration,
    ) -> Result<Self, VerifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let explorers = HashMap::from([
            (
                Currency::Btc,
                Explorer::BlockCypher {
                    base_url: endpoints.blockcypher,
                    token: keys.blockcypher,
                },
            ),
            (
                Currency::Eth,
                Explorer::Etherscan {
                    base_url: endpoints.etherscan,
                    api_key: keys.etherscan,
                },
            ),
            (
                Currency::Bnb,
                Explorer::Etherscan {
                    base_url: endpoints.bscscan,
                    api_key: keys.bscscan,
                },
            ),
            (
                Currency::Sol,
                Explorer::SolanaRpc {
                    url: endpoints.solana_rpc,
                },
            ),
            (
                Currency::Xrp,
                Explorer::RippleData {
                    base_url: endpoints.ripple_data,
                },
            ),
            (
                Currency::Trx,
                Explorer::Tronscan {
                    base_url: endpoints.tronscan,
                },
            ),
            (
                Currency::Ton,
                Explorer::Toncenter {
                    base_url: endpoints.toncenter,
                    api_key: keys.toncenter,
                },
            ),
        ]);

        Ok(Self { client, explorers })
    }

    /// Whether `txid` is a confirmed transaction on the chain for `currency`.
    ///
    /// `network` is only consulted for USDT.
    pub async fn verify(
        &self,
        txid: &str,
        currency: Currency,
        network: Option<UsdtNetwork>,
    ) -> bool {
        let chain = settlement_chain(currency, network);

        match self.check(txid.trim(), chain).await {
            Ok(confirmed) => {
                tracing::info!(%currency, %chain, confirmed, "Transaction verification finished");
                confirmed
            }
            Err(e) => {
                tracing::error!(%currency, %chain, error = %e, "Error verifying transaction");
                false
            }
        }
    }

    async fn check(&self, txid: &str, chain: Currency) -> Result<bool, VerifyError> {
        if txid.is_empty() {
            return Err(VerifyError::EmptyTransactionId);
        }
        let explorer = self
            .explorers
            .get(&chain)
            .ok_or(VerifyError::Unsupported(chain))?;

        explorer.check(&self.client, chain, txid).await
    }
}
