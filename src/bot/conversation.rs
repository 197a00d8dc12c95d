//! Dialog state machine.
//!
//! Each user has one `Session` holding the current `DialogState` and the
//! values collected so far. `Session::apply` is the transition table: it
//! takes one input (typed text, an uploaded photo or video, or a pressed
//! button), moves the state and returns the `Step` the handler has to
//! carry out. Transitions never touch storage or the network, so the whole
//! table is tested without either.
//!
//! # Stale Input
//!
//! - `plan:<key>` and `collect_details` are entry points and restart the
//!   deposit dialog from any state
//! - any other button that does not belong to the current state yields
//!   `Step::Expired` and leaves the state as it was
//! - text outside a text-expecting state is ignored
//! - navigation buttons never reach the table (see `Callback::is_navigation`)

use std::collections::HashMap;

use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::{
    bot::{
        callback::Callback,
        command::{self, ArgsError},
        i18n::Msg,
    },
    config::Catalog,
    models::account::{Currency, DepositRecord, DepositorDetails, UsdtNetwork},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogState {
    #[default]
    Idle,

    // deposit dialog
    Name,
    Email,
    Country,
    PayoutAddress,
    Currency,
    Network,
    Deposit,
    TxId,
    Confirm,
    Wallet,

    // admin panel
    AdminMenu,
    AdText,
    AdMedia,
    AdTarget,
    AdConfirm,
    AdminUsers,
    AdminUser(i64),
    AdminBalance(i64),
}

impl DialogState {
    pub fn is_admin(self) -> bool {
        matches!(
            self,
            DialogState::AdminMenu
                | DialogState::AdText
                | DialogState::AdMedia
                | DialogState::AdTarget
                | DialogState::AdConfirm
                | DialogState::AdminUsers
                | DialogState::AdminUser(_)
                | DialogState::AdminBalance(_)
        )
    }
}

/// Values collected by the deposit dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepositDraft {
    pub plan_key: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub currency: Option<Currency>,
    pub network: Option<UsdtNetwork>,
    pub txid: Option<String>,
    pub deposit: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
}

/// Photo or video attached to a broadcast, referenced by Telegram file id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub kind: MediaKind,
    pub file_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdTarget {
    All,
    User(i64),
}

/// Broadcast being composed in the admin panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdDraft {
    pub text: String,
    pub media: Option<Media>,
    pub target: Option<AdTarget>,
}

#[derive(Debug, Clone, Copy)]
pub enum Input<'a> {
    Text(&'a str),
    Media(&'a Media),
    Button(&'a Callback),
}

/// Effect the handler carries out after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Nothing to do.
    Ignore,
    /// Button from an earlier point of the dialog.
    Expired,
    /// Send a localized prompt.
    Ask(Msg),
    PlanSelected(String),
    /// Persist the details, then offer the currencies.
    SaveDetails {
        plan_key: String,
        details: DepositorDetails,
    },
    ShowCurrencies,
    ShowNetworks,
    ShowAddress {
        currency: Currency,
        network: Option<UsdtNetwork>,
    },
    /// Check the id on chain, then report back through
    /// `Session::txid_verified` or `Session::txid_rejected`.
    VerifyTxId {
        txid: String,
        currency: Currency,
        network: Option<UsdtNetwork>,
    },
    AskWallet {
        deposit: Decimal,
    },
    SaveWallet(String),

    AdminPanel,
    Dashboard,
    AskAdText,
    AskAdMedia,
    AskAdTarget,
    InvalidAdTarget,
    AdPreview(AdDraft),
    Broadcast(AdDraft),
    ListUsers,
    UserSelected(i64),
    AskBalance(i64),
    SetBalance {
        user_id: i64,
        deposit: Decimal,
        profit: Decimal,
    },
    InvalidBalance(ArgsError),
    OverrideHelp(i64),
    ClosePanel,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub state: DialogState,
    pub deposit: DepositDraft,
    pub ad: AdDraft,
}

fn text_value(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

impl Session {
    /// Back to `Idle`, dropping everything collected.
    pub fn reset(&mut self) {
        *self = Session::default();
    }

    /// Idle with nothing collected, the same as a session never created.
    pub fn is_blank(&self) -> bool {
        self.state == DialogState::Idle
            && self.deposit == DepositDraft::default()
            && self.ad == AdDraft::default()
    }

    /// Open the admin panel. Identity is checked by the caller.
    pub fn enter_admin(&mut self) {
        self.state = DialogState::AdminMenu;
        self.ad = AdDraft::default();
    }

    pub fn apply(&mut self, input: Input<'_>, catalog: &Catalog) -> Step {
        match input {
            Input::Button(callback) => self.press(callback, catalog),
            Input::Text(text) => self.type_text(text),
            Input::Media(media) => self.upload(media),
        }
    }

    /// The transaction id was confirmed on chain.
    ///
    /// Returns the record to persist; the deposit is the default deposit of
    /// the plan chosen in this dialog. `None` when the session is no longer
    /// waiting for a transaction id.
    pub fn txid_verified(&mut self, txid: &str, catalog: &Catalog) -> Option<DepositRecord> {
        if self.state != DialogState::TxId {
            return None;
        }
        let plan = catalog.plan(self.deposit.plan_key.as_deref()?)?;
        let currency = self.deposit.currency?;

        self.state = DialogState::Confirm;
        self.deposit.txid = Some(txid.to_string());
        self.deposit.deposit = Some(plan.deposit());

        Some(DepositRecord {
            plan_key: plan.key.clone(),
            currency,
            network: self.deposit.network,
            txid: txid.to_string(),
            deposit: plan.deposit(),
        })
    }

    /// The transaction id was not confirmed; the user is asked again.
    pub fn txid_rejected(&mut self) {
        self.deposit.txid = None;
    }

    fn restart_deposit(&mut self, plan_key: String) {
        self.state = DialogState::Idle;
        self.deposit = DepositDraft {
            plan_key: Some(plan_key),
            ..DepositDraft::default()
        };
    }

    fn press(&mut self, callback: &Callback, catalog: &Catalog) -> Step {
        use DialogState as S;

        match (callback, self.state) {
            (Callback::Plan(key), _) => {
                if catalog.plan(key).is_none() {
                    return Step::Expired;
                }
                self.restart_deposit(key.clone());
                Step::PlanSelected(key.clone())
            }
            (Callback::CollectDetails, _) => match self.deposit.plan_key.clone() {
                Some(plan_key) => {
                    self.restart_deposit(plan_key);
                    self.state = S::Name;
                    Step::Ask(Msg::AskName)
                }
                None => Step::Expired,
            },

            (Callback::PaymentMethod, S::Currency | S::Network | S::Deposit) => {
                self.state = S::Currency;
                self.deposit.currency = None;
                self.deposit.network = None;
                Step::ShowCurrencies
            }
            (Callback::Pay(Currency::Usdt), S::Currency) => {
                self.state = S::Network;
                self.deposit.currency = Some(Currency::Usdt);
                Step::ShowNetworks
            }
            (Callback::Pay(currency), S::Currency) => {
                self.state = S::Deposit;
                self.deposit.currency = Some(*currency);
                self.deposit.network = None;
                Step::ShowAddress {
                    currency: *currency,
                    network: None,
                }
            }
            (Callback::Network(network), S::Network) => {
                self.state = S::Deposit;
                self.deposit.network = Some(*network);
                Step::ShowAddress {
                    currency: Currency::Usdt,
                    network: Some(*network),
                }
            }
            (Callback::DepositDone, S::Deposit) => {
                self.state = S::TxId;
                Step::Ask(Msg::AskTxId)
            }
            (Callback::ConfirmYes, S::Confirm) => match self.deposit.deposit {
                Some(deposit) => {
                    self.state = S::Wallet;
                    Step::AskWallet { deposit }
                }
                None => Step::Expired,
            },
            (Callback::ConfirmNo, S::Confirm) => {
                self.state = S::TxId;
                self.deposit.txid = None;
                Step::Ask(Msg::AskTxIdAgain)
            }

            (Callback::AdminDashboard, S::AdminMenu) => Step::Dashboard,
            (Callback::AdminAdStart, S::AdminMenu) => {
                self.state = S::AdText;
                self.ad = AdDraft::default();
                Step::AskAdText
            }
            (Callback::AdSkipMedia, S::AdMedia) => {
                self.state = S::AdTarget;
                self.ad.media = None;
                Step::AskAdTarget
            }
            (Callback::AdTargetAll, S::AdTarget) => self.ad_target_chosen(AdTarget::All),
            (Callback::AdConfirm, S::AdConfirm) => {
                self.state = S::AdminMenu;
                Step::Broadcast(std::mem::take(&mut self.ad))
            }
            (Callback::AdminUserSelect, S::AdminMenu) => {
                self.state = S::AdminUsers;
                Step::ListUsers
            }
            (Callback::AdminUser(id), S::AdminUsers) => {
                self.state = S::AdminUser(*id);
                Step::UserSelected(*id)
            }
            (Callback::AdminEditBalance, S::AdminUser(id)) => {
                self.state = S::AdminBalance(id);
                Step::AskBalance(id)
            }
            (Callback::AdminOverridePayment, S::AdminUser(id)) => Step::OverrideHelp(id),
            (Callback::AdminBack, state) if state.is_admin() => {
                self.enter_admin();
                Step::AdminPanel
            }
            (Callback::AdminClose, state) if state.is_admin() => {
                self.reset();
                Step::ClosePanel
            }

            _ => Step::Expired,
        }
    }

    fn type_text(&mut self, text: &str) -> Step {
        use DialogState as S;

        let Some(value) = text_value(text) else {
            return Step::Ignore;
        };

        match self.state {
            S::Name => {
                self.deposit.full_name = Some(value);
                self.state = S::Email;
                Step::Ask(Msg::AskEmail)
            }
            S::Email => {
                self.deposit.email = Some(value);
                self.state = S::Country;
                Step::Ask(Msg::AskCountry)
            }
            S::Country => {
                self.deposit.country = Some(value);
                self.state = S::PayoutAddress;
                Step::Ask(Msg::AskPayoutAddress)
            }
            S::PayoutAddress => {
                let draft = &self.deposit;
                let (Some(plan_key), Some(full_name), Some(email), Some(country)) = (
                    draft.plan_key.clone(),
                    draft.full_name.clone(),
                    draft.email.clone(),
                    draft.country.clone(),
                ) else {
                    self.reset();
                    return Step::Expired;
                };
                self.state = S::Currency;
                Step::SaveDetails {
                    plan_key,
                    details: DepositorDetails {
                        full_name,
                        email,
                        country,
                        payout_address: value,
                    },
                }
            }
            S::TxId => match self.deposit.currency {
                Some(currency) => Step::VerifyTxId {
                    txid: value,
                    currency,
                    network: self.deposit.network,
                },
                None => {
                    self.reset();
                    Step::Expired
                }
            },
            S::Wallet => {
                self.reset();
                Step::SaveWallet(value)
            }

            S::AdText => {
                self.ad.text = value;
                self.state = S::AdMedia;
                Step::AskAdMedia
            }
            S::AdTarget => match command::parse_ad_target(&value) {
                Some(target) => self.ad_target_chosen(target),
                None => Step::InvalidAdTarget,
            },
            S::AdminBalance(user_id) => match command::parse_balance_pair(&value) {
                Ok((deposit, profit)) => {
                    self.state = S::AdminMenu;
                    Step::SetBalance {
                        user_id,
                        deposit,
                        profit,
                    }
                }
                Err(e) => Step::InvalidBalance(e),
            },

            _ => Step::Ignore,
        }
    }

    fn upload(&mut self, media: &Media) -> Step {
        if self.state != DialogState::AdMedia {
            return Step::Ignore;
        }
        self.ad.media = Some(media.clone());
        self.state = DialogState::AdTarget;
        Step::AskAdTarget
    }

    fn ad_target_chosen(&mut self, target: AdTarget) -> Step {
        self.ad.target = Some(target);
        self.state = DialogState::AdConfirm;
        Step::AdPreview(self.ad.clone())
    }
}

/// In-memory sessions keyed by Telegram user id.
#[derive(Debug, Default)]
pub struct Sessions {
    inner: Mutex<HashMap<i64, Session>>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` on the session of `user_id`, creating an idle one if needed.
    /// A session left blank by `f` is dropped.
    pub async fn with<R>(&self, user_id: i64, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut sessions = self.inner.lock().await;
        let session = sessions.entry(user_id).or_default();
        let result = f(session);
        if session.is_blank() {
            sessions.remove(&user_id);
        }
        result
    }

    /// Number of users with a session in progress.
    pub async fn active_users(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn state(&self, user_id: i64) -> DialogState {
        self.inner
            .lock()
            .await
            .get(&user_id)
            .map(|session| session.state)
            .unwrap_or_default()
    }
}
