//! Page controller
//!
//! Holds everything the ATM page shows and the handlers behind its buttons.
//! Each handler performs at most one remote action and refreshes the values
//! it affects. The controller does not know how it is rendered: the Dioxus
//! views and the terminal console both drive it.

use crate::activity::{Activity, ActivityKind, ActivityLog};
use crate::amount::{self, Direction, InputError};
use crate::contract::{AtmContract, OwnerInfo};
use crate::wallet::{self, Eip1193, WalletError};
use alloy_primitives::{Address, U256};
use std::time::Duration;

pub const INSTALL_PROMPT: &str = "Please install Metamask in order to use this ATM.";
pub const CONNECT_PROMPT: &str = "Please connect your Metamask wallet";

/// What the page currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// No wallet provider was detected
    InstallPrompt,
    /// A provider exists but no account is authorized yet
    ConnectButton,
    /// Account, balance and the ATM controls
    Account,
}

/// Fields a handler wrote since the page was last snapshotted
#[derive(Debug, Clone, Copy, Default)]
struct Touched {
    wallet: bool,
    account: bool,
    balance: bool,
    owner_info: bool,
    error: bool,
    /// Number of activity entries recorded
    recorded: usize,
}

#[derive(Debug, Clone)]
pub struct Page<P> {
    contract_address: Address,
    poll_interval: Duration,
    wallet: Option<P>,
    account: Option<Address>,
    atm: Option<AtmContract<P>>,
    balance: Option<U256>,
    owner_info: Option<OwnerInfo>,
    min_deposit: u64,
    min_withdrawal: u64,
    /// Raw text of the deposit field
    pub deposit_amount: String,
    /// Raw text of the withdrawal field
    pub withdrawal_amount: String,
    error: String,
    activity: ActivityLog,
    touched: Touched,
}

impl<P: Eip1193 + Clone> Page<P> {
    pub fn new(contract_address: Address, poll_interval: Duration) -> Self {
        Page {
            contract_address,
            poll_interval,
            wallet: None,
            account: None,
            atm: None,
            balance: None,
            owner_info: None,
            min_deposit: 1,
            min_withdrawal: 1,
            deposit_amount: String::new(),
            withdrawal_amount: String::new(),
            error: String::new(),
            activity: ActivityLog::default(),
            touched: Touched::default(),
        }
    }

    pub fn view(&self) -> View {
        if self.wallet.is_none() {
            View::InstallPrompt
        } else if self.account.is_none() {
            View::ConnectButton
        } else {
            View::Account
        }
    }

    pub fn wallet(&self) -> Option<&P> {
        self.wallet.as_ref()
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    /// Balance in whole ether, `None` until the first read completes
    pub fn balance(&self) -> Option<U256> {
        self.balance
    }

    pub fn owner_info(&self) -> Option<&OwnerInfo> {
        self.owner_info.as_ref()
    }

    pub fn min_deposit(&self) -> u64 {
        self.min_deposit
    }

    pub fn min_withdrawal(&self) -> u64 {
        self.min_withdrawal
    }

    /// Current validation message, empty when there is none
    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    /// Contract handle, only present once an account is connected
    pub fn contract(&self) -> Option<AtmContract<P>> {
        self.atm.clone()
    }

    pub fn set_min_deposit(&mut self, input: &str) {
        if let Some(min) = amount::parse_minimum(input) {
            self.min_deposit = min;
        }
    }

    pub fn set_min_withdrawal(&mut self, input: &str) {
        if let Some(min) = amount::parse_minimum(input) {
            self.min_withdrawal = min;
        }
    }

    /// Stores the result of a balance read, truncated to whole ether
    pub fn record_balance(&mut self, wei: U256) {
        self.balance = Some(amount::whole_ether(wei));
        self.touched.balance = true;
    }

    /// Copy for a handler to run on while the page itself stays editable
    pub fn snapshot(&self) -> Self {
        Page {
            touched: Touched::default(),
            ..self.clone()
        }
    }

    /// Applies onto this page only the fields a handler wrote on `done`, a
    /// page taken with [`Page::snapshot`]. Input fields and minimums edited
    /// meanwhile are kept.
    pub fn merge(&mut self, done: Page<P>) {
        let touched = done.touched;
        if touched.wallet {
            self.wallet = done.wallet;
        }
        if touched.account {
            self.account = done.account;
        }
        if self.atm.is_none() {
            self.atm = done.atm;
        }
        if touched.balance {
            self.balance = done.balance;
        }
        if touched.owner_info {
            self.owner_info = done.owner_info;
        }
        if touched.error {
            self.error = done.error;
        }
        let recorded = touched.recorded.min(done.activity.entries().len());
        for entry in done.activity.entries()[..recorded].iter().rev() {
            self.activity.record(entry.clone());
        }
    }

    fn record_activity(&mut self, activity: Activity) {
        self.activity.record(activity);
        self.touched.recorded = self.touched.recorded.saturating_add(1);
    }

    fn set_error(&mut self, error: String) {
        self.error = error;
        self.touched.error = true;
    }

    /// Records the detected provider and picks up an account the user
    /// authorized earlier, without prompting
    pub async fn acquire_wallet(&mut self, detected: Option<P>) -> Result<(), WalletError> {
        let Some(provider) = detected else {
            log::warn!("No wallet provider detected");
            return Ok(());
        };
        self.wallet = Some(provider.clone());
        self.touched.wallet = true;
        let accounts = wallet::accounts(&provider).await?;
        self.handle_accounts(&accounts);
        Ok(())
    }

    /// Asks the wallet for authorization, this opens its consent prompt
    pub async fn connect_account(&mut self) -> Result<(), WalletError> {
        let Some(provider) = self.wallet.clone() else {
            return Err(WalletError::NotDetected);
        };
        let accounts = wallet::request_accounts(&provider).await?;
        self.handle_accounts(&accounts);
        Ok(())
    }

    fn handle_accounts(&mut self, accounts: &[Address]) {
        let Some(&account) = accounts.first() else {
            log::info!("No account found");
            return;
        };
        log::info!("Account connected: {}", account);
        self.account = Some(account);
        self.touched.account = true;
        self.bind_contract();
    }

    /// The contract handle is created once and kept for the page lifetime
    fn bind_contract(&mut self) {
        if self.atm.is_some() {
            return;
        }
        if let (Some(provider), Some(account)) = (self.wallet.clone(), self.account) {
            self.atm = Some(AtmContract::new(
                provider,
                self.contract_address,
                account,
                self.poll_interval,
            ));
        }
    }

    pub async fn refresh_balance(&mut self) -> Result<(), WalletError> {
        let Some(atm) = self.atm.clone() else {
            return Ok(());
        };
        let wei = atm.get_balance().await?;
        self.record_balance(wei);
        Ok(())
    }

    pub async fn deposit(&mut self) -> Result<(), WalletError> {
        self.transfer(Direction::Deposit).await
    }

    pub async fn withdraw(&mut self) -> Result<(), WalletError> {
        self.transfer(Direction::Withdrawal).await
    }

    async fn transfer(&mut self, direction: Direction) -> Result<(), WalletError> {
        let Some(atm) = self.atm.clone() else {
            return Ok(());
        };
        let (input, minimum) = match direction {
            Direction::Deposit => (self.deposit_amount.clone(), self.min_deposit),
            Direction::Withdrawal => (self.withdrawal_amount.clone(), self.min_withdrawal),
        };
        let wei = match amount::validate(direction, &input, minimum) {
            Ok(wei) => wei,
            Err(err) => {
                self.reject(err);
                return Ok(());
            }
        };
        self.set_error(String::new());

        let (receipt, kind) = match direction {
            Direction::Deposit => (atm.deposit(wei).await?, ActivityKind::Deposit),
            Direction::Withdrawal => (atm.withdraw(wei).await?, ActivityKind::Withdrawal),
        };
        self.record_activity(Activity::from_receipt(
            kind,
            format!("{} ETH", input.trim()),
            &receipt,
        ));
        self.refresh_balance().await
    }

    fn reject(&mut self, err: InputError) {
        log::debug!("Rejected input: {}", err);
        self.set_error(err.to_string());
    }

    pub async fn fetch_owner_info(&mut self) -> Result<(), WalletError> {
        let Some(atm) = self.atm.clone() else {
            return Ok(());
        };
        self.owner_info = Some(atm.get_owner_info().await?);
        self.touched.owner_info = true;
        Ok(())
    }

    /// Pushes both minimums in one transaction. Displayed values are not
    /// re-read afterwards.
    pub async fn set_limits(&mut self) -> Result<(), WalletError> {
        let Some(atm) = self.atm.clone() else {
            return Ok(());
        };
        let (min_deposit, min_withdrawal) = (self.min_deposit, self.min_withdrawal);
        let receipt = atm
            .set_limit(
                amount::ether_to_wei(min_deposit),
                amount::ether_to_wei(min_withdrawal),
            )
            .await?;
        self.record_activity(Activity::from_receipt(
            ActivityKind::SetLimits,
            format!("{} / {} ETH", min_deposit, min_withdrawal),
            &receipt,
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{DEFAULT_ATM_ADDRESS, IAssessment};
    use crate::wallet::mock::MockWallet;
    use alloy_primitives::utils::parse_ether;
    use alloy_sol_types::SolCall;

    const ALICE: Address = Address::new([0xa1; 20]);

    fn page() -> Page<MockWallet> {
        Page::new(DEFAULT_ATM_ADDRESS, Duration::ZERO)
    }

    async fn connected(wallet: &MockWallet) -> Page<MockWallet> {
        let mut page = page();
        page.acquire_wallet(Some(wallet.clone())).await.unwrap();
        page.connect_account().await.unwrap();
        wallet.state.borrow_mut().requests.clear();
        page
    }

    #[tokio::test]
    async fn test_no_wallet_shows_install_prompt() {
        let mut page = page();
        page.acquire_wallet(None).await.unwrap();
        assert_eq!(page.view(), View::InstallPrompt);
        assert!(matches!(page.connect_account().await, Err(WalletError::NotDetected)));
        assert_eq!(page.view(), View::InstallPrompt);
    }

    #[tokio::test]
    async fn test_wallet_without_account_shows_connect_button() {
        let wallet = MockWallet::with_account(ALICE, false);
        let mut page = page();
        page.acquire_wallet(Some(wallet.clone())).await.unwrap();

        assert_eq!(page.view(), View::ConnectButton);
        assert!(page.contract().is_none());
        assert_eq!(wallet.requests(), vec!["eth_accounts".to_string()]);
    }

    #[tokio::test]
    async fn test_previously_authorized_account_is_picked_up() {
        let wallet = MockWallet::with_account(ALICE, true);
        let mut page = page();
        page.acquire_wallet(Some(wallet.clone())).await.unwrap();

        assert_eq!(page.view(), View::Account);
        assert_eq!(page.account(), Some(ALICE));
        assert!(page.contract().is_some());
        assert_eq!(wallet.count("eth_requestAccounts"), 0);
    }

    #[tokio::test]
    async fn test_connect_binds_contract_to_account() {
        let wallet = MockWallet::with_account(ALICE, false);
        let page = connected(&wallet).await;

        assert_eq!(page.view(), View::Account);
        let atm = page.contract().unwrap();
        assert_eq!(atm.account(), ALICE);
        assert_eq!(page.contract_address(), DEFAULT_ATM_ADDRESS);
    }

    #[tokio::test]
    async fn test_connect_with_no_account_keeps_connect_button() {
        let wallet = MockWallet::default();
        let mut page = page();
        page.acquire_wallet(Some(wallet.clone())).await.unwrap();
        page.connect_account().await.unwrap();

        assert_eq!(page.view(), View::ConnectButton);
        assert!(page.contract().is_none());
    }

    #[tokio::test]
    async fn test_empty_deposit_makes_no_remote_call() {
        let wallet = MockWallet::with_account(ALICE, true);
        let mut page = connected(&wallet).await;

        page.deposit_amount = String::new();
        page.deposit().await.unwrap();

        assert_eq!(page.error(), "Please enter a deposit amount");
        assert!(wallet.requests().is_empty());
    }

    #[tokio::test]
    async fn test_deposit_below_minimum_makes_no_remote_call() {
        let wallet = MockWallet::with_account(ALICE, true);
        let mut page = connected(&wallet).await;

        page.set_min_deposit("3");
        page.deposit_amount = "2.5".to_string();
        page.deposit().await.unwrap();

        assert_eq!(page.error(), "Deposit amount should be at least 3 ETH");
        assert!(wallet.requests().is_empty());
    }

    #[tokio::test]
    async fn test_withdraw_below_minimum_makes_no_remote_call() {
        let wallet = MockWallet::with_account(ALICE, true);
        let mut page = connected(&wallet).await;

        page.set_min_withdrawal("2");
        page.withdrawal_amount = "1.999999999999999999".to_string();
        page.withdraw().await.unwrap();

        assert_eq!(page.error(), "Withdrawal amount should be at least 2 ETH");
        assert!(wallet.requests().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_deposit_makes_no_remote_call() {
        let wallet = MockWallet::with_account(ALICE, true);
        let mut page = connected(&wallet).await;

        page.deposit_amount = "1e18".to_string();
        page.deposit().await.unwrap();

        assert_eq!(page.error(), "Please enter a valid deposit amount");
        assert!(wallet.requests().is_empty());
    }

    #[tokio::test]
    async fn test_amount_equal_to_minimum_is_sent() {
        let wallet = MockWallet::with_account(ALICE, true);
        let mut page = connected(&wallet).await;

        page.set_min_deposit("2");
        page.deposit_amount = "2".to_string();
        page.deposit().await.unwrap();

        assert_eq!(page.error(), "");
        assert_eq!(wallet.count("eth_sendTransaction"), 1);
        let sent = wallet.state.borrow().sent.clone();
        let call = IAssessment::depositCall::abi_decode(&sent[0]).unwrap();
        assert_eq!(call.amount, parse_ether("2").unwrap());
    }

    #[tokio::test]
    async fn test_merge_keeps_fields_edited_during_a_deposit() {
        let wallet = MockWallet::with_account(ALICE, true);
        wallet.state.borrow_mut().balance = parse_ether("10").unwrap();
        let mut live = connected(&wallet).await;
        live.deposit_amount = "1".to_string();
        live.withdrawal_amount = "5".to_string();

        let mut next = live.snapshot();
        next.deposit().await.unwrap();

        // typed while the deposit was pending
        live.withdrawal_amount = "3".to_string();
        live.set_min_deposit("4");
        live.merge(next);

        assert_eq!(live.withdrawal_amount, "3");
        assert_eq!(live.min_deposit(), 4);
        assert_eq!(live.balance(), Some(U256::from(11)));
        assert_eq!(live.activity().entries().len(), 1);
    }

    #[tokio::test]
    async fn test_merge_leaves_untouched_error_and_owner_info() {
        let wallet = MockWallet::with_account(ALICE, true);
        wallet.state.borrow_mut().owner =
            ("Bob".to_string(), U256::from(41), "Male".to_string(), U256::from(3));
        let mut live = connected(&wallet).await;

        let mut next = live.snapshot();
        next.fetch_owner_info().await.unwrap();

        // a rejected withdrawal while the owner read was pending
        live.withdraw().await.unwrap();
        live.merge(next);

        assert_eq!(live.error(), "Please enter a withdrawal amount");
        assert_eq!(live.owner_info().unwrap().name, "Bob");
        assert_eq!(live.balance(), None);
    }

    #[tokio::test]
    async fn test_merge_appends_activity_from_both_handlers() {
        let wallet = MockWallet::with_account(ALICE, true);
        wallet.state.borrow_mut().balance = parse_ether("10").unwrap();
        let mut live = connected(&wallet).await;
        live.deposit_amount = "2".to_string();
        live.withdrawal_amount = "1".to_string();

        let mut deposit = live.snapshot();
        let mut withdrawal = live.snapshot();
        deposit.deposit().await.unwrap();
        withdrawal.withdraw().await.unwrap();
        live.merge(deposit);
        live.merge(withdrawal);

        let kinds: Vec<_> = live.activity().entries().iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ActivityKind::Withdrawal, ActivityKind::Deposit]);
        assert_eq!(live.balance(), Some(U256::from(11)));
    }

    #[tokio::test]
    async fn test_merge_adopts_wallet_and_account() {
        let wallet = MockWallet::with_account(ALICE, true);
        let mut live = page();

        let mut next = live.snapshot();
        next.acquire_wallet(Some(wallet.clone())).await.unwrap();
        live.merge(next);

        assert_eq!(live.view(), View::Account);
        assert!(live.contract().is_some());
    }

    #[tokio::test]
    async fn test_successful_deposit_clears_error_and_refetches_once() {
        let wallet = MockWallet::with_account(ALICE, true);
        wallet.state.borrow_mut().balance = parse_ether("10").unwrap();
        let mut page = connected(&wallet).await;

        page.withdrawal_amount = String::new();
        page.withdraw().await.unwrap();
        assert_eq!(page.error(), "Please enter a withdrawal amount");

        page.deposit_amount = "2.5".to_string();
        page.deposit().await.unwrap();

        assert_eq!(page.error(), "");
        assert_eq!(wallet.count("eth_sendTransaction"), 1);
        assert_eq!(wallet.count("eth_call"), 1);
        assert_eq!(page.balance(), Some(U256::from(12)));
        assert_eq!(page.activity().entries()[0].kind, ActivityKind::Deposit);
        assert_eq!(page.activity().entries()[0].summary, "2.5 ETH");

        let sent = wallet.state.borrow().sent.clone();
        let call = IAssessment::depositCall::abi_decode(&sent[0]).unwrap();
        assert_eq!(call.amount, parse_ether("2.5").unwrap());
    }

    #[tokio::test]
    async fn test_successful_withdraw_refetches_balance_once() {
        let wallet = MockWallet::with_account(ALICE, true);
        wallet.state.borrow_mut().balance = parse_ether("10").unwrap();
        let mut page = connected(&wallet).await;

        page.withdrawal_amount = "4".to_string();
        page.withdraw().await.unwrap();

        assert_eq!(wallet.count("eth_call"), 1);
        assert_eq!(page.balance(), Some(U256::from(6)));
    }

    #[tokio::test]
    async fn test_balance_is_truncated_to_whole_ether() {
        let wallet = MockWallet::with_account(ALICE, true);
        wallet.state.borrow_mut().balance = parse_ether("7.999").unwrap();
        let mut page = connected(&wallet).await;

        assert_eq!(page.balance(), None);
        page.refresh_balance().await.unwrap();
        assert_eq!(page.balance(), Some(U256::from(7)));
    }

    #[tokio::test]
    async fn test_reverted_deposit_leaves_state_untouched() {
        let wallet = MockWallet::with_account(ALICE, true);
        wallet.state.borrow_mut().balance = parse_ether("1").unwrap();
        let mut page = connected(&wallet).await;
        page.refresh_balance().await.unwrap();
        wallet.state.borrow_mut().revert = true;

        page.deposit_amount = "5".to_string();
        let err = page.deposit().await.unwrap_err();

        assert!(matches!(err, WalletError::Reverted(_)));
        assert_eq!(page.balance(), Some(U256::from(1)));
        assert!(page.activity().is_empty());
        assert_eq!(page.error(), "");
    }

    #[tokio::test]
    async fn test_handlers_without_contract_do_nothing() {
        let wallet = MockWallet::with_account(ALICE, false);
        let mut page = page();
        page.acquire_wallet(Some(wallet.clone())).await.unwrap();
        wallet.state.borrow_mut().requests.clear();

        page.deposit_amount = String::new();
        page.deposit().await.unwrap();
        page.withdraw().await.unwrap();
        page.fetch_owner_info().await.unwrap();
        page.set_limits().await.unwrap();
        page.refresh_balance().await.unwrap();

        assert!(wallet.requests().is_empty());
        assert_eq!(page.error(), "");
    }

    #[tokio::test]
    async fn test_fetch_owner_info() {
        let wallet = MockWallet::with_account(ALICE, true);
        wallet.state.borrow_mut().owner =
            ("Bob".to_string(), U256::from(41), "Male".to_string(), U256::from(3));
        let mut page = connected(&wallet).await;

        assert!(page.owner_info().is_none());
        page.fetch_owner_info().await.unwrap();
        let info = page.owner_info().unwrap();
        assert_eq!(info.name, "Bob");
        assert_eq!(info.loans, U256::from(3));
    }

    #[tokio::test]
    async fn test_set_limits_sends_wei_and_does_not_refresh() {
        let wallet = MockWallet::with_account(ALICE, true);
        let mut page = connected(&wallet).await;

        page.set_min_deposit("2");
        page.set_min_withdrawal("not a number");
        page.set_limits().await.unwrap();

        assert_eq!(page.min_withdrawal(), 1);
        assert_eq!(wallet.count("eth_sendTransaction"), 1);
        assert_eq!(wallet.count("eth_call"), 0);

        let sent = wallet.state.borrow().sent.clone();
        let call = IAssessment::setLimitCall::abi_decode(&sent[0]).unwrap();
        assert_eq!(call.minDeposit, parse_ether("2").unwrap());
        assert_eq!(call.minWithdrawal, parse_ether("1").unwrap());
        assert_eq!(page.activity().entries()[0].summary, "2 / 1 ETH");
    }
}
