//! ABI binding of the Assessment ATM contract

use crate::wallet::{self, Eip1193, Receipt, WalletError};
use alloy_primitives::{Address, Bytes, U256, address};
use alloy_sol_types::{SolCall, sol};
use std::time::Duration;

/// Address the contract lands at when it is the first deployment on a fresh
/// development node
pub const DEFAULT_ATM_ADDRESS: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

sol! {
    interface IAssessment {
        function getBalance() external view returns (uint256);
        function deposit(uint256 amount) external;
        function withdraw(uint256 amount) external;
        function getOwnerInfo() external view returns (string name, uint256 age, string gender, uint256 loans);
        function setLimit(uint256 minDeposit, uint256 minWithdrawal) external;
    }
}

/// Details about the account owner stored in the contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerInfo {
    pub name: String,
    pub age: U256,
    pub gender: String,
    pub loans: U256,
}

/// Handle on the deployed contract, acting on behalf of one account
#[derive(Debug, Clone)]
pub struct AtmContract<P> {
    provider: P,
    address: Address,
    from: Address,
    poll_interval: Duration,
}

impl<P: Eip1193> AtmContract<P> {
    pub fn new(provider: P, address: Address, from: Address, poll_interval: Duration) -> Self {
        AtmContract {
            provider,
            address,
            from,
            poll_interval,
        }
    }

    pub fn account(&self) -> Address {
        self.from
    }

    async fn read<C: SolCall>(&self, call: C) -> Result<C::Return, WalletError> {
        let data = Bytes::from(call.abi_encode());
        let raw = wallet::call(&self.provider, self.from, self.address, data).await?;
        Ok(C::abi_decode_returns(&raw)?)
    }

    /// Submits the call as a transaction and waits for its inclusion
    async fn transact<C: SolCall>(&self, call: C) -> Result<Receipt, WalletError> {
        let data = Bytes::from(call.abi_encode());
        let hash = wallet::send_transaction(&self.provider, self.from, self.address, data).await?;
        log::info!("Submitted {} as {}", C::SIGNATURE, hash);
        wallet::wait_for_inclusion(&self.provider, hash, self.poll_interval).await
    }

    /// Balance held by the contract, in wei
    pub async fn get_balance(&self) -> Result<U256, WalletError> {
        self.read(IAssessment::getBalanceCall {}).await
    }

    pub async fn deposit(&self, amount: U256) -> Result<Receipt, WalletError> {
        self.transact(IAssessment::depositCall { amount }).await
    }

    pub async fn withdraw(&self, amount: U256) -> Result<Receipt, WalletError> {
        self.transact(IAssessment::withdrawCall { amount }).await
    }

    pub async fn get_owner_info(&self) -> Result<OwnerInfo, WalletError> {
        let ret = self.read(IAssessment::getOwnerInfoCall {}).await?;
        Ok(OwnerInfo {
            name: ret.name,
            age: ret.age,
            gender: ret.gender,
            loans: ret.loans,
        })
    }

    /// Both minimums are wei amounts and travel in a single transaction
    pub async fn set_limit(
        &self,
        min_deposit: U256,
        min_withdrawal: U256,
    ) -> Result<Receipt, WalletError> {
        self.transact(IAssessment::setLimitCall {
            minDeposit: min_deposit,
            minWithdrawal: min_withdrawal,
        })
        .await
    }
}
