//! Durable nonce tokens for offline signing.
//!
//! A token is a system-owned nonce account. Its stored value stands in for
//! a recent blockhash, so a transaction built against it stays valid until
//! the value is advanced, however long signing takes.

use {
    crate::{
        context::Context,
        error::{ClientError, Result},
        ledger::Ledger,
    },
    log::*,
    solana_commitment_config::CommitmentLevel,
    solana_hash::Hash,
    solana_keypair::Keypair,
    solana_nonce::{
        state::{Data, State},
        versions::Versions,
    },
    solana_pubkey::Pubkey,
    solana_sdk_ids::system_program,
    solana_signer::Signer,
    solana_system_interface::instruction as system_instruction,
};

/// Size of a nonce account's data.
pub const NONCE_ACCOUNT_SPACE: usize = 80;

/// A nonce account and the key allowed to advance it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceToken {
    pub address: Pubkey,
    pub authority: Pubkey,
}

pub struct NonceCoordinator<'a, L> {
    context: &'a Context<L>,
}

impl<'a, L: Ledger> NonceCoordinator<'a, L> {
    pub fn new(context: &'a Context<L>) -> Self {
        Self { context }
    }

    /// Create a rent-exempt nonce account funded by `funder`.
    ///
    /// Returns once the account is visible at the configured nonce
    /// commitment, so [`Self::current_value`] can read it immediately.
    pub fn create_token(&self, funder: &Keypair, authority: &Pubkey) -> Result<NonceToken> {
        let ledger = &self.context.ledger;
        let rent = ledger.get_minimum_balance_for_rent_exemption(NONCE_ACCOUNT_SPACE)?;
        // Funder and the new account both sign.
        let fee = ledger.lamports_per_signature()?.saturating_mul(2);
        let required = rent.saturating_add(fee);
        let available = ledger.get_balance(&funder.pubkey(), CommitmentLevel::Processed)?;
        if available < required {
            return Err(ClientError::InsufficientFunds {
                required,
                available,
            });
        }

        let nonce = Keypair::new();
        let instructions = system_instruction::create_nonce_account(
            &funder.pubkey(),
            &nonce.pubkey(),
            authority,
            rent,
        );
        self.context.send_with_commitment(
            &instructions,
            funder,
            &[&nonce],
            self.context.config.nonce_commitment,
        )?;
        info!("nonce token {} created, authority {authority}", nonce.pubkey());
        Ok(NonceToken {
            address: nonce.pubkey(),
            authority: *authority,
        })
    }

    /// The token's stored value as seen at `commitment`.
    pub fn current_value(&self, token: &Pubkey, commitment: CommitmentLevel) -> Result<Hash> {
        Ok(self.nonce_data(token, commitment)?.blockhash())
    }

    fn nonce_data(&self, token: &Pubkey, commitment: CommitmentLevel) -> Result<Data> {
        let account = self
            .context
            .ledger
            .get_account(token, commitment)?
            .ok_or(ClientError::AccountNotFound(*token))?;
        if !system_program::check_id(&account.owner) {
            return Err(ClientError::InvalidAccountData(*token));
        }
        let versions: Versions = bincode::deserialize(&account.data)
            .map_err(|_| ClientError::InvalidAccountData(*token))?;
        match versions.state() {
            State::Initialized(data) => Ok(data.clone()),
            State::Uninitialized => Err(ClientError::InvalidAccountData(*token)),
        }
    }

    fn check_authority(&self, token: &Pubkey, authority: &Keypair) -> Result<()> {
        let data = self.nonce_data(token, CommitmentLevel::Processed)?;
        if data.authority != authority.pubkey() {
            return Err(ClientError::Unauthorized {
                account: *token,
                signer: authority.pubkey(),
            });
        }
        Ok(())
    }

    /// Withdraw the whole balance to `destination`, closing the token.
    /// `authority` pays the fee. Returns the amount moved.
    pub fn reclaim(&self, token: &Pubkey, authority: &Keypair, destination: &Pubkey) -> Result<u64> {
        self.check_authority(token, authority)?;
        let balance = self
            .context
            .ledger
            .get_balance(token, CommitmentLevel::Processed)?;
        let instruction = system_instruction::withdraw_nonce_account(
            token,
            &authority.pubkey(),
            destination,
            balance,
        );
        self.context.send(&[instruction], authority, &[])?;
        info!("nonce token {token} reclaimed, {balance} lamports to {destination}");
        Ok(balance)
    }

    /// Hand the token to `new_authority`.
    pub fn authorize(&self, token: &Pubkey, authority: &Keypair, new_authority: &Pubkey) -> Result<()> {
        self.check_authority(token, authority)?;
        let instruction =
            system_instruction::authorize_nonce_account(token, &authority.pubkey(), new_authority);
        self.context.send(&[instruction], authority, &[])?;
        debug!("nonce token {token} authority {} -> {new_authority}", authority.pubkey());
        Ok(())
    }
}
