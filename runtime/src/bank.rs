//! The bank: an Agave bank started by `solana-program-test`, driven
//! synchronously.
//!
//! The validator runs on a runtime the bank owns; every call blocks on it.
//! Slots close only through [`Bank::advance_slot`], which roots the closed
//! slot, so after it returns every commitment level reads the same state.


use {
    crate::{config::BankConfig, error::BankError},
    log::*,
    solana_account::{Account, AccountSharedData},
    solana_banks_client::BanksClientError,
    solana_clock::{Clock, Slot},
    solana_commitment_config::CommitmentLevel,
    solana_hash::Hash,
    solana_message::Message,
    solana_program_runtime::invoke_context::BuiltinFunctionWithContext,
    solana_program_test::{ProgramTest, ProgramTestContext},
    solana_pubkey::Pubkey,
    solana_sdk_ids::system_program,
    solana_signature::Signature,
    solana_signer::Signer,
    solana_transaction::Transaction,
    solana_transaction_error::TransactionError,
    std::fmt,
    tokio::runtime::Runtime,
};

pub type TransactionResult<T> = Result<T, TransactionError>;

/// A builtin program registered before the bank starts.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub program_id: Pubkey,
    pub entrypoint: BuiltinFunctionWithContext,
}

/// Outcome of a transaction handed to the bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedTransaction {
    pub signature: Signature,
    pub slot: Slot,
    pub status: TransactionResult<()>,
    /// The transaction was executed and its fee charged. A failed durable
    /// nonce transaction still advances its nonce. A transaction rejected
    /// before execution changed nothing.
    pub executed: bool,
    pub log_messages: Vec<String>,
    pub units_consumed: u64,
    /// Innermost program whose instruction failed.
    pub failed_program: Option<Pubkey>,
}

pub struct Bank {
    // Declared before `runtime`: the context is dropped while its runtime
    // is still alive.
    context: ProgramTestContext,
    runtime: Runtime,
    programs: Vec<Pubkey>,
    config: BankConfig,
}

impl fmt::Debug for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bank")
            .field("programs", &self.programs)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Bank {
    pub fn new(config: BankConfig, builtins: &[Builtin]) -> Result<Self, BankError> {
        config.validate()?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.worker_threads)
            .enable_all()
            .build()?;

        let mut program_test = ProgramTest::default();
        program_test.set_compute_max_units(config.compute_unit_limit);
        let mut programs = vec![system_program::id()];
        for builtin in builtins {
            debug!("adding builtin {} at {}", builtin.name, builtin.program_id);
            program_test.add_builtin_program(builtin.name, builtin.program_id, builtin.entrypoint);
            programs.push(builtin.program_id);
        }
        let context = runtime.block_on(program_test.start_with_context());

        let mut bank = Self {
            context,
            runtime,
            programs,
            config,
        };
        // Commitment bookkeeping trails the working bank until the first
        // slot is closed.
        let slot = bank.advance_slot()?;
        info!(
            "bank started at slot {slot}: {} builtins, compute_unit_limit={}",
            builtins.len(),
            bank.config.compute_unit_limit
        );
        Ok(bank)
    }

    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    pub fn slot(&self) -> Result<Slot, BankError> {
        let clock: Clock = self
            .runtime
            .block_on(self.context.banks_client.clone().get_sysvar::<Clock>())?;
        Ok(clock.slot)
    }

    pub fn last_blockhash(&self) -> Result<Hash, BankError> {
        Ok(self
            .runtime
            .block_on(self.context.banks_client.clone().get_latest_blockhash())?)
    }

    /// Close the current slot and open the next one under a new blockhash.
    pub fn advance_slot(&mut self) -> Result<Slot, BankError> {
        let parent_hash = self.last_blockhash()?;
        let slot = self.slot()?.saturating_add(1);
        self.context.warp_to_slot(slot).map_err(BankError::Warp)?;
        if self.last_blockhash()? == parent_hash {
            self.runtime
                .block_on(self.context.get_new_latest_blockhash())?;
        }
        trace!("slot {slot} opened");
        Ok(slot)
    }

    pub fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, BankError> {
        self.get_account_with_commitment(pubkey, CommitmentLevel::Processed)
    }

    pub fn get_account_with_commitment(
        &self,
        pubkey: &Pubkey,
        commitment: CommitmentLevel,
    ) -> Result<Option<Account>, BankError> {
        Ok(self.runtime.block_on(
            self.context
                .banks_client
                .clone()
                .get_account_with_commitment(*pubkey, commitment),
        )?)
    }

    pub fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, BankError> {
        Ok(self
            .get_account(pubkey)?
            .map(|account| account.lamports)
            .unwrap_or_default())
    }

    pub fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64, BankError> {
        let rent = self
            .runtime
            .block_on(self.context.banks_client.clone().get_rent())?;
        Ok(rent.minimum_balance(data_len))
    }

    /// Fee for `message` at its recent blockhash.
    pub fn get_fee_for_message(&self, message: &Message) -> Result<u64, BankError> {
        self.runtime
            .block_on(
                self.context
                    .banks_client
                    .clone()
                    .get_fee_for_message(message.clone()),
            )?
            .ok_or(BankError::FeeUnavailable)
    }

    /// Fee for a transaction with one signature.
    pub fn lamports_per_signature(&self) -> Result<u64, BankError> {
        let payer = self.context.payer.pubkey();
        let message = Message::new_with_blockhash(&[], Some(&payer), &self.last_blockhash()?);
        self.get_fee_for_message(&message)
    }

    /// Result of a transaction the bank still remembers by signature.
    pub fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<TransactionResult<()>>, BankError> {
        let status = self.runtime.block_on(
            self.context
                .banks_client
                .clone()
                .get_transaction_status(*signature),
        )?;
        Ok(status.map(|status| match status.err {
            Some(error) => Err(error),
            None => Ok(()),
        }))
    }

    /// Credit `lamports` to `pubkey`, creating a system account if needed.
    /// Returns the new balance.
    pub fn deposit(&mut self, pubkey: &Pubkey, lamports: u64) -> Result<u64, BankError> {
        let mut account = self.get_account(pubkey)?.unwrap_or_else(|| Account {
            owner: system_program::id(),
            ..Account::default()
        });
        account.lamports = account.lamports.saturating_add(lamports);
        let balance = account.lamports;
        self.context
            .set_account(pubkey, &AccountSharedData::from(account));
        Ok(balance)
    }

    pub fn process_transaction(&mut self, tx: &Transaction) -> Result<TransactionResult<()>, BankError> {
        Ok(self.process_transaction_with_metadata(tx)?.status)
    }

    /// Execute `tx` in the current slot.
    pub fn process_transaction_with_metadata(
        &mut self,
        tx: &Transaction,
    ) -> Result<ProcessedTransaction, BankError> {
        let signature = tx.signatures.first().copied().unwrap_or_default();
        let slot = self.slot()?;
        let outcome = self.runtime.block_on(
            self.context
                .banks_client
                .process_transaction_with_metadata(tx.clone()),
        );
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(BanksClientError::TransactionError(error)) => {
                debug!("transaction {signature} rejected: {error}");
                return Ok(ProcessedTransaction {
                    signature,
                    slot,
                    status: Err(error),
                    executed: false,
                    log_messages: Vec::new(),
                    units_consumed: 0,
                    failed_program: None,
                });
            }
            Err(error) => return Err(error.into()),
        };

        let (executed, log_messages, units_consumed) = match outcome.metadata {
            Some(metadata) => (true, metadata.log_messages, metadata.compute_units_consumed),
            None => (false, Vec::new(), 0),
        };
        let failed_program = outcome
            .result
            .is_err()
            .then(|| self.failed_program(&log_messages))
            .flatten();
        match &outcome.result {
            Ok(()) => trace!("transaction {signature} succeeded in slot {slot}, {units_consumed} units"),
            Err(error) => debug!(
                "transaction {signature} failed in slot {slot}: {error}, executed={executed}"
            ),
        }
        Ok(ProcessedTransaction {
            signature,
            slot,
            status: outcome.result,
            executed,
            log_messages,
            units_consumed,
            failed_program,
        })
    }

    /// First program the runtime logged as failed. Inner instructions fail
    /// first, so this is the innermost one.
    fn failed_program(&self, log_messages: &[String]) -> Option<Pubkey> {
        let line = log_messages
            .iter()
            .find(|line| line.starts_with("Program ") && line.contains(" failed: "))?;
        self.programs
            .iter()
            .copied()
            .find(|program_id| line.starts_with(&format!("Program {program_id} failed: ")))
    }
}
