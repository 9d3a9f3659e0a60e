use {
    crate::error::{ClientError, Result},
    log::*,
    solana_account::Account,
    solana_commitment_config::CommitmentLevel,
    solana_hash::Hash,
    solana_pubkey::Pubkey,
    solana_sdk_ids::system_program,
    solana_signature::Signature,
    solana_system_interface::instruction::SystemInstruction,
    solana_transaction::Transaction,
    solana_transaction_error::TransactionError,
    std::sync::{Arc, Mutex, MutexGuard},
    swapgate_runtime::{Bank, BankConfig, Builtin},
};

/// The ledger operations the client flows are written against.
pub trait Ledger {
    /// Submit `tx` and wait until it is visible at `commitment`.
    fn send_transaction(&self, tx: &Transaction, commitment: CommitmentLevel) -> Result<Signature>;

    fn get_account(&self, pubkey: &Pubkey, commitment: CommitmentLevel) -> Result<Option<Account>>;

    fn get_latest_blockhash(&self) -> Result<Hash>;

    fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64>;

    fn lamports_per_signature(&self) -> Result<u64>;

    fn get_balance(&self, pubkey: &Pubkey, commitment: CommitmentLevel) -> Result<u64> {
        Ok(self
            .get_account(pubkey, commitment)?
            .map(|account| account.lamports)
            .unwrap_or_default())
    }
}

/// The SwapGate programs a [`LocalLedger`] registers.
pub const BUILTINS: [Builtin; 4] = [
    swapgate_token_program::BUILTIN,
    swapgate_associated_account_program::BUILTIN,
    swapgate_governance_program::BUILTIN,
    swapgate_swap_program::BUILTIN,
];

/// An in-process [`Bank`] with every SwapGate program registered.
///
/// Clones share the same bank, so several contexts can submit against one
/// ledger. The bank's lock is the global commit order.
#[derive(Debug, Clone)]
pub struct LocalLedger {
    bank: Arc<Mutex<Bank>>,
}

impl LocalLedger {
    pub fn new(config: BankConfig) -> Result<Self> {
        let bank = Bank::new(config, &BUILTINS)?;
        Ok(Self {
            bank: Arc::new(Mutex::new(bank)),
        })
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, Bank>> {
        self.bank.lock().map_err(|_| ClientError::LedgerPoisoned)
    }

    /// Credit lamports outside any transaction. Returns the new balance.
    pub fn airdrop(&self, pubkey: &Pubkey, lamports: u64) -> Result<u64> {
        let balance = self.lock()?.deposit(pubkey, lamports)?;
        debug!("airdrop {lamports} to {pubkey}, balance {balance}");
        Ok(balance)
    }
}

/// Whether `tx` is authorized by a durable nonce rather than a recent
/// blockhash.
fn advances_nonce(tx: &Transaction) -> bool {
    let message = &tx.message;
    message.instructions.first().is_some_and(|instruction| {
        message
            .account_keys
            .get(usize::from(instruction.program_id_index))
            .is_some_and(system_program::check_id)
            && matches!(
                bincode::deserialize::<SystemInstruction>(&instruction.data),
                Ok(SystemInstruction::AdvanceNonceAccount)
            )
    })
}

impl Ledger for LocalLedger {
    /// Every executed transaction closes its slot, and closing a slot roots
    /// it: on return the transaction is visible at any `commitment`.
    ///
    /// A durable-nonce transaction that fails still consumes its nonce value,
    /// so neither it nor any other transaction built on that value can commit
    /// later.
    fn send_transaction(&self, tx: &Transaction, commitment: CommitmentLevel) -> Result<Signature> {
        let mut bank = self.lock()?;
        let processed = bank.process_transaction_with_metadata(tx)?;
        if processed.executed {
            bank.advance_slot()?;
        }
        match processed.status {
            Ok(()) => {
                debug!(
                    "transaction {} committed in slot {}, visible at {commitment:?}",
                    processed.signature, processed.slot
                );
                Ok(processed.signature)
            }
            // The nonce moved on. Whether this very transaction moved it
            // decides between a replay and a lost race.
            Err(TransactionError::BlockhashNotFound) if advances_nonce(tx) => {
                if bank.get_signature_status(&processed.signature)?.is_some() {
                    Err(ClientError::Transaction(TransactionError::AlreadyProcessed))
                } else {
                    Err(ClientError::StaleAuthorization {
                        nonce: tx.message.recent_blockhash,
                    })
                }
            }
            Err(error) => {
                debug!("transaction {} failed: {error}", processed.signature);
                for line in &processed.log_messages {
                    trace!("  {line}");
                }
                Err(ClientError::from_transaction_error(
                    error,
                    processed.failed_program.as_ref(),
                ))
            }
        }
    }

    fn get_account(&self, pubkey: &Pubkey, commitment: CommitmentLevel) -> Result<Option<Account>> {
        Ok(self.lock()?.get_account_with_commitment(pubkey, commitment)?)
    }

    fn get_latest_blockhash(&self) -> Result<Hash> {
        Ok(self.lock()?.last_blockhash()?)
    }

    fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64> {
        Ok(self.lock()?.get_minimum_balance_for_rent_exemption(data_len)?)
    }

    fn lamports_per_signature(&self) -> Result<u64> {
        Ok(self.lock()?.lamports_per_signature()?)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*, assert_matches::assert_matches, solana_keypair::Keypair, solana_signer::Signer,
        solana_system_interface::{error::SystemError, instruction as system_instruction},
    };

    fn transfer(ledger: &LocalLedger, from: &Keypair, to: &Pubkey, lamports: u64) -> Transaction {
        Transaction::new_signed_with_payer(
            &[system_instruction::transfer(&from.pubkey(), to, lamports)],
            Some(&from.pubkey()),
            &[from],
            ledger.get_latest_blockhash().unwrap(),
        )
    }

    #[test]
    fn test_send_is_visible_at_every_commitment() {
        let ledger = LocalLedger::new(BankConfig::default()).unwrap();
        let payer = Keypair::new();
        let recipient = Keypair::new().pubkey();
        ledger.airdrop(&payer.pubkey(), 1_000_000_000).unwrap();

        let tx = transfer(&ledger, &payer, &recipient, 5_000_000);
        ledger
            .send_transaction(&tx, CommitmentLevel::Processed)
            .unwrap();
        for commitment in [
            CommitmentLevel::Processed,
            CommitmentLevel::Confirmed,
            CommitmentLevel::Finalized,
        ] {
            assert_eq!(ledger.get_balance(&recipient, commitment).unwrap(), 5_000_000);
        }

        assert_matches!(
            ledger.send_transaction(&tx, CommitmentLevel::Processed),
            Err(ClientError::Transaction(TransactionError::AlreadyProcessed))
        );
    }

    #[test]
    fn test_each_send_closes_its_slot() {
        let ledger = LocalLedger::new(BankConfig::default()).unwrap();
        let payer = Keypair::new();
        ledger.airdrop(&payer.pubkey(), 1_000_000_000).unwrap();

        let before = ledger.get_latest_blockhash().unwrap();
        let slot = ledger.lock().unwrap().slot().unwrap();
        let tx = transfer(&ledger, &payer, &Keypair::new().pubkey(), 1_000_000);
        ledger
            .send_transaction(&tx, CommitmentLevel::Processed)
            .unwrap();
        assert_ne!(ledger.get_latest_blockhash().unwrap(), before);
        assert_eq!(ledger.lock().unwrap().slot().unwrap(), slot + 1);
    }

    #[test]
    fn test_custom_errors_are_decoded() {
        let ledger = LocalLedger::new(BankConfig::default()).unwrap();
        let payer = Keypair::new();
        ledger.airdrop(&payer.pubkey(), 1_000_000_000).unwrap();

        let tx = transfer(&ledger, &payer, &Keypair::new().pubkey(), 2_000_000_000);
        assert_matches!(
            ledger.send_transaction(&tx, CommitmentLevel::Processed),
            Err(ClientError::System(SystemError::ResultWithNegativeLamports))
        );
    }

    #[test]
    fn test_registers_every_program() {
        let ledger = LocalLedger::new(BankConfig::default()).unwrap();
        for builtin in BUILTINS {
            let account = ledger
                .get_account(&builtin.program_id, CommitmentLevel::Processed)
                .unwrap()
                .unwrap();
            assert!(account.executable, "{} not executable", builtin.name);
        }
    }
}
