use {
    crate::config::ConfigError,
    solana_hash::Hash,
    solana_instruction::error::InstructionError,
    solana_pubkey::Pubkey,
    solana_signer::SignerError,
    solana_transaction_error::TransactionError,
    solana_sdk_ids::system_program,
    solana_system_interface::error::SystemError,
    swapgate_governance_program::error::GovernanceError,
    swapgate_swap_program::error::SwapError,
    swapgate_token_program::error::TokenError,
    thiserror::Error,
};

pub type Result<T> = std::result::Result<T, ClientError>;

/// How a caller should react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is wrong. Never retried.
    Validation,
    /// More signers have to act before the operation can succeed.
    Quorum,
    /// Another party changed the state first. Re-read, then retry.
    Concurrency,
    /// Funds or authority are missing.
    Resource,
    Other,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("swap program: {0}")]
    Swap(#[from] SwapError),

    #[error("token program: {0}")]
    Token(#[from] TokenError),

    #[error("governance program: {0}")]
    Governance(#[from] GovernanceError),

    #[error("system program: {0:?}")]
    System(SystemError),

    #[error("instruction {index} failed: {error}")]
    Instruction { index: u8, error: InstructionError },

    #[error("transaction rejected: {0}")]
    Transaction(TransactionError),

    #[error("nonce value {nonce} was consumed before submission")]
    StaleAuthorization { nonce: Hash },

    #[error("missing signatures from {}", format_keys(.missing))]
    IncompleteSignatureSet { missing: Vec<Pubkey> },

    #[error("{0} is not a required signer of this transaction")]
    NotARequiredSigner(Pubkey),

    #[error("insufficient funds: {available} lamports available, {required} required")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("{signer} is not the authority of {account}")]
    Unauthorized { account: Pubkey, signer: Pubkey },

    #[error("account {0} not found")]
    AccountNotFound(Pubkey),

    #[error("account {0} does not hold the expected state")]
    InvalidAccountData(Pubkey),

    #[error("invalid amount {amount:?} for {decimals} decimals")]
    InvalidAmount { amount: String, decimals: u8 },

    #[error("cannot decode partially signed transaction: {0}")]
    Encoding(String),

    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bank(#[from] swapgate_runtime::BankError),

    #[error("ledger lock poisoned")]
    LedgerPoisoned,
}

fn format_keys(keys: &[Pubkey]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The system program's custom error codes, in declaration order.
fn system_error(code: u32) -> Option<SystemError> {
    Some(match code {
        0 => SystemError::AccountAlreadyInUse,
        1 => SystemError::ResultWithNegativeLamports,
        2 => SystemError::InvalidProgramId,
        3 => SystemError::InvalidAccountDataLength,
        4 => SystemError::MaxSeedLengthExceeded,
        5 => SystemError::AddressWithSeedMismatch,
        6 => SystemError::NonceNoRecentBlockhashes,
        7 => SystemError::NonceBlockhashNotExpired,
        8 => SystemError::NonceUnexpectedBlockhashValue,
        _ => return None,
    })
}

impl ClientError {
    /// Decode a failed transaction, using the innermost failing program to
    /// interpret custom error codes.
    pub fn from_transaction_error(error: TransactionError, failed_program: Option<&Pubkey>) -> Self {
        match error {
            TransactionError::InstructionError(index, InstructionError::Custom(code)) => {
                failed_program
                    .and_then(|program_id| Self::from_program_code(program_id, code))
                    .unwrap_or(Self::Instruction {
                        index,
                        error: InstructionError::Custom(code),
                    })
            }
            TransactionError::InstructionError(index, error) => Self::Instruction { index, error },
            error => Self::Transaction(error),
        }
    }

    fn from_program_code(program_id: &Pubkey, code: u32) -> Option<Self> {
        if swapgate_swap_program::check_id(program_id) {
            SwapError::from_custom(code).map(Self::Swap)
        } else if swapgate_token_program::check_id(program_id) {
            TokenError::from_custom(code).map(Self::Token)
        } else if swapgate_governance_program::check_id(program_id) {
            GovernanceError::from_custom(code).map(Self::Governance)
        } else if system_program::check_id(program_id) {
            system_error(code).map(Self::System)
        } else {
            None
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Swap(_) => ErrorKind::Validation,
            Self::Token(TokenError::QuorumNotMet) => ErrorKind::Quorum,
            Self::Token(TokenError::InsufficientFunds) => ErrorKind::Resource,
            Self::Token(_) => ErrorKind::Validation,
            Self::Governance(GovernanceError::AlreadyExecuted | GovernanceError::StaleProposal) => {
                ErrorKind::Concurrency
            }
            Self::Governance(_) => ErrorKind::Validation,
            Self::System(SystemError::ResultWithNegativeLamports) => ErrorKind::Resource,
            Self::System(SystemError::NonceBlockhashNotExpired) => ErrorKind::Concurrency,
            Self::System(_) => ErrorKind::Validation,
            Self::Instruction { error, .. } => match error {
                // A cosigner's signature is absent from the enclosing transaction.
                InstructionError::MissingRequiredSignature | InstructionError::PrivilegeEscalation => {
                    ErrorKind::Quorum
                }
                InstructionError::InsufficientFunds => ErrorKind::Resource,
                _ => ErrorKind::Other,
            },
            Self::Transaction(error) => match error {
                TransactionError::AlreadyProcessed | TransactionError::BlockhashNotFound => {
                    ErrorKind::Concurrency
                }
                TransactionError::InsufficientFundsForFee
                | TransactionError::InsufficientFundsForRent { .. } => ErrorKind::Resource,
                _ => ErrorKind::Other,
            },
            Self::StaleAuthorization { .. } => ErrorKind::Concurrency,
            Self::IncompleteSignatureSet { .. } => ErrorKind::Quorum,
            Self::InsufficientFunds { .. } | Self::Unauthorized { .. } => ErrorKind::Resource,
            Self::NotARequiredSigner(_) | Self::InvalidAmount { .. } => ErrorKind::Validation,
            Self::AccountNotFound(_)
            | Self::InvalidAccountData(_)
            | Self::Encoding(_)
            | Self::Signer(_)
            | Self::Config(_)
            | Self::Bank(_)
            | Self::LedgerPoisoned => ErrorKind::Other,
        }
    }
}
