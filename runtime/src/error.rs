use {
    crate::config::ConfigError, solana_banks_client::BanksClientError,
    solana_program_test::ProgramTestError,
};

/// Errors raised by the bank itself, as opposed to transaction failures,
/// which are reported in [`crate::ProcessedTransaction::status`].
#[derive(Debug, thiserror::Error)]
pub enum BankError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("banks client: {0}")]
    Banks(#[from] BanksClientError),

    #[error("cannot advance slot: {0:?}")]
    Warp(ProgramTestError),

    #[error("runtime: {0}")]
    Io(#[from] std::io::Error),

    #[error("no fee quote for the latest blockhash")]
    FeeUnavailable,
}
