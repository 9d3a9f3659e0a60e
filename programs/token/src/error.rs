//! Custom errors for the Token program.

use {num_derive::FromPrimitive, solana_instruction::error::InstructionError, thiserror::Error};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum TokenError {
    #[error("Lamport balance below rent-exempt threshold")]
    NotRentExempt = 0,

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Invalid Mint")]
    InvalidMint,

    #[error("Account not associated with this Mint")]
    MintMismatch,

    #[error("Owner does not match")]
    OwnerMismatch,

    #[error("Fixed supply")]
    FixedSupply,

    #[error("Already in use")]
    AlreadyInUse,

    #[error("Invalid number of provided signers")]
    InvalidNumberOfProvidedSigners,

    #[error("Invalid number of required signers")]
    InvalidNumberOfRequiredSigners,

    #[error("State is uninitialized")]
    UninitializedState,

    #[error("State is invalid for requested operation")]
    InvalidState,

    #[error("Operation overflowed")]
    Overflow,

    #[error("Account does not support specified authority type")]
    AuthorityTypeNotSupported,

    #[error("This token mint cannot freeze accounts")]
    MintCannotFreeze,

    #[error("Account is frozen")]
    AccountFrozen,

    #[error("Multisig quorum not met")]
    QuorumNotMet,

    #[error("Account is not owned by the token program")]
    InvalidAccountOwner,
}

impl From<TokenError> for InstructionError {
    fn from(error: TokenError) -> Self {
        InstructionError::Custom(error as u32)
    }
}

impl TokenError {
    pub fn from_custom(code: u32) -> Option<Self> {
        num_traits::FromPrimitive::from_u32(code)
    }
}
