use {num_derive::FromPrimitive, solana_instruction::error::InstructionError, thiserror::Error};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum SwapError {
    #[error("You don't have enough tokens for this swap")]
    NotEnoughTokens = 6000,

    #[error("You are trying to swap the same token")]
    RepeatedMint,

    #[error("Tokens must have the same decimals")]
    NotEqualDecimals,

    #[error("Swap amount must be greater than zero")]
    ZeroSwapAmount,

    #[error("Asset B is not minted by the given multisig")]
    InvalidMintAuthority,

    #[error("Holding account is not the associated account of its owner")]
    InvalidHoldingAccount,

    #[error("Program authority does not match its derivation")]
    InvalidProgramAuthority,
}

impl From<SwapError> for InstructionError {
    fn from(error: SwapError) -> Self {
        InstructionError::Custom(error as u32)
    }
}

impl SwapError {
    pub fn from_custom(code: u32) -> Option<Self> {
        num_traits::FromPrimitive::from_u32(code)
    }
}
