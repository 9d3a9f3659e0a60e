use {num_derive::FromPrimitive, solana_instruction::error::InstructionError, thiserror::Error};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum AssociatedAccountError {
    /// The holding account at the derived address belongs to someone else.
    #[error("Associated holding account owner does not match address derivation")]
    InvalidOwner = 0,
}

impl From<AssociatedAccountError> for InstructionError {
    fn from(error: AssociatedAccountError) -> Self {
        InstructionError::Custom(error as u32)
    }
}
