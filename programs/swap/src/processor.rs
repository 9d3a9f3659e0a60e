//! Instruction processing logic for the Swap program.

use {
    crate::{error::SwapError, find_mint_authority_address, instruction::SwapInstruction},
    log::*,
    solana_bincode::limited_deserialize,
    solana_instruction::error::InstructionError,
    solana_sdk_ids::system_program,
    swapgate_associated_account_program::get_associated_account_address,
    solana_program_runtime::{declare_process_instruction, invoke_context::InvokeContext},
    solana_svm_log_collector::ic_msg,
    solana_transaction_context::IndexOfAccount,
    swapgate_runtime::Builtin,
    swapgate_token_program::{
        instruction as token_instruction,
        state::{HoldingAccount, Mint, TokenState},
    },
};

pub const DEFAULT_COMPUTE_UNITS: u64 = 5_000;

const FEE_PAYER_INDEX: IndexOfAccount = 0;
const MINT_A_INDEX: IndexOfAccount = 1;
const MINT_B_INDEX: IndexOfAccount = 2;
const SENDER_INDEX: IndexOfAccount = 3;
const SENDER_HOLDING_INDEX: IndexOfAccount = 4;
const RECEIVER_INDEX: IndexOfAccount = 5;
const RECEIVER_HOLDING_INDEX: IndexOfAccount = 6;
const MINT_B_AUTHORITY_INDEX: IndexOfAccount = 7;
const COUNTERPARTY_INDEX: IndexOfAccount = 8;
const PROGRAM_AUTHORITY_INDEX: IndexOfAccount = 9;
const SYSTEM_PROGRAM_INDEX: IndexOfAccount = 10;
const ASSOCIATED_PROGRAM_INDEX: IndexOfAccount = 11;
const TOKEN_PROGRAM_INDEX: IndexOfAccount = 12;

solana_pubkey::declare_id!("9vtrwv4Y7ZmLEDHmgxnGJqF5oAb35298u1e8VsDA2ZRi");

pub const BUILTIN: Builtin = Builtin {
    name: "swapgate_swap_program",
    program_id: ID,
    entrypoint: Entrypoint::vm,
};

declare_process_instruction!(Entrypoint, DEFAULT_COMPUTE_UNITS, |invoke_context| {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    let instruction_data = instruction_context.get_instruction_data();

    let instruction: SwapInstruction =
        limited_deserialize(instruction_data, solana_packet::PACKET_DATA_SIZE as u64)?;

    trace!("swap process_instruction: {instruction:?}");

    match instruction {
        SwapInstruction::Swap { amount } => process_swap(invoke_context, amount),
    }
});

/// Token-program state of type `T` at instruction account `index`.
fn load_token_state<T: TokenState>(
    invoke_context: &InvokeContext,
    index: IndexOfAccount,
) -> Result<T, InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    let account = instruction_context.try_borrow_instruction_account(index)?;

    if account.get_owner() != &swapgate_token_program::id() {
        return Err(InstructionError::InvalidAccountOwner);
    }
    T::unpack(account.get_data()).map_err(|_| InstructionError::InvalidAccountData)
}

fn process_swap(invoke_context: &mut InvokeContext, amount: u64) -> Result<(), InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    instruction_context.check_number_of_instruction_accounts(TOKEN_PROGRAM_INDEX.saturating_add(1))?;

    for index in [FEE_PAYER_INDEX, SENDER_INDEX, COUNTERPARTY_INDEX] {
        if !instruction_context.is_instruction_account_signer(index)? {
            return Err(InstructionError::MissingRequiredSignature);
        }
    }
    let key_of = |index| instruction_context.get_key_of_instruction_account(index).copied();
    let mint_a = key_of(MINT_A_INDEX)?;
    let mint_b = key_of(MINT_B_INDEX)?;
    let sender = key_of(SENDER_INDEX)?;
    let sender_holding = key_of(SENDER_HOLDING_INDEX)?;
    let receiver = key_of(RECEIVER_INDEX)?;
    let receiver_holding = key_of(RECEIVER_HOLDING_INDEX)?;
    let mint_b_authority = key_of(MINT_B_AUTHORITY_INDEX)?;
    let counterparty = key_of(COUNTERPARTY_INDEX)?;
    let program_authority = key_of(PROGRAM_AUTHORITY_INDEX)?;

    if key_of(SYSTEM_PROGRAM_INDEX)? != system_program::id()
        || key_of(ASSOCIATED_PROGRAM_INDEX)? != swapgate_associated_account_program::id()
        || key_of(TOKEN_PROGRAM_INDEX)? != swapgate_token_program::id()
    {
        return Err(InstructionError::IncorrectProgramId);
    }
    let (expected_authority, _) = find_mint_authority_address();
    if program_authority != expected_authority {
        return Err(SwapError::InvalidProgramAuthority.into());
    }
    if sender_holding != get_associated_account_address(&sender, &mint_a)
        || receiver_holding != get_associated_account_address(&receiver, &mint_b)
    {
        return Err(SwapError::InvalidHoldingAccount.into());
    }

    if mint_a == mint_b {
        return Err(SwapError::RepeatedMint.into());
    }
    let asset_a = load_token_state::<Mint>(invoke_context, MINT_A_INDEX)?;
    let asset_b = load_token_state::<Mint>(invoke_context, MINT_B_INDEX)?;
    if asset_a.decimals != asset_b.decimals {
        return Err(SwapError::NotEqualDecimals.into());
    }
    if amount == 0 {
        return Err(SwapError::ZeroSwapAmount.into());
    }
    let holding = load_token_state::<HoldingAccount>(invoke_context, SENDER_HOLDING_INDEX)?;
    if holding.amount < amount {
        ic_msg!(
            invoke_context,
            "Sender holds {} of {}, swap needs {}",
            holding.amount,
            mint_a,
            amount
        );
        return Err(SwapError::NotEnoughTokens.into());
    }
    if asset_b.mint_authority != Some(mint_b_authority) {
        return Err(SwapError::InvalidMintAuthority.into());
    }
    drop(instruction_context);

    invoke_context.native_invoke(
        token_instruction::burn(&sender_holding, &mint_a, &sender, &[], amount).into(),
        &[],
    )?;
    // `program_authority` was checked against its derivation above.
    invoke_context.native_invoke(
        token_instruction::mint_to(
            &mint_b,
            &receiver_holding,
            &mint_b_authority,
            &[&counterparty, &program_authority],
            amount,
        )
        .into(),
        &[program_authority],
    )?;

    ic_msg!(
        invoke_context,
        "Swapped {} of {} from {} for {} to {}",
        amount,
        mint_a,
        sender,
        mint_b,
        receiver
    );
    Ok(())
}
