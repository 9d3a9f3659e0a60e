//! Instruction processing logic for the Associated-account program.

use {
    crate::{
        error::AssociatedAccountError, get_associated_account_address,
        instruction::AssociatedAccountInstruction,
    },
    log::*,
    solana_bincode::limited_deserialize,
    solana_instruction::error::InstructionError,
    solana_system_interface::instruction as system_instruction,
    solana_program_runtime::{declare_process_instruction, invoke_context::InvokeContext},
    solana_svm_log_collector::ic_msg,
    swapgate_token_program::state::{HoldingAccount, TokenState},
};

pub const DEFAULT_COMPUTE_UNITS: u64 = 1_500;

const FUNDER_INDEX: u16 = 0;
const ACCOUNT_INDEX: u16 = 1;
const OWNER_INDEX: u16 = 2;
const MINT_INDEX: u16 = 3;
const TOKEN_PROGRAM_INDEX: u16 = 5;

declare_process_instruction!(Entrypoint, DEFAULT_COMPUTE_UNITS, |invoke_context| {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    let instruction_data = instruction_context.get_instruction_data();

    let instruction: AssociatedAccountInstruction =
        limited_deserialize(instruction_data, solana_packet::PACKET_DATA_SIZE as u64)?;

    trace!("associated-account process_instruction: {instruction:?}");

    process_create(
        invoke_context,
        instruction == AssociatedAccountInstruction::CreateIdempotent,
    )
});

/// `Create` / `CreateIdempotent`
fn process_create(invoke_context: &mut InvokeContext, idempotent: bool) -> Result<(), InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    instruction_context.check_number_of_instruction_accounts(TOKEN_PROGRAM_INDEX.saturating_add(1))?;

    let funder = *instruction_context.get_key_of_instruction_account(FUNDER_INDEX)?;
    let address = *instruction_context.get_key_of_instruction_account(ACCOUNT_INDEX)?;
    let owner = *instruction_context.get_key_of_instruction_account(OWNER_INDEX)?;
    let mint = *instruction_context.get_key_of_instruction_account(MINT_INDEX)?;
    let token_program = *instruction_context.get_key_of_instruction_account(TOKEN_PROGRAM_INDEX)?;

    if token_program != swapgate_token_program::id() {
        ic_msg!(invoke_context, "Unsupported token program {}", token_program);
        return Err(InstructionError::IncorrectProgramId);
    }
    // The derived address is the one signer this program can lend to the
    // system program.
    if address != get_associated_account_address(&owner, &mint) {
        ic_msg!(
            invoke_context,
            "Error: Associated address does not match seed derivation"
        );
        return Err(InstructionError::InvalidSeeds);
    }

    let (existing_owner, existing_data, lamports) = {
        let account = instruction_context.try_borrow_instruction_account(ACCOUNT_INDEX)?;
        (
            *account.get_owner(),
            account.get_data().to_vec(),
            account.get_lamports(),
        )
    };
    if idempotent && existing_owner == swapgate_token_program::id() {
        let holding = HoldingAccount::unpack(&existing_data)
            .map_err(|_| InstructionError::InvalidAccountData)?;
        if holding.owner != owner || holding.mint != mint {
            return Err(AssociatedAccountError::InvalidOwner.into());
        }
        trace!("holding account {address} already exists");
        return Ok(());
    }

    {
        let mint_account = instruction_context.try_borrow_instruction_account(MINT_INDEX)?;
        if mint_account.get_owner() != &swapgate_token_program::id() {
            return Err(InstructionError::IncorrectProgramId);
        }
    }
    drop(instruction_context);

    let rent = invoke_context.get_sysvar_cache().get_rent()?;
    let required_lamports = rent.minimum_balance(HoldingAccount::LEN);

    if lamports > 0 {
        // Someone pre-funded the address; top it up and claim it in place.
        let shortfall = required_lamports.saturating_sub(lamports);
        if shortfall > 0 {
            invoke_context.native_invoke(
                system_instruction::transfer(&funder, &address, shortfall).into(),
                &[],
            )?;
        }
        invoke_context.native_invoke(
            system_instruction::allocate(&address, HoldingAccount::LEN as u64).into(),
            &[address],
        )?;
        invoke_context.native_invoke(
            system_instruction::assign(&address, &token_program).into(),
            &[address],
        )?;
    } else {
        invoke_context.native_invoke(
            system_instruction::create_account(
                &funder,
                &address,
                required_lamports,
                HoldingAccount::LEN as u64,
                &token_program,
            )
            .into(),
            &[address],
        )?;
    }

    invoke_context.native_invoke(
        swapgate_token_program::instruction::initialize_account(&address, &mint, &owner).into(),
        &[],
    )?;

    ic_msg!(
        invoke_context,
        "Created holding account {} for owner {} mint {}",
        address,
        owner,
        mint
    );
    Ok(())
}
