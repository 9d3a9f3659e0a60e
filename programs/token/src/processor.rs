//! Instruction processing logic for the Token program.

use {
    crate::{
        error::TokenError,
        instruction::{AuthorityType, TokenInstruction},
        state::{
            AccountState, HoldingAccount, Mint, Multisig, TokenState, MAX_SIGNERS, MIN_SIGNERS,
        },
    },
    log::*,
    solana_bincode::limited_deserialize,
    solana_instruction::error::InstructionError,
    solana_pubkey::Pubkey,
    solana_program_runtime::{declare_process_instruction, invoke_context::InvokeContext},
    solana_svm_log_collector::ic_msg,
    solana_transaction_context::IndexOfAccount,
    swapgate_runtime::Builtin,
};

/// Default compute-unit budget for token instructions.
pub const DEFAULT_COMPUTE_UNITS: u64 = 3_000;

// ---------------------------------------------------------------------------
// Program ID
// ---------------------------------------------------------------------------

solana_pubkey::declare_id!("6DH5f6RxdsHx5CqhQ9dPUmXsfgtjhQwygyaN5PbfF9kj");

pub const BUILTIN: Builtin = Builtin {
    name: "swapgate_token_program",
    program_id: ID,
    entrypoint: Entrypoint::vm,
};

// ---------------------------------------------------------------------------
// Entrypoint
// ---------------------------------------------------------------------------

declare_process_instruction!(Entrypoint, DEFAULT_COMPUTE_UNITS, |invoke_context| {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    let instruction_data = instruction_context.get_instruction_data();

    let instruction: TokenInstruction =
        limited_deserialize(instruction_data, solana_packet::PACKET_DATA_SIZE as u64)?;

    trace!("token process_instruction: {instruction:?}");

    match instruction {
        TokenInstruction::InitializeMint {
            decimals,
            mint_authority,
            freeze_authority,
        } => process_initialize_mint(invoke_context, decimals, mint_authority, freeze_authority),
        TokenInstruction::InitializeAccount => process_initialize_account(invoke_context),
        TokenInstruction::InitializeMultisig { m } => process_initialize_multisig(invoke_context, m),
        TokenInstruction::Transfer { amount } => process_transfer(invoke_context, amount),
        TokenInstruction::MintTo { amount } => process_mint_to(invoke_context, amount),
        TokenInstruction::Burn { amount } => process_burn(invoke_context, amount),
        TokenInstruction::SetAuthority {
            authority_type,
            new_authority,
        } => process_set_authority(invoke_context, authority_type, new_authority),
        TokenInstruction::FreezeAccount => process_toggle_freeze(invoke_context, true),
        TokenInstruction::ThawAccount => process_toggle_freeze(invoke_context, false),
    }
});

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load token state of type `T` from instruction account `index`.
fn load<T: TokenState>(
    invoke_context: &InvokeContext,
    index: IndexOfAccount,
) -> Result<T, InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    let account = instruction_context.try_borrow_instruction_account(index)?;

    if account.get_owner() != &id() {
        return Err(TokenError::InvalidAccountOwner.into());
    }
    T::unpack(account.get_data()).map_err(|_| TokenError::UninitializedState.into())
}

fn save<T: TokenState>(
    invoke_context: &InvokeContext,
    index: IndexOfAccount,
    state: &T,
) -> Result<(), InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    let mut account = instruction_context.try_borrow_instruction_account(index)?;

    let mut data = account.get_data().to_vec();
    state
        .pack_into(&mut data)
        .map_err(|_| InstructionError::InvalidAccountData)?;
    account.set_data_from_slice(&data)
}

/// The account at `index` must be ours, large enough, zeroed and rent exempt.
fn check_initializable<T: TokenState>(
    invoke_context: &InvokeContext,
    index: IndexOfAccount,
    name: &str,
) -> Result<(), InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    let account = instruction_context.try_borrow_instruction_account(index)?;

    if account.get_owner() != &id() {
        ic_msg!(invoke_context, "{}: account not owned by the token program", name);
        return Err(TokenError::InvalidAccountOwner.into());
    }
    let data = account.get_data();
    if data.len() < T::LEN {
        ic_msg!(
            invoke_context,
            "{}: account data {} bytes, need {}",
            name,
            data.len(),
            T::LEN
        );
        return Err(InstructionError::InvalidAccountData);
    }
    if data[0] != 0 {
        ic_msg!(invoke_context, "{}: account already initialised", name);
        return Err(TokenError::AlreadyInUse.into());
    }
    let rent = invoke_context.get_sysvar_cache().get_rent()?;
    if !rent.is_exempt(account.get_lamports(), data.len()) {
        return Err(TokenError::NotRentExempt.into());
    }
    Ok(())
}

/// Check that `expected_owner` authorised the instruction through the
/// account at `owner_index`.
///
/// A multisig authority is satisfied by `m` distinct listed signers among the
/// accounts that follow it. Any other authority must sign directly.
fn validate_owner(
    invoke_context: &InvokeContext,
    expected_owner: &Pubkey,
    owner_index: IndexOfAccount,
) -> Result<(), InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    instruction_context.check_number_of_instruction_accounts(owner_index.saturating_add(1))?;

    let owner_key = instruction_context.get_key_of_instruction_account(owner_index)?;
    if owner_key != expected_owner {
        ic_msg!(
            invoke_context,
            "Owner mismatch: expected {}, got {}",
            expected_owner,
            owner_key
        );
        return Err(TokenError::OwnerMismatch.into());
    }

    let multisig = {
        let owner_account = instruction_context.try_borrow_instruction_account(owner_index)?;
        if owner_account.get_owner() == &id() && Multisig::is_of_type(owner_account.get_data()) {
            Some(
                Multisig::unpack(owner_account.get_data())
                    .map_err(|_| InstructionError::InvalidAccountData)?,
            )
        } else {
            None
        }
    };

    match multisig {
        Some(multisig) => {
            let mut signed = Vec::new();
            for index in
                owner_index.saturating_add(1)..instruction_context.get_number_of_instruction_accounts()
            {
                if instruction_context.is_instruction_account_signer(index)? {
                    signed.push(*instruction_context.get_key_of_instruction_account(index)?);
                }
            }
            let count = multisig.count_signers(&signed);
            if count < usize::from(multisig.m) {
                ic_msg!(
                    invoke_context,
                    "Multisig {}: {} of {} required signers present",
                    owner_key,
                    count,
                    multisig.m
                );
                return Err(TokenError::QuorumNotMet.into());
            }
            Ok(())
        }
        None => {
            if !instruction_context.is_instruction_account_signer(owner_index)? {
                ic_msg!(invoke_context, "Authority {} must sign", owner_key);
                return Err(InstructionError::MissingRequiredSignature);
            }
            Ok(())
        }
    }
}

fn key_of(invoke_context: &InvokeContext, index: IndexOfAccount) -> Result<Pubkey, InstructionError> {
    Ok(*invoke_context
        .transaction_context
        .get_current_instruction_context()?
        .get_key_of_instruction_account(index)?)
}

// ---------------------------------------------------------------------------
// Instruction handlers
// ---------------------------------------------------------------------------

/// `InitializeMint { decimals, mint_authority, freeze_authority }`
fn process_initialize_mint(
    invoke_context: &InvokeContext,
    decimals: u8,
    mint_authority: Pubkey,
    freeze_authority: Option<Pubkey>,
) -> Result<(), InstructionError> {
    invoke_context
        .transaction_context
        .get_current_instruction_context()?
        .check_number_of_instruction_accounts(1)?;
    check_initializable::<Mint>(invoke_context, 0, "InitializeMint")?;

    let mint = Mint {
        mint_authority: Some(mint_authority),
        supply: 0,
        decimals,
        freeze_authority,
    };
    save(invoke_context, 0, &mint)?;

    ic_msg!(
        invoke_context,
        "InitializeMint: {} decimals={} authority={}",
        key_of(invoke_context, 0)?,
        decimals,
        mint_authority
    );
    Ok(())
}

/// `InitializeAccount`
fn process_initialize_account(invoke_context: &InvokeContext) -> Result<(), InstructionError> {
    invoke_context
        .transaction_context
        .get_current_instruction_context()?
        .check_number_of_instruction_accounts(3)?;
    check_initializable::<HoldingAccount>(invoke_context, 0, "InitializeAccount")?;

    load::<Mint>(invoke_context, 1).map_err(|_| InstructionError::from(TokenError::InvalidMint))?;
    let account = HoldingAccount {
        mint: key_of(invoke_context, 1)?,
        owner: key_of(invoke_context, 2)?,
        amount: 0,
        state: AccountState::Initialized,
    };
    save(invoke_context, 0, &account)?;

    ic_msg!(
        invoke_context,
        "InitializeAccount: {} owner={} mint={}",
        key_of(invoke_context, 0)?,
        account.owner,
        account.mint
    );
    Ok(())
}

/// `InitializeMultisig { m }`
fn process_initialize_multisig(invoke_context: &InvokeContext, m: u8) -> Result<(), InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    instruction_context.check_number_of_instruction_accounts(1)?;
    check_initializable::<Multisig>(invoke_context, 0, "InitializeMultisig")?;

    let signers = (1..instruction_context.get_number_of_instruction_accounts())
        .map(|index| instruction_context.get_key_of_instruction_account(index).copied())
        .collect::<Result<Vec<_>, _>>()?;
    if !(MIN_SIGNERS..=MAX_SIGNERS).contains(&signers.len()) {
        return Err(TokenError::InvalidNumberOfProvidedSigners.into());
    }
    if m == 0 || usize::from(m) > signers.len() {
        return Err(TokenError::InvalidNumberOfRequiredSigners.into());
    }

    let n = signers.len();
    save(invoke_context, 0, &Multisig { m, signers })?;

    ic_msg!(
        invoke_context,
        "InitializeMultisig: {} {}-of-{}",
        key_of(invoke_context, 0)?,
        m,
        n
    );
    Ok(())
}

/// `Transfer { amount }`
fn process_transfer(invoke_context: &InvokeContext, amount: u64) -> Result<(), InstructionError> {
    invoke_context
        .transaction_context
        .get_current_instruction_context()?
        .check_number_of_instruction_accounts(3)?;

    let mut source = load::<HoldingAccount>(invoke_context, 0)?;
    let mut destination = load::<HoldingAccount>(invoke_context, 1)?;
    if source.is_frozen() || destination.is_frozen() {
        return Err(TokenError::AccountFrozen.into());
    }
    if source.mint != destination.mint {
        return Err(TokenError::MintMismatch.into());
    }
    if source.amount < amount {
        return Err(TokenError::InsufficientFunds.into());
    }
    validate_owner(invoke_context, &source.owner, 2)?;

    if key_of(invoke_context, 0)? == key_of(invoke_context, 1)? {
        return Ok(());
    }
    source.amount -= amount;
    destination.amount = destination
        .amount
        .checked_add(amount)
        .ok_or(TokenError::Overflow)?;
    save(invoke_context, 0, &source)?;
    save(invoke_context, 1, &destination)
}

/// `MintTo { amount }`
fn process_mint_to(invoke_context: &InvokeContext, amount: u64) -> Result<(), InstructionError> {
    invoke_context
        .transaction_context
        .get_current_instruction_context()?
        .check_number_of_instruction_accounts(3)?;

    let mut mint = load::<Mint>(invoke_context, 0)?;
    let mut destination = load::<HoldingAccount>(invoke_context, 1)?;
    if destination.is_frozen() {
        return Err(TokenError::AccountFrozen.into());
    }
    if destination.mint != key_of(invoke_context, 0)? {
        return Err(TokenError::MintMismatch.into());
    }
    let authority = mint.mint_authority.ok_or(TokenError::FixedSupply)?;
    validate_owner(invoke_context, &authority, 2)?;

    destination.amount = destination
        .amount
        .checked_add(amount)
        .ok_or(TokenError::Overflow)?;
    mint.supply = mint.supply.checked_add(amount).ok_or(TokenError::Overflow)?;
    save(invoke_context, 0, &mint)?;
    save(invoke_context, 1, &destination)?;

    debug!("minted {amount} into {}", key_of(invoke_context, 1)?);
    Ok(())
}

/// `Burn { amount }`
fn process_burn(invoke_context: &InvokeContext, amount: u64) -> Result<(), InstructionError> {
    invoke_context
        .transaction_context
        .get_current_instruction_context()?
        .check_number_of_instruction_accounts(3)?;

    let mut account = load::<HoldingAccount>(invoke_context, 0)?;
    let mut mint = load::<Mint>(invoke_context, 1)?;
    if account.is_frozen() {
        return Err(TokenError::AccountFrozen.into());
    }
    if account.mint != key_of(invoke_context, 1)? {
        return Err(TokenError::MintMismatch.into());
    }
    if account.amount < amount {
        return Err(TokenError::InsufficientFunds.into());
    }
    validate_owner(invoke_context, &account.owner, 2)?;

    account.amount -= amount;
    mint.supply = mint.supply.checked_sub(amount).ok_or(TokenError::Overflow)?;
    save(invoke_context, 0, &account)?;
    save(invoke_context, 1, &mint)?;

    debug!("burned {amount} from {}", key_of(invoke_context, 0)?);
    Ok(())
}

/// `SetAuthority { authority_type, new_authority }`
fn process_set_authority(
    invoke_context: &InvokeContext,
    authority_type: AuthorityType,
    new_authority: Option<Pubkey>,
) -> Result<(), InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    instruction_context.check_number_of_instruction_accounts(2)?;

    let (is_mint, is_holding_account) = {
        let account = instruction_context.try_borrow_instruction_account(0)?;
        if account.get_owner() != &id() {
            return Err(TokenError::InvalidAccountOwner.into());
        }
        (
            Mint::is_of_type(account.get_data()),
            HoldingAccount::is_of_type(account.get_data()),
        )
    };

    if is_mint {
        let mut mint = load::<Mint>(invoke_context, 0)?;
        match authority_type {
            AuthorityType::MintTokens => {
                let current = mint.mint_authority.ok_or(TokenError::FixedSupply)?;
                validate_owner(invoke_context, &current, 1)?;
                mint.mint_authority = new_authority;
            }
            AuthorityType::FreezeAccount => {
                let current = mint.freeze_authority.ok_or(TokenError::MintCannotFreeze)?;
                validate_owner(invoke_context, &current, 1)?;
                mint.freeze_authority = new_authority;
            }
            AuthorityType::AccountOwner => {
                return Err(TokenError::AuthorityTypeNotSupported.into());
            }
        }
        save(invoke_context, 0, &mint)?;
    } else if is_holding_account {
        let mut account = load::<HoldingAccount>(invoke_context, 0)?;
        match authority_type {
            AuthorityType::AccountOwner => {
                validate_owner(invoke_context, &account.owner, 1)?;
                account.owner = new_authority.ok_or(InstructionError::InvalidArgument)?;
            }
            AuthorityType::MintTokens | AuthorityType::FreezeAccount => {
                return Err(TokenError::AuthorityTypeNotSupported.into());
            }
        }
        save(invoke_context, 0, &account)?;
    } else {
        return Err(TokenError::UninitializedState.into());
    }

    ic_msg!(
        invoke_context,
        "SetAuthority: {:?} of {} -> {:?}",
        authority_type,
        key_of(invoke_context, 0)?,
        new_authority
    );
    Ok(())
}

/// `FreezeAccount` / `ThawAccount`
fn process_toggle_freeze(invoke_context: &InvokeContext, freeze: bool) -> Result<(), InstructionError> {
    invoke_context
        .transaction_context
        .get_current_instruction_context()?
        .check_number_of_instruction_accounts(3)?;

    let mut account = load::<HoldingAccount>(invoke_context, 0)?;
    let mint = load::<Mint>(invoke_context, 1)?;
    if account.mint != key_of(invoke_context, 1)? {
        return Err(TokenError::MintMismatch.into());
    }
    if freeze == account.is_frozen() {
        return Err(TokenError::InvalidState.into());
    }
    let authority = mint.freeze_authority.ok_or(TokenError::MintCannotFreeze)?;
    validate_owner(invoke_context, &authority, 2)?;

    account.state = if freeze {
        AccountState::Frozen
    } else {
        AccountState::Initialized
    };
    save(invoke_context, 0, &account)
}
