//! Mint, holding-account and multisig helpers.

use {
    crate::{
        context::Context,
        error::{ClientError, Result},
        ledger::Ledger,
    },
    log::*,
    solana_keypair::Keypair,
    solana_pubkey::Pubkey,
    solana_signer::Signer,
    solana_system_interface::instruction as system_instruction,
    swapgate_associated_account_program::{
        get_associated_account_address, instruction::create_associated_account_idempotent,
    },
    swapgate_token_program::{
        error::TokenError,
        instruction::{self as token_instruction, AuthorityType},
        state::{HoldingAccount, Mint, Multisig, TokenState, MAX_SIGNERS, MIN_SIGNERS},
    },
};

/// Token-program state of type `T` at `address`.
pub fn get_token_state<T: TokenState, L: Ledger>(context: &Context<L>, address: &Pubkey) -> Result<T> {
    let account = context.get_account(address)?;
    if !swapgate_token_program::check_id(&account.owner) {
        return Err(ClientError::InvalidAccountData(*address));
    }
    T::unpack(&account.data).map_err(|_| ClientError::InvalidAccountData(*address))
}

/// Allocate a token-program account of `T`'s size and run `init` on it.
fn create_token_account<T: TokenState, L: Ledger>(
    context: &Context<L>,
    payer: &Keypair,
    init: impl FnOnce(&Pubkey) -> solana_instruction::Instruction,
) -> Result<Pubkey> {
    let account = Keypair::new();
    let lamports = context
        .ledger
        .get_minimum_balance_for_rent_exemption(T::LEN)?;
    let create = system_instruction::create_account(
        &payer.pubkey(),
        &account.pubkey(),
        lamports,
        T::LEN as u64,
        &swapgate_token_program::id(),
    );
    context.send(&[create, init(&account.pubkey())], payer, &[&account])?;
    Ok(account.pubkey())
}

/// Create a mint with `decimals`, or the configured default.
pub fn create_mint<L: Ledger>(
    context: &Context<L>,
    payer: &Keypair,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
    decimals: Option<u8>,
) -> Result<Pubkey> {
    let decimals = decimals.unwrap_or(context.config.default_decimals);
    let mint = create_token_account::<Mint, L>(context, payer, |mint| {
        token_instruction::initialize_mint(mint, mint_authority, freeze_authority, decimals)
    })?;
    info!("mint {mint} created, {decimals} decimals, authority {mint_authority}");
    Ok(mint)
}

/// Create an M-of-N signer set for use as a mint or freeze authority.
pub fn create_multisig<L: Ledger>(
    context: &Context<L>,
    payer: &Keypair,
    signers: &[Pubkey],
    required: u8,
) -> Result<Pubkey> {
    if !(MIN_SIGNERS..=MAX_SIGNERS).contains(&signers.len()) {
        return Err(TokenError::InvalidNumberOfProvidedSigners.into());
    }
    if required == 0 || usize::from(required) > signers.len() {
        return Err(TokenError::InvalidNumberOfRequiredSigners.into());
    }
    let signer_refs: Vec<&Pubkey> = signers.iter().collect();
    let multisig = create_token_account::<Multisig, L>(context, payer, |multisig| {
        token_instruction::initialize_multisig(multisig, &signer_refs, required)
    })?;
    info!("multisig {multisig} created, {required} of {}", signers.len());
    Ok(multisig)
}

/// Replace (or with `None`, remove) a mint's mint authority.
pub fn set_mint_authority<L: Ledger>(
    context: &Context<L>,
    payer: &Keypair,
    mint: &Pubkey,
    current_authority: &Keypair,
    new_authority: Option<&Pubkey>,
) -> Result<()> {
    let instruction = token_instruction::set_authority(
        mint,
        new_authority,
        AuthorityType::MintTokens,
        &current_authority.pubkey(),
        &[],
    );
    context.send(&[instruction], payer, &[current_authority])?;
    info!("mint {mint} authority set to {new_authority:?}");
    Ok(())
}

pub fn get_mint_info<L: Ledger>(context: &Context<L>, mint: &Pubkey) -> Result<Mint> {
    get_token_state(context, mint)
}

/// The owner's associated holding account for `mint`, created if missing.
pub fn get_or_create_holding_account<L: Ledger>(
    context: &Context<L>,
    payer: &Keypair,
    mint: &Pubkey,
    owner: &Pubkey,
) -> Result<Pubkey> {
    let address = get_associated_account_address(owner, mint);
    if context.find_account(&address)?.is_none() {
        let instruction = create_associated_account_idempotent(&payer.pubkey(), owner, mint);
        context.send(&[instruction], payer, &[])?;
        debug!("holding account {address} created for {owner}");
    }
    Ok(address)
}

/// Balance of the owner's associated holding account, zero if it does not
/// exist.
pub fn holding_balance<L: Ledger>(context: &Context<L>, owner: &Pubkey, mint: &Pubkey) -> Result<u64> {
    let address = get_associated_account_address(owner, mint);
    if context.find_account(&address)?.is_none() {
        return Ok(0);
    }
    Ok(get_token_state::<HoldingAccount, L>(context, &address)?.amount)
}

/// Mint `amount` into `destination` under a single-key mint authority.
pub fn mint_to<L: Ledger>(
    context: &Context<L>,
    payer: &Keypair,
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Keypair,
    amount: u64,
) -> Result<()> {
    let instruction =
        token_instruction::mint_to(mint, destination, &authority.pubkey(), &[], amount);
    context.send(&[instruction], payer, &[authority])?;
    Ok(())
}

/// Parse a decimal string such as `"0.01"` into base units of a mint with
/// `decimals` decimals.
pub fn ui_amount_to_base_units(amount: &str, decimals: u8) -> Result<u64> {
    let invalid = || ClientError::InvalidAmount {
        amount: amount.to_string(),
        decimals,
    };
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    let is_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty())
        || !is_digits(whole)
        || !is_digits(fraction)
        || fraction.len() > usize::from(decimals)
    {
        return Err(invalid());
    }

    let scale = 10u64.checked_pow(u32::from(decimals)).ok_or_else(invalid)?;
    let whole = if whole.is_empty() {
        0
    } else {
        whole.parse::<u64>().map_err(|_| invalid())?
    };
    let fraction_units = if fraction.is_empty() {
        0
    } else {
        let padding = u32::from(decimals)
            .checked_sub(fraction.len() as u32)
            .ok_or_else(invalid)?;
        fraction
            .parse::<u64>()
            .ok()
            .and_then(|digits| digits.checked_mul(10u64.checked_pow(padding)?))
            .ok_or_else(invalid)?
    };
    whole
        .checked_mul(scale)
        .and_then(|units| units.checked_add(fraction_units))
        .ok_or_else(invalid)
}
