mod api_key;
pub mod crypto;
pub mod ledger;

pub use api_key::{
    ApiKey,
    MAX_KEYS_PER_USER,
    DEFAULT_CREDITS_LIMIT,
    create_api_key,
    create_api_key_from_secret,
    get_api_key_by_id,
    get_active_api_key_by_hash,
    list_active_api_keys_by_user,
    count_api_keys_by_user,
    toggle_api_key_active,
    charge_api_key,
    reset_api_key_credits,
};

pub use ledger::{
    ChargeOutcome,
    LedgerError,
    authorize,
    charge,
    authorize_and_charge,
};
