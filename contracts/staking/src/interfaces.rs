use soroban_sdk::{contractclient, Address, Env};

/// Where the deployed share of every stake earns yield.
#[contractclient(name = "YieldVenueClient")]
pub trait YieldVenue {
    /// Tokens must already sit in the venue's account.
    fn deposit(env: Env, amount: i128);
    fn withdraw(env: Env, amount: i128, recipient: Address) -> i128;
    fn current_balance(env: Env) -> i128;
    /// Balance above deposited principal.
    fn accrued_interest(env: Env) -> i128;
    /// Annual supply rate in basis points.
    fn current_rate(env: Env) -> u32;
}

#[contractclient(name = "TierBadgeClient")]
pub trait TierBadge {
    fn issue(env: Env, owner: Address, tier: u32) -> u32;
}

#[contractclient(name = "SubsidySinkClient")]
pub trait SubsidySink {
    fn deposit_skim(env: Env, amount: i128);
}
