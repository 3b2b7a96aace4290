#![no_std]

use soroban_sdk::{
    contract, contractimpl, log, token, xdr::ToXdr, Address, BytesN, Env, Vec,
};

mod events;
mod interfaces;
pub mod pricing;
mod storage;
pub mod types;

use interfaces::{OracleRouterClient, StakingLedgerClient, SubsidyPoolClient};
use types::{
    Config, InsuranceError, Policy, PolicyStatus, PolicyTier, SolvencyReport, TierConfig,
    TierPricing,
};

//
// ──────────────────────────────────────────────────────────
// CONSTANTS
// ──────────────────────────────────────────────────────────
//

const SECONDS_PER_HOUR: u64 = 3_600;
const DEFAULT_EXPIRY_WINDOW: u64 = 48 * SECONDS_PER_HOUR;
const MIN_EXPIRY_WINDOW: u64 = SECONDS_PER_HOUR;
const MAX_EXPIRY_WINDOW: u64 = 14 * 24 * SECONDS_PER_HOUR;

const MIN_MULTIPLIER: u32 = 100;
const MAX_MULTIPLIER: u32 = 500;
const MIN_THRESHOLD_MINUTES: u64 = 30;
const MAX_THRESHOLD_MINUTES: u64 = 24 * 60;
const MAX_BPS: u32 = 10_000;

const UNIT: i128 = 10_000_000; // 7 decimals

const ALL_TIERS: [PolicyTier; 4] = [
    PolicyTier::Basic,
    PolicyTier::Silver,
    PolicyTier::Gold,
    PolicyTier::Platinum,
];

//
// ──────────────────────────────────────────────────────────
// CONTRACT
// ──────────────────────────────────────────────────────────
//

#[contract]
pub struct FlightInsuranceContract;

#[contractimpl]
impl FlightInsuranceContract {
    // ───────────── INITIALIZATION ─────────────

    /// Initialize the policy ledger
    ///
    /// # Arguments
    /// * `admin` - Contract administrator
    /// * `payout_token` - Token used for premiums and payouts
    /// * `oracle_router` - Router trusted to deliver verification results
    pub fn initialize(
        env: Env,
        admin: Address,
        payout_token: Address,
        oracle_router: Address,
    ) -> Result<(), InsuranceError> {
        admin.require_auth();

        if storage::has_config(&env) {
            return Err(InsuranceError::AlreadyInitialized);
        }

        let config = Config {
            admin,
            payout_token,
            oracle_router,
            staking_ledger: None,
            subsidy_pool: None,
            expiry_window: DEFAULT_EXPIRY_WINDOW,
            paused: false,
        };
        storage::set_config(&env, &config);

        for tier in ALL_TIERS.iter() {
            storage::set_tier_config(&env, *tier, &Self::default_tier_config(*tier));
        }

        storage::set_pool_balance(&env, 0);
        storage::set_outstanding_liability(&env, 0);
        storage::set_active_policies(&env, 0);
        storage::extend_instance_ttl(&env);

        Ok(())
    }

    // ───────────── POLICY PURCHASE ─────────────

    /// Buy a delay policy for one flight
    ///
    /// # Arguments
    /// * `holder` - Policy holder, pays the premium
    /// * `tier` - Coverage tier
    /// * `flight_hash` - Fingerprint of flight number and date
    /// * `departure_time` - Scheduled departure (unix seconds)
    ///
    /// # Returns
    /// * Policy ID
    pub fn purchase_policy(
        env: Env,
        holder: Address,
        tier: PolicyTier,
        flight_hash: BytesN<32>,
        departure_time: u64,
    ) -> Result<u64, InsuranceError> {
        holder.require_auth();

        let config = Self::active_config(&env)?;
        let (tier_config, premium, expiry) =
            Self::prepare_purchase(&env, &config, &holder, tier, &flight_hash, departure_time)?;

        if premium > 0 {
            let token_client = token::Client::new(&env, &config.payout_token);
            token_client.transfer(&holder, &env.current_contract_address(), &premium);
        }

        let policy = Self::issue_policy(
            &env,
            holder,
            tier,
            flight_hash,
            departure_time,
            expiry,
            &tier_config,
            premium,
            false,
        );

        Ok(policy.id)
    }

    /// Issue a zero-premium policy to a staker with free-claim entitlement.
    ///
    /// The premium is funded by the subsidy pool. `SubsidyUnavailable` means
    /// the pool is short and the caller should fall back to `purchase_policy`.
    pub fn purchase_subsidized_policy(
        env: Env,
        holder: Address,
        tier: PolicyTier,
        flight_hash: BytesN<32>,
        departure_time: u64,
    ) -> Result<u64, InsuranceError> {
        holder.require_auth();

        let config = Self::active_config(&env)?;
        let staking_ledger = config
            .staking_ledger
            .clone()
            .ok_or(InsuranceError::SubsidyNotConfigured)?;
        let subsidy_pool = config
            .subsidy_pool
            .clone()
            .ok_or(InsuranceError::SubsidyNotConfigured)?;

        let (tier_config, premium, expiry) =
            Self::prepare_purchase(&env, &config, &holder, tier, &flight_hash, departure_time)?;

        let staking = StakingLedgerClient::new(&env, &staking_ledger);
        if !staking.has_free_claim(&holder) {
            return Err(InsuranceError::NoFreeClaim);
        }

        let pool = SubsidyPoolClient::new(&env, &subsidy_pool);
        if !pool.fund_policy(&holder, &premium) {
            log!(&env, "subsidy pool could not fund premium", premium);
            return Err(InsuranceError::SubsidyUnavailable);
        }

        staking.register_insurance_claim(&holder);

        let policy = Self::issue_policy(
            &env,
            holder,
            tier,
            flight_hash,
            departure_time,
            expiry,
            &tier_config,
            premium,
            true,
        );

        Ok(policy.id)
    }

    // ───────────── VERIFICATION & SETTLEMENT ─────────────

    /// Ask the oracle to verify the flight's delay.
    ///
    /// Allowed for the holder of an active policy between departure and
    /// expiry. May be repeated while the policy stays active.
    pub fn request_verification(
        env: Env,
        holder: Address,
        policy_id: u64,
    ) -> Result<BytesN<32>, InsuranceError> {
        holder.require_auth();

        let config = storage::get_config(&env)?;
        let mut policy =
            storage::get_policy(&env, policy_id).ok_or(InsuranceError::PolicyNotFound)?;

        if policy.holder != holder {
            return Err(InsuranceError::NotHolder);
        }
        if policy.status != PolicyStatus::Active {
            return Err(InsuranceError::PolicyNotActive);
        }

        let now = env.ledger().timestamp();
        if now < policy.departure_time {
            return Err(InsuranceError::TooEarly);
        }
        if now > policy.expiry {
            return Err(InsuranceError::WindowExpired);
        }

        let payload = (policy.flight_hash.clone(), policy.departure_time).to_xdr(&env);
        let router = OracleRouterClient::new(&env, &config.oracle_router);
        let request_id = router.send_request(&policy_id, &payload);

        policy.last_request_id = Some(request_id.clone());
        storage::set_policy(&env, &policy);
        storage::extend_instance_ttl(&env);

        events::verification_requested(&env, policy_id, &request_id);
        Ok(request_id)
    }

    /// Oracle result delivered by the router.
    ///
    /// Late, duplicate and unknown deliveries are ignored and return
    /// `Ok(false)`. Returns `Ok(true)` only when the policy was paid out.
    pub fn on_verification(
        env: Env,
        policy_id: u64,
        delay_occurred: bool,
        delay_minutes: u64,
    ) -> Result<bool, InsuranceError> {
        let config = storage::get_config(&env)?;
        config.oracle_router.require_auth();

        let mut policy = match storage::get_policy(&env, policy_id) {
            Some(policy) => policy,
            None => {
                log!(&env, "verification for unknown policy ignored", policy_id);
                return Ok(false);
            }
        };

        if policy.status != PolicyStatus::Active {
            log!(&env, "verification for settled policy ignored", policy_id);
            return Ok(false);
        }

        if env.ledger().timestamp() > policy.expiry {
            log!(&env, "verification after expiry ignored", policy_id);
            return Ok(false);
        }

        policy.reported_delay_minutes = delay_minutes;

        if !delay_occurred || delay_minutes < policy.threshold_minutes {
            storage::set_policy(&env, &policy);
            return Ok(false);
        }

        policy.status = PolicyStatus::Claimable;
        Self::pay_out(&env, &config, policy)?;

        Ok(true)
    }

    /// Lapse an active policy whose window has passed. Anyone may call.
    ///
    /// Returns true only when this call performed the transition.
    pub fn expire_policy(env: Env, policy_id: u64) -> bool {
        let mut policy = match storage::get_policy(&env, policy_id) {
            Some(policy) => policy,
            None => return false,
        };

        let now = env.ledger().timestamp();
        if policy.status != PolicyStatus::Active || now <= policy.expiry {
            return false;
        }

        policy.status = PolicyStatus::Expired;
        policy.settled_at = now;
        storage::set_policy(&env, &policy);
        Self::release(&env, &policy);
        storage::extend_instance_ttl(&env);

        events::policy_expired(&env, policy_id);
        true
    }

    /// Sweep several policies at once. Returns how many were expired.
    pub fn expire_policies(env: Env, policy_ids: Vec<u64>) -> u32 {
        let mut expired = 0u32;
        for policy_id in policy_ids.iter() {
            if Self::expire_policy(env.clone(), policy_id) {
                expired += 1;
            }
        }
        expired
    }

    // ───────────── POOL MANAGEMENT ─────────────

    /// Add payout liquidity (admin only)
    pub fn fund_pool(env: Env, admin: Address, amount: i128) -> Result<(), InsuranceError> {
        let config = Self::require_admin(&env, &admin)?;

        if amount <= 0 {
            return Err(InsuranceError::InvalidAmount);
        }

        let token_client = token::Client::new(&env, &config.payout_token);
        token_client.transfer(&admin, &env.current_contract_address(), &amount);

        let balance = storage::get_pool_balance(&env) + amount;
        storage::set_pool_balance(&env, balance);
        storage::extend_instance_ttl(&env);

        events::pool_changed(&env, &admin, amount, balance);
        Ok(())
    }

    /// Withdraw payout liquidity (admin only)
    pub fn withdraw_from_pool(
        env: Env,
        admin: Address,
        amount: i128,
    ) -> Result<(), InsuranceError> {
        let config = Self::require_admin(&env, &admin)?;

        if amount <= 0 {
            return Err(InsuranceError::InvalidAmount);
        }

        let pool = storage::get_pool_balance(&env);
        if pool < amount {
            return Err(InsuranceError::InsufficientPoolFunds);
        }

        storage::set_pool_balance(&env, pool - amount);

        let token_client = token::Client::new(&env, &config.payout_token);
        token_client.transfer(&env.current_contract_address(), &admin, &amount);

        events::pool_changed(&env, &admin, -amount, pool - amount);
        Ok(())
    }

    // ───────────── ADMIN FUNCTIONS ─────────────

    /// Replace a tier's pricing template (admin only). Issued policies keep
    /// the values they were bought with.
    pub fn set_tier_config(
        env: Env,
        admin: Address,
        tier: PolicyTier,
        tier_config: TierConfig,
    ) -> Result<(), InsuranceError> {
        Self::require_admin(&env, &admin)?;
        Self::validate_tier_config(&tier_config)?;

        storage::set_tier_config(&env, tier, &tier_config);
        storage::extend_instance_ttl(&env);

        events::tier_updated(&env, tier, tier_config.active);
        Ok(())
    }

    pub fn set_tier_active(
        env: Env,
        admin: Address,
        tier: PolicyTier,
        active: bool,
    ) -> Result<(), InsuranceError> {
        Self::require_admin(&env, &admin)?;

        let mut tier_config =
            storage::get_tier_config(&env, tier).ok_or(InsuranceError::NotInitialized)?;
        tier_config.active = active;
        storage::set_tier_config(&env, tier, &tier_config);

        events::tier_updated(&env, tier, active);
        Ok(())
    }

    /// Window after departure during which a policy can settle (1h..=14d)
    pub fn set_expiry_window(env: Env, admin: Address, seconds: u64) -> Result<(), InsuranceError> {
        let mut config = Self::require_admin(&env, &admin)?;

        if !(MIN_EXPIRY_WINDOW..=MAX_EXPIRY_WINDOW).contains(&seconds) {
            return Err(InsuranceError::InvalidParameter);
        }

        config.expiry_window = seconds;
        storage::set_config(&env, &config);
        Ok(())
    }

    /// Wire the staking ledger used for free-claim checks. Can be set once.
    pub fn set_staking_ledger(
        env: Env,
        admin: Address,
        staking_ledger: Address,
    ) -> Result<(), InsuranceError> {
        let mut config = Self::require_admin(&env, &admin)?;

        if config.staking_ledger.is_some() {
            return Err(InsuranceError::AlreadyConfigured);
        }

        config.staking_ledger = Some(staking_ledger);
        storage::set_config(&env, &config);
        Ok(())
    }

    /// Wire the subsidy pool that funds free policies. Can be set once.
    pub fn set_subsidy_pool(
        env: Env,
        admin: Address,
        subsidy_pool: Address,
    ) -> Result<(), InsuranceError> {
        let mut config = Self::require_admin(&env, &admin)?;

        if config.subsidy_pool.is_some() {
            return Err(InsuranceError::AlreadyConfigured);
        }

        config.subsidy_pool = Some(subsidy_pool);
        storage::set_config(&env, &config);
        Ok(())
    }

    /// Pause/unpause new purchases (admin only)
    pub fn set_paused(env: Env, admin: Address, paused: bool) -> Result<(), InsuranceError> {
        let mut config = Self::require_admin(&env, &admin)?;
        config.paused = paused;
        storage::set_config(&env, &config);
        Ok(())
    }

    pub fn transfer_admin(
        env: Env,
        admin: Address,
        new_admin: Address,
    ) -> Result<(), InsuranceError> {
        let mut config = Self::require_admin(&env, &admin)?;
        new_admin.require_auth();
        config.admin = new_admin;
        storage::set_config(&env, &config);
        Ok(())
    }

    // ───────────── VIEW FUNCTIONS ─────────────

    pub fn get_policy(env: Env, policy_id: u64) -> Option<Policy> {
        storage::get_policy(&env, policy_id)
    }

    /// Active policy for a holder and flight, if any
    pub fn get_active_policy(env: Env, holder: Address, flight_hash: BytesN<32>) -> Option<Policy> {
        storage::get_active_index(&env, &holder, &flight_hash)
            .and_then(|policy_id| storage::get_policy(&env, policy_id))
    }

    pub fn get_user_policies(env: Env, user: Address) -> Vec<u64> {
        storage::get_user_policies(&env, &user)
    }

    pub fn get_user_policy_count(env: Env, user: Address) -> u32 {
        storage::get_user_policies(&env, &user).len()
    }

    pub fn get_total_policies(env: Env) -> u64 {
        storage::get_policy_count(&env)
    }

    pub fn get_tier_config(env: Env, tier: PolicyTier) -> Option<TierConfig> {
        storage::get_tier_config(&env, tier)
    }

    /// Tier template together with the premium it currently quotes
    pub fn get_tier_pricing(env: Env, tier: PolicyTier) -> Result<TierPricing, InsuranceError> {
        let tier_config =
            storage::get_tier_config(&env, tier).ok_or(InsuranceError::NotInitialized)?;
        let premium = pricing::tier_premium(&tier_config)?;

        Ok(TierPricing {
            tier,
            payout: tier_config.payout,
            premium,
            threshold_minutes: tier_config.threshold_minutes,
            probability_bps: tier_config.probability_bps,
            margin_bps: tier_config.margin_bps,
            premium_multiplier: tier_config.premium_multiplier,
            active: tier_config.active,
        })
    }

    /// Stand-alone premium quote
    pub fn quote_premium(
        _env: Env,
        payout: i128,
        probability_bps: u32,
        margin_bps: u32,
    ) -> Result<i128, InsuranceError> {
        pricing::quote(payout, probability_bps, margin_bps)
    }

    pub fn get_config(env: Env) -> Result<Config, InsuranceError> {
        storage::get_config(&env)
    }

    pub fn get_pool_balance(env: Env) -> i128 {
        storage::get_pool_balance(&env)
    }

    /// Outstanding payout obligations against available funds
    pub fn get_solvency(env: Env) -> SolvencyReport {
        SolvencyReport {
            available_balance: storage::get_pool_balance(&env),
            outstanding_liability: storage::get_outstanding_liability(&env),
            active_policies: storage::get_active_policies(&env),
        }
    }

    // ───────────── INTERNAL HELPERS ─────────────

    fn default_tier_config(tier: PolicyTier) -> TierConfig {
        let (payout, threshold_minutes, probability_bps, margin_bps) = match tier {
            PolicyTier::Basic => (100 * UNIT, 240, 3_200, 500),
            PolicyTier::Silver => (250 * UNIT, 180, 3_400, 2_000),
            PolicyTier::Gold => (500 * UNIT, 120, 3_500, 500),
            PolicyTier::Platinum => (1_000 * UNIT, 60, 3_600, 2_000),
        };

        TierConfig {
            payout,
            premium_multiplier: MIN_MULTIPLIER,
            threshold_minutes,
            probability_bps,
            margin_bps,
            active: true,
        }
    }

    fn validate_tier_config(tier_config: &TierConfig) -> Result<(), InsuranceError> {
        if tier_config.payout <= 0 {
            return Err(InsuranceError::InvalidParameter);
        }
        if !(MIN_MULTIPLIER..=MAX_MULTIPLIER).contains(&tier_config.premium_multiplier) {
            return Err(InsuranceError::InvalidParameter);
        }
        if !(MIN_THRESHOLD_MINUTES..=MAX_THRESHOLD_MINUTES)
            .contains(&tier_config.threshold_minutes)
        {
            return Err(InsuranceError::InvalidParameter);
        }
        if !(1..=MAX_BPS).contains(&tier_config.probability_bps)
            || !(1..=MAX_BPS).contains(&tier_config.margin_bps)
        {
            return Err(InsuranceError::InvalidParameter);
        }
        // Reject templates whose premium cannot be computed.
        pricing::tier_premium(tier_config)?;
        Ok(())
    }

    /// Validation shared by paid and subsidized purchases.
    /// Returns the tier snapshot, the premium and the policy expiry.
    fn prepare_purchase(
        env: &Env,
        config: &Config,
        holder: &Address,
        tier: PolicyTier,
        flight_hash: &BytesN<32>,
        departure_time: u64,
    ) -> Result<(TierConfig, i128, u64), InsuranceError> {
        let tier_config = storage::get_tier_config(env, tier).ok_or(InsuranceError::TierInactive)?;
        if !tier_config.active {
            return Err(InsuranceError::TierInactive);
        }

        let expiry = departure_time
            .checked_add(config.expiry_window)
            .ok_or(InsuranceError::InvalidTimeWindow)?;
        if expiry <= env.ledger().timestamp() {
            return Err(InsuranceError::InvalidTimeWindow);
        }

        if storage::get_active_index(env, holder, flight_hash).is_some() {
            return Err(InsuranceError::DuplicateActivePolicy);
        }

        let premium = pricing::tier_premium(&tier_config)?;
        Ok((tier_config, premium, expiry))
    }

    #[allow(clippy::too_many_arguments)]
    fn issue_policy(
        env: &Env,
        holder: Address,
        tier: PolicyTier,
        flight_hash: BytesN<32>,
        departure_time: u64,
        expiry: u64,
        tier_config: &TierConfig,
        premium: i128,
        subsidized: bool,
    ) -> Policy {
        let policy_id = storage::next_policy_id(env);

        let policy = Policy {
            id: policy_id,
            holder: holder.clone(),
            flight_hash: flight_hash.clone(),
            tier,
            departure_time,
            expiry,
            threshold_minutes: tier_config.threshold_minutes,
            premium,
            payout: tier_config.payout,
            status: PolicyStatus::Active,
            subsidized,
            purchased_at: env.ledger().timestamp(),
            settled_at: 0,
            last_request_id: None,
            reported_delay_minutes: 0,
        };

        storage::set_policy(env, &policy);
        storage::set_active_index(env, &holder, &flight_hash, policy_id);
        storage::add_user_policy(env, &holder, policy_id);

        storage::set_pool_balance(env, storage::get_pool_balance(env) + premium);
        storage::set_outstanding_liability(
            env,
            storage::get_outstanding_liability(env) + policy.payout,
        );
        storage::set_active_policies(env, storage::get_active_policies(env) + 1);
        storage::extend_instance_ttl(env);

        events::policy_bought(env, &policy);
        policy
    }

    /// Claimable -> PaidOut together with the payout transfer.
    fn pay_out(env: &Env, config: &Config, mut policy: Policy) -> Result<(), InsuranceError> {
        let pool = storage::get_pool_balance(env);
        if pool < policy.payout {
            log!(env, "pool cannot cover payout", policy.id, policy.payout, pool);
            return Err(InsuranceError::InsufficientPoolFunds);
        }

        policy.status = PolicyStatus::PaidOut;
        policy.settled_at = env.ledger().timestamp();
        storage::set_policy(env, &policy);
        Self::release(env, &policy);
        storage::set_pool_balance(env, pool - policy.payout);
        storage::extend_instance_ttl(env);

        let token_client = token::Client::new(env, &config.payout_token);
        token_client.transfer(&env.current_contract_address(), &policy.holder, &policy.payout);

        events::policy_paid(env, &policy);
        Ok(())
    }

    /// Drop a terminal policy from the uniqueness index and liability totals.
    fn release(env: &Env, policy: &Policy) {
        storage::remove_active_index(env, &policy.holder, &policy.flight_hash);
        storage::set_outstanding_liability(
            env,
            storage::get_outstanding_liability(env) - policy.payout,
        );
        let active = storage::get_active_policies(env);
        storage::set_active_policies(env, active.saturating_sub(1));
    }

    fn active_config(env: &Env) -> Result<Config, InsuranceError> {
        let config = storage::get_config(env)?;
        if config.paused {
            return Err(InsuranceError::Paused);
        }
        Ok(config)
    }

    fn require_admin(env: &Env, admin: &Address) -> Result<Config, InsuranceError> {
        admin.require_auth();
        let config = storage::get_config(env)?;
        if config.admin != *admin {
            return Err(InsuranceError::Unauthorized);
        }
        Ok(config)
    }
}
