#![no_std]
use soroban_sdk::{
    contract, contractclient, contractimpl, log, symbol_short, xdr::ToXdr, Address, Bytes,
    BytesN, Env,
};

mod codec;
mod storage;
mod types;

use storage::Storage;
pub use types::{Config, RequestEntry, RouterError, RoutingParams};

/// Contract that receives verification results.
#[contractclient(name = "VerificationConsumerClient")]
pub trait VerificationConsumer {
    fn on_verification(env: Env, policy_id: u64, delay_occurred: bool, delay_minutes: u64)
        -> bool;
}

#[contract]
pub struct OracleRouterContract;

#[contractimpl]
impl OracleRouterContract {
    pub fn initialize(
        env: Env,
        admin: Address,
        consumer: Address,
        relay_key: BytesN<32>,
        routing: RoutingParams,
    ) -> Result<(), RouterError> {
        if Storage::has_config(&env) {
            return Err(RouterError::AlreadyInitialized);
        }
        admin.require_auth();
        validate_routing(&routing)?;

        let config = Config {
            admin,
            consumer,
            relay_key,
            routing,
            paused: false,
        };
        Storage::set_config(&env, &config);
        Storage::bump(&env);

        Ok(())
    }

    /// Record an outbound verification request and hand it to the relay.
    /// Only the configured consumer may call this.
    pub fn send_request(
        env: Env,
        policy_id: u64,
        payload: Bytes,
    ) -> Result<BytesN<32>, RouterError> {
        let config = Storage::get_config(&env)?;
        config.consumer.require_auth();

        if config.paused {
            return Err(RouterError::Paused);
        }

        let nonce = Storage::next_nonce(&env);
        let now = env.ledger().timestamp();
        let seed = (env.current_contract_address(), nonce, policy_id, now).to_xdr(&env);
        let request_id: BytesN<32> = env.crypto().sha256(&seed).into();

        Storage::set_request(
            &env,
            &RequestEntry {
                request_id: request_id.clone(),
                policy_id,
                sent_at: now,
                fulfilled: false,
                fulfilled_at: 0,
            },
        );
        Storage::bump(&env);

        env.events().publish(
            (symbol_short!("oracle"), symbol_short!("request")),
            (request_id.clone(), policy_id, payload, config.routing),
        );
        log!(&env, "oracle request for policy", policy_id);

        Ok(request_id)
    }

    /// Deliver the oracle's answer for `request_id`.
    ///
    /// The relay signs `(request_id, response, error, router address)` with
    /// its ed25519 key; a bad signature aborts. Unknown or already fulfilled
    /// requests return `false` without touching state.
    pub fn fulfill(
        env: Env,
        request_id: BytesN<32>,
        response: Bytes,
        error: Bytes,
        signature: BytesN<64>,
    ) -> Result<bool, RouterError> {
        let config = Storage::get_config(&env)?;
        if config.paused {
            return Err(RouterError::Paused);
        }

        let signed = (
            request_id.clone(),
            response.clone(),
            error.clone(),
            env.current_contract_address(),
        )
            .to_xdr(&env);
        env.crypto()
            .ed25519_verify(&config.relay_key, &signed, &signature);

        let mut entry = match Storage::get_request(&env, &request_id) {
            Some(entry) if !entry.fulfilled => entry,
            _ => return Ok(false),
        };

        entry.fulfilled = true;
        entry.fulfilled_at = env.ledger().timestamp();
        Storage::set_request(&env, &entry);

        let report = codec::report_for(&response, &error);

        VerificationConsumerClient::new(&env, &config.consumer).on_verification(
            &entry.policy_id,
            &report.delay_occurred,
            &report.delay_minutes,
        );

        env.events().publish(
            (symbol_short!("oracle"), symbol_short!("fulfill")),
            (
                request_id,
                entry.policy_id,
                report.delay_occurred,
                report.delay_minutes,
            ),
        );

        Ok(true)
    }

    pub fn prune_request(env: Env, request_id: BytesN<32>) -> Result<(), RouterError> {
        let entry = Storage::get_request(&env, &request_id).ok_or(RouterError::NotFound)?;
        if !entry.fulfilled {
            return Err(RouterError::RequestPending);
        }
        Storage::remove_request(&env, &request_id);
        Ok(())
    }

    // Admin functions

    pub fn set_routing(env: Env, admin: Address, routing: RoutingParams) -> Result<(), RouterError> {
        let mut config = Self::check_admin(&env, &admin)?;
        validate_routing(&routing)?;
        config.routing = routing;
        Storage::set_config(&env, &config);
        Ok(())
    }

    pub fn set_relay_key(env: Env, admin: Address, relay_key: BytesN<32>) -> Result<(), RouterError> {
        let mut config = Self::check_admin(&env, &admin)?;
        config.relay_key = relay_key;
        Storage::set_config(&env, &config);
        Ok(())
    }

    pub fn set_consumer(env: Env, admin: Address, consumer: Address) -> Result<(), RouterError> {
        let mut config = Self::check_admin(&env, &admin)?;
        config.consumer = consumer;
        Storage::set_config(&env, &config);
        Ok(())
    }

    pub fn pause(env: Env, admin: Address) -> Result<(), RouterError> {
        let mut config = Self::check_admin(&env, &admin)?;
        config.paused = true;
        Storage::set_config(&env, &config);
        Ok(())
    }

    pub fn unpause(env: Env, admin: Address) -> Result<(), RouterError> {
        let mut config = Self::check_admin(&env, &admin)?;
        config.paused = false;
        Storage::set_config(&env, &config);
        Ok(())
    }

    // Queries

    pub fn get_request(env: Env, request_id: BytesN<32>) -> Option<RequestEntry> {
        Storage::get_request(&env, &request_id)
    }

    pub fn get_config(env: Env) -> Result<Config, RouterError> {
        Storage::get_config(&env)
    }

    pub fn get_request_count(env: Env) -> u64 {
        Storage::request_count(&env)
    }

    fn check_admin(env: &Env, admin: &Address) -> Result<Config, RouterError> {
        admin.require_auth();
        let config = Storage::get_config(env)?;
        if config.admin != *admin {
            return Err(RouterError::Unauthorized);
        }
        Ok(config)
    }
}

fn validate_routing(routing: &RoutingParams) -> Result<(), RouterError> {
    if routing.gas_limit == 0 {
        return Err(RouterError::InvalidRouting);
    }
    Ok(())
}

#[cfg(test)]
mod test;
