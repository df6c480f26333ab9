//! End-to-end upgrade scenario
//!
//!   deploy v1, v2 ─▶ deploy proxy(v1, initialize(init)) ─▶ get == init
//!   ─▶ set(value) ─▶ get == value ─▶ initialize again (rejected)
//!   ─▶ upgradeTo by a user (rejected) ─▶ upgradeTo(v2) by the admin
//!   ─▶ get == value, version == 2 ─▶ concurrent increments ─▶ final state
//!
//! Every step is checked; a mismatch aborts the run with an error.

use alloy_primitives::{Address, U256};
use eyre::{bail, ensure, eyre, Result, WrapErr};
use futures_util::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::abi::{encode_call, function_selector, AbiValue};
use crate::client::{ClientError, ProxyAdminClient, SimpleStorageClient};
use crate::config::RuntimeConfig;
use crate::implementations::SimpleStorage;
use crate::initializer::InitializationState;
use crate::ledger::{ExecutionError, SharedLedger};
use crate::proxy::{constructor_args, UpgradeableProxy};
use crate::storage::{proxy_slots, read_proxy_state, ProxyState};

/// Values the scenario writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioOptions {
    /// Passed to `initialize` at proxy deployment
    pub init_value: U256,
    /// Written with `set` before the upgrade
    pub set_value: U256,
    /// Concurrent `increment` callers after the upgrade
    pub writers: usize,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self {
            init_value: U256::from(10),
            set_value: U256::from(20),
            writers: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// Call succeeded with the expected result
    Ok,
    /// Call failed, as expected
    Rejected,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub name: String,
    pub caller: Address,
    /// Function signature, empty for deployments
    pub call: String,
    /// Hex selector of `call`
    pub selector: String,
    pub outcome: StepOutcome,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub proxy: Address,
    pub v1: Address,
    pub v2: Address,
    pub steps: Vec<StepReport>,
    pub final_value: U256,
    pub state: ProxyState,
    /// Committed transactions, deployments included
    pub transactions: u64,
}

impl ScenarioReport {
    pub fn rejected_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.outcome == StepOutcome::Rejected)
            .count()
    }
}

#[derive(Default)]
struct Steps(Vec<StepReport>);

impl Steps {
    fn push(&mut self, name: &str, caller: Address, call: &str, outcome: StepOutcome, detail: String) {
        debug!(step = name, %caller, ?outcome, %detail, "scenario step");
        let selector = if call.is_empty() {
            String::new()
        } else {
            format!("0x{}", hex::encode(function_selector(call)))
        };
        self.0.push(StepReport {
            name: name.to_string(),
            caller,
            call: call.to_string(),
            selector,
            outcome,
            detail,
        });
    }

    fn ok(&mut self, name: &str, caller: Address, call: &str, detail: impl Into<String>) {
        self.push(name, caller, call, StepOutcome::Ok, detail.into());
    }

    fn rejected(&mut self, name: &str, caller: Address, call: &str, err: &ExecutionError) {
        self.push(name, caller, call, StepOutcome::Rejected, err.to_string());
    }
}

/// Expect a failure whose root cause satisfies `check`.
fn expect_failure<T>(
    result: Result<T, ClientError>,
    what: &str,
    check: impl Fn(&ExecutionError) -> bool,
) -> Result<ExecutionError> {
    match result {
        Ok(_) => bail!("{what} unexpectedly succeeded"),
        Err(ClientError::Execution(err)) if check(err.root_cause()) => Ok(err),
        Err(err) => Err(eyre!("{what} failed for the wrong reason: {err}")),
    }
}

fn expect_value(got: U256, expected: U256, what: &str) -> Result<()> {
    ensure!(got == expected, "{what}: expected {expected}, got {got}");
    Ok(())
}

/// Run the whole scenario on a fresh ledger built from `config`.
pub async fn run(config: &RuntimeConfig, options: ScenarioOptions) -> Result<ScenarioReport> {
    config.validate()?;
    let users = config.users().to_vec();
    let (Some(admin), Some(&user)) = (config.admin(), users.first()) else {
        bail!("config needs an admin and at least one user");
    };

    let ledger = SharedLedger::with_config(config.clone());
    let mut steps = Steps::default();

    // ── Deployment ─────────────────────────────────────────────────
    let v1 = ledger
        .deploy(admin, Arc::new(SimpleStorage::v1()), &[])
        .await
        .wrap_err("deploying SimpleStorageV1")?;
    steps.ok("deploy SimpleStorageV1", admin, "", v1.to_string());

    let v2 = ledger
        .deploy(admin, Arc::new(SimpleStorage::v2()), &[])
        .await
        .wrap_err("deploying SimpleStorageV2")?;
    steps.ok("deploy SimpleStorageV2", admin, "", v2.to_string());

    let init_data = encode_call("initialize(uint256)", &[AbiValue::uint256(options.init_value)])?;
    let proxy = ledger
        .deploy(
            admin,
            Arc::new(UpgradeableProxy::new()),
            &constructor_args(v1, &init_data),
        )
        .await
        .wrap_err("deploying proxy")?;
    steps.ok(
        "deploy proxy",
        admin,
        "initialize(uint256)",
        format!("{proxy} -> {v1}, initialized with {}", options.init_value),
    );
    info!(%proxy, %v1, %v2, %admin, "scenario contracts deployed");

    let storage = SimpleStorageClient::new(ledger.clone(), proxy, user);
    let proxy_admin = ProxyAdminClient::new(ledger.clone(), proxy, admin);

    // ── v1 ─────────────────────────────────────────────────────────
    let value = storage.get().await?;
    expect_value(value, options.init_value, "get after initialize")?;
    steps.ok("get", user, "get()", value.to_string());

    let value = storage.set(options.set_value).await?;
    expect_value(value, options.set_value, "set return value")?;
    steps.ok("set", user, "set(uint256)", value.to_string());

    let value = storage.get().await?;
    expect_value(value, options.set_value, "get after set")?;
    steps.ok("get", user, "get()", value.to_string());

    // ── Negative checks ────────────────────────────────────────────
    let err = expect_failure(
        storage.as_caller(admin).initialize(U256::from(99)).await,
        "second initialize",
        |cause| *cause == ExecutionError::AlreadyInitialized,
    )?;
    steps.rejected("initialize again", admin, "initialize(uint256)", &err);
    expect_value(storage.get().await?, options.set_value, "value after rejected initialize")?;

    let err = expect_failure(
        proxy_admin.as_caller(user).upgrade_to(v2).await,
        "upgrade by non-admin",
        |cause| matches!(cause, ExecutionError::Unauthorized { .. }),
    )?;
    steps.rejected("upgrade by user", user, "upgradeTo(address)", &err);
    ensure!(
        proxy_admin.implementation().await? == v1,
        "implementation changed by a rejected upgrade"
    );

    let err = expect_failure(
        proxy_admin.upgrade_to(user).await,
        "upgrade to an account without code",
        |cause| matches!(cause, ExecutionError::InvalidImplementation { .. }),
    )?;
    steps.rejected("upgrade to EOA", admin, "upgradeTo(address)", &err);

    // ── Upgrade ────────────────────────────────────────────────────
    let receipt = proxy_admin.upgrade_to(v2).await?;
    let changed = receipt.diff.changed_slots(&proxy);
    ensure!(
        changed == [proxy_slots::IMPLEMENTATION],
        "upgrade touched unexpected slots: {changed:?}"
    );
    steps.ok(
        "upgrade to v2",
        admin,
        "upgradeTo(address)",
        format!(
            "{v1} -> {v2}, proxy slots changed: {}",
            receipt.diff.proxy_metadata_changes(&proxy).join(", ")
        ),
    );

    let value = storage.get().await?;
    expect_value(value, options.set_value, "get after upgrade")?;
    steps.ok("get", user, "get()", value.to_string());

    let version = storage.version().await?;
    expect_value(version, U256::from(2), "version after upgrade")?;
    steps.ok("version", user, "version()", version.to_string());

    // ── Concurrent writers ─────────────────────────────────────────
    if options.writers > 0 {
        let writers: Vec<_> = (0..options.writers)
            .map(|i| storage.as_caller(users[i % users.len()]))
            .collect();
        let results = join_all(writers.iter().map(|writer| writer.increment())).await;

        let mut observed = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        observed.sort();
        let expected: Vec<U256> = (1..=options.writers)
            .map(|i| options.set_value + U256::from(i))
            .collect();
        ensure!(
            observed == expected,
            "concurrent increments were not serialized: {observed:?}"
        );
        steps.ok(
            "concurrent increments",
            user,
            "increment()",
            format!("{} writers, last {}", options.writers, expected[expected.len() - 1]),
        );
    }

    // ── Final state ────────────────────────────────────────────────
    let final_value = storage.get().await?;
    expect_value(
        final_value,
        options.set_value + U256::from(options.writers),
        "final value",
    )?;

    let (state, transactions) = ledger
        .read(|ledger| (read_proxy_state(ledger, proxy), ledger.sequence()))
        .await;
    let state = state.ok_or_else(|| eyre!("proxy account {proxy} disappeared"))?;
    ensure!(
        state.implementation == v2 && state.admin == admin,
        "unexpected proxy metadata: {state:?}"
    );
    ensure!(
        state.initialization == InitializationState::Initialized { version: 1 },
        "unexpected initialization state: {:?}",
        state.initialization
    );

    info!(%proxy, %final_value, transactions, "scenario complete");
    Ok(ScenarioReport {
        proxy,
        v1,
        v2,
        steps: steps.0,
        final_value,
        state,
        transactions,
    })
}
