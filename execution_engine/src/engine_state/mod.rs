//! The install/update/audit state machine driven by deployment transactions.

mod error;
mod execution_context;
pub mod genesis;

pub use error::Error;
pub use execution_context::{ExecutionContext, Message, ServiceFlags, TransactionContext};

use tracing::{debug, warn};

use keystone_storage::{deploy::Error as StorageError, DeployStorage, KeyValueStore};
use keystone_types::{
    deploy::{DeployData, DeployTxParams, DeployType},
    Address, TransactionHash, ZERO_CONTRACT_ADDRESS,
};

use crate::runtime::{CodeStore, ContractRuntime, PackageValidator};

/// Content type of a zipped contract package.
pub const CONTENT_TYPE_ZIP: &str = "application/zip";
/// Content type of unpackaged contract content, accepted in dev mode only.
pub const CONTENT_TYPE_RAW: &str = "application/raw";

/// First ruleset revision at which a recognized system contract deployed by
/// its owner bypasses the audit gate.
pub const SYSTEM_SCORE_EXEMPTION_REVISION: u32 = 2;

/// Where a deployment transaction ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeployOutcome {
    /// The deployment was recorded and awaits a later audit-accept
    /// transaction to activate it.
    Recorded,
    /// Code was materialized, the init hook ran and the record is active.
    Activated,
}

/// Orchestrates contract deployments: validation, recording, audit gating,
/// code materialization and activation.
///
/// Runtime collaborators are injected at construction; the engine holds no
/// process-wide state.
pub struct DeployEngine<S> {
    storage: DeployStorage<S>,
    code_store: Box<dyn CodeStore>,
    contract_runtime: Box<dyn ContractRuntime>,
    validator: Box<dyn PackageValidator>,
}

impl<S: KeyValueStore> DeployEngine<S> {
    /// Creates an engine over `storage` and the given collaborators.
    pub fn new(
        storage: DeployStorage<S>,
        code_store: Box<dyn CodeStore>,
        contract_runtime: Box<dyn ContractRuntime>,
        validator: Box<dyn PackageValidator>,
    ) -> DeployEngine<S> {
        DeployEngine {
            storage,
            code_store,
            contract_runtime,
            validator,
        }
    }

    /// The deploy storage this engine writes through.
    pub fn storage(&self) -> &DeployStorage<S> {
        &self.storage
    }

    /// Handles a deployment request carried by a transaction.
    ///
    /// `to` selects the deployment type: the zero contract address installs,
    /// anything else updates `score_address`. The request is validated against
    /// the deny/allow lists and recorded; unless the audit gate requires a
    /// separate accept transaction, it is then immediately deployed.
    pub fn invoke(
        &self,
        ctx: &mut ExecutionContext,
        to: Address,
        score_address: Address,
        data: DeployData,
    ) -> Result<DeployOutcome, Error> {
        let tx = ctx.tx.ok_or(Error::NoTransactionContext)?;

        if !score_address.is_contract() || score_address == ZERO_CONTRACT_ADDRESS {
            return Err(Error::InvalidTarget(score_address));
        }
        let deploy_type = if to == ZERO_CONTRACT_ADDRESS {
            DeployType::Install
        } else {
            DeployType::Update
        };

        if ctx.score_blacklist.contains(&score_address) {
            return Err(Error::Blacklisted(score_address));
        }
        if ctx.is_flag_on(ServiceFlags::DEPLOYER_WHITE_LIST)
            && !ctx.deployer_whitelist.contains(&tx.origin)
        {
            return Err(Error::UnauthorizedDeployer(tx.origin));
        }
        validate_content_type(ctx, &data)?;

        self.storage
            .put_tx_params_and_record(score_address, deploy_type, tx.origin, tx.hash, data)?;

        if self.is_audit_needed(ctx, score_address)? {
            debug!(%score_address, "deployment recorded, awaiting audit");
            Ok(DeployOutcome::Recorded)
        } else {
            self.deploy(ctx, tx.hash)?;
            Ok(DeployOutcome::Activated)
        }
    }

    /// Audit is skipped when audit enforcement is off, or when the target is
    /// a recognized system contract deployed by its recorded owner under a
    /// ruleset that exempts system contracts.
    fn is_audit_needed(
        &self,
        ctx: &ExecutionContext,
        score_address: Address,
    ) -> Result<bool, Error> {
        let tx = ctx.tx.ok_or(Error::NoTransactionContext)?;
        let is_system_score = ctx.revision >= SYSTEM_SCORE_EXEMPTION_REVISION
            && genesis::is_builtin_score(score_address);
        let is_owner = self.storage.get_owner(score_address)? == Some(tx.origin);
        Ok(ctx.is_flag_on(ServiceFlags::AUDIT) && !(is_system_score && is_owner))
    }

    /// Activates the pending deployment recorded under `tx_hash`: decodes the
    /// package content, materializes it, runs the install or update hook and
    /// commits the record transition.
    ///
    /// On any failure the pending deployment is left intact so it can be
    /// retried; the record is never half-activated.
    pub fn deploy(&self, ctx: &mut ExecutionContext, tx_hash: TransactionHash) -> Result<(), Error> {
        let tx_params = self
            .storage
            .get_tx_params(tx_hash)?
            .ok_or(Error::Storage(StorageError::ParamsNotFound(tx_hash)))?;
        let score_address = tx_params.score_address();
        self.deploy_score(ctx, &tx_params)?;
        self.storage.activate(score_address, Some(tx_hash))?;
        Ok(())
    }

    fn deploy_score(
        &self,
        ctx: &mut ExecutionContext,
        tx_params: &DeployTxParams,
    ) -> Result<(), Error> {
        let data = tx_params.deploy_data();
        let score_address = tx_params.score_address();
        let content = content_bytes(ctx, data)?;

        // The hash under which the code lands: the pending hash, or the
        // sentinel outside normal transaction flow.
        let code_hash = self
            .storage
            .get_record(score_address)?
            .and_then(|record| record.next_tx_hash())
            .unwrap_or_else(TransactionHash::zero);

        self.code_store.materialize(score_address, code_hash, &content)?;

        let owner = self
            .storage
            .get_owner(score_address)?
            .ok_or(Error::Storage(StorageError::RecordNotFound(score_address)))?;

        let backup_msg = ctx.msg;
        let backup_tx = ctx.tx;
        let result: Result<(), Error> = (|| {
            if ctx.is_flag_on(ServiceFlags::PACKAGE_VALIDATOR) {
                self.validator.validate(score_address, code_hash)?;
            }
            let mut contract = self.contract_runtime.instantiate(score_address, code_hash)?;
            // The hook observes the contract's owner as sender, outside any
            // transaction.
            ctx.msg = Some(Message { sender: owner });
            ctx.tx = None;
            match tx_params.deploy_type() {
                DeployType::Install => contract.on_install(&data.params),
                DeployType::Update => contract.on_update(&data.params),
            }
            .map_err(Error::from)
        })();
        // Restored on success and failure alike.
        ctx.msg = backup_msg;
        ctx.tx = backup_tx;

        result.map_err(|err| {
            warn!(%score_address, %err, "contract initialization failed, deployment left pending");
            err
        })
    }
}

fn validate_content_type(ctx: &ExecutionContext, data: &DeployData) -> Result<(), Error> {
    match data.content_type.as_str() {
        CONTENT_TYPE_ZIP => Ok(()),
        CONTENT_TYPE_RAW if ctx.dev_mode => Ok(()),
        other => Err(Error::InvalidContentType(other.to_string())),
    }
}

fn content_bytes(ctx: &ExecutionContext, data: &DeployData) -> Result<Vec<u8>, Error> {
    validate_content_type(ctx, data)?;
    if data.content_type == CONTENT_TYPE_RAW {
        return Ok(data.content.clone().into_bytes());
    }
    let hex = data.content.strip_prefix("0x").unwrap_or(&data.content);
    base16::decode(hex).map_err(|err| Error::InvalidContent(err.to_string()))
}

#[cfg(test)]
mod tests {
    use std::{
        cell::{Cell, RefCell},
        collections::BTreeMap,
        rc::Rc,
    };

    use rand::Rng;
    use serde_json::json;

    use keystone_storage::ScratchState;
    use keystone_types::deploy::{DeployRecord, DeployState};

    use super::{
        genesis::{BuiltinLoader, BuiltinSources, GOVERNANCE_ADDRESS},
        *,
    };
    use crate::runtime::{self, Contract, HookParams};

    type MaterializeCalls = Rc<RefCell<Vec<(Address, TransactionHash, Vec<u8>)>>>;

    #[derive(Clone, Default)]
    struct RecordingCodeStore {
        calls: MaterializeCalls,
    }

    impl CodeStore for RecordingCodeStore {
        fn materialize(
            &self,
            address: Address,
            tx_hash: TransactionHash,
            content: &[u8],
        ) -> Result<(), runtime::Error> {
            self.calls.borrow_mut().push((address, tx_hash, content.to_vec()));
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct HookLog {
        installs: Rc<RefCell<Vec<HookParams>>>,
        updates: Rc<RefCell<Vec<HookParams>>>,
        fail_next: Rc<Cell<bool>>,
    }

    struct TestContract {
        log: HookLog,
    }

    impl Contract for TestContract {
        fn on_install(&mut self, params: &HookParams) -> Result<(), runtime::Error> {
            if self.log.fail_next.get() {
                return Err(runtime::Error::Hook("install failed".to_string()));
            }
            self.log.installs.borrow_mut().push(params.clone());
            Ok(())
        }

        fn on_update(&mut self, params: &HookParams) -> Result<(), runtime::Error> {
            if self.log.fail_next.get() {
                return Err(runtime::Error::Hook("update failed".to_string()));
            }
            self.log.updates.borrow_mut().push(params.clone());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct TestRuntime {
        log: HookLog,
    }

    impl ContractRuntime for TestRuntime {
        fn instantiate(
            &self,
            _address: Address,
            _tx_hash: TransactionHash,
        ) -> Result<Box<dyn Contract>, runtime::Error> {
            Ok(Box::new(TestContract {
                log: self.log.clone(),
            }))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingValidator {
        calls: Rc<Cell<u32>>,
    }

    impl PackageValidator for RecordingValidator {
        fn validate(
            &self,
            _address: Address,
            _tx_hash: TransactionHash,
        ) -> Result<(), runtime::Error> {
            self.calls.set(self.calls.get() + 1);
            Ok(())
        }
    }

    struct Fixture {
        engine: DeployEngine<ScratchState>,
        materialized: MaterializeCalls,
        hooks: HookLog,
        validations: Rc<Cell<u32>>,
    }

    fn fixture() -> Fixture {
        let code_store = RecordingCodeStore::default();
        let materialized = code_store.calls.clone();
        let contract_runtime = TestRuntime::default();
        let hooks = contract_runtime.log.clone();
        let validator = RecordingValidator::default();
        let validations = validator.calls.clone();
        let engine = DeployEngine::new(
            DeployStorage::new(ScratchState::new()),
            Box::new(code_store),
            Box::new(contract_runtime),
            Box::new(validator),
        );
        Fixture {
            engine,
            materialized,
            hooks,
            validations,
        }
    }

    fn install_data() -> DeployData {
        let mut data = DeployData::new(CONTENT_TYPE_ZIP, "0xdeadbeef");
        data.params.insert("supply".to_string(), json!("0x100"));
        data
    }

    fn context() -> (ExecutionContext, Address, TransactionHash) {
        let mut rng = rand::thread_rng();
        let origin = Address::account(rng.gen());
        let tx_hash: TransactionHash = rng.gen();
        (ExecutionContext::new(origin, tx_hash), origin, tx_hash)
    }

    #[test]
    fn install_without_audit_activates_immediately() {
        let fixture = fixture();
        let (mut ctx, origin, tx_hash) = context();
        let score_address = Address::contract([7; 20]);

        let outcome = fixture
            .engine
            .invoke(&mut ctx, ZERO_CONTRACT_ADDRESS, score_address, install_data())
            .unwrap();
        assert_eq!(outcome, DeployOutcome::Activated);

        let record = fixture.engine.storage().get_record(score_address).unwrap().unwrap();
        assert_eq!(record.deploy_state(), DeployState::Active);
        assert_eq!(record.owner(), origin);
        assert_eq!(record.current_tx_hash(), Some(tx_hash));
        assert_eq!(record.next_tx_hash(), None);

        // The install hook ran exactly once, with the decoded params.
        let installs = fixture.hooks.installs.borrow();
        assert_eq!(installs.len(), 1);
        assert_eq!(installs[0].get("supply"), Some(&json!("0x100")));
        assert!(fixture.hooks.updates.borrow().is_empty());

        // The hex content was decoded and landed under the pending hash.
        let materialized = fixture.materialized.borrow();
        assert_eq!(
            materialized.as_slice(),
            [(score_address, tx_hash, vec![0xde, 0xad, 0xbe, 0xef])]
        );
    }

    #[test]
    fn audit_gate_defers_activation_to_an_accept_transaction() {
        let fixture = fixture();
        let (mut ctx, _origin, tx_hash) = context();
        ctx.flags = ServiceFlags::AUDIT;
        let score_address = Address::contract([7; 20]);

        let outcome = fixture
            .engine
            .invoke(&mut ctx, ZERO_CONTRACT_ADDRESS, score_address, install_data())
            .unwrap();
        assert_eq!(outcome, DeployOutcome::Recorded);
        assert!(!fixture.engine.storage().is_active(score_address).unwrap());
        assert!(fixture.materialized.borrow().is_empty());
        assert!(fixture.hooks.installs.borrow().is_empty());

        // A later accept transaction triggers the activation step.
        fixture.engine.deploy(&mut ctx, tx_hash).unwrap();
        assert!(fixture.engine.storage().is_active(score_address).unwrap());
        assert_eq!(fixture.hooks.installs.borrow().len(), 1);
    }

    #[test]
    fn system_score_owner_is_exempt_from_audit_at_sufficient_revision() {
        let fixture = fixture();
        let (mut ctx, origin, _) = context();
        ctx.flags = ServiceFlags::AUDIT;
        ctx.revision = SYSTEM_SCORE_EXEMPTION_REVISION;
        let governance = *GOVERNANCE_ADDRESS;

        // The governance contract already belongs to the originator.
        let record =
            DeployRecord::new(governance, DeployState::Active, origin, None, None);
        fixture.engine.storage().put_record(&record).unwrap();

        let outcome = fixture
            .engine
            .invoke(&mut ctx, governance, governance, install_data())
            .unwrap();
        assert_eq!(outcome, DeployOutcome::Activated);
    }

    #[test]
    fn system_score_exemption_requires_the_revision() {
        let fixture = fixture();
        let (mut ctx, origin, _) = context();
        ctx.flags = ServiceFlags::AUDIT;
        ctx.revision = SYSTEM_SCORE_EXEMPTION_REVISION - 1;
        let governance = *GOVERNANCE_ADDRESS;

        let record =
            DeployRecord::new(governance, DeployState::Active, origin, None, None);
        fixture.engine.storage().put_record(&record).unwrap();

        let outcome = fixture
            .engine
            .invoke(&mut ctx, governance, governance, install_data())
            .unwrap();
        assert_eq!(outcome, DeployOutcome::Recorded);
        assert!(fixture.hooks.installs.borrow().is_empty());
    }

    #[test]
    fn owner_mismatch_persists_nothing() {
        let fixture = fixture();
        let (mut ctx, _origin, tx_hash) = context();
        let score_address = Address::contract([7; 20]);
        let other_owner = Address::account([0xbb; 20]);

        let record =
            DeployRecord::new(score_address, DeployState::Active, other_owner, None, None);
        fixture.engine.storage().put_record(&record).unwrap();

        let result = fixture
            .engine
            .invoke(&mut ctx, score_address, score_address, install_data());
        assert!(matches!(
            result,
            Err(Error::Storage(StorageError::OwnerMismatch { .. }))
        ));

        // No params were written, the record's owner is unchanged.
        assert!(fixture.engine.storage().get_tx_params(tx_hash).unwrap().is_none());
        let record = fixture.engine.storage().get_record(score_address).unwrap().unwrap();
        assert_eq!(record.owner(), other_owner);
        assert_eq!(record.next_tx_hash(), None);
    }

    #[test]
    fn invalid_targets_are_rejected_before_any_write() {
        let fixture = fixture();
        let (mut ctx, _, _) = context();

        assert_eq!(
            fixture.engine.invoke(
                &mut ctx,
                ZERO_CONTRACT_ADDRESS,
                ZERO_CONTRACT_ADDRESS,
                install_data()
            ),
            Err(Error::InvalidTarget(ZERO_CONTRACT_ADDRESS))
        );

        let account = Address::account([1; 20]);
        assert_eq!(
            fixture
                .engine
                .invoke(&mut ctx, ZERO_CONTRACT_ADDRESS, account, install_data()),
            Err(Error::InvalidTarget(account))
        );
    }

    #[test]
    fn blacklisted_target_is_rejected() {
        let fixture = fixture();
        let (mut ctx, _, _) = context();
        let score_address = Address::contract([7; 20]);
        ctx.score_blacklist.insert(score_address);

        assert_eq!(
            fixture
                .engine
                .invoke(&mut ctx, ZERO_CONTRACT_ADDRESS, score_address, install_data()),
            Err(Error::Blacklisted(score_address))
        );
        assert!(fixture.engine.storage().get_record(score_address).unwrap().is_none());
    }

    #[test]
    fn deployer_allow_list_gates_the_originator() {
        let fixture = fixture();
        let (mut ctx, origin, _) = context();
        ctx.flags = ServiceFlags::DEPLOYER_WHITE_LIST;
        let score_address = Address::contract([7; 20]);

        assert_eq!(
            fixture
                .engine
                .invoke(&mut ctx, ZERO_CONTRACT_ADDRESS, score_address, install_data()),
            Err(Error::UnauthorizedDeployer(origin))
        );

        ctx.deployer_whitelist.insert(origin);
        let outcome = fixture
            .engine
            .invoke(&mut ctx, ZERO_CONTRACT_ADDRESS, score_address, install_data())
            .unwrap();
        assert_eq!(outcome, DeployOutcome::Activated);
    }

    #[test]
    fn unrecognized_content_type_is_rejected_before_any_write() {
        let fixture = fixture();
        let (mut ctx, _, _) = context();
        let score_address = Address::contract([7; 20]);
        let data = DeployData::new("application/pdf", "0x00");

        assert_eq!(
            fixture
                .engine
                .invoke(&mut ctx, ZERO_CONTRACT_ADDRESS, score_address, data),
            Err(Error::InvalidContentType("application/pdf".to_string()))
        );
        assert!(fixture.engine.storage().get_record(score_address).unwrap().is_none());
    }

    #[test]
    fn raw_content_requires_dev_mode() {
        let rejecting = fixture();
        let (mut ctx, _, _) = context();
        let score_address = Address::contract([7; 20]);
        let data = DeployData::new(CONTENT_TYPE_RAW, "src/score");

        assert_eq!(
            rejecting
                .engine
                .invoke(&mut ctx, ZERO_CONTRACT_ADDRESS, score_address, data.clone()),
            Err(Error::InvalidContentType(CONTENT_TYPE_RAW.to_string()))
        );

        let accepting = fixture();
        ctx.dev_mode = true;
        let outcome = accepting
            .engine
            .invoke(&mut ctx, ZERO_CONTRACT_ADDRESS, score_address, data)
            .unwrap();
        assert_eq!(outcome, DeployOutcome::Activated);
        assert_eq!(accepting.materialized.borrow()[0].2, b"src/score".to_vec());
    }

    #[test]
    fn malformed_hex_content_is_rejected() {
        let fixture = fixture();
        let (mut ctx, _, _) = context();
        let score_address = Address::contract([7; 20]);
        let data = DeployData::new(CONTENT_TYPE_ZIP, "0xnot-hex");

        assert!(matches!(
            fixture
                .engine
                .invoke(&mut ctx, ZERO_CONTRACT_ADDRESS, score_address, data),
            Err(Error::InvalidContent(_))
        ));
    }

    #[test]
    fn package_validation_runs_only_under_the_flag() {
        let unflagged = fixture();
        let (mut ctx, _, _) = context();
        let score_address = Address::contract([7; 20]);

        unflagged
            .engine
            .invoke(&mut ctx, ZERO_CONTRACT_ADDRESS, score_address, install_data())
            .unwrap();
        assert_eq!(unflagged.validations.get(), 0);

        let flagged = fixture();
        ctx.flags = ServiceFlags::PACKAGE_VALIDATOR;
        flagged
            .engine
            .invoke(&mut ctx, ZERO_CONTRACT_ADDRESS, score_address, install_data())
            .unwrap();
        assert_eq!(flagged.validations.get(), 1);
    }

    #[test]
    fn hook_failure_leaves_the_deployment_retryable() {
        let fixture = fixture();
        let (mut ctx, origin, tx_hash) = context();
        let score_address = Address::contract([7; 20]);
        fixture.hooks.fail_next.set(true);

        let result = fixture
            .engine
            .invoke(&mut ctx, ZERO_CONTRACT_ADDRESS, score_address, install_data());
        assert!(matches!(result, Err(Error::Runtime(runtime::Error::Hook(_)))));

        // The pending deployment is intact and the ambient context restored.
        let record = fixture.engine.storage().get_record(score_address).unwrap().unwrap();
        assert_eq!(record.deploy_state(), DeployState::Inactive);
        assert_eq!(record.next_tx_hash(), Some(tx_hash));
        assert_eq!(ctx.msg, Some(Message { sender: origin }));
        assert_eq!(ctx.tx.unwrap().hash, tx_hash);

        // A retry of the activation step succeeds.
        fixture.hooks.fail_next.set(false);
        fixture.engine.deploy(&mut ctx, tx_hash).unwrap();
        assert!(fixture.engine.storage().is_active(score_address).unwrap());
    }

    #[test]
    fn update_runs_the_update_hook() {
        let fixture = fixture();
        let (mut ctx, _origin, _) = context();
        let score_address = Address::contract([7; 20]);

        fixture
            .engine
            .invoke(&mut ctx, ZERO_CONTRACT_ADDRESS, score_address, install_data())
            .unwrap();

        let mut rng = rand::thread_rng();
        let update_hash: TransactionHash = rng.gen();
        ctx.tx = Some(TransactionContext {
            origin: ctx.tx.unwrap().origin,
            hash: update_hash,
        });
        fixture
            .engine
            .invoke(&mut ctx, score_address, score_address, install_data())
            .unwrap();

        assert_eq!(fixture.hooks.installs.borrow().len(), 1);
        assert_eq!(fixture.hooks.updates.borrow().len(), 1);
        let record = fixture.engine.storage().get_record(score_address).unwrap().unwrap();
        assert_eq!(record.current_tx_hash(), Some(update_hash));
    }

    #[test]
    fn deploy_without_params_is_rejected() {
        let fixture = fixture();
        let (mut ctx, _, _) = context();
        let missing = TransactionHash::new([9; 32]);
        assert_eq!(
            fixture.engine.deploy(&mut ctx, missing),
            Err(Error::Storage(StorageError::ParamsNotFound(missing)))
        );
    }

    struct MapSources(BTreeMap<&'static str, Vec<u8>>);

    impl BuiltinSources for MapSources {
        fn source(&self, name: &str) -> Result<Vec<u8>, runtime::Error> {
            self.0
                .get(name)
                .cloned()
                .ok_or_else(|| runtime::Error::Materialize(format!("no source for {}", name)))
        }
    }

    #[test]
    fn builtin_bootstrap_seeds_inactive_system_scores_once() {
        let fixture = fixture();
        let owner = Address::account([0xcc; 20]);
        let sources = MapSources(BTreeMap::from([("governance", b"package".to_vec())]));
        let loader = BuiltinLoader::new(&fixture.engine, &sources);

        loader.load_builtin_scores(owner).unwrap();

        let governance = *GOVERNANCE_ADDRESS;
        let record = fixture.engine.storage().get_record(governance).unwrap().unwrap();
        assert_eq!(record.deploy_state(), DeployState::Active);
        assert_eq!(record.owner(), owner);
        assert_eq!(record.current_tx_hash(), None);
        assert_eq!(record.next_tx_hash(), None);
        assert_eq!(fixture.hooks.installs.borrow().len(), 1);
        assert!(fixture.hooks.installs.borrow()[0].is_empty());
        assert_eq!(
            fixture.materialized.borrow()[0],
            (governance, TransactionHash::zero(), b"package".to_vec())
        );

        // Already active: a second bootstrap is a no-op.
        loader.load_builtin_scores(owner).unwrap();
        assert_eq!(fixture.hooks.installs.borrow().len(), 1);
    }

    #[test]
    fn builtin_bootstrap_failure_does_not_persist_the_record() {
        let fixture = fixture();
        let owner = Address::account([0xcc; 20]);
        fixture.hooks.fail_next.set(true);
        let sources = MapSources(BTreeMap::from([("governance", b"package".to_vec())]));
        let loader = BuiltinLoader::new(&fixture.engine, &sources);

        assert!(loader.load_builtin_scores(owner).is_err());
        assert!(fixture
            .engine
            .storage()
            .get_record(*GOVERNANCE_ADDRESS)
            .unwrap()
            .is_none());
    }
}
