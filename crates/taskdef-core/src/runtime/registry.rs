// crates/taskdef-core/src/runtime/registry.rs
// ============================================================================
// Module: In-Memory Task Definition Registry
// Description: Deterministic registry fake with call recording and fault scripts.
// Purpose: Exercise the lifecycle engine without a remote service.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! [`InMemoryTaskDefinitionRegistry`] keeps every revision of every family in
//! memory. It records each call it receives, can be scripted to fail the next
//! call of a given operation, and stamps logical timestamps so records are
//! reproducible. Clones share state, so a test can keep a handle while the
//! engine owns another.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use serde::Deserialize;
use serde::Serialize;

use crate::core::FamilyName;
use crate::core::RegisteredTaskDefinition;
use crate::core::Revision;
use crate::core::TaskDefinitionArn;
use crate::core::TaskDefinitionRecord;
use crate::core::TaskDefinitionRef;
use crate::core::TaskDefinitionSpec;
use crate::core::TaskDefinitionStatus;
use crate::core::Timestamp;
use crate::core::derive_compatibilities;
use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::hash_canonical_json;
use crate::interfaces::RegistryError;
use crate::interfaces::TaskDefinitionRegistry;

// ============================================================================
// SECTION: Call Log
// ============================================================================

/// Registry operation kinds, used to script failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryOperation {
    /// `register`.
    Register,
    /// `describe`.
    Describe,
    /// `deregister`.
    Deregister,
}

/// One call received by the in-memory registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RegistryCall {
    /// `register` for a family.
    Register {
        /// Family of the registered spec.
        family: FamilyName,
    },
    /// `describe` of a reference.
    Describe {
        /// Reference as passed.
        reference: TaskDefinitionRef,
    },
    /// `deregister` of an ARN.
    Deregister {
        /// ARN as passed.
        arn: TaskDefinitionArn,
    },
}

impl RegistryCall {
    /// Returns the operation kind of the call.
    #[must_use]
    pub const fn operation(&self) -> RegistryOperation {
        match self {
            Self::Register {
                ..
            } => RegistryOperation::Register,
            Self::Describe {
                ..
            } => RegistryOperation::Describe,
            Self::Deregister {
                ..
            } => RegistryOperation::Deregister,
        }
    }
}

// ============================================================================
// SECTION: State
// ============================================================================

/// Revisions of one family.
#[derive(Debug, Default)]
struct FamilyRevisions {
    /// Highest revision ever assigned.
    latest: Option<Revision>,
    /// Records by revision.
    records: BTreeMap<Revision, TaskDefinitionRecord>,
}

/// Shared registry state.
#[derive(Debug, Default)]
struct RegistryState {
    /// Families by name.
    families: BTreeMap<FamilyName, FamilyRevisions>,
    /// Calls in arrival order.
    calls: Vec<RegistryCall>,
    /// Scripted failures per operation, consumed in order.
    failures: BTreeMap<RegistryOperation, VecDeque<RegistryError>>,
    /// Revision returned by the next `register` instead of the assigned one.
    pinned_revision: Option<Revision>,
    /// Logical clock.
    tick: u64,
}

impl RegistryState {
    /// Records a call and returns its scripted failure, if any.
    fn enter(&mut self, call: RegistryCall) -> Result<(), RegistryError> {
        let operation = call.operation();
        self.calls.push(call);
        match self.failures.get_mut(&operation).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Advances the logical clock.
    const fn now(&mut self) -> Timestamp {
        self.tick += 1;
        Timestamp::Logical(self.tick)
    }

    /// Resolves a reference to a stored record.
    ///
    /// ARN references match only the exact ARN, so a foreign region or
    /// account never resolves.
    fn lookup(&mut self, reference: &TaskDefinitionRef) -> Option<&mut TaskDefinitionRecord> {
        match reference {
            TaskDefinitionRef::Arn {
                arn,
            } => self
                .families
                .get_mut(&arn.family())?
                .records
                .get_mut(&arn.revision())
                .filter(|record| record.arn == *arn),
            TaskDefinitionRef::Family {
                family,
            } => self.families.get_mut(family)?.records.values_mut().next_back(),
            TaskDefinitionRef::Revision {
                family,
                revision,
            } => self.families.get_mut(family)?.records.get_mut(revision),
        }
    }
}

// ============================================================================
// SECTION: In-Memory Registry
// ============================================================================

/// In-memory task definition registry for tests and dry runs.
#[derive(Debug, Clone)]
pub struct InMemoryTaskDefinitionRegistry {
    /// Region used in ARNs.
    region: String,
    /// Account id used in ARNs.
    account_id: String,
    /// Shared state.
    state: Arc<Mutex<RegistryState>>,
}

impl Default for InMemoryTaskDefinitionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTaskDefinitionRegistry {
    /// Creates a registry issuing ARNs for `us-east-1` / `000000000000`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_identity("us-east-1", "000000000000")
    }

    /// Creates a registry issuing ARNs for the given region and account.
    #[must_use]
    pub fn with_identity(region: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            account_id: account_id.into(),
            state: Arc::new(Mutex::new(RegistryState::default())),
        }
    }

    /// Returns every call received so far.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Remote`] when the state mutex is poisoned.
    pub fn calls(&self) -> Result<Vec<RegistryCall>, RegistryError> {
        Ok(self.lock()?.calls.clone())
    }

    /// Forgets recorded calls.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Remote`] when the state mutex is poisoned.
    pub fn clear_calls(&self) -> Result<(), RegistryError> {
        self.lock()?.calls.clear();
        Ok(())
    }

    /// Makes the next call of `operation` fail with `error`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Remote`] when the state mutex is poisoned.
    pub fn fail_next(
        &self,
        operation: RegistryOperation,
        error: RegistryError,
    ) -> Result<(), RegistryError> {
        self.lock()?.failures.entry(operation).or_default().push_back(error);
        Ok(())
    }

    /// Makes the next `register` report `revision` without storing anything,
    /// simulating a registry that violates revision monotonicity.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Remote`] when the state mutex is poisoned.
    pub fn pin_next_revision(&self, revision: Revision) -> Result<(), RegistryError> {
        self.lock()?.pinned_revision = Some(revision);
        Ok(())
    }

    /// Returns every stored revision of a family, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Remote`] when the state mutex is poisoned.
    pub fn revisions(&self, family: &FamilyName) -> Result<Vec<TaskDefinitionRecord>, RegistryError> {
        Ok(self
            .lock()?
            .families
            .get(family)
            .map(|revisions| revisions.records.values().cloned().collect())
            .unwrap_or_default())
    }

    /// Locks the shared state.
    fn lock(&self) -> Result<MutexGuard<'_, RegistryState>, RegistryError> {
        self.state
            .lock()
            .map_err(|_| RegistryError::Remote("task definition registry mutex poisoned".to_string()))
    }
}

impl TaskDefinitionRegistry for InMemoryTaskDefinitionRegistry {
    fn register(&self, spec: &TaskDefinitionSpec) -> Result<RegisteredTaskDefinition, RegistryError> {
        let mut state = self.lock()?;
        state.enter(RegistryCall::Register {
            family: spec.family.clone(),
        })?;
        if let Some(revision) = state.pinned_revision.take() {
            return Ok(RegisteredTaskDefinition {
                arn: TaskDefinitionArn::new(&self.region, &self.account_id, &spec.family, revision),
                revision,
            });
        }
        let spec_hash = hash_canonical_json(DEFAULT_HASH_ALGORITHM, spec)
            .map_err(|err| RegistryError::Invalid(err.to_string()))?;
        let registered_at = state.now();
        let revisions = state.families.entry(spec.family.clone()).or_default();
        let revision = match revisions.latest {
            Some(latest) => latest.next().ok_or_else(|| {
                RegistryError::Invalid(format!("revision overflow for family {}", spec.family))
            })?,
            None => Revision::FIRST,
        };
        let arn = TaskDefinitionArn::new(&self.region, &self.account_id, &spec.family, revision);
        revisions.latest = Some(revision);
        revisions.records.insert(
            revision,
            TaskDefinitionRecord {
                arn: arn.clone(),
                family: spec.family.clone(),
                revision,
                status: TaskDefinitionStatus::Active,
                spec: spec.clone(),
                compatibilities: derive_compatibilities(spec),
                spec_hash,
                registered_at,
                deregistered_at: None,
            },
        );
        drop(state);
        Ok(RegisteredTaskDefinition {
            arn,
            revision,
        })
    }

    fn describe(&self, reference: &TaskDefinitionRef) -> Result<TaskDefinitionRecord, RegistryError> {
        let mut state = self.lock()?;
        state.enter(RegistryCall::Describe {
            reference: reference.clone(),
        })?;
        state
            .lookup(reference)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(reference.to_string()))
    }

    fn deregister(&self, arn: &TaskDefinitionArn) -> Result<TaskDefinitionStatus, RegistryError> {
        let mut state = self.lock()?;
        state.enter(RegistryCall::Deregister {
            arn: arn.clone(),
        })?;
        let now = state.now();
        let record = state
            .lookup(&TaskDefinitionRef::from(arn))
            .ok_or_else(|| RegistryError::NotFound(arn.to_string()))?;
        if record.status == TaskDefinitionStatus::Active {
            record.status = TaskDefinitionStatus::Inactive;
            record.deregistered_at = Some(now);
        }
        Ok(record.status)
    }
}
