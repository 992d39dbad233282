//! Column-store manipulator
//!
//! Implements the manipulation surface on top of a store session:
//!
//! - writes (create, update, delete, increment) are built into statements,
//!   then either executed at once as one batch (empty transaction token) or
//!   appended to the token's pending batch
//! - reads (retrieve, retrieve-many, count) always execute at once
//! - commit executes a token's pending batch; abort discards it
//!
//! ## Transaction states
//!
//! ```text
//! NONE --first deferred write--> OPEN --commit / abort--> NONE
//! ```
//!
//! Commit takes the batch out of the registry before executing it, so a
//! token is back to NONE whether or not the store accepts the batch. What
//! the store applied of a failed batch is up to the store.

use crate::metrics::{Counters, TransactionMetrics};
use crate::registry::{Staged, TransactionRegistry};
use manipulate_core::codec::{self, CodecError};
use manipulate_core::{
    Assignation, AttributeUpdate, Batch, Comparator, Context, Error, Identity, Manipulable, Manipulator,
    Record, Result, Statement, TransactionId, TransactionalManipulator,
};
use manipulate_cql as cql;
use manipulate_session::{
    Connector, DriverError, ManipulatorConfig, Session, SessionFactory,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Manipulator backed by a column-family store session
pub struct CqlManipulator {
    servers: Vec<String>,
    keyspace: String,
    protocol_version: u8,
    session: Arc<dyn Session>,
    registry: TransactionRegistry,
    counters: Counters,
}

impl CqlManipulator {
    /// Connect through `connector` with the settings of `config`
    ///
    /// Fails with `InvalidConfig` or `CannotConnect`; no manipulator is
    /// returned without a live session.
    pub fn connect(connector: Arc<dyn Connector>, config: &ManipulatorConfig) -> Result<Self> {
        config.validate()?;
        let session = SessionFactory::new(connector).create_session_with(config.cluster_config())?;
        Ok(CqlManipulator {
            servers: config.servers.clone(),
            keyspace: config.keyspace.clone(),
            protocol_version: config.protocol_version,
            session,
            registry: TransactionRegistry::new(),
            counters: Counters::default(),
        })
    }

    /// Connect with the default policy
    pub fn new(
        connector: Arc<dyn Connector>,
        servers: Vec<String>,
        keyspace: impl Into<String>,
        protocol_version: u8,
    ) -> Result<Self> {
        let mut config = ManipulatorConfig::new(servers, keyspace);
        config.protocol_version = protocol_version;
        Self::connect(connector, &config)
    }

    /// Use an already established session as is
    pub fn with_session(session: Arc<dyn Session>, keyspace: impl Into<String>) -> Self {
        CqlManipulator {
            servers: Vec::new(),
            keyspace: keyspace.into(),
            protocol_version: manipulate_session::DEFAULT_PROTOCOL_VERSION,
            session,
            registry: TransactionRegistry::new(),
            counters: Counters::default(),
        }
    }

    /// Node addresses this manipulator connected to
    pub fn servers(&self) -> &[String] {
        &self.servers
    }

    /// Keyspace statements run in
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// Native protocol version
    pub fn protocol_version(&self) -> u8 {
        self.protocol_version
    }

    /// Pending batches, by token
    pub fn registry(&self) -> &TransactionRegistry {
        &self.registry
    }

    /// Current transaction statistics
    pub fn metrics(&self) -> TransactionMetrics {
        self.counters.snapshot(self.registry.len())
    }

    /// Add to, remove from, or replace one collection column of `record`
    ///
    /// Always executed immediately, as a single statement.
    pub fn update_collection<R: Record>(
        &self,
        context: &Context,
        update: &AttributeUpdate,
        record: &R,
    ) -> Result<()> {
        let (keys, values) = codec::extract_primary_key(record).map_err(|e| {
            error!(target: "manipulate::query", error = %e, "Unable to extract primary fields and values");
            cannot_build(e)
        })?;

        let statement = cql::build_update_collection(context, R::schema().identity.name, update, &keys, &values)
            .map_err(cannot_build)?;

        debug!(target: "manipulate::query", statement = %statement, "Sending update collection command");

        self.session.execute(&statement).map_err(|e| {
            error!(target: "manipulate::query", statement = %statement, error = %e, "Unable to send update collection command");
            cannot_execute(e)
        })
    }

    /// Defer `statements` under the context's token, or execute them now as
    /// one batch when there is no token
    fn dispatch(&self, context: &Context, operation: &'static str, statements: Vec<Statement>) -> Result<()> {
        let id = &context.transaction_id;
        match self.registry.batch_for(id, statements) {
            Staged::Deferred { pending, opened } => {
                if opened {
                    self.counters.record_open();
                }
                debug!(
                    target: "manipulate::txn",
                    txn = %id,
                    operation,
                    pending,
                    "Statements deferred"
                );
                Ok(())
            }
            Staged::Immediate(batch) => {
                debug!(
                    target: "manipulate::query",
                    operation,
                    statements = batch.len(),
                    "Sending batch"
                );
                let result = self.execute_batch(&batch);
                self.counters.record_immediate(result.is_ok());
                result.map_err(|e| {
                    error!(target: "manipulate::query", operation, error = %e, "Unable to send batch");
                    cannot_execute(e)
                })
            }
        }
    }

    fn execute_batch(&self, batch: &Batch) -> std::result::Result<(), DriverError> {
        if batch.is_empty() {
            return Ok(());
        }
        self.session.execute_batch(batch)
    }

    /// Assign a fresh identifier, run the create hook, and build the insert
    fn stage_create<R: Record>(&self, context: &Context, record: &mut R) -> Result<Statement> {
        record.set_identifier(new_identifier());

        if let Some(finalizer) = &context.create_finalizer {
            let target: &mut dyn Manipulable = &mut *record;
            finalizer(target)
                .map_err(|e| Error::CannotBuildQuery(format!("create finalizer failed: {}", e)))?;
        }

        let (fields, values) = codec::extract_all(record).map_err(|e| {
            error!(target: "manipulate::query", error = %e, "Unable to extract fields and values");
            cannot_build(e)
        })?;

        cql::build_insert(context, R::schema().identity.name, &fields, &values).map_err(cannot_build)
    }
}

impl Manipulator for CqlManipulator {
    fn create<R: Record>(&self, context: &Context, records: &mut [R]) -> Result<()> {
        // Stage every record first; nothing reaches the store or the
        // registry unless all of them staged.
        let mut statements = Vec::with_capacity(records.len());
        for i in 0..records.len() {
            match self.stage_create(context, &mut records[i]) {
                Ok(statement) => statements.push(statement),
                Err(e) => {
                    clear_identifiers(&mut records[..=i]);
                    return Err(e);
                }
            }
        }

        self.dispatch(context, "create", statements).map_err(|e| {
            clear_identifiers(records);
            e
        })
    }

    fn retrieve<R: Record>(&self, context: &Context, records: &mut [R]) -> Result<()> {
        let table = R::schema().identity.name;

        for record in records.iter_mut() {
            let (keys, values) = codec::extract_primary_key(record).map_err(|e| {
                error!(target: "manipulate::query", error = %e, "Unable to extract primary keys and values");
                cannot_build(e)
            })?;

            let statement = cql::build_select(context, table, &keys, &values).map_err(cannot_build)?;
            debug!(target: "manipulate::query", statement = %statement, "Sending select command");

            let rows = self.session.query(&statement).map_err(cannot_execute)?;
            codec::decode_one(rows.into_rows(), record).map_err(|e| match e {
                CodecError::RowCount { actual } => Error::ObjectNotFound(format!(
                    "cannot find the object for the given ID ({} rows in {})",
                    actual, table
                )),
                other => Error::CannotUnmarshal(other.to_string()),
            })?;
        }

        Ok(())
    }

    fn retrieve_many<R: Record>(&self, context: &Context) -> Result<Vec<R>> {
        let statement =
            cql::build_select(context, R::schema().identity.name, &[], &[]).map_err(cannot_build)?;
        debug!(target: "manipulate::query", statement = %statement, "Sending select all command");

        let rows = self.session.query(&statement).map_err(cannot_execute)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        codec::decode_many(rows.into_rows()).map_err(|e| Error::CannotUnmarshal(e.to_string()))
    }

    fn update<R: Record>(&self, context: &Context, records: &[R]) -> Result<()> {
        let table = R::schema().identity.name;
        let mut statements = Vec::with_capacity(records.len());

        for record in records {
            let (keys, key_values) = codec::extract_primary_key(record).map_err(|e| {
                error!(target: "manipulate::query", error = %e, "Unable to extract primary fields and values");
                cannot_build(e)
            })?;
            let (fields, values) = codec::extract_all(record).map_err(|e| {
                debug!(target: "manipulate::query", error = %e, "Unable to extract fields and values");
                cannot_build(e)
            })?;
            statements.push(
                cql::build_update(context, table, &fields, &values, &keys, &key_values)
                    .map_err(cannot_build)?,
            );
        }

        self.dispatch(context, "update", statements)
    }

    fn delete<R: Record>(&self, context: &Context, records: &[R]) -> Result<()> {
        let table = R::schema().identity.name;
        let mut statements = Vec::with_capacity(records.len());

        for record in records {
            let (keys, values) = codec::extract_primary_key(record).map_err(|e| {
                error!(target: "manipulate::query", error = %e, "Unable to extract primary keys and values");
                cannot_build(e)
            })?;
            statements.push(cql::build_delete(context, table, &keys, &values).map_err(cannot_build)?);
        }

        self.dispatch(context, "delete", statements)
    }

    fn delete_many(&self, _context: &Context, _identity: &Identity) -> Result<()> {
        Err(Error::NotImplemented("DeleteMany not implemented in the column-store manipulator".into()))
    }

    fn count(&self, context: &Context, identity: &Identity) -> Result<u64> {
        let statement = cql::build_count(context, identity.name).map_err(cannot_build)?;
        debug!(target: "manipulate::query", statement = %statement, "Sending count command");

        let rows = self.session.query(&statement).map_err(cannot_execute)?;
        let count = rows
            .scan_int()
            .ok_or_else(|| Error::CannotExecuteQuery("Unable to scan iterator".into()))?;

        u64::try_from(count)
            .map_err(|_| Error::CannotExecuteQuery(format!("negative count {} for {}", count, identity)))
    }

    fn increment(&self, context: &Context, identity: &Identity, counter: &str, delta: i64) -> Result<()> {
        let mut keys = Vec::new();
        let mut values = Vec::new();
        if let Some(filter) = &context.filter {
            for predicate in filter.predicates() {
                // Counter updates address rows by key equality only.
                if predicate.comparator != Comparator::Equal {
                    return Err(Error::CannotBuildQuery(format!(
                        "increment of '{}' needs key equality, got {:?} on '{}'",
                        counter, predicate.comparator, predicate.key
                    )));
                }
                keys.push(predicate.key.as_str());
                values.push(predicate.value.clone());
            }
        }

        // The filter is consumed as key predicates; it must not be applied
        // again as a generic filter.
        let view = context.without_filter();
        let statement = cql::build_increment(&view, identity.name, counter, delta, &keys, &values)
            .map_err(cannot_build)?;

        self.dispatch(context, "increment", vec![statement])
    }

    fn assign(&self, _context: &Context, _assignation: &Assignation) -> Result<()> {
        Err(Error::NotImplemented("Assign not implemented in the column-store manipulator".into()))
    }
}

impl TransactionalManipulator for CqlManipulator {
    fn commit(&self, id: &TransactionId) -> Result<()> {
        let Some(batch) = self.registry.unregister(id) else {
            error!(target: "manipulate::txn", txn = %id, "No batch found for the given transaction");
            return Err(Error::TransactionNotFound(id.clone()));
        };

        debug!(target: "manipulate::txn", txn = %id, statements = batch.len(), "Committing batch");

        match self.execute_batch(&batch) {
            Ok(()) => {
                self.counters.record_commit();
                info!(target: "manipulate::txn", txn = %id, statements = batch.len(), "Transaction committed");
                Ok(())
            }
            Err(e) => {
                self.counters.record_commit_failure();
                warn!(target: "manipulate::txn", txn = %id, error = %e, "Transaction commit failed");
                Err(Error::CannotCommit(e.to_string()))
            }
        }
    }

    fn abort(&self, id: &TransactionId) -> bool {
        match self.registry.unregister(id) {
            Some(batch) => {
                self.counters.record_abort();
                debug!(target: "manipulate::txn", txn = %id, statements = batch.len(), "Transaction aborted");
                true
            }
            None => false,
        }
    }
}

/// Time-ordered unique identifier
fn new_identifier() -> String {
    Uuid::now_v7().to_string()
}

fn clear_identifiers<R: Record>(records: &mut [R]) {
    for record in records {
        record.set_identifier(String::new());
    }
}

fn cannot_build(e: impl std::fmt::Display) -> Error {
    Error::CannotBuildQuery(e.to_string())
}

fn cannot_execute(e: DriverError) -> Error {
    Error::CannotExecuteQuery(e.to_string())
}
