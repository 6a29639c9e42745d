// Interest and transaction lifecycle
// All multi-row mutations run inside a database transaction so a lead can
// never be committed without its transaction row or vice versa. Notifications
// are the caller's responsibility and happen after commit.

use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use uuid::Uuid;

use crate::db::DieselPool;
use crate::models::connection::BuyerAgentConnection;
use crate::models::lead::{NewPropertyLead, PropertyLead, LEAD_STATUS_PENDING};
use crate::models::notification::{NewTransactionNotification, TransactionNotification};
use crate::models::property::Property;
use crate::models::transaction::{
    NewTransaction, NewTransactionProgress, Stage, Transaction, STATUS_INTERESTED,
    STATUS_PRE_DEPOSIT,
};
use crate::utils::api_error::{ApiError, ApiResult};
use crate::utils::messages;

/// Which record a stage-update reference id resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionSource {
    Direct,
    Lead,
    Connection,
}

#[derive(Debug)]
pub struct ResolvedTransaction {
    pub source: TransactionSource,
    pub transaction: Transaction,
}

#[derive(Debug)]
pub struct InterestOutcome {
    pub lead: PropertyLead,
    pub transaction: Transaction,
    pub restored: bool,
}

#[derive(Debug)]
pub struct CancelOutcome {
    pub lead: PropertyLead,
    pub transaction: Option<Transaction>,
}

#[derive(Clone)]
pub struct LifecycleService {
    pool: DieselPool,
}

impl LifecycleService {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    /// Restore-or-create the lead and transaction for a buyer's interest.
    pub async fn express_interest(
        &self,
        buyer_id: Uuid,
        property: &Property,
    ) -> ApiResult<InterestOutcome> {
        let property_id = property.id;
        let owner_id = property.user_id;

        let mut conn = self.pool.get().await?;
        let outcome = conn
            .transaction::<InterestOutcome, ApiError, _>(|conn| {
                async move {
                    let (lead, lead_restored) =
                        restore_or_create_lead(conn, property_id, buyer_id).await?;

                    let (transaction, txn_restored) = restore_or_create_transaction(
                        conn,
                        property_id,
                        buyer_id,
                        Some(owner_id),
                        lead.id,
                    )
                    .await?;

                    let lead = PropertyLead::link_transaction(conn, lead.id, transaction.id).await?;

                    Ok(InterestOutcome {
                        lead,
                        transaction,
                        restored: lead_restored || txn_restored,
                    })
                }
                .scope_boxed()
            })
            .await?;

        Ok(outcome)
    }

    /// Soft-cancel the buyer's interest: lead, matching connections, and the
    /// active transaction with its audit trail.
    pub async fn cancel_interest(
        &self,
        buyer_id: Uuid,
        property_id: Uuid,
    ) -> ApiResult<CancelOutcome> {
        let mut conn = self.pool.get().await?;
        let outcome = conn
            .transaction::<CancelOutcome, ApiError, _>(|conn| {
                async move {
                    let lead = PropertyLead::find_active_for_pair(conn, property_id, buyer_id)
                        .await?
                        .ok_or_else(|| {
                            ApiError::NotFound(messages::NO_ACTIVE_INTEREST.to_string())
                        })?;

                    let lead = PropertyLead::cancel(conn, lead.id).await?;

                    BuyerAgentConnection::set_interest_cancelled_for_pair(
                        conn, buyer_id, property_id, true,
                    )
                    .await?;

                    let transaction =
                        match Transaction::find_active_for_pair(conn, property_id, buyer_id)
                            .await?
                        {
                            Some(txn) => {
                                let txn = Transaction::cancel(conn, txn.id).await?;

                                Transaction::append_progress(
                                    conn,
                                    &NewTransactionProgress {
                                        transaction_id: txn.id,
                                        stage: Stage::Cancelled.as_str().to_string(),
                                        notes: Some(
                                            messages::TXN_CANCELLED_BY_BUYER.to_string(),
                                        ),
                                        created_by_id: buyer_id,
                                    },
                                )
                                .await?;

                                TransactionNotification::insert(
                                    conn,
                                    &NewTransactionNotification {
                                        transaction_id: txn.id,
                                        kind: "SYSTEM".to_string(),
                                        message: messages::TXN_CANCELLED_BY_BUYER.to_string(),
                                        status: "SENT".to_string(),
                                    },
                                )
                                .await?;

                                Some(txn)
                            },
                            None => None,
                        };

                    Ok(CancelOutcome { lead, transaction })
                }
                .scope_boxed()
            })
            .await?;

        Ok(outcome)
    }

    /// Resolve a reference id to its transaction, trying sources in a fixed
    /// order: transaction id, then lead id (promoting the lead when it has no
    /// transaction yet), then connection id (always promoting). Returns None
    /// when nothing matches.
    pub async fn resolve_or_create_transaction(
        &self,
        reference_id: Uuid,
        initial_stage: Stage,
    ) -> ApiResult<Option<ResolvedTransaction>> {
        let mut conn = self.pool.get().await?;
        let resolved = conn
            .transaction::<Option<ResolvedTransaction>, ApiError, _>(|conn| {
                async move { resolve_reference(conn, reference_id, initial_stage).await }
                    .scope_boxed()
            })
            .await?;

        Ok(resolved)
    }

    /// Stage update: append the audit row and store the new stage, together.
    /// Any stage may be set from any other stage.
    pub async fn set_stage(
        &self,
        reference_id: Uuid,
        new_stage: Stage,
        actor_id: Uuid,
    ) -> ApiResult<Option<ResolvedTransaction>> {
        let mut conn = self.pool.get().await?;
        let resolved = conn
            .transaction::<Option<ResolvedTransaction>, ApiError, _>(|conn| {
                async move {
                    let resolved = match resolve_reference(conn, reference_id, new_stage).await? {
                        Some(r) => r,
                        None => return Ok(None),
                    };

                    Transaction::append_progress(
                        conn,
                        &NewTransactionProgress {
                            transaction_id: resolved.transaction.id,
                            stage: new_stage.as_str().to_string(),
                            notes: Some(format!("Stage updated to {}", new_stage)),
                            created_by_id: actor_id,
                        },
                    )
                    .await?;

                    let transaction =
                        Transaction::set_stage(conn, resolved.transaction.id, new_stage).await?;

                    Ok(Some(ResolvedTransaction {
                        source: resolved.source,
                        transaction,
                    }))
                }
                .scope_boxed()
            })
            .await?;

        Ok(resolved)
    }
}

async fn restore_or_create_lead(
    conn: &mut AsyncPgConnection,
    property_id: Uuid,
    buyer_id: Uuid,
) -> Result<(PropertyLead, bool), ApiError> {
    if let Some(active) = PropertyLead::find_active_for_pair(conn, property_id, buyer_id).await? {
        return Ok((active, false));
    }

    if let Some(cancelled) = PropertyLead::find_latest_for_pair(conn, property_id, buyer_id).await?
    {
        let restored = PropertyLead::restore(conn, cancelled.id).await?;
        return Ok((restored, true));
    }

    let lead = PropertyLead::insert(
        conn,
        &NewPropertyLead {
            property_id,
            buyer_id,
            agent_id: None,
            status: LEAD_STATUS_PENDING.to_string(),
            interest_cancelled: false,
            notes: None,
        },
    )
    .await?;

    Ok((lead, false))
}

async fn restore_or_create_transaction(
    conn: &mut AsyncPgConnection,
    property_id: Uuid,
    buyer_id: Uuid,
    agent_id: Option<Uuid>,
    lead_id: Uuid,
) -> Result<(Transaction, bool), ApiError> {
    if let Some(active) = Transaction::find_active_for_pair(conn, property_id, buyer_id).await? {
        return Ok((active, false));
    }

    if let Some(cancelled) = Transaction::find_latest_for_pair(conn, property_id, buyer_id).await? {
        // Correct a trailing CANCELLED progress row; older history left as is
        let latest_progress = Transaction::latest_progress(conn, cancelled.id).await?;
        let restored = Transaction::restore(conn, cancelled.id, agent_id, lead_id).await?;

        if latest_progress
            .as_ref()
            .map(|p| p.stage == Stage::Cancelled.as_str())
            .unwrap_or(false)
        {
            Transaction::append_progress(
                conn,
                &NewTransactionProgress {
                    transaction_id: restored.id,
                    stage: Stage::Pending.as_str().to_string(),
                    notes: Some(messages::TXN_RESTORED_BY_BUYER.to_string()),
                    created_by_id: buyer_id,
                },
            )
            .await?;
        }

        return Ok((restored, true));
    }

    let transaction = Transaction::insert(
        conn,
        &NewTransaction {
            property_id,
            buyer_id,
            seller_id: None,
            agent_id,
            status: STATUS_INTERESTED.to_string(),
            stage: Stage::Pending.as_str().to_string(),
            interest_cancelled: false,
            lead_id: Some(lead_id),
        },
    )
    .await?;

    Ok((transaction, false))
}

async fn resolve_reference(
    conn: &mut AsyncPgConnection,
    reference_id: Uuid,
    initial_stage: Stage,
) -> Result<Option<ResolvedTransaction>, ApiError> {
    if let Some(transaction) = Transaction::find_by_id(conn, reference_id).await? {
        return Ok(Some(ResolvedTransaction {
            source: TransactionSource::Direct,
            transaction,
        }));
    }

    if let Some(lead) = PropertyLead::find_by_id(conn, reference_id).await? {
        if let Some(txn_id) = lead.transaction_id {
            if let Some(transaction) = Transaction::find_by_id(conn, txn_id).await? {
                return Ok(Some(ResolvedTransaction {
                    source: TransactionSource::Lead,
                    transaction,
                }));
            }
        }

        let transaction = promote_lead(conn, &lead, initial_stage).await?;
        return Ok(Some(ResolvedTransaction {
            source: TransactionSource::Lead,
            transaction,
        }));
    }

    if let Some(connection) = BuyerAgentConnection::find_by_id(conn, reference_id).await? {
        let seller_id = Property::find_by_id(conn, connection.property_id)
            .await?
            .map(|p| p.user_id);

        let transaction = Transaction::insert(
            conn,
            &NewTransaction {
                property_id: connection.property_id,
                buyer_id: connection.buyer_id,
                seller_id,
                agent_id: Some(connection.agent_id),
                status: STATUS_PRE_DEPOSIT.to_string(),
                stage: initial_stage.as_str().to_string(),
                interest_cancelled: false,
                lead_id: None,
            },
        )
        .await?;

        return Ok(Some(ResolvedTransaction {
            source: TransactionSource::Connection,
            transaction,
        }));
    }

    Ok(None)
}

async fn promote_lead(
    conn: &mut AsyncPgConnection,
    lead: &PropertyLead,
    initial_stage: Stage,
) -> Result<Transaction, ApiError> {
    let seller_id = Property::find_by_id(conn, lead.property_id)
        .await?
        .map(|p| p.user_id);

    let transaction = Transaction::insert(
        conn,
        &NewTransaction {
            property_id: lead.property_id,
            buyer_id: lead.buyer_id,
            seller_id,
            agent_id: lead.agent_id,
            status: STATUS_PRE_DEPOSIT.to_string(),
            stage: initial_stage.as_str().to_string(),
            interest_cancelled: false,
            lead_id: Some(lead.id),
        },
    )
    .await?;

    PropertyLead::link_transaction(conn, lead.id, transaction.id).await?;

    Ok(transaction)
}
