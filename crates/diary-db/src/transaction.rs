//! Start/commit/rollback pass-through.
//!
//! The data-access layer does not coordinate statements on its own; callers
//! that need several operations to commit together open a transaction on
//! their connection and pass `&mut *tx` to each [`Table`](crate::Table) call.

use sqlx::{Connection, MySql, MySqlConnection, Transaction};
use tracing::{debug, error};

use crate::error::DbResult;

pub async fn begin(conn: &mut MySqlConnection) -> DbResult<Transaction<'_, MySql>> {
    let tx = conn.begin().await.map_err(|e| {
        error!(error = %e, "Failed to start transaction");
        e
    })?;
    debug!("Transaction started");
    Ok(tx)
}

pub async fn commit(tx: Transaction<'_, MySql>) -> DbResult<()> {
    tx.commit().await.map_err(|e| {
        error!(error = %e, "Failed to commit transaction");
        e
    })?;
    debug!("Transaction committed");
    Ok(())
}

pub async fn rollback(tx: Transaction<'_, MySql>) -> DbResult<()> {
    tx.rollback().await.map_err(|e| {
        error!(error = %e, "Failed to roll back transaction");
        e
    })?;
    debug!("Transaction rolled back");
    Ok(())
}
