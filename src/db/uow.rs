//! Unit of work: a scoped transaction binding one repository instance.
//!
//! Dropping the unit of work without calling [`UnitOfWork::commit`] rolls the
//! transaction back (SeaORM rolls back open transactions on drop), so no
//! partial writes survive any exit path, including early returns and panics.
//! `commit` and `rollback` consume the value, which rules out double exits.

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::db::repository::PaperRepository;
use crate::errors::Result;

pub struct UnitOfWork {
    txn: DatabaseTransaction,
}

impl UnitOfWork {
    /// Begins a transaction and binds it to a fresh unit of work.
    pub async fn begin(db: &DatabaseConnection) -> Result<Self> {
        let txn = db.begin().await?;
        Ok(Self { txn })
    }

    /// The paper repository bound to this transaction.
    pub fn papers(&self) -> PaperRepository<'_, DatabaseTransaction> {
        PaperRepository::new(&self.txn)
    }

    pub async fn commit(self) -> Result<()> {
        self.txn.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<()> {
        self.txn.rollback().await?;
        Ok(())
    }
}
