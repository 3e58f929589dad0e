//! Transaction helper shared by every backend.

use crate::error::DbError;
use crate::traits::DatabaseTransaction;

/// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
/// error.
///
/// A failed `COMMIT` is followed by a `ROLLBACK` and the commit error is
/// returned. A failed `ROLLBACK` after a body error is
/// logged and the body's error is returned.
pub fn with_transaction<D, F, T, E>(db: &D, body: F) -> Result<T, E>
where
    D: DatabaseTransaction + ?Sized,
    F: FnOnce(&D) -> Result<T, E>,
    E: From<DbError>,
{
    db.begin()?;

    match body(db) {
        Ok(value) => {
            if let Err(commit_err) = db.commit() {
                if let Err(rollback_err) = db.rollback() {
                    log::warn!("ROLLBACK after failed COMMIT also failed: {rollback_err}");
                }
                return Err(commit_err.into());
            }
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = db.rollback() {
                log::warn!("ROLLBACK failed: {rollback_err}");
            }
            Err(err)
        }
    }
}
