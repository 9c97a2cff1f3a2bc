//! Optimistic read-modify-write over a single node.
//!
//! The backend offers no multi-step transactions, only ETag-conditional PUT.
//! [`Reference::transaction`] builds atomic updates on top of it:
//!
//! 1. Read the current value and its ETag.
//! 2. Run the caller's update function on the value.
//! 3. PUT the result with `If-Match: <etag>`.
//! 4. On 412 the backend returns the value that won, and its ETag, in the
//!    conflict response; go back to step 2 with that state.
//!
//! Attempts are strictly sequential and bounded by
//! [`MAX_TRANSACTION_ATTEMPTS`]. A conflict on the last attempt ends the loop
//! without touching the conflict state. Cancellation or deadline expiry of the
//! [`CallContext`] aborts the loop at the next network call.

use std::error::Error;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use rtdb_protocol::{decode_json, CallContext};
use rtdb_types::ETag;

use crate::error::{DbError, DbResult};
use crate::reference::{Reference, WriteOutcome};

/// Upper bound on update-and-write cycles in one transaction.
pub const MAX_TRANSACTION_ATTEMPTS: usize = 25;

impl Reference {
    /// Atomically replace the value at this node with `update(current)`.
    ///
    /// `update` may run several times, each time with a newer current value,
    /// and must not depend on how often it has been called. Returning `Err`
    /// aborts the transaction without writing ([`DbError::TransactionAborted`]).
    /// Use `Option<T>` as the value type when the node may be empty.
    ///
    /// Returns the value that was committed. Fails with
    /// [`DbError::TransactionExhausted`] when every attempt lost to a
    /// concurrent writer.
    pub async fn transaction<T, F, E>(&self, ctx: &CallContext, update: F) -> DbResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: Fn(T) -> Result<T, E>,
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        let (mut current, mut etag): (T, ETag) = self.get_with_etag(ctx).await?;

        for attempt in 1..=MAX_TRANSACTION_ATTEMPTS {
            let next = update(current).map_err(|e| DbError::TransactionAborted(e.into()))?;

            match self.compare_and_set(ctx, &etag, &next).await? {
                WriteOutcome::Written => {
                    debug!(path = %self.path(), attempt, "transaction committed");
                    return Ok(next);
                }
                WriteOutcome::Conflict { .. } if attempt == MAX_TRANSACTION_ATTEMPTS => break,
                WriteOutcome::Conflict {
                    body,
                    etag: Some(fresh),
                } => {
                    debug!(path = %self.path(), attempt, etag = %fresh, "transaction conflict");
                    current = decode_json(&body)?;
                    etag = fresh;
                }
                WriteOutcome::Conflict { etag: None, .. } => {
                    // no version with the conflict: the body cannot be trusted to be current
                    debug!(
                        path = %self.path(),
                        attempt,
                        "transaction conflict without etag; re-reading"
                    );
                    (current, etag) = self.get_with_etag(ctx).await?;
                }
            }
        }

        warn!(
            path = %self.path(),
            attempts = MAX_TRANSACTION_ATTEMPTS,
            "transaction exhausted retries"
        );
        Err(DbError::TransactionExhausted {
            attempts: MAX_TRANSACTION_ATTEMPTS,
        })
    }
}
