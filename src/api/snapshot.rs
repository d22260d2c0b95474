//! Atomic room snapshot loading.

use crate::domain::{AuthToken, DealId};
use crate::error::ClientError;
use crate::room::RoomSnapshot;

use super::DealApi;

/// Fetches deal, messages, documents and price history concurrently.
///
/// The room is only usable when all four succeed; there is no partial
/// snapshot.
///
/// # Errors
///
/// Returns [`ClientError::RoomLoad`] wrapping the first failing fetch.
pub async fn load_snapshot(
    api: &dyn DealApi,
    token: &AuthToken,
    deal_id: &DealId,
) -> Result<RoomSnapshot, ClientError> {
    let fetched = tokio::try_join!(
        api.deal(token, deal_id),
        api.messages(token, deal_id),
        api.documents(token, deal_id),
        api.price_history(token, deal_id),
    );
    match fetched {
        Ok((deal, messages, documents, price_history)) => Ok(RoomSnapshot {
            deal,
            messages,
            documents,
            price_history,
        }),
        Err(e) => Err(ClientError::RoomLoad {
            deal_id: deal_id.clone(),
            reason: e.to_string(),
        }),
    }
}
