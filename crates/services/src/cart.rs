//! Cart removal over the apply-then-reconcile coordinator.

use std::sync::Arc;

use course_core::model::{CartItem, CartItemId};

use crate::api::CartApi;
use crate::error::{CartServiceError, SyncError};
use crate::optimistic::OptimisticCollection;

/// Local mirror of the learner's cart.
pub struct CartService {
    api: Arc<dyn CartApi>,
    items: OptimisticCollection<CartItem>,
}

impl CartService {
    #[must_use]
    pub fn new(api: Arc<dyn CartApi>) -> Self {
        Self {
            api,
            items: OptimisticCollection::new(),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.items.items()
    }

    /// Load the authoritative cart contents.
    ///
    /// # Errors
    ///
    /// Returns the sync failure; the previous collection is kept on error.
    pub async fn load(&mut self) -> Result<(), CartServiceError> {
        let items = self.api.list_cart().await?;
        self.items.replace_all(items);
        Ok(())
    }

    /// Remove one item, optimistically.
    ///
    /// A server `NotFound` is success-equivalent: the item stays removed and
    /// nothing is restored. Removing an item that is not in the local copy
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the sync failure after reconciling the collection.
    pub async fn remove(&mut self, item_id: CartItemId) -> Result<(), CartServiceError> {
        if self.items.remove_where(|i| i.id() == item_id).is_none() {
            return Ok(());
        }
        match self.api.remove_cart_item(item_id).await {
            Ok(()) | Err(SyncError::NotFound) => Ok(()),
            Err(err) => {
                self.reconcile().await;
                Err(err.into())
            }
        }
    }

    /// Best-effort re-fetch; the original error is already being surfaced.
    async fn reconcile(&mut self) {
        if let Ok(items) = self.api.list_cart().await {
            self.items.replace_all(items);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::CourseId;

    use crate::api::InMemoryApi;

    fn item(title: &str) -> CartItem {
        CartItem::new(CartItemId::generate(), CourseId::generate(), title, 4_900)
    }

    #[tokio::test]
    async fn remove_converges_with_the_server() {
        let api = InMemoryApi::new();
        let keep = item("Keep");
        let drop = item("Drop");
        api.seed_cart(vec![keep.clone(), drop.clone()]);

        let mut cart = CartService::new(Arc::new(api.clone()));
        cart.load().await.unwrap();
        cart.remove(drop.id()).await.unwrap();

        assert_eq!(cart.items(), &[keep.clone()]);
        assert_eq!(api.server_cart(), vec![keep]);
    }

    #[tokio::test]
    async fn remove_not_found_keeps_the_item_removed() {
        let api = InMemoryApi::new();
        let gone = item("Already gone");
        let gone_id = gone.id();

        let mut cart = CartService::new(Arc::new(api.clone()));
        // local copy has the item, server already lost it
        api.seed_cart(vec![gone]);
        cart.load().await.unwrap();
        api.seed_cart(Vec::new());

        cart.remove(gone_id).await.unwrap();
        assert!(cart.items().is_empty());
    }

    #[tokio::test]
    async fn failed_remove_restores_from_the_server() {
        let api = InMemoryApi::new();
        let keep = item("Keep");
        api.seed_cart(vec![keep.clone()]);

        let mut cart = CartService::new(Arc::new(api.clone()));
        cart.load().await.unwrap();

        api.fail_next(SyncError::Transient("down".into()));
        let err = cart.remove(keep.id()).await.unwrap_err();

        assert!(matches!(err, CartServiceError::Sync(SyncError::Transient(_))));
        assert_eq!(cart.items(), &[keep]);
    }

    #[tokio::test]
    async fn removing_an_unknown_item_is_a_no_op() {
        let api = InMemoryApi::new();
        let mut cart = CartService::new(Arc::new(api.clone()));
        cart.load().await.unwrap();

        cart.remove(CartItemId::generate()).await.unwrap();
        assert!(cart.items().is_empty());
    }
}
