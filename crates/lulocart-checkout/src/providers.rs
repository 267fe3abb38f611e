//! # Provider Traits
//!
//! Object-safe interfaces for every external collaborator the checkout
//! flow touches. The flow never talks to a network or a database directly;
//! it talks to these traits.
//!
//! ## Collaborators
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Checkout Collaborators                              │
//! │                                                                         │
//! │  ┌──────────────┐  address ──► coordinate                               │
//! │  │   Geocoder   │  (distance pricing cannot run before this)            │
//! │  └──────────────┘                                                       │
//! │  ┌──────────────┐  product id ──► live ProductSnapshot                  │
//! │  │ProductCatalog│  (add-to-cart and cart refresh)                       │
//! │  └──────────────┘                                                       │
//! │  ┌──────────────┐  delivery + platform fee settings                     │
//! │  │ ConfigSource │  (fetched once per session, fallback on failure)      │
//! │  └──────────────┘                                                       │
//! │  ┌──────────────┐  create order, status feed, failed-attempt records    │
//! │  │  OrderStore  │  (dropping the feed receiver unsubscribes)            │
//! │  └──────────────┘                                                       │
//! │  ┌──────────────┐  payment intent creation                              │
//! │  │PaymentProc.  │  (order id travels in the intent metadata)            │
//! │  └──────────────┘                                                       │
//! │  ┌──────────────┐  cart persistence at the reducer boundary             │
//! │  │  CartStore   │  (load on resume, save after every action)            │
//! │  └──────────────┘                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The [`memory`] module provides in-memory implementations used by the
//! crate's own tests and useful as doubles downstream.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use lulocart_core::cart::CartState;
use lulocart_core::delivery::DeliveryFeeConfig;
use lulocart_core::distance::Coordinate;
use lulocart_core::types::{DeliveryAddress, FailedOrderRecord, Order, ProductSnapshot};

use crate::config::PlatformFeeConfig;
use crate::error::CheckoutResult;

// =============================================================================
// Wire Types
// =============================================================================

/// One update from the processor's payment status feed.
///
/// `status_label` is the raw feed value and is NOT normalized: settled
/// charges arrive as either `paid` or `confirmed`, cancellations use both
/// spellings, and unknown labels must be ignored (see
/// `PaymentStatus::from_label`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusUpdate {
    pub order_id: String,
    pub status_label: String,
    /// Processor message, present on failures.
    pub message: Option<String>,
}

/// Request for a payment intent. The order id travels in the metadata so
/// the webhook and the status feed correlate without a lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    pub order_id: String,
    pub customer_id: String,
    pub amount_cents: i64,
    pub currency: String,
}

/// A created payment intent, ready for the payment form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub intent_id: String,
    pub client_secret: String,
}

// =============================================================================
// Provider Traits
// =============================================================================

/// Resolves a postal address to a coordinate.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &DeliveryAddress) -> CheckoutResult<Coordinate>;
}

/// Live product lookups against the catalog.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Returns `None` when the product does not exist (deleted), as opposed
    /// to a lookup failure.
    async fn product_by_id(&self, product_id: &str) -> CheckoutResult<Option<ProductSnapshot>>;
}

/// Admin-editable pricing configuration.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn delivery_fee_config(&self) -> CheckoutResult<DeliveryFeeConfig>;
    async fn platform_fee_config(&self) -> CheckoutResult<PlatformFeeConfig>;
}

/// Order persistence and the payment status feed.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create_order(&self, order: &Order) -> CheckoutResult<()>;

    /// Subscribes to payment status updates for one order.
    ///
    /// Dropping the receiver unsubscribes.
    async fn subscribe_payment_status(
        &self,
        order_id: &str,
    ) -> CheckoutResult<mpsc::Receiver<PaymentStatusUpdate>>;

    /// Records a failed payment attempt. Call sites treat this as
    /// fire-and-forget; a failure here must never mask the inline error.
    async fn record_failed_order(&self, record: &FailedOrderRecord) -> CheckoutResult<()>;
}

/// The payment processor boundary.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> CheckoutResult<PaymentIntent>;
}

/// Cart persistence at the reducer boundary.
///
/// The reducer itself never performs I/O; the session saves through this
/// trait after each successful transition.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn load(&self) -> CheckoutResult<Option<CartState>>;
    async fn save(&self, cart: &CartState) -> CheckoutResult<()>;
    async fn clear(&self) -> CheckoutResult<()>;
}

// =============================================================================
// In-Memory Implementations
// =============================================================================

/// In-memory providers for tests and local development.
pub mod memory {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::error::CheckoutError;

    /// Geocoder double returning a fixed coordinate, or failing when unset.
    #[derive(Default)]
    pub struct MemoryGeocoder {
        coordinate: Mutex<Option<Coordinate>>,
    }

    impl MemoryGeocoder {
        pub fn returning(coordinate: Coordinate) -> Self {
            MemoryGeocoder {
                coordinate: Mutex::new(Some(coordinate)),
            }
        }

        pub fn failing() -> Self {
            MemoryGeocoder::default()
        }

        pub fn set(&self, coordinate: Coordinate) {
            *self.coordinate.lock().unwrap() = Some(coordinate);
        }
    }

    #[async_trait]
    impl Geocoder for MemoryGeocoder {
        async fn geocode(&self, address: &DeliveryAddress) -> CheckoutResult<Coordinate> {
            let coordinate = *self.coordinate.lock().unwrap();
            coordinate
                .ok_or_else(|| CheckoutError::Geocoding(format!("no match for {}", address.street)))
        }
    }

    /// Catalog double backed by a map.
    #[derive(Default)]
    pub struct MemoryCatalog {
        products: Mutex<HashMap<String, ProductSnapshot>>,
    }

    impl MemoryCatalog {
        pub fn new() -> Self {
            MemoryCatalog::default()
        }

        pub fn insert(&self, product: ProductSnapshot) {
            self.products
                .lock()
                .unwrap()
                .insert(product.id.clone(), product);
        }

        pub fn remove(&self, product_id: &str) {
            self.products.lock().unwrap().remove(product_id);
        }

        pub fn deactivate(&self, product_id: &str) {
            if let Some(product) = self.products.lock().unwrap().get_mut(product_id) {
                product.is_active = false;
            }
        }

        pub fn set_price(&self, product_id: &str, price_cents: i64) {
            if let Some(product) = self.products.lock().unwrap().get_mut(product_id) {
                product.price_cents = price_cents;
            }
        }
    }

    #[async_trait]
    impl ProductCatalog for MemoryCatalog {
        async fn product_by_id(&self, product_id: &str) -> CheckoutResult<Option<ProductSnapshot>> {
            Ok(self.products.lock().unwrap().get(product_id).cloned())
        }
    }

    /// Config source double; unset values simulate a fetch failure.
    #[derive(Default)]
    pub struct MemoryConfigSource {
        delivery: Mutex<Option<DeliveryFeeConfig>>,
        platform: Mutex<Option<PlatformFeeConfig>>,
    }

    impl MemoryConfigSource {
        pub fn new(delivery: DeliveryFeeConfig, platform: PlatformFeeConfig) -> Self {
            MemoryConfigSource {
                delivery: Mutex::new(Some(delivery)),
                platform: Mutex::new(Some(platform)),
            }
        }

        /// Every fetch fails, as if the config store were unreachable.
        pub fn unreachable() -> Self {
            MemoryConfigSource::default()
        }
    }

    #[async_trait]
    impl ConfigSource for MemoryConfigSource {
        async fn delivery_fee_config(&self) -> CheckoutResult<DeliveryFeeConfig> {
            self.delivery
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| CheckoutError::ConfigFetch("config store unreachable".into()))
        }

        async fn platform_fee_config(&self) -> CheckoutResult<PlatformFeeConfig> {
            self.platform
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| CheckoutError::ConfigFetch("config store unreachable".into()))
        }
    }

    /// Order store double with a manually driven status feed.
    #[derive(Default)]
    pub struct MemoryOrderStore {
        orders: Mutex<Vec<Order>>,
        failed: Mutex<Vec<FailedOrderRecord>>,
        subscribers: Mutex<HashMap<String, mpsc::Sender<PaymentStatusUpdate>>>,
        fail_create: AtomicBool,
    }

    impl MemoryOrderStore {
        pub fn new() -> Self {
            MemoryOrderStore::default()
        }

        /// Makes the next `create_order` calls fail.
        pub fn set_fail_create(&self, fail: bool) {
            self.fail_create.store(fail, Ordering::SeqCst);
        }

        /// Pushes a raw status label into an order's feed.
        /// Returns false when nobody is subscribed.
        pub fn push_status(&self, order_id: &str, label: &str, message: Option<&str>) -> bool {
            let subscribers = self.subscribers.lock().unwrap();
            match subscribers.get(order_id) {
                Some(tx) => tx
                    .try_send(PaymentStatusUpdate {
                        order_id: order_id.to_string(),
                        status_label: label.to_string(),
                        message: message.map(String::from),
                    })
                    .is_ok(),
                None => false,
            }
        }

        pub fn has_subscriber(&self, order_id: &str) -> bool {
            self.subscribers.lock().unwrap().contains_key(order_id)
        }

        pub fn orders(&self) -> Vec<Order> {
            self.orders.lock().unwrap().clone()
        }

        pub fn failed_records(&self) -> Vec<FailedOrderRecord> {
            self.failed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OrderStore for MemoryOrderStore {
        async fn create_order(&self, order: &Order) -> CheckoutResult<()> {
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(CheckoutError::OrderPersistence(
                    "simulated write failure".into(),
                ));
            }
            self.orders.lock().unwrap().push(order.clone());
            Ok(())
        }

        async fn subscribe_payment_status(
            &self,
            order_id: &str,
        ) -> CheckoutResult<mpsc::Receiver<PaymentStatusUpdate>> {
            let (tx, rx) = mpsc::channel(16);
            self.subscribers
                .lock()
                .unwrap()
                .insert(order_id.to_string(), tx);
            Ok(rx)
        }

        async fn record_failed_order(&self, record: &FailedOrderRecord) -> CheckoutResult<()> {
            self.failed.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    /// Payment processor double.
    #[derive(Default)]
    pub struct MemoryPaymentProcessor {
        fail_with: Mutex<Option<String>>,
        requests: Mutex<Vec<PaymentIntentRequest>>,
        counter: Mutex<u32>,
    }

    impl MemoryPaymentProcessor {
        pub fn new() -> Self {
            MemoryPaymentProcessor::default()
        }

        /// Makes intent creation fail with the given processor message.
        pub fn set_fail_with(&self, message: &str) {
            *self.fail_with.lock().unwrap() = Some(message.to_string());
        }

        pub fn requests(&self) -> Vec<PaymentIntentRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentProcessor for MemoryPaymentProcessor {
        async fn create_payment_intent(
            &self,
            request: &PaymentIntentRequest,
        ) -> CheckoutResult<PaymentIntent> {
            self.requests.lock().unwrap().push(request.clone());

            if let Some(message) = self.fail_with.lock().unwrap().clone() {
                return Err(CheckoutError::PaymentIntent(message));
            }

            let mut counter = self.counter.lock().unwrap();
            *counter += 1;
            Ok(PaymentIntent {
                intent_id: format!("pi_{:04}", *counter),
                client_secret: format!("pi_{:04}_secret", *counter),
            })
        }
    }

    /// Cart store double holding at most one persisted cart.
    #[derive(Default)]
    pub struct MemoryCartStore {
        saved: Mutex<Option<CartState>>,
        fail_clear: AtomicBool,
    }

    impl MemoryCartStore {
        pub fn new() -> Self {
            MemoryCartStore::default()
        }

        pub fn with_saved(cart: CartState) -> Self {
            MemoryCartStore {
                saved: Mutex::new(Some(cart)),
                fail_clear: AtomicBool::new(false),
            }
        }

        /// Makes the next `clear` calls fail.
        pub fn set_fail_clear(&self, fail: bool) {
            self.fail_clear.store(fail, Ordering::SeqCst);
        }

        pub fn saved(&self) -> Option<CartState> {
            self.saved.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CartStore for MemoryCartStore {
        async fn load(&self) -> CheckoutResult<Option<CartState>> {
            Ok(self.saved.lock().unwrap().clone())
        }

        async fn save(&self, cart: &CartState) -> CheckoutResult<()> {
            *self.saved.lock().unwrap() = Some(cart.clone());
            Ok(())
        }

        async fn clear(&self) -> CheckoutResult<()> {
            if self.fail_clear.load(Ordering::SeqCst) {
                return Err(CheckoutError::OrderPersistence(
                    "simulated clear failure".into(),
                ));
            }
            *self.saved.lock().unwrap() = None;
            Ok(())
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
