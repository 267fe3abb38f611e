//! # lulocart-checkout: Async Checkout Orchestration for Lulocart
//!
//! Everything between a cart and a confirmed order: the checkout session,
//! order submission, and the payment watcher. All money math and cart
//! semantics live in `lulocart-core`; this crate adds time, concurrency,
//! and the seams to the outside world.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          lulocart-checkout                              │
//! │                                                                         │
//! │   ┌─────────────────┐    build_order    ┌─────────────────────────┐     │
//! │   │ CheckoutSession │ ────────────────► │     order::submit       │     │
//! │   │  cart actions   │                   │ create + payment intent │     │
//! │   │  resume         │                   └───────────┬─────────────┘     │
//! │   │ confirm_address │                               │                   │
//! │   └────────┬────────┘                   ┌───────────▼─────────────┐     │
//! │            │                            │      PaymentFlow        │     │
//! │            │                            │  watcher + outcome      │     │
//! │            │                            └───────────┬─────────────┘     │
//! │   ┌────────▼────────────────────────────────────────▼─────────────┐     │
//! │   │                      provider traits                          │     │
//! │   │  Geocoder · ProductCatalog · ConfigSource · OrderStore        │     │
//! │   │  PaymentProcessor · CartStore                                 │     │
//! │   └───────────────────────────────────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`session`]: Cart mutations, cart restore, address confirmation
//! - [`order`]: Order assembly and submission
//! - [`payment`]: Payment watcher and completion/failure handling
//! - [`config`]: Pricing configuration with fallback defaults
//! - [`providers`]: Collaborator traits and in-memory test doubles
//! - [`error`]: Checkout error taxonomy
//!
//! ## Design Principles
//! 1. **Traits at the edges**: every external system sits behind a trait in
//!    [`providers`]; the flows never import an SDK.
//! 2. **State advances only on success**: the session's cart moves only
//!    after the reducer and the save both succeed.
//! 3. **Exactly-once completion**: racing success triggers are arbitrated
//!    by [`CompletionGuard`]; an order can never complete twice.
//! 4. **Checkout never blocks on config**: pricing config failures fall
//!    back to compiled-in defaults with a warning.

pub mod config;
pub mod error;
pub mod order;
pub mod payment;
pub mod providers;
pub mod session;

pub use config::{load_pricing_configs, PlatformFeeConfig, PricingConfigs};
pub use error::{CheckoutError, CheckoutResult};
pub use order::{build_order, submit, PaymentAttempt};
pub use payment::{
    CompletionGuard, CompletionTrigger, PaymentEvent, PaymentFlow, PaymentOutcome, PaymentWatcher,
    PaymentWatcherHandle, WatcherOptions,
};
pub use providers::{
    CartStore, ConfigSource, Geocoder, OrderStore, PaymentIntent, PaymentIntentRequest,
    PaymentProcessor, PaymentStatusUpdate, ProductCatalog,
};
pub use session::{
    resolve_address, AddressConfirmation, CheckoutSession, CustomerProfile, ResolvedAddress,
};
