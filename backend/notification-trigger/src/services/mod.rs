pub mod identity;
pub mod payloads;
pub mod push_gateway;
pub mod token_store;
pub mod trigger;

pub use identity::{FirebaseIdentityVerifier, IdentityVerifier};
pub use payloads::{build_messages, demo_payloads, DeliveryHints, DEMO_PAYLOADS};
pub use push_gateway::{FcmPushGateway, PushGateway};
pub use token_store::{FirestoreTokenStore, TokenStore};
pub use trigger::NotificationTrigger;
