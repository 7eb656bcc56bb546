/// Demo payloads and their FCM message envelopes
///
/// The payloads are illustrative constants, not derived from real
/// transactions. Adding an entry to [`DEMO_PAYLOADS`] adds a message to
/// every fan-out without touching the dispatch step.
use firebase_shared::{AndroidConfig, AndroidPriority, ApnsConfig, ApnsPayload, Aps, Message};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::models::{NotificationPayload, TransactionType};

pub type PayloadBuilder = fn() -> NotificationPayload;

/// Payload builders, in submission order
pub const DEMO_PAYLOADS: [PayloadBuilder; 2] = [expense_payload, income_payload];

fn expense_payload() -> NotificationPayload {
    NotificationPayload {
        source: "Touch 'n Go eWallet".to_string(),
        text: "Payment: You have paid RM13.50 for BOOST JUICEBARS - CITY JNCTN.".to_string(),
        kind: TransactionType::Expense,
    }
}

fn income_payload() -> NotificationPayload {
    NotificationPayload {
        source: "Maybank2u".to_string(),
        text: "You've received money! COCO TEOH HUI HUI has transferred RM500.00 to you."
            .to_string(),
        kind: TransactionType::Income,
    }
}

pub fn demo_payloads() -> Vec<NotificationPayload> {
    DEMO_PAYLOADS.iter().map(|build| build()).collect()
}

/// Platform-specific delivery hints attached to every message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryHints {
    /// Emit `content-available: 1`; otherwise the legacy
    /// `contcentAvailable: true` key is sent, which APNs ignores
    pub apns_content_available: bool,
}

impl DeliveryHints {
    fn android(&self) -> AndroidConfig {
        AndroidConfig {
            priority: AndroidPriority::High,
        }
    }

    fn apns(&self) -> ApnsConfig {
        let aps = if self.apns_content_available {
            Aps {
                content_available: Some(1),
                custom: BTreeMap::new(),
            }
        } else {
            Aps {
                content_available: None,
                custom: BTreeMap::from([("contcentAvailable".to_string(), Value::Bool(true))]),
            }
        };
        ApnsConfig {
            payload: ApnsPayload { aps },
        }
    }
}

/// One data message per payload, all addressed to `token`
pub fn build_messages(
    token: &str,
    payloads: &[NotificationPayload],
    hints: DeliveryHints,
) -> Vec<Message> {
    payloads
        .iter()
        .map(|payload| Message {
            token: token.to_string(),
            data: payload.to_data(),
            android: Some(hints.android()),
            apns: Some(hints.apns()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_demo_payloads_are_expense_then_income() {
        let payloads = demo_payloads();
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].kind, TransactionType::Expense);
        assert_eq!(payloads[0].source, "Touch 'n Go eWallet");
        assert_eq!(payloads[1].kind, TransactionType::Income);
        assert_eq!(payloads[1].source, "Maybank2u");
    }

    #[test]
    fn test_demo_payloads_are_deterministic() {
        assert_eq!(demo_payloads(), demo_payloads());
    }

    #[test]
    fn test_messages_share_token() {
        let messages = build_messages("abc123", &demo_payloads(), DeliveryHints::default());

        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m.token == "abc123"));
        assert_eq!(messages[0].data["type"], "expense");
        assert_eq!(messages[1].data["type"], "income");
    }

    #[test]
    fn test_legacy_apns_hint_is_preserved() {
        let messages = build_messages("t", &demo_payloads(), DeliveryHints::default());
        let value = serde_json::to_value(&messages[0]).unwrap();

        assert_eq!(value["android"], json!({ "priority": "high" }));
        assert_eq!(
            value["apns"],
            json!({ "payload": { "aps": { "contcentAvailable": true } } })
        );
    }

    #[test]
    fn test_content_available_hint() {
        let hints = DeliveryHints {
            apns_content_available: true,
        };
        let messages = build_messages("t", &demo_payloads(), hints);
        let value = serde_json::to_value(&messages[1]).unwrap();

        assert_eq!(
            value["apns"],
            json!({ "payload": { "aps": { "content-available": 1 } } })
        );
    }
}
