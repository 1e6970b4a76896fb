//! User Profile Data Structure
//!
//! Profiles are keyed by the identity-service uid. Reputation fields
//! (`rating`, `totalRatings`, `totalSwaps`, `trustScore`) are seeded when the
//! profile is first written and never reset by later profile updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Trust score every new profile starts with
pub const INITIAL_TRUST_SCORE: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcm_token: Option<String>,
    #[serde(default)]
    pub verification_documents: Vec<Value>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub total_ratings: u64,
    #[serde(default)]
    pub total_swaps: u64,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub verification_status: String,
    #[serde(default)]
    pub trust_score: u32,
    /// Free-form settings; notification switches are read from here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Notification switches with defaults applied
    pub fn notification_settings(&self) -> NotificationSettings {
        self.settings
            .as_ref()
            .and_then(|settings| serde_json::from_value(settings.clone()).ok())
            .unwrap_or_default()
    }
}

/// Per-channel notification switches stored under `settings`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub sms_notifications: bool,
    pub exchange_offers: bool,
    pub likes: bool,
    pub messages: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            push_notifications: true,
            sms_notifications: false,
            exchange_offers: true,
            likes: true,
            messages: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_notification_settings_defaults() {
        let profile = UserProfile::default();
        let settings = profile.notification_settings();
        assert!(settings.push_notifications);
        assert!(!settings.sms_notifications);
    }

    #[test]
    fn test_partial_settings_keep_defaults() {
        let profile = UserProfile {
            settings: Some(json!({ "pushNotifications": false, "theme": "dark" })),
            ..Default::default()
        };
        let settings = profile.notification_settings();
        assert!(!settings.push_notifications);
        assert!(settings.email_notifications);
        assert!(settings.messages);
    }

    #[test]
    fn test_photo_url_wire_name() {
        let profile: UserProfile = serde_json::from_value(json!({
            "uid": "u1",
            "photoURL": "https://cdn.example/p.png"
        }))
        .unwrap();
        assert_eq!(profile.photo_url.as_deref(), Some("https://cdn.example/p.png"));
    }
}
