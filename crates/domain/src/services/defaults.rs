//! Feature toggles seeded at startup.
//!
//! Other parts of the application reference these keys by name, so they must
//! stay stable.

use crate::models::NewFeatureToggle;

/// A toggle created at bootstrap when its key is absent.
#[derive(Debug, Clone, Copy)]
pub struct DefaultFeature {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
}

impl DefaultFeature {
    pub fn to_new_toggle(&self) -> NewFeatureToggle {
        NewFeatureToggle {
            feature_key: self.key.to_string(),
            feature_name: self.name.to_string(),
            description: Some(self.description.to_string()),
            is_enabled: true,
            category: Some(self.category.to_string()),
        }
    }
}

pub const DEFAULT_FEATURES: &[DefaultFeature] = &[
    DefaultFeature {
        key: "dark_mode",
        name: "Dark Mode",
        description: "Allow users to switch the interface to a dark theme",
        category: "ui",
    },
    DefaultFeature {
        key: "event_creation",
        name: "Event Creation",
        description: "Allow organizers to create new sporting events",
        category: "events",
    },
    DefaultFeature {
        key: "delete_events",
        name: "Delete Events",
        description: "Allow organizers to delete events they created",
        category: "events",
    },
    DefaultFeature {
        key: "carpool_matching",
        name: "Carpool Matching",
        description: "Match drivers and passengers attending the same event",
        category: "events",
    },
    DefaultFeature {
        key: "event_messaging",
        name: "Event Messaging",
        description: "Send messages to the participants of an event",
        category: "communication",
    },
    DefaultFeature {
        key: "email_invitations",
        name: "Email Invitations",
        description: "Invite participants to events by email",
        category: "communication",
    },
    DefaultFeature {
        key: "participant_import",
        name: "Participant Import",
        description: "Import participant lists from CSV or Excel files",
        category: "data",
    },
    DefaultFeature {
        key: "excel_export",
        name: "Excel Export",
        description: "Export event participants to an Excel workbook",
        category: "data",
    },
    DefaultFeature {
        key: "subscriptions",
        name: "Subscriptions",
        description: "Paid organization subscriptions and checkout",
        category: "billing",
    },
    DefaultFeature {
        key: "organization_admin",
        name: "Organization Admin",
        description: "Organization administration dashboard",
        category: "administration",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use validator::Validate;

    #[test]
    fn test_default_keys_are_unique() {
        let keys: HashSet<_> = DEFAULT_FEATURES.iter().map(|f| f.key).collect();
        assert_eq!(keys.len(), DEFAULT_FEATURES.len());
    }

    #[test]
    fn test_default_features_are_valid_and_enabled() {
        for feature in DEFAULT_FEATURES {
            let toggle = feature.to_new_toggle();
            assert!(toggle.validate().is_ok(), "{} failed validation", feature.key);
            assert!(toggle.is_enabled);
        }
    }

    #[test]
    fn test_referenced_keys_present() {
        for key in ["dark_mode", "delete_events", "event_messaging"] {
            assert!(DEFAULT_FEATURES.iter().any(|f| f.key == key), "missing {key}");
        }
    }
}
