//! Postal addresses.

use serde::{Deserialize, Serialize};

/// A delivery address.
///
/// All fields are plain strings; which fields are required depends on
/// context (door delivery requires `street` and `city`, pickup requires
/// nothing), so requiredness is enforced by checkout validation rather
/// than here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
}

impl Address {
    /// Whether the address carries the fields door delivery requires.
    #[must_use]
    pub fn is_deliverable(&self) -> bool {
        !self.street.trim().is_empty() && !self.city.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deliverable_requires_street_and_city() {
        let mut address = Address {
            street: "12 Carrer de la Palla".to_owned(),
            city: "Barcelona".to_owned(),
            ..Address::default()
        };
        assert!(address.is_deliverable());

        address.city.clear();
        assert!(!address.is_deliverable());

        address.city = "  ".to_owned();
        assert!(!address.is_deliverable());
    }
}
