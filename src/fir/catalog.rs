//! Commonly applied BNS sections offered for quick selection on the form.

use super::models::{Charge, ChargeCode};

const COMMON_BNS_SECTIONS: [(&str, &str); 8] = [
    ("103", "Murder"),
    ("115", "Voluntarily causing hurt"),
    ("303", "Theft"),
    ("308", "Extortion"),
    ("318", "Cheating"),
    ("351", "Criminal intimidation"),
    ("64", "Rape"),
    ("79", "Dowry death"),
];

/// The quick-selection catalog, in display order.
pub fn common_charges() -> Vec<Charge> {
    COMMON_BNS_SECTIONS
        .iter()
        .map(|(section, description)| Charge::new(section, description, ChargeCode::Bns))
        .collect()
}
