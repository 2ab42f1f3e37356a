//! Morphology store port.

use crate::morph::Morphology;

/// Loads and persists morphologies.
pub trait MorphologyStore: Send + Sync {
    /// Loads every morphology of the checkout, in a stable order.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or is not a morphology.
    fn load_all(&self) -> Result<Vec<Morphology>, Box<dyn std::error::Error + Send + Sync>>;

    /// Writes one morphology back to where it was loaded from.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    fn save(&self, morph: &Morphology) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
