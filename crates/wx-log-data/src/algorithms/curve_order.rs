//! # Curve Order
//!
//! Keeps the index curve at the front of a log's curve list.

use crate::domain::{CurveInfo, CurveSpecification};

/// Anything that names a curve by mnemonic.
pub trait HasMnemonic {
    /// Curve mnemonic.
    fn mnemonic(&self) -> &str;
}

impl HasMnemonic for CurveInfo {
    fn mnemonic(&self) -> &str {
        &self.mnemonic
    }
}

impl HasMnemonic for CurveSpecification {
    fn mnemonic(&self) -> &str {
        &self.mnemonic
    }
}

impl HasMnemonic for String {
    fn mnemonic(&self) -> &str {
        self
    }
}

/// Move the index curve to position 0, keeping the relative order of every
/// other curve.
///
/// The list is returned untouched when the index curve is already first,
/// when `index_curve` is `None`, or when no curve carries that mnemonic.
/// Reordering happens in place.
pub fn index_curve_first<T: HasMnemonic>(mut curves: Vec<T>, index_curve: Option<&str>) -> Vec<T> {
    let Some(index_curve) = index_curve else {
        return curves;
    };
    if curves.first().map_or(true, |c| c.mnemonic() == index_curve) {
        return curves;
    }
    if let Some(position) = curves.iter().position(|c| c.mnemonic() == index_curve) {
        curves[..=position].rotate_right(1);
    }
    curves
}
