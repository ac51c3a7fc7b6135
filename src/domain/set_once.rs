//! Write-once slot for identity-like values

use once_cell::sync::OnceCell;

use super::DomainError;

/// A value that may be assigned exactly once.
///
/// Reassignment fails with [`DomainError::ImmutableConfiguration`] instead of
/// silently replacing the value.
#[derive(Debug, Clone)]
pub struct SetOnce<T> {
    label: &'static str,
    cell: OnceCell<T>,
}

impl<T> SetOnce<T> {
    /// Create an empty slot; `label` names the value in error messages
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            cell: OnceCell::new(),
        }
    }

    /// Create a slot that already holds `value`
    pub fn with_value(label: &'static str, value: T) -> Self {
        Self {
            label,
            cell: OnceCell::with_value(value),
        }
    }

    pub fn set(&self, value: T) -> Result<(), DomainError> {
        self.cell.set(value).map_err(|_| {
            DomainError::immutable_configuration(format!(
                "Cannot reset the {} once it has been assigned",
                self.label
            ))
        })
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn into_inner(self) -> Option<T> {
        self.cell.into_inner()
    }
}
