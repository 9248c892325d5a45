//! Schedule resolution.
//!
//! Turns a method selection into concrete durations and a cycle count, and
//! keeps the user's custom values between selections.

use tracing::debug;

use crate::types::{CustomField, CustomValues, Method, MethodName};

use super::error::TimerError;

/// Resolves method selections and owns the editable custom method.
///
/// Selecting a built-in method copies its values into the custom slot, so
/// switching back to `custom` afterwards starts from the preset's numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleResolver {
    /// Currently selected method
    selected: MethodName,
    /// Stored custom values (always valid)
    custom: Method,
}

impl ScheduleResolver {
    /// Creates a resolver with `pomodoro` selected.
    pub fn new() -> Self {
        Self {
            selected: MethodName::Pomodoro,
            custom: Method::POMODORO,
        }
    }

    /// Resolves `name` into a method and makes it the selection.
    ///
    /// For `custom`, `values` replaces the stored custom method when given;
    /// otherwise the stored one is returned. `values` is ignored for built-in
    /// names.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidConfiguration`] if custom values are not
    /// all positive. Neither the selection nor the stored values change.
    pub fn resolve(
        &mut self,
        name: MethodName,
        values: Option<CustomValues>,
    ) -> Result<Method, TimerError> {
        let method = match name.preset() {
            Some(preset) => preset,
            None => match values {
                Some(values) => Method::try_from(values)?,
                None => self.custom,
            },
        };

        self.selected = name;
        self.custom = method;
        debug!(method = %name, work = method.work_minutes(), brk = method.break_minutes(), cycles = method.cycles(), "Resolved method");

        Ok(method)
    }

    /// Overwrites one custom field and selects `custom`.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidConfiguration`] for non-positive values;
    /// nothing changes in that case.
    pub fn edit_custom(&mut self, field: CustomField, value: i64) -> Result<Method, TimerError> {
        self.edit_custom_fields(&[(field, value)])
    }

    /// Overwrites several custom fields at once and selects `custom`.
    ///
    /// Every value is validated before anything is stored.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidConfiguration`] for the first
    /// non-positive value; nothing changes in that case.
    pub fn edit_custom_fields(
        &mut self,
        edits: &[(CustomField, i64)],
    ) -> Result<Method, TimerError> {
        let mut method = self.custom;
        for &(field, value) in edits {
            method = method.with_field(field, field.validate(value)?);
        }

        self.custom = method;
        self.selected = MethodName::Custom;
        Ok(method)
    }

    /// Returns the selected method name.
    pub fn selected(&self) -> MethodName {
        self.selected
    }

    /// Returns the values of the selected method.
    pub fn active(&self) -> Method {
        self.selected.preset().unwrap_or(self.custom)
    }

    /// Returns the stored custom values.
    pub fn custom(&self) -> Method {
        self.custom
    }
}

impl Default for ScheduleResolver {
    fn default() -> Self {
        Self::new()
    }
}
