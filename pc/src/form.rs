//! Payment form instrumentation
//!
//! Models the parts of a checkout form the coordinator touches: required
//! field flags set on blur, and the submit control's loading state. The form
//! itself belongs to the page; these types only carry presentational state.

use tracing::debug;

/// Action fragment identifying a payment form
pub const PAYMENT_ACTION_MARKER: &str = "pagar";

/// One input or select element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
    pub required: bool,
    /// Presentational error flag, set by validation
    pub invalid: bool,
}

impl FormField {
    pub fn new(name: impl Into<String>, value: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            required,
            invalid: false,
        }
    }
}

/// Validate one field, updating its error flag
///
/// A required field whose value is blank after trimming is invalid.
pub fn validate_field(field: &mut FormField) -> bool {
    let valid = !(field.required && field.value.trim().is_empty());
    field.invalid = !valid;
    valid
}

/// Submit button or input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControl {
    pub label: String,
    pub disabled: bool,
}

impl SubmitControl {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            disabled: false,
        }
    }
}

/// A checkout form observed by the coordinator
#[derive(Debug, Clone)]
pub struct PaymentForm {
    pub action: String,
    /// Explicit data-payment marker
    pub data_payment: bool,
    pub fields: Vec<FormField>,
    pub submit: Option<SubmitControl>,
}

impl PaymentForm {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            data_payment: false,
            fields: Vec::new(),
            submit: None,
        }
    }

    pub fn with_field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_submit(mut self, submit: SubmitControl) -> Self {
        self.submit = Some(submit);
        self
    }

    pub fn marked_payment(mut self) -> Self {
        self.data_payment = true;
        self
    }

    /// Forms posting to a payment action, or explicitly marked, are instrumented
    pub fn is_payment_form(&self) -> bool {
        self.data_payment || self.action.contains(PAYMENT_ACTION_MARKER)
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Blur handler: validate the named field
    ///
    /// Returns `None` when no such field exists.
    pub fn on_blur(&mut self, name: &str) -> Option<bool> {
        let field = self.fields.iter_mut().find(|f| f.name == name)?;
        let valid = validate_field(field);
        debug!(%name, valid, "PaymentForm::on_blur: validated field");
        Some(valid)
    }

    /// Submit handler: put the submit control into its loading state
    ///
    /// Never blocks the submission itself.
    pub fn on_submit(&mut self, processing_label: &str) {
        debug!(action = %self.action, "PaymentForm::on_submit: called");
        if let Some(submit) = self.submit.as_mut() {
            submit.disabled = true;
            submit.label = processing_label.to_string();
        }
    }

    /// Validate every field; true when all pass
    pub fn validate_all(&mut self) -> bool {
        self.fields.iter_mut().fold(true, |all, field| validate_field(field) && all)
    }
}
