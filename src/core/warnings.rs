use crate::core::birth_number;
use crate::core::form::TaxFormData;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Form problems that do not stop the calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum Warning {
    /// Neither a 10-digit tax ID nor a valid birth number was entered.
    /// Export is refused in this state.
    MissingIdentity,
    /// A child's birth number fails strict validation.
    InvalidChildBirthNumber { child: usize, reason: String },
    /// A child's birth number yields no birth date, so no bonus accrues.
    UnreadableChildBirthNumber { child: usize },
    /// The spouse's birth number fails strict validation.
    InvalidSpouseBirthNumber { reason: String },
    /// Spouse months outside 1 to 12; the value is clamped.
    SpouseMonthsOutOfRange { months: u32 },
    /// Mortgage months outside 1 to 12.
    MortgageMonthsOutOfRange { months: u32 },
    /// No contract date; the cap for older contracts is applied.
    MissingMortgageContractDate,
    /// A designated parent has no birth number.
    IncompleteParent { parent: usize },
}

impl Warning {
    pub fn message(&self) -> String {
        match self {
            Warning::MissingIdentity => {
                "no valid tax ID or birth number in personal info".to_string()
            }
            Warning::InvalidChildBirthNumber { child, reason } => {
                format!("child {}: birth number is invalid ({})", child + 1, reason)
            }
            Warning::UnreadableChildBirthNumber { child } => {
                format!("child {}: no birth date in birth number, bonus is zero", child + 1)
            }
            Warning::InvalidSpouseBirthNumber { reason } => {
                format!("spouse: birth number is invalid ({})", reason)
            }
            Warning::SpouseMonthsOutOfRange { months } => {
                format!("spouse: {} months is outside 1-12", months)
            }
            Warning::MortgageMonthsOutOfRange { months } => {
                format!("mortgage: {} months is outside 1-12", months)
            }
            Warning::MissingMortgageContractDate => {
                "mortgage: no contract date, the lower cap applies".to_string()
            }
            Warning::IncompleteParent { parent } => {
                format!("parent {}: birth number missing", parent + 1)
            }
        }
    }
}

/// Collect warnings for every enabled section of the form.
pub fn check_form(form: &TaxFormData) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if !form.personal_info.has_identity() {
        warnings.push(Warning::MissingIdentity);
    }

    if form.child_bonus.enabled {
        for (index, child) in form.child_bonus.children.iter().enumerate() {
            let validity = birth_number::validate(&child.birth_number);
            if !validity.valid {
                warnings.push(Warning::InvalidChildBirthNumber {
                    child: index,
                    reason: validity.reason,
                });
            }
            if birth_number::parse(&child.birth_number).is_none() {
                warnings.push(Warning::UnreadableChildBirthNumber { child: index });
            }
        }
    }

    if form.spouse.enabled {
        let validity = birth_number::validate(&form.spouse.birth_number);
        if !validity.valid {
            warnings.push(Warning::InvalidSpouseBirthNumber {
                reason: validity.reason,
            });
        }
        if !(1..=12).contains(&form.spouse.months) {
            warnings.push(Warning::SpouseMonthsOutOfRange {
                months: form.spouse.months,
            });
        }
    }

    if form.mortgage.enabled {
        if !(1..=12).contains(&form.mortgage.months) {
            warnings.push(Warning::MortgageMonthsOutOfRange {
                months: form.mortgage.months,
            });
        }
        if form.mortgage.contract_date.is_none() {
            warnings.push(Warning::MissingMortgageContractDate);
        }
    }

    for (index, parent) in form.parent_allocation.designated().iter().enumerate() {
        if parent.birth_number.trim().is_empty() {
            warnings.push(Warning::IncompleteParent { parent: index });
        }
    }

    warnings
}
