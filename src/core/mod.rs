pub mod birth_number;
pub mod constants;
pub mod decimal;
pub mod form;
pub mod result;
pub mod warnings;

// Flat public surface for domain types and functions.
pub use birth_number::BirthNumberValidity;
pub use constants::{TaxConstants, TaxYear, CURRENT_TAX_YEAR};
pub use form::{
    ChildBonus, ChildEntry, Currency, DividendEntry, EmploymentIncome, ForeignDividends,
    FormError, FormField, MortgageInterest, MutualFundSales, ParentChoice, ParentInfo,
    ParentTaxAllocation, PartialTaxForm, PersonalInfo, SaleEntry, SpouseNczd, StockSales,
    TaxFormData, TwoPercentAllocation, FORM_VERSION,
};
pub use result::{ChildBonusBreakdown, ResultRow, TaxCalculationResult};
pub use warnings::{check_form, Warning};
