use crate::core::birth_number;
use crate::core::constants::CURRENT_TAX_YEAR;
use crate::core::decimal::lenient;
use chrono::NaiveDate;
use dpfo_derive::FieldSchema;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Version stamped on every form produced by [`TaxFormData::merge_defaults`].
///
/// Version 1 forms predate the parent allocation section.
pub const FORM_VERSION: u32 = 2;

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("form version {0} is newer than the supported version {FORM_VERSION}")]
    UnsupportedVersion(u32),
    #[error("personal info has no valid tax ID (DIČ) or birth number")]
    MissingIdentity,
}

/// Description of one form field, generated by `#[derive(FieldSchema)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub kind: &'static str,
    pub optional: bool,
    pub description: &'static str,
}

/// Complete input of one tax return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TaxFormData {
    pub version: u32,
    pub personal_info: PersonalInfo,
    pub employment: EmploymentIncome,
    pub dividends: ForeignDividends,
    pub mutual_funds: MutualFundSales,
    pub stocks: StockSales,
    pub mortgage: MortgageInterest,
    pub spouse: SpouseNczd,
    pub child_bonus: ChildBonus,
    pub two_percent: TwoPercentAllocation,
    pub parent_allocation: ParentTaxAllocation,
}

impl Default for TaxFormData {
    fn default() -> Self {
        TaxFormData::merge_defaults(PartialTaxForm::default())
    }
}

/// Form as stored by older clients or produced by the XML parser: any
/// section may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PartialTaxForm {
    pub version: Option<u32>,
    pub personal_info: Option<PersonalInfo>,
    pub employment: Option<EmploymentIncome>,
    pub dividends: Option<ForeignDividends>,
    pub mutual_funds: Option<MutualFundSales>,
    pub stocks: Option<StockSales>,
    pub mortgage: Option<MortgageInterest>,
    pub spouse: Option<SpouseNczd>,
    pub child_bonus: Option<ChildBonus>,
    pub two_percent: Option<TwoPercentAllocation>,
    pub parent_allocation: Option<ParentTaxAllocation>,
}

impl TaxFormData {
    /// Fill every missing section with its default and stamp the current version.
    pub fn merge_defaults(partial: PartialTaxForm) -> TaxFormData {
        let version = partial.version.unwrap_or(1);
        if version < FORM_VERSION {
            log::debug!("upgrading form from version {} to {}", version, FORM_VERSION);
        }

        let parent_allocation = if version >= 2 {
            partial.parent_allocation.unwrap_or_default()
        } else {
            if partial.parent_allocation.is_some() {
                log::warn!("ignoring parent allocation in a version {} form", version);
            }
            ParentTaxAllocation::default()
        };

        TaxFormData {
            version: FORM_VERSION,
            personal_info: partial.personal_info.unwrap_or_default(),
            employment: partial.employment.unwrap_or_default(),
            dividends: partial.dividends.unwrap_or_default(),
            mutual_funds: partial.mutual_funds.unwrap_or_default(),
            stocks: partial.stocks.unwrap_or_default(),
            mortgage: partial.mortgage.unwrap_or_default(),
            spouse: partial.spouse.unwrap_or_default(),
            child_bonus: partial.child_bonus.unwrap_or_default(),
            two_percent: partial.two_percent.unwrap_or_default(),
            parent_allocation,
        }
    }

    /// Read a (possibly partial) form from JSON and merge it with defaults.
    pub fn read_json<R: Read>(reader: R) -> anyhow::Result<TaxFormData> {
        let partial: PartialTaxForm = serde_json::from_reader(reader)?;
        if let Some(version) = partial.version.filter(|v| *v > FORM_VERSION) {
            return Err(FormError::UnsupportedVersion(version).into());
        }
        Ok(TaxFormData::merge_defaults(partial))
    }

    /// A return can only be filed with an identified taxpayer.
    pub fn require_identity(&self) -> Result<(), FormError> {
        if self.personal_info.has_identity() {
            Ok(())
        } else {
            Err(FormError::MissingIdentity)
        }
    }
}

/// Field listings of every section, in form order.
pub fn field_sections() -> Vec<(&'static str, &'static [FormField])> {
    vec![
        (PersonalInfo::section_name(), PersonalInfo::field_schema()),
        (EmploymentIncome::section_name(), EmploymentIncome::field_schema()),
        (ForeignDividends::section_name(), ForeignDividends::field_schema()),
        (DividendEntry::section_name(), DividendEntry::field_schema()),
        (MutualFundSales::section_name(), MutualFundSales::field_schema()),
        (StockSales::section_name(), StockSales::field_schema()),
        (SaleEntry::section_name(), SaleEntry::field_schema()),
        (MortgageInterest::section_name(), MortgageInterest::field_schema()),
        (SpouseNczd::section_name(), SpouseNczd::field_schema()),
        (ChildBonus::section_name(), ChildBonus::field_schema()),
        (ChildEntry::section_name(), ChildEntry::field_schema()),
        (TwoPercentAllocation::section_name(), TwoPercentAllocation::field_schema()),
        (ParentTaxAllocation::section_name(), ParentTaxAllocation::field_schema()),
        (ParentInfo::section_name(), ParentInfo::field_schema()),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, FieldSchema)]
#[serde(default)]
pub struct PersonalInfo {
    /// Tax identification number (DIČ), or the birth number when none is assigned
    pub dic: String,
    pub first_name: String,
    pub last_name: String,
    /// Academic title written before the name
    pub title_before: String,
    /// Academic title written after the name
    pub title_after: String,
    pub street: String,
    pub house_number: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    pub phone: String,
    pub email: String,
}

impl Default for PersonalInfo {
    fn default() -> Self {
        PersonalInfo {
            dic: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            title_before: String::new(),
            title_after: String::new(),
            street: String::new(),
            house_number: String::new(),
            postal_code: String::new(),
            city: String::new(),
            country: "Slovenská republika".to_string(),
            phone: String::new(),
            email: String::new(),
        }
    }
}

impl PersonalInfo {
    /// A 10-digit tax ID or a valid birth number identifies the taxpayer.
    pub fn has_identity(&self) -> bool {
        let dic = self.dic.trim();
        let is_tax_id = dic.len() == 10 && dic.chars().all(|c| c.is_ascii_digit());
        is_tax_id || birth_number::validate(dic).valid
    }
}

/// Income from dependent activity (§5).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema, FieldSchema)]
#[serde(default)]
pub struct EmploymentIncome {
    pub enabled: bool,
    /// Gross employment income, r.36
    #[serde(with = "lenient")]
    #[schemars(with = "String")]
    pub gross_income: Decimal,
    /// Income from work agreements included in the gross income, r.36a
    #[serde(with = "lenient")]
    #[schemars(with = "String")]
    pub agreement_income: Decimal,
    /// Mandatory social and health insurance paid by the employee, r.37
    #[serde(with = "lenient")]
    #[schemars(with = "String")]
    pub mandatory_insurance: Decimal,
    /// Tax advances withheld by employers, r.131
    #[serde(with = "lenient")]
    #[schemars(with = "String")]
    pub tax_advances: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub enum Currency {
    #[default]
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "CZK")]
    Czk,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Czk => "CZK",
        }
    }

    /// Currency in which dividends from the given ISO-numeric country are paid.
    pub fn for_country(country_code: &str) -> Currency {
        match country_code.trim() {
            "840" => Currency::Usd,
            "203" => Currency::Czk,
            _ => Currency::Eur,
        }
    }
}

/// One dividend payment as reported by a broker statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema, FieldSchema)]
#[serde(default)]
pub struct DividendEntry {
    pub ticker: String,
    /// ISO 3166 numeric code of the source country, e.g. 840 for the USA
    pub country_code: String,
    pub currency: Currency,
    /// Gross dividend in the original currency
    #[serde(with = "lenient")]
    #[schemars(with = "String")]
    pub gross_amount: Decimal,
    /// Tax withheld abroad in the original currency
    #[serde(with = "lenient")]
    #[schemars(with = "String")]
    pub withheld_tax: Decimal,
    /// Gross dividend in EUR; derived from the original amount when zero
    #[serde(with = "lenient")]
    #[schemars(with = "String")]
    pub gross_amount_eur: Decimal,
    /// Withheld tax in EUR; derived from the original amount when zero
    #[serde(with = "lenient")]
    #[schemars(with = "String")]
    pub withheld_tax_eur: Decimal,
}

/// Dividends from abroad (príloha 2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, FieldSchema)]
#[serde(default)]
pub struct ForeignDividends {
    pub enabled: bool,
    pub entries: Vec<DividendEntry>,
    /// Annual average USD per 1 EUR
    #[serde(with = "lenient")]
    #[schemars(with = "String")]
    pub usd_eur_rate: Decimal,
    /// The USD rate was entered by the user instead of the default
    pub usd_rate_overridden: bool,
    /// Annual average CZK per 1 EUR
    #[serde(with = "lenient")]
    #[schemars(with = "String")]
    pub czk_eur_rate: Decimal,
    /// The CZK rate was entered by the user instead of the default
    pub czk_rate_overridden: bool,
}

impl Default for ForeignDividends {
    fn default() -> Self {
        let constants = CURRENT_TAX_YEAR.constants();
        ForeignDividends {
            enabled: false,
            entries: Vec::new(),
            usd_eur_rate: constants.default_usd_eur,
            usd_rate_overridden: false,
            czk_eur_rate: constants.default_czk_eur,
            czk_rate_overridden: false,
        }
    }
}

/// Purchase and sale price of one disposed holding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema, FieldSchema)]
#[serde(default)]
pub struct SaleEntry {
    #[serde(with = "lenient")]
    #[schemars(with = "String")]
    pub purchase_amount: Decimal,
    #[serde(with = "lenient")]
    #[schemars(with = "String")]
    pub sale_amount: Decimal,
}

/// Redemptions of mutual fund units (capital income, §7).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema, FieldSchema)]
#[serde(default)]
pub struct MutualFundSales {
    pub enabled: bool,
    pub entries: Vec<SaleEntry>,
}

/// Short-term sales of securities (other income, §8).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema, FieldSchema)]
#[serde(default)]
pub struct StockSales {
    pub enabled: bool,
    pub entries: Vec<SaleEntry>,
}

/// Interest on a mortgage for young people (§33a).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema, FieldSchema)]
#[serde(default)]
pub struct MortgageInterest {
    pub enabled: bool,
    /// Interest paid during the tax year
    #[serde(with = "lenient")]
    #[schemars(with = "String")]
    pub interest_paid: Decimal,
    /// Months of the tax year in which interest was paid
    #[serde(with = "lenient_count")]
    #[schemars(with = "u32")]
    pub months: u32,
    #[serde(with = "lenient_date")]
    #[schemars(with = "Option<String>")]
    pub loan_start_date: Option<NaiveDate>,
    /// Decides which statutory cap applies
    #[serde(with = "lenient_date")]
    #[schemars(with = "Option<String>")]
    pub contract_date: Option<NaiveDate>,
}

/// Non-taxable amount for a spouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, FieldSchema)]
#[serde(default)]
pub struct SpouseNczd {
    pub enabled: bool,
    /// Surname and first name
    pub name: String,
    pub birth_number: String,
    /// Spouse's own income for the year
    #[serde(with = "lenient")]
    #[schemars(with = "String")]
    pub own_income: Decimal,
    /// Months of eligibility, 1 to 12
    #[serde(with = "lenient_count")]
    #[schemars(with = "u32")]
    pub months: u32,
}

impl Default for SpouseNczd {
    fn default() -> Self {
        SpouseNczd {
            enabled: false,
            name: String::new(),
            birth_number: String::new(),
            own_income: Decimal::ZERO,
            months: 12,
        }
    }
}

/// One dependent child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, FieldSchema)]
#[serde(default)]
pub struct ChildEntry {
    /// Surname and first name
    pub name: String,
    pub birth_number: String,
    /// Eligibility for January through December
    pub months: [bool; 12],
}

impl Default for ChildEntry {
    fn default() -> Self {
        ChildEntry {
            name: String::new(),
            birth_number: String::new(),
            months: [true; 12],
        }
    }
}

impl ChildEntry {
    pub fn all_months(&self) -> bool {
        self.months.iter().all(|m| *m)
    }
}

/// Tax bonus for dependent children (§33).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema, FieldSchema)]
#[serde(default)]
pub struct ChildBonus {
    pub enabled: bool,
    pub children: Vec<ChildEntry>,
    /// Bonus already paid out by the employer during the year
    #[serde(with = "lenient")]
    #[schemars(with = "String")]
    pub employer_paid_bonus: Decimal,
}

/// Share of tax assigned to a non-profit organisation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema, FieldSchema)]
#[serde(default)]
pub struct TwoPercentAllocation {
    pub enabled: bool,
    /// Recipient's identification number (IČO)
    pub ico: String,
    /// Recipient's registered name
    pub name: String,
    /// Consent to pass the taxpayer's name and address to the recipient
    pub consent_to_share: bool,
    /// Volunteered at least 40 hours, raising the share to 3 %
    pub volunteer: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ParentChoice {
    Both,
    One,
    #[default]
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema, FieldSchema)]
#[serde(default)]
pub struct ParentInfo {
    pub first_name: String,
    pub last_name: String,
    pub birth_number: String,
}

impl ParentInfo {
    pub fn is_empty(&self) -> bool {
        self.first_name.trim().is_empty()
            && self.last_name.trim().is_empty()
            && self.birth_number.trim().is_empty()
    }
}

/// Share of tax assigned to the taxpayer's parents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema, FieldSchema)]
#[serde(default)]
pub struct ParentTaxAllocation {
    pub choice: ParentChoice,
    pub parent1: ParentInfo,
    pub parent2: ParentInfo,
}

impl ParentTaxAllocation {
    pub fn is_enabled(&self) -> bool {
        self.choice != ParentChoice::None
    }

    /// Parents that receive a share under the current choice.
    pub fn designated(&self) -> Vec<&ParentInfo> {
        match self.choice {
            ParentChoice::Both => vec![&self.parent1, &self.parent2],
            ParentChoice::One => vec![&self.parent1],
            ParentChoice::None => Vec::new(),
        }
    }
}

/// Month counts given as numbers or text; anything unparsable is zero.
mod lenient_count {
    use crate::core::decimal::lenient;
    use rust_decimal::prelude::ToPrimitive;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = lenient::deserialize(deserializer)?;
        Ok(value.trunc().to_u32().unwrap_or(0))
    }
}

/// Dates as `YYYY-MM-DD` or `DD.MM.YYYY`; anything else is no date.
pub(crate) mod lenient_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(text, "%d.%m.%Y"))
            .ok()
    }

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let text: Option<String> = Option::deserialize(deserializer)?;
        Ok(text.as_deref().and_then(parse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn merge_fills_missing_sections() {
        let partial: PartialTaxForm = serde_json::from_str(
            r#"{"version": 2, "employment": {"enabled": true, "gross_income": "20000"}}"#,
        )
        .unwrap();
        let form = TaxFormData::merge_defaults(partial);

        assert_eq!(form.version, FORM_VERSION);
        assert!(form.employment.enabled);
        assert_eq!(form.employment.gross_income, dec!(20000));
        assert_eq!(form.employment.mandatory_insurance, Decimal::ZERO);
        assert_eq!(form.spouse, SpouseNczd::default());
        assert_eq!(form.dividends.usd_eur_rate, dec!(1.1300));
    }

    #[test]
    fn version_1_forms_drop_parent_allocation() {
        let partial: PartialTaxForm = serde_json::from_str(
            r#"{"parent_allocation": {"choice": "both"}, "two_percent": {"enabled": true}}"#,
        )
        .unwrap();
        let form = TaxFormData::merge_defaults(partial);

        assert_eq!(form.version, FORM_VERSION);
        assert_eq!(form.parent_allocation.choice, ParentChoice::None);
        assert!(form.two_percent.enabled);
    }

    #[test]
    fn lenient_fields_accept_text() {
        let form = TaxFormData::read_json(
            r#"{
                "version": 2,
                "mortgage": {"enabled": true, "interest_paid": "1 200,50", "months": "12",
                             "contract_date": "15.03.2023", "loan_start_date": "garbage"},
                "spouse": {"enabled": true, "own_income": 1000, "months": 6}
            }"#
            .as_bytes(),
        )
        .unwrap();

        assert_eq!(form.mortgage.interest_paid, dec!(1200.50));
        assert_eq!(form.mortgage.months, 12);
        assert_eq!(form.mortgage.contract_date, NaiveDate::from_ymd_opt(2023, 3, 15));
        assert_eq!(form.mortgage.loan_start_date, None);
        assert_eq!(form.spouse.months, 6);
    }

    #[test]
    fn newer_versions_rejected() {
        let err = TaxFormData::read_json(r#"{"version": 3}"#.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FormError>(),
            Some(FormError::UnsupportedVersion(3))
        ));
    }

    #[test]
    fn export_needs_identity() {
        let mut form = TaxFormData::default();
        assert!(matches!(form.require_identity(), Err(FormError::MissingIdentity)));
        form.personal_info.dic = "1234567890".to_string();
        assert!(form.require_identity().is_ok());
    }

    #[test]
    fn children_default_to_all_months() {
        let form = TaxFormData::read_json(
            r#"{"version": 2, "child_bonus": {"enabled": true, "children": [{"name": "Kid"}]}}"#
                .as_bytes(),
        )
        .unwrap();
        assert!(form.child_bonus.children[0].all_months());
    }

    #[test]
    fn identity_requires_tax_id_or_birth_number() {
        let mut info = PersonalInfo::default();
        assert!(!info.has_identity());

        info.dic = "1234567890".to_string();
        assert!(info.has_identity());

        info.dic = "100715/1233".to_string();
        assert!(info.has_identity());

        info.dic = "12345".to_string();
        assert!(!info.has_identity());
    }

    #[test]
    fn designated_parents_follow_choice() {
        let mut allocation = ParentTaxAllocation::default();
        assert!(!allocation.is_enabled());
        assert!(allocation.designated().is_empty());

        allocation.choice = ParentChoice::One;
        assert_eq!(allocation.designated().len(), 1);

        allocation.choice = ParentChoice::Both;
        assert_eq!(allocation.designated().len(), 2);
    }

    #[test]
    fn currency_for_country() {
        assert_eq!(Currency::for_country("840"), Currency::Usd);
        assert_eq!(Currency::for_country("203"), Currency::Czk);
        assert_eq!(Currency::for_country("276"), Currency::Eur);
    }

    #[test]
    fn field_schema_describes_sections() {
        let fields = EmploymentIncome::field_schema();
        assert_eq!(EmploymentIncome::section_name(), "EmploymentIncome");
        assert_eq!(fields[1].name, "gross_income");
        assert_eq!(fields[1].kind, "decimal");
        assert!(fields[1].description.contains("r.36"));

        let mortgage = MortgageInterest::field_schema();
        let contract = mortgage.iter().find(|f| f.name == "contract_date").unwrap();
        assert!(contract.optional);
        assert_eq!(contract.kind, "date");
    }
}
