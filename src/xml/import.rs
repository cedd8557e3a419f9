//! Reading a previously filed DPFO typ B document back into a form.
//!
//! Import never fails. A document that cannot be used yields the default
//! form, and a document from an earlier tax year only contributes the
//! taxpayer's identity and the voluntary allocations, since statutory
//! amounts of that year do not apply to the current one.

use super::template::{self, CHILDREN_PATH, FOREIGN_INCOME_PATH};
use super::tree::Element;
use crate::core::constants::{TaxYear, CURRENT_TAX_YEAR};
use crate::core::decimal::{round2, to_decimal};
use crate::core::form::{
    lenient_date, ChildBonus, ChildEntry, Currency, DividendEntry, EmploymentIncome,
    ForeignDividends, MortgageInterest, MutualFundSales, ParentChoice, ParentInfo,
    ParentTaxAllocation, PartialTaxForm, PersonalInfo, SaleEntry, SpouseNczd, StockSales,
    TaxFormData, TwoPercentAllocation, FORM_VERSION,
};
use crate::tax::dividends::ExchangeRates;
use rust_decimal::Decimal;

fn flag(element: &Element, path: &str) -> bool {
    matches!(element.text_at(path), "1" | "true")
}

fn text(element: &Element, path: &str) -> String {
    element.text_at(path).to_string()
}

fn count(element: &Element, path: &str) -> Option<u32> {
    element.text_at(path).parse().ok()
}

/// Parse document text into a complete form.
pub fn from_document(xml: &str) -> TaxFormData {
    let doc = match Element::parse(xml) {
        Ok(doc) => doc,
        Err(e) => {
            log::warn!("cannot read document, using an empty form: {}", e);
            return TaxFormData::default();
        }
    };
    if doc.name != "dokument" {
        log::warn!("root element <{}> is not <dokument>, using an empty form", doc.name);
        return TaxFormData::default();
    }
    if doc.text_at("hlavicka/dic").is_empty() {
        log::warn!("document has no tax ID, using an empty form");
        return TaxFormData::default();
    }

    let mut partial = PartialTaxForm {
        version: Some(FORM_VERSION),
        personal_info: Some(read_personal_info(&doc)),
        two_percent: Some(read_ngo(&doc)),
        parent_allocation: Some(read_parents(&doc)),
        ..PartialTaxForm::default()
    };

    match document_year(&doc) {
        Some(year) if !year.is_stale() => {}
        Some(year) => {
            log::warn!(
                "document is for {}, importing identity and allocations only",
                year
            );
            return TaxFormData::merge_defaults(partial);
        }
        None => {
            log::warn!("document has no tax year, importing identity and allocations only");
            return TaxFormData::merge_defaults(partial);
        }
    }

    partial.employment = Some(read_employment(&doc));
    partial.dividends = Some(read_dividends(&doc));
    partial.mutual_funds = Some(MutualFundSales::from_entries(read_sales(
        &doc,
        "telo/tabulka3",
        template::FUND_UNITS_ROW,
    )));
    partial.stocks = Some(StockSales::from_entries(read_sales(
        &doc,
        "telo/tabulka2",
        template::SECURITIES_ROW,
    )));
    partial.mortgage = Some(read_mortgage(&doc));
    partial.spouse = Some(read_spouse(&doc));
    partial.child_bonus = Some(read_children(&doc));

    TaxFormData::merge_defaults(partial)
}

fn document_year(doc: &Element) -> Option<TaxYear> {
    doc.text_at("hlavicka/zdanovacieObdobie/rok")
        .parse()
        .ok()
        .map(TaxYear)
}

fn read_personal_info(doc: &Element) -> PersonalInfo {
    let defaults = PersonalInfo::default();
    let country = text(doc, "hlavicka/adresaTrvPobytu/stat");
    PersonalInfo {
        dic: text(doc, "hlavicka/dic"),
        first_name: text(doc, "hlavicka/meno"),
        last_name: text(doc, "hlavicka/priezvisko"),
        title_before: text(doc, "hlavicka/titul"),
        title_after: text(doc, "hlavicka/titulZa"),
        street: text(doc, "hlavicka/adresaTrvPobytu/ulica"),
        house_number: text(doc, "hlavicka/adresaTrvPobytu/supisneOrientacneCislo"),
        postal_code: text(doc, "hlavicka/adresaTrvPobytu/psc"),
        city: text(doc, "hlavicka/adresaTrvPobytu/obec"),
        country: if country.is_empty() {
            defaults.country
        } else {
            country
        },
        phone: text(doc, "hlavicka/telefon"),
        email: text(doc, "hlavicka/email"),
    }
}

/// Enabled when the recipient is identified by number or by name.
fn read_ngo(doc: &Element) -> TwoPercentAllocation {
    let ico = text(doc, "telo/r151/ico");
    let name = text(doc, "telo/r151/obchMeno");
    if ico.is_empty() && name.is_empty() {
        return TwoPercentAllocation::default();
    }
    TwoPercentAllocation {
        enabled: true,
        ico,
        name,
        consent_to_share: flag(doc, "telo/r151/suhlasZaslUdaje"),
        volunteer: flag(doc, "telo/r151/podiel3percenta"),
    }
}

fn read_parent(doc: &Element, slot: &str) -> ParentInfo {
    ParentInfo {
        first_name: text(doc, &format!("telo/r153/{}/meno", slot)),
        last_name: text(doc, &format!("telo/r153/{}/priezvisko", slot)),
        birth_number: text(doc, &format!("telo/r153/{}/rodneCislo", slot)),
    }
}

fn read_parents(doc: &Element) -> ParentTaxAllocation {
    let first = read_parent(doc, "rodic1");
    let second = read_parent(doc, "rodic2");

    match (first.is_empty(), second.is_empty()) {
        (false, false) => ParentTaxAllocation {
            choice: ParentChoice::Both,
            parent1: first,
            parent2: second,
        },
        (false, true) => ParentTaxAllocation {
            choice: ParentChoice::One,
            parent1: first,
            parent2: ParentInfo::default(),
        },
        (true, false) => ParentTaxAllocation {
            choice: ParentChoice::One,
            parent1: second,
            parent2: ParentInfo::default(),
        },
        (true, true) => ParentTaxAllocation::default(),
    }
}

fn read_employment(doc: &Element) -> EmploymentIncome {
    let employment = EmploymentIncome {
        enabled: false,
        gross_income: to_decimal(doc.text_at("telo/r36")),
        agreement_income: to_decimal(doc.text_at("telo/r36a")),
        mandatory_insurance: to_decimal(doc.text_at("telo/r37")),
        tax_advances: to_decimal(doc.text_at("telo/r131")),
    };
    let enabled = !(employment.gross_income.is_zero()
        && employment.agreement_income.is_zero()
        && employment.mandatory_insurance.is_zero()
        && employment.tax_advances.is_zero());

    if enabled {
        EmploymentIncome {
            enabled,
            ..employment
        }
    } else {
        EmploymentIncome::default()
    }
}

/// One entry per country row. Only the document total of withheld tax is
/// known, so it is shared out by each country's portion of the income.
fn read_dividends(doc: &Element) -> ForeignDividends {
    let rows: Vec<(String, Decimal)> = doc
        .find(FOREIGN_INCOME_PATH)
        .map(|list| {
            list.children_named("riadok")
                .map(|row| (text(row, "kodStatu"), to_decimal(row.text_at("prijmy"))))
                .filter(|(code, gross)| !code.is_empty() && *gross > Decimal::ZERO)
                .collect()
        })
        .unwrap_or_default();

    if rows.is_empty() {
        return ForeignDividends::default();
    }

    let rates = ExchangeRates::defaults(CURRENT_TAX_YEAR.constants());
    let total: Decimal = rows.iter().map(|(_, gross)| *gross).sum();
    let withheld_total = to_decimal(doc.text_at("telo/pril2PodielyNaZisku/pr3"));

    let entries = rows
        .into_iter()
        .map(|(country_code, gross_eur)| {
            let withheld_eur = round2(withheld_total * gross_eur / total);
            let currency = Currency::for_country(&country_code);
            DividendEntry {
                ticker: String::new(),
                gross_amount: rates.from_eur(gross_eur, currency),
                withheld_tax: rates.from_eur(withheld_eur, currency),
                gross_amount_eur: gross_eur,
                withheld_tax_eur: withheld_eur,
                country_code,
                currency,
            }
        })
        .collect();

    ForeignDividends {
        enabled: true,
        entries,
        ..ForeignDividends::default()
    }
}

fn read_sales(doc: &Element, table: &str, row: usize) -> Vec<SaleEntry> {
    let Some(slot) = doc.find(table).and_then(|t| t.children.get(row)) else {
        return Vec::new();
    };
    let entry = SaleEntry {
        purchase_amount: to_decimal(slot.text_at("vydavky")),
        sale_amount: to_decimal(slot.text_at("prijmy")),
    };
    if entry.purchase_amount.is_zero() && entry.sale_amount.is_zero() {
        Vec::new()
    } else {
        vec![entry]
    }
}

impl MutualFundSales {
    fn from_entries(entries: Vec<SaleEntry>) -> Self {
        MutualFundSales {
            enabled: !entries.is_empty(),
            entries,
        }
    }
}

impl StockSales {
    fn from_entries(entries: Vec<SaleEntry>) -> Self {
        StockSales {
            enabled: !entries.is_empty(),
            entries,
        }
    }
}

fn read_mortgage(doc: &Element) -> MortgageInterest {
    if !flag(doc, "telo/r32/uplatnujemDanovyBonusNaUroky") {
        return MortgageInterest::default();
    }
    MortgageInterest {
        enabled: true,
        interest_paid: to_decimal(doc.text_at("telo/r35/zaplateneUroky")),
        months: count(doc, "telo/r35/pocetMesiacov").unwrap_or(0),
        loan_start_date: lenient_date::parse(doc.text_at("telo/r35/datumZacatiaUrocenia")),
        contract_date: lenient_date::parse(doc.text_at("telo/r35/datumUzavretiaZmluvy")),
    }
}

fn read_spouse(doc: &Element) -> SpouseNczd {
    if !flag(doc, "telo/r32/uplatnujemNCZDNaManzela") {
        return SpouseNczd::default();
    }
    SpouseNczd {
        enabled: true,
        name: text(doc, "telo/r31/priezviskoMeno"),
        birth_number: text(doc, "telo/r31/rodneCislo"),
        own_income: to_decimal(doc.text_at("telo/r31/vlastnePrijmy")),
        months: count(doc, "telo/r31/pocetMesiacov").unwrap_or(12),
    }
}

fn read_child(slot: &Element) -> ChildEntry {
    let mut months = [true; 12];
    if !flag(slot, "m00") {
        for (index, month) in months.iter_mut().enumerate() {
            *month = flag(slot, &format!("m{:02}", index + 1));
        }
    }
    ChildEntry {
        name: text(slot, "priezviskoMeno"),
        birth_number: text(slot, "rodneCislo"),
        months,
    }
}

fn read_children(doc: &Element) -> ChildBonus {
    let children: Vec<ChildEntry> = doc
        .find(CHILDREN_PATH)
        .map(|r33| {
            r33.children_named("dieta")
                .filter(|slot| {
                    !slot.text_at("priezviskoMeno").is_empty()
                        || !slot.text_at("rodneCislo").is_empty()
                })
                .map(read_child)
                .collect()
        })
        .unwrap_or_default();

    if children.is_empty() {
        return ChildBonus::default();
    }
    ChildBonus {
        enabled: true,
        children,
        employer_paid_bonus: to_decimal(doc.text_at("telo/r119")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn document(year: &str, telo: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<dokument>
  <hlavicka>
    <dic>1234567890</dic>
    <zdanovacieObdobie><rok>{}</rok></zdanovacieObdobie>
    <priezvisko>Novák</priezvisko>
    <meno>Ján</meno>
    <adresaTrvPobytu><obec>Košice</obec><stat></stat></adresaTrvPobytu>
  </hlavicka>
  <telo>{}</telo>
</dokument>"#,
            year, telo
        )
    }

    #[test]
    fn malformed_document_gives_defaults() {
        assert_eq!(from_document("<dokument><hlavicka>"), TaxFormData::default());
        assert_eq!(from_document("not xml at all"), TaxFormData::default());
    }

    #[test]
    fn missing_tax_id_gives_defaults() {
        let xml = document("2025", "<r36>20000.00</r36>").replace("1234567890", "");
        assert_eq!(from_document(&xml), TaxFormData::default());
        assert_eq!(
            from_document("<dokument><telo><r36>1</r36></telo></dokument>"),
            TaxFormData::default()
        );
    }

    #[test]
    fn identity_imported() {
        let form = from_document(&document("2025", ""));
        assert_eq!(form.personal_info.dic, "1234567890");
        assert_eq!(form.personal_info.first_name, "Ján");
        assert_eq!(form.personal_info.last_name, "Novák");
        assert_eq!(form.personal_info.city, "Košice");
        assert_eq!(form.personal_info.country, "Slovenská republika");
        assert_eq!(form.version, FORM_VERSION);
    }

    #[test]
    fn stale_year_keeps_identity_and_allocations_only() {
        let telo = r#"
            <r31><priezviskoMeno>Nováková Eva</priezviskoMeno></r31>
            <r32><uplatnujemNCZDNaManzela>1</uplatnujemNCZDNaManzela></r32>
            <r36>20000.00</r36>
            <r131>3000.00</r131>
            <r151><ico>12345678</ico><obchMeno>Nadácia</obchMeno></r151>
            <r153><rodic1><meno>Mária</meno><rodneCislo>5551012349</rodneCislo></rodic1></r153>"#;
        let form = from_document(&document("2024", telo));

        assert_eq!(form.personal_info.dic, "1234567890");
        assert!(form.two_percent.enabled);
        assert_eq!(form.two_percent.ico, "12345678");
        assert_eq!(form.parent_allocation.choice, ParentChoice::One);
        assert_eq!(form.parent_allocation.parent1.first_name, "Mária");

        assert_eq!(form.employment, EmploymentIncome::default());
        assert_eq!(form.spouse, SpouseNczd::default());
    }

    #[test]
    fn ngo_without_ico_stays_enabled() {
        let telo = r#"<r151><ico></ico><obchMeno>Nadácia</obchMeno>
            <podiel3percenta>1</podiel3percenta><suhlasZaslUdaje>0</suhlasZaslUdaje></r151>"#;
        let form = from_document(&document("2025", telo));

        assert!(form.two_percent.enabled);
        assert_eq!(form.two_percent.name, "Nadácia");
        assert_eq!(form.two_percent.ico, "");
        assert!(form.two_percent.volunteer);
    }

    #[test]
    fn blank_allocations_import_as_disabled() {
        let telo = r#"<r151><ico></ico><obchMeno></obchMeno></r151>
            <r153><rodic1><meno></meno></rodic1><rodic2></rodic2></r153>"#;
        let form = from_document(&document("2025", telo));

        assert_eq!(form.two_percent, TwoPercentAllocation::default());
        assert_eq!(form.parent_allocation, ParentTaxAllocation::default());
    }

    #[test]
    fn current_year_imports_sections() {
        let telo = r#"
            <r31><priezviskoMeno>Nováková Eva</priezviskoMeno><rodneCislo>8551012349</rodneCislo>
                 <vlastnePrijmy>1000.00</vlastnePrijmy><pocetMesiacov>6</pocetMesiacov></r31>
            <r32><uplatnujemNCZDNaManzela>1</uplatnujemNCZDNaManzela>
                 <uplatnujemDanovyBonusNaUroky>1</uplatnujemDanovyBonusNaUroky></r32>
            <r35><zaplateneUroky>2000.00</zaplateneUroky><pocetMesiacov>12</pocetMesiacov>
                 <datumZacatiaUrocenia></datumZacatiaUrocenia>
                 <datumUzavretiaZmluvy>03.05.2022</datumUzavretiaZmluvy></r35>
            <r36>20000.00</r36><r37>2700.00</r37><r131>3000.00</r131>
            <r119>100.00</r119>"#;
        let form = from_document(&document("2025", telo));

        assert!(form.employment.enabled);
        assert_eq!(form.employment.gross_income, dec!(20000));
        assert_eq!(form.employment.mandatory_insurance, dec!(2700));
        assert_eq!(form.employment.tax_advances, dec!(3000));

        assert!(form.spouse.enabled);
        assert_eq!(form.spouse.own_income, dec!(1000));
        assert_eq!(form.spouse.months, 6);

        assert!(form.mortgage.enabled);
        assert_eq!(form.mortgage.contract_date, chrono::NaiveDate::from_ymd_opt(2022, 5, 3));
        assert_eq!(form.mortgage.loan_start_date, None);

        // no children, so the employer-paid bonus has nowhere to go
        assert!(!form.child_bonus.enabled);
    }

    #[test]
    fn child_months_read_from_flags() {
        let telo = r#"
            <r33>
              <dieta><priezviskoMeno>A</priezviskoMeno><rodneCislo>1007151233</rodneCislo><m00>1</m00></dieta>
              <dieta><priezviskoMeno>B</priezviskoMeno><rodneCislo>1057123452</rodneCislo><m00>0</m00>
                <m01>0</m01><m02>1</m02><m03>1</m03><m04>1</m04><m05>1</m05><m06>1</m06>
                <m07>1</m07><m08>1</m08><m09>1</m09><m10>1</m10><m11>1</m11><m12>1</m12></dieta>
              <dieta><priezviskoMeno></priezviskoMeno><rodneCislo></rodneCislo></dieta>
            </r33>
            <r119>50.00</r119>"#;
        let form = from_document(&document("2025", telo));

        assert!(form.child_bonus.enabled);
        assert_eq!(form.child_bonus.children.len(), 2);
        assert!(form.child_bonus.children[0].all_months());
        assert!(!form.child_bonus.children[1].months[0]);
        assert!(form.child_bonus.children[1].months[1]);
        assert_eq!(form.child_bonus.employer_paid_bonus, dec!(50));
    }

    #[test]
    fn withheld_tax_shared_by_income() {
        let telo = r#"
            <pril2PodielyNaZisku><pr3>60.00</pr3></pril2PodielyNaZisku>
            <osobitneZaznamy><udajeOPrijmochZoZahranicia>
              <riadok><kodStatu>840</kodStatu><prijmy>300.00</prijmy></riadok>
              <riadok><kodStatu>203</kodStatu><prijmy>100.00</prijmy></riadok>
              <riadok><kodStatu></kodStatu><prijmy></prijmy></riadok>
            </udajeOPrijmochZoZahranicia></osobitneZaznamy>"#;
        let form = from_document(&document("2025", telo));

        assert!(form.dividends.enabled);
        let entries = &form.dividends.entries;
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].currency, Currency::Usd);
        assert_eq!(entries[0].gross_amount_eur, dec!(300));
        assert_eq!(entries[0].withheld_tax_eur, dec!(45));
        // back-converted at 1.13 USD per EUR
        assert_eq!(entries[0].gross_amount, dec!(339.00));

        assert_eq!(entries[1].currency, Currency::Czk);
        assert_eq!(entries[1].withheld_tax_eur, dec!(15));
        assert_eq!(entries[1].gross_amount, dec!(2498.00));
    }

    #[test]
    fn sale_tables_become_single_entries() {
        let mut rows = String::new();
        for index in 0..template::TABLE2_ROWS {
            if index == template::SECURITIES_ROW {
                rows.push_str("<riadok><prijmy>2200.00</prijmy><vydavky>1000.00</vydavky></riadok>");
            } else {
                rows.push_str("<riadok><prijmy></prijmy><vydavky></vydavky></riadok>");
            }
        }
        let telo = format!("<tabulka2>{}</tabulka2>", rows);
        let form = from_document(&document("2025", &telo));

        assert!(form.stocks.enabled);
        assert_eq!(
            form.stocks.entries,
            vec![SaleEntry {
                purchase_amount: dec!(1000),
                sale_amount: dec!(2200),
            }]
        );
        assert!(!form.mutual_funds.enabled);
    }
}
