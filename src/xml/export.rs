use super::template::{self, CHILDREN_PATH, FOREIGN_INCOME_PATH};
use super::tree::Element;
use super::XmlError;
use crate::core::constants::CURRENT_TAX_YEAR;
use crate::core::decimal::format;
use crate::core::form::{
    ChildBonus, ForeignDividends, MortgageInterest, ParentTaxAllocation, PersonalInfo, SaleEntry,
    SpouseNczd, TaxFormData, TwoPercentAllocation,
};
use crate::core::result::TaxCalculationResult;
use crate::tax::dividends::{aggregate_by_country, ExchangeRates};
use crate::tax::securities;
use chrono::NaiveDate;

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn date(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_default()
}

/// Fill a copy of the template with the form and its calculated result.
///
/// Sections that are switched off stay empty. Computed rows are always
/// written.
pub fn to_document(form: &TaxFormData, result: &TaxCalculationResult) -> Element {
    let mut doc = template::template();

    write_header(&mut doc, &form.personal_info);

    doc.set_text("telo/r32/uplatnujemNCZDNaManzela", flag(form.spouse.enabled));
    doc.set_text(
        "telo/r32/uplatnujemDanovyBonusNaUroky",
        flag(form.mortgage.enabled),
    );

    if form.spouse.enabled {
        write_spouse(&mut doc, &form.spouse);
    }
    if form.child_bonus.enabled {
        write_children(&mut doc, &form.child_bonus);
    }
    if form.mortgage.enabled {
        write_mortgage(&mut doc, &form.mortgage);
    }
    if form.stocks.enabled {
        write_sales(&mut doc, "telo/tabulka2", template::SECURITIES_ROW, &form.stocks.entries);
    }
    if form.mutual_funds.enabled {
        write_sales(
            &mut doc,
            "telo/tabulka3",
            template::FUND_UNITS_ROW,
            &form.mutual_funds.entries,
        );
    }
    if form.dividends.enabled {
        write_foreign_income(&mut doc, &form.dividends);
    }
    if form.two_percent.enabled {
        write_ngo(&mut doc, &form.two_percent);
    }
    if form.parent_allocation.is_enabled() {
        write_parents(&mut doc, &form.parent_allocation);
    }

    for row in result.rows() {
        doc.set_text(&row_path(row.row), format(row.value));
    }

    doc
}

/// Serialize the filled document.
pub fn to_xml(form: &TaxFormData, result: &TaxCalculationResult) -> Result<String, XmlError> {
    to_document(form, result).to_xml()
}

/// Location of a result row in the document.
pub fn row_path(row: &str) -> String {
    match row {
        "r151" => "telo/r151/suma".to_string(),
        _ => match row.strip_prefix("pril2_") {
            Some(field) => format!("telo/pril2PodielyNaZisku/{}", field),
            None => format!("telo/{}", row),
        },
    }
}

fn write_header(doc: &mut Element, info: &PersonalInfo) {
    let fields = [
        ("hlavicka/dic", &info.dic),
        ("hlavicka/priezvisko", &info.last_name),
        ("hlavicka/meno", &info.first_name),
        ("hlavicka/titul", &info.title_before),
        ("hlavicka/titulZa", &info.title_after),
        ("hlavicka/adresaTrvPobytu/ulica", &info.street),
        ("hlavicka/adresaTrvPobytu/supisneOrientacneCislo", &info.house_number),
        ("hlavicka/adresaTrvPobytu/psc", &info.postal_code),
        ("hlavicka/adresaTrvPobytu/obec", &info.city),
        ("hlavicka/adresaTrvPobytu/stat", &info.country),
        ("hlavicka/telefon", &info.phone),
        ("hlavicka/email", &info.email),
    ];
    for (path, value) in fields {
        doc.set_text(path, value.trim());
    }
    doc.set_text("hlavicka/zdanovacieObdobie/rok", CURRENT_TAX_YEAR.to_string());
}

fn write_spouse(doc: &mut Element, spouse: &SpouseNczd) {
    doc.set_text("telo/r31/priezviskoMeno", spouse.name.trim());
    doc.set_text("telo/r31/rodneCislo", spouse.birth_number.trim());
    doc.set_text("telo/r31/vlastnePrijmy", format(spouse.own_income));
    doc.set_text("telo/r31/pocetMesiacov", spouse.months.to_string());
}

fn write_children(doc: &mut Element, bonus: &ChildBonus) {
    let Some(r33) = doc.find_mut(CHILDREN_PATH) else {
        return;
    };
    while r33.children.len() < bonus.children.len() {
        r33.children.push(template::child_slot());
    }

    for (slot, child) in r33.children_named_mut("dieta").zip(&bonus.children) {
        slot.set_text("priezviskoMeno", child.name.trim());
        slot.set_text("rodneCislo", child.birth_number.trim());
        if child.all_months() {
            slot.set_text("m00", "1");
        } else {
            slot.set_text("m00", "0");
            for (index, eligible) in child.months.iter().enumerate() {
                slot.set_text(&format!("m{:02}", index + 1), flag(*eligible));
            }
        }
    }
}

fn write_mortgage(doc: &mut Element, mortgage: &MortgageInterest) {
    doc.set_text("telo/r35/zaplateneUroky", format(mortgage.interest_paid));
    doc.set_text("telo/r35/pocetMesiacov", mortgage.months.to_string());
    doc.set_text(
        "telo/r35/datumZacatiaUrocenia",
        date(mortgage.loan_start_date),
    );
    doc.set_text(
        "telo/r35/datumUzavretiaZmluvy",
        date(mortgage.contract_date),
    );
}

fn write_sales(doc: &mut Element, table: &str, row: usize, entries: &[SaleEntry]) {
    let (purchases, sales) = securities::totals(entries);
    if let Some(slot) = doc.find_mut(table).and_then(|t| t.children.get_mut(row)) {
        slot.set_text("prijmy", format(sales));
        slot.set_text("vydavky", format(purchases));
    }
}

fn write_foreign_income(doc: &mut Element, dividends: &ForeignDividends) {
    let rates = ExchangeRates::from_form(dividends, CURRENT_TAX_YEAR.constants());
    let countries = aggregate_by_country(&dividends.entries, &rates);

    let Some(list) = doc.find_mut(FOREIGN_INCOME_PATH) else {
        return;
    };
    while list.children.len() < countries.len() {
        list.children.push(template::foreign_income_slot());
    }

    for (slot, country) in list.children_named_mut("riadok").zip(&countries) {
        slot.set_text("kodStatu", country.country_code.as_str());
        slot.set_text("prijmy", format(country.gross_eur));
    }
}

fn write_ngo(doc: &mut Element, ngo: &TwoPercentAllocation) {
    doc.set_text("telo/r151/ico", ngo.ico.trim());
    doc.set_text("telo/r151/obchMeno", ngo.name.trim());
    doc.set_text("telo/r151/podiel3percenta", flag(ngo.volunteer));
    doc.set_text("telo/r151/suhlasZaslUdaje", flag(ngo.consent_to_share));
}

fn write_parents(doc: &mut Element, allocation: &ParentTaxAllocation) {
    for (slot, parent) in ["rodic1", "rodic2"].iter().zip(allocation.designated()) {
        let path = format!("telo/r153/{}", slot);
        let element = doc.ensure(&path);
        element.set_text("meno", parent.first_name.trim());
        element.set_text("priezvisko", parent.last_name.trim());
        element.set_text("rodneCislo", parent.birth_number.trim());
    }
}
