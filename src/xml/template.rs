//! Empty DPFO typ B document.
//!
//! Repeated structures are padded to the minimum number of occurrences the
//! schema demands, so a filled template always validates even when the
//! taxpayer has fewer children or income countries.

use super::tree::Element;
use std::sync::OnceLock;

pub const CHILD_SLOTS: usize = 4;
pub const FOREIGN_INCOME_SLOTS: usize = 6;
pub const TABLE2_ROWS: usize = 14;
pub const TABLE3_ROWS: usize = 3;

/// `tabulka2` row for the sale of securities (§8 ods. 1 písm. e)
pub const SECURITIES_ROW: usize = 6;
/// `tabulka3` row for the sale of mutual fund units
pub const FUND_UNITS_ROW: usize = 0;

pub const CHILDREN_PATH: &str = "telo/r33";
pub const FOREIGN_INCOME_PATH: &str = "telo/osobitneZaznamy/udajeOPrijmochZoZahranicia";

/// Row names in `telo` holding a single computed amount.
pub const AMOUNT_ROWS: &[&str] = &[
    "r36", "r36a", "r37", "r38", "r66", "r67", "r68", "r69", "r71", "r72", "r73", "r74", "r77",
    "r78", "r80", "r81", "r106", "r116", "r117", "r118", "r119", "r120", "r123", "r124", "r131",
    "r135", "r136", "r137", "r152",
];

fn leaf(name: &str) -> Element {
    Element::new(name)
}

fn node(name: &str, children: &[&str]) -> Element {
    Element::new(name).with_children(children.iter().map(|c| leaf(c)).collect())
}

fn repeated(name: &str, slot: Element, count: usize) -> Element {
    Element::new(name).with_children(vec![slot; count])
}

/// One empty `r33/dieta` slot.
pub fn child_slot() -> Element {
    let mut names = vec!["priezviskoMeno".to_string(), "rodneCislo".to_string()];
    names.extend((0..=12).map(|m| format!("m{:02}", m)));
    Element::new("dieta").with_children(names.into_iter().map(Element::new).collect())
}

/// One empty foreign income row.
pub fn foreign_income_slot() -> Element {
    node("riadok", &["kodStatu", "prijmy"])
}

fn table_row() -> Element {
    node("riadok", &["prijmy", "vydavky"])
}

fn build() -> Element {
    log::debug!("building DPFO typ B template");

    let hlavicka = Element::new("hlavicka").with_children(vec![
        leaf("dic"),
        node("zdanovacieObdobie", &["rok"]),
        leaf("priezvisko"),
        leaf("meno"),
        leaf("titul"),
        leaf("titulZa"),
        node(
            "adresaTrvPobytu",
            &["ulica", "supisneOrientacneCislo", "psc", "obec", "stat"],
        ),
        leaf("telefon"),
        leaf("email"),
    ]);

    let mut telo = vec![
        node(
            "r31",
            &["priezviskoMeno", "rodneCislo", "vlastnePrijmy", "pocetMesiacov"],
        ),
        node(
            "r32",
            &["uplatnujemNCZDNaManzela", "uplatnujemDanovyBonusNaUroky"],
        ),
        repeated("r33", child_slot(), CHILD_SLOTS),
        node(
            "r35",
            &[
                "zaplateneUroky",
                "pocetMesiacov",
                "datumZacatiaUrocenia",
                "datumUzavretiaZmluvy",
            ],
        ),
    ];
    telo.extend(["r36", "r36a", "r37", "r38"].iter().map(|r| leaf(r)));
    telo.push(repeated("tabulka2", table_row(), TABLE2_ROWS));
    telo.extend(["r66", "r67", "r68", "r69"].iter().map(|r| leaf(r)));
    telo.push(repeated("tabulka3", table_row(), TABLE3_ROWS));
    telo.extend(
        [
            "r71", "r72", "r73", "r74", "r77", "r78", "r80", "r81", "r106", "r116", "r117",
            "r118", "r119", "r120", "r123", "r124", "r131", "r135", "r136", "r137",
        ]
        .iter()
        .map(|r| leaf(r)),
    );
    telo.push(node(
        "r151",
        &["ico", "obchMeno", "podiel3percenta", "suhlasZaslUdaje", "suma"],
    ));
    telo.push(leaf("r152"));

    let parent = |name: &str| node(name, &["meno", "priezvisko", "rodneCislo"]);
    telo.push(Element::new("r153").with_children(vec![parent("rodic1"), parent("rodic2")]));

    telo.push(node("pril2PodielyNaZisku", &["pr1", "pr2", "pr3", "pr4", "pr5"]));
    telo.push(Element::new("osobitneZaznamy").with_children(vec![repeated(
        "udajeOPrijmochZoZahranicia",
        foreign_income_slot(),
        FOREIGN_INCOME_SLOTS,
    )]));

    Element::new("dokument").with_children(vec![hlavicka, Element::new("telo").with_children(telo)])
}

/// A fresh copy of the empty document.
pub fn template() -> Element {
    static TEMPLATE: OnceLock<Element> = OnceLock::new();
    TEMPLATE.get_or_init(build).clone()
}
