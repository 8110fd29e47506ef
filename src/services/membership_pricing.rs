// src/services/membership_pricing.rs

use chrono::{Months, NaiveDate};

use crate::models::{
    company::{CompanyInput, Periodicity},
    membership::{PriceOption, PriceQuote},
};

/// Preço de uma cadência. A comparação ignora maiúsculas e espaços nas pontas.
pub fn price_for(options: &[PriceOption], periodicidad: &str) -> PriceQuote {
    if options.is_empty() {
        return PriceQuote::ContactForPrice;
    }

    let wanted = periodicidad.trim();
    options
        .iter()
        .find(|o| o.periodicidad.trim().eq_ignore_ascii_case(wanted))
        .map(|o| PriceQuote::Price {
            periodicidad: o.periodicidad.clone(),
            costo: o.costo,
        })
        .unwrap_or(PriceQuote::NotOffered)
}

/// Fim da vigência. Meses curtos prendem no último dia (31/01 + 1 mês = 28 ou 29/02).
pub fn derive_end_date(start: Option<NaiveDate>, periodicidad: Option<Periodicity>) -> Option<NaiveDate> {
    let months = match periodicidad? {
        Periodicity::Mensual => 1,
        Periodicity::Anual => 12,
    };
    start?.checked_add_months(Months::new(months))
}

/// Recalcula `fecha_fin_membresia` quando início ou periodicidade fazem parte da escrita.
/// Sem periodicidade (ou sem início) a data final fica como está.
pub fn apply_membership_dates(input: &mut CompanyInput, inputs_touched: bool, explicit_end: bool) {
    if explicit_end || !inputs_touched {
        return;
    }
    if let Some(end) = derive_end_date(input.fecha_inicio_membresia, input.membership_periodicidad) {
        input.fecha_fin_membresia = Some(end);
    }
}
