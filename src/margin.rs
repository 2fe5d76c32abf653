use crate::models::{CostLine, TaxScheme, VehicleRecord};

/// Dutch standard VAT rate as a multiplier.
pub const VAT_MULTIPLIER: f64 = 1.21;

/// Indicative result of one vehicle plus the figures it was derived from.
/// Nothing is rounded here; rounding happens when printing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginSummary {
    pub purchase_excl: f64,
    pub levy: f64,
    pub sale_incl: f64,
    pub sale_excl: f64,
    pub total_costs: f64,
    pub result: f64,
}

/// Sale price without VAT. Only VAT vehicles are normalized; for margin or
/// unknown vehicles the incl. figure is used as an approximation.
pub fn normalize_sale_price(sale_incl: f64, scheme: TaxScheme) -> f64 {
    if scheme == TaxScheme::TaxInclusive && sale_incl > 0.0 {
        sale_incl / VAT_MULTIPLIER
    } else {
        sale_incl
    }
}

/// Sum of cost line amounts as entered. The per-line tax basis is ignored.
pub fn total_costs(costs: &[CostLine]) -> f64 {
    costs.iter().map(|c| c.amount).sum()
}

pub fn calculate(
    purchase_excl: f64,
    levy: f64,
    sale_incl: f64,
    scheme: TaxScheme,
    costs: &[CostLine],
) -> MarginSummary {
    let sale_excl = normalize_sale_price(sale_incl, scheme);
    let total_costs = total_costs(costs);
    MarginSummary {
        purchase_excl,
        levy,
        sale_incl,
        sale_excl,
        total_costs,
        result: sale_excl - purchase_excl - levy - total_costs,
    }
}

pub fn for_vehicle(vehicle: &VehicleRecord) -> MarginSummary {
    calculate(
        vehicle.purchase_excl,
        vehicle.levy,
        vehicle.sale_incl,
        vehicle.tax_scheme,
        &vehicle.costs,
    )
}
