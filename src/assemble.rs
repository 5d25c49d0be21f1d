//! Canonical purchase-order assembler.
//!
//! Maps partner-native records onto the canonical header+lines schema.
//! All numeric coercion happens here, and aggregate totals are ALWAYS
//! recomputed from line data: partner-declared header totals have been seen
//! stale and display-rounded, so they are advisory only and logged when
//! they disagree beyond the configured tolerance.

use rust_decimal::Decimal;

use crate::config::ImportPolicy;
use crate::extract::{NativeLine, NativePo, Warnings};
use crate::models::{CanonicalPo, CanonicalPoHeader, CanonicalPoLine, TaxBreakdown};
use crate::normalize;

/// Assembles one native document into its canonical form.
pub fn assemble(
    native: NativePo,
    policy: &ImportPolicy,
    created_by: &str,
    attachment_path: Option<&str>,
    warnings: &mut Warnings,
) -> CanonicalPo {
    let partner = native.partner;
    let po_number = native.header.po_number.clone();

    let lines: Vec<CanonicalPoLine> = native
        .lines
        .into_iter()
        .enumerate()
        .map(|(idx, line)| assemble_line(idx as i32 + 1, line, &po_number, warnings))
        .collect();

    let total_quantity: Decimal = lines.iter().map(|l| l.quantity).sum();
    let taxable_value: Decimal = lines.iter().map(|l| l.taxable_value).sum();
    let tax_amount: Decimal = lines.iter().map(|l| l.tax.total_amount).sum();
    let grand_total: Decimal = lines.iter().map(|l| l.line_total).sum();

    let declared = normalize::coerce_decimal(native.header.declared_total.as_deref());
    if !declared.is_zero() && (declared - grand_total).abs() > policy.reconcile_tolerance {
        warnings.push(format!(
            "PO {}: declared total {} disagrees with computed {}; using computed",
            po_number, declared, grand_total
        ));
    }

    CanonicalPo {
        header: CanonicalPoHeader {
            partner,
            po_number,
            po_date: native.header.po_date,
            expiry_date: native.header.expiry_date,
            delivery_date: native.header.delivery_date,
            vendor_name: native.header.vendor_name,
            vendor_code: native.header.vendor_code,
            vendor_tax_id: native.header.vendor_tax_id,
            buyer_name: native.header.buyer_name,
            ship_to: native.header.ship_to,
            bill_to: native.header.bill_to,
            payment_terms: native.header.payment_terms,
            distributor: policy.distributor_for(partner).map(str::to_string),
            total_quantity,
            taxable_value,
            tax_amount,
            grand_total,
            status: policy.default_status.clone(),
            attachment_path: attachment_path.map(str::to_string),
            created_by: created_by.to_string(),
        },
        lines,
    }
}

fn assemble_line(
    line_number: i32,
    line: NativeLine,
    po_number: &str,
    warnings: &mut Warnings,
) -> CanonicalPoLine {
    let mut quantity = normalize::coerce_decimal(line.quantity.as_deref());
    if quantity.is_sign_negative() {
        warnings.push(format!(
            "PO {} line {}: negative quantity {} clamped to zero",
            po_number, line_number, quantity
        ));
        quantity = Decimal::ZERO;
    }

    let unit_cost = normalize::coerce_decimal(line.unit_cost.as_deref());
    let taxable_value = match line.taxable_value.as_deref() {
        Some(raw) => normalize::coerce_decimal(Some(raw)),
        None => (quantity * unit_cost).round_dp(2),
    };

    let tax = assemble_tax(&line, taxable_value);

    let declared_total = normalize::coerce_decimal(line.line_total.as_deref());
    let line_total = if declared_total.is_zero() {
        (taxable_value + tax.total_amount).round_dp(2)
    } else {
        declared_total
    };

    let (tax_code, tax_code_source) = match normalize::extract_code(
        line.tax_code.as_deref(),
        line.description.as_deref(),
        line.category.as_deref(),
    ) {
        Some((code, source)) => (Some(code), Some(source)),
        None => (None, None),
    };

    let mrp = Some(normalize::coerce_decimal(line.mrp.as_deref())).filter(|m| !m.is_zero());

    CanonicalPoLine {
        line_number,
        item_code: line.item_code,
        item_description: line.description,
        tax_code,
        tax_code_source,
        quantity,
        unit_cost,
        mrp,
        taxable_value,
        tax,
        line_total,
    }
}

/// Builds the per-levy breakdown from whatever the partner supplied:
/// explicit component rates, a combined rate needing the even co-levy
/// split, or only a monetary tax amount to back-calculate from.
fn assemble_tax(line: &NativeLine, taxable_value: Decimal) -> TaxBreakdown {
    let mut integrated_rate = normalize::coerce_decimal(line.integrated_rate.as_deref());
    let mut central_rate = normalize::coerce_decimal(line.central_rate.as_deref());
    let mut state_rate = normalize::coerce_decimal(line.state_rate.as_deref());
    let surcharge_rate = normalize::coerce_decimal(line.surcharge_rate.as_deref());

    let declared_tax_amount = normalize::coerce_decimal(line.tax_amount.as_deref());

    if integrated_rate.is_zero() && central_rate.is_zero() && state_rate.is_zero() {
        let combined = normalize::coerce_decimal(line.combined_rate.as_deref());
        if !combined.is_zero() {
            // Even split is an approximation; the file does not say how the
            // co-levies divide.
            let (a, b) = normalize::split_combined(combined);
            central_rate = a;
            state_rate = b;
        } else if !declared_tax_amount.is_zero() {
            integrated_rate = normalize::back_rate(declared_tax_amount, taxable_value);
        }
    }

    let integrated_amount = component_amount(
        line.integrated_amount.as_deref(),
        integrated_rate,
        taxable_value,
    );
    let central_amount =
        component_amount(line.central_amount.as_deref(), central_rate, taxable_value);
    let state_amount = component_amount(line.state_amount.as_deref(), state_rate, taxable_value);
    let surcharge_amount = component_amount(
        line.surcharge_amount.as_deref(),
        surcharge_rate,
        taxable_value,
    );

    let computed_total = integrated_amount + central_amount + state_amount + surcharge_amount;
    let total_amount = if computed_total.is_zero() && !declared_tax_amount.is_zero() {
        declared_tax_amount
    } else {
        computed_total
    };

    TaxBreakdown {
        integrated_rate,
        integrated_amount,
        central_rate,
        central_amount,
        state_rate,
        state_amount,
        surcharge_rate,
        surcharge_amount,
        total_amount,
    }
}

/// A component's monetary amount: the declared cell when present, otherwise
/// derived from its rate.
fn component_amount(declared: Option<&str>, rate: Decimal, taxable_value: Decimal) -> Decimal {
    let declared = normalize::coerce_decimal(declared);
    if !declared.is_zero() {
        return declared;
    }
    if rate.is_zero() || taxable_value.is_zero() {
        return Decimal::ZERO;
    }
    (taxable_value * rate / Decimal::ONE_HUNDRED).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::NativeHeader;
    use crate::models::{Partner, TaxCodeSource};
    use rust_decimal_macros::dec;

    fn native(lines: Vec<NativeLine>, declared_total: Option<&str>) -> NativePo {
        NativePo {
            partner: Partner::Swiftmart,
            header: NativeHeader {
                po_number: "PO-77".to_string(),
                declared_total: declared_total.map(str::to_string),
                ..NativeHeader::default()
            },
            lines,
        }
    }

    fn line(qty: &str, cost: &str) -> NativeLine {
        NativeLine {
            item_code: "SKU-1".to_string(),
            quantity: Some(qty.to_string()),
            unit_cost: Some(cost.to_string()),
            ..NativeLine::default()
        }
    }

    #[test]
    fn totals_are_recomputed_from_lines() {
        let mut warnings = Warnings::default();
        let po = assemble(
            native(vec![line("2", "150"), line("1", "100")], None),
            &ImportPolicy::default(),
            "tester",
            None,
            &mut warnings,
        );

        assert_eq!(po.header.total_quantity, dec!(3));
        assert_eq!(po.header.taxable_value, dec!(400));
        assert_eq!(po.header.grand_total, dec!(400));
        assert_eq!(po.line_total_sum(), po.header.grand_total);
        assert_eq!(po.lines[0].line_number, 1);
        assert_eq!(po.lines[1].line_number, 2);
    }

    #[test]
    fn stale_declared_total_is_advisory_and_logged() {
        let mut warnings = Warnings::default();
        let po = assemble(
            native(vec![line("2", "150")], Some("999.99")),
            &ImportPolicy::default(),
            "tester",
            None,
            &mut warnings,
        );

        assert_eq!(po.header.grand_total, dec!(300));
        assert_eq!(warnings.len(), 1);
        assert!(warnings.as_slice()[0].contains("disagrees"));
    }

    #[test]
    fn declared_total_within_tolerance_is_quiet() {
        let mut warnings = Warnings::default();
        let po = assemble(
            native(vec![line("2", "150")], Some("300.005")),
            &ImportPolicy::default(),
            "tester",
            None,
            &mut warnings,
        );
        assert_eq!(po.header.grand_total, dec!(300));
        assert!(warnings.is_empty());
    }

    #[test]
    fn combined_rate_splits_into_co_levies() {
        let mut warnings = Warnings::default();
        let native_line = NativeLine {
            combined_rate: Some("18".to_string()),
            ..line("1", "200")
        };
        let po = assemble(
            native(vec![native_line], None),
            &ImportPolicy::default(),
            "tester",
            None,
            &mut warnings,
        );

        let tax = &po.lines[0].tax;
        assert_eq!(tax.central_rate, dec!(9));
        assert_eq!(tax.state_rate, dec!(9));
        assert_eq!(tax.central_amount, dec!(18));
        assert_eq!(tax.state_amount, dec!(18));
        assert_eq!(tax.total_amount, dec!(36));
        assert_eq!(po.lines[0].line_total, dec!(236));
    }

    #[test]
    fn tax_rate_is_back_calculated_from_amount_only() {
        let mut warnings = Warnings::default();
        let native_line = NativeLine {
            tax_amount: Some("25".to_string()),
            taxable_value: Some("500".to_string()),
            ..line("1", "500")
        };
        let po = assemble(
            native(vec![native_line], None),
            &ImportPolicy::default(),
            "tester",
            None,
            &mut warnings,
        );

        let tax = &po.lines[0].tax;
        assert_eq!(tax.integrated_rate, dec!(5));
        assert_eq!(tax.integrated_amount, dec!(25));
        assert_eq!(tax.total_amount, dec!(25));
    }

    #[test]
    fn negative_quantity_is_clamped_with_warning() {
        let mut warnings = Warnings::default();
        let po = assemble(
            native(vec![line("-4", "10")], None),
            &ImportPolicy::default(),
            "tester",
            None,
            &mut warnings,
        );
        assert_eq!(po.lines[0].quantity, Decimal::ZERO);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn inferred_tax_code_carries_provenance() {
        let mut warnings = Warnings::default();
        let native_line = NativeLine {
            description: Some("Refined Sunflower Oil 1L".to_string()),
            ..line("1", "100")
        };
        let po = assemble(
            native(vec![native_line], None),
            &ImportPolicy::default(),
            "tester",
            None,
            &mut warnings,
        );
        assert_eq!(po.lines[0].tax_code.as_deref(), Some("15121110"));
        assert_eq!(po.lines[0].tax_code_source, Some(TaxCodeSource::Inferred));
    }

    #[test]
    fn zero_mrp_defaults_to_absent() {
        let mut warnings = Warnings::default();
        let native_line = NativeLine {
            mrp: Some("0".to_string()),
            ..line("1", "100")
        };
        let po = assemble(
            native(vec![native_line], None),
            &ImportPolicy::default(),
            "tester",
            None,
            &mut warnings,
        );
        assert_eq!(po.lines[0].mrp, None);
    }

    #[test]
    fn policy_routes_distributor_and_status() {
        let mut policy = ImportPolicy::default();
        policy
            .distributors
            .insert(Partner::Swiftmart, "North Foods Distribution".to_string());
        policy.default_status = "Pending".to_string();

        let mut warnings = Warnings::default();
        let po = assemble(
            native(vec![line("1", "10")], None),
            &policy,
            "tester",
            Some("blob://uploads/abc"),
            &mut warnings,
        );
        assert_eq!(
            po.header.distributor.as_deref(),
            Some("North Foods Distribution")
        );
        assert_eq!(po.header.status, "Pending");
        assert_eq!(
            po.header.attachment_path.as_deref(),
            Some("blob://uploads/abc")
        );
        assert_eq!(po.header.created_by, "tester");
    }
}
