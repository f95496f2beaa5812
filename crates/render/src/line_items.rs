use rust_decimal::Decimal;

use billforge_core::{InvoiceTotals, TaxRate, round_money};

/// Column headers of the line-item table.
pub const HEADERS: [&str; 8] = [
    "S.No",
    "Particular",
    "HSN/SAC",
    "Amount",
    "Rate",
    "CGST",
    "SGST",
    "Total",
];

/// Column widths in points; they add up to the table width.
pub(crate) const WIDTHS: [f32; 8] = [30.0, 120.0, 60.0, 60.0, 40.0, 60.0, 60.0, 70.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Plan,
    Adjustment,
    Total,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub kind: RowKind,
    pub cells: [String; 8],
}

/// `Rs. 1234.50`, always with two decimals.
pub fn rupees(amount: Decimal) -> String {
    let mut amount = round_money(amount);
    amount.rescale(2);
    format!("Rs. {amount}")
}

/// Table rows for an invoice: the plan row, a discount row and a late-fee row
/// when those are non-zero, then the total row.
pub fn line_items(
    plan: &str,
    months: u32,
    hsn_code: &str,
    totals: &InvoiceTotals,
    rate: TaxRate,
) -> Vec<LineItem> {
    let tax = rupees(totals.split.per_component_tax);
    let mut rows = vec![LineItem {
        kind: RowKind::Plan,
        cells: [
            "1".into(),
            format!("{plan} - {months} Month{}", if months == 1 { "" } else { "s" }),
            hsn_code.into(),
            rupees(totals.split.base),
            rate.to_string(),
            tax.clone(),
            tax,
            rupees(totals.gross),
        ],
    }];

    if totals.has_discount() {
        rows.push(adjustment("Discount", format!("-{}", rupees(totals.discount))));
    }
    if totals.has_late_fee() {
        rows.push(adjustment("Late Fee", format!("+{}", rupees(totals.late_fee))));
    }

    rows.push(LineItem {
        kind: RowKind::Total,
        cells: summary_cells("Total Invoice Amount", rupees(totals.total)),
    });
    rows
}

fn adjustment(label: &str, amount: String) -> LineItem {
    LineItem {
        kind: RowKind::Adjustment,
        cells: summary_cells(label, amount),
    }
}

fn summary_cells(label: &str, amount: String) -> [String; 8] {
    let mut cells: [String; 8] = Default::default();
    cells[1] = label.to_string();
    cells[7] = amount;
    cells
}
