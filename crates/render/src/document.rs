use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use billforge_core::timefmt::{self, DISPLAY_DATE_FORMAT};
use billforge_core::{DomainError, TaxRate};
use billforge_invoicing::{InvoiceDraft, PaymentStatus};

use crate::canvas::{Align, Canvas, Margins, Op, Rgb, Style};
use crate::error::RenderError;
use crate::line_items::{HEADERS, LineItem, RowKind, WIDTHS, line_items};
use crate::logo::Logo;
use crate::metrics::{Font, wrap};
use crate::pdf::{Watermark, write_pdf};

const MARGINS: Margins = Margins {
    left: 30.0,
    right: 30.0,
    top: 30.0,
    bottom: 18.0,
};
/// 30 mm.
const LOGO_EXTENT: f32 = 85.04;
const WATERMARK: Watermark = Watermark {
    extent: 450.0,
    opacity: 0.08,
};

const TABLE_WIDTH: f32 = 500.0;
const CELL_PAD_X: f32 = 6.0;
const CELL_PAD_Y: f32 = 4.0;
const HEADER_FILL: Rgb = Rgb::hex(0x1976d2);
const PLAN_FILL: Rgb = Rgb::hex(0xe3f2fd);
const TOTAL_FILL: Rgb = Rgb::hex(0xffe082);

const TITLE: Style = Style::new(Font::Bold, 16.0);
const SUBTITLE: Style = Style::new(Font::Regular, 10.0);
const SUPPLIER_NAME: Style = Style::new(Font::Bold, 14.0);
const BODY: Style = Style::new(Font::Regular, 9.0);
const LABEL: Style = Style::new(Font::Bold, 9.0);
const LEADING: f32 = 12.0;

/// Issuer identity printed on every invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierProfile {
    pub name: String,
    pub address: String,
    pub gstin: String,
    pub phone: String,
    pub email: String,
    pub place_of_supply: String,
    /// Service classification code of the plan line.
    pub hsn_code: String,
}

impl Default for SupplierProfile {
    fn default() -> Self {
        Self {
            name: "THUNDERSTORM FIBERNET".into(),
            address: "D-2/539, Shiv Durga Vihar, Lakkarpur, Faridabad, HR - 121009".into(),
            gstin: "06DJVPP9834G1ZD".into(),
            phone: "8585986890".into(),
            email: "thunderstromfibernet@gmail.com".into(),
            place_of_supply: "Haryana".into(),
            hsn_code: "998422".into(),
        }
    }
}

/// Degraded-render condition. The document is still produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderWarning {
    LogoMissing { path: PathBuf },
    LogoNotPng { path: PathBuf },
    LogoUnreadable { path: PathBuf, reason: String },
}

impl core::fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RenderWarning::LogoMissing { path } => {
                write!(f, "logo not found at {}", path.display())
            }
            RenderWarning::LogoNotPng { path } => {
                write!(f, "logo at {} is not a PNG image", path.display())
            }
            RenderWarning::LogoUnreadable { path, reason } => {
                write!(f, "logo at {} could not be read: {reason}", path.display())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub warnings: Vec<RenderWarning>,
}

impl RenderedDocument {
    /// Write the document as `dir/filename`. An existing file is never
    /// overwritten; the content appears under its final name atomically.
    pub fn write_to(&self, dir: &Path, filename: &str) -> Result<PathBuf, RenderError> {
        let path = dir.join(filename);
        let write_err = |source| RenderError::Write {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(dir).map_err(write_err)?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&self.bytes).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;

        match tmp.persist_noclobber(&path) {
            Ok(_) => {
                tracing::info!(path = %path.display(), bytes = self.bytes.len(), "invoice document written");
                Ok(path)
            }
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(RenderError::AlreadyExists(path))
            }
            Err(e) => Err(RenderError::Write {
                path,
                source: e.error,
            }),
        }
    }
}

pub struct DocumentRenderer {
    supplier: SupplierProfile,
    tax_rate: TaxRate,
    logo_path: Option<PathBuf>,
}

impl DocumentRenderer {
    pub fn new(supplier: SupplierProfile, tax_rate: TaxRate) -> Self {
        Self {
            supplier,
            tax_rate,
            logo_path: None,
        }
    }

    pub fn with_logo(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo_path = Some(path.into());
        self
    }

    pub fn supplier(&self) -> &SupplierProfile {
        &self.supplier
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Lay out and serialize `draft` as invoice `invoice_number` dated
    /// `issue_date`. Nothing is written to disk.
    pub fn render(
        &self,
        draft: &InvoiceDraft,
        invoice_number: &str,
        issue_date: NaiveDate,
    ) -> Result<RenderedDocument, RenderError> {
        draft.validate()?;
        DomainError::require("Invoice Number", invoice_number)?;

        let mut warnings = Vec::new();
        let logo = self
            .logo_path
            .as_deref()
            .and_then(|path| match Logo::load(path) {
                Ok(logo) => Some(logo),
                Err(warning) => {
                    tracing::warn!(%warning, "rendering invoice without logo");
                    warnings.push(warning);
                    None
                }
            });

        let totals = draft.totals(self.tax_rate);
        let rows = line_items(
            &draft.plan,
            draft.months,
            &self.supplier.hsn_code,
            &totals,
            self.tax_rate,
        );

        let mut canvas = Canvas::new(MARGINS);
        canvas.space(30.0);
        if let Some(logo) = &logo {
            logo_block(&mut canvas, logo);
        }
        canvas.space(12.0);
        title_block(&mut canvas);
        supplier_block(&mut canvas, &self.supplier);
        info_block(&mut canvas, draft, invoice_number, issue_date, &self.supplier);
        item_table(&mut canvas, &rows);
        notes_block(&mut canvas, &draft.notes);
        payment_block(&mut canvas, draft, issue_date);
        footer(&mut canvas, &self.supplier);

        let pages = canvas.into_pages();
        let page_count = pages.len();
        let bytes = write_pdf(
            &pages,
            logo.as_ref(),
            WATERMARK,
            &format!("Tax Invoice {invoice_number}"),
        );

        tracing::debug!(
            invoice_number,
            page_count,
            size = bytes.len(),
            warnings = warnings.len(),
            "invoice rendered"
        );
        Ok(RenderedDocument {
            bytes,
            page_count,
            warnings,
        })
    }
}

fn table_left(canvas: &Canvas) -> f32 {
    canvas.left() + (canvas.content_width() - TABLE_WIDTH).max(0.0) / 2.0
}

fn centered(canvas: &mut Canvas, style: Style, text: &str) {
    let (x, width) = (canvas.left(), canvas.content_width());
    canvas.text_at(x, width, Align::Center, style, text);
}

fn logo_block(canvas: &mut Canvas, logo: &Logo) {
    let (w, h) = logo.fit(LOGO_EXTENT);
    canvas.ensure(h);
    let x = canvas.left() + (canvas.content_width() - w) / 2.0;
    let y = canvas.y_below(h);
    canvas.push(Op::Logo { x, y, w, h });
    canvas.advance(h);
}

fn title_block(canvas: &mut Canvas) {
    canvas.ensure(40.0);
    centered(canvas, TITLE, "TAX INVOICE");
    canvas.advance(20.0);
    centered(canvas, SUBTITLE, "(Original for recipient)");
    canvas.advance(16.0);
    canvas.space(12.0);
}

fn supplier_block(canvas: &mut Canvas, supplier: &SupplierProfile) {
    canvas.ensure(18.0);
    centered(canvas, SUPPLIER_NAME, &supplier.name);
    canvas.advance(18.0);

    let width = canvas.content_width();
    let address = wrap(
        &format!("Supplier Address: {}", supplier.address),
        SUBTITLE.font,
        SUBTITLE.size,
        width,
    );
    canvas.paragraph(&address, Align::Center, SUBTITLE, 13.0);
    let contact = wrap(
        &format!(
            "Supplier GSTIN: {}    Phone No: {}    Email: {}",
            supplier.gstin, supplier.phone, supplier.email
        ),
        SUBTITLE.font,
        SUBTITLE.size,
        width,
    );
    canvas.paragraph(&contact, Align::Center, SUBTITLE, 13.0);
    canvas.space(20.0);
}

/// One printed line of a `Label: value` field. The label sits on the first
/// line; continuation lines hang under the value.
struct LabelledLine {
    label: Option<&'static str>,
    indent: f32,
    text: String,
}

fn labelled_lines(fields: &[(&'static str, String)], width: f32) -> Vec<LabelledLine> {
    let mut out = Vec::new();
    for (label, value) in fields {
        let indent = LABEL.width(label) + BODY.width(" ");
        let lines = wrap(value, BODY.font, BODY.size, (width - indent).max(40.0));
        out.extend(lines.into_iter().enumerate().map(|(i, text)| LabelledLine {
            label: (i == 0).then_some(*label),
            indent,
            text,
        }));
    }
    out
}

fn draw_labelled(canvas: &mut Canvas, x: f32, line: &LabelledLine) {
    if let Some(label) = line.label {
        canvas.text_at(x, 0.0, Align::Left, LABEL, label);
    }
    canvas.text_at(x + line.indent, 0.0, Align::Left, BODY, &line.text);
}

fn info_block(
    canvas: &mut Canvas,
    draft: &InvoiceDraft,
    invoice_number: &str,
    issue_date: NaiveDate,
    supplier: &SupplierProfile,
) {
    let column = TABLE_WIDTH / 2.0;
    let inner = column - 2.0 * CELL_PAD_X;
    let customer = &draft.customer;

    let left = labelled_lines(
        &[
            ("Customer Address:", customer.address.clone()),
            ("Place of Supply:", supplier.place_of_supply.clone()),
            ("Customer GSTIN:", customer.gstin.clone()),
        ],
        inner,
    );
    let right = labelled_lines(
        &[
            ("Invoice Number:", invoice_number.to_string()),
            (
                "Invoice Date:",
                issue_date.format(DISPLAY_DATE_FORMAT).to_string(),
            ),
            ("Tenant Name:", customer.tenant_name.clone()),
            ("Customer Id:", customer.customer_id.to_string()),
            (
                "Billing Period:",
                format!(
                    "{} - {}",
                    timefmt::format_date(&draft.period.from),
                    timefmt::format_date(&draft.period.to)
                ),
            ),
            ("Months:", draft.months.to_string()),
        ],
        inner,
    );

    let x_left = table_left(canvas) + CELL_PAD_X;
    let x_right = x_left + column;
    for i in 0..left.len().max(right.len()) {
        canvas.ensure(LEADING);
        if let Some(line) = left.get(i) {
            draw_labelled(canvas, x_left, line);
        }
        if let Some(line) = right.get(i) {
            draw_labelled(canvas, x_right, line);
        }
        canvas.advance(LEADING);
    }
    canvas.space(12.0);
}

struct Cell<'a> {
    x: f32,
    width: f32,
    align: Align,
    style: Style,
    text: &'a str,
}

fn row_cells(x0: f32, row: &LineItem) -> Vec<Cell<'_>> {
    let mut xs = [0.0f32; 8];
    let mut acc = x0;
    for (slot, w) in xs.iter_mut().zip(WIDTHS) {
        *slot = acc;
        acc += w;
    }

    match row.kind {
        RowKind::Plan => (0..8)
            .map(|i| Cell {
                x: xs[i],
                width: WIDTHS[i],
                align: if i == 1 { Align::Left } else { Align::Center },
                style: Style::new(Font::Regular, if i == 1 { 8.0 } else { 9.0 }),
                text: &row.cells[i],
            })
            .collect(),
        RowKind::Adjustment | RowKind::Total => {
            let font = if row.kind == RowKind::Total {
                Font::Bold
            } else {
                Font::Regular
            };
            vec![
                Cell {
                    x: xs[0],
                    width: WIDTHS[0],
                    align: Align::Center,
                    style: BODY,
                    text: &row.cells[0],
                },
                Cell {
                    x: xs[1],
                    width: WIDTHS[1..7].iter().sum(),
                    align: Align::Left,
                    style: Style::new(font, 9.0),
                    text: &row.cells[1],
                },
                Cell {
                    x: xs[7],
                    width: WIDTHS[7],
                    align: Align::Right,
                    style: Style::new(font, 9.0),
                    text: &row.cells[7],
                },
            ]
        }
    }
}

fn header_row(canvas: &mut Canvas, x0: f32) {
    let style = Style::new(Font::Bold, 10.0).color(Rgb::WHITE);
    let height = style.size + 2.0 * CELL_PAD_Y + 4.0;
    let y = canvas.y_below(height);
    canvas.push(Op::FillRect {
        x: x0,
        y,
        w: TABLE_WIDTH,
        h: height,
        color: HEADER_FILL,
    });
    let mut x = x0;
    for (title, w) in HEADERS.iter().zip(WIDTHS) {
        canvas.push(Op::StrokeRect { x, y, w, h: height });
        canvas.text_below(CELL_PAD_Y, x, w, Align::Center, style, title);
        x += w;
    }
    canvas.advance(height);
}

fn item_table(canvas: &mut Canvas, rows: &[LineItem]) {
    let x0 = table_left(canvas);
    canvas.ensure(60.0);
    header_row(canvas, x0);

    for row in rows {
        let cells = row_cells(x0, row);
        let wrapped: Vec<Vec<String>> = cells
            .iter()
            .map(|c| match c.align {
                // text columns wrap; figures stay on one line
                Align::Left => wrap(c.text, c.style.font, c.style.size, c.width - 2.0 * CELL_PAD_X),
                _ => vec![c.text.to_string()],
            })
            .collect();
        let line_height = |c: &Cell<'_>| c.style.size + 3.0;
        let height = cells
            .iter()
            .zip(&wrapped)
            .map(|(c, lines)| lines.len() as f32 * line_height(c))
            .fold(0.0f32, f32::max)
            + 2.0 * CELL_PAD_Y;

        if canvas.ensure(height) {
            header_row(canvas, x0);
        }

        let y = canvas.y_below(height);
        let fill = match row.kind {
            RowKind::Plan => Some(PLAN_FILL),
            RowKind::Total => Some(TOTAL_FILL),
            RowKind::Adjustment => None,
        };
        if let Some(color) = fill {
            canvas.push(Op::FillRect {
                x: x0,
                y,
                w: TABLE_WIDTH,
                h: height,
                color,
            });
        }

        for (cell, lines) in cells.iter().zip(&wrapped) {
            canvas.push(Op::StrokeRect {
                x: cell.x,
                y,
                w: cell.width,
                h: height,
            });
            let lh = line_height(cell);
            let top = (height - lines.len() as f32 * lh) / 2.0;
            for (i, line) in lines.iter().enumerate() {
                canvas.text_below(
                    top + i as f32 * lh,
                    cell.x + CELL_PAD_X,
                    cell.width - 2.0 * CELL_PAD_X,
                    cell.align,
                    cell.style,
                    line,
                );
            }
        }
        canvas.advance(height);
    }
    canvas.space(12.0);
}

fn labelled_paragraph(canvas: &mut Canvas, label: &'static str, text: String) {
    let x = table_left(canvas);
    for line in labelled_lines(&[(label, text)], TABLE_WIDTH) {
        canvas.ensure(LEADING);
        draw_labelled(canvas, x, &line);
        canvas.advance(LEADING);
    }
}

fn notes_block(canvas: &mut Canvas, notes: &str) {
    let notes = notes.trim();
    if notes.is_empty() {
        return;
    }
    labelled_paragraph(canvas, "Notes:", notes.to_string());
    canvas.space(6.0);
}

/// Payment line text for an invoice paid (in full or in part) at issuance.
pub(crate) fn payment_status_text(draft: &InvoiceDraft, paid_on: NaiveDate) -> Option<String> {
    let date = timefmt::format_date(&paid_on);
    let method = draft
        .payment_method()
        .map(|m| format!(" ({m})"))
        .unwrap_or_default();
    match draft.payment_status {
        PaymentStatus::Unpaid => None,
        PaymentStatus::Partial => Some(format!("Partial payment on {date}{method}")),
        PaymentStatus::Paid => Some(format!("Paid on {date}{method}")),
    }
}

fn payment_block(canvas: &mut Canvas, draft: &InvoiceDraft, issue_date: NaiveDate) {
    if let Some(text) = payment_status_text(draft, issue_date) {
        labelled_paragraph(canvas, "Payment Status:", text);
        canvas.space(6.0);
    }
}

fn footer(canvas: &mut Canvas, supplier: &SupplierProfile) {
    let x = table_left(canvas);
    canvas.space(6.0);
    let lines = [
        "This is a computer generated bill and does not require signature.".to_string(),
        format!("For queries and complaints contact: {}", supplier.phone),
    ];
    for line in &lines {
        canvas.ensure(LEADING);
        canvas.text_at(x, TABLE_WIDTH, Align::Left, BODY, line);
        canvas.advance(LEADING);
    }
}
