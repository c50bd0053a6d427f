//! Spreadsheet export of a lead list.
//!
//! The file opens directly in spreadsheet tools configured for pt-BR: a UTF-8
//! byte-order mark precedes the header and every text field is quoted.

use std::fmt::Write as _;

use skopus_core::text::safe_file_component;
use skopus_core::Lead;

const BOM: char = '\u{FEFF}';
const HEADER: &str = "Empresa,Avaliação,Instagram,WhatsApp,Endereço";

/// Renders `leads` in list order. An empty list yields the header only.
#[must_use]
pub fn leads_to_csv(leads: &[Lead]) -> String {
    let mut out = String::with_capacity(64 + leads.len() * 96);
    out.push(BOM);
    out.push_str(HEADER);

    for lead in leads {
        let rating = lead.rating.map(|r| r.to_string()).unwrap_or_default();
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "\n{},{},{},{},{}",
            quote(&lead.name),
            rating,
            quote(lead.instagram_handle.as_deref().unwrap_or_default()),
            quote(lead.whatsapp_number.as_deref().unwrap_or_default()),
            quote(&lead.address),
        );
    }
    out
}

/// `leads_{niche}.csv`, or `leads_skopu.csv` when the niche is blank. Path
/// separators in the niche become `_`.
#[must_use]
pub fn csv_file_name(niche: &str) -> String {
    let niche = niche.trim();
    if niche.is_empty() {
        "leads_skopu.csv".to_owned()
    } else {
        format!("leads_{}.csv", safe_file_component(niche))
    }
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
