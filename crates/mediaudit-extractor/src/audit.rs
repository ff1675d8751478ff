//! Cross-document audit reconciliation
//!
//! Takes the raw, untrusted audit array the model produced (arbitrary
//! order, misspelled field labels, near-duplicates) and produces exactly
//! nine rows, one per canonical dimension, in canonical order. This is
//! the safety net that guarantees the consumer always has a well-shaped
//! audit table; it never fails, it only degrades to placeholders.

use mediaudit_domain::{AuditFieldKey, AuditItem, AUDIT_FIELD_KEYS};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Note attached to placeholder rows for dimensions the model skipped.
pub const MISSING_FIELD_NOTE: &str = "Field not returned by the AI.";

/// Fold a free-text field label for synonym lookup: lowercase, strip
/// diacritics, keep only ASCII alphanumerics.
fn normalize_label(raw: &str) -> String {
    raw.chars()
        .flat_map(|c| c.to_lowercase())
        .map(fold_diacritic)
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Map a raw field label to a canonical key, via the exact wire name or
/// the synonym table. Labels that map nowhere are discarded upstream.
fn canonical_key(raw: &str) -> Option<AuditFieldKey> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Exact wire names short-circuit the synonym table
    for key in AUDIT_FIELD_KEYS {
        if key.as_str() == trimmed {
            return Some(key);
        }
    }

    let normalized = normalize_label(trimmed);
    let key = match normalized.as_str() {
        "datainicio" | "datadeinicio" | "startdate" | "inicioveiculacao" | "inicio"
        | "iniciodacampanha" => AuditFieldKey::StartDate,
        "datatermino" | "datadetermino" | "enddate" | "fim" | "termino" => AuditFieldKey::EndDate,
        "investimentobruto" | "budgetbruto" | "valortotal" | "totalbudget" | "grossbudget" => {
            AuditFieldKey::GrossBudget
        }
        "investimentoliquido" | "budgetliquido" | "valorliquido" | "netvalue" | "netbudget" => {
            AuditFieldKey::NetBudget
        }
        "totaldeimpressoes" | "totalimpressions" | "impressoes" | "impressions"
        | "metaimpressoes" | "impressiongoal" => AuditFieldKey::TotalImpressions,
        "cpmvendido" | "cpmmedio" | "soldcpm" | "cpm" => AuditFieldKey::SoldCpm,
        "objetivodacampanha" | "objetivo" | "campaignobjective" => {
            AuditFieldKey::CampaignObjective
        }
        "ctrcheck" | "metactr" | "ctr" | "vtr" => AuditFieldKey::CtrCheck,
        "pracas" | "pracasenderecos" | "enderecos" | "geolocalizacao" | "localizacoes"
        | "targetlocations" | "geo" => AuditFieldKey::TargetLocations,
        _ => return None,
    };
    Some(key)
}

/// String / number / bool become text; everything else is the `"-"` sentinel.
fn coerce_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => "-".to_string(),
    }
}

const VALUE_FIELDS: [&str; 4] = ["piValue", "proposalValue", "emailValue", "pmValue"];

/// Completeness score: how many of the four observations carry a value.
fn score(item: &Map<String, Value>) -> usize {
    VALUE_FIELDS
        .iter()
        .map(|field| coerce_value(item.get(*field)))
        .filter(|v| {
            let v = v.trim();
            !v.is_empty() && v != "-"
        })
        .count()
}

/// Highest-scoring candidate; ties keep the first seen.
fn pick_best(candidates: &[Map<String, Value>]) -> Option<&Map<String, Value>> {
    let mut best: Option<(&Map<String, Value>, usize)> = None;
    for candidate in candidates {
        let s = score(candidate);
        match best {
            Some((_, best_score)) if s <= best_score => {}
            _ => best = Some((candidate, s)),
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Reconcile a raw audit array into exactly nine canonical rows.
///
/// Malformed or missing input degrades to placeholders; this function
/// never fails. The consistency tie-break treats the insertion order (PI)
/// as ground truth: when the model did not supply a boolean verdict, a
/// row is consistent only if all four values equal the PI value.
pub fn reconcile_audit(raw: Option<&Value>) -> Vec<AuditItem> {
    let items: &[Value] = match raw {
        Some(Value::Array(items)) => items,
        _ => &[],
    };

    let mut by_field: HashMap<AuditFieldKey, Vec<Map<String, Value>>> = HashMap::new();
    for item in items {
        let Value::Object(map) = item else { continue };
        let Some(label) = map.get("field").and_then(Value::as_str) else {
            continue;
        };
        let Some(key) = canonical_key(label) else {
            continue;
        };
        by_field.entry(key).or_default().push(map.clone());
    }

    AUDIT_FIELD_KEYS
        .iter()
        .map(|&field| {
            let candidates = by_field.get(&field).map(Vec::as_slice).unwrap_or(&[]);
            match pick_best(candidates) {
                Some(raw) => materialize(field, raw),
                None => AuditItem::placeholder(field, MISSING_FIELD_NOTE),
            }
        })
        .collect()
}

fn materialize(field: AuditFieldKey, raw: &Map<String, Value>) -> AuditItem {
    let pi_value = coerce_value(raw.get("piValue"));
    let proposal_value = coerce_value(raw.get("proposalValue"));
    let email_value = coerce_value(raw.get("emailValue"));
    let pm_value = coerce_value(raw.get("pmValue"));

    let is_consistent = match raw.get("isConsistent") {
        Some(Value::Bool(b)) => *b,
        _ => [&pi_value, &proposal_value, &email_value, &pm_value]
            .iter()
            .all(|v| **v == pi_value),
    };

    AuditItem {
        id: field.id(),
        field,
        pi_value,
        proposal_value,
        email_value,
        pm_value,
        is_consistent,
        notes: raw.get("notes").and_then(Value::as_str).map(String::from),
        manually_approved: raw.get("manuallyApproved").and_then(Value::as_bool),
        justification: raw
            .get("justification")
            .and_then(Value::as_str)
            .map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_is_always_nine_canonical_rows() {
        for raw in [
            None,
            Some(json!(null)),
            Some(json!("garbage")),
            Some(json!([])),
            Some(json!([{"field": "unknown thing", "piValue": "x"}])),
        ] {
            let items = reconcile_audit(raw.as_ref());
            assert_eq!(items.len(), 9);
            for (i, item) in items.iter().enumerate() {
                assert_eq!(item.id, i as u32 + 1);
                assert_eq!(item.field, AUDIT_FIELD_KEYS[i]);
            }
        }
    }

    #[test]
    fn test_synonym_labels_map_to_canonical_keys() {
        let raw = json!([
            {"field": "Início da Campanha", "piValue": "01/01/2025"},
            {"field": "Investimento Bruto", "piValue": "120000.50"},
            {"field": "CPM Médio", "piValue": "12.5"},
            {"field": "Praças / Endereços", "piValue": "SP, RJ"}
        ]);
        let items = reconcile_audit(Some(&raw));

        assert_eq!(items[0].field, AuditFieldKey::StartDate);
        assert_eq!(items[0].pi_value, "01/01/2025");
        assert_eq!(items[2].field, AuditFieldKey::GrossBudget);
        assert_eq!(items[2].pi_value, "120000.50");
        assert_eq!(items[5].field, AuditFieldKey::SoldCpm);
        assert_eq!(items[5].pi_value, "12.5");
        assert_eq!(items[8].field, AuditFieldKey::TargetLocations);
        assert_eq!(items[8].pi_value, "SP, RJ");
    }

    #[test]
    fn test_exact_wire_name_short_circuits() {
        let raw = json!([{"field": "soldCPM", "piValue": "10"}]);
        let items = reconcile_audit(Some(&raw));
        assert_eq!(items[5].pi_value, "10");
    }

    #[test]
    fn test_most_complete_candidate_wins() {
        let raw = json!([
            {"field": "startDate", "piValue": "01/01/2025", "emailValue": "-"},
            {"field": "Data de Início", "piValue": "01/01/2025", "proposalValue": "02/01/2025", "emailValue": "01/01/2025"}
        ]);
        let items = reconcile_audit(Some(&raw));
        assert_eq!(items[0].proposal_value, "02/01/2025");
        assert_eq!(items[0].email_value, "01/01/2025");
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        let raw = json!([
            {"field": "startDate", "piValue": "first"},
            {"field": "startDate", "piValue": "second"}
        ]);
        let items = reconcile_audit(Some(&raw));
        assert_eq!(items[0].pi_value, "first");
    }

    #[test]
    fn test_missing_dimension_gets_placeholder() {
        let raw = json!([{"field": "startDate", "piValue": "01/01/2025"}]);
        let items = reconcile_audit(Some(&raw));

        let net = &items[3];
        assert_eq!(net.field, AuditFieldKey::NetBudget);
        assert_eq!(net.pi_value, "-");
        assert_eq!(net.proposal_value, "-");
        assert_eq!(net.email_value, "-");
        assert_eq!(net.pm_value, "-");
        assert!(!net.is_consistent);
        assert_eq!(net.notes.as_deref(), Some(MISSING_FIELD_NOTE));
    }

    #[test]
    fn test_consistency_boolean_taken_verbatim() {
        let raw = json!([{
            "field": "grossBudget",
            "piValue": "100", "proposalValue": "200",
            "emailValue": "300", "pmValue": "400",
            "isConsistent": true
        }]);
        let items = reconcile_audit(Some(&raw));
        assert!(items[2].is_consistent);
    }

    #[test]
    fn test_consistency_computed_against_pi_value() {
        let agreeing = json!([{
            "field": "grossBudget",
            "piValue": "100", "proposalValue": "100",
            "emailValue": "100", "pmValue": "100"
        }]);
        assert!(reconcile_audit(Some(&agreeing))[2].is_consistent);

        // Values agreeing with each other but not with PI stay inconsistent
        let diverging = json!([{
            "field": "grossBudget",
            "piValue": "100", "proposalValue": "200",
            "emailValue": "200", "pmValue": "200"
        }]);
        assert!(!reconcile_audit(Some(&diverging))[2].is_consistent);
    }

    #[test]
    fn test_value_coercion_handles_numbers_and_booleans() {
        let raw = json!([{
            "field": "totalImpressions",
            "piValue": 2500000,
            "proposalValue": true,
            "emailValue": {"nested": "object"},
            "pmValue": null
        }]);
        let items = reconcile_audit(Some(&raw));
        let item = &items[4];
        assert_eq!(item.pi_value, "2500000");
        assert_eq!(item.proposal_value, "true");
        assert_eq!(item.email_value, "-");
        assert_eq!(item.pm_value, "-");
    }

    #[test]
    fn test_reviewer_overrides_survive_reconciliation() {
        let raw = json!([{
            "field": "endDate",
            "piValue": "31/03/2025", "proposalValue": "30/03/2025",
            "emailValue": "-", "pmValue": "-",
            "isConsistent": false,
            "manuallyApproved": true,
            "justification": "Client confirmed the PI date by phone."
        }]);
        let items = reconcile_audit(Some(&raw));
        assert_eq!(items[1].manually_approved, Some(true));
        assert_eq!(
            items[1].justification.as_deref(),
            Some("Client confirmed the PI date by phone.")
        );
    }

    #[test]
    fn test_label_normalization() {
        assert_eq!(normalize_label("Data de Início"), "datadeinicio");
        assert_eq!(normalize_label("PRAÇAS / ENDEREÇOS"), "pracasenderecos");
        assert_eq!(canonical_key("  "), None);
        assert_eq!(canonical_key("Meta CTR"), Some(AuditFieldKey::CtrCheck));
    }
}
