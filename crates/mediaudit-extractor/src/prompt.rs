//! Prompt engineering and request assembly for the extraction flows

use mediaudit_llm::Part;
use serde_json::{json, Value};

/// Which campaign document a file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Insertion order (PI)
    InsertionOrder,
    /// Commercial proposal
    Proposal,
    /// Email thread export
    EmailThread,
    /// Technical media plan (OPEC)
    TechnicalPlan,
}

impl DocumentKind {
    /// Label announced to the model before the document bytes.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::InsertionOrder => "PI",
            DocumentKind::Proposal => "PROPOSAL",
            DocumentKind::EmailThread => "EMAIL",
            DocumentKind::TechnicalPlan => "OPEC",
        }
    }
}

/// One uploaded source document, already converted to bytes.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Which campaign document this is
    pub kind: DocumentKind,
    /// Original file name
    pub file_name: String,
    /// Mime type; empty falls back to `application/pdf`
    pub mime_type: String,
    /// Raw file bytes
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    fn effective_mime(&self) -> &str {
        if self.mime_type.is_empty() {
            "application/pdf"
        } else {
            &self.mime_type
        }
    }
}

/// System instruction for the bulk campaign extraction.
pub const CAMPAIGN_SYSTEM_INSTRUCTION: &str = r#"You are a SENIOR MEDIA AUDITOR.
Your mission is the extraction of strategic, technical and legal data with TOTAL RIGOR.

EXTRACTION DIRECTIVES (CRITICAL):
1. DO NOT SUMMARIZE TABLES: in 'pmProposalStrategies' and 'pmOpecStrategies', extract EVERY individual media-plan row. Do not group rows or summarize technical content. If the document has 10 strategy rows, the JSON must contain 10 objects in these arrays.
2. TECHNICAL PRESERVATION: keep platform names and KPIs exactly as they appear in the documents.
3. TEXT LIMIT: paragraph fields (objective, tactic) are capped at 1000 characters, but LISTS and TABLES (strategies) have no item-count limit.
4. AUDIT: compare the documents and point out inconsistencies between them.
5. AUDIT (MANDATORY): in 'audit', generate EXACTLY 9 items, one per 'field' from this list (use the key exactly as written): startDate, endDate, grossBudget, netBudget, totalImpressions, soldCPM, campaignObjective, ctrCheck, targetLocations. For each item fill piValue/proposalValue/emailValue/pmValue with the value found in each document (or '-' when absent). Set isConsistent=true only when the values are equivalent; otherwise false. notes must explain the divergence in 1 sentence.

JSON FORMAT RULES:
- Return ONLY the raw JSON.
- The JSON root must be an OBJECT (not an array).
- ALWAYS use the keys and structures of the requested schema, even when no data exists.
- When information is missing: use "-" for strings, 0 for numbers, [] for lists.
- Escape inner quotes: \"example\".
- Use a decimal point in numbers."#;

/// Prompt text preceding the document parts of the bulk extraction.
pub const CAMPAIGN_PROMPT: &str = r#"ORCHESTRATION AND SOURCE MAP (MANDATORY):
- SOURCE: PI => use for startDate/endDate, purchase data and legal entities (piEntities).
- SOURCE: PROPOSAL => use for the commercial plan and gross/net budget when present.
- SOURCE: OPEC => use for the technical plan (pmOpecStrategies) and specifications (piSpecifics when applicable).
- SOURCE: EMAIL => use for emails[] (thread summary) and to confirm/adjust values (audit).

FILL RULES:
- totalBudget: GROSS budget (number). Convert currency (e.g. "R$ 123.456,78" => 123456.78).
- netValue: NET budget (number). Convert currency the same way.
- startDate/endDate: keep the string format as written (e.g. dd/mm/yyyy). On divergence, use the PI in the main fields and record the divergence in the audit.
- objective/marketingTactic: short text (<= 1000 chars).
- primaryKpis/kpis: lists of strings.
- emails: each item with an incremental id starting at 1, date/sender/summary/type; type must be: initial | negotiation | approval (use negotiation when unsure).
- pmProposalStrategies: extract EVERY ROW of the commercial plan table (PROPOSAL), without grouping.
- pmOpecStrategies: extract EVERY ROW of the technical plan (OPEC), without grouping.
- techFeatures: when there is no explicit indication, use false.

AUDIT (MANDATORY):
- Generate EXACTLY 9 items with id 1..9 and field exactly: startDate, endDate, grossBudget, netBudget, totalImpressions, soldCPM, campaignObjective, ctrCheck, targetLocations.
- Fill piValue/proposalValue/emailValue/pmValue with the value found in each file (or "-" when absent).
- isConsistent=true only when equivalent; otherwise false. notes: 1 explanatory sentence."#;

/// System instruction for the email thread update extraction.
pub const EMAIL_SYSTEM_INSTRUCTION: &str = r#"You are a SENIOR MEDIA AUDITOR.
Extract ONLY the email timeline from the provided file.

RULES:
1. Return ONLY raw JSON.
2. Fill 'emails' with EVERY relevant email in chronological order.
3. The 'type' field must be one of: initial | negotiation | approval.
4. Keep 'summary' objective (400 characters maximum)."#;

/// Prompt for the email thread update extraction.
pub const EMAIL_PROMPT: &str = "Extract the email thread from the file. Do not collapse \
the thread into 1 item; produce multiple 'emails' entries when applicable.";

/// System instruction for the performance report extraction.
pub const REPORT_SYSTEM_INSTRUCTION: &str = r#"You are a SENIOR MEDIA AUDITOR.
Extract and structure a performance REPORT from the provided file (PDF or XLSX).

RULES:
1. Return ONLY raw JSON.
2. ctr must be a PERCENTUAL number (0 to 100).
3. In publishers, use standardized names without duplicating variations of the same publisher.
4. In demographics, use percentual share (0 to 100) when available.
5. In goalsCheck, cross the report with the briefing context and state whether goals were met."#;

fn strategy_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "id": {"type": "INTEGER"},
            "platform": {"type": "STRING"},
            "tactic": {"type": "STRING"},
            "format": {"type": "STRING"},
            "bidModel": {"type": "STRING"},
            "bidValue": {"type": "NUMBER"},
            "totalCost": {"type": "NUMBER"},
            "impressionGoal": {"type": "NUMBER"},
            "techFeatures": {
                "type": "OBJECT",
                "properties": {
                    "hasFirstParty": {"type": "BOOLEAN"},
                    "hasFootfall": {"type": "BOOLEAN"},
                    "isRichMedia": {"type": "BOOLEAN"},
                    "isCrossDevice": {"type": "BOOLEAN"}
                },
                "required": ["hasFirstParty", "hasFootfall", "isRichMedia", "isCrossDevice"]
            }
        },
        "required": ["id", "platform", "tactic", "format", "bidModel", "bidValue", "totalCost", "impressionGoal", "techFeatures"]
    })
}

/// Target output schema for the bulk campaign extraction.
pub fn campaign_response_schema() -> Value {
    let strategy = strategy_schema();
    json!({
        "type": "OBJECT",
        "properties": {
            "clientName": {"type": "STRING"},
            "campaignName": {"type": "STRING"},
            "startDate": {"type": "STRING"},
            "endDate": {"type": "STRING"},
            "totalBudget": {"type": "NUMBER"},
            "netValue": {"type": "NUMBER"},
            "piEntities": {
                "type": "OBJECT",
                "properties": {
                    "razaoSocial": {"type": "STRING"},
                    "vehicle": {"type": "STRING"}
                },
                "required": ["razaoSocial", "vehicle"]
            },
            "objective": {"type": "STRING"},
            "marketingTactic": {"type": "STRING"},
            "emails": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": {"type": "INTEGER"},
                        "date": {"type": "STRING"},
                        "sender": {"type": "STRING"},
                        "summary": {"type": "STRING"},
                        "type": {"type": "STRING"}
                    },
                    "required": ["id", "date", "sender", "summary", "type"]
                }
            },
            "pmProposalStrategies": {"type": "ARRAY", "items": strategy.clone()},
            "pmOpecStrategies": {"type": "ARRAY", "items": strategy},
            "audit": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": {"type": "INTEGER"},
                        "field": {"type": "STRING"},
                        "piValue": {"type": "STRING"},
                        "proposalValue": {"type": "STRING"},
                        "emailValue": {"type": "STRING"},
                        "pmValue": {"type": "STRING"},
                        "isConsistent": {"type": "BOOLEAN"},
                        "notes": {"type": "STRING"}
                    },
                    "required": ["id", "field", "piValue", "proposalValue", "emailValue", "pmValue", "isConsistent", "notes"]
                }
            },
            "targeting": {
                "type": "OBJECT",
                "properties": {
                    "geo": {"type": "ARRAY", "items": {"type": "STRING"}},
                    "demographics": {"type": "ARRAY", "items": {"type": "STRING"}},
                    "interests": {"type": "ARRAY", "items": {"type": "STRING"}},
                    "devices": {"type": "ARRAY", "items": {"type": "STRING"}},
                    "brandSafety": {"type": "STRING"}
                },
                "required": ["geo", "demographics", "interests", "devices", "brandSafety"]
            },
            "legal": {
                "type": "OBJECT",
                "properties": {
                    "paymentTerms": {"type": "STRING"},
                    "agencyCommission": {"type": "STRING"},
                    "cancellationPolicy": {"type": "STRING"},
                    "penalty": {"type": "STRING"}
                },
                "required": ["paymentTerms", "agencyCommission", "cancellationPolicy", "penalty"]
            },
            "piSpecifics": {
                "type": "OBJECT",
                "properties": {
                    "description": {"type": "STRING"},
                    "considerations": {"type": "STRING"}
                },
                "required": ["description", "considerations"]
            },
            "primaryKpis": {"type": "ARRAY", "items": {"type": "STRING"}},
            "kpis": {"type": "ARRAY", "items": {"type": "STRING"}},
            "links": {
                "type": "OBJECT",
                "properties": {
                    "proposal": {"type": "STRING"},
                    "pi": {"type": "STRING"},
                    "priceTable": {"type": "STRING"},
                    "emailThread": {"type": "STRING"},
                    "creative": {"type": "STRING"},
                    "addresses": {"type": "STRING"},
                    "destinationUrls": {"type": "ARRAY", "items": {"type": "STRING"}}
                },
                "required": ["proposal", "pi", "priceTable", "emailThread", "creative", "addresses", "destinationUrls"]
            }
        },
        "required": [
            "clientName", "campaignName", "startDate", "endDate", "totalBudget",
            "netValue", "piEntities", "objective", "marketingTactic", "emails",
            "pmProposalStrategies", "pmOpecStrategies", "audit", "targeting",
            "legal", "piSpecifics", "primaryKpis", "kpis", "links"
        ]
    })
}

/// Target output schema for the email thread update extraction.
pub fn email_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "emails": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": {"type": "INTEGER"},
                        "date": {"type": "STRING"},
                        "sender": {"type": "STRING"},
                        "summary": {"type": "STRING"},
                        "type": {"type": "STRING"}
                    }
                }
            }
        }
    })
}

/// Target output schema for the performance report extraction.
pub fn report_response_schema() -> Value {
    let breakdown = json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "label": {"type": "STRING"},
                "share": {"type": "NUMBER"}
            }
        }
    });
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "OBJECT",
                "properties": {
                    "impressions": {"type": "INTEGER"},
                    "clicks": {"type": "INTEGER"},
                    "ctr": {"type": "NUMBER"}
                }
            },
            "publishers": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": {"type": "STRING"},
                        "impressions": {"type": "INTEGER"},
                        "clicks": {"type": "INTEGER"},
                        "ctr": {"type": "NUMBER"}
                    }
                }
            },
            "creatives": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": {"type": "STRING"},
                        "impressions": {"type": "INTEGER"},
                        "clicks": {"type": "INTEGER"},
                        "ctr": {"type": "NUMBER"}
                    }
                }
            },
            "demographics": {
                "type": "OBJECT",
                "properties": {
                    "gender": breakdown.clone(),
                    "age": breakdown
                }
            },
            "considerations": {"type": "ARRAY", "items": {"type": "STRING"}},
            "goalsCheck": {
                "type": "OBJECT",
                "properties": {
                    "overallStatus": {"type": "STRING"},
                    "items": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "goal": {"type": "STRING"},
                                "target": {"type": "STRING"},
                                "actual": {"type": "STRING"},
                                "status": {"type": "STRING"},
                                "notes": {"type": "STRING"}
                            }
                        }
                    }
                }
            }
        }
    })
}

/// Build the multi-part campaign request: the orchestration prompt
/// followed by a label part and a binary part per document.
pub fn campaign_parts(documents: &[SourceDocument]) -> Vec<Part> {
    let mut parts = vec![Part::text(CAMPAIGN_PROMPT)];
    for doc in documents {
        parts.push(Part::text(format!("SOURCE: {}", doc.kind.label())));
        parts.push(Part::inline_bytes(doc.effective_mime(), &doc.bytes));
    }
    parts
}
