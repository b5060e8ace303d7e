//! Offline sample database for demos and EMR integration tests.
//!
//! Produces the same CSV shape as `dur collect` plus a JSON document for the
//! EMR prescription guide, without touching the network. All data here is
//! static reference data.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::path::Path;

use crate::export::{self, WriteSummary};
use crate::logging::LogSink;
use crate::models::ProcessedItem;

/// `(drug_name, ingredient, interaction_type, caution_text)`.
type Row = (&'static str, &'static str, &'static str, &'static str);

/// Hypertension and diabetes products, then combination products.
pub static SAMPLE_DRUGS: &[Row] = &[
    ("아몰디핀정 5mg", "Amlodipine", "병용금기", "베타차단제와 병용 시 저혈압 유발 가능"),
    ("로사르탄정 50mg", "Losartan", "주의", "칼륨 보유 이뇨제와 병용 시 고칼륨혈증 주의"),
    ("메토프롤롤정 50mg", "Metoprolol", "병용금기", "기관지천식 환자에게 금기"),
    ("캅토프릴정 25mg", "Captopril", "주의", "신장기능 저하 환자에서 용량 조절 필요"),
    ("발사르탄정 80mg", "Valsartan", "주의", "임신 중 사용 금지"),
    ("다이아벡스정 500mg", "Metformin", "주의", "신장기능 저하 환자에서 용량 조절 필요"),
    ("글리메피리드정 2mg", "Glimepiride", "주의", "간기능 저하 환자에서 저혈당 위험 증가"),
    ("글리피지드정 5mg", "Glipizide", "주의", "신장기능 저하 시 용량 감소 필요"),
    ("시타글립틴정 100mg", "Sitagliptin", "주의", "췌장염 병력 환자에서 주의"),
    ("인슐린 글라르진", "Insulin Glargine", "주의", "저혈당 위험으로 인한 주의 깊은 모니터링 필요"),
    ("아몰디핀/발사르탄정", "Amlodipine/Valsartan", "주의", "두 성분의 상호작용으로 인한 부작용 모니터링 필요"),
    ("메트포르민/시타글립틴정", "Metformin/Sitagliptin", "주의", "신장기능 저하 시 용량 조절 필요"),
];

/// Drug-class rows appended to the CSV.
pub static DRUG_CLASSES: &[Row] = &[
    ("ACE 억제제", "ACE Inhibitors", "약물군", "고칼륨혈증, 신장기능 악화 주의"),
    ("ARB", "Angiotensin Receptor Blockers", "약물군", "임신 중 사용 금지, 고칼륨혈증 주의"),
    ("베타차단제", "Beta Blockers", "약물군", "기관지천식, 심부전 악화 주의"),
    ("설포닐우레아", "Sulfonylureas", "약물군", "저혈당 위험, 신장기능 저하 시 주의"),
    ("빅아나이드", "Biguanides", "약물군", "신장기능 저하 시 젖산산증 위험"),
];

/// Ingredient → interacting substance → effect.
pub static INTERACTION_MATRIX: &[(&str, &[(&str, &str)])] = &[
    (
        "Amlodipine",
        &[
            ("Metoprolol", "저혈압 위험 증가"),
            ("Digoxin", "디곡신 혈중농도 증가"),
            ("Grapefruit", "아몰디핀 효과 증가"),
        ],
    ),
    (
        "Metformin",
        &[
            ("Contrast_media", "신장독성 위험"),
            ("Alcohol", "젖산산증 위험"),
            ("Furosemide", "신장기능 악화"),
        ],
    ),
    (
        "Losartan",
        &[
            ("Potassium_sparing_diuretics", "고칼륨혈증"),
            ("NSAIDs", "신장기능 악화"),
            ("Lithium", "리튬 독성"),
        ],
    ),
    (
        "Glimepiride",
        &[
            ("Warfarin", "항응고제 효과 증가"),
            ("Aspirin", "저혈당 위험"),
            ("Alcohol", "저혈당 위험"),
        ],
    ),
];

pub const INTERACTION_TYPE: &str = "상호작용";
pub const DESCRIPTION: &str = "고혈압/당뇨 관련 약물 상호작용 데이터";

/// Interactions recorded for `ingredient` (exact match).
pub fn interactions_for(ingredient: &str) -> &'static [(&'static str, &'static str)] {
    INTERACTION_MATRIX
        .iter()
        .find(|(name, _)| *name == ingredient)
        .map(|(_, entries)| *entries)
        .unwrap_or(&[])
}

fn to_item(row: &Row) -> ProcessedItem {
    ProcessedItem::new(row.0, row.1, row.2, row.3)
}

/// Every sample drug followed by one row per matrix interaction.
pub fn interaction_rows() -> Vec<ProcessedItem> {
    let mut rows = Vec::new();
    for drug in SAMPLE_DRUGS {
        rows.push(to_item(drug));
        for (other, effect) in interactions_for(drug.1) {
            rows.push(ProcessedItem::new(
                format!("{} + {}", drug.0, other),
                format!("{} + {}", drug.1, other),
                INTERACTION_TYPE,
                *effect,
            ));
        }
    }
    rows
}

pub fn category_rows() -> Vec<ProcessedItem> {
    DRUG_CLASSES.iter().map(to_item).collect()
}

/// Interaction rows plus class rows, written through the regular writer.
pub fn write_csv(path: &Path, log: &dyn LogSink) -> Result<Option<WriteSummary>> {
    let mut rows = interaction_rows();
    rows.extend(category_rows());
    export::write(&rows, path, log)
}

/// Serializes [`INTERACTION_MATRIX`] as a nested object in declaration order.
pub struct MatrixView;

impl Serialize for MatrixView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut outer = serializer.serialize_map(Some(INTERACTION_MATRIX.len()))?;
        for (ingredient, entries) in INTERACTION_MATRIX {
            outer.serialize_entry(ingredient, &Entries(*entries))?;
        }
        outer.end()
    }
}

struct Entries(&'static [(&'static str, &'static str)]);

impl Serialize for Entries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (*k, *v)))
    }
}

#[derive(Serialize)]
pub struct EmrMetadata {
    pub generated_at: String,
    pub total_drugs: usize,
    pub description: &'static str,
}

#[derive(Serialize)]
pub struct EmrDocument {
    pub metadata: EmrMetadata,
    pub drugs: Vec<ProcessedItem>,
    pub interaction_matrix: MatrixView,
}

pub fn emr_document(generated_at: DateTime<Local>) -> EmrDocument {
    let drugs = interaction_rows();
    EmrDocument {
        metadata: EmrMetadata {
            generated_at: generated_at.to_rfc3339(),
            total_drugs: drugs.len(),
            description: DESCRIPTION,
        },
        drugs,
        interaction_matrix: MatrixView,
    }
}

/// Write the EMR JSON document, stamped with the current local time.
pub fn write_json(path: &Path, log: &dyn LogSink) -> Result<usize> {
    let doc = emr_document(Local::now());
    let json = serde_json::to_string_pretty(&doc)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    log.info(&format!(
        "Saved EMR JSON with {} drugs to {}",
        doc.metadata.total_drugs,
        path.display()
    ));
    Ok(doc.metadata.total_drugs)
}
