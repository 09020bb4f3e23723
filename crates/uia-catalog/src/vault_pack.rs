//! Wire shape for the Stage-1 "Vault Pack" sent to the LLM (§4.9).
//!
//! Grounded on `insight_vault_repo.py::build_vault_pack`: a flat `batches`
//! list for titles, and a flat `insights` list carrying `batchId` alongside
//! each insight so the prompt can resolve batch membership without nesting.

use std::collections::HashMap;

use serde::Serialize;

use uia_core::model::InsightBatch;

#[derive(Debug, Clone, Serialize)]
pub struct VaultPackBatch {
    pub batch_id: String,
    pub name: String,
    pub language: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VaultPackAnswer {
    pub text: String,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VaultPackInsight {
    pub insight_id: String,
    pub batch_id: String,
    pub question: String,
    pub answers: HashMap<String, VaultPackAnswer>,
    pub is_multi_select: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct VaultPack {
    pub batches: Vec<VaultPackBatch>,
    pub insights: Vec<VaultPackInsight>,
}

pub fn build_vault_pack(batches: &[InsightBatch]) -> VaultPack {
    let mut pack_batches = Vec::new();
    let mut pack_insights = Vec::new();

    for batch in batches.iter().filter(|b| b.is_active) {
        pack_batches.push(VaultPackBatch {
            batch_id: batch.batch_id.clone(),
            name: batch.name.clone(),
            language: batch.language.clone(),
        });

        for ins in &batch.insights {
            let answers = ins
                .answer_order
                .iter()
                .filter_map(|id| {
                    ins.answers.get(id).map(|a| {
                        (
                            id.clone(),
                            VaultPackAnswer {
                                text: a.text.clone(),
                                aliases: a.aliases.clone(),
                            },
                        )
                    })
                })
                .collect();

            pack_insights.push(VaultPackInsight {
                insight_id: ins.insight_id.clone(),
                batch_id: batch.batch_id.clone(),
                question: ins.question.clone(),
                answers,
                is_multi_select: ins.is_multi_select,
                is_active: true,
            });
        }
    }

    VaultPack {
        batches: pack_batches,
        insights: pack_insights,
    }
}
